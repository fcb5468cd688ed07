// Copyright 2020 Developers of the Rand project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The MT19937 (Mersenne Twister) random number generator.

use core::fmt;
use rand_core::{impls, le, Error as RngError, RngCore, SeedableRng};
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use crate::{Error, JumpableRng, MAX_STEP};

mod poly;
mod tables;

use self::poly::{coef, poly_mod_phi, poly_mul, poly_mul_ub, PHI_DEGREE};

/// Number of state words.
const N: usize = 624;
/// Recurrence offset.
const M: usize = 397;
const MATRIX_A: u32 = 0x9908b0df;
const UPPER_MASK: u32 = 0x80000000;
const LOWER_MASK: u32 = 0x7fffffff;

/// Normalisation for a double in `[0, 1)`: `2^-32`.
const NORM: f64 = 1.0 / 4294967296.0;
/// Normalisation for a double in `(0, 1)`: `1 / (2^32 + 1)`.
const NORM_POS: f64 = 1.0 / 4294967297.0;

/// A MT19937 (Mersenne Twister) random number generator.
///
/// The 2002 reference variant of Matsumoto and Nishimura's generator,
/// with a 19937-bit state and full `u32` output range. Sequences are
/// bit-compatible with the authors' `mt19937ar.c` for integer seeds.
///
/// [`jump`](JumpableRng::jump) advances a stream by up to 2^63 - 1
/// draws in one move, by evaluating `t^step` modulo the generator's
/// minimal polynomial over GF(2) and applying the result to the state
/// with the reconstruction of Haramoto, Matsumoto and L'Ecuyer (2008).
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct Mt19937 {
    #[cfg_attr(feature = "serde1", serde(with = "state_serde"))]
    mt: [u32; N],
    idx: usize,
}

/// A precomputed MT19937 advance operator: `t^step` reduced by the
/// minimal polynomial, as 624 little-endian words.
///
/// The operator also carries the scratch buffers for composing and
/// applying it, allocated once in [`jump_op`](JumpableRng::jump_op) and
/// reused for every stream it is applied to.
#[derive(Clone)]
pub struct Mt19937Jump {
    poly: Vec<u32>, // N words
    pm: Vec<u32>,   // 2N words
    ph: Vec<u32>,   // 3N words
    tmp: Vec<u32>,  // 5N words
}

impl Mt19937 {
    /// Creates a generator from an integer seed using the 2002 reference
    /// seeding procedure. Only the low 32 bits of the seed are used.
    pub fn new(seed: u64) -> Self {
        let mut mt = [0u32; N];
        mt[0] = seed as u32;
        for i in 1..N {
            mt[i] = 1812433253u32
                .wrapping_mul(mt[i - 1] ^ (mt[i - 1] >> 30))
                .wrapping_add(i as u32);
        }
        // idx == N: the first draw refreshes the whole state
        Mt19937 { mt, idx: N }
    }

    fn twist(&mut self) {
        const MAGIC: [u32; 2] = [0, MATRIX_A];
        let mt = &mut self.mt;
        for k in 0..N - M {
            let y = (mt[k] & UPPER_MASK) | (mt[k + 1] & LOWER_MASK);
            mt[k] = mt[k + M] ^ (y >> 1) ^ MAGIC[(y & 1) as usize];
        }
        for k in N - M..N - 1 {
            let y = (mt[k] & UPPER_MASK) | (mt[k + 1] & LOWER_MASK);
            mt[k] = mt[k + M - N] ^ (y >> 1) ^ MAGIC[(y & 1) as usize];
        }
        let y = (mt[N - 1] & UPPER_MASK) | (mt[0] & LOWER_MASK);
        mt[N - 1] = mt[M - 1] ^ (y >> 1) ^ MAGIC[(y & 1) as usize];
        self.idx = 0;
    }

    /// The next untempered state word.
    #[inline]
    fn next_state(&mut self) -> u32 {
        if self.idx >= N {
            self.twist();
        }
        let y = self.mt[self.idx];
        self.idx += 1;
        y
    }

    /// Rebuilds the state array from a degree-19937 polynomial
    /// representation, walking the recurrence backwards (after Boost's
    /// `mersenne_twister.hpp`).
    fn recover(&mut self, poly: &[u32]) {
        let mt = &mut self.mt;
        for i in PHI_DEGREE - N + 1..=PHI_DEGREE {
            mt[i % N] = coef(poly, i);
        }
        let mut y0 = 0u32;
        for i in (N - 1..=PHI_DEGREE + 1).rev() {
            let mut y1 = mt[i % N] ^ mt[(i + M) % N];
            if coef(poly, i + 1 - N) != 0 {
                y1 = ((y1 ^ MATRIX_A) << 1) | 1;
            } else {
                y1 <<= 1;
            }
            mt[(i + 1) % N] = (y0 & UPPER_MASK) | (y1 & LOWER_MASK);
            y0 = y1;
        }
        self.idx = 0;
    }
}

// Custom Debug implementation that does not expose the internal state
impl fmt::Debug for Mt19937 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Mt19937 {{}}")
    }
}

impl fmt::Debug for Mt19937Jump {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Mt19937Jump {{}}")
    }
}

impl RngCore for Mt19937 {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        let mut y = self.next_state();
        y ^= y >> 11;
        y ^= (y << 7) & 0x9d2c5680;
        y ^= (y << 15) & 0xefc60000;
        y ^ (y >> 18)
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_u32(self)
    }

    #[inline]
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        impls::fill_bytes_via_next(self, dest)
    }

    #[inline]
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), RngError> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Mt19937 {
    type Seed = [u8; 4];

    /// Seeds from 4 little-endian bytes via the 2002 seeding procedure.
    fn from_seed(seed: Self::Seed) -> Self {
        let mut s = [0u32; 1];
        le::read_u32_into(&seed, &mut s);
        Mt19937::new(u64::from(s[0]))
    }

    /// Seeds with the 2002 procedure; equal to [`Mt19937::new`].
    fn seed_from_u64(seed: u64) -> Self {
        Mt19937::new(seed)
    }
}

fn try_zeroed(len: usize) -> Result<Vec<u32>, Error> {
    let mut v = Vec::new();
    v.try_reserve_exact(len).map_err(|_| Error::MemoryJump)?;
    v.resize(len, 0);
    Ok(v)
}

impl JumpableRng for Mt19937 {
    type JumpOp = Mt19937Jump;

    const MIN: u64 = 0;
    const MAX: u64 = 0xffff_ffff;

    fn jump_op(step: u64) -> Result<Mt19937Jump, Error> {
        if step > MAX_STEP {
            return Err(Error::StepTooLarge);
        }
        let mut op = Mt19937Jump {
            poly: try_zeroed(N)?,
            pm: try_zeroed(2 * N)?,
            ph: try_zeroed(3 * N)?,
            tmp: try_zeroed(5 * N)?,
        };

        // t^step mod phi, one table factor per nonzero base-8 digit
        let mut have = false;
        let mut n = step;
        let mut i = 0;
        while n != 0 {
            let d = (n & 7) as usize;
            if d != 0 {
                if !have {
                    op.poly.copy_from_slice(&tables::JUMP_POLY[i][d - 1]);
                    have = true;
                } else {
                    poly_mul(&mut op.pm, &op.poly, &tables::JUMP_POLY[i][d - 1], N, &mut op.tmp);
                    poly_mod_phi(&mut op.pm);
                    op.poly.copy_from_slice(&op.pm[..N]);
                }
            }
            i += 1;
            n >>= 3;
        }
        if !have {
            // step == 0: the identity polynomial
            op.poly[0] = 1;
        }
        Ok(op)
    }

    fn jump_with(&mut self, op: &mut Mt19937Jump) {
        // Advance 2K steps, collecting the raw low bits into a
        // polynomial with the first observed bit on top.
        op.pm.fill(0);
        for i in (0..2 * PHI_DEGREE).rev() {
            op.pm[i >> 5] |= (self.next_state() & 1) << (i & 31);
        }

        poly_mul_ub(&mut op.ph, &op.pm, &op.poly, N, &mut op.tmp);

        // Coefficients 2K-1 down to K-1 of the product, reversed, encode
        // the advanced state.
        op.pm[..N].fill(0);
        for i in 0..=PHI_DEGREE {
            op.pm[i >> 5] |= coef(&op.ph, 2 * PHI_DEGREE - 1 - i) << (i & 31);
        }
        self.recover(&op.pm[..N]);
    }

    #[inline]
    fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) * NORM
    }

    #[inline]
    fn next_f64_open(&mut self) -> f64 {
        (f64::from(self.next_u32()) + 1.0) * NORM_POS
    }
}

// Arrays longer than 32 elements do not derive the serde traits; encode
// the state as a fixed-length tuple instead.
#[cfg(feature = "serde1")]
mod state_serde {
    use super::N;
    use core::fmt;
    use serde::de::{self, SeqAccess, Visitor};
    use serde::ser::SerializeTuple;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(arr: &[u32; N], ser: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = ser.serialize_tuple(N)?;
        for e in arr.iter() {
            seq.serialize_element(e)?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D>(de: D) -> Result<[u32; N], D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ArrayVisitor;
        impl<'de> Visitor<'de> for ArrayVisitor {
            type Value = [u32; N];

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("Mt19937 state array")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<[u32; N], A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut out = [0u32; N];
                for (i, slot) in out.iter_mut().enumerate() {
                    match seq.next_element()? {
                        Some(val) => *slot = val,
                        None => return Err(de::Error::invalid_length(i, &self)),
                    }
                }
                Ok(out)
            }
        }

        de.deserialize_tuple(N, ArrayVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_seeding() {
        let rng = Mt19937::new(1);
        assert_eq!(
            &rng.mt[..8],
            &[
                1, 1812433254, 3713160357, 3109174145, 64984499, 3392658084,
                446538473, 2629760756
            ]
        );
        assert_eq!(rng.idx, N);
    }

    #[test]
    fn reference_sequence() {
        // Values produced by the reference mt19937ar.c with seed 1.
        let mut rng = Mt19937::new(1);
        let expected = [
            1791095845u32, 4282876139, 3093770124, 4005303368, 491263,
            550290313, 1298508491, 4290846341, 630311759, 1013994432,
        ];
        for &e in &expected {
            assert_eq!(rng.next_u32(), e);
        }

        // The authors' classic default seed.
        let mut rng = Mt19937::new(5489);
        let expected = [
            3499211612u32, 581869302, 3890346734, 3586334585, 545404204,
        ];
        for &e in &expected {
            assert_eq!(rng.next_u32(), e);
        }
    }

    #[test]
    fn first_double() {
        let mut rng = Mt19937::new(1);
        assert_eq!(rng.next_f64(), 1791095845.0 / 4294967296.0);
    }

    #[test]
    fn jump_matches_sequential() {
        for &step in &[1u64, 2, 3, 100, 624, 9999] {
            let mut jumped = Mt19937::new(1);
            jumped.jump(step).unwrap();
            let mut stepped = Mt19937::new(1);
            for _ in 0..step {
                stepped.next_u32();
            }
            for k in 0..10 {
                assert_eq!(
                    jumped.next_u32(),
                    stepped.next_u32(),
                    "step {} draw {}",
                    step,
                    k
                );
            }
        }
    }

    #[test]
    fn jump_from_mid_buffer_position() {
        let mut jumped = Mt19937::new(42);
        for _ in 0..1000 {
            jumped.next_u32();
        }
        jumped.jump(777).unwrap();
        let mut stepped = Mt19937::new(42);
        for _ in 0..1777 {
            stepped.next_u32();
        }
        for _ in 0..5 {
            assert_eq!(jumped.next_u32(), stepped.next_u32());
        }
    }

    #[test]
    fn jump_composes() {
        let mut a = Mt19937::new(7);
        a.jump(4000).unwrap();
        a.jump(1234).unwrap();
        let mut b = Mt19937::new(7);
        b.jump(5234).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn zero_jump_is_identity() {
        let mut rng = Mt19937::new(3);
        rng.next_u32();
        let before = rng.clone();
        rng.jump(0).unwrap();
        assert_eq!(rng, before);
    }

    #[test]
    fn oversized_step_is_rejected() {
        let mut rng = Mt19937::new(3);
        let before = rng.clone();
        assert_eq!(rng.jump(MAX_STEP + 1), Err(Error::StepTooLarge));
        assert_eq!(rng, before);
    }

    #[test]
    fn doubles_are_in_range() {
        let mut rng = Mt19937::new(1);
        for _ in 0..1000 {
            let x = rng.next_f64();
            assert!((0.0..1.0).contains(&x));
            let y = rng.next_f64_open();
            assert!(y > 0.0 && y < 1.0);
        }
    }

    #[cfg(feature = "serde1")]
    #[test]
    fn serde_roundtrip() {
        let mut rng = Mt19937::new(918273645);
        rng.next_u32();
        let encoded = bincode::serialize(&rng).unwrap();
        let mut decoded: Mt19937 = bincode::deserialize(&encoded).unwrap();
        assert_eq!(rng, decoded);
        assert_eq!(rng.next_u32(), decoded.next_u32());
    }
}
