// Copyright 2020 Developers of the Rand project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The MRG32k3a random number generator.

use core::fmt;
use rand_core::{impls, le, Error as RngError, RngCore, SeedableRng};
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use crate::{Error, JumpableRng, MAX_STEP};

mod matrix;
mod tables;

use self::matrix::{mat_vec, Matrix};

/// Modulus of the first component, `2^32 - 209`.
pub(crate) const M1: u64 = 4294967087;
/// Modulus of the second component, `2^32 - 22853`.
pub(crate) const M2: u64 = 4294944443;

const A12: u64 = 1403580;
const A13N: u64 = 810728; // |a13|, a13 = -810728
const A21: u64 = 527612;
const A23N: u64 = 1370589; // |a23|, a23 = -1370589

// Adding m * |a| keeps the recurrences nonnegative in u64.
const ADD1: u64 = M1 * A13N;
const ADD2: u64 = M2 * A23N;

/// Normalisation for a double in `[0, 1)`: `1 / (m1 + 1)`.
const NORM: f64 = 1.0 / 4294967088.0;
/// Normalisation for a double in `(0, 1)`: `1 / (m1 + 2)`.
const NORM_POS: f64 = 1.0 / 4294967089.0;

/// A MRG32k3a random number generator.
///
/// The combined multiple-recursive generator of L'Ecuyer (1999), two
/// order-3 linear recurrences modulo 32-bit primes with a period near
/// 2^191. Integer draws lie in `[0, 4294967087]`, so they do not cover
/// the full `u32` range; use [`next_f64`](JumpableRng::next_f64) for
/// uniform variates.
///
/// Seeding iterates the LCG `x <- 69069 x + 1 (mod 2^32)` six times to
/// fill the state, matching the reference implementation, and
/// [`jump`](JumpableRng::jump) advances a stream by up to 2^63 - 1
/// draws via precomputed powers of the two companion matrices.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct Mrg32k3a {
    s1: [u64; 3],
    s2: [u64; 3],
}

/// A precomputed MRG32k3a advance operator: one power of each component's
/// companion matrix.
#[derive(Clone)]
pub struct Mrg32k3aJump {
    a1: Matrix,
    a2: Matrix,
}

impl Mrg32k3a {
    /// Creates a generator from an integer seed using the native LCG
    /// seeding procedure.
    ///
    /// All seeds are accepted; the zero-seed substitution is the stream
    /// handle's concern.
    pub fn new(seed: u64) -> Self {
        let mut x = seed;
        let mut lcg = || {
            x = x.wrapping_mul(69069).wrapping_add(1) & 0xffff_ffff;
            x
        };
        let s1 = [lcg() % M1, lcg() % M1, lcg() % M1];
        let s2 = [lcg() % M2, lcg() % M2, lcg() % M2];
        Mrg32k3a { s1, s2 }
    }

    #[inline]
    fn advance(&mut self) -> u32 {
        let p1 = (A12 * self.s1[1] + (ADD1 - A13N * self.s1[0])) % M1;
        self.s1 = [self.s1[1], self.s1[2], p1];

        let p2 = (A21 * self.s2[2] + (ADD2 - A23N * self.s2[0])) % M2;
        self.s2 = [self.s2[1], self.s2[2], p2];

        if p1 <= p2 {
            (p1 + M1 - p2) as u32
        } else {
            (p1 - p2) as u32
        }
    }
}

// Custom Debug implementation that does not expose the internal state
impl fmt::Debug for Mrg32k3a {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Mrg32k3a {{}}")
    }
}

impl fmt::Debug for Mrg32k3aJump {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Mrg32k3aJump {{}}")
    }
}

impl RngCore for Mrg32k3a {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        self.advance()
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

impl SeedableRng for Mrg32k3a {
    type Seed = [u8; 8];

    /// Seeds from 8 little-endian bytes via the native seeding procedure.
    fn from_seed(seed: Self::Seed) -> Self {
        let mut s = [0u64; 1];
        le::read_u64_into(&seed, &mut s);
        Mrg32k3a::new(s[0])
    }

    /// Seeds with the native LCG procedure; equal to [`Mrg32k3a::new`].
    fn seed_from_u64(seed: u64) -> Self {
        Mrg32k3a::new(seed)
    }
}

impl JumpableRng for Mrg32k3a {
    type JumpOp = Mrg32k3aJump;

    const MIN: u64 = 0;
    const MAX: u64 = M1;

    fn jump_op(step: u64) -> Result<Mrg32k3aJump, Error> {
        if step > MAX_STEP {
            return Err(Error::StepTooLarge);
        }
        let (a1, a2) = matrix::mat_pow(step);
        Ok(Mrg32k3aJump { a1, a2 })
    }

    fn jump_with(&mut self, op: &mut Mrg32k3aJump) {
        self.s1 = mat_vec(&op.a1, &self.s1, M1);
        self.s2 = mat_vec(&op.a2, &self.s2, M2);
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
