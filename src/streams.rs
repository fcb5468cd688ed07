// Copyright 2020 Developers of the Rand project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Multi-stream handles over the jump-ahead generators.

use crate::{Error, JumpableRng, Mrg32k3a, Mt19937, Warning, DEFAULT_SEED, MAX_STEP};

/// Identifiers of the available generator backends.
///
/// The numeric values are stable; [`Backend::try_from`] accepts them
/// back and reports [`Error::UndefinedBackend`] for anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// L'Ecuyer's combined multiple-recursive generator MRG32k3a.
    Mrg32k3a = 0,
    /// The Mersenne Twister MT19937 (2002 variant).
    Mt19937 = 1,
}

impl Backend {
    /// The stable numeric identifier of this backend.
    pub const fn id(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for Backend {
    type Error = Error;

    fn try_from(id: u32) -> Result<Self, Error> {
        match id {
            0 => Ok(Backend::Mrg32k3a),
            1 => Ok(Backend::Mt19937),
            _ => Err(Error::UndefinedBackend),
        }
    }
}

fn substitute_seed(seed: u64) -> (u64, Option<Warning>) {
    if seed == 0 {
        warn!("seed 0 is invalid, substituting the default seed {}", DEFAULT_SEED);
        (DEFAULT_SEED, Some(Warning::SeedDefaulted))
    } else {
        (seed, None)
    }
}

/// A fixed set of equally spaced streams of one generator.
///
/// Stream 0 is seeded directly; stream `i` starts where stream `i - 1`
/// would be after `step` draws. Concatenating the first `step` outputs
/// of streams `0..n` therefore reproduces the first `n * step` outputs
/// of a single-stream generator with the same seed, whatever `n` is.
///
/// The handle exclusively owns its stream states and their indices are
/// stable for its lifetime. Mutating operations take `&mut self`, so a
/// handle shared between threads needs external synchronisation; for
/// lock-free parallel draws, give each thread one stream via
/// [`streams_mut`](Streams::streams_mut) and `split_at_mut` or
/// `chunks_mut`.
///
/// With `nstream <= 1` the handle holds a single stream that is jumped
/// `step` draws ahead of the seed position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Streams<R> {
    rngs: Vec<R>,
    warning: Option<Warning>,
}

impl<R: JumpableRng> Streams<R> {
    /// Creates `max(nstream, 1)` streams spaced `step` draws apart from
    /// the given seed.
    ///
    /// A zero seed is replaced by [`DEFAULT_SEED`], queryable afterwards
    /// through [`warning`](Streams::warning). Fails with
    /// [`Error::StepTooLarge`] for steps above [`MAX_STEP`] and
    /// [`Error::Memory`] if the state array cannot be allocated.
    pub fn new(seed: u64, nstream: u32, step: u64) -> Result<Self, Error> {
        if step > MAX_STEP {
            return Err(Error::StepTooLarge);
        }
        let n = nstream.max(1) as usize;
        let mut rngs = Vec::new();
        rngs.try_reserve_exact(n).map_err(|_| Error::Memory)?;

        let (seed, warning) = substitute_seed(seed);
        let mut first = R::seed_from_u64(seed);
        if n == 1 {
            first.jump(step)?;
            rngs.push(first);
        } else if step == 0 {
            for _ in 0..n {
                rngs.push(first.clone());
            }
        } else {
            let mut op = R::jump_op(step)?;
            rngs.push(first);
            for i in 1..n {
                let mut next = rngs[i - 1].clone();
                next.jump_with(&mut op);
                rngs.push(next);
            }
            debug!("spaced {} streams {} draws apart", n, step);
        }
        Ok(Streams { rngs, warning })
    }

    /// Number of streams.
    pub fn len(&self) -> usize {
        self.rngs.len()
    }

    /// Always false: a handle holds at least one stream.
    pub fn is_empty(&self) -> bool {
        self.rngs.is_empty()
    }

    /// The warning raised by the most recent seeding operation, if any.
    pub fn warning(&self) -> Option<Warning> {
        self.warning
    }

    /// Smallest integer [`get`](Streams::get) can return.
    pub fn min(&self) -> u64 {
        R::MIN
    }

    /// Largest integer [`get`](Streams::get) can return.
    pub fn max(&self) -> u64 {
        R::MAX
    }

    /// The next integer draw of the given stream.
    ///
    /// # Panics
    ///
    /// Panics if `stream >= len()`.
    pub fn get(&mut self, stream: usize) -> u64 {
        u64::from(self.rngs[stream].next_u32())
    }

    /// The next draw of the given stream as a double in `[0, 1)`.
    ///
    /// # Panics
    ///
    /// Panics if `stream >= len()`.
    pub fn get_f64(&mut self, stream: usize) -> f64 {
        self.rngs[stream].next_f64()
    }

    /// The next draw of the given stream as a double in `(0, 1)`.
    ///
    /// # Panics
    ///
    /// Panics if `stream >= len()`.
    pub fn get_f64_open(&mut self, stream: usize) -> f64 {
        self.rngs[stream].next_f64_open()
    }

    /// Advances one stream by `step` draws. A zero step is a no-op; on
    /// error the stream is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `stream >= len()`.
    pub fn jump(&mut self, stream: usize, step: u64) -> Result<(), Error> {
        self.rngs[stream].jump(step)
    }

    /// Advances every stream by the same `step`, computing the advance
    /// operator once. A zero step is a no-op; on error all streams are
    /// unchanged.
    pub fn jump_all(&mut self, step: u64) -> Result<(), Error> {
        if step == 0 {
            return Ok(());
        }
        let mut op = R::jump_op(step)?;
        for rng in &mut self.rngs {
            rng.jump_with(&mut op);
        }
        Ok(())
    }

    /// Re-seeds one stream and advances it `step` draws from the fresh
    /// seed position. On error the stream is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `stream >= len()`.
    pub fn reset(&mut self, stream: usize, seed: u64, step: u64) -> Result<Option<Warning>, Error> {
        if step > MAX_STEP {
            return Err(Error::StepTooLarge);
        }
        let (seed, warning) = substitute_seed(seed);
        let mut rng = R::seed_from_u64(seed);
        rng.jump(step)?;
        self.rngs[stream] = rng;
        self.warning = warning;
        Ok(warning)
    }

    /// Re-seeds stream 0 and rebuilds streams `1..n` at their initial
    /// spacing, exactly as [`new`](Streams::new) with the same `step`.
    /// Neither the number of streams nor the backend changes; on error
    /// all streams are unchanged.
    pub fn reset_all(&mut self, seed: u64, step: u64) -> Result<Option<Warning>, Error> {
        if step > MAX_STEP {
            return Err(Error::StepTooLarge);
        }
        let (seed, warning) = substitute_seed(seed);
        let first = R::seed_from_u64(seed);
        let n = self.rngs.len();
        if n == 1 {
            let mut rng = first;
            rng.jump(step)?;
            self.rngs[0] = rng;
        } else if step == 0 {
            for rng in &mut self.rngs {
                *rng = first.clone();
            }
        } else {
            let mut op = R::jump_op(step)?;
            self.rngs[0] = first;
            for i in 1..n {
                let mut next = self.rngs[i - 1].clone();
                next.jump_with(&mut op);
                self.rngs[i] = next;
            }
        }
        self.warning = warning;
        Ok(warning)
    }

    /// Exclusive access to one stream's generator.
    ///
    /// # Panics
    ///
    /// Panics if `stream >= len()`.
    pub fn stream_mut(&mut self, stream: usize) -> &mut R {
        &mut self.rngs[stream]
    }

    /// Exclusive access to all stream generators, for handing disjoint
    /// streams to worker threads.
    pub fn streams_mut(&mut self) -> &mut [R] {
        &mut self.rngs
    }
}

/// A [`Streams`] handle whose backend is selected at run time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnyStreams {
    /// MRG32k3a-backed streams.
    Mrg32k3a(Streams<Mrg32k3a>),
    /// MT19937-backed streams.
    Mt19937(Streams<Mt19937>),
}

macro_rules! delegate {
    ($self:expr, $s:ident => $e:expr) => {
        match $self {
            AnyStreams::Mrg32k3a($s) => $e,
            AnyStreams::Mt19937($s) => $e,
        }
    };
}

impl AnyStreams {
    /// Creates a handle for the given backend; see [`Streams::new`].
    pub fn new(backend: Backend, seed: u64, nstream: u32, step: u64) -> Result<Self, Error> {
        match backend {
            Backend::Mrg32k3a => Streams::new(seed, nstream, step).map(AnyStreams::Mrg32k3a),
            Backend::Mt19937 => Streams::new(seed, nstream, step).map(AnyStreams::Mt19937),
        }
    }

    /// The backend this handle was created with.
    pub fn backend(&self) -> Backend {
        match self {
            AnyStreams::Mrg32k3a(_) => Backend::Mrg32k3a,
            AnyStreams::Mt19937(_) => Backend::Mt19937,
        }
    }

    /// Number of streams.
    pub fn len(&self) -> usize {
        delegate!(self, s => s.len())
    }

    /// Always false: a handle holds at least one stream.
    pub fn is_empty(&self) -> bool {
        delegate!(self, s => s.is_empty())
    }

    /// The warning raised by the most recent seeding operation, if any.
    pub fn warning(&self) -> Option<Warning> {
        delegate!(self, s => s.warning())
    }

    /// Smallest integer [`get`](AnyStreams::get) can return.
    pub fn min(&self) -> u64 {
        delegate!(self, s => s.min())
    }

    /// Largest integer [`get`](AnyStreams::get) can return.
    pub fn max(&self) -> u64 {
        delegate!(self, s => s.max())
    }

    /// The next integer draw of the given stream.
    pub fn get(&mut self, stream: usize) -> u64 {
        delegate!(self, s => s.get(stream))
    }

    /// The next draw of the given stream as a double in `[0, 1)`.
    pub fn get_f64(&mut self, stream: usize) -> f64 {
        delegate!(self, s => s.get_f64(stream))
    }

    /// The next draw of the given stream as a double in `(0, 1)`.
    pub fn get_f64_open(&mut self, stream: usize) -> f64 {
        delegate!(self, s => s.get_f64_open(stream))
    }

    /// Advances one stream by `step` draws; see [`Streams::jump`].
    pub fn jump(&mut self, stream: usize, step: u64) -> Result<(), Error> {
        delegate!(self, s => s.jump(stream, step))
    }

    /// Advances every stream by the same `step`; see
    /// [`Streams::jump_all`].
    pub fn jump_all(&mut self, step: u64) -> Result<(), Error> {
        delegate!(self, s => s.jump_all(step))
    }

    /// Re-seeds one stream; see [`Streams::reset`].
    pub fn reset(&mut self, stream: usize, seed: u64, step: u64) -> Result<Option<Warning>, Error> {
        delegate!(self, s => s.reset(stream, seed, step))
    }

    /// Re-seeds and re-spaces every stream; see [`Streams::reset_all`].
    pub fn reset_all(&mut self, seed: u64, step: u64) -> Result<Option<Warning>, Error> {
        delegate!(self, s => s.reset_all(seed, step))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_core::RngCore;

    #[test]
    fn backend_ids_are_stable() {
        assert_eq!(Backend::Mrg32k3a.id(), 0);
        assert_eq!(Backend::Mt19937.id(), 1);
        assert_eq!(Backend::try_from(0), Ok(Backend::Mrg32k3a));
        assert_eq!(Backend::try_from(1), Ok(Backend::Mt19937));
        assert_eq!(Backend::try_from(2), Err(Error::UndefinedBackend));
    }

    #[test]
    fn nstream_zero_counts_as_one() {
        let a = Streams::<Mrg32k3a>::new(1, 0, 500).unwrap();
        let b = Streams::<Mrg32k3a>::new(1, 1, 500).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn single_stream_is_jumped_by_step() {
        let mut handle = Streams::<Mrg32k3a>::new(1, 1, 100).unwrap();
        let mut plain = Mrg32k3a::new(1);
        for _ in 0..100 {
            plain.next_u32();
        }
        assert_eq!(handle.get(0), u64::from(plain.next_u32()));
    }

    #[test]
    fn ranges() {
        let handle = Streams::<Mrg32k3a>::new(1, 1, 0).unwrap();
        assert_eq!(handle.min(), 0);
        assert_eq!(handle.max(), 4294967087);
        let handle = Streams::<Mt19937>::new(1, 1, 0).unwrap();
        assert_eq!(handle.min(), 0);
        assert_eq!(handle.max(), u64::from(u32::MAX));
    }

    #[test]
    fn seed_zero_defaults_with_warning() {
        let mut zero = Streams::<Mrg32k3a>::new(0, 2, 10).unwrap();
        let mut one = Streams::<Mrg32k3a>::new(1, 2, 10).unwrap();
        assert_eq!(zero.warning(), Some(Warning::SeedDefaulted));
        assert_eq!(one.warning(), None);
        for i in 0..2 {
            assert_eq!(zero.get(i), one.get(i));
        }
    }

    #[test]
    fn reset_warns_on_zero_seed_and_stays_valid() {
        let mut handle = Streams::<Mrg32k3a>::new(9, 2, 10).unwrap();
        let warning = handle.reset_all(0, 10).unwrap();
        assert_eq!(warning, Some(Warning::SeedDefaulted));
        assert_eq!(handle.warning(), Some(Warning::SeedDefaulted));
        let mut defaulted = Streams::<Mrg32k3a>::new(1, 2, 10).unwrap();
        assert_eq!(handle.streams_mut(), defaulted.streams_mut());
    }
}
