// Copyright 2020 Developers of the Rand project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Reproducible multi-stream random number generation.
//!
//! This crate draws multiple parallel pseudo-random streams from the
//! *same* underlying sequence as a single-stream generator, by
//! deterministically advancing each stream to an equally spaced starting
//! offset. With `n` streams spaced `step` draws apart, concatenating the
//! first `step` outputs of streams `0..n` reproduces the first
//! `n * step` outputs of a single-stream generator with the same seed,
//! which makes massively parallel Monte-Carlo runs bit-exactly
//! reproducible independent of the thread count.
//!
//! Two generators are provided:
//!
//! - [`Mrg32k3a`]: L'Ecuyer's combined multiple-recursive generator.
//!   Streams are advanced by 3x3 matrix exponentiation modulo the two
//!   component primes.
//! - [`Mt19937`]: the Mersenne Twister (2002 variant). Streams are
//!   advanced by polynomial exponentiation over GF(2) modulo the
//!   generator's degree-19937 minimal polynomial, following Haramoto,
//!   Matsumoto and L'Ecuyer (2008).
//!
//! Both support [`JumpableRng::jump`]: an O(polylog `step`) advance of
//! the state by up to [`MAX_STEP`] draws, built from precomputed tables
//! of advance operators for every base-8 digit of the step.
//!
//! The [`Streams`] handle owns a set of equally spaced streams of one
//! generator; [`AnyStreams`] selects the backend at run time.
//!
//! ```
//! use rand_streams::{Mt19937, Streams};
//!
//! let mut multi = Streams::<Mt19937>::new(1, 2, 1000).unwrap();
//! let mut single = Streams::<Mt19937>::new(1, 1, 0).unwrap();
//! for _ in 0..1000 {
//!     single.get(0);
//! }
//! // Stream 1 starts where the single stream is after 1000 draws.
//! assert_eq!(multi.get(1), single.get(0));
//! ```

#![doc(
    html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128-blk.png",
    html_favicon_url = "https://www.rust-lang.org/favicon.ico"
)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![doc(test(attr(allow(unused_variables), deny(warnings))))]
#![allow(clippy::unreadable_literal)]

pub use rand_core;
use rand_core::{RngCore, SeedableRng};

#[macro_use]
mod log_macros;

mod error;
mod mrg32k3a;
mod mt19937;
mod streams;

pub use error::{is_error, is_warning, Error, Warning};
pub use mrg32k3a::{Mrg32k3a, Mrg32k3aJump};
pub use mt19937::{Mt19937, Mt19937Jump};
pub use streams::{AnyStreams, Backend, Streams};

/// Largest step accepted by a single jump-ahead, `2^63 - 1`.
///
/// The precomputed advance operators cover every base-8 digit up to
/// `8^20`, so any step up to `8^21 - 1 = 2^63 - 1` can be composed.
pub const MAX_STEP: u64 = 0x7fff_ffff_ffff_ffff;

/// The seed substituted when a caller passes zero.
///
/// Seeding operations report the substitution as
/// [`Warning::SeedDefaulted`].
pub const DEFAULT_SEED: u64 = 1;

/// A generator that can advance its state by an arbitrary number of
/// draws in logarithmic time.
///
/// The advance operator for a given step (a pair of matrix powers for
/// [`Mrg32k3a`], a polynomial for [`Mt19937`]) is built once with
/// [`jump_op`](JumpableRng::jump_op) and can then be applied to any
/// number of streams with [`jump_with`](JumpableRng::jump_with); this is
/// how [`Streams`] spaces its streams and implements
/// [`jump_all`](Streams::jump_all).
///
/// `seed_from_u64` is required to be the generator's native integer
/// seeding procedure, so seeded sequences are bit-compatible with the
/// reference implementations.
pub trait JumpableRng: RngCore + SeedableRng + Clone {
    /// Precomputed operator advancing a stream by a fixed step.
    type JumpOp;

    /// Smallest integer [`next_u32`](RngCore::next_u32) can return.
    const MIN: u64;
    /// Largest integer [`next_u32`](RngCore::next_u32) can return.
    const MAX: u64;

    /// Builds the operator advancing a stream by `step` draws.
    ///
    /// A zero step yields the identity operator. Returns
    /// [`Error::StepTooLarge`] for steps above [`MAX_STEP`], and
    /// [`Error::MemoryJump`] if the operator and its scratch space
    /// cannot be allocated.
    fn jump_op(step: u64) -> Result<Self::JumpOp, Error>;

    /// Advances the state by a precomputed operator.
    ///
    /// The operator carries any scratch space its application needs, so
    /// applying it to many streams performs no further allocation.
    fn jump_with(&mut self, op: &mut Self::JumpOp);

    /// Advances the state by `step` draws without generating them.
    ///
    /// A zero step leaves the state bit-identical. On error the state is
    /// unchanged.
    fn jump(&mut self, step: u64) -> Result<(), Error> {
        if step == 0 {
            return Ok(());
        }
        let mut op = Self::jump_op(step)?;
        self.jump_with(&mut op);
        Ok(())
    }

    /// The next draw converted to a double in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// The next draw converted to a double in `(0, 1)`.
    fn next_f64_open(&mut self) -> f64;
}
