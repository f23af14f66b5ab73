//! The run-cycle rate-limit policy.
//!
//! One pure decision: given when we last posted and the configured bounds,
//! should this cycle produce an update? The caller supplies the random
//! source, so tests can seed it.
//!
//! # Rules
//!
//! 1. `force` wins unconditionally (manual override).
//! 2. Older than `max_spacing` since the last post: post (starvation guard;
//!    the bot is never silent longer than the ceiling).
//! 3. Otherwise draw once from [0, 1): post iff the draw lands under
//!    `probability` *and* the last post is older than `min_spacing`.
//!
//! A `last_update` of zero means "never posted", which reads as infinitely
//! long ago: the very first run posts via the starvation guard.
//!
//! `probability` outside [0, 1] is an operator error and is deliberately
//! not validated here.

use rand::Rng;

/// Timing inputs for the posting decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostTiming {
    /// Current time, epoch seconds.
    pub now: u64,

    /// Epoch seconds of the last successful post; zero if never.
    pub last_update: u64,

    /// Per-cycle post chance in [0, 1].
    pub probability: f64,

    /// Floor (seconds) between probabilistic posts.
    pub min_spacing: u64,

    /// Ceiling (seconds) forcing a post.
    pub max_spacing: u64,
}

/// Decides whether to produce an update this cycle.
///
/// Pure apart from the single uniform draw taken from `rng`.
pub fn should_post_now(force: bool, timing: &PostTiming, rng: &mut (impl Rng + ?Sized)) -> bool {
    if force {
        return true;
    }

    let age = timing.now.saturating_sub(timing.last_update);

    if age > timing.max_spacing {
        return true;
    }

    let sample: f64 = rng.gen();
    sample < timing.probability && age > timing.min_spacing
}
