//! Legality and state-transition engine for a two-player chess match.
//!
//! The presentation layer hands `(src, dst, promotion)` triples to
//! [`engine::Match::attempt_move`] and re-renders from the returned
//! [`engine::MoveReport`]. Player records go in at the start of a match and
//! come back out, updated, at the end; storing them is the caller's job.

pub mod config;
pub mod engine;
