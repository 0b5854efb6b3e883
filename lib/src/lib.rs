#![warn(missing_docs)]

//! # `azeotrope`
//!
//! Solvers for two small-board logic puzzles: Chrooma, a marble puzzle where
//! colored balls slide until blocked and annihilate in adjacent same-color
//! pairs, and Transmission, a wire-routing puzzle where typed elements must
//! be connected so that every receiver gets its demanded packet count.
//!
//! Both solvers share one skeleton: a deterministic simulation of the puzzle
//! mechanic wrapped in a breadth-first search over states, deduplicated by
//! each state's canonical byte image. All of the interesting work sits in the
//! two mechanics' stepping rules ([`chrooma::State::apply`] and the
//! connection/flow machinery behind [`transmission::solve`]) and in the
//! geometric predicates gating legal wires in Transmission.
//!
//! Parse a level with [`chrooma::Board::parse`] or
//! [`transmission::Level::parse`], then hand it to the matching `solve`.
//! Solutions come back as move traces; exhaustion and depth cutoffs are
//! ordinary outcomes, not errors.

pub use location::Location;

pub mod chrooma;
pub mod geometry;
pub mod transmission;


pub(crate) mod location;
pub(crate) mod search;
