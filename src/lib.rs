//! A crate for computing Tutte, chromatic, and flow polynomials of
//! undirected multigraphs.
//!
//! The computation is a deletion-contraction recursion pruned by
//! structural reductions (loops, bridges, multicycles, biconnected
//! decomposition) and memoized in a cache keyed by canonical graph
//! form, so isomorphic subproblems are solved once.

#![allow(clippy::many_single_char_names)]

#[macro_use] extern crate log;
extern crate bincode;
#[macro_use] extern crate serde_derive;
extern crate serde;
extern crate fnv;
extern crate hashbrown;

/// Multigraphs with counted parallel edges.
pub mod graph;

/// Canonical graph keys (isomorphism-invariant byte strings).
pub mod canon;

/// Two-variable polynomials over big integers, in factored form.
pub mod poly;

/// The arena-backed computation cache.
pub mod cache;

/// The deletion-contraction engine.
pub mod eval;

/// Input parsing helpers.
pub mod parse;

/// Computation-tree trace output.
pub mod tree;

/// Error kinds shared across the crate.
pub mod error;

pub use error::{Error, Result};
pub use eval::{Engine, Mode};
pub use graph::Graph;
pub use poly::FactorPoly;
