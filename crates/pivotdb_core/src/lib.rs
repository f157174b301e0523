//! Identifier-resolution pre-pass for a multidimensional query engine.
//!
//! The resolver walks a parsed query, groups sibling member paths that share
//! a resolution parent, and resolves each group with one batched catalog call
//! per round of depth. The output is a best-effort map from path node to
//! schema member, handed to the authoritative binder as a resolution hint.

pub mod catalog;
pub mod config;
pub mod functions;
pub mod resolver;
pub mod testutil;
