//! Gramref Core Types and Definitions
//!
//! This crate provides the foundational types for the gramref documentation
//! pipeline. It includes:
//!
//! - **Node**: the tagged grammar-node model ([`node`] module)
//! - **Fragment**: parsed grammar fragments and merge markers ([`fragment`] module)
//! - **Render**: the canonical notation renderer ([`render`] module)

pub mod fragment;
pub mod node;
pub mod render;

pub use fragment::{FragmentEntry, GrammarFragment, MergeMode};
pub use node::{Cardinality, Choice, GrammarNode, Group, Statement};
