//! Cyberpolicy Domain Layer
//!
//! Core data model and trait seams for the policy-rule extraction pipeline.
//! Infrastructure (HTTP model providers, PDF reading, file persistence) lives
//! in other crates and plugs in through the traits defined here.
//!
//! ## Key Concepts
//!
//! - **PolicyRule**: one cybercrime-related rule extracted from a document
//! - **RuleCollection**: append-only, country-keyed accumulation of rules
//! - **GenerationRequest / Completion**: the boundary with a text-generation model
//!
//! ## Architecture
//!
//! - Minimal dependencies (serde only, for the output artifact shape)
//! - No I/O
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod collection;
pub mod generation;
pub mod rule;
pub mod traits;

// Re-exports for convenience
pub use collection::RuleCollection;
pub use generation::{Completion, GenerationRequest};
pub use rule::PolicyRule;
