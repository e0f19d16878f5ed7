//! Buddy Match - compatibility scoring and matching service for gym buddies
//!
//! This library scores how well two users' fitness profiles fit together,
//! ranks candidates, and enforces the rules of the match lifecycle. The
//! HTTP layer and row-store adapters live alongside it.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{calculate_compatibility, evaluate, rank, Matcher};
pub use crate::models::{Compatibility, FitnessAttributes, FitnessProfile, MatchRecord, ScoredCandidate};
