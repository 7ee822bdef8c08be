//! evalscan-core — Course-evaluation extraction, scoring, and batch engine.
//!
//! This crate turns free-text course-evaluation exports into structured
//! records and reduces their Likert percentage blocks to 0–100 scores.
//! The scanner, classifier and score aggregator are pure; loading,
//! configuration and the batch engine sit around them.

pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod loader;
pub mod model;
pub mod percent;
pub mod report;
pub mod scanner;
pub mod score;
pub mod statistics;
pub mod vocabulary;
pub mod window;
