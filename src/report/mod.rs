//! Briefing composition and persistence.

pub mod generator;

pub use generator::*;
