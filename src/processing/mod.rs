//! Skill normalization, scoring and analysis

pub mod skills;
pub mod embeddings;
pub mod scorer;
pub mod gap_analyzer;
pub mod career;
pub mod analyzer;

pub use analyzer::{Collaborators, TalentMatcher};
