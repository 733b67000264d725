//! Talent matcher library

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod processing;
pub mod output;

pub use error::{Result, TalentMatcherError};
pub use config::Config;
pub use processing::TalentMatcher;
