//! CLI interface for the talent matcher

use crate::config::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "talent-matcher")]
#[command(about = "Match employees to projects, find skill gaps and suggest courses")]
#[command(long_about = "Rank projects and courses for employees by combining embedding \
                        similarity with skill overlap, explain skill gaps and propose \
                        career steps")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// JSON catalog of employees, projects and courses
    #[arg(long, global = true, default_value = "catalog.json")]
    pub catalog: PathBuf,

    /// Output format: console, json, markdown (overrides the configuration)
    #[arg(short, long, global = true)]
    pub format: Option<String>,

    /// Output detailed analysis
    #[arg(short, long, global = true)]
    pub detailed: bool,

    /// Save output to file
    #[arg(short, long, global = true)]
    pub save: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rank projects for an employee
    Match {
        /// Employee id
        employee: String,

        /// Number of results (defaults to the configured top_k)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Score only these project ids instead of the whole catalog
        #[arg(short, long, value_delimiter = ',')]
        projects: Vec<String>,

        /// Semantic weight α in [0, 1]
        #[arg(short, long)]
        weight: Option<f32>,
    },

    /// Rank employees for a project
    Candidates {
        /// Project id
        project: String,

        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        #[arg(short, long)]
        weight: Option<f32>,
    },

    /// Rank courses for an employee
    Courses {
        /// Employee id
        employee: String,

        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Skill gap against one project, or against every project when none is given
    Gap {
        /// Employee id
        employee: String,

        /// Project id
        #[arg(short, long)]
        project: Option<String>,
    },

    /// Suggest the next career steps for an employee
    Career {
        /// Employee id
        employee: String,
    },

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "scoring.semantic_weight")
        key: String,

        /// Configuration value
        value: String,
    },
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        _ => Err(format!("Invalid output format: {}. Supported: console, json, markdown", format)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_output_format() {
        assert_eq!(parse_output_format("JSON"), Ok(OutputFormat::Json));
        assert_eq!(parse_output_format("md"), Ok(OutputFormat::Markdown));
        assert!(parse_output_format("pdf").is_err());
    }

    #[test]
    fn test_match_arguments() {
        let cli = Cli::try_parse_from([
            "talent-matcher",
            "--catalog",
            "people.json",
            "match",
            "e1",
            "-k",
            "3",
            "--projects",
            "p1,p2",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.catalog, PathBuf::from("people.json"));
        assert_eq!(cli.format.as_deref(), Some("json"));
        match cli.command {
            Commands::Match {
                employee,
                top_k,
                projects,
                weight,
            } => {
                assert_eq!(employee, "e1");
                assert_eq!(top_k, Some(3));
                assert_eq!(projects, vec!["p1", "p2"]);
                assert_eq!(weight, None);
            }
            _ => panic!("expected match command"),
        }
    }
}
