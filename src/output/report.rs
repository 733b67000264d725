//! Report envelope wrapping engine results for presentation

use crate::processing::career::CareerPath;
use crate::processing::gap_analyzer::GapReport;
use crate::processing::scorer::MatchResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TalentReport {
    pub title: String,
    pub metadata: ReportMetadata,
    pub payload: ReportPayload,
}

/// Run information. Never feeds back into scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub matcher_version: String,
    pub embedding_model: String,
    pub semantic_weight: f32,
    pub catalog_file: String,
}

impl ReportMetadata {
    pub fn new(embedding_model: &str, semantic_weight: f32, catalog_file: &str) -> Self {
        Self {
            generated_at: Utc::now(),
            matcher_version: env!("CARGO_PKG_VERSION").to_string(),
            embedding_model: embedding_model.to_string(),
            semantic_weight,
            catalog_file: catalog_file.to_string(),
        }
    }
}

/// Which side of the match a ranking was produced for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchDirection {
    /// Projects or courses ranked for one employee
    ForEmployee,
    /// Employees ranked for one project
    ForProject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReportPayload {
    Matches {
        /// Employee or project the results were ranked for
        subject: String,
        direction: MatchDirection,
        results: Vec<MatchResult>,
    },
    Gap(GapReport),
    Career(CareerPath),
}

impl TalentReport {
    pub fn matches(
        subject: &str,
        direction: MatchDirection,
        results: Vec<MatchResult>,
        metadata: ReportMetadata,
    ) -> Self {
        Self {
            title: format!("Matches for {}", subject),
            metadata,
            payload: ReportPayload::Matches {
                subject: subject.to_string(),
                direction,
                results,
            },
        }
    }

    pub fn gap(report: GapReport, metadata: ReportMetadata) -> Self {
        let title = match &report.project_title {
            Some(project) => format!("Skill gap: {} on {}", report.employee_id, project),
            None => format!("Skill gap: {} across all projects", report.employee_id),
        };
        Self {
            title,
            metadata,
            payload: ReportPayload::Gap(report),
        }
    }

    pub fn career(path: CareerPath, metadata: ReportMetadata) -> Self {
        Self {
            title: format!("Career path for {}", path.employee_id),
            metadata,
            payload: ReportPayload::Career(path),
        }
    }
}

/// Score as a whole percentage.
pub fn percentage(score: f32) -> u8 {
    (score.clamp(0.0, 1.0) * 100.0).round() as u8
}

pub fn verdict(overall_score: f32) -> &'static str {
    match percentage(overall_score) {
        90..=100 => "Excellent fit",
        75..=89 => "Strong fit",
        60..=74 => "Good fit",
        45..=59 => "Partial fit",
        _ => "Weak fit",
    }
}
