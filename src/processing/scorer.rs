//! Match scoring: semantic similarity combined with explicit skill overlap

use crate::catalog::{Course, EmployeeProfile, Project};
use crate::config::ScoringConfig;
use crate::error::{Result, TalentMatcherError};
use crate::processing::embeddings::{
    check_dimension, cosine_similarity, embed_for, rescale_similarity, Embedder,
};
use crate::processing::skills::SkillSet;
use log::debug;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

pub const DEFAULT_SEMANTIC_WEIGHT: f32 = 0.6;

/// Weight α of the semantic score; the overlap score receives `1 - α`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    semantic_weight: f32,
}

impl ScoringWeights {
    pub fn new(semantic_weight: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&semantic_weight) {
            return Err(TalentMatcherError::InvalidInput(format!(
                "semantic weight must be within [0, 1], got {}",
                semantic_weight
            )));
        }
        Ok(Self { semantic_weight })
    }

    pub fn semantic_weight(&self) -> f32 {
        self.semantic_weight
    }

    pub fn overlap_weight(&self) -> f32 {
        1.0 - self.semantic_weight
    }

    /// `α·semantic + (1-α)·overlap`
    pub fn combine(&self, semantic_score: f32, overlap_score: f32) -> f32 {
        let overall = self.semantic_weight * semantic_score + self.overlap_weight() * overlap_score;
        overall.clamp(0.0, 1.0)
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            semantic_weight: DEFAULT_SEMANTIC_WEIGHT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Project,
    Course,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Project => write!(f, "project"),
            TargetKind::Course => write!(f, "course"),
        }
    }
}

/// Something an employee can be matched against.
pub trait MatchTarget {
    fn target_id(&self) -> &str;
    fn target_title(&self) -> &str;
    fn target_kind(&self) -> TargetKind;
    /// Skills the target asks for (a project's requirements, a course's outcomes)
    fn target_skills(&self) -> &SkillSet;
    fn stored_embedding(&self) -> Option<&[f32]>;
    fn document_text(&self) -> String;
}

impl MatchTarget for Project {
    fn target_id(&self) -> &str {
        &self.id
    }

    fn target_title(&self) -> &str {
        &self.title
    }

    fn target_kind(&self) -> TargetKind {
        TargetKind::Project
    }

    fn target_skills(&self) -> &SkillSet {
        &self.required_skills
    }

    fn stored_embedding(&self) -> Option<&[f32]> {
        self.embedding.as_deref()
    }

    fn document_text(&self) -> String {
        Project::document_text(self)
    }
}

impl MatchTarget for Course {
    fn target_id(&self) -> &str {
        &self.id
    }

    fn target_title(&self) -> &str {
        &self.title
    }

    fn target_kind(&self) -> TargetKind {
        TargetKind::Course
    }

    fn target_skills(&self) -> &SkillSet {
        &self.skills
    }

    fn stored_embedding(&self) -> Option<&[f32]> {
        self.embedding.as_deref()
    }

    fn document_text(&self) -> String {
        Course::document_text(self)
    }
}

/// Scored pairing of one employee with one project or course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub employee_id: String,
    pub target_id: String,
    pub target_kind: TargetKind,
    pub target_title: String,
    pub semantic_score: f32,
    pub overlap_score: f32,
    pub overall_score: f32,
    pub overlapping_skills: Vec<String>,
    pub missing_skills: Vec<String>,
}

/// Required-vs-possessed breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillOverlap {
    pub overlapping: SkillSet,
    pub missing: SkillSet,
    /// `|possessed ∩ required| / |required|`, 1.0 when nothing is required
    pub score: f32,
}

pub fn skill_overlap(possessed: &SkillSet, required: &SkillSet) -> SkillOverlap {
    let overlapping = required.intersection(possessed);
    let missing = required.difference(possessed);
    let score = if required.is_empty() {
        1.0
    } else {
        overlapping.len() as f32 / required.len() as f32
    };

    SkillOverlap {
        overlapping,
        missing,
        score,
    }
}

pub fn validate_top_k(top_k: usize) -> Result<()> {
    if top_k == 0 {
        return Err(TalentMatcherError::InvalidInput("top_k must be positive".to_string()));
    }
    Ok(())
}

/// Result ordering: overall score descending, then target id, then employee id.
pub fn compare_results(a: &MatchResult, b: &MatchResult) -> Ordering {
    b.overall_score
        .total_cmp(&a.overall_score)
        .then_with(|| a.target_id.cmp(&b.target_id))
        .then_with(|| a.employee_id.cmp(&b.employee_id))
}

/// Sort with [`compare_results`] and keep the best `top_k`.
pub fn rank_results(mut results: Vec<MatchResult>, top_k: usize) -> Vec<MatchResult> {
    results.sort_by(compare_results);
    results.truncate(top_k);
    results
}

/// Stored vector, or one derived from the entity's text. Never written back.
pub fn resolve_embedding<'a>(
    embedder: &dyn Embedder,
    stored: Option<&'a [f32]>,
    text: impl FnOnce() -> String,
    target: &str,
) -> Result<Cow<'a, [f32]>> {
    let vector = match stored {
        Some(vector) => Cow::Borrowed(vector),
        None => {
            debug!("No stored embedding for {}, embedding document text", target);
            Cow::Owned(embed_for(embedder, &text(), target)?)
        }
    };
    check_dimension(embedder, &vector)?;
    Ok(vector)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MatchScorer {
    weights: ScoringWeights,
}

impl MatchScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn from_config(config: &ScoringConfig) -> Result<Self> {
        Ok(Self::new(ScoringWeights::new(config.semantic_weight)?))
    }

    pub fn weights(&self) -> ScoringWeights {
        self.weights
    }

    /// Score one pairing given its semantic score in [0, 1].
    pub fn score_pair<T: MatchTarget + ?Sized>(
        &self,
        employee: &EmployeeProfile,
        target: &T,
        semantic_score: f32,
    ) -> MatchResult {
        let semantic_score = semantic_score.clamp(0.0, 1.0);
        let overlap = skill_overlap(&employee.skills, target.target_skills());
        let overall_score = self.weights.combine(semantic_score, overlap.score);

        debug!(
            "{} vs {} {}: semantic={:.3} overlap={:.3} overall={:.3}",
            employee.id,
            target.target_kind(),
            target.target_id(),
            semantic_score,
            overlap.score,
            overall_score
        );

        MatchResult {
            employee_id: employee.id.clone(),
            target_id: target.target_id().to_string(),
            target_kind: target.target_kind(),
            target_title: target.target_title().to_string(),
            semantic_score,
            overlap_score: overlap.score,
            overall_score,
            overlapping_skills: overlap.overlapping.to_vec(),
            missing_skills: overlap.missing.to_vec(),
        }
    }

    /// Score an explicit candidate list, computing cosine similarity directly.
    ///
    /// Candidates without a stored embedding are embedded from their document
    /// text. Any embedding failure fails the whole call.
    pub fn match_candidates<T: MatchTarget>(
        &self,
        employee: &EmployeeProfile,
        candidates: &[T],
        top_k: usize,
        embedder: &dyn Embedder,
    ) -> Result<Vec<MatchResult>> {
        validate_top_k(top_k)?;
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let employee_vector = resolve_embedding(
            embedder,
            employee.embedding.as_deref(),
            || employee.document_text(),
            &format!("employee {}", employee.id),
        )?;

        let mut results = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let candidate_vector = resolve_embedding(
                embedder,
                candidate.stored_embedding(),
                || candidate.document_text(),
                &format!("{} {}", candidate.target_kind(), candidate.target_id()),
            )?;
            let cosine = cosine_similarity(&employee_vector, &candidate_vector)?;
            results.push(self.score_pair(employee, candidate, rescale_similarity(cosine)));
        }

        Ok(rank_results(results, top_k))
    }
}
