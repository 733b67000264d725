//! Skill gap analysis and course recommendations

use crate::catalog::{Course, CourseStore, EmployeeProfile, IndexHit, Project, VectorIndex};
use crate::config::ScoringConfig;
use crate::error::{EntityKind, Result, TalentMatcherError};
use crate::processing::embeddings::{embed_for, rescale_similarity, Embedder};
use crate::processing::scorer::skill_overlap;
use crate::processing::skills::{SkillCategory, SkillSet};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GapSettings {
    pub courses_per_gap: usize,
    pub candidate_pool: usize,
    pub skill_similarity_threshold: f32,
}

impl Default for GapSettings {
    fn default() -> Self {
        Self::from(&ScoringConfig::default())
    }
}

impl From<&ScoringConfig> for GapSettings {
    fn from(config: &ScoringConfig) -> Self {
        Self {
            courses_per_gap: config.courses_per_gap,
            candidate_pool: config.course_candidate_pool.max(config.courses_per_gap),
            skill_similarity_threshold: config.skill_similarity_threshold,
        }
    }
}

/// One course suggested for one missing skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseSuggestion {
    pub course_id: String,
    pub title: String,
    pub semantic_score: f32,
}

/// A recommended course, listed once with every missing skill it addresses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRecommendation {
    pub course_id: String,
    pub title: String,
    pub provider: String,
    pub url: String,
    /// Best semantic score over the skills it addresses
    pub semantic_score: f32,
    pub addresses: Vec<String>,
    /// Prerequisites the employee does not hold yet
    pub missing_prerequisites: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillRecommendations {
    /// Ranked suggestions per missing skill; a skill without courses maps to an empty list
    pub per_skill: BTreeMap<String, Vec<CourseSuggestion>>,
    pub courses: Vec<CourseRecommendation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapReport {
    pub employee_id: String,
    /// `None` for a gap against the union of all project requirements
    pub project_id: Option<String>,
    pub project_title: Option<String>,
    pub overlap_score: f32,
    pub overlapping_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub recommendations: BTreeMap<String, Vec<CourseSuggestion>>,
    pub courses: Vec<CourseRecommendation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_categories: Option<BTreeMap<SkillCategory, Vec<String>>>,
}

/// Derives missing skills and maps each one to nearby courses.
pub struct GapAnalyzer<'a> {
    embedder: &'a dyn Embedder,
    course_index: &'a dyn VectorIndex,
    courses: &'a dyn CourseStore,
    settings: GapSettings,
}

impl<'a> GapAnalyzer<'a> {
    pub fn new(
        embedder: &'a dyn Embedder,
        course_index: &'a dyn VectorIndex,
        courses: &'a dyn CourseStore,
        settings: GapSettings,
    ) -> Self {
        Self {
            embedder,
            course_index,
            courses,
            settings,
        }
    }

    pub fn analyze_gap(&self, employee: &EmployeeProfile, project: &Project) -> Result<GapReport> {
        let overlap = skill_overlap(&employee.skills, &project.required_skills);
        info!(
            "Gap for {} on {}: {} missing of {} required",
            employee.id,
            project.id,
            overlap.missing.len(),
            project.required_skills.len()
        );

        let recommendations = self.recommend_for_skills(&employee.skills, &overlap.missing)?;

        Ok(GapReport {
            employee_id: employee.id.clone(),
            project_id: Some(project.id.clone()),
            project_title: Some(project.title.clone()),
            overlap_score: overlap.score,
            overlapping_skills: overlap.overlapping.to_vec(),
            missing_skills: overlap.missing.to_vec(),
            recommendations: recommendations.per_skill,
            courses: recommendations.courses,
            skill_categories: None,
        })
    }

    /// Gap against an arbitrary requirement set, e.g. every project's requirements combined.
    pub fn analyze_requirements(
        &self,
        employee: &EmployeeProfile,
        required: &SkillSet,
    ) -> Result<GapReport> {
        let overlap = skill_overlap(&employee.skills, required);
        let recommendations = self.recommend_for_skills(&employee.skills, &overlap.missing)?;

        Ok(GapReport {
            employee_id: employee.id.clone(),
            project_id: None,
            project_title: None,
            overlap_score: overlap.score,
            overlapping_skills: overlap.overlapping.to_vec(),
            missing_skills: overlap.missing.to_vec(),
            recommendations: recommendations.per_skill,
            courses: recommendations.courses,
            skill_categories: None,
        })
    }

    /// Course suggestions for each skill in `missing`.
    ///
    /// Each skill is embedded on its own and the index is asked for its nearest
    /// courses; only courses teaching that skill (or a close token) are kept.
    pub fn recommend_for_skills(
        &self,
        possessed: &SkillSet,
        missing: &SkillSet,
    ) -> Result<SkillRecommendations> {
        let mut per_skill = BTreeMap::new();
        let mut merged: BTreeMap<String, CourseRecommendation> = BTreeMap::new();

        for skill in missing.iter() {
            let suggestions = self.courses_for_skill(skill, possessed, &mut merged)?;
            if suggestions.is_empty() {
                warn!("No course in the catalog teaches '{}'", skill);
            }
            per_skill.insert(skill.to_string(), suggestions);
        }

        let mut courses: Vec<CourseRecommendation> = merged.into_values().collect();
        courses.sort_by(|a, b| {
            b.addresses
                .len()
                .cmp(&a.addresses.len())
                .then_with(|| b.semantic_score.total_cmp(&a.semantic_score))
                .then_with(|| a.course_id.cmp(&b.course_id))
        });

        Ok(SkillRecommendations { per_skill, courses })
    }

    fn courses_for_skill(
        &self,
        skill: &str,
        possessed: &SkillSet,
        merged: &mut BTreeMap<String, CourseRecommendation>,
    ) -> Result<Vec<CourseSuggestion>> {
        let target = format!("missing skill {}", skill);
        let vector = embed_for(self.embedder, skill, &target)?;

        let pool = self.settings.candidate_pool;
        let hits = self.nearest_courses(&vector, pool, &target)?;
        let exhausted = hits.len() < pool;
        let mut candidates = self.courses_teaching(skill, hits)?;

        // Courses teaching the skill may sit past the semantic pool.
        if candidates.len() < self.settings.courses_per_gap && !exhausted {
            let size = self.course_index.len().map_err(|e| {
                TalentMatcherError::dependency("vector_index.len", target.as_str(), e)
            })?;
            if size > pool {
                debug!("Widening course search for '{}' to all {} courses", skill, size);
                let hits = self.nearest_courses(&vector, size, &target)?;
                candidates = self.courses_teaching(skill, hits)?;
            }
        }

        candidates.sort_by(|(a, a_score), (b, b_score)| {
            b_score.total_cmp(a_score).then_with(|| a.id.cmp(&b.id))
        });
        candidates.truncate(self.settings.courses_per_gap);

        let mut suggestions = Vec::with_capacity(candidates.len());
        for (course, semantic_score) in candidates {
            suggestions.push(CourseSuggestion {
                course_id: course.id.clone(),
                title: course.title.clone(),
                semantic_score,
            });

            let entry = merged.entry(course.id.clone()).or_insert_with(|| CourseRecommendation {
                course_id: course.id.clone(),
                title: course.title.clone(),
                provider: course.provider.clone(),
                url: course.url.clone(),
                semantic_score,
                addresses: Vec::new(),
                missing_prerequisites: course.prerequisites.difference(possessed).to_vec(),
            });
            entry.semantic_score = entry.semantic_score.max(semantic_score);
            entry.addresses.push(skill.to_string());
        }

        Ok(suggestions)
    }

    fn nearest_courses(&self, vector: &[f32], top_k: usize, target: &str) -> Result<Vec<IndexHit>> {
        self.course_index
            .query(vector, top_k)
            .map_err(|e| TalentMatcherError::dependency("vector_index.query", target, e))
    }

    /// Courses among `hits` teaching `skill`, with their rescaled similarity.
    fn courses_teaching(&self, skill: &str, hits: Vec<IndexHit>) -> Result<Vec<(Course, f32)>> {
        let mut candidates: Vec<(Course, f32)> = Vec::new();
        for hit in hits {
            let course = self
                .courses
                .get(&hit.id)
                .map_err(|e| {
                    TalentMatcherError::dependency("course_store.get", hit.id.as_str(), e)
                })?
                .ok_or_else(|| {
                    TalentMatcherError::not_found(EntityKind::Course, hit.id.as_str())
                })?;

            if !course.skills.covers(skill, self.settings.skill_similarity_threshold) {
                debug!("Course {} does not teach '{}', skipped", course.id, skill);
                continue;
            }
            if candidates.iter().any(|(c, _)| c.id == course.id) {
                continue;
            }
            candidates.push((course, rescale_similarity(hit.similarity)));
        }
        Ok(candidates)
    }
}
