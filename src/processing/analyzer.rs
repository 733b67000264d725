//! Matching engine tying catalog stores, vector indexes and the embedder together

use crate::catalog::{
    CatalogIndexes, Course, CourseStore, EmployeeProfile, EmployeeStore, InMemoryCatalog, IndexHit,
    Project, ProjectStore, VectorIndex,
};
use crate::config::ScoringConfig;
use crate::error::{EntityKind, Result, TalentMatcherError};
use crate::processing::career::{CareerPath, CareerPathComposer, SkillTaxonomy};
use crate::processing::embeddings::{rescale_similarity, Embedder};
use crate::processing::gap_analyzer::{GapAnalyzer, GapReport, GapSettings};
use crate::processing::scorer::{
    rank_results, resolve_embedding, validate_top_k, MatchResult, MatchScorer, MatchTarget,
    ScoringWeights,
};
use crate::processing::skills::{categorize_skills, SkillSet};
use log::info;
use std::sync::Arc;

/// Number of project matches attached to a career path.
const CAREER_PATH_MATCHES: usize = 3;

/// External collaborators the engine reads from.
#[derive(Clone)]
pub struct Collaborators {
    pub employees: Arc<dyn EmployeeStore>,
    pub projects: Arc<dyn ProjectStore>,
    pub courses: Arc<dyn CourseStore>,
    pub employee_index: Arc<dyn VectorIndex>,
    pub project_index: Arc<dyn VectorIndex>,
    pub course_index: Arc<dyn VectorIndex>,
    pub embedder: Arc<dyn Embedder>,
}

/// Read-only matching engine. Holds no mutable state, so one instance can be
/// shared across threads and tasks.
#[derive(Clone)]
pub struct TalentMatcher {
    collaborators: Collaborators,
    scorer: MatchScorer,
    config: ScoringConfig,
    taxonomy: SkillTaxonomy,
}

impl TalentMatcher {
    pub fn new(
        collaborators: Collaborators,
        config: &ScoringConfig,
        taxonomy: SkillTaxonomy,
    ) -> Result<Self> {
        let weights = ScoringWeights::new(config.semantic_weight)?;
        config.validate()?;

        Ok(Self {
            collaborators,
            scorer: MatchScorer::new(weights),
            config: config.clone(),
            taxonomy,
        })
    }

    /// Engine over an in-memory catalog and the indexes built from it.
    /// Falls back to the built-in engineering ladder when the catalog has no taxonomy.
    pub fn from_catalog(
        catalog: InMemoryCatalog,
        indexes: CatalogIndexes,
        embedder: Arc<dyn Embedder>,
        config: &ScoringConfig,
    ) -> Result<Self> {
        let taxonomy = catalog.taxonomy().cloned().unwrap_or_default();
        let catalog = Arc::new(catalog);

        let collaborators = Collaborators {
            employees: catalog.clone(),
            projects: catalog.clone(),
            courses: catalog,
            employee_index: Arc::new(indexes.employees),
            project_index: Arc::new(indexes.projects),
            course_index: Arc::new(indexes.courses),
            embedder,
        };
        Self::new(collaborators, config, taxonomy)
    }

    /// Same engine with a different semantic weight α.
    pub fn with_semantic_weight(&self, semantic_weight: f32) -> Result<Self> {
        let weights = ScoringWeights::new(semantic_weight)?;
        let mut matcher = self.clone();
        matcher.scorer = MatchScorer::new(weights);
        matcher.config.semantic_weight = semantic_weight;
        Ok(matcher)
    }

    pub fn weights(&self) -> ScoringWeights {
        self.scorer.weights()
    }

    pub fn taxonomy(&self) -> &SkillTaxonomy {
        &self.taxonomy
    }

    /// Name of the model behind the embedder.
    pub fn embedding_model(&self) -> &str {
        self.collaborators.embedder.model_name()
    }

    /// Rank every indexed project for an employee.
    pub fn match_employee_to_projects(
        &self,
        employee_id: &str,
        top_k: usize,
    ) -> Result<Vec<MatchResult>> {
        validate_top_k(top_k)?;
        let employee = self.employee(employee_id)?;
        let index = self.collaborators.project_index.as_ref();
        let results = self.match_indexed(&employee, index, top_k, |id| self.project(id))?;

        info!("Matched employee {} to {} project(s)", employee.id, results.len());
        Ok(results)
    }

    /// Rank an explicit list of projects, scoring each pair directly.
    pub fn match_employee_to_project_list(
        &self,
        employee_id: &str,
        project_ids: &[String],
        top_k: usize,
    ) -> Result<Vec<MatchResult>> {
        validate_top_k(top_k)?;
        let employee = self.employee(employee_id)?;
        let projects = project_ids
            .iter()
            .map(|id| self.project(id))
            .collect::<Result<Vec<Project>>>()?;

        self.scorer
            .match_candidates(&employee, &projects, top_k, self.collaborators.embedder.as_ref())
    }

    /// Rank every indexed course for an employee, a course's taught skills
    /// standing in for the requirement set.
    pub fn match_employee_to_courses(
        &self,
        employee_id: &str,
        top_k: usize,
    ) -> Result<Vec<MatchResult>> {
        validate_top_k(top_k)?;
        let employee = self.employee(employee_id)?;
        let index = self.collaborators.course_index.as_ref();
        let results = self.match_indexed(&employee, index, top_k, |id| self.course(id))?;

        info!("Matched employee {} to {} course(s)", employee.id, results.len());
        Ok(results)
    }

    /// Rank every indexed employee for a project.
    pub fn match_project_to_employees(
        &self,
        project_id: &str,
        top_k: usize,
    ) -> Result<Vec<MatchResult>> {
        validate_top_k(top_k)?;
        let project = self.project(project_id)?;
        let index = self.collaborators.employee_index.as_ref();
        let target = format!("project {}", project.id);
        let size = index_size(index, &target)?;
        if size == 0 {
            return Ok(Vec::new());
        }

        let vector = resolve_embedding(
            self.collaborators.embedder.as_ref(),
            project.embedding.as_deref(),
            || project.document_text(),
            &target,
        )?;

        let mut results = Vec::new();
        for hit in nearest(index, size, &vector, &target)? {
            let employee = self.employee(&hit.id)?;
            let semantic = rescale_similarity(hit.similarity);
            results.push(self.scorer.score_pair(&employee, &project, semantic));
        }

        let results = rank_results(results, top_k);
        info!("Matched project {} to {} employee(s)", project.id, results.len());
        Ok(results)
    }

    pub fn analyze_skill_gap(&self, employee_id: &str, project_id: &str) -> Result<GapReport> {
        let employee = self.employee(employee_id)?;
        let project = self.project(project_id)?;
        self.gap_analyzer().analyze_gap(&employee, &project)
    }

    /// Gap against the requirements of every project in the catalog.
    pub fn analyze_general_gap(&self, employee_id: &str) -> Result<GapReport> {
        let employee = self.employee(employee_id)?;
        let required = self
            .all_projects()?
            .iter()
            .fold(SkillSet::new(), |acc, project| acc.union(&project.required_skills));

        let mut report = self.gap_analyzer().analyze_requirements(&employee, &required)?;
        report.skill_categories = Some(categorize_skills(&employee.skills));
        Ok(report)
    }

    pub fn career_path(&self, employee_id: &str) -> Result<CareerPath> {
        let employee = self.employee(employee_id)?;
        let gap_analyzer = self.gap_analyzer();
        let composer = CareerPathComposer::new(
            &gap_analyzer,
            (self.config.growth_band_min, self.config.growth_band_max),
        );

        let mut path = composer.suggest_career_path(&employee, &self.taxonomy)?;
        path.growth_projects = composer.growth_projects(&employee, &self.all_projects()?);
        path.current_matches = self.match_employee_to_projects(employee_id, CAREER_PATH_MATCHES)?;
        Ok(path)
    }

    fn match_indexed<T: MatchTarget>(
        &self,
        employee: &EmployeeProfile,
        index: &dyn VectorIndex,
        top_k: usize,
        fetch: impl Fn(&str) -> Result<T>,
    ) -> Result<Vec<MatchResult>> {
        let target = format!("employee {}", employee.id);
        let size = index_size(index, &target)?;
        if size == 0 {
            return Ok(Vec::new());
        }

        let vector = resolve_embedding(
            self.collaborators.embedder.as_ref(),
            employee.embedding.as_deref(),
            || employee.document_text(),
            &target,
        )?;

        let mut results = Vec::new();
        for hit in nearest(index, size, &vector, &target)? {
            let candidate = fetch(&hit.id)?;
            let semantic = rescale_similarity(hit.similarity);
            results.push(self.scorer.score_pair(employee, &candidate, semantic));
        }
        Ok(rank_results(results, top_k))
    }

    fn gap_analyzer(&self) -> GapAnalyzer<'_> {
        GapAnalyzer::new(
            self.collaborators.embedder.as_ref(),
            self.collaborators.course_index.as_ref(),
            self.collaborators.courses.as_ref(),
            GapSettings::from(&self.config),
        )
    }

    fn employee(&self, id: &str) -> Result<EmployeeProfile> {
        lookup(self.collaborators.employees.get(id), "employee_store.get", EntityKind::Employee, id)
    }

    fn project(&self, id: &str) -> Result<Project> {
        lookup(self.collaborators.projects.get(id), "project_store.get", EntityKind::Project, id)
    }

    fn course(&self, id: &str) -> Result<Course> {
        lookup(self.collaborators.courses.get(id), "course_store.get", EntityKind::Course, id)
    }

    fn all_projects(&self) -> Result<Vec<Project>> {
        self.collaborators
            .projects
            .list()
            .map_err(|e| TalentMatcherError::dependency("project_store.list", "projects", e))
    }
}

/// Every indexed entry ordered by similarity. Final ranking uses the overall
/// score, so the whole index is scored rather than its semantic top_k.
fn nearest(
    index: &dyn VectorIndex,
    size: usize,
    vector: &[f32],
    target: &str,
) -> Result<Vec<IndexHit>> {
    index
        .query(vector, size)
        .map_err(|e| TalentMatcherError::dependency("vector_index.query", target, e))
}

fn index_size(index: &dyn VectorIndex, target: &str) -> Result<usize> {
    index
        .len()
        .map_err(|e| TalentMatcherError::dependency("vector_index.len", target, e))
}

fn lookup<T>(
    found: anyhow::Result<Option<T>>,
    operation: &'static str,
    kind: EntityKind,
    id: &str,
) -> Result<T> {
    found
        .map_err(|e| TalentMatcherError::dependency(operation, id, e))?
        .ok_or_else(|| TalentMatcherError::not_found(kind, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryVectorIndex;
    use crate::processing::embeddings::testing::FixedEmbedder;
    use crate::processing::scorer::TargetKind;
    use crate::processing::skills::{normalize_set, SkillCategory};
    use serde_json::{json, Value};

    fn employee(id: &str, skills: &[&str], embedding: Vec<f32>) -> EmployeeProfile {
        EmployeeProfile {
            id: id.to_string(),
            name: id.to_uppercase(),
            skills: normalize_set(skills),
            preferences: Vec::new(),
            resume_text: String::new(),
            embedding: Some(embedding),
        }
    }

    fn project(id: &str, skills: &[&str], embedding: Vec<f32>) -> Project {
        Project {
            id: id.to_string(),
            title: format!("Project {id}"),
            required_skills: normalize_set(skills),
            team_size: 4,
            description: String::new(),
            embedding: Some(embedding),
        }
    }

    fn course(id: &str, skills: &[&str], embedding: Vec<f32>) -> Course {
        Course {
            id: id.to_string(),
            title: format!("Course {id}"),
            skills: normalize_set(skills),
            prerequisites: SkillSet::new(),
            provider: "Academy".to_string(),
            url: String::new(),
            description: String::new(),
            embedding: Some(embedding),
        }
    }

    fn embedder() -> Arc<dyn Embedder> {
        Arc::new(
            FixedEmbedder::new(2)
                .with("docker", vec![0.6, 0.8])
                .with("swift", vec![0.0, 1.0])
                .with("kotlin", vec![0.0, 1.0])
                .with("git", vec![1.0, 0.0]),
        )
    }

    fn catalog() -> InMemoryCatalog {
        let mut catalog = InMemoryCatalog::new();
        catalog.add_employee(employee("e1", &["python", "sql"], vec![1.0, 0.0])).unwrap();
        catalog
            .add_employee(employee("e2", &["python", "sql", "docker"], vec![0.6, 0.8]))
            .unwrap();
        catalog.add_employee(employee("e3", &["swift"], vec![0.0, 1.0])).unwrap();
        catalog
            .add_project(project("p1", &["python", "sql", "docker"], vec![0.6, 0.8]))
            .unwrap();
        catalog.add_project(project("p2", &["sql"], vec![1.0, 0.0])).unwrap();
        catalog.add_project(project("p3", &["swift", "kotlin"], vec![0.0, 1.0])).unwrap();
        catalog.add_course(course("c1", &["docker"], vec![0.6, 0.8])).unwrap();
        catalog.add_course(course("c2", &["swift"], vec![0.0, 1.0])).unwrap();
        catalog
    }

    fn matcher_for(catalog: InMemoryCatalog) -> TalentMatcher {
        let embedder = embedder();
        let indexes = catalog.build_indexes(embedder.as_ref()).unwrap();
        TalentMatcher::from_catalog(catalog, indexes, embedder, &ScoringConfig::default()).unwrap()
    }

    fn ids(results: &[MatchResult], field: fn(&MatchResult) -> &str) -> Vec<String> {
        results.iter().map(|r| field(r).to_string()).collect()
    }

    #[test]
    fn test_match_employee_to_projects() {
        let matcher = matcher_for(catalog());
        let results = matcher.match_employee_to_projects("e1", 5).unwrap();

        assert_eq!(ids(&results, |r| r.target_id.as_str()), vec!["p2", "p1", "p3"]);
        let p1 = &results[1];
        assert!((p1.semantic_score - 0.8).abs() < 1e-5);
        assert!((p1.overlap_score - 2.0 / 3.0).abs() < 1e-5);
        assert!((p1.overall_score - 0.7467).abs() < 1e-3);
        assert_eq!(p1.missing_skills, vec!["docker"]);
        assert_eq!(p1.target_kind, TargetKind::Project);

        let top = matcher.match_employee_to_projects("e1", 1).unwrap();
        assert_eq!(ids(&top, |r| r.target_id.as_str()), vec!["p2"]);
    }

    #[test]
    fn test_match_is_idempotent() {
        let matcher = matcher_for(catalog());
        let first = matcher.match_employee_to_projects("e2", 3).unwrap();
        let second = matcher.match_employee_to_projects("e2", 3).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_top_k_checked_before_lookup() {
        let matcher = matcher_for(catalog());
        let err = matcher.match_employee_to_projects("nobody", 0).unwrap_err();
        assert!(matches!(err, TalentMatcherError::InvalidInput(_)));

        let err = matcher.match_employee_to_projects("nobody", 3).unwrap_err();
        assert!(matches!(
            err,
            TalentMatcherError::NotFound {
                kind: EntityKind::Employee,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_project_catalog_returns_nothing() {
        let mut catalog = InMemoryCatalog::new();
        catalog.add_employee(employee("e1", &["python"], vec![1.0, 0.0])).unwrap();
        let matcher = matcher_for(catalog);

        assert!(matcher.match_employee_to_projects("e1", 5).unwrap().is_empty());
        assert!(matcher.match_employee_to_courses("e1", 5).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_weight_rejected() {
        let catalog = catalog();
        let embedder = embedder();
        let indexes = catalog.build_indexes(embedder.as_ref()).unwrap();
        let config = ScoringConfig {
            semantic_weight: 1.5,
            ..ScoringConfig::default()
        };

        let err = TalentMatcher::from_catalog(catalog, indexes, embedder, &config).err().unwrap();
        assert!(matches!(err, TalentMatcherError::InvalidInput(_)));

        let matcher = matcher_for(self::catalog());
        assert!(matcher.with_semantic_weight(-0.1).is_err());
        assert_eq!(matcher.embedding_model(), "fixed");
    }

    #[test]
    fn test_semantic_weight_override() {
        let matcher = matcher_for(catalog()).with_semantic_weight(1.0).unwrap();
        for result in matcher.match_employee_to_projects("e1", 5).unwrap() {
            assert!((result.overall_score - result.semantic_score).abs() < 1e-6);
        }
        assert_eq!(matcher.weights().semantic_weight(), 1.0);
    }

    #[test]
    fn test_match_employee_to_courses() {
        let matcher = matcher_for(catalog());
        let results = matcher.match_employee_to_courses("e2", 2).unwrap();

        assert_eq!(ids(&results, |r| r.target_id.as_str()), vec!["c1", "c2"]);
        assert_eq!(results[0].target_kind, TargetKind::Course);
        assert!((results[0].overall_score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_match_project_list() {
        let matcher = matcher_for(catalog());
        let list = vec!["p3".to_string(), "p1".to_string()];
        let results = matcher.match_employee_to_project_list("e1", &list, 5).unwrap();
        assert_eq!(ids(&results, |r| r.target_id.as_str()), vec!["p1", "p3"]);

        let missing = vec!["p9".to_string()];
        let err = matcher.match_employee_to_project_list("e1", &missing, 5).unwrap_err();
        assert!(matches!(
            err,
            TalentMatcherError::NotFound {
                kind: EntityKind::Project,
                ..
            }
        ));
    }

    #[test]
    fn test_match_project_to_employees() {
        let matcher = matcher_for(catalog());
        let results = matcher.match_project_to_employees("p1", 5).unwrap();

        assert_eq!(ids(&results, |r| r.employee_id.as_str()), vec!["e2", "e1", "e3"]);
        assert!(results.iter().all(|r| r.target_id == "p1"));
        assert!((results[2].overall_score - 0.54).abs() < 1e-4);
    }

    #[test]
    fn test_analyze_skill_gap() {
        let matcher = matcher_for(catalog());
        let report = matcher.analyze_skill_gap("e1", "p1").unwrap();

        assert_eq!(report.project_id.as_deref(), Some("p1"));
        assert_eq!(report.missing_skills, vec!["docker"]);
        assert_eq!(report.recommendations["docker"][0].course_id, "c1");
        assert!(report.skill_categories.is_none());

        let err = matcher.analyze_skill_gap("e1", "p9").unwrap_err();
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_analyze_general_gap() {
        let matcher = matcher_for(catalog());
        let report = matcher.analyze_general_gap("e1").unwrap();

        assert_eq!(report.project_id, None);
        assert_eq!(report.missing_skills, vec!["docker", "kotlin", "swift"]);
        assert!((report.overlap_score - 0.4).abs() < 1e-6);
        assert!(report.recommendations["kotlin"].is_empty());
        assert_eq!(report.recommendations["swift"][0].course_id, "c2");

        let categories = report.skill_categories.unwrap();
        assert_eq!(categories[&SkillCategory::Programming], vec!["python"]);
        assert_eq!(categories[&SkillCategory::DataScience], vec!["sql"]);
    }

    #[test]
    fn test_career_path() {
        let matcher = matcher_for(catalog());
        let path = matcher.career_path("e1").unwrap();

        assert_eq!(path.current_tier, None);
        assert_eq!(path.steps.len(), matcher.taxonomy().tiers.len());
        assert_eq!(path.steps[0].delta_skills, vec!["git"]);
        assert!(path.next_step_courses.per_skill["git"].is_empty());

        let growth: Vec<&str> =
            path.growth_projects.iter().map(|g| g.project_id.as_str()).collect();
        assert_eq!(growth, vec!["p1"]);
        assert_eq!(ids(&path.current_matches, |r| r.target_id.as_str()), vec!["p2", "p1", "p3"]);
    }

    struct FailingIndex;

    impl VectorIndex for FailingIndex {
        fn query(&self, _vector: &[f32], _top_k: usize) -> anyhow::Result<Vec<IndexHit>> {
            anyhow::bail!("connection refused")
        }

        fn upsert(&self, _id: &str, _vector: Vec<f32>, _metadata: Value) -> anyhow::Result<()> {
            anyhow::bail!("read only")
        }

        fn len(&self) -> anyhow::Result<usize> {
            Ok(1)
        }
    }

    /// Index whose size cannot be read, like a poisoned in-memory index.
    struct UncountableIndex;

    impl VectorIndex for UncountableIndex {
        fn query(&self, _vector: &[f32], _top_k: usize) -> anyhow::Result<Vec<IndexHit>> {
            Ok(Vec::new())
        }

        fn upsert(&self, _id: &str, _vector: Vec<f32>, _metadata: Value) -> anyhow::Result<()> {
            anyhow::bail!("read only")
        }

        fn len(&self) -> anyhow::Result<usize> {
            anyhow::bail!("vector index lock poisoned")
        }
    }

    fn collaborators(project_index: Arc<dyn VectorIndex>) -> Collaborators {
        let catalog = Arc::new(catalog());
        Collaborators {
            employees: catalog.clone(),
            projects: catalog.clone(),
            courses: catalog,
            employee_index: Arc::new(InMemoryVectorIndex::new()),
            project_index,
            course_index: Arc::new(InMemoryVectorIndex::new()),
            embedder: embedder(),
        }
    }

    #[test]
    fn test_index_failure_fails_whole_match() {
        let matcher = TalentMatcher::new(
            collaborators(Arc::new(FailingIndex)),
            &ScoringConfig::default(),
            SkillTaxonomy::default(),
        )
        .unwrap();

        let err = matcher.match_employee_to_projects("e1", 3).unwrap_err();
        assert!(err.is_retryable());
        match err {
            TalentMatcherError::DependencyFailure { operation, target, .. } => {
                assert_eq!(operation, "vector_index.query");
                assert_eq!(target, "employee e1");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unreadable_index_size_is_a_dependency_failure() {
        let matcher = TalentMatcher::new(
            collaborators(Arc::new(UncountableIndex)),
            &ScoringConfig::default(),
            SkillTaxonomy::default(),
        )
        .unwrap();

        let err = matcher.match_employee_to_projects("e1", 3).unwrap_err();
        match err {
            TalentMatcherError::DependencyFailure { operation, target, .. } => {
                assert_eq!(operation, "vector_index.len");
                assert_eq!(target, "employee e1");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_index_hit_unknown_to_store() {
        let index = InMemoryVectorIndex::new();
        index.upsert("p-ghost", vec![1.0, 0.0], json!({})).unwrap();
        let matcher = TalentMatcher::new(
            collaborators(Arc::new(index)),
            &ScoringConfig::default(),
            SkillTaxonomy::default(),
        )
        .unwrap();

        let err = matcher.match_employee_to_projects("e1", 3).unwrap_err();
        assert!(matches!(
            err,
            TalentMatcherError::NotFound {
                kind: EntityKind::Project,
                ref id,
            } if id == "p-ghost"
        ));
    }
}
