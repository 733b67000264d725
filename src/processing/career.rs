//! Career path suggestions from a tiered skill taxonomy

use crate::catalog::{EmployeeProfile, Project};
use crate::error::{Result, TalentMatcherError};
use crate::processing::gap_analyzer::{GapAnalyzer, SkillRecommendations};
use crate::processing::scorer::{skill_overlap, MatchResult};
use crate::processing::skills::{categorize_skills, normalize_set, SkillCategory, SkillSet};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleTier {
    pub name: String,
    /// Minimum skill set for the role
    pub required_skills: SkillSet,
}

/// Role tiers, ordered from entry level upwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillTaxonomy {
    pub tiers: Vec<RoleTier>,
}

impl SkillTaxonomy {
    pub fn new(tiers: Vec<RoleTier>) -> Result<Self> {
        if tiers.is_empty() {
            return Err(TalentMatcherError::InvalidInput("skill taxonomy has no tiers".to_string()));
        }
        Ok(Self { tiers })
    }

    /// Built-in software engineering ladder.
    pub fn default_engineering() -> Self {
        let tier = |name: &str, skills: &[&str]| RoleTier {
            name: name.to_string(),
            required_skills: normalize_set(skills),
        };

        Self {
            tiers: vec![
                tier("Junior Engineer", &["git"]),
                tier("Software Engineer", &["git", "sql", "rest api", "testing"]),
                tier(
                    "Senior Software Engineer",
                    &["git", "sql", "rest api", "testing", "docker", "ci/cd", "system design"],
                ),
                tier(
                    "Staff Engineer",
                    &[
                        "git",
                        "sql",
                        "rest api",
                        "testing",
                        "docker",
                        "ci/cd",
                        "system design",
                        "kubernetes",
                        "architecture",
                        "mentoring",
                    ],
                ),
            ],
        }
    }

    /// Highest tier whose minimum skill set the employee fully holds.
    pub fn current_tier(&self, skills: &SkillSet) -> Option<usize> {
        self.tiers
            .iter()
            .enumerate()
            .filter(|(_, tier)| tier.required_skills.is_subset(skills))
            .map(|(index, _)| index)
            .last()
    }
}

impl Default for SkillTaxonomy {
    fn default() -> Self {
        Self::default_engineering()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExperienceLevel {
    Junior,
    MidLevel,
    Senior,
    Expert,
}

impl ExperienceLevel {
    /// Breadth-based estimate from the number of distinct skills.
    pub fn from_skill_count(count: usize) -> Self {
        match count {
            0..=4 => ExperienceLevel::Junior,
            5..=14 => ExperienceLevel::MidLevel,
            15..=24 => ExperienceLevel::Senior,
            _ => ExperienceLevel::Expert,
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExperienceLevel::Junior => write!(f, "Junior"),
            ExperienceLevel::MidLevel => write!(f, "Mid-level"),
            ExperienceLevel::Senior => write!(f, "Senior"),
            ExperienceLevel::Expert => write!(f, "Expert"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerStep {
    pub role: String,
    pub tier_index: usize,
    pub delta_skills: Vec<String>,
    pub rationale: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthProject {
    pub project_id: String,
    pub title: String,
    pub overlap_score: f32,
    pub missing_skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerPath {
    pub employee_id: String,
    pub current_tier: Option<String>,
    pub current_tier_index: Option<usize>,
    pub experience_level: ExperienceLevel,
    pub skill_categories: BTreeMap<SkillCategory, Vec<String>>,
    /// Tiers above the current one, nearest first
    pub steps: Vec<CareerStep>,
    /// Courses closing the gap to the next step
    pub next_step_courses: SkillRecommendations,
    pub trajectories: Vec<String>,
    pub growth_projects: Vec<GrowthProject>,
    /// Best project matches at the current skill level
    pub current_matches: Vec<MatchResult>,
}

pub struct CareerPathComposer<'a> {
    gap_analyzer: &'a GapAnalyzer<'a>,
    growth_band: (f32, f32),
}

impl<'a> CareerPathComposer<'a> {
    pub fn new(gap_analyzer: &'a GapAnalyzer<'a>, growth_band: (f32, f32)) -> Self {
        Self {
            gap_analyzer,
            growth_band,
        }
    }

    pub fn suggest_career_path(
        &self,
        employee: &EmployeeProfile,
        taxonomy: &SkillTaxonomy,
    ) -> Result<CareerPath> {
        let possessed = &employee.skills;
        let current = taxonomy.current_tier(possessed);
        let first_above = current.map_or(0, |index| index + 1);

        let steps: Vec<CareerStep> = taxonomy
            .tiers
            .iter()
            .enumerate()
            .skip(first_above)
            .map(|(index, tier)| {
                let delta = skill_overlap(possessed, &tier.required_skills).missing;
                CareerStep {
                    role: tier.name.clone(),
                    tier_index: index,
                    rationale: step_rationale(&tier.name, &delta),
                    delta_skills: delta.to_vec(),
                }
            })
            .collect();

        let next_step_courses = match steps.first() {
            Some(step) => self
                .gap_analyzer
                .recommend_for_skills(possessed, &normalize_set(&step.delta_skills))?,
            None => SkillRecommendations::default(),
        };

        let skill_categories = categorize_skills(possessed);
        let trajectories = suggest_trajectories(&skill_categories);
        let current_tier = current.map(|index| taxonomy.tiers[index].name.clone());

        info!(
            "Career path for {}: current tier {:?}, {} step(s) ahead",
            employee.id,
            current_tier,
            steps.len()
        );

        Ok(CareerPath {
            employee_id: employee.id.clone(),
            current_tier,
            current_tier_index: current,
            experience_level: ExperienceLevel::from_skill_count(possessed.len()),
            skill_categories,
            steps,
            next_step_courses,
            trajectories,
            growth_projects: Vec::new(),
            current_matches: Vec::new(),
        })
    }

    /// Projects the employee partly qualifies for: overlap inside the growth
    /// band, least covered first, at most three.
    pub fn growth_projects(
        &self,
        employee: &EmployeeProfile,
        projects: &[Project],
    ) -> Vec<GrowthProject> {
        let (low, high) = self.growth_band;
        let mut growth: Vec<GrowthProject> = projects
            .iter()
            .filter_map(|project| {
                let overlap = skill_overlap(&employee.skills, &project.required_skills);
                let in_band = overlap.score >= low && overlap.score <= high;
                if project.required_skills.is_empty() || !in_band {
                    return None;
                }
                Some(GrowthProject {
                    project_id: project.id.clone(),
                    title: project.title.clone(),
                    overlap_score: overlap.score,
                    missing_skills: overlap.missing.to_vec(),
                })
            })
            .collect();

        growth.sort_by(|a, b| {
            a.overlap_score
                .total_cmp(&b.overlap_score)
                .then_with(|| a.project_id.cmp(&b.project_id))
        });
        growth.truncate(3);
        growth
    }
}

fn step_rationale(role: &str, delta: &SkillSet) -> String {
    match delta.len() {
        0 => format!("All skills required for {} are already held", role),
        1 => format!("{} requires one more skill: {}", role, delta.to_vec().join(", ")),
        n => format!("{} requires {} more skills: {}", role, n, delta.to_vec().join(", ")),
    }
}

/// Trajectories suggested by the dominant skill areas. Uncategorised skills
/// compete for dominance like any other area.
pub fn suggest_trajectories(categories: &BTreeMap<SkillCategory, Vec<String>>) -> Vec<String> {
    let count = |category: SkillCategory| categories.get(&category).map_or(0, Vec::len);

    let dominant = categories
        .iter()
        .max_by(|(a_cat, a), (b_cat, b)| a.len().cmp(&b.len()).then_with(|| b_cat.cmp(a_cat)))
        .map(|(category, _)| *category);

    let mut trajectories = Vec::new();
    if dominant == Some(SkillCategory::Programming) && count(SkillCategory::Programming) > 3 {
        trajectories.push(
            "Software Engineer → Senior Software Engineer → Tech Lead".to_string(),
        );
    }
    if count(SkillCategory::DataScience) > 2 {
        trajectories.push("Data Analyst → Data Scientist → ML Engineer".to_string());
    }
    if count(SkillCategory::WebDevelopment) > 2 {
        trajectories.push(
            "Frontend Developer → Full-stack Developer → Solutions Architect".to_string(),
        );
    }
    if count(SkillCategory::CloudDevops) > 2 {
        trajectories.push("DevOps Engineer → Cloud Architect → Platform Engineer".to_string());
    }
    if trajectories.is_empty() {
        trajectories.push(
            "General Developer → Specialized Developer → Technical Lead".to_string(),
        );
    }
    trajectories
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Course, InMemoryCatalog, InMemoryVectorIndex, VectorIndex};
    use crate::processing::embeddings::testing::FixedEmbedder;
    use crate::processing::gap_analyzer::GapSettings;
    use serde_json::json;

    fn employee(skills: &[&str]) -> EmployeeProfile {
        EmployeeProfile {
            id: "e1".to_string(),
            name: "Barbara".to_string(),
            skills: normalize_set(skills),
            preferences: Vec::new(),
            resume_text: String::new(),
            embedding: None,
        }
    }

    fn taxonomy() -> SkillTaxonomy {
        SkillTaxonomy::new(vec![
            RoleTier {
                name: "Junior".to_string(),
                required_skills: normalize_set(["git"]),
            },
            RoleTier {
                name: "Mid".to_string(),
                required_skills: normalize_set(["git", "sql"]),
            },
            RoleTier {
                name: "Senior".to_string(),
                required_skills: normalize_set(["git", "sql", "docker", "testing"]),
            },
        ])
        .unwrap()
    }

    struct Fixture {
        catalog: InMemoryCatalog,
        index: InMemoryVectorIndex,
        embedder: FixedEmbedder,
    }

    fn fixture() -> Fixture {
        let mut catalog = InMemoryCatalog::new();
        let index = InMemoryVectorIndex::new();
        catalog
            .add_course(Course {
                id: "c-docker".to_string(),
                title: "Containers 101".to_string(),
                skills: normalize_set(["docker"]),
                prerequisites: SkillSet::new(),
                provider: String::new(),
                url: String::new(),
                description: String::new(),
                embedding: None,
            })
            .unwrap();
        index.upsert("c-docker", vec![1.0, 0.0], json!({})).unwrap();

        let embedder = FixedEmbedder::new(2)
            .with("docker", vec![1.0, 0.0])
            .with("testing", vec![0.0, 1.0])
            .with("sql", vec![0.0, 1.0]);
        Fixture { catalog, index, embedder }
    }

    #[test]
    fn test_current_tier_is_highest_satisfied() {
        let taxonomy = taxonomy();
        assert_eq!(taxonomy.current_tier(&normalize_set(["python"])), None);
        assert_eq!(taxonomy.current_tier(&normalize_set(["git"])), Some(0));
        assert_eq!(taxonomy.current_tier(&normalize_set(["git", "sql", "rust"])), Some(1));
        let held = normalize_set(["git", "sql", "docker", "testing"]);
        assert_eq!(taxonomy.current_tier(&held), Some(2));
    }

    #[test]
    fn test_empty_taxonomy_rejected() {
        assert!(SkillTaxonomy::new(Vec::new()).is_err());
        assert_eq!(SkillTaxonomy::default().tiers.len(), 4);
    }

    #[test]
    fn test_next_step_delta_and_courses() {
        let f = fixture();
        let analyzer = GapAnalyzer::new(&f.embedder, &f.index, &f.catalog, GapSettings::default());
        let composer = CareerPathComposer::new(&analyzer, (0.4, 0.7));

        let path = composer
            .suggest_career_path(&employee(&["git", "sql", "python"]), &taxonomy())
            .unwrap();

        assert_eq!(path.current_tier.as_deref(), Some("Mid"));
        assert_eq!(path.current_tier_index, Some(1));
        assert_eq!(path.steps.len(), 1);
        assert_eq!(path.steps[0].role, "Senior");
        assert_eq!(path.steps[0].delta_skills, vec!["docker", "testing"]);
        assert!(path.steps[0].rationale.contains("2 more skills"));

        assert_eq!(path.next_step_courses.per_skill["docker"][0].course_id, "c-docker");
        assert!(path.next_step_courses.per_skill["testing"].is_empty());
        assert_eq!(path.experience_level, ExperienceLevel::Junior);
    }

    #[test]
    fn test_no_tier_starts_from_bottom() {
        let f = fixture();
        let analyzer = GapAnalyzer::new(&f.embedder, &f.index, &f.catalog, GapSettings::default());
        let composer = CareerPathComposer::new(&analyzer, (0.4, 0.7));
        let git_embedder = FixedEmbedder::new(2).with("git", vec![0.0, 1.0]);
        let analyzer_git =
            GapAnalyzer::new(&git_embedder, &f.index, &f.catalog, GapSettings::default());
        let composer_git = CareerPathComposer::new(&analyzer_git, (0.4, 0.7));

        let path = composer_git.suggest_career_path(&employee(&["python"]), &taxonomy()).unwrap();
        assert_eq!(path.current_tier, None);
        let roles: Vec<&str> = path.steps.iter().map(|s| s.role.as_str()).collect();
        assert_eq!(roles, vec!["Junior", "Mid", "Senior"]);
        assert_eq!(path.steps[0].delta_skills, vec!["git"]);

        let top = composer
            .suggest_career_path(&employee(&["git", "sql", "docker", "testing"]), &taxonomy())
            .unwrap();
        assert!(top.steps.is_empty());
        assert!(top.next_step_courses.per_skill.is_empty());
    }

    #[test]
    fn test_career_path_is_deterministic() {
        let f = fixture();
        let analyzer = GapAnalyzer::new(&f.embedder, &f.index, &f.catalog, GapSettings::default());
        let composer = CareerPathComposer::new(&analyzer, (0.4, 0.7));
        let barbara = employee(&["git", "sql"]);

        let first = composer.suggest_career_path(&barbara, &taxonomy()).unwrap();
        let second = composer.suggest_career_path(&barbara, &taxonomy()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_growth_projects_band_and_order() {
        let f = fixture();
        let analyzer = GapAnalyzer::new(&f.embedder, &f.index, &f.catalog, GapSettings::default());
        let composer = CareerPathComposer::new(&analyzer, (0.4, 0.7));
        let project = |id: &str, skills: &[&str]| Project {
            id: id.to_string(),
            title: id.to_uppercase(),
            required_skills: normalize_set(skills),
            team_size: 2,
            description: String::new(),
            embedding: None,
        };
        let projects = vec![
            project("full", &["git"]),
            project("half", &["git", "docker"]),
            project("low", &["git", "docker", "k8s", "go", "aws"]),
            project("two-thirds", &["git", "sql", "go"]),
            project("also-half", &["sql", "rust"]),
        ];

        let growth = composer.growth_projects(&employee(&["git", "sql"]), &projects);
        let ids: Vec<&str> = growth.iter().map(|g| g.project_id.as_str()).collect();
        assert_eq!(ids, vec!["also-half", "half", "two-thirds"]);
        assert_eq!(growth[1].missing_skills, vec!["docker"]);
    }

    #[test]
    fn test_trajectories() {
        let programmers =
            categorize_skills(&normalize_set(["python", "java", "rust", "go", "sql"]));
        assert_eq!(
            suggest_trajectories(&programmers),
            vec!["Software Engineer → Senior Software Engineer → Tech Lead".to_string()]
        );

        let devops = categorize_skills(&normalize_set(["aws", "docker", "kubernetes"]));
        assert_eq!(
            suggest_trajectories(&devops),
            vec!["DevOps Engineer → Cloud Architect → Platform Engineer".to_string()]
        );

        let generalist = categorize_skills(&normalize_set(["cooking"]));
        assert_eq!(suggest_trajectories(&generalist).len(), 1);
        assert!(suggest_trajectories(&generalist)[0].starts_with("General Developer"));
    }

    #[test]
    fn test_uncategorised_skills_can_dominate() {
        let mixed = categorize_skills(&normalize_set([
            "python", "java", "rust", "go", "cooking", "sailing", "chess", "origami", "juggling",
        ]));
        assert_eq!(mixed[&SkillCategory::Programming].len(), 4);
        assert_eq!(mixed[&SkillCategory::Other].len(), 5);

        let trajectories = suggest_trajectories(&mixed);
        assert_eq!(trajectories.len(), 1);
        assert!(trajectories[0].starts_with("General Developer"));
    }
}
