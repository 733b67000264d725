//! Catalog entities and the collaborator interfaces the matcher reads them through

pub mod index;
pub mod memory;

use crate::processing::skills::SkillSet;
use serde::{Deserialize, Serialize};

pub use index::{IndexHit, InMemoryVectorIndex, VectorIndex};
pub use memory::{CatalogFile, CatalogIndexes, InMemoryCatalog};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeProfile {
    pub id: String,
    pub name: String,
    pub skills: SkillSet,
    #[serde(default)]
    pub preferences: Vec<String>,
    #[serde(default)]
    pub resume_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub title: String,
    pub required_skills: SkillSet,
    #[serde(default)]
    pub team_size: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub title: String,
    /// Skills the course teaches
    pub skills: SkillSet,
    #[serde(default)]
    pub prerequisites: SkillSet,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl EmployeeProfile {
    /// Text the profile embedding is derived from.
    pub fn document_text(&self) -> String {
        format!(
            "{} Skills: {} Resume: {}",
            self.name,
            self.skills.to_vec().join(", "),
            self.resume_text
        )
    }
}

impl Project {
    pub fn document_text(&self) -> String {
        format!(
            "{} Required Skills: {} Description: {}",
            self.title,
            self.required_skills.to_vec().join(", "),
            self.description
        )
    }
}

impl Course {
    pub fn document_text(&self) -> String {
        format!(
            "{} Skills: {} Description: {}",
            self.title,
            self.skills.to_vec().join(", "),
            self.description
        )
    }
}

pub trait EmployeeStore: Send + Sync {
    fn get(&self, id: &str) -> anyhow::Result<Option<EmployeeProfile>>;
    fn list(&self) -> anyhow::Result<Vec<EmployeeProfile>>;
}

pub trait ProjectStore: Send + Sync {
    fn get(&self, id: &str) -> anyhow::Result<Option<Project>>;
    fn list(&self) -> anyhow::Result<Vec<Project>>;
}

pub trait CourseStore: Send + Sync {
    fn get(&self, id: &str) -> anyhow::Result<Option<Course>>;
    fn list(&self) -> anyhow::Result<Vec<Course>>;
}
