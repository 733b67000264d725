//! In-memory catalog backed by a JSON file

use super::index::{InMemoryVectorIndex, VectorIndex};
use super::{Course, CourseStore, EmployeeProfile, EmployeeStore, Project, ProjectStore};
use crate::error::{Result, TalentMatcherError};
use crate::processing::career::SkillTaxonomy;
use crate::processing::embeddings::Embedder;
use crate::processing::scorer::resolve_embedding;
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::path::Path;

/// On-disk catalog layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub employees: Vec<EmployeeProfile>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxonomy: Option<SkillTaxonomy>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    employees: BTreeMap<String, EmployeeProfile>,
    projects: BTreeMap<String, Project>,
    courses: BTreeMap<String, Course>,
    taxonomy: Option<SkillTaxonomy>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a parsed catalog; a repeated id is rejected.
    pub fn from_file(file: CatalogFile) -> Result<Self> {
        let mut catalog = Self::new();
        for employee in file.employees {
            catalog.add_employee(employee)?;
        }
        for project in file.projects {
            catalog.add_project(project)?;
        }
        for course in file.courses {
            catalog.add_course(course)?;
        }
        catalog.taxonomy = file.taxonomy;
        Ok(catalog)
    }

    pub async fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TalentMatcherError::InvalidInput(format!(
                "Catalog file does not exist: {}",
                path.display()
            )));
        }

        info!("Loading catalog from: {}", path.display());
        let content = tokio::fs::read_to_string(path).await?;
        let file: CatalogFile = serde_json::from_str(&content)?;
        let catalog = Self::from_file(file)?;

        info!(
            "Catalog loaded: {} employees, {} projects, {} courses",
            catalog.employees.len(),
            catalog.projects.len(),
            catalog.courses.len()
        );
        Ok(catalog)
    }

    pub fn add_employee(&mut self, employee: EmployeeProfile) -> Result<()> {
        insert_unique(&mut self.employees, employee.id.clone(), employee, "employee")
    }

    pub fn add_project(&mut self, project: Project) -> Result<()> {
        insert_unique(&mut self.projects, project.id.clone(), project, "project")
    }

    pub fn add_course(&mut self, course: Course) -> Result<()> {
        insert_unique(&mut self.courses, course.id.clone(), course, "course")
    }

    pub fn taxonomy(&self) -> Option<&SkillTaxonomy> {
        self.taxonomy.as_ref()
    }

    /// Ingestion step: index every project, course and employee, embedding
    /// the document text of entities registered without a vector.
    pub fn build_indexes(&self, embedder: &dyn Embedder) -> Result<CatalogIndexes> {
        let indexes = CatalogIndexes::default();

        for project in self.projects.values() {
            let vector = resolve_embedding(
                embedder,
                project.embedding.as_deref(),
                || project.document_text(),
                &project.id,
            )?;
            let metadata = json!({"kind": "project", "title": project.title});
            upsert(&indexes.projects, &project.id, vector.into_owned(), metadata)?;
        }
        for course in self.courses.values() {
            let vector = resolve_embedding(
                embedder,
                course.embedding.as_deref(),
                || course.document_text(),
                &course.id,
            )?;
            let metadata = json!({"kind": "course", "title": course.title});
            upsert(&indexes.courses, &course.id, vector.into_owned(), metadata)?;
        }
        for employee in self.employees.values() {
            let vector = resolve_embedding(
                embedder,
                employee.embedding.as_deref(),
                || employee.document_text(),
                &employee.id,
            )?;
            let metadata = json!({"kind": "employee", "name": employee.name});
            upsert(&indexes.employees, &employee.id, vector.into_owned(), metadata)?;
        }

        info!(
            "Indexed {} projects, {} courses, {} employees",
            self.projects.len(),
            self.courses.len(),
            self.employees.len()
        );
        Ok(indexes)
    }
}

/// Vector indexes over a catalog's entities.
#[derive(Debug, Default)]
pub struct CatalogIndexes {
    pub projects: InMemoryVectorIndex,
    pub courses: InMemoryVectorIndex,
    pub employees: InMemoryVectorIndex,
}

fn insert_unique<T>(map: &mut BTreeMap<String, T>, id: String, value: T, kind: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(TalentMatcherError::InvalidInput(format!("{} with empty id", kind)));
    }
    if map.contains_key(&id) {
        return Err(TalentMatcherError::InvalidInput(format!("duplicate {} id: {}", kind, id)));
    }
    map.insert(id, value);
    Ok(())
}

fn upsert(
    index: &InMemoryVectorIndex,
    id: &str,
    vector: Vec<f32>,
    metadata: serde_json::Value,
) -> Result<()> {
    index
        .upsert(id, vector, metadata)
        .map_err(|e| TalentMatcherError::dependency("vector_index.upsert", id, e))
}

impl EmployeeStore for InMemoryCatalog {
    fn get(&self, id: &str) -> anyhow::Result<Option<EmployeeProfile>> {
        Ok(self.employees.get(id).cloned())
    }

    fn list(&self) -> anyhow::Result<Vec<EmployeeProfile>> {
        Ok(self.employees.values().cloned().collect())
    }
}

impl ProjectStore for InMemoryCatalog {
    fn get(&self, id: &str) -> anyhow::Result<Option<Project>> {
        Ok(self.projects.get(id).cloned())
    }

    fn list(&self) -> anyhow::Result<Vec<Project>> {
        Ok(self.projects.values().cloned().collect())
    }
}

impl CourseStore for InMemoryCatalog {
    fn get(&self, id: &str) -> anyhow::Result<Option<Course>> {
        Ok(self.courses.get(id).cloned())
    }

    fn list(&self) -> anyhow::Result<Vec<Course>> {
        Ok(self.courses.values().cloned().collect())
    }
}
