//! Skill normalization, skill sets and skill categories

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use strsim::jaro_winkler;

static RE_DISALLOWED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\p{Alphabetic}\p{Nd}+#./\-\s]").expect("Invalid punctuation regex")
});

static RE_WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

static RE_JOINERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*([/\-])\s*").expect("Invalid joiner regex"));

/// Synonym folding table, keyed by the cleaned (lower-cased, collapsed) token.
static SYNONYMS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("js", "javascript"),
        ("ecmascript", "javascript"),
        ("ts", "typescript"),
        ("py", "python"),
        ("python3", "python"),
        ("golang", "go"),
        ("node", "node.js"),
        ("nodejs", "node.js"),
        ("node js", "node.js"),
        ("reactjs", "react"),
        ("react.js", "react"),
        ("vuejs", "vue"),
        ("vue.js", "vue"),
        ("angularjs", "angular"),
        ("k8s", "kubernetes"),
        ("postgres", "postgresql"),
        ("psql", "postgresql"),
        ("mongo", "mongodb"),
        ("mssql", "sql server"),
        ("ml", "machine learning"),
        ("dl", "deep learning"),
        ("artificial intelligence", "ai"),
        ("natural language processing", "nlp"),
        ("cv", "computer vision"),
        ("amazon web services", "aws"),
        ("google cloud", "gcp"),
        ("google cloud platform", "gcp"),
        ("microsoft azure", "azure"),
        ("cpp", "c++"),
        ("c sharp", "c#"),
        ("csharp", "c#"),
        ("sklearn", "scikit-learn"),
        ("scikit learn", "scikit-learn"),
        ("cicd", "ci/cd"),
        ("ci cd", "ci/cd"),
        ("ci-cd", "ci/cd"),
        ("restful api", "rest api"),
        ("rest apis", "rest api"),
        ("restful", "rest api"),
        ("tf", "tensorflow"),
        ("powerbi", "power bi"),
        ("gitlab ci", "gitlab"),
    ]
    .into_iter()
    .collect()
});

/// Canonicalize one raw skill string.
///
/// Lower-cases, drops punctuation other than the characters that carry meaning
/// in skill names (`+ # . / -`), collapses whitespace and folds known synonyms.
/// Unknown skills pass through in their cleaned form.
pub fn normalize(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let stripped = RE_DISALLOWED.replace_all(&lowered, " ");
    let collapsed = RE_WHITESPACE.replace_all(&stripped, " ");
    let joined = RE_JOINERS.replace_all(collapsed.trim(), "$1");
    let cleaned = joined
        .trim_matches(|c: char| c == '/' || c == '-' || c.is_whitespace())
        .trim_end_matches('.');

    match SYNONYMS.get(cleaned) {
        Some(canonical) => canonical.to_string(),
        None => cleaned.to_string(),
    }
}

/// Normalize and deduplicate a list of raw skills.
pub fn normalize_set<I, S>(raw: I) -> SkillSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut set = SkillSet::new();
    for skill in raw {
        set.insert(skill.as_ref(), None);
    }
    set
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Proficiency {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

/// Serialized form of one skill: either a bare name or a name with a level.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SkillEntry {
    Name(String),
    Detailed {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        level: Option<Proficiency>,
    },
}

/// A set of canonical skill tokens, each with an optional proficiency.
///
/// Iteration is in token order so everything derived from a set is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<SkillEntry>", into = "Vec<SkillEntry>")]
pub struct SkillSet {
    skills: BTreeMap<String, Option<Proficiency>>,
}

impl SkillSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a raw skill; empty tokens are ignored. On duplicates the higher
    /// proficiency wins.
    pub fn insert(&mut self, raw: &str, level: Option<Proficiency>) {
        let token = normalize(raw);
        if token.is_empty() {
            return;
        }
        let entry = self.skills.entry(token).or_insert(None);
        if level > *entry {
            *entry = level;
        }
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Membership test; `skill` is normalized first.
    pub fn contains(&self, skill: &str) -> bool {
        self.skills.contains_key(&normalize(skill))
    }

    pub fn proficiency(&self, skill: &str) -> Option<Proficiency> {
        self.skills.get(&normalize(skill)).copied().flatten()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.skills.keys().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.skills.keys().cloned().collect()
    }

    /// Skills of `self` also present in `other`, keeping `self`'s levels.
    pub fn intersection(&self, other: &SkillSet) -> SkillSet {
        self.filter(|token| other.skills.contains_key(token))
    }

    /// Skills of `self` absent from `other`.
    pub fn difference(&self, other: &SkillSet) -> SkillSet {
        self.filter(|token| !other.skills.contains_key(token))
    }

    pub fn union(&self, other: &SkillSet) -> SkillSet {
        let mut merged = self.clone();
        for (token, level) in &other.skills {
            let entry = merged.skills.entry(token.clone()).or_insert(None);
            if *level > *entry {
                *entry = *level;
            }
        }
        merged
    }

    pub fn is_subset(&self, other: &SkillSet) -> bool {
        self.skills.keys().all(|token| other.skills.contains_key(token))
    }

    /// Whether some skill in the set names the same thing as `skill`:
    /// an exact token match, containment of one token in the other, or
    /// Jaro-Winkler similarity at or above `threshold`.
    pub fn covers(&self, skill: &str, threshold: f32) -> bool {
        let target = normalize(skill);
        if target.is_empty() {
            return false;
        }
        self.skills.contains_key(&target)
            || self.iter().any(|token| skills_are_close(token, &target, threshold))
    }

    fn filter(&self, keep: impl Fn(&str) -> bool) -> SkillSet {
        SkillSet {
            skills: self
                .skills
                .iter()
                .filter(|(token, _)| keep(token))
                .map(|(token, level)| (token.clone(), *level))
                .collect(),
        }
    }
}

fn skills_are_close(a: &str, b: &str, threshold: f32) -> bool {
    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    // Very short tokens ("r", "go") are contained in too many unrelated names.
    if shorter.len() >= 3 && longer.split(' ').any(|word| word == shorter) {
        return true;
    }
    jaro_winkler(a, b) as f32 >= threshold
}

impl From<Vec<SkillEntry>> for SkillSet {
    fn from(entries: Vec<SkillEntry>) -> Self {
        let mut set = SkillSet::new();
        for entry in entries {
            match entry {
                SkillEntry::Name(name) => set.insert(&name, None),
                SkillEntry::Detailed { name, level } => set.insert(&name, level),
            }
        }
        set
    }
}

impl From<SkillSet> for Vec<SkillEntry> {
    fn from(set: SkillSet) -> Self {
        set.skills
            .into_iter()
            .map(|(name, level)| match level {
                Some(level) => SkillEntry::Detailed { name, level: Some(level) },
                None => SkillEntry::Name(name),
            })
            .collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for SkillSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        normalize_set(iter)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    Programming,
    WebDevelopment,
    DataScience,
    CloudDevops,
    Databases,
    Mobile,
    AiMl,
    Other,
}

impl fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SkillCategory::Programming => "programming",
            SkillCategory::WebDevelopment => "web_development",
            SkillCategory::DataScience => "data_science",
            SkillCategory::CloudDevops => "cloud_devops",
            SkillCategory::Databases => "databases",
            SkillCategory::Mobile => "mobile",
            SkillCategory::AiMl => "ai_ml",
            SkillCategory::Other => "other",
        };
        f.write_str(name)
    }
}

/// Category table, checked in order; the first category naming a skill wins.
static CATEGORY_TABLE: &[(SkillCategory, &[&str])] = &[
    (
        SkillCategory::Programming,
        &["python", "java", "javascript", "typescript", "c++", "c#", "go", "rust"],
    ),
    (
        SkillCategory::WebDevelopment,
        &["react", "angular", "vue", "html", "css", "node.js", "express"],
    ),
    (
        SkillCategory::DataScience,
        &["r", "sql", "pandas", "numpy", "tensorflow", "pytorch", "scikit-learn"],
    ),
    (
        SkillCategory::CloudDevops,
        &["aws", "azure", "gcp", "docker", "kubernetes", "terraform", "jenkins"],
    ),
    (
        SkillCategory::Databases,
        &["mysql", "postgresql", "mongodb", "redis", "elasticsearch", "sqlite"],
    ),
    (
        SkillCategory::Mobile,
        &["swift", "kotlin", "react native", "flutter", "ios", "android"],
    ),
    (
        SkillCategory::AiMl,
        &["machine learning", "deep learning", "nlp", "computer vision"],
    ),
];

/// Category of one canonical skill token.
pub fn categorize(skill: &str) -> SkillCategory {
    let token = normalize(skill);
    for (category, members) in CATEGORY_TABLE {
        if members.contains(&token.as_str()) {
            return *category;
        }
    }
    for (category, members) in CATEGORY_TABLE {
        if members.iter().any(|m| m.len() >= 3 && token.split(' ').any(|word| word == *m)) {
            return *category;
        }
    }
    SkillCategory::Other
}

/// Group a skill set by category. Every category appears, possibly empty.
pub fn categorize_skills(skills: &SkillSet) -> BTreeMap<SkillCategory, Vec<String>> {
    let mut categorized: BTreeMap<SkillCategory, Vec<String>> = CATEGORY_TABLE
        .iter()
        .map(|(category, _)| (*category, Vec::new()))
        .collect();
    categorized.insert(SkillCategory::Other, Vec::new());

    for skill in skills.iter() {
        categorized.entry(categorize(skill)).or_default().push(skill.to_string());
    }
    categorized
}
