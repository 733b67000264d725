//! Configuration management for the talent matcher

use crate::error::{Result, TalentMatcherError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub models: ModelConfig,
    pub scoring: ScoringConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    pub models_dir: PathBuf,
    /// Model2Vec repo id or a directory under `models_dir`
    pub embedding_model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoringConfig {
    /// Weight of the semantic score in the overall score; the skill overlap gets the rest
    pub semantic_weight: f32,
    pub default_top_k: usize,
    pub courses_per_gap: usize,
    /// Nearest courses requested from the index per missing skill, before filtering
    pub course_candidate_pool: usize,
    /// Jaro-Winkler similarity at which two skill tokens count as the same skill
    pub skill_similarity_threshold: f32,
    pub growth_band_min: f32,
    pub growth_band_max: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            semantic_weight: 0.6,
            default_top_k: 5,
            courses_per_gap: 3,
            course_candidate_pool: 10,
            skill_similarity_threshold: 0.9,
            growth_band_min: 0.4,
            growth_band_max: 0.7,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let models_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".talent-matcher")
            .join("models");

        Self {
            models: ModelConfig {
                models_dir,
                embedding_model: "minishlab/potion-base-8M".to_string(),
            },
            scoring: ScoringConfig::default(),
            output: OutputConfig {
                format: OutputFormat::Console,
                detailed: false,
                color_output: true,
            },
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.semantic_weight) {
            return Err(TalentMatcherError::Configuration(format!(
                "scoring.semantic_weight must be within [0, 1], got {}",
                self.semantic_weight
            )));
        }
        if !(0.0..=1.0).contains(&self.skill_similarity_threshold) {
            return Err(TalentMatcherError::Configuration(format!(
                "scoring.skill_similarity_threshold must be within [0, 1], got {}",
                self.skill_similarity_threshold
            )));
        }
        if self.default_top_k == 0 || self.courses_per_gap == 0 || self.course_candidate_pool == 0 {
            return Err(TalentMatcherError::Configuration(
                "scoring.default_top_k, courses_per_gap and course_candidate_pool must be positive"
                    .to_string(),
            ));
        }
        let band = 0.0..=1.0;
        if !band.contains(&self.growth_band_min)
            || !band.contains(&self.growth_band_max)
            || self.growth_band_min > self.growth_band_max
        {
            return Err(TalentMatcherError::Configuration(format!(
                "invalid growth band [{}, {}]",
                self.growth_band_min, self.growth_band_max
            )));
        }
        Ok(())
    }
}

impl Config {
    /// Load the user configuration, writing the defaults on first use.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            TalentMatcherError::Configuration(format!("Failed to parse config: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            TalentMatcherError::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("talent-matcher")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        self.scoring.validate()
    }

    /// Resolve the embedding model to a local directory when one exists,
    /// otherwise hand the repo id through for download.
    pub fn embedding_model_location(&self) -> PathBuf {
        let local_path = self.models.models_dir.join(&self.models.embedding_model);
        if local_path.exists() {
            local_path
        } else {
            PathBuf::from(&self.models.embedding_model)
        }
    }

    /// Set a value by dotted key, e.g. `scoring.semantic_weight`.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
            value.parse().map_err(|_| {
                TalentMatcherError::Configuration(format!("Invalid value for {}: {}", key, value))
            })
        }

        match key {
            "models.models_dir" => self.models.models_dir = PathBuf::from(value),
            "models.embedding_model" => self.models.embedding_model = value.to_string(),
            "scoring.semantic_weight" => self.scoring.semantic_weight = parse(key, value)?,
            "scoring.default_top_k" => self.scoring.default_top_k = parse(key, value)?,
            "scoring.courses_per_gap" => self.scoring.courses_per_gap = parse(key, value)?,
            "scoring.course_candidate_pool" => {
                self.scoring.course_candidate_pool = parse(key, value)?
            }
            "scoring.skill_similarity_threshold" => {
                self.scoring.skill_similarity_threshold = parse(key, value)?
            }
            "scoring.growth_band_min" => self.scoring.growth_band_min = parse(key, value)?,
            "scoring.growth_band_max" => self.scoring.growth_band_max = parse(key, value)?,
            "output.format" => {
                self.output.format = crate::cli::parse_output_format(value)
                    .map_err(TalentMatcherError::Configuration)?
            }
            "output.detailed" => self.output.detailed = parse(key, value)?,
            "output.color_output" => self.output.color_output = parse(key, value)?,
            _ => {
                return Err(TalentMatcherError::Configuration(format!(
                    "Unknown configuration key: {}",
                    key
                )))
            }
        }

        self.validate()
    }
}
