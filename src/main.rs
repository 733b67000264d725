//! Talent matcher: employee to project matching, skill gaps and career paths

use clap::Parser;
use log::{error, info};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use talent_matcher::catalog::InMemoryCatalog;
use talent_matcher::cli::{self, Cli, Commands, ConfigAction};
use talent_matcher::config::Config;
use talent_matcher::error::{Result, TalentMatcherError};
use talent_matcher::output::formatter::save_report_to_file;
use talent_matcher::output::{MatchDirection, ReportGenerator, ReportMetadata, TalentReport};
use talent_matcher::processing::career::CareerPath;
use talent_matcher::processing::embeddings::Model2VecEmbedder;
use talent_matcher::processing::gap_analyzer::GapReport;
use talent_matcher::processing::scorer::MatchResult;
use talent_matcher::TalentMatcher;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli, config).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

async fn run_command(cli: Cli, config: Config) -> Result<()> {
    let Cli {
        command,
        config: config_path,
        catalog,
        format,
        detailed,
        save,
        ..
    } = cli;

    let output_format = match format {
        Some(format) => {
            cli::parse_output_format(&format).map_err(TalentMatcherError::InvalidInput)?
        }
        None => config.output.format,
    };
    let default_top_k = config.scoring.default_top_k;
    let top_k_or_default = |top_k: Option<usize>| top_k.unwrap_or(default_top_k);

    let (report, matcher) = match command {
        Commands::Config { action } => return run_config(action, config, config_path),
        Commands::Match {
            employee,
            top_k,
            projects,
            weight,
        } => {
            let matcher = open_matcher(&catalog, &config, weight).await?;
            let top_k = top_k_or_default(top_k);
            let results = if projects.is_empty() {
                matcher.match_employee_to_projects(&employee, top_k)?
            } else {
                matcher.match_employee_to_project_list(&employee, &projects, top_k)?
            };
            (PendingReport::Matches(employee, MatchDirection::ForEmployee, results), matcher)
        }
        Commands::Candidates { project, top_k, weight } => {
            let matcher = open_matcher(&catalog, &config, weight).await?;
            let results = matcher.match_project_to_employees(&project, top_k_or_default(top_k))?;
            (PendingReport::Matches(project, MatchDirection::ForProject, results), matcher)
        }
        Commands::Courses { employee, top_k } => {
            let matcher = open_matcher(&catalog, &config, None).await?;
            let results = matcher.match_employee_to_courses(&employee, top_k_or_default(top_k))?;
            (PendingReport::Matches(employee, MatchDirection::ForEmployee, results), matcher)
        }
        Commands::Gap { employee, project } => {
            let matcher = open_matcher(&catalog, &config, None).await?;
            let gap = match project {
                Some(project) => matcher.analyze_skill_gap(&employee, &project)?,
                None => matcher.analyze_general_gap(&employee)?,
            };
            (PendingReport::Gap(gap), matcher)
        }
        Commands::Career { employee } => {
            let matcher = open_matcher(&catalog, &config, None).await?;
            let path = matcher.career_path(&employee)?;
            (PendingReport::Career(path), matcher)
        }
    };

    let metadata = ReportMetadata::new(
        matcher.embedding_model(),
        matcher.weights().semantic_weight(),
        &catalog.display().to_string(),
    );
    let report = report.into_report(metadata);

    let generator = ReportGenerator::with_options(
        config.output.color_output && save.is_none(),
        detailed || config.output.detailed,
        true,
        true,
    );
    let rendered = generator.generate_report(&report, &output_format)?;

    match save {
        Some(path) => {
            save_report_to_file(&rendered, &path)?;
            println!("✅ Report saved to {}", path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

/// Engine result waiting for its run metadata.
enum PendingReport {
    Matches(String, MatchDirection, Vec<MatchResult>),
    Gap(GapReport),
    Career(CareerPath),
}

impl PendingReport {
    fn into_report(self, metadata: ReportMetadata) -> TalentReport {
        match self {
            PendingReport::Matches(subject, direction, results) => {
                TalentReport::matches(&subject, direction, results, metadata)
            }
            PendingReport::Gap(gap) => TalentReport::gap(gap, metadata),
            PendingReport::Career(path) => TalentReport::career(path, metadata),
        }
    }
}

/// Load the catalog and model, index the catalog and build the engine.
async fn open_matcher(
    catalog_path: &Path,
    config: &Config,
    semantic_weight: Option<f32>,
) -> Result<TalentMatcher> {
    let catalog = InMemoryCatalog::load(catalog_path).await?;

    info!("Loading embedding model: {}", config.models.embedding_model);
    let embedder = Model2VecEmbedder::load(
        &config.embedding_model_location(),
        &config.models.embedding_model,
    )?;

    let indexes = catalog.build_indexes(&embedder)?;
    let matcher =
        TalentMatcher::from_catalog(catalog, indexes, Arc::new(embedder), &config.scoring)?;
    match semantic_weight {
        Some(weight) => matcher.with_semantic_weight(weight),
        None => Ok(matcher),
    }
}

fn run_config(
    action: Option<ConfigAction>,
    mut config: Config,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let path = config_path.unwrap_or_else(Config::config_path);

    match action {
        Some(ConfigAction::Show) | None => {
            println!("⚙️  Current Configuration ({})\n", path.display());
            let rendered = toml::to_string_pretty(&config).map_err(|e| {
                TalentMatcherError::Configuration(format!("Failed to serialize config: {}", e))
            })?;
            println!("{}", rendered);
        }

        Some(ConfigAction::Reset) => {
            println!("🔄 Resetting configuration to defaults...");
            Config::default().save_to(&path)?;
            println!("✅ Configuration reset successfully!");
        }

        Some(ConfigAction::Set { key, value }) => {
            config.set_value(&key, &value)?;
            config.save_to(&path)?;
            println!("✅ {} = {}", key, value);
        }
    }

    Ok(())
}
