//! Output formatters for console, JSON and markdown

use crate::config::OutputFormat;
use crate::error::Result;
use crate::output::report::*;
use crate::processing::career::CareerPath;
use crate::processing::gap_analyzer::GapReport;
use crate::processing::scorer::MatchResult;
use colored::{Color, Colorize};
use std::path::Path;

pub trait OutputFormatter {
    fn format_report(&self, report: &TalentReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Console formatter with optional colors
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
}

/// Picks the formatter for a requested format
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };
        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_score(&self, score: f32) -> String {
        let color = match percentage(score) {
            75..=100 => Color::Green,
            60..=74 => Color::Yellow,
            45..=59 => Color::BrightYellow,
            _ => Color::Red,
        };
        self.colorize(&format!("{}%", percentage(score)), color)
    }

    fn format_skills(&self, skills: &[String], color: Color) -> String {
        if skills.is_empty() {
            self.colorize("none", Color::BrightBlack)
        } else {
            self.colorize(&skills.join(", "), color)
        }
    }

    /// `by_employee` lists employees ranked for a single project.
    fn format_matches(&self, output: &mut String, results: &[MatchResult], by_employee: bool) {
        if results.is_empty() {
            output.push_str("No matches found.\n");
            return;
        }

        for (i, result) in results.iter().enumerate() {
            let name = if by_employee {
                result.employee_id.clone()
            } else {
                format!("{} ({})", result.target_title, result.target_id)
            };
            output.push_str(&format!(
                "{}. {} {} [{}]\n",
                i + 1,
                self.colorize(&name, Color::White),
                self.format_score(result.overall_score),
                verdict(result.overall_score)
            ));
            output.push_str(&format!(
                "   Semantic: {}% | Skill overlap: {}%\n",
                percentage(result.semantic_score),
                percentage(result.overlap_score)
            ));
            output.push_str(&format!(
                "   Matched: {}\n",
                self.format_skills(&result.overlapping_skills, Color::Green)
            ));
            output.push_str(&format!(
                "   Missing: {}\n",
                self.format_skills(&result.missing_skills, Color::Yellow)
            ));
        }
    }

    fn format_gap(&self, output: &mut String, gap: &GapReport) {
        output.push_str(&format!("Skill overlap: {}\n", self.format_score(gap.overlap_score)));
        output.push_str(&format!(
            "Matched skills: {}\n",
            self.format_skills(&gap.overlapping_skills, Color::Green)
        ));
        output.push_str(&format!(
            "Missing skills: {}\n",
            self.format_skills(&gap.missing_skills, Color::Yellow)
        ));

        if !gap.courses.is_empty() {
            output.push_str(&self.format_header("📚 Recommended Courses", 2));
            for (i, course) in gap.courses.iter().enumerate() {
                output.push_str(&format!(
                    "{}. {} {}\n",
                    i + 1,
                    self.colorize(&course.title, Color::White),
                    self.colorize(&format!("({})", course.course_id), Color::BrightBlack)
                ));
                output.push_str(&format!("   Covers: {}\n", course.addresses.join(", ")));
                if !course.missing_prerequisites.is_empty() {
                    output.push_str(&format!(
                        "   Prerequisites to pick up first: {}\n",
                        self.colorize(&course.missing_prerequisites.join(", "), Color::Yellow)
                    ));
                }
                if !course.provider.is_empty() {
                    output.push_str(&format!("   Provider: {}\n", course.provider));
                }
            }
        }

        let uncovered: Vec<&str> = gap
            .recommendations
            .iter()
            .filter(|(_, courses)| courses.is_empty())
            .map(|(skill, _)| skill.as_str())
            .collect();
        if !uncovered.is_empty() {
            output.push_str(&format!(
                "\n{} No course in the catalog teaches: {}\n",
                self.colorize("⚠️", Color::Yellow),
                uncovered.join(", ")
            ));
        }

        if self.detailed {
            if let Some(categories) = &gap.skill_categories {
                output.push_str(&self.format_header("Skill Categories", 3));
                let held = categories.iter().filter(|(_, skills)| !skills.is_empty());
                for (category, skills) in held {
                    output.push_str(&format!("  • {}: {}\n", category, skills.join(", ")));
                }
            }
        }
    }

    fn format_career(&self, output: &mut String, path: &CareerPath) {
        output.push_str(&format!(
            "Current tier: {}\n",
            self.colorize(path.current_tier.as_deref().unwrap_or("none yet"), Color::Cyan)
        ));
        output.push_str(&format!("Experience level: {}\n", path.experience_level));

        output.push_str(&self.format_header("🚀 Next Steps", 2));
        if path.steps.is_empty() {
            output.push_str("Top of the ladder: every tier is already reached.\n");
        }
        for step in &path.steps {
            output.push_str(&format!(
                "• {}: {}\n",
                self.colorize(&step.role, Color::White),
                step.rationale
            ));
        }

        if !path.next_step_courses.courses.is_empty() {
            output.push_str(&self.format_header("📚 Courses for the Next Step", 3));
            for course in &path.next_step_courses.courses {
                output.push_str(&format!(
                    "  • {} (covers {})\n",
                    course.title,
                    course.addresses.join(", ")
                ));
            }
        }

        output.push_str(&self.format_header("🧭 Trajectories", 3));
        for trajectory in &path.trajectories {
            output.push_str(&format!("  • {}\n", trajectory));
        }

        if !path.growth_projects.is_empty() {
            output.push_str(&self.format_header("🌱 Growth Projects", 3));
            for project in &path.growth_projects {
                output.push_str(&format!(
                    "  • {} {} - learn {}\n",
                    project.title,
                    self.format_score(project.overlap_score),
                    project.missing_skills.join(", ")
                ));
            }
        }

        if self.detailed && !path.current_matches.is_empty() {
            output.push_str(&self.format_header("Current Matches", 3));
            self.format_matches(output, &path.current_matches, false);
        }
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &TalentReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header(&format!("📊 {}", report.title.to_uppercase()), 1));
        output.push_str(&format!(
            "Generated: {}\n",
            report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));

        match &report.payload {
            ReportPayload::Matches { direction, results, .. } => {
                let by_employee = *direction == MatchDirection::ForProject;
                self.format_matches(&mut output, results, by_employee)
            }
            ReportPayload::Gap(gap) => self.format_gap(&mut output, gap),
            ReportPayload::Career(path) => self.format_career(&mut output, path),
        }

        output.push_str(&format!(
            "\n{} Talent Matcher v{} | Model: {} | Semantic weight: {:.2}\n",
            self.colorize("ℹ️", Color::Blue),
            report.metadata.matcher_version,
            report.metadata.embedding_model,
            report.metadata.semantic_weight
        ));

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &TalentReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }

    fn skills_or_dash(skills: &[String]) -> String {
        if skills.is_empty() {
            "-".to_string()
        } else {
            skills.join(", ")
        }
    }

    fn format_matches(output: &mut String, results: &[MatchResult]) {
        if results.is_empty() {
            output.push_str("_No matches found._\n");
            return;
        }

        output.push_str("| # | Employee | Target | Overall | Semantic | Overlap | Missing |\n");
        output.push_str("|---|----------|--------|---------|----------|---------|---------|\n");
        for (i, result) in results.iter().enumerate() {
            output.push_str(&format!(
                "| {} | {} | {} (`{}`) | {}% | {}% | {}% | {} |\n",
                i + 1,
                result.employee_id,
                result.target_title,
                result.target_id,
                percentage(result.overall_score),
                percentage(result.semantic_score),
                percentage(result.overlap_score),
                Self::skills_or_dash(&result.missing_skills)
            ));
        }
    }

    fn format_gap(output: &mut String, gap: &GapReport) {
        output.push_str(&format!("**Skill overlap:** {}%\n\n", percentage(gap.overlap_score)));
        output.push_str(&format!(
            "**Matched:** {}\n\n",
            Self::skills_or_dash(&gap.overlapping_skills)
        ));
        output.push_str(&format!("**Missing:** {}\n\n", Self::skills_or_dash(&gap.missing_skills)));

        output.push_str("## Recommendations\n\n");
        for (skill, courses) in &gap.recommendations {
            if courses.is_empty() {
                output.push_str(&format!("- **{}**: no course available\n", skill));
            } else {
                let titles: Vec<&str> = courses.iter().map(|c| c.title.as_str()).collect();
                output.push_str(&format!("- **{}**: {}\n", skill, titles.join(", ")));
            }
        }

        if !gap.courses.is_empty() {
            output.push_str("\n## Courses\n\n");
            for course in &gap.courses {
                let link = if course.url.is_empty() {
                    course.title.clone()
                } else {
                    format!("[{}]({})", course.title, course.url)
                };
                output.push_str(&format!("- {} covers {}\n", link, course.addresses.join(", ")));
            }
        }
    }

    fn format_career(output: &mut String, path: &CareerPath) {
        output.push_str(&format!(
            "**Current tier:** {} | **Experience level:** {}\n\n",
            path.current_tier.as_deref().unwrap_or("none yet"),
            path.experience_level
        ));

        output.push_str("## Next Steps\n\n");
        for step in &path.steps {
            output.push_str(&format!("- **{}**: {}\n", step.role, step.rationale));
        }

        output.push_str("\n## Trajectories\n\n");
        for trajectory in &path.trajectories {
            output.push_str(&format!("- {}\n", trajectory));
        }

        if !path.growth_projects.is_empty() {
            output.push_str("\n## Growth Projects\n\n");
            for project in &path.growth_projects {
                output.push_str(&format!(
                    "- {} ({}% overlap), learn: {}\n",
                    project.title,
                    percentage(project.overlap_score),
                    project.missing_skills.join(", ")
                ));
            }
        }
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &TalentReport) -> Result<String> {
        let mut output = String::new();
        output.push_str(&format!("# 📊 {}\n\n", report.title));

        if self.include_metadata {
            output.push_str(&format!(
                "**Generated:** {} | **Model:** {} | **Semantic weight:** {:.2}\n\n",
                report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
                report.metadata.embedding_model,
                report.metadata.semantic_weight
            ));
        }

        match &report.payload {
            ReportPayload::Matches { results, .. } => Self::format_matches(&mut output, results),
            ReportPayload::Gap(gap) => Self::format_gap(&mut output, gap),
            ReportPayload::Career(path) => Self::format_career(&mut output, path),
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(true, false),
            json_formatter: JsonFormatter::new(true),
            markdown_formatter: MarkdownFormatter::new(true),
        }
    }

    pub fn with_options(
        use_colors: bool,
        detailed: bool,
        pretty_json: bool,
        include_metadata: bool,
    ) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(include_metadata),
        }
    }

    pub fn generate_report(&self, report: &TalentReport, format: &OutputFormat) -> Result<String> {
        self.formatter_for(format).format_report(report)
    }

    fn formatter_for(&self, format: &OutputFormat) -> &dyn OutputFormatter {
        let formatters: [&dyn OutputFormatter; 3] = [
            &self.console_formatter,
            &self.json_formatter,
            &self.markdown_formatter,
        ];
        formatters
            .into_iter()
            .find(|formatter| formatter.supports_format() == *format)
            .unwrap_or(&self.console_formatter)
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file_path, content)?;
    Ok(())
}
