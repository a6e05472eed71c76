use std::fmt::Write;

use comfy_table::Cell;

use super::styling::{bright, bright_yellow, cyan, dim};
use super::tables::{
    color_coded_duration_cell, color_coded_success_cell, format_duration, table_with_header,
};
use super::Render;
use crate::gitlab::analytics::{IssueCompletionReport, RunTimeReport, SuccessRateReport};
use crate::gitlab::ProjectSummary;

fn add_section_header(output: &mut String, emoji: &str, title: &str) {
    let _ = writeln!(output, "{} {}", bright(emoji), bright(title).underlined());
}

impl Render for SuccessRateReport {
    fn render(&self) -> String {
        let mut table = table_with_header(&["Pipelines", "Successful", "Success rate"]);
        table.add_row(vec![
            Cell::new(self.total),
            Cell::new(self.successful),
            color_coded_success_cell(self.rate),
        ]);
        table.to_string()
    }
}

impl Render for RunTimeReport {
    fn render(&self) -> String {
        let mut table = table_with_header(&["Pipelines", "With run time", "Total", "Mean"]);
        #[allow(clippy::cast_precision_loss)]
        let total = format_duration(self.total_seconds as f64);
        let mean = self
            .mean_seconds
            .map_or_else(|| Cell::new("-"), color_coded_duration_cell);
        table.add_row(vec![
            Cell::new(self.total_pipelines),
            Cell::new(self.timed_pipelines),
            Cell::new(total),
            mean,
        ]);
        table.to_string()
    }
}

impl Render for IssueCompletionReport {
    fn render(&self) -> String {
        let mut output = String::new();
        let mean = self
            .mean_seconds
            .map_or_else(|| "-".to_string(), format_duration);
        let _ = writeln!(
            output,
            "  {} {}\n  {} {}\n",
            dim("Closed issues:"),
            bright_yellow(self.closed_issues),
            dim("Mean time to close:"),
            bright_yellow(mean)
        );

        let mut table = table_with_header(&["#", "Title", "Opened", "Closed", "Took"]);
        for issue in &self.issues {
            #[allow(clippy::cast_precision_loss)]
            let took = format_duration(issue.seconds as f64);
            table.add_row(vec![
                format!("{}", issue.iid),
                issue.title.clone(),
                issue.created_at.format("%Y-%m-%d %H:%M").to_string(),
                issue.closed_at.format("%Y-%m-%d %H:%M").to_string(),
                took,
            ]);
        }
        let _ = write!(output, "{table}");
        output
    }
}

impl Render for ProjectSummary {
    fn render(&self) -> String {
        let mut output = String::new();

        add_section_header(&mut output, "📊", "Overview");
        let _ = writeln!(
            output,
            "  {} {}\n  {} {}\n  {} {}\n",
            dim("Project:"),
            cyan(self.project.display_name()),
            dim("Failing pipelines:"),
            bright_yellow(self.failing_pipelines.len()),
            dim("Open issues:"),
            bright_yellow(self.open_issues.len())
        );

        if !self.failing_pipelines.is_empty() {
            add_section_header(&mut output, "🔴", "Failing pipelines");
            let mut table = table_with_header(&["ID", "Ref", "Created"]);
            for pipeline in &self.failing_pipelines {
                table.add_row(vec![
                    pipeline.id.to_string(),
                    pipeline.ref_.clone(),
                    pipeline
                        .created_at
                        .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string()),
                ]);
            }
            let _ = writeln!(output, "{table}\n");
        }

        if !self.open_issues.is_empty() {
            add_section_header(&mut output, "📝", "Open issues");
            let mut table = table_with_header(&["#", "Title", "Labels"]);
            for issue in &self.open_issues {
                table.add_row(vec![
                    issue.iid.to_string(),
                    issue.title.clone(),
                    issue.labels.join(", "),
                ]);
            }
            let _ = writeln!(output, "{table}\n");
        }

        add_section_header(&mut output, "🕒", "Recent commits");
        let mut table = table_with_header(&["Commit", "Title", "Author"]);
        for commit in &self.recent_commits {
            table.add_row(vec![
                commit.short_id.clone(),
                commit.title.clone(),
                commit.author_name.clone(),
            ]);
        }
        let _ = write!(output, "{table}");

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_time_without_timed_pipelines_shows_dash() {
        let report = RunTimeReport {
            total_pipelines: 3,
            timed_pipelines: 0,
            total_seconds: 0,
            mean_seconds: None,
        };

        let rendered = report.render();
        assert!(rendered.contains(" - "));
        assert!(rendered.contains("0s"));
    }

    #[test]
    fn success_rate_is_shown_as_percentage() {
        let report = SuccessRateReport {
            total: 4,
            successful: 2,
            rate: 50.0,
        };
        assert!(report.render().contains("50.0%"));
    }
}
