use std::path::PathBuf;

use clap::Parser;
use inspira::storage::Summary;
use tracing::instrument;

use super::{
    open,
    terminal::{Colorize, is_narrow, status_label},
};

#[derive(Debug, Parser, Default)]
#[command(about = "Show idea counts per column")]
pub struct Status {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress headers and format for scripting
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Status {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let workspace = open(root)?;
        let summary = workspace.board().store().summary();

        match self.output {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
            OutputFormat::Table if self.quiet => Self::output_quiet(&summary),
            OutputFormat::Table if summary.total == 0 => {
                println!("No ideas yet. Submit one with 'inspira create'.");
            }
            OutputFormat::Table => Self::output_table(&summary),
        }

        Ok(())
    }

    fn output_quiet(summary: &Summary) {
        println!(
            "total={} in_progress={} implemented={}",
            summary.total, summary.in_progress, summary.implemented
        );
    }

    fn output_table(summary: &Summary) {
        println!("Ideas per column");
        println!("{}", "────────────────".dim());

        if is_narrow() {
            for (status, count) in &summary.by_status {
                println!("{}: {count}", status_label(*status));
            }
        } else {
            println!("{:<22} Count", "Column");
            for (status, count) in &summary.by_status {
                // Escape codes would count towards the width.
                let padding = " ".repeat(22usize.saturating_sub(status.label().chars().count()));
                println!("{}{padding} {count}", status_label(*status));
            }
        }

        println!();
        println!("Total:       {}", summary.total.to_string().strong());
        println!("In progress: {}", summary.in_progress.to_string().info());
        println!(
            "Implemented: {} ✅",
            summary.implemented.to_string().success()
        );
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::cli::tests::workspace_with_idea;

    #[test]
    fn runs_on_populated_workspace() {
        let tmp = tempdir().unwrap();
        workspace_with_idea(tmp.path());

        Status::default().run(tmp.path().to_path_buf()).unwrap();
        Status {
            output: OutputFormat::Json,
            quiet: false,
        }
        .run(tmp.path().to_path_buf())
        .unwrap();
    }

    #[test]
    fn runs_without_workspace() {
        let tmp = tempdir().unwrap();

        Status {
            output: OutputFormat::Table,
            quiet: true,
        }
        .run(tmp.path().to_path_buf())
        .unwrap();
    }
}
