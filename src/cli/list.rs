use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use inspira::{
    domain::{Idea, Status},
    storage::{IdeaFilter, IdeaRecord},
};
use regex::Regex;
use tracing::instrument;

use super::{
    open,
    terminal::{is_narrow, short_id, status_label, truncate},
};

const TITLE_WIDTH: usize = 40;
const NARROW_TITLE_WIDTH: usize = 24;

/// Command arguments for `inspira list`.
#[derive(Debug, Parser)]
#[command(about = "List ideas with filters")]
pub struct List {
    /// Filter by status, e.g. 'Abierta' or 'in-progress'.
    #[arg(long)]
    status: Option<Status>,

    /// Filter by plant (case-insensitive).
    #[arg(long)]
    plant: Option<String>,

    /// Filter by author id.
    #[arg(long)]
    author: Option<String>,

    /// Filter by category (case-insensitive).
    #[arg(long)]
    category: Option<String>,

    /// Case-insensitive substring match against title/description.
    #[arg(long, conflicts_with = "regex")]
    contains: Option<String>,

    /// Regular expression match against title/description.
    #[arg(long)]
    regex: Option<String>,

    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,

    /// Suppress headers and print one id per line.
    #[arg(long)]
    quiet: bool,
}

/// Supported output formats.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl List {
    #[instrument(level = "debug", skip_all)]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let workspace = open(root)?;

        let pattern = self
            .regex
            .as_deref()
            .map(Regex::new)
            .transpose()
            .context("invalid --regex pattern")?;
        let filter = self.filter();

        let ideas: Vec<&Idea> = workspace
            .board()
            .store()
            .filter(&filter)
            .filter(|idea| pattern.as_ref().is_none_or(|re| matches_pattern(re, idea)))
            .collect();

        match self.output {
            OutputFormat::Table => {
                render_table(&ideas, self.quiet);
                Ok(())
            }
            OutputFormat::Json => render_json(&ideas),
        }
    }

    fn filter(&self) -> IdeaFilter {
        IdeaFilter {
            search: self.contains.clone(),
            status: self.status,
            plant: self.plant.clone(),
            author: self.author.clone(),
            category: self.category.clone(),
        }
    }
}

fn matches_pattern(pattern: &Regex, idea: &Idea) -> bool {
    pattern.is_match(idea.title()) || pattern.is_match(idea.description())
}

fn render_table(ideas: &[&Idea], quiet: bool) {
    if quiet {
        for idea in ideas {
            println!("{}", idea.id());
        }
        return;
    }

    if ideas.is_empty() {
        println!("No matching ideas.");
        return;
    }

    let title_width = if is_narrow() {
        NARROW_TITLE_WIDTH
    } else {
        TITLE_WIDTH
    };

    let rows: Vec<[String; 4]> = ideas
        .iter()
        .map(|idea| {
            [
                short_id(idea.id()),
                truncate(idea.title(), title_width),
                idea.plant().to_string(),
                idea.author().name.clone(),
            ]
        })
        .collect();

    let headers = ["ID", "Title", "Plant", "Author"];
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            rows.iter()
                .map(|row| row[idx].chars().count())
                .max()
                .unwrap_or(0)
                .max(header.len())
        })
        .collect();

    for (header, &width) in headers.iter().zip(&widths) {
        print!("{header:<width$}  ");
    }
    println!("Status");
    for &width in &widths {
        print!("{:-<width$}  ", "");
    }
    println!("------");

    for (row, idea) in rows.iter().zip(ideas) {
        for (value, &width) in row.iter().zip(&widths) {
            print!("{value:<width$}  ");
        }
        println!("{}", status_label(idea.status()));
    }
}

fn render_json(ideas: &[&Idea]) -> anyhow::Result<()> {
    let records: Vec<IdeaRecord> = ideas.iter().copied().map(IdeaRecord::from).collect();

    serde_json::to_writer_pretty(std::io::stdout(), &records)
        .context("failed to render json output")?;
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use inspira::Workspace;
    use tempfile::tempdir;
    use test_case::test_case;

    use super::*;
    use crate::cli::tests::{create, workspace_with_idea};

    fn list() -> List {
        List {
            status: None,
            plant: None,
            author: None,
            category: None,
            contains: None,
            regex: None,
            output: OutputFormat::Table,
            quiet: false,
        }
    }

    #[test_case("consumo", true; "substring")]
    #[test_case("CONSUMO", true; "ignores case")]
    #[test_case("reciclaje", false; "no match")]
    fn contains_builds_search_filter(needle: &str, expected: bool) {
        let tmp = tempdir().unwrap();
        let id = workspace_with_idea(tmp.path());
        let workspace = Workspace::open(tmp.path().to_path_buf()).unwrap();
        let idea = workspace.board().store().get(id).unwrap();

        let command = List {
            contains: Some(needle.to_string()),
            ..list()
        };

        assert_eq!(command.filter().matches(idea), expected);
    }

    #[test_case(r"^Reducir", true; "anchored title")]
    #[test_case(r"sensores\s+de", true; "description")]
    #[test_case(r"^consumo", false; "anchored miss")]
    fn regex_matches_title_or_description(pattern: &str, expected: bool) {
        let tmp = tempdir().unwrap();
        let id = workspace_with_idea(tmp.path());
        let workspace = Workspace::open(tmp.path().to_path_buf()).unwrap();
        let idea = workspace.board().store().get(id).unwrap();

        let re = Regex::new(pattern).unwrap();
        assert_eq!(matches_pattern(&re, idea), expected);
    }

    #[test]
    fn invalid_regex_fails() {
        let tmp = tempdir().unwrap();
        workspace_with_idea(tmp.path());

        let command = List {
            regex: Some("(".to_string()),
            ..list()
        };

        assert!(command.run(tmp.path().to_path_buf()).is_err());
    }

    #[test]
    fn renders_every_format() {
        let tmp = tempdir().unwrap();
        workspace_with_idea(tmp.path());
        create("Reciclar palés").run(tmp.path().to_path_buf()).unwrap();

        list().run(tmp.path().to_path_buf()).unwrap();
        List {
            quiet: true,
            ..list()
        }
        .run(tmp.path().to_path_buf())
        .unwrap();
        List {
            output: OutputFormat::Json,
            status: Some(Status::Open),
            ..list()
        }
        .run(tmp.path().to_path_buf())
        .unwrap();
    }
}
