use std::{collections::BTreeMap, path::PathBuf};

use clap::Parser;
use inspira::{domain::Status, storage::IdeaRecord};
use tracing::instrument;

use super::{
    open,
    terminal::{Colorize, is_narrow, short_id, status_label, truncate},
};

const CARD_WIDTH: usize = 48;
const NARROW_CARD_WIDTH: usize = 28;

#[derive(Debug, Parser, Default)]
#[command(about = "Show ideas grouped into workflow columns")]
pub struct Board {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Hide columns without ideas
    #[arg(long)]
    compact: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Board {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let workspace = open(root)?;
        let columns = workspace.board().columns();

        match self.output {
            OutputFormat::Json => {
                let output: BTreeMap<Status, Vec<IdeaRecord>> = columns
                    .iter()
                    .map(|(status, ideas)| {
                        (status, ideas.iter().copied().map(IdeaRecord::from).collect())
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Table => {
                let width = if is_narrow() {
                    NARROW_CARD_WIDTH
                } else {
                    CARD_WIDTH
                };

                for (status, ideas) in columns.iter() {
                    if self.compact && ideas.is_empty() {
                        continue;
                    }

                    println!(
                        "{} {}",
                        status_label(status).strong(),
                        format!("({})", ideas.len()).dim()
                    );
                    println!("{}", status.description().dim());

                    for idea in ideas {
                        println!(
                            "  {} {}  {}",
                            short_id(idea.id()).dim(),
                            truncate(idea.title(), width),
                            idea.author().name.dim()
                        );
                    }
                    println!();
                }

                if workspace.board().store().is_empty() {
                    println!("No ideas yet. Submit one with 'inspira create'.");
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::cli::tests::workspace_with_idea;

    #[test]
    fn renders_every_format() {
        let tmp = tempdir().unwrap();
        workspace_with_idea(tmp.path());

        Board::default().run(tmp.path().to_path_buf()).unwrap();
        Board {
            output: OutputFormat::Table,
            compact: true,
        }
        .run(tmp.path().to_path_buf())
        .unwrap();
        Board {
            output: OutputFormat::Json,
            compact: false,
        }
        .run(tmp.path().to_path_buf())
        .unwrap();
    }

    #[test]
    fn renders_empty_board() {
        let tmp = tempdir().unwrap();
        Board::default().run(tmp.path().to_path_buf()).unwrap();
    }
}
