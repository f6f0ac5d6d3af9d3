use std::path::PathBuf;

use clap::ValueEnum;
use inspira::board::Verdict;
use tracing::instrument;

use crate::cli::{
    announce, open,
    terminal::{Colorize, short_id, status_label},
};

#[derive(Debug, clap::Parser)]
pub struct Vote {
    /// The id (or unique id prefix) of the idea
    id: String,

    /// The committee's decision
    #[arg(value_enum)]
    verdict: Decision,

    /// Comment to record instead of the standard one
    #[arg(long, short)]
    comment: Option<String>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Decision {
    Approve,
    Reject,
}

impl From<Decision> for Verdict {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approve => Self::Approve,
            Decision::Reject => Self::Reject,
        }
    }
}

impl Vote {
    #[instrument(skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut workspace = open(root)?;
        let id = workspace.resolve(&self.id)?.id();
        announce(&mut workspace);

        let change = workspace.board_mut().record_verdict(
            id,
            self.verdict.into(),
            self.comment.as_deref(),
        )?;
        workspace.persist(id)?;

        println!(
            "{}",
            format!(
                "✅ Recorded verdict on {}: {}",
                short_id(id),
                status_label(change.to)
            )
            .success()
        );
        Ok(())
    }
}
