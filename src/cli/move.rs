use std::path::PathBuf;

use inspira::{
    board::{BoardError, DropOutcome, PendingTransition},
    domain::{Status, TransitionError},
    storage::{MoveOutcome, StoreError},
};
use tracing::instrument;

use crate::cli::{
    announce, open,
    terminal::{Colorize, short_id, status_label},
};

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// The id (or unique id prefix) of the idea
    id: String,

    /// The target column, e.g. 'En Revisión' or 'under-review'
    status: Status,

    /// Comment to record with the move (required when moving to 'Rechazada')
    #[arg(long, short)]
    comment: Option<String>,
}

impl Command {
    #[instrument(skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut workspace = open(root)?;
        let id = workspace.resolve(&self.id)?.id();
        announce(&mut workspace);

        let board = workspace.board_mut();
        let comment = self.comment.as_deref();
        let moved = match board.on_drop_with_comment(id, self.status, comment)? {
            DropOutcome::Unchanged => false,
            DropOutcome::Moved(_) => true,
            DropOutcome::AwaitingComment(_) => match comment {
                Some(comment) => {
                    let outcome = board.commit_transition(Some(comment));
                    if outcome.is_err() {
                        board.cancel_transition();
                    }
                    matches!(outcome?, MoveOutcome::Moved(_))
                }
                None => resolve_pending(board, ask_for_comment)?,
            },
        };

        if moved {
            workspace.persist(id)?;
            println!(
                "{}",
                format!(
                    "✅ Moved {} to {}",
                    short_id(id),
                    status_label(self.status)
                )
                .success()
            );
        } else {
            println!("{}", "No change".dim());
        }

        Ok(())
    }
}

fn ask_for_comment(pending: &PendingTransition) -> anyhow::Result<String> {
    Ok(dialoguer::Input::<String>::new()
        .with_prompt(format!(
            "Comment required to move to '{}' (leave empty to cancel)",
            pending.to
        ))
        .allow_empty(true)
        .interact_text()?)
}

/// Ask for a comment until one is accepted or the user gives up.
///
/// An empty answer cancels the pending drop. Returns whether the idea moved.
fn resolve_pending(
    board: &mut inspira::Board,
    mut next_comment: impl FnMut(&PendingTransition) -> anyhow::Result<String>,
) -> anyhow::Result<bool> {
    loop {
        let Some(pending) = board.pending().copied() else {
            return Ok(false);
        };
        let comment = next_comment(&pending)?;

        if comment.trim().is_empty() {
            board.cancel_transition();
            println!("{}", "Cancelled".dim());
            return Ok(false);
        }

        match board.commit_transition(Some(&comment)) {
            Ok(outcome) => return Ok(matches!(outcome, MoveOutcome::Moved(_))),
            Err(BoardError::Store(StoreError::Transition(TransitionError::Invalid(e)))) => {
                eprintln!("{}", e.to_string().warning());
            }
            Err(e) => return Err(e.into()),
        }
    }
}
