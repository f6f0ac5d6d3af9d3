//! Idea management for continuous improvement programmes
//!
//! Employees submit improvement ideas, which then move across a review board
//! of workflow columns. A transition policy decides which moves are allowed
//! and which of them need a reviewer comment. Ideas are persisted to a YAML
//! data file inside a `.inspira` workspace directory.

pub mod domain;
pub use domain::{Config, Idea, IdeaPatch, NewIdea, Priority, Status, TransitionPolicy};

/// The review board: columns, drops and pending transitions.
pub mod board;
pub use board::{Board, BoardError, DropOutcome, Verdict};

/// In-memory idea storage, queries and persistence.
pub mod storage;
pub use storage::{IdeaFilter, IdeaStore, Summary, Workspace, WorkspaceError};
