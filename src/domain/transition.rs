//! Status transition policy
//!
//! Every status change goes through a [`TransitionPolicy`]. The policy
//! combines a [`TransitionTable`] (which edges of the status graph exist) with
//! a list of [`TransitionRule`]s (what a transition must carry). The default
//! table allows any column-to-column move; the only default rule is that a
//! rejection must be explained.

use std::fmt;

use chrono::Utc;
use petgraph::{Direction, graphmap::DiGraphMap};

use crate::domain::{Idea, Status};

/// The directed graph of permitted status changes.
#[derive(Debug, Clone)]
pub struct TransitionTable {
    graph: DiGraphMap<Status, ()>,
}

impl TransitionTable {
    fn empty() -> Self {
        let mut graph = DiGraphMap::with_capacity(Status::ALL.len(), Status::ALL.len().pow(2));
        for status in Status::ALL {
            graph.add_node(status);
        }
        Self { graph }
    }

    /// A table where any status may move to any other status.
    #[must_use]
    pub fn permissive() -> Self {
        let mut table = Self::empty();
        for from in Status::ALL {
            for to in Status::ALL {
                table.allow(from, to);
            }
        }
        table
    }

    /// A table allowing only the happy path:
    ///
    /// `Open → UnderReview → CommitteeReview → {Approved | Rejected}`, then
    /// `Approved → InProgress → Implemented`.
    #[must_use]
    pub fn linear() -> Self {
        let mut table = Self::empty();
        for (from, to) in [
            (Status::Open, Status::UnderReview),
            (Status::UnderReview, Status::CommitteeReview),
            (Status::CommitteeReview, Status::Approved),
            (Status::CommitteeReview, Status::Rejected),
            (Status::Approved, Status::InProgress),
            (Status::InProgress, Status::Implemented),
        ] {
            table.allow(from, to);
        }
        table
    }

    /// Permit moving from `from` to `to`.
    ///
    /// Returns `true` if the edge was added, `false` if it already existed or
    /// `from == to` (a status never transitions to itself).
    pub fn allow(&mut self, from: Status, to: Status) -> bool {
        if from == to {
            return false;
        }
        self.graph.add_edge(from, to, ()).is_none()
    }

    /// Forbid moving from `from` to `to`.
    ///
    /// Returns `true` if the edge existed.
    pub fn forbid(&mut self, from: Status, to: Status) -> bool {
        self.graph.remove_edge(from, to).is_some()
    }

    /// Whether the table contains the edge `from → to`.
    #[must_use]
    pub fn allows(&self, from: Status, to: Status) -> bool {
        self.graph.contains_edge(from, to)
    }

    /// Statuses reachable from `from` in a single move, in column order.
    #[must_use]
    pub fn targets(&self, from: Status) -> Vec<Status> {
        let mut targets: Vec<_> = self
            .graph
            .neighbors_directed(from, Direction::Outgoing)
            .collect();
        targets.sort_unstable();
        targets
    }
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self::permissive()
    }
}

/// A validation applied to every transition the table allows.
///
/// Rules see the target status and the (trimmed, non-blank) comment, if one
/// was supplied.
pub trait TransitionRule: fmt::Debug + Send + Sync {
    /// Accept or refuse a transition into `target`.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] describing why the transition is refused.
    fn check(&self, target: Status, comment: Option<&str>) -> Result<(), ValidationError>;
}

/// Moving an idea to [`Status::Rejected`] requires a comment.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequireRejectionComment;

impl TransitionRule for RequireRejectionComment {
    fn check(&self, target: Status, comment: Option<&str>) -> Result<(), ValidationError> {
        if target == Status::Rejected && normalize_comment(comment).is_none() {
            return Err(ValidationError::MissingRequiredComment { target });
        }
        Ok(())
    }
}

/// A transition refused by a [`TransitionRule`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The target status needs an explanatory comment.
    #[error("moving to '{target}' requires a comment")]
    MissingRequiredComment {
        /// Status that demanded the comment.
        target: Status,
    },
    /// Refused by a custom rule.
    #[error("{0}")]
    Violation(String),
}

/// Why a transition could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// The idea is already in the target status.
    #[error("idea is already '{0}'")]
    SameStatus(Status),
    /// The transition table has no such edge.
    #[error("cannot move from '{from}' to '{to}'")]
    NotAllowed {
        /// Current status.
        from: Status,
        /// Requested status.
        to: Status,
    },
    /// A rule refused the transition.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Decides whether a status change is permitted and applies it.
#[derive(Debug)]
pub struct TransitionPolicy {
    table: TransitionTable,
    rules: Vec<Box<dyn TransitionRule>>,
}

impl Default for TransitionPolicy {
    fn default() -> Self {
        Self::new(TransitionTable::permissive())
    }
}

impl TransitionPolicy {
    /// A policy over the given table, with the rejection-comment rule
    /// installed.
    #[must_use]
    pub fn new(table: TransitionTable) -> Self {
        Self {
            table,
            rules: vec![Box::new(RequireRejectionComment)],
        }
    }

    /// Add a rule. Rules run in insertion order; the first refusal wins.
    #[must_use]
    pub fn with_rule(mut self, rule: impl TransitionRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// The underlying transition table.
    #[must_use]
    pub const fn table(&self) -> &TransitionTable {
        &self.table
    }

    /// Whether an idea in `current` may move to `target`.
    ///
    /// Always `false` when `current == target`.
    #[must_use]
    pub fn can_transition(&self, current: Status, target: Status) -> bool {
        self.table.allows(current, target)
    }

    /// Run every rule against a transition into `target`.
    ///
    /// A blank comment is treated as no comment.
    ///
    /// # Errors
    ///
    /// Returns the first rule violation.
    pub fn validate_transition(
        &self,
        target: Status,
        comment: Option<&str>,
    ) -> Result<(), ValidationError> {
        let comment = normalize_comment(comment);
        self.rules
            .iter()
            .try_for_each(|rule| rule.check(target, comment))
    }

    /// Whether moving to `target` cannot proceed without a comment.
    #[must_use]
    pub fn requires_comment(&self, target: Status) -> bool {
        self.validate_transition(target, None).is_err()
    }

    /// Compute the idea that results from moving `idea` to `target`.
    ///
    /// The input is not modified. On success the returned idea has the new
    /// status, a refreshed update timestamp, and the supplied comment (or the
    /// previous comment, if none was supplied).
    ///
    /// # Errors
    ///
    /// Fails if the idea is already in `target`, if the table has no such
    /// edge, or if a rule refuses the transition.
    pub fn apply_transition(
        &self,
        idea: &Idea,
        target: Status,
        comment: Option<&str>,
    ) -> Result<Idea, TransitionError> {
        let current = idea.status();
        if current == target {
            return Err(TransitionError::SameStatus(current));
        }
        if !self.can_transition(current, target) {
            return Err(TransitionError::NotAllowed {
                from: current,
                to: target,
            });
        }

        let comment = normalize_comment(comment);
        self.validate_transition(target, comment)?;

        let mut next = idea.clone();
        next.status = target;
        if let Some(comment) = comment {
            next.comment = Some(comment.to_string());
        }
        next.touch(Utc::now());

        Ok(next)
    }
}

/// Trim a comment, treating blank input as absent.
pub(crate) fn normalize_comment(comment: Option<&str>) -> Option<&str> {
    comment.map(str::trim).filter(|c| !c.is_empty())
}
