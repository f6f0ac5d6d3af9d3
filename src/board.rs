//! The review board
//!
//! The [`Board`] presents the idea store as one column per status and turns
//! drops onto a column into status changes. A drop that needs a comment is
//! parked in a pending slot until the comment arrives or the drop is
//! cancelled; nothing else on the board may change in the meantime.

use std::{collections::BTreeMap, fmt};

use tracing::instrument;
use uuid::Uuid;

use crate::{
    domain::{
        Idea, IdeaDraft, IdeaPatch, Status, StatusChange, StatusObserver, TransitionError,
        transition::normalize_comment,
    },
    storage::{IdeaStore, MoveOutcome, StoreError},
};

/// Ideas grouped into board columns.
///
/// Every status has a column, in declaration order, even when it is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Columns<'a> {
    columns: BTreeMap<Status, Vec<&'a Idea>>,
}

impl<'a> Columns<'a> {
    /// The ideas in one column, in insertion order.
    #[must_use]
    pub fn get(&self, status: Status) -> &[&'a Idea] {
        self.columns
            .get(&status)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Iterate over the columns in board order.
    pub fn iter(&self) -> impl Iterator<Item = (Status, &[&'a Idea])> {
        self.columns
            .iter()
            .map(|(&status, ideas)| (status, ideas.as_slice()))
    }

    /// Number of columns. Always the number of statuses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Always `false`; a board has a column for every status.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Group ideas by status.
pub fn group_by_status<'a>(ideas: impl IntoIterator<Item = &'a Idea>) -> Columns<'a> {
    let mut columns: BTreeMap<Status, Vec<&Idea>> =
        Status::ALL.into_iter().map(|s| (s, Vec::new())).collect();
    for idea in ideas {
        columns.entry(idea.status()).or_default().push(idea);
    }
    Columns { columns }
}

/// A drop waiting for a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTransition {
    /// The idea being moved.
    pub idea_id: Uuid,
    /// Its status when it was picked up.
    pub from: Status,
    /// The column it was dropped on.
    pub to: Status,
}

/// What happened when an idea was dropped on a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// Dropped on its own column.
    Unchanged,
    /// The idea moved.
    Moved(StatusChange),
    /// The target needs a comment; call [`Board::commit_transition`] or
    /// [`Board::cancel_transition`].
    AwaitingComment(PendingTransition),
}

/// The committee's decision on an idea under committee review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Approve for implementation.
    Approve,
    /// Reject.
    Reject,
}

impl Verdict {
    /// The status an idea moves to.
    #[must_use]
    pub const fn target(self) -> Status {
        match self {
            Self::Approve => Status::Approved,
            Self::Reject => Status::Rejected,
        }
    }

    /// The comment recorded when the committee gives none.
    #[must_use]
    pub const fn default_comment(self) -> &'static str {
        match self {
            Self::Approve => "Aprobada por CoDir",
            Self::Reject => "Rechazada por CoDir",
        }
    }
}

/// Errors raised by the board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// A previous drop is still waiting for its comment.
    #[error("idea {} is waiting for a comment before moving to '{}'", .0.idea_id, .0.to)]
    PendingTransition(PendingTransition),

    /// There is no pending drop to commit.
    #[error("no transition is waiting for a comment")]
    NoPendingTransition,

    /// A verdict was given for an idea that is not under committee review.
    #[error("idea {id} is '{status}', not awaiting a committee verdict")]
    NotAwaitingVerdict {
        /// The idea.
        id: Uuid,
        /// Its current status.
        status: Status,
    },

    /// The store refused the operation.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The idea store, presented as columns, with change notification.
pub struct Board {
    store: IdeaStore,
    pending: Option<PendingTransition>,
    observers: Vec<Box<dyn StatusObserver>>,
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("store", &self.store)
            .field("pending", &self.pending)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Board {
    /// A board over the given store.
    #[must_use]
    pub fn new(store: IdeaStore) -> Self {
        Self {
            store,
            pending: None,
            observers: Vec::new(),
        }
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &IdeaStore {
        &self.store
    }

    /// Register an observer for committed status changes.
    pub fn subscribe(&mut self, observer: impl StatusObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// The current columns.
    #[must_use]
    pub fn columns(&self) -> Columns<'_> {
        group_by_status(self.store.iter())
    }

    /// The drop waiting for a comment, if any.
    #[must_use]
    pub const fn pending(&self) -> Option<&PendingTransition> {
        self.pending.as_ref()
    }

    fn ensure_idle(&self) -> Result<(), BoardError> {
        match self.pending {
            Some(pending) => {
                tracing::warn!(idea = %pending.idea_id, "board is waiting for a comment");
                Err(BoardError::PendingTransition(pending))
            }
            None => Ok(()),
        }
    }

    fn notify(&mut self, change: &StatusChange) {
        for observer in &mut self.observers {
            observer.status_changed(change);
        }
    }

    fn commit(
        &mut self,
        id: Uuid,
        target: Status,
        comment: Option<&str>,
    ) -> Result<MoveOutcome, StoreError> {
        let outcome = self.store.move_idea(id, target, comment)?;
        if let MoveOutcome::Moved(change) = &outcome {
            self.notify(change);
        }
        Ok(outcome)
    }

    /// Drop an idea on a column.
    ///
    /// Dropping an idea on its own column does nothing. If moving to the
    /// target needs a comment, the move is parked and the idea stays where it
    /// is; otherwise it moves immediately.
    ///
    /// # Errors
    ///
    /// Fails if another drop is pending, if the idea does not exist, or if the
    /// policy does not allow the move.
    pub fn on_drop(&mut self, id: Uuid, target: Status) -> Result<DropOutcome, BoardError> {
        self.on_drop_with_comment(id, target, None)
    }

    /// Drop an idea on a column, carrying a comment for the move.
    ///
    /// The comment is recorded on the idea whenever the move goes through.
    /// If the policy refuses the move with this comment, the move is parked
    /// exactly as [`Board::on_drop`] does when no comment is given.
    ///
    /// # Errors
    ///
    /// Fails if another drop is pending, if the idea does not exist, or if the
    /// policy does not allow the move.
    #[instrument(skip(self, comment))]
    pub fn on_drop_with_comment(
        &mut self,
        id: Uuid,
        target: Status,
        comment: Option<&str>,
    ) -> Result<DropOutcome, BoardError> {
        self.ensure_idle()?;

        let from = self
            .store
            .get(id)
            .ok_or(StoreError::NotFound(id))?
            .status();
        if from == target {
            return Ok(DropOutcome::Unchanged);
        }

        let policy = self.store.policy();
        if !policy.can_transition(from, target) {
            tracing::warn!(%from, %target, "drop refused");
            return Err(StoreError::from(TransitionError::NotAllowed { from, to: target }).into());
        }

        if policy.validate_transition(target, comment).is_err() {
            let pending = PendingTransition {
                idea_id: id,
                from,
                to: target,
            };
            tracing::debug!("waiting for comment");
            self.pending = Some(pending);
            return Ok(DropOutcome::AwaitingComment(pending));
        }

        match self.commit(id, target, comment)? {
            MoveOutcome::Moved(change) => Ok(DropOutcome::Moved(change)),
            MoveOutcome::Unchanged => Ok(DropOutcome::Unchanged),
        }
    }

    /// Complete the pending drop with a comment.
    ///
    /// If the comment is still not acceptable the drop stays pending, so the
    /// caller can ask again. Any other failure discards it.
    ///
    /// # Errors
    ///
    /// Fails if nothing is pending, or if the move is refused.
    #[instrument(skip(self, comment))]
    pub fn commit_transition(&mut self, comment: Option<&str>) -> Result<MoveOutcome, BoardError> {
        let pending = self.pending.ok_or(BoardError::NoPendingTransition)?;

        match self.commit(pending.idea_id, pending.to, comment) {
            Ok(outcome) => {
                self.pending = None;
                Ok(outcome)
            }
            Err(e @ StoreError::Transition(TransitionError::Invalid(_))) => {
                tracing::warn!("comment refused: {e}");
                Err(e.into())
            }
            Err(e) => {
                self.pending = None;
                Err(e.into())
            }
        }
    }

    /// Discard the pending drop, leaving the idea where it was.
    pub fn cancel_transition(&mut self) -> Option<PendingTransition> {
        let pending = self.pending.take();
        if let Some(pending) = &pending {
            tracing::debug!(idea = %pending.idea_id, "transition cancelled");
        }
        pending
    }

    /// Record the committee's verdict on an idea under committee review.
    ///
    /// Without a comment, a standard one is recorded.
    ///
    /// # Errors
    ///
    /// Fails if a drop is pending, if the idea does not exist, if it is not
    /// under committee review, or if the policy refuses the move.
    #[instrument(skip(self, comment))]
    pub fn record_verdict(
        &mut self,
        id: Uuid,
        verdict: Verdict,
        comment: Option<&str>,
    ) -> Result<StatusChange, BoardError> {
        self.ensure_idle()?;

        let status = self
            .store
            .get(id)
            .ok_or(StoreError::NotFound(id))?
            .status();
        if status != Status::CommitteeReview {
            tracing::warn!(%status, "idea is not awaiting a verdict");
            return Err(BoardError::NotAwaitingVerdict { id, status });
        }

        let comment = normalize_comment(comment).unwrap_or(verdict.default_comment());
        match self.commit(id, verdict.target(), Some(comment))? {
            MoveOutcome::Moved(change) => Ok(change),
            MoveOutcome::Unchanged => Err(BoardError::NotAwaitingVerdict { id, status }),
        }
    }

    /// Add a new idea.
    ///
    /// # Errors
    ///
    /// Fails if a drop is pending.
    pub fn create(&mut self, draft: IdeaDraft) -> Result<&Idea, BoardError> {
        self.ensure_idle()?;
        Ok(self.store.create(draft))
    }

    /// Edit an idea.
    ///
    /// # Errors
    ///
    /// Fails if a drop is pending, or if the store refuses the edit.
    pub fn update(&mut self, id: Uuid, patch: IdeaPatch) -> Result<&Idea, BoardError> {
        self.ensure_idle()?;
        Ok(self.store.update(id, patch)?)
    }

    /// Delete an idea.
    ///
    /// # Errors
    ///
    /// Fails if a drop is pending, or if the store refuses the deletion.
    pub fn remove(&mut self, id: Uuid) -> Result<Idea, BoardError> {
        self.ensure_idle()?;
        Ok(self.store.remove(id)?)
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::domain::{
        Inbox, TransitionPolicy, TransitionTable, ValidationError, idea::tests::new_idea,
    };

    fn board_with(titles: &[&str]) -> (Board, Vec<Uuid>) {
        let mut board = Board::new(IdeaStore::default());
        let ids = titles
            .iter()
            .map(|title| {
                board
                    .create(new_idea(title, "user1").validate().unwrap())
                    .unwrap()
                    .id()
            })
            .collect();
        (board, ids)
    }

    fn recorder(board: &mut Board) -> Rc<RefCell<Vec<StatusChange>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        board.subscribe(move |change: &StatusChange| sink.borrow_mut().push(change.clone()));
        seen
    }

    #[test]
    fn grouping_an_empty_collection_has_every_column() {
        let ideas: Vec<Idea> = Vec::new();
        let columns = group_by_status(&ideas);

        assert_eq!(columns.len(), Status::ALL.len());
        let order: Vec<_> = columns.iter().map(|(status, _)| status).collect();
        assert_eq!(order, Status::ALL);
        assert!(columns.iter().all(|(_, ideas)| ideas.is_empty()));
    }

    #[test]
    fn grouping_keeps_insertion_order_within_columns() {
        let (mut board, ids) = board_with(&["a", "b", "c"]);
        board.on_drop(ids[1], Status::Approved).unwrap();

        let columns = board.columns();

        let open: Vec<_> = columns.get(Status::Open).iter().map(|i| i.id()).collect();
        assert_eq!(open, [ids[0], ids[2]]);
        assert_eq!(columns.get(Status::Approved).len(), 1);
        assert!(columns.get(Status::Rejected).is_empty());
    }

    #[test]
    fn drop_on_own_column_is_a_no_op() {
        let (mut board, ids) = board_with(&["a"]);
        let seen = recorder(&mut board);
        let before = board.store().get(ids[0]).unwrap().clone();

        assert_eq!(
            board.on_drop(ids[0], Status::Open).unwrap(),
            DropOutcome::Unchanged
        );
        assert_eq!(board.store().get(ids[0]).unwrap(), &before);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn drop_moves_and_notifies() {
        let (mut board, ids) = board_with(&["a"]);
        let seen = recorder(&mut board);

        let outcome = board.on_drop(ids[0], Status::UnderReview).unwrap();

        let DropOutcome::Moved(change) = outcome else {
            panic!("expected a move");
        };
        assert_eq!(change.to, Status::UnderReview);
        assert_eq!(*seen.borrow(), [change]);
    }

    #[test]
    fn rejection_waits_for_comment() {
        let (mut board, ids) = board_with(&["a", "b"]);
        let seen = recorder(&mut board);

        let outcome = board.on_drop(ids[0], Status::Rejected).unwrap();
        let pending = PendingTransition {
            idea_id: ids[0],
            from: Status::Open,
            to: Status::Rejected,
        };
        assert_eq!(outcome, DropOutcome::AwaitingComment(pending));
        assert_eq!(board.store().get(ids[0]).unwrap().status(), Status::Open);

        // Everything else is blocked until the drop is resolved.
        assert_eq!(
            board.on_drop(ids[1], Status::Approved).unwrap_err(),
            BoardError::PendingTransition(pending)
        );
        assert!(board.remove(ids[1]).is_err());
        assert!(
            board
                .create(new_idea("c", "user1").validate().unwrap())
                .is_err()
        );

        // A blank comment is refused and the drop stays pending.
        let error = board.commit_transition(Some("  ")).unwrap_err();
        assert_eq!(
            error,
            BoardError::Store(StoreError::Transition(TransitionError::Invalid(
                ValidationError::MissingRequiredComment {
                    target: Status::Rejected
                }
            )))
        );
        assert_eq!(board.pending(), Some(&pending));
        assert!(seen.borrow().is_empty());

        let outcome = board.commit_transition(Some("Duplicada")).unwrap();

        assert!(matches!(outcome, MoveOutcome::Moved(_)));
        assert_eq!(board.pending(), None);
        let idea = board.store().get(ids[0]).unwrap();
        assert_eq!(idea.status(), Status::Rejected);
        assert_eq!(idea.comment(), Some("Duplicada"));
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn drop_with_comment_records_it() {
        let (mut board, ids) = board_with(&["a", "b"]);
        let seen = recorder(&mut board);

        let outcome = board
            .on_drop_with_comment(ids[0], Status::Approved, Some("Presupuesto aprobado"))
            .unwrap();
        let rejected = board
            .on_drop_with_comment(ids[1], Status::Rejected, Some("Duplicada"))
            .unwrap();

        let DropOutcome::Moved(change) = outcome else {
            panic!("expected a move");
        };
        assert_eq!(change.comment.as_deref(), Some("Presupuesto aprobado"));
        assert!(matches!(rejected, DropOutcome::Moved(_)));
        assert_eq!(board.pending(), None);
        assert_eq!(
            board.store().get(ids[0]).unwrap().comment(),
            Some("Presupuesto aprobado")
        );
        assert_eq!(board.store().get(ids[1]).unwrap().comment(), Some("Duplicada"));
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn drop_with_blank_comment_waits_for_another() {
        let (mut board, ids) = board_with(&["a"]);

        let outcome = board
            .on_drop_with_comment(ids[0], Status::Rejected, Some("   "))
            .unwrap();

        assert!(matches!(outcome, DropOutcome::AwaitingComment(_)));
        assert_eq!(board.store().get(ids[0]).unwrap().status(), Status::Open);
        assert!(board.commit_transition(Some("Fuera de alcance")).is_ok());
        assert_eq!(board.store().get(ids[0]).unwrap().status(), Status::Rejected);
    }

    #[test]
    fn cancelling_leaves_the_idea_untouched() {
        let (mut board, ids) = board_with(&["a"]);
        let before = board.store().get(ids[0]).unwrap().clone();

        board.on_drop(ids[0], Status::Rejected).unwrap();
        let cancelled = board.cancel_transition().unwrap();

        assert_eq!(cancelled.idea_id, ids[0]);
        assert_eq!(board.pending(), None);
        assert_eq!(board.store().get(ids[0]).unwrap(), &before);
        assert_eq!(
            board.commit_transition(Some("tarde")).unwrap_err(),
            BoardError::NoPendingTransition
        );
        assert!(board.on_drop(ids[0], Status::UnderReview).is_ok());
    }

    #[test]
    fn disallowed_drop_is_refused_before_prompting() {
        let policy = TransitionPolicy::new(TransitionTable::linear());
        let mut board = Board::new(IdeaStore::new(policy));
        let id = board
            .create(new_idea("a", "user1").validate().unwrap())
            .unwrap()
            .id();

        let error = board.on_drop(id, Status::Rejected).unwrap_err();

        assert_eq!(
            error,
            BoardError::Store(StoreError::Transition(TransitionError::NotAllowed {
                from: Status::Open,
                to: Status::Rejected
            }))
        );
        assert_eq!(board.pending(), None);
    }

    #[test]
    fn verdicts_apply_only_under_committee_review() {
        let (mut board, ids) = board_with(&["a", "b"]);
        let inbox = Rc::new(RefCell::new(Inbox::new()));
        let sink = Rc::clone(&inbox);
        board.subscribe(move |change: &StatusChange| sink.borrow_mut().status_changed(change));

        assert_eq!(
            board
                .record_verdict(ids[0], Verdict::Approve, None)
                .unwrap_err(),
            BoardError::NotAwaitingVerdict {
                id: ids[0],
                status: Status::Open
            }
        );

        board.on_drop(ids[0], Status::CommitteeReview).unwrap();
        board.on_drop(ids[1], Status::CommitteeReview).unwrap();

        let approved = board
            .record_verdict(ids[0], Verdict::Approve, None)
            .unwrap();
        let rejected = board
            .record_verdict(ids[1], Verdict::Reject, Some("Sin presupuesto"))
            .unwrap();

        assert_eq!(approved.comment.as_deref(), Some("Aprobada por CoDir"));
        assert_eq!(
            board.store().get(ids[1]).unwrap().comment(),
            Some("Sin presupuesto")
        );
        assert_eq!(rejected.to, Status::Rejected);
        assert_eq!(inbox.borrow().len(), 4);
        assert_eq!(inbox.borrow().unread_count(), 4);
    }

    #[test]
    fn verdict_refused_by_the_table_is_an_error() {
        let mut table = TransitionTable::linear();
        assert!(table.forbid(Status::CommitteeReview, Status::Approved));
        let mut board = Board::new(IdeaStore::new(TransitionPolicy::new(table)));
        let id = board
            .create(new_idea("a", "user1").validate().unwrap())
            .unwrap()
            .id();
        board.on_drop(id, Status::UnderReview).unwrap();
        board.on_drop(id, Status::CommitteeReview).unwrap();

        let error = board.record_verdict(id, Verdict::Approve, None).unwrap_err();

        assert_eq!(
            error,
            BoardError::Store(StoreError::Transition(TransitionError::NotAllowed {
                from: Status::CommitteeReview,
                to: Status::Approved
            }))
        );
        assert_eq!(
            board.store().get(id).unwrap().status(),
            Status::CommitteeReview
        );
        assert!(board.record_verdict(id, Verdict::Reject, None).is_ok());
    }

    #[test]
    fn unknown_idea_is_reported() {
        let (mut board, _) = board_with(&[]);
        let missing = Uuid::new_v4();

        assert_eq!(
            board.on_drop(missing, Status::Approved).unwrap_err(),
            BoardError::Store(StoreError::NotFound(missing))
        );
    }
}
