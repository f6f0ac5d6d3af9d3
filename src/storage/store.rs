//! The in-memory idea store
//!
//! The [`IdeaStore`] is the single owner of the idea collection. It knows
//! nothing about files or the board; it assigns identities, keeps insertion
//! order, and routes every status change through its [`TransitionPolicy`].

use std::collections::HashMap;

use chrono::Utc;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    domain::{
        Idea, IdeaDraft, IdeaPatch, Status, StatusChange, TransitionError, TransitionPolicy,
        transition::normalize_comment,
    },
    storage::{IdeaFilter, Summary},
};

/// An in-memory collection of ideas, in insertion order.
#[derive(Debug, Default)]
pub struct IdeaStore {
    /// The ideas, stored contiguously in insertion order.
    ideas: Vec<Idea>,

    /// An index from id to position in `ideas`.
    index: HashMap<Uuid, usize>,

    policy: TransitionPolicy,
}

/// The result of asking the store to move an idea.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The idea was already in the target status. Nothing was touched.
    Unchanged,
    /// The idea moved.
    Moved(StatusChange),
}

/// Errors returned by store mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No idea has the given id.
    #[error("idea {0} not found")]
    NotFound(Uuid),

    /// The idea has progressed past the editable statuses.
    #[error("idea {id} is '{status}' and can no longer be edited or deleted")]
    Locked {
        /// The idea.
        id: Uuid,
        /// Its current status.
        status: Status,
    },

    /// Two ideas share an id.
    #[error("duplicate idea id: {0}")]
    Duplicate(Uuid),

    /// The transition policy refused the move.
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

impl IdeaStore {
    /// An empty store governed by the given policy.
    #[must_use]
    pub fn new(policy: TransitionPolicy) -> Self {
        Self {
            ideas: Vec::new(),
            index: HashMap::new(),
            policy,
        }
    }

    /// A store pre-populated with existing ideas, e.g. loaded from disk.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Duplicate`] if two ideas share an id.
    pub fn from_ideas(
        policy: TransitionPolicy,
        ideas: impl IntoIterator<Item = Idea>,
    ) -> Result<Self, StoreError> {
        let mut store = Self::new(policy);
        for idea in ideas {
            store.insert(idea)?;
        }
        Ok(store)
    }

    fn insert(&mut self, idea: Idea) -> Result<(), StoreError> {
        let id = idea.id();
        if self.index.contains_key(&id) {
            return Err(StoreError::Duplicate(id));
        }
        self.index.insert(id, self.ideas.len());
        self.ideas.push(idea);
        Ok(())
    }

    /// The policy governing status changes.
    #[must_use]
    pub const fn policy(&self) -> &TransitionPolicy {
        &self.policy
    }

    /// Add a new idea in the initial status.
    ///
    /// The idea gets a fresh id, and its creation and update timestamps are
    /// both set to now.
    #[instrument(skip(self, draft), fields(title = draft.title()))]
    pub fn create(&mut self, draft: IdeaDraft) -> &Idea {
        let mut id = Uuid::new_v4();
        while self.index.contains_key(&id) {
            id = Uuid::new_v4();
        }

        let index = self.ideas.len();
        self.ideas.push(Idea::from_draft(draft, id, Utc::now()));
        self.index.insert(id, index);
        tracing::info!(%id, "created idea");

        &self.ideas[index]
    }

    /// Retrieves an idea by id.
    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&Idea> {
        self.index.get(&id).and_then(|&i| self.ideas.get(i))
    }

    fn position(&self, id: Uuid) -> Result<usize, StoreError> {
        self.index.get(&id).copied().ok_or(StoreError::NotFound(id))
    }

    fn editable_position(&self, id: Uuid) -> Result<usize, StoreError> {
        let position = self.position(id)?;
        let status = self.ideas[position].status();
        if status.is_editable() {
            Ok(position)
        } else {
            tracing::warn!(%id, %status, "idea is locked");
            Err(StoreError::Locked { id, status })
        }
    }

    /// Apply a patch to an editable idea and refresh its update timestamp.
    ///
    /// # Errors
    ///
    /// Fails if the idea does not exist, or if it is no longer in an
    /// editable status.
    #[instrument(skip(self, patch))]
    pub fn update(&mut self, id: Uuid, patch: IdeaPatch) -> Result<&Idea, StoreError> {
        let position = self.editable_position(id)?;
        let idea = &mut self.ideas[position];
        idea.apply_patch(patch, Utc::now());
        tracing::info!("updated idea");
        Ok(&*idea)
    }

    /// Remove an editable idea, returning it.
    ///
    /// # Errors
    ///
    /// Fails if the idea does not exist, or if it is no longer in an
    /// editable status.
    #[instrument(skip(self))]
    pub fn remove(&mut self, id: Uuid) -> Result<Idea, StoreError> {
        let position = self.editable_position(id)?;
        let idea = self.ideas.remove(position);
        self.index.remove(&id);
        for slot in self.index.values_mut() {
            if *slot > position {
                *slot -= 1;
            }
        }
        tracing::info!("deleted idea");
        Ok(idea)
    }

    /// Move an idea to another status.
    ///
    /// Moving an idea to the status it is already in is a no-op: neither the
    /// update timestamp nor the comment change. Otherwise the move is
    /// validated by the policy before anything is modified.
    ///
    /// # Errors
    ///
    /// Fails if the idea does not exist or if the policy refuses the move.
    /// On failure the idea is unchanged.
    #[instrument(skip(self, comment))]
    pub fn move_idea(
        &mut self,
        id: Uuid,
        target: Status,
        comment: Option<&str>,
    ) -> Result<MoveOutcome, StoreError> {
        let position = self.position(id)?;
        let current = &self.ideas[position];
        let from = current.status();
        if from == target {
            tracing::debug!(%from, "idea already in target status");
            return Ok(MoveOutcome::Unchanged);
        }

        let next = self
            .policy
            .apply_transition(current, target, comment)
            .inspect_err(|e| tracing::warn!(%from, %target, "move refused: {e}"))?;

        let change = StatusChange {
            idea_id: id,
            title: next.title().to_string(),
            author_id: next.author().id.clone(),
            from,
            to: target,
            comment: normalize_comment(comment).map(ToString::to_string),
        };
        self.ideas[position] = next;
        tracing::info!(%from, %target, "moved idea");

        Ok(MoveOutcome::Moved(change))
    }

    /// Iterate over all ideas in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Idea> {
        self.ideas.iter()
    }

    /// Ideas in the given status, in insertion order.
    pub fn by_status(&self, status: Status) -> impl Iterator<Item = &Idea> {
        self.ideas.iter().filter(move |idea| idea.status() == status)
    }

    /// Ideas submitted by the given author, in insertion order.
    pub fn by_author<'a>(&'a self, author_id: &'a str) -> impl Iterator<Item = &'a Idea> + 'a {
        self.ideas
            .iter()
            .filter(move |idea| idea.author().id == author_id)
    }

    /// Ideas matching the filter, in insertion order.
    pub fn filter<'a>(&'a self, filter: &'a IdeaFilter) -> impl Iterator<Item = &'a Idea> + 'a {
        self.ideas.iter().filter(move |idea| filter.matches(idea))
    }

    /// Headline counts over the whole collection.
    #[must_use]
    pub fn summary(&self) -> Summary {
        Summary::of(&self.ideas)
    }

    /// Number of ideas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ideas.len()
    }

    /// Whether the store holds no ideas.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ideas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::domain::{
        Priority, TransitionTable, ValidationError, idea::tests::new_idea,
    };

    fn store_with(titles: &[(&str, &str)]) -> (IdeaStore, Vec<Uuid>) {
        let mut store = IdeaStore::default();
        let ids = titles
            .iter()
            .map(|(title, author)| {
                store
                    .create(new_idea(title, author).validate().unwrap())
                    .id()
            })
            .collect();
        (store, ids)
    }

    fn move_to(store: &mut IdeaStore, id: Uuid, path: &[Status]) {
        for &status in path {
            store.move_idea(id, status, Some("ok")).unwrap();
        }
    }

    #[test]
    fn create_starts_open_with_equal_timestamps() {
        let (store, ids) = store_with(&[("Reduce energy use", "user1")]);
        let idea = store.get(ids[0]).unwrap();

        assert_eq!(idea.status(), Status::Open);
        assert_eq!(idea.created(), idea.updated());
        assert_eq!(idea.comment(), None);
    }

    #[test]
    fn created_ideas_are_found_exactly_once() {
        let (store, ids) = store_with(&[("a", "user1"), ("b", "user2"), ("c", "user1")]);

        let by_author: Vec<_> = store.by_author("user2").map(Idea::id).collect();
        assert_eq!(by_author, [ids[1]]);

        let open: Vec<_> = store.by_status(Status::INITIAL).map(Idea::id).collect();
        assert_eq!(open, ids);
    }

    #[test]
    fn ids_are_unique() {
        let (store, ids) = store_with(&[("a", "user1"), ("a", "user1")]);
        assert_ne!(ids[0], ids[1]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn moving_to_same_status_touches_nothing() {
        let (mut store, ids) = store_with(&[("a", "user1")]);
        move_to(&mut store, ids[0], &[Status::CommitteeReview]);
        let before = store.get(ids[0]).unwrap().clone();

        let outcome = store
            .move_idea(ids[0], Status::CommitteeReview, Some("otra vez"))
            .unwrap();

        assert_eq!(outcome, MoveOutcome::Unchanged);
        assert_eq!(store.get(ids[0]).unwrap(), &before);
    }

    #[test_case(None; "absent")]
    #[test_case(Some(""); "empty")]
    #[test_case(Some(" \t "); "whitespace")]
    fn rejection_needs_comment(comment: Option<&str>) {
        let (mut store, ids) = store_with(&[("a", "user1")]);
        move_to(&mut store, ids[0], &[Status::CommitteeReview]);

        let error = store
            .move_idea(ids[0], Status::Rejected, comment)
            .unwrap_err();

        assert_eq!(
            error,
            StoreError::Transition(TransitionError::Invalid(
                ValidationError::MissingRequiredComment {
                    target: Status::Rejected
                }
            ))
        );
        assert_eq!(store.get(ids[0]).unwrap().status(), Status::CommitteeReview);
    }

    #[test]
    fn rejection_with_comment_is_recorded() {
        let (mut store, ids) = store_with(&[("a", "user1")]);
        move_to(&mut store, ids[0], &[Status::CommitteeReview]);
        let before = store.get(ids[0]).unwrap().updated();

        let outcome = store
            .move_idea(
                ids[0],
                Status::Rejected,
                Some("Duplicate of existing initiative"),
            )
            .unwrap();

        let idea = store.get(ids[0]).unwrap();
        assert_eq!(idea.status(), Status::Rejected);
        assert_eq!(idea.comment(), Some("Duplicate of existing initiative"));
        assert!(idea.updated() >= before);
        let MoveOutcome::Moved(change) = outcome else {
            panic!("expected a move");
        };
        assert_eq!(change.from, Status::CommitteeReview);
        assert_eq!(change.to, Status::Rejected);
        assert_eq!(change.author_id, "user1");
    }

    #[test]
    fn moving_without_comment_keeps_previous_one() {
        let (mut store, ids) = store_with(&[("a", "user1")]);
        store
            .move_idea(ids[0], Status::CommitteeReview, Some("pending review"))
            .unwrap();

        store.move_idea(ids[0], Status::Approved, None).unwrap();

        let idea = store.get(ids[0]).unwrap();
        assert_eq!(idea.status(), Status::Approved);
        assert_eq!(idea.comment(), Some("pending review"));
    }

    #[test]
    fn timestamps_are_monotonic() {
        let (mut store, ids) = store_with(&[("a", "user1")]);
        let id = ids[0];
        let mut last = store.get(id).unwrap().updated();

        let patch = IdeaPatch::default().with_priority(Priority::High);
        store.update(id, patch).unwrap();
        for status in [
            Status::UnderReview,
            Status::CommitteeReview,
            Status::Approved,
            Status::InProgress,
            Status::Implemented,
        ] {
            store.move_idea(id, status, None).unwrap();
            let idea = store.get(id).unwrap();
            assert!(idea.updated() >= last);
            assert!(idea.updated() >= idea.created());
            last = idea.updated();
        }
    }

    #[test]
    fn unknown_ids_are_reported() {
        let (mut store, _) = store_with(&[("a", "user1")]);
        let missing = Uuid::new_v4();

        assert_eq!(
            store.update(missing, IdeaPatch::default()).unwrap_err(),
            StoreError::NotFound(missing)
        );
        assert_eq!(
            store.remove(missing).unwrap_err(),
            StoreError::NotFound(missing)
        );
        assert_eq!(
            store.move_idea(missing, Status::Approved, None).unwrap_err(),
            StoreError::NotFound(missing)
        );
    }

    #[test_case(Status::Open, true)]
    #[test_case(Status::UnderReview, true)]
    #[test_case(Status::CommitteeReview, false)]
    #[test_case(Status::Approved, false)]
    #[test_case(Status::Implemented, false)]
    fn edits_are_limited_to_early_statuses(status: Status, editable: bool) {
        let (mut store, ids) = store_with(&[("a", "user1")]);
        if status != Status::Open {
            move_to(&mut store, ids[0], &[status]);
        }

        let patch = IdeaPatch::default().with_title("b").unwrap();
        let result = store.update(ids[0], patch);

        if editable {
            assert_eq!(result.unwrap().title(), "b");
        } else {
            assert_eq!(
                result.unwrap_err(),
                StoreError::Locked { id: ids[0], status }
            );
            assert!(store.remove(ids[0]).is_err());
        }
    }

    #[test]
    fn remove_keeps_order_of_the_rest() {
        let (mut store, ids) = store_with(&[("a", "user1"), ("b", "user1"), ("c", "user1")]);

        let removed = store.remove(ids[1]).unwrap();

        assert_eq!(removed.title(), "b");
        assert!(store.get(ids[1]).is_none());
        assert_eq!(store.get(ids[2]).unwrap().title(), "c");
        let titles: Vec<_> = store.iter().map(Idea::title).collect();
        assert_eq!(titles, ["a", "c"]);
    }

    #[test]
    fn from_ideas_rejects_duplicates() {
        let (store, ids) = store_with(&[("a", "user1")]);
        let idea = store.get(ids[0]).unwrap().clone();

        let error =
            IdeaStore::from_ideas(TransitionPolicy::default(), [idea.clone(), idea]).unwrap_err();

        assert_eq!(error, StoreError::Duplicate(ids[0]));
    }

    #[test]
    fn linear_policy_is_enforced() {
        let mut store = IdeaStore::new(TransitionPolicy::new(TransitionTable::linear()));
        let id = store
            .create(new_idea("a", "user1").validate().unwrap())
            .id();

        let error = store.move_idea(id, Status::Approved, None).unwrap_err();

        assert!(matches!(
            error,
            StoreError::Transition(TransitionError::NotAllowed { .. })
        ));
    }

    #[test]
    fn filter_and_summary() {
        let (mut store, ids) = store_with(&[("Reciclaje", "user1"), ("Energía", "user2")]);
        move_to(&mut store, ids[1], &[Status::Implemented]);

        let filter = IdeaFilter {
            search: Some("recic".to_string()),
            ..IdeaFilter::default()
        };
        let found: Vec<_> = store.filter(&filter).map(Idea::id).collect();
        assert_eq!(found, [ids[0]]);

        let summary = store.summary();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.implemented, 1);
        assert_eq!(summary.in_progress, 1);
    }
}
