use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{Idea, Status};

/// Criteria for selecting ideas.
///
/// Every criterion that is set must match. Text criteria ignore case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdeaFilter {
    /// Substring of the title or description.
    pub search: Option<String>,
    /// Exact status.
    pub status: Option<Status>,
    /// Exact plant.
    pub plant: Option<String>,
    /// Exact author id.
    pub author: Option<String>,
    /// Exact category.
    pub category: Option<String>,
}

impl IdeaFilter {
    /// Whether the idea satisfies every criterion that is set.
    #[must_use]
    pub fn matches(&self, idea: &Idea) -> bool {
        if let Some(search) = &self.search {
            let needle = search.trim().to_lowercase();
            if !idea.title().to_lowercase().contains(&needle)
                && !idea.description().to_lowercase().contains(&needle)
            {
                return false;
            }
        }

        self.status.is_none_or(|status| idea.status() == status)
            && equal_ignoring_case(self.plant.as_deref(), idea.plant())
            && self
                .author
                .as_deref()
                .is_none_or(|author| idea.author().id == author)
            && equal_ignoring_case(self.category.as_deref(), idea.category())
    }
}

fn equal_ignoring_case(expected: Option<&str>, actual: &str) -> bool {
    expected.is_none_or(|expected| expected.trim().to_lowercase() == actual.to_lowercase())
}

/// Headline counts for a set of ideas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Number of ideas.
    pub total: usize,
    /// Ideas that are still moving: open, under review, or in progress.
    pub in_progress: usize,
    /// Ideas that reached [`Status::Implemented`].
    pub implemented: usize,
    /// Count per status. Every status is present, including empty ones.
    pub by_status: BTreeMap<Status, usize>,
}

impl Summary {
    /// Count the given ideas.
    pub fn of<'a>(ideas: impl IntoIterator<Item = &'a Idea>) -> Self {
        let mut by_status: BTreeMap<Status, usize> =
            Status::ALL.into_iter().map(|status| (status, 0)).collect();

        for idea in ideas {
            *by_status.entry(idea.status()).or_default() += 1;
        }

        let count = |status| by_status.get(&status).copied().unwrap_or_default();
        let in_progress =
            count(Status::Open) + count(Status::UnderReview) + count(Status::InProgress);
        let implemented = count(Status::Implemented);

        Self {
            total: by_status.values().sum(),
            in_progress,
            implemented,
            by_status,
        }
    }
}
