use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// The workflow position of an idea.
///
/// This is a closed set. Each variant is rendered as one column of the
/// review board, in declaration order, and serializes to its Spanish label.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Status {
    /// Freshly submitted (`Abierta`).
    #[serde(rename = "Abierta")]
    Open,
    /// Being assessed by the area owner (`En Revisión`).
    #[serde(rename = "En Revisión")]
    UnderReview,
    /// Awaiting a verdict from the directors' committee (`Evalúa CoDir`).
    #[serde(rename = "Evalúa CoDir")]
    CommitteeReview,
    /// Approved for implementation (`Aprobada`).
    #[serde(rename = "Aprobada")]
    Approved,
    /// Implementation underway (`En Progreso`).
    #[serde(rename = "En Progreso")]
    InProgress,
    /// Done (`Implementada`).
    #[serde(rename = "Implementada")]
    Implemented,
    /// Not going ahead (`Rechazada`).
    #[serde(rename = "Rechazada")]
    Rejected,
}

impl Status {
    /// Every status, in board column order.
    pub const ALL: [Self; 7] = [
        Self::Open,
        Self::UnderReview,
        Self::CommitteeReview,
        Self::Approved,
        Self::InProgress,
        Self::Implemented,
        Self::Rejected,
    ];

    /// The status assigned to newly created ideas.
    pub const INITIAL: Self = Self::Open;

    /// The label shown to users.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Open => "Abierta",
            Self::UnderReview => "En Revisión",
            Self::CommitteeReview => "Evalúa CoDir",
            Self::Approved => "Aprobada",
            Self::InProgress => "En Progreso",
            Self::Implemented => "Implementada",
            Self::Rejected => "Rechazada",
        }
    }

    /// Stable ASCII name, convenient on the command line.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::UnderReview => "under-review",
            Self::CommitteeReview => "committee-review",
            Self::Approved => "approved",
            Self::InProgress => "in-progress",
            Self::Implemented => "implemented",
            Self::Rejected => "rejected",
        }
    }

    /// Short description displayed under the column header.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Open => "Ideas recién creadas",
            Self::UnderReview => "Siendo evaluadas por responsables",
            Self::CommitteeReview => "Pendientes de votación",
            Self::Approved => "Aprobadas para implementar",
            Self::InProgress => "En proceso de implementación",
            Self::Implemented => "Completadas exitosamente",
            Self::Rejected => "No aprobadas",
        }
    }

    /// Whether the author may still edit or withdraw an idea in this status.
    #[must_use]
    pub const fn is_editable(self) -> bool {
        matches!(self, Self::Open | Self::UnderReview)
    }

    /// Whether the idea has reached the end of the happy path (or left it).
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Implemented | Self::Rejected)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Status {
    type Err = UnknownStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| {
                status.label().to_lowercase() == needle.to_lowercase()
                    || status.key().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| UnknownStatusError(s.to_string()))
    }
}

/// A status string that is not part of the workflow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status '{0}'")]
pub struct UnknownStatusError(String);

/// How urgent the author considers an idea. Informational only.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Priority {
    /// `Alta`
    #[serde(rename = "Alta")]
    High,
    /// `Media`
    #[default]
    #[serde(rename = "Media")]
    Medium,
    /// `Baja`
    #[serde(rename = "Baja")]
    Low,
}

impl Priority {
    /// The label shown to users.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "Alta",
            Self::Medium => "Media",
            Self::Low => "Baja",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Priority {
    type Err = UnknownPriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "alta" | "high" => Ok(Self::High),
            "media" | "medium" => Ok(Self::Medium),
            "baja" | "low" => Ok(Self::Low),
            _ => Err(UnknownPriorityError(s.to_string())),
        }
    }
}

/// A priority string that is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown priority '{0}'")]
pub struct UnknownPriorityError(String);
