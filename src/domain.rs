//! Domain models for the idea lifecycle.
//!
//! This module contains the core domain types: ideas and their attachments,
//! workflow statuses, the transition policy that governs how ideas move
//! between statuses, and the notifications raised when they do.

/// Files attached to ideas.
pub mod attachment;
pub use attachment::{Attachment, PendingUpload, StoredAttachment};

mod config;
pub use config::{Config, Workflow};

/// Idea domain model and the submission form.
pub mod idea;
pub use idea::{Author, CampaignRef, Field, Idea, IdeaDraft, IdeaPatch, InvalidFieldError, NewIdea};

pub mod notification;
pub use notification::{Inbox, Notification, Severity, StatusChange, StatusObserver};

mod status;
pub use status::{Priority, Status, UnknownPriorityError, UnknownStatusError};

pub mod transition;
pub use transition::{
    RequireRejectionComment, TransitionError, TransitionPolicy, TransitionRule, TransitionTable,
    ValidationError,
};
