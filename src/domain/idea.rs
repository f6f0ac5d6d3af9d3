use std::fmt;

use chrono::{DateTime, Utc};
use non_empty_string::NonEmptyString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Attachment, Priority, Status};

/// An improvement proposal moving through the review workflow.
///
/// Ideas are created through [`NewIdea::validate`] and the store, never
/// directly. Identity, authorship and location are fixed at creation; the
/// workflow position only changes through the transition policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Idea {
    pub(crate) id: Uuid,
    pub(crate) content: Content,
    pub(crate) metadata: Metadata,
    pub(crate) status: Status,
    /// Reviewer comment from the most recent transition that carried one.
    pub(crate) comment: Option<String>,
    pub(crate) created: DateTime<Utc>,
    pub(crate) updated: DateTime<Utc>,
}

/// The parts of an idea its author may still change while it is editable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Content {
    pub(crate) title: NonEmptyString,
    pub(crate) description: NonEmptyString,
    pub(crate) priority: Priority,
    pub(crate) benefits: Option<String>,
    pub(crate) implementation: Option<String>,
    pub(crate) attachments: Vec<Attachment>,
}

/// Descriptive metadata. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Metadata {
    pub(crate) author: Author,
    pub(crate) plant: NonEmptyString,
    pub(crate) area: NonEmptyString,
    pub(crate) category: NonEmptyString,
    pub(crate) campaign: Option<CampaignRef>,
}

/// The employee who submitted an idea.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Author {
    /// Stable user identifier.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// The campaign an idea was submitted to, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignRef {
    /// Campaign identifier.
    pub id: String,
    /// Campaign title at the time of submission.
    pub title: String,
}

impl Idea {
    pub(crate) fn from_draft(draft: IdeaDraft, id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            content: draft.content,
            metadata: draft.metadata,
            status: Status::INITIAL,
            comment: None,
            created: now,
            updated: now,
        }
    }

    /// The unique, immutable identifier of this idea.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Short title.
    #[must_use]
    pub fn title(&self) -> &str {
        self.content.title.as_str()
    }

    /// Free-text description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.content.description.as_str()
    }

    /// Current workflow position.
    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    /// Priority as set by the author.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.content.priority
    }

    /// Expected benefits, if described.
    #[must_use]
    pub fn benefits(&self) -> Option<&str> {
        self.content.benefits.as_deref()
    }

    /// Implementation outline, if described.
    #[must_use]
    pub fn implementation(&self) -> Option<&str> {
        self.content.implementation.as_deref()
    }

    /// Attached files.
    #[must_use]
    pub fn attachments(&self) -> &[Attachment] {
        &self.content.attachments
    }

    /// Who submitted the idea.
    #[must_use]
    pub const fn author(&self) -> &Author {
        &self.metadata.author
    }

    /// Plant the idea applies to.
    #[must_use]
    pub fn plant(&self) -> &str {
        self.metadata.plant.as_str()
    }

    /// Functional area the idea applies to.
    #[must_use]
    pub fn area(&self) -> &str {
        self.metadata.area.as_str()
    }

    /// Category, e.g. "Sostenibilidad".
    #[must_use]
    pub fn category(&self) -> &str {
        self.metadata.category.as_str()
    }

    /// Campaign the idea was submitted to.
    #[must_use]
    pub const fn campaign(&self) -> Option<&CampaignRef> {
        self.metadata.campaign.as_ref()
    }

    /// Latest reviewer comment.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// When the idea was submitted.
    #[must_use]
    pub const fn created(&self) -> DateTime<Utc> {
        self.created
    }

    /// When the idea was last changed.
    #[must_use]
    pub const fn updated(&self) -> DateTime<Utc> {
        self.updated
    }

    /// Whether the author may still edit or withdraw the idea.
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        self.status.is_editable()
    }

    /// Refresh the update timestamp.
    ///
    /// The timestamp never moves backwards, even if the wall clock does.
    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.updated = self.updated.max(now);
    }

    pub(crate) fn apply_patch(&mut self, patch: IdeaPatch, now: DateTime<Utc>) {
        let IdeaPatch {
            title,
            description,
            priority,
            benefits,
            implementation,
            attachments,
        } = patch;

        if let Some(title) = title {
            self.content.title = title;
        }
        if let Some(description) = description {
            self.content.description = description;
        }
        if let Some(priority) = priority {
            self.content.priority = priority;
        }
        if let Some(benefits) = benefits {
            self.content.benefits = benefits;
        }
        if let Some(implementation) = implementation {
            self.content.implementation = implementation;
        }
        if let Some(attachments) = attachments {
            self.content.attachments = attachments;
        }

        self.touch(now);
    }
}

/// Raw submission data, as collected by the idea form.
///
/// Call [`NewIdea::validate`] to obtain an [`IdeaDraft`] the store accepts.
#[derive(Debug, Clone, Default)]
pub struct NewIdea {
    /// Short title. Required.
    pub title: String,
    /// Free-text description. Required.
    pub description: String,
    /// Submitting employee. Both id and name are required.
    pub author: Author,
    /// Plant. Required.
    pub plant: String,
    /// Functional area. Required.
    pub area: String,
    /// Category. Required.
    pub category: String,
    /// Priority.
    pub priority: Priority,
    /// Expected benefits.
    pub benefits: Option<String>,
    /// Implementation outline.
    pub implementation: Option<String>,
    /// Campaign the idea is submitted to.
    pub campaign: Option<CampaignRef>,
    /// Files attached at submission.
    pub attachments: Vec<Attachment>,
}

impl NewIdea {
    /// Check the required fields.
    ///
    /// Surrounding whitespace is trimmed; a field containing only whitespace
    /// counts as empty. Blank optional fields are dropped.
    ///
    /// # Errors
    ///
    /// Returns the first required field that is empty.
    pub fn validate(self) -> Result<IdeaDraft, InvalidFieldError> {
        let title = required(Field::Title, self.title)?;
        let description = required(Field::Description, self.description)?;

        let author_id = self.author.id.trim();
        let author_name = self.author.name.trim();
        if author_id.is_empty() || author_name.is_empty() {
            return Err(InvalidFieldError {
                field: Field::Author,
            });
        }
        let author = Author {
            id: author_id.to_string(),
            name: author_name.to_string(),
        };

        let plant = required(Field::Plant, self.plant)?;
        let area = required(Field::Area, self.area)?;
        let category = required(Field::Category, self.category)?;

        Ok(IdeaDraft {
            content: Content {
                title,
                description,
                priority: self.priority,
                benefits: optional(self.benefits),
                implementation: optional(self.implementation),
                attachments: self.attachments,
            },
            metadata: Metadata {
                author,
                plant,
                area,
                category,
                campaign: self.campaign,
            },
        })
    }
}

/// Submission data whose required fields have been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdeaDraft {
    content: Content,
    metadata: Metadata,
}

impl IdeaDraft {
    /// Title of the idea to be created.
    #[must_use]
    pub fn title(&self) -> &str {
        self.content.title.as_str()
    }

    /// Plant of the idea to be created.
    #[must_use]
    pub fn plant(&self) -> &str {
        self.metadata.plant.as_str()
    }
}

/// A partial update to an editable idea.
///
/// Only content fields can be changed this way. Authorship, location and
/// workflow status are not reachable through a patch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdeaPatch {
    title: Option<NonEmptyString>,
    description: Option<NonEmptyString>,
    priority: Option<Priority>,
    benefits: Option<Option<String>>,
    implementation: Option<Option<String>>,
    attachments: Option<Vec<Attachment>>,
}

impl IdeaPatch {
    /// Replace the title.
    ///
    /// # Errors
    ///
    /// Returns an error if the title is blank.
    pub fn with_title(mut self, title: impl Into<String>) -> Result<Self, InvalidFieldError> {
        self.title = Some(required(Field::Title, title.into())?);
        Ok(self)
    }

    /// Replace the description.
    ///
    /// # Errors
    ///
    /// Returns an error if the description is blank.
    pub fn with_description(
        mut self,
        description: impl Into<String>,
    ) -> Result<Self, InvalidFieldError> {
        self.description = Some(required(Field::Description, description.into())?);
        Ok(self)
    }

    /// Replace the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Replace the expected benefits. A blank value clears them.
    #[must_use]
    pub fn with_benefits(mut self, benefits: impl Into<String>) -> Self {
        self.benefits = Some(optional(Some(benefits.into())));
        self
    }

    /// Replace the implementation outline. A blank value clears it.
    #[must_use]
    pub fn with_implementation(mut self, implementation: impl Into<String>) -> Self {
        self.implementation = Some(optional(Some(implementation.into())));
        self
    }

    /// Replace the attachment list.
    #[must_use]
    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = Some(attachments);
        self
    }

    /// Whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A required field of the submission form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Title
    Title,
    /// Description
    Description,
    /// Author id and name
    Author,
    /// Plant
    Plant,
    /// Area
    Area,
    /// Category
    Category,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Author => "author",
            Self::Plant => "plant",
            Self::Area => "area",
            Self::Category => "category",
        };
        f.write_str(name)
    }
}

/// A required field was empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("the {field} field is required")]
pub struct InvalidFieldError {
    /// The offending field.
    pub field: Field,
}

pub(crate) fn required(field: Field, value: String) -> Result<NonEmptyString, InvalidFieldError> {
    NonEmptyString::new(value.trim().to_string()).map_err(|_| InvalidFieldError { field })
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
