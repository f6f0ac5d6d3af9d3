// The serialized form of ideas.
//
// Domain types guarantee their invariants through constructors, so they are
// not deserialized directly. Records are plain data; converting a record into
// an `Idea` re-checks everything a hand-edited data file could break.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    Attachment, Author, CampaignRef, Field, Idea, InvalidFieldError, Priority, Status,
    idea::{Content, Metadata, required},
    transition::normalize_comment,
};

/// One idea as stored in the data file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdeaRecord {
    /// Identifier.
    pub id: Uuid,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Workflow status.
    pub status: Status,
    /// Priority.
    #[serde(default)]
    pub priority: Priority,
    /// Expected benefits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benefits: Option<String>,
    /// Implementation outline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementation: Option<String>,
    /// Attached files.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    /// Submitting employee.
    pub author: Author,
    /// Plant.
    pub plant: String,
    /// Functional area.
    pub area: String,
    /// Category.
    pub category: String,
    /// Campaign.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign: Option<CampaignRef>,
    /// Latest reviewer comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Creation time.
    pub created: DateTime<Utc>,
    /// Last update time.
    pub updated: DateTime<Utc>,
}

/// A record that does not describe a valid idea.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    /// A required field is empty.
    #[error("idea {id}: {source}")]
    Field {
        /// The offending record.
        id: Uuid,
        /// Which field.
        #[source]
        source: InvalidFieldError,
    },
    /// The update timestamp precedes the creation timestamp.
    #[error("idea {id} was updated before it was created")]
    Timestamps {
        /// The offending record.
        id: Uuid,
    },
}

impl From<&Idea> for IdeaRecord {
    fn from(idea: &Idea) -> Self {
        let Idea {
            id,
            content:
                Content {
                    title,
                    description,
                    priority,
                    benefits,
                    implementation,
                    attachments,
                },
            metadata:
                Metadata {
                    author,
                    plant,
                    area,
                    category,
                    campaign,
                },
            status,
            comment,
            created,
            updated,
        } = idea;

        Self {
            id: *id,
            title: title.as_str().to_string(),
            description: description.as_str().to_string(),
            status: *status,
            priority: *priority,
            benefits: benefits.clone(),
            implementation: implementation.clone(),
            attachments: attachments.clone(),
            author: author.clone(),
            plant: plant.as_str().to_string(),
            area: area.as_str().to_string(),
            category: category.as_str().to_string(),
            campaign: campaign.clone(),
            comment: comment.clone(),
            created: *created,
            updated: *updated,
        }
    }
}

impl TryFrom<IdeaRecord> for Idea {
    type Error = RecordError;

    fn try_from(record: IdeaRecord) -> Result<Self, Self::Error> {
        let IdeaRecord {
            id,
            title,
            description,
            status,
            priority,
            benefits,
            implementation,
            attachments,
            author,
            plant,
            area,
            category,
            campaign,
            comment,
            created,
            updated,
        } = record;

        let check = |field, value| {
            required(field, value).map_err(|source| RecordError::Field { id, source })
        };

        if author.id.trim().is_empty() || author.name.trim().is_empty() {
            return Err(RecordError::Field {
                id,
                source: InvalidFieldError {
                    field: Field::Author,
                },
            });
        }
        if updated < created {
            return Err(RecordError::Timestamps { id });
        }

        Ok(Self {
            id,
            content: Content {
                title: check(Field::Title, title)?,
                description: check(Field::Description, description)?,
                priority,
                benefits,
                implementation,
                attachments,
            },
            metadata: Metadata {
                author,
                plant: check(Field::Plant, plant)?,
                area: check(Field::Area, area)?,
                category: check(Field::Category, category)?,
                campaign,
            },
            status,
            comment: normalize_comment(comment.as_deref()).map(ToString::to_string),
            created,
            updated,
        })
    }
}

/// The contents of the data file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DataFileVersion", into = "DataFileVersion")]
pub(crate) struct DataFile {
    pub(crate) ideas: Vec<IdeaRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum DataFileVersion {
    #[serde(rename = "1")]
    V1 {
        #[serde(default)]
        ideas: Vec<IdeaRecord>,
    },
}

impl From<DataFileVersion> for DataFile {
    fn from(version: DataFileVersion) -> Self {
        match version {
            DataFileVersion::V1 { ideas } => Self { ideas },
        }
    }
}

impl From<DataFile> for DataFileVersion {
    fn from(file: DataFile) -> Self {
        Self::V1 { ideas: file.ideas }
    }
}
