//! Storage of ideas: the in-memory store, queries over it, and persistence.

mod query;
pub use query::{IdeaFilter, Summary};

mod record;
pub use record::{IdeaRecord, RecordError};

pub mod repository;
pub use repository::{Repository, RepositoryError, YamlFileRepository};

mod store;
pub use store::{IdeaStore, MoveOutcome, StoreError};

mod workspace;
pub use workspace::{Workspace, WorkspaceError};
