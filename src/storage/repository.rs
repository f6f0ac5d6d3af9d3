//! Persistence behind the idea store
//!
//! A [`Repository`] loads the idea collection at startup and writes back
//! individual ideas as they change. The store itself never touches the
//! filesystem.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    domain::Idea,
    storage::record::{DataFile, IdeaRecord, RecordError},
};

/// Durable storage for ideas.
pub trait Repository {
    /// Load every stored idea, in insertion order.
    ///
    /// # Errors
    ///
    /// Fails if the storage cannot be read or holds an invalid idea.
    fn load(&self) -> Result<Vec<Idea>, RepositoryError>;

    /// Insert or replace an idea, matched by id.
    ///
    /// # Errors
    ///
    /// Fails if the storage cannot be read or written.
    fn save(&mut self, idea: &Idea) -> Result<(), RepositoryError>;

    /// Remove an idea. Removing an unknown id is not an error.
    ///
    /// # Errors
    ///
    /// Fails if the storage cannot be read or written.
    fn remove(&mut self, id: Uuid) -> Result<(), RepositoryError>;
}

/// Errors raised by a [`Repository`].
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// The data file could not be read or written.
    #[error("failed to access {path}: {source}")]
    Io {
        /// The data file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// The data file is not valid YAML, or has an unknown shape.
    #[error("failed to parse {path}: {source}")]
    Yaml {
        /// The data file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: serde_yaml::Error,
    },

    /// The data file contains an invalid idea.
    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Stores the whole collection in a single versioned YAML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YamlFileRepository {
    path: PathBuf,
}

impl YamlFileRepository {
    /// A repository backed by the file at `path`.
    ///
    /// The file does not need to exist yet.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// The data file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> RepositoryError {
        RepositoryError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read(&self) -> Result<DataFile, RepositoryError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No data file at {}, starting empty", self.path.display());
                return Ok(DataFile::default());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        if content.trim().is_empty() {
            return Ok(DataFile::default());
        }

        serde_yaml::from_str(&content).map_err(|source| RepositoryError::Yaml {
            path: self.path.clone(),
            source,
        })
    }

    fn write(&self, file: &DataFile) -> Result<(), RepositoryError> {
        let content = serde_yaml::to_string(file).map_err(|source| RepositoryError::Yaml {
            path: self.path.clone(),
            source,
        })?;

        let dir = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;

        // Readers see either the old document or the new one, never a torn write.
        let mut staged = NamedTempFile::new_in(dir).map_err(|e| self.io_error(e))?;
        staged
            .write_all(content.as_bytes())
            .and_then(|()| staged.as_file().sync_all())
            .map_err(|e| self.io_error(e))?;
        staged
            .persist(&self.path)
            .map_err(|e| self.io_error(e.error))?;
        tracing::debug!(
            "Wrote {} ideas to {}",
            file.ideas.len(),
            self.path.display()
        );
        Ok(())
    }
}

impl Repository for YamlFileRepository {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<Vec<Idea>, RepositoryError> {
        let file = self.read()?;
        let ideas = file
            .ideas
            .into_iter()
            .map(Idea::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!("Loaded {} ideas", ideas.len());
        Ok(ideas)
    }

    #[instrument(skip(self, idea), fields(id = %idea.id()))]
    fn save(&mut self, idea: &Idea) -> Result<(), RepositoryError> {
        let mut file = self.read()?;
        let record = IdeaRecord::from(idea);
        match file.ideas.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => file.ideas.push(record),
        }
        self.write(&file)
    }

    #[instrument(skip(self))]
    fn remove(&mut self, id: Uuid) -> Result<(), RepositoryError> {
        let mut file = self.read()?;
        let before = file.ideas.len();
        file.ideas.retain(|r| r.id != id);
        if file.ideas.len() == before {
            tracing::debug!("Idea not present in data file");
            return Ok(());
        }
        self.write(&file)
    }
}
