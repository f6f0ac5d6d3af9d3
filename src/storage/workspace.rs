//! A directory holding an idea board
//!
//! A workspace is any directory containing an `.inspira` folder with a
//! `config.toml` and a data file. The [`Workspace`] ties the configuration,
//! the on-disk repository and the in-memory [`Board`] together.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::instrument;
use uuid::Uuid;

use crate::{
    board::{Board, BoardError},
    domain::{Config, Idea, InvalidFieldError, NewIdea},
    storage::{
        IdeaStore, Repository, RepositoryError, StoreError, YamlFileRepository,
        record::DataFile,
    },
};

const WORKSPACE_DIR: &str = ".inspira";
const CONFIG_FILE: &str = "config.toml";

/// Errors raised while opening or modifying a workspace.
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    /// `init` found an existing workspace.
    #[error("workspace already initialised (found {})", .0.display())]
    AlreadyInitialised(PathBuf),

    /// The workspace directory could not be created.
    #[error("failed to create {path}: {source}")]
    Io {
        /// The directory or file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// The configuration could not be read or written.
    #[error("{0}")]
    Config(String),

    /// The data file could not be read or written.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The stored ideas are inconsistent.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The board refused the operation.
    #[error(transparent)]
    Board(#[from] BoardError),

    /// A submitted idea is missing a required field.
    #[error(transparent)]
    InvalidField(#[from] InvalidFieldError),

    /// A submitted idea names a plant outside the configured list.
    #[error("plant '{0}' is not one of the configured plants")]
    PlantNotAllowed(String),

    /// No idea id starts with the given prefix.
    #[error("no idea matches '{0}'")]
    UnknownId(String),

    /// More than one idea id starts with the given prefix.
    #[error("'{prefix}' matches {matches} ideas; use a longer prefix")]
    AmbiguousId {
        /// The prefix given.
        prefix: String,
        /// How many ids start with it.
        matches: usize,
    },
}

/// An opened workspace.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    config: Config,
    repository: YamlFileRepository,
    board: Board,
}

impl Workspace {
    /// Create a new workspace in `root` with the default configuration and
    /// an empty data file.
    ///
    /// # Errors
    ///
    /// Fails if the workspace already exists or the files cannot be written.
    #[instrument]
    pub fn init(root: PathBuf) -> Result<Self, WorkspaceError> {
        let dir = root.join(WORKSPACE_DIR);
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            return Err(WorkspaceError::AlreadyInitialised(config_path));
        }

        fs::create_dir_all(&dir).map_err(|source| WorkspaceError::Io {
            path: dir.clone(),
            source,
        })?;

        let config = Config::default();
        config.save(&config_path).map_err(WorkspaceError::Config)?;

        let data_path = dir.join(config.data_file());
        if !data_path.exists() {
            let empty =
                serde_yaml::to_string(&DataFile::default()).map_err(|source| {
                    RepositoryError::Yaml {
                        path: data_path.clone(),
                        source,
                    }
                })?;
            fs::write(&data_path, empty).map_err(|source| WorkspaceError::Io {
                path: data_path.clone(),
                source,
            })?;
        }
        tracing::info!("Initialised workspace in {}", root.display());

        Self::open(root)
    }

    /// Open the workspace in `root`.
    ///
    /// A missing configuration file falls back to the defaults, and a missing
    /// data file to an empty board.
    ///
    /// # Errors
    ///
    /// Fails if the configuration or data file exist but cannot be read.
    #[instrument]
    pub fn open(root: PathBuf) -> Result<Self, WorkspaceError> {
        let dir = root.join(WORKSPACE_DIR);
        let config = load_config(&dir.join(CONFIG_FILE))?;
        let repository = YamlFileRepository::new(dir.join(config.data_file()));

        let ideas = repository.load()?;
        let store = IdeaStore::from_ideas(config.policy(), ideas)?;

        Ok(Self {
            root,
            config,
            repository,
            board: Board::new(store),
        })
    }

    /// The directory containing `.inspira`.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The workspace configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The board.
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// The board, for making changes.
    ///
    /// Changes are in memory only until [`Workspace::persist`] is called.
    pub const fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    /// Validate and add a new idea, and write it to disk.
    ///
    /// # Errors
    ///
    /// Fails if a required field is empty, if the plant is not configured, or
    /// if the idea cannot be stored.
    pub fn submit(&mut self, idea: NewIdea) -> Result<Uuid, WorkspaceError> {
        let draft = idea.validate()?;
        if !self.config.is_plant_allowed(draft.plant()) {
            tracing::warn!(plant = draft.plant(), "plant not allowed");
            return Err(WorkspaceError::PlantNotAllowed(draft.plant().to_string()));
        }

        let id = self.board.create(draft)?.id();
        self.persist(id)?;
        Ok(id)
    }

    /// Write the current state of one idea to disk.
    ///
    /// If the idea is no longer on the board it is removed from disk.
    ///
    /// # Errors
    ///
    /// Fails if the data file cannot be read or written.
    pub fn persist(&mut self, id: Uuid) -> Result<(), WorkspaceError> {
        match self.board.store().get(id) {
            Some(idea) => self.repository.save(idea)?,
            None => self.repository.remove(id)?,
        }
        Ok(())
    }

    /// Find the idea whose id starts with `prefix`.
    ///
    /// Hyphens are optional and case is ignored.
    ///
    /// # Errors
    ///
    /// Fails if no idea, or more than one idea, matches.
    pub fn resolve(&self, prefix: &str) -> Result<&Idea, WorkspaceError> {
        let needle: String = prefix
            .trim()
            .chars()
            .filter(|c| *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        if needle.is_empty() {
            return Err(WorkspaceError::UnknownId(prefix.to_string()));
        }

        let mut matches = self
            .board
            .store()
            .iter()
            .filter(|idea| idea.id().simple().to_string().starts_with(&needle));

        match (matches.next(), matches.count()) {
            (Some(idea), 0) => Ok(idea),
            (None, _) => Err(WorkspaceError::UnknownId(prefix.to_string())),
            (Some(_), more) => Err(WorkspaceError::AmbiguousId {
                prefix: prefix.to_string(),
                matches: more + 1,
            }),
        }
    }
}

fn load_config(path: &Path) -> Result<Config, WorkspaceError> {
    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(Config::default());
    }
    Config::load(path).map_err(WorkspaceError::Config)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::{
        board::DropOutcome,
        domain::{Status, Workflow, idea::tests::new_idea},
    };

    #[test]
    fn init_creates_config_and_data_file() {
        let tmp = TempDir::new().unwrap();

        let workspace = Workspace::init(tmp.path().to_path_buf()).unwrap();

        assert!(tmp.path().join(".inspira/config.toml").is_file());
        assert!(tmp.path().join(".inspira/ideas.yaml").is_file());
        assert!(workspace.board().store().is_empty());
    }

    #[test]
    fn init_twice_fails() {
        let tmp = TempDir::new().unwrap();
        Workspace::init(tmp.path().to_path_buf()).unwrap();

        assert!(matches!(
            Workspace::init(tmp.path().to_path_buf()).unwrap_err(),
            WorkspaceError::AlreadyInitialised(_)
        ));
    }

    #[test]
    fn open_without_init_is_empty() {
        let tmp = TempDir::new().unwrap();
        let workspace = Workspace::open(tmp.path().to_path_buf()).unwrap();
        assert!(workspace.board().store().is_empty());
        assert_eq!(workspace.config(), &Config::default());
    }

    #[test]
    fn changes_survive_reopening() {
        let tmp = TempDir::new().unwrap();
        let mut workspace = Workspace::init(tmp.path().to_path_buf()).unwrap();

        let kept = workspace.submit(new_idea("Reciclaje", "user1")).unwrap();
        let dropped = workspace.submit(new_idea("Energía", "user2")).unwrap();
        workspace
            .board_mut()
            .on_drop(kept, Status::CommitteeReview)
            .unwrap();
        workspace.persist(kept).unwrap();
        workspace.board_mut().remove(dropped).unwrap();
        workspace.persist(dropped).unwrap();

        let reopened = Workspace::open(tmp.path().to_path_buf()).unwrap();
        let ideas: Vec<_> = reopened.board().store().iter().collect();
        assert_eq!(ideas.len(), 1);
        assert_eq!(ideas[0].id(), kept);
        assert_eq!(ideas[0].status(), Status::CommitteeReview);
        assert_eq!(ideas[0], workspace.board().store().get(kept).unwrap());
    }

    #[test]
    fn configured_workflow_is_used() {
        let tmp = TempDir::new().unwrap();
        Workspace::init(tmp.path().to_path_buf()).unwrap();
        let mut config = Config::default();
        config.workflow = Workflow::Linear;
        config.save(&tmp.path().join(".inspira/config.toml")).unwrap();

        let mut workspace = Workspace::open(tmp.path().to_path_buf()).unwrap();
        let id = workspace.submit(new_idea("Reciclaje", "user1")).unwrap();

        assert!(workspace.board_mut().on_drop(id, Status::Approved).is_err());
        assert!(matches!(
            workspace.board_mut().on_drop(id, Status::UnderReview),
            Ok(DropOutcome::Moved(_))
        ));
    }

    #[test]
    fn plants_are_checked_on_submit() {
        let tmp = TempDir::new().unwrap();
        Workspace::init(tmp.path().to_path_buf()).unwrap();
        let mut config = Config::default();
        config.add_plant("Planta Sur".to_string());
        config.save(&tmp.path().join(".inspira/config.toml")).unwrap();
        let mut workspace = Workspace::open(tmp.path().to_path_buf()).unwrap();

        let error = workspace.submit(new_idea("Reciclaje", "user1")).unwrap_err();

        assert!(matches!(error, WorkspaceError::PlantNotAllowed(plant) if plant == "Planta Norte"));
        assert!(workspace.board().store().is_empty());
    }

    #[test]
    fn invalid_submission_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let mut workspace = Workspace::init(tmp.path().to_path_buf()).unwrap();

        let error = workspace.submit(new_idea("  ", "user1")).unwrap_err();

        assert!(matches!(error, WorkspaceError::InvalidField(_)));
    }

    #[test]
    fn ids_resolve_from_unique_prefix() {
        let tmp = TempDir::new().unwrap();
        let mut workspace = Workspace::init(tmp.path().to_path_buf()).unwrap();
        let id = workspace.submit(new_idea("Reciclaje", "user1")).unwrap();
        let full = id.to_string();

        assert_eq!(workspace.resolve(&full).unwrap().id(), id);
        assert_eq!(workspace.resolve(&full[..8].to_uppercase()).unwrap().id(), id);
        assert!(matches!(
            workspace.resolve("zzz"),
            Err(WorkspaceError::UnknownId(_))
        ));
        assert!(matches!(
            workspace.resolve(""),
            Err(WorkspaceError::UnknownId(_))
        ));
    }

    #[test]
    fn ambiguous_prefix_is_reported() {
        let tmp = TempDir::new().unwrap();
        let mut workspace = Workspace::init(tmp.path().to_path_buf()).unwrap();
        for title in ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n", "o", "p", "q"] {
            workspace.submit(new_idea(title, "user1")).unwrap();
        }

        // With 17 ideas, at least two ids share a first hex digit.
        let error = (0..16)
            .map(|digit| format!("{digit:x}"))
            .find_map(|prefix| match workspace.resolve(&prefix) {
                Err(e @ WorkspaceError::AmbiguousId { .. }) => Some(e),
                _ => None,
            });

        assert!(error.is_some());
    }
}
