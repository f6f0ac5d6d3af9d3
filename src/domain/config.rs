use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{TransitionPolicy, TransitionTable};

/// Configuration for an idea workspace.
///
/// Controls which status changes the board accepts, where ideas are stored,
/// and which plants ideas may be filed against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Which transition table the board uses.
    pub workflow: Workflow,

    /// Name of the data file, relative to the workspace's `.inspira`
    /// directory.
    data_file: PathBuf,

    /// Plants ideas may be filed against.
    ///
    /// If this is empty, any plant is accepted.
    plants: Vec<String>,
}

/// The shape of the status graph.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Workflow {
    /// Any column may be dragged to any other column.
    #[default]
    Permissive,
    /// Only the happy path is allowed.
    Linear,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workflow: Workflow::default(),
            data_file: default_data_file(),
            plants: Vec::new(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// The data file name, relative to the `.inspira` directory.
    #[must_use]
    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    /// Returns the allowed plants, if configured.
    #[must_use]
    pub fn plants(&self) -> &[String] {
        &self.plants
    }

    /// Checks if a plant is allowed by the configuration.
    ///
    /// If no plants are configured, all plants are allowed. Otherwise the
    /// comparison ignores case.
    #[must_use]
    pub fn is_plant_allowed(&self, plant: &str) -> bool {
        self.plants.is_empty()
            || self
                .plants
                .iter()
                .any(|p| p.to_lowercase() == plant.trim().to_lowercase())
    }

    /// Adds a plant to the allowed list.
    ///
    /// Returns `true` if the plant was added, `false` if it already existed.
    pub fn add_plant(&mut self, plant: String) -> bool {
        let plant = plant.trim().to_string();
        if self.plants.iter().any(|p| p.eq_ignore_ascii_case(&plant)) {
            false
        } else {
            self.plants.push(plant);
            true
        }
    }

    /// Removes a plant from the allowed list.
    ///
    /// Returns `true` if the plant was removed, `false` if it didn't exist.
    pub fn remove_plant(&mut self, plant: &str) -> bool {
        if let Some(pos) = self
            .plants
            .iter()
            .position(|p| p.eq_ignore_ascii_case(plant.trim()))
        {
            self.plants.remove(pos);
            true
        } else {
            false
        }
    }

    /// Build the transition policy described by this configuration.
    #[must_use]
    pub fn policy(&self) -> TransitionPolicy {
        let table = match self.workflow {
            Workflow::Permissive => TransitionTable::permissive(),
            Workflow::Linear => TransitionTable::linear(),
        };
        TransitionPolicy::new(table)
    }
}

fn default_data_file() -> PathBuf {
    PathBuf::from("ideas.yaml")
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default)]
        workflow: Workflow,

        #[serde(default = "default_data_file")]
        data_file: PathBuf,

        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        plants: Vec<String>,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                workflow,
                data_file,
                plants,
            } => Self {
                workflow,
                data_file,
                plants,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            workflow: config.workflow,
            data_file: config.data_file,
            plants: config.plants,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::domain::Status;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"_version = \"1\"\nworkflow = \"linear\"\ndata_file = \"board.yaml\"\nplants = [\"Planta Norte\", \"CLH\"]\n",
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.workflow, Workflow::Linear);
        assert_eq!(config.data_file(), Path::new("board.yaml"));
        assert_eq!(
            config.plants(),
            &["Planta Norte".to_string(), "CLH".to_string()]
        );
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(error.starts_with("Failed to read config file:"));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nworkflow = \"chaotic\"\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.starts_with("Failed to parse config file:"));
    }

    #[test]
    fn empty_file_returns_default() {
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        let mut config = Config::default();
        config.workflow = Workflow::Linear;
        config.add_plant("AGSA".to_string());

        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn plant_whitelist() {
        let mut config = Config::default();
        assert!(config.is_plant_allowed("anywhere"));

        assert!(config.add_plant("Planta Sur".to_string()));
        assert!(!config.add_plant("planta sur".to_string()));
        assert!(config.is_plant_allowed(" PLANTA SUR "));
        assert!(!config.is_plant_allowed("Planta Norte"));

        assert!(config.remove_plant("Planta Sur"));
        assert!(!config.remove_plant("Planta Sur"));
        assert!(config.is_plant_allowed("Planta Norte"));
    }

    #[test]
    fn workflow_selects_table() {
        let mut config = Config::default();
        assert!(config.policy().can_transition(Status::Open, Status::Implemented));

        config.workflow = Workflow::Linear;
        assert!(!config.policy().can_transition(Status::Open, Status::Implemented));
    }
}
