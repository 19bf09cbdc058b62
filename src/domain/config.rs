use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};

use crate::domain::{DirectoryOptions, TeamNormalization, directory::DEFAULT_MIN_USER_ID};

/// Configuration for an analysis run.
///
/// This struct holds the settings that control how the user directory is
/// built: which accounts are excluded and how team names are normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Versions", into = "Versions")]
pub struct Config {
    /// Users with an id below this are platform accounts and are excluded.
    min_user_id: i64,

    /// A higher id threshold applied only in staging mode.
    ///
    /// Staging sites are seeded with demo accounts, which this filters out.
    staging_min_user_id: Option<i64>,

    /// Whether trailing numbers are stripped from team names.
    ///
    /// For example, 'PM63' becomes 'PM' and 'Engineering 2.1' becomes
    /// 'Engineering'. Cannot be combined with `team_rename`.
    strip_team_numbers: bool,

    /// Team renames, keyed by the upstream team name.
    ///
    /// Teams that are not listed are kept as-is. Cannot be combined with
    /// `strip_team_numbers`.
    team_rename: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_user_id: DEFAULT_MIN_USER_ID,
            staging_min_user_id: None,
            strip_team_numbers: false,
            team_rename: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, if the TOML content is
    /// invalid, or if mutually exclusive settings are combined.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Returns the minimum user id.
    #[must_use]
    pub const fn min_user_id(&self) -> i64 {
        self.min_user_id
    }

    /// Returns the staging threshold, if configured.
    #[must_use]
    pub const fn staging_min_user_id(&self) -> Option<i64> {
        self.staging_min_user_id
    }

    /// Switches to stripping trailing numbers from team names.
    ///
    /// Any configured renames are discarded.
    pub fn strip_team_numbers(&mut self) {
        self.team_rename.clear();
        self.strip_team_numbers = true;
    }

    /// Switches to renaming teams with the given mapping.
    ///
    /// Disables stripping of trailing numbers.
    pub fn rename_teams(&mut self, mapping: BTreeMap<String, String>) {
        self.strip_team_numbers = false;
        self.team_rename = mapping;
    }

    /// Applies command line choices on top of the loaded configuration.
    ///
    /// A rename mapping replaces the configured normalization, as does
    /// `strip`. When both are given, the rename mapping wins.
    #[must_use]
    pub fn with_overrides(
        mut self,
        rename: Option<BTreeMap<String, String>>,
        strip: bool,
    ) -> Self {
        if let Some(mapping) = rename {
            self.rename_teams(mapping);
        } else if strip {
            self.strip_team_numbers();
        }
        self
    }

    /// The configured team normalization.
    #[must_use]
    pub fn normalization(&self) -> TeamNormalization {
        if self.strip_team_numbers {
            TeamNormalization::StripTrailingNumber
        } else if self.team_rename.is_empty() {
            TeamNormalization::PassThrough
        } else {
            TeamNormalization::Rename(self.team_rename.clone())
        }
    }

    /// Options for building the user directory.
    ///
    /// The staging threshold only applies when `staging` is set.
    #[must_use]
    pub fn directory_options(&self, staging: bool) -> DirectoryOptions {
        DirectoryOptions {
            min_user_id: self.min_user_id,
            staging_min_user_id: self.staging_min_user_id.filter(|_| staging),
            normalization: self.normalization(),
        }
    }
}

const fn default_min_user_id() -> i64 {
    DEFAULT_MIN_USER_ID
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_min_user_id")]
        min_user_id: i64,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        staging_min_user_id: Option<i64>,

        #[serde(default)]
        strip_team_numbers: bool,

        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        team_rename: BTreeMap<String, String>,
    },
}

impl TryFrom<Versions> for Config {
    type Error = String;

    fn try_from(versions: Versions) -> Result<Self, Self::Error> {
        match versions {
            Versions::V1 {
                min_user_id,
                staging_min_user_id,
                strip_team_numbers,
                team_rename,
            } => {
                if strip_team_numbers && !team_rename.is_empty() {
                    return Err(
                        "'strip_team_numbers' and 'team_rename' cannot be used together"
                            .to_string(),
                    );
                }
                Ok(Self {
                    min_user_id,
                    staging_min_user_id,
                    strip_team_numbers,
                    team_rename,
                })
            }
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            min_user_id: config.min_user_id,
            staging_min_user_id: config.staging_min_user_id,
            strip_team_numbers: config.strip_team_numbers,
            team_rename: config.team_rename,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"_version = \"1\"\nmin_user_id = 5\nstaging_min_user_id = 28000\n\n[team_rename]\nEng = \"Engineering\"\n",
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.min_user_id(), 5);
        assert_eq!(config.staging_min_user_id(), Some(28000));
        assert_eq!(
            config.normalization(),
            TeamNormalization::Rename(BTreeMap::from([(
                "Eng".to_string(),
                "Engineering".to_string()
            )]))
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
        file.write_all(b"_version = \"1\"\nmin_user_id = \"two\"\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.starts_with("Failed to parse config file:"));
    }

    #[test]
    fn rejects_conflicting_normalization() {
        let result: Result<Config, _> = toml::from_str(
            "_version = \"1\"\nstrip_team_numbers = true\n\n[team_rename]\nA = \"B\"\n",
        );
        assert!(result.is_err());
    }

    #[test]
    fn empty_file_returns_default() {
        // Tests that deserialising an empty file returns the default configuration.
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn serializes_round_trip() {
        let config: Config = toml::from_str(
            "_version = \"1\"\nstaging_min_user_id = 100\nstrip_team_numbers = true\n",
        )
        .unwrap();

        let serialized = toml::to_string(&config).unwrap();

        assert!(serialized.contains("_version = \"1\""));
        assert_eq!(toml::from_str::<Config>(&serialized).unwrap(), config);
    }

    #[test]
    fn staging_threshold_requires_staging_mode() {
        let config: Config =
            toml::from_str("_version = \"1\"\nstaging_min_user_id = 28000\n").unwrap();

        assert_eq!(config.directory_options(false).staging_min_user_id, None);
        assert_eq!(
            config.directory_options(true).staging_min_user_id,
            Some(28_000)
        );
    }

    #[test]
    fn strip_flag_overrides_file_rename() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\n\n[team_rename]\nEng = \"Engineering\"\n")
            .unwrap();
        let config = Config::load(file.path()).unwrap();

        let config = config.with_overrides(None, true);

        assert_eq!(config.normalization(), TeamNormalization::StripTrailingNumber);
    }

    #[test]
    fn rename_flag_overrides_file_strip() {
        let config: Config =
            toml::from_str("_version = \"1\"\nstrip_team_numbers = true\n").unwrap();
        let mapping = BTreeMap::from([("PM63".to_string(), "Product".to_string())]);

        let config = config.with_overrides(Some(mapping.clone()), true);

        assert_eq!(config.normalization(), TeamNormalization::Rename(mapping));
    }

    #[test]
    fn no_overrides_keep_file_choice() {
        let config: Config =
            toml::from_str("_version = \"1\"\nstrip_team_numbers = true\n").unwrap();

        let config = config.with_overrides(None, false);

        assert_eq!(config.normalization(), TeamNormalization::StripTrailingNumber);
    }

    #[test]
    fn later_normalization_choice_wins() {
        let mut config = Config::default();
        config.strip_team_numbers();
        config.rename_teams(BTreeMap::from([("A".to_string(), "B".to_string())]));

        assert!(matches!(
            config.normalization(),
            TeamNormalization::Rename(_)
        ));
    }
}
