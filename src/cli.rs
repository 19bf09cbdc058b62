use std::path::{Path, PathBuf};

mod analyze;
mod teams;
mod terminal;

use analyze::Analyze;
use anyhow::Context;
use clap::ArgAction;
use interactions::{Config, UserDirectory, load_users, storage::load_team_rename};
use teams::Teams;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The path to the configuration file
    ///
    /// Defaults are used if the file does not exist.
    #[arg(short, long, default_value = "interactions.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let config = load_config(&self.config)?;
        self.command.run(config)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

fn load_config(path: &Path) -> anyhow::Result<Config> {
    if !path.exists() {
        tracing::debug!("No config file at {}, using defaults", path.display());
        return Ok(Config::default());
    }
    Config::load(path).map_err(|e| anyhow::anyhow!("{}: {e}", path.display()))
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Build the team interaction matrix from users and questions
    ///
    /// Writes the normalized users, the interaction records, the matrix as CSV
    /// and the chord diagram input into the output directory.
    Analyze(Analyze),

    /// Show how many users belong to each team
    ///
    /// Useful for checking team normalization before a full analysis.
    Teams(Teams),
}

impl Command {
    fn run(self, config: Config) -> anyhow::Result<()> {
        match self {
            Self::Analyze(command) => command.run(config)?,
            Self::Teams(command) => command.run(config)?,
        }
        Ok(())
    }
}

/// Arguments for loading and indexing the user list.
#[derive(Debug, clap::Args)]
pub struct DirectoryArgs {
    /// JSON export of the user list
    #[arg(long, short, value_name = "FILE", default_value = "users.json")]
    users: PathBuf,

    /// CSV file of team renames, with 'old_team_name' and 'new_team_name'
    /// columns
    #[arg(long, value_name = "CSV", conflicts_with = "remove_team_numbers")]
    team_rename: Option<PathBuf>,

    /// Remove trailing numbers from team names (e.g. PM63 becomes PM)
    #[arg(long)]
    remove_team_numbers: bool,

    /// Also exclude users below the staging id threshold
    #[arg(long)]
    staging: bool,
}

impl DirectoryArgs {
    /// Loads the user list and builds the directory, with command line flags
    /// taking precedence over the configuration file.
    fn load(&self, config: Config) -> anyhow::Result<UserDirectory> {
        let rename = self
            .team_rename
            .as_deref()
            .map(load_team_rename)
            .transpose()?;
        let config = config.with_overrides(rename, self.remove_team_numbers);

        if self.staging && config.staging_min_user_id().is_none() {
            tracing::warn!("--staging has no effect: no 'staging_min_user_id' is configured");
        }

        let users = load_users(&self.users)
            .with_context(|| format!("failed to load users from {}", self.users.display()))?;
        Ok(UserDirectory::build(users, &config.directory_options(self.staging)))
    }
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[cfg(test)]
mod tests {
    use std::fs;

    use clap::Parser;

    use super::*;

    fn users_file(dir: &Path) -> PathBuf {
        let path = dir.join("users.json");
        fs::write(
            &path,
            r#"[{"id": 2, "department": "PM63"}, {"id": 3, "department": "Eng"}]"#,
        )
        .unwrap();
        path
    }

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("team-interactions").chain(args.iter().copied()))
    }

    fn directory_args(cli: Cli) -> DirectoryArgs {
        match cli.command {
            Command::Teams(teams) => teams.directory,
            Command::Analyze(_) => panic!("expected the teams command"),
        }
    }

    #[test]
    fn rename_and_strip_flags_conflict() {
        let result = parse(&["teams", "--team-rename", "renames.csv", "--remove-team-numbers"]);

        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::ArgumentConflict
        );
    }

    #[test]
    fn strip_flag_overrides_configured_rename() {
        let tmp = tempfile::tempdir().unwrap();
        let users = users_file(tmp.path());
        let config: Config =
            toml::from_str("_version = \"1\"\n\n[team_rename]\nPM63 = \"Product\"\n")
                .unwrap();
        let cli = parse(&["teams", "--users", users.to_str().unwrap(), "--remove-team-numbers"])
            .unwrap();

        let directory = directory_args(cli).load(config).unwrap();

        assert_eq!(directory.team_of(2.into()).map(|t| t.as_str()), Some("PM"));
    }

    #[test]
    fn rename_file_reaches_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let users = users_file(tmp.path());
        let renames = tmp.path().join("renames.csv");
        fs::write(&renames, "old_team_name,new_team_name\nEng,Engineering\n").unwrap();
        let cli = parse(&[
            "teams",
            "--users",
            users.to_str().unwrap(),
            "--team-rename",
            renames.to_str().unwrap(),
        ])
        .unwrap();

        let directory = directory_args(cli).load(Config::default()).unwrap();

        assert_eq!(
            directory.team_of(3.into()).map(|t| t.as_str()),
            Some("Engineering")
        );
        assert_eq!(directory.team_of(2.into()).map(|t| t.as_str()), Some("PM63"));
    }

    #[test]
    fn staging_flag_applies_configured_threshold() {
        let tmp = tempfile::tempdir().unwrap();
        let users = users_file(tmp.path());
        let config: Config =
            toml::from_str("_version = \"1\"\nstaging_min_user_id = 3\n").unwrap();
        let cli = parse(&["teams", "--users", users.to_str().unwrap(), "--staging"]).unwrap();

        let directory = directory_args(cli).load(config).unwrap();

        assert!(!directory.contains(2.into()));
        assert!(directory.contains(3.into()));
    }

    #[test]
    fn teams_command_runs() {
        let tmp = tempfile::tempdir().unwrap();
        let users = users_file(tmp.path());
        let cli = parse(&["teams", "--users", users.to_str().unwrap(), "--output", "json"])
            .unwrap();

        cli.command.run(Config::default()).unwrap();
    }

    #[test]
    fn analyze_command_writes_exports() {
        let tmp = tempfile::tempdir().unwrap();
        let users = users_file(tmp.path());
        let questions = tmp.path().join("questions.json");
        fs::write(
            &questions,
            r#"[{"question_id": 1, "owner": {"user_id": 2}, "comments": [{"owner": {"user_id": 3}}]}]"#,
        )
        .unwrap();
        let out = tmp.path().join("out");
        let cli = parse(&[
            "analyze",
            "--users",
            users.to_str().unwrap(),
            "--questions",
            questions.to_str().unwrap(),
            "--out",
            out.to_str().unwrap(),
            "--output",
            "json",
        ])
        .unwrap();

        cli.command.run(Config::default()).unwrap();

        let csv = fs::read_to_string(out.join(interactions::Export::MATRIX_FILE)).unwrap();
        assert_eq!(csv, "source,Eng,PM63\nEng,0,0\nPM63,1,0\n");
    }
}
