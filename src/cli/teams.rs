use clap::Parser;
use interactions::Config;
use tracing::instrument;

use super::{DirectoryArgs, OutputFormat, terminal::Colorize};

#[derive(Debug, Parser)]
#[command(about = "Show how many users belong to each team")]
pub struct Teams {
    #[command(flatten)]
    pub(super) directory: DirectoryArgs,

    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

impl Teams {
    #[instrument(level = "debug", skip(self, config))]
    pub fn run(self, config: Config) -> anyhow::Result<()> {
        let directory = self.directory.load(config)?;

        let sizes = directory.team_sizes();
        let teamless = sizes.get(&None).copied().unwrap_or(0);
        let mut teams: Vec<(&str, usize)> = sizes
            .iter()
            .filter_map(|(team, count)| team.map(|team| (team.as_str(), *count)))
            .collect();
        teams.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        match self.output {
            OutputFormat::Json => {
                use serde_json::json;

                let teams: Vec<_> = teams
                    .iter()
                    .map(|(team, count)| json!({"team": team, "users": count}))
                    .collect();
                let output = json!({
                    "users": directory.len(),
                    "teams": teams,
                    "without_team": teamless,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Table => {
                if directory.is_empty() {
                    println!("No users found.");
                    return Ok(());
                }

                let width = teams
                    .iter()
                    .map(|(team, _)| team.chars().count())
                    .max()
                    .unwrap_or(0)
                    .max("Team".len());

                println!("{:<width$} Users", "Team");
                for (team, count) in &teams {
                    println!("{team:<width$} {count}");
                }
                println!();
                println!("Total users: {}", directory.len());
                if teamless > 0 {
                    println!(
                        "Without a team: {}",
                        teamless.to_string().warning()
                    );
                    println!(
                        "{}",
                        "Interactions with these users are not tracked.".dim()
                    );
                }
            }
        }

        Ok(())
    }
}
