use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use interactions::{Config, Export, Extraction, InteractionMatrix, Untracked, aggregate, extract};
use tracing::instrument;

use super::{
    DirectoryArgs, OutputFormat,
    terminal::{Colorize, terminal_width},
};

#[derive(Debug, Parser)]
#[command(about = "Build the team interaction matrix")]
pub struct Analyze {
    #[command(flatten)]
    directory: DirectoryArgs,

    /// JSON export of questions, with nested answers and comments
    #[arg(long, short, value_name = "FILE", default_value = "questions.json")]
    questions: PathBuf,

    /// Directory to write the exports into
    #[arg(long, short, value_name = "DIR", default_value = ".")]
    out: PathBuf,

    /// Don't write any export files
    #[arg(long)]
    no_export: bool,

    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

impl Analyze {
    #[instrument(level = "debug", skip(self, config))]
    pub fn run(self, config: Config) -> anyhow::Result<()> {
        let directory = self.directory.load(config)?;
        let questions = interactions::load_questions(&self.questions).with_context(|| {
            format!("failed to load questions from {}", self.questions.display())
        })?;

        let Extraction { records, untracked } = extract(&questions, &directory)
            .context("the question data is inconsistent")?;
        let matrix = aggregate(&records);

        tracing::info!(
            "{} interaction records across {} teams",
            records.len(),
            matrix.len()
        );

        if !self.no_export {
            let export = Export::new(&self.out)?;
            let written = [
                export.write_json(Export::USERS_FILE, &directory.users())?,
                export.write_json(Export::RECORDS_FILE, &records)?,
                export.write_matrix_csv(&matrix)?,
                export.write_chord_data(&matrix)?,
            ];
            for path in written {
                eprintln!("{}", format!("Created {}", path.display()).dim());
            }
        }

        match self.output {
            OutputFormat::Json => Self::output_json(records.len(), &untracked, &matrix)?,
            OutputFormat::Table => Self::output_table(&untracked, &matrix),
        }

        Ok(())
    }

    fn output_json(
        records: usize,
        untracked: &Untracked,
        matrix: &InteractionMatrix,
    ) -> anyhow::Result<()> {
        use serde_json::json;

        let output = json!({
            "records": records,
            "untracked": {
                "total": untracked.total(),
                "orphaned": untracked.orphaned,
                "deleted_participants": untracked.deleted_participants,
                "unknown_users": untracked.unknown_users,
                "missing_teams": untracked.missing_teams,
            },
            "matrix": matrix,
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    fn output_table(untracked: &Untracked, matrix: &InteractionMatrix) {
        if untracked.total() == 0 {
            println!("Untracked interactions: {}", "0".success());
        } else {
            println!(
                "Untracked interactions: {}",
                untracked.total().to_string().warning()
            );
            println!(
                "{}",
                format!(
                    "  deleted authors: {}, deleted participants: {}, unknown users: {}, no team: {}",
                    untracked.orphaned,
                    untracked.deleted_participants,
                    untracked.unknown_users,
                    untracked.missing_teams
                )
                .dim()
            );
        }
        println!();

        if matrix.total_weight() == 0 {
            println!("No cross-team interactions found.");
            return;
        }

        let label_width = matrix
            .teams()
            .iter()
            .map(|team| team.chars().count())
            .max()
            .unwrap_or(0)
            .max("from \\ to".len());
        let cell_width = matrix
            .teams()
            .iter()
            .map(|team| team.chars().count())
            .chain(matrix.cells().map(|cell| cell.weight.to_string().len()))
            .max()
            .unwrap_or(1);
        let table_width = label_width + matrix.len() * (cell_width + 1);

        if terminal_width().is_some_and(|width| table_width > usize::from(width)) {
            Self::output_edges(matrix, label_width);
        } else {
            Self::output_grid(matrix, label_width, cell_width);
        }
    }

    fn output_grid(matrix: &InteractionMatrix, label_width: usize, cell_width: usize) {
        print!("{:<label_width$}", "from \\ to");
        for team in matrix.teams() {
            print!(" {}", format!("{:>cell_width$}", team.as_str()).info());
        }
        println!();

        for source in matrix.teams() {
            print!("{}", format!("{:<label_width$}", source.as_str()).info());
            for target in matrix.teams() {
                let weight = matrix.weight(source, target).unwrap_or_default();
                let cell = format!("{weight:>cell_width$}");
                if weight == 0 {
                    print!(" {}", cell.dim());
                } else {
                    print!(" {cell}");
                }
            }
            println!();
        }
    }

    // Stacked output for narrow terminals
    fn output_edges(matrix: &InteractionMatrix, label_width: usize) {
        let mut edges: Vec<_> = matrix.edges().collect();
        edges.sort_by(|a, b| b.weight.cmp(&a.weight));

        for edge in edges {
            println!(
                "{:<label_width$} → {:<label_width$} {}",
                edge.source.as_str(),
                edge.target.as_str(),
                edge.weight
            );
        }
    }
}
