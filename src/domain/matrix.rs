//! Aggregation of interaction records into a team × team matrix.

use std::{collections::HashMap, io, iter};

use petgraph::graphmap::DiGraphMap;
use serde::{Serialize, ser::SerializeStruct};

use crate::domain::{InteractionRecord, PostKind, Team};

/// A square matrix of interaction counts between teams.
///
/// Rows are the teams interactions flow from, columns the teams they flow to.
/// Every team that appears anywhere in the records is both a row and a
/// column, in sorted order, and every cell holds a count (possibly zero).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionMatrix {
    teams: Vec<Team>,
    /// Row-major, `teams.len()` squared.
    weights: Vec<u64>,
}

/// A single cell of the matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Edge<'a> {
    /// The team interactions flow from.
    pub source: &'a Team,
    /// The team interactions flow to.
    pub target: &'a Team,
    /// The number of interactions.
    pub weight: u64,
}

/// Aggregates interaction records into a matrix.
///
/// For a question, interactions flow from the asker's team to each
/// interacting team. For an answer, they flow from each interacting team to
/// the answerer's team. Records whose author has no team contribute no
/// edges, though their interacting teams still become labels.
#[must_use]
pub fn aggregate(records: &[InteractionRecord]) -> InteractionMatrix {
    let mut graph: DiGraphMap<&Team, u64> = DiGraphMap::new();

    for record in records {
        if let Some(team) = record.source_team() {
            graph.add_node(team);
        }
        for team in record.interacting_teams() {
            graph.add_node(team);
        }

        let Some(source_team) = record.source_team() else {
            continue;
        };

        for team in record.interacting_teams() {
            let (from, to) = match record.kind() {
                PostKind::Question => (source_team, team),
                PostKind::Answer => (team, source_team),
            };
            if let Some(weight) = graph.edge_weight_mut(from, to) {
                *weight += 1;
            } else {
                graph.add_edge(from, to, 1);
            }
        }
    }

    tracing::debug!(
        teams = graph.node_count(),
        edges = graph.edge_count(),
        "Aggregated interaction graph"
    );

    InteractionMatrix::from_graph(&graph)
}

impl InteractionMatrix {
    fn from_graph(graph: &DiGraphMap<&Team, u64>) -> Self {
        let mut teams: Vec<Team> = graph.nodes().cloned().collect();
        teams.sort();

        let index: HashMap<&Team, usize> = teams.iter().enumerate().map(|(i, t)| (t, i)).collect();
        let n = teams.len();
        let mut weights = vec![0; n * n];
        for (from, to, weight) in graph.all_edges() {
            weights[index[from] * n + index[to]] = *weight;
        }

        Self { teams, weights }
    }

    /// The team labels, sorted.
    #[must_use]
    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    /// Number of teams.
    #[must_use]
    pub fn len(&self) -> usize {
        self.teams.len()
    }

    /// Whether the matrix has no teams.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    fn position(&self, team: &str) -> Option<usize> {
        self.teams
            .binary_search_by(|probe| probe.as_str().cmp(team))
            .ok()
    }

    /// The weight from `source` to `target`, or `None` if either team is not
    /// in the matrix.
    #[must_use]
    pub fn weight(&self, source: &str, target: &str) -> Option<u64> {
        let row = self.position(source)?;
        let column = self.position(target)?;
        Some(self.weights[row * self.len() + column])
    }

    /// The weights out of `source`, one per team in [`teams`](Self::teams)
    /// order.
    #[must_use]
    pub fn row(&self, source: &str) -> Option<&[u64]> {
        let row = self.position(source)?;
        let n = self.len();
        Some(&self.weights[row * n..(row + 1) * n])
    }

    /// Every cell as a `(source, target, weight)` triple, row by row.
    pub fn cells(&self) -> impl Iterator<Item = Edge<'_>> + '_ {
        let n = self.len();
        self.weights.iter().enumerate().map(move |(i, weight)| Edge {
            source: &self.teams[i / n],
            target: &self.teams[i % n],
            weight: *weight,
        })
    }

    /// Cells with a non-zero weight.
    pub fn edges(&self) -> impl Iterator<Item = Edge<'_>> + '_ {
        self.cells().filter(|edge| edge.weight > 0)
    }

    /// Sum of all weights.
    #[must_use]
    pub fn total_weight(&self) -> u64 {
        self.weights.iter().sum()
    }

    /// The matrix as a weighted directed graph. Every team is a node; only
    /// non-zero cells are edges.
    #[must_use]
    pub fn graph(&self) -> DiGraphMap<&str, u64> {
        let mut graph = DiGraphMap::with_capacity(self.len(), self.weights.len());
        for team in &self.teams {
            graph.add_node(team.as_str());
        }
        for edge in self.edges() {
            graph.add_edge(edge.source.as_str(), edge.target.as_str(), edge.weight);
        }
        graph
    }

    /// Writes the matrix as CSV, with a header row of target teams and one row
    /// per source team.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying writer.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> csv::Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(iter::once("source").chain(self.teams.iter().map(Team::as_str)))?;

        for (team, row) in self.teams.iter().zip(self.weights.chunks(self.len().max(1))) {
            writer.write_record(
                iter::once(team.to_string()).chain(row.iter().map(u64::to_string)),
            )?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl Serialize for InteractionMatrix {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let rows: Vec<&[u64]> = self.weights.chunks(self.len().max(1)).collect();
        let mut state = serializer.serialize_struct("InteractionMatrix", 2)?;
        state.serialize_field("teams", &self.teams)?;
        state.serialize_field("weights", &rows)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;

    fn record(kind: PostKind, source: Option<&str>, teams: &[&str]) -> InteractionRecord {
        let mut record = InteractionRecord::new(
            UserId::new(1),
            source.and_then(Team::new),
            kind,
            1,
            Vec::new(),
        );
        for (i, team) in teams.iter().enumerate() {
            record.add_user(UserId::new(100 + i64::try_from(i).unwrap()));
            record.add_team(&Team::new(*team).unwrap());
        }
        record
    }

    #[test]
    fn question_edges_flow_from_asker() {
        let matrix = aggregate(&[record(PostKind::Question, Some("X"), &["Y"])]);

        assert_eq!(matrix.weight("X", "Y"), Some(1));
        assert_eq!(matrix.weight("Y", "X"), Some(0));
    }

    #[test]
    fn answer_edges_flow_to_answerer() {
        let matrix = aggregate(&[record(PostKind::Answer, Some("Z"), &["W"])]);

        assert_eq!(matrix.weight("W", "Z"), Some(1));
        assert_eq!(matrix.weight("Z", "W"), Some(0));
    }

    #[test]
    fn weights_accumulate() {
        let records = [
            record(PostKind::Question, Some("X"), &["Y", "X"]),
            record(PostKind::Question, Some("X"), &["Y"]),
            record(PostKind::Answer, Some("X"), &["Y"]),
        ];

        let matrix = aggregate(&records);

        assert_eq!(matrix.weight("X", "Y"), Some(2));
        assert_eq!(matrix.weight("X", "X"), Some(1));
        assert_eq!(matrix.weight("Y", "X"), Some(1));
        assert_eq!(matrix.total_weight(), 4);
    }

    #[test]
    fn teamless_source_adds_labels_but_no_edges() {
        let records = [
            record(PostKind::Question, None, &["Y"]),
            record(PostKind::Question, Some("A"), &[]),
        ];

        let matrix = aggregate(&records);

        let labels: Vec<&str> = matrix.teams().iter().map(Team::as_str).collect();
        assert_eq!(labels, vec!["A", "Y"]);
        assert_eq!(matrix.total_weight(), 0);
        assert_eq!(matrix.cells().count(), 4);
    }

    #[test]
    fn matrix_is_square_and_fully_populated() {
        let records = [
            record(PostKind::Question, Some("B"), &["C"]),
            record(PostKind::Answer, Some("A"), &["C"]),
        ];

        let matrix = aggregate(&records);

        assert_eq!(matrix.len(), 3);
        for team in matrix.teams() {
            assert_eq!(matrix.row(team).map(<[u64]>::len), Some(3));
        }
        assert_eq!(matrix.weight("A", "Q"), None);
        assert_eq!(matrix.edges().count(), 2);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let records = [
            record(PostKind::Question, Some("B"), &["C", "A"]),
            record(PostKind::Answer, Some("A"), &["C"]),
        ];

        assert_eq!(aggregate(&records), aggregate(&records));
    }

    #[test]
    fn empty_records_give_empty_matrix() {
        let matrix = aggregate(&[]);

        assert!(matrix.is_empty());
        let mut csv = Vec::new();
        matrix.write_csv(&mut csv).unwrap();
        assert_eq!(String::from_utf8(csv).unwrap(), "source\n");
    }

    #[test]
    fn writes_csv_with_quoting() {
        let records = [record(PostKind::Question, Some("R&D, East"), &["Ops"])];
        let matrix = aggregate(&records);

        let mut csv = Vec::new();
        matrix.write_csv(&mut csv).unwrap();

        assert_eq!(
            String::from_utf8(csv).unwrap(),
            "source,Ops,\"R&D, East\"\nOps,0,0\n\"R&D, East\",1,0\n"
        );
    }

    #[test]
    fn quotes_team_with_line_break() {
        let records = [record(PostKind::Question, Some("Eng\nOps"), &["QA"])];
        let matrix = aggregate(&records);

        let mut csv = Vec::new();
        matrix.write_csv(&mut csv).unwrap();

        assert_eq!(
            String::from_utf8(csv).unwrap(),
            "source,\"Eng\nOps\",QA\n\"Eng\nOps\",0,1\nQA,0,0\n"
        );
    }

    #[test]
    fn graph_view_has_non_zero_edges() {
        let records = [record(PostKind::Question, Some("X"), &["Y"])];
        let matrix = aggregate(&records);

        let graph = matrix.graph();

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edge_weight("X", "Y"), Some(&1));
    }

    #[test]
    fn serializes_as_labels_and_rows() {
        let matrix = aggregate(&[record(PostKind::Question, Some("X"), &["Y"])]);

        let value = serde_json::to_value(&matrix).unwrap();

        assert_eq!(
            value,
            serde_json::json!({"teams": ["X", "Y"], "weights": [[0, 1], [0, 0]]})
        );
    }
}
