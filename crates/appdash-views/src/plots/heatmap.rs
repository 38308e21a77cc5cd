//! Count matrices: port usage per instance and app types per instance

use std::collections::{BTreeMap, BTreeSet};

use appdash_core::records::Dataset;
use serde::Serialize;

use crate::stats::{port_usages, top_ports, Port};

/// Dense count matrix with sorted row and column labels
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heatmap {
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    /// `cells[row][column]`
    pub cells: Vec<Vec<usize>>,
}

impl Heatmap {
    /// Count each `(row, column)` pair; labels are sorted by their key order
    pub fn from_pairs<R, C, I>(pairs: I) -> Self
    where
        R: Ord + Clone + ToString,
        C: Ord + Clone + ToString,
        I: IntoIterator<Item = (R, C)>,
    {
        let mut counts: BTreeMap<(R, C), usize> = BTreeMap::new();
        let mut row_keys = BTreeSet::new();
        let mut column_keys = BTreeSet::new();
        for (row, column) in pairs {
            row_keys.insert(row.clone());
            column_keys.insert(column.clone());
            *counts.entry((row, column)).or_insert(0) += 1;
        }

        let cells = row_keys
            .iter()
            .map(|row| {
                column_keys
                    .iter()
                    .map(|column| counts.get(&(row.clone(), column.clone())).copied().unwrap_or(0))
                    .collect()
            })
            .collect();

        Self {
            rows: row_keys.iter().map(ToString::to_string).collect(),
            columns: column_keys.iter().map(ToString::to_string).collect(),
            cells,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    pub fn get(&self, row: &str, column: &str) -> usize {
        let r = self.rows.iter().position(|label| label == row);
        let c = self.columns.iter().position(|label| label == column);
        match (r, c) {
            (Some(r), Some(c)) => self.cells[r][c],
            _ => 0,
        }
    }

    /// Largest cell, used to scale the color ramp
    pub fn max(&self) -> usize {
        self.cells.iter().flatten().copied().max().unwrap_or(0)
    }
}

/// Port usage by instance for the `limit` most used ports
///
/// Ports are ordered numerically. `None` when no record exposes a port.
pub fn port_heatmap(dataset: &Dataset, limit: usize) -> Option<Heatmap> {
    let usages = port_usages(dataset);
    if usages.is_empty() {
        return None;
    }
    let top: BTreeSet<Port> = top_ports(&usages, limit).into_iter().map(|(port, _)| port).collect();
    let heatmap = Heatmap::from_pairs(
        usages
            .iter()
            .filter(|usage| top.contains(&usage.port))
            .map(|usage| (usage.instance_name.clone(), usage.port.clone())),
    );
    (!heatmap.is_empty()).then_some(heatmap)
}

/// Application count per instance and app type
pub fn type_matrix(dataset: &Dataset) -> Heatmap {
    Heatmap::from_pairs(
        dataset
            .iter()
            .map(|record| (record.instance_name.clone(), record.app_type.clone())),
    )
}

/// Port count within one app type, for the port/type breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortTypeCount {
    pub app_type: String,
    pub port: Port,
    pub count: usize,
}

/// Port usage grouped by app type then port, both ascending
pub fn ports_by_type(dataset: &Dataset) -> Vec<PortTypeCount> {
    let mut counts: BTreeMap<(String, Port), usize> = BTreeMap::new();
    for usage in port_usages(dataset) {
        *counts.entry((usage.app_type, usage.port)).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|((app_type, port), count)| PortTypeCount { app_type, port, count })
        .collect()
}
