use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::error::VisualizerError;

/// Column-oriented view of a delimited table. Every cell keeps its string
/// form from the CSV; typed parsing is not needed anywhere downstream.
#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Vec<Column>,
}

#[derive(Debug, Clone)]
struct Column {
    name: String,
    values: Vec<String>,
}

impl Dataset {
    pub fn from_columns<N, V>(columns: Vec<(N, Vec<V>)>) -> Dataset
    where
        N: Into<String>,
        V: Into<String>,
    {
        Dataset {
            columns: columns
                .into_iter()
                .map(|(name, values)| Column {
                    name: name.into(),
                    values: values.into_iter().map(Into::into).collect(),
                })
                .collect(),
        }
    }

    pub fn from_csv_path(path: &Path) -> Result<Dataset, VisualizerError> {
        let mut reader = csv::Reader::from_path(path).map_err(|source| {
            VisualizerError::CsvRead {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let headers = reader
            .headers()
            .map_err(|source| VisualizerError::CsvRead {
                path: path.to_path_buf(),
                source,
            })?
            .clone();

        let mut columns: Vec<Column> = headers
            .iter()
            .map(|name| Column {
                name: name.to_string(),
                values: Vec::new(),
            })
            .collect();

        for record in reader.records() {
            let record = record.map_err(|source| VisualizerError::CsvRead {
                path: path.to_path_buf(),
                source,
            })?;
            for (column, field) in columns.iter_mut().zip(record.iter()) {
                column.values.push(field.to_string());
            }
        }

        Ok(Dataset { columns })
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn first_column(&self) -> Option<&str> {
        self.columns.first().map(|c| c.name.as_str())
    }

    fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Restrict the dataset to the named columns, in the given order.
    pub fn select(&self, names: &[String]) -> Result<Dataset, VisualizerError> {
        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            let column = self
                .column(name)
                .ok_or_else(|| VisualizerError::UnknownColumn(name.clone()))?;
            columns.push(column.clone());
        }
        Ok(Dataset { columns })
    }

    /// Distinct value -> row count for one column, sorted ascending by count.
    /// Ties break on the value itself so the ordering is deterministic.
    pub fn value_counts(&self, name: &str) -> Vec<(String, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        if let Some(column) = self.column(name) {
            for value in &column.values {
                *counts.entry(value).or_insert(0) += 1;
            }
        }
        let mut pairs: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(value, count)| (value.to_string(), count))
            .collect();
        pairs.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        pairs
    }

    /// Rows where `name == value`, with the `name` column dropped.
    pub fn filter_drop(&self, name: &str, value: &str) -> Dataset {
        let keep: Vec<usize> = match self.column(name) {
            Some(column) => column
                .values
                .iter()
                .enumerate()
                .filter(|(_, v)| v.as_str() == value)
                .map(|(i, _)| i)
                .collect(),
            None => Vec::new(),
        };

        let columns = self
            .columns
            .iter()
            .filter(|c| c.name != name)
            .map(|c| Column {
                name: c.name.clone(),
                values: keep.iter().map(|&i| c.values[i].clone()).collect(),
            })
            .collect();

        Dataset { columns }
    }
}

/// Per-column distinct-value counts over the top-level dataset, plus the
/// maximum count across columns. Computed once, read-only afterwards.
#[derive(Debug, Clone)]
pub struct CardinalityMap {
    counts: HashMap<String, usize>,
    pub max_count: usize,
}

impl CardinalityMap {
    pub fn get(&self, column: &str) -> usize {
        self.counts.get(column).copied().unwrap_or(0)
    }
}

pub fn count_unique_values(data: &Dataset) -> CardinalityMap {
    let mut counts = HashMap::new();
    let mut max_count = 0;
    for name in data.column_names() {
        let distinct: HashSet<&str> = data
            .column(name)
            .map(|c| c.values.iter().map(String::as_str).collect())
            .unwrap_or_default();
        if distinct.len() > max_count {
            max_count = distinct.len();
        }
        counts.insert(name.to_string(), distinct.len());
    }
    CardinalityMap { counts, max_count }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::from_columns(vec![
            ("A", vec!["x", "x", "x", "y"]),
            ("B", vec!["p", "q", "p", "q"]),
        ])
    }

    #[test]
    fn test_value_counts_sorted_ascending() {
        let data = sample();
        assert_eq!(
            data.value_counts("A"),
            vec![("y".to_string(), 1), ("x".to_string(), 3)]
        );
    }

    #[test]
    fn test_value_counts_ties_break_on_value() {
        let data = sample();
        assert_eq!(
            data.value_counts("B"),
            vec![("p".to_string(), 2), ("q".to_string(), 2)]
        );
    }

    #[test]
    fn test_filter_drop() {
        let data = sample();
        let subset = data.filter_drop("A", "x");
        assert_eq!(subset.column_names(), vec!["B"]);
        assert_eq!(subset.row_count(), 3);
        assert_eq!(
            subset.value_counts("B"),
            vec![("q".to_string(), 1), ("p".to_string(), 2)]
        );
    }

    #[test]
    fn test_select_reorders_columns() {
        let data = sample();
        let selected = data.select(&["B".to_string(), "A".to_string()]).unwrap();
        assert_eq!(selected.column_names(), vec!["B", "A"]);
    }

    #[test]
    fn test_select_unknown_column() {
        let data = sample();
        let err = data.select(&["C".to_string()]).unwrap_err();
        assert!(err.to_string().contains("C"));
    }

    #[test]
    fn test_count_unique_values() {
        let data = sample();
        let counts = count_unique_values(&data);
        assert_eq!(counts.get("A"), 2);
        assert_eq!(counts.get("B"), 2);
        assert_eq!(counts.max_count, 2);
    }

    #[test]
    fn test_count_unique_values_empty_rows() {
        let data = Dataset::from_columns(vec![("A", Vec::<String>::new())]);
        let counts = count_unique_values(&data);
        assert_eq!(counts.get("A"), 0);
        assert_eq!(counts.max_count, 0);
    }
}
