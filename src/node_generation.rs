use crate::dataset::{count_unique_values, CardinalityMap, Dataset};
use crate::error::VisualizerError;

pub const ROOT_NODE: &str = "root";

// Sentinel, deliberately outside the 0-100 weight range real nodes carry.
const ROOT_WEIGHT: f64 = 500.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub pos: (f64, f64),
    pub weight: f64,
}

impl Node {
    fn root() -> Node {
        Node {
            name: ROOT_NODE.to_string(),
            pos: (0.0, 0.0),
            weight: ROOT_WEIGHT,
        }
    }
}

pub type Edge = (String, String);

/// Heuristic placement rule for the next sibling node. `base_node` is the
/// most recently placed node: the parent for sibling 0, the previous sibling
/// afterwards. Odd-indexed siblings flip below the axis and nudge right,
/// which produces the alternating river-branch look. Not collision-free and
/// not meant to be.
pub fn find_position(
    total_cols: usize,
    node_seq: usize,
    column: &str,
    counts: &CardinalityMap,
    base_node: &Node,
    last_x: f64,
    last_y: f64,
) -> (f64, f64) {
    let scaling = total_cols as f64 - last_x;
    let (prev_x, prev_y) = base_node.pos;
    let max_slots = counts.get(column) as f64;
    let available_slots = prev_x * max_slots;

    let mut x = last_x;
    let mut y = last_y + available_slots + node_seq as f64 * scaling;
    if prev_y < 0.0 || node_seq % 2 == 1 {
        y = -y;
    } else {
        y += 0.5;
    }
    if node_seq % 2 == 1 {
        x += 0.5;
    }
    (x, y)
}

/// Recursive hierarchy builder. Branches on the first column of the current
/// view, one child per distinct value, then descends into the matching rows
/// with that column dropped.
pub struct RiverFlow {
    distinct_value_limit: usize,
}

impl RiverFlow {
    pub fn new(distinct_value_limit: usize) -> RiverFlow {
        RiverFlow {
            distinct_value_limit,
        }
    }

    /// Produces the full node and edge lists, root first. Aborts without a
    /// partial result if any reached branch column has too many distinct
    /// values.
    pub fn generate(&self, data: &Dataset) -> Result<(Vec<Node>, Vec<Edge>), VisualizerError> {
        let branch_col = data
            .first_column()
            .ok_or(VisualizerError::EmptyDataset)?
            .to_string();
        let counts = count_unique_values(data);

        let root = Node::root();
        let mut nodes = vec![root.clone()];
        let mut edges = Vec::new();
        self.generate_level(
            &counts, data, &branch_col, &mut nodes, &mut edges, ROOT_NODE, &root, 0.0, 0.0,
        )?;
        Ok((nodes, edges))
    }

    #[allow(clippy::too_many_arguments)]
    fn generate_level(
        &self,
        counts: &CardinalityMap,
        data: &Dataset,
        branch_col: &str,
        nodes: &mut Vec<Node>,
        edges: &mut Vec<Edge>,
        base_edge: &str,
        base_node: &Node,
        mut last_x: f64,
        _last_y: f64,
    ) -> Result<(), VisualizerError> {
        let total_cols = data.column_count();
        // The y cursor restarts at every level; the x cursor advances once
        // per level, plus the half-step nudges inside find_position.
        let mut last_y = 0.0;
        last_x += 1.0;

        let distribution = data.value_counts(branch_col);
        if distribution.len() >= self.distinct_value_limit {
            return Err(VisualizerError::TooManyDistinctValues {
                column: branch_col.to_string(),
                count: distribution.len(),
                limit: self.distinct_value_limit,
            });
        }

        let sum_of_vals: usize = distribution.iter().map(|(_, count)| count).sum();
        let mut base_node = base_node.clone();
        for (node_seq, (value, count)) in distribution.iter().enumerate() {
            let (x, y) = find_position(
                total_cols, node_seq, branch_col, counts, &base_node, last_x, last_y,
            );
            last_x = x;
            last_y = y;

            let name = format!("{}_{}={}", branch_col, value, count);
            let weight = *count as f64 * 100.0 / sum_of_vals as f64;
            base_node = Node {
                name: name.clone(),
                pos: (x, y),
                weight,
            };
            edges.push((base_edge.to_string(), name.clone()));
            nodes.push(base_node.clone());

            let subset = data.filter_drop(branch_col, value);
            if let Some(next_col) = subset.first_column().map(str::to_string) {
                // Cursor movement inside the subtree stays inside it.
                self.generate_level(
                    counts, &subset, &next_col, nodes, edges, &name, &base_node, last_x, last_y,
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_single_column_graph_shape() {
        let data = Dataset::from_columns(vec![("C", vec!["a", "b", "b", "c", "c"])]);
        let (nodes, edges) = RiverFlow::new(15).generate(&data).unwrap();

        assert_eq!(nodes.len(), 4);
        assert_eq!(edges.len(), 3);
        assert!(edges.iter().all(|(parent, _)| parent == ROOT_NODE));
    }

    #[test]
    fn test_children_weights_sum_to_100() {
        let data = Dataset::from_columns(vec![("C", vec!["a", "b", "b", "c", "c", "c"])]);
        let (nodes, edges) = RiverFlow::new(15).generate(&data).unwrap();

        let total: f64 = edges
            .iter()
            .filter(|(parent, _)| parent == ROOT_NODE)
            .map(|(_, child)| {
                nodes
                    .iter()
                    .find(|n| &n.name == child)
                    .map(|n| n.weight)
                    .unwrap()
            })
            .sum();
        assert!(close(total, 100.0));
    }

    #[test]
    fn test_two_column_example() {
        let data = Dataset::from_columns(vec![
            ("A", vec!["x", "x", "x", "y"]),
            ("B", vec!["p", "q", "p", "q"]),
        ]);
        let (nodes, edges) = RiverFlow::new(15).generate(&data).unwrap();

        let root_children: Vec<&String> = edges
            .iter()
            .filter(|(parent, _)| parent == ROOT_NODE)
            .map(|(_, child)| child)
            .collect();
        assert_eq!(root_children, vec!["A_y=1", "A_x=3"]);

        let weight_of = |name: &str| {
            nodes
                .iter()
                .find(|n| n.name == name)
                .map(|n| n.weight)
                .unwrap()
        };
        assert!(close(weight_of("A_y=1"), 25.0));
        assert!(close(weight_of("A_x=3"), 75.0));

        // Both branches descend into B.
        assert!(edges.iter().any(|(p, c)| p == "A_y=1" && c.starts_with("B_")));
        assert!(edges.iter().any(|(p, c)| p == "A_x=3" && c.starts_with("B_")));
    }

    #[test]
    fn test_branched_column_never_reappears() {
        let data = Dataset::from_columns(vec![
            ("A", vec!["x", "x", "y", "y"]),
            ("B", vec!["p", "q", "p", "q"]),
        ]);
        let (_, edges) = RiverFlow::new(15).generate(&data).unwrap();

        for (parent, child) in &edges {
            if parent.starts_with("A_") {
                assert!(child.starts_with("B_"), "unexpected child {}", child);
            }
        }
    }

    #[test]
    fn test_limit_aborts_naming_column() {
        let data = Dataset::from_columns(vec![("Busy", vec!["a", "b", "c"])]);
        let err = RiverFlow::new(3).generate(&data).unwrap_err();
        assert!(err.to_string().contains("Busy"));
    }

    #[test]
    fn test_deterministic_output() {
        let data = Dataset::from_columns(vec![
            ("A", vec!["x", "y", "x", "z", "y", "x"]),
            ("B", vec!["1", "2", "1", "2", "1", "2"]),
        ]);
        let flow = RiverFlow::new(15);
        let first = flow.generate(&data).unwrap();
        let second = flow.generate(&data).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_positions_single_column() {
        let data = Dataset::from_columns(vec![("C", vec!["a", "b", "b"])]);
        let (nodes, _) = RiverFlow::new(15).generate(&data).unwrap();

        let pos_of = |name: &str| nodes.iter().find(|n| n.name == name).map(|n| n.pos).unwrap();

        // Sibling 0 sits just above the axis; sibling 1 flips below and
        // nudges half a step right.
        let (x0, y0) = pos_of("C_a=1");
        assert!(close(x0, 1.0) && close(y0, 0.5));
        let (x1, y1) = pos_of("C_b=2");
        assert!(close(x1, 1.5) && close(y1, -2.5));
    }

    #[test]
    fn test_root_node_is_sentinel() {
        let data = Dataset::from_columns(vec![("C", vec!["a"])]);
        let (nodes, _) = RiverFlow::new(15).generate(&data).unwrap();
        assert_eq!(nodes[0].name, ROOT_NODE);
        assert_eq!(nodes[0].pos, (0.0, 0.0));
        assert_eq!(nodes[0].weight, 500.0);
    }

    #[test]
    fn test_zero_rows_yields_root_only() {
        let data = Dataset::from_columns(vec![("C", Vec::<String>::new())]);
        let (nodes, edges) = RiverFlow::new(15).generate(&data).unwrap();
        assert_eq!(nodes.len(), 1);
        assert!(edges.is_empty());
    }

    #[test]
    fn test_no_columns_is_an_error() {
        let data = Dataset::from_columns(Vec::<(String, Vec<String>)>::new());
        assert!(RiverFlow::new(15).generate(&data).is_err());
    }
}
