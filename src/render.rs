use std::collections::HashMap;
use std::f64::consts::PI;
use std::fmt::Write as _;

use petgraph::graph::{Graph, NodeIndex};
use petgraph::Directed;
use tiny_skia::{Pixmap, Transform};

use crate::error::VisualizerError;
use crate::node_generation::{Edge, Node};

// Matches the original 50x40in figure at 100dpi.
const CANVAS_WIDTH: f64 = 5000.0;
const CANVAS_HEIGHT: f64 = 4000.0;
const MARGIN: f64 = 250.0;

const LOW_WEIGHT_THRESHOLD: f64 = 5.0;
const ALERT_COLOR: &str = "red";
const LABEL_FONT_SIZE: f64 = 24.0;

/// Builds the directed graph from the generated lists. Node names are the
/// identity: a repeated name (possible when two subtrees emit the same
/// column/value/count triple) updates the existing node in place rather than
/// adding a second one.
pub fn assemble(nodes: &[Node], edges: &[Edge]) -> Graph<Node, (), Directed> {
    let mut graph = Graph::new();
    let mut index: HashMap<String, NodeIndex> = HashMap::new();

    for node in nodes {
        match index.get(&node.name) {
            Some(&idx) => graph[idx] = node.clone(),
            None => {
                let idx = graph.add_node(node.clone());
                index.insert(node.name.clone(), idx);
            }
        }
    }
    for (parent, child) in edges {
        if let (Some(&a), Some(&b)) = (index.get(parent), index.get(child)) {
            graph.add_edge(a, b, ());
        }
    }
    graph
}

// Weights are already percentages; plotting rescales them once more.
fn marker_size(weight: f64) -> f64 {
    weight * 100.0
}

// Area-proportional radius, floored so near-zero branches stay visible.
fn marker_radius(weight: f64) -> f64 {
    (marker_size(weight) / PI).sqrt().max(4.0)
}

fn marker_color<'a>(weight: f64, default_color: &'a str) -> &'a str {
    if weight < LOW_WEIGHT_THRESHOLD {
        ALERT_COLOR
    } else {
        default_color
    }
}

fn escape_xml(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Maps layout coordinates into the fixed canvas, flipping y so positive
/// layout values sit above the axis as in the original plots.
struct CanvasMap {
    min_x: f64,
    max_y: f64,
    scale_x: f64,
    scale_y: f64,
}

impl CanvasMap {
    fn fit(nodes: &[&Node]) -> CanvasMap {
        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for node in nodes {
            min_x = min_x.min(node.pos.0);
            max_x = max_x.max(node.pos.0);
            min_y = min_y.min(node.pos.1);
            max_y = max_y.max(node.pos.1);
        }
        let span_x = (max_x - min_x).max(1.0);
        let span_y = (max_y - min_y).max(1.0);
        CanvasMap {
            min_x,
            max_y,
            scale_x: (CANVAS_WIDTH - 2.0 * MARGIN) / span_x,
            scale_y: (CANVAS_HEIGHT - 2.0 * MARGIN) / span_y,
        }
    }

    fn project(&self, pos: (f64, f64)) -> (f64, f64) {
        (
            MARGIN + (pos.0 - self.min_x) * self.scale_x,
            MARGIN + (self.max_y - pos.1) * self.scale_y,
        )
    }
}

/// Renders the full figure as an SVG document: edges first, then markers,
/// then the bold node labels.
pub fn render_svg(graph: &Graph<Node, (), Directed>, default_color: &str) -> String {
    let nodes: Vec<&Node> = graph.node_weights().collect();
    let map = CanvasMap::fit(&nodes);

    let mut svg = String::new();
    let _ = write!(
        svg,
        r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}" font-family="sans-serif">
  <defs>
    <marker id="arrow" markerWidth="10" markerHeight="10" refX="8" refY="4" orient="auto" markerUnits="strokeWidth">
      <path d="M1,1 L8,4 L1,7 z" fill="black" />
    </marker>
  </defs>
  <rect width="100%" height="100%" fill="white" />
  <text x="{tx:.0}" y="{ty:.0}" font-size="48" font-weight="bold" text-anchor="middle">River Flow Metaphor</text>
"##,
        w = CANVAS_WIDTH,
        h = CANVAS_HEIGHT,
        tx = CANVAS_WIDTH / 2.0,
        ty = MARGIN / 2.0,
    );

    for edge in graph.edge_indices() {
        if let Some((a, b)) = graph.edge_endpoints(edge) {
            let (x1, y1) = map.project(graph[a].pos);
            let (x2, y2) = map.project(graph[b].pos);
            let _ = writeln!(
                svg,
                r#"  <line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="black" stroke-width="2" marker-end="url(#arrow)" />"#,
                x1, y1, x2, y2,
            );
        }
    }

    for node in &nodes {
        let (cx, cy) = map.project(node.pos);
        let _ = writeln!(
            svg,
            r#"  <circle cx="{:.1}" cy="{:.1}" r="{:.1}" fill="{}" />"#,
            cx,
            cy,
            marker_radius(node.weight),
            escape_xml(marker_color(node.weight, default_color)),
        );
    }

    for node in &nodes {
        let (cx, cy) = map.project(node.pos);
        let _ = writeln!(
            svg,
            r#"  <text x="{:.1}" y="{:.1}" font-size="{:.0}" font-weight="bold" text-anchor="middle">{}</text>"#,
            cx,
            cy - marker_radius(node.weight) - 6.0,
            LABEL_FONT_SIZE,
            escape_xml(&node.name),
        );
    }

    svg.push_str("</svg>\n");
    svg
}

/// Rasterizes the figure and returns encoded PNG bytes.
pub fn render_png(
    graph: &Graph<Node, (), Directed>,
    default_color: &str,
) -> Result<Vec<u8>, VisualizerError> {
    let svg = render_svg(graph, default_color);

    let mut options = resvg::usvg::Options::default();
    options.fontdb_mut().load_system_fonts();
    let tree = resvg::usvg::Tree::from_str(&svg, &options)
        .map_err(|err| VisualizerError::Render(err.to_string()))?;

    let size = tree.size().to_int_size();
    let mut pixmap = Pixmap::new(size.width(), size.height()).ok_or_else(|| {
        VisualizerError::Render(format!(
            "failed to allocate {}x{} surface",
            size.width(),
            size.height()
        ))
    })?;
    resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|err| VisualizerError::Render(err.to_string()))
}
