use crate::diagram::Diagram;
use crate::geometry::{Orientation, ViewTransform};
use crate::node::Node;
use crate::viewport::{Focus, Viewport};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub settings: serde_json::Value,
    pub orientation: Orientation,
    pub viewport: ViewportDump,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
    pub focus: Option<Focus>,
}

#[derive(Debug, Serialize)]
pub struct ViewportDump {
    pub width: f32,
    pub height: f32,
    pub transform: ViewTransform,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub label: String,
    pub kind: String,
    pub role: Option<String>,
    pub parent: Option<String>,
    /// Centre relative to the parent.
    pub x: f32,
    pub y: f32,
    /// Centre in graph space.
    pub abs_x: f32,
    pub abs_y: f32,
    pub width: f32,
    pub height: f32,
    pub visible: bool,
    pub collapsed: bool,
    pub expanded_size: Option<[f32; 2]>,
    pub selected: bool,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub source: String,
    pub target: String,
    pub edge_type: String,
    pub state: String,
    pub is_active: bool,
    pub synthesized: bool,
    /// Absolute endpoint centres; `None` while an endpoint is not constructed.
    pub points: Option<[[f32; 2]; 2]>,
    /// Both endpoints exist and are visible.
    pub drawn: bool,
}

impl LayoutDump {
    pub fn from_diagram(diagram: &Diagram, viewport: &Viewport) -> Self {
        let mut nodes = Vec::new();
        for root in diagram.roots() {
            dump_node(root, None, (0.0, 0.0), &mut nodes);
        }

        let edges = diagram
            .all_edges(false)
            .into_iter()
            .map(|edge| {
                let source = diagram.node(&edge.source);
                let target = diagram.node(&edge.target);
                let points = match (
                    diagram.absolute_position(&edge.source),
                    diagram.absolute_position(&edge.target),
                ) {
                    (Some(a), Some(b)) => Some([[a.x, a.y], [b.x, b.y]]),
                    _ => None,
                };
                let drawn = source.is_some_and(Node::is_visible) && target.is_some_and(Node::is_visible);
                EdgeDump {
                    source: edge.source.clone(),
                    target: edge.target.clone(),
                    edge_type: edge.edge_type.clone(),
                    state: edge.state.clone(),
                    is_active: edge.is_active,
                    synthesized: edge.synthesized,
                    points,
                    drawn,
                }
            })
            .collect();

        let config = viewport.config();
        LayoutDump {
            settings: diagram.settings().clone(),
            orientation: config.orientation,
            viewport: ViewportDump {
                width: config.width,
                height: config.height,
                transform: viewport.transform(),
            },
            nodes,
            edges,
            focus: viewport.last_focus().cloned(),
        }
    }
}

fn dump_node(node: &Node, parent: Option<&str>, origin: (f32, f32), out: &mut Vec<NodeDump>) {
    let abs_x = origin.0 + node.x();
    let abs_y = origin.1 + node.y();
    let expanded_size = node
        .container()
        .and_then(|container| container.expanded_size())
        .map(|size| [size.width, size.height]);
    out.push(NodeDump {
        id: node.id().to_string(),
        label: node.label().to_string(),
        kind: node.kind().as_str().to_string(),
        role: node.role().map(|role| role.as_str().to_string()),
        parent: parent.map(str::to_string),
        x: node.x(),
        y: node.y(),
        abs_x,
        abs_y,
        width: node.width(),
        height: node.height(),
        visible: node.is_visible(),
        collapsed: node.is_collapsed(),
        expanded_size,
        selected: node.is_selected(),
    });
    for child in node.children() {
        dump_node(child, Some(node.id()), (abs_x, abs_y), out);
    }
}

/// Write the dump as pretty JSON to `path`, or stdout when `path` is `None`.
pub fn write_layout_dump(path: Option<&Path>, dump: &LayoutDump) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(writer, dump)?;
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, dump)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}
