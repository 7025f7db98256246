use crate::config::LayoutConfig;
use crate::error::ParseError;
use crate::geometry::{Point, Size};
use crate::ir::{GraphDescription, NodeDescriptor, NodeKind, Role};
use crate::layout::{AdapterLayout, AdapterMode, Arrangement, StackDirection};
use crate::node::Edge;
use std::collections::{HashMap, HashSet};

/// How a container positions its children.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContainerShape {
    Adapter(AdapterLayout),
    Stack(StackDirection),
}

/// Node descriptor after defaults, synthesized children and edge placement.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedNode {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    pub role: Option<Role>,
    pub size: Option<Size>,
    pub position: Option<Point>,
    pub collapsed: bool,
    pub parent_ids: Vec<String>,
    pub children_ids: Vec<String>,
    pub container: Option<PreparedContainer>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreparedContainer {
    pub shape: ContainerShape,
    pub children: Vec<PreparedNode>,
    /// Edges whose nearest common container is this one.
    pub edges: Vec<Edge>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreparedGraph {
    pub settings: serde_json::Value,
    pub roots: Vec<PreparedNode>,
    /// Edges with no common container.
    pub edges: Vec<Edge>,
}

/// Parse a graph description. Accepts JSON5 (comments, trailing commas).
pub fn parse_graph(input: &str) -> Result<GraphDescription, ParseError> {
    let graph: GraphDescription = json5::from_str(input)?;
    Ok(graph)
}

pub fn parse_and_prepare(input: &str, config: &LayoutConfig) -> Result<PreparedGraph, ParseError> {
    prepare_graph(parse_graph(input)?, config)
}

/// Apply container defaults, synthesize adapter children and internal edges,
/// and hand every declared edge to the nearest container holding both ends.
pub fn prepare_graph(graph: GraphDescription, config: &LayoutConfig) -> Result<PreparedGraph, ParseError> {
    let mut roots: Vec<PreparedNode> = graph
        .nodes
        .into_iter()
        .map(|node| prepare_node(node, config))
        .collect();

    let mut paths: HashMap<String, Vec<(String, bool)>> = HashMap::new();
    let mut seen: HashSet<String> = HashSet::new();
    for root in &roots {
        collect_paths(root, &mut Vec::new(), &mut paths, &mut seen)?;
    }

    let mut root_edges = Vec::new();
    for descriptor in graph.edges {
        let (Some(source), Some(target)) = (paths.get(&descriptor.source), paths.get(&descriptor.target))
        else {
            tracing::warn!(
                source = %descriptor.source,
                target = %descriptor.target,
                "edge endpoint not found, skipping edge"
            );
            continue;
        };
        let owner = nearest_common_container(source, target);
        let edge = Edge::from_descriptor(descriptor);
        match owner {
            Some(owner_id) => match find_container_mut(&mut roots, &owner_id) {
                Some(container) => container.edges.push(edge),
                None => root_edges.push(edge),
            },
            None => root_edges.push(edge),
        }
    }

    Ok(PreparedGraph {
        settings: graph.settings,
        roots,
        edges: root_edges,
    })
}

fn prepare_node(descriptor: NodeDescriptor, config: &LayoutConfig) -> PreparedNode {
    let role = descriptor.role();
    if descriptor.role.is_some() && role.is_none() {
        tracing::debug!(id = %descriptor.id, role = ?descriptor.role, "ignoring unknown role tag");
    }
    let position = match (descriptor.x, descriptor.y) {
        (None, None) => None,
        (x, y) => Some(Point::new(x.unwrap_or(0.0), y.unwrap_or(0.0))),
    };
    let declared_size = match (descriptor.width, descriptor.height) {
        (None, None) => None,
        (w, h) => Some(Size::new(w.unwrap_or(0.0), h.unwrap_or(0.0))),
    };

    let mut node = PreparedNode {
        id: descriptor.id.clone(),
        label: descriptor.label.clone(),
        kind: descriptor.kind.clone(),
        role,
        size: declared_size,
        position,
        collapsed: descriptor.collapsed,
        parent_ids: descriptor.parent_ids.clone(),
        children_ids: descriptor.children_ids.clone(),
        container: None,
    };

    if descriptor.kind == NodeKind::Adapter {
        let (size, container) = prepare_adapter(descriptor, config);
        node.size = Some(size);
        node.container = Some(container);
    } else if descriptor.is_container() {
        let direction = match descriptor.kind {
            NodeKind::Lane => StackDirection::Column,
            _ => StackDirection::Row,
        };
        let children = descriptor
            .children
            .into_iter()
            .map(|child| prepare_node(child, config))
            .collect();
        node.container = Some(PreparedContainer {
            shape: ContainerShape::Stack(direction),
            children,
            edges: Vec::new(),
        });
    } else if descriptor.collapsed {
        tracing::debug!(id = %node.id, "collapsed flag on a leaf node ignored");
        node.collapsed = false;
    }

    node
}

fn prepare_adapter(descriptor: NodeDescriptor, config: &LayoutConfig) -> (Size, PreparedContainer) {
    let declared = descriptor.layout.clone().unwrap_or_default();
    let mode = match declared.mode.as_deref() {
        None => AdapterMode::Full,
        Some(token) => AdapterMode::from_token(token).unwrap_or_else(|| {
            tracing::warn!(id = %descriptor.id, mode = token, "unknown adapter mode, using full");
            AdapterMode::Full
        }),
    };
    let arrangement = declared.arrangement.as_ref().and_then(|raw| {
        let arrangement = raw.code().and_then(Arrangement::from_code);
        if arrangement.is_none() {
            tracing::warn!(id = %descriptor.id, code = ?raw, "unknown arrangement code, using default");
        }
        arrangement
    });
    let layout = AdapterLayout::new(mode, arrangement);

    let defaults = &config.adapter;
    let mut size = Size::new(
        descriptor.width.unwrap_or(defaults.default_size.width),
        descriptor.height.unwrap_or(defaults.default_size.height),
    );
    match mode {
        AdapterMode::StagingArchive | AdapterMode::StagingTransform => {
            size.height = defaults.compact_height;
        }
        AdapterMode::ArchiveOnly => size = defaults.archive_only_size,
        AdapterMode::Manual | AdapterMode::Full => {}
    }

    let mut children: Vec<PreparedNode> = Vec::new();
    let mut roles: HashMap<Role, String> = HashMap::new();
    for child in descriptor.children {
        match child.role() {
            Some(role) if !roles.contains_key(&role) => {
                roles.insert(role, child.id.clone());
                children.push(prepare_node(child, config));
            }
            Some(role) => {
                tracing::warn!(adapter = %descriptor.id, child = %child.id, role = role.as_str(), "duplicate adapter role, skipping child");
            }
            None => {
                tracing::warn!(adapter = %descriptor.id, child = %child.id, "adapter child without a role, skipping child");
            }
        }
    }

    for &role in mode.synthesized_roles() {
        if roles.contains_key(&role) {
            continue;
        }
        let id = format!("{}_{}", role.id_prefix(), descriptor.id);
        roles.insert(role, id.clone());
        children.push(PreparedNode {
            id,
            label: format!("{} {}", role.label_prefix(), descriptor.label),
            kind: NodeKind::Node,
            role: Some(role),
            size: None,
            position: None,
            collapsed: false,
            parent_ids: Vec::new(),
            children_ids: Vec::new(),
            container: None,
        });
    }

    let edges = mode
        .internal_edges()
        .iter()
        .filter_map(|(source, target)| {
            let source = roles.get(source)?;
            let target = roles.get(target)?;
            Some(Edge::internal(source, target))
        })
        .collect();

    let container = PreparedContainer {
        shape: ContainerShape::Adapter(layout),
        children,
        edges,
    };
    (size, container)
}

fn collect_paths(
    node: &PreparedNode,
    ancestors: &mut Vec<(String, bool)>,
    paths: &mut HashMap<String, Vec<(String, bool)>>,
    seen: &mut HashSet<String>,
) -> Result<(), ParseError> {
    if node.id.trim().is_empty() {
        return Err(ParseError::MissingId {
            label: node.label.clone(),
        });
    }
    if !seen.insert(node.id.clone()) {
        return Err(ParseError::DuplicateId(node.id.clone()));
    }
    ancestors.push((node.id.clone(), node.container.is_some()));
    paths.insert(node.id.clone(), ancestors.clone());
    if let Some(container) = &node.container {
        for child in &container.children {
            collect_paths(child, ancestors, paths, seen)?;
        }
    }
    ancestors.pop();
    Ok(())
}

/// Deepest container present on both root paths.
fn nearest_common_container(source: &[(String, bool)], target: &[(String, bool)]) -> Option<String> {
    source
        .iter()
        .zip(target)
        .take_while(|(a, b)| a.0 == b.0)
        .filter(|(entry, _)| entry.1)
        .last()
        .map(|(entry, _)| entry.0.clone())
}

fn find_container_mut<'a>(nodes: &'a mut [PreparedNode], id: &str) -> Option<&'a mut PreparedContainer> {
    for node in nodes.iter_mut() {
        let is_match = node.id == id;
        let Some(container) = node.container.as_mut() else {
            continue;
        };
        if is_match {
            return Some(container);
        }
        if let Some(found) = find_container_mut(&mut container.children, id) {
            return Some(found);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prepare(input: &str) -> PreparedGraph {
        parse_and_prepare(input, &LayoutConfig::default()).unwrap()
    }

    fn child_ids(node: &PreparedNode) -> Vec<&str> {
        node.container
            .as_ref()
            .map(|c| c.children.iter().map(|n| n.id.as_str()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn full_adapter_synthesizes_children_and_edges() {
        let graph = prepare(r#"{ nodes: [ { id: "bv", label: "Bankview", "type": "adapter" } ] }"#);
        let adapter = &graph.roots[0];
        assert_eq!(adapter.size, Some(Size::new(334.0, 74.0)));
        assert_eq!(child_ids(adapter), vec!["arc_bv", "stg_bv", "trn_bv"]);
        let container = adapter.container.as_ref().unwrap();
        assert_eq!(container.children[0].label, "Archive Bankview");
        assert_eq!(container.edges.len(), 2);
        assert_eq!(container.edges[0], Edge::internal("stg_bv", "trn_bv"));
        assert_eq!(container.edges[1], Edge::internal("stg_bv", "arc_bv"));
        assert!(container.edges.iter().all(|e| e.edge_type == "SSIS" && e.state == "Ready"));
    }

    #[test]
    fn declared_role_children_keep_order_and_are_not_duplicated() {
        let graph = prepare(
            r#"{ nodes: [ { id: "a", label: "A", "type": "adapter", layout: { mode: "staging-archive" },
                 children: [ { id: "s1", label: "Stage", role: "staging" } ] } ] }"#,
        );
        let adapter = &graph.roots[0];
        assert_eq!(child_ids(adapter), vec!["s1", "arc_a"]);
        assert_eq!(adapter.size, Some(Size::new(334.0, 44.0)));
        match adapter.container.as_ref().unwrap().shape {
            ContainerShape::Adapter(layout) => assert_eq!(layout.arrangement, Arrangement::Pair),
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn archive_only_forces_size_and_arrangement() {
        let graph = prepare(
            r#"{ nodes: [ { id: "a", label: "A", "type": "adapter", width: 500,
                 layout: { mode: "archive-only", arrangement: 1 } } ] }"#,
        );
        let adapter = &graph.roots[0];
        assert_eq!(adapter.size, Some(Size::new(166.0, 44.0)));
        assert_eq!(child_ids(adapter), vec!["arc_a"]);
        assert!(adapter.container.as_ref().unwrap().edges.is_empty());
    }

    #[test]
    fn arrangement_codes_accept_strings_and_fall_back_on_junk() {
        let graph = prepare(
            r#"{ nodes: [
                 { id: "a", label: "A", "type": "adapter", layout: { arrangement: "2" } },
                 { id: "b", label: "B", "type": "adapter", layout: { arrangement: "sideways" } },
                 { id: "c", label: "C", "type": "adapter", layout: { arrangement: 42 } },
               ] }"#,
        );
        let arrangements: Vec<Arrangement> = graph
            .roots
            .iter()
            .map(|root| match root.container.as_ref().unwrap().shape {
                ContainerShape::Adapter(layout) => layout.arrangement,
                other => panic!("unexpected shape {other:?}"),
            })
            .collect();
        let default = AdapterLayout::new(AdapterMode::Full, None).arrangement;
        assert_eq!(arrangements, vec![Arrangement::StagingBelow, default, default]);
    }

    #[test]
    fn manual_mode_synthesizes_nothing() {
        let graph = prepare(
            r#"{ nodes: [ { id: "a", "type": "adapter", layout: { mode: "manual", arrangement: 3 },
                 children: [ { id: "x", role: "archive" }, { id: "y", label: "no role" } ] } ] }"#,
        );
        assert_eq!(child_ids(&graph.roots[0]), vec!["x"]);
    }

    #[test]
    fn edges_land_on_nearest_common_container() {
        let graph = prepare(
            r#"{
                nodes: [
                  { id: "group", label: "Group", "type": "lane", children: [
                    { id: "bankview", label: "Bankview", "type": "adapter" },
                    { id: "matrix", label: "Matrix", "type": "node" },
                  ] },
                  { id: "loose", label: "Loose" },
                ],
                edges: [
                  { source: "bankview", target: "matrix", "type": "SSIS", state: "Ready", isActive: true },
                  { source: "stg_bankview", target: "loose", "type": "SSIS", state: "Ready" },
                  { source: "ghost", target: "matrix" },
                ],
            }"#,
        );
        let group = graph.roots[0].container.as_ref().unwrap();
        assert_eq!(group.edges.len(), 1);
        assert_eq!(group.edges[0].target, "matrix");
        assert!(!group.edges[0].synthesized);
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].source, "stg_bankview");
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = parse_and_prepare(
            r#"{ nodes: [ { id: "a" }, { id: "g", "type": "group", children: [ { id: "a" } ] } ] }"#,
            &LayoutConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::DuplicateId(id) if id == "a"));
    }

    #[test]
    fn synthesized_id_collision_is_rejected() {
        let err = parse_and_prepare(
            r#"{ nodes: [ { id: "arc_a" }, { id: "a", "type": "adapter", layout: { mode: "archive-only" } } ] }"#,
            &LayoutConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::DuplicateId(_)));
    }

    #[test]
    fn invalid_input_is_a_syntax_error() {
        let err = parse_graph("{ nodes: [").unwrap_err();
        assert!(matches!(err, ParseError::Syntax(_)));
    }
}
