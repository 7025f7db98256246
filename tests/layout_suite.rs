use std::path::Path;

use pipeline_diagram::{
    Diagram, FixedMeasurer, LayoutConfig, Node, Viewport, ViewportConfig, layout_dump::LayoutDump,
};

fn load_fixture(path: &Path) -> Diagram {
    let input = std::fs::read_to_string(path).expect("fixture read failed");
    Diagram::parse(&input, Box::new(FixedMeasurer::default()), LayoutConfig::default())
        .expect("parse failed")
}

fn assert_children_inside(node: &Node, fixture: &str) {
    let Some(container) = node.container() else {
        return;
    };
    if container.is_collapsed() {
        return;
    }
    let interior = container.margin().interior_rect(node.size());
    for child in container.children() {
        assert!(
            interior.contains_rect(&child.rect()),
            "{fixture}: {} escapes {}",
            child.id(),
            node.id()
        );
        assert_children_inside(child, fixture);
    }
}

fn check_diagram(diagram: &mut Diagram, fixture: &str) {
    for root in diagram.roots() {
        assert_children_inside(root, fixture);
    }

    let first: Vec<String> = diagram.all_nodes(false).iter().map(|n| n.id().to_string()).collect();
    let second: Vec<String> = diagram.all_nodes(false).iter().map(|n| n.id().to_string()).collect();
    assert_eq!(first, second, "{fixture}: traversal order changed");
    assert_eq!(first, diagram.index().ids(), "{fixture}: index order differs from traversal");

    for edge in diagram.resolved_edges() {
        assert!(diagram.get_node(&edge.edge.source).is_some(), "{fixture}: dangling source");
        assert!(diagram.get_node(&edge.edge.target).is_some(), "{fixture}: dangling target");
    }

    let mut viewport = Viewport::new(ViewportConfig::default());
    for id in &first {
        let focus = viewport.focus(diagram, id).expect("focus failed");
        assert!(focus.transform.scale.is_finite() && focus.transform.scale > 0.0, "{fixture}: {id}");
        assert_eq!(focus.neighbors[0], *id);
    }

    // Expanded containers survive a collapse/expand round trip unchanged.
    let containers: Vec<(String, pipeline_diagram::Size)> = diagram
        .all_nodes(false)
        .iter()
        .filter(|n| n.is_container() && !n.is_collapsed() && n.is_visible())
        .map(|n| (n.id().to_string(), n.size()))
        .collect();
    for (id, size) in containers {
        diagram.set_collapsed(&id, true).expect("collapse failed");
        diagram.set_collapsed(&id, false).expect("expand failed");
        assert_eq!(diagram.get_node(&id).map(Node::size), Some(size), "{fixture}: {id} round trip");
    }

    let dump = LayoutDump::from_diagram(diagram, &viewport);
    let json = serde_json::to_string(&dump).expect("dump serialization failed");
    assert!(json.contains("\"nodes\""), "{fixture}: dump missing nodes");
}

#[test]
fn layout_all_fixtures() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures");

    // Keep this list explicit so new fixtures must be added intentionally.
    let fixtures = [
        "adapters/full.json",
        "adapters/two_node_modes.json",
        "adapters/manual_arrangements.json5",
        "containers/nested_lanes.json",
        "containers/collapsed.json",
        "pipelines/dashboard.json",
    ];

    for rel in fixtures {
        let path = root.join(rel);
        assert!(path.exists(), "fixture missing: {}", rel);
        let mut diagram = load_fixture(&path);
        check_diagram(&mut diagram, rel);
    }
}

#[test]
fn collapsed_fixture_builds_children_on_expand() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/containers/collapsed.json");
    let mut diagram = load_fixture(&path);
    assert!(diagram.get_node("s3").is_none());
    assert_eq!(diagram.resolved_edges().len(), 0);

    diagram.set_collapsed("archive", false).expect("expand failed");
    let archive = diagram.get_node("archive").expect("archive missing");
    assert!(archive.width() >= 480.0 && archive.height() >= 160.0);
    assert!(diagram.get_node("arc_glacier").is_some_and(Node::is_visible));
    assert_eq!(diagram.resolved_edges().len(), 2);
}

#[test]
fn dashboard_focus_frames_adapter_feeds() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/pipelines/dashboard.json");
    let diagram = load_fixture(&path);
    assert_eq!(diagram.settings()["refreshSeconds"].as_f64(), Some(30.0));

    let mut viewport = Viewport::new(ViewportConfig::default());
    let focus = viewport.focus(&diagram, "matrix").expect("focus failed");
    for id in ["matrix", "bankview", "trn_bankview", "ledger", "trn_ledger", "facts", "dims"] {
        assert!(focus.neighbors.iter().any(|n| n == id), "missing neighbour {id}");
    }
    assert!(viewport.focus(&diagram, "nowhere").is_err());
    assert_eq!(viewport.transform(), focus.transform);
}
