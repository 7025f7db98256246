use crate::node::{Edge, Node};
use std::collections::HashMap;

/// Where a node sits in the tree and who its immediate neighbours are.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexEntry {
    /// Child indices from the root list down to the node.
    pub path: Vec<usize>,
    pub parent_ids: Vec<String>,
    pub children_ids: Vec<String>,
}

/// Id lookup over a built node tree. Adjacency merges the ids each node
/// declares with the endpoints of every edge touching it; ids that name no
/// constructed node are dropped.
#[derive(Debug, Clone, Default)]
pub struct GraphIndex {
    entries: HashMap<String, IndexEntry>,
    order: Vec<String>,
}

impl GraphIndex {
    pub fn build(roots: &[Node], root_edges: &[Edge]) -> Self {
        let mut index = GraphIndex::default();
        let mut path = Vec::new();
        for (idx, root) in roots.iter().enumerate() {
            path.push(idx);
            index.visit(root, &mut path);
            path.pop();
        }

        let declared: Vec<(String, Vec<String>, Vec<String>)> = roots
            .iter()
            .flat_map(|root| root.all_nodes(false))
            .map(|node| {
                (
                    node.id().to_string(),
                    node.parent_ids().to_vec(),
                    node.children_ids().to_vec(),
                )
            })
            .collect();
        for (id, parents, children) in declared {
            for parent in parents {
                index.link(&parent, &id);
            }
            for child in children {
                index.link(&id, &child);
            }
        }

        let edges = root_edges
            .iter()
            .chain(roots.iter().flat_map(|root| root.all_edges(false)));
        for edge in edges {
            index.link(&edge.source, &edge.target);
        }
        tracing::trace!(nodes = index.order.len(), "graph index built");
        index
    }

    fn visit(&mut self, node: &Node, path: &mut Vec<usize>) {
        self.order.push(node.id().to_string());
        self.entries.insert(
            node.id().to_string(),
            IndexEntry {
                path: path.clone(),
                ..IndexEntry::default()
            },
        );
        for (idx, child) in node.children().iter().enumerate() {
            path.push(idx);
            self.visit(child, path);
            path.pop();
        }
    }

    /// Record `parent -> child` on both entries when both exist.
    fn link(&mut self, parent: &str, child: &str) {
        if parent == child || !self.entries.contains_key(parent) || !self.entries.contains_key(child) {
            return;
        }
        if let Some(entry) = self.entries.get_mut(parent) {
            if !entry.children_ids.iter().any(|id| id == child) {
                entry.children_ids.push(child.to_string());
            }
        }
        if let Some(entry) = self.entries.get_mut(child) {
            if !entry.parent_ids.iter().any(|id| id == parent) {
                entry.parent_ids.push(parent.to_string());
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&IndexEntry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn path(&self, id: &str) -> Option<&[usize]> {
        self.entries.get(id).map(|entry| entry.path.as_slice())
    }

    pub fn parents(&self, id: &str) -> &[String] {
        self.entries
            .get(id)
            .map(|entry| entry.parent_ids.as_slice())
            .unwrap_or(&[])
    }

    pub fn children(&self, id: &str) -> &[String] {
        self.entries
            .get(id)
            .map(|entry| entry.children_ids.as_slice())
            .unwrap_or(&[])
    }

    /// Node ids in pre-order.
    pub fn ids(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The node followed by its immediate parents and children, in traversal
    /// order. `None` for an unknown id.
    pub fn neighbors(&self, id: &str) -> Option<Vec<&str>> {
        let (key, entry) = self.entries.get_key_value(id)?;
        let mut out = vec![key.as_str()];
        for other in &self.order {
            if other == id {
                continue;
            }
            let adjacent = entry.parent_ids.iter().any(|p| p == other)
                || entry.children_ids.iter().any(|c| c == other);
            if adjacent {
                out.push(other.as_str());
            }
        }
        Some(out)
    }
}

/// Resolve a tree path produced by [`GraphIndex`].
pub fn node_at_path<'a>(roots: &'a [Node], path: &[usize]) -> Option<&'a Node> {
    let (first, rest) = path.split_first()?;
    let mut node = roots.get(*first)?;
    for idx in rest {
        node = node.children().get(*idx)?;
    }
    Some(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::node::BuildContext;
    use crate::parser::parse_and_prepare;
    use crate::text_metrics::FixedMeasurer;

    fn index(input: &str) -> (Vec<Node>, GraphIndex) {
        let config = LayoutConfig::default();
        let measurer = FixedMeasurer::default();
        let ctx = BuildContext {
            measurer: &measurer,
            config: &config,
        };
        let graph = parse_and_prepare(input, &config).unwrap();
        let roots: Vec<Node> = graph
            .roots
            .into_iter()
            .map(|node| Node::build(node, &ctx))
            .collect();
        let index = GraphIndex::build(&roots, &graph.edges);
        (roots, index)
    }

    #[test]
    fn neighbors_merge_declared_ids_and_edges() {
        let (_, index) = index(
            r#"{
                nodes: [
                  { id: "src", label: "Source", childrenIds: ["mid"] },
                  { id: "mid", label: "Middle", parentIds: ["src", "ghost"] },
                  { id: "dst", label: "Dest" },
                  { id: "far", label: "Far" },
                ],
                edges: [ { source: "mid", target: "dst" } ],
            }"#,
        );
        assert_eq!(index.neighbors("mid"), Some(vec!["mid", "src", "dst"]));
        assert_eq!(index.parents("mid"), &["src".to_string()]);
        assert_eq!(index.neighbors("far"), Some(vec!["far"]));
        assert_eq!(index.neighbors("ghost"), None);
    }

    #[test]
    fn neighbors_borrow_from_the_index_not_the_query() {
        let (_, index) = index(r#"{ nodes: [ { id: "a", label: "A", childrenIds: ["b"] }, { id: "b", label: "B" } ] }"#);
        let found = {
            let query = String::from("b");
            index.neighbors(&query)
        };
        assert_eq!(found, Some(vec!["b", "a"]));
    }

    #[test]
    fn paths_resolve_nested_nodes() {
        let (roots, index) = index(
            r#"{ nodes: [ { id: "x" }, { id: "g", "type": "group", children: [ { id: "a" }, { id: "b" } ] } ] }"#,
        );
        assert_eq!(index.path("b"), Some(&[1usize, 1][..]));
        let node = node_at_path(&roots, index.path("b").unwrap()).unwrap();
        assert_eq!(node.id(), "b");
        assert_eq!(index.ids(), &["x", "g", "a", "b"]);
    }

    #[test]
    fn internal_adapter_edges_are_indexed() {
        let (_, index) = index(r#"{ nodes: [ { id: "bv", label: "Bankview", "type": "adapter" } ] }"#);
        assert_eq!(index.children("stg_bv"), &["trn_bv".to_string(), "arc_bv".to_string()]);
        assert_eq!(
            index.neighbors("stg_bv"),
            Some(vec!["stg_bv", "arc_bv", "trn_bv"])
        );
    }

    #[test]
    fn unbuilt_children_are_not_indexed() {
        let (_, index) = index(
            r#"{ nodes: [ { id: "g", "type": "group", collapsed: true, children: [ { id: "a" } ] } ] }"#,
        );
        assert!(index.contains("g"));
        assert!(!index.contains("a"));
        assert_eq!(index.len(), 1);
    }
}
