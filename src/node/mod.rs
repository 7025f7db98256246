//! Node hierarchy: leaves and containers, sizing, collapse state and
//! depth-first traversal.

mod container;
mod edge;

pub use container::Container;
pub use edge::*;

use crate::config::LayoutConfig;
use crate::error::DiagramError;
use crate::geometry::{Point, Rect, Size};
use crate::ir::{NodeKind, Role};
use crate::parser::{ContainerShape, PreparedNode};
use crate::text_metrics::LabelMeasurer;
use serde::Serialize;

/// What node construction needs besides the prepared descriptor.
#[derive(Clone, Copy)]
pub struct BuildContext<'a> {
    pub measurer: &'a dyn LabelMeasurer,
    pub config: &'a LayoutConfig,
}

/// Outcome of a collapse-state command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "transition", rename_all = "kebab-case")]
pub enum CollapseTransition {
    /// The container was already in the requested state.
    Unchanged,
    Collapsed {
        /// Size remembered for the next expand, if it exceeded the minimum.
        stored: Option<Size>,
        size: Size,
    },
    Expanded {
        restored: Option<Size>,
        /// Children constructed by this expand.
        constructed: usize,
        size: Size,
    },
}

#[derive(Debug, Clone)]
enum NodeBody {
    Leaf,
    Container(Container),
}

/// A placed node. The position is the centre, relative to the parent's centre
/// (graph space for roots).
#[derive(Debug, Clone)]
pub struct Node {
    id: String,
    label: String,
    kind: NodeKind,
    role: Option<Role>,
    center: Point,
    size: Size,
    minimum_size: Size,
    visible: bool,
    selected: bool,
    parent_ids: Vec<String>,
    children_ids: Vec<String>,
    body: NodeBody,
}

impl Node {
    /// Build a node and, unless it starts collapsed, its whole subtree.
    pub fn build(prepared: PreparedNode, ctx: &BuildContext<'_>) -> Node {
        let PreparedNode {
            id,
            label,
            kind,
            role,
            size,
            position,
            collapsed,
            parent_ids,
            children_ids,
            container,
        } = prepared;

        let padding = if container.is_some() {
            ctx.config.container_label_padding
        } else {
            ctx.config.leaf_label_padding
        };
        let text = ctx.measurer.measure_label(&label);
        let minimum_size = Size::new(text.width + padding.width, text.height + padding.height);

        let (size, body) = match container {
            None => (
                size.unwrap_or(ctx.config.leaf_default_size),
                NodeBody::Leaf,
            ),
            Some(prepared) => {
                let mut container =
                    Container::new(prepared.shape, ctx.config, prepared.children, prepared.edges);
                if matches!(prepared.shape, ContainerShape::Stack(_)) {
                    container.size_floor = size;
                }
                (size.unwrap_or(Size::ZERO), NodeBody::Container(container))
            }
        };

        let mut node = Node {
            id,
            label,
            kind,
            role,
            center: position.unwrap_or_default(),
            size: size.max(minimum_size),
            minimum_size,
            visible: true,
            selected: false,
            parent_ids,
            children_ids,
            body,
        };

        if node.is_container() {
            if collapsed {
                node.collapse();
            } else {
                node.expand(ctx);
            }
        }
        tracing::trace!(id = %node.id, size = ?node.size, collapsed, "node built");
        node
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn x(&self) -> f32 {
        self.center.x
    }

    pub fn y(&self) -> f32 {
        self.center.y
    }

    pub fn position(&self) -> Point {
        self.center
    }

    pub fn width(&self) -> f32 {
        self.size.width
    }

    pub fn height(&self) -> f32 {
        self.size.height
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn minimum_size(&self) -> Size {
        self.minimum_size
    }

    /// Bounds relative to the parent's centre.
    pub fn rect(&self) -> Rect {
        Rect::from_center(self.center, self.size)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn parent_ids(&self) -> &[String] {
        &self.parent_ids
    }

    pub fn children_ids(&self) -> &[String] {
        &self.children_ids
    }

    pub fn container(&self) -> Option<&Container> {
        match &self.body {
            NodeBody::Container(container) => Some(container),
            NodeBody::Leaf => None,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self.body, NodeBody::Container(_))
    }

    /// False for leaves.
    pub fn is_collapsed(&self) -> bool {
        self.container().is_some_and(Container::is_collapsed)
    }

    /// Constructed children; empty for leaves and never-expanded containers.
    pub fn children(&self) -> &[Node] {
        self.container().map(Container::children).unwrap_or(&[])
    }

    pub(crate) fn set_position(&mut self, center: Point) {
        self.center = center;
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    /// Resize to `requested`, clamped to the minimum size, then re-arrange the
    /// children. Containers may end up larger than requested when their
    /// children need the room. Returns the resulting size.
    pub fn resize(&mut self, requested: Size) -> Size {
        let size = requested.max(self.minimum_size);
        self.size = size;
        if let NodeBody::Container(container) = &mut self.body {
            if matches!(container.shape(), ContainerShape::Stack(_)) {
                container.size_floor = Some(size);
            }
        }
        self.relayout();
        self.size
    }

    /// Re-run the local arrangement. Collapsed containers and leaves keep
    /// their size.
    pub(crate) fn relayout(&mut self) {
        let current = self.size;
        let minimum = self.minimum_size;
        let NodeBody::Container(container) = &mut self.body else {
            return;
        };
        if container.collapsed {
            return;
        }
        self.size = container.arrange_children(current, minimum);
    }

    pub fn set_collapsed(
        &mut self,
        collapsed: bool,
        ctx: &BuildContext<'_>,
    ) -> Result<CollapseTransition, DiagramError> {
        let Some(container) = self.container() else {
            return Err(DiagramError::NotAContainer(self.id.clone()));
        };
        if container.is_collapsed() == collapsed {
            return Ok(CollapseTransition::Unchanged);
        }
        let transition = if collapsed {
            let stored = self.collapse();
            CollapseTransition::Collapsed {
                stored,
                size: self.size,
            }
        } else {
            let (restored, constructed) = self.expand(ctx);
            CollapseTransition::Expanded {
                restored,
                constructed,
                size: self.size,
            }
        };
        tracing::debug!(id = %self.id, ?transition, "collapse state changed");
        Ok(transition)
    }

    pub fn toggle_collapsed(&mut self, ctx: &BuildContext<'_>) -> Result<CollapseTransition, DiagramError> {
        let collapsed = self.is_collapsed();
        self.set_collapsed(!collapsed, ctx)
    }

    fn collapse(&mut self) -> Option<Size> {
        let size = self.size;
        let minimum = self.minimum_size;
        let NodeBody::Container(container) = &mut self.body else {
            return None;
        };
        let stored = size.exceeds(minimum).then_some(size);
        if stored.is_some() {
            container.expanded_size = stored;
        }
        container.collapsed = true;
        self.size = container.collapsed_size(minimum);
        let visible = self.visible;
        self.set_visible(visible);
        stored
    }

    fn expand(&mut self, ctx: &BuildContext<'_>) -> (Option<Size>, usize) {
        let NodeBody::Container(container) = &mut self.body else {
            return (None, 0);
        };
        container.collapsed = false;
        let restored = container.expanded_size;
        let constructed = container.init_children(ctx);
        if let Some(size) = restored {
            self.size = size;
        }
        let visible = self.visible;
        self.set_visible(visible);
        self.relayout();
        (restored, constructed)
    }

    /// Descendants are visible only when every container above them is
    /// expanded and visible.
    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        if let NodeBody::Container(container) = &mut self.body {
            let inner = visible && !container.collapsed;
            for child in &mut container.children {
                child.set_visible(inner);
            }
        }
    }

    /// Depth-first lookup, self first.
    pub fn get_node(&self, id: &str) -> Option<&Node> {
        if self.id == id {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.get_node(id))
    }

    pub(crate) fn get_node_mut(&mut self, id: &str) -> Option<&mut Node> {
        if self.id == id {
            return Some(self);
        }
        let NodeBody::Container(container) = &mut self.body else {
            return None;
        };
        container
            .children
            .iter_mut()
            .find_map(|child| child.get_node_mut(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get_node(id).is_some()
    }

    /// Child at `index` of this container.
    pub(crate) fn child(&self, index: usize) -> Option<&Node> {
        self.children().get(index)
    }

    /// Apply `f` to the node `id` in this subtree, then re-arrange every
    /// container between it and `self` so size changes propagate upward.
    pub(crate) fn update<R>(&mut self, id: &str, f: impl FnOnce(&mut Node) -> R) -> Option<R> {
        if self.id == id {
            return Some(f(self));
        }
        let NodeBody::Container(container) = &mut self.body else {
            return None;
        };
        let child = container
            .children
            .iter_mut()
            .find(|child| child.contains(id))?;
        let result = child.update(id, f);
        self.relayout();
        result
    }

    /// Pre-order list of this node and its constructed descendants.
    pub fn all_nodes(&self, only_selected: bool) -> Vec<&Node> {
        let mut out = Vec::new();
        self.collect_nodes(only_selected, &mut out);
        out
    }

    fn collect_nodes<'a>(&'a self, only_selected: bool, out: &mut Vec<&'a Node>) {
        if !only_selected || self.selected {
            out.push(self);
        }
        for child in self.children() {
            child.collect_nodes(only_selected, out);
        }
    }

    /// Edges owned by this subtree, a container's own edges before its
    /// children's. With `only_selected`, both endpoints must be selected.
    pub fn all_edges(&self, only_selected: bool) -> Vec<&Edge> {
        let mut out = Vec::new();
        self.collect_edges(self, only_selected, &mut out);
        out
    }

    fn collect_edges<'a>(&'a self, root: &Node, only_selected: bool, out: &mut Vec<&'a Edge>) {
        let Some(container) = self.container() else {
            return;
        };
        for edge in container.edges() {
            if !only_selected || root.edge_selected(edge) {
                out.push(edge);
            }
        }
        for child in container.children() {
            child.collect_edges(root, only_selected, out);
        }
    }

    fn edge_selected(&self, edge: &Edge) -> bool {
        let selected = |id: &str| self.get_node(id).is_some_and(Node::is_selected);
        selected(&edge.source) && selected(&edge.target)
    }
}
