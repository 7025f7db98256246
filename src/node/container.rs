use super::{BuildContext, Node};
use crate::config::{LayoutConfig, NodeSpacing};
use crate::geometry::{Margin, Size};
use crate::layout::{ChildBox, Frame, Slots, arrange_to_fit, stack};
use crate::node::Edge;
use crate::parser::{ContainerShape, PreparedNode};

/// Container half of a node: owned children, the edges between them, and the
/// collapse state.
#[derive(Debug, Clone)]
pub struct Container {
    shape: ContainerShape,
    margin: Margin,
    spacing: NodeSpacing,
    stack_spacing: f32,
    collapse_affordance: f32,
    pub(super) collapsed: bool,
    pub(super) expanded_size: Option<Size>,
    /// Lower bound set by an explicit resize of a stacking container.
    pub(super) size_floor: Option<Size>,
    /// Children not built yet; construction waits for the first expand.
    pending: Vec<PreparedNode>,
    pub(super) children: Vec<Node>,
    edges: Vec<Edge>,
}

impl Container {
    pub(super) fn new(
        shape: ContainerShape,
        config: &LayoutConfig,
        pending: Vec<PreparedNode>,
        edges: Vec<Edge>,
    ) -> Self {
        Self {
            shape,
            margin: config.container_margin,
            spacing: config.adapter.spacing,
            stack_spacing: config.stack_spacing,
            collapse_affordance: config.collapse_affordance,
            collapsed: false,
            expanded_size: None,
            size_floor: None,
            pending,
            children: Vec::new(),
            edges,
        }
    }

    pub fn shape(&self) -> ContainerShape {
        self.shape
    }

    pub fn margin(&self) -> Margin {
        self.margin
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn expanded_size(&self) -> Option<Size> {
        self.expanded_size
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Ids of declared children that have not been constructed yet.
    pub fn pending_ids(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().map(|p| p.id.as_str())
    }

    pub(super) fn collapsed_size(&self, minimum: Size) -> Size {
        Size::new(minimum.width + self.collapse_affordance, minimum.height)
    }

    /// Build every still-missing child in declared order. Returns how many
    /// were created.
    pub(super) fn init_children(&mut self, ctx: &BuildContext<'_>) -> usize {
        let pending = std::mem::take(&mut self.pending);
        let count = pending.len();
        for prepared in pending {
            if self.children.iter().any(|child| child.id() == prepared.id) {
                tracing::warn!(id = %prepared.id, "child already constructed, skipping");
                continue;
            }
            self.children.push(Node::build(prepared, ctx));
        }
        count
    }

    /// Position every child and return the container size that holds them.
    pub(super) fn arrange_children(&mut self, current: Size, minimum: Size) -> Size {
        match self.shape {
            ContainerShape::Adapter(layout) => {
                let mut slots = Slots::default();
                for child in &self.children {
                    let Some(role) = child.role() else { continue };
                    if slots.get(role).is_none() {
                        slots.set(role, ChildBox::new(child.size(), child.minimum_size()));
                    }
                }
                let frame = Frame {
                    size: current.max(minimum),
                    margin: self.margin,
                    spacing: self.spacing,
                };
                let (size, placements) = arrange_to_fit(layout, frame, &slots);
                for placement in placements {
                    let Some(child) = self
                        .children
                        .iter_mut()
                        .find(|child| child.role() == Some(placement.role))
                    else {
                        continue;
                    };
                    if let Some(resize) = placement.resize {
                        child.resize(resize);
                    }
                    child.set_position(placement.center);
                }
                size
            }
            ContainerShape::Stack(direction) => {
                let sizes: Vec<Size> = self.children.iter().map(Node::size).collect();
                let floor = minimum.max(self.size_floor.unwrap_or(Size::ZERO));
                let (size, centers) =
                    stack(direction, &sizes, self.margin, self.stack_spacing, floor);
                for (child, center) in self.children.iter_mut().zip(centers) {
                    child.set_position(center);
                }
                size
            }
        }
    }
}
