use crate::config::NodeSpacing;
use crate::geometry::{Margin, Point, Rect, Size};
use crate::ir::Role;

/// Current size of a child together with the floor any resize is clamped to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChildBox {
    pub size: Size,
    pub minimum: Size,
}

impl ChildBox {
    pub fn new(size: Size, minimum: Size) -> Self {
        Self { size, minimum }
    }

    pub fn fixed(size: Size) -> Self {
        Self::new(size, Size::ZERO)
    }

    pub fn resized(&self, requested: Size) -> Size {
        requested.max(self.minimum)
    }
}

/// Typed children of an adapter; `None` marks an absent role.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Slots {
    pub staging: Option<ChildBox>,
    pub archive: Option<ChildBox>,
    pub transform: Option<ChildBox>,
}

impl Slots {
    pub fn get(&self, role: Role) -> Option<ChildBox> {
        match role {
            Role::Staging => self.staging,
            Role::Archive => self.archive,
            Role::Transform => self.transform,
        }
    }

    pub fn set(&mut self, role: Role, child: ChildBox) {
        match role {
            Role::Staging => self.staging = Some(child),
            Role::Archive => self.archive = Some(child),
            Role::Transform => self.transform = Some(child),
        }
    }

    /// Size of a role, zero when absent.
    pub(crate) fn size_of(&self, role: Role) -> Size {
        self.get(role).map(|child| child.size).unwrap_or(Size::ZERO)
    }
}

/// Container geometry an arrangement works against. Coordinates are relative to
/// the container centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub size: Size,
    pub margin: Margin,
    pub spacing: NodeSpacing,
}

impl Frame {
    pub fn left(&self) -> f32 {
        -self.size.width / 2.0 + self.margin.left
    }

    pub fn top(&self) -> f32 {
        -self.size.height / 2.0 + self.margin.top
    }

    pub fn interior(&self) -> Rect {
        self.margin.interior_rect(self.size)
    }
}

/// Target of one child after an arrangement pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub role: Role,
    pub center: Point,
    pub size: Size,
    /// Set when the arrangement changed the child's size.
    pub resize: Option<Size>,
}

impl Placement {
    pub fn rect(&self) -> Rect {
        Rect::from_center(self.center, self.size)
    }
}
