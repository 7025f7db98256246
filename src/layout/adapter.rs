use super::types::{Frame, Placement, Slots};
use crate::geometry::{Point, Size};
use crate::ir::Role;
use serde::{Deserialize, Serialize};

/// Declared shape of an adapter: which typed children it owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdapterMode {
    Manual,
    #[default]
    Full,
    ArchiveOnly,
    StagingArchive,
    StagingTransform,
}

impl AdapterMode {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "manual" => Some(Self::Manual),
            "full" => Some(Self::Full),
            "archive-only" => Some(Self::ArchiveOnly),
            "staging-archive" => Some(Self::StagingArchive),
            "staging-transform" => Some(Self::StagingTransform),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Full => "full",
            Self::ArchiveOnly => "archive-only",
            Self::StagingArchive => "staging-archive",
            Self::StagingTransform => "staging-transform",
        }
    }

    /// Roles synthesized when the input does not declare them, in creation order.
    pub fn synthesized_roles(self) -> &'static [Role] {
        match self {
            Self::Manual => &[],
            Self::Full => &[Role::Archive, Role::Staging, Role::Transform],
            Self::ArchiveOnly => &[Role::Archive],
            Self::StagingArchive => &[Role::Archive, Role::Staging],
            Self::StagingTransform => &[Role::Staging, Role::Transform],
        }
    }

    /// Internal `(source, target)` edges implied by the mode.
    pub fn internal_edges(self) -> &'static [(Role, Role)] {
        match self {
            Self::Full => &[
                (Role::Staging, Role::Transform),
                (Role::Staging, Role::Archive),
            ],
            Self::StagingTransform => &[(Role::Staging, Role::Transform)],
            Self::StagingArchive => &[(Role::Staging, Role::Archive)],
            Self::Manual | Self::ArchiveOnly => &[],
        }
    }

    pub fn forced_arrangement(self) -> Option<Arrangement> {
        match self {
            Self::StagingArchive | Self::StagingTransform => Some(Arrangement::Pair),
            Self::ArchiveOnly => Some(Arrangement::Single),
            Self::Manual | Self::Full => None,
        }
    }

    /// The node placed next to staging by the two-node arrangement.
    pub fn partner_role(self) -> Role {
        match self {
            Self::StagingTransform => Role::Transform,
            _ => Role::Archive,
        }
    }
}

/// Geometric arrangement codes 1 to 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Arrangement {
    /// Staging and archive side by side, transform stretched below.
    #[default]
    SideBySide,
    /// Archive on top, staging and transform below it.
    StagingBelow,
    /// Staging stretched to the height of archive plus transform.
    TallStaging,
    /// Staging with one partner to its right.
    Pair,
    /// Archive alone.
    Single,
}

impl Arrangement {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::SideBySide),
            2 => Some(Self::StagingBelow),
            3 => Some(Self::TallStaging),
            4 => Some(Self::Pair),
            5 => Some(Self::Single),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::SideBySide => 1,
            Self::StagingBelow => 2,
            Self::TallStaging => 3,
            Self::Pair => 4,
            Self::Single => 5,
        }
    }
}

impl TryFrom<u8> for Arrangement {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or_else(|| format!("unknown arrangement code {code}"))
    }
}

impl From<Arrangement> for u8 {
    fn from(value: Arrangement) -> Self {
        value.code()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AdapterLayout {
    pub mode: AdapterMode,
    pub arrangement: Arrangement,
}

impl AdapterLayout {
    pub fn new(mode: AdapterMode, declared: Option<Arrangement>) -> Self {
        let arrangement = mode
            .forced_arrangement()
            .or(declared)
            .unwrap_or_default();
        Self { mode, arrangement }
    }
}

/// Position the adapter's children. Output order is staging, archive,
/// transform; absent roles are skipped and read as zero-size by the others.
pub fn arrange(layout: AdapterLayout, frame: &Frame, slots: &Slots) -> Vec<Placement> {
    match layout.arrangement {
        Arrangement::SideBySide => arrange_side_by_side(frame, slots),
        Arrangement::StagingBelow => arrange_staging_below(frame, slots),
        Arrangement::TallStaging => arrange_tall_staging(frame, slots),
        Arrangement::Pair => arrange_pair(frame, slots, layout.mode.partner_role()),
        Arrangement::Single => arrange_single(frame, slots),
    }
}

fn place(role: Role, x: f32, y: f32, size: Size, resize: Option<Size>) -> Placement {
    Placement {
        role,
        center: Point::new(x, y),
        size,
        resize,
    }
}

fn arrange_side_by_side(frame: &Frame, slots: &Slots) -> Vec<Placement> {
    let mut out = Vec::with_capacity(3);
    let h = frame.spacing.horizontal;
    let v = frame.spacing.vertical;
    let staging = slots.size_of(Role::Staging);
    let archive = slots.size_of(Role::Archive);

    if slots.staging.is_some() {
        let x = frame.left() + staging.width / 2.0;
        let y = frame.top() + staging.height / 2.0;
        out.push(place(Role::Staging, x, y, staging, None));
    }

    if slots.archive.is_some() {
        let x = frame.left() + archive.width / 2.0 + staging.width + h;
        let y = frame.top() + archive.height / 2.0;
        out.push(place(Role::Archive, x, y, archive, None));
    }

    if let Some(transform) = slots.transform {
        // Left unsimplified.
        let width = staging.width + archive.width - staging.width / 2.0 + h - 2.0 * h;
        let size = transform.resized(Size::new(width, transform.size.height));
        let x = frame.left() + size.width / 2.0 + staging.width / 2.0 + 2.0 * h;
        let y = frame.top() + size.height / 2.0 + archive.height + v;
        let resize = (size != transform.size).then_some(size);
        out.push(place(Role::Transform, x, y, size, resize));
    }

    out
}

fn arrange_staging_below(frame: &Frame, slots: &Slots) -> Vec<Placement> {
    let mut out = Vec::with_capacity(3);
    let h = frame.spacing.horizontal;
    let v = frame.spacing.vertical;
    let staging = slots.size_of(Role::Staging);
    let archive = slots.size_of(Role::Archive);

    if slots.staging.is_some() {
        let x = frame.left() + staging.width / 2.0;
        let y = frame.top() + staging.height / 2.0 + archive.height + v;
        out.push(place(Role::Staging, x, y, staging, None));
    }

    if slots.archive.is_some() {
        let x = frame.left() + archive.width / 2.0 + archive.width / 2.0 + h;
        let y = frame.top() + archive.height / 2.0;
        out.push(place(Role::Archive, x, y, archive, None));
    }

    if let Some(transform) = slots.transform {
        let size = transform.size;
        let x = frame.left() + size.width / 2.0 + staging.width + h;
        let y = frame.top() + size.height / 2.0 + archive.height + v;
        out.push(place(Role::Transform, x, y, size, None));
    }

    out
}

fn arrange_tall_staging(frame: &Frame, slots: &Slots) -> Vec<Placement> {
    let mut out = Vec::with_capacity(3);
    let h = frame.spacing.horizontal;
    let v = frame.spacing.vertical;
    let archive = slots.size_of(Role::Archive);

    let mut staging = slots.size_of(Role::Staging);
    if let Some(child) = slots.staging {
        let mut height = archive.height;
        if let Some(transform) = slots.transform {
            height += transform.size.height + v;
        }
        staging = child.resized(Size::new(child.size.width, height));
        let x = frame.left() + staging.width / 2.0;
        let y = frame.top() + staging.height / 2.0;
        let resize = (staging != child.size).then_some(staging);
        out.push(place(Role::Staging, x, y, staging, resize));
    }

    if slots.archive.is_some() {
        let x = frame.left() + archive.width / 2.0 + staging.width + h;
        let y = frame.top() + archive.height / 2.0;
        out.push(place(Role::Archive, x, y, archive, None));
    }

    if let Some(transform) = slots.transform {
        let size = transform.size;
        let x = frame.left() + size.width / 2.0 + staging.width + h;
        let y = frame.top() + size.height / 2.0 + archive.height + v;
        out.push(place(Role::Transform, x, y, size, None));
    }

    out
}

fn arrange_pair(frame: &Frame, slots: &Slots, partner: Role) -> Vec<Placement> {
    let mut out = Vec::with_capacity(2);
    let staging = slots.size_of(Role::Staging);

    if slots.staging.is_some() {
        let x = frame.left() + staging.width / 2.0;
        let y = frame.top() + staging.height / 2.0;
        out.push(place(Role::Staging, x, y, staging, None));
    }

    if let Some(other) = slots.get(partner) {
        let size = other.size;
        let x = frame.left() + size.width / 2.0 + staging.width + frame.spacing.horizontal;
        let y = frame.top() + size.height / 2.0;
        out.push(place(partner, x, y, size, None));
    }

    out
}

fn arrange_single(frame: &Frame, slots: &Slots) -> Vec<Placement> {
    let Some(archive) = slots.archive else {
        return Vec::new();
    };
    let center = frame.interior().center();
    vec![place(Role::Archive, center.x, center.y, archive.size, None)]
}

/// Smallest container size whose interior holds every placement, never smaller
/// than the frame's own size.
pub fn required_size(frame: &Frame, placements: &[Placement]) -> Size {
    let interior = frame.interior();
    let mut grow_left = 0.0f32;
    let mut grow_right = 0.0f32;
    let mut grow_top = 0.0f32;
    let mut grow_bottom = 0.0f32;
    for placement in placements {
        let rect = placement.rect();
        grow_left = grow_left.max(interior.x - rect.x);
        grow_right = grow_right.max(rect.right() - interior.right());
        grow_top = grow_top.max(interior.y - rect.y);
        grow_bottom = grow_bottom.max(rect.bottom() - interior.bottom());
    }
    Size::new(
        frame.size.width + grow_left + grow_right,
        frame.size.height + grow_top + grow_bottom,
    )
}

/// Arrange, growing the frame until every child fits inside the margins.
/// Returns the final container size with the matching placements.
pub fn arrange_to_fit(layout: AdapterLayout, frame: Frame, slots: &Slots) -> (Size, Vec<Placement>) {
    let mut frame = frame;
    let mut placements = arrange(layout, &frame, slots);
    for _ in 0..3 {
        let required = required_size(&frame, &placements);
        if !required.exceeds(frame.size) {
            break;
        }
        frame.size = required.max(frame.size);
        placements = arrange(layout, &frame, slots);
    }
    (frame.size, placements)
}
