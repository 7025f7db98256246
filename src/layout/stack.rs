use crate::geometry::{Margin, Point, Size};
use serde::{Deserialize, Serialize};

/// Direction generic containers (`group`, `lane`, `columns`) stack children in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StackDirection {
    Row,
    Column,
}

/// Lay children out one after another from the top-left of the interior.
/// Returns the hugging container size (never below `floor`) and each child's
/// centre relative to that container's centre.
pub fn stack(
    direction: StackDirection,
    children: &[Size],
    margin: Margin,
    spacing: f32,
    floor: Size,
) -> (Size, Vec<Point>) {
    let mut content = Size::ZERO;
    let mut offsets = Vec::with_capacity(children.len());
    let mut cursor = 0.0f32;
    for (idx, child) in children.iter().enumerate() {
        if idx > 0 {
            cursor += spacing;
        }
        match direction {
            StackDirection::Row => {
                offsets.push(Point::new(cursor, 0.0));
                cursor += child.width;
                content.width = cursor;
                content.height = content.height.max(child.height);
            }
            StackDirection::Column => {
                offsets.push(Point::new(0.0, cursor));
                cursor += child.height;
                content.height = cursor;
                content.width = content.width.max(child.width);
            }
        }
    }

    let size = Size::new(
        content.width + margin.horizontal(),
        content.height + margin.vertical(),
    )
    .max(floor);
    let left = -size.width / 2.0 + margin.left;
    let top = -size.height / 2.0 + margin.top;
    let centers = children
        .iter()
        .zip(offsets)
        .map(|(child, offset)| {
            Point::new(
                left + offset.x + child.width / 2.0,
                top + offset.y + child.height / 2.0,
            )
        })
        .collect();
    (size, centers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_hugs_children() {
        let margin = Margin::new(18.0, 8.0, 8.0, 8.0);
        let (size, centers) = stack(
            StackDirection::Row,
            &[Size::new(100.0, 40.0), Size::new(50.0, 20.0)],
            margin,
            20.0,
            Size::ZERO,
        );
        assert_eq!(size, Size::new(186.0, 66.0));
        assert_eq!(centers[0], Point::new(-93.0 + 8.0 + 50.0, -33.0 + 18.0 + 20.0));
        assert_eq!(centers[1], Point::new(-93.0 + 8.0 + 120.0 + 25.0, -33.0 + 18.0 + 10.0));
    }

    #[test]
    fn column_respects_floor() {
        let (size, centers) = stack(
            StackDirection::Column,
            &[Size::new(10.0, 10.0)],
            Margin::default(),
            5.0,
            Size::new(80.0, 30.0),
        );
        assert_eq!(size, Size::new(80.0, 30.0));
        assert_eq!(centers[0], Point::new(-35.0, -10.0));
    }

    #[test]
    fn empty_stack_is_margins_only() {
        let margin = Margin::new(18.0, 8.0, 8.0, 8.0);
        let (size, centers) = stack(StackDirection::Column, &[], margin, 20.0, Size::ZERO);
        assert_eq!(size, Size::new(16.0, 26.0));
        assert!(centers.is_empty());
    }
}
