//! Tooltip placement for tour steps.
//!
//! Pure geometry: the caller measures the target element and the tooltip,
//! and [`compute_anchor`] returns where the tooltip's top-left corner goes.

use serde::{Deserialize, Serialize};

/// Gap between the target element and the tooltip.
pub const TOOLTIP_OFFSET: f64 = 12.0;

/// Minimum distance kept between the tooltip and the viewport edges.
pub const VIEWPORT_MARGIN: f64 = 8.0;

/// Axis-aligned box in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    fn right(&self) -> f64 {
        self.x + self.width
    }

    fn bottom(&self) -> f64 {
        self.y + self.height
    }

    fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }
}

/// Width and height of the tooltip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Visible area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// Side of the target the tooltip is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
    Center,
}

impl Placement {
    /// Sides to try, in order: requested, opposite, then the perpendiculars.
    fn fallback_order(self) -> [Placement; 4] {
        use Placement::*;
        match self {
            Top => [Top, Bottom, Right, Left],
            Bottom => [Bottom, Top, Right, Left],
            Left => [Left, Right, Bottom, Top],
            Right => [Right, Left, Bottom, Top],
            Center => [Center, Center, Center, Center],
        }
    }
}

/// Where the tooltip ends up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub x: f64,
    pub y: f64,
    /// Side actually used after fallback.
    pub placement: Placement,
}

/// Compute the tooltip anchor for a step.
///
/// A missing target, or [`Placement::Center`], centers the tooltip in the
/// viewport. Otherwise the first side from the fallback order with enough
/// room wins; when no side fits the requested side is kept. The result is
/// always clamped inside the viewport margin.
pub fn compute_anchor(
    target: Option<Rect>,
    tooltip: Size,
    viewport: Viewport,
    requested: Placement,
) -> Anchor {
    let target = match target {
        Some(t) if requested != Placement::Center => t,
        _ => {
            let (x, y) = viewport_center(tooltip, viewport);
            let (x, y) = clamp(x, y, tooltip, viewport);
            return Anchor {
                x,
                y,
                placement: Placement::Center,
            };
        }
    };

    let placement = requested
        .fallback_order()
        .into_iter()
        .find(|side| fits(*side, &target, tooltip, viewport))
        .unwrap_or(requested);

    let (x, y) = match placement {
        Placement::Top => (
            target.center_x() - tooltip.width / 2.0,
            target.y - TOOLTIP_OFFSET - tooltip.height,
        ),
        Placement::Bottom => (
            target.center_x() - tooltip.width / 2.0,
            target.bottom() + TOOLTIP_OFFSET,
        ),
        Placement::Left => (
            target.x - TOOLTIP_OFFSET - tooltip.width,
            target.center_y() - tooltip.height / 2.0,
        ),
        Placement::Right => (
            target.right() + TOOLTIP_OFFSET,
            target.center_y() - tooltip.height / 2.0,
        ),
        Placement::Center => viewport_center(tooltip, viewport),
    };
    let (x, y) = clamp(x, y, tooltip, viewport);

    Anchor { x, y, placement }
}

fn fits(side: Placement, target: &Rect, tooltip: Size, viewport: Viewport) -> bool {
    match side {
        Placement::Top => target.y - TOOLTIP_OFFSET - tooltip.height >= VIEWPORT_MARGIN,
        Placement::Bottom => {
            target.bottom() + TOOLTIP_OFFSET + tooltip.height <= viewport.height - VIEWPORT_MARGIN
        }
        Placement::Left => target.x - TOOLTIP_OFFSET - tooltip.width >= VIEWPORT_MARGIN,
        Placement::Right => {
            target.right() + TOOLTIP_OFFSET + tooltip.width <= viewport.width - VIEWPORT_MARGIN
        }
        Placement::Center => true,
    }
}

fn viewport_center(tooltip: Size, viewport: Viewport) -> (f64, f64) {
    (
        (viewport.width - tooltip.width) / 2.0,
        (viewport.height - tooltip.height) / 2.0,
    )
}

fn clamp(x: f64, y: f64, tooltip: Size, viewport: Viewport) -> (f64, f64) {
    let max_x = (viewport.width - VIEWPORT_MARGIN - tooltip.width).max(VIEWPORT_MARGIN);
    let max_y = (viewport.height - VIEWPORT_MARGIN - tooltip.height).max(VIEWPORT_MARGIN);
    (
        x.clamp(VIEWPORT_MARGIN, max_x),
        y.clamp(VIEWPORT_MARGIN, max_y),
    )
}
