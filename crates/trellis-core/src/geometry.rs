#![forbid(unsafe_code)]

//! Layout boxes and placement math.
//!
//! The host reports each element's border box in document pixels; widgets
//! only read these boxes to place transient elements (tooltips, popovers)
//! and to compute scroll targets.

/// A rectangle in document pixel space.
///
/// Width and height are never negative; constructors clamp them to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Create a new rectangle.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width: if width < 0 { 0 } else { width },
            height: if height < 0 { 0 } else { height },
        }
    }

    /// Rectangle with the given size at the origin.
    pub const fn from_size(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    #[inline]
    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Horizontal center (rounded down).
    #[inline]
    pub const fn center_x(&self) -> i32 {
        self.x + self.width / 2
    }

    /// Vertical center (rounded down).
    #[inline]
    pub const fn center_y(&self) -> i32 {
        self.y + self.height / 2
    }

    /// Whether the point lies inside the rectangle (right/bottom exclusive).
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Translate by the given offset.
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self {
            width: if width < 0 { 0 } else { width },
            height: if height < 0 { 0 } else { height },
        }
    }
}

/// Side of an anchor on which a floating element is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Side {
    #[default]
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    /// Lowercase name used in modifier classes (`tooltip-top`, ...).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Left => "left",
        }
    }

    /// Parse a side name; unknown names return `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "top" => Some(Self::Top),
            "right" => Some(Self::Right),
            "bottom" => Some(Self::Bottom),
            "left" => Some(Self::Left),
            _ => None,
        }
    }

    /// Place a box of `size` next to `anchor` on this side, `gap` pixels away.
    ///
    /// The box is centered on the anchor along the cross axis. No viewport
    /// clamping is performed; callers that need it clamp the result.
    pub fn place(self, anchor: Rect, size: Size, gap: i32) -> Rect {
        let (x, y) = match self {
            Self::Top => (
                anchor.center_x() - size.width / 2,
                anchor.y - size.height - gap,
            ),
            Self::Bottom => (anchor.center_x() - size.width / 2, anchor.bottom() + gap),
            Self::Left => (
                anchor.x - size.width - gap,
                anchor.center_y() - size.height / 2,
            ),
            Self::Right => (anchor.right() + gap, anchor.center_y() - size.height / 2),
        };
        Rect::new(x, y, size.width, size.height)
    }
}
