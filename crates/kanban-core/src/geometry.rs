#![forbid(unsafe_code)]

//! Geometric primitives for hit testing and collision detection.
//!
//! Coordinates are unsigned layout units (pixels for a pointer surface, cells
//! for a terminal), origin at top-left. All arithmetic saturates, so a
//! rectangle dragged past the origin clamps instead of wrapping.
//!
//! Centers are exposed in *doubled* coordinates ([`Rect::center2`],
//! [`Position::doubled`]) so that comparisons between odd-sized rectangles
//! stay exact without floating point.

/// A point in layout space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    /// Horizontal coordinate.
    pub x: u16,
    /// Vertical coordinate.
    pub y: u16,
}

impl Position {
    /// Create a new position.
    #[inline]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Signed offset from `origin` to `self` as `(dx, dy)`.
    #[inline]
    pub const fn delta_from(&self, origin: Position) -> (i32, i32) {
        (
            self.x as i32 - origin.x as i32,
            self.y as i32 - origin.y as i32,
        )
    }

    /// Squared Euclidean distance to `other`.
    #[inline]
    pub const fn distance_sq(&self, other: Position) -> u64 {
        let (dx, dy) = self.delta_from(other);
        (dx as i64 * dx as i64 + dy as i64 * dy as i64) as u64
    }

    /// Manhattan distance to `other`.
    #[inline]
    pub const fn manhattan_distance(&self, other: Position) -> u32 {
        let (dx, dy) = self.delta_from(other);
        dx.unsigned_abs() + dy.unsigned_abs()
    }

    /// The position in doubled coordinates, comparable with [`Rect::center2`].
    #[inline]
    pub const fn doubled(&self) -> (u32, u32) {
        (self.x as u32 * 2, self.y as u32 * 2)
    }
}

impl From<(u16, u16)> for Position {
    fn from((x, y): (u16, u16)) -> Self {
        Self::new(x, y)
    }
}

/// An axis-aligned rectangle used for droppable regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: u16,
    /// Top edge (inclusive).
    pub y: u16,
    /// Width in layout units.
    pub width: u16,
    /// Height in layout units.
    pub height: u16,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    /// Area in square layout units.
    #[inline]
    pub const fn area(&self) -> u32 {
        self.width as u32 * self.height as u32
    }

    /// Check if the rectangle has zero area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Top-left corner.
    #[inline]
    pub const fn origin(&self) -> Position {
        Position::new(self.x, self.y)
    }

    /// Check if a point is inside the rectangle (right/bottom exclusive).
    #[inline]
    pub const fn contains(&self, pos: Position) -> bool {
        pos.x >= self.x && pos.x < self.right() && pos.y >= self.y && pos.y < self.bottom()
    }

    /// Check whether two rectangles share any area.
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.intersection_opt(other).is_some()
    }

    /// Compute the intersection with another rectangle, `None` if no overlap.
    #[inline]
    pub fn intersection_opt(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if x < right && y < bottom {
            Some(Rect::new(x, y, right - x, bottom - y))
        } else {
            None
        }
    }

    /// Center in doubled coordinates: `(2x + w, 2y + h)`.
    #[inline]
    pub const fn center2(&self) -> (u32, u32) {
        (
            self.x as u32 * 2 + self.width as u32,
            self.y as u32 * 2 + self.height as u32,
        )
    }

    /// Squared distance (in doubled coordinates) from the center to `pos`.
    ///
    /// Only meaningful for ordering; divide by 4 for layout units squared.
    #[inline]
    pub const fn center_distance_sq(&self, pos: Position) -> u64 {
        let (cx, cy) = self.center2();
        let (px, py) = pos.doubled();
        let dx = cx as i64 - px as i64;
        let dy = cy as i64 - py as i64;
        (dx * dx + dy * dy) as u64
    }

    /// Whether `y` lies strictly below the vertical midpoint.
    #[inline]
    pub const fn is_below_midpoint(&self, y: u16) -> bool {
        (y as u32) * 2 > self.y as u32 * 2 + self.height as u32
    }

    /// Translate by a signed delta, saturating at the coordinate bounds.
    #[must_use]
    pub fn translated(&self, dx: i32, dy: i32) -> Rect {
        let clamp = |v: i32| v.clamp(0, u16::MAX as i32) as u16;
        Rect::new(
            clamp(self.x as i32 + dx),
            clamp(self.y as i32 + dy),
            self.width,
            self.height,
        )
    }
}
