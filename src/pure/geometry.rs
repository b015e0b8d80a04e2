//! Geometry primitives
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An x,y coordinate pair
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Point {
    /// An absolute x coordinate relative to the root window
    pub x: i32,
    /// An absolute y coordinate relative to the root window
    pub y: i32,
}

impl Point {
    /// Create a new Point.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from(raw: (i32, i32)) -> Self {
        let (x, y) = raw;

        Self { x, y }
    }
}

// A Rect converts to its top left corner
impl From<Rect> for Point {
    fn from(r: Rect) -> Self {
        let Rect { x, y, .. } = r;

        Self { x, y }
    }
}

/// An X window / screen position: top left corner + extent
///
/// Unlike the rectangles handed to the X server, a [Rect] is allowed to hold
/// negative values: converting an outline to its inner content area can push
/// the width or height below zero when the padding of a scheme exceeds the
/// space available. Use [Rect::clamped] before handing such a value to
/// anything that draws.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Default, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Rect {
    /// The x-coordinate of the top left corner of this rect
    pub x: i32,
    /// The y-coordinate of the top left corner of this rect
    pub y: i32,
    /// The width of this rect
    pub w: i32,
    /// The height of this rect
    pub h: i32,
}

impl Rect {
    /// Create a new Rect.
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Rect {
        Rect { x, y, w, h }
    }

    /// The midpoint of this rectangle.
    ///
    /// Odd side lengths will lead to a truncated point towards the top left corner
    /// in order to maintain integer coordinates.
    /// ```
    /// # use trellis::pure::geometry::{Rect, Point};
    /// let r = Rect::new(0, 0, 100, 200);
    ///
    /// assert_eq!(r.midpoint(), Point { x: 50, y: 100 });
    /// ```
    pub fn midpoint(&self) -> Point {
        Point {
            x: self.x + self.w / 2,
            y: self.y + self.h / 2,
        }
    }

    /// The same rectangle with negative width and height raised to zero.
    /// ```
    /// # use trellis::pure::geometry::Rect;
    /// let r = Rect::new(-5, 10, -20, 30);
    ///
    /// assert_eq!(r.clamped(), Rect::new(-5, 10, 0, 30));
    /// ```
    pub fn clamped(&self) -> Self {
        Self {
            w: self.w.max(0),
            h: self.h.max(0),
            ..*self
        }
    }

    /// Express this rect in the coordinate space of `origin`, i.e. with its
    /// top left corner given relative to the top left corner of `origin`.
    /// ```
    /// # use trellis::pure::geometry::Rect;
    /// let outer = Rect::new(100, 50, 400, 300);
    /// let inner = Rect::new(103, 55, 390, 290);
    ///
    /// assert_eq!(inner.relative_to(&outer), Rect::new(3, 5, 390, 290));
    /// ```
    pub fn relative_to(&self, origin: &Rect) -> Self {
        Self {
            x: self.x - origin.x,
            y: self.y - origin.y,
            ..*self
        }
    }

    /// The margins between this rect and an enclosed `inner` rect on each side.
    ///
    /// Sides where `inner` pokes out of `self` produce negative margins.
    /// ```
    /// # use trellis::pure::geometry::{Margins, Rect};
    /// let outer = Rect::new(0, 0, 100, 100);
    /// let inner = Rect::new(2, 10, 94, 80);
    ///
    /// assert_eq!(
    ///     outer.margins_around(&inner),
    ///     Margins { left: 2, right: 4, top: 10, bottom: 10 }
    /// );
    /// ```
    pub fn margins_around(&self, inner: &Rect) -> Margins {
        let left = inner.x - self.x;
        let top = inner.y - self.y;

        Margins {
            left,
            right: self.w - inner.w - left,
            top,
            bottom: self.h - inner.h - top,
        }
    }

    /// Check whether this Rect contains `other` as a sub-Rect
    pub fn contains(&self, other: &Rect) -> bool {
        match other {
            Rect { x, .. } if *x < self.x => false,
            Rect { x, w, .. } if (*x + *w) > (self.x + self.w) => false,
            Rect { y, .. } if *y < self.y => false,
            Rect { y, h, .. } if (*y + *h) > (self.y + self.h) => false,
            _ => true,
        }
    }
}

/// Space reserved on each side of a rectangle.
///
/// Used for reporting the extent of a decoration frame around its client.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Default, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Margins {
    /// Space to the left
    pub left: i32,
    /// Space to the right
    pub right: i32,
    /// Space above
    pub top: i32,
    /// Space below
    pub bottom: i32,
}

impl Margins {
    /// The margins in the order used by `_NET_FRAME_EXTENTS`: left, right, top, bottom.
    ///
    /// Negative margins are reported as zero.
    pub fn as_frame_extents(&self) -> [u32; 4] {
        [self.left, self.right, self.top, self.bottom].map(|m| m.max(0) as u32)
    }
}
