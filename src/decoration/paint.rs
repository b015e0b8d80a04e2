//! Side effect free computation of what gets drawn into a decoration frame.
//!
//! All rectangles here are in frame coordinates: (0, 0) is the top left corner
//! of the outer rectangle.
use crate::{pure::geometry::Rect, theme::DecorationScheme, Color};

/// A solid fill of one or more rectangles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fill {
    /// The color to fill with
    pub color: Color,
    /// The rectangles to fill
    pub rects: Vec<Rect>,
}

/// The fills making up a decoration frame, in the order they must be drawn.
///
/// `w` and `h` are the size of the outer rectangle, `inner` is the content area
/// and `actual` the part of it covered by the client window.
pub fn frame_fills(s: &DecorationScheme, w: i32, h: i32, inner: Rect, actual: Rect) -> Vec<Fill> {
    let mut fills = vec![Fill {
        color: s.border_color,
        rects: vec![Rect::new(0, 0, w, h)],
    }];

    let iw = s.inner_width;
    if iw > 0 {
        let i = inner;
        fills.push(Fill {
            color: s.inner_color,
            rects: vec![
                Rect::new(i.x - iw, i.y - iw, i.w + 2 * iw, iw), // top
                Rect::new(i.x - iw, i.y, iw, i.h),               // left
                Rect::new(i.x + i.w, i.y, iw, i.h),              // right
                Rect::new(i.x - iw, i.y + i.h, i.w + 2 * iw, iw), // bottom
            ],
        });
    }

    let ow = s.outer_width.min((h + 1) / 2);
    if ow > 0 {
        fills.push(Fill {
            color: s.outer_color,
            rects: vec![
                Rect::new(0, 0, w, ow),                  // top
                Rect::new(0, ow, ow, h - 2 * ow),        // left
                Rect::new(w - ow, ow, ow, h - 2 * ow),   // right
                Rect::new(0, h - ow, w, ow),             // bottom
            ],
        });
    }

    let uncovered = uncovered(inner, actual);
    if !uncovered.is_empty() {
        fills.push(Fill {
            color: s.background_color,
            rects: uncovered,
        });
    }

    for f in fills.iter_mut() {
        f.rects = f
            .rects
            .iter()
            .map(|r| r.clamped())
            .filter(|r| r.w > 0 && r.h > 0)
            .collect();
    }
    fills.retain(|f| !f.rects.is_empty());

    fills
}

// The parts of `inner` not covered by `actual` as up to four bands.
fn uncovered(inner: Rect, actual: Rect) -> Vec<Rect> {
    let i = inner.clamped();
    let x1 = actual.x.max(i.x);
    let y1 = actual.y.max(i.y);
    let x2 = (actual.x + actual.w).min(i.x + i.w);
    let y2 = (actual.y + actual.h).min(i.y + i.h);

    if x1 >= x2 || y1 >= y2 {
        return vec![i];
    }

    let bands = [
        Rect::new(i.x, i.y, i.w, y1 - i.y),             // above
        Rect::new(i.x, y2, i.w, i.y + i.h - y2),        // below
        Rect::new(i.x, y1, x1 - i.x, y2 - y1),          // left
        Rect::new(x2, y1, i.x + i.w - x2, y2 - y1),     // right
    ];

    bands.into_iter().filter(|r| r.w > 0 && r.h > 0).collect()
}

/// The shape of a `w` x `h` rectangle with corners rounded to radius `r`, as a
/// union of rectangles anchored at (0, 0).
///
/// A radius of zero or less gives the full rectangle. The radius is capped at
/// half of the shorter side.
/// ```
/// # use trellis::{decoration::paint::rounded_rects, Rect};
/// assert_eq!(rounded_rects(10, 20, 0), vec![Rect::new(0, 0, 10, 20)]);
/// ```
pub fn rounded_rects(w: i32, h: i32, r: i32) -> Vec<Rect> {
    if w <= 0 || h <= 0 {
        return vec![];
    }

    let r = r.min(w / 2).min(h / 2);
    if r <= 0 {
        return vec![Rect::new(0, 0, w, h)];
    }

    let rf = r as f64;
    let mut rects = Vec::with_capacity(2 * r as usize + 1);

    for row in 0..r {
        let dy = rf - row as f64 - 0.5;
        let inset = (rf - (rf * rf - dy * dy).sqrt()).round() as i32;
        let span = w - 2 * inset;

        rects.push(Rect::new(inset, row, span, 1));
        rects.push(Rect::new(inset, h - 1 - row, span, 1));
    }

    if h - 2 * r > 0 {
        rects.push(Rect::new(0, r, w, h - 2 * r));
    }

    rects
}
