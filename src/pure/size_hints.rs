//! Resolution of ICCCM size hints against a proposed window size.
//!
//! The algorithm follows ICCCM 4.1.2.3 in the same way as dwm and its
//! descendants, including the deferred base size subtraction when the base
//! size equals the minimum size and the +0.5 rounding of aspect corrections.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::pure::geometry::Rect;

/// The absolute minimum width of a managed window.
pub const WINDOW_MIN_WIDTH: i32 = 32;
/// The absolute minimum height of a managed window.
pub const WINDOW_MIN_HEIGHT: i32 = 32;

/// Cached sizing constraints for a client, derived from its WM_NORMAL_HINTS.
///
/// All values of zero mean "not set". Aspect ratios are stored as the client
/// gave them except that `min_aspect` is inverted (height / width) so that both
/// comparisons below are a simple "exceeds" check.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct SizeHints {
    /// Base width
    pub base_w: i32,
    /// Base height
    pub base_h: i32,
    /// Width increment
    pub inc_w: i32,
    /// Height increment
    pub inc_h: i32,
    /// Minimum width
    pub min_w: i32,
    /// Minimum height
    pub min_h: i32,
    /// Maximum width (0 for unbounded)
    pub max_w: i32,
    /// Maximum height (0 for unbounded)
    pub max_h: i32,
    /// Minimum aspect ratio, stored inverted as height / width
    pub min_aspect: f32,
    /// Maximum aspect ratio as width / height
    pub max_aspect: f32,
}

impl SizeHints {
    /// Apply these hints to a proposed width and height.
    ///
    /// When `enabled` is false only the absolute window minimum is enforced.
    pub fn constrain(&self, w: i32, h: i32, enabled: bool) -> (i32, i32) {
        let mut w = w.max(1).max(WINDOW_MIN_WIDTH);
        let mut h = h.max(1).max(WINDOW_MIN_HEIGHT);

        if !enabled {
            return (w, h);
        }

        // see the last two sentences of ICCCM 4.1.2.3
        let base_is_min = self.base_w == self.min_w && self.base_h == self.min_h;
        if !base_is_min {
            w -= self.base_w;
            h -= self.base_h;
        }

        if self.min_aspect > 0.0 && self.max_aspect > 0.0 {
            if self.max_aspect < w as f32 / h as f32 {
                w = (h as f32 * self.max_aspect + 0.5) as i32;
            } else if self.min_aspect < h as f32 / w as f32 {
                h = (w as f32 * self.min_aspect + 0.5) as i32;
            }
        }

        // increment calculation requires this
        if base_is_min {
            w -= self.base_w;
            h -= self.base_h;
        }

        if self.inc_w > 0 {
            w -= w % self.inc_w;
        }
        if self.inc_h > 0 {
            h -= h % self.inc_h;
        }

        w = (w + self.base_w).max(self.min_w);
        h = (h + self.base_h).max(self.min_h);

        if self.max_w > 0 {
            w = w.min(self.max_w);
        }
        if self.max_h > 0 {
            h = h.min(self.max_h);
        }

        (w, h)
    }

    /// Resolve a proposed geometry, returning the adjusted width and height along
    /// with whether the result differs from the geometry last applied to the client.
    ///
    /// `last_size` is the last applied rectangle including a border of
    /// `last_border_width` on each side.
    pub fn resolve(
        &self,
        proposed: Rect,
        enabled: bool,
        last_size: &Rect,
        last_border_width: i32,
    ) -> (i32, i32, bool) {
        let (w, h) = self.constrain(proposed.w, proposed.h, enabled);
        let bw = last_border_width;

        let changed = proposed.x != last_size.x
            || proposed.y != last_size.y
            || w != last_size.w - 2 * bw
            || h != last_size.h - 2 * bw;

        (w, h, changed)
    }
}
