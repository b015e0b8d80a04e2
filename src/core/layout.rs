//! The seam between the client registry and the tag / layout engine.
//!
//! Trellis does not decide where tiled clients go: a [TagTree] tracks which
//! clients are on which tag, which tags are visible and where each client on
//! a visible tag should be drawn.
use crate::{pure::geometry::Rect, theme::SchemeKind, Xid};

/// The position of a single tiled client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    /// The client
    pub id: Xid,
    /// The outline the client's frame should fill
    pub rect: Rect,
    /// The scheme kind to decorate the client with
    pub kind: SchemeKind,
}

impl Tile {
    /// A tile decorated with the tiling scheme.
    pub fn new(id: Xid, rect: Rect) -> Self {
        Self {
            id,
            rect,
            kind: SchemeKind::Tiling,
        }
    }
}

/// The result of laying out a visible tag.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Arrangement {
    /// The monitor the tag is shown on
    pub monitor: Rect,
    /// Tiled clients
    pub tiles: Vec<Tile>,
    /// Floating clients, positioned from their floating size
    pub floating: Vec<Xid>,
}

/// Tag membership, visibility and layout of clients.
pub trait TagTree {
    /// The tag new clients are placed on by default.
    fn focused_tag(&self) -> String;

    /// Bring a tag into focus.
    fn focus_tag(&mut self, tag: &str);

    /// Whether the tag is shown on a monitor.
    fn is_visible(&self, tag: &str) -> bool;

    /// Every tag currently shown on a monitor.
    fn visible_tags(&self) -> Vec<String>;

    /// Add a client to the layout of a tag.
    fn insert(&mut self, tag: &str, id: Xid);

    /// Remove a client from the layout of a tag.
    fn remove(&mut self, tag: &str, id: Xid);

    /// Lay out a tag. `None` if the tag is not visible.
    fn arrange(&self, tag: &str) -> Option<Arrangement>;

    /// The client focused within the layout of a tag.
    fn focused_client(&self, tag: &str) -> Option<Xid>;

    /// Whether the tag shows a single client at a time, in which case the
    /// focused client is always raised.
    fn is_max_layout(&self, _tag: &str) -> bool {
        false
    }
}
