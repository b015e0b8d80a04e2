//! Logic for interacting with the X server
use crate::{
    pure::geometry::{Margins, Point, Rect},
    Color, Result, Xid,
};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::trace;

pub mod atom;
pub mod event;
#[cfg(test)]
pub mod mock;
pub mod property;

pub use atom::Atom;
pub use event::ClientMessage;
pub use property::{Prop, WmHints, WmNormalHints};

/// The WM_CLASS given to every decoration frame window.
pub const FRAME_CLASS: &str = "trellis-decoration";

/// The 32 bit visual of a client with an alpha channel, along with the
/// colormap created for it. Frames of such clients share the client's visual so
/// that the client can be reparented into them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ArgbVisual {
    /// The visual id used by the client
    pub visual: u32,
    /// A colormap for `visual` owned by the frame
    pub colormap: Xid,
}

impl ArgbVisual {
    /// The depth of every window and pixmap created with this visual.
    pub const DEPTH: u8 = 32;

    /// The pixel value of a fully opaque color in this visual.
    pub fn pixel(&self, color: Color) -> u32 {
        0xff00_0000 | color.rgb_u32()
    }
}

/// A window type to be specified when creating a new window in the X server
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WinType {
    /// An override-redirect child of the root window that clients are reparented
    /// into. Uses the given 32 bit visual or the root visual if there is none.
    Frame(Option<ArgbVisual>),
    /// A plain child of the given window used to paint behind a client's content
    Background(Xid, Option<ArgbVisual>),
}

/// On screen configuration options for X clients
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ClientConfig {
    /// The border width in pixels
    BorderPx(u32),
    /// Absolute size and position on the screen as a [Rect]
    Position(Rect),
    /// Mark this window as stacking on top of its peer
    StackAbove(Xid),
    /// Mark this window as stacking above all other windows
    StackTop,
}

/// Attributes for an X11 client window
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClientAttr {
    /// Background color as an rgb hex value
    BackgroundColor(u32),
    /// Use the given pixmap as the window background
    BackgroundPixmap(Xid),
    /// Set the pre-defined client event mask
    ClientEventMask,
    /// Set the pre-defined event mask for decoration frames
    FrameEventMask,
    /// Stop receiving events for this window
    NoEventMask,
}

/// The two shapes of the X SHAPE extension that trellis sets.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// The outline of the window including its border
    Bounding,
    /// The region of the window that is drawn to
    Clip,
}

/// A handle on a running X11 connection that we can use for issuing X requests.
///
/// XConn is intended as an abstraction layer to allow for communication with the underlying
/// display system (assumed to be X) using whatever mechanism the implementer wishes. Everything
/// in trellis that needs the display goes through this trait so that the client registry and
/// decoration renderer can be driven against a mock in tests.
pub trait XConn {
    /// The ID of the window manager root window.
    fn root(&self) -> Xid;
    /// Flush any pending requests to the X server.
    fn flush(&self);
    /// Block until every pending request has been processed by the X server.
    fn sync(&self) -> Result<()>;

    /// Look up the [Xid] of a given [Atom] name. If it is not currently interned, intern it.
    fn intern_atom(&self, atom: &str) -> Result<Xid>;

    /// Look up the current dimensions and position of a given client window.
    fn client_geometry(&self, client: Xid) -> Result<Rect>;
    /// The depth of the root window, used for everything not created with an
    /// [ArgbVisual].
    fn root_depth(&self) -> u8;
    /// The visual id of a client if it is drawn with a 32 bit visual.
    fn argb_visual(&self, client: Xid) -> Result<Option<u32>>;
    /// Create a colormap for the given visual.
    fn create_colormap(&self, visual: u32) -> Result<Xid>;
    /// Release a colormap created through [XConn::create_colormap].
    fn free_colormap(&self, id: Xid) -> Result<()>;

    /// Create a new window of the given type.
    fn create_window(&self, ty: WinType, r: Rect) -> Result<Xid>;
    /// Destroy a window that was created through [XConn::create_window].
    fn destroy_window(&self, id: Xid) -> Result<()>;
    /// Map the given window to the screen with its current geometry, making it visible.
    fn map(&self, id: Xid) -> Result<()>;
    /// Unmap the given window from the screen, hiding it.
    fn unmap(&self, id: Xid) -> Result<()>;
    /// Reparent `id` into `parent` at the given position relative to the parent.
    fn reparent(&self, id: Xid, parent: Xid, p: Point) -> Result<()>;
    /// Set X input focus to be held by the given window.
    fn focus(&self, id: Xid) -> Result<()>;

    /// Look up a specific property on a given client window.
    fn get_prop(&self, id: Xid, prop_name: &str) -> Result<Option<Prop>>;
    /// Set a specific property on a given client window.
    fn set_prop(&self, id: Xid, name: &str, val: Prop) -> Result<()>;
    /// Delete a property for a given client window.
    fn delete_prop(&self, id: Xid, prop_name: &str) -> Result<()>;
    /// Set one or more [ClientAttr] for a given window.
    fn set_client_attributes(&self, id: Xid, attrs: &[ClientAttr]) -> Result<()>;
    /// Set the [ClientConfig] for a given window.
    fn set_client_config(&self, id: Xid, data: &[ClientConfig]) -> Result<()>;
    /// Send a [ClientMessage] to a given client.
    fn send_client_message(&self, msg: ClientMessage) -> Result<()>;
    /// Send a synthetic ConfigureNotify to a client describing its absolute geometry.
    fn send_configure_notify(&self, id: Xid, r: Rect, border: u32) -> Result<()>;

    /// Allocate an off-screen pixmap of the given depth on the same screen as `drawable`.
    fn create_pixmap(&self, drawable: Xid, w: u32, h: u32, depth: u8) -> Result<Xid>;
    /// Release a pixmap allocated through [XConn::create_pixmap].
    fn free_pixmap(&self, id: Xid) -> Result<()>;
    /// Fill the given rectangles of a drawable with a solid pixel value.
    fn fill_rects(&self, drawable: Xid, pixel: u32, rects: &[Rect]) -> Result<()>;
    /// Repaint the background of a window.
    fn clear_window(&self, id: Xid) -> Result<()>;
    /// Set the shape of a window to the union of `rects`, offset by `offset`.
    fn set_shape(&self, id: Xid, kind: ShapeKind, offset: Point, rects: &[Rect]) -> Result<()>;
    /// Remove any shape previously set on a window.
    fn reset_shape(&self, id: Xid, kind: ShapeKind) -> Result<()>;
}

/// Extended functionality for [XConn] impls covering the ICCCM and EWMH conventions
/// used by the client registry.
pub trait XConnExt: XConn + Sized {
    /// Request the title of a given client window following ICCCM/EWMH standards.
    fn window_title(&self, id: Xid) -> Result<String> {
        for atom in [Atom::NetWmName, Atom::WmName] {
            if let Some(Prop::UTF8String(mut strs)) = self.get_prop(id, atom.as_ref())? {
                if !strs.is_empty() {
                    return Ok(strs.remove(0));
                }
            }
        }

        Ok("".to_owned())
    }

    /// Request a window's PID via the _NET_WM_PID property.
    ///
    /// **NOTE**: Not all programs set this property.
    fn window_pid(&self, id: Xid) -> Option<u32> {
        match self.get_prop(id, Atom::NetWmPid.as_ref()) {
            Ok(Some(Prop::Cardinal(vals))) => vals.first().copied(),
            _ => None,
        }
    }

    /// Check to see if a given client window supports a particular protocol or not
    fn client_supports_protocol(&self, id: Xid, proto: Atom) -> Result<bool> {
        if let Some(Prop::Atom(protocols)) = self.get_prop(id, Atom::WmProtocols.as_ref())? {
            Ok(protocols.iter().any(|p| p == proto.as_ref()))
        } else {
            Ok(false)
        }
    }

    /// Send a `WM_PROTOCOLS` client message invoking the given protocol.
    fn send_protocol_message(&self, id: Xid, proto: Atom) -> Result<()> {
        let proto = self.intern_atom(proto.as_ref())?;
        let msg = ClientMessage::new(id, Atom::WmProtocols.as_ref(), [*proto, 0, 0, 0, 0]);

        self.send_client_message(msg)
    }

    /// The WM_HINTS of a client if it has set them.
    fn wm_hints(&self, id: Xid) -> Result<Option<WmHints>> {
        match self.get_prop(id, Atom::WmHints.as_ref())? {
            Some(Prop::WmHints(hints)) => Ok(Some(hints)),
            _ => Ok(None),
        }
    }

    /// The WM_NORMAL_HINTS of a client if it has set them.
    fn wm_normal_hints(&self, id: Xid) -> Result<Option<WmNormalHints>> {
        match self.get_prop(id, Atom::WmNormalHints.as_ref())? {
            Some(Prop::WmNormalHints(hints)) => Ok(Some(hints)),
            _ => Ok(None),
        }
    }

    /// Set or clear the urgency bit of a client's WM_HINTS, leaving the rest of the
    /// property intact. Clients without WM_HINTS are left alone.
    fn set_urgency_hint(&self, id: Xid, urgent: bool) -> Result<()> {
        let hints = match self.wm_hints(id)? {
            Some(hints) if hints.is_urgent() != urgent => hints,
            _ => return Ok(()),
        };

        trace!(%id, urgent, "updating urgency hint");
        self.set_prop(id, Atom::WmHints.as_ref(), Prop::WmHints(hints.with_urgency(urgent)))
    }

    /// Publish the extent of the decoration around a client as `_NET_FRAME_EXTENTS`.
    fn set_frame_extents(&self, id: Xid, m: Margins) -> Result<()> {
        let extents = m.as_frame_extents().to_vec();

        self.set_prop(id, Atom::NetFrameExtents.as_ref(), Prop::Cardinal(extents))
    }

    /// Set `_NET_ACTIVE_WINDOW` on the root window.
    fn set_active_window(&self, id: Option<Xid>) -> Result<()> {
        let id = id.unwrap_or_default();
        let root = self.root();

        self.set_prop(root, Atom::NetActiveWindow.as_ref(), Prop::Window(vec![id]))
    }

    /// Append a client to `_NET_CLIENT_LIST` on the root window.
    fn client_list_add(&self, id: Xid) -> Result<()> {
        let mut ids = self.client_list()?;
        if !ids.contains(&id) {
            ids.push(id);
        }

        self.set_prop(self.root(), Atom::NetClientList.as_ref(), Prop::Window(ids))
    }

    /// Remove a client from `_NET_CLIENT_LIST` on the root window.
    fn client_list_remove(&self, id: Xid) -> Result<()> {
        let mut ids = self.client_list()?;
        ids.retain(|&c| c != id);

        self.set_prop(self.root(), Atom::NetClientList.as_ref(), Prop::Window(ids))
    }

    /// The current contents of `_NET_CLIENT_LIST`.
    fn client_list(&self) -> Result<Vec<Xid>> {
        match self.get_prop(self.root(), Atom::NetClientList.as_ref())? {
            Some(Prop::Window(ids)) => Ok(ids),
            _ => Ok(Vec::new()),
        }
    }

    /// Publish the `_NET_WM_STATE` of a client.
    fn set_net_wm_state(&self, id: Xid, fullscreen: bool, demands_attention: bool) -> Result<()> {
        let mut atoms = Vec::new();
        if fullscreen {
            atoms.push(Atom::NetWmStateFullscreen.as_ref().to_owned());
        }
        if demands_attention {
            atoms.push(Atom::NetWmStateDemandsAttention.as_ref().to_owned());
        }

        trace!(%id, ?atoms, "setting _NET_WM_STATE");
        self.set_prop(id, Atom::NetWmState.as_ref(), Prop::Atom(atoms))
    }

    /// Restack the given windows in, each one above the last.
    fn restack<'a, I>(&self, mut ids: I) -> Result<()>
    where
        I: Iterator<Item = &'a Xid>,
    {
        let mut previous = match ids.next() {
            Some(id) => *id,
            None => return Ok(()), // nothing to stack
        };

        for &id in ids {
            self.set_client_config(id, &[ClientConfig::StackAbove(previous)])?;
            previous = id;
        }

        Ok(())
    }
}

// Auto impl XConnExt for all XConn impls
impl<T> XConnExt for T where T: XConn {}
