//! Decoration frames and the resize / repaint protocol run for a client every
//! time its geometry or scheme changes.
//!
//! Each managed client is reparented into a frame window (`decwin`) that has a
//! background window (`bgwin`) as a child sitting directly behind the client.
//! The frame is painted into an off-screen pixmap which is then set as the
//! background of `decwin`:
//!
//! ```text
//!   outer (decwin, absolute)
//!   +--------------------------------------+
//!   |  border / outer / inner strips       |
//!   |   +------------------------------+   |
//!   |   | inner                        |   |
//!   |   |   +----------------------+   |   |
//!   |   |   | actual (client,      |   |   |
//!   |   |   | relative to outer)   |   |   |
//!   |   |   +----------------------+   |   |
//!   |   +------------------------------+   |
//!   +--------------------------------------+
//! ```
use crate::{
    core::{Client, ClientFlags, Config},
    pure::geometry::{Point, Rect},
    theme::{DecorationScheme, Mood, SchemeKind, Theme},
    x::{
        ArgbVisual, Atom, ClientAttr, ClientConfig, Prop, ShapeKind, WinType, XConn, XConnExt,
        FRAME_CLASS,
    },
    Color, Result, Xid,
};
use tracing::{debug, trace, warn};

pub mod paint;

/// Which rectangle the last resize request for a decoration was expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RectKind {
    /// The content area
    Inner,
    /// The full frame
    Outer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pixmap {
    id: Xid,
    w: i32,
    h: i32,
}

/// The decoration frame owned by a single [Client].
#[derive(Debug, Clone, PartialEq)]
pub struct Decoration {
    pub(crate) decwin: Xid,
    pub(crate) bgwin: Xid,
    pub(crate) last_outer: Rect,
    pub(crate) last_inner: Rect,
    pub(crate) last_actual: Rect,
    pub(crate) last_request: Option<RectKind>,
    pub(crate) last_scheme: DecorationScheme,
    pub(crate) kind: SchemeKind,
    pub(crate) mapped: bool,
    pub(crate) argb: Option<ArgbVisual>,
    pub(crate) depth: u8,
    pixmap: Option<Pixmap>,
    shaped: bool,
}

impl Decoration {
    pub(crate) fn new(decwin: Xid, bgwin: Xid) -> Self {
        Self {
            decwin,
            bgwin,
            argb: None,
            depth: 24,
            last_outer: Rect::default(),
            last_inner: Rect::default(),
            last_actual: Rect::default(),
            last_request: None,
            last_scheme: DecorationScheme::default(),
            kind: SchemeKind::Floating,
            mapped: false,
            pixmap: None,
            shaped: false,
        }
    }

    /// The frame window the client is reparented into.
    pub fn frame(&self) -> Xid {
        self.decwin
    }

    /// The window painted behind the client.
    pub fn background(&self) -> Xid {
        self.bgwin
    }

    /// The last outer rectangle in root coordinates.
    pub fn last_outer_rect(&self) -> Rect {
        self.last_outer
    }

    /// The last inner rectangle in root coordinates.
    pub fn last_inner_rect(&self) -> Rect {
        self.last_inner
    }

    /// The area covered by the client window, relative to the outer rectangle.
    pub fn last_actual_rect(&self) -> Rect {
        self.last_actual
    }

    /// Which rectangle was authoritative for the last resize, if there has been one.
    pub fn last_request(&self) -> Option<RectKind> {
        self.last_request
    }

    /// The scheme the frame was last drawn with.
    pub fn last_scheme(&self) -> &DecorationScheme {
        &self.last_scheme
    }

    /// The kind of scheme last used for this frame.
    pub fn kind(&self) -> SchemeKind {
        self.kind
    }

    /// The 32 bit visual the frame shares with its client, if any.
    pub fn argb_visual(&self) -> Option<ArgbVisual> {
        self.argb
    }

    /// The depth of the frame window and its pixmap.
    pub fn depth(&self) -> u8 {
        self.depth
    }

    // colors are opaque pixels in the visual of the frame
    fn pixel(&self, color: Color) -> u32 {
        match self.argb {
            Some(v) => v.pixel(color),
            None => color.rgb_u32(),
        }
    }
}

/// The shared state needed to pick a scheme for a client.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    /// Source of every scheme
    pub theme: &'a Theme,
    /// Renderer settings
    pub config: &'a Config,
    /// The currently focused client
    pub focused: Option<Xid>,
}

impl<'a> Context<'a> {
    /// The scheme of the given kind matching the current state of `client`.
    pub fn scheme_for(&self, client: &Client, kind: SchemeKind) -> DecorationScheme {
        let mood = Mood::select(client.is_urgent(), self.focused == Some(client.id));

        *self.theme.scheme(kind, mood)
    }
}

/// Create the frame and background windows for a client and reparent the
/// client into the frame.
///
/// Clients drawn with a 32 bit visual get frames created with the same visual
/// and a colormap of their own. Anything created before a failing request is
/// released again before the error is returned.
///
/// The returned decoration is seeded with `float_size` as its inner rectangle
/// so that a scheme change before the first layout pass has something to apply.
pub fn setup_frame<X: XConn>(id: Xid, float_size: Rect, x: &X) -> Result<Decoration> {
    let scheme = DecorationScheme::default();
    let outer = scheme.inner_rect_to_outline(float_size);

    let argb = match x.argb_visual(id) {
        Ok(Some(visual)) => Some(ArgbVisual {
            visual,
            colormap: x.create_colormap(visual)?,
        }),
        Ok(None) => None,
        Err(e) => {
            warn!(%id, %e, "unable to read client visual: using the root visual");
            None
        }
    };

    let decwin = match x.create_window(WinType::Frame(argb), outer) {
        Ok(w) => w,
        Err(e) => {
            if let Some(v) = argb {
                release(x.free_colormap(v.colormap), id);
            }
            return Err(e);
        }
    };

    let rel = float_size.relative_to(&outer);
    let bgwin = match x.create_window(WinType::Background(decwin, argb), rel) {
        Ok(w) => w,
        Err(e) => {
            release(x.destroy_window(decwin), id);
            if let Some(v) = argb {
                release(x.free_colormap(v.colormap), id);
            }
            return Err(e);
        }
    };
    debug!(%id, %decwin, %bgwin, argb = argb.is_some(), "created decoration windows");

    let mut dec = Decoration::new(decwin, bgwin);
    dec.argb = argb;
    dec.depth = if argb.is_some() {
        ArgbVisual::DEPTH
    } else {
        x.root_depth()
    };
    dec.last_request = Some(RectKind::Inner);
    dec.last_inner = float_size;
    dec.last_outer = outer;
    dec.last_actual = rel;
    dec.last_scheme = scheme;

    if let Err(e) = attach_frame(id, &dec, x) {
        release(free(&mut dec, x), id);
        return Err(e);
    }

    Ok(dec)
}

fn attach_frame<X: XConn>(id: Xid, dec: &Decoration, x: &X) -> Result<()> {
    x.map(dec.bgwin)?;
    x.set_client_attributes(dec.decwin, &[ClientAttr::FrameEventMask])?;
    x.set_prop(
        dec.decwin,
        Atom::WmClass.as_ref(),
        Prop::UTF8String(vec![FRAME_CLASS.to_owned(), FRAME_CLASS.to_owned()]),
    )?;

    x.reparent(id, dec.decwin, Point::from(dec.last_actual))
}

fn release(res: Result<()>, id: Xid) {
    if let Err(e) = res {
        warn!(%id, %e, "unable to release decoration resource");
    }
}

/// Release the pixmap, windows and colormap held by a decoration.
pub fn free<X: XConn>(dec: &mut Decoration, x: &X) -> Result<()> {
    if let Some(p) = dec.pixmap.take() {
        x.free_pixmap(p.id)?;
    }

    x.destroy_window(dec.bgwin)?;
    x.destroy_window(dec.decwin)?;

    match dec.argb.take() {
        Some(v) => x.free_colormap(v.colormap),
        None => Ok(()),
    }
}

/// Place a client so that its frame fills `outline`.
///
/// The content size is negotiated against the client's size hints. A tight
/// scheme shrinks the frame around the result; otherwise the content is
/// centered in the inner rectangle once the slack on an axis reaches
/// [Config::pseudotile_center_threshold].
///
/// While the client is being dragged only the frame is moved and repainted
/// unless [Config::update_dragged_clients] is set.
pub fn resize_outline<X: XConn>(
    client: &mut Client,
    outline: Rect,
    scheme: DecorationScheme,
    config: &Config,
    x: &X,
) -> Result<()> {
    let id = client.id;
    let tile = scheme.outline_to_inner_rect(outline);
    let mut outline = outline;

    // last_size is relative to the frame so the proposal has to be as well
    let enabled = client.flags.contains(ClientFlags::SIZE_HINTS);
    let proposed = tile.relative_to(&outline);
    let (w, h, changed) =
        client
            .hints
            .resolve(proposed, enabled, &client.last_size, client.last_border_width);
    let mut inner = Rect::new(tile.x, tile.y, w, h);

    if scheme.tight_decoration {
        outline = scheme.inner_rect_to_outline(inner);
    } else {
        let threshold = config.pseudotile_center_threshold;
        let dx = tile.w / 2 - w / 2;
        let dy = tile.h / 2 - h / 2;
        if dx >= threshold {
            inner.x += dx;
        }
        if dy >= threshold {
            inner.y += dy;
        }
    }

    let rel = inner.relative_to(&outline);
    let live = !client.is_dragged() || config.update_dragged_clients;
    trace!(%id, ?outline, ?inner, changed, live, "resizing decorated client");

    let dec = &mut client.dec;
    let size_changed = outline.w != dec.last_outer.w || outline.h != dec.last_outer.h;
    dec.last_inner = inner;
    dec.last_outer = outline;
    dec.last_request = Some(RectKind::Outer);
    dec.last_scheme = scheme;
    if live {
        dec.last_actual = rel;
    }
    client.last_size = rel;
    client.last_border_width = 0;

    redraw(client, config, x)?;

    let dec = &client.dec;
    if let Some(p) = dec.pixmap {
        x.set_client_attributes(dec.decwin, &[ClientAttr::BackgroundPixmap(p.id)])?;
        if !size_changed {
            // the background is only refreshed by the server when the size changes
            x.clear_window(dec.decwin)?;
        }
    }

    if live {
        x.set_client_config(id, &[ClientConfig::BorderPx(0), ClientConfig::Position(rel)])?;
        x.set_client_config(dec.bgwin, &[ClientConfig::Position(rel)])?;
    }

    x.set_client_config(dec.decwin, &[ClientConfig::Position(outline)])?;
    x.set_frame_extents(id, outline.margins_around(&inner))?;

    if live {
        x.send_configure_notify(id, inner, 0)?;
    }

    x.sync()
}

/// Place a client so that its content area is `inner`.
pub fn resize_inner<X: XConn>(
    client: &mut Client,
    inner: Rect,
    scheme: DecorationScheme,
    config: &Config,
    x: &X,
) -> Result<()> {
    resize_outline(client, scheme.inner_rect_to_outline(inner), scheme, config, x)?;
    client.dec.last_request = Some(RectKind::Inner);

    Ok(())
}

/// Re-apply the last requested rectangle of a client under a new scheme.
///
/// Does nothing if the client has never been given a rectangle.
pub fn change_scheme<X: XConn>(
    client: &mut Client,
    scheme: DecorationScheme,
    config: &Config,
    x: &X,
) -> Result<()> {
    match client.dec.last_request {
        None => Ok(()),
        Some(RectKind::Inner) => {
            let r = client.dec.last_inner;
            resize_inner(client, r, scheme, config, x)
        }
        Some(RectKind::Outer) => {
            let r = client.dec.last_outer;
            resize_outline(client, r, scheme, config, x)
        }
    }
}

/// Place a tiled client in the tile it was assigned by the layout.
///
/// Fullscreen clients cover `monitor` instead. Pseudotiled clients keep their
/// floating size, capped to the tile and centered in it.
pub fn resize_tiling<X: XConn>(
    client: &mut Client,
    tile: Rect,
    kind: SchemeKind,
    monitor: Rect,
    ctx: &Context<'_>,
    x: &X,
) -> Result<()> {
    if client.is_fullscreen() {
        return resize_fullscreen(client, monitor, ctx, x);
    }

    client.dec.kind = kind;
    let scheme = ctx.scheme_for(client, kind);

    if !client.is_pseudotile() {
        return resize_outline(client, tile, scheme, ctx.config, x);
    }

    let size = scheme.inner_rect_to_outline(client.float_size);
    let w = size.w.min(tile.w);
    let h = size.h.min(tile.h);
    let r = Rect::new(tile.x + tile.w / 2 - w / 2, tile.y + tile.h / 2 - h / 2, w, h);

    resize_outline(client, r, scheme, ctx.config, x)
}

/// Place a floating client at its floating position within `monitor`.
///
/// The position is clamped so that at least [Config::monitor_float_threshold]
/// pixels of the client stay on the monitor.
pub fn resize_floating<X: XConn>(
    client: &mut Client,
    monitor: Rect,
    ctx: &Context<'_>,
    x: &X,
) -> Result<()> {
    if client.is_fullscreen() {
        return resize_fullscreen(client, monitor, ctx, x);
    }

    client.dec.kind = SchemeKind::Floating;
    let scheme = ctx.scheme_for(client, SchemeKind::Floating);
    let space = ctx.config.monitor_float_threshold;

    let mut r = client.float_size;
    r.x += monitor.x;
    r.y += monitor.y;
    r.x = r.x.max(monitor.x + space - r.w).min(monitor.x + monitor.w - space);
    r.y = r.y.max(monitor.y + space - r.h).min(monitor.y + monitor.h - space);

    resize_inner(client, r, scheme, ctx.config, x)
}

/// Cover `monitor` with the fullscreen scheme.
pub fn resize_fullscreen<X: XConn>(
    client: &mut Client,
    monitor: Rect,
    ctx: &Context<'_>,
    x: &X,
) -> Result<()> {
    client.dec.kind = SchemeKind::Fullscreen;
    let scheme = ctx.scheme_for(client, SchemeKind::Fullscreen);

    resize_outline(client, monitor, scheme, ctx.config, x)
}

/// Repaint the frame pixmap of a client from its cached geometry and scheme,
/// then update the rounded corner shapes.
///
/// The pixmap is only reallocated when the outer size has changed. Failing to
/// allocate one skips the repaint and leaves everything else untouched.
pub fn redraw<X: XConn>(client: &mut Client, config: &Config, x: &X) -> Result<()> {
    let id = client.id;
    let dec = &mut client.dec;
    let outer = dec.last_outer.clamped();

    if outer.w == 0 || outer.h == 0 {
        trace!(%id, ?outer, "empty decoration: nothing to draw");
        return Ok(());
    }

    let pixmap = match dec.pixmap {
        Some(p) if p.w == outer.w && p.h == outer.h => p,
        stale => {
            if let Some(p) = stale {
                x.free_pixmap(p.id)?;
                dec.pixmap = None;
            }

            match x.create_pixmap(dec.decwin, outer.w as u32, outer.h as u32, dec.depth) {
                Ok(pid) => {
                    let p = Pixmap {
                        id: pid,
                        w: outer.w,
                        h: outer.h,
                    };
                    dec.pixmap = Some(p);
                    p
                }
                Err(e) => {
                    warn!(%id, %e, "unable to allocate decoration pixmap: skipping repaint");
                    return Ok(());
                }
            }
        }
    };

    let inner = dec.last_inner.relative_to(&dec.last_outer);
    let fills = paint::frame_fills(&dec.last_scheme, outer.w, outer.h, inner, dec.last_actual);
    for fill in fills.iter() {
        x.fill_rects(pixmap.id, dec.pixel(fill.color), &fill.rects)?;
    }

    apply_shape(id, dec, config.window_radius, x)
}

fn apply_shape<X: XConn>(id: Xid, dec: &mut Decoration, radius: i32, x: &X) -> Result<()> {
    if radius <= 0 {
        if dec.shaped {
            x.reset_shape(dec.decwin, ShapeKind::Bounding)?;
            x.reset_shape(dec.decwin, ShapeKind::Clip)?;
            x.reset_shape(id, ShapeKind::Clip)?;
            dec.shaped = false;
        }

        return Ok(());
    }

    let Rect { w, h, .. } = dec.last_outer;
    let bw = dec.last_scheme.border_width;
    let actual = dec.last_actual;
    let clip = paint::rounded_rects(w - 2 * bw, h - 2 * bw, (radius - bw).max(0));

    x.set_shape(
        dec.decwin,
        ShapeKind::Bounding,
        Point::new(0, 0),
        &paint::rounded_rects(w, h, radius),
    )?;
    x.set_shape(dec.decwin, ShapeKind::Clip, Point::new(bw, bw), &clip)?;
    x.set_shape(
        id,
        ShapeKind::Clip,
        Point::new(bw - actual.x, bw - actual.y),
        &clip,
    )?;
    dec.shaped = true;

    Ok(())
}
