//! An [XConn] implementation backed by x11rb
use crate::{
    pure::geometry::{Point, Rect},
    x::{
        property::{WmHints, WmNormalHints},
        ArgbVisual, Atom, ClientAttr, ClientConfig, ClientMessage, Prop, ShapeKind, WinType,
        XConn,
    },
    x11rb::{atom::Atoms, X11rbError},
    Result, Xid,
};
use ::x11rb::{
    connection::Connection,
    errors::ReplyError,
    protocol::{
        shape::{self, ConnectionExt as _},
        xproto::{
            AtomEnum, ChangeWindowAttributesAux, ClientMessageEvent, ClipOrdering, ColormapAlloc,
            ConfigureNotifyEvent, ConfigureWindowAux, ConnectionExt as _, CreateGCAux,
            CreateWindowAux, EventMask,
            InputFocus, PropMode, Rectangle, StackMode, Window, WindowClass,
            CONFIGURE_NOTIFY_EVENT,
        },
    },
    wrapper::ConnectionExt as _,
    COPY_DEPTH_FROM_PARENT, COPY_FROM_PARENT, CURRENT_TIME, NONE,
};
use tracing::{debug, trace};

type X11Result<T> = std::result::Result<T, X11rbError>;

/// A connection to the X server using the x11rb crate.
#[derive(Debug)]
pub struct X11rbConn<C: Connection> {
    conn: C,
    root: Window,
    depth: u8,
    atoms: Atoms,
}

impl<C: Connection> X11rbConn<C> {
    /// Wrap an established connection, using the given screen.
    ///
    /// Fails if the server does not support the SHAPE extension.
    pub fn new_for_connection(conn: C, screen: usize) -> Result<Self> {
        let (root, depth) = {
            let s = &conn.setup().roots[screen];
            (s.root, s.root_depth)
        };

        let atoms = Atoms::new(&conn).map_err(X11rbError::from)?;
        let shape = conn
            .shape_query_version()
            .map_err(X11rbError::from)?
            .reply()
            .map_err(|_| X11rbError::MissingShapeSupport)?;
        debug!(
            major = shape.major_version,
            minor = shape.minor_version,
            "SHAPE extension available"
        );

        Ok(Self {
            conn,
            root,
            depth,
            atoms,
        })
    }

    /// A reference to the underlying x11rb connection.
    pub fn connection(&self) -> &C {
        &self.conn
    }

    fn atom(&self, name: &str) -> X11Result<u32> {
        Ok(self.atoms.intern(&self.conn, name)?)
    }

    fn create(&self, ty: WinType, r: Rect) -> X11Result<Xid> {
        let id = self.conn.generate_id()?;
        let (parent, argb, aux) = match ty {
            WinType::Frame(argb) => (self.root, argb, CreateWindowAux::new().override_redirect(1)),
            WinType::Background(parent, argb) => (*parent, argb, CreateWindowAux::new()),
        };

        // a visual other than the parent's needs its own colormap and pixels
        let (depth, visual, aux) = match argb {
            Some(v) => (
                ArgbVisual::DEPTH,
                v.visual,
                aux.colormap(*v.colormap).background_pixel(0).border_pixel(0),
            ),
            None => (COPY_DEPTH_FROM_PARENT, COPY_FROM_PARENT, aux),
        };

        self.conn.create_window(
            depth,
            id,
            parent,
            r.x as i16,
            r.y as i16,
            r.w.max(1) as u16,
            r.h.max(1) as u16,
            0, // border width
            WindowClass::INPUT_OUTPUT,
            visual,
            &aux,
        )?;

        Ok(Xid(id))
    }

    fn read_prop(&self, id: Xid, name: &str) -> X11Result<Option<Prop>> {
        let atom = self.atom(name)?;
        let r = self
            .conn
            .get_property(false, *id, atom, AtomEnum::ANY, 0, 1024)?
            .reply()?;

        if r.type_ == NONE {
            trace!(%id, name, "requested prop is not set");
            return Ok(None);
        }

        let ty = self.atoms.name(&self.conn, r.type_)?;
        let words = || -> Vec<u32> { r.value32().map(|it| it.collect()).unwrap_or_default() };

        let prop = match ty.as_str() {
            "ATOM" => Prop::Atom(
                words()
                    .into_iter()
                    .map(|a| self.atoms.name(&self.conn, a))
                    .collect::<std::result::Result<Vec<String>, ReplyError>>()?,
            ),
            "CARDINAL" => Prop::Cardinal(words()),
            "WINDOW" => Prop::Window(words().into_iter().map(Xid).collect()),
            "STRING" | "UTF8_STRING" => Prop::UTF8String(
                String::from_utf8_lossy(&r.value)
                    .split('\0')
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect(),
            ),
            "WM_HINTS" => match WmHints::try_from_bytes(&words()) {
                Ok(hints) => Prop::WmHints(hints),
                Err(e) => {
                    debug!(%id, %e, "malformed WM_HINTS");
                    return Ok(None);
                }
            },
            "WM_SIZE_HINTS" => match WmNormalHints::try_from_bytes(&words()) {
                Ok(hints) => Prop::WmNormalHints(hints),
                Err(e) => {
                    debug!(%id, %e, "malformed WM_NORMAL_HINTS");
                    return Ok(None);
                }
            },
            _ => {
                trace!(%id, name, %ty, "unhandled property type");
                return Ok(None);
            }
        };

        Ok(Some(prop))
    }

    fn write_prop(&self, id: Xid, name: &str, val: Prop) -> X11Result<()> {
        let atom = self.atom(name)?;

        let (ty, data): (u32, Vec<u32>) = match val {
            Prop::Atom(names) => (
                AtomEnum::ATOM.into(),
                names
                    .iter()
                    .map(|n| self.atom(n))
                    .collect::<X11Result<_>>()?,
            ),
            Prop::Cardinal(vals) => (AtomEnum::CARDINAL.into(), vals),
            Prop::Window(ids) => (
                AtomEnum::WINDOW.into(),
                ids.into_iter().map(u32::from).collect(),
            ),
            Prop::WmHints(hints) => (AtomEnum::WM_HINTS.into(), hints.as_bytes().to_vec()),
            Prop::UTF8String(strs) => {
                let ty = self.atom(Atom::UTF8String.as_ref())?;
                let bytes = strs.join("\0");
                self.conn
                    .change_property8(PropMode::REPLACE, *id, atom, ty, bytes.as_bytes())?;

                return Ok(());
            }
            Prop::WmNormalHints(_) => return Err(X11rbError::UnsupportedProp(name.to_owned())),
        };

        self.conn
            .change_property32(PropMode::REPLACE, *id, atom, ty, &data)?;

        Ok(())
    }

    fn fill(&self, drawable: Xid, pixel: u32, rects: &[Rect]) -> X11Result<()> {
        let gc = self.conn.generate_id()?;
        let aux = CreateGCAux::new().foreground(pixel);
        self.conn.create_gc(gc, *drawable, &aux)?;
        self.conn
            .poly_fill_rectangle(*drawable, gc, &to_rectangles(rects))?;
        self.conn.free_gc(gc)?;

        Ok(())
    }

    fn configure_notify(&self, id: Xid, r: Rect, border: u32) -> X11Result<()> {
        let event = ConfigureNotifyEvent {
            response_type: CONFIGURE_NOTIFY_EVENT,
            sequence: 0,
            event: *id,
            window: *id,
            above_sibling: NONE,
            x: r.x as i16,
            y: r.y as i16,
            width: r.w as u16,
            height: r.h as u16,
            border_width: border as u16,
            override_redirect: false,
        };
        self.conn
            .send_event(false, *id, EventMask::STRUCTURE_NOTIFY, event)?;

        Ok(())
    }

    fn client_message(&self, msg: ClientMessage) -> X11Result<()> {
        let ty = self.atom(&msg.dtype)?;
        let event = ClientMessageEvent::new(32, *msg.id, ty, msg.data);
        self.conn
            .send_event(false, *msg.id, EventMask::NO_EVENT, event)?;

        Ok(())
    }
}

fn to_rectangles(rects: &[Rect]) -> Vec<Rectangle> {
    rects
        .iter()
        .map(|r| Rectangle {
            x: r.x as i16,
            y: r.y as i16,
            width: r.w.max(0) as u16,
            height: r.h.max(0) as u16,
        })
        .collect()
}

fn shape_kind(kind: ShapeKind) -> shape::SK {
    match kind {
        ShapeKind::Bounding => shape::SK::BOUNDING,
        ShapeKind::Clip => shape::SK::CLIP,
    }
}

impl<C: Connection> XConn for X11rbConn<C> {
    fn root(&self) -> Xid {
        Xid(self.root)
    }

    fn flush(&self) {
        if let Err(e) = self.conn.flush() {
            debug!(%e, "unable to flush connection");
        }
    }

    fn sync(&self) -> Result<()> {
        // a round trip guarantees every prior request has been processed
        self.conn
            .get_input_focus()
            .map_err(X11rbError::from)?
            .reply()
            .map_err(X11rbError::from)?;

        Ok(())
    }

    fn intern_atom(&self, atom: &str) -> Result<Xid> {
        Ok(Xid(self.atom(atom)?))
    }

    fn client_geometry(&self, client: Xid) -> Result<Rect> {
        let geo = self
            .conn
            .get_geometry(*client)
            .map_err(X11rbError::from)?
            .reply()
            .map_err(X11rbError::from)?;

        Ok(Rect::new(
            geo.x as i32,
            geo.y as i32,
            geo.width as i32,
            geo.height as i32,
        ))
    }

    fn root_depth(&self) -> u8 {
        self.depth
    }

    fn argb_visual(&self, client: Xid) -> Result<Option<u32>> {
        let geo = self.conn.get_geometry(*client).map_err(X11rbError::from)?;
        let attrs = self
            .conn
            .get_window_attributes(*client)
            .map_err(X11rbError::from)?;

        let depth = geo.reply().map_err(X11rbError::from)?.depth;
        let visual = attrs.reply().map_err(X11rbError::from)?.visual;

        if depth != ArgbVisual::DEPTH {
            return Ok(None);
        }
        trace!(%client, visual, "client uses a 32 bit visual");

        Ok(Some(visual))
    }

    fn create_colormap(&self, visual: u32) -> Result<Xid> {
        let id = self.conn.generate_id().map_err(X11rbError::from)?;
        self.conn
            .create_colormap(ColormapAlloc::NONE, id, self.root, visual)
            .map_err(X11rbError::from)?;

        Ok(Xid(id))
    }

    fn free_colormap(&self, id: Xid) -> Result<()> {
        self.conn.free_colormap(*id).map_err(X11rbError::from)?;

        Ok(())
    }

    fn create_window(&self, ty: WinType, r: Rect) -> Result<Xid> {
        Ok(self.create(ty, r)?)
    }

    fn destroy_window(&self, id: Xid) -> Result<()> {
        self.conn
            .destroy_window(*id)
            .map_err(X11rbError::from)?;

        Ok(())
    }

    fn map(&self, id: Xid) -> Result<()> {
        self.conn.map_window(*id).map_err(X11rbError::from)?;

        Ok(())
    }

    fn unmap(&self, id: Xid) -> Result<()> {
        self.conn.unmap_window(*id).map_err(X11rbError::from)?;

        Ok(())
    }

    fn reparent(&self, id: Xid, parent: Xid, p: Point) -> Result<()> {
        self.conn
            .reparent_window(*id, *parent, p.x as i16, p.y as i16)
            .map_err(X11rbError::from)?;

        Ok(())
    }

    fn focus(&self, id: Xid) -> Result<()> {
        self.conn
            .set_input_focus(InputFocus::PARENT, *id, CURRENT_TIME)
            .map_err(X11rbError::from)?;

        Ok(())
    }

    fn get_prop(&self, id: Xid, prop_name: &str) -> Result<Option<Prop>> {
        Ok(self.read_prop(id, prop_name)?)
    }

    fn set_prop(&self, id: Xid, name: &str, val: Prop) -> Result<()> {
        Ok(self.write_prop(id, name, val)?)
    }

    fn delete_prop(&self, id: Xid, prop_name: &str) -> Result<()> {
        let atom = self.atom(prop_name)?;
        self.conn
            .delete_property(*id, atom)
            .map_err(X11rbError::from)?;

        Ok(())
    }

    fn set_client_attributes(&self, id: Xid, attrs: &[ClientAttr]) -> Result<()> {
        let client_mask = EventMask::ENTER_WINDOW
            | EventMask::FOCUS_CHANGE
            | EventMask::PROPERTY_CHANGE
            | EventMask::STRUCTURE_NOTIFY;

        let frame_mask = EventMask::SUBSTRUCTURE_REDIRECT
            | EventMask::SUBSTRUCTURE_NOTIFY
            | EventMask::EXPOSURE
            | EventMask::BUTTON_PRESS
            | EventMask::ENTER_WINDOW;

        let aux = attrs
            .iter()
            .fold(ChangeWindowAttributesAux::new(), |aux, a| match a {
                ClientAttr::BackgroundColor(c) => aux.background_pixel(*c),
                ClientAttr::BackgroundPixmap(p) => aux.background_pixmap(**p),
                ClientAttr::ClientEventMask => aux.event_mask(client_mask),
                ClientAttr::FrameEventMask => aux.event_mask(frame_mask),
                ClientAttr::NoEventMask => aux.event_mask(EventMask::NO_EVENT),
            });

        self.conn
            .change_window_attributes(*id, &aux)
            .map_err(X11rbError::from)?;

        Ok(())
    }

    fn set_client_config(&self, id: Xid, data: &[ClientConfig]) -> Result<()> {
        let aux = data
            .iter()
            .fold(ConfigureWindowAux::new(), |aux, c| match c {
                ClientConfig::BorderPx(px) => aux.border_width(*px),
                ClientConfig::Position(r) => aux
                    .x(r.x)
                    .y(r.y)
                    .width(r.w.max(1) as u32)
                    .height(r.h.max(1) as u32),
                ClientConfig::StackAbove(s) => aux.sibling(**s).stack_mode(StackMode::ABOVE),
                ClientConfig::StackTop => aux.stack_mode(StackMode::ABOVE),
            });

        self.conn
            .configure_window(*id, &aux)
            .map_err(X11rbError::from)?;

        Ok(())
    }

    fn send_client_message(&self, msg: ClientMessage) -> Result<()> {
        Ok(self.client_message(msg)?)
    }

    fn send_configure_notify(&self, id: Xid, r: Rect, border: u32) -> Result<()> {
        Ok(self.configure_notify(id, r, border)?)
    }

    fn create_pixmap(&self, drawable: Xid, w: u32, h: u32, depth: u8) -> Result<Xid> {
        let id = self.conn.generate_id().map_err(X11rbError::from)?;
        self.conn
            .create_pixmap(depth, id, *drawable, w as u16, h as u16)
            .map_err(X11rbError::from)?;

        Ok(Xid(id))
    }

    fn free_pixmap(&self, id: Xid) -> Result<()> {
        self.conn.free_pixmap(*id).map_err(X11rbError::from)?;

        Ok(())
    }

    fn fill_rects(&self, drawable: Xid, pixel: u32, rects: &[Rect]) -> Result<()> {
        Ok(self.fill(drawable, pixel, rects)?)
    }

    fn clear_window(&self, id: Xid) -> Result<()> {
        self.conn
            .clear_area(false, *id, 0, 0, 0, 0)
            .map_err(X11rbError::from)?;

        Ok(())
    }

    fn set_shape(&self, id: Xid, kind: ShapeKind, offset: Point, rects: &[Rect]) -> Result<()> {
        self.conn
            .shape_rectangles(
                shape::SO::SET,
                shape_kind(kind),
                ClipOrdering::UNSORTED,
                *id,
                offset.x as i16,
                offset.y as i16,
                &to_rectangles(rects),
            )
            .map_err(X11rbError::from)?;

        Ok(())
    }

    fn reset_shape(&self, id: Xid, kind: ShapeKind) -> Result<()> {
        self.conn
            .shape_mask(shape::SO::SET, shape_kind(kind), *id, 0, 0, NONE)
            .map_err(X11rbError::from)?;

        Ok(())
    }
}
