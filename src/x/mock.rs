//! A mock implementation of XConn that is easier to implement for
//! use in tests.
//! This module and its contents are only available when testing.
use crate::{
    pure::geometry::{Point, Rect},
    x::{
        event::ClientMessage, property::Prop, Atom, ClientAttr, ClientConfig, ShapeKind, WinType,
        XConn,
    },
    Error, Result, Xid,
};
use std::{
    cell::{Cell, RefCell},
    collections::{HashMap, HashSet},
};

/// All methods on this trait that return a Result unimplemented by
/// default unless an implementation is provided.
/// The `mock_root` method always returns id 0 and `mock_flush` by default is a no-op.
///
/// Any implementation of `MockXConn` will automatically implement `XConn` by forwarding on
/// calls to `$method` to `mock_$method`.
#[allow(unused_variables)]
pub trait MockXConn {
    fn mock_root(&self) -> Xid {
        Xid(0)
    }

    fn mock_flush(&self) {}

    fn mock_sync(&self) -> Result<()> {
        Ok(())
    }

    fn mock_intern_atom(&self, atom: &str) -> Result<Xid> {
        unimplemented!("mock_intern_atom")
    }

    fn mock_client_geometry(&self, client: Xid) -> Result<Rect> {
        unimplemented!("mock_client_geometry")
    }

    fn mock_root_depth(&self) -> u8 {
        24
    }

    fn mock_argb_visual(&self, client: Xid) -> Result<Option<u32>> {
        unimplemented!("mock_argb_visual")
    }

    fn mock_create_colormap(&self, visual: u32) -> Result<Xid> {
        unimplemented!("mock_create_colormap")
    }

    fn mock_free_colormap(&self, id: Xid) -> Result<()> {
        unimplemented!("mock_free_colormap")
    }

    fn mock_create_window(&self, ty: WinType, r: Rect) -> Result<Xid> {
        unimplemented!("mock_create_window")
    }

    fn mock_destroy_window(&self, id: Xid) -> Result<()> {
        unimplemented!("mock_destroy_window")
    }

    fn mock_map(&self, id: Xid) -> Result<()> {
        unimplemented!("mock_map")
    }

    fn mock_unmap(&self, id: Xid) -> Result<()> {
        unimplemented!("mock_unmap")
    }

    fn mock_reparent(&self, id: Xid, parent: Xid, p: Point) -> Result<()> {
        unimplemented!("mock_reparent")
    }

    fn mock_focus(&self, id: Xid) -> Result<()> {
        unimplemented!("mock_focus")
    }

    fn mock_get_prop(&self, id: Xid, prop_name: &str) -> Result<Option<Prop>> {
        unimplemented!("mock_get_prop")
    }

    fn mock_set_prop(&self, id: Xid, name: &str, val: Prop) -> Result<()> {
        unimplemented!("mock_set_prop")
    }

    fn mock_delete_prop(&self, id: Xid, prop_name: &str) -> Result<()> {
        unimplemented!("mock_delete_prop")
    }

    fn mock_set_client_attributes(&self, id: Xid, attrs: &[ClientAttr]) -> Result<()> {
        unimplemented!("mock_set_client_attributes")
    }

    fn mock_set_client_config(&self, id: Xid, data: &[ClientConfig]) -> Result<()> {
        unimplemented!("mock_set_client_config")
    }

    fn mock_send_client_message(&self, msg: ClientMessage) -> Result<()> {
        unimplemented!("mock_send_client_message")
    }

    fn mock_send_configure_notify(&self, id: Xid, r: Rect, border: u32) -> Result<()> {
        unimplemented!("mock_send_configure_notify")
    }

    fn mock_create_pixmap(&self, drawable: Xid, w: u32, h: u32, depth: u8) -> Result<Xid> {
        unimplemented!("mock_create_pixmap")
    }

    fn mock_free_pixmap(&self, id: Xid) -> Result<()> {
        unimplemented!("mock_free_pixmap")
    }

    fn mock_fill_rects(&self, drawable: Xid, pixel: u32, rects: &[Rect]) -> Result<()> {
        unimplemented!("mock_fill_rects")
    }

    fn mock_clear_window(&self, id: Xid) -> Result<()> {
        unimplemented!("mock_clear_window")
    }

    fn mock_set_shape(
        &self,
        id: Xid,
        kind: ShapeKind,
        offset: Point,
        rects: &[Rect],
    ) -> Result<()> {
        unimplemented!("mock_set_shape")
    }

    fn mock_reset_shape(&self, id: Xid, kind: ShapeKind) -> Result<()> {
        unimplemented!("mock_reset_shape")
    }
}

impl<T> XConn for T
where
    T: MockXConn,
{
    fn root(&self) -> Xid {
        self.mock_root()
    }

    fn flush(&self) {
        self.mock_flush()
    }

    fn sync(&self) -> Result<()> {
        self.mock_sync()
    }

    fn intern_atom(&self, atom: &str) -> Result<Xid> {
        self.mock_intern_atom(atom)
    }

    fn client_geometry(&self, client: Xid) -> Result<Rect> {
        self.mock_client_geometry(client)
    }

    fn root_depth(&self) -> u8 {
        self.mock_root_depth()
    }

    fn argb_visual(&self, client: Xid) -> Result<Option<u32>> {
        self.mock_argb_visual(client)
    }

    fn create_colormap(&self, visual: u32) -> Result<Xid> {
        self.mock_create_colormap(visual)
    }

    fn free_colormap(&self, id: Xid) -> Result<()> {
        self.mock_free_colormap(id)
    }

    fn create_window(&self, ty: WinType, r: Rect) -> Result<Xid> {
        self.mock_create_window(ty, r)
    }

    fn destroy_window(&self, id: Xid) -> Result<()> {
        self.mock_destroy_window(id)
    }

    fn map(&self, id: Xid) -> Result<()> {
        self.mock_map(id)
    }

    fn unmap(&self, id: Xid) -> Result<()> {
        self.mock_unmap(id)
    }

    fn reparent(&self, id: Xid, parent: Xid, p: Point) -> Result<()> {
        self.mock_reparent(id, parent, p)
    }

    fn focus(&self, id: Xid) -> Result<()> {
        self.mock_focus(id)
    }

    fn get_prop(&self, id: Xid, prop_name: &str) -> Result<Option<Prop>> {
        self.mock_get_prop(id, prop_name)
    }

    fn set_prop(&self, id: Xid, name: &str, val: Prop) -> Result<()> {
        self.mock_set_prop(id, name, val)
    }

    fn delete_prop(&self, id: Xid, prop_name: &str) -> Result<()> {
        self.mock_delete_prop(id, prop_name)
    }

    fn set_client_attributes(&self, id: Xid, attrs: &[ClientAttr]) -> Result<()> {
        self.mock_set_client_attributes(id, attrs)
    }

    fn set_client_config(&self, id: Xid, data: &[ClientConfig]) -> Result<()> {
        self.mock_set_client_config(id, data)
    }

    fn send_client_message(&self, msg: ClientMessage) -> Result<()> {
        self.mock_send_client_message(msg)
    }

    fn send_configure_notify(&self, id: Xid, r: Rect, border: u32) -> Result<()> {
        self.mock_send_configure_notify(id, r, border)
    }

    fn create_pixmap(&self, drawable: Xid, w: u32, h: u32, depth: u8) -> Result<Xid> {
        self.mock_create_pixmap(drawable, w, h, depth)
    }

    fn free_pixmap(&self, id: Xid) -> Result<()> {
        self.mock_free_pixmap(id)
    }

    fn fill_rects(&self, drawable: Xid, pixel: u32, rects: &[Rect]) -> Result<()> {
        self.mock_fill_rects(drawable, pixel, rects)
    }

    fn clear_window(&self, id: Xid) -> Result<()> {
        self.mock_clear_window(id)
    }

    fn set_shape(&self, id: Xid, kind: ShapeKind, offset: Point, rects: &[Rect]) -> Result<()> {
        self.mock_set_shape(id, kind, offset, rects)
    }

    fn reset_shape(&self, id: Xid, kind: ShapeKind) -> Result<()> {
        self.mock_reset_shape(id, kind)
    }
}

/// A single request made against a [RecordingXConn].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Req {
    CreateWindow(WinType, Rect, Xid),
    DestroyWindow(Xid),
    Map(Xid),
    Unmap(Xid),
    Reparent(Xid, Xid, Point),
    Focus(Xid),
    SetProp(Xid, String),
    DeleteProp(Xid, String),
    Attrs(Xid, Vec<ClientAttr>),
    Config(Xid, Vec<ClientConfig>),
    ClientMessage(ClientMessage),
    ConfigureNotify(Xid, Rect, u32),
    CreateColormap(u32, Xid),
    FreeColormap(Xid),
    CreatePixmap(Xid, u32, u32, u8, Xid),
    FreePixmap(Xid),
    Fill(Xid, u32, Vec<Rect>),
    Clear(Xid),
    Shape(Xid, ShapeKind, Point, Vec<Rect>),
    ResetShape(Xid, ShapeKind),
    Sync,
}

/// A [MockXConn] that keeps an in memory copy of window geometry and properties
/// and records every request it is sent.
#[derive(Debug, Default)]
pub struct RecordingXConn {
    next_id: Cell<u32>,
    atoms: RefCell<Vec<String>>,
    geometry: RefCell<HashMap<Xid, Rect>>,
    props: RefCell<HashMap<(Xid, String), Prop>>,
    requests: RefCell<Vec<Req>>,
    argb: RefCell<HashMap<Xid, u32>>,
    failing: RefCell<HashSet<&'static str>>,
}

impl RecordingXConn {
    /// Register a client window with an initial geometry.
    pub fn with_window(self, id: Xid, r: Rect) -> Self {
        self.geometry.borrow_mut().insert(id, r);
        self
    }

    /// Register a client window drawn with a 32 bit visual.
    pub fn with_argb_window(self, id: Xid, r: Rect, visual: u32) -> Self {
        self.argb.borrow_mut().insert(id, visual);
        self.with_window(id, r)
    }

    /// Set a property without recording a request.
    pub fn put_prop(&self, id: Xid, atom: Atom, val: Prop) {
        self.props
            .borrow_mut()
            .insert((id, atom.as_ref().to_owned()), val);
    }

    /// The current value of a property.
    pub fn prop(&self, id: Xid, atom: Atom) -> Option<Prop> {
        self.props
            .borrow()
            .get(&(id, atom.as_ref().to_owned()))
            .cloned()
    }

    /// Make every subsequent call to the named [XConn] method fail, or succeed
    /// again if `fail` is false.
    pub fn fail(&self, method: &'static str, fail: bool) {
        if fail {
            self.failing.borrow_mut().insert(method);
        } else {
            self.failing.borrow_mut().remove(method);
        }
    }

    fn check(&self, method: &'static str) -> Result<()> {
        if self.failing.borrow().contains(method) {
            return Err(Error::Custom(format!("{method} failed")));
        }

        Ok(())
    }

    /// All requests made so far.
    pub fn requests(&self) -> Vec<Req> {
        self.requests.borrow().clone()
    }

    /// Drop all recorded requests.
    pub fn clear_requests(&self) {
        self.requests.borrow_mut().clear();
    }

    /// The number of recorded requests matching `pred`.
    pub fn count(&self, pred: impl Fn(&Req) -> bool) -> usize {
        self.requests.borrow().iter().filter(|r| pred(r)).count()
    }

    fn record(&self, req: Req) {
        self.requests.borrow_mut().push(req);
    }

    fn new_id(&self) -> Xid {
        let n = self.next_id.get() + 1;
        self.next_id.set(n);

        Xid(0x1000 + n)
    }
}

impl MockXConn for RecordingXConn {
    fn mock_sync(&self) -> Result<()> {
        self.check("sync")?;
        self.record(Req::Sync);
        Ok(())
    }

    fn mock_intern_atom(&self, atom: &str) -> Result<Xid> {
        self.check("intern_atom")?;
        let mut atoms = self.atoms.borrow_mut();
        let ix = match atoms.iter().position(|a| a == atom) {
            Some(ix) => ix,
            None => {
                atoms.push(atom.to_owned());
                atoms.len() - 1
            }
        };

        Ok(Xid(ix as u32 + 1))
    }

    fn mock_client_geometry(&self, client: Xid) -> Result<Rect> {
        self.check("client_geometry")?;
        self.geometry
            .borrow()
            .get(&client)
            .copied()
            .ok_or(Error::UnknownClient(client))
    }

    fn mock_argb_visual(&self, client: Xid) -> Result<Option<u32>> {
        self.check("argb_visual")?;
        Ok(self.argb.borrow().get(&client).copied())
    }

    fn mock_create_colormap(&self, visual: u32) -> Result<Xid> {
        self.check("create_colormap")?;
        let id = self.new_id();
        self.record(Req::CreateColormap(visual, id));

        Ok(id)
    }

    fn mock_free_colormap(&self, id: Xid) -> Result<()> {
        self.check("free_colormap")?;
        self.record(Req::FreeColormap(id));
        Ok(())
    }

    fn mock_create_window(&self, ty: WinType, r: Rect) -> Result<Xid> {
        self.check("create_window")?;
        let id = self.new_id();
        self.geometry.borrow_mut().insert(id, r);
        self.record(Req::CreateWindow(ty, r, id));

        Ok(id)
    }

    fn mock_destroy_window(&self, id: Xid) -> Result<()> {
        self.check("destroy_window")?;
        self.geometry.borrow_mut().remove(&id);
        self.record(Req::DestroyWindow(id));
        Ok(())
    }

    fn mock_map(&self, id: Xid) -> Result<()> {
        self.check("map")?;
        self.record(Req::Map(id));
        Ok(())
    }

    fn mock_unmap(&self, id: Xid) -> Result<()> {
        self.check("unmap")?;
        self.record(Req::Unmap(id));
        Ok(())
    }

    fn mock_reparent(&self, id: Xid, parent: Xid, p: Point) -> Result<()> {
        self.check("reparent")?;
        self.record(Req::Reparent(id, parent, p));
        Ok(())
    }

    fn mock_focus(&self, id: Xid) -> Result<()> {
        self.check("focus")?;
        self.record(Req::Focus(id));
        Ok(())
    }

    fn mock_get_prop(&self, id: Xid, prop_name: &str) -> Result<Option<Prop>> {
        self.check("get_prop")?;
        Ok(self
            .props
            .borrow()
            .get(&(id, prop_name.to_owned()))
            .cloned())
    }

    fn mock_set_prop(&self, id: Xid, name: &str, val: Prop) -> Result<()> {
        self.check("set_prop")?;
        self.props.borrow_mut().insert((id, name.to_owned()), val);
        self.record(Req::SetProp(id, name.to_owned()));
        Ok(())
    }

    fn mock_delete_prop(&self, id: Xid, prop_name: &str) -> Result<()> {
        self.check("delete_prop")?;
        self.props.borrow_mut().remove(&(id, prop_name.to_owned()));
        self.record(Req::DeleteProp(id, prop_name.to_owned()));
        Ok(())
    }

    fn mock_set_client_attributes(&self, id: Xid, attrs: &[ClientAttr]) -> Result<()> {
        self.check("set_client_attributes")?;
        self.record(Req::Attrs(id, attrs.to_vec()));
        Ok(())
    }

    fn mock_set_client_config(&self, id: Xid, data: &[ClientConfig]) -> Result<()> {
        self.check("set_client_config")?;
        for c in data {
            if let ClientConfig::Position(r) = c {
                self.geometry.borrow_mut().insert(id, *r);
            }
        }
        self.record(Req::Config(id, data.to_vec()));
        Ok(())
    }

    fn mock_send_client_message(&self, msg: ClientMessage) -> Result<()> {
        self.check("send_client_message")?;
        self.record(Req::ClientMessage(msg));
        Ok(())
    }

    fn mock_send_configure_notify(&self, id: Xid, r: Rect, border: u32) -> Result<()> {
        self.check("send_configure_notify")?;
        self.record(Req::ConfigureNotify(id, r, border));
        Ok(())
    }

    fn mock_create_pixmap(&self, drawable: Xid, w: u32, h: u32, depth: u8) -> Result<Xid> {
        self.check("create_pixmap")?;
        let id = self.new_id();
        self.record(Req::CreatePixmap(drawable, w, h, depth, id));

        Ok(id)
    }

    fn mock_free_pixmap(&self, id: Xid) -> Result<()> {
        self.check("free_pixmap")?;
        self.record(Req::FreePixmap(id));
        Ok(())
    }

    fn mock_fill_rects(&self, drawable: Xid, pixel: u32, rects: &[Rect]) -> Result<()> {
        self.check("fill_rects")?;
        self.record(Req::Fill(drawable, pixel, rects.to_vec()));
        Ok(())
    }

    fn mock_clear_window(&self, id: Xid) -> Result<()> {
        self.check("clear_window")?;
        self.record(Req::Clear(id));
        Ok(())
    }

    fn mock_set_shape(
        &self,
        id: Xid,
        kind: ShapeKind,
        offset: Point,
        rects: &[Rect],
    ) -> Result<()> {
        self.check("set_shape")?;
        self.record(Req::Shape(id, kind, offset, rects.to_vec()));
        Ok(())
    }

    fn mock_reset_shape(&self, id: Xid, kind: ShapeKind) -> Result<()> {
        self.check("reset_shape")?;
        self.record(Req::ResetShape(id, kind));
        Ok(())
    }
}
