//! Core data structures and the operations that keep managed clients, their
//! decorations and the X server in sync.
use crate::{
    decoration::{self, Context},
    pure::{
        geometry::Point,
        stack::{ClientStack, Layer},
    },
    theme::{Mood, SchemeKind, SchemeRef, Theme},
    x::{Atom, ClientAttr, ClientConfig, Prop, XConn, XConnExt},
    Error, Result, Xid,
};
use std::{
    collections::{HashMap, HashSet},
    fmt,
};
use tracing::{debug, error, info, trace, warn};

pub mod client;
pub mod config;
pub mod hooks;
pub mod layout;
pub mod lock;
pub mod registry;

#[doc(inline)]
pub use client::{Client, ClientFlags, ClientProp};
#[doc(inline)]
pub use config::Config;
#[doc(inline)]
pub use hooks::{HookEvent, HookSink, ManageHook, Placement};
#[doc(inline)]
pub use layout::{Arrangement, TagTree, Tile};
#[doc(inline)]
pub use lock::MonitorsLock;
#[doc(inline)]
pub use registry::ClientRegistry;

/// Mutable internal state for the client registry and decoration renderer.
///
/// All operations take the [XConn] they should use to talk to the X server
/// rather than storing it, so that the same state can be driven against a
/// mock connection in tests.
pub struct State<X>
where
    X: XConn,
{
    pub(crate) config: Config,
    pub(crate) theme: Theme,
    pub(crate) clients: ClientRegistry,
    pub(crate) stacks: HashMap<String, ClientStack<Xid>>,
    pub(crate) tags: Box<dyn TagTree>,
    pub(crate) lock: MonitorsLock,
    pub(crate) dirty_tags: HashSet<String>,
    manage_hook: Option<Box<dyn ManageHook<X>>>,
    hooks: Vec<Box<dyn HookSink>>,
}

impl<X: XConn> fmt::Debug for State<X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("config", &self.config)
            .field("clients", &self.clients)
            .field("stacks", &self.stacks)
            .field("lock", &self.lock)
            .field("dirty_tags", &self.dirty_tags)
            .finish()
    }
}

impl<X> State<X>
where
    X: XConn,
{
    /// Initialise the state and reset the EWMH client list and active window.
    pub fn new(config: Config, tags: impl TagTree + 'static, x: &X) -> Result<Self> {
        x.set_prop(x.root(), Atom::NetClientList.as_ref(), Prop::Window(vec![]))?;
        x.set_active_window(None)?;

        Ok(Self {
            config,
            theme: Theme::default(),
            clients: ClientRegistry::new(),
            stacks: HashMap::new(),
            tags: Box::new(tags),
            lock: MonitorsLock::default(),
            dirty_tags: HashSet::new(),
            manage_hook: None,
            hooks: Vec::new(),
        })
    }

    /// Set the hook used to decide the placement of new clients.
    pub fn set_manage_hook(&mut self, hook: impl ManageHook<X> + 'static) {
        self.manage_hook = Some(hook.boxed());
    }

    /// Add a receiver for [HookEvent]s.
    pub fn add_hook_sink(&mut self, sink: impl HookSink + 'static) {
        self.hooks.push(sink.boxed());
    }

    /// The current config.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The current theme. Use [State::set_scheme_attr] to edit it.
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Every managed client.
    pub fn clients(&self) -> &ClientRegistry {
        &self.clients
    }

    /// The tag tree clients are laid out with.
    pub fn tags(&self) -> &dyn TagTree {
        self.tags.as_ref()
    }

    /// Look up a managed client.
    pub fn client(&self, id: Xid) -> Option<&Client> {
        self.clients.get(&id)
    }

    /// Some client that is demanding attention.
    pub fn find_urgent(&self) -> Option<&Client> {
        self.clients.find_urgent()
    }

    /// The focused client if there is one.
    pub fn focused_client(&self) -> Option<Xid> {
        self.clients.focused()
    }

    /// The stacking order of a tag.
    pub fn stack(&self, tag: &str) -> Option<&ClientStack<Xid>> {
        self.stacks.get(tag)
    }

    /// Tags whose urgency state changed since this was last called.
    pub fn take_dirty_tags(&mut self) -> HashSet<String> {
        std::mem::take(&mut self.dirty_tags)
    }

    fn client_mut(&mut self, id: Xid) -> Result<&mut Client> {
        self.clients.get_mut(&id).ok_or(Error::UnknownClient(id))
    }

    fn emit(&mut self, event: HookEvent) {
        trace!(%event, "emitting hook event");
        for sink in self.hooks.iter_mut() {
            sink.emit(&event);
        }
    }

    fn placement(&mut self, id: Xid, x: &X) -> Placement {
        let mut hook = self.manage_hook.take();
        let placement = match hook {
            Some(ref mut h) => {
                trace!(%id, "running user manage hook");
                h.call(id, x).unwrap_or_else(|e| {
                    error!(%e, "error returned from user manage hook");
                    Placement::default()
                })
            }
            None => Placement::default(),
        };
        self.manage_hook = hook;

        placement
    }

    /// Start managing a window.
    ///
    /// Returns `None` without changing anything if the window is already
    /// managed or belongs to trellis. Windows that can not be queried or are
    /// rejected by the manage hook are mapped as they are and left unmanaged.
    ///
    /// If attaching the client to the X server fails part way through, the
    /// client is released again before the error is returned.
    pub fn manage(&mut self, id: Xid, x: &X) -> Result<Option<&Client>> {
        if self.clients.contains(&id) {
            debug!(%id, "window is already managed");
            return Ok(None);
        }

        if id == x.root() || self.clients.is_frame(&id) {
            debug!(%id, "refusing to manage a window owned by the window manager");
            return Ok(None);
        }

        let float_size = match x.client_geometry(id) {
            Ok(r) => r,
            Err(e) => {
                warn!(%id, %e, "unable to read client geometry: leaving unmanaged");
                map_unmanaged(id, x);
                return Ok(None);
            }
        };

        let placement = self.placement(id, x);
        if !placement.manage {
            debug!(%id, "manage hook rejected window");
            map_unmanaged(id, x);
            return Ok(None);
        }

        let tag = placement
            .tag
            .clone()
            .unwrap_or_else(|| self.tags.focused_tag());
        info!(%id, %tag, ?float_size, "managing new client");

        let dec = decoration::setup_frame(id, float_size, x)?;
        let mut client = Client::new(id, tag.as_str(), float_size, dec);
        client.pid = x.window_pid(id);
        client.title = x.window_title(id).unwrap_or_else(|e| {
            warn!(%id, %e, "unable to read window title");
            String::new()
        });
        self.clients.insert(client);

        if let Err(e) = self.attach(id, x) {
            warn!(%id, %e, "unable to attach client: releasing it again");
            if let Some(mut c) = self.clients.remove(&id) {
                if let Err(e) = release_window(&c, x) {
                    warn!(%id, %e, "unable to release client window");
                }
                if let Err(e) = decoration::free(&mut c.dec, x) {
                    warn!(%id, %e, "unable to free decoration");
                }
            }
            if let Err(e) = x.client_list_remove(id) {
                warn!(%id, %e, "unable to update client list");
            }

            return Err(e);
        }

        self.stacks.entry(tag.clone()).or_default().insert(id);
        self.tags.insert(&tag, id);

        // one layout pass covers switching tags and entering fullscreen
        self.lock_monitors();
        let res = self.place(id, &tag, &placement, x);
        self.unlock_monitors(x)?;
        res?;

        let focus = placement.focus.unwrap_or(self.config.focus_new);
        if focus && self.tags.is_visible(&tag) {
            self.focus(id, x)?;
        }

        Ok(self.clients.get(&id))
    }

    // The fallible part of managing a registered client
    fn attach(&mut self, id: Xid, x: &X) -> Result<()> {
        self.update_size_hints(id, x)?;
        self.update_wm_hints(id, x)?;
        x.set_client_attributes(id, &[ClientAttr::ClientEventMask])?;
        x.map(id)?;

        x.client_list_add(id)
    }

    fn place(&mut self, id: Xid, tag: &str, placement: &Placement, x: &X) -> Result<()> {
        if placement.switch_tag {
            self.tags.focus_tag(tag);
        }
        if placement.fullscreen {
            self.set_fullscreen(id, true, x)?;
        }

        self.apply_layout(tag, x)
    }

    /// Stop managing a window, releasing its decoration.
    ///
    /// Unknown windows are ignored. A drag in progress is cancelled before the
    /// client is detached from its tag.
    pub fn unmanage(&mut self, id: Xid, x: &X) -> Result<()> {
        let client = match self.clients.get_mut(&id) {
            Some(c) => c,
            None => {
                trace!(%id, "ignoring unmanage of unknown window");
                return Ok(());
            }
        };

        if client.is_dragged() {
            debug!(%id, "cancelling drag of client being unmanaged");
            client.flags.remove(ClientFlags::DRAGGED);
        }

        let tag = client.tag.clone();
        info!(%id, %tag, "removing client");
        self.tags.remove(&tag, id);
        if let Some(s) = self.stacks.get_mut(&tag) {
            s.remove(&id);
        }

        let was_focused = self.clients.focused() == Some(id);
        let mut client = match self.clients.remove(&id) {
            Some(c) => c,
            None => return Ok(()),
        };

        // the window itself may already have been destroyed
        if let Err(e) = release_window(&client, x) {
            warn!(%id, %e, "unable to release client window");
        }
        decoration::free(&mut client.dec, x)?;
        x.client_list_remove(id)?;

        self.apply_layout(&tag, x)?;

        if was_focused {
            x.set_active_window(None)?;
            if let Some(next) = self.tags.focused_client(&tag) {
                if self.clients.contains(&next) {
                    self.focus(next, x)?;
                }
            }
        }

        Ok(())
    }

    /// Move input focus to a client.
    ///
    /// Refocusing the focused client does nothing. Otherwise the previous
    /// client is redrawn as unfocused, urgency is cleared on the new one and
    /// exactly one [HookEvent::FocusChanged] is emitted.
    ///
    /// Requests to the X server that fail once focus has moved are logged
    /// and skipped so that the change is always announced.
    ///
    /// # Panics
    /// Panics if `id` is not a managed client.
    pub fn focus(&mut self, id: Xid, x: &X) -> Result<()> {
        assert!(
            self.clients.contains(&id),
            "attempt to focus unmanaged window {id}"
        );

        let prev = self.clients.focused();
        if prev == Some(id) {
            trace!(%id, "client is already focused");
            return Ok(());
        }

        debug!(%id, ?prev, "focusing client");
        self.clients.set_focused(Some(id));
        if let Some(p) = prev {
            absorb(p, "redraw unfocused client", self.refresh_decoration(p, x));
        }

        let (urgent, never_focus, tag) = match self.clients.get(&id) {
            Some(c) => (c.is_urgent(), c.never_focus(), c.tag.clone()),
            None => return Err(Error::UnknownClient(id)),
        };

        let res = if urgent {
            self.set_urgent_force(id, false, x)
        } else {
            self.refresh_decoration(id, x)
        };
        absorb(id, "redraw focused client", res);

        if !never_focus {
            absorb(id, "set input focus", x.focus(id));
        }
        match x.client_supports_protocol(id, Atom::WmTakeFocus) {
            Ok(true) => absorb(
                id,
                "send WM_TAKE_FOCUS",
                x.send_protocol_message(id, Atom::WmTakeFocus),
            ),
            Ok(false) => (),
            Err(e) => warn!(%id, %e, "unable to read WM_PROTOCOLS"),
        }
        absorb(id, "set active window", x.set_active_window(Some(id)));

        if self.config.raise_on_focus || self.tags.is_max_layout(&tag) {
            absorb(id, "raise client", self.raise(id, x));
        }

        let title = self.clients.get(&id).map(|c| c.title.clone()).unwrap_or_default();
        self.emit(HookEvent::FocusChanged { id, title });

        Ok(())
    }

    /// Focus the root window, leaving no client focused.
    ///
    /// `_NET_ACTIVE_WINDOW` is only cleared if a client was focused.
    pub fn unfocus_all(&mut self, x: &X) -> Result<()> {
        x.focus(x.root())?;

        if let Some(prev) = self.clients.focused() {
            x.set_active_window(None)?;
            self.clients.set_focused(None);
            self.refresh_decoration(prev, x)?;
            self.emit(HookEvent::FocusChanged {
                id: Xid(0),
                title: String::new(),
            });
        }

        Ok(())
    }

    /// Raise a client to the top of its stack.
    pub fn raise(&mut self, id: Xid, x: &X) -> Result<()> {
        let tag = self.client_mut(id)?.tag.clone();
        if let Some(s) = self.stacks.get_mut(&tag) {
            s.raise(&id);
        }

        self.restack(&tag, x)
    }

    fn restack(&self, tag: &str, x: &X) -> Result<()> {
        let stack = match self.stacks.get(tag) {
            Some(s) => s,
            None => return Ok(()),
        };

        let frames: Vec<Xid> = stack
            .order()
            .iter()
            .rev()
            .flat_map(|id| self.clients.get(id).map(|c| c.dec.decwin))
            .collect();

        trace!(%tag, ?frames, "restacking frames");
        x.restack(frames.iter())
    }

    /// Set the urgent flag of a client if it differs from `urgent`.
    pub fn set_urgent(&mut self, id: Xid, urgent: bool, x: &X) -> Result<()> {
        if self.client_mut(id)?.is_urgent() == urgent {
            return Ok(());
        }

        self.set_urgent_force(id, urgent, x)
    }

    /// Set the urgent flag of a client, emitting [HookEvent::Urgent] and
    /// writing the urgency hint even if the flag is unchanged.
    pub fn set_urgent_force(&mut self, id: Xid, urgent: bool, x: &X) -> Result<()> {
        self.emit(HookEvent::Urgent { id, on: urgent });

        let client = self.client_mut(id)?;
        client.flags.set(ClientFlags::URGENT, urgent);
        let tag = client.tag.clone();
        self.dirty_tags.insert(tag);

        self.refresh_decoration(id, x)?;
        x.set_urgency_hint(id, urgent)?;

        self.publish_wm_state(id, x)
    }

    /// Re-read WM_HINTS for a client after the property changed.
    ///
    /// Urgency requested by the focused client is cleared straight away.
    pub fn update_wm_hints(&mut self, id: Xid, x: &X) -> Result<()> {
        let hints = match x.wm_hints(id) {
            Ok(hints) => hints,
            Err(e) => {
                warn!(%id, %e, "malformed WM_HINTS: ignoring");
                None
            }
        };

        let hints = match hints {
            Some(h) => h,
            None => {
                self.client_mut(id)?;
                return Ok(());
            }
        };

        let urgent = hints.is_urgent();
        let focused = self.clients.focused() == Some(id);

        if focused && urgent {
            trace!(%id, "clearing urgency hint of focused client");
            x.set_prop(
                id,
                Atom::WmHints.as_ref(),
                Prop::WmHints(hints.with_urgency(false)),
            )?;
        } else if self.client_mut(id)?.is_urgent() != urgent {
            self.emit(HookEvent::Urgent { id, on: urgent });
            let client = self.client_mut(id)?;
            client.flags.set(ClientFlags::URGENT, urgent);
            let tag = client.tag.clone();
            self.dirty_tags.insert(tag);
            self.refresh_decoration(id, x)?;
            self.publish_wm_state(id, x)?;
        }

        let never_focus = hints.accepts_input().map(|input| !input).unwrap_or(false);
        self.client_mut(id)?
            .flags
            .set(ClientFlags::NEVER_FOCUS, never_focus);

        Ok(())
    }

    /// Re-read WM_NORMAL_HINTS for a client, falling back to no constraints
    /// if they are missing or malformed.
    pub fn update_size_hints(&mut self, id: Xid, x: &X) -> Result<()> {
        let hints = match x.wm_normal_hints(id) {
            Ok(hints) => hints,
            Err(e) => {
                warn!(%id, %e, "malformed WM_NORMAL_HINTS: using defaults");
                None
            }
        };

        let client = self.client_mut(id)?;
        client.hints = hints.map(|h| h.size_hints()).unwrap_or_default();
        trace!(%id, hints = ?client.hints, "updated size hints");

        Ok(())
    }

    /// Re-read the title of a client.
    pub fn update_title(&mut self, id: Xid, x: &X) -> Result<()> {
        let title = match x.window_title(id) {
            Ok(title) => title,
            Err(e) => {
                warn!(%id, %e, "unable to read window title");
                return Ok(());
            }
        };

        let client = self.client_mut(id)?;
        if client.title == title {
            return Ok(());
        }
        client.title = title.clone();

        if self.clients.focused() == Some(id) {
            self.emit(HookEvent::WindowTitleChanged { id, title });
        }

        Ok(())
    }

    /// Enter or leave fullscreen.
    pub fn set_fullscreen(&mut self, id: Xid, fullscreen: bool, x: &X) -> Result<()> {
        let client = self.client_mut(id)?;
        if client.is_fullscreen() == fullscreen {
            return Ok(());
        }

        client.flags.set(ClientFlags::FULLSCREEN, fullscreen);
        if client.flags.contains(ClientFlags::EWMH_NOTIFY) {
            client.flags.set(ClientFlags::EWMH_FULLSCREEN, fullscreen);
        }
        let tag = client.tag.clone();

        if let Some(s) = self.stacks.get_mut(&tag) {
            if fullscreen {
                s.add_layer(&id, Layer::Fullscreen);
            } else {
                s.remove_layer(&id, Layer::Fullscreen);
            }
        }

        self.publish_wm_state(id, x)?;
        self.emit(HookEvent::Fullscreen { id, on: fullscreen });
        self.restack(&tag, x)?;

        self.apply_layout(&tag, x)
    }

    /// Handle a `_NET_WM_STATE` fullscreen request sent by the client itself.
    ///
    /// Requests are ignored for clients with [ClientProp::EwmhRequests] turned
    /// off. Returns whether the request was honoured.
    pub fn request_fullscreen(&mut self, id: Xid, fullscreen: bool, x: &X) -> Result<bool> {
        if !self.client_mut(id)?.flags.contains(ClientFlags::EWMH_REQUESTS) {
            debug!(%id, fullscreen, "ignoring fullscreen request from client");
            return Ok(false);
        }

        self.set_fullscreen(id, fullscreen, x)?;

        Ok(true)
    }

    /// Set whether a tiled client keeps its floating size.
    pub fn set_pseudotile(&mut self, id: Xid, pseudotile: bool, x: &X) -> Result<()> {
        let client = self.client_mut(id)?;
        if client.is_pseudotile() == pseudotile {
            return Ok(());
        }

        client.flags.set(ClientFlags::PSEUDOTILE, pseudotile);
        let tag = client.tag.clone();

        self.apply_layout(&tag, x)
    }

    /// Write a client property, running the side effects that go with it.
    pub fn set_client_prop(&mut self, id: Xid, prop: ClientProp, on: bool, x: &X) -> Result<()> {
        match prop {
            ClientProp::Fullscreen => self.set_fullscreen(id, on, x),
            ClientProp::Pseudotile => self.set_pseudotile(id, on, x),
            ClientProp::Urgent => self.set_urgent_force(id, on, x),
            ClientProp::SizeHints | ClientProp::EwmhRequests | ClientProp::EwmhNotify => {
                self.client_mut(id)?.flags.set(prop.flag(), on);
                Ok(())
            }
        }
    }

    /// Flip a client property.
    pub fn toggle_client_prop(&mut self, id: Xid, prop: ClientProp, x: &X) -> Result<()> {
        let current = self.client_mut(id)?.prop(prop);

        self.set_client_prop(id, prop, !current, x)
    }

    /// Set a client property by name to `on`, `off` or `toggle`.
    pub fn set_client_prop_by_name(
        &mut self,
        id: Xid,
        name: &str,
        value: &str,
        x: &X,
    ) -> Result<()> {
        let prop = ClientProp::from_name(name)?;

        match value {
            "toggle" => self.toggle_client_prop(id, prop, x),
            "on" | "true" => self.set_client_prop(id, prop, true, x),
            "off" | "false" => self.set_client_prop(id, prop, false, x),
            _ => Err(Error::InvalidAttributeValue {
                attr: name.to_owned(),
                value: value.to_owned(),
            }),
        }
    }

    /// Mark the start or end of an interactive move / resize.
    ///
    /// Ending a drag re-applies the last geometry so that the client is
    /// configured to where the frame ended up.
    pub fn set_dragged(&mut self, id: Xid, dragged: bool, x: &X) -> Result<()> {
        let client = self.client_mut(id)?;
        if client.is_dragged() == dragged {
            return Ok(());
        }
        client.flags.set(ClientFlags::DRAGGED, dragged);

        if !dragged {
            self.refresh_decoration(id, x)?;
        }

        Ok(())
    }

    /// Ask a client to close by sending it WM_DELETE_WINDOW.
    pub fn close(&mut self, id: Xid, x: &X) -> Result<()> {
        if !self.clients.contains(&id) {
            return Err(Error::UnknownClient(id));
        }

        debug!(%id, "requesting client close");
        x.send_protocol_message(id, Atom::WmDeleteWindow)
    }

    fn publish_wm_state(&self, id: Xid, x: &X) -> Result<()> {
        let client = self.clients.get(&id).ok_or(Error::UnknownClient(id))?;
        if !client.flags.contains(ClientFlags::EWMH_NOTIFY) {
            return Ok(());
        }

        let fullscreen = client.flags.contains(ClientFlags::EWMH_FULLSCREEN);
        x.set_net_wm_state(id, fullscreen, client.is_urgent())
    }

    // Re-apply the last geometry of a client with the scheme matching its current state
    fn refresh_decoration(&mut self, id: Xid, x: &X) -> Result<()> {
        let Self {
            clients,
            theme,
            config,
            ..
        } = self;

        let ctx = Context {
            theme,
            config,
            focused: clients.focused(),
        };
        let client = clients.get_mut(&id).ok_or(Error::UnknownClient(id))?;
        let scheme = ctx.scheme_for(client, client.dec.kind);

        decoration::change_scheme(client, scheme, config, x)
    }

    /// Take a hold on the monitors lock: layout passes are deferred until the
    /// last hold is released.
    pub fn lock_monitors(&mut self) {
        self.lock.lock();
    }

    /// Release a hold on the monitors lock, running any deferred layout pass.
    pub fn unlock_monitors(&mut self, x: &X) -> Result<()> {
        if self.lock.unlock() {
            debug!("running deferred layout pass");
            self.apply_all_layouts(x)?;
        }

        Ok(())
    }

    /// Lay out and show the clients of a tag, or hide them if the tag is not visible.
    pub fn apply_layout(&mut self, tag: &str, x: &X) -> Result<()> {
        if self.lock.is_locked() {
            trace!(%tag, "monitors locked: deferring layout");
            self.lock.defer();
            return Ok(());
        }

        let arrangement = match self.tags.arrange(tag) {
            Some(a) if self.tags.is_visible(tag) => a,
            _ => return self.hide_tag(tag, x),
        };
        trace!(%tag, ?arrangement, "applying layout");

        let Self {
            clients,
            theme,
            config,
            ..
        } = self;
        let ctx = Context {
            theme,
            config,
            focused: clients.focused(),
        };
        let monitor = arrangement.monitor;

        for t in arrangement.tiles.iter() {
            match clients.get_mut(&t.id) {
                Some(c) => decoration::resize_tiling(c, t.rect, t.kind, monitor, &ctx, x)?,
                None => warn!(id = %t.id, %tag, "layout placed an unknown client"),
            }
        }

        for id in arrangement.floating.iter() {
            match clients.get_mut(id) {
                Some(c) => decoration::resize_floating(c, monitor, &ctx, x)?,
                None => warn!(%id, %tag, "layout floated an unknown client"),
            }
        }

        let placed = arrangement.tiles.iter().map(|t| &t.id);
        for id in placed.chain(arrangement.floating.iter()) {
            if let Some(c) = clients.get_mut(id) {
                if !c.dec.mapped {
                    x.map(c.dec.decwin)?;
                    c.dec.mapped = true;
                }
            }
        }

        self.restack(tag, x)
    }

    fn hide_tag(&mut self, tag: &str, x: &X) -> Result<()> {
        for c in self.clients.iter_mut().filter(|c| c.tag == tag && c.dec.mapped) {
            x.unmap(c.dec.decwin)?;
            c.dec.mapped = false;
        }

        Ok(())
    }

    /// Lay out every visible tag and hide the clients of all others.
    pub fn apply_all_layouts(&mut self, x: &X) -> Result<()> {
        if self.lock.is_locked() {
            trace!("monitors locked: deferring layout");
            self.lock.defer();
            return Ok(());
        }

        let visible = self.tags.visible_tags();
        let hidden: Vec<String> = self
            .stacks
            .keys()
            .filter(|t| !visible.contains(t))
            .cloned()
            .collect();

        for tag in hidden.iter() {
            self.hide_tag(tag, x)?;
        }

        for tag in visible.iter() {
            self.apply_layout(tag, x)?;
        }

        Ok(())
    }

    /// Write a scheme attribute by name and redraw every client using one of
    /// the schemes it reached.
    ///
    /// ```text
    /// set_scheme_attr("theme.tiling.active", "border_width", "3", &x)
    /// ```
    pub fn set_scheme_attr(&mut self, path: &str, attr: &str, value: &str, x: &X) -> Result<()> {
        self.lock_monitors();
        let res = match self.theme.set_by_name(path, attr, value) {
            Ok(touched) => self.refresh_schemes(&touched, x),
            Err(e) => Err(e),
        };
        self.unlock_monitors(x)?;

        res
    }

    /// Reset a scheme and everything it mirrors to, redrawing affected clients.
    pub fn reset_scheme(&mut self, path: &str, x: &X) -> Result<()> {
        let r = SchemeRef::from_path(path)?;

        self.lock_monitors();
        let res = match self.theme.reset(r) {
            Ok(touched) => self.refresh_schemes(&touched, x),
            Err(e) => Err(e),
        };
        self.unlock_monitors(x)?;

        res
    }

    fn refresh_schemes(&mut self, touched: &[(SchemeKind, Mood)], x: &X) -> Result<()> {
        let focused = self.clients.focused();
        let affected: Vec<Xid> = self
            .clients
            .iter()
            .filter(|c| {
                let mood = Mood::select(c.is_urgent(), focused == Some(c.id));
                touched.contains(&(c.dec.kind, mood))
            })
            .map(|c| c.id)
            .collect();

        debug!(n_clients = affected.len(), "redrawing clients after scheme change");
        for id in affected {
            self.refresh_decoration(id, x)?;
        }

        Ok(())
    }

    /// Hand every client back to the root window at its floating position and
    /// free all decorations.
    pub fn shutdown(&mut self, x: &X) -> Result<()> {
        info!(n_clients = self.clients.len(), "releasing all clients");
        let root = x.root();

        for mut c in self.clients.drain() {
            let id = c.id;
            let res = x
                .reparent(id, root, Point::from(c.float_size))
                .and_then(|_| x.set_client_config(id, &[ClientConfig::Position(c.float_size)]))
                .and_then(|_| x.map(id));

            if let Err(e) = res {
                warn!(%id, %e, "unable to restore client window");
            }

            decoration::free(&mut c.dec, x)?;
        }

        self.stacks.clear();
        x.set_prop(root, Atom::NetClientList.as_ref(), Prop::Window(vec![]))?;
        x.set_active_window(None)?;

        x.sync()
    }
}

fn map_unmanaged<X: XConn>(id: Xid, x: &X) {
    if let Err(e) = x.map(id) {
        warn!(%id, %e, "unable to map unmanaged window");
    }
}

fn absorb(id: Xid, action: &str, res: Result<()>) {
    if let Err(e) = res {
        warn!(%id, %e, action, "X request failed while changing focus");
    }
}

fn release_window<X: XConn>(client: &Client, x: &X) -> Result<()> {
    x.set_client_attributes(client.id, &[ClientAttr::NoEventMask])?;
    x.reparent(client.id, x.root(), Point::from(client.dec.last_inner))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        theme::AttrValue,
        theme::SchemeAttr,
        x::{
            mock::{RecordingXConn, Req},
            WmHints,
        },
        Rect,
    };
    use simple_test_case::test_case;
    use std::{
        cell::{Cell, RefCell},
        rc::Rc,
    };

    const MONITOR: Rect = Rect::new(0, 0, 1000, 800);

    #[derive(Debug, Default)]
    struct FakeTags {
        focused: String,
        visible: Vec<String>,
        members: HashMap<String, Vec<Xid>>,
        floating: Vec<Xid>,
        max: bool,
        arranged: Rc<Cell<usize>>,
    }

    impl TagTree for FakeTags {
        fn focused_tag(&self) -> String {
            self.focused.clone()
        }

        fn focus_tag(&mut self, tag: &str) {
            self.focused = tag.to_owned();
            self.visible = vec![tag.to_owned()];
        }

        fn is_visible(&self, tag: &str) -> bool {
            self.visible.iter().any(|t| t == tag)
        }

        fn visible_tags(&self) -> Vec<String> {
            self.visible.clone()
        }

        fn insert(&mut self, tag: &str, id: Xid) {
            self.members.entry(tag.to_owned()).or_default().push(id);
        }

        fn remove(&mut self, tag: &str, id: Xid) {
            if let Some(m) = self.members.get_mut(tag) {
                m.retain(|&c| c != id);
            }
        }

        fn arrange(&self, tag: &str) -> Option<Arrangement> {
            if !self.is_visible(tag) {
                return None;
            }
            self.arranged.set(self.arranged.get() + 1);

            let members = self.members.get(tag).cloned().unwrap_or_default();
            let (floating, tiled): (Vec<Xid>, Vec<Xid>) =
                members.into_iter().partition(|id| self.floating.contains(id));

            let n = tiled.len().max(1) as i32;
            let w = MONITOR.w / n;
            let tiles = tiled
                .iter()
                .enumerate()
                .map(|(i, &id)| Tile::new(id, Rect::new(i as i32 * w, 0, w, MONITOR.h)))
                .collect();

            Some(Arrangement {
                monitor: MONITOR,
                tiles,
                floating,
            })
        }

        fn focused_client(&self, tag: &str) -> Option<Xid> {
            self.members.get(tag).and_then(|m| m.last().copied())
        }

        fn is_max_layout(&self, _tag: &str) -> bool {
            self.max
        }
    }

    struct Harness {
        state: State<RecordingXConn>,
        x: RecordingXConn,
        events: Rc<RefCell<Vec<HookEvent>>>,
        arranged: Rc<Cell<usize>>,
    }

    impl Harness {
        fn new(tags: FakeTags) -> Self {
            let mut x = RecordingXConn::default();
            for id in 1..=5 {
                x = x.with_window(Xid(id), Rect::new(10, 10, 200, 100));
            }

            let arranged = tags.arranged.clone();
            let events = Rc::new(RefCell::new(Vec::new()));
            let sink_events = events.clone();

            let mut state = State::new(Config::default(), tags, &x).unwrap();
            state.add_hook_sink(move |e: &HookEvent| sink_events.borrow_mut().push(e.clone()));

            Self {
                state,
                x,
                events,
                arranged,
            }
        }

        fn with_clients(ids: &[u32]) -> Self {
            let mut h = Self::new(FakeTags {
                focused: "1".into(),
                visible: vec!["1".into()],
                ..Default::default()
            });
            for &id in ids {
                h.state.manage(Xid(id), &h.x).unwrap();
            }
            h.events.borrow_mut().clear();
            h.x.clear_requests();

            h
        }

        fn focus_events(&self) -> usize {
            self.events
                .borrow()
                .iter()
                .filter(|e| matches!(e, HookEvent::FocusChanged { .. }))
                .count()
        }
    }

    #[test]
    fn managing_twice_is_rejected() {
        let mut h = Harness::with_clients(&[1]);

        assert!(h.state.manage(Xid(1), &h.x).unwrap().is_none());
        assert_eq!(h.state.clients().len(), 1);
        assert!(h.x.requests().is_empty());
    }

    #[test]
    fn frames_and_the_root_are_never_managed() {
        let mut h = Harness::with_clients(&[1]);
        let frame = h.state.client(Xid(1)).unwrap().decoration().frame();

        assert!(h.state.manage(frame, &h.x).unwrap().is_none());
        assert!(h.state.manage(Xid(0), &h.x).unwrap().is_none());
        assert_eq!(h.state.clients().len(), 1);
    }

    #[test]
    fn windows_without_geometry_are_mapped_but_not_managed() {
        let mut h = Harness::with_clients(&[]);

        assert!(h.state.manage(Xid(99), &h.x).unwrap().is_none());
        assert!(h.state.clients().is_empty());
        assert_eq!(h.x.requests(), vec![Req::Map(Xid(99))]);
    }

    #[test]
    fn manage_hooks_can_reject_and_place_windows() {
        let mut h = Harness::with_clients(&[]);
        h.state.set_manage_hook(|id: Xid, _: &RecordingXConn| {
            Ok(Placement {
                manage: id != Xid(2),
                tag: Some("web".into()),
                focus: Some(false),
                ..Default::default()
            })
        });

        assert!(h.state.manage(Xid(2), &h.x).unwrap().is_none());
        assert_eq!(h.x.requests(), vec![Req::Map(Xid(2))]);
        assert!(h.state.client(Xid(2)).is_none());
        assert!(h.state.manage(Xid(1), &h.x).unwrap().is_some());

        let c = h.state.client(Xid(1)).unwrap();
        assert_eq!(c.tag(), "web");
        assert_eq!(h.state.focused_client(), None);
        // the web tag is not visible so its frame stays unmapped
        assert!(!c.decoration().mapped);
    }

    #[test]
    fn placement_can_start_clients_fullscreen() {
        let mut h = Harness::with_clients(&[1]);
        h.state.set_manage_hook(|_: Xid, _: &RecordingXConn| {
            Ok(Placement {
                fullscreen: true,
                ..Default::default()
            })
        });
        let before = h.arranged.get();

        h.state.manage(Xid(2), &h.x).unwrap();

        let c = h.state.client(Xid(2)).unwrap();
        assert!(c.is_fullscreen());
        assert_eq!(c.decoration().kind(), SchemeKind::Fullscreen);
        assert_eq!(c.decoration().last_outer_rect(), MONITOR);
        assert_eq!(h.arranged.get(), before + 1);
        assert!(h
            .events
            .borrow()
            .contains(&HookEvent::Fullscreen { id: Xid(2), on: true }));
    }

    #[test]
    fn failing_to_attach_a_client_releases_it() {
        let mut h = Harness::with_clients(&[]);
        // reading _NET_CLIENT_LIST is the first request here that can not be skipped
        h.x.fail("get_prop", true);

        assert!(h.state.manage(Xid(1), &h.x).is_err());

        assert!(h.state.clients().is_empty());
        assert!(h.state.stack("1").is_none());
        assert!(h.state.tags().focused_client("1").is_none());
        assert_eq!(h.x.count(|r| matches!(r, Req::DestroyWindow(_))), 2);
        assert!(h
            .x
            .requests()
            .contains(&Req::Reparent(Xid(1), Xid(0), Point::new(10, 10))));
    }

    #[test]
    fn managed_clients_are_framed_mapped_and_listed() {
        let h = Harness::with_clients(&[1, 2]);
        let c = h.state.client(Xid(1)).unwrap();

        assert!(c.decoration().mapped);
        assert_eq!(c.decoration().last_outer_rect(), Rect::new(0, 0, 500, 800));
        assert_eq!(h.x.client_list().unwrap(), vec![Xid(1), Xid(2)]);
        assert_eq!(h.state.stack("1").unwrap().order(), vec![Xid(2), Xid(1)]);
    }

    #[test]
    fn unmanage_removes_exactly_one_client() {
        let mut h = Harness::with_clients(&[1, 2, 3]);
        let frame = h.state.client(Xid(2)).unwrap().decoration().frame();

        h.state.unmanage(Xid(2), &h.x).unwrap();

        assert!(h.state.client(Xid(2)).is_none());
        assert_eq!(h.state.clients().len(), 2);
        assert!(h.state.clients().client_for_frame(&frame).is_none());
        assert!(h.x.requests().contains(&Req::DestroyWindow(frame)));
        assert_eq!(h.x.client_list().unwrap(), vec![Xid(1), Xid(3)]);
        assert!(!h.state.stack("1").unwrap().contains(&Xid(2)));
    }

    #[test]
    fn unmanaging_unknown_windows_is_a_noop() {
        let mut h = Harness::with_clients(&[1]);

        h.state.unmanage(Xid(42), &h.x).unwrap();

        assert_eq!(h.state.clients().len(), 1);
        assert!(h.x.requests().is_empty());
    }

    #[test]
    fn unmanaging_the_focused_client_focuses_the_next_one() {
        let mut h = Harness::with_clients(&[1, 2]);
        assert_eq!(h.state.focused_client(), Some(Xid(2)));

        h.state.unmanage(Xid(2), &h.x).unwrap();

        assert_eq!(h.state.focused_client(), Some(Xid(1)));
        assert_eq!(h.focus_events(), 1);
    }

    #[test]
    fn unmanaging_a_dragged_client_is_safe() {
        let mut h = Harness::with_clients(&[1]);
        h.state.set_dragged(Xid(1), true, &h.x).unwrap();

        h.state.unmanage(Xid(1), &h.x).unwrap();

        assert!(h.state.clients().is_empty());
        assert_eq!(h.state.focused_client(), None);
        assert_eq!(h.focus_events(), 0);
    }

    #[test]
    fn refocusing_does_not_emit() {
        let mut h = Harness::with_clients(&[1, 2]);

        h.state.focus(Xid(2), &h.x).unwrap();
        assert_eq!(h.focus_events(), 0);

        h.state.focus(Xid(1), &h.x).unwrap();
        h.state.focus(Xid(1), &h.x).unwrap();
        assert_eq!(h.focus_events(), 1);
        assert_eq!(
            h.x.prop(Xid(0), Atom::NetActiveWindow),
            Some(Prop::Window(vec![Xid(1)]))
        );
    }

    #[test]
    fn focus_redraws_both_clients() {
        let mut h = Harness::with_clients(&[1, 2]);

        h.state.focus(Xid(1), &h.x).unwrap();

        let theme = h.state.theme();
        let active = *theme.scheme(SchemeKind::Tiling, Mood::Active);
        let normal = *theme.scheme(SchemeKind::Tiling, Mood::Normal);
        assert_eq!(*h.state.client(Xid(1)).unwrap().decoration().last_scheme(), active);
        assert_eq!(*h.state.client(Xid(2)).unwrap().decoration().last_scheme(), normal);
    }

    #[test_case(false; "accepts input")]
    #[test_case(true; "never focus")]
    #[test]
    fn never_focus_clients_are_not_given_input_focus(never_focus: bool) {
        let mut h = Harness::with_clients(&[1, 2]);
        h.x.put_prop(Xid(1), Atom::WmHints, Prop::WmHints(WmHints::with_input(!never_focus)));
        h.x.put_prop(
            Xid(1),
            Atom::WmProtocols,
            Prop::Atom(vec![Atom::WmTakeFocus.as_ref().to_owned()]),
        );
        h.state.update_wm_hints(Xid(1), &h.x).unwrap();

        h.state.focus(Xid(1), &h.x).unwrap();

        assert_eq!(h.x.requests().contains(&Req::Focus(Xid(1))), !never_focus);
        assert_eq!(h.x.count(|r| matches!(r, Req::ClientMessage(_))), 1);
        assert_eq!(h.state.focused_client(), Some(Xid(1)));
    }

    #[test]
    fn focus_changes_are_announced_even_if_the_client_is_gone() {
        let mut h = Harness::with_clients(&[1, 2]);
        h.x.fail("get_prop", true);
        h.x.fail("focus", true);

        h.state.focus(Xid(1), &h.x).unwrap();

        assert_eq!(h.state.focused_client(), Some(Xid(1)));
        assert_eq!(h.focus_events(), 1);
        assert_eq!(
            h.x.prop(Xid(0), Atom::NetActiveWindow),
            Some(Prop::Window(vec![Xid(1)]))
        );
    }

    #[test]
    #[should_panic]
    fn focusing_an_unmanaged_window_panics() {
        let mut h = Harness::with_clients(&[1]);

        h.state.focus(Xid(3), &h.x).unwrap();
    }

    #[test]
    fn unfocus_all_only_emits_when_something_was_focused() {
        let mut h = Harness::with_clients(&[1]);

        h.state.unfocus_all(&h.x).unwrap();
        h.state.unfocus_all(&h.x).unwrap();

        assert_eq!(
            *h.events.borrow(),
            vec![HookEvent::FocusChanged {
                id: Xid(0),
                title: String::new()
            }]
        );
        assert_eq!(h.state.focused_client(), None);

        let active = Req::SetProp(Xid(0), Atom::NetActiveWindow.as_ref().to_owned());
        assert_eq!(h.x.count(|r| *r == active), 1);
        assert_eq!(h.x.count(|r| *r == Req::Focus(Xid(0))), 2);
    }

    #[test_case(false, vec![Xid(2), Xid(1)]; "focus leaves stacking alone")]
    #[test_case(true, vec![Xid(1), Xid(2)]; "max layout raises")]
    #[test]
    fn focus_raises_in_max_layout(max: bool, expected: Vec<Xid>) {
        let mut h = Harness::new(FakeTags {
            focused: "1".into(),
            visible: vec!["1".into()],
            max,
            ..Default::default()
        });
        h.state.manage(Xid(1), &h.x).unwrap();
        h.state.manage(Xid(2), &h.x).unwrap();

        h.state.focus(Xid(1), &h.x).unwrap();

        assert_eq!(h.state.stack("1").unwrap().order(), expected);
    }

    #[test]
    fn urgency_is_set_once_and_cleared_by_focus() {
        let mut h = Harness::with_clients(&[1, 2]);
        h.x.put_prop(Xid(1), Atom::WmHints, Prop::WmHints(WmHints::default()));

        h.state.set_urgent(Xid(1), true, &h.x).unwrap();
        h.state.set_urgent(Xid(1), true, &h.x).unwrap();

        assert_eq!(h.state.find_urgent().map(|c| c.id()), Some(Xid(1)));
        assert!(h.x.wm_hints(Xid(1)).unwrap().unwrap().is_urgent());
        assert_eq!(h.state.take_dirty_tags(), HashSet::from(["1".to_owned()]));

        h.state.focus(Xid(1), &h.x).unwrap();

        assert!(h.state.find_urgent().is_none());
        assert!(!h.x.wm_hints(Xid(1)).unwrap().unwrap().is_urgent());
        assert_eq!(
            *h.events.borrow(),
            vec![
                HookEvent::Urgent { id: Xid(1), on: true },
                HookEvent::Urgent { id: Xid(1), on: false },
                HookEvent::FocusChanged {
                    id: Xid(1),
                    title: String::new()
                },
            ]
        );
    }

    #[test]
    fn urgency_hints_from_the_focused_client_are_cleared() {
        let mut h = Harness::with_clients(&[1]);
        h.x.put_prop(
            Xid(1),
            Atom::WmHints,
            Prop::WmHints(WmHints::default().with_urgency(true)),
        );

        h.state.update_wm_hints(Xid(1), &h.x).unwrap();

        assert!(!h.x.wm_hints(Xid(1)).unwrap().unwrap().is_urgent());
        assert!(!h.state.client(Xid(1)).unwrap().is_urgent());
        assert!(h.events.borrow().is_empty());
    }

    #[test]
    fn urgency_hints_from_other_clients_are_mirrored() {
        let mut h = Harness::with_clients(&[1, 2]);
        h.x.put_prop(
            Xid(1),
            Atom::WmHints,
            Prop::WmHints(WmHints::default().with_urgency(true)),
        );

        h.state.update_wm_hints(Xid(1), &h.x).unwrap();

        let c = h.state.client(Xid(1)).unwrap();
        assert!(c.is_urgent());
        let urgent = h.state.theme().scheme(SchemeKind::Tiling, Mood::Urgent);
        assert_eq!(c.decoration().last_scheme(), urgent);
        assert_eq!(
            *h.events.borrow(),
            vec![HookEvent::Urgent { id: Xid(1), on: true }]
        );
    }

    #[test]
    fn title_changes_of_the_focused_client_are_reported() {
        let mut h = Harness::with_clients(&[1, 2]);
        for id in [1, 2] {
            h.x.put_prop(Xid(id), Atom::NetWmName, Prop::UTF8String(vec!["new".into()]));
            h.state.update_title(Xid(id), &h.x).unwrap();
        }

        assert_eq!(h.state.client(Xid(1)).unwrap().title(), "new");
        assert_eq!(
            *h.events.borrow(),
            vec![HookEvent::WindowTitleChanged {
                id: Xid(2),
                title: "new".into()
            }]
        );
    }

    #[test]
    fn size_hints_are_read_at_manage_time() {
        let mut h = Harness::with_clients(&[]);
        let mut raw = [0; 18];
        raw[0] = 1 << 5; // PMaxSize
        raw[7] = 300;
        raw[8] = 150;
        h.x.put_prop(
            Xid(1),
            Atom::WmNormalHints,
            Prop::WmNormalHints(crate::x::WmNormalHints::try_from_bytes(&raw).unwrap()),
        );

        h.state.manage(Xid(1), &h.x).unwrap();

        let c = h.state.client(Xid(1)).unwrap();
        assert_eq!((c.size_hints().max_w, c.size_hints().max_h), (300, 150));
        assert_eq!(c.decoration().last_inner_rect().w, 300);
    }

    #[test]
    fn fullscreen_clients_cover_the_monitor_and_stack_on_top() {
        let mut h = Harness::with_clients(&[1, 2]);

        h.state.set_fullscreen(Xid(1), true, &h.x).unwrap();

        let c = h.state.client(Xid(1)).unwrap();
        assert_eq!(c.decoration().last_outer_rect(), MONITOR);
        assert_eq!(c.decoration().kind(), SchemeKind::Fullscreen);
        assert!(c.flags().contains(ClientFlags::EWMH_FULLSCREEN));
        assert_eq!(h.state.stack("1").unwrap().order(), vec![Xid(1), Xid(2)]);
        assert_eq!(
            h.x.prop(Xid(1), Atom::NetWmState),
            Some(Prop::Atom(vec![Atom::NetWmStateFullscreen.as_ref().to_owned()]))
        );
        assert_eq!(
            *h.events.borrow(),
            vec![HookEvent::Fullscreen { id: Xid(1), on: true }]
        );

        h.state.set_fullscreen(Xid(1), false, &h.x).unwrap();

        let c = h.state.client(Xid(1)).unwrap();
        assert_eq!(c.decoration().kind(), SchemeKind::Tiling);
        assert_eq!(h.state.stack("1").unwrap().order(), vec![Xid(2), Xid(1)]);
    }

    #[test_case(true; "honoured")]
    #[test_case(false; "ignored")]
    #[test]
    fn fullscreen_requests_follow_ewmh_requests(allowed: bool) {
        let mut h = Harness::with_clients(&[1]);
        h.state
            .set_client_prop(Xid(1), ClientProp::EwmhRequests, allowed, &h.x)
            .unwrap();

        let honoured = h.state.request_fullscreen(Xid(1), true, &h.x).unwrap();

        assert_eq!(honoured, allowed);
        assert_eq!(h.state.client(Xid(1)).unwrap().is_fullscreen(), allowed);
    }

    #[test]
    fn ewmh_notify_off_keeps_state_private() {
        let mut h = Harness::with_clients(&[1]);
        h.state
            .set_client_prop(Xid(1), ClientProp::EwmhNotify, false, &h.x)
            .unwrap();

        h.state.set_fullscreen(Xid(1), true, &h.x).unwrap();

        assert!(h.x.prop(Xid(1), Atom::NetWmState).is_none());
        assert!(!h.state.client(Xid(1)).unwrap().flags().contains(ClientFlags::EWMH_FULLSCREEN));
    }

    #[test]
    fn pseudotile_keeps_the_floating_size() {
        let mut h = Harness::with_clients(&[1]);

        h.state.set_pseudotile(Xid(1), true, &h.x).unwrap();

        // 200x100 content plus the 2px tiling border, centered in the monitor
        assert_eq!(
            h.state.client(Xid(1)).unwrap().decoration().last_outer_rect(),
            Rect::new(398, 348, 204, 104)
        );
    }

    #[test]
    fn floating_clients_use_the_floating_scheme() {
        let mut h = Harness::new(FakeTags {
            focused: "1".into(),
            visible: vec!["1".into()],
            floating: vec![Xid(1)],
            ..Default::default()
        });

        h.state.manage(Xid(1), &h.x).unwrap();

        let c = h.state.client(Xid(1)).unwrap();
        assert_eq!(c.decoration().kind(), SchemeKind::Floating);
        assert_eq!(c.decoration().last_inner_rect(), Rect::new(10, 10, 200, 100));
    }

    #[test_case("toggle", true; "toggle")]
    #[test_case("on", true; "on")]
    #[test_case("off", false; "off")]
    #[test]
    fn client_props_by_name(value: &str, expected: bool) {
        let mut h = Harness::with_clients(&[1]);

        h.state
            .set_client_prop_by_name(Xid(1), "pseudotile", value, &h.x)
            .unwrap();

        assert_eq!(h.state.client(Xid(1)).unwrap().is_pseudotile(), expected);
    }

    #[test]
    fn bad_client_prop_values_are_rejected() {
        let mut h = Harness::with_clients(&[1]);

        let res = h.state.set_client_prop_by_name(Xid(1), "urgent", "maybe", &h.x);

        assert!(matches!(res, Err(Error::InvalidAttributeValue { .. })));
    }

    #[test]
    fn toggling_size_hints_is_a_plain_flag_write() {
        let mut h = Harness::with_clients(&[1]);

        h.state.toggle_client_prop(Xid(1), ClientProp::SizeHints, &h.x).unwrap();

        assert!(!h.state.client(Xid(1)).unwrap().prop(ClientProp::SizeHints));
        assert!(h.x.requests().is_empty());
    }

    #[test]
    fn ending_a_drag_configures_the_client() {
        let mut h = Harness::with_clients(&[1]);
        h.state.set_dragged(Xid(1), true, &h.x).unwrap();
        h.x.clear_requests();

        h.state.set_dragged(Xid(1), false, &h.x).unwrap();

        assert_eq!(h.x.count(|r| matches!(r, Req::ConfigureNotify(..))), 1);
    }

    #[test]
    fn close_sends_wm_delete_window() {
        let mut h = Harness::with_clients(&[1]);

        h.state.close(Xid(1), &h.x).unwrap();

        assert_eq!(h.x.count(|r| matches!(r, Req::ClientMessage(m) if m.id == Xid(1))), 1);
        assert!(matches!(h.state.close(Xid(9), &h.x), Err(Error::UnknownClient(_))));
    }

    #[test]
    fn layout_passes_are_deferred_while_locked() {
        let mut h = Harness::with_clients(&[1, 2]);
        let before = h.arranged.get();

        h.state.lock_monitors();
        h.state.lock_monitors();
        h.state.apply_layout("1", &h.x).unwrap();
        h.state.apply_all_layouts(&h.x).unwrap();
        h.state.unlock_monitors(&h.x).unwrap();
        assert_eq!(h.arranged.get(), before);

        h.state.unlock_monitors(&h.x).unwrap();
        assert_eq!(h.arranged.get(), before + 1);
    }

    #[test]
    fn hidden_tags_are_unmapped() {
        let mut h = Harness::with_clients(&[1]);
        let frame = h.state.client(Xid(1)).unwrap().decoration().frame();

        h.state.tags.focus_tag("2");
        h.state.apply_all_layouts(&h.x).unwrap();

        assert!(h.x.requests().contains(&Req::Unmap(frame)));
        assert!(!h.state.client(Xid(1)).unwrap().decoration().mapped);
    }

    #[test]
    fn scheme_edits_redraw_clients_using_them() {
        let mut h = Harness::with_clients(&[1, 2]);

        h.state
            .set_scheme_attr("theme.tiling.active", "border_width", "7", &h.x)
            .unwrap();
        h.state
            .set_scheme_attr("theme.floating.active", "border_width", "3", &h.x)
            .unwrap();

        let focused = h.state.client(Xid(2)).unwrap().decoration();
        let other = h.state.client(Xid(1)).unwrap().decoration();
        assert_eq!(focused.last_scheme().border_width, 7);
        assert_eq!(other.last_scheme().border_width, 2);
        let active = SchemeRef::Mood(SchemeKind::Tiling, Mood::Active);
        assert_eq!(
            h.state.theme().get(active, SchemeAttr::BorderWidth),
            AttrValue::Int(7)
        );
    }

    #[test]
    fn theme_wide_edits_reach_every_visible_client() {
        let mut h = Harness::with_clients(&[1, 2]);

        h.state.set_scheme_attr("theme", "color", "#123456", &h.x).unwrap();

        for id in [1, 2] {
            let s = *h.state.client(Xid(id)).unwrap().decoration().last_scheme();
            assert_eq!(s.border_color.rgb_u32(), 0x123456);
        }
    }

    #[test]
    fn failed_scheme_edits_still_release_the_lock() {
        let mut h = Harness::with_clients(&[1]);

        assert!(h.state.set_scheme_attr("theme.nope", "color", "red", &h.x).is_err());
        assert!(!h.state.lock.is_locked());
        assert!(h.state.reset_scheme("theme.tiling", &h.x).is_ok());
        assert!(!h.state.lock.is_locked());
    }

    #[test]
    fn out_of_range_scheme_values_are_rejected() {
        let mut h = Harness::with_clients(&[1, 2]);

        let res = h
            .state
            .set_scheme_attr("theme.tiling", "border_width", "2000000000", &h.x);

        assert!(matches!(res, Err(Error::InvalidAttributeValue { .. })));
        assert!(!h.state.lock.is_locked());
        for id in [1, 2] {
            let s = h.state.client(Xid(id)).unwrap().decoration().last_scheme();
            assert!(s.border_width < 100);
        }
    }

    #[test]
    fn shutdown_returns_clients_to_the_root() {
        let mut h = Harness::with_clients(&[1, 2]);

        h.state.shutdown(&h.x).unwrap();

        assert!(h.state.clients().is_empty());
        for id in [1, 2] {
            assert!(h.x.requests().contains(&Req::Reparent(
                Xid(id),
                Xid(0),
                Point::new(10, 10)
            )));
            assert!(h.x.requests().contains(&Req::Map(Xid(id))));
        }
        assert!(h.x.client_list().unwrap().is_empty());
        assert_eq!(h.x.requests().last(), Some(&Req::Sync));
    }
}
