//! Traits for observing state changes and for deciding where new clients go
use crate::{x::XConn, Result, Xid};
use std::fmt;

/// A change in client state that external listeners may be interested in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookEvent {
    /// Focus moved to a new client. An id of 0 means nothing is focused.
    FocusChanged {
        /// The newly focused client
        id: Xid,
        /// Its title
        title: String,
    },
    /// The title of the focused client changed
    WindowTitleChanged {
        /// The focused client
        id: Xid,
        /// Its new title
        title: String,
    },
    /// A client gained or lost the urgent flag
    Urgent {
        /// The client
        id: Xid,
        /// The new state
        on: bool,
    },
    /// A client entered or left fullscreen
    Fullscreen {
        /// The client
        id: Xid,
        /// The new state
        on: bool,
    },
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let on_off = |on: &bool| if *on { "on" } else { "off" };

        match self {
            Self::FocusChanged { id, title } => write!(f, "focus_changed\t{id}\t{title}"),
            Self::WindowTitleChanged { id, title } => {
                write!(f, "window_title_changed\t{id}\t{title}")
            }
            Self::Urgent { id, on } => write!(f, "urgent\t{}\t{id}", on_off(on)),
            Self::Fullscreen { id, on } => write!(f, "fullscreen\t{}\t{id}", on_off(on)),
        }
    }
}

/// A fire and forget receiver of [HookEvent]s.
pub trait HookSink {
    /// Handle a single event
    fn emit(&mut self, event: &HookEvent);

    /// Convert to a trait object
    fn boxed(self) -> Box<dyn HookSink>
    where
        Self: Sized + 'static,
    {
        Box::new(self)
    }
}

impl fmt::Debug for Box<dyn HookSink> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookSink").finish()
    }
}

impl<F> HookSink for F
where
    F: FnMut(&HookEvent),
{
    fn emit(&mut self, event: &HookEvent) {
        (self)(event)
    }
}

/// Where a newly discovered window should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Whether the window should be managed at all
    pub manage: bool,
    /// The tag to place the client on. Defaults to the focused tag.
    pub tag: Option<String>,
    /// Whether the client should take focus. Defaults to [Config::focus_new][crate::Config].
    pub focus: Option<bool>,
    /// Whether the target tag should be brought into focus
    pub switch_tag: bool,
    /// Whether the client starts out fullscreen
    pub fullscreen: bool,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            manage: true,
            tag: None,
            focus: None,
            switch_tag: false,
            fullscreen: false,
        }
    }
}

/// Decide the [Placement] of a window that is about to become managed.
pub trait ManageHook<X>
where
    X: XConn,
{
    /// Run this hook
    fn call(&mut self, id: Xid, x: &X) -> Result<Placement>;

    /// Convert to a trait object
    fn boxed(self) -> Box<dyn ManageHook<X>>
    where
        Self: Sized + 'static,
    {
        Box::new(self)
    }
}

impl<X: XConn> fmt::Debug for Box<dyn ManageHook<X>> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManageHook").finish()
    }
}

impl<F, X> ManageHook<X> for F
where
    F: FnMut(Xid, &X) -> Result<Placement>,
    X: XConn,
{
    fn call(&mut self, id: Xid, x: &X) -> Result<Placement> {
        (self)(id, x)
    }
}
