//! The state tracked for each managed client window.
use crate::{
    decoration::Decoration,
    pure::{geometry::Rect, size_hints::SizeHints},
    Error, Result, Xid,
};
use bitflags::bitflags;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{AsRefStr, EnumIter, EnumString};

bitflags! {
    /// State and per-client policy flags.
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClientFlags: u16 {
        /// The client is demanding attention
        const URGENT = 1 << 0;
        /// The client covers its monitor
        const FULLSCREEN = 1 << 1;
        /// The fullscreen state last published through _NET_WM_STATE
        const EWMH_FULLSCREEN = 1 << 2;
        /// The client is tiled but keeps its floating size
        const PSEUDOTILE = 1 << 3;
        /// The client does not accept input focus
        const NEVER_FOCUS = 1 << 4;
        /// The client is being moved or resized interactively
        const DRAGGED = 1 << 5;
        /// Respect the size hints of the client
        const SIZE_HINTS = 1 << 6;
        /// Honour EWMH requests from the client
        const EWMH_REQUESTS = 1 << 7;
        /// Publish EWMH state changes for the client
        const EWMH_NOTIFY = 1 << 8;
    }
}

impl Default for ClientFlags {
    fn default() -> Self {
        Self::SIZE_HINTS | Self::EWMH_REQUESTS | Self::EWMH_NOTIFY
    }
}

/// The client properties that can be read and written by name.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(AsRefStr, EnumString, EnumIter, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[strum(serialize_all = "lowercase")]
pub enum ClientProp {
    /// See [ClientFlags::FULLSCREEN]
    Fullscreen,
    /// See [ClientFlags::PSEUDOTILE]
    Pseudotile,
    /// See [ClientFlags::URGENT]
    Urgent,
    /// See [ClientFlags::SIZE_HINTS]
    SizeHints,
    /// See [ClientFlags::EWMH_REQUESTS]
    EwmhRequests,
    /// See [ClientFlags::EWMH_NOTIFY]
    EwmhNotify,
}

impl ClientProp {
    /// Look up a property by name.
    /// ```
    /// # use trellis::core::ClientProp;
    /// assert_eq!(ClientProp::from_name("sizehints").unwrap(), ClientProp::SizeHints);
    /// ```
    pub fn from_name(name: &str) -> Result<Self> {
        Self::from_str(name).map_err(|_| Error::UnknownClientProp(name.to_owned()))
    }

    /// The flag backing this property.
    pub fn flag(&self) -> ClientFlags {
        match self {
            Self::Fullscreen => ClientFlags::FULLSCREEN,
            Self::Pseudotile => ClientFlags::PSEUDOTILE,
            Self::Urgent => ClientFlags::URGENT,
            Self::SizeHints => ClientFlags::SIZE_HINTS,
            Self::EwmhRequests => ClientFlags::EWMH_REQUESTS,
            Self::EwmhNotify => ClientFlags::EWMH_NOTIFY,
        }
    }
}

/// A managed client window.
#[derive(Debug, Clone, PartialEq)]
pub struct Client {
    pub(crate) id: Xid,
    pub(crate) pid: Option<u32>,
    pub(crate) title: String,
    pub(crate) tag: String,
    pub(crate) float_size: Rect,
    pub(crate) last_size: Rect,
    pub(crate) last_border_width: i32,
    pub(crate) hints: SizeHints,
    pub(crate) flags: ClientFlags,
    pub(crate) dec: Decoration,
}

impl Client {
    pub(crate) fn new(id: Xid, tag: impl Into<String>, float_size: Rect, dec: Decoration) -> Self {
        Self {
            id,
            pid: None,
            title: String::new(),
            tag: tag.into(),
            float_size,
            last_size: dec.last_actual,
            last_border_width: 0,
            hints: SizeHints::default(),
            flags: ClientFlags::default(),
            dec,
        }
    }

    /// The client window.
    pub fn id(&self) -> Xid {
        self.id
    }

    /// The process id reported through _NET_WM_PID.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// The window title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The tag the client is on.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The rectangle used when the client is floating, relative to its monitor.
    pub fn float_size(&self) -> Rect {
        self.float_size
    }

    /// The content rectangle last applied to the client, relative to its frame.
    pub fn last_size(&self) -> Rect {
        self.last_size
    }

    /// The cached size hints.
    pub fn size_hints(&self) -> &SizeHints {
        &self.hints
    }

    /// The decoration of this client.
    pub fn decoration(&self) -> &Decoration {
        &self.dec
    }

    /// All flags currently set.
    pub fn flags(&self) -> ClientFlags {
        self.flags
    }

    /// The current value of a named property.
    pub fn prop(&self, prop: ClientProp) -> bool {
        self.flags.contains(prop.flag())
    }

    /// Whether the client is demanding attention.
    pub fn is_urgent(&self) -> bool {
        self.flags.contains(ClientFlags::URGENT)
    }

    /// Whether the client covers its monitor.
    pub fn is_fullscreen(&self) -> bool {
        self.flags.contains(ClientFlags::FULLSCREEN)
    }

    /// Whether the client is pseudotiled.
    pub fn is_pseudotile(&self) -> bool {
        self.flags.contains(ClientFlags::PSEUDOTILE)
    }

    /// Whether the client refuses input focus.
    pub fn never_focus(&self) -> bool {
        self.flags.contains(ClientFlags::NEVER_FOCUS)
    }

    /// Whether the client is being dragged.
    pub fn is_dragged(&self) -> bool {
        self.flags.contains(ClientFlags::DRAGGED)
    }
}
