//! trellis: the client and decoration core of a tiling window manager
//!
//! This crate tracks every managed top level window (a [Client][core::Client]),
//! keeps its geometry consistent with what the X server has been told, and
//! renders the decoration frame drawn around it.
//!
//! The crate is split in the same way as the rest of the window manager:
//!
//!   - [pure] holds side effect free data: geometry, ICCCM size hint resolution
//!     and the per-tag stacking order.
//!   - [theme] holds the decoration schemes and the relation table used to mirror
//!     edits between them.
//!   - [decoration] implements the resize / repaint protocol run for each
//!     geometry change of a client.
//!   - [core] owns the client registry and drives manage, unmanage and focus.
//!   - [x] is the seam to the X server: everything that talks to the display goes
//!     through the [XConn][x::XConn] trait.
//!   - `x11rb` (behind the default `x11rb` feature) implements [XConn][x::XConn]
//!     using the x11rb crate.
//!
//! The tiling layout algorithm, event dispatch and rule parsing are external to
//! this crate and are consumed through the traits in [core::layout] and
//! [core::hooks].
#![warn(
    clippy::complexity,
    clippy::correctness,
    clippy::style,
    future_incompatible,
    missing_debug_implementations,
    missing_docs,
    rust_2018_idioms,
    rustdoc::all
)]
#![allow(clippy::too_many_arguments)]

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::{fmt, ops::Deref};

pub mod core;
pub mod decoration;
pub mod pure;
pub mod theme;
pub mod x;

#[cfg(feature = "x11rb")]
pub mod x11rb;

#[doc(inline)]
pub use crate::core::{Client, ClientRegistry, Config, State};
#[doc(inline)]
pub use pure::geometry::{Margins, Point, Rect};
#[doc(inline)]
pub use theme::{DecorationScheme, Theme};

/// Error variants from the core trellis library.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A hex color code or color name could not be parsed
    #[error("invalid color: '{0}'")]
    InvalidColor(String),

    /// A value written to a scheme attribute did not parse for that attribute
    #[error("invalid value '{value}' for attribute '{attr}'")]
    InvalidAttributeValue {
        /// The attribute being written
        attr: String,
        /// The raw value that was rejected
        value: String,
    },

    /// Raw hint data from a client did not have the expected layout
    #[error("invalid hints: {0}")]
    InvalidHints(String),

    /// A client property was requested but was not set on the window
    #[error("'{0}' prop is not set for client {1}")]
    MissingProp(String, Xid),

    /// There was an attempt to operate on a client that is not managed
    #[error("{0} is not a known client")]
    UnknownClient(Xid),

    /// A client property name did not match any known property
    #[error("'{0}' is not a known client property")]
    UnknownClientProp(String),

    /// An attribute name did not match any attribute of a decoration scheme
    #[error("'{0}' is not a known scheme attribute")]
    UnknownAttribute(String),

    /// A theme path did not resolve to a decoration scheme
    #[error("'{0}' is not a known theme object")]
    UnknownThemePath(String),

    /// An error from the x11rb backed [XConn][x::XConn] implementation
    #[cfg(feature = "x11rb")]
    #[error(transparent)]
    X11rb(#[from] crate::x11rb::X11rbError),

    /// A generic error type for use in user code when needing to construct
    /// a simple [Error].
    #[error("Unhandled error: {0}")]
    Custom(String),
}

/// A Result where the error type is a trellis [Error]
pub type Result<T> = std::result::Result<T, Error>;

/// An X11 ID for a given resource
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Xid(pub(crate) u32);

impl fmt::Display for Xid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl Deref for Xid {
    type Target = u32;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<u32> for Xid {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<Xid> for u32 {
    fn from(id: Xid) -> Self {
        id.0
    }
}

/// A simple RGB based color
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    rgb_hex: u32,
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Color(#{:06x})", self.rgb_hex)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.rgb_hex)
    }
}

impl Color {
    /// The color every scheme color is set to on reset.
    pub const BLACK: Color = Color::new_from_hex(0x000000);

    /// Create a new Color from a hex encoded u32: 0xRRGGBB
    pub const fn new_from_hex(rgb_hex: u32) -> Self {
        Self {
            rgb_hex: rgb_hex & 0xFFFFFF,
        }
    }

    /// The RGB information of this color as 0.0-1.0 range floats representing
    /// proportions of 255 for each of R, G, B
    pub fn rgb(&self) -> (f64, f64, f64) {
        let r = ((self.rgb_hex & 0xFF0000) >> 16) as f64 / 255.0;
        let g = ((self.rgb_hex & 0x00FF00) >> 8) as f64 / 255.0;
        let b = (self.rgb_hex & 0x0000FF) as f64 / 255.0;

        (r, g, b)
    }

    /// Render this color as a packed 0xRRGGBB pixel value suitable for a
    /// TrueColor visual.
    pub fn rgb_u32(&self) -> u32 {
        self.rgb_hex
    }
}

impl From<u32> for Color {
    fn from(hex: u32) -> Self {
        Self::new_from_hex(hex)
    }
}

// The handful of X color names used by the default theme plus anything in
// '#rrggbb' or '0xrrggbb' form.
impl TryFrom<&str> for Color {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        let named = match s.to_ascii_lowercase().as_str() {
            "black" => Some(0x000000),
            "white" => Some(0xffffff),
            "red" => Some(0xff0000),
            "green" => Some(0x00ff00),
            "blue" => Some(0x0000ff),
            "orange" => Some(0xffa500),
            "gray" | "grey" => Some(0xbebebe),
            _ => None,
        };

        if let Some(hex) = named {
            return Ok(Self::new_from_hex(hex));
        }

        let hex = s
            .strip_prefix('#')
            .or_else(|| s.strip_prefix("0x"))
            .ok_or_else(|| Error::InvalidColor(s.to_owned()))?;

        if hex.len() != 6 {
            return Err(Error::InvalidColor(s.to_owned()));
        }

        u32::from_str_radix(hex, 16)
            .map(Self::new_from_hex)
            .map_err(|_| Error::InvalidColor(s.to_owned()))
    }
}

impl TryFrom<String> for Color {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::try_from(s.as_str())
    }
}
