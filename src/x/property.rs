//! Data types for working with X window properties
use crate::{pure::size_hints::SizeHints, Error, Result, Xid};
use bitflags::bitflags;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Known property types that should be returnable by XConn impls when they check
/// window properties.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Prop {
    /// One or more X Atoms
    Atom(Vec<String>),
    /// One or more cardinal numbers
    Cardinal(Vec<u32>),
    /// UTF-8 encoded string data
    UTF8String(Vec<String>),
    /// One or more X window IDs
    Window(Vec<Xid>),
    /// The WmHints properties for this window
    WmHints(WmHints),
    /// The WmNormalHints properties for this window
    WmNormalHints(WmNormalHints),
}

bitflags! {
    /// Possible flags that can be set in a WmHints client property
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WmHintsFlags: u32 {
        /// Input hint is set
        const INPUT_HINT         = 0b0000000001;
        /// State hint is set
        const STATE_HINT         = 0b0000000010;
        /// Icon pixmap hint is set
        const ICON_PIXMAP_HINT   = 0b0000000100;
        /// Icon window hint is set
        const ICON_WINDOW_HINT   = 0b0000001000;
        /// Icon position hint is set
        const ICON_POSITION_HINT = 0b0000010000;
        /// Icon mask hint is set
        const ICON_MASK_HINT     = 0b0000100000;
        /// Window group hint is set
        const WINDOW_GROUP_HINT  = 0b0001000000;
        // unused                  0b0010000000;
        /// Urgency hint is set
        const URGENCY_HINT       = 0b0100000000;
    }
}

bitflags! {
    /// Possible flags that can be set in a WmNormalHints client property
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WmNormalHintsFlags: u32 {
        /// User-specified x, y
        const U_POSITION    = 0b0000000001;
        /// User-specified width, height
        const U_SIZE        = 0b0000000010;
        /// Program-specified position
        const P_POSITION    = 0b0000000100;
        /// Program-specified size
        const P_SIZE        = 0b0000001000;
        /// Program-specified minimum size
        const P_MIN_SIZE    = 0b0000010000;
        /// Program-specified maximum size
        const P_MAX_SIZE    = 0b0000100000;
        /// Program-specified resize increments
        const P_RESIZE_INC  = 0b0001000000;
        /// Program-specified min and max aspect ratios
        const P_ASPECT      = 0b0010000000;
        /// Program-specified base size
        const P_BASE_SIZE   = 0b0100000000;
        /// Program-specified window gravity
        const P_WIN_GRAVITY = 0b1000000000;
    }
}

/// Client requested hints about information other than window geometry.
///
/// Only the input and urgency hints are interpreted: everything else is carried
/// through unchanged so that the property can be written back to the client
/// after toggling the urgency bit.
///
/// See the ICCCM [spec][1] for further details.
///
/// [1]: https://www.x.org/releases/X11R7.6/doc/xorg-docs/specs/ICCCM/icccm.html#wm_hints_property
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, PartialEq, Eq, Hash, Clone)]
pub struct WmHints {
    pub(crate) flags: WmHintsFlags,
    pub(crate) raw: [u32; 9],
}

impl WmHints {
    /// Try to construct a [WmHints] instance from raw bytes.
    ///
    /// This method expects a slice of 9 u32s corresponding to the C struct layout shown below.
    /// Clients written against pre-ICCCM Xlib omit the trailing window group and are
    /// accepted as well.
    ///
    /// ```C
    /// typedef struct {
    ///     long flags;
    ///     Bool input;
    ///     int initial_state;
    ///     Pixmap icon_pixmap;
    ///     Window icon_window;
    ///     int icon_x, icon_y;
    ///     Pixmap icon_mask;
    ///     XID window_group;
    /// } XWMHints;
    /// ```
    pub fn try_from_bytes(raw: &[u32]) -> Result<Self> {
        if raw.len() != 9 && raw.len() != 8 {
            return Err(Error::InvalidHints(format!(
                "raw bytes should be [u32; 9] for WmHints, got [u32; {}]",
                raw.len()
            )));
        }

        let mut buf = [0; 9];
        buf[..raw.len()].copy_from_slice(raw);

        Ok(Self {
            flags: WmHintsFlags::from_bits_truncate(buf[0]),
            raw: buf,
        })
    }

    /// Construct a minimal [WmHints] carrying only an input hint.
    pub fn with_input(accepts_input: bool) -> Self {
        let flags = WmHintsFlags::INPUT_HINT;
        let mut raw = [0; 9];
        raw[0] = flags.bits();
        raw[1] = accepts_input as u32;

        Self { flags, raw }
    }

    /// The value of the input hint if the client set one.
    pub fn accepts_input(&self) -> Option<bool> {
        if self.flags.contains(WmHintsFlags::INPUT_HINT) {
            Some(self.raw[1] > 0)
        } else {
            None
        }
    }

    /// Whether the urgency bit is set.
    pub fn is_urgent(&self) -> bool {
        self.flags.contains(WmHintsFlags::URGENCY_HINT)
    }

    /// These hints with the urgency bit set or cleared and every other field left
    /// untouched.
    pub fn with_urgency(&self, urgent: bool) -> Self {
        let mut flags = self.flags;
        flags.set(WmHintsFlags::URGENCY_HINT, urgent);
        let mut raw = self.raw;
        raw[0] = flags.bits();

        Self { flags, raw }
    }

    /// The wire representation of these hints.
    pub fn as_bytes(&self) -> [u32; 9] {
        self.raw
    }
}

/// Client requested hints about window geometry.
///
/// See the ICCCM [spec][1] for further details or the [Xlib manual][2] for more details of the
/// data format. Gravity is not honoured.
///
/// [1]: https://www.x.org/releases/X11R7.6/doc/xorg-docs/specs/ICCCM/icccm.html#wm_normal_hints_property
/// [2]: https://tronche.com/gui/x/xlib/ICC/client-to-window-manager/wm-normal-hints.html
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, PartialEq, Eq, Hash, Clone)]
pub struct WmNormalHints {
    pub(crate) flags: WmNormalHintsFlags,
    pub(crate) min: Option<(i32, i32)>,
    pub(crate) max: Option<(i32, i32)>,
    pub(crate) inc: Option<(i32, i32)>,
    pub(crate) min_aspect: Option<(i32, i32)>,
    pub(crate) max_aspect: Option<(i32, i32)>,
    pub(crate) base: Option<(i32, i32)>,
}

impl WmNormalHints {
    /// Try to construct a [WmNormalHints] instance from raw bytes.
    ///
    /// This method expects a slice of 18 u32s corresponding to the C struct layout shown below.
    /// The pre-ICCCM 15 element layout (without base size and gravity) is also accepted.
    ///
    /// ```C
    /// typedef struct {
    ///     long flags;
    ///     int x, y;                  /* Obsolete */
    ///     int width, height;         /* Obsolete */
    ///     int min_width, min_height;
    ///     int max_width, max_height;
    ///     int width_inc, height_inc;
    ///     struct {
    ///            int x;              /* numerator */
    ///            int y;              /* denominator */
    ///     } min_aspect, max_aspect;
    ///     int base_width, base_height;
    ///     int win_gravity;
    /// } XSizeHints;
    /// ```
    pub fn try_from_bytes(raw: &[u32]) -> Result<Self> {
        if raw.len() != 18 && raw.len() != 15 {
            return Err(Error::InvalidHints(format!(
                "raw bytes should be [u32; 18] for WmNormalHints, got [u32; {}]",
                raw.len()
            )));
        }

        let flags = WmNormalHintsFlags::from_bits_truncate(raw[0]);
        let pair = |flag: WmNormalHintsFlags, ix: usize| {
            if flags.contains(flag) && raw.len() > ix + 1 {
                Some((raw[ix] as i32, raw[ix + 1] as i32))
            } else {
                None
            }
        };

        Ok(Self {
            flags,
            min: pair(WmNormalHintsFlags::P_MIN_SIZE, 5),
            max: pair(WmNormalHintsFlags::P_MAX_SIZE, 7),
            inc: pair(WmNormalHintsFlags::P_RESIZE_INC, 9),
            min_aspect: pair(WmNormalHintsFlags::P_ASPECT, 11),
            max_aspect: pair(WmNormalHintsFlags::P_ASPECT, 13),
            base: pair(WmNormalHintsFlags::P_BASE_SIZE, 15),
        })
    }

    /// Derive the cached [SizeHints] for a client from these hints.
    ///
    /// A missing base size falls back to the minimum size and vice versa, as
    /// described in ICCCM 4.1.2.3.
    /// ```
    /// # use trellis::x::property::WmNormalHints;
    /// // P_MIN_SIZE only: 200x100
    /// let mut raw = [0; 18];
    /// raw[0] = 0b10000;
    /// raw[5] = 200;
    /// raw[6] = 100;
    ///
    /// let hints = WmNormalHints::try_from_bytes(&raw).unwrap().size_hints();
    ///
    /// assert_eq!((hints.base_w, hints.base_h), (200, 100));
    /// assert_eq!((hints.min_w, hints.min_h), (200, 100));
    /// ```
    pub fn size_hints(&self) -> SizeHints {
        let (base_w, base_h) = self.base.or(self.min).unwrap_or((0, 0));
        let (min_w, min_h) = self.min.or(self.base).unwrap_or((0, 0));
        let (inc_w, inc_h) = self.inc.unwrap_or((0, 0));
        let (max_w, max_h) = self.max.unwrap_or((0, 0));

        let (min_aspect, max_aspect) = match (self.min_aspect, self.max_aspect) {
            (Some((min_x, min_y)), Some((max_x, max_y))) if min_x != 0 && max_y != 0 => {
                (min_y as f32 / min_x as f32, max_x as f32 / max_y as f32)
            }
            _ => (0.0, 0.0),
        };

        SizeHints {
            base_w,
            base_h,
            inc_w,
            inc_h,
            min_w,
            min_h,
            max_w,
            max_h,
            min_aspect,
            max_aspect,
        }
    }
}
