//! A single decoration scheme and its typed attribute table.
use crate::{pure::geometry::Rect, Color, Error, Result};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use strum::{AsRefStr, EnumIter, EnumString};

/// The largest width or padding, in pixels, a scheme accepts.
pub const MAX_WIDTH: i32 = u16::MAX as i32;

/// The visual style of the frame drawn around a client.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecorationScheme {
    /// Width of the border in pixels, drawn on every side
    pub border_width: i32,
    /// Color of the border
    pub border_color: Color,
    /// Fill the inner rectangle exactly rather than centering the client in it
    pub tight_decoration: bool,
    /// Width of the inner border drawn directly around the content
    pub inner_width: i32,
    /// Color of the inner border
    pub inner_color: Color,
    /// Width of the outer border drawn along the edge of the frame
    pub outer_width: i32,
    /// Color of the outer border
    pub outer_color: Color,
    /// Extra space between the border and the content above the client
    pub padding_top: i32,
    /// Extra space between the border and the content right of the client
    pub padding_right: i32,
    /// Extra space between the border and the content below the client
    pub padding_bottom: i32,
    /// Extra space between the border and the content left of the client
    pub padding_left: i32,
    /// Color used for the part of the inner rectangle not covered by the client
    pub background_color: Color,
}

impl DecorationScheme {
    /// The content area inside a frame outline drawn with this scheme.
    ///
    /// Paddings larger than the outline produce a negative width or height.
    /// ```
    /// # use trellis::{theme::DecorationScheme, Rect};
    /// let s = DecorationScheme { border_width: 2, padding_left: 3, ..Default::default() };
    ///
    /// assert_eq!(
    ///     s.outline_to_inner_rect(Rect::new(0, 0, 100, 50)),
    ///     Rect::new(5, 2, 93, 46)
    /// );
    /// ```
    pub fn outline_to_inner_rect(&self, r: Rect) -> Rect {
        let bw = self.border_width;

        Rect {
            x: r.x.saturating_add(bw).saturating_add(self.padding_left),
            y: r.y.saturating_add(bw).saturating_add(self.padding_top),
            w: r
                .w
                .saturating_sub(bw.saturating_mul(2))
                .saturating_sub(self.padding_left)
                .saturating_sub(self.padding_right),
            h: r
                .h
                .saturating_sub(bw.saturating_mul(2))
                .saturating_sub(self.padding_top)
                .saturating_sub(self.padding_bottom),
        }
    }

    /// The frame outline needed to surround the given content area. This is the
    /// exact inverse of [DecorationScheme::outline_to_inner_rect].
    pub fn inner_rect_to_outline(&self, r: Rect) -> Rect {
        let bw = self.border_width;

        Rect {
            x: r.x.saturating_sub(bw).saturating_sub(self.padding_left),
            y: r.y.saturating_sub(bw).saturating_sub(self.padding_top),
            w: r
                .w
                .saturating_add(bw.saturating_mul(2))
                .saturating_add(self.padding_left)
                .saturating_add(self.padding_right),
            h: r
                .h
                .saturating_add(bw.saturating_mul(2))
                .saturating_add(self.padding_top)
                .saturating_add(self.padding_bottom),
        }
    }

    /// Read a single attribute.
    pub fn get(&self, attr: SchemeAttr) -> AttrValue {
        if let Some(v) = self.int_slot(attr) {
            return AttrValue::Int(*v);
        }
        if let Some(c) = self.color_slot(attr) {
            return AttrValue::Color(*c);
        }

        AttrValue::Bool(self.tight_decoration)
    }

    /// Write a single attribute, returning whether the stored value changed.
    ///
    /// Values of the wrong kind for `attr` and widths outside of
    /// `0..=`[MAX_WIDTH] are rejected.
    pub fn set(&mut self, attr: SchemeAttr, val: AttrValue) -> Result<bool> {
        let changed = match val {
            AttrValue::Int(v) if !(0..=MAX_WIDTH).contains(&v) => {
                return Err(mismatch(attr, val))
            }
            AttrValue::Int(v) => match self.int_slot_mut(attr) {
                Some(slot) => std::mem::replace(slot, v) != v,
                None => return Err(mismatch(attr, val)),
            },
            AttrValue::Color(c) => match self.color_slot_mut(attr) {
                Some(slot) => std::mem::replace(slot, c) != c,
                None => return Err(mismatch(attr, val)),
            },
            AttrValue::Bool(b) if attr == SchemeAttr::TightDecoration => {
                std::mem::replace(&mut self.tight_decoration, b) != b
            }
            AttrValue::Bool(_) => return Err(mismatch(attr, val)),
        };

        Ok(changed)
    }

    fn int_slot(&self, attr: SchemeAttr) -> Option<&i32> {
        match attr {
            SchemeAttr::BorderWidth => Some(&self.border_width),
            SchemeAttr::PaddingTop => Some(&self.padding_top),
            SchemeAttr::PaddingRight => Some(&self.padding_right),
            SchemeAttr::PaddingBottom => Some(&self.padding_bottom),
            SchemeAttr::PaddingLeft => Some(&self.padding_left),
            SchemeAttr::InnerWidth => Some(&self.inner_width),
            SchemeAttr::OuterWidth => Some(&self.outer_width),
            _ => None,
        }
    }

    fn int_slot_mut(&mut self, attr: SchemeAttr) -> Option<&mut i32> {
        match attr {
            SchemeAttr::BorderWidth => Some(&mut self.border_width),
            SchemeAttr::PaddingTop => Some(&mut self.padding_top),
            SchemeAttr::PaddingRight => Some(&mut self.padding_right),
            SchemeAttr::PaddingBottom => Some(&mut self.padding_bottom),
            SchemeAttr::PaddingLeft => Some(&mut self.padding_left),
            SchemeAttr::InnerWidth => Some(&mut self.inner_width),
            SchemeAttr::OuterWidth => Some(&mut self.outer_width),
            _ => None,
        }
    }

    fn color_slot(&self, attr: SchemeAttr) -> Option<&Color> {
        match attr {
            SchemeAttr::Color => Some(&self.border_color),
            SchemeAttr::InnerColor => Some(&self.inner_color),
            SchemeAttr::OuterColor => Some(&self.outer_color),
            SchemeAttr::BackgroundColor => Some(&self.background_color),
            _ => None,
        }
    }

    fn color_slot_mut(&mut self, attr: SchemeAttr) -> Option<&mut Color> {
        match attr {
            SchemeAttr::Color => Some(&mut self.border_color),
            SchemeAttr::InnerColor => Some(&mut self.inner_color),
            SchemeAttr::OuterColor => Some(&mut self.outer_color),
            SchemeAttr::BackgroundColor => Some(&mut self.background_color),
            _ => None,
        }
    }

    /// Parse `raw` as a value for `attr` and write it.
    pub fn set_from_str(&mut self, attr: SchemeAttr, raw: &str) -> Result<bool> {
        let val = AttrValue::parse(attr, raw)?;
        self.set(attr, val)
    }
}

fn mismatch(attr: SchemeAttr, val: AttrValue) -> Error {
    Error::InvalidAttributeValue {
        attr: attr.as_ref().to_owned(),
        value: val.to_string(),
    }
}

/// The editable attributes of a [DecorationScheme].
///
/// Names are only resolved at the edge of the crate through [FromStr]: everything
/// internal addresses attributes by variant.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(AsRefStr, EnumString, EnumIter, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[strum(serialize_all = "snake_case")]
pub enum SchemeAttr {
    /// border_width
    BorderWidth,
    /// padding_top
    PaddingTop,
    /// padding_right
    PaddingRight,
    /// padding_bottom
    PaddingBottom,
    /// padding_left
    PaddingLeft,
    /// color
    Color,
    /// inner_width
    InnerWidth,
    /// inner_color
    InnerColor,
    /// outer_width
    OuterWidth,
    /// outer_color
    OuterColor,
    /// background_color
    BackgroundColor,
    /// tight_decoration
    TightDecoration,
}

impl SchemeAttr {
    /// Look up an attribute by name.
    pub fn from_name(name: &str) -> Result<Self> {
        Self::from_str(name).map_err(|_| Error::UnknownAttribute(name.to_owned()))
    }
}

/// A typed value of a [SchemeAttr].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrValue {
    /// A width or padding in pixels
    Int(i32),
    /// A color
    Color(Color),
    /// A flag
    Bool(bool),
}

impl AttrValue {
    /// Parse `raw` into the kind of value held by `attr`.
    pub fn parse(attr: SchemeAttr, raw: &str) -> Result<Self> {
        let invalid = || Error::InvalidAttributeValue {
            attr: attr.as_ref().to_owned(),
            value: raw.to_owned(),
        };

        match DecorationScheme::default().get(attr) {
            AttrValue::Int(_) => raw
                .trim()
                .parse::<u16>()
                .map(|v| Self::Int(v as i32))
                .map_err(|_| invalid()),
            AttrValue::Color(_) => Color::try_from(raw.trim())
                .map(Self::Color)
                .map_err(|_| invalid()),
            AttrValue::Bool(_) => match raw.trim() {
                "true" | "on" | "1" => Ok(Self::Bool(true)),
                "false" | "off" | "0" => Ok(Self::Bool(false)),
                _ => Err(invalid()),
            },
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Color(c) => write!(f, "{c}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}
