//! Decoration schemes grouped into triples and the relation table used to
//! mirror edits between them.
//!
//! A [Theme] holds one [DecTriple] for each [SchemeKind]. Every triple also has
//! an aggregate scheme: writing an attribute of the aggregate writes the same
//! attribute of all three moods. On top of that the theme root and its three
//! per-mood "meta" schemes fan writes out further:
//!
//! ```text
//! theme ──┬─> theme.normal ─┬─> tiling.normal
//!         │                 └─> floating.normal
//!         ├─> theme.active ─┬─> tiling.active
//!         │                 └─> floating.active
//!         └─> theme.urgent ─┬─> tiling.urgent
//!                           └─> floating.urgent
//!
//! theme.<kind> ──> <kind>.normal, <kind>.active, <kind>.urgent
//! ```
//!
//! All writes go through [Theme::set] which applies the value and then walks
//! the relation table, so there is exactly one place where propagation happens.
use crate::{Color, Error, Result};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator};
use tracing::{debug, trace};

pub mod scheme;

#[doc(inline)]
pub use scheme::{AttrValue, DecorationScheme, SchemeAttr, MAX_WIDTH};

/// The named decoration triples.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(AsRefStr, EnumString, EnumIter, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[strum(serialize_all = "snake_case")]
pub enum SchemeKind {
    /// Clients placed by the tiling layout
    Tiling,
    /// Floating clients
    Floating,
    /// Fullscreen clients
    Fullscreen,
    /// Clients that should be decorated as little as possible
    Minimal,
}

/// The variant of a triple used for a client.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(AsRefStr, EnumString, EnumIter, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[strum(serialize_all = "snake_case")]
pub enum Mood {
    /// Unfocused clients
    Normal,
    /// The focused client
    Active,
    /// Clients demanding attention
    Urgent,
}

/// The normal, active and urgent schemes of a single [SchemeKind].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecTriple {
    /// Used for unfocused clients
    pub normal: DecorationScheme,
    /// Used for the focused client
    pub active: DecorationScheme,
    /// Used for clients with the urgent flag set, focused or not
    pub urgent: DecorationScheme,
}

impl DecTriple {
    fn uniform(border_width: i32, colors: [u32; 3], tight_decoration: bool) -> Self {
        let scheme = |hex| DecorationScheme {
            border_width,
            border_color: Color::new_from_hex(hex),
            tight_decoration,
            ..Default::default()
        };

        Self {
            normal: scheme(colors[0]),
            active: scheme(colors[1]),
            urgent: scheme(colors[2]),
        }
    }

    /// The scheme for a client in the given state. Urgency takes priority over focus.
    pub fn select(&self, urgent: bool, focused: bool) -> &DecorationScheme {
        self.get(Mood::select(urgent, focused))
    }

    /// The scheme for the given mood.
    pub fn get(&self, mood: Mood) -> &DecorationScheme {
        match mood {
            Mood::Normal => &self.normal,
            Mood::Active => &self.active,
            Mood::Urgent => &self.urgent,
        }
    }

    fn get_mut(&mut self, mood: Mood) -> &mut DecorationScheme {
        match mood {
            Mood::Normal => &mut self.normal,
            Mood::Active => &mut self.active,
            Mood::Urgent => &mut self.urgent,
        }
    }
}

impl Mood {
    /// The mood of a client in the given state. Urgency takes priority over focus.
    pub fn select(urgent: bool, focused: bool) -> Self {
        match (urgent, focused) {
            (true, _) => Mood::Urgent,
            (false, true) => Mood::Active,
            (false, false) => Mood::Normal,
        }
    }
}

/// An editable scheme within a [Theme].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemeRef {
    /// A concrete scheme used for drawing: `theme.<kind>.<mood>`
    Mood(SchemeKind, Mood),
    /// The aggregate of a triple: `theme.<kind>`
    Triple(SchemeKind),
    /// The theme root (`None`) or one of its meta schemes: `theme` / `theme.<mood>`
    Theme(Option<Mood>),
}

impl SchemeRef {
    /// Resolve a dotted object path such as `theme.tiling.active`.
    ///
    /// ```
    /// # use trellis::theme::{Mood, SchemeKind, SchemeRef};
    /// assert_eq!(SchemeRef::from_path("theme").unwrap(), SchemeRef::Theme(None));
    /// assert_eq!(
    ///     SchemeRef::from_path("theme.floating.urgent").unwrap(),
    ///     SchemeRef::Mood(SchemeKind::Floating, Mood::Urgent)
    /// );
    /// ```
    pub fn from_path(path: &str) -> Result<Self> {
        let unknown = || Error::UnknownThemePath(path.to_owned());
        let parts: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();

        match parts.as_slice() {
            ["theme"] => Ok(Self::Theme(None)),
            ["theme", name] => {
                if let Ok(mood) = name.parse::<Mood>() {
                    Ok(Self::Theme(Some(mood)))
                } else {
                    name.parse().map(Self::Triple).map_err(|_| unknown())
                }
            }
            ["theme", kind, mood] => {
                let kind = kind.parse().map_err(|_| unknown())?;
                let mood = mood.parse().map_err(|_| unknown())?;

                Ok(Self::Mood(kind, mood))
            }
            _ => Err(unknown()),
        }
    }
}

/// The full set of decoration schemes along with the aggregate and meta schemes
/// used to edit several of them at once.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    triples: HashMap<SchemeKind, DecTriple>,
    // last values written through an aggregate or meta scheme
    aggregates: HashMap<SchemeKind, DecorationScheme>,
    meta: HashMap<Mood, DecorationScheme>,
    root: DecorationScheme,
    #[cfg_attr(feature = "serde", serde(skip, default = "mirror_table"))]
    mirrors: HashMap<SchemeRef, Vec<SchemeRef>>,
}

impl Default for Theme {
    fn default() -> Self {
        let triples = HashMap::from([
            (
                SchemeKind::Tiling,
                DecTriple::uniform(2, [0x000000, 0x00ff00, 0xffa500], false),
            ),
            (
                SchemeKind::Fullscreen,
                DecTriple::uniform(0, [0x000000, 0x000000, 0x000000], false),
            ),
            (SchemeKind::Floating, {
                let mut t = DecTriple::uniform(1, [0x000000, 0x00ff00, 0xffa500], true);
                t.active.border_width = 4;
                t
            }),
            (
                SchemeKind::Minimal,
                DecTriple::uniform(0, [0x000000, 0x00ff00, 0xffa500], true),
            ),
        ]);

        let base = triples[&SchemeKind::Fullscreen].normal;

        Self {
            triples,
            aggregates: SchemeKind::iter()
                .map(|k| (k, DecorationScheme::default()))
                .collect(),
            meta: Mood::iter().map(|m| (m, base)).collect(),
            root: base,
            mirrors: mirror_table(),
        }
    }
}

// Which schemes a write to each scheme is copied to.
fn mirror_table() -> HashMap<SchemeRef, Vec<SchemeRef>> {
    let mut table = HashMap::new();

    for kind in SchemeKind::iter() {
        let moods = Mood::iter().map(|m| SchemeRef::Mood(kind, m)).collect();
        table.insert(SchemeRef::Triple(kind), moods);
    }

    for mood in Mood::iter() {
        let members = [SchemeKind::Tiling, SchemeKind::Floating]
            .into_iter()
            .map(|k| SchemeRef::Mood(k, mood))
            .collect();
        table.insert(SchemeRef::Theme(Some(mood)), members);
    }

    let meta = [Mood::Active, Mood::Normal, Mood::Urgent]
        .into_iter()
        .map(|m| SchemeRef::Theme(Some(m)))
        .collect();
    table.insert(SchemeRef::Theme(None), meta);

    table
}

impl Theme {
    /// Create a new [Theme] populated with the default schemes.
    pub fn new() -> Self {
        Self::default()
    }

    /// The triple for the given kind.
    pub fn triple(&self, kind: SchemeKind) -> &DecTriple {
        &self.triples[&kind]
    }

    /// The concrete scheme for a kind and mood.
    pub fn scheme(&self, kind: SchemeKind, mood: Mood) -> &DecorationScheme {
        self.triple(kind).get(mood)
    }

    /// The schemes that a write to `r` is mirrored to.
    pub fn mirrors(&self, r: SchemeRef) -> &[SchemeRef] {
        self.mirrors.get(&r).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Read an attribute of any scheme in the theme.
    ///
    /// Aggregate and meta schemes report the value last written through them.
    pub fn get(&self, r: SchemeRef, attr: SchemeAttr) -> AttrValue {
        self.scheme_for(r).get(attr)
    }

    fn scheme_for(&self, r: SchemeRef) -> &DecorationScheme {
        match r {
            SchemeRef::Mood(kind, mood) => self.scheme(kind, mood),
            SchemeRef::Triple(kind) => &self.aggregates[&kind],
            SchemeRef::Theme(Some(mood)) => &self.meta[&mood],
            SchemeRef::Theme(None) => &self.root,
        }
    }

    fn scheme_for_mut(&mut self, r: SchemeRef) -> &mut DecorationScheme {
        match r {
            SchemeRef::Mood(kind, mood) => self.triples.entry(kind).or_default().get_mut(mood),
            SchemeRef::Triple(kind) => self.aggregates.entry(kind).or_default(),
            SchemeRef::Theme(Some(mood)) => self.meta.entry(mood).or_default(),
            SchemeRef::Theme(None) => &mut self.root,
        }
    }

    /// Write an attribute and mirror it to every scheme reachable from `r`
    /// through the relation table.
    ///
    /// Returns the concrete schemes whose value changed: the caller is
    /// responsible for re-applying those to any clients currently using them.
    /// A value of the wrong kind for `attr` is rejected before anything is written.
    pub fn set(
        &mut self,
        r: SchemeRef,
        attr: SchemeAttr,
        val: AttrValue,
    ) -> Result<Vec<(SchemeKind, Mood)>> {
        // reject mismatched kinds up front so that a failed write leaves no trace
        DecorationScheme::default().set(attr, val)?;

        let mut touched = Vec::new();
        let mut visited = HashSet::new();
        let mut pending = vec![r];

        while let Some(target) = pending.pop() {
            if !visited.insert(target) {
                continue;
            }

            let changed = self.scheme_for_mut(target).set(attr, val)?;
            trace!(?target, attr = attr.as_ref(), %val, changed, "writing scheme attribute");

            if let SchemeRef::Mood(kind, mood) = target {
                if changed {
                    touched.push((kind, mood));
                }
            }

            pending.extend(self.mirrors(target).iter().rev());
        }

        debug!(?r, attr = attr.as_ref(), n_touched = touched.len(), "scheme attribute set");
        Ok(touched)
    }

    /// Parse and write an attribute, addressing both the scheme and the attribute by name.
    pub fn set_by_name(
        &mut self,
        path: &str,
        attr: &str,
        raw: &str,
    ) -> Result<Vec<(SchemeKind, Mood)>> {
        let r = SchemeRef::from_path(path)?;
        let attr = SchemeAttr::from_name(attr)?;
        let val = AttrValue::parse(attr, raw)?;

        self.set(r, attr, val)
    }

    /// Reset a scheme: every numeric attribute is written as 0 and every color
    /// as black, with each write mirrored in the same way as [Theme::set].
    pub fn reset(&mut self, r: SchemeRef) -> Result<Vec<(SchemeKind, Mood)>> {
        let mut touched = Vec::new();

        for attr in SchemeAttr::iter() {
            let val = match DecorationScheme::default().get(attr) {
                AttrValue::Int(_) => AttrValue::Int(0),
                AttrValue::Color(_) => AttrValue::Color(Color::BLACK),
                AttrValue::Bool(_) => continue,
            };

            for t in self.set(r, attr, val)? {
                if !touched.contains(&t) {
                    touched.push(t);
                }
            }
        }

        Ok(touched)
    }
}
