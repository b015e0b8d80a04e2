//! Settings that control how clients are placed and decorated.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The user facing settings of the client registry and decoration renderer.
///
/// All fields have sensible defaults so the usual way to build a [Config] is
/// with struct update syntax:
/// ```
/// # use trellis::Config;
/// let config = Config {
///     window_radius: 8,
///     raise_on_focus: true,
///     ..Default::default()
/// };
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// The slack in pixels that content smaller than its inner rectangle needs
    /// on an axis before it is centered on that axis.
    pub pseudotile_center_threshold: i32,
    /// Whether clients are reconfigured while they are being dragged rather
    /// than only when the drag ends.
    pub update_dragged_clients: bool,
    /// Radius of the rounded corners of every frame. Zero disables rounding.
    pub window_radius: i32,
    /// Raise clients to the top of their stack when they gain focus.
    pub raise_on_focus: bool,
    /// The number of pixels of a floating client that are kept on its monitor.
    pub monitor_float_threshold: i32,
    /// Whether newly managed clients take focus unless a manage hook says otherwise.
    pub focus_new: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pseudotile_center_threshold: 10,
            update_dragged_clients: false,
            window_radius: 0,
            raise_on_focus: false,
            monitor_float_threshold: 24,
            focus_new: true,
        }
    }
}
