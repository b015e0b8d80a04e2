//! Side effect free management of internal window manager state
pub mod geometry;
pub mod size_hints;
pub mod stack;

#[doc(inline)]
pub use geometry::{Margins, Point, Rect};
#[doc(inline)]
pub use size_hints::SizeHints;
#[doc(inline)]
pub use stack::{ClientStack, Layer};
