//! Helpers and utilities for using x11rb as a back end for trellis
//!
//! The [X11rbConn] type implements [XConn][crate::x::XConn] on top of any
//! x11rb [Connection][::x11rb::connection::Connection], using the SHAPE
//! extension for rounded frame corners.
use crate::Result;
use ::x11rb::rust_connection::RustConnection;

mod atom;
pub mod xconn;

#[doc(inline)]
pub use xconn::X11rbConn;

/// Connect to the X server named by `$DISPLAY` using the pure Rust x11rb
/// connection.
pub fn connect() -> Result<X11rbConn<RustConnection>> {
    let (conn, screen) = RustConnection::connect(None).map_err(X11rbError::from)?;

    X11rbConn::new_for_connection(conn, screen)
}

/// Enum to store the various ways that operations can fail inside of the
/// x11rb implementation of [XConn][crate::x::XConn].
#[derive(thiserror::Error, Debug)]
pub enum X11rbError {
    /// Unable to establish a connection to the X server
    #[error(transparent)]
    Connect(#[from] ::x11rb::errors::ConnectError),

    /// The X11 connection broke
    #[error(transparent)]
    Connection(#[from] ::x11rb::errors::ConnectionError),

    /// Could not get X11 request reply
    #[error(transparent)]
    ReplyError(#[from] ::x11rb::errors::ReplyError),

    /// Could not get X11 request reply or could not generate_id()
    #[error(transparent)]
    ReplyOrIdError(#[from] ::x11rb::errors::ReplyOrIdError),

    /// The X server does not support the SHAPE extension
    #[error("the X server does not support the SHAPE extension")]
    MissingShapeSupport,

    /// A property was set with a type this backend can not write
    #[error("unable to write property '{0}': unsupported property type")]
    UnsupportedProp(String),
}
