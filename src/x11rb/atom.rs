use crate::x::Atom;
use ::x11rb::{connection::Connection, errors::ReplyError, protocol::xproto::ConnectionExt};
use std::{cell::RefCell, collections::HashMap};
use strum::IntoEnumIterator;

/// A two way cache of interned atoms.
#[derive(Debug, Default)]
pub(crate) struct Atoms {
    by_name: RefCell<HashMap<String, u32>>,
    by_id: RefCell<HashMap<u32, String>>,
}

impl Atoms {
    /// Intern every known [Atom] up front.
    pub(crate) fn new(conn: &impl Connection) -> Result<Self, ReplyError> {
        // send all requests before reading any replies so this is a single round trip
        let cookies = Atom::iter()
            .map(|atom| Ok((atom, conn.intern_atom(false, atom.as_ref().as_bytes())?)))
            .collect::<Result<Vec<_>, ReplyError>>()?;

        let atoms = Self::default();
        for (atom, cookie) in cookies {
            atoms.insert(atom.as_ref(), cookie.reply()?.atom);
        }

        Ok(atoms)
    }

    fn insert(&self, name: &str, id: u32) {
        self.by_name.borrow_mut().insert(name.to_owned(), id);
        self.by_id.borrow_mut().insert(id, name.to_owned());
    }

    pub(crate) fn intern(&self, conn: &impl Connection, name: &str) -> Result<u32, ReplyError> {
        if let Some(&id) = self.by_name.borrow().get(name) {
            return Ok(id);
        }

        let id = conn.intern_atom(false, name.as_bytes())?.reply()?.atom;
        self.insert(name, id);

        Ok(id)
    }

    pub(crate) fn name(&self, conn: &impl Connection, id: u32) -> Result<String, ReplyError> {
        if let Some(name) = self.by_id.borrow().get(&id) {
            return Ok(name.clone());
        }

        let reply = conn.get_atom_name(id)?.reply()?;
        let name = String::from_utf8_lossy(&reply.name).into_owned();
        self.insert(&name, id);

        Ok(name)
    }
}
