use std::fmt;

use crate::error::TermError;

/// An Erlang atom: a short interned symbol, carried on the wire as a
/// length-prefixed byte string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Atom {
    pub name: String,
}

impl Atom {
    /// Builds an atom, enforcing the 255-byte wire limit.
    pub fn new(name: impl Into<String>) -> Result<Atom, TermError> {
        let name = name.into();
        if name.len() > 255 {
            return Err(TermError::AtomTooLong(name.len()));
        }
        Ok(Atom { name })
    }

    /// Builds an atom from a short `'static` literal known to fit the wire
    /// limit, used for the reserved marker atoms (`true`, `false`, `none`,
    /// `python_pickle`).
    pub(crate) fn reserved(name: &'static str) -> Atom {
        debug_assert!(name.len() <= 255);
        Atom {
            name: name.to_string(),
        }
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    /// Builds an atom from wire bytes already decoded to text, rejecting
    /// anything over the 255-byte model limit rather than the wire's wider
    /// u16 length field.
    pub(crate) fn from_wire(name: String) -> Result<Atom, crate::error::DecodeError> {
        if name.len() > 255 {
            return Err(crate::error::DecodeError::OutOfRange {
                value: name.len() as i64,
                min: 0,
                max: 255,
            });
        }
        Ok(Atom { name })
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl From<Atom> for String {
    fn from(atom: Atom) -> String {
        atom.name
    }
}
