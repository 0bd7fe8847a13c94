use num::bigint::BigInt;

use crate::atom::Atom;
use crate::bit_binary::BitBinary;
use crate::error::DecodeError;
use crate::export::Export;
use crate::fallback::Fallback;
use crate::pid::Pid;
use crate::port::Port;
use crate::reference::Reference;

/// The term algebra: every kind of Erlang term this codec handles, plus the
/// [`Fallback`] escape hatch for host-native values with no ETF
/// representation.
///
/// Every term owns its children exclusively; there are no back references or
/// shared subterms, since the wire format cannot express sharing.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Integer(BigInt),
    Float(f64),
    Atom(Atom),
    /// Host-side Unicode text, distinct from a raw [`Term::Binary`]. Only
    /// ever produced by a host program, never by the decoder: the wire has
    /// no tag for it, and it always encodes down to STRING_EXT or a list of
    /// code points, both of which decode back as `List`.
    Str(String),
    BitBinary(BitBinary),
    Binary(Vec<u8>),
    List(Vec<Term>),
    Tuple(Vec<Term>),
    Map(Vec<(Term, Term)>),
    Pid(Pid),
    Port(Port),
    Reference(Reference),
    Export(Export),
    Boolean(bool),
    Null,
    Fallback(Fallback),
}

impl Term {
    pub fn nil() -> Term {
        Term::List(Vec::new())
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Term::List(elements) if elements.is_empty())
    }

    pub fn atom(name: impl Into<String>) -> Result<Term, crate::error::TermError> {
        Atom::new(name).map(Term::Atom)
    }

    /// Wraps host Unicode text. Unlike [`Term::atom`] this has no length
    /// limit and always decodes back as a `List` (or `Nil`), never as text.
    pub fn text(value: impl Into<String>) -> Term {
        Term::Str(value.into())
    }

    pub fn as_atom(&self) -> Option<&Atom> {
        match self {
            Term::Atom(atom) => Some(atom),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[Term]> {
        match self {
            Term::Tuple(elements) => Some(elements),
            _ => None,
        }
    }

    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            Term::Binary(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Consumes a decoded term known to stand for a node name, requiring it
    /// to be an [`Atom`]. Used after generically decoding the `node` field of
    /// a Pid/Port/Reference.
    pub(crate) fn into_atom(self) -> Result<Atom, DecodeError> {
        match self {
            Term::Atom(atom) => Ok(atom),
            _ => Err(DecodeError::UnexpectedType { expected: "atom" }),
        }
    }
}

impl From<bool> for Term {
    fn from(value: bool) -> Term {
        Term::Boolean(value)
    }
}

impl From<BigInt> for Term {
    fn from(value: BigInt) -> Term {
        Term::Integer(value)
    }
}

impl From<i64> for Term {
    fn from(value: i64) -> Term {
        Term::Integer(BigInt::from(value))
    }
}

impl From<f64> for Term {
    fn from(value: f64) -> Term {
        Term::Float(value)
    }
}

impl From<String> for Term {
    fn from(value: String) -> Term {
        Term::Str(value)
    }
}
