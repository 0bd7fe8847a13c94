use crate::atom::Atom;

/// An Erlang port identifier. `id` is an opaque fixed-width byte string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Port {
    pub node: Atom,
    pub id: Vec<u8>,
    pub creation: u8,
}
