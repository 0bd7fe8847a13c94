use crate::atom::Atom;

/// A process identifier minted by an Erlang runtime. `id` and `serial` are
/// opaque fixed-width byte strings; the codec never interprets their bits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pid {
    pub node: Atom,
    pub id: Vec<u8>,
    pub serial: Vec<u8>,
    pub creation: u8,
}
