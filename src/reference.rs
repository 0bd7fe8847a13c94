use crate::atom::Atom;
use crate::error::TermError;

/// An Erlang reference. `id` is `4k` opaque bytes for `k >= 1` words; the
/// legacy wire form (tag 101) always decodes to `k = 1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    pub node: Atom,
    pub id: Vec<u8>,
    pub creation: u8,
}

impl Reference {
    /// Builds a reference, enforcing that `id` holds at least one 4-byte word.
    pub fn new(node: Atom, id: Vec<u8>, creation: u8) -> Result<Reference, TermError> {
        if id.is_empty() || id.len() % 4 != 0 {
            return Err(TermError::EmptyReferenceId);
        }
        Ok(Reference { node, id, creation })
    }

    pub fn word_count(&self) -> usize {
        self.id.len() / 4
    }
}
