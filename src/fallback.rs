//! The Fallback Bridge: the one point where the codec is extensible without
//! altering the wire format. A host program that wants to carry a value with
//! no built-in ETF representation wraps it in a [`Fallback`] term; encoding
//! defers to a registered [`FallbackBridge`] to turn it into bytes, which
//! travel as a 2-tuple tagged with the reserved `python_pickle` atom.
//! Decoding runs the same recognition in reverse.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Reserved atom name for the escape-hatch 2-tuple wire shape. Other users of
/// the format must treat this name as opaque.
pub const FALLBACK_ATOM: &str = "python_pickle";

/// Host-supplied serializer/deserializer pair for values outside the closed
/// term algebra.
///
/// `serialize` is invoked only after every built-in encoding rule has already
/// been considered (i.e. only ever for a [`Fallback`] term). `deserialize` is
/// invoked only when decode matches the exact `(python_pickle, Binary)`
/// 2-tuple shape; if it returns `None` the tuple is left as a plain `Tuple`.
pub trait FallbackBridge: Send + Sync {
    fn serialize(&self, value: &(dyn Any + Send + Sync)) -> Option<Vec<u8>>;
    fn deserialize(&self, bytes: &[u8]) -> Option<crate::term::Term>;
}

/// A type-erased host value with no direct ETF representation. Produced only
/// by the host program, never by the decoder's built-in tag dispatch.
#[derive(Clone)]
pub struct Fallback(pub Arc<dyn Any + Send + Sync>);

impl Fallback {
    pub fn new<T: Any + Send + Sync>(value: T) -> Fallback {
        Fallback(Arc::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl fmt::Debug for Fallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Fallback").field(&"<opaque>").finish()
    }
}

impl PartialEq for Fallback {
    fn eq(&self, other: &Fallback) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
