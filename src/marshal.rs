//! Marshaling capabilities declared by wire types.
//!
//! A type opts into the conversion pipeline by implementing [`Marshal`] and
//! listing the [`Shape`]s it can take. The converter chain picks the first
//! converter that handles one of those shapes; the matching accessor on
//! [`Marshal`] then produces or consumes the wire form.

use bytes::Bytes;

use crate::types::{IdempotencyKey, NoContent};

/// A marshaling capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Raw bytes, passed through untouched.
    Binary,
    /// No meaningful body.
    Empty,
    /// A closed set of wire codes.
    WireEnum,
    /// Structured JSON through the type adapter registry.
    Json,
    /// An idempotency key carried in a header.
    IdempotencyKey,
    /// A canonical string for path or query parameters.
    DomainParam,
}

/// A type the conversion pipeline can encode or decode.
///
/// Structured request and response types only need an empty impl and a JSON
/// adapter in the registry:
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use univapay_core::marshal::Marshal;
///
/// #[derive(Serialize, Deserialize)]
/// struct CreateStore {
///     name: String,
/// }
///
/// impl Marshal for CreateStore {}
/// ```
pub trait Marshal: Sized + Send + Sync + 'static {
    /// Shapes this type can take, in no particular order.
    const SHAPES: &'static [Shape] = &[Shape::Json];

    fn to_binary(&self) -> Option<Bytes> {
        None
    }

    fn from_binary(_bytes: Bytes) -> Option<Self> {
        None
    }

    fn no_content() -> Option<Self> {
        None
    }

    fn wire_code(&self) -> Option<&'static str> {
        None
    }

    /// `None` when the code is not recognized.
    fn from_wire_code(_code: &str) -> Option<Self> {
        None
    }

    fn idempotency_key(&self) -> Option<&IdempotencyKey> {
        None
    }

    fn to_param(&self) -> Option<String> {
        None
    }
}

/// An enumeration with a fixed string code per variant.
pub trait WireEnum: Copy + Send + Sync + 'static {
    const TYPE_NAME: &'static str;

    fn as_wire(&self) -> &'static str;

    fn from_wire(code: &str) -> Option<Self>;
}

impl<T: WireEnum> Marshal for T {
    const SHAPES: &'static [Shape] = &[Shape::WireEnum, Shape::Json];

    fn wire_code(&self) -> Option<&'static str> {
        Some(self.as_wire())
    }

    fn from_wire_code(code: &str) -> Option<Self> {
        T::from_wire(code)
    }
}

impl Marshal for Bytes {
    const SHAPES: &'static [Shape] = &[Shape::Binary];

    fn to_binary(&self) -> Option<Bytes> {
        Some(self.clone())
    }

    fn from_binary(bytes: Bytes) -> Option<Self> {
        Some(bytes)
    }
}

impl Marshal for Vec<u8> {
    const SHAPES: &'static [Shape] = &[Shape::Binary];

    fn to_binary(&self) -> Option<Bytes> {
        Some(Bytes::copy_from_slice(self))
    }

    fn from_binary(bytes: Bytes) -> Option<Self> {
        Some(bytes.to_vec())
    }
}

impl Marshal for NoContent {
    const SHAPES: &'static [Shape] = &[Shape::Empty];

    fn no_content() -> Option<Self> {
        Some(NoContent)
    }
}

impl Marshal for IdempotencyKey {
    const SHAPES: &'static [Shape] = &[Shape::IdempotencyKey];

    fn idempotency_key(&self) -> Option<&IdempotencyKey> {
        Some(self)
    }
}
