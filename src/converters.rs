//! The ordered converter chain.
//!
//! Each [`Converter`] handles one encoding concern. A [`ConverterChain`] tries
//! them in order and the first one that handles both the slot and one of the
//! value's [`Shape`]s wins. The order is part of the contract: a wire enum that
//! also has a JSON adapter is marshaled by [`Converter::Enum`] because it comes
//! first in [`ConverterChain::standard`].

use crate::{
    errors::{Error, Result},
    marshal::Shape,
};

/// Where a marshaled value is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Request or response body.
    Body,
    /// Path segment or query parameter.
    Param,
    /// HTTP header.
    Header,
}

/// A handler for one encoding concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Converter {
    /// Raw byte bodies, such as file uploads and downloads.
    Binary,
    /// Bodies without meaningful content.
    Void,
    /// Enumerations, as their wire code.
    Enum,
    /// Structured JSON through the type adapter registry.
    Json,
    /// Idempotency keys, carried in a header.
    IdempotencyKey,
    /// Domain wrapper types as path or query strings.
    DomainParam,
}

impl Converter {
    /// The shape this converter accepts.
    pub fn shape(&self) -> Shape {
        match self {
            Converter::Binary => Shape::Binary,
            Converter::Void => Shape::Empty,
            Converter::Enum => Shape::WireEnum,
            Converter::Json => Shape::Json,
            Converter::IdempotencyKey => Shape::IdempotencyKey,
            Converter::DomainParam => Shape::DomainParam,
        }
    }

    /// Whether this converter can carry values in `slot`.
    pub fn handles(&self, slot: Slot) -> bool {
        match self {
            Converter::Binary | Converter::Void | Converter::Json => slot == Slot::Body,
            Converter::Enum => matches!(slot, Slot::Body | Slot::Param),
            Converter::IdempotencyKey => slot == Slot::Header,
            Converter::DomainParam => slot == Slot::Param,
        }
    }

    /// Whether this converter handles a value of the given shapes in `slot`.
    pub fn accepts(&self, slot: Slot, shapes: &[Shape]) -> bool {
        self.handles(slot) && shapes.contains(&self.shape())
    }
}

/// An ordered, duplicate-free list of converters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterChain {
    converters: Vec<Converter>,
}

impl ConverterChain {
    /// Binary, void, enum, JSON, idempotency key, then domain params.
    pub fn standard() -> Self {
        ConverterChain {
            converters: vec![
                Converter::Binary,
                Converter::Void,
                Converter::Enum,
                Converter::Json,
                Converter::IdempotencyKey,
                Converter::DomainParam,
            ],
        }
    }

    /// A chain with a custom order. Each converter may appear once.
    pub fn new(converters: impl IntoIterator<Item = Converter>) -> Result<Self> {
        let mut chain = Vec::new();
        for converter in converters {
            if chain.contains(&converter) {
                return Err(Error::DuplicateConverter { converter });
            }
            chain.push(converter);
        }
        Ok(ConverterChain { converters: chain })
    }

    pub fn converters(&self) -> &[Converter] {
        &self.converters
    }

    /// The first converter accepting `shapes` in `slot`.
    pub fn resolve(&self, slot: Slot, shapes: &[Shape]) -> Option<Converter> {
        self.converters
            .iter()
            .copied()
            .find(|converter| converter.accepts(slot, shapes))
    }
}

impl Default for ConverterChain {
    fn default() -> Self {
        Self::standard()
    }
}
