//! Per-type JSON adapters.
//!
//! A [`TypeAdapter`] is a pair of functions turning one type into a JSON value
//! and back. Adapters live in a [`TypeAdapterRegistry`] keyed by the type they
//! handle; the JSON converter looks them up there. Bespoke adapters cover the
//! SDK's wire types, while [`JsonAdapter`] plugs in serde-derived request and
//! response structures.

mod registry;

use std::{fmt::Display, marker::PhantomData, str::FromStr};

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

pub use registry::*;

use crate::{
    errors::{Error, Result},
    marshal::WireEnum,
    types::{DayOfMonth, MetadataMap, MetadataValue},
};

/// Encodes and decodes values of one type.
pub trait TypeAdapter: Send + Sync + 'static {
    type Target: Send + Sync + 'static;

    fn type_name(&self) -> &'static str;

    fn encode(&self, value: &Self::Target) -> Result<Value>;

    /// Must reject malformed input with [`Error::MalformedWireValue`].
    fn decode(&self, wire: &Value) -> Result<Self::Target>;
}

/// A type whose wire form is a single JSON string, given by its `Display` and
/// `FromStr` impls.
pub trait StringForm: FromStr<Err = Error> + Display + Send + Sync + 'static {
    const TYPE_NAME: &'static str;
}

fn expect_str<'a>(type_name: &'static str, wire: &'a Value) -> Result<&'a str> {
    match wire.as_str() {
        Some(s) => Ok(s),
        None => {
            let reason = format!("expected a string, got {wire}");
            Err(Error::malformed(type_name, reason))
        }
    }
}

/// Adapter for [`StringForm`] types.
pub struct StringAdapter<T>(PhantomData<fn() -> T>);

impl<T> Default for StringAdapter<T> {
    fn default() -> Self {
        StringAdapter(PhantomData)
    }
}

impl<T: StringForm> TypeAdapter for StringAdapter<T> {
    type Target = T;

    fn type_name(&self) -> &'static str {
        T::TYPE_NAME
    }

    fn encode(&self, value: &T) -> Result<Value> {
        Ok(Value::String(value.to_string()))
    }

    fn decode(&self, wire: &Value) -> Result<T> {
        expect_str(T::TYPE_NAME, wire)?.parse()
    }
}

/// Adapter for [`WireEnum`] types.
pub struct WireEnumAdapter<T>(PhantomData<fn() -> T>);

impl<T> Default for WireEnumAdapter<T> {
    fn default() -> Self {
        WireEnumAdapter(PhantomData)
    }
}

impl<T: WireEnum> TypeAdapter for WireEnumAdapter<T> {
    type Target = T;

    fn type_name(&self) -> &'static str {
        T::TYPE_NAME
    }

    fn encode(&self, value: &T) -> Result<Value> {
        Ok(Value::String(value.as_wire().to_string()))
    }

    fn decode(&self, wire: &Value) -> Result<T> {
        let code = expect_str(T::TYPE_NAME, wire)?;
        T::from_wire(code)
            .ok_or_else(|| Error::malformed(T::TYPE_NAME, format!("unrecognized code `{code}`")))
    }
}

/// Day of month as a JSON integer.
#[derive(Debug, Default)]
pub struct DayOfMonthAdapter;

impl TypeAdapter for DayOfMonthAdapter {
    type Target = DayOfMonth;

    fn type_name(&self) -> &'static str {
        "DayOfMonth"
    }

    fn encode(&self, value: &DayOfMonth) -> Result<Value> {
        Ok(Value::from(value.get()))
    }

    fn decode(&self, wire: &Value) -> Result<DayOfMonth> {
        wire.as_u64()
            .and_then(|day| u8::try_from(day).ok())
            .ok_or_else(|| Error::malformed("DayOfMonth", format!("expected 1 to 31, got {wire}")))
            .and_then(DayOfMonth::new)
    }
}

/// Metadata as a JSON object of scalars, keeping each entry's JSON type.
#[derive(Debug, Default)]
pub struct MetadataAdapter;

impl TypeAdapter for MetadataAdapter {
    type Target = MetadataMap;

    fn type_name(&self) -> &'static str {
        "MetadataMap"
    }

    fn encode(&self, value: &MetadataMap) -> Result<Value> {
        Ok(Value::Object(
            value
                .iter()
                .map(|(k, v)| (k.clone(), Value::from(v.clone())))
                .collect(),
        ))
    }

    fn decode(&self, wire: &Value) -> Result<MetadataMap> {
        let Some(object) = wire.as_object() else {
            let reason = format!("expected an object, got {wire}");
            return Err(Error::malformed("MetadataMap", reason));
        };

        object
            .iter()
            .map(|(key, value)| {
                MetadataValue::try_from(value.clone())
                    .map(|v| (key.clone(), v))
                    .map_err(|err| Error::MalformedWireValue {
                        type_name: "MetadataMap",
                        field: Some(key.clone()),
                        reason: match err {
                            Error::MalformedWireValue { reason, .. } => reason,
                            other => other.to_string(),
                        },
                    })
            })
            .collect::<Result<_>>()
            .map(MetadataMap)
    }
}

/// Serde-backed adapter for structured request and response types.
///
/// Decode errors carry the path of the offending field.
pub struct JsonAdapter<T>(PhantomData<fn() -> T>);

impl<T> Default for JsonAdapter<T> {
    fn default() -> Self {
        JsonAdapter(PhantomData)
    }
}

impl<T> TypeAdapter for JsonAdapter<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    type Target = T;

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn encode(&self, value: &T) -> Result<Value> {
        Ok(serde_json::to_value(value)?)
    }

    fn decode(&self, wire: &Value) -> Result<T> {
        serde_path_to_error::deserialize(wire).map_err(|err| {
            let path = err.path().to_string();
            Error::MalformedWireValue {
                type_name: std::any::type_name::<T>(),
                field: (path != ".").then_some(path),
                reason: err.into_inner().to_string(),
            }
        })
    }
}
