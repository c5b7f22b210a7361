use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt::Debug,
};

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    adapters::{
        DayOfMonthAdapter, JsonAdapter, MetadataAdapter, StringAdapter, TypeAdapter,
        WireEnumAdapter,
    },
    errors::{Error, Result},
    types::{
        CalendarDate, CardBrand, ChargeId, ChargeStatus, Country, Domain, EmailAddress, Gateway,
        IsoDuration, PaidyToken, PaymentType, Period, StoreId, SubscriptionId, Timestamp,
        TokenAliasKey, TokenType, TransactionTokenId, ZoneId,
    },
};

/// Object-safe view of a [`TypeAdapter`].
trait ErasedAdapter: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn encode_any(&self, value: &dyn Any) -> Result<Value>;

    fn decode_any(&self, wire: &Value) -> Result<Box<dyn Any>>;
}

impl<A: TypeAdapter> ErasedAdapter for A {
    fn type_name(&self) -> &'static str {
        TypeAdapter::type_name(self)
    }

    fn encode_any(&self, value: &dyn Any) -> Result<Value> {
        let value = value
            .downcast_ref::<A::Target>()
            .ok_or(Error::UnsupportedType {
                type_name: TypeAdapter::type_name(self),
            })?;
        self.encode(value)
    }

    fn decode_any(&self, wire: &Value) -> Result<Box<dyn Any>> {
        Ok(Box::new(self.decode(wire)?))
    }
}

/// Adapters keyed by the type they handle, at most one per type.
///
/// Built once and read-only afterwards, so it can be shared freely between
/// threads.
pub struct TypeAdapterRegistry {
    adapters: HashMap<TypeId, Box<dyn ErasedAdapter>>,
}

impl TypeAdapterRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// A registry holding every adapter for the SDK's own wire types.
    pub fn standard() -> Self {
        TypeAdapterRegistry {
            adapters: standard_adapters().collect(),
        }
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.adapters.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    fn adapter<T: 'static>(&self) -> Result<&dyn ErasedAdapter> {
        self.adapters
            .get(&TypeId::of::<T>())
            .map(|adapter| adapter.as_ref())
            .ok_or(Error::UnsupportedType {
                type_name: std::any::type_name::<T>(),
            })
    }

    /// Encodes `value` with the adapter registered for `T`.
    pub fn encode<T: 'static>(&self, value: &T) -> Result<Value> {
        self.adapter::<T>()?.encode_any(value)
    }

    /// Decodes `wire` with the adapter registered for `T`.
    pub fn decode<T: 'static>(&self, wire: &Value) -> Result<T> {
        let adapter = self.adapter::<T>()?;
        adapter
            .decode_any(wire)?
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| Error::UnsupportedType {
                type_name: adapter.type_name(),
            })
    }
}

impl Default for TypeAdapterRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl Debug for TypeAdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.adapters.values().map(|a| a.type_name()).collect();
        names.sort_unstable();
        f.debug_struct("TypeAdapterRegistry")
            .field("adapters", &names)
            .finish()
    }
}

/// Collects adapters and rejects a second adapter for the same type.
#[derive(Default)]
pub struct RegistryBuilder {
    adapters: HashMap<TypeId, Box<dyn ErasedAdapter>>,
    duplicate: Option<&'static str>,
}

impl RegistryBuilder {
    /// Adds every adapter of [`TypeAdapterRegistry::standard`].
    pub fn standard_adapters(self) -> Self {
        standard_adapters().fold(self, |builder, (id, adapter)| builder.insert(id, adapter))
    }

    pub fn adapter<A: TypeAdapter>(self, adapter: A) -> Self {
        self.insert(TypeId::of::<A::Target>(), Box::new(adapter))
    }

    /// Registers `T` through its serde impls.
    pub fn json<T>(self) -> Self
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        self.adapter(JsonAdapter::<T>::default())
    }

    fn insert(mut self, id: TypeId, adapter: Box<dyn ErasedAdapter>) -> Self {
        if self.adapters.contains_key(&id) {
            self.duplicate.get_or_insert(adapter.type_name());
        } else {
            self.adapters.insert(id, adapter);
        }
        self
    }

    pub fn build(self) -> Result<TypeAdapterRegistry> {
        if let Some(type_name) = self.duplicate {
            return Err(Error::DuplicateAdapter { type_name });
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "Type adapter registry built with {} adapters",
            self.adapters.len()
        );

        Ok(TypeAdapterRegistry {
            adapters: self.adapters,
        })
    }
}

fn entry<A: TypeAdapter>(adapter: A) -> (TypeId, Box<dyn ErasedAdapter>) {
    (TypeId::of::<A::Target>(), Box::new(adapter))
}

fn standard_adapters() -> impl Iterator<Item = (TypeId, Box<dyn ErasedAdapter>)> {
    [
        entry(StringAdapter::<Timestamp>::default()),
        entry(StringAdapter::<CalendarDate>::default()),
        entry(StringAdapter::<IsoDuration>::default()),
        entry(StringAdapter::<Period>::default()),
        entry(StringAdapter::<ZoneId>::default()),
        entry(StringAdapter::<Domain>::default()),
        entry(StringAdapter::<EmailAddress>::default()),
        entry(StringAdapter::<TokenAliasKey>::default()),
        entry(StringAdapter::<PaidyToken>::default()),
        entry(StringAdapter::<StoreId>::default()),
        entry(StringAdapter::<ChargeId>::default()),
        entry(StringAdapter::<TransactionTokenId>::default()),
        entry(StringAdapter::<SubscriptionId>::default()),
        entry(WireEnumAdapter::<Country>::default()),
        entry(WireEnumAdapter::<CardBrand>::default()),
        entry(WireEnumAdapter::<ChargeStatus>::default()),
        entry(WireEnumAdapter::<TokenType>::default()),
        entry(WireEnumAdapter::<PaymentType>::default()),
        entry(WireEnumAdapter::<Gateway>::default()),
        entry(DayOfMonthAdapter),
        entry(MetadataAdapter),
    ]
    .into_iter()
}

#[cfg(test)]
mod tests {
    use std::fmt::Display;

    use serde::Deserialize;
    use serde_json::json;
    use uuid::Uuid;

    use super::*;
    use crate::types::MetadataMap;

    #[test]
    fn standard_registry_has_unique_keys() {
        let checked = TypeAdapterRegistry::builder()
            .standard_adapters()
            .build()
            .unwrap();
        assert_eq!(checked.len(), TypeAdapterRegistry::standard().len());
        assert_eq!(checked.len(), 21);
    }

    fn assert_round_trips<T>(registry: &TypeAdapterRegistry, values: impl IntoIterator<Item = T>)
    where
        T: PartialEq + Debug + Display + 'static,
    {
        for value in values {
            let wire = registry.encode(&value).unwrap();
            assert_eq!(wire, json!(value.to_string()));
            assert_eq!(registry.decode::<T>(&wire).unwrap(), value);
        }
    }

    #[test]
    fn standard_wire_enums_round_trip() {
        let registry = TypeAdapterRegistry::standard();
        assert_round_trips(&registry, Country::all());
        assert_round_trips(&registry, CardBrand::ALL);
        assert_round_trips(&registry, ChargeStatus::ALL);
        assert_round_trips(&registry, TokenType::ALL);
        assert_round_trips(&registry, PaymentType::ALL);
        assert_round_trips(&registry, Gateway::ALL);
    }

    #[test]
    fn standard_ids_round_trip() {
        let registry = TypeAdapterRegistry::standard();
        for _ in 0..8 {
            assert_round_trips(&registry, [StoreId::new(Uuid::new_v4())]);
            assert_round_trips(&registry, [ChargeId::new(Uuid::new_v4())]);
            assert_round_trips(&registry, [TransactionTokenId::new(Uuid::new_v4())]);
            assert_round_trips(&registry, [SubscriptionId::new(Uuid::new_v4())]);
        }

        let err = registry
            .decode::<ChargeId>(&json!("not-a-uuid"))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedWireValue {
                type_name: "ChargeId",
                ..
            }
        ));
    }

    #[test]
    fn duplicate_adapter_is_rejected() {
        let err = TypeAdapterRegistry::builder()
            .standard_adapters()
            .adapter(WireEnumAdapter::<CardBrand>::default())
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            Error::DuplicateAdapter {
                type_name: "CardBrand"
            }
        ));
    }

    #[test]
    fn missing_adapter_is_unsupported() {
        #[derive(Serialize, Deserialize)]
        struct Unregistered {
            a: u8,
        }

        let registry = TypeAdapterRegistry::standard();
        assert!(!registry.contains::<Unregistered>());
        assert!(matches!(
            registry.encode(&Unregistered { a: 1 }),
            Err(Error::UnsupportedType { .. })
        ));
        assert!(matches!(
            registry.decode::<Unregistered>(&json!({"a": 1})),
            Err(Error::UnsupportedType { .. })
        ));
    }

    #[test]
    fn dispatches_by_type() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Refund {
            charge_id: ChargeId,
            metadata: MetadataMap,
        }

        let registry = TypeAdapterRegistry::builder()
            .standard_adapters()
            .json::<Refund>()
            .build()
            .unwrap();

        let wire = json!({
            "charge_id": "0b0f8f7e-8d0a-4c8e-9a3b-0d6f3d6c2a11",
            "metadata": {"reason": "duplicate", "items": 2}
        });
        let refund: Refund = registry.decode(&wire).unwrap();
        assert_eq!(refund.metadata.len(), 2);
        assert_eq!(registry.encode(&refund).unwrap(), wire);

        assert_eq!(registry.encode(&CardBrand::Visa).unwrap(), json!("visa"));
        let status: ChargeStatus = registry.decode(&json!("successful")).unwrap();
        assert_eq!(status, ChargeStatus::Successful);
    }
}
