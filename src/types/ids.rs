use std::{
    fmt::{Debug, Display},
    hash::Hash,
    marker::PhantomData,
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    adapters::StringForm,
    errors::Error,
    marshal::{Marshal, Shape},
};

/// A kind of resource addressed by an [`Id`].
pub trait ResourceKind: 'static {
    const TYPE_NAME: &'static str;
}

/// Marker for stores.
#[derive(Debug)]
pub enum Store {}

/// Marker for charges.
#[derive(Debug)]
pub enum Charge {}

/// Marker for transaction tokens.
#[derive(Debug)]
pub enum TransactionToken {}

/// Marker for subscriptions.
#[derive(Debug)]
pub enum Subscription {}

impl ResourceKind for Store {
    const TYPE_NAME: &'static str = "StoreId";
}

impl ResourceKind for Charge {
    const TYPE_NAME: &'static str = "ChargeId";
}

impl ResourceKind for TransactionToken {
    const TYPE_NAME: &'static str = "TransactionTokenId";
}

impl ResourceKind for Subscription {
    const TYPE_NAME: &'static str = "SubscriptionId";
}

pub type StoreId = Id<Store>;
pub type ChargeId = Id<Charge>;
pub type TransactionTokenId = Id<TransactionToken>;
pub type SubscriptionId = Id<Subscription>;

/// A UUID identifying a resource of kind `K`.
///
/// Ids of different kinds are distinct types, so a charge id cannot be passed
/// where a store id is expected.
pub struct Id<K> {
    uuid: Uuid,
    _kind: PhantomData<fn() -> K>,
}

impl<K> Id<K> {
    pub const fn new(uuid: Uuid) -> Self {
        Id {
            uuid,
            _kind: PhantomData,
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }
}

impl<K> Clone for Id<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for Id<K> {}

impl<K> PartialEq for Id<K> {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
    }
}

impl<K> Eq for Id<K> {}

impl<K> Hash for Id<K> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.uuid.hash(state);
    }
}

impl<K: ResourceKind> Debug for Id<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", K::TYPE_NAME, self.uuid)
    }
}

impl<K> Display for Id<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.uuid.hyphenated())
    }
}

impl<K> From<Uuid> for Id<K> {
    fn from(uuid: Uuid) -> Self {
        Id::new(uuid)
    }
}

impl<K: ResourceKind> FromStr for Id<K> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Id::new)
            .map_err(|err| Error::malformed(K::TYPE_NAME, format!("`{s}`: {err}")))
    }
}

impl<K> Serialize for Id<K> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de, K: ResourceKind> Deserialize<'de> for Id<K> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl<K: ResourceKind> StringForm for Id<K> {
    const TYPE_NAME: &'static str = K::TYPE_NAME;
}

impl<K: ResourceKind> Marshal for Id<K> {
    const SHAPES: &'static [Shape] = &[Shape::DomainParam, Shape::Json];

    fn to_param(&self) -> Option<String> {
        Some(self.to_string())
    }
}
