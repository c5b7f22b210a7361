//! Wire-level domain types of the SDK.
//!
//! Every type here has one canonical wire form. String-form types implement
//! [`FromStr`](std::str::FromStr) and [`Display`](std::fmt::Display) as that
//! form, and their serde impls go through the same pair.

/// Derives `Serialize` / `Deserialize` for a type from its `Display` / `FromStr` pair.
macro_rules! string_form_serde {
    ($($ty:ty),+ $(,)?) => {$(
        impl serde::Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.collect_str(self)
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    )+};
}

/// `Display`, `FromStr` and serde impls for a [`WireEnum`](crate::marshal::WireEnum).
macro_rules! wire_enum_impls {
    ($($ty:ty),+ $(,)?) => {$(
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(crate::marshal::WireEnum::as_wire(self))
            }
        }

        impl std::str::FromStr for $ty {
            type Err = crate::errors::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty as crate::marshal::WireEnum>::from_wire(s).ok_or_else(|| {
                    crate::errors::Error::malformed(
                        <$ty as crate::marshal::WireEnum>::TYPE_NAME,
                        format!("unrecognized code `{s}`"),
                    )
                })
            }
        }

        string_form_serde!($ty);
    )+};
}

mod card;
mod common;
mod country;
mod enums;
mod ids;
mod metadata;
mod patch;
mod time;

pub use card::*;
pub use common::*;
pub use country::*;
pub use enums::*;
pub use ids::*;
pub use metadata::*;
pub use patch::*;
pub use time::*;
