use serde::{Deserialize, Serialize};

/// A field of a partial-update request.
///
/// `Absent` leaves the field untouched on the server, `Null` unsets it and
/// `Value` replaces it. Pair it with
/// `#[serde(default, skip_serializing_if = "Patch::is_absent")]` and encode the
/// request with the null-preserving encoder so `Null` survives.
///
/// ```
/// use serde::Serialize;
/// use univapay_core::types::Patch;
///
/// #[derive(Serialize)]
/// struct UpdateStore {
///     #[serde(skip_serializing_if = "Patch::is_absent")]
///     name: Patch<String>,
///     #[serde(skip_serializing_if = "Patch::is_absent")]
///     logo_url: Patch<String>,
/// }
///
/// let update = UpdateStore {
///     name: Patch::Absent,
///     logo_url: Patch::Null,
/// };
/// assert_eq!(
///     serde_json::to_string(&update).unwrap(),
///     r#"{"logo_url":null}"#
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    #[default]
    Absent,
    Null,
    Value(T),
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    pub fn as_value(&self) -> Option<&T> {
        match self {
            Patch::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    /// `None` becomes an explicit `Null`.
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        }
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Patch::Value(v) => v.serialize(serializer),
            Patch::Absent | Patch::Null => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    /// A present `null` is `Null`; a missing field needs `#[serde(default)]` to become `Absent`.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    struct Update {
        #[serde(default, skip_serializing_if = "Patch::is_absent")]
        name: Patch<String>,
        #[serde(default, skip_serializing_if = "Patch::is_absent")]
        email: Patch<String>,
    }

    #[test]
    fn distinguishes_absent_null_and_value() {
        let update: Update = serde_json::from_value(json!({ "email": null })).unwrap();
        assert_eq!(update.name, Patch::Absent);
        assert_eq!(update.email, Patch::Null);

        let update: Update = serde_json::from_value(json!({ "name": "shop" })).unwrap();
        assert_eq!(update.name.as_value().map(String::as_str), Some("shop"));
    }

    #[test]
    fn absent_fields_are_skipped() {
        let update = Update {
            name: Patch::Value("shop".into()),
            email: Patch::Absent,
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({ "name": "shop" })
        );
    }
}
