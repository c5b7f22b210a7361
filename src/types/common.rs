//! Validated string wrappers and small value types.

use std::{
    fmt::{Debug, Display},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::{
    adapters::StringForm,
    errors::Error,
    marshal::{Marshal, Shape},
};

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Sentinel for responses without a meaningful body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NoContent;

/// Key that makes a mutating request safe to retry.
///
/// Carried in a header, never in a JSON body.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    pub fn new(key: impl Into<String>) -> Result<Self, Error> {
        key.into().parse()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for IdempotencyKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(Error::malformed(
                "IdempotencyKey",
                "must be non-empty visible ASCII",
            ));
        }
        Ok(IdempotencyKey(s.to_string()))
    }
}

impl Display for IdempotencyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A DNS host name, normalized to lowercase ASCII.
///
/// IP addresses are not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Domain(String);

impl Domain {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Domain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match url::Host::parse(s) {
            Ok(url::Host::Domain(domain)) => Ok(Domain(domain)),
            Ok(_) => Err(Error::malformed("Domain", "IP addresses are not domains")),
            Err(err) => Err(Error::malformed("Domain", err)),
        }
    }
}

impl Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StringForm for Domain {
    const TYPE_NAME: &'static str = "Domain";
}

impl Marshal for Domain {
    const SHAPES: &'static [Shape] = &[Shape::DomainParam, Shape::Json];

    fn to_param(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// An email address with a syntactically valid domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress {
    local: String,
    domain: Domain,
}

impl EmailAddress {
    pub fn local_part(&self) -> &str {
        &self.local
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }
}

impl FromStr for EmailAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: &str| Error::malformed("EmailAddress", reason);

        let (local, domain) = s.split_once('@').ok_or_else(|| malformed("missing `@`"))?;
        if local.is_empty() || local.len() > 64 {
            return Err(malformed("local part must be 1 to 64 characters"));
        }
        if !local.bytes().all(|b| b.is_ascii_graphic() && b != b'@') {
            return Err(malformed("local part contains invalid characters"));
        }
        if domain.contains('@') {
            return Err(malformed("more than one `@`"));
        }
        let domain: Domain = domain
            .parse()
            .map_err(|_| malformed("invalid domain part"))?;
        if !domain.as_str().contains('.') {
            return Err(malformed("domain part must contain a dot"));
        }

        Ok(EmailAddress {
            local: local.to_string(),
            domain,
        })
    }
}

impl Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.local, self.domain)
    }
}

impl StringForm for EmailAddress {
    const TYPE_NAME: &'static str = "EmailAddress";
}

impl Marshal for EmailAddress {}

/// Merchant-chosen alias for a stored transaction token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenAliasKey(String);

impl TokenAliasKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TokenAliasKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.len() > 255 || !s.chars().all(is_key_char) {
            return Err(Error::malformed(
                "TokenAliasKey",
                format!("`{s}` is not 1 to 255 characters of [A-Za-z0-9_-]"),
            ));
        }
        Ok(TokenAliasKey(s.to_string()))
    }
}

impl Display for TokenAliasKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StringForm for TokenAliasKey {
    const TYPE_NAME: &'static str = "TokenAliasKey";
}

impl Marshal for TokenAliasKey {
    const SHAPES: &'static [Shape] = &[Shape::DomainParam, Shape::Json];

    fn to_param(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Token issued by Paidy for a consumer checkout.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PaidyToken(String);

impl PaidyToken {
    const PREFIX: &'static str = "tok_";

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for PaidyToken {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix(Self::PREFIX) {
            Some(rest) if !rest.is_empty() && rest.chars().all(is_key_char) => {
                Ok(PaidyToken(s.to_string()))
            }
            _ => Err(Error::malformed(
                "PaidyToken",
                "expected `tok_` followed by [A-Za-z0-9_-]",
            )),
        }
    }
}

impl Display for PaidyToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Debug for PaidyToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaidyToken(tok_***)")
    }
}

impl StringForm for PaidyToken {
    const TYPE_NAME: &'static str = "PaidyToken";
}

impl Marshal for PaidyToken {}

string_form_serde!(Domain, EmailAddress, TokenAliasKey, PaidyToken);

/// Day of the month used for billing schedules, 1 to 31.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DayOfMonth(u8);

impl DayOfMonth {
    pub fn new(day: u8) -> Result<Self, Error> {
        if (1..=31).contains(&day) {
            Ok(DayOfMonth(day))
        } else {
            Err(Error::malformed(
                "DayOfMonth",
                format!("{day} is not between 1 and 31"),
            ))
        }
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl Serialize for DayOfMonth {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> Deserialize<'de> for DayOfMonth {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let day = u8::deserialize(deserializer)?;
        DayOfMonth::new(day).map_err(serde::de::Error::custom)
    }
}

impl Marshal for DayOfMonth {}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn domain_is_normalized() {
        let domain: Domain = "Shop.Example.COM".parse().unwrap();
        assert_eq!(domain.as_str(), "shop.example.com");
        assert!("192.168.0.1".parse::<Domain>().is_err());
        assert!("".parse::<Domain>().is_err());
        assert!("bad host".parse::<Domain>().is_err());
    }

    #[test]
    fn email_addresses() {
        let email: EmailAddress = "buyer+jp@Example.jp".parse().unwrap();
        assert_eq!(email.local_part(), "buyer+jp");
        assert_eq!(email.to_string(), "buyer+jp@example.jp");

        for bad in [
            "",
            "buyer",
            "@example.jp",
            "a@b@example.jp",
            "buyer@localhost",
            "a b@x.jp",
        ] {
            assert!(bad.parse::<EmailAddress>().is_err(), "{bad}");
        }
    }

    #[test]
    fn token_alias_keys() {
        assert!("alias_01-a".parse::<TokenAliasKey>().is_ok());
        assert!("".parse::<TokenAliasKey>().is_err());
        assert!("has space".parse::<TokenAliasKey>().is_err());
        assert!("x".repeat(256).parse::<TokenAliasKey>().is_err());
    }

    #[test]
    fn paidy_tokens() {
        let token: PaidyToken = serde_json::from_value(json!("tok_abc123")).unwrap();
        assert_eq!(token.as_str(), "tok_abc123");
        assert_eq!(format!("{token:?}"), "PaidyToken(tok_***)");
        assert!("tok_".parse::<PaidyToken>().is_err());
        assert!("abc123".parse::<PaidyToken>().is_err());
    }

    #[test]
    fn day_of_month_bounds() {
        assert_eq!(
            serde_json::to_value(DayOfMonth::new(31).unwrap()).unwrap(),
            json!(31)
        );
        assert!(serde_json::from_value::<DayOfMonth>(json!(0)).is_err());
        assert!(serde_json::from_value::<DayOfMonth>(json!(32)).is_err());
        assert!(serde_json::from_value::<DayOfMonth>(json!("1")).is_err());
    }

    #[test]
    fn idempotency_keys() {
        assert!(IdempotencyKey::new("order-42").is_ok());
        assert!(IdempotencyKey::new("").is_err());
        assert!(IdempotencyKey::new("with space").is_err());
    }
}
