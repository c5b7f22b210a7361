//! Encoding and decoding through the converter chain.
//!
//! A [`Pipeline`] pairs a [`ConverterChain`] with a [`TypeAdapterRegistry`].
//! It is built once, never mutated, and hands out two named encoders: the
//! default one drops `null` object members, the null-preserving one keeps them
//! so partial updates can unset fields.
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use univapay_core::{
//!     adapters::TypeAdapterRegistry,
//!     marshal::Marshal,
//!     pipeline::Pipeline,
//!     types::Patch,
//! };
//!
//! #[derive(Serialize, Deserialize)]
//! struct UpdateStore {
//!     #[serde(default, skip_serializing_if = "Patch::is_absent")]
//!     name: Patch<String>,
//!     #[serde(default, skip_serializing_if = "Patch::is_absent")]
//!     logo_url: Patch<String>,
//! }
//!
//! impl Marshal for UpdateStore {}
//!
//! let registry = TypeAdapterRegistry::builder()
//!     .standard_adapters()
//!     .json::<UpdateStore>()
//!     .build()
//!     .unwrap();
//! let pipeline = Pipeline::builder().registry(registry).build();
//!
//! let update = UpdateStore {
//!     name: Patch::Absent,
//!     logo_url: Patch::Null,
//! };
//! let body = pipeline.null_preserving_encoder().body(&update).unwrap();
//! assert_eq!(&body.bytes[..], br#"{"logo_url":null}"#);
//!
//! let body = pipeline.encoder().body(&update).unwrap();
//! assert_eq!(&body.bytes[..], b"{}");
//! ```

use bon::Builder;
use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, header::CONTENT_TYPE};
use serde_json::Value;

use crate::{
    adapters::TypeAdapterRegistry,
    converters::{Converter, ConverterChain, Slot},
    errors::{Error, Result},
    marshal::Marshal,
    types::IdempotencyKey,
};

/// Default header carrying idempotency keys.
pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

pub const APPLICATION_JSON: &str = "application/json";
pub const APPLICATION_OCTET_STREAM: &str = "application/octet-stream";

/// Null handling of an [`Encoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// Drop object members whose value is `null`.
    #[default]
    OmitNulls,
    /// Keep explicit `null`s.
    PreserveNulls,
}

/// An encoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBody {
    /// `None` for empty bodies.
    pub content_type: Option<&'static str>,
    pub bytes: Bytes,
}

impl RequestBody {
    pub fn empty() -> Self {
        RequestBody {
            content_type: None,
            bytes: Bytes::new(),
        }
    }

    fn json(bytes: Vec<u8>) -> Self {
        RequestBody {
            content_type: Some(APPLICATION_JSON),
            bytes: Bytes::from(bytes),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The `Content-Type` header for this body, if it has content.
    pub fn content_type_header(&self) -> Option<(HeaderName, HeaderValue)> {
        self.content_type
            .map(|content_type| (CONTENT_TYPE, HeaderValue::from_static(content_type)))
    }
}

/// The conversion pipeline.
///
/// Defaults to [`ConverterChain::standard`], [`TypeAdapterRegistry::standard`]
/// and the `Idempotency-Key` header.
#[derive(Builder, Debug)]
pub struct Pipeline {
    /// Converters tried in order.
    #[builder(default)]
    chain: ConverterChain,
    /// Adapters used by the JSON converter.
    #[builder(default)]
    registry: TypeAdapterRegistry,
    /// Header carrying idempotency keys.
    #[builder(default = HeaderName::from_static(IDEMPOTENCY_KEY_HEADER))]
    idempotency_header: HeaderName,
}

impl Default for Pipeline {
    fn default() -> Self {
        Pipeline::builder().build()
    }
}

fn unsupported<T>() -> Error {
    Error::UnsupportedType {
        type_name: std::any::type_name::<T>(),
    }
}

impl Pipeline {
    pub fn chain(&self) -> &ConverterChain {
        &self.chain
    }

    pub fn registry(&self) -> &TypeAdapterRegistry {
        &self.registry
    }

    pub fn idempotency_header(&self) -> &HeaderName {
        &self.idempotency_header
    }

    /// The default encoder, omitting `null` object members.
    pub fn encoder(&self) -> Encoder<'_> {
        self.encoder_with(Encoding::OmitNulls)
    }

    /// The encoder for partial updates, keeping explicit `null`s.
    pub fn null_preserving_encoder(&self) -> Encoder<'_> {
        self.encoder_with(Encoding::PreserveNulls)
    }

    pub fn encoder_with(&self, encoding: Encoding) -> Encoder<'_> {
        Encoder {
            pipeline: self,
            encoding,
        }
    }

    /// The converter handling `T` in `slot`.
    pub fn converter_for<T: Marshal>(&self, slot: Slot) -> Result<Converter> {
        let converter = self
            .chain
            .resolve(slot, T::SHAPES)
            .ok_or_else(unsupported::<T>)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "Resolved {converter:?} converter for {} in {slot:?} slot",
            std::any::type_name::<T>()
        );

        Ok(converter)
    }

    /// Decodes a response body into `T`.
    pub fn decode_body<T: Marshal>(&self, body: Bytes) -> Result<T> {
        match self.converter_for::<T>(Slot::Body)? {
            Converter::Binary => T::from_binary(body).ok_or_else(unsupported::<T>),
            Converter::Void => {
                #[cfg(feature = "tracing")]
                if !body.is_empty() {
                    tracing::trace!(
                        "Discarding {} byte body decoded as {}",
                        body.len(),
                        std::any::type_name::<T>()
                    );
                }

                T::no_content().ok_or_else(unsupported::<T>)
            }
            Converter::Enum => {
                let wire = parse_json::<T>(&body)?;
                let code = wire.as_str().ok_or_else(|| {
                    Error::malformed(
                        std::any::type_name::<T>(),
                        format!("expected a string, got {wire}"),
                    )
                })?;
                T::from_wire_code(code).ok_or_else(|| {
                    Error::malformed(
                        std::any::type_name::<T>(),
                        format!("unrecognized code `{code}`"),
                    )
                })
            }
            Converter::Json => {
                let wire = parse_json::<T>(&body)?;
                self.registry.decode(&wire)
            }
            Converter::IdempotencyKey | Converter::DomainParam => Err(unsupported::<T>()),
        }
    }

    /// Reads the idempotency key from response headers.
    pub fn idempotency_key(&self, headers: &HeaderMap) -> Result<Option<IdempotencyKey>> {
        headers
            .get(&self.idempotency_header)
            .map(|value| -> Result<IdempotencyKey> {
                value
                    .to_str()
                    .map_err(|err| Error::malformed("IdempotencyKey", err))?
                    .parse()
            })
            .transpose()
    }
}

/// Encodes values for one slot of a request.
#[derive(Debug, Clone, Copy)]
pub struct Encoder<'a> {
    pipeline: &'a Pipeline,
    encoding: Encoding,
}

impl Encoder<'_> {
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Encodes `value` as a request body.
    pub fn body<T: Marshal>(&self, value: &T) -> Result<RequestBody> {
        match self.pipeline.converter_for::<T>(Slot::Body)? {
            Converter::Binary => {
                let bytes = value.to_binary().ok_or_else(unsupported::<T>)?;
                Ok(RequestBody {
                    content_type: Some(APPLICATION_OCTET_STREAM),
                    bytes,
                })
            }
            Converter::Void => Ok(RequestBody::empty()),
            Converter::Enum => {
                let code = value.wire_code().ok_or_else(unsupported::<T>)?;
                Ok(RequestBody::json(serde_json::to_vec(code)?))
            }
            Converter::Json => {
                let mut wire = self.pipeline.registry.encode(value)?;
                if self.encoding == Encoding::OmitNulls {
                    strip_nulls(&mut wire);
                }
                Ok(RequestBody::json(serde_json::to_vec(&wire)?))
            }
            Converter::IdempotencyKey | Converter::DomainParam => Err(unsupported::<T>()),
        }
    }

    /// Encodes `value` as a path segment or query parameter.
    pub fn param<T: Marshal>(&self, value: &T) -> Result<String> {
        match self.pipeline.converter_for::<T>(Slot::Param)? {
            Converter::Enum => value
                .wire_code()
                .map(str::to_string)
                .ok_or_else(unsupported::<T>),
            Converter::DomainParam => value.to_param().ok_or_else(unsupported::<T>),
            _ => Err(unsupported::<T>()),
        }
    }

    /// Encodes `value` as a header.
    pub fn header<T: Marshal>(&self, value: &T) -> Result<(HeaderName, HeaderValue)> {
        match self.pipeline.converter_for::<T>(Slot::Header)? {
            Converter::IdempotencyKey => {
                let key = value.idempotency_key().ok_or_else(unsupported::<T>)?;
                let header_value = HeaderValue::from_str(key.as_str())?;
                Ok((self.pipeline.idempotency_header.clone(), header_value))
            }
            _ => Err(unsupported::<T>()),
        }
    }
}

fn parse_json<T>(body: &Bytes) -> Result<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(Error::EmptyBody {
            type_name: std::any::type_name::<T>(),
        });
    }
    serde_json::from_slice(body).map_err(|err| Error::malformed(std::any::type_name::<T>(), err))
}

/// Removes `null` members from every object in `value`. Array elements stay.
fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, member| !member.is_null());
            map.values_mut().for_each(strip_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_nulls),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    use super::*;
    use crate::{
        adapters::TypeAdapter,
        marshal::WireEnum,
        types::{CardBrand, ChargeStatus, Country, Domain, NoContent, Patch, StoreId},
        validation::{ExpiryValidator, FixedClock},
    };

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Address {
        line1: Option<String>,
        line2: Option<String>,
    }

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct UpdateStore {
        #[serde(default, skip_serializing_if = "Patch::is_absent")]
        name: Patch<String>,
        #[serde(default, skip_serializing_if = "Patch::is_absent")]
        logo_url: Patch<String>,
        address: Address,
        tags: Vec<Option<String>>,
    }

    impl Marshal for UpdateStore {}

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Plan {
        Gold,
    }

    impl WireEnum for Plan {
        const TYPE_NAME: &'static str = "Plan";

        fn as_wire(&self) -> &'static str {
            "gold"
        }

        fn from_wire(code: &str) -> Option<Self> {
            (code == "gold").then_some(Plan::Gold)
        }
    }

    /// Encodes plans as objects, distinguishable from the enum converter.
    struct PlanAdapter;

    impl TypeAdapter for PlanAdapter {
        type Target = Plan;

        fn type_name(&self) -> &'static str {
            "Plan"
        }

        fn encode(&self, _value: &Plan) -> Result<Value> {
            Ok(json!({ "plan": "gold" }))
        }

        fn decode(&self, _wire: &Value) -> Result<Plan> {
            Ok(Plan::Gold)
        }
    }

    fn pipeline() -> Pipeline {
        let registry = TypeAdapterRegistry::builder()
            .standard_adapters()
            .json::<UpdateStore>()
            .adapter(PlanAdapter)
            .build()
            .unwrap();
        Pipeline::builder().registry(registry).build()
    }

    fn body_json(body: &RequestBody) -> Value {
        assert_eq!(body.content_type, Some(APPLICATION_JSON));
        serde_json::from_slice(&body.bytes).unwrap()
    }

    #[test]
    fn default_encoder_omits_nulls() {
        let update = UpdateStore {
            name: Patch::Value("shop".into()),
            logo_url: Patch::Null,
            address: Address {
                line1: Some("1-1".into()),
                line2: None,
            },
            tags: vec![None, Some("a".into())],
        };
        let pipeline = pipeline();

        let body = pipeline.encoder().body(&update).unwrap();
        assert_eq!(
            body_json(&body),
            json!({"name": "shop", "address": {"line1": "1-1"}, "tags": [null, "a"]})
        );

        let body = pipeline.null_preserving_encoder().body(&update).unwrap();
        assert_eq!(
            body_json(&body),
            json!({
                "name": "shop",
                "logo_url": null,
                "address": {"line1": "1-1", "line2": null},
                "tags": [null, "a"]
            })
        );
    }

    #[test]
    fn absent_fields_never_appear() {
        let pipeline = pipeline();
        let body = pipeline
            .null_preserving_encoder()
            .body(&UpdateStore::default())
            .unwrap();
        let wire = body_json(&body);
        assert!(wire.get("name").is_none());
        assert!(wire.get("logo_url").is_none());
    }

    #[test]
    fn decodes_structured_bodies() {
        let pipeline = pipeline();
        let update: UpdateStore = pipeline
            .decode_body(Bytes::from_static(
                br#"{"logo_url": null, "address": {"line1": "1-1"}, "tags": []}"#,
            ))
            .unwrap();
        assert_eq!(update.name, Patch::Absent);
        assert_eq!(update.logo_url, Patch::Null);
        assert_eq!(update.address.line1.as_deref(), Some("1-1"));
    }

    #[test]
    fn enum_converter_takes_precedence_over_json() {
        let pipeline = pipeline();
        assert_eq!(
            pipeline.converter_for::<Plan>(Slot::Body).unwrap(),
            Converter::Enum
        );
        let body = pipeline.encoder().body(&Plan::Gold).unwrap();
        assert_eq!(body_json(&body), json!("gold"));

        let json_first = Pipeline::builder()
            .chain(ConverterChain::new([Converter::Json, Converter::Enum]).unwrap())
            .registry(
                TypeAdapterRegistry::builder()
                    .adapter(PlanAdapter)
                    .build()
                    .unwrap(),
            )
            .build();
        let body = json_first.encoder().body(&Plan::Gold).unwrap();
        assert_eq!(body_json(&body), json!({"plan": "gold"}));
    }

    #[test]
    fn empty_bodies() {
        let pipeline = pipeline();
        assert!(matches!(
            pipeline.decode_body::<UpdateStore>(Bytes::new()),
            Err(Error::EmptyBody { .. })
        ));
        assert!(matches!(
            pipeline.decode_body::<ChargeStatus>(Bytes::from_static(b"  ")),
            Err(Error::EmptyBody { .. })
        ));

        assert_eq!(
            pipeline.decode_body::<NoContent>(Bytes::new()).unwrap(),
            NoContent
        );
        assert_eq!(
            pipeline
                .decode_body::<NoContent>(Bytes::from_static(b"{\"ignored\":true}"))
                .unwrap(),
            NoContent
        );
        assert_eq!(
            pipeline.encoder().body(&NoContent).unwrap(),
            RequestBody::empty()
        );
    }

    #[test]
    fn binary_bodies_pass_through() {
        let pipeline = pipeline();
        let body = pipeline
            .encoder()
            .body(&Bytes::from_static(b"\x00\xffpdf"))
            .unwrap();
        assert_eq!(body.content_type, Some(APPLICATION_OCTET_STREAM));
        assert_eq!(&body.bytes[..], b"\x00\xffpdf");
        assert_eq!(
            body.content_type_header().unwrap().1,
            HeaderValue::from_static(APPLICATION_OCTET_STREAM)
        );

        let decoded: Vec<u8> = pipeline
            .decode_body(Bytes::from_static(b"\x00\xffpdf"))
            .unwrap();
        assert_eq!(decoded, b"\x00\xffpdf");
    }

    #[test]
    fn unknown_codes_are_malformed() {
        let pipeline = pipeline();
        assert!(matches!(
            pipeline.decode_body::<Country>(Bytes::from_static(b"\"ZZ\"")),
            Err(Error::MalformedWireValue { .. })
        ));
        assert!(matches!(
            pipeline.decode_body::<CardBrand>(Bytes::from_static(b"\"bitcoin\"")),
            Err(Error::MalformedWireValue { .. })
        ));
        assert!(matches!(
            pipeline.decode_body::<CardBrand>(Bytes::from_static(b"42")),
            Err(Error::MalformedWireValue { .. })
        ));
        assert_eq!(
            pipeline
                .decode_body::<CardBrand>(Bytes::from_static(b"\"jcb\""))
                .unwrap(),
            CardBrand::Jcb
        );
    }

    #[test]
    fn invalid_json_is_malformed() {
        let pipeline = pipeline();
        assert!(matches!(
            pipeline.decode_body::<UpdateStore>(Bytes::from_static(b"{\"name\":")),
            Err(Error::MalformedWireValue { .. })
        ));
        assert!(matches!(
            pipeline.decode_body::<UpdateStore>(Bytes::from_static(b"\"\xff\xfe\"")),
            Err(Error::MalformedWireValue { .. })
        ));
    }

    #[test]
    fn unregistered_types_are_unsupported_at_first_use() {
        #[derive(Serialize, Deserialize)]
        struct Unregistered {
            id: u32,
        }

        impl Marshal for Unregistered {}

        let pipeline = pipeline();
        assert!(matches!(
            pipeline.encoder().body(&Unregistered { id: 1 }),
            Err(Error::UnsupportedType { .. })
        ));
        assert!(matches!(
            pipeline.decode_body::<Unregistered>(Bytes::from_static(b"{\"id\":1}")),
            Err(Error::UnsupportedType { .. })
        ));
    }

    #[test]
    fn params() {
        let pipeline = pipeline();
        let encoder = pipeline.encoder();
        assert_eq!(encoder.param(&Country::JAPAN).unwrap(), "JP");
        assert_eq!(
            encoder.param(&ChargeStatus::Successful).unwrap(),
            "successful"
        );
        assert_eq!(
            encoder
                .param(&"Pay.Example.JP".parse::<Domain>().unwrap())
                .unwrap(),
            "pay.example.jp"
        );
        let id: StoreId = "0b0f8f7e-8d0a-4c8e-9a3b-0d6f3d6c2a11".parse().unwrap();
        assert_eq!(
            encoder.param(&id).unwrap(),
            "0b0f8f7e-8d0a-4c8e-9a3b-0d6f3d6c2a11"
        );
        assert!(matches!(
            encoder.param(&UpdateStore::default()),
            Err(Error::UnsupportedType { .. })
        ));
    }

    #[test]
    fn idempotency_key_headers() {
        let pipeline = pipeline();
        let key = IdempotencyKey::new("order-1234").unwrap();

        let (name, value) = pipeline.encoder().header(&key).unwrap();
        assert_eq!(name.as_str(), "idempotency-key");
        assert_eq!(value, "order-1234");

        let mut headers = HeaderMap::new();
        assert_eq!(pipeline.idempotency_key(&headers).unwrap(), None);
        headers.insert(name, value);
        assert_eq!(pipeline.idempotency_key(&headers).unwrap(), Some(key));

        assert!(matches!(
            pipeline.encoder().body(&IdempotencyKey::new("k").unwrap()),
            Err(Error::UnsupportedType { .. })
        ));
        assert!(matches!(
            pipeline.encoder().header(&Country::JAPAN),
            Err(Error::UnsupportedType { .. })
        ));
    }

    #[test]
    fn custom_idempotency_header() {
        let pipeline = Pipeline::builder()
            .idempotency_header(HeaderName::from_static("x-request-key"))
            .build();
        let key = IdempotencyKey::new("abc").unwrap();
        let (name, value) = pipeline.encoder().header(&key).unwrap();
        assert_eq!(name.as_str(), "x-request-key");

        let mut headers = HeaderMap::new();
        headers.insert(name, value);
        headers.insert(
            HeaderName::from_static(IDEMPOTENCY_KEY_HEADER),
            HeaderValue::from_static("other"),
        );
        assert_eq!(pipeline.idempotency_key(&headers).unwrap(), Some(key));
    }

    #[test]
    fn shared_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}

        assert_send_sync::<Pipeline>();
        assert_send_sync::<Encoder<'static>>();
        assert_send_sync::<RequestBody>();
        assert_send_sync::<ConverterChain>();
        assert_send_sync::<TypeAdapterRegistry>();
        assert_send_sync::<ExpiryValidator>();
        assert_send_sync::<ExpiryValidator<FixedClock>>();
    }
}
