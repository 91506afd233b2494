//! The JOSE [`Header`] of a JSON Web Token as defined in [section 4 of RFC
//! 7515] and [section 5 of RFC 7519].
//!
//! [section 4 of RFC 7515]: <https://datatracker.ietf.org/doc/html/rfc7515#section-4>
//! [section 5 of RFC 7519]: <https://datatracker.ietf.org/doc/html/rfc7519#section-5>

use alloc::{collections::BTreeMap, string::String};
use core::fmt;

use serde::{
    de::{self, MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};

mod builder;

pub use self::builder::{HeaderBuilder, HeaderBuilderError};
use crate::value::{take_member, ClaimValue, FromClaimValue};

/// Names of the header parameters with a typed field in [`Header`], in the
/// order they are written.
pub const REGISTERED_PARAMETERS: &[&str] = &["alg", "typ", "cty", "kid"];

/// The `alg` value of an unsecured JWT, see [section 6 of RFC 7519].
///
/// [section 6 of RFC 7519]: <https://datatracker.ietf.org/doc/html/rfc7519#section-6>
pub const ALGORITHM_NONE: &str = "none";

/// The header of a JSON Web Token.
///
/// The algorithm is an opaque string: this crate never interprets it, the
/// [`Signer`](crate::Signer) and [`Verifier`](crate::Verifier) supplied by the
/// caller do.
///
/// # Example
///
/// ```
/// # use jwt_codec::header::Header;
/// # fn main() {
/// let header = Header::builder()
///     .algorithm("HS256")
///     .typ("JWT")
///     .parameter("x-tenant", "acme")
///     .build()
///     .unwrap();
///
/// assert_eq!(header.algorithm(), "HS256");
/// assert_eq!(header.additional_parameter::<&str>("x-tenant"), Some("acme"));
/// assert_eq!(
///     serde_json::to_string(&header).unwrap(),
///     r#"{"alg":"HS256","typ":"JWT","x-tenant":"acme"}"#
/// );
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    /// `alg` parameter defined in section 4.1.1 of JWS
    algorithm: String,
    /// `typ` parameter defined in section 4.1.9 of JWS
    typ: Option<String>,
    /// `cty` parameter defined in section 4.1.10 of JWS
    content_type: Option<String>,
    /// `kid` parameter defined in section 4.1.4 of JWS
    key_id: Option<String>,
    // every other parameter, never one of `REGISTERED_PARAMETERS`
    additional: BTreeMap<String, ClaimValue>,
}

impl Header {
    /// Returns a builder to construct a [`Header`].
    pub fn builder() -> HeaderBuilder {
        HeaderBuilder::new()
    }

    /// Turn this header into a builder to change some of its parameters.
    pub fn into_builder(self) -> HeaderBuilder {
        HeaderBuilder::from(self)
    }

    /// The `alg` parameter, naming the algorithm the token is secured with.
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// The `typ` parameter, conventionally `JWT`.
    pub fn typ(&self) -> Option<&str> {
        self.typ.as_deref()
    }

    /// The `cty` parameter.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// The `kid` parameter.
    pub fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }

    /// All parameters without a typed field.
    pub const fn additional_parameters(&self) -> &BTreeMap<String, ClaimValue> {
        &self.additional
    }

    /// Looks up a parameter without a typed field and converts it into `T`.
    ///
    /// Returns [`None`] if the parameter is missing or does not have the
    /// shape `T` asks for.
    pub fn additional_parameter<'a, T: FromClaimValue<'a>>(&'a self, name: &str) -> Option<T> {
        self.additional.get(name).and_then(T::from_claim_value)
    }

    /// Whether the `alg` parameter is `none`.
    pub fn is_unsecured(&self) -> bool {
        self.algorithm == ALGORITHM_NONE
    }
}

impl Serialize for Header {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;

        map.serialize_entry("alg", &self.algorithm)?;
        if let Some(typ) = &self.typ {
            map.serialize_entry("typ", typ)?;
        }
        if let Some(cty) = &self.content_type {
            map.serialize_entry("cty", cty)?;
        }
        if let Some(kid) = &self.key_id {
            map.serialize_entry("kid", kid)?;
        }
        for (name, value) in &self.additional {
            map.serialize_entry(name, value)?;
        }

        map.end()
    }
}

impl<'de> Deserialize<'de> for Header {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct HeaderVisitor;

        impl<'de> Visitor<'de> for HeaderVisitor {
            type Value = Header;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a JOSE header object")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut members = BTreeMap::<String, ClaimValue>::new();
                while let Some(name) = map.next_key::<String>()? {
                    if members.contains_key(&name) {
                        return Err(de::Error::custom(alloc::format!(
                            "duplicate header parameter `{name}`"
                        )));
                    }
                    let value = map.next_value::<ClaimValue>()?;
                    members.insert(name, value);
                }

                Header::from_members(members).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_map(HeaderVisitor)
    }
}

impl Header {
    fn from_members(mut members: BTreeMap<String, ClaimValue>) -> Result<Self, serde_json::Error> {
        let algorithm: String = take_member(&mut members, "alg")?
            .ok_or_else(|| de::Error::missing_field("alg"))?;
        if algorithm.is_empty() {
            return Err(de::Error::custom("the `alg` header parameter is empty"));
        }

        Ok(Self {
            algorithm,
            typ: take_member(&mut members, "typ")?,
            content_type: take_member(&mut members, "cty")?,
            key_id: take_member(&mut members, "kid")?,
            additional: members,
        })
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}
