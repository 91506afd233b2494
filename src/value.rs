//! [`ClaimValue`], the dynamically shaped value used for claims and header
//! parameters that are not registered by [RFC 7519] or [RFC 7515].
//!
//! [RFC 7519]: <https://datatracker.ietf.org/doc/html/rfc7519>
//! [RFC 7515]: <https://datatracker.ietf.org/doc/html/rfc7515>

use alloc::{
    collections::BTreeMap,
    format,
    string::{String, ToString},
    vec::Vec,
};
use core::fmt;

use serde::{
    de::{self, DeserializeOwned, MapAccess, SeqAccess, Visitor},
    ser::{self, SerializeMap, SerializeSeq},
    Deserialize, Deserializer, Serialize, Serializer,
};
use serde_json::{Number, Value};

/// Any JSON value, as it appeared in a header or claim set.
///
/// Numbers are split into [`Integer`](ClaimValue::Integer) and
/// [`Double`](ClaimValue::Double): a JSON number that fits into an [`i64`]
/// decodes as an integer, every other number decodes as a double.
///
/// Objects use a [`BTreeMap`], so encoding a value always writes its members
/// in lexicographic order.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimValue {
    /// JSON `null`
    Null,
    /// A JSON string
    String(String),
    /// A JSON number without fractional part that fits into an [`i64`]
    Integer(i64),
    /// Any other JSON number
    Double(f64),
    /// JSON `true` or `false`
    Bool(bool),
    /// A JSON array
    Array(Vec<ClaimValue>),
    /// A JSON object
    Object(BTreeMap<String, ClaimValue>),
}

impl ClaimValue {
    /// Returns the string if this value is a [`ClaimValue::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer if this value is a [`ClaimValue::Integer`].
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns this value as a float if it is any kind of number.
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// Returns the boolean if this value is a [`ClaimValue::Bool`].
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the elements if this value is a [`ClaimValue::Array`].
    pub fn as_array(&self) -> Option<&[ClaimValue]> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the members if this value is a [`ClaimValue::Object`].
    pub const fn as_object(&self) -> Option<&BTreeMap<String, ClaimValue>> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Whether this value is JSON `null`.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Looks up `key` and converts it into `T`.
    ///
    /// Returns [`None`] if this is not an object, the key does not exist, or
    /// the value does not have the shape `T` asks for.
    pub fn get<'a, T: FromClaimValue<'a>>(&'a self, key: &str) -> Option<T> {
        self.as_object()?.get(key).and_then(T::from_claim_value)
    }
}

/// Conversion from a borrowed [`ClaimValue`] into a concrete Rust type.
///
/// The conversion never coerces between shapes: a string is never parsed
/// into a number, and a [`ClaimValue::Double`] is never truncated into an
/// [`i64`]. The only widening is [`ClaimValue::Integer`] into [`f64`].
pub trait FromClaimValue<'a>: Sized {
    /// Returns [`None`] if `value` does not have the requested shape.
    fn from_claim_value(value: &'a ClaimValue) -> Option<Self>;
}

impl<'a> FromClaimValue<'a> for &'a str {
    fn from_claim_value(value: &'a ClaimValue) -> Option<Self> {
        value.as_str()
    }
}

impl FromClaimValue<'_> for String {
    fn from_claim_value(value: &ClaimValue) -> Option<Self> {
        value.as_str().map(ToString::to_string)
    }
}

impl FromClaimValue<'_> for i64 {
    fn from_claim_value(value: &ClaimValue) -> Option<Self> {
        value.as_i64()
    }
}

impl FromClaimValue<'_> for f64 {
    fn from_claim_value(value: &ClaimValue) -> Option<Self> {
        value.as_f64()
    }
}

impl FromClaimValue<'_> for bool {
    fn from_claim_value(value: &ClaimValue) -> Option<Self> {
        value.as_bool()
    }
}

impl<'a> FromClaimValue<'a> for &'a [ClaimValue] {
    fn from_claim_value(value: &'a ClaimValue) -> Option<Self> {
        value.as_array()
    }
}

impl FromClaimValue<'_> for Vec<ClaimValue> {
    fn from_claim_value(value: &ClaimValue) -> Option<Self> {
        value.as_array().map(<[ClaimValue]>::to_vec)
    }
}

impl FromClaimValue<'_> for BTreeMap<String, ClaimValue> {
    fn from_claim_value(value: &ClaimValue) -> Option<Self> {
        value.as_object().cloned()
    }
}

impl<'a> FromClaimValue<'a> for &'a ClaimValue {
    fn from_claim_value(value: &'a ClaimValue) -> Option<Self> {
        Some(value)
    }
}

impl FromClaimValue<'_> for ClaimValue {
    fn from_claim_value(value: &ClaimValue) -> Option<Self> {
        Some(value.clone())
    }
}

impl From<&str> for ClaimValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for ClaimValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for ClaimValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for ClaimValue {
    fn from(i: i32) -> Self {
        Self::Integer(i.into())
    }
}

impl From<f64> for ClaimValue {
    fn from(d: f64) -> Self {
        Self::Double(d)
    }
}

impl From<bool> for ClaimValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<T: Into<ClaimValue>> From<Vec<T>> for ClaimValue {
    fn from(values: Vec<T>) -> Self {
        Self::Array(values.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, ClaimValue>> for ClaimValue {
    fn from(members: BTreeMap<String, ClaimValue>) -> Self {
        Self::Object(members)
    }
}

impl From<Number> for ClaimValue {
    fn from(n: Number) -> Self {
        match n.as_i64() {
            Some(i) => Self::Integer(i),
            // serde_json only produces finite numbers
            None => Self::Double(n.as_f64().unwrap_or(f64::NAN)),
        }
    }
}

impl From<Value> for ClaimValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => n.into(),
            Value::String(s) => Self::String(s),
            Value::Array(a) => Self::Array(a.into_iter().map(Self::from).collect()),
            Value::Object(o) => Self::Object(o.into_iter().map(|(k, v)| (k, v.into())).collect()),
        }
    }
}

impl From<ClaimValue> for Value {
    fn from(value: ClaimValue) -> Self {
        match value {
            ClaimValue::Null => Value::Null,
            ClaimValue::String(s) => Value::String(s),
            ClaimValue::Integer(i) => Value::Number(i.into()),
            ClaimValue::Double(d) => Number::from_f64(d).map_or(Value::Null, Value::Number),
            ClaimValue::Bool(b) => Value::Bool(b),
            ClaimValue::Array(a) => Value::Array(a.into_iter().map(Value::from).collect()),
            ClaimValue::Object(o) => {
                Value::Object(o.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl Serialize for ClaimValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::String(s) => serializer.serialize_str(s),
            Self::Integer(i) => serializer.serialize_i64(*i),
            Self::Double(d) if !d.is_finite() => Err(ser::Error::custom("non-finite number")),
            Self::Double(d) => serializer.serialize_f64(*d),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Array(a) => {
                let mut seq = serializer.serialize_seq(Some(a.len()))?;
                for element in a {
                    seq.serialize_element(element)?;
                }
                seq.end()
            }
            Self::Object(o) => {
                let mut map = serializer.serialize_map(Some(o.len()))?;
                for (k, v) in o {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for ClaimValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ClaimValueVisitor)
    }
}

struct ClaimValueVisitor;

impl<'de> Visitor<'de> for ClaimValueVisitor {
    type Value = ClaimValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "any JSON value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(ClaimValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(ClaimValue::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        ClaimValue::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(ClaimValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(ClaimValue::Integer(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(match i64::try_from(v) {
            Ok(i) => ClaimValue::Integer(i),
            Err(_) => ClaimValue::Double(v as f64),
        })
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(ClaimValue::Double(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(ClaimValue::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(ClaimValue::String(v))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut elements = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(element) = seq.next_element()? {
            elements.push(element);
        }
        Ok(ClaimValue::Array(elements))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut members = BTreeMap::new();
        while let Some(k) = map.next_key::<String>()? {
            if members.contains_key(&k) {
                return Err(de::Error::custom(format!("duplicate key `{k}`")));
            }
            let v = map.next_value()?;
            members.insert(k, v);
        }
        Ok(ClaimValue::Object(members))
    }
}

/// Removes `name` from `members` and decodes it as `T`.
///
/// A `null` member is treated as absent.
pub(crate) fn take_member<T: DeserializeOwned>(
    members: &mut BTreeMap<String, ClaimValue>,
    name: &str,
) -> Result<Option<T>, serde_json::Error> {
    match members.remove(name) {
        None | Some(ClaimValue::Null) => Ok(None),
        Some(value) => T::deserialize(Value::from(value))
            .map(Some)
            .map_err(|e| de::Error::custom(format!("invalid `{name}`: {e}"))),
    }
}
