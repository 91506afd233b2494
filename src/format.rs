//! The serialization formats of a JSON Web Token.
//!
//! JWTs are always written in the compact serialization of [section 7.1 of
//! RFC 7515], see [`Compact`].
//!
//! [section 7.1 of RFC 7515]: <https://datatracker.ietf.org/doc/html/rfc7515#section-7.1>

mod compact;

pub use self::compact::Compact;
