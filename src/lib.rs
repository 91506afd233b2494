//! Parsing, validation and serialization of JSON Web Tokens ([RFC 7519]) in
//! their compact form, `header.payload.signature`.
//!
//! This crate does no cryptography. Signing and verification are delegated
//! to a [`Signer`] or [`Verifier`] supplied by the caller. What it does
//! guarantee is that the bytes handed to them are exactly the bytes of the
//! token: a parsed [`JsonWebToken`] keeps the Base64Url text of its header
//! and payload, so a signature computed by another implementation still
//! verifies.
//!
//! ```
//! # use jwt_codec::{claims::TimingOptions, Error, JsonWebToken};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let jwt: JsonWebToken = "eyJhbGciOiJub25lIn0.eyJzdWIiOiJhbGljZSJ9.".parse()?;
//! assert_eq!(jwt.claims().subject(), Some("alice"));
//! assert!(jwt.is_unsecured());
//!
//! // a verifier that refuses unsecured tokens
//! let mut verifier = |_: &[u8], _: &[u8], alg: &str| match alg {
//!     "none" => Ok::<_, Error>(false),
//!     _ => Err(Error::UnsupportedAlgorithm(alg.into())),
//! };
//! assert!(!jwt.verify_and_validate(&mut verifier, &TimingOptions::new())?);
//! # Ok(())
//! # }
//! ```
//!
//! [RFC 7519]: <https://datatracker.ietf.org/doc/html/rfc7519>
#![warn(
    missing_docs,
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    explicit_outlives_requirements,
    clippy::missing_const_for_fn,
    clippy::missing_errors_doc
)]
#![deny(
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    macro_use_extern_crate,
    non_ascii_idents,
    elided_lifetimes_in_paths
)]
#![forbid(unsafe_code)]

extern crate alloc;

mod sign;
pub use sign::*;

mod verify;
pub use verify::*;

pub mod base64_url;
pub mod claims;
mod error;
pub mod format;
pub mod header;
mod jwt;
pub mod value;

pub use base64_url::Base64UrlString;
pub use claims::Claims;
pub use error::{Component, Error, FormatError};
pub use header::Header;
pub use jwt::JsonWebToken;
pub use value::{ClaimValue, FromClaimValue};

/// Type alias to make `JsonWebToken` easier to access.
pub type Jwt = JsonWebToken;
