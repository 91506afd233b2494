use std::collections::BTreeMap;

use base64ct::{Base64UrlUnpadded, Encoding};
use jwt_codec::{
    claims::{Audience, NumericDate},
    format::Compact,
    ClaimValue, Claims, Component, FormatError, Header, JsonWebToken,
};
use proptest::prelude::*;

mod common;
use common::{TestResult, JWT_IO_TOKEN};

#[test]
fn jwt_io_example() -> TestResult {
    let jwt = JsonWebToken::decode(JWT_IO_TOKEN)?;

    assert_eq!(jwt.header().algorithm(), "HS256");
    assert_eq!(jwt.header().typ(), Some("JWT"));
    assert!(jwt.header().additional_parameters().is_empty());

    let claims = jwt.claims();
    assert_eq!(claims.subject(), Some("1234567890"));
    assert_eq!(claims.issued_at(), Some(NumericDate::from_secs(1516239022)));
    assert_eq!(claims.additional_claim::<&str>("name"), Some("John Doe"));
    assert_eq!(claims.additional_claims().len(), 1);

    assert_eq!(jwt.signature().len(), 32);
    assert!(!jwt.is_unsecured());
    assert_eq!(jwt.encode(), JWT_IO_TOKEN);
    assert_eq!(jwt.to_string(), JWT_IO_TOKEN);

    Ok(())
}

#[test]
fn preserves_foreign_encoding() -> TestResult {
    // {"typ":"JWT",  "alg":"HS256"} and {"b":1.50,"a":[ 1 ],"exp":1e9}
    let header = "eyJ0eXAiOiJKV1QiLCAgImFsZyI6IkhTMjU2In0";
    let payload = "eyJiIjoxLjUwLCJhIjpbIDEgXSwiZXhwIjoxZTl9";
    let raw = format!("{header}.{payload}.YWJj");

    let jwt: JsonWebToken = raw.parse()?;
    assert_eq!(jwt.original_header(), Some(header));
    assert_eq!(jwt.original_payload(), Some(payload));
    assert_eq!(jwt.signing_input(), format!("{header}.{payload}").into_bytes());
    assert_eq!(jwt.encode(), raw);

    assert_eq!(
        jwt.claims().expiration(),
        Some(NumericDate::from_secs(1_000_000_000))
    );
    assert_eq!(jwt.claims().additional_claim::<f64>("b"), Some(1.5));
    assert_eq!(
        jwt.claims().additional_claim::<&[ClaimValue]>("a"),
        Some(&[ClaimValue::Integer(1)][..])
    );

    Ok(())
}

#[test]
fn padded_input_round_trips() -> TestResult {
    // the signature "a" padded to a full group
    let raw = "eyJhbGciOiJ0ZXN0In0.e30.YQ==";
    let jwt = JsonWebToken::decode(raw)?;

    assert_eq!(jwt.signature(), b"a");
    assert_eq!(jwt.encode(), raw);

    Ok(())
}

#[test]
fn signing_input_excludes_signature() -> TestResult {
    let jwt = JsonWebToken::decode("eyJhbGciOiJ0ZXN0In0.e30.c2ln")?;
    assert_eq!(jwt.signing_input(), b"eyJhbGciOiJ0ZXN0In0.e30");

    Ok(())
}

#[test]
fn malformed_structure() {
    for input in ["a.b", "a.b.c.d", "abc", "a.b.c.", "...."] {
        match JsonWebToken::decode(input) {
            Err(FormatError::InvalidFormat(raw)) => assert_eq!(raw, input),
            other => panic!("{input}: {other:?}"),
        }
    }

    assert!(matches!(JsonWebToken::decode(""), Err(FormatError::Empty)));
}

#[test]
fn empty_segments() -> TestResult {
    assert!(matches!(
        JsonWebToken::decode(".eyJzdWIiOiJ4In0.c2ln"),
        Err(FormatError::EmptyHeader)
    ));
    assert!(matches!(
        JsonWebToken::decode("eyJhbGciOiJub25lIn0..c2ln"),
        Err(FormatError::EmptyPayload)
    ));

    let jwt = JsonWebToken::decode("eyJhbGciOiJub25lIn0.eyJzdWIiOiJ4In0.")?;
    assert!(jwt.signature().is_empty());
    assert!(jwt.is_unsecured());

    Ok(())
}

#[test]
fn invalid_base64url_names_component() {
    let cases = [
        ("e@30.e30.", Component::Header, "e@30"),
        ("e30.e@30.", Component::Payload, "e@30"),
        ("e30.e30.c@ln", Component::Signature, "c@ln"),
    ];

    for (input, expected, bad) in cases {
        let err = JsonWebToken::decode(input).unwrap_err();
        assert_eq!(err.component(), Some(expected));
        match err {
            FormatError::InvalidBase64Url { segment, component } => {
                assert_eq!(component, expected);
                assert_eq!(segment, bad);
            }
            other => panic!("{input}: {other:?}"),
        }
    }
}

#[test]
fn invalid_json_names_component() {
    // "abc" is not JSON at all
    let err = JsonWebToken::decode("YWJj.e30.").unwrap_err();
    assert!(matches!(
        err,
        FormatError::InvalidJson {
            component: Component::Header,
            ..
        }
    ));

    // {} has no `alg`
    let err = JsonWebToken::decode("e30.e30.").unwrap_err();
    assert_eq!(err.component(), Some(Component::Header));

    // [] is not an object
    let err = JsonWebToken::decode("eyJhbGciOiJub25lIn0.W10.").unwrap_err();
    assert!(matches!(
        err,
        FormatError::InvalidJson {
            component: Component::Payload,
            ..
        }
    ));
    assert_eq!(err.to_string().split(':').next(), Some("the payload is not valid"));
}

#[test]
fn decode_from_bytes() -> TestResult {
    let jwt = JsonWebToken::try_from(JWT_IO_TOKEN.as_bytes())?;
    assert_eq!(jwt, JsonWebToken::decode(JWT_IO_TOKEN)?);

    Ok(())
}

#[test]
fn canonical_encoding_is_sorted() -> TestResult {
    let header = Header::builder()
        .parameter("zzz", 1)
        .key_id("k")
        .algorithm("none")
        .parameter("aaa", 2)
        .build()?;
    let claims = Claims::new()
        .with_claim("zeta", true)
        .with_subject("s")
        .with_claim("alpha", "x")
        .with_issuer("i");

    let jwt = JsonWebToken::new(header, claims, Vec::new())?;
    let compact: Compact = jwt.encode().parse()?;

    assert_eq!(
        String::from_utf8(compact.header().decode())?,
        r#"{"alg":"none","kid":"k","aaa":2,"zzz":1}"#
    );
    assert_eq!(
        String::from_utf8(compact.payload().decode())?,
        r#"{"iss":"i","sub":"s","alpha":"x","zeta":true}"#
    );
    assert!(compact.signature().is_empty());

    Ok(())
}

#[test]
fn extreme_dates_round_trip() -> TestResult {
    let claims = Claims::new()
        .with_expiration(NumericDate::from_secs(10_000_000_000_000))
        .with_not_before(NumericDate::from_secs(i64::MIN))
        .with_issued_at(NumericDate::from_micros(9_007_199_254_740_993));
    let header = Header::builder().algorithm("none").build()?;
    let jwt = JsonWebToken::new(header, claims, Vec::new())?;

    let parsed = JsonWebToken::decode(&jwt.encode())?;
    assert_eq!(parsed, jwt);
    assert_eq!(parsed.claims().expiration(), Some(NumericDate::MAX));
    assert_eq!(parsed.claims().not_before(), Some(NumericDate::MIN));
    assert_eq!(parsed.claims().issued_at(), Some(NumericDate::MAX));

    // fractional dates past 2^33 seconds cannot be written exactly
    let claims = Claims::new().with_expiration(NumericDate::from_micros(9_000_000_000_000_001));
    let header = Header::builder().algorithm("none").build()?;
    assert!(JsonWebToken::new(header, claims, Vec::new()).is_err());

    Ok(())
}

#[test]
fn non_finite_claims_are_rejected() -> TestResult {
    let header = Header::builder().algorithm("none").build()?;
    for value in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
        let claims = Claims::new().with_claim("x", value);
        assert!(JsonWebToken::new(header.clone(), claims, Vec::new()).is_err());

        let nested = ClaimValue::Array(vec![ClaimValue::Double(value)]);
        let claims = Claims::new().with_claim("x", nested);
        assert!(JsonWebToken::new(header.clone(), claims, Vec::new()).is_err());
    }

    let header = Header::builder().algorithm("none").parameter("x", f64::NAN).build()?;
    assert!(JsonWebToken::new(header, Claims::new(), Vec::new()).is_err());

    Ok(())
}

#[test]
fn nested_duplicate_keys_are_rejected() {
    // {"o":{"a":1,"a":2}}
    let err = JsonWebToken::decode("eyJhbGciOiJub25lIn0.eyJvIjp7ImEiOjEsImEiOjJ9fQ.").unwrap_err();
    assert!(matches!(
        err,
        FormatError::InvalidJson {
            component: Component::Payload,
            ..
        }
    ));
    assert!(err.to_string().contains("duplicate key `a`"));
}

fn claim_value() -> impl Strategy<Value = ClaimValue> {
    let leaf = prop_oneof![
        Just(ClaimValue::Null),
        any::<bool>().prop_map(ClaimValue::Bool),
        any::<i64>().prop_map(ClaimValue::Integer),
        // multiples of 1/64 have exact decimal representations
        (-1_000_000i64..1_000_000).prop_map(|n| ClaimValue::Double(n as f64 / 64.0)),
        ".{0,12}".prop_map(ClaimValue::String),
    ];

    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(ClaimValue::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4).prop_map(ClaimValue::Object),
        ]
    })
}

fn extras() -> impl Strategy<Value = BTreeMap<String, ClaimValue>> {
    prop::collection::btree_map("[a-z_]{1,8}", claim_value(), 0..4)
}

fn date() -> impl Strategy<Value = Option<NumericDate>> {
    let max = NumericDate::MAX.as_secs();
    // microseconds stay exact in an f64 up to 2^33 seconds
    let fraction_bound = (1i64 << 32) * 1_000_000;
    prop::option::of(prop_oneof![
        (-max..=max).prop_map(NumericDate::from_secs),
        (-fraction_bound..fraction_bound).prop_map(NumericDate::from_micros),
        Just(NumericDate::MAX),
        Just(NumericDate::MIN),
        any::<i64>().prop_map(NumericDate::from_secs),
    ])
}

fn audience() -> impl Strategy<Value = Option<Audience>> {
    prop::option::of(prop_oneof![
        "[a-z]{1,8}".prop_map(Audience::Single),
        prop::collection::vec("[a-z]{1,8}", 0..4).prop_map(Audience::Multiple),
    ])
}

prop_compose! {
    fn header()(
        alg in "[A-Za-z0-9]{1,8}",
        typ in prop::option::of("[A-Z]{1,4}"),
        kid in prop::option::of(".{1,8}"),
        extras in extras(),
    ) -> Header {
        let mut builder = Header::builder().algorithm(alg).parameters(extras);
        if let Some(typ) = typ {
            builder = builder.typ(typ);
        }
        if let Some(kid) = kid {
            builder = builder.key_id(kid);
        }
        builder.build().unwrap()
    }
}

prop_compose! {
    fn claims()(
        iss in prop::option::of(".{0,8}"),
        sub in prop::option::of(".{0,8}"),
        aud in audience(),
        exp in date(),
        nbf in date(),
        iat in date(),
        extras in extras(),
    ) -> Claims {
        let mut claims = Claims::new().with_claims(extras);
        if let Some(iss) = iss {
            claims = claims.with_issuer(iss);
        }
        if let Some(sub) = sub {
            claims = claims.with_subject(sub);
        }
        if let Some(aud) = aud {
            claims = claims.with_audience(aud);
        }
        if let Some(exp) = exp {
            claims = claims.with_expiration(exp);
        }
        if let Some(nbf) = nbf {
            claims = claims.with_not_before(nbf);
        }
        if let Some(iat) = iat {
            claims = claims.with_issued_at(iat);
        }
        claims
    }
}

proptest! {
    #[test]
    fn constructed_token_round_trips(
        header in header(),
        claims in claims(),
        signature in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        let jwt = JsonWebToken::new(header, claims, signature).unwrap();
        let parsed = JsonWebToken::decode(&jwt.encode()).unwrap();

        prop_assert_eq!(&parsed, &jwt);
        prop_assert_eq!(parsed.encode(), jwt.encode());
    }

    #[test]
    fn parsed_token_reencodes_verbatim(
        header in header(),
        claims in claims(),
        signature in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        // pretty printed JSON differs from the canonical encoding
        let header = Base64UrlUnpadded::encode_string(
            &serde_json::to_vec_pretty(&header).unwrap(),
        );
        let payload = Base64UrlUnpadded::encode_string(
            &serde_json::to_vec_pretty(&claims).unwrap(),
        );
        let signature = Base64UrlUnpadded::encode_string(&signature);
        let raw = format!("{header}.{payload}.{signature}");

        let jwt = JsonWebToken::decode(&raw).unwrap();
        prop_assert_eq!(jwt.encode(), raw);
        prop_assert_eq!(jwt.signing_input(), format!("{header}.{payload}").into_bytes());
    }
}
