use std::time::{Duration, SystemTime};

use jwt_codec::{
    claims::{Audience, NumericDate, TimingError, TimingOptions},
    ClaimValue, Claims, JsonWebToken,
};

mod common;
use common::TestResult;

fn at(now: SystemTime) -> TimingOptions {
    TimingOptions::new().at(now)
}

#[test]
fn expiry() {
    let now = SystemTime::now();
    let hour_ago = Claims::new().with_expiration(now - Duration::from_secs(3600));
    assert!(matches!(
        hour_ago.validate_timing(&at(now)),
        Err(TimingError::Expired { .. })
    ));

    let just_expired = Claims::new().with_expiration(now - Duration::from_secs(30));
    assert_eq!(just_expired.validate_timing(&at(now)), Ok(()));
    assert!(just_expired
        .validate_timing(&at(now).with_clock_skew(Duration::from_secs(10)))
        .is_err());
    assert!(just_expired.is_expired_at(now));
}

#[test]
fn not_before() {
    let now = SystemTime::now();
    let claims = Claims::new().with_not_before(now + Duration::from_secs(3600));
    assert!(matches!(
        claims.validate_timing(&at(now)),
        Err(TimingError::NotYetValid { .. })
    ));

    // clock skew applies to `nbf` too
    let claims = Claims::new().with_not_before(now + Duration::from_secs(30));
    assert_eq!(claims.validate_timing(&at(now)), Ok(()));
}

#[test]
fn without_timing_claims_always_valid() {
    let claims = Claims::new().with_subject("x");
    for now in [SystemTime::UNIX_EPOCH, SystemTime::now()] {
        assert_eq!(claims.validate_timing(&at(now)), Ok(()));
    }
    assert_eq!(claims.validate_timing(&TimingOptions::default()), Ok(()));
}

#[test]
fn timing_error_reports_instants() {
    let claims = Claims::new().with_expiration(NumericDate::from_secs(100));
    let options = at(NumericDate::from_secs(1000).into()).with_clock_skew(Duration::ZERO);
    let err = claims.validate_timing(&options).unwrap_err();

    assert_eq!(
        err,
        TimingError::Expired {
            expired_at: NumericDate::from_secs(100),
            now: NumericDate::from_secs(1000),
        }
    );
}

#[test]
fn audience_shapes() -> TestResult {
    let single = Audience::from(vec!["single".to_string()]);
    assert_eq!(single, Audience::Single("single".into()));
    assert_eq!(single.values(), ["single"]);
    assert_eq!(serde_json::to_string(&single)?, r#""single""#);

    let multiple = Audience::from(vec!["a".to_string(), "b".to_string()]);
    assert!(matches!(multiple, Audience::Multiple(_)));
    assert_eq!(multiple.values(), ["a", "b"]);
    assert_eq!(serde_json::to_string(&multiple)?, r#"["a","b"]"#);
    assert!(multiple.contains("b"));
    assert!(!multiple.contains("c"));

    // a decoded one element array keeps its shape
    let claims: Claims = serde_json::from_str(r#"{"aud":["x"]}"#)?;
    assert_eq!(claims.audience(), Some(&Audience::Multiple(vec!["x".into()])));
    assert_eq!(serde_json::to_string(&claims)?, r#"{"aud":["x"]}"#);

    Ok(())
}

#[test]
fn additional_claims_are_typed() -> TestResult {
    let claims: Claims = serde_json::from_str(
        r#"{"name":"Jane","age":42,"ratio":0.5,"admin":false,"tags":["a"],"meta":{"k":null}}"#,
    )?;

    assert_eq!(claims.additional_claim::<&str>("name"), Some("Jane"));
    assert_eq!(claims.additional_claim::<String>("name"), Some("Jane".into()));
    assert_eq!(claims.additional_claim::<i64>("name"), None);

    assert_eq!(claims.additional_claim::<i64>("age"), Some(42));
    assert_eq!(claims.additional_claim::<f64>("age"), Some(42.0));
    assert_eq!(claims.additional_claim::<&str>("age"), None);

    // doubles are never truncated
    assert_eq!(claims.additional_claim::<i64>("ratio"), None);
    assert_eq!(claims.additional_claim::<f64>("ratio"), Some(0.5));

    assert_eq!(claims.additional_claim::<bool>("admin"), Some(false));
    assert_eq!(
        claims.additional_claim::<Vec<ClaimValue>>("tags"),
        Some(vec![ClaimValue::from("a")])
    );

    let meta = claims
        .additional_claim::<&ClaimValue>("meta")
        .ok_or("missing meta")?;
    assert_eq!(meta.get::<&ClaimValue>("k"), Some(&ClaimValue::Null));
    assert_eq!(claims.additional_claim::<bool>("missing"), None);

    Ok(())
}

#[test]
fn registered_claims_never_in_additional() -> TestResult {
    let claims: Claims = serde_json::from_str(
        r#"{"iss":"a","sub":"b","aud":"c","exp":1,"nbf":2,"iat":3,"jti":"d","x":1}"#,
    )?;
    assert_eq!(claims.additional_claims().len(), 1);
    assert_eq!(claims.issuer(), Some("a"));
    assert_eq!(claims.jwt_id(), Some("d"));
    assert_eq!(claims.not_before(), Some(NumericDate::from_secs(2)));

    let claims = Claims::new().with_claim("exp", 5).with_claim("y", 6);
    assert_eq!(claims.expiration(), None);
    assert_eq!(claims.additional_claims().len(), 1);

    Ok(())
}

#[test]
fn malformed_registered_claims() {
    for payload in [
        r#"{"exp":"tomorrow"}"#,
        r#"{"sub":1}"#,
        r#"{"aud":[1]}"#,
        r#"{"sub":"a","sub":"b"}"#,
    ] {
        assert!(serde_json::from_str::<Claims>(payload).is_err(), "{payload}");
    }

    // null registered claims count as absent
    let claims: Claims = serde_json::from_str(r#"{"exp":null}"#).unwrap();
    assert_eq!(claims.expiration(), None);
}

#[test]
fn fractional_dates_survive_a_token() -> TestResult {
    // {"alg":"none"} and {"iat":1.5}
    let jwt = JsonWebToken::decode("eyJhbGciOiJub25lIn0.eyJpYXQiOjEuNX0.")?;
    let iat = jwt.claims().issued_at().ok_or("missing iat")?;
    assert_eq!(iat, NumericDate::from_micros(1_500_000));

    let (header, claims, signature) = jwt.into_parts();
    let rebuilt = JsonWebToken::new(header, claims, signature)?;
    assert_eq!(rebuilt.encode(), "eyJhbGciOiJub25lIn0.eyJpYXQiOjEuNX0.");

    Ok(())
}
