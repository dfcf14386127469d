mod common;

use base64::{Engine, engine::general_purpose::URL_SAFE};
use chrono::DateTime;
use common::{create_token, now_secs, token_with_payload, token_with_raw_segment};
use siam_portal::{
    auth::{Claims, Role, decode_credential},
    error::AuthError,
};

fn assert_malformed(credential: &str) {
    match decode_credential(credential) {
        Err(AuthError::MalformedCredential(_)) => {}
        other => panic!("expected MalformedCredential for {credential:?}, got {other:?}"),
    }
}

#[test]
fn test_decodes_claims_from_issued_token() {
    let token = create_token("64070001", "student", 3600);

    let claims = decode_credential(&token).unwrap();

    assert_eq!(claims.sub, "64070001");
    assert_eq!(claims.role, Role::Student);
    assert!(claims.exp >= now_secs() + 3599);
}

#[test]
fn test_extra_claims_are_dropped() {
    // The issued token also carries `iat` and `email`.
    let token = token_with_payload(
        r#"{"sub":"t-01","role":"teacher","exp":1900000000,"iat":1,"email":"a@b.c","teamid":"x"}"#,
    );

    let claims = decode_credential(&token).unwrap();

    assert_eq!(
        claims,
        Claims {
            sub: "t-01".to_string(),
            role: Role::Teacher,
            exp: 1900000000,
        }
    );
}

#[test]
fn test_url_safe_alphabet_and_multibyte_subject() {
    let token = token_with_payload(r#"{"sub":"ÿÿÿÿÿÿÿÿ","role":"student","exp":1900000000}"#);
    let segment = token.split('.').nth(1).unwrap();
    assert!(segment.contains('_'), "fixture should exercise the '_' mapping");

    let claims = decode_credential(&token).unwrap();
    assert_eq!(claims.sub, "ÿÿÿÿÿÿÿÿ");

    let thai = token_with_payload(r#"{"sub":"นักศึกษา","role":"student","exp":1900000000}"#);
    assert_eq!(decode_credential(&thai).unwrap().sub, "นักศึกษา");
}

#[test]
fn test_padded_payload_segment_is_accepted() {
    let segment = URL_SAFE.encode(br#"{"sub":"s1","role":"student","exp":1900000000}"#);
    let token = token_with_raw_segment(&segment);

    assert_eq!(decode_credential(&token).unwrap().sub, "s1");
}

#[test]
fn test_wrong_segment_count_is_malformed() {
    assert_malformed("");
    assert_malformed("not-a-token");
    assert_malformed("header.payload");
    let token = create_token("s1", "student", 3600);
    assert_malformed(&format!("{token}.extra"));
}

#[test]
fn test_invalid_base64_is_malformed() {
    assert_malformed(&token_with_raw_segment("!!!!"));
    // A length of 1 mod 4 cannot come from any byte sequence.
    assert_malformed(&token_with_raw_segment("abcde"));
}

#[test]
fn test_non_json_payload_is_malformed() {
    assert_malformed(&token_with_payload("definitely not json"));
    assert_malformed(&token_with_payload("[1,2,3]"));
}

#[test]
fn test_invalid_utf8_payload_is_malformed() {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    let segment = URL_SAFE_NO_PAD.encode([0x7b, 0xff, 0xfe, 0x7d]);
    assert_malformed(&token_with_raw_segment(&segment));
}

#[test]
fn test_claims_are_strictly_typed() {
    // Role outside the closed set.
    assert_malformed(&token_with_payload(
        r#"{"sub":"a1","role":"admin","exp":1900000000}"#,
    ));
    // Missing expiry.
    assert_malformed(&token_with_payload(r#"{"sub":"a1","role":"student"}"#));
    // Missing subject.
    assert_malformed(&token_with_payload(r#"{"role":"student","exp":1900000000}"#));
    // Expiry of the wrong type.
    assert_malformed(&token_with_payload(
        r#"{"sub":"a1","role":"student","exp":"tomorrow"}"#,
    ));
}

#[test]
fn test_expiry_boundary_is_inclusive() {
    let claims = Claims {
        sub: "s1".to_string(),
        role: Role::Student,
        exp: 1_800_000_000,
    };

    let at_expiry = DateTime::from_timestamp_millis(1_800_000_000_000).unwrap();
    let just_before = DateTime::from_timestamp_millis(1_799_999_999_999).unwrap();

    assert!(claims.is_expired_at(at_expiry));
    assert!(!claims.is_expired_at(just_before));
}

#[test]
fn test_non_zero_trailing_bits_are_ignored() {
    // Canonical encoding ends in `0`; `1` differs only in the two unused low bits.
    let canonical = "eyJzdWIiOiJzLTEiLCJyb2xlIjoic3R1ZGVudCIsImV4cCI6MTkwMDAwMDAwMH0";
    let lenient = "eyJzdWIiOiJzLTEiLCJyb2xlIjoic3R1ZGVudCIsImV4cCI6MTkwMDAwMDAwMH1";

    let expected = decode_credential(&token_with_raw_segment(canonical)).unwrap();
    let claims = decode_credential(&token_with_raw_segment(lenient)).unwrap();

    assert_eq!(claims, expected);
    assert_eq!(claims.sub, "s-1");
    assert_eq!(claims.exp, 1_900_000_000);
}
