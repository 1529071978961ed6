use stead::utils::jwt::{Claim, TokenCodec, TokenError};
use uuid::Uuid;

fn codec() -> TokenCodec {
    TokenCodec::new("unit-test-secret-key-for-testing")
}

#[test]
fn test_access_claim_round_trip() {
    let codec = codec();
    let user_id = Uuid::new_v4();

    let token = codec
        .mint(Claim::Access { user_id }, Some(900))
        .unwrap();
    let claim = codec.verify(&token).unwrap();

    assert_eq!(claim, Claim::Access { user_id });
}

#[test]
fn test_refresh_claim_round_trip() {
    let codec = codec();
    let user_id = Uuid::new_v4();

    let token = codec
        .mint(Claim::Refresh { user_id }, Some(15_552_000))
        .unwrap();
    let claim = codec.verify(&token).unwrap();

    assert_eq!(claim, Claim::Refresh { user_id });
}

#[test]
fn test_verification_claim_round_trip() {
    let codec = codec();
    let minted = Claim::Verification {
        username: "alice".to_string(),
        email: "a@x.com".to_string(),
        password: "secret123".to_string(),
    };

    let token = codec.mint(minted.clone(), Some(172_800)).unwrap();
    let claim = codec.verify(&token).unwrap();

    assert_eq!(claim, minted);
}

#[test]
fn test_recovery_claim_round_trip() {
    let codec = codec();
    let minted = Claim::Recovery {
        email: "a@x.com".to_string(),
    };

    let token = codec.mint(minted.clone(), Some(300)).unwrap();
    let claim = codec.verify(&token).unwrap();

    assert_eq!(claim, minted);
}

#[test]
fn test_verify_rejects_wrong_secret() {
    let token = codec()
        .mint(
            Claim::Access {
                user_id: Uuid::new_v4(),
            },
            Some(900),
        )
        .unwrap();

    let other = TokenCodec::new("a-completely-different-secret");
    assert_eq!(other.verify(&token), Err(TokenError::InvalidSignature));
}

#[test]
fn test_verify_rejects_tampered_payload() {
    let codec = codec();
    let token = codec
        .mint(
            Claim::Recovery {
                email: "a@x.com".to_string(),
            },
            Some(300),
        )
        .unwrap();

    let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
    let mid = parts[1].len() / 2;
    let replacement = if parts[1].as_bytes()[mid] == b'A' { "B" } else { "A" };
    parts[1].replace_range(mid..mid + 1, replacement);

    assert_eq!(
        codec.verify(&parts.join(".")),
        Err(TokenError::InvalidSignature)
    );
}

#[test]
fn test_verify_rejects_garbage_input() {
    let codec = codec();

    for garbage in ["", "not-a-token", "a.b", "a.b.c.d", "!!!.###.$$$"] {
        assert_eq!(codec.verify(garbage), Err(TokenError::Malformed));
    }
}

#[test]
fn test_verify_rejects_expired_token() {
    let codec = codec();

    // Expiry in the past at mint time.
    let token = codec
        .mint(
            Claim::Recovery {
                email: "a@x.com".to_string(),
            },
            Some(-60),
        )
        .unwrap();

    assert_eq!(codec.verify(&token), Err(TokenError::Expired));
}

#[test]
fn test_verify_accepts_token_inside_ttl() {
    let codec = codec();

    // One second of remaining lifetime is still inside the window.
    let token = codec
        .mint(
            Claim::Recovery {
                email: "a@x.com".to_string(),
            },
            Some(1),
        )
        .unwrap();

    assert!(codec.verify(&token).is_ok());
}

#[test]
fn test_token_without_ttl_never_expires() {
    let codec = codec();

    let token = codec
        .mint(
            Claim::Verification {
                username: "alice".to_string(),
                email: "a@x.com".to_string(),
                password: "secret123".to_string(),
            },
            None,
        )
        .unwrap();

    assert!(codec.verify(&token).is_ok());
}

#[test]
fn test_claim_kind_survives_round_trip() {
    let codec = codec();
    let user_id = Uuid::new_v4();

    // A recovery token is not an access token: the purpose tag travels with
    // the signature, so the caller's match must land on Recovery.
    let token = codec
        .mint(
            Claim::Recovery {
                email: "a@x.com".to_string(),
            },
            Some(300),
        )
        .unwrap();

    match codec.verify(&token).unwrap() {
        Claim::Recovery { email } => assert_eq!(email, "a@x.com"),
        other => panic!("expected a recovery claim, got {:?}", other),
    }

    let token = codec.mint(Claim::Access { user_id }, Some(900)).unwrap();
    assert!(matches!(
        codec.verify(&token).unwrap(),
        Claim::Access { .. }
    ));
}

#[test]
fn test_codecs_with_different_keys_are_disjoint() {
    let access_codec = TokenCodec::new("access-secret");
    let refresh_codec = TokenCodec::new("refresh-secret");
    let user_id = Uuid::new_v4();

    let refresh = refresh_codec
        .mint(Claim::Refresh { user_id }, Some(3600))
        .unwrap();

    // The access codec cannot validate refresh-family tokens at all.
    assert_eq!(
        access_codec.verify(&refresh),
        Err(TokenError::InvalidSignature)
    );
}

#[test]
fn test_different_users_get_different_tokens() {
    let codec = codec();

    let token1 = codec
        .mint(
            Claim::Access {
                user_id: Uuid::new_v4(),
            },
            Some(900),
        )
        .unwrap();
    let token2 = codec
        .mint(
            Claim::Access {
                user_id: Uuid::new_v4(),
            },
            Some(900),
        )
        .unwrap();

    assert_ne!(token1, token2);
}
