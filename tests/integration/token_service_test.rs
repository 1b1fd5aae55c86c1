use live_core::LiveError;
use live_orchestrator::{HttpTokenIssuer, TokenIssuer};

use super::support::start_token_server;

#[actix_rt::test]
async fn issued_credential_matches_the_requested_scope() {
    let (addr, handle) = start_token_server(true).await.expect("start token server");
    let issuer = HttpTokenIssuer::new(format!("http://{addr}"));

    let credential = issuer.issue("rivnitz-live-abc", 1).await.unwrap();
    assert_eq!(credential.uid, 1);
    assert_eq!(credential.channel_name, "rivnitz-live-abc");
    assert!(credential.token.starts_with("007"));

    let now = chrono::Utc::now().timestamp();
    let ttl = credential.expires_at - now;
    assert!((7190..=7210).contains(&ttl), "unexpected ttl {ttl}");

    // A different channel yields a different signature.
    let other = issuer.issue("rivnitz-live-xyz", 1).await.unwrap();
    assert_ne!(credential.token, other.token);

    handle.stop(true).await;
}

#[actix_rt::test]
async fn missing_channel_is_surfaced_verbatim() {
    let (addr, handle) = start_token_server(true).await.expect("start token server");
    let issuer = HttpTokenIssuer::new(format!("http://{addr}"));

    let err = issuer.issue("", 1).await.unwrap_err();
    match err {
        LiveError::CredentialError(message) => {
            assert_eq!(message, "Missing ?channel= parameter")
        }
        other => panic!("unexpected error: {other:?}"),
    }

    handle.stop(true).await;
}

#[actix_rt::test]
async fn unreachable_endpoint_is_a_credential_error() {
    // Nothing listens here.
    let issuer = HttpTokenIssuer::new("http://127.0.0.1:1");
    let err = issuer.issue("rivnitz-live-abc", 1).await.unwrap_err();
    assert!(matches!(err, LiveError::CredentialError(_)));
}
