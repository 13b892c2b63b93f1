mod common;

use aidboard_server::auth::{LoginError, SessionEvent};
use aidboard_server::entities::Role;
use aidboard_server::store::MemoryStore;
use common::{harness, seed_profile, FakeGateway, PASSWORD};
use std::sync::Arc;
use uuid::Uuid;

#[tokio::test]
async fn matching_role_keeps_the_session() {
    let store = Arc::new(MemoryStore::new());
    let profile = seed_profile(&store, Role::Manager);
    let h = harness(
        FakeGateway::default().with_account("manager@example.org", profile.id),
        store,
    );

    let session = h
        .ctx
        .auth
        .authenticate("manager@example.org", PASSWORD, Some(Role::Manager))
        .await
        .unwrap();

    let stored = h.ctx.auth.get_session(session.id).await.unwrap().unwrap();
    assert_eq!(stored.profile.unwrap().role, Role::Manager);
}

#[tokio::test]
async fn role_mismatch_revokes_the_session() {
    let store = Arc::new(MemoryStore::new());
    let profile = seed_profile(&store, Role::Employee);
    let h = harness(
        FakeGateway::default().with_account("employee@example.org", profile.id),
        store,
    );
    let mut events = h.ctx.auth.subscribe();

    let err = h
        .ctx
        .auth
        .authenticate("employee@example.org", PASSWORD, Some(Role::Admin))
        .await
        .unwrap_err();
    assert!(matches!(err, LoginError::RoleMismatch { actual: Role::Employee }));

    let signed_in = events.recv().await.unwrap();
    let SessionEvent::SignedIn { session_id, .. } = signed_in else {
        panic!("expected sign-in first, got {signed_in:?}");
    };
    assert_eq!(
        events.recv().await.unwrap(),
        SessionEvent::Revoked {
            session_id,
            identity_id: profile.id,
        }
    );
    assert!(h.ctx.auth.get_session(session_id).await.unwrap().is_none());
}

#[tokio::test]
async fn missing_profile_is_rejected_without_expected_role() {
    let identity_id = Uuid::new_v4();
    let h = harness(
        FakeGateway::default().with_account("ghost@example.org", identity_id),
        Arc::new(MemoryStore::new()),
    );
    let mut events = h.ctx.auth.subscribe();

    let err = h
        .ctx
        .auth
        .authenticate("ghost@example.org", PASSWORD, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LoginError::ProfileNotProvisioned));

    assert!(matches!(events.recv().await.unwrap(), SessionEvent::SignedIn { .. }));
    assert!(matches!(events.recv().await.unwrap(), SessionEvent::Revoked { .. }));
}

#[tokio::test]
async fn profile_lookup_failure_is_reported() {
    let store = Arc::new(MemoryStore::new());
    let profile = seed_profile(&store, Role::Admin);
    store.fail_table("profiles");
    let h = harness(
        FakeGateway::default().with_account("admin@example.org", profile.id),
        store,
    );

    let err = h
        .ctx
        .auth
        .authenticate("admin@example.org", PASSWORD, Some(Role::Admin))
        .await
        .unwrap_err();
    assert!(matches!(err, LoginError::ProfileLookup(_)));
}

#[tokio::test]
async fn wrong_password_never_creates_a_session() {
    let store = Arc::new(MemoryStore::new());
    let profile = seed_profile(&store, Role::Admin);
    let h = harness(
        FakeGateway::default().with_account("admin@example.org", profile.id),
        store,
    );
    let mut events = h.ctx.auth.subscribe();

    let err = h
        .ctx
        .auth
        .authenticate("admin@example.org", "nope", None)
        .await
        .unwrap_err();
    assert!(matches!(err, LoginError::InvalidCredentials));
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn sign_out_forgets_the_session() {
    let store = Arc::new(MemoryStore::new());
    let profile = seed_profile(&store, Role::Admin);
    let h = harness(
        FakeGateway::default().with_account("admin@example.org", profile.id),
        store,
    );

    let session = h
        .ctx
        .auth
        .authenticate("admin@example.org", PASSWORD, None)
        .await
        .unwrap();
    h.ctx.auth.sign_out(session.id).await.unwrap();

    assert!(h.ctx.auth.get_session(session.id).await.unwrap().is_none());
}
