use super::*;
use shared::domain::UserId;
use std::time::{SystemTime, UNIX_EPOCH};

fn profile(role: Role) -> UserProfile {
    UserProfile {
        user_id: UserId(7),
        email: "dana@example.com".to_string(),
        name: Some("Dana".to_string()),
        role,
    }
}

fn persisted(server_url: &str) -> PersistedSession {
    PersistedSession {
        server_url: server_url.to_string(),
        token: "tok".to_string(),
        profile: profile(Role::User),
        install_id: Uuid::new_v4(),
    }
}

fn temp_session_path() -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    std::env::temp_dir().join(format!("rental_desk_session_{unique}.json"))
}

#[tokio::test]
async fn json_store_round_trips_a_session() {
    let path = temp_session_path();
    let store = JsonFileSessionStore::new(&path);
    assert!(store.load().await.expect("empty load").is_none());

    let session = persisted("http://127.0.0.1:8080");
    store.save(&session).await.expect("save");
    let loaded = store.load().await.expect("reload").expect("present");
    assert_eq!(loaded, session);

    store.clear().await.expect("clear");
    assert!(store.load().await.expect("after clear").is_none());
    // Clearing twice must not fail.
    store.clear().await.expect("idempotent clear");
}

#[tokio::test]
async fn corrupt_session_file_hydrates_to_signed_out() {
    let path = temp_session_path();
    tokio::fs::write(&path, b"{ not json").await.expect("write");

    let store = Arc::new(JsonFileSessionStore::new(&path));
    let context = SessionContext::new(store);
    assert!(context.hydrate().await.expect("hydrate").is_none());
    assert!(!context.is_signed_in().await);

    let _ = tokio::fs::remove_file(&path).await;
}

#[tokio::test]
async fn hydrate_adopts_a_persisted_session() {
    let store = Arc::new(MemorySessionStore::default());
    store
        .save(&persisted("http://rentals.example.com"))
        .await
        .expect("seed");

    let context = SessionContext::new(store);
    let restored = context.hydrate().await.expect("hydrate").expect("profile");
    assert_eq!(restored.user_id, UserId(7));

    let (server_url, token) = context.session().await.expect("session");
    assert_eq!(server_url, "http://rentals.example.com");
    assert_eq!(token, "tok");
}

#[tokio::test]
async fn hydrate_rejects_unusable_server_urls() {
    let store = Arc::new(MemorySessionStore::default());
    store
        .save(&persisted("definitely not a url"))
        .await
        .expect("seed");

    let context = SessionContext::new(store);
    assert!(context.hydrate().await.expect("hydrate").is_none());
    assert!(context.session().await.is_err());
}

#[tokio::test]
async fn establish_normalizes_the_server_url() {
    let context = SessionContext::new(Arc::new(MemorySessionStore::default()));
    context
        .establish("  http://127.0.0.1:8080/  ", "tok", profile(Role::User))
        .await
        .expect("establish");

    let (server_url, _token) = context.session().await.expect("session");
    assert_eq!(server_url, "http://127.0.0.1:8080");

    let err = context
        .establish("ftp://127.0.0.1", "tok", profile(Role::User))
        .await
        .expect_err("scheme check");
    assert!(err.to_string().contains("unsupported server url scheme"));
}

#[tokio::test]
async fn teardown_clears_memory_and_store() {
    let store = Arc::new(MemorySessionStore::default());
    let context = SessionContext::new(store.clone());
    context
        .establish("http://127.0.0.1:8080", "tok", profile(Role::User))
        .await
        .expect("establish");
    assert!(context.is_signed_in().await);

    context.teardown().await.expect("teardown");
    assert!(!context.is_signed_in().await);
    assert!(store.load().await.expect("load").is_none());

    let err = context.session().await.expect_err("signed out");
    assert!(err.to_string().contains("not signed in"));
}

#[tokio::test]
async fn install_id_survives_reauthentication() {
    let context = SessionContext::new(Arc::new(MemorySessionStore::default()));
    context
        .establish("http://127.0.0.1:8080", "tok-1", profile(Role::User))
        .await
        .expect("first establish");
    let first = context.install_id().await.expect("install id");

    context
        .establish("http://127.0.0.1:8080", "tok-2", profile(Role::User))
        .await
        .expect("second establish");
    assert_eq!(context.install_id().await, Some(first));
}

#[tokio::test]
async fn require_role_guards_owner_surfaces() {
    let context = SessionContext::new(Arc::new(MemorySessionStore::default()));
    context
        .establish("http://127.0.0.1:8080", "tok", profile(Role::User))
        .await
        .expect("establish");

    let err = context
        .require_role(Role::Owner)
        .await
        .expect_err("customer is not an owner");
    assert!(err.to_string().contains("forbidden"), "got: {err}");

    context
        .establish("http://127.0.0.1:8080", "tok", profile(Role::Owner))
        .await
        .expect("owner establish");
    let owner = context.require_role(Role::Owner).await.expect("owner ok");
    assert_eq!(owner.role, Role::Owner);
}
