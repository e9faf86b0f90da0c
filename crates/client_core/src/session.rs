use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::domain::{Role, UserProfile};
use tokio::sync::RwLock;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

/// Snapshot of a signed-in session as written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub server_url: String,
    pub token: String,
    pub profile: UserProfile,
    pub install_id: Uuid,
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> Result<Option<PersistedSession>>;
    async fn save(&self, session: &PersistedSession) -> Result<()>;
    async fn clear(&self) -> Result<()>;
}

/// Stores the session as a JSON file under the app data directory.
pub struct JsonFileSessionStore {
    path: PathBuf,
}

impl JsonFileSessionStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl SessionStore for JsonFileSessionStore {
    async fn load(&self) -> Result<Option<PersistedSession>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("failed to read session file '{}'", self.path.display())
                })
            }
        };
        // A corrupt session file hydrates to signed-out rather than failing
        // startup; the next sign-in rewrites it.
        match serde_json::from_slice(&bytes) {
            Ok(session) => Ok(Some(session)),
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "discarding unreadable session file"
                );
                Ok(None)
            }
        }
    }

    async fn save(&self, session: &PersistedSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.with_context(|| {
                format!("failed to create session directory '{}'", parent.display())
            })?;
        }
        let body = serde_json::to_vec_pretty(session)?;
        let staged = self.path.with_extension("json.tmp");
        tokio::fs::write(&staged, &body).await.with_context(|| {
            format!("failed to stage session file '{}'", staged.display())
        })?;
        tokio::fs::rename(&staged, &self.path).await.with_context(|| {
            format!("failed to replace session file '{}'", self.path.display())
        })?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| {
                format!("failed to remove session file '{}'", self.path.display())
            }),
        }
    }
}

/// In-memory store for tests and one-shot CLI runs.
#[derive(Default)]
pub struct MemorySessionStore {
    inner: RwLock<Option<PersistedSession>>,
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Option<PersistedSession>> {
        Ok(self.inner.read().await.clone())
    }

    async fn save(&self, session: &PersistedSession) -> Result<()> {
        *self.inner.write().await = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.inner.write().await = None;
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct ActiveSession {
    server_url: String,
    token: String,
    profile: UserProfile,
    install_id: Uuid,
}

/// Holds the signed-in state for the process and mirrors it through the
/// injected [`SessionStore`]. Everything that talks to the rental backend
/// borrows credentials from here instead of caching them.
pub struct SessionContext {
    store: Arc<dyn SessionStore>,
    inner: RwLock<Option<ActiveSession>>,
}

impl SessionContext {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            inner: RwLock::new(None),
        }
    }

    /// Adopts a previously persisted session, if one exists and still looks
    /// sane. Returns the profile when a session was restored; a missing or
    /// unusable persisted session leaves the context signed out.
    pub async fn hydrate(&self) -> Result<Option<UserProfile>> {
        let Some(persisted) = self.store.load().await? else {
            return Ok(None);
        };
        if Url::parse(&persisted.server_url).is_err() {
            warn!(
                server_url = %persisted.server_url,
                "persisted session has an unusable server url; staying signed out"
            );
            return Ok(None);
        }
        let profile = persisted.profile.clone();
        info!(
            user_id = profile.user_id.0,
            server_url = %persisted.server_url,
            "restored persisted session"
        );
        *self.inner.write().await = Some(ActiveSession {
            server_url: persisted.server_url,
            token: persisted.token,
            profile: persisted.profile,
            install_id: persisted.install_id,
        });
        Ok(Some(profile))
    }

    /// Installs a fresh session after sign-in and persists it. The install id
    /// survives re-authentication but not a teardown.
    pub async fn establish(
        &self,
        server_url: &str,
        token: &str,
        profile: UserProfile,
    ) -> Result<()> {
        let server_url = normalize_server_url(server_url)?;
        let install_id = {
            let guard = self.inner.read().await;
            guard
                .as_ref()
                .map(|active| active.install_id)
                .unwrap_or_else(Uuid::new_v4)
        };
        let session = ActiveSession {
            server_url: server_url.clone(),
            token: token.to_string(),
            profile: profile.clone(),
            install_id,
        };
        self.store
            .save(&PersistedSession {
                server_url,
                token: token.to_string(),
                profile,
                install_id,
            })
            .await?;
        *self.inner.write().await = Some(session);
        Ok(())
    }

    /// Signs out: persisted state is cleared first so a crash mid-teardown
    /// cannot resurrect the session on the next launch.
    pub async fn teardown(&self) -> Result<()> {
        self.store.clear().await?;
        let previous = self.inner.write().await.take();
        if let Some(active) = previous {
            info!(user_id = active.profile.user_id.0, "session torn down");
        }
        Ok(())
    }

    pub async fn session(&self) -> Result<(String, String)> {
        let guard = self.inner.read().await;
        let active = guard
            .as_ref()
            .ok_or_else(|| anyhow!("not signed in: no active session"))?;
        Ok((active.server_url.clone(), active.token.clone()))
    }

    pub async fn current_user(&self) -> Option<UserProfile> {
        self.inner
            .read()
            .await
            .as_ref()
            .map(|active| active.profile.clone())
    }

    pub async fn require_role(&self, role: Role) -> Result<UserProfile> {
        let profile = self
            .current_user()
            .await
            .ok_or_else(|| anyhow!("not signed in: no active session"))?;
        if profile.role != role {
            return Err(anyhow!(
                "forbidden: {:?} role required, signed in as {:?}",
                role,
                profile.role
            ));
        }
        Ok(profile)
    }

    pub async fn is_signed_in(&self) -> bool {
        self.inner.read().await.is_some()
    }

    pub async fn server_url(&self) -> Option<String> {
        self.inner
            .read()
            .await
            .as_ref()
            .map(|active| active.server_url.clone())
    }

    pub async fn install_id(&self) -> Option<Uuid> {
        self.inner
            .read()
            .await
            .as_ref()
            .map(|active| active.install_id)
    }
}

/// Validates the backend URL and strips the trailing slash so endpoint
/// formatting can always append `/path`.
pub fn normalize_server_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let parsed = Url::parse(trimmed)
        .with_context(|| format!("invalid server url '{trimmed}'"))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(anyhow!(
            "unsupported server url scheme '{}'",
            parsed.scheme()
        ));
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
