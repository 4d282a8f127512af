//! Ephemeral view sessions keyed by opaque bearer tokens.
//!
//! Sessions live only in memory. The artifact endpoints read them many
//! times during the viewing window; a periodic reaper reclaims rendered
//! artifacts once the TTL elapses, with no client cooperation required.
//! Reaped sessions leave a lightweight tombstone behind so late fetches
//! still answer "expired" rather than "never existed".

use crate::error::{PipelineError, PipelineResult};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use lockslate_types::ContentKind;
use rand::RngCore;
use rand::rngs::OsRng;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

/// How long a tombstone outlives its session before the record is
/// dropped entirely and the token answers 404 like any unknown token.
const TOMBSTONE_TTL_SECS: i64 = 3600;

/// One decrypted-and-rendered material, addressable by its token.
#[derive(Clone, Debug)]
pub struct ViewSession {
    pub stored_as: String,
    pub kind: ContentKind,
    /// Workspace directory holding the rendered artifacts.
    pub dir: PathBuf,
    /// Source page indices actually rendered, strictly ascending, with
    /// the artifact file for each. Empty for video sessions.
    pub pages: Vec<(u32, PathBuf)>,
    pub ready_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ViewSession {
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

enum Entry {
    Live(ViewSession),
    /// Artifacts already reclaimed; kept so the token still maps to
    /// "expired" until the tombstone itself ages out.
    Reaped { expires_at: DateTime<Utc> },
}

/// Thread-safe session registry with TTL-based reaping.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Entry>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl: Duration::seconds(ttl_secs as i64),
        }
    }

    /// Mints an unguessable URL-safe bearer token (256 bits).
    pub fn mint_token() -> String {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Registers a ready session under the given token.
    ///
    /// The token is minted by the caller before rendering so the session
    /// workspace directory can be named after it.
    pub async fn insert(
        &self,
        token: String,
        stored_as: String,
        kind: ContentKind,
        dir: PathBuf,
        pages: Vec<(u32, PathBuf)>,
    ) {
        let now = Utc::now();
        let session = ViewSession {
            stored_as,
            kind,
            dir,
            pages,
            ready_at: now,
            expires_at: now + self.ttl,
        };
        self.sessions.write().await.insert(token, Entry::Live(session));
    }

    /// Looks up a live session.
    ///
    /// Unknown tokens are NotFound; known-but-expired tokens (live past
    /// TTL or already reaped) are SessionExpired.
    pub async fn get(&self, token: &str) -> PipelineResult<ViewSession> {
        let sessions = self.sessions.read().await;
        match sessions.get(token) {
            None => Err(PipelineError::NotFound("session".into())),
            Some(Entry::Reaped { .. }) => Err(PipelineError::SessionExpired),
            Some(Entry::Live(session)) => {
                if session.is_expired() {
                    Err(PipelineError::SessionExpired)
                } else {
                    Ok(session.clone())
                }
            }
        }
    }

    /// Number of live (unexpired, unreaped) sessions.
    pub async fn live_count(&self) -> usize {
        self.sessions
            .read()
            .await
            .values()
            .filter(|e| matches!(e, Entry::Live(s) if !s.is_expired()))
            .count()
    }

    /// Sweeps the registry once: expired live sessions become tombstones
    /// and their workspace directories are returned for deletion; aged
    /// tombstones are dropped.
    pub async fn reap_expired(&self) -> Vec<PathBuf> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let mut reclaimed = Vec::new();

        sessions.retain(|_, entry| match entry {
            Entry::Reaped { expires_at } => {
                now < *expires_at + Duration::seconds(TOMBSTONE_TTL_SECS)
            }
            Entry::Live(_) => true,
        });

        for entry in sessions.values_mut() {
            if let Entry::Live(session) = entry {
                if session.is_expired() {
                    reclaimed.push(session.dir.clone());
                    *entry = Entry::Reaped {
                        expires_at: session.expires_at,
                    };
                }
            }
        }
        reclaimed
    }

    /// Spawns the background reaper loop.
    ///
    /// Runs until the process exits; abandoned sessions are bounded by
    /// TTL regardless of whether any client is still connected.
    pub fn spawn_reaper(&self, interval_secs: u64) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker =
                tokio::time::interval(std::time::Duration::from_secs(interval_secs.max(1)));
            loop {
                ticker.tick().await;
                let dirs = store.reap_expired().await;
                for dir in dirs {
                    if let Err(e) = tokio::fs::remove_dir_all(&dir).await {
                        if e.kind() != std::io::ErrorKind::NotFound {
                            tracing::warn!("failed to reclaim session dir {}: {e}", dir.display());
                        }
                    } else {
                        tracing::debug!("reclaimed expired session dir {}", dir.display());
                    }
                }
            }
        })
    }
}
