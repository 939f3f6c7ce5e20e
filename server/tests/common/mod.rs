//! Shared harness: a real server on an ephemeral port.

#![allow(dead_code)]

use anyhow::Result;
use config::Map;
use copyanywhere_server::host::HostState;
use copyanywhere_server::infrastructure::{config::Settings, server};
use copyanywhere_server::store::{FileStore, NoteStore};
use copyanywhere_server::ws::SessionName;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

pub const PASSWORD: &str = "open-sesame";

pub struct TestServer {
    pub addr: SocketAddr,
    pub state: Arc<HostState>,
    _uploads: TempDir,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        let uploads = tempfile::tempdir()?;
        let vars: Map<String, String> = [
            ("COPYANYWHERE__AUTH__PASSWORD", PASSWORD),
            ("COPYANYWHERE__RELAY__PING_INTERVAL_SECS", "3600"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let settings = Settings::from_env_map(vars)?;

        let files = FileStore::open(uploads.path()).await?;
        let notes = NoteStore::connect("sqlite::memory:", 1).await?;
        let state = Arc::new(HostState::from_parts(&settings, files, notes));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = server::app(state.clone(), None);
        tokio::spawn(server::serve(listener, app, std::future::pending()));

        Ok(Self {
            addr,
            state,
            _uploads: uploads,
        })
    }

    pub fn http(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub fn ws(&self, path: &str) -> String {
        format!("ws://{}{path}", self.addr)
    }

    /// Polls until `session` has exactly `count` members.
    pub async fn wait_for_members(&self, session: &str, count: usize) -> Result<()> {
        let session = SessionName::from(session);
        for _ in 0..300 {
            if self.state.relay().registry().member_count(&session) == count {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        anyhow::bail!("session {session} never reached {count} members")
    }
}
