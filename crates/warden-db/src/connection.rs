//! SurrealDB connection management.
//!
//! [`DbManager`] owns the remote WebSocket client. Connecting
//! authenticates as root, selects the namespace and database, and
//! proves the endpoint with a round-trip [`ping`] before the client
//! is handed out.

use std::fmt;

use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use surrealdb::{Connection, Surreal};
use tracing::info;

use crate::error::DbError;

/// Connection settings for a SurrealDB endpoint.
#[derive(Clone)]
pub struct DbConfig {
    /// WebSocket address, host and port only (e.g. `127.0.0.1:8000`).
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "warden".into(),
            database: "main".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

// Hand-rolled so the root password never reaches logs; connect logs
// the whole config at info level.
impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("url", &self.url)
            .field("namespace", &self.namespace)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Round-trip query proving the connection is usable. Works against
/// any engine, including the in-memory one used by tests.
pub async fn ping<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query("RETURN true").await?.check()?;
    Ok(())
}

/// Owns the remote SurrealDB client.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Client>,
}

impl DbManager {
    /// Connect, authenticate as root, select the configured namespace
    /// and database, then ping. A manager is only returned once a
    /// query has actually succeeded against the endpoint.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        info!(config = ?config, "connecting to SurrealDB");

        let db = Surreal::new::<Ws>(&config.url).await?;

        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        ping(&db).await?;
        info!("SurrealDB connection established");

        Ok(Self { db })
    }

    /// Liveness probe for the held connection.
    pub async fn health(&self) -> Result<(), DbError> {
        ping(&self.db).await
    }

    /// Returns a reference to the underlying SurrealDB client.
    pub fn client(&self) -> &Surreal<Client> {
        &self.db
    }
}
