//! Warden Server — application entry point.
//!
//! Loads configuration, connects to SurrealDB, runs migrations, and
//! assembles the authentication and authorization services. Transport
//! layers attach to the assembled services; none ship in this binary.

mod config;

use surrealdb::engine::remote::ws::Client;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use warden_auth::{AuthService, Authorizer};
use warden_db::repository::{
    SurrealAssignmentRepository, SurrealPermissionRepository, SurrealRoleRepository,
    SurrealTenantRepository, SurrealUserRepository,
};
use warden_db::{DbManager, FieldCipher};

use crate::config::ServerConfig;

/// Long-lived service handles; a transport layer borrows these for
/// the lifetime of the process.
#[allow(dead_code)]
struct AppState {
    auth: AuthService<
        SurrealUserRepository<Client>,
        SurrealAssignmentRepository<Client>,
        SurrealRoleRepository<Client>,
    >,
    tenants: SurrealTenantRepository<Client>,
    permissions: SurrealPermissionRepository<Client>,
}

impl AppState {
    fn assemble(config: &ServerConfig, manager: &DbManager) -> Self {
        let db = manager.client().clone();
        let cipher = FieldCipher::new(config.credential_key);

        let user_repo = match config.auth.pepper.clone() {
            Some(pepper) => SurrealUserRepository::with_pepper(db.clone(), pepper),
            None => SurrealUserRepository::new(db.clone()),
        };
        let authorizer = Authorizer::new(
            SurrealAssignmentRepository::new(db.clone()),
            SurrealRoleRepository::new(db.clone()),
        );

        Self {
            auth: AuthService::new(user_repo, authorizer, config.auth.clone()),
            tenants: SurrealTenantRepository::new(db.clone(), cipher),
            permissions: SurrealPermissionRepository::new(db),
        }
    }
}

#[tokio::main]
async fn main() {
    // .env is optional; real deployments set the environment directly.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("warden=info".parse().expect("static directive")),
        )
        .json()
        .init();

    info!("Starting Warden server...");

    let config = match ServerConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Configuration error");
            std::process::exit(1);
        }
    };

    let manager = match DbManager::connect(&config.db).await {
        Ok(m) => m,
        Err(e) => {
            error!(error = %e, "Failed to connect to SurrealDB");
            std::process::exit(1);
        }
    };

    if let Err(e) = warden_db::run_migrations(manager.client()).await {
        error!(error = %e, "Migration failed");
        std::process::exit(1);
    }

    let state = AppState::assemble(&config, &manager);

    info!("Warden services assembled; awaiting shutdown signal");

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }

    drop(state);
    info!("Warden server stopped.");
}
