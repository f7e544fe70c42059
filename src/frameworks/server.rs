// Framework bootstrap for the guest directory service.

use crate::domain::admin::AdminCredentials;
use crate::domain::ports::GuestStore;
use crate::frameworks::config::{BackendKind, ConfigError, Settings};
use crate::frameworks::db;
use crate::interface_adapters::routes;
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::stores::{LocalGuestStore, PostgresGuestStore};
use crate::use_cases::{GuestDirectory, ResolveInvitationUseCase};

use std::collections::HashMap;
use std::net::SocketAddr;
use std::{io::Result, sync::Arc};
use tokio::sync::Mutex;

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run(listener: tokio::net::TcpListener, settings: Settings) -> Result<()> {
    let address = listener.local_addr()?;
    let state = build_state(&settings).await?;
    let app = routes::app(state);

    tracing::info!(%address, backend = ?settings.backend, "listening");

    // Serve app and report errors rather than panicking
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let settings = Settings::load()
        .inspect_err(|e| tracing::error!(error = %e, "invalid configuration"))
        .map_err(std::io::Error::other)?;

    let address = SocketAddr::from(([0, 0, 0, 0], settings.port));

    // Bind TCP listener with error handling
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener, settings).await
}

/// Picks the guest store, loads the directory from it and starts following
/// changes made by other clients.
pub async fn build_state(settings: &Settings) -> Result<AppState> {
    let store = open_store(settings).await?;

    let directory = GuestDirectory::init(store.clone())
        .await
        .inspect_err(|e| tracing::error!(error = %e, "failed to load guests"))
        .map_err(std::io::Error::other)?;
    directory
        .follow_store()
        .await
        .inspect_err(|e| tracing::error!(error = %e, "failed to subscribe to guest changes"))
        .map_err(std::io::Error::other)?;

    if settings.admin_password.is_none() {
        tracing::warn!("ADMIN_PASSWORD is not set; admin sign-in is disabled");
    }

    Ok(AppState {
        directory,
        invitations: Arc::new(ResolveInvitationUseCase {
            store,
            param: settings.invitation_param.clone(),
        }),
        sessions: Arc::new(Mutex::new(HashMap::new())),
        admin: AdminCredentials {
            email: settings.admin_email.clone(),
            password: settings.admin_password.clone(),
        },
        session_ttl_seconds: settings.session_ttl_seconds,
    })
}

async fn open_store(settings: &Settings) -> Result<Arc<dyn GuestStore>> {
    match settings.backend {
        BackendKind::Local => {
            let store = LocalGuestStore::open(&settings.data_dir, &settings.storage_key);
            Ok(Arc::new(store))
        }
        BackendKind::Cloud => {
            let database_url = settings
                .database_url
                .as_deref()
                .ok_or_else(|| std::io::Error::other(ConfigError::MissingDatabaseUrl))?;

            let pool = db::connect_pool(database_url)
                .await
                .inspect_err(|e| tracing::error!(error = %e, "failed to connect to database"))
                .map_err(std::io::Error::other)?;
            db::run_migrations(&pool)
                .await
                .inspect_err(|e| tracing::error!(error = %e, "failed to run migrations"))
                .map_err(std::io::Error::other)?;
            tracing::debug!("cloud guest store connected");

            Ok(Arc::new(PostgresGuestStore::new(pool)))
        }
    }
}
