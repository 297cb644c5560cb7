use std::{path::PathBuf, sync::Arc};

use axum::{Router, http::StatusCode, routing::get};
use clap::Parser;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};
use validator::Validate;

mod auth;
mod authz;
mod config;
mod db;
mod middleware;
mod models;
mod observability;
mod routes;
mod services;

#[cfg(test)]
mod tests;

/// Config file used when `--config` is not given.
const DEFAULT_CONFIG_PATH: &str = "lyceum.toml";

/// Environment variable `create-admin` reads the password from when
/// `--password` is omitted.
const ADMIN_PASSWORD_ENV: &str = "LYCEUM_ADMIN_PASSWORD";

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::LmsConfig>,
    pub db: Arc<db::DbPool>,
    pub services: services::Services,
}

impl AppState {
    /// Open the database named by the config, migrating it if configured.
    pub async fn new(config: config::LmsConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let db = db::DbPool::from_config(&config.database).await?;
        if config.database.run_migrations() {
            db.run_migrations().await?;
        }

        Ok(Self::with_db(config, db)?)
    }

    /// Assemble state around an already opened pool.
    pub fn with_db(config: config::LmsConfig, db: db::DbPool) -> Result<Self, auth::AuthError> {
        let db = Arc::new(db);
        let hasher = auth::PasswordHasher::new(&config.auth.password)?;
        let tokens = auth::TokenIssuer::new(&config.auth);
        let services = services::Services::new(db.clone(), hasher, tokens);

        Ok(Self {
            config: Arc::new(config),
            db,
            services,
        })
    }
}

#[derive(Parser, Debug)]
#[command(version, about = "Lyceum learning management server", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to config file (defaults to ./lyceum.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Start the HTTP server (default)
    Serve,
    /// Write a starting configuration file
    Init {
        /// Path to create the config file (defaults to ./lyceum.toml)
        #[arg(short, long)]
        output: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Run database migrations and exit
    Migrate,
    /// Create an admin account
    ///
    /// Public registration cannot create admins, so the first one is made here.
    CreateAdmin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        /// Account password (defaults to $LYCEUM_ADMIN_PASSWORD)
        #[arg(long)]
        password: Option<String>,
    },
}

pub fn build_app(config: &config::LmsConfig, state: AppState) -> Router {
    let mut app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/health/ready", get(routes::health::readiness))
        .nest("/api", routes::api_routes(state.clone()))
        .fallback(routes::not_found);

    // Request ID innermost so its span covers routing and handlers.
    app = app
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(tower_cookies::CookieManagerLayer::new())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::security_headers_middleware,
        ));

    if let Some(cors_layer) = config.server.cors.to_layer() {
        app = app.layer(cors_layer);
    }

    app.layer(timeout_layer(&config.server))
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(config.server.body_limit_bytes))
        .with_state(state)
}

/// Requests still running after `server.timeout_secs` get a 408.
fn timeout_layer(server: &config::ServerConfig) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, server.timeout())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    match args.command {
        Some(Command::Init { output, force }) => run_init(output, force),
        Some(Command::Migrate) => run_migrate(args.config.as_deref()).await,
        Some(Command::CreateAdmin {
            email,
            first_name,
            last_name,
            password,
        }) => {
            let input = models::CreateUser {
                first_name,
                last_name,
                email,
                password: password
                    .or_else(|| std::env::var(ADMIN_PASSWORD_ENV).ok())
                    .unwrap_or_default(),
                role: Some(models::Role::Admin),
                phone: None,
                avatar: None,
            };
            run_create_admin(args.config.as_deref(), input).await;
        }
        Some(Command::Serve) | None => run_server(args.config.as_deref()).await,
    }
}

/// Load and validate the config, exiting with a message on failure.
fn load_config(explicit_path: Option<&str>) -> (PathBuf, config::LmsConfig) {
    let config_path = PathBuf::from(explicit_path.unwrap_or(DEFAULT_CONFIG_PATH));

    if !config_path.exists() {
        eprintln!(
            "Config file not found: {}\nRun `lyceum init` to create one.",
            config_path.display()
        );
        std::process::exit(1);
    }

    match config::LmsConfig::from_file(&config_path) {
        Ok(config) => (config_path, config),
        Err(e) => {
            eprintln!(
                "Failed to load config from {}: {}",
                config_path.display(),
                e
            );
            std::process::exit(1);
        }
    }
}

fn init_tracing_or_exit(config: &config::LmsConfig) {
    if let Err(e) = observability::init_tracing(&config.observability) {
        eprintln!("Failed to initialize tracing: {}", e);
        std::process::exit(1);
    }
}

fn run_init(output: Option<String>, force: bool) {
    let output_path = PathBuf::from(output.as_deref().unwrap_or(DEFAULT_CONFIG_PATH));

    if output_path.exists() && !force {
        eprintln!(
            "Config file already exists: {}\nUse --force to overwrite.",
            output_path.display()
        );
        std::process::exit(1);
    }

    if let Some(parent) = output_path.parent()
        && !parent.as_os_str().is_empty()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        eprintln!("Failed to create directory {}: {}", parent.display(), e);
        std::process::exit(1);
    }

    if let Err(e) = std::fs::write(&output_path, config::EXAMPLE_CONFIG) {
        eprintln!("Failed to write config file: {}", e);
        std::process::exit(1);
    }

    println!("Created config file: {}", output_path.display());
    println!();
    println!("Set JWT_SECRET (at least 16 bytes), then create the first admin:");
    println!("  lyceum create-admin --email admin@example.com --first-name Ada --last-name Admin");
    println!();
    println!("To start the server, run:");
    println!("  lyceum serve");
}

async fn run_migrate(explicit_config_path: Option<&str>) {
    let (config_path, config) = load_config(explicit_config_path);
    init_tracing_or_exit(&config);

    tracing::info!(
        config_file = %config_path.display(),
        "Running database migrations"
    );

    let pool = match db::DbPool::from_config(&config.database).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database");
            eprintln!("Error: Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    let result = pool.run_migrations().await;
    pool.close().await;

    if let Err(e) = result {
        tracing::error!(error = %e, "Database migrations failed");
        eprintln!("Error: Database migrations failed: {}", e);
        std::process::exit(1);
    }
    tracing::info!("Database migrations completed successfully");
}

async fn run_create_admin(explicit_config_path: Option<&str>, input: models::CreateUser) {
    let (_, config) = load_config(explicit_config_path);
    init_tracing_or_exit(&config);

    if input.password.is_empty() {
        eprintln!("Error: provide --password or set {}", ADMIN_PASSWORD_ENV);
        std::process::exit(1);
    }
    if let Err(e) = input.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let state = match AppState::new(config).await {
        Ok(state) => state,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = state.services.auth.bootstrap_admin(input).await;
    state.db.close().await;

    match result {
        Ok(user) => println!("Created admin {} ({})", user.email, user.id),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run_server(explicit_config_path: Option<&str>) {
    let (config_path, config) = load_config(explicit_config_path);
    init_tracing_or_exit(&config);

    tracing::info!(
        config_file = %config_path.display(),
        "Starting Lyceum"
    );

    if !config.auth.secure_cookies && !config.server.host.is_loopback() {
        tracing::warn!(
            bind_address = %config.server.host,
            "Session cookies are not marked Secure on a non-local bind address. \
             Set auth.secure_cookies = true when serving over HTTPS."
        );
    }

    let state = match AppState::new(config.clone()).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize application state");
            std::process::exit(1);
        }
    };
    let db = state.db.clone();
    let app = build_app(&config, state);

    let bind_addr = (config.server.host, config.server.port);
    let listener = match tokio::net::TcpListener::bind(bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, host = %bind_addr.0, port = bind_addr.1, "Failed to bind");
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Server listening on http://{}:{}",
        config.server.host,
        config.server.port
    );

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    db.close().await;
    tracing::info!("Shutdown complete");

    if let Err(e) = served {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining in-flight requests");
}
