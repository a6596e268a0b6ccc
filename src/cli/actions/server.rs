use crate::{
    api::{
        self,
        handlers::auth::{AuthConfig, AuthState},
    },
    cli::telemetry,
    gate::{Gate, GateConfig},
    password::{CredentialVerifier, WorkFactor},
    token::TokenService,
    users::{MemoryUserStore, PgUserStore, UserStore},
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tracing::{info, warn};
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: Option<String>,
    pub jwt_secret: SecretString,
    pub frontend_base_url: String,
    pub work_factor: WorkFactor,
    pub gate: GateConfig,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the configuration is invalid, the database is unreachable or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let tokens = Arc::new(TokenService::new(&args.jwt_secret).context("Invalid JWT secret")?);
    let credentials =
        CredentialVerifier::new(args.work_factor).context("Invalid argon2 work factor")?;

    let users: Arc<dyn UserStore> = match &args.dsn {
        Some(dsn) => {
            let pool = PgPoolOptions::new()
                .min_connections(1)
                .max_connections(5)
                .max_lifetime(Duration::from_secs(60 * 2))
                .test_before_acquire(true)
                .connect(dsn)
                .await
                .context("Failed to connect to database")?;
            Arc::new(PgUserStore::new(pool))
        }
        None => {
            warn!("No --dsn given; users are kept in memory and lost on restart");
            Arc::new(MemoryUserStore::new())
        }
    };

    let auth_state = Arc::new(AuthState::new(
        AuthConfig::new(args.frontend_base_url),
        Arc::clone(&tokens),
        credentials,
        users,
    )?);
    let gate = Arc::new(Gate::new(args.gate, tokens));

    let result = api::new(args.port, auth_state, gate).await;
    telemetry::shutdown_tracer();
    result
}

fn log_startup_args(args: &Args) {
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        (
            "user_store",
            args.dsn
                .as_deref()
                .map_or_else(|| "memory".to_string(), redact_dsn),
        ),
        ("frontend_base_url", args.frontend_base_url.clone()),
        (
            "argon2",
            format!(
                "m={},t={},p={}",
                args.work_factor.memory_kib,
                args.work_factor.iterations,
                args.work_factor.parallelism
            ),
        ),
        ("protected", args.gate.protected_prefixes().join(",")),
        ("auth_only", args.gate.auth_only_paths().join(",")),
    ];

    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!(
        "{} {} - {}\n\nStartup configuration:",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_commit(crate::GIT_COMMIT_HASH)
    );
    for (key, value) in &entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ =
            std::fmt::Write::write_fmt(&mut message, format_args!("\n  {key}:{padding} {value}"));
    }
    info!("{message}");
}

fn redact_dsn(dsn: &str) -> String {
    match Url::parse(dsn) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("REDACTED"));
            }
            parsed.to_string()
        }
        Err(_) => "invalid-dsn".to_string(),
    }
}

fn short_commit(hash: &str) -> &str {
    let trimmed = hash.trim();
    trimmed.get(..7).unwrap_or(trimmed)
}
