//! Session-store migration commands.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string for storefront
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string for admin
//!
//! Both fall back to `DATABASE_URL`.

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use thiserror::Error;
use tower_sessions_sqlx_store::PostgresStore;

/// Errors from a migration run.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0} (or DATABASE_URL)")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Create the storefront session table.
///
/// # Errors
///
/// Returns an error if the URL is missing or the database rejects the DDL.
pub async fn storefront() -> Result<(), MigrationError> {
    run("storefront", "STOREFRONT_DATABASE_URL").await
}

/// Create the admin session table.
///
/// # Errors
///
/// Returns an error if the URL is missing or the database rejects the DDL.
pub async fn admin() -> Result<(), MigrationError> {
    run("admin", "ADMIN_DATABASE_URL").await
}

async fn run(target: &str, env_var: &'static str) -> Result<(), MigrationError> {
    let _ = dotenvy::dotenv();
    let database_url = database_url(env_var, |key| std::env::var(key).ok())?;

    tracing::info!("Connecting to {target} database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Creating {target} session table...");
    PostgresStore::new(pool).migrate().await?;

    tracing::info!("{target} migrations complete");
    Ok(())
}

/// Resolve the connection string, preferring the crate-specific variable.
fn database_url(
    primary: &'static str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, MigrationError> {
    lookup(primary)
        .or_else(|| lookup("DATABASE_URL"))
        .filter(|v| !v.trim().is_empty())
        .map(SecretString::from)
        .ok_or(MigrationError::MissingEnvVar(primary))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_prefers_specific_url() {
        let url = database_url("ADMIN_DATABASE_URL", |key| match key {
            "ADMIN_DATABASE_URL" => Some("postgres://localhost/aurelle_admin".to_string()),
            "DATABASE_URL" => Some("postgres://localhost/other".to_string()),
            _ => None,
        });
        assert_eq!(
            url.map(|u| u.expose_secret().to_string()).ok().as_deref(),
            Some("postgres://localhost/aurelle_admin")
        );
    }

    #[test]
    fn test_falls_back_to_database_url() {
        let url = database_url("STOREFRONT_DATABASE_URL", |key| {
            (key == "DATABASE_URL").then(|| "postgres://localhost/shared".to_string())
        });
        assert!(url.is_ok());
    }

    #[test]
    fn test_missing_url() {
        let err = database_url("STOREFRONT_DATABASE_URL", |_| None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing environment variable: STOREFRONT_DATABASE_URL (or DATABASE_URL)"
        );
    }
}
