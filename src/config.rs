// src/config.rs

use std::{env, str::FromStr, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{ReceivingRepository, SalesRepository, UserRepository},
    services::{auth::AuthService, receiving_service::ReceivingService, sales_service::SalesService},
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_PAGE_SIZE: i64 = 20;

/// Settings read from the environment (and `.env`, when present).
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub receiving_page_size: i64,
}

/// Parses an optional raw value, falling back to `default` when it is unset.
fn parse_or<T: FromStr>(name: &str, raw: Option<String>, default: T) -> anyhow::Result<T> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{name} has an invalid value: '{value}'")),
    }
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let db_max_connections = parse_or(
            "DB_MAX_CONNECTIONS",
            env::var("DB_MAX_CONNECTIONS").ok(),
            DEFAULT_MAX_CONNECTIONS,
        )?;
        let receiving_page_size = parse_or(
            "RECEIVING_PAGE_SIZE",
            env::var("RECEIVING_PAGE_SIZE").ok(),
            DEFAULT_PAGE_SIZE,
        )?;

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr,
            db_max_connections,
            receiving_page_size,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub settings: Settings,
    pub auth_service: AuthService,
    pub receiving_service: ReceivingService,
    pub sales_service: SalesService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let settings = Settings::from_env()?;

        let db_pool = PgPoolOptions::new()
            .max_connections(settings.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&settings.database_url)
            .await
            .context("failed to connect to the database")?;

        tracing::info!("✅ Connexion à la base de données établie.");

        // --- Dependency graph ---
        let user_repo = UserRepository::new(db_pool.clone());
        let auth_service = AuthService::new(user_repo, settings.jwt_secret.clone());

        let receiving_repo = ReceivingRepository::new(db_pool.clone());
        let receiving_service =
            ReceivingService::new(receiving_repo, db_pool.clone(), settings.receiving_page_size);

        let sales_service = SalesService::new(SalesRepository::new(), db_pool.clone());

        Ok(Self {
            db_pool,
            settings,
            auth_service,
            receiving_service,
            sales_service,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_values_use_the_default() {
        assert_eq!(parse_or("X", None, 20_i64).unwrap(), 20);
    }

    #[test]
    fn set_values_are_parsed() {
        assert_eq!(parse_or("X", Some(" 50 ".into()), 20_i64).unwrap(), 50);
        assert_eq!(parse_or("X", Some("8".into()), 5_u32).unwrap(), 8);
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = parse_or("RECEIVING_PAGE_SIZE", Some("lots".into()), 20_i64).unwrap_err();
        assert!(err.to_string().contains("RECEIVING_PAGE_SIZE"));
    }
}
