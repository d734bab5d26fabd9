//! Login session: the SQLite-backed token store and the explicit
//! [`Session`] value handed to whatever issues backend calls.

use std::path::Path;

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use tracing::{debug, info};

use crate::errors::Result;

/// Authentication context for one console run.
///
/// Loaded once at start-up from the [`SessionStore`]; never read from any
/// global afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
    username: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(token: impl Into<String>, username: Option<String>) -> Self {
        Self {
            token: Some(token.into()),
            username,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Sensitive columns (pledges, expense amounts) are only shown when
    /// this is true.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    pool: SqlitePool,
}

impl SessionStore {
    /// Open (creating if needed) the session database and run migrations.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        Self::migrate(pool).await
    }

    /// In-memory store, used by tests.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Self::migrate(pool).await
    }

    async fn migrate(pool: SqlitePool) -> Result<Self> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        debug!("Session store migrations applied");
        Ok(Self { pool })
    }

    /// Read the persisted session; anonymous when nobody is logged in.
    pub async fn load(&self) -> Result<Session> {
        let row: Option<(Option<String>, Option<String>)> =
            sqlx::query_as("SELECT access_token, username FROM session WHERE id = 1")
                .fetch_optional(&self.pool)
                .await?;

        Ok(match row {
            Some((Some(token), username)) => Session::authenticated(token, username),
            _ => Session::anonymous(),
        })
    }

    /// Persist a freshly issued token.
    pub async fn save(&self, session: &Session) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE session
            SET    access_token = ?1,
                   username     = ?2,
                   updated_at   = strftime('%s', 'now')
            WHERE  id = 1
            "#,
        )
        .bind(session.token())
        .bind(session.username())
        .execute(&self.pool)
        .await?;
        info!("Session saved for {}", session.username().unwrap_or("<unknown>"));
        Ok(())
    }

    /// Forget the token (logout).
    pub async fn clear(&self) -> Result<()> {
        sqlx::query(
            "UPDATE session SET access_token = NULL, username = NULL, \
             updated_at = strftime('%s', 'now') WHERE id = 1",
        )
        .execute(&self.pool)
        .await?;
        info!("Session cleared");
        Ok(())
    }
}
