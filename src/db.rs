use anyhow::{Context, Result};
use directories::ProjectDirs;
use sqlx::{any::AnyConnectOptions, AnyPool, ConnectOptions, migrate::Migrator};
use sqlx::any::AnyPoolOptions;
use std::path::Path;
use std::{path::PathBuf, str::FromStr};
use std::sync::Once;

use crate::storage::Storage;

// Ensure drivers are installed exactly once for sqlx::any
static INSTALL_DRIVERS: Once = Once::new();

// Embed SQL migrations from the migrations/ directory
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// SQLite-backed local storage.
#[derive(Clone)]
pub struct Database {
    pool: AnyPool,
}

impl Database {
    // Create a connection pool. If database_url is None, use a sensible default
    // (SQLite file in the user's data directory).
    pub async fn connect(database_url: Option<&str>) -> Result<Self> {
        INSTALL_DRIVERS.call_once(sqlx::any::install_default_drivers);

        let url = match database_url {
            Some(u) if !u.trim().is_empty() => u.to_string(),
            _ => default_sqlite_url()?,
        };

        let opts = AnyConnectOptions::from_str(&url)
            .with_context(|| format!("invalid database URL: {url}"))?;
        // Quiet by default; callers can enable SQLX_LOG if they want
        let opts = opts.disable_statement_logging();

        // Each connection to an in-memory database gets its own empty database
        let max_connections = if url.contains(":memory:") { 1 } else { 4 };

        let pool = AnyPoolOptions::new()
            .max_connections(max_connections)
            .connect_with(opts)
            .await
            .with_context(|| format!("failed to connect to database: {url}"))?;

        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Open (creating if needed) a database file at an explicit path.
    pub async fn open_file(path: &Path) -> Result<Self> {
        Self::connect(Some(&sqlite_url_for(path))).await
    }

    async fn run_migrations(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await.context("running migrations")
    }

    pub fn pool(&self) -> &AnyPool { &self.pool }
}

#[async_trait::async_trait]
impl Storage for Database {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query_scalar::<_, String>("SELECT value FROM local_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO local_store(key, value) VALUES (?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM local_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn default_sqlite_url() -> Result<String> {
    let proj = ProjectDirs::from("com", "greentech", "greentech-admin")
        .context("unable to determine data directory for default sqlite path")?;
    let mut path: PathBuf = proj.data_dir().to_path_buf();
    std::fs::create_dir_all(&path)
        .with_context(|| format!("creating data dir: {}", path.display()))?;
    path.push("greentech-admin.db");
    Ok(sqlite_url_for(&path))
}

fn sqlite_url_for(path: &Path) -> String {
    // Encode spaces in the path for a valid sqlite URL
    let path_str = path.to_string_lossy().replace(' ', "%20");
    format!("sqlite://{path_str}?mode=rwc")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_store_survives_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("store.db");

        let db = Database::open_file(&path).await.unwrap();
        db.put("auth_token", "abc").await.unwrap();
        db.put("auth_token", "def").await.unwrap();
        drop(db);

        let db = Database::open_file(&path).await.unwrap();
        assert_eq!(db.get("auth_token").await.unwrap().as_deref(), Some("def"));
        db.delete("auth_token").await.unwrap();
        assert_eq!(db.get("auth_token").await.unwrap(), None);
    }

    #[test]
    fn sqlite_url_escapes_spaces() {
        let url = sqlite_url_for(Path::new("/tmp/my dir/x.db"));
        assert_eq!(url, "sqlite:///tmp/my%20dir/x.db?mode=rwc");
    }
}
