use diesel::connection::SimpleConnection;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection};
use diesel::sql_types::{Nullable, Text};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::time::Duration;
use thiserror::Error;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

diesel::define_sql_function! {
    /// Unicode-aware lowercase. SQLite's built-in `lower` only folds ASCII.
    fn lower_unicode(x: Nullable<Text>) -> Nullable<Text>;
}

#[derive(Error, Debug)]
pub enum PoolSetupError {
    #[error("Failed to create database pool: {0}")]
    Pool(#[from] r2d2::PoolError),

    #[error("Failed to run database migrations: {0}")]
    Migrations(String),
}

/// Per-connection SQLite settings. Foreign keys are off by default in SQLite and
/// the cascading deletes depend on them. Also registers [`lower_unicode`], which
/// search needs on every connection.
#[derive(Debug)]
struct SqliteOptions {
    busy_timeout: Duration,
}

impl CustomizeConnection<SqliteConnection, r2d2::Error> for SqliteOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = {};",
            self.busy_timeout.as_millis()
        ))
        .map_err(r2d2::Error::QueryError)?;

        lower_unicode_utils::register_impl(conn, |x: Option<String>| {
            x.map(|s| s.to_lowercase())
        })
        .map_err(r2d2::Error::QueryError)
    }
}

/// Build the pool and bring the schema up to date.
///
/// `:memory:` databases live and die with their connection, so they get exactly one
/// connection that is never recycled.
pub fn create_pool(database_url: &str, max_size: u32) -> Result<DbPool, PoolSetupError> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let in_memory = database_url == ":memory:";

    let mut builder = r2d2::Pool::builder().connection_customizer(Box::new(SqliteOptions {
        busy_timeout: BUSY_TIMEOUT,
    }));
    if in_memory {
        builder = builder.max_size(1).idle_timeout(None).max_lifetime(None);
    } else {
        builder = builder.max_size(max_size);
    }
    let pool = builder.build(manager)?;

    // Run pending migrations on startup
    let mut conn = pool.get()?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| PoolSetupError::Migrations(e.to_string()))?;
    if !applied.is_empty() {
        tracing::info!("Applied {} database migration(s)", applied.len());
    }

    Ok(pool)
}
