// SPDX-FileCopyrightText: 2026 davmirror contributors
//
// SPDX-License-Identifier: Apache-2.0

mod collections;
mod home_sets;
mod principals;
mod services;

use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

pub use crate::localdb::collections::{CollectionRecord, Collections, NewCollection};
pub use crate::localdb::home_sets::{HomeSetRecord, HomeSets};
pub use crate::localdb::principals::{PrincipalRecord, Principals};
pub use crate::localdb::services::{ServiceRecord, Services};

use crate::error::RefreshError;

/// The local relational mirror of discovered services, home sets,
/// collections and principals.
///
/// `LocalDb` exclusively owns persistence: refresh components read and write
/// through it and never hold authoritative copies across calls.
#[derive(Debug, Clone)]
pub struct LocalDb {
    pool: SqlitePool,

    /// Service rows, one per CalDAV/CardDAV endpoint of an account.
    pub services: Services,
    /// Home set rows.
    pub home_sets: HomeSets,
    /// Collection rows.
    pub collections: Collections,
    /// Principal rows.
    pub principals: Principals,
}

impl LocalDb {
    /// Opens a sqlite database connection.
    /// If `filename` is `None`, it opens an in-memory database.
    pub async fn open(filename: Option<&Path>) -> Result<Self, RefreshError> {
        let options = if let Some(filename) = filename {
            tracing::info!(file = %filename.display(), "connecting to SQLite database");
            SqliteConnectOptions::new()
                .filename(filename)
                .create_if_missing(true)
                .foreign_keys(true)
        } else {
            tracing::info!("connecting to in-memory SQLite database");
            SqliteConnectOptions::new().in_memory(true).foreign_keys(true)
        };

        // An in-memory database exists per connection; a pool with more than
        // one would see different databases.
        let pool_options = if filename.is_some() {
            SqlitePoolOptions::new()
        } else {
            SqlitePoolOptions::new().min_connections(1).max_connections(1)
        };
        let pool = pool_options.connect_with(options).await?;

        sqlx::migrate!("src/localdb/migrations") // relative path from the crate root
            .run(&pool)
            .await
            .map_err(|e| RefreshError::Db(e.into()))?;

        tracing::debug!("ensuring tables in the database");
        let services = Services::new(pool.clone());
        let home_sets = HomeSets::new(pool.clone());
        let collections = Collections::new(pool.clone());
        let principals = Principals::new(pool.clone());
        Ok(LocalDb {
            pool,
            services,
            home_sets,
            collections,
            principals,
        })
    }

    /// Closes the database connection.
    pub async fn close(self) {
        tracing::debug!("closing database connection");
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ServiceType;

    #[tokio::test]
    async fn reopens_file_backed_database() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("davmirror.db");

        let db = LocalDb::open(Some(path.as_path()))
            .await
            .expect("Failed to open database");
        let service_id = db
            .services
            .insert("test@example.com", ServiceType::CalDav, None)
            .await
            .expect("Failed to insert service");
        db.close().await;

        let db = LocalDb::open(Some(path.as_path()))
            .await
            .expect("Failed to reopen database");
        let service = db
            .services
            .get(service_id)
            .await
            .expect("Failed to query service")
            .expect("Service missing after reopen");
        assert_eq!(service.account, "test@example.com");
    }
}
