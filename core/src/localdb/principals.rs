// SPDX-FileCopyrightText: 2026 davmirror contributors
//
// SPDX-License-Identifier: Apache-2.0

use sqlx::SqlitePool;

/// Store for principal rows.
#[derive(Debug, Clone)]
pub struct Principals {
    pool: SqlitePool,
}

impl Principals {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All principals of a service.
    pub async fn by_service(&self, service_id: i64) -> Result<Vec<PrincipalRecord>, sqlx::Error> {
        const SQL: &str = "\
SELECT id, service_id, url, display_name
FROM principals
WHERE service_id = ?
ORDER BY id;
";

        sqlx::query_as(SQL)
            .bind(service_id)
            .fetch_all(&self.pool)
            .await
    }

    /// Inserts a principal or updates its display name, returning the row
    /// id. A `None` display name never clears a stored one.
    pub async fn upsert_by_url(
        &self,
        service_id: i64,
        url: &str,
        display_name: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        const SQL: &str = "\
INSERT INTO principals (service_id, url, display_name)
VALUES (?, ?, ?)
ON CONFLICT(service_id, url) DO UPDATE SET
    display_name = COALESCE(excluded.display_name, principals.display_name)
RETURNING id;
";

        sqlx::query_scalar(SQL)
            .bind(service_id)
            .bind(url)
            .bind(display_name)
            .fetch_one(&self.pool)
            .await
    }

    /// Principals of a service that own no collection.
    pub async fn without_collections(
        &self,
        service_id: i64,
    ) -> Result<Vec<PrincipalRecord>, sqlx::Error> {
        const SQL: &str = "\
SELECT p.id, p.service_id, p.url, p.display_name
FROM principals p
WHERE p.service_id = ?
  AND NOT EXISTS (SELECT 1 FROM collections c WHERE c.owner_id = p.id);
";

        sqlx::query_as(SQL)
            .bind(service_id)
            .fetch_all(&self.pool)
            .await
    }

    /// Deletes a principal. Collections it owned keep existing with their
    /// `owner_id` foreign key SET NULL.
    pub async fn delete(&self, id: i64) -> Result<(), sqlx::Error> {
        const SQL: &str = "DELETE FROM principals WHERE id = ?;";

        sqlx::query(SQL).bind(id).execute(&self.pool).await?;

        Ok(())
    }
}

/// A WebDAV resource owner.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PrincipalRecord {
    /// Row id.
    pub id: i64,
    /// Owning service.
    pub service_id: i64,
    /// Absolute URL, unique per service.
    pub url: String,
    /// Server-reported display name.
    pub display_name: Option<String>,
}
