// SPDX-FileCopyrightText: 2026 davmirror contributors
//
// SPDX-License-Identifier: Apache-2.0

use sqlx::SqlitePool;

use crate::types::ServiceType;

/// Store for service rows.
#[derive(Debug, Clone)]
pub struct Services {
    pool: SqlitePool,
}

impl Services {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts a service for an account, returning its id. One account has
    /// at most one service per kind.
    pub async fn insert(
        &self,
        account: &str,
        kind: ServiceType,
        principal_url: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        const SQL: &str = "\
INSERT INTO services (account, kind, principal_url)
VALUES (?, ?, ?)
RETURNING id;
";

        sqlx::query_scalar(SQL)
            .bind(account)
            .bind(kind)
            .bind(principal_url)
            .fetch_one(&self.pool)
            .await
    }

    /// Looks a service up by id.
    pub async fn get(&self, id: i64) -> Result<Option<ServiceRecord>, sqlx::Error> {
        const SQL: &str = "\
SELECT id, account, kind, principal_url
FROM services
WHERE id = ?;
";

        sqlx::query_as(SQL).bind(id).fetch_optional(&self.pool).await
    }

    /// Deletes a service and, via foreign keys, everything it owned.
    pub async fn delete(&self, id: i64) -> Result<(), sqlx::Error> {
        const SQL: &str = "DELETE FROM services WHERE id = ?;";

        sqlx::query(SQL).bind(id).execute(&self.pool).await?;

        Ok(())
    }
}

/// One CalDAV or CardDAV endpoint bound to one account.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ServiceRecord {
    /// Row id.
    pub id: i64,
    /// Account name.
    pub account: String,
    /// Service kind.
    pub kind: ServiceType,
    /// Principal URL discovered at account setup, if any.
    pub principal_url: Option<String>,
}
