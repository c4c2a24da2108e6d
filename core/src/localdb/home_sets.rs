// SPDX-FileCopyrightText: 2026 davmirror contributors
//
// SPDX-License-Identifier: Apache-2.0

use sqlx::SqlitePool;

/// Store for home set rows.
#[derive(Debug, Clone)]
pub struct HomeSets {
    pool: SqlitePool,
}

impl HomeSets {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All home sets of a service.
    pub async fn by_service(&self, service_id: i64) -> Result<Vec<HomeSetRecord>, sqlx::Error> {
        const SQL: &str = "\
SELECT id, service_id, url, personal, priv_bind, display_name
FROM home_sets
WHERE service_id = ?
ORDER BY id;
";

        sqlx::query_as(SQL)
            .bind(service_id)
            .fetch_all(&self.pool)
            .await
    }

    /// Inserts a home set or, when the URL is already known for the
    /// service, updates its `personal` flag. Returns the row id.
    pub async fn upsert_by_url(
        &self,
        service_id: i64,
        url: &str,
        personal: bool,
    ) -> Result<i64, sqlx::Error> {
        const SQL: &str = "\
INSERT INTO home_sets (service_id, url, personal)
VALUES (?, ?, ?)
ON CONFLICT(service_id, url) DO UPDATE SET
    personal = excluded.personal
RETURNING id;
";

        sqlx::query_scalar(SQL)
            .bind(service_id)
            .bind(url)
            .bind(personal)
            .fetch_one(&self.pool)
            .await
    }

    /// Updates the server-reported metadata of a home set.
    pub async fn update_meta(
        &self,
        id: i64,
        display_name: Option<&str>,
        priv_bind: bool,
    ) -> Result<(), sqlx::Error> {
        const SQL: &str = "\
UPDATE home_sets
SET display_name = ?, priv_bind = ?
WHERE id = ?;
";

        sqlx::query(SQL)
            .bind(display_name)
            .bind(priv_bind)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Deletes a home set. Member collections are detached, not deleted
    /// (their `home_set_id` foreign key is SET NULL).
    pub async fn delete(&self, id: i64) -> Result<(), sqlx::Error> {
        const SQL: &str = "DELETE FROM home_sets WHERE id = ?;";

        sqlx::query(SQL).bind(id).execute(&self.pool).await?;

        Ok(())
    }
}

/// A URL known to aggregate zero or more collections for a service.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HomeSetRecord {
    /// Row id.
    pub id: i64,
    /// Owning service.
    pub service_id: i64,
    /// Absolute URL, unique per service, ends in a slash.
    pub url: String,
    /// True when directly owned by the account's own principal, false when
    /// reached via delegation or group membership.
    pub personal: bool,
    /// Whether new collections may be created here.
    pub priv_bind: bool,
    /// Server-reported display name.
    pub display_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use crate::localdb::{LocalDb, NewCollection};
    use crate::types::{CollectionType, ServiceType};

    async fn setup() -> (LocalDb, i64) {
        let db = LocalDb::open(None)
            .await
            .expect("Failed to create test database");
        let service_id = db
            .services
            .insert("test@example.com", ServiceType::CardDav, None)
            .await
            .expect("Failed to insert service");
        (db, service_id)
    }

    #[tokio::test]
    async fn upsert_by_url_is_unique_per_service() {
        let (db, service_id) = setup().await;
        let url = "https://example.com/dav/addressbooks/user/";

        let id = db.home_sets.upsert_by_url(service_id, url, true).await.unwrap();
        let id_again = db.home_sets.upsert_by_url(service_id, url, false).await.unwrap();
        assert_eq!(id, id_again);

        let rows = db.home_sets.by_service(service_id).await.unwrap();
        assert_eq!(rows.len(), 1);
        // the later upsert won: reached via delegation now
        assert!(!rows[0].personal);
        assert!(rows[0].priv_bind);
    }

    #[tokio::test]
    async fn delete_detaches_member_collections() {
        let (db, service_id) = setup().await;
        let home_set_id = db
            .home_sets
            .upsert_by_url(service_id, "https://example.com/dav/", true)
            .await
            .unwrap();
        let collection_id = db
            .collections
            .upsert_by_url(&NewCollection {
                service_id,
                home_set_id: Some(home_set_id),
                owner_id: None,
                kind: CollectionType::AddressBook,
                url: "https://example.com/dav/contacts/",
                display_name: None,
                description: None,
                color: None,
                timezone: None,
                supports_vevent: None,
                supports_vtodo: None,
                supports_vjournal: None,
                source: None,
                priv_write_content: true,
                priv_unbind: true,
                sync: false,
            })
            .await
            .unwrap();

        db.home_sets.delete(home_set_id).await.unwrap();

        assert!(db.home_sets.by_service(service_id).await.unwrap().is_empty());
        let homeless = db
            .collections
            .by_service_and_home_set(service_id, None)
            .await
            .unwrap();
        assert_eq!(homeless.len(), 1);
        assert_eq!(homeless[0].id, collection_id);
    }
}
