// SPDX-FileCopyrightText: 2026 davmirror contributors
//
// SPDX-License-Identifier: Apache-2.0

use sqlx::SqlitePool;

use crate::types::CollectionType;

/// Store for collection rows.
#[derive(Debug, Clone)]
pub struct Collections {
    pool: SqlitePool,
}

impl Collections {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All collections of a service.
    pub async fn by_service(&self, service_id: i64) -> Result<Vec<CollectionRecord>, sqlx::Error> {
        const SQL: &str = "\
SELECT id, service_id, home_set_id, owner_id, kind, url, display_name, description,
       color, timezone, supports_vevent, supports_vtodo, supports_vjournal, source,
       priv_write_content, priv_unbind, force_read_only, sync
FROM collections
WHERE service_id = ?
ORDER BY id;
";

        sqlx::query_as(SQL)
            .bind(service_id)
            .fetch_all(&self.pool)
            .await
    }

    /// Collections of a service assigned to the given home set; `None`
    /// selects the homeless ones.
    pub async fn by_service_and_home_set(
        &self,
        service_id: i64,
        home_set_id: Option<i64>,
    ) -> Result<Vec<CollectionRecord>, sqlx::Error> {
        const SQL: &str = "\
SELECT id, service_id, home_set_id, owner_id, kind, url, display_name, description,
       color, timezone, supports_vevent, supports_vtodo, supports_vjournal, source,
       priv_write_content, priv_unbind, force_read_only, sync
FROM collections
WHERE service_id = ? AND home_set_id IS ?
ORDER BY id;
";

        sqlx::query_as(SQL)
            .bind(service_id)
            .bind(home_set_id)
            .fetch_all(&self.pool)
            .await
    }

    /// Looks a collection up by its URL.
    pub async fn get_by_url(
        &self,
        service_id: i64,
        url: &str,
    ) -> Result<Option<CollectionRecord>, sqlx::Error> {
        const SQL: &str = "\
SELECT id, service_id, home_set_id, owner_id, kind, url, display_name, description,
       color, timezone, supports_vevent, supports_vtodo, supports_vjournal, source,
       priv_write_content, priv_unbind, force_read_only, sync
FROM collections
WHERE service_id = ? AND url = ?;
";

        sqlx::query_as(SQL)
            .bind(service_id)
            .bind(url)
            .fetch_optional(&self.pool)
            .await
    }

    /// Inserts a discovered collection or updates the existing row with the
    /// same URL, returning the row id.
    ///
    /// The merge is the one place where user flags are protected: on
    /// conflict every server-derived column is overwritten, while
    /// `force_read_only` and `sync` keep their stored values. The `sync`
    /// value of `new` is only an initial default for first discovery.
    pub async fn upsert_by_url(&self, new: &NewCollection<'_>) -> Result<i64, sqlx::Error> {
        const SQL: &str = "\
INSERT INTO collections (
    service_id, home_set_id, owner_id, kind, url, display_name, description,
    color, timezone, supports_vevent, supports_vtodo, supports_vjournal, source,
    priv_write_content, priv_unbind, sync
)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
ON CONFLICT(service_id, url) DO UPDATE SET
    home_set_id        = excluded.home_set_id,
    owner_id           = excluded.owner_id,
    kind               = excluded.kind,
    display_name       = excluded.display_name,
    description        = excluded.description,
    color              = excluded.color,
    timezone           = excluded.timezone,
    supports_vevent    = excluded.supports_vevent,
    supports_vtodo     = excluded.supports_vtodo,
    supports_vjournal  = excluded.supports_vjournal,
    source             = excluded.source,
    priv_write_content = excluded.priv_write_content,
    priv_unbind        = excluded.priv_unbind
RETURNING id;
";

        sqlx::query_scalar(SQL)
            .bind(new.service_id)
            .bind(new.home_set_id)
            .bind(new.owner_id)
            .bind(new.kind)
            .bind(new.url)
            .bind(new.display_name)
            .bind(new.description)
            .bind(new.color)
            .bind(new.timezone)
            .bind(new.supports_vevent)
            .bind(new.supports_vtodo)
            .bind(new.supports_vjournal)
            .bind(new.source)
            .bind(new.priv_write_content)
            .bind(new.priv_unbind)
            .bind(new.sync)
            .fetch_one(&self.pool)
            .await
    }

    /// Moves a collection to another home set; `None` marks it homeless.
    pub async fn set_home_set(
        &self,
        id: i64,
        home_set_id: Option<i64>,
    ) -> Result<(), sqlx::Error> {
        const SQL: &str = "UPDATE collections SET home_set_id = ? WHERE id = ?;";

        sqlx::query(SQL)
            .bind(home_set_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Sets the user-controlled flags of a collection.
    pub async fn set_flags(
        &self,
        id: i64,
        force_read_only: bool,
        sync: bool,
    ) -> Result<(), sqlx::Error> {
        const SQL: &str = "UPDATE collections SET force_read_only = ?, sync = ? WHERE id = ?;";

        sqlx::query(SQL)
            .bind(force_read_only)
            .bind(sync)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Hard-deletes a collection row.
    pub async fn delete(&self, id: i64) -> Result<(), sqlx::Error> {
        const SQL: &str = "DELETE FROM collections WHERE id = ?;";

        sqlx::query(SQL).bind(id).execute(&self.pool).await?;

        Ok(())
    }
}

/// A syncable resource: address book, calendar or webcal subscription.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CollectionRecord {
    /// Row id.
    pub id: i64,
    /// Owning service.
    pub service_id: i64,
    /// Home set the collection belongs to; `None` means homeless.
    pub home_set_id: Option<i64>,
    /// Owning principal, when the server reported one.
    pub owner_id: Option<i64>,
    /// Collection kind.
    pub kind: CollectionType,
    /// Absolute URL, unique per service.
    pub url: String,
    /// Server-reported display name.
    pub display_name: Option<String>,
    /// Server-reported description.
    pub description: Option<String>,
    /// Calendar color.
    pub color: Option<String>,
    /// Calendar timezone definition.
    pub timezone: Option<String>,
    /// Whether VEVENT is supported; `None` means the server never said.
    pub supports_vevent: Option<bool>,
    /// Whether VTODO is supported; `None` means the server never said.
    pub supports_vtodo: Option<bool>,
    /// Whether VJOURNAL is supported; `None` means the server never said.
    pub supports_vjournal: Option<bool>,
    /// Webcal subscription source URL.
    pub source: Option<String>,
    /// Whether the current user may change member content.
    pub priv_write_content: bool,
    /// Whether the current user may delete members.
    pub priv_unbind: bool,
    /// User flag: never write to this collection. Survives refresh.
    pub force_read_only: bool,
    /// User flag: synchronize this collection. Survives refresh.
    pub sync: bool,
}

/// A collection row about to be written, with server-derived values only.
#[derive(Debug, Clone)]
pub struct NewCollection<'a> {
    /// Owning service.
    pub service_id: i64,
    /// Home set the collection was found in, if any.
    pub home_set_id: Option<i64>,
    /// Owning principal row, if any.
    pub owner_id: Option<i64>,
    /// Collection kind.
    pub kind: CollectionType,
    /// Absolute URL.
    pub url: &'a str,
    /// Display name.
    pub display_name: Option<&'a str>,
    /// Description.
    pub description: Option<&'a str>,
    /// Calendar color.
    pub color: Option<&'a str>,
    /// Calendar timezone definition.
    pub timezone: Option<&'a str>,
    /// VEVENT support tri-state.
    pub supports_vevent: Option<bool>,
    /// VTODO support tri-state.
    pub supports_vtodo: Option<bool>,
    /// VJOURNAL support tri-state.
    pub supports_vjournal: Option<bool>,
    /// Webcal source URL.
    pub source: Option<&'a str>,
    /// Write-content privilege.
    pub priv_write_content: bool,
    /// Unbind privilege.
    pub priv_unbind: bool,
    /// Initial sync flag for first discovery; ignored on update.
    pub sync: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::localdb::LocalDb;
    use crate::types::ServiceType;

    async fn setup() -> (LocalDb, i64) {
        let db = LocalDb::open(None)
            .await
            .expect("Failed to create test database");
        let service_id = db
            .services
            .insert("test@example.com", ServiceType::CalDav, None)
            .await
            .expect("Failed to insert service");
        (db, service_id)
    }

    fn calendar<'a>(service_id: i64, url: &'a str, display_name: Option<&'a str>) -> NewCollection<'a> {
        NewCollection {
            service_id,
            home_set_id: None,
            owner_id: None,
            kind: CollectionType::Calendar,
            url,
            display_name,
            description: None,
            color: None,
            timezone: None,
            supports_vevent: Some(true),
            supports_vtodo: None,
            supports_vjournal: None,
            source: None,
            priv_write_content: true,
            priv_unbind: true,
            sync: false,
        }
    }

    #[tokio::test]
    async fn upsert_preserves_user_flags() {
        let (db, service_id) = setup().await;
        let url = "https://example.com/dav/work/";

        let id = db
            .collections
            .upsert_by_url(&calendar(service_id, url, Some("Work")))
            .await
            .unwrap();
        db.collections.set_flags(id, true, true).await.unwrap();

        // a later refresh reports a new display name and a false sync default
        let id_again = db
            .collections
            .upsert_by_url(&calendar(service_id, url, Some("Work (renamed)")))
            .await
            .unwrap();
        assert_eq!(id, id_again);

        let record = db
            .collections
            .get_by_url(service_id, url)
            .await
            .unwrap()
            .expect("Collection missing");
        assert_eq!(record.display_name.as_deref(), Some("Work (renamed)"));
        assert!(record.force_read_only);
        assert!(record.sync);
    }

    #[tokio::test]
    async fn upsert_applies_sync_default_on_first_insert() {
        let (db, service_id) = setup().await;
        let mut new = calendar(service_id, "https://example.com/dav/work/", None);
        new.sync = true;

        db.collections.upsert_by_url(&new).await.unwrap();
        let record = db
            .collections
            .get_by_url(service_id, new.url)
            .await
            .unwrap()
            .expect("Collection missing");
        assert!(record.sync);
        assert!(!record.force_read_only);
    }

    #[tokio::test]
    async fn by_service_and_home_set_filters_homeless() {
        let (db, service_id) = setup().await;
        let home_set_id = db
            .home_sets
            .upsert_by_url(service_id, "https://example.com/dav/", true)
            .await
            .unwrap();

        let mut assigned = calendar(service_id, "https://example.com/dav/work/", None);
        assigned.home_set_id = Some(home_set_id);
        let assigned_id = db.collections.upsert_by_url(&assigned).await.unwrap();
        let homeless = calendar(service_id, "https://example.com/dav/old/", None);
        let homeless_id = db.collections.upsert_by_url(&homeless).await.unwrap();

        let rows = db
            .collections
            .by_service_and_home_set(service_id, Some(home_set_id))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, assigned_id);

        let rows = db
            .collections
            .by_service_and_home_set(service_id, None)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, homeless_id);

        db.collections.set_home_set(assigned_id, None).await.unwrap();
        let rows = db
            .collections
            .by_service_and_home_set(service_id, None)
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
    }
}
