// SPDX-FileCopyrightText: 2026 davmirror contributors
//
// SPDX-License-Identifier: Apache-2.0

//! Discovery and reconciliation of the collections a service can sync.
//!
//! A refresh pass walks the account's principal for home sets, re-queries
//! every known home set for member collections, revisits collections that
//! lost their home set, and finally prunes principals that own nothing
//! anymore. Server state is merged into the local store without touching
//! the user-controlled `force_read_only` and `sync` flags of collections
//! that already exist.

use std::collections::{HashMap, HashSet};

use davmirror_dav::{DavClient, Depth, Prop, PropFindEntry, Relation, ensure_trailing_slash};
use url::Url;

use crate::collection::CollectionDescriptor;
use crate::config::RefreshSettings;
use crate::error::RefreshError;
use crate::localdb::{CollectionRecord, HomeSetRecord, LocalDb, NewCollection, ServiceRecord};

/// The full property set requested for collections; covers both service
/// kinds so a webcal subscription inside an address book home set is still
/// recognized.
const COLLECTION_PROPS: &[Prop] = &[
    Prop::ResourceType,
    Prop::CurrentUserPrivilegeSet,
    Prop::DisplayName,
    Prop::Owner,
    Prop::AddressbookDescription,
    Prop::CalendarDescription,
    Prop::CalendarColor,
    Prop::CalendarTimezone,
    Prop::SupportedCalendarComponentSet,
    Prop::Source,
];

/// One refresh pass for one service.
///
/// All network calls run sequentially; dropping the future cancels the pass
/// at the next request boundary. Writes already made stay durable and the
/// next pass reconciles from them, so no cleanup is needed on cancellation.
#[derive(Debug)]
pub struct Refresher<'a> {
    db: &'a LocalDb,
    dav: &'a DavClient,
    service: ServiceRecord,
    settings: &'a RefreshSettings,
}

impl<'a> Refresher<'a> {
    /// Refreshes the home sets, collections and principals of a service.
    ///
    /// Steps run in order: principal resolution (when the service knows its
    /// principal URL), home sets, homeless collections, principals. A fatal
    /// error aborts the remaining steps but does not roll back completed
    /// ones.
    ///
    /// # Errors
    ///
    /// [`RefreshError::ServiceNotFound`] when the id is unknown; otherwise
    /// the first non-tolerated WebDAV or store error.
    pub async fn run(
        db: &'a LocalDb,
        dav: &'a DavClient,
        service_id: i64,
        settings: &'a RefreshSettings,
    ) -> Result<(), RefreshError> {
        let service = db
            .services
            .get(service_id)
            .await?
            .ok_or(RefreshError::ServiceNotFound(service_id))?;
        tracing::info!(
            service = service_id,
            kind = %service.kind,
            account = %service.account,
            "refreshing collection list"
        );

        let refresher = Self {
            db,
            dav,
            service,
            settings,
        };
        refresher.discover_home_sets().await?;
        refresher.refresh_home_sets().await?;
        refresher.refresh_homeless_collections().await?;
        refresher.refresh_principals().await?;
        Ok(())
    }

    /// Discovers the home sets reachable from the service's principal.
    ///
    /// The account's own principal contributes `personal` home sets and a
    /// set of related principals (calendar proxies, group memberships).
    /// Related principals are resolved exactly one hop, with
    /// `personal = false` and without expanding their own relations; the
    /// visited set additionally guards against circular delegation.
    async fn discover_home_sets(&self) -> Result<(), RefreshError> {
        let Some(principal_url) = &self.service.principal_url else {
            return Ok(());
        };
        let root = Url::parse(principal_url)?;

        let mut visited = HashSet::from([root.clone()]);
        let related = self.resolve_principal(&root, true).await?;
        for url in related {
            if !visited.insert(url.clone()) {
                continue;
            }
            self.resolve_principal(&url, false).await?;
        }
        Ok(())
    }

    /// Queries one principal for home sets and stores them. Returns the
    /// related principal URLs found, which is always empty for
    /// `personal = false`.
    async fn resolve_principal(
        &self,
        url: &Url,
        personal: bool,
    ) -> Result<Vec<Url>, RefreshError> {
        let props = self.service.kind.principal_props(personal);
        let result = match self.dav.propfind(url, Depth::Zero, &props).await {
            Ok(result) => result,
            Err(e) if e.is_client_error() => {
                // this principal contributes no home sets
                tracing::warn!(%url, error = %e, "principal query failed, skipping");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut related = Vec::new();
        for entry in result.entries {
            if !entry.is_ok() {
                continue;
            }
            for href in &entry.props.home_sets {
                match entry.url.join(href) {
                    Ok(home_set) => {
                        let home_set = ensure_trailing_slash(&home_set);
                        tracing::debug!(url = %home_set, personal, "found home set");
                        self.db
                            .home_sets
                            .upsert_by_url(self.service.id, home_set.as_str(), personal)
                            .await?;
                    }
                    Err(e) => {
                        tracing::warn!(href, error = %e, "ignoring malformed home set href");
                    }
                }
            }
            if personal {
                let relations = entry
                    .props
                    .proxy_read_for
                    .iter()
                    .chain(&entry.props.proxy_write_for)
                    .chain(&entry.props.group_membership);
                for href in relations {
                    match entry.url.join(href) {
                        Ok(principal) => related.push(principal),
                        Err(e) => {
                            tracing::warn!(href, error = %e, "ignoring malformed principal href");
                        }
                    }
                }
            }
        }
        Ok(related)
    }

    /// Re-queries every known home set and reconciles its member
    /// collections.
    ///
    /// Collections the server no longer reports under their home set are
    /// marked homeless, never deleted here. A home set answering 403, 404
    /// or 410 is deleted; its members are detached by the store.
    async fn refresh_home_sets(&self) -> Result<(), RefreshError> {
        for home_set in self.db.home_sets.by_service(self.service.id).await? {
            tracing::debug!(url = %home_set.url, "refreshing home set");
            let url = Url::parse(&home_set.url)?;

            // Everything currently assigned is a removal candidate until the
            // server reports it again.
            let mut candidates: HashMap<String, CollectionRecord> = self
                .db
                .collections
                .by_service_and_home_set(self.service.id, Some(home_set.id))
                .await?
                .into_iter()
                .map(|collection| (collection.url.clone(), collection))
                .collect();

            let mut props = COLLECTION_PROPS.to_vec();
            props.push(self.service.kind.home_set_prop());
            let result = match self.dav.propfind(&url, Depth::One, &props).await {
                Ok(result) => result,
                Err(e) if e.is_gone() => {
                    tracing::info!(url = %home_set.url, error = %e, "home set is gone, deleting");
                    self.db.home_sets.delete(home_set.id).await?;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            for entry in result.entries {
                if !entry.is_ok() {
                    continue;
                }
                // A member advertising a home set of its own makes that home
                // set known too; it is refreshed on the next pass.
                for href in &entry.props.home_sets {
                    if let Ok(advertised) = entry.url.join(href) {
                        let advertised = ensure_trailing_slash(&advertised);
                        self.db
                            .home_sets
                            .upsert_by_url(self.service.id, advertised.as_str(), home_set.personal)
                            .await?;
                    }
                }
                if entry.relation == Relation::Target {
                    let priv_bind = entry
                        .props
                        .privileges
                        .as_ref()
                        .is_none_or(|privileges| privileges.bind);
                    self.db
                        .home_sets
                        .update_meta(home_set.id, entry.props.display_name.as_deref(), priv_bind)
                        .await?;
                }
                // The target itself may double as a collection on some
                // servers, so it is not skipped here.
                let Some(descriptor) = Self::parse_usable(&entry, &self.service) else {
                    continue;
                };
                let saved_url = descriptor.url.as_str().to_string();
                self.save_collection(descriptor, Some(&home_set)).await?;
                candidates.remove(&saved_url);
            }

            for orphan in candidates.values() {
                tracing::debug!(url = %orphan.url, "collection no longer in home set, detaching");
                self.db.collections.set_home_set(orphan.id, None).await?;
            }
        }
        Ok(())
    }

    /// Revisits collections that are not assigned to any home set, updating
    /// them in place or deleting them when they became inaccessible or
    /// unusable.
    async fn refresh_homeless_collections(&self) -> Result<(), RefreshError> {
        for collection in self
            .db
            .collections
            .by_service_and_home_set(self.service.id, None)
            .await?
        {
            tracing::debug!(url = %collection.url, "refreshing homeless collection");
            let url = Url::parse(&collection.url)?;

            let result = match self.dav.propfind(&url, Depth::Zero, COLLECTION_PROPS).await {
                Ok(result) => result,
                Err(e) if e.is_gone() => {
                    tracing::info!(url = %collection.url, error = %e, "collection is gone, deleting");
                    self.db.collections.delete(collection.id).await?;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let entry = result
                .entries
                .into_iter()
                .find(|entry| entry.relation == Relation::Target);
            match entry {
                Some(entry) if entry.is_ok() => {
                    match Self::parse_usable(&entry, &self.service) {
                        Some(descriptor) => self.save_collection(descriptor, None).await?,
                        None => {
                            tracing::info!(url = %collection.url, "collection no longer usable, deleting");
                            self.db.collections.delete(collection.id).await?;
                        }
                    }
                }
                _ => {
                    tracing::info!(url = %collection.url, "collection not reported, deleting");
                    self.db.collections.delete(collection.id).await?;
                }
            }
        }
        Ok(())
    }

    /// Updates the display names of known principals, then deletes every
    /// principal that owns no collection. Individual query failures are
    /// tolerated; the ownership pass runs once at the end.
    async fn refresh_principals(&self) -> Result<(), RefreshError> {
        for principal in self.db.principals.by_service(self.service.id).await? {
            let url = Url::parse(&principal.url)?;
            let props = [Prop::DisplayName, Prop::ResourceType];
            match self.dav.propfind(&url, Depth::Zero, &props).await {
                Ok(result) => {
                    let entry = result
                        .entries
                        .into_iter()
                        .find(|entry| entry.relation == Relation::Target && entry.is_ok());
                    if let Some(entry) = entry
                        && let Some(display_name) = entry.props.display_name
                    {
                        self.db
                            .principals
                            .upsert_by_url(self.service.id, &principal.url, Some(&display_name))
                            .await?;
                    }
                }
                Err(e) => {
                    tracing::debug!(url = %principal.url, error = %e, "principal query failed, skipping");
                }
            }
        }

        for principal in self
            .db
            .principals
            .without_collections(self.service.id)
            .await?
        {
            tracing::debug!(url = %principal.url, "principal owns no collection, deleting");
            self.db.principals.delete(principal.id).await?;
        }
        Ok(())
    }

    /// Parses an entry into a descriptor and filters it by usability for
    /// the service.
    fn parse_usable(
        entry: &PropFindEntry,
        service: &ServiceRecord,
    ) -> Option<CollectionDescriptor> {
        CollectionDescriptor::from_entry(entry).filter(|d| d.is_usable(service.kind))
    }

    /// Persists a discovered collection, creating or updating its owner
    /// principal first. For rows that already exist the store keeps the
    /// user flags; the `sync` default computed here only applies to first
    /// discovery.
    async fn save_collection(
        &self,
        descriptor: CollectionDescriptor,
        home_set: Option<&HomeSetRecord>,
    ) -> Result<(), RefreshError> {
        let owner_id = match &descriptor.owner {
            Some(owner) => Some(
                self.db
                    .principals
                    .upsert_by_url(self.service.id, owner.as_str(), None)
                    .await?,
            ),
            None => None,
        };

        let personal = home_set.is_some_and(|home_set| home_set.personal);
        let sync = self.settings.sync_all_collections
            || self
                .settings
                .should_preselect(descriptor.url.as_str(), personal);

        tracing::debug!(url = %descriptor.url, kind = %descriptor.kind, "saving collection");
        self.db
            .collections
            .upsert_by_url(&NewCollection {
                service_id: self.service.id,
                home_set_id: home_set.map(|home_set| home_set.id),
                owner_id,
                kind: descriptor.kind,
                url: descriptor.url.as_str(),
                display_name: descriptor.display_name.as_deref(),
                description: descriptor.description.as_deref(),
                color: descriptor.color.as_deref(),
                timezone: descriptor.timezone.as_deref(),
                supports_vevent: descriptor.supports_vevent,
                supports_vtodo: descriptor.supports_vtodo,
                supports_vjournal: descriptor.supports_vjournal,
                source: descriptor.source.as_ref().map(Url::as_str),
                priv_write_content: descriptor.privileges.write_content,
                priv_unbind: descriptor.privileges.unbind,
                sync,
            })
            .await?;
        Ok(())
    }
}
