// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! [`DataStore`] methods on [`Vrf`]s.

use super::DataStore;
use crate::db;
use crate::db::error::public_error_from_diesel;
use crate::db::error::ErrorHandler;
use crate::db::error::TransactionError;
use crate::db::model::{
    RouteTarget, Vrf, VrfExportTarget, VrfImportTarget, VrfUpdate,
};
use async_bb8_diesel::{AsyncConnection, AsyncRunQueryDsl};
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use diesel::result::Error as DieselError;
use ipam_common::api::external::CreateResult;
use ipam_common::api::external::DataPageParams;
use ipam_common::api::external::DeleteResult;
use ipam_common::api::external::Error;
use ipam_common::api::external::ListResultVec;
use ipam_common::api::external::LookupResult;
use ipam_common::api::external::LookupType;
use ipam_common::api::external::PaginationOrder;
use ipam_common::api::external::ResourceType;
use ipam_common::api::external::UpdateResult;
use ipam_db_model::natural_sort_key;
use uuid::Uuid;

/// Pagination marker for [`DataStore::vrfs_list`]: the `(name, rd, id)` of
/// the last VRF seen.
pub type VrfPageMarker = (String, Option<String>, Uuid);

impl DataStore {
    /// Create a VRF
    ///
    /// The route distinguisher, when present, is unique across all VRFs;
    /// the partial unique index rejects the losing side of a concurrent
    /// insert.  VRFs without a distinguisher never collide, and duplicate
    /// `(name, rd)` pairs are deliberately allowed.
    pub async fn vrf_create(&self, vrf: Vrf) -> CreateResult<Vrf> {
        use db::schema::vrf::dsl;
        let label = vrf
            .rd
            .as_ref()
            .map(|rd| rd.to_string())
            .unwrap_or_else(|| vrf.name.to_string());
        diesel::insert_into(dsl::vrf)
            .values(vrf)
            .returning(Vrf::as_returning())
            .get_result_async(&*self.pool_connection().await?)
            .await
            .map_err(|e| match &e {
                DieselError::DatabaseError(
                    DatabaseErrorKind::ForeignKeyViolation,
                    _,
                ) => Error::invalid_request("tenant does not exist"),
                _ => public_error_from_diesel(
                    e,
                    ErrorHandler::Conflict(ResourceType::Vrf, &label),
                ),
            })
    }

    /// Fetch a VRF by id
    pub async fn vrf_fetch(&self, id: Uuid) -> LookupResult<Vrf> {
        use db::schema::vrf::dsl;
        dsl::vrf
            .filter(dsl::id.eq(id))
            .select(Vrf::as_select())
            .first_async(&*self.pool_connection().await?)
            .await
            .map_err(|e| {
                public_error_from_diesel(
                    e,
                    ErrorHandler::NotFoundByLookup(
                        ResourceType::Vrf,
                        LookupType::ById(id),
                    ),
                )
            })
    }

    /// Update a VRF (clobbering update -- no etag)
    pub async fn vrf_update(
        &self,
        id: Uuid,
        updates: VrfUpdate,
    ) -> UpdateResult<Vrf> {
        use db::schema::vrf::dsl;
        let label = updates
            .rd
            .as_ref()
            .and_then(|rd| rd.as_ref())
            .map(|rd| rd.to_string())
            .unwrap_or_default();
        diesel::update(dsl::vrf)
            .filter(dsl::id.eq(id))
            .set(updates)
            .returning(Vrf::as_returning())
            .get_result_async(&*self.pool_connection().await?)
            .await
            .map_err(|e| match &e {
                DieselError::DatabaseError(
                    DatabaseErrorKind::UniqueViolation,
                    _,
                ) => public_error_from_diesel(
                    e,
                    ErrorHandler::Conflict(ResourceType::Vrf, &label),
                ),
                _ => public_error_from_diesel(
                    e,
                    ErrorHandler::NotFoundByLookup(
                        ResourceType::Vrf,
                        LookupType::ById(id),
                    ),
                ),
            })
    }

    /// List VRFs ordered by `(name, rd, id)`.
    ///
    /// Names compare in natural-sort order via the derived key; the
    /// distinguisher and id tie-breaks make the scan deterministic even
    /// though `(name, rd)` pairs may repeat.  VRFs without a distinguisher
    /// sort after those with one under the same name (the database default
    /// for ascending NULL ordering), and the marker predicates below
    /// encode the same position.
    pub async fn vrfs_list(
        &self,
        pagparams: &DataPageParams<'_, VrfPageMarker>,
    ) -> ListResultVec<Vrf> {
        use db::schema::vrf::dsl;

        let mut query =
            dsl::vrf.into_boxed().limit(pagparams.limit.get().into());
        match pagparams.direction {
            PaginationOrder::Ascending => {
                if let Some(marker) = pagparams.marker {
                    let (name, rd, id) = marker;
                    let key = natural_sort_key(name);
                    match rd {
                        Some(rd) => {
                            query = query.filter(
                                dsl::name_key
                                    .gt(key.clone())
                                    .or(dsl::name_key.eq(key.clone()).and(
                                        dsl::rd
                                            .assume_not_null()
                                            .gt(rd.clone()),
                                    ))
                                    .or(dsl::name_key
                                        .eq(key.clone())
                                        .and(dsl::rd.is_null()))
                                    .or(dsl::name_key
                                        .eq(key)
                                        .and(
                                            dsl::rd
                                                .assume_not_null()
                                                .eq(rd.clone()),
                                        )
                                        .and(dsl::id.gt(*id))),
                            );
                        }
                        None => {
                            query = query.filter(
                                dsl::name_key.gt(key.clone()).or(dsl::name_key
                                    .eq(key)
                                    .and(dsl::rd.is_null())
                                    .and(dsl::id.gt(*id))),
                            );
                        }
                    }
                }
                query = query
                    .order(dsl::name_key.asc())
                    .then_order_by(dsl::rd.asc())
                    .then_order_by(dsl::id.asc());
            }
            PaginationOrder::Descending => {
                if let Some(marker) = pagparams.marker {
                    let (name, rd, id) = marker;
                    let key = natural_sort_key(name);
                    match rd {
                        Some(rd) => {
                            query = query.filter(
                                dsl::name_key
                                    .lt(key.clone())
                                    .or(dsl::name_key.eq(key.clone()).and(
                                        dsl::rd
                                            .assume_not_null()
                                            .lt(rd.clone()),
                                    ))
                                    .or(dsl::name_key
                                        .eq(key)
                                        .and(
                                            dsl::rd
                                                .assume_not_null()
                                                .eq(rd.clone()),
                                        )
                                        .and(dsl::id.lt(*id))),
                            );
                        }
                        None => {
                            query = query.filter(
                                dsl::name_key
                                    .lt(key.clone())
                                    .or(dsl::name_key
                                        .eq(key.clone())
                                        .and(dsl::rd.is_not_null()))
                                    .or(dsl::name_key
                                        .eq(key)
                                        .and(dsl::rd.is_null())
                                        .and(dsl::id.lt(*id))),
                            );
                        }
                    }
                }
                query = query
                    .order(dsl::name_key.desc())
                    .then_order_by(dsl::rd.desc())
                    .then_order_by(dsl::id.desc());
            }
        }

        query
            .select(Vrf::as_select())
            .load_async(&*self.pool_connection().await?)
            .await
            .map_err(|e| public_error_from_diesel(e, ErrorHandler::Server))
    }

    /// Delete a VRF along with its import/export membership rows.
    pub async fn vrf_delete(&self, id: Uuid) -> DeleteResult {
        use db::schema::vrf::dsl;
        use db::schema::vrf_export_targets::dsl as export_dsl;
        use db::schema::vrf_import_targets::dsl as import_dsl;

        type TxnError = TransactionError<Error>;
        let conn = self.pool_connection().await?;
        conn.transaction_async(|conn| async move {
            diesel::delete(import_dsl::vrf_import_targets)
                .filter(import_dsl::vrf_id.eq(id))
                .execute_async(&conn)
                .await?;
            diesel::delete(export_dsl::vrf_export_targets)
                .filter(export_dsl::vrf_id.eq(id))
                .execute_async(&conn)
                .await?;
            let rows = diesel::delete(dsl::vrf)
                .filter(dsl::id.eq(id))
                .execute_async(&conn)
                .await?;
            if rows == 0 {
                return Err(TxnError::CustomError(Error::not_found_by_id(
                    ResourceType::Vrf,
                    &id,
                )));
            }
            Ok(())
        })
        .await
        .map_err(|e| match e {
            TxnError::CustomError(e) => e,
            TxnError::Database(e) => {
                public_error_from_diesel(e, ErrorHandler::Server)
            }
        })?;
        info!(self.log, "deleted vrf"; "vrf_id" => %id);
        Ok(())
    }

    /// List the route targets in a VRF's import set, in natural-sort
    /// order of their values.
    pub async fn vrf_import_targets_list(
        &self,
        vrf_id: Uuid,
    ) -> ListResultVec<RouteTarget> {
        use db::schema::route_target::dsl;
        use db::schema::vrf_import_targets::dsl as import_dsl;
        import_dsl::vrf_import_targets
            .inner_join(dsl::route_target)
            .filter(import_dsl::vrf_id.eq(vrf_id))
            .order(dsl::name_key.asc())
            .then_order_by(dsl::name.asc())
            .select(RouteTarget::as_select())
            .load_async(&*self.pool_connection().await?)
            .await
            .map_err(|e| public_error_from_diesel(e, ErrorHandler::Server))
    }

    /// List the route targets in a VRF's export set, in natural-sort
    /// order of their values.
    pub async fn vrf_export_targets_list(
        &self,
        vrf_id: Uuid,
    ) -> ListResultVec<RouteTarget> {
        use db::schema::route_target::dsl;
        use db::schema::vrf_export_targets::dsl as export_dsl;
        export_dsl::vrf_export_targets
            .inner_join(dsl::route_target)
            .filter(export_dsl::vrf_id.eq(vrf_id))
            .order(dsl::name_key.asc())
            .then_order_by(dsl::name.asc())
            .select(RouteTarget::as_select())
            .load_async(&*self.pool_connection().await?)
            .await
            .map_err(|e| public_error_from_diesel(e, ErrorHandler::Server))
    }

    /// Add route targets to a VRF's import set (set union).
    ///
    /// Re-adding an existing member is a no-op; the export set and other
    /// VRFs' sets are unaffected.
    pub async fn vrf_import_targets_add(
        &self,
        vrf_id: Uuid,
        targets: &[Uuid],
    ) -> UpdateResult<()> {
        use db::schema::vrf_import_targets::dsl;
        let rows = targets
            .iter()
            .map(|rt| VrfImportTarget { vrf_id, route_target_id: *rt })
            .collect::<Vec<_>>();
        diesel::insert_into(dsl::vrf_import_targets)
            .values(rows)
            .on_conflict((dsl::vrf_id, dsl::route_target_id))
            .do_nothing()
            .execute_async(&*self.pool_connection().await?)
            .await
            .map_err(|e| match &e {
                DieselError::DatabaseError(
                    DatabaseErrorKind::ForeignKeyViolation,
                    _,
                ) => Error::invalid_request(
                    "vrf or route target does not exist",
                ),
                _ => public_error_from_diesel(e, ErrorHandler::Server),
            })?;
        Ok(())
    }

    /// Remove route targets from a VRF's import set (set difference).
    pub async fn vrf_import_targets_remove(
        &self,
        vrf_id: Uuid,
        targets: &[Uuid],
    ) -> UpdateResult<()> {
        use db::schema::vrf_import_targets::dsl;
        diesel::delete(dsl::vrf_import_targets)
            .filter(dsl::vrf_id.eq(vrf_id))
            .filter(dsl::route_target_id.eq_any(targets.to_vec()))
            .execute_async(&*self.pool_connection().await?)
            .await
            .map_err(|e| public_error_from_diesel(e, ErrorHandler::Server))?;
        Ok(())
    }

    /// Add route targets to a VRF's export set (set union).
    pub async fn vrf_export_targets_add(
        &self,
        vrf_id: Uuid,
        targets: &[Uuid],
    ) -> UpdateResult<()> {
        use db::schema::vrf_export_targets::dsl;
        let rows = targets
            .iter()
            .map(|rt| VrfExportTarget { vrf_id, route_target_id: *rt })
            .collect::<Vec<_>>();
        diesel::insert_into(dsl::vrf_export_targets)
            .values(rows)
            .on_conflict((dsl::vrf_id, dsl::route_target_id))
            .do_nothing()
            .execute_async(&*self.pool_connection().await?)
            .await
            .map_err(|e| match &e {
                DieselError::DatabaseError(
                    DatabaseErrorKind::ForeignKeyViolation,
                    _,
                ) => Error::invalid_request(
                    "vrf or route target does not exist",
                ),
                _ => public_error_from_diesel(e, ErrorHandler::Server),
            })?;
        Ok(())
    }

    /// Remove route targets from a VRF's export set (set difference).
    pub async fn vrf_export_targets_remove(
        &self,
        vrf_id: Uuid,
        targets: &[Uuid],
    ) -> UpdateResult<()> {
        use db::schema::vrf_export_targets::dsl;
        diesel::delete(dsl::vrf_export_targets)
            .filter(dsl::vrf_id.eq(vrf_id))
            .filter(dsl::route_target_id.eq_any(targets.to_vec()))
            .execute_async(&*self.pool_connection().await?)
            .await
            .map_err(|e| public_error_from_diesel(e, ErrorHandler::Server))?;
        Ok(())
    }
}
