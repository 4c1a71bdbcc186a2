// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error handling and conversions.

use diesel::result::DatabaseErrorInformation;
use diesel::result::DatabaseErrorKind;
use diesel::result::Error as DieselError;
use ipam_common::api::external::{
    Error as PublicError, LookupType, ResourceType,
};

/// Summarizes details provided with a database error.
fn format_database_error(
    kind: DatabaseErrorKind,
    info: &dyn DatabaseErrorInformation,
) -> String {
    let mut rv =
        format!("database error (kind = {:?}): {}\n", kind, info.message());
    if let Some(details) = info.details() {
        rv.push_str(&format!("DETAILS: {}\n", details));
    }
    if let Some(hint) = info.hint() {
        rv.push_str(&format!("HINT: {}\n", hint));
    }
    rv
}

/// Allows the caller to handle a database error generically, with knowledge
/// of which user-facing failures the operation can legitimately produce.
///
/// Note that all operations may return server-level errors for a variety of
/// reasons, including being unable to contact the database, I/O errors, etc.
pub enum ErrorHandler<'a> {
    /// The operation expected to fetch, update, or delete exactly one
    /// resource identified by the [`LookupType`].
    NotFoundByLookup(ResourceType, LookupType),
    /// The operation was inserting or renaming a resource whose
    /// uniqueness the database enforces; a unique-index violation means
    /// the named value already exists.
    Conflict(ResourceType, &'a str),
    /// The operation was deleting a resource that restricting foreign
    /// keys may still reference.
    Protect(ResourceType, &'a str),
    /// The operation does not expect any user-facing errors.
    Server,
}

/// Converts a Diesel error to a public-facing error.
pub fn public_error_from_diesel(
    error: DieselError,
    handler: ErrorHandler<'_>,
) -> PublicError {
    match handler {
        ErrorHandler::NotFoundByLookup(resource_type, lookup_type) => {
            public_error_from_diesel_lookup(error, resource_type, &lookup_type)
        }
        ErrorHandler::Conflict(resource_type, object_name) => {
            public_error_from_diesel_create(error, resource_type, object_name)
        }
        ErrorHandler::Protect(resource_type, object_name) => {
            public_error_from_diesel_delete(error, resource_type, object_name)
        }
        ErrorHandler::Server => PublicError::internal_error(&format!(
            "unexpected database error: {:#}",
            error
        )),
    }
}

/// Converts a Diesel error to an external error, when requested as part of
/// a lookup.
fn public_error_from_diesel_lookup(
    error: DieselError,
    resource_type: ResourceType,
    lookup_type: &LookupType,
) -> PublicError {
    match error {
        DieselError::NotFound => PublicError::ObjectNotFound {
            type_name: resource_type,
            lookup_type: lookup_type.clone(),
        },
        DieselError::DatabaseError(kind, info) => {
            PublicError::internal_error(&format_database_error(kind, &*info))
        }
        error => PublicError::internal_error(&format!(
            "unknown diesel error: {:#}",
            error
        )),
    }
}

/// Converts a Diesel error to an external error, when requested as part of
/// a creation or rename operation.
fn public_error_from_diesel_create(
    error: DieselError,
    resource_type: ResourceType,
    object_name: &str,
) -> PublicError {
    match error {
        DieselError::DatabaseError(kind, info) => match kind {
            DatabaseErrorKind::UniqueViolation => {
                PublicError::ObjectAlreadyExists {
                    type_name: resource_type,
                    object_name: object_name.to_string(),
                }
            }
            _ => PublicError::internal_error(&format_database_error(
                kind, &*info,
            )),
        },
        error => PublicError::internal_error(&format!(
            "unknown diesel error: {:#}",
            error
        )),
    }
}

/// Converts a Diesel error to an external error, when requested as part of
/// a protected deletion.
fn public_error_from_diesel_delete(
    error: DieselError,
    resource_type: ResourceType,
    object_name: &str,
) -> PublicError {
    match error {
        DieselError::DatabaseError(kind, info) => match kind {
            DatabaseErrorKind::ForeignKeyViolation => PublicError::InUse {
                type_name: resource_type,
                message: format!("{} is still referenced", object_name),
            },
            _ => PublicError::internal_error(&format_database_error(
                kind, &*info,
            )),
        },
        error => PublicError::internal_error(&format!(
            "unknown diesel error: {:#}",
            error
        )),
    }
}

/// An error occurring during a transaction, which may include a custom,
/// caller-supplied error alongside the underlying database errors.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError<T> {
    /// The customizable error type.
    ///
    /// This error type is used for callers to return an error of their
    /// choosing from within a transaction.
    #[error("Custom transaction error: {0}")]
    CustomError(T),

    /// The Diesel error type.
    #[error("Database error: {0}")]
    Database(#[from] DieselError),
}
