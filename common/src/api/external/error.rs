// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error handling facilities for the IPAM subsystem
//!
//! Errors surfaced by the data layer are represented with [`Error`] and
//! mapped to a transport-specific representation (if any) by the caller.

use crate::api::external::ResourceType;
use serde::Deserialize;
use serde::Serialize;
use std::fmt::Display;
use uuid::Uuid;

/// An error that can be generated within the IPAM subsystem
///
/// These may be generated while handling a caller request or as part of
/// background operation.  General best practices for error design apply
/// here.  Where possible, we want to reuse existing variants rather than
/// inventing new ones to distinguish cases that no programmatic consumer
/// needs to distinguish.
#[derive(Clone, Debug, Deserialize, thiserror::Error, PartialEq, Serialize)]
pub enum Error {
    /// An object needed as part of this operation was not found.
    #[error("Object (of type {lookup_type:?}) not found: {type_name}")]
    ObjectNotFound { type_name: ResourceType, lookup_type: LookupType },
    /// An object already exists with the specified name or identifier.
    #[error("Object (of type {type_name:?}) already exists: {object_name}")]
    ObjectAlreadyExists { type_name: ResourceType, object_name: String },
    /// The object cannot be deleted because other objects still refer to
    /// it.
    #[error("Object (of type {type_name:?}) still in use: {message}")]
    InUse { type_name: ResourceType, message: String },
    /// The request was well-formed, but the operation cannot be completed
    /// given the current state of the system.
    #[error("Invalid Request: {message}")]
    InvalidRequest { message: String },
    /// The specified input field is not valid.
    #[error("Invalid Value: {label}, {message}")]
    InvalidValue { label: String, message: String },

    /// The system encountered an unhandled operational error.
    #[error("Internal Error: {internal_message}")]
    InternalError { internal_message: String },
    /// The system (or part of it) is unavailable.
    #[error("Service Unavailable: {internal_message}")]
    ServiceUnavailable { internal_message: String },
}

/// Indicates how an object was looked up (for an `ObjectNotFound` error)
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum LookupType {
    /// a specific name was requested
    ByName(String),
    /// a specific id was requested
    ById(Uuid),
    /// a specific id was requested with some composite type
    /// (caller summarizes it)
    ByCompositeId(String),
}

impl LookupType {
    /// Returns an ObjectNotFound error appropriate for the case where this
    /// lookup failed
    pub fn into_not_found(self, type_name: ResourceType) -> Error {
        Error::ObjectNotFound { type_name, lookup_type: self }
    }
}

impl From<&str> for LookupType {
    fn from(name: &str) -> Self {
        LookupType::ByName(name.to_owned())
    }
}

impl From<Uuid> for LookupType {
    fn from(uuid: Uuid) -> Self {
        LookupType::ById(uuid)
    }
}

impl Error {
    /// Returns whether the error is likely transient and could reasonably
    /// be retried
    pub fn retryable(&self) -> bool {
        match self {
            Error::ServiceUnavailable { .. } => true,

            Error::ObjectNotFound { .. }
            | Error::ObjectAlreadyExists { .. }
            | Error::InUse { .. }
            | Error::InvalidRequest { .. }
            | Error::InvalidValue { .. }
            | Error::InternalError { .. } => false,
        }
    }

    /// Generates an [`Error::ObjectNotFound`] error for a lookup by object
    /// name.
    pub fn not_found_by_name(type_name: ResourceType, name: &str) -> Error {
        LookupType::from(name).into_not_found(type_name)
    }

    /// Generates an [`Error::ObjectNotFound`] error for a lookup by object
    /// id.
    pub fn not_found_by_id(type_name: ResourceType, id: &Uuid) -> Error {
        LookupType::ById(*id).into_not_found(type_name)
    }

    /// Generates an [`Error::InUse`] error for an object that cannot be
    /// deleted while something still references it.
    pub fn in_use(type_name: ResourceType, message: &str) -> Error {
        Error::InUse { type_name, message: message.to_owned() }
    }

    /// Generates an [`Error::InternalError`] error with the specific
    /// message
    ///
    /// InternalError should be used for operational conditions that should
    /// not happen but that we cannot reasonably handle at runtime (e.g.,
    /// deserializing a value from the database, or finding two records for
    /// something that is supposed to be unique).
    pub fn internal_error(internal_message: &str) -> Error {
        Error::InternalError { internal_message: internal_message.to_owned() }
    }

    /// Generates an [`Error::InvalidRequest`] error with the specific
    /// message
    ///
    /// This should be used for failures due possibly to invalid client
    /// input or malformed requests.
    pub fn invalid_request(message: &str) -> Error {
        Error::InvalidRequest { message: message.to_owned() }
    }

    /// Generates an [`Error::ServiceUnavailable`] error with the specific
    /// message
    ///
    /// This should be used for transient failures where the caller might be
    /// expected to retry.  Logic errors or other problems indicating that a
    /// retry would not work should probably be an InternalError (if it's a
    /// server problem) or InvalidRequest (if it's a client problem)
    /// instead.
    pub fn unavail(message: &str) -> Error {
        Error::ServiceUnavailable { internal_message: message.to_owned() }
    }

    /// Given an [`Error`] with an internal message, return the same error
    /// with `context` prepended to it to provide more context
    ///
    /// If the error has no internal message, then it is returned unchanged.
    pub fn internal_context<C>(self, context: C) -> Error
    where
        C: Display + Send + Sync + 'static,
    {
        match self {
            Error::ObjectNotFound { .. }
            | Error::ObjectAlreadyExists { .. }
            | Error::InUse { .. }
            | Error::InvalidRequest { .. }
            | Error::InvalidValue { .. } => self,
            Error::InternalError { internal_message } => Error::InternalError {
                internal_message: format!("{}: {}", context, internal_message),
            },
            Error::ServiceUnavailable { internal_message } => {
                Error::ServiceUnavailable {
                    internal_message: format!(
                        "{}: {}",
                        context, internal_message
                    ),
                }
            }
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::internal_error(&e.to_string())
    }
}

/// Implements a pattern similar to [`anyhow::Context`] for providing extra
/// context for internal error messages
///
/// Unlike `anyhow::Context`, this does not add a new Error to the cause
/// chain.  It replaces the given Error with one that has the modified
/// `internal_message`.
///
/// If the given `Error` variant does not have an `internal_message`, then
/// this currently returns an equivalent Error to what was given, without
/// prepending anything to anything.
pub trait InternalContext<T> {
    fn internal_context<C>(self, s: C) -> Result<T, Error>
    where
        C: Display + Send + Sync + 'static;

    fn with_internal_context<C, F>(self, f: F) -> Result<T, Error>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T> InternalContext<T> for Result<T, Error> {
    fn internal_context<C>(self, context: C) -> Result<T, Error>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|error| error.internal_context(context))
    }

    fn with_internal_context<C, F>(self, make_context: F) -> Result<T, Error>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|error| error.internal_context(make_context()))
    }
}

#[cfg(test)]
mod test {
    use super::Error;
    use super::InternalContext;
    use crate::api::external::ResourceType;

    #[test]
    fn test_context() {
        // test `internal_context()` and (separately) `InternalError`
        // variant
        let error: Result<(), Error> = Err(Error::internal_error("boom"));
        match error.internal_context("uh-oh") {
            Err(Error::InternalError { internal_message }) => {
                assert_eq!(internal_message, "uh-oh: boom");
            }
            _ => panic!("returned wrong type"),
        };

        // test `with_internal_context()` and (separately)
        // `ServiceUnavailable` variant
        let error: Result<(), Error> = Err(Error::unavail("boom"));
        match error.with_internal_context(|| format!("uh-oh (#{:2})", 2)) {
            Err(Error::ServiceUnavailable { internal_message }) => {
                assert_eq!(internal_message, "uh-oh (# 2): boom");
            }
            _ => panic!("returned wrong type"),
        };

        // test using a variant that doesn't have an internal error
        let error: Result<(), Error> =
            Err(Error::in_use(ResourceType::Tenant, "still referenced"));
        assert!(matches!(
            error.internal_context("foo"),
            Err(Error::InUse { .. })
        ));
    }

    #[test]
    fn test_in_use_display() {
        let error = Error::in_use(
            ResourceType::Tenant,
            "tenant is referenced by a vrf \"Customer-A\"",
        );
        assert_eq!(
            error.to_string(),
            "Object (of type Tenant) still in use: tenant is referenced by \
             a vrf \"Customer-A\""
        );
    }
}
