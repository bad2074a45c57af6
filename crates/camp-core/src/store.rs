//! Document store collaborator.
//!
//! Components never cache entities; every operation re-reads through this
//! trait so the store stays the sole source of truth.
//!
//! # Contract
//!
//! - Documents are flat JSON objects keyed by an opaque string id.
//! - `create` assigns the id; `put` writes under a caller-chosen id
//!   (create-or-replace) and is reserved for deterministic seeding.
//! - `patch` merges top-level fields, replacing any existing value. A JSON
//!   `null` is stored as `null`, not removed.
//! - `get_all` and `query_eq` return documents in insertion order.
//! - Last write wins. There are no multi-document transactions.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::CoreError;
use crate::types::ValidationError;

/// Fields of a stored document, excluding its id.
pub type Fields = Map<String, Value>;

/// Logical collections in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Rooms,
    People,
    Shifts,
    Schedule,
}

impl Collection {
    pub const ALL: [Self; 4] = [Self::Rooms, Self::People, Self::Shifts, Self::Schedule];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Rooms => "rooms",
            Self::People => "people",
            Self::Shifts => "shifts",
            Self::Schedule => "schedule",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Collection {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownVariant {
                field: "collection",
                value: s.to_string(),
            })
    }
}

/// A stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

/// Failures raised by a store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `patch` or `delete` targeted a document that does not exist.
    #[error("{collection} document {id} does not exist")]
    Missing { collection: Collection, id: String },

    /// The backend failed (I/O, lock, connection).
    #[error("{message}")]
    Backend {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl StoreError {
    /// A backend failure with no underlying error value.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
            source: None,
        }
    }

    /// A backend failure wrapping its cause.
    pub fn backend_with<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// The five primitive operations (plus `put` for seeding) a component may
/// issue against the store.
pub trait DocumentStore {
    fn get_all(&self, collection: Collection) -> Result<Vec<Document>, StoreError>;

    fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError>;

    /// Creates a document and returns its store-assigned id.
    fn create(&mut self, collection: Collection, fields: Fields) -> Result<String, StoreError>;

    /// Creates or replaces a document under a caller-chosen id.
    fn put(&mut self, collection: Collection, id: &str, fields: Fields) -> Result<(), StoreError>;

    fn patch(&mut self, collection: Collection, id: &str, fields: Fields)
    -> Result<(), StoreError>;

    fn delete(&mut self, collection: Collection, id: &str) -> Result<(), StoreError>;

    /// Documents whose top-level `field` equals `value`.
    fn query_eq(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for &mut S {
    fn get_all(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        (**self).get_all(collection)
    }

    fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError> {
        (**self).get(collection, id)
    }

    fn create(&mut self, collection: Collection, fields: Fields) -> Result<String, StoreError> {
        (**self).create(collection, fields)
    }

    fn put(&mut self, collection: Collection, id: &str, fields: Fields) -> Result<(), StoreError> {
        (**self).put(collection, id, fields)
    }

    fn patch(
        &mut self,
        collection: Collection,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError> {
        (**self).patch(collection, id, fields)
    }

    fn delete(&mut self, collection: Collection, id: &str) -> Result<(), StoreError> {
        (**self).delete(collection, id)
    }

    fn query_eq(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError> {
        (**self).query_eq(collection, field, value)
    }
}

/// An entity persisted as one document in a fixed collection.
pub(crate) trait Record: DeserializeOwned {
    const COLLECTION: Collection;
}

/// Decodes a document into its entity, injecting the id field.
pub(crate) fn decode<T: Record>(doc: Document) -> Result<T, CoreError> {
    let Document { id, mut fields } = doc;
    fields.insert("id".to_string(), Value::String(id.clone()));
    serde_json::from_value(Value::Object(fields)).map_err(|err| {
        ValidationError::MalformedDocument {
            collection: T::COLLECTION.as_str(),
            id,
            message: err.to_string(),
        }
        .into()
    })
}

pub(crate) fn load<T: Record, S: DocumentStore + ?Sized>(
    store: &S,
    id: &str,
) -> Result<Option<T>, CoreError> {
    store.get(T::COLLECTION, id)?.map(decode).transpose()
}

pub(crate) fn load_all<T: Record, S: DocumentStore + ?Sized>(
    store: &S,
) -> Result<Vec<T>, CoreError> {
    store
        .get_all(T::COLLECTION)?
        .into_iter()
        .map(decode)
        .collect()
}

pub(crate) fn load_where<T: Record, S: DocumentStore + ?Sized>(
    store: &S,
    field: &str,
    value: &Value,
) -> Result<Vec<T>, CoreError> {
    store
        .query_eq(T::COLLECTION, field, value)?
        .into_iter()
        .map(decode)
        .collect()
}

/// Serializes a value into document fields. Non-object values yield no fields
/// and an `id` key is never written.
pub(crate) fn to_fields<T: Serialize>(value: &T) -> Result<Fields, CoreError> {
    let value = serde_json::to_value(value).map_err(|err| {
        CoreError::from(StoreError::backend_with("failed to encode document", err))
    })?;
    let mut fields = match value {
        Value::Object(map) => map,
        _ => Fields::new(),
    };
    fields.remove("id");
    Ok(fields)
}

/// Builds a single-field patch.
pub(crate) fn field<T: Serialize>(name: &str, value: &T) -> Result<Fields, CoreError> {
    let value = serde_json::to_value(value).map_err(|err| {
        CoreError::from(StoreError::backend_with("failed to encode field", err))
    })?;
    let mut fields = Fields::new();
    fields.insert(name.to_string(), value);
    Ok(fields)
}
