//! In-process [`DocumentStore`] used by tests and dry runs.

use std::collections::HashMap;

use serde_json::Value;
use uuid::Uuid;

use crate::store::{Collection, Document, DocumentStore, Fields, StoreError};

/// Documents kept in insertion order per collection.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    collections: HashMap<Collection, Vec<Document>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection.
    #[must_use]
    pub fn len(&self, collection: Collection) -> usize {
        self.collections.get(&collection).map_or(0, Vec::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.collections.values().all(Vec::is_empty)
    }

    fn docs(&self, collection: Collection) -> &[Document] {
        self.collections.get(&collection).map_or(&[][..], Vec::as_slice)
    }

    fn find_mut(&mut self, collection: Collection, id: &str) -> Option<&mut Document> {
        self.collections
            .get_mut(&collection)?
            .iter_mut()
            .find(|doc| doc.id == id)
    }
}

impl DocumentStore for MemoryStore {
    fn get_all(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        Ok(self.docs(collection).to_vec())
    }

    fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError> {
        Ok(self.docs(collection).iter().find(|doc| doc.id == id).cloned())
    }

    fn create(&mut self, collection: Collection, fields: Fields) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        self.collections.entry(collection).or_default().push(Document {
            id: id.clone(),
            fields,
        });
        Ok(id)
    }

    fn put(&mut self, collection: Collection, id: &str, fields: Fields) -> Result<(), StoreError> {
        if let Some(doc) = self.find_mut(collection, id) {
            doc.fields = fields;
        } else {
            self.collections.entry(collection).or_default().push(Document {
                id: id.to_string(),
                fields,
            });
        }
        Ok(())
    }

    fn patch(
        &mut self,
        collection: Collection,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError> {
        let doc = self
            .find_mut(collection, id)
            .ok_or_else(|| StoreError::Missing {
                collection,
                id: id.to_string(),
            })?;
        doc.fields.extend(fields);
        Ok(())
    }

    fn delete(&mut self, collection: Collection, id: &str) -> Result<(), StoreError> {
        let docs = self.collections.entry(collection).or_default();
        let before = docs.len();
        docs.retain(|doc| doc.id != id);
        if docs.len() == before {
            return Err(StoreError::Missing {
                collection,
                id: id.to_string(),
            });
        }
        Ok(())
    }

    fn query_eq(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError> {
        Ok(self
            .docs(collection)
            .iter()
            .filter(|doc| doc.fields.get(field) == Some(value))
            .cloned()
            .collect())
    }
}

/// A [`MemoryStore`] whose writes start failing after a budget runs out.
/// Reads always succeed.
#[cfg(test)]
pub(crate) struct FlakyStore {
    pub(crate) inner: MemoryStore,
    allowed: usize,
    failures: Option<usize>,
}

#[cfg(test)]
impl FlakyStore {
    /// Fails every write after the first `allowed` ones.
    pub(crate) const fn failing_after(inner: MemoryStore, allowed: usize) -> Self {
        Self {
            inner,
            allowed,
            failures: None,
        }
    }

    /// Fails the write after the first `allowed` ones, then recovers.
    pub(crate) const fn failing_once_after(inner: MemoryStore, allowed: usize) -> Self {
        Self {
            inner,
            allowed,
            failures: Some(1),
        }
    }

    fn spend(&mut self) -> Result<(), StoreError> {
        if self.allowed > 0 {
            self.allowed -= 1;
            return Ok(());
        }
        match &mut self.failures {
            Some(0) => Ok(()),
            Some(left) => {
                *left -= 1;
                Err(StoreError::backend("connection reset"))
            }
            None => Err(StoreError::backend("connection reset")),
        }
    }
}

#[cfg(test)]
impl DocumentStore for FlakyStore {
    fn get_all(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        self.inner.get_all(collection)
    }

    fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError> {
        self.inner.get(collection, id)
    }

    fn create(&mut self, collection: Collection, fields: Fields) -> Result<String, StoreError> {
        self.spend()?;
        self.inner.create(collection, fields)
    }

    fn put(&mut self, collection: Collection, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.spend()?;
        self.inner.put(collection, id, fields)
    }

    fn patch(
        &mut self,
        collection: Collection,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError> {
        self.spend()?;
        self.inner.patch(collection, id, fields)
    }

    fn delete(&mut self, collection: Collection, id: &str) -> Result<(), StoreError> {
        self.spend()?;
        self.inner.delete(collection, id)
    }

    fn query_eq(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError> {
        self.inner.query_eq(collection, field, value)
    }
}
