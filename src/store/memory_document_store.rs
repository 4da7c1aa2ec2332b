use std::collections::{BTreeMap, HashMap};
use std::ops::Bound::{Excluded, Unbounded};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::core::shelf::{PaginatedResult, ShelfError, ShelfResult};
use crate::core::store::{Document, DocumentStore, Fields};

// In-process store over id-ordered collections, so "start strictly after the
// cursor" pagination is deterministic. Backs the dev profile and the tests
// that need a synchronous store.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: Mutex<HashMap<String, BTreeMap<String, Fields>>>,
}

impl MemoryDocumentStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn with_collections<R>(&self, f: impl FnOnce(&mut HashMap<String, BTreeMap<String, Fields>>) -> ShelfResult<R>) -> ShelfResult<R> {
        match self.collections.lock() {
            Ok(mut guard) => f(&mut guard),
            Err(_) => Err(ShelfError::runtime("memory store mutex poisoned", None)),
        }
    }
}

fn matches_predicate(fields: &Fields, predicate: &HashMap<String, String>) -> ShelfResult<bool> {
    for (k, expected) in predicate {
        let parts = k.split(':').collect::<Vec<&str>>();
        let (name, op) = if parts.len() > 1 { (parts[0], parts[1]) } else { (k.as_str(), "=") };
        if op != "=" {
            return Err(ShelfError::validation(
                format!("unsupported predicate operator {} for {}", op, name).as_str(), None));
        }
        let matched = match fields.get(name) {
            Some(Value::String(s)) => s == expected,
            Some(Value::Number(n)) => n.to_string() == *expected,
            Some(Value::Bool(b)) => b.to_string() == *expected,
            _ => false,
        };
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn create(&self, collection: &str, fields: &Fields) -> ShelfResult<String> {
        let id = Uuid::new_v4().to_string();
        self.create_with_id(collection, id.as_str(), fields).await
    }

    async fn create_with_id(&self, collection: &str, id: &str, fields: &Fields) -> ShelfResult<String> {
        self.with_collections(|collections| {
            collections.entry(collection.to_string()).or_default()
                .insert(id.to_string(), fields.clone());
            Ok(id.to_string())
        })
    }

    async fn get_all(&self, collection: &str) -> ShelfResult<Vec<Document>> {
        self.with_collections(|collections| {
            Ok(collections.get(collection).map(|docs| {
                docs.iter().map(|(id, fields)| Document::new(id, fields.clone())).collect()
            }).unwrap_or_default())
        })
    }

    async fn get_by_id(&self, collection: &str, id: &str) -> ShelfResult<Document> {
        self.with_collections(|collections| {
            collections.get(collection).and_then(|docs| docs.get(id))
                .map(|fields| Document::new(id, fields.clone()))
                .ok_or_else(|| ShelfError::not_found(
                    format!("document not found for {} in {}", id, collection).as_str()))
        })
    }

    async fn get_by_query(&self, collection: &str,
                          predicate: &HashMap<String, String>) -> ShelfResult<Vec<Document>> {
        self.with_collections(|collections| {
            let mut records = vec![];
            if let Some(docs) = collections.get(collection) {
                for (id, fields) in docs {
                    if matches_predicate(fields, predicate)? {
                        records.push(Document::new(id, fields.clone()));
                    }
                }
            }
            Ok(records)
        })
    }

    async fn get_paginated(&self, collection: &str, page: Option<&str>,
                           predicate: &HashMap<String, String>,
                           page_size: usize) -> ShelfResult<PaginatedResult<Document>> {
        self.with_collections(|collections| {
            let mut records: Vec<Document> = vec![];
            if let Some(docs) = collections.get(collection) {
                let range = match page {
                    Some(cursor) => docs.range::<String, _>((Excluded(cursor.to_string()), Unbounded)),
                    None => docs.range::<String, (std::ops::Bound<String>, std::ops::Bound<String>)>((Unbounded, Unbounded)),
                };
                for (id, fields) in range {
                    if records.len() == page_size {
                        break;
                    }
                    if matches_predicate(fields, predicate)? {
                        records.push(Document::new(id, fields.clone()));
                    }
                }
            }
            let next_page = if records.len() == page_size {
                records.last().map(|doc| doc.id.clone())
            } else {
                None
            };
            Ok(PaginatedResult::new(page, page_size, next_page, records))
        })
    }

    async fn update(&self, collection: &str, id: &str, fields: &Fields) -> ShelfResult<()> {
        self.set(collection, id, fields, true).await
    }

    async fn set(&self, collection: &str, id: &str, fields: &Fields, merge: bool) -> ShelfResult<()> {
        self.with_collections(|collections| {
            let docs = collections.entry(collection.to_string()).or_default();
            if merge {
                let existing = docs.entry(id.to_string()).or_default();
                for (k, v) in fields {
                    existing.insert(k.clone(), v.clone());
                }
            } else {
                docs.insert(id.to_string(), fields.clone());
            }
            Ok(())
        })
    }

    async fn delete(&self, collection: &str, id: &str) -> ShelfResult<()> {
        self.with_collections(|collections| {
            if let Some(docs) = collections.get_mut(collection) {
                docs.remove(id);
            }
            Ok(())
        })
    }

    async fn exists(&self, collection: &str, id: &str) -> ShelfResult<bool> {
        self.with_collections(|collections| {
            Ok(collections.get(collection).map(|docs| docs.contains_key(id)).unwrap_or(false))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use serde_json::json;
    use crate::core::store::{DocumentStore, Fields};
    use crate::store::memory_document_store::MemoryDocumentStore;

    const COLLECTION: &str = "saved_books";

    fn book_fields(key: &str, title: &str) -> Fields {
        let mut fields = Fields::new();
        fields.insert("key".to_string(), json!(key));
        fields.insert("title".to_string(), json!(title));
        fields.insert("cover_i".to_string(), json!(42));
        fields
    }

    #[tokio::test]
    async fn test_should_create_get_documents() {
        let store = MemoryDocumentStore::new();
        let id = store.create(COLLECTION, &book_fields("OL1W", "dune")).await.expect("should create document");

        let loaded = store.get_by_id(COLLECTION, id.as_str()).await.expect("should return document");
        assert_eq!(id, loaded.id);
        assert_eq!(Some("dune".to_string()), loaded.opt_str("title").expect("should read title"));
    }

    #[tokio::test]
    async fn test_should_report_missing_document_as_error() {
        let store = MemoryDocumentStore::new();
        assert!(store.get_by_id(COLLECTION, "no-such-id").await.is_err());
    }

    #[tokio::test]
    async fn test_should_overwrite_with_caller_id() {
        let store = MemoryDocumentStore::new();
        let _ = store.create_with_id(COLLECTION, "fixed-id", &book_fields("OL2W", "old")).await.expect("should create document");
        let _ = store.create_with_id(COLLECTION, "fixed-id", &book_fields("OL2W", "new")).await.expect("should overwrite document");

        let loaded = store.get_by_id(COLLECTION, "fixed-id").await.expect("should return document");
        assert_eq!(Some("new".to_string()), loaded.opt_str("title").expect("should read title"));
    }

    #[tokio::test]
    async fn test_should_merge_named_fields_only() {
        let store = MemoryDocumentStore::new();
        let id = store.create(COLLECTION, &book_fields("OL3W", "dune")).await.expect("should create document");

        let mut patch = Fields::new();
        patch.insert("title".to_string(), json!("dune messiah"));
        store.update(COLLECTION, id.as_str(), &patch).await.expect("should update document");

        let loaded = store.get_by_id(COLLECTION, id.as_str()).await.expect("should return document");
        assert_eq!(Some("dune messiah".to_string()), loaded.opt_str("title").expect("should read title"));
        assert_eq!(Some("OL3W".to_string()), loaded.opt_str("key").expect("untouched field survives"));
    }

    #[tokio::test]
    async fn test_should_overwrite_whole_document_without_merge() {
        let store = MemoryDocumentStore::new();
        let id = store.create(COLLECTION, &book_fields("OL4W", "dune")).await.expect("should create document");

        let mut replacement = Fields::new();
        replacement.insert("title".to_string(), json!("dune messiah"));
        store.set(COLLECTION, id.as_str(), &replacement, false).await.expect("should set document");

        let loaded = store.get_by_id(COLLECTION, id.as_str()).await.expect("should return document");
        assert_eq!(None, loaded.opt_str("key").expect("old field is gone"));
    }

    #[tokio::test]
    async fn test_should_query_by_predicate() {
        let store = MemoryDocumentStore::new();
        let _ = store.create(COLLECTION, &book_fields("OL5W", "dune")).await.expect("should create document");
        let _ = store.create(COLLECTION, &book_fields("OL6W", "hyperion")).await.expect("should create document");

        let predicate = HashMap::from([("key".to_string(), "OL5W".to_string())]);
        let matches = store.get_by_query(COLLECTION, &predicate).await.expect("should query documents");
        assert_eq!(1, matches.len());
        assert_eq!(Some("dune".to_string()), matches[0].opt_str("title").expect("should read title"));

        let none = store.get_by_query(COLLECTION,
                                      &HashMap::from([("key".to_string(), "OL7W".to_string())])).await
            .expect("should query documents");
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_should_reject_unsupported_predicate_operator() {
        let store = MemoryDocumentStore::new();
        let _ = store.create(COLLECTION, &book_fields("OL8W", "dune")).await.expect("should create document");
        let predicate = HashMap::from([("cover_i:>".to_string(), "1".to_string())]);
        assert!(store.get_by_query(COLLECTION, &predicate).await.is_err());
    }

    #[tokio::test]
    async fn test_should_delete_idempotently() {
        let store = MemoryDocumentStore::new();
        let id = store.create(COLLECTION, &book_fields("OL9W", "dune")).await.expect("should create document");

        store.delete(COLLECTION, id.as_str()).await.expect("should delete document");
        store.delete(COLLECTION, id.as_str()).await.expect("should delete absent document");
        assert_eq!(false, store.exists(COLLECTION, id.as_str()).await.expect("should probe"));
    }

    #[tokio::test]
    async fn test_should_walk_pages_with_cursor() {
        let store = MemoryDocumentStore::new();
        for i in 0..25 {
            let _ = store.create_with_id(COLLECTION, format!("doc-{:02}", i).as_str(),
                                         &book_fields(format!("OL1{}W", i).as_str(), "paged")).await
                .expect("should create document");
        }
        let mut page: Option<String> = None;
        let mut sizes = vec![];
        loop {
            let res = store.get_paginated(COLLECTION, page.as_deref(), &HashMap::new(), 10).await
                .expect("should return page");
            sizes.push(res.records.len());
            if !res.has_more || res.next_page.is_none() {
                break;
            }
            page = res.next_page;
        }
        assert_eq!(vec![10, 10, 5], sizes);
    }

    #[tokio::test]
    async fn test_should_flag_more_on_exact_multiple() {
        let store = MemoryDocumentStore::new();
        for i in 0..10 {
            let _ = store.create_with_id(COLLECTION, format!("doc-{:02}", i).as_str(),
                                         &book_fields(format!("OL2{}W", i).as_str(), "paged")).await
                .expect("should create document");
        }
        let first = store.get_paginated(COLLECTION, None, &HashMap::new(), 10).await
            .expect("should return page");
        // full page: the heuristic reports more even though the collection is exhausted
        assert!(first.has_more);

        let second = store.get_paginated(COLLECTION, first.next_page.as_deref(), &HashMap::new(), 10).await
            .expect("should return page");
        assert!(second.records.is_empty());
        assert!(!second.has_more);
    }
}
