use async_trait::async_trait;
use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use crate::core::shelf::{PaginatedResult, ShelfError, ShelfResult};

/// Untyped field map of a stored document.
pub type Fields = Map<String, Value>;

// A stored document as an explicit (id, fields) pair. The store-assigned
// identifier never travels inside the field map.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: &str, fields: Fields) -> Self {
        Self {
            id: id.to_string(),
            fields,
        }
    }

    // Typed accessors distinguish an absent field (None) from a mistyped one (error).

    pub fn opt_str(&self, name: &str) -> ShelfResult<Option<String>> {
        match self.fields.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(self.mistyped(name, "string", other)),
        }
    }

    pub fn opt_i64(&self, name: &str) -> ShelfResult<Option<i64>> {
        match self.fields.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => match n.as_i64() {
                Some(v) => Ok(Some(v)),
                None => Err(self.mistyped(name, "integer", &Value::Number(n.clone()))),
            },
            Some(other) => Err(self.mistyped(name, "integer", other)),
        }
    }

    pub fn opt_str_list(&self, name: &str) -> ShelfResult<Option<Vec<String>>> {
        match self.fields.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Array(items)) => {
                let mut list = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::String(s) => list.push(s.clone()),
                        other => return Err(self.mistyped(name, "string list", other)),
                    }
                }
                Ok(Some(list))
            }
            Some(other) => Err(self.mistyped(name, "string list", other)),
        }
    }

    fn mistyped(&self, name: &str, expected: &str, actual: &Value) -> ShelfError {
        ShelfError::serialization(
            format!("field {} of document {} is not a {}: {:?}", name, self.id, expected, actual).as_str())
    }
}

// Generic contract over a collection/document-addressed store. Every operation
// names its collection; predicates are field=value maps with an optional
// field:op key form for other comparison operators.
#[async_trait]
pub trait DocumentStore: Sync + Send {
    // create a document under a store-assigned identifier
    async fn create(&self, collection: &str, fields: &Fields) -> ShelfResult<String>;

    // create a document under the caller's identifier, overwriting any existing one
    async fn create_with_id(&self, collection: &str, id: &str, fields: &Fields) -> ShelfResult<String>;

    // read the whole collection
    async fn get_all(&self, collection: &str) -> ShelfResult<Vec<Document>>;

    // point read; a missing document is a NotFound error, never an empty success
    async fn get_by_id(&self, collection: &str, id: &str) -> ShelfResult<Document>;

    // read all documents matching the predicate
    async fn get_by_query(&self, collection: &str,
                          predicate: &HashMap<String, String>) -> ShelfResult<Vec<Document>>;

    // filtered page read, starting strictly after the cursor when one is given
    async fn get_paginated(&self, collection: &str, page: Option<&str>,
                           predicate: &HashMap<String, String>,
                           page_size: usize) -> ShelfResult<PaginatedResult<Document>>;

    // merge the named fields only
    async fn update(&self, collection: &str, id: &str, fields: &Fields) -> ShelfResult<()>;

    // merge=false overwrites the entire document, merge=true merges field-level
    async fn set(&self, collection: &str, id: &str, fields: &Fields, merge: bool) -> ShelfResult<()>;

    // idempotent; deleting an absent id is indistinguishable from deleting an existing one
    async fn delete(&self, collection: &str, id: &str) -> ShelfResult<()>;

    // existence probe
    async fn exists(&self, collection: &str, id: &str) -> ShelfResult<bool>;
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Copy)]
pub enum StoreBackend {
    DynamoDB,
    LocalDynamoDB,
    Memory,
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use crate::core::store::{Document, Fields};

    fn sample_document() -> Document {
        let mut fields = Fields::new();
        fields.insert("title".to_string(), json!("Dune"));
        fields.insert("cover_i".to_string(), json!(1234));
        fields.insert("author_name".to_string(), json!(["Frank Herbert"]));
        fields.insert("broken".to_string(), json!({"nested": true}));
        Document::new("doc-1", fields)
    }

    #[tokio::test]
    async fn test_should_read_typed_fields() {
        let doc = sample_document();
        assert_eq!(Some("Dune".to_string()), doc.opt_str("title").expect("should read title"));
        assert_eq!(Some(1234), doc.opt_i64("cover_i").expect("should read cover"));
        assert_eq!(Some(vec!["Frank Herbert".to_string()]),
                   doc.opt_str_list("author_name").expect("should read authors"));
    }

    #[tokio::test]
    async fn test_should_treat_absent_fields_as_none() {
        let doc = sample_document();
        assert_eq!(None, doc.opt_str("missing").expect("absent is not an error"));
        assert_eq!(None, doc.opt_i64("missing").expect("absent is not an error"));
        assert_eq!(None, doc.opt_str_list("missing").expect("absent is not an error"));
    }

    #[tokio::test]
    async fn test_should_reject_mistyped_fields() {
        let doc = sample_document();
        assert!(doc.opt_str("cover_i").is_err());
        assert!(doc.opt_i64("title").is_err());
        assert!(doc.opt_str_list("broken").is_err());
    }
}
