use serde::{Deserialize, Serialize};
use serde_json::json;
use crate::core::shelf::{CoverSize, ShelfResult};
use crate::core::store::{Document, Fields};

pub(crate) const COVERS_BASE_URL: &str = "https://covers.openlibrary.org";

// Book abstracts one search result or saved record. Every field is optional
// because the search index fills in whatever it has; `key` is the
// de-duplication key when present. Instances are never mutated in place,
// each fetch constructs fresh ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Book {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub first_publish_year: Option<i64>,
    #[serde(default)]
    pub author_name: Option<Vec<String>>,
    #[serde(default)]
    pub author_key: Option<Vec<String>>,
    #[serde(default)]
    pub cover_i: Option<i64>,
    #[serde(default)]
    pub key: Option<String>,
}

impl Book {
    pub fn new(key: &str, title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            key: Some(key.to_string()),
            ..Self::default()
        }
    }

    pub fn display_authors(&self) -> String {
        self.author_name.as_deref()
            .map(|authors| authors.join(", "))
            .unwrap_or_default()
    }

    pub fn cover_image_url(&self, size: CoverSize) -> Option<String> {
        self.cover_i.map(|cover_id| {
            format!("{}/b/id/{}-{}.jpg", COVERS_BASE_URL, cover_id, size)
        })
    }

    pub fn author_image_url(&self, size: CoverSize) -> Option<String> {
        self.author_key.as_deref()
            .and_then(|keys| keys.first())
            .map(|author_id| format!("{}/a/olid/{}-{}.jpg", COVERS_BASE_URL, author_id, size))
    }

    // Composite stand-in identity for records the search index returned
    // without a key: lowercased title + primary author + cover id.
    pub fn fallback_key(&self) -> Option<String> {
        self.title.as_deref().map(|title| {
            let author = self.author_name.as_deref()
                .and_then(|authors| authors.first().map(String::as_str))
                .unwrap_or("");
            format!("{}_{}_{}", title, author, self.cover_i.unwrap_or(0)).to_lowercase()
        })
    }

    pub fn dedup_key(&self) -> Option<String> {
        self.key.clone().or_else(|| self.fallback_key())
    }

    pub fn from_document(doc: &Document) -> ShelfResult<Book> {
        Ok(Book {
            title: doc.opt_str("title")?,
            first_publish_year: doc.opt_i64("first_publish_year")?,
            author_name: doc.opt_str_list("author_name")?,
            author_key: doc.opt_str_list("author_key")?,
            cover_i: doc.opt_i64("cover_i")?,
            key: doc.opt_str("key")?,
        })
    }

    // The fixed field set persisted for a saved book; absent fields are
    // simply not written.
    pub fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        if let Some(title) = &self.title {
            fields.insert("title".to_string(), json!(title));
        }
        if let Some(year) = self.first_publish_year {
            fields.insert("first_publish_year".to_string(), json!(year));
        }
        if let Some(authors) = &self.author_name {
            fields.insert("author_name".to_string(), json!(authors));
        }
        if let Some(keys) = &self.author_key {
            fields.insert("author_key".to_string(), json!(keys));
        }
        if let Some(cover) = self.cover_i {
            fields.insert("cover_i".to_string(), json!(cover));
        }
        if let Some(key) = &self.key {
            fields.insert("key".to_string(), json!(key));
        }
        fields
    }
}
