use serde::{Deserialize, Serialize};
use crate::books::domain::model::Book;
use crate::core::shelf::{ShelfError, ShelfResult};

// Response envelope of the search endpoint. Only docs matter downstream;
// the counters are kept because they come back on every response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "numFound", default)]
    pub num_found: i64,
    #[serde(default)]
    pub start: i64,
    #[serde(rename = "numFoundExact", default)]
    pub num_found_exact: bool,
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub offset: Option<i64>,
    #[serde(default)]
    pub docs: Vec<Book>,
}

// An empty body on a successful response is an error, never an empty list:
// "the server had nothing to say" must not read as "there are zero books".
pub(crate) fn parse_search_body(body: &str) -> ShelfResult<SearchResponse> {
    if body.trim().is_empty() {
        return Err(ShelfError::serialization("empty response from search endpoint"));
    }
    serde_json::from_str::<SearchResponse>(body).map_err(ShelfError::from)
}

#[cfg(test)]
pub(crate) const DUNE_FIXTURE: &str = r#"{
    "numFound": 2,
    "start": 0,
    "numFoundExact": true,
    "q": "dune",
    "offset": null,
    "docs": [
        {
            "title": "Dune",
            "first_publish_year": 1965,
            "author_name": ["Frank Herbert"],
            "author_key": ["OL79034A"],
            "cover_i": 11481354,
            "key": "/works/OL893415W"
        },
        {
            "title": "Dune Messiah",
            "first_publish_year": 1969,
            "author_name": ["Frank Herbert"],
            "author_key": ["OL79034A"],
            "cover_i": 11481421,
            "key": "/works/OL893509W"
        }
    ]
}"#;
