use serde::{Deserialize, Serialize};

pub(crate) const DEFAULT_PAGE_SIZE: usize = 20;

// Configuration abstracts config options for the bookshelf service
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct Configuration {
    pub profile: String,
    pub search_base_url: String,
    pub books_collection: String,
    pub page_size: usize,
}

impl Configuration {
    pub fn new(profile: &str) -> Self {
        Configuration {
            profile: profile.to_string(),
            search_base_url: std::env::var("SEARCH_BASE_URL")
                .unwrap_or_else(|_| "https://openlibrary.org".to_string()),
            books_collection: "saved_books".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}
