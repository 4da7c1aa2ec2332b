use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::json;
use tracing::warn;

use crate::books::domain::model::Book;
use crate::books::repository::BookRepository;
use crate::core::shelf::{PaginatedResult, ShelfError, ShelfResult};
use crate::core::store::{Document, DocumentStore};
use crate::search::client::SearchApi;
use crate::utils::date;

pub struct StoreBookRepository {
    search: Box<dyn SearchApi>,
    store: Box<dyn DocumentStore>,
    collection: String,
}

impl StoreBookRepository {
    pub(crate) fn new(search: Box<dyn SearchApi>, store: Box<dyn DocumentStore>,
                      collection: &str) -> Self {
        Self {
            search,
            store,
            collection: collection.to_string(),
        }
    }

    async fn find_by_key(&self, key: &str) -> ShelfResult<Vec<Document>> {
        let predicate = HashMap::from([
            ("key".to_string(), key.to_string()),
        ]);
        self.store.get_by_query(self.collection.as_str(), &predicate).await
    }
}

// Decodes each stored document on its own; a malformed document never fails
// the page, it is dropped and counted.
fn decode_books(docs: &[Document]) -> (Vec<Book>, usize) {
    let mut books = Vec::with_capacity(docs.len());
    let mut skipped = 0;
    for doc in docs {
        match Book::from_document(doc) {
            Ok(book) => books.push(book),
            Err(err) => {
                skipped += 1;
                tracing::debug!("skipping malformed saved book {}: {}", doc.id, err);
            }
        }
    }
    (books, skipped)
}

#[async_trait]
impl BookRepository for StoreBookRepository {
    async fn search_books(&self, query: &str, limit: usize, offset: usize) -> ShelfResult<Vec<Book>> {
        self.search.search(query, limit, offset).await.map(|res| res.docs)
    }

    async fn search_books_with_pagination(&self, query: &str, page: usize,
                                          page_size: usize) -> ShelfResult<Vec<Book>> {
        self.search_books(query, page_size, page * page_size).await
    }

    async fn book_exists(&self, book: &Book) -> bool {
        match &book.key {
            None => false,
            Some(key) => match self.find_by_key(key.as_str()).await {
                Ok(docs) => !docs.is_empty(),
                Err(err) => {
                    // fail open: a transient probe failure must never block a
                    // save the user asked for, at the price of a possible duplicate
                    warn!("existence check failed for {}: {}", key, err);
                    false
                }
            },
        }
    }

    async fn add_book(&self, book: &Book) -> ShelfResult<String> {
        let mut fields = book.to_fields();
        fields.insert("created_at".to_string(), json!(date::format_date(date::now())));
        self.store.create(self.collection.as_str(), &fields).await
    }

    async fn get_all_books(&self) -> ShelfResult<Vec<Book>> {
        let docs = self.store.get_all(self.collection.as_str()).await?;
        let (books, skipped) = decode_books(&docs);
        if skipped > 0 {
            warn!("dropped {} malformed saved books from {}", skipped, self.collection);
        }
        Ok(books)
    }

    async fn get_paginated_books(&self, page: Option<&str>,
                                 page_size: usize) -> ShelfResult<PaginatedResult<Book>> {
        let res = self.store.get_paginated(self.collection.as_str(), page,
                                           &HashMap::new(), page_size).await?;
        let (books, skipped) = decode_books(&res.records);
        if skipped > 0 {
            warn!("dropped {} malformed saved books from {}", skipped, self.collection);
        }
        // has_more reflects the raw page, decode drops must not shrink it
        Ok(PaginatedResult {
            page: res.page,
            page_size: res.page_size,
            next_page: res.next_page,
            has_more: res.has_more,
            records: books,
        })
    }

    async fn delete_book_by_key(&self, key: &str) -> ShelfResult<()> {
        let docs = self.find_by_key(key).await?;
        match docs.first() {
            Some(doc) => self.store.delete(self.collection.as_str(), doc.id.as_str()).await,
            None => Err(ShelfError::not_found(
                format!("no saved book matches key {}", key).as_str())),
        }
    }

    async fn delete_book(&self, book: &Book) -> ShelfResult<()> {
        match &book.key {
            Some(key) => self.delete_book_by_key(key.as_str()).await,
            None => Err(ShelfError::validation("book has no key to delete by", None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use async_trait::async_trait;
    use serde_json::json;

    use crate::books::domain::model::Book;
    use crate::books::repository::store_book_repository::StoreBookRepository;
    use crate::books::repository::BookRepository;
    use crate::core::shelf::{PaginatedResult, ShelfError, ShelfResult};
    use crate::core::store::{Document, DocumentStore, Fields};
    use crate::search::client::SearchApi;
    use crate::search::model::{parse_search_body, SearchResponse, DUNE_FIXTURE};
    use crate::store::memory_document_store::MemoryDocumentStore;

    const COLLECTION: &str = "saved_books";

    // Serves the dune fixture the way the live endpoint would: the server is
    // the one honoring limit/offset. Records every request it sees.
    struct FixtureSearchApi {
        requests: Arc<Mutex<Vec<(String, usize, usize)>>>,
    }

    impl FixtureSearchApi {
        fn new() -> Self {
            Self { requests: Arc::new(Mutex::new(vec![])) }
        }

        fn with_log(log: Arc<Mutex<Vec<(String, usize, usize)>>>) -> Self {
            Self { requests: log }
        }
    }

    #[async_trait]
    impl SearchApi for FixtureSearchApi {
        async fn search(&self, query: &str, limit: usize, offset: usize) -> ShelfResult<SearchResponse> {
            self.requests.lock().unwrap().push((query.to_string(), limit, offset));
            let mut res = parse_search_body(DUNE_FIXTURE)?;
            res.docs = res.docs.into_iter().skip(offset).take(limit).collect();
            Ok(res)
        }
    }

    struct FailingStore;

    #[async_trait]
    impl DocumentStore for FailingStore {
        async fn create(&self, _collection: &str, _fields: &Fields) -> ShelfResult<String> {
            Err(ShelfError::store("create failed", None, true))
        }
        async fn create_with_id(&self, _collection: &str, _id: &str, _fields: &Fields) -> ShelfResult<String> {
            Err(ShelfError::store("create failed", None, true))
        }
        async fn get_all(&self, _collection: &str) -> ShelfResult<Vec<Document>> {
            Err(ShelfError::store("scan failed", None, true))
        }
        async fn get_by_id(&self, _collection: &str, _id: &str) -> ShelfResult<Document> {
            Err(ShelfError::store("read failed", None, true))
        }
        async fn get_by_query(&self, _collection: &str,
                              _predicate: &HashMap<String, String>) -> ShelfResult<Vec<Document>> {
            Err(ShelfError::store("query failed", None, true))
        }
        async fn get_paginated(&self, _collection: &str, _page: Option<&str>,
                               _predicate: &HashMap<String, String>,
                               _page_size: usize) -> ShelfResult<PaginatedResult<Document>> {
            Err(ShelfError::store("scan failed", None, true))
        }
        async fn update(&self, _collection: &str, _id: &str, _fields: &Fields) -> ShelfResult<()> {
            Err(ShelfError::store("update failed", None, true))
        }
        async fn set(&self, _collection: &str, _id: &str, _fields: &Fields, _merge: bool) -> ShelfResult<()> {
            Err(ShelfError::store("set failed", None, true))
        }
        async fn delete(&self, _collection: &str, _id: &str) -> ShelfResult<()> {
            Err(ShelfError::store("delete failed", None, true))
        }
        async fn exists(&self, _collection: &str, _id: &str) -> ShelfResult<bool> {
            Err(ShelfError::store("probe failed", None, true))
        }
    }

    fn repository() -> StoreBookRepository {
        StoreBookRepository::new(Box::new(FixtureSearchApi::new()),
                                 Box::new(MemoryDocumentStore::new()), COLLECTION)
    }

    fn dune() -> Book {
        parse_search_body(DUNE_FIXTURE).expect("fixture parses").docs.remove(0)
    }

    #[tokio::test]
    async fn test_should_search_within_limit() {
        let repo = repository();
        let books = repo.search_books("dune", 2, 0).await.expect("should search books");
        assert_eq!(2, books.len());
        assert_eq!(Some("Dune".to_string()), books[0].title);
        assert_eq!(Some("Dune Messiah".to_string()), books[1].title);

        let books = repo.search_books("dune", 1, 0).await.expect("should search books");
        assert!(books.len() <= 1);
    }

    #[tokio::test]
    async fn test_should_compute_offset_from_page() {
        let log = Arc::new(Mutex::new(vec![]));
        let repo = StoreBookRepository::new(Box::new(FixtureSearchApi::with_log(log.clone())),
                                            Box::new(MemoryDocumentStore::new()), COLLECTION);
        let _ = repo.search_books_with_pagination("dune", 3, 7).await.expect("should search books");
        let _ = repo.search_books("dune", 7, 21).await.expect("should search books");

        // both calls must reach the search API with identical parameters
        let requests = log.lock().unwrap().clone();
        assert_eq!(("dune".to_string(), 7, 21), requests[0]);
        assert_eq!(requests[0], requests[1]);
    }

    #[tokio::test]
    async fn test_should_treat_missing_key_as_not_saved() {
        let repo = repository();
        let keyless = Book { key: None, ..dune() };
        assert_eq!(false, repo.book_exists(&keyless).await);
    }

    #[tokio::test]
    async fn test_should_fail_open_when_existence_probe_errors() {
        let repo = StoreBookRepository::new(Box::new(FixtureSearchApi::new()),
                                            Box::new(FailingStore), COLLECTION);
        assert_eq!(false, repo.book_exists(&dune()).await);
    }

    #[tokio::test]
    async fn test_should_find_book_after_add() {
        let repo = repository();
        let book = dune();
        assert_eq!(false, repo.book_exists(&book).await);

        let id = repo.add_book(&book).await.expect("should add book");
        assert!(!id.is_empty());
        assert_eq!(true, repo.book_exists(&book).await);

        let saved = repo.get_all_books().await.expect("should list books");
        assert_eq!(1, saved.len());
        assert_eq!(book.key, saved[0].key);
        assert_eq!(book.title, saved[0].title);
    }

    #[tokio::test]
    async fn test_should_drop_malformed_documents_from_pages() {
        let store = MemoryDocumentStore::new();
        let mut broken = dune().to_fields();
        broken.insert("cover_i".to_string(), json!("not a number"));
        let _ = store.create(COLLECTION, &broken).await.expect("should create document");

        let repo = StoreBookRepository::new(Box::new(FixtureSearchApi::new()),
                                            Box::new(store), COLLECTION);
        let book = Book::new("/works/OL893509W", "Dune Messiah");
        let _ = repo.add_book(&book).await.expect("should add book");

        let saved = repo.get_all_books().await.expect("should list books");
        assert_eq!(1, saved.len());
        assert_eq!(book.key, saved[0].key);
    }

    #[tokio::test]
    async fn test_should_walk_saved_pages() {
        let repo = repository();
        for i in 0..5 {
            let book = Book::new(format!("/works/OL{}W", i).as_str(), format!("book {}", i).as_str());
            let _ = repo.add_book(&book).await.expect("should add book");
        }
        let first = repo.get_paginated_books(None, 2).await.expect("should return page");
        assert_eq!(2, first.records.len());
        assert!(first.has_more);

        let mut page = first.next_page;
        let mut total = first.records.len();
        while let Some(token) = page {
            let res = repo.get_paginated_books(Some(token.as_str()), 2).await.expect("should return page");
            total += res.records.len();
            page = if res.has_more { res.next_page } else { None };
        }
        assert_eq!(5, total);
    }

    #[tokio::test]
    async fn test_should_delete_saved_book_by_key() {
        let repo = repository();
        let book = dune();
        let _ = repo.add_book(&book).await.expect("should add book");

        repo.delete_book(&book).await.expect("should delete book");
        assert_eq!(false, repo.book_exists(&book).await);
    }

    #[tokio::test]
    async fn test_should_report_delete_of_unknown_key_as_error() {
        let repo = repository();
        let res = repo.delete_book_by_key("/works/OL0W").await;
        assert!(matches!(res, Err(ShelfError::NotFound { message: _ })));
    }

    #[tokio::test]
    async fn test_should_reject_delete_without_key() {
        let repo = repository();
        assert!(repo.delete_book(&Book::default()).await.is_err());
    }
}
