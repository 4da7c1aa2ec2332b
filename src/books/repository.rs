pub mod store_book_repository;

use async_trait::async_trait;
use crate::books::domain::model::Book;
use crate::core::shelf::{PaginatedResult, ShelfResult};

// Facade over the remote search index and the saved-books collection.
#[async_trait]
pub trait BookRepository: Sync + Send {
    // search the remote index; blank queries are the caller's concern
    async fn search_books(&self, query: &str, limit: usize, offset: usize) -> ShelfResult<Vec<Book>>;

    // convenience wrapper computing offset = page * page_size
    async fn search_books_with_pagination(&self, query: &str, page: usize,
                                          page_size: usize) -> ShelfResult<Vec<Book>>;

    // false when the book has no key, and false when the probe itself fails
    async fn book_exists(&self, book: &Book) -> bool;

    // persists the fixed field set plus a created_at stamp; never checks
    // existence itself, the check-then-act sequence stays with callers
    async fn add_book(&self, book: &Book) -> ShelfResult<String>;

    async fn get_all_books(&self) -> ShelfResult<Vec<Book>>;

    async fn get_paginated_books(&self, page: Option<&str>,
                                 page_size: usize) -> ShelfResult<PaginatedResult<Book>>;

    // zero matching documents is a NotFound error
    async fn delete_book_by_key(&self, key: &str) -> ShelfResult<()>;

    async fn delete_book(&self, book: &Book) -> ShelfResult<()>;
}
