use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::books::domain::model::Book;
use crate::books::repository::BookRepository;
use crate::core::command::{Command, CommandError};

pub(crate) struct AddBookCommand {
    repository: Box<dyn BookRepository>,
}

impl AddBookCommand {
    pub(crate) fn new(repository: Box<dyn BookRepository>) -> Self {
        Self {
            repository,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddBookCommandRequest {
    #[serde(default)]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) first_publish_year: Option<i64>,
    #[serde(default)]
    pub(crate) author_name: Option<Vec<String>>,
    #[serde(default)]
    pub(crate) author_key: Option<Vec<String>>,
    #[serde(default)]
    pub(crate) cover_i: Option<i64>,
    #[serde(default)]
    pub(crate) key: Option<String>,
}

impl AddBookCommandRequest {
    pub fn build_book(&self) -> Book {
        Book {
            title: self.title.clone(),
            first_publish_year: self.first_publish_year,
            author_name: self.author_name.clone(),
            author_key: self.author_key.clone(),
            cover_i: self.cover_i,
            key: self.key.clone(),
        }
    }
}

impl From<&Book> for AddBookCommandRequest {
    fn from(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            first_publish_year: book.first_publish_year,
            author_name: book.author_name.clone(),
            author_key: book.author_key.clone(),
            cover_i: book.cover_i,
            key: book.key.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AddBookCommandResponse {
    pub id: String,
    pub book: Book,
}

impl AddBookCommandResponse {
    pub fn new(id: String, book: Book) -> Self {
        Self {
            id,
            book,
        }
    }
}

#[async_trait]
impl Command<AddBookCommandRequest, AddBookCommandResponse> for AddBookCommand {
    // check-then-act: the existence probe and the insert are two separate
    // store calls, so a concurrent caller can still slip a duplicate in
    async fn execute(&self, req: AddBookCommandRequest) -> Result<AddBookCommandResponse, CommandError> {
        let book = req.build_book();
        if self.repository.book_exists(&book).await {
            return Err(CommandError::DuplicateKey {
                message: format!("book {} is already saved", book.dedup_key().unwrap_or_default()),
            });
        }
        self.repository.add_book(&book).await.map_err(CommandError::from)
            .map(|id| AddBookCommandResponse::new(id, book))
    }
}
