use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::books::domain::model::Book;
use crate::books::repository::BookRepository;
use crate::core::command::{Command, CommandError};
use crate::core::domain::DEFAULT_PAGE_SIZE;

pub(crate) struct GetBooksCommand {
    repository: Box<dyn BookRepository>,
}

impl GetBooksCommand {
    pub(crate) fn new(repository: Box<dyn BookRepository>) -> Self {
        Self {
            repository,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct GetBooksCommandRequest {
    pub(crate) page: Option<String>,
    pub(crate) page_size: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GetBooksCommandResponse {
    pub books: Vec<Book>,
    pub next_page: Option<String>,
    pub has_more: bool,
}

#[async_trait]
impl Command<GetBooksCommandRequest, GetBooksCommandResponse> for GetBooksCommand {
    async fn execute(&self, req: GetBooksCommandRequest) -> Result<GetBooksCommandResponse, CommandError> {
        let page_size = req.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        self.repository.get_paginated_books(req.page.as_deref(), page_size)
            .await.map_err(CommandError::from).map(|res| GetBooksCommandResponse {
            books: res.records,
            next_page: res.next_page,
            has_more: res.has_more,
        })
    }
}
