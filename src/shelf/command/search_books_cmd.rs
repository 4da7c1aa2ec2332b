use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::books::domain::model::Book;
use crate::books::repository::BookRepository;
use crate::core::command::{Command, CommandError};
use crate::core::domain::DEFAULT_PAGE_SIZE;

pub(crate) struct SearchBooksCommand {
    repository: Box<dyn BookRepository>,
}

impl SearchBooksCommand {
    pub(crate) fn new(repository: Box<dyn BookRepository>) -> Self {
        Self {
            repository,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchBooksCommandRequest {
    pub(crate) q: String,
    pub(crate) page: Option<usize>,
    pub(crate) page_size: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SearchBooksCommandResponse {
    pub books: Vec<Book>,
}

impl SearchBooksCommandResponse {
    pub fn new(books: Vec<Book>) -> Self {
        Self {
            books,
        }
    }
}

#[async_trait]
impl Command<SearchBooksCommandRequest, SearchBooksCommandResponse> for SearchBooksCommand {
    async fn execute(&self, req: SearchBooksCommandRequest) -> Result<SearchBooksCommandResponse, CommandError> {
        if req.q.trim().is_empty() {
            return Err(CommandError::Validation {
                message: "search query must not be blank".to_string(),
                reason_code: None,
            });
        }
        let page = req.page.unwrap_or(0);
        let page_size = req.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        self.repository.search_books_with_pagination(req.q.as_str(), page, page_size)
            .await.map_err(CommandError::from).map(SearchBooksCommandResponse::new)
    }
}

#[cfg(test)]
mod tests {
    use crate::books::factory;
    use crate::core::command::{Command, CommandError};
    use crate::core::domain::Configuration;
    use crate::core::store::StoreBackend;
    use crate::shelf::command::search_books_cmd::{SearchBooksCommand, SearchBooksCommandRequest};

    #[tokio::test]
    async fn test_should_reject_blank_query() {
        let repository = factory::create_book_repository(
            &Configuration::new("test"), StoreBackend::Memory).await;
        let cmd = SearchBooksCommand::new(repository);

        let res = cmd.execute(SearchBooksCommandRequest {
            q: "  ".to_string(),
            page: None,
            page_size: None,
        }).await;
        assert!(matches!(res, Err(CommandError::Validation { message: _, reason_code: _ })));
    }
}
