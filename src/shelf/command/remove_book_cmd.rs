use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::books::repository::BookRepository;
use crate::core::command::{Command, CommandError};

pub(crate) struct RemoveBookCommand {
    repository: Box<dyn BookRepository>,
}

impl RemoveBookCommand {
    pub(crate) fn new(repository: Box<dyn BookRepository>) -> Self {
        Self {
            repository,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RemoveBookCommandRequest {
    pub(crate) key: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct RemoveBookCommandResponse {
    pub key: String,
}

#[async_trait]
impl Command<RemoveBookCommandRequest, RemoveBookCommandResponse> for RemoveBookCommand {
    async fn execute(&self, req: RemoveBookCommandRequest) -> Result<RemoveBookCommandResponse, CommandError> {
        self.repository.delete_book_by_key(req.key.as_str())
            .await.map_err(CommandError::from)
            .map(|_| RemoveBookCommandResponse { key: req.key })
    }
}
