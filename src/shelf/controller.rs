use axum::{
    extract::{Query, State},
    response::Json,
};
use serde_json::Value;
use crate::books::factory;
use crate::books::repository::BookRepository;
use crate::core::command::Command;
use crate::core::controller::{json_to_server_error, AppState, ServerError};
use crate::core::shelf::DataState;
use crate::shelf::command::add_book_cmd::{AddBookCommand, AddBookCommandRequest, AddBookCommandResponse};
use crate::shelf::command::get_books_cmd::{GetBooksCommand, GetBooksCommandRequest, GetBooksCommandResponse};
use crate::shelf::command::remove_book_cmd::{RemoveBookCommand, RemoveBookCommandRequest, RemoveBookCommandResponse};
use crate::shelf::command::search_books_cmd::{SearchBooksCommand, SearchBooksCommandRequest, SearchBooksCommandResponse};

async fn build_repository(state: &AppState) -> Box<dyn BookRepository> {
    factory::create_book_repository(&state.config, state.store).await
}

pub(crate) async fn search_books(
    State(state): State<AppState>,
    Query(req): Query<SearchBooksCommandRequest>) -> Json<DataState<SearchBooksCommandResponse>> {
    let repository = build_repository(&state).await;
    let res = SearchBooksCommand::new(repository).execute(req).await;
    Json(DataState::from_result(res))
}

pub(crate) async fn add_book(
    State(state): State<AppState>,
    json: Json<Value>) -> Result<Json<DataState<AddBookCommandResponse>>, ServerError> {
    let req: AddBookCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    let repository = build_repository(&state).await;
    let res = AddBookCommand::new(repository).execute(req).await;
    Ok(Json(DataState::from_result(res)))
}

pub(crate) async fn get_books(
    State(state): State<AppState>,
    Query(req): Query<GetBooksCommandRequest>) -> Json<DataState<GetBooksCommandResponse>> {
    let repository = build_repository(&state).await;
    let res = GetBooksCommand::new(repository).execute(req).await;
    Json(DataState::from_result(res))
}

pub(crate) async fn remove_book(
    State(state): State<AppState>,
    Query(req): Query<RemoveBookCommandRequest>) -> Json<DataState<RemoveBookCommandResponse>> {
    let repository = build_repository(&state).await;
    let res = RemoveBookCommand::new(repository).execute(req).await;
    Json(DataState::from_result(res))
}
