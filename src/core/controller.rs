use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use crate::core::domain::Configuration;
use crate::core::store::StoreBackend;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppState {
    pub(crate) config: Configuration,
    pub(crate) store: StoreBackend,
}

impl AppState {
    pub fn new(profile: &str, store: StoreBackend) -> AppState {
        AppState {
            config: Configuration::new(profile),
            store,
        }
    }
}

pub(crate) type ServerError = (StatusCode, String);

pub fn json_to_server_error(err: serde_json::Error) -> ServerError {
    (StatusCode::BAD_REQUEST, format!("{}", err))
}
