include!("../../lib.rs");
use axum::{
    routing::get,
    Router,
};
use lambda_http::{run, Error};
use crate::utils::ddb::setup_tracing;
use crate::core::controller::AppState;
use crate::core::store::StoreBackend;
use crate::shelf::controller::{add_book, get_books, remove_book, search_books};

// See https://docs.aws.amazon.com/lambda/latest/dg/lambda-rust.html
// https://docs.aws.amazon.com/lambda/latest/dg/images-test.html
// https://docs.aws.amazon.com/lambda/latest/dg/rust-http-events.html

const DEV_MODE: bool = true;

#[tokio::main]
async fn main() -> Result<(), Error> {
    setup_tracing();

    let state = if DEV_MODE {
        std::env::set_var("AWS_LAMBDA_FUNCTION_NAME", "_");
        std::env::set_var("AWS_LAMBDA_FUNCTION_MEMORY_SIZE", "4096"); // 200MB
        std::env::set_var("AWS_LAMBDA_FUNCTION_VERSION", "1");
        std::env::set_var("AWS_LAMBDA_RUNTIME_API", "http://[::]:9000/.rt");
        AppState::new("dev", StoreBackend::LocalDynamoDB)
    } else {
        AppState::new("prod", StoreBackend::DynamoDB)
    };

    let app = Router::new()
        .route("/search", get(search_books))
        .route("/books",
               get(get_books).post(add_book).delete(remove_book))
        .with_state(state);

    run(app).await
}
