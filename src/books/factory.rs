use crate::books::repository::BookRepository;
use crate::books::repository::store_book_repository::StoreBookRepository;
use crate::core::domain::Configuration;
use crate::core::store::StoreBackend;
use crate::search::client::HttpSearchClient;
use crate::store::factory::create_document_store;

pub(crate) async fn create_book_repository(config: &Configuration,
                                           backend: StoreBackend) -> Box<dyn BookRepository> {
    let store = create_document_store(config, backend).await;
    let search = Box::new(HttpSearchClient::new(config.search_base_url.as_str()));
    Box::new(StoreBookRepository::new(search, store, config.books_collection.as_str()))
}
