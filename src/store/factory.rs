use crate::core::domain::Configuration;
use crate::core::store::{DocumentStore, StoreBackend};
use crate::store::ddb_document_store::DdbDocumentStore;
use crate::store::memory_document_store::MemoryDocumentStore;
use crate::utils::ddb::{build_db_client, create_table};

pub(crate) async fn create_document_store(config: &Configuration,
                                          backend: StoreBackend) -> Box<dyn DocumentStore> {
    match backend {
        StoreBackend::DynamoDB => {
            let client = build_db_client(backend).await;
            Box::new(DdbDocumentStore::new(client))
        }
        StoreBackend::LocalDynamoDB => {
            let client = build_db_client(backend).await;
            let _ = create_table(&client, config.books_collection.as_str()).await;
            Box::new(DdbDocumentStore::new(client))
        }
        StoreBackend::Memory => {
            Box::new(MemoryDocumentStore::new())
        }
    }
}
