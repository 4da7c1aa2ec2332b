use std::cmp;
use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::AttributeValue;
use uuid::Uuid;

use crate::core::shelf::{PaginatedResult, ShelfError, ShelfResult};
use crate::core::store::{Document, DocumentStore, Fields};
use crate::utils::ddb::{add_filter_expr, fields_to_item, item_to_document, page_token, to_ddb_page, value_to_attr, DOC_ID};

#[derive(Debug)]
pub struct DdbDocumentStore {
    client: Client,
}

impl DdbDocumentStore {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            client,
        }
    }

    async fn put_item(&self, collection: &str, id: &str, fields: &Fields,
                      condition: Option<&str>) -> ShelfResult<String> {
        let mut item = fields_to_item(fields);
        item.insert(DOC_ID.to_string(), AttributeValue::S(id.to_string()));
        let mut request = self.client
            .put_item()
            .table_name(collection)
            .set_item(Some(item));
        if let Some(condition) = condition {
            request = request.condition_expression(condition);
        }
        request.send().await.map(|_| id.to_string()).map_err(ShelfError::from)
    }

    // merges the named fields into the document, leaving the rest untouched
    async fn merge_fields(&self, collection: &str, id: &str, fields: &Fields) -> ShelfResult<()> {
        if fields.is_empty() {
            return Ok(());
        }
        let mut expr = String::new();
        let mut request = self.client
            .update_item()
            .table_name(collection)
            .key(DOC_ID, AttributeValue::S(id.to_string()));
        for (i, (k, v)) in fields.iter().enumerate() {
            if expr.is_empty() {
                expr.push_str("SET ");
            } else {
                expr.push_str(", ");
            }
            expr.push_str(format!("#f{} = :v{}", i, i).as_str());
            request = request
                .expression_attribute_names(format!("#f{}", i), k)
                .expression_attribute_values(format!(":v{}", i), value_to_attr(v));
        }
        request
            .update_expression(expr)
            .send()
            .await.map(|_| ()).map_err(ShelfError::from)
    }

    async fn scan_page(&self, collection: &str, page: Option<&str>,
                       predicate: &HashMap<String, String>,
                       limit: Option<usize>) -> ShelfResult<(Vec<Document>, Option<String>)> {
        let exclusive_start_key = to_ddb_page(page);
        let mut request = self.client
            .scan()
            .table_name(collection)
            .consistent_read(false)
            .set_exclusive_start_key(exclusive_start_key);
        if let Some(limit) = limit {
            request = request.limit(cmp::min(limit, 500) as i32);
        }
        let mut filter_expr = String::new();
        for (k, v) in predicate {
            let ks = add_filter_expr(k.as_str(), &mut filter_expr);
            request = request
                .expression_attribute_names(format!("#{}", ks), ks.as_str())
                .expression_attribute_values(format!(":{}", ks), AttributeValue::S(v.to_string()));
        }
        if !filter_expr.is_empty() {
            request = request.filter_expression(filter_expr);
        }
        request
            .send()
            .await.map_err(ShelfError::from).map(|res| {
            let def_items = vec![];
            let items = res.items.as_ref().unwrap_or(&def_items);
            let records = items.iter().map(item_to_document).collect();
            (records, page_token(res.last_evaluated_key()))
        })
    }
}

#[async_trait]
impl DocumentStore for DdbDocumentStore {
    async fn create(&self, collection: &str, fields: &Fields) -> ShelfResult<String> {
        let id = Uuid::new_v4().to_string();
        self.put_item(collection, id.as_str(), fields,
                      Some("attribute_not_exists(doc_id)")).await
    }

    async fn create_with_id(&self, collection: &str, id: &str, fields: &Fields) -> ShelfResult<String> {
        self.put_item(collection, id, fields, None).await
    }

    async fn get_all(&self, collection: &str) -> ShelfResult<Vec<Document>> {
        let mut records = vec![];
        let mut page: Option<String> = None;
        loop {
            let (batch, next) = self.scan_page(collection, page.as_deref(),
                                               &HashMap::new(), None).await?;
            records.extend(batch);
            match next {
                Some(next) => page = Some(next),
                None => break,
            }
        }
        Ok(records)
    }

    async fn get_by_id(&self, collection: &str, id: &str) -> ShelfResult<Document> {
        self.client
            .get_item()
            .table_name(collection)
            .key(DOC_ID, AttributeValue::S(id.to_string()))
            .consistent_read(true)
            .send()
            .await.map_err(ShelfError::from).and_then(|res| {
            if let Some(item) = res.item() {
                Ok(item_to_document(item))
            } else {
                Err(ShelfError::not_found(format!("document not found for {} in {}",
                                                  id, collection).as_str()))
            }
        })
    }

    async fn get_by_query(&self, collection: &str,
                          predicate: &HashMap<String, String>) -> ShelfResult<Vec<Document>> {
        let mut records = vec![];
        let mut page: Option<String> = None;
        loop {
            let (batch, next) = self.scan_page(collection, page.as_deref(),
                                               predicate, None).await?;
            records.extend(batch);
            match next {
                Some(next) => page = Some(next),
                None => break,
            }
        }
        Ok(records)
    }

    async fn get_paginated(&self, collection: &str, page: Option<&str>,
                           predicate: &HashMap<String, String>,
                           page_size: usize) -> ShelfResult<PaginatedResult<Document>> {
        let (records, next_page) = self.scan_page(collection, page,
                                                  predicate, Some(page_size)).await?;
        Ok(PaginatedResult::new(page, page_size, next_page, records))
    }

    async fn update(&self, collection: &str, id: &str, fields: &Fields) -> ShelfResult<()> {
        self.merge_fields(collection, id, fields).await
    }

    async fn set(&self, collection: &str, id: &str, fields: &Fields, merge: bool) -> ShelfResult<()> {
        if merge {
            self.merge_fields(collection, id, fields).await
        } else {
            self.put_item(collection, id, fields, None).await.map(|_| ())
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> ShelfResult<()> {
        self.client.delete_item()
            .table_name(collection)
            .key(DOC_ID, AttributeValue::S(id.to_string()))
            .send()
            .await.map(|_| ()).map_err(ShelfError::from)
    }

    async fn exists(&self, collection: &str, id: &str) -> ShelfResult<bool> {
        self.client
            .get_item()
            .table_name(collection)
            .key(DOC_ID, AttributeValue::S(id.to_string()))
            .consistent_read(true)
            .send()
            .await.map(|res| res.item().is_some()).map_err(ShelfError::from)
    }
}
