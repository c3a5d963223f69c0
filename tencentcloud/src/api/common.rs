//! Common types and utilities for TencentCloud API calls

use serde::{Deserialize, Deserializer, Serialize};
use std::future::Future;

use super::error::ApiError;

/// Page size used by every list call
pub const PAGE_SIZE: i64 = 20;

/// Envelope for actions that answer with `Response.Result`
#[derive(Debug, Deserialize)]
pub struct ResultResponse<T> {
    #[serde(rename = "Result")]
    pub result: Option<T>,
}

impl<T> ResultResponse<T> {
    pub fn into_result(self, action: &str) -> Result<T, ApiError> {
        self.result.ok_or_else(|| ApiError::empty_response(action))
    }
}

/// Name/values filter accepted by the Describe* actions
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Filter {
    pub name: String,
    pub values: Vec<String>,
}

impl Filter {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            values: vec![value.to_string()],
        }
    }
}

/// Limit/offset pair flattened into list requests
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PageParams {
    pub limit: i64,
    pub offset: i64,
}

/// Fetch pages until one comes back shorter than [`PAGE_SIZE`], keeping order
pub async fn paginate<T, F, Fut>(mut fetch: F) -> Result<Vec<T>, ApiError>
where
    F: FnMut(PageParams) -> Fut,
    Fut: Future<Output = Result<Vec<T>, ApiError>>,
{
    let mut items = Vec::new();
    let mut page = PageParams {
        limit: PAGE_SIZE,
        offset: 0,
    };

    loop {
        let batch = fetch(page).await?;
        let len = batch.len();
        items.extend(batch);

        if len < PAGE_SIZE as usize {
            return Ok(items);
        }
        page.offset += PAGE_SIZE;
    }
}

/// Treat an explicit JSON `null` like a missing field
pub fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
