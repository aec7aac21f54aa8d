use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// A server that answers lookups with a JSON body.
#[async_trait]
pub trait JsonSource: Send + Sync {
    /// Base URL, for log messages.
    fn base_url(&self) -> &str;

    /// GET `base_url` joined with the given path segments.
    async fn get_json(&self, segments: &[&str]) -> Result<Value>;
}
