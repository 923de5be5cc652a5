//! cache_clear tool implementation.
//!
//! Empties the in-memory tier and every prefixed entry in the session store.

use ffwrapped_client::WrappedApi;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::pretty;

/// Output from the cache_clear tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheClearOutput {
    /// Entries held in memory before clearing.
    pub memory_entries: usize,

    /// Session store key prefix that was cleared.
    pub prefix: String,
}

pub async fn cache_clear_impl(api: &WrappedApi) -> Result<CallToolResult, McpError> {
    let cache = api.client().cache();
    let output = CacheClearOutput { memory_entries: cache.memory_len(), prefix: cache.prefix().to_string() };

    api.clear_cache().await;
    tracing::info!(memory_entries = output.memory_entries, prefix = %output.prefix, "cache cleared");

    Ok(CallToolResult::success(vec![Content::text(pretty(&output)?)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{api, body};

    #[tokio::test]
    async fn test_clear_then_refetch() {
        let (api, backend) = api();
        api.league_info("42", 2024).await.unwrap();

        let result = cache_clear_impl(&api).await.unwrap();
        let output: CacheClearOutput = serde_json::from_value(body(&result)).unwrap();
        assert_eq!(output.memory_entries, 1);
        assert_eq!(output.prefix, "ffw_");
        assert_eq!(api.client().cache().memory_len(), 0);

        assert!(!api.league_info("42", 2024).await.unwrap().from_cache);
        assert_eq!(backend.seen().len(), 2);
    }
}
