//! MCP tool service over the query engine.
//!
//! Argument problems are reported inside the tool result, never as protocol
//! errors.

use crate::args::{loose_int, loose_str};
use emotion_core::engine::DEFAULT_SEARCH_LIMIT;
use emotion_core::QueryEngine;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::schemars;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct SampleRequest {
    /// Number of rows to draw
    #[serde(default, deserialize_with = "loose_int")]
    #[schemars(with = "i64", description = "Number of random rows to return")]
    pub n: Option<i64>,
}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct CountRequest {
    #[serde(default, deserialize_with = "loose_str")]
    #[schemars(with = "String", description = "Emotion name, e.g. joy (case-insensitive)")]
    pub emotion: String,
}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct SearchRequest {
    #[serde(default, deserialize_with = "loose_str")]
    #[schemars(with = "String", description = "Substring to find in the text (case-insensitive)")]
    pub query: String,

    /// Maximum results (default: 5)
    #[serde(default, deserialize_with = "loose_int")]
    #[schemars(with = "Option<i64>", description = "Maximum number of results (1-50, default 5)")]
    pub limit: Option<i64>,
}

#[derive(Clone)]
pub struct EmotionService {
    engine: Arc<QueryEngine>,
    tool_router: ToolRouter<Self>,
}

impl EmotionService {
    pub fn new(engine: Arc<QueryEngine>) -> Self {
        Self { engine, tool_router: Self::tool_router() }
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tool_router.list_all().into_iter().map(|t| t.name.to_string()).collect()
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

#[tool_router]
impl EmotionService {
    #[tool(description = "Get n random samples from the dataset.")]
    pub async fn get_sample(
        &self,
        Parameters(request): Parameters<SampleRequest>,
    ) -> Result<CallToolResult, McpError> {
        json_result(&self.engine.sample(request.n.unwrap_or(0)))
    }

    #[tool(description = "Count samples for a specific emotion string (e.g., joy).")]
    pub async fn count_by_emotion(
        &self,
        Parameters(request): Parameters<CountRequest>,
    ) -> Result<CallToolResult, McpError> {
        json_result(&self.engine.count_by_emotion(&request.emotion))
    }

    #[tool(description = "Search for query substring in dataset text (case-insensitive).")]
    pub async fn search_text(
        &self,
        Parameters(request): Parameters<SearchRequest>,
    ) -> Result<CallToolResult, McpError> {
        let limit = request.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
        json_result(&self.engine.search_text(&request.query, limit))
    }

    #[tool(description = "Return counts + percent for each emotion label.")]
    pub async fn analyze_emotion_distribution(&self) -> Result<CallToolResult, McpError> {
        json_result(&self.engine.distribution_analysis())
    }
}

#[tool_handler]
impl ServerHandler for EmotionService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Query a labeled emotion corpus. Use get_sample for random rows, count_by_emotion \
                 for one label, search_text for substring matches and \
                 analyze_emotion_distribution for per-label counts."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            ..Default::default()
        }
    }
}
