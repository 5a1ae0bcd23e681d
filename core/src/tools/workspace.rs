//! Third-party workspace integration
//!
//! The workspace (a Notion-style page/database service) is an opaque
//! collaborator behind [`WorkspaceConnector`]. Handlers require a
//! credential from the run context and never issue a network call without
//! one.

use crate::error::{Result, ToolError};
use crate::tools::catalog::names;
use async_trait::async_trait;
use serde_json::{json, Value};

/// Collaborator adapter for the connected workspace. All page/database
/// operations take the per-user credential resolved by the host.
#[async_trait]
pub trait WorkspaceConnector: Send + Sync {
    /// Whether a credential is stored for the user
    async fn has_credential(&self, user_id: &str) -> Result<bool>;

    /// The stored credential for the user
    async fn get_credential(&self, user_id: &str) -> Result<String>;

    /// Search pages
    async fn search(&self, query: &str, token: &str) -> Result<Value>;

    /// Read a page by id
    async fn get_page(&self, page_id: &str, token: &str) -> Result<Value>;

    /// Create a page in a database
    async fn create_page(
        &self,
        database_id: &str,
        title: &str,
        content: &str,
        token: &str,
    ) -> Result<Value>;

    /// Append content to a page
    async fn append_page(&self, page_id: &str, content: &str, token: &str) -> Result<Value>;

    /// List the databases the integration can see
    async fn list_databases(&self, token: &str) -> Result<Value>;
}

/// Route a workspace tool call to the connector. The caller has already
/// verified that a credential is present.
pub async fn dispatch_workspace(
    connector: &dyn WorkspaceConnector,
    name: &str,
    args: &Value,
    token: &str,
) -> Result<Value> {
    let str_arg = |key: &str| -> Result<&str> {
        args.get(key)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ToolError::Validation {
                    message: format!("missing required argument: {}", key),
                }
                .into()
            })
    };

    match name {
        names::WORKSPACE_SEARCH => connector.search(str_arg("query")?, token).await,
        names::WORKSPACE_READ_PAGE => connector.get_page(str_arg("page_id")?, token).await,
        names::WORKSPACE_CREATE_PAGE => {
            connector
                .create_page(
                    str_arg("database_id")?,
                    str_arg("title")?,
                    str_arg("content")?,
                    token,
                )
                .await
        }
        names::WORKSPACE_APPEND_PAGE => {
            connector
                .append_page(str_arg("page_id")?, str_arg("content")?, token)
                .await
        }
        names::WORKSPACE_LIST_DATABASES => connector.list_databases(token).await,
        _ => Err(ToolError::UnknownTool {
            name: name.to_string(),
        }
        .into()),
    }
}

/// Whether a tool name belongs to the workspace integration
pub fn is_workspace_tool(name: &str) -> bool {
    matches!(
        name,
        names::WORKSPACE_SEARCH
            | names::WORKSPACE_READ_PAGE
            | names::WORKSPACE_CREATE_PAGE
            | names::WORKSPACE_APPEND_PAGE
            | names::WORKSPACE_LIST_DATABASES
    )
}

/// HTTP adapter for a Notion-compatible workspace API
pub struct HttpWorkspaceConnector {
    client: reqwest::Client,
    base_url: String,
    api_version: String,
}

impl HttpWorkspaceConnector {
    /// Default public API endpoint
    pub const DEFAULT_BASE_URL: &'static str = "https://api.notion.com";

    /// Create an adapter against the default endpoint
    pub fn new() -> Self {
        Self::with_base_url(Self::DEFAULT_BASE_URL)
    }

    /// Create an adapter against a custom endpoint (tests, proxies)
    pub fn with_base_url<S: Into<String>>(base_url: S) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_version: "2022-06-28".to_string(),
        }
    }

    async fn post(&self, path: &str, token: &str, body: Value) -> Result<Value> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(token)
            .header("Notion-Version", &self.api_version)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn get(&self, path: &str, token: &str) -> Result<Value> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(token)
            .header("Notion-Version", &self.api_version)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn patch(&self, path: &str, token: &str, body: Value) -> Result<Value> {
        let response = self
            .client
            .patch(format!("{}{}", self.base_url, path))
            .bearer_auth(token)
            .header("Notion-Version", &self.api_version)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    fn paragraph_blocks(content: &str) -> Value {
        json!([{
            "object": "block",
            "type": "paragraph",
            "paragraph": {
                "rich_text": [{ "type": "text", "text": { "content": content } }]
            }
        }])
    }
}

impl Default for HttpWorkspaceConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkspaceConnector for HttpWorkspaceConnector {
    async fn has_credential(&self, _user_id: &str) -> Result<bool> {
        // Credential storage lives with the host; the HTTP adapter only
        // speaks the page API.
        Ok(false)
    }

    async fn get_credential(&self, _user_id: &str) -> Result<String> {
        Err(ToolError::NotConnected.into())
    }

    async fn search(&self, query: &str, token: &str) -> Result<Value> {
        self.post("/v1/search", token, json!({ "query": query })).await
    }

    async fn get_page(&self, page_id: &str, token: &str) -> Result<Value> {
        self.get(&format!("/v1/pages/{}", page_id), token).await
    }

    async fn create_page(
        &self,
        database_id: &str,
        title: &str,
        content: &str,
        token: &str,
    ) -> Result<Value> {
        self.post(
            "/v1/pages",
            token,
            json!({
                "parent": { "database_id": database_id },
                "properties": {
                    "title": {
                        "title": [{ "type": "text", "text": { "content": title } }]
                    }
                },
                "children": Self::paragraph_blocks(content)
            }),
        )
        .await
    }

    async fn append_page(&self, page_id: &str, content: &str, token: &str) -> Result<Value> {
        self.patch(
            &format!("/v1/blocks/{}/children", page_id),
            token,
            json!({ "children": Self::paragraph_blocks(content) }),
        )
        .await
    }

    async fn list_databases(&self, token: &str) -> Result<Value> {
        self.post(
            "/v1/search",
            token,
            json!({ "filter": { "property": "object", "value": "database" } }),
        )
        .await
    }
}
