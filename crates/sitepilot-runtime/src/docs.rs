//! Markdown documentation for generated endpoints.

use std::sync::Arc;

use futures::StreamExt;
use futures::stream::BoxStream;
use serde::Serialize;
use sitepilot_config::Config;
use sitepilot_protocols::error::ProviderError;
use sitepilot_protocols::provider::{CompletionRequest, LLMProvider};
use sitepilot_protocols::types::Message;

const DOCS_MAX_TOKENS: u32 = 2000;
const DOCS_SYSTEM: &str = "You are a technical documentation expert. Write clear, complete and professional API documentation in Markdown.";
const PLACEHOLDER_SLUG: &str = "your-endpoint";

/// What to document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DocsRequest {
    pub request: String,
    pub endpoint_slug: Option<String>,
    pub website: Option<String>,
}

impl DocsRequest {
    pub fn slug(&self) -> &str {
        self.endpoint_slug.as_deref().filter(|s| !s.is_empty()).unwrap_or(PLACEHOLDER_SLUG)
    }
}

pub struct DocsGenerator {
    provider: Arc<dyn LLMProvider>,
    model: String,
    base_url: String,
    fields: Vec<String>,
}

impl DocsGenerator {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &Config) -> Self {
        Self {
            provider,
            model: config.provider.docs_model.clone(),
            base_url: format!("http://{}:{}", config.server.host, config.server.port),
            fields: config.endpoints.fields.clone(),
        }
    }

    pub fn prompt(&self, docs: &DocsRequest) -> String {
        let slug = docs.slug();
        let website = docs.website.as_deref().unwrap_or("various websites");
        let base_url = &self.base_url;
        let fields = self.fields.join(", ");
        format!(
            "Write API documentation for an endpoint created from this request: \"{request}\".

Context:
- The website involved is: {website}
- The endpoint is produced by driving a browser on a Mac, capturing the page and converting it to JSON.
- It is served at GET /{slug} and returns a JSON array whose items usually carry: {fields}
- POST /refresh-endpoint with {{\"endpoint\": \"{slug}\"}} re-scrapes the data.

Include these sections:

## API Overview
## Base URL
```
{base_url}
```
## Authentication
No authentication required.
## Endpoints
### GET /{slug}
Response format, a realistic example response, and response codes (200, 404 when the data has not been scraped yet, 500 when the cached file is unreadable).
## Usage Examples
cURL (`curl -X GET \"{base_url}/{slug}\"`), JavaScript fetch and Python requests.
## Data Freshness
## Error Handling

Use proper Markdown and be specific about the data this endpoint returns.",
            request = docs.request,
        )
    }

    fn completion(&self, docs: &DocsRequest) -> CompletionRequest {
        CompletionRequest::new(self.model.clone(), vec![Message::user(self.prompt(docs))])
            .with_system(DOCS_SYSTEM)
            .with_max_tokens(DOCS_MAX_TOKENS)
    }

    pub async fn generate(&self, docs: &DocsRequest) -> Result<String, ProviderError> {
        let response = self.provider.complete(self.completion(docs)).await?;
        Ok(response.message.text().trim().to_string())
    }

    /// Stream the documentation as text deltas.
    pub async fn generate_stream(
        &self,
        docs: &DocsRequest,
    ) -> Result<BoxStream<'static, Result<String, ProviderError>>, ProviderError> {
        let stream = self.provider.complete_stream(self.completion(docs)).await?;
        Ok(stream
            .filter_map(|chunk| async move {
                match chunk {
                    Ok(chunk) => chunk.delta.filter(|d| !d.is_empty()).map(Ok),
                    Err(e) => Some(Err(e)),
                }
            })
            .boxed())
    }
}
