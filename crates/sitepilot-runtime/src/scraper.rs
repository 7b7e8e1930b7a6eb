//! Scrape a page through the desktop and cache it as a JSON endpoint.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use sitepilot_config::Config;
use sitepilot_protocols::AgentError;
use sitepilot_protocols::provider::{CompletionRequest, LLMProvider};
use sitepilot_protocols::types::Message;
use tracing::{info, warn};

use crate::agent_loop::{ComputerUseLoop, LoopOutcome, LoopStop};
use crate::endpoint_store::EndpointStore;
use crate::navigator::WebsiteNavigator;
use crate::tool::ComputerTool;

const WHATS_NEW: &str = "What's New";
const HOME: &str = "Home";

/// Section of the site the scrape should land on.
pub fn section_for(request: &str) -> &'static str {
    if request.to_lowercase().contains("new") {
        WHATS_NEW
    } else {
        HOME
    }
}

pub fn capture_prompt(domain: &str, section: &str) -> String {
    format!(
        "Open Spotlight (command+space), type '{domain}', press return and wait 3 seconds.
Once the site has loaded, find the '{section}' section and click it. Take a screenshot first if unsure where it is.
Wait 3 seconds for the page to finish loading, then run {{\"action\": \"capture_html\"}} to capture the page contents.
Do not finish until the capture has succeeded. If it comes back empty, run capture_html again."
    )
}

fn conversion_prompt(fields: &[String]) -> String {
    format!(
        "You are an API data extractor. Convert the page HTML you are given into a JSON array. \
Each object must contain: {}. Output only JSON.",
        fields.join(", ")
    )
}

/// The most recent tool result that looks like an HTML document.
pub fn find_captured_html(outcome: &LoopOutcome) -> Option<&str> {
    outcome
        .tool_result_texts()
        .filter(|text| text.to_lowercase().contains("<html"))
        .last()
}

/// Cut `text` down to at most `limit` characters.
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Remove a surrounding Markdown code fence, if any.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. `json`) on the opening line.
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or(rest);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Result of a finished scrape.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeReport {
    pub slug: String,
    pub domain: String,
    pub section: String,
    /// Number of items when the document is an array.
    pub records: Option<usize>,
    pub path: PathBuf,
}

pub struct EndpointScraper {
    provider: Arc<dyn LLMProvider>,
    extraction_model: String,
    max_tokens: u32,
    fallback_domain: Option<String>,
    fields: Vec<String>,
    html_char_limit: usize,
    max_iterations: u32,
}

impl EndpointScraper {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &Config) -> Self {
        Self {
            provider,
            extraction_model: config.provider.extraction_model.clone(),
            max_tokens: config.provider.max_tokens,
            fallback_domain: config.endpoints.fallback_domain.clone(),
            fields: config.endpoints.fields.clone(),
            html_char_limit: config.endpoints.html_char_limit,
            max_iterations: config.session.scrape_max_iterations,
        }
    }

    /// Navigate, capture the page, convert it to JSON and store it under `slug`.
    pub async fn create_endpoint(
        &self,
        navigator: &WebsiteNavigator,
        agent: &ComputerUseLoop,
        tool: Arc<dyn ComputerTool>,
        store: &EndpointStore,
        request: &str,
        slug: &str,
    ) -> Result<ScrapeReport, AgentError> {
        let domain = match navigator.resolve_website(request).await {
            Some(resolution) => resolution.target_url,
            None => self.fallback_domain.clone().ok_or_else(|| {
                AgentError::ExecutionFailed(format!(
                    "Could not identify a website in '{}'",
                    request
                ))
            })?,
        };
        let section = section_for(request);
        info!("Scraping '{}' section of {} into '/{}'", section, domain, slug);

        let outcome = agent
            .run(tool, capture_prompt(&domain, section), self.max_iterations)
            .await;
        if outcome.stop == LoopStop::FailSafe {
            return Err(AgentError::Aborted);
        }

        let html = find_captured_html(&outcome).ok_or(AgentError::NothingCaptured)?;
        let html = truncate_chars(html, self.html_char_limit);
        info!("Captured {} characters of HTML", html.chars().count());

        let data = self.convert(html).await?;
        let path = store.save(slug, &data)?;
        let records = data.as_array().map(Vec::len);
        info!("Endpoint '/{}' created with {:?} records", slug, records);

        Ok(ScrapeReport {
            slug: slug.to_string(),
            domain,
            section: section.to_string(),
            records,
            path,
        })
    }

    /// Ask the model to turn page HTML into JSON.
    pub async fn convert(&self, html: &str) -> Result<Value, AgentError> {
        let request =
            CompletionRequest::new(self.extraction_model.clone(), vec![Message::user(html)])
            .with_system(conversion_prompt(&self.fields))
            .with_max_tokens(self.max_tokens);

        let response = self.provider.complete(request).await?;
        let text = response.message.text();
        serde_json::from_str(strip_code_fence(&text)).map_err(|e| {
            warn!("Model returned invalid JSON: {}", e);
            AgentError::InvalidJson(e.to_string())
        })
    }
}

#[cfg(test)]
#[path = "scraper_tests.rs"]
mod tests;
