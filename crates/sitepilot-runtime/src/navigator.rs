//! Website resolution and navigation.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use regex::Regex;
use serde::Serialize;
use serde_json::json;
use sitepilot_config::{Config, ShortcutConfig};
use sitepilot_protocols::AgentError;
use sitepilot_protocols::provider::{CompletionRequest, LLMProvider};
use sitepilot_protocols::types::Message;
use tracing::{debug, info, warn};

use crate::agent_loop::{ComputerUseLoop, LoopOutcome, LoopStop};
use crate::tool::{ComputerTool, execute_blocking};

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:https?://)?(?:www\.)?([a-zA-Z0-9.-]+\.[a-zA-Z]{2,})")
        .expect("valid URL pattern")
});

static DOMAIN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid domain pattern"));

const UNCLEAR: &str = "UNCLEAR";
const EXTRACTION_MAX_TOKENS: u32 = 50;

const EXTRACTION_PROMPT: &str = "\
You identify which website a user wants to visit.

Rules:
1. Answer with the main domain of the website only, e.g. google.com or github.com.
2. Do not include a protocol or a path.
3. For a well-known brand or company, answer with its main website domain.
4. If the user names a domain, answer with exactly that domain.
5. If no website can be identified, answer UNCLEAR.

Examples:
- \"Go to Google\" -> google.com
- \"Open GitHub\" -> github.com
- \"Visit stackoverflow\" -> stackoverflow.com
- \"https://example.com\" -> example.com
- \"What is the weather?\" -> UNCLEAR";

/// How a website was identified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    DirectUrl,
    Shortcut,
    ModelExtraction,
}

/// A resolved navigation target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Domain (or shortcut name) identified from the input.
    pub website: String,
    /// What gets typed into the overlay.
    pub target_url: String,
    pub method: ExtractionMethod,
    /// Name of the matching shortcut; only set for [`ExtractionMethod::Shortcut`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortcut: Option<String>,
}

impl Resolution {
    pub fn is_shortcut(&self) -> bool {
        self.method == ExtractionMethod::Shortcut
    }
}

/// Pull a domain straight out of the text, if it contains one.
pub fn direct_match(input: &str) -> Option<String> {
    URL_PATTERN
        .captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Clean up a model's extraction answer. Bare words get `.com`; anything
/// else that is not a domain is rejected.
pub fn normalize_extracted(answer: &str) -> Option<String> {
    let answer = answer.trim().trim_matches(|c| c == '"' || c == '\'' || c == '`').trim();
    let answer = answer.strip_suffix('.').unwrap_or(answer);
    if answer.is_empty() || answer.eq_ignore_ascii_case(UNCLEAR) {
        return None;
    }
    if DOMAIN_PATTERN.is_match(answer) {
        return Some(answer.to_lowercase());
    }
    if !answer.contains('.') && answer.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Some(format!("{}.com", answer.to_lowercase()));
    }
    None
}

/// Prompt for the model-driven navigation session.
pub fn navigation_prompt(target: &str) -> String {
    format!(
        "Navigate to the website \"{target}\" using Spotlight search on macOS.

Steps:
1. Take a screenshot to see the current desktop.
2. Open Spotlight with {{\"action\": \"key\", \"key\": \"command+space\"}}. It returns once Spotlight is ready.
3. Take a screenshot to confirm Spotlight is open. If it holds old text, press command+a first.
4. Type '{target}' with {{\"action\": \"type\", \"text\": \"{target}\"}}.
5. Press return right away with {{\"action\": \"key\", \"key\": \"return\"}}.
6. Wait 2 seconds for the page to load.
7. Take a final screenshot to confirm the browser shows the website.

Start with the screenshot."
    )
}

/// Turns free text into a website and drives the desktop there.
pub struct WebsiteNavigator {
    provider: Arc<dyn LLMProvider>,
    extraction_model: String,
    shortcuts: Vec<ShortcutConfig>,
    warning_delay: Duration,
    page_load_wait: Duration,
    max_iterations: u32,
}

impl WebsiteNavigator {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &Config) -> Self {
        Self {
            provider,
            extraction_model: config.provider.extraction_model.clone(),
            shortcuts: config.shortcuts.clone(),
            warning_delay: config.session.user_warning_delay(),
            page_load_wait: config.session.page_load_wait(),
            max_iterations: config.session.navigate_max_iterations,
        }
    }

    pub fn shortcuts(&self) -> &[ShortcutConfig] {
        &self.shortcuts
    }

    /// Direct URL, then configured shortcuts, then the model.
    pub async fn resolve_website(&self, input: &str) -> Option<Resolution> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        if let Some(domain) = direct_match(input) {
            debug!("Direct URL detected: {}", domain);
            return Some(Resolution {
                target_url: domain.clone(),
                website: domain,
                method: ExtractionMethod::DirectUrl,
                shortcut: None,
            });
        }

        if let Some(shortcut) = self.shortcuts.iter().find(|s| s.matches(input)) {
            info!("Request matched shortcut '{}'", shortcut.name);
            return Some(Resolution {
                website: shortcut.name.clone(),
                target_url: shortcut.target_url.clone(),
                method: ExtractionMethod::Shortcut,
                shortcut: Some(shortcut.name.clone()),
            });
        }

        let domain = self.extract_with_model(input).await?;
        Some(Resolution {
            target_url: domain.clone(),
            website: domain,
            method: ExtractionMethod::ModelExtraction,
            shortcut: None,
        })
    }

    /// Ask the model which website the text refers to. Model failures count
    /// as "no website".
    pub async fn extract_with_model(&self, input: &str) -> Option<String> {
        let request = CompletionRequest::new(
            self.extraction_model.clone(),
            vec![Message::user(format!("Extract the website from this user request: '{}'", input))],
        )
        .with_system(EXTRACTION_PROMPT)
        .with_max_tokens(EXTRACTION_MAX_TOKENS);

        match self.provider.complete(request).await {
            Ok(response) => {
                let answer = response.message.text();
                let domain = normalize_extracted(&answer);
                info!("Model extracted {:?} from '{}' (answer '{}')", domain, input, answer.trim());
                domain
            }
            Err(e) => {
                warn!("Website extraction failed: {}", e);
                None
            }
        }
    }

    /// Drive the desktop to `resolution`. Shortcuts run a fixed action
    /// sequence without the model; everything else runs the tool loop.
    pub async fn navigate(
        &self,
        agent: &ComputerUseLoop,
        tool: Arc<dyn ComputerTool>,
        resolution: &Resolution,
    ) -> Result<LoopOutcome, AgentError> {
        info!(
            "Taking control of the desktop to open {}. Move the mouse to the top-left corner to stop.",
            resolution.target_url
        );
        tokio::time::sleep(self.warning_delay).await;

        if resolution.is_shortcut() {
            return self.direct_flow(tool, &resolution.target_url).await;
        }

        let outcome = agent
            .run(tool, navigation_prompt(&resolution.target_url), self.max_iterations)
            .await;
        match outcome.stop {
            LoopStop::FailSafe => Err(AgentError::Aborted),
            _ => Ok(outcome),
        }
    }

    async fn direct_flow(
        &self,
        tool: Arc<dyn ComputerTool>,
        target_url: &str,
    ) -> Result<LoopOutcome, AgentError> {
        let steps = [
            json!({"action": "key", "key": "command+space"}),
            // Typing over a selection replaces any query left in the overlay.
            json!({"action": "key", "key": "command+a"}),
            json!({"action": "type", "text": target_url}),
            json!({"action": "key", "key": "return"}),
            json!({"action": "wait", "seconds": self.page_load_wait.as_secs_f64()}),
        ];

        for step in steps {
            let result = execute_blocking(&tool, step).await?;
            if tool.is_stopped() {
                return Err(AgentError::Aborted);
            }
            if result.is_error {
                let message = result.as_text().unwrap_or_default().to_string();
                return Err(AgentError::ExecutionFailed(message));
            }
            debug!("Shortcut step: {}", result.as_text().unwrap_or_default());
        }

        info!("Shortcut navigation to {} completed", target_url);
        Ok(LoopOutcome {
            messages: Vec::new(),
            iterations: 0,
            stop: LoopStop::Completed,
            error: None,
        })
    }
}

#[cfg(test)]
#[path = "navigator_tests.rs"]
mod tests;
