//! Session orchestration.
//!
//! One [`SessionManager`] is built at startup and shared by `Arc`. It owns
//! the only cross-request state: the session gate and the overlay speed
//! estimate.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use serde::Serialize;
use sitepilot_config::Config;
use sitepilot_desktop::{
    ActionExecutor, AdaptiveOpener, AppleScriptQuery, DesktopBackend, OverlayOpener, SpeedEstimate,
    SpotlightDetector,
};
use sitepilot_protocols::provider::LLMProvider;
use sitepilot_protocols::{AgentError, SessionError};
use tracing::{error, info};

use crate::agent_loop::{AgentLoopConfig, ComputerUseLoop, LoopOutcome};
use crate::docs::DocsGenerator;
use crate::endpoint_store::{EndpointStore, sanitize_slug};
use crate::gate::{GatePermit, SessionGate};
use crate::navigator::{Resolution, WebsiteNavigator};
use crate::scraper::{EndpointScraper, ScrapeReport};
use crate::tool::ComputerTool;

/// Builds the computer tool for a new session.
pub type ToolFactory = Arc<dyn Fn() -> Arc<dyn ComputerTool> + Send + Sync>;

/// Acknowledgement of a navigation that is now running in the background.
#[derive(Debug, Clone, Serialize)]
pub struct NavigationStarted {
    pub original_input: String,
    pub resolution: Resolution,
}

/// Acknowledgement of a scrape that is now running in the background.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeStarted {
    pub slug: String,
    pub request: String,
}

pub struct SessionManager {
    config: Arc<Config>,
    gate: SessionGate,
    speed: Arc<SpeedEstimate>,
    tools: ToolFactory,
    agent: Arc<ComputerUseLoop>,
    navigator: Arc<WebsiteNavigator>,
    scraper: Arc<EndpointScraper>,
    docs: DocsGenerator,
    store: Arc<EndpointStore>,
}

impl SessionManager {
    /// Wire the real desktop: Spotlight detector, adaptive opener and one
    /// action executor per session.
    pub fn new(
        config: Arc<Config>,
        provider: Arc<dyn LLMProvider>,
        backend: Arc<dyn DesktopBackend>,
        store: Arc<EndpointStore>,
    ) -> Self {
        let speed = Arc::new(SpeedEstimate::from_config(&config.overlay));
        let opener = Self::build_opener(&config, &backend, Arc::clone(&speed));

        let input_config = config.input.clone();
        let tools: ToolFactory = Arc::new(move || {
            Arc::new(ActionExecutor::new(
                Arc::clone(&backend),
                Arc::clone(&opener),
                input_config.clone(),
            )) as Arc<dyn ComputerTool>
        });

        Self::with_tools(config, provider, tools, speed, store)
    }

    /// Detector and opener over `backend`, sharing `speed`.
    pub fn build_opener(
        config: &Config,
        backend: &Arc<dyn DesktopBackend>,
        speed: Arc<SpeedEstimate>,
    ) -> Arc<dyn OverlayOpener> {
        let query = Arc::new(AppleScriptQuery::from_config(&config.detector));
        let detector = Arc::new(SpotlightDetector::new(query, backend.screen(), &config.detector));
        Arc::new(AdaptiveOpener::new(detector, speed, config.overlay.clone()))
    }

    pub fn with_tools(
        config: Arc<Config>,
        provider: Arc<dyn LLMProvider>,
        tools: ToolFactory,
        speed: Arc<SpeedEstimate>,
        store: Arc<EndpointStore>,
    ) -> Self {
        Self {
            gate: SessionGate::new(),
            speed,
            tools,
            agent: Arc::new(ComputerUseLoop::new(
                Arc::clone(&provider),
                AgentLoopConfig::from_config(&config),
            )),
            navigator: Arc::new(WebsiteNavigator::new(Arc::clone(&provider), &config)),
            scraper: Arc::new(EndpointScraper::new(Arc::clone(&provider), &config)),
            docs: DocsGenerator::new(provider, &config),
            store,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn gate(&self) -> &SessionGate {
        &self.gate
    }

    pub fn speed(&self) -> &Arc<SpeedEstimate> {
        &self.speed
    }

    pub fn navigator(&self) -> &WebsiteNavigator {
        &self.navigator
    }

    pub fn docs(&self) -> &DocsGenerator {
        &self.docs
    }

    pub fn store(&self) -> &Arc<EndpointStore> {
        &self.store
    }

    /// Resolve `input` without touching the desktop.
    pub async fn extract_website(&self, input: &str) -> Option<Resolution> {
        self.navigator.resolve_website(input).await
    }

    /// Take the gate, resolve the website and start navigating in the
    /// background. The gate is released after the grace period, or as soon
    /// as the navigation fails.
    pub async fn start_navigation(&self, input: &str) -> Result<NavigationStarted, SessionError> {
        let permit = self.gate.try_acquire()?;

        let Some(resolution) = self.navigator.resolve_website(input).await else {
            permit.release();
            return Err(SessionError::UnresolvedWebsite(input.trim().to_string()));
        };

        let navigator = Arc::clone(&self.navigator);
        let agent = Arc::clone(&self.agent);
        let tool = (self.tools)();
        let target = resolution.clone();
        spawn_session(permit.clone(), "navigation", async move {
            navigator.navigate(&agent, tool, &target).await.map(|_| ())
        });
        permit.release_after(self.config.session.lock_release_delay());

        info!("Navigation to {} started", resolution.target_url);
        Ok(NavigationStarted {
            original_input: input.trim().to_string(),
            resolution,
        })
    }

    /// Resolve and navigate in the foreground, holding the gate throughout.
    pub async fn navigate_now(&self, input: &str) -> Result<(Resolution, LoopOutcome), AgentError> {
        let permit = self.gate.try_acquire()?;

        let result = async {
            let resolution = self
                .navigator
                .resolve_website(input)
                .await
                .ok_or_else(|| SessionError::UnresolvedWebsite(input.trim().to_string()))?;
            let outcome = self.navigator.navigate(&self.agent, (self.tools)(), &resolution).await?;
            Ok::<_, AgentError>((resolution, outcome))
        }
        .await;

        permit.release();
        result
    }

    /// Take the gate and start scraping `request` into `raw_slug`. The gate
    /// is held until the scrape finishes, whatever the outcome.
    pub fn start_scrape(
        &self,
        request: &str,
        raw_slug: &str,
    ) -> Result<ScrapeStarted, SessionError> {
        let permit = self.gate.try_acquire()?;

        let request = request.trim().to_string();
        let Some(slug) = sanitize_slug(raw_slug) else {
            permit.release();
            return Err(SessionError::InvalidSlug(raw_slug.to_string()));
        };
        if request.is_empty() {
            permit.release();
            return Err(SessionError::UnresolvedWebsite(request));
        }

        let navigator = Arc::clone(&self.navigator);
        let agent = Arc::clone(&self.agent);
        let scraper = Arc::clone(&self.scraper);
        let store = Arc::clone(&self.store);
        let tool = (self.tools)();
        let (task_request, task_slug) = (request.clone(), slug.clone());
        let release = permit.clone();
        spawn_session(permit, "scrape", async move {
            let report: Result<ScrapeReport, AgentError> = scraper
                .create_endpoint(&navigator, &agent, tool, &store, &task_request, &task_slug)
                .await;
            release.release();
            report.map(|_| ())
        });

        info!("Scrape for '/{}' started", slug);
        Ok(ScrapeStarted { slug, request })
    }

    /// Grace period after which a navigation's gate is released.
    pub fn lock_release_delay(&self) -> Duration {
        self.config.session.lock_release_delay()
    }
}

/// Run session work in the background. The permit is released when the
/// work fails or panics.
fn spawn_session<F>(permit: GatePermit, kind: &'static str, work: F)
where
    F: Future<Output = Result<(), AgentError>> + Send + 'static,
{
    tokio::spawn(async move {
        match AssertUnwindSafe(work).catch_unwind().await {
            Ok(Ok(())) => info!("{} session finished", kind),
            Ok(Err(e)) => {
                error!("{} session failed: {}", kind, e);
                permit.release();
            }
            Err(_) => {
                error!("{} session panicked", kind);
                permit.release();
            }
        }
    });
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
