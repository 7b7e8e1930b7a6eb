//! Foreground `navigate` and `extract` commands.

use sitepilot_api::http::handlers::CONTROL_WARNING;
use sitepilot_config::Config;
use tracing::info;

use crate::server::{BoxError, build_sessions};

pub(crate) async fn navigate(config: Config, text: &str) -> Result<(), BoxError> {
    let sessions = build_sessions(config)?;

    println!("Warning: {}", CONTROL_WARNING);
    let (resolution, outcome) = sessions.navigate_now(text).await?;

    println!("Target:  {} ({:?})", resolution.target_url, resolution.method);
    println!("Stopped: {:?} after {} iteration(s)", outcome.stop, outcome.iterations);
    if let Some(error) = &outcome.error {
        println!("Error:   {}", error);
    }
    info!("Navigation finished");
    Ok(())
}

pub(crate) async fn extract(config: Config, text: &str) -> Result<(), BoxError> {
    let sessions = build_sessions(config)?;

    match sessions.extract_website(text).await {
        Some(resolution) => {
            println!("{}", serde_json::to_string_pretty(&resolution)?);
            Ok(())
        }
        None => Err(format!("Could not identify a website in '{}'", text).into()),
    }
}
