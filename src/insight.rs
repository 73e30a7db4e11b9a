//! AI daily insight client.
//!
//! Builds a natural-language prompt from a day's task snapshot and asks the
//! Gemini `generateContent` API for a short reflection. Every failure mode
//! resolves to a fixed display string; callers never see an error.

use crate::config::InsightConfig;
use crate::models::Task;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::warn;

/// Shown when no API key is configured. No network call is attempted.
pub const MISSING_KEY_MESSAGE: &str =
    "No API key configured. Set GEMINI_API_KEY or add one to the config file.";

/// Shown when the upstream request fails.
pub const FALLBACK_MESSAGE: &str =
    "Could not generate insight at this time. Please try again later.";

/// Shown when the upstream responds with no usable text.
pub const NO_INSIGHT_MESSAGE: &str = "No insight available.";

const SYSTEM_INSTRUCTION: &str = "You are a wise and encouraging productivity coach.";

/// Upstream errors. Internal only; `generate` recovers from all of them.
#[derive(Debug, Error)]
enum InsightError {
    #[error("request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Result of one insight request, tagged with the day it was issued for so
/// the controller can drop replies that arrive after the view moved on.
#[derive(Debug, Clone)]
pub struct InsightReply {
    pub date: NaiveDate,
    pub text: String,
}

/// Build the reflection prompt from a day's task snapshot.
pub fn build_prompt(tasks: &[Task], date: NaiveDate) -> String {
    let completed: Vec<&Task> = tasks.iter().filter(|t| t.completed).collect();
    let incomplete: Vec<&Task> = tasks.iter().filter(|t| !t.completed).collect();
    let rate = if tasks.is_empty() {
        0
    } else {
        ((completed.len() as f64 / tasks.len() as f64) * 100.0).round() as u8
    };

    let itemize = |items: &[&Task]| -> String {
        items
            .iter()
            .map(|t| format!("- [{}] {}", t.priority.label(), t.text))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "Analyze the productivity for the date: {date}.\n\
         \n\
         Here is the data:\n\
         - Total Tasks: {total}\n\
         - Completed: {done}\n\
         - Incomplete: {open}\n\
         - Completion Rate: {rate}%\n\
         \n\
         Completed Tasks:\n{completed_list}\n\
         \n\
         Incomplete Tasks:\n{incomplete_list}\n\
         \n\
         Please provide a concise, friendly, and constructive reflection (max 80 words).\n\
         If productivity was high, celebrate it.\n\
         If low, offer a gentle encouraging tip for improvement.\n\
         Address the user directly as \"you\".",
        date = date,
        total = tasks.len(),
        done = completed.len(),
        open = incomplete.len(),
        rate = rate,
        completed_list = itemize(&completed),
        incomplete_list = itemize(&incomplete),
    )
}

/// Generate an insight for a day's tasks. Always resolves to a display
/// string; never errors. Callers must not invoke this for an empty day.
pub async fn generate(config: &InsightConfig, tasks: &[Task], date: NaiveDate) -> String {
    let Some(api_key) = config.resolved_api_key() else {
        return MISSING_KEY_MESSAGE.to_string();
    };

    match request_insight(config, &api_key, tasks, date).await {
        Ok(text) => {
            let text = text.trim();
            if text.is_empty() {
                NO_INSIGHT_MESSAGE.to_string()
            } else {
                text.to_string()
            }
        }
        Err(e) => {
            warn!(%date, error = %e, "insight request failed");
            FALLBACK_MESSAGE.to_string()
        }
    }
}

/// Run an insight request on the runtime, delivering the tagged reply over a
/// channel so the event loop can pick it up on its tick.
pub fn spawn(config: InsightConfig, tasks: Vec<Task>, date: NaiveDate) -> mpsc::Receiver<InsightReply> {
    let (tx, rx) = mpsc::channel(1);
    tokio::spawn(async move {
        let text = generate(&config, &tasks, date).await;
        let _ = tx.send(InsightReply { date, text }).await;
    });
    rx
}

async fn request_insight(
    config: &InsightConfig,
    api_key: &str,
    tasks: &[Task],
    date: NaiveDate,
) -> Result<String, InsightError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;

    let url = format!(
        "{}/models/{}:generateContent?key={}",
        config.base_url.trim_end_matches('/'),
        config.model,
        api_key
    );

    let body = GenerateRequest {
        system_instruction: Content {
            parts: vec![Part {
                text: SYSTEM_INSTRUCTION.to_string(),
            }],
        },
        contents: vec![Content {
            parts: vec![Part {
                text: build_prompt(tasks, date),
            }],
        }],
        generation_config: GenerationConfig {
            max_output_tokens: 256,
        },
    };

    let response = client.post(&url).json(&body).send().await?;
    if !response.status().is_success() {
        return Err(InsightError::Status(response.status()));
    }

    let parsed: GenerateResponse = response.json().await?;
    Ok(parsed.text().unwrap_or_default())
}

// Wire types for the generateContent endpoint.

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateResponse {
    fn text(&self) -> Option<String> {
        let part = self
            .candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?;
        Some(part.text.clone())
    }
}
