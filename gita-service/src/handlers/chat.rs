//! The chat relay: validate, build the persona prompt, dispatch to the
//! remote model or the fallback pool, normalize the signature.

use crate::error::AppError;
use crate::services::metrics;
use crate::services::persona;
use crate::services::providers::{ProviderError, TextProvider};
use crate::startup::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use validator::{Validate, ValidationError};

/// Fixed pacing delay applied after validation, on every path. UX
/// pacing for the client's typing indicator, not a performance knob.
const RESPONSE_PACING: Duration = Duration::from_millis(500);

#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub message: String,
}

fn not_blank(message: &str) -> Result<(), ValidationError> {
    if message.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub message: String,
}

/// `POST /api/chat`
///
/// The body is taken as a `Result` so a malformed payload surfaces as
/// the generic 500 contract instead of axum's default rejection.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(request) = payload.map_err(|e| {
        metrics::record_chat_request("error");
        AppError::InternalError(anyhow::anyhow!("Malformed request body: {}", e))
    })?;

    tracing::info!(message_len = request.message.len(), "Received chat request");

    if request.validate().is_err() {
        tracing::warn!("Empty message received");
        metrics::record_chat_request("rejected");
        return Err(AppError::EmptyMessage);
    }

    let prompt = persona::build_prompt(&request.message);

    tokio::time::sleep(RESPONSE_PACING).await;

    let message = match &state.provider {
        None => {
            tracing::warn!("No model available, using fallback response");
            metrics::record_chat_request("fallback");
            choose_fallback(&state)
        }
        Some(provider) => relay(provider.as_ref(), &prompt, &state).await,
    };

    Ok(Json(ChatResponse { message }))
}

/// Invoke the remote model and shape its reply. Every failure mode
/// collapses into a fallback answer; the caller never sees provider
/// error detail.
async fn relay(provider: &dyn TextProvider, prompt: &str, state: &AppState) -> String {
    tracing::info!(model = %provider.model(), "Sending request to remote model");
    let started = Instant::now();

    match provider.generate(prompt).await {
        Ok(response) => {
            metrics::record_provider_latency(provider.model(), started.elapsed().as_secs_f64());
            match response.text {
                Some(text) => {
                    tracing::info!(reply_len = text.len(), "Response received from remote model");
                    metrics::record_chat_request("remote");
                    persona::ensure_signature(&text)
                }
                None => {
                    tracing::error!("Remote model returned no extractable text");
                    metrics::record_provider_error("empty_response");
                    metrics::record_chat_request("fallback");
                    choose_fallback(state)
                }
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Remote model call failed, using fallback");
            metrics::record_provider_error(error_label(&e));
            metrics::record_chat_request("fallback");
            choose_fallback(state)
        }
    }
}

fn choose_fallback(state: &AppState) -> String {
    let fallback = state.fallbacks.choose(&mut rand::thread_rng());
    tracing::info!(fallback_len = fallback.len(), "Using fallback response");
    fallback.to_string()
}

fn error_label(error: &ProviderError) -> &'static str {
    match error {
        ProviderError::NotConfigured(_) => "not_configured",
        ProviderError::ApiError(_) => "api",
        ProviderError::RateLimited => "rate_limited",
        ProviderError::ContentFiltered => "content_filtered",
        ProviderError::NetworkError(_) => "network",
    }
}
