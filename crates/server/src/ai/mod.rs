//! Settings advisor: asks the Anthropic Messages API to suggest settings for an image.
//!
//! Any failure degrades to the built-in defaults; callers never see an error.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;
use shared::{AdvisoryResponse, SettingsSuggestion};
use thiserror::Error;

use crate::AppState;

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const MODEL: &str = "claude-sonnet-4-20250514";

const SYSTEM_PROMPT: &str = r#"
You tune settings for converting a 2D image into a 3D-printable relief.

Two modes exist:
- flatTop = true: the image is thresholded into shapes that are extruded with vertical walls.
  Good for logos, icons, text and line art with clear silhouettes.
- flatTop = false: brightness becomes height on a continuous surface.
  Good for photographs and shaded artwork.

Settings (all optional, omit what you would leave at the default):
- heightScale: f64, mm, default 5
- baseThickness: f64, mm, default 2
- resolution: integer 2..1024, default 256
- invert: bool, true when the subject is darker than its background
- maskThreshold: f64 in (0, 1), default 0.5
- contrast: f64 >= 1, default 1
- simplification: f64 >= 0, grid units, default 0.5
- enableBase: bool, default true
- flatTop: bool, default true

Respond with a single JSON object containing the settings you chose and a
"rationale" string explaining them in one or two sentences.

Example response:
{
    "flatTop": true,
    "invert": true,
    "maskThreshold": 0.45,
    "rationale": "Dark logo on a white background, so invert and extrude the silhouette."
}
"#;

#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("ANTHROPIC_API_KEY not set")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("advisory service answered {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed advisory response: {0}")]
    MalformedResponse(String),
}

#[derive(Deserialize)]
struct ModelAnswer {
    #[serde(flatten)]
    settings: SettingsSuggestion,
    #[serde(default)]
    rationale: String,
}

/// Media type for the image block; unknown formats are sent as PNG.
fn media_type(image: &[u8]) -> &'static str {
    match image::guess_format(image) {
        Ok(image::ImageFormat::Jpeg) => "image/jpeg",
        Ok(image::ImageFormat::Gif) => "image/gif",
        Ok(image::ImageFormat::WebP) => "image/webp",
        _ => "image/png",
    }
}

/// Pull the settings object out of the model's text, tolerating prose around it.
pub fn parse_suggestion(text: &str) -> Result<(SettingsSuggestion, String), AdvisorError> {
    let start = text.find('{');
    let end = text.rfind('}');
    let json = match (start, end) {
        (Some(s), Some(e)) if s < e => &text[s..=e],
        _ => return Err(AdvisorError::MalformedResponse("no JSON object in reply".into())),
    };
    let answer: ModelAnswer = serde_json::from_str(json)
        .map_err(|e| AdvisorError::MalformedResponse(e.to_string()))?;
    Ok((answer.settings, answer.rationale))
}

pub async fn request_suggestion(
    state: &AppState,
    image: &[u8],
) -> Result<(SettingsSuggestion, String), AdvisorError> {
    let api_key = state
        .ai_api_key
        .as_deref()
        .ok_or(AdvisorError::MissingApiKey)?;

    let response = state
        .http
        .post(API_URL)
        .header("x-api-key", api_key)
        .header("anthropic-version", "2023-06-01")
        .header("content-type", "application/json")
        .json(&serde_json::json!({
            "model": MODEL,
            "max_tokens": 1024,
            "system": SYSTEM_PROMPT,
            "messages": [
                {
                    "role": "user",
                    "content": [
                        {
                            "type": "image",
                            "source": {
                                "type": "base64",
                                "media_type": media_type(image),
                                "data": STANDARD.encode(image)
                            }
                        },
                        {
                            "type": "text",
                            "text": "Suggest relief settings for this image."
                        }
                    ]
                }
            ]
        }))
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(AdvisorError::Status(status));
    }

    let body: serde_json::Value = response.json().await?;
    let text = body["content"]
        .as_array()
        .and_then(|blocks| blocks.iter().find_map(|b| b["text"].as_str()))
        .ok_or_else(|| AdvisorError::MalformedResponse("no text block".into()))?;

    parse_suggestion(text)
}

/// Ask the advisor, substituting the defaults on any failure.
pub async fn suggest_or_fallback(state: &AppState, image: &[u8]) -> AdvisoryResponse {
    match request_suggestion(state, image).await {
        Ok((suggestion, rationale)) => {
            tracing::info!("suggest: model proposed {:?}", suggestion);
            AdvisoryResponse::from_suggestion(&suggestion, rationale)
        }
        Err(e) => {
            tracing::warn!("suggest: falling back to defaults: {e}");
            AdvisoryResponse::fallback(format!("Default settings used ({e})"))
        }
    }
}
