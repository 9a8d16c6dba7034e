//! Request bodies and response classification for the text service.
//!
//! Endpoint contract: `POST` a JSON body, expect `{translatedText}` or
//! `{correctedText}` on 200, `{retryAfter}` on 429, and an opaque error
//! string on anything else.

use serde::Deserialize;
use serde_json::json;

use jamo_core::cache::cache_key;

use crate::error::ServiceError;
use crate::transport::TransportResponse;

/// Used when a 429 carries no usable `retryAfter`.
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Which service a pipeline talks to, with its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationKind {
    Translate {
        source_lang: String,
        target_lang: String,
    },
    Correct {
        language: String,
        tone: String,
    },
}

impl OperationKind {
    pub fn translate(source_lang: impl Into<String>, target_lang: impl Into<String>) -> Self {
        Self::Translate {
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
        }
    }

    pub fn correct(language: impl Into<String>, tone: impl Into<String>) -> Self {
        Self::Correct {
            language: language.into(),
            tone: tone.into(),
        }
    }

    /// Cache-key prefix; keeps the two services from colliding.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Translate { .. } => "translate",
            Self::Correct { .. } => "correct",
        }
    }

    pub fn cache_key(&self, text: &str) -> String {
        match self {
            Self::Translate {
                source_lang,
                target_lang,
            } => cache_key(self.name(), source_lang, target_lang, text),
            Self::Correct { language, tone } => cache_key(self.name(), language, tone, text),
        }
    }

    fn response_field(&self) -> &'static str {
        match self {
            Self::Translate { .. } => "translatedText",
            Self::Correct { .. } => "correctedText",
        }
    }
}

/// Who is asking: entitlement tier and a stable device identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub tier: String,
    pub device_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceRequest {
    pub operation: OperationKind,
    /// Normalized (trimmed) text the request was built from.
    pub text: String,
    pub body: serde_json::Value,
}

pub fn build_request(
    operation: &OperationKind,
    text: &str,
    identity: &ClientIdentity,
) -> ServiceRequest {
    let body = match operation {
        OperationKind::Translate {
            source_lang,
            target_lang,
        } => json!({
            "text": text,
            "sourceLang": source_lang,
            "targetLang": target_lang,
            "tier": identity.tier,
            "deviceId": identity.device_id,
        }),
        OperationKind::Correct { language, tone } => json!({
            "text": text,
            "language": language,
            "tone": tone,
            "tier": identity.tier,
            "deviceId": identity.device_id,
        }),
    };
    ServiceRequest {
        operation: operation.clone(),
        text: text.to_string(),
        body,
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuccessBody {
    translated_text: Option<String>,
    corrected_text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RateLimitBody {
    retry_after: Option<u64>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Map an HTTP response onto the service outcome for `operation`.
pub fn classify_response(
    operation: &OperationKind,
    response: &TransportResponse,
) -> Result<String, ServiceError> {
    match response.status {
        200 => {
            let body: SuccessBody = serde_json::from_str(&response.body)
                .map_err(|e| ServiceError::InvalidResponse(e.to_string()))?;
            let text = match operation {
                OperationKind::Translate { .. } => body.translated_text,
                OperationKind::Correct { .. } => body.corrected_text,
            };
            text.ok_or_else(|| {
                ServiceError::InvalidResponse(format!("missing {}", operation.response_field()))
            })
        }
        429 => {
            let retry_after_secs = serde_json::from_str::<RateLimitBody>(&response.body)
                .ok()
                .and_then(|b| b.retry_after)
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            Err(ServiceError::RateLimited { retry_after_secs })
        }
        status => {
            let body = serde_json::from_str::<ErrorBody>(&response.body)
                .ok()
                .and_then(|b| b.error)
                .unwrap_or_else(|| response.body.clone());
            Err(ServiceError::Server { status, body })
        }
    }
}
