pub mod gemini;
pub mod prompts;

use futures_util::future::BoxFuture;
use tracing::{debug, warn};

use hush_types::api::{SUGGESTION_SEPARATOR, Verdict};

pub use gemini::GeminiClient;

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("request to model failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("model API returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("model returned no text")]
    EmptyResponse,

    #[error("model returned {0:?}, expected \"Yes\" or \"No\"")]
    InvalidVerdict(String),
}

/// A text-in, text-out generative model.
pub trait ContentModel: Send + Sync {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, AiError>>;
}

/// Ask the model whether `content` is toxic. Only the exact tokens "Yes" and
/// "No" (after trimming) are accepted.
pub async fn check_toxicity(model: &dyn ContentModel, content: &str) -> Result<Verdict, AiError> {
    let prompt = prompts::moderation(content);
    let reply = model.generate(&prompt).await?;
    let token = reply.trim();

    Verdict::from_token(token).ok_or_else(|| AiError::InvalidVerdict(token.to_string()))
}

/// Ask the model for three open-ended questions joined by `||`. The count is
/// not enforced.
pub async fn suggest_messages(model: &dyn ContentModel) -> Result<String, AiError> {
    let reply = model.generate(prompts::SUGGESTIONS).await?;
    let cleaned = clean_suggestions(&reply);

    let count = cleaned.split(SUGGESTION_SEPARATOR).count();
    if count != 3 {
        warn!("Model returned {} suggestions instead of 3", count);
    }
    debug!("Suggestions: {}", cleaned);

    Ok(cleaned)
}

/// Strip line breaks and double quotes, then trim.
pub fn clean_suggestions(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, '\n' | '\r' | '"'))
        .collect::<String>()
        .trim()
        .to_string()
}
