//! Narrative summaries of survey results.
//!
//! A summary is produced by an [`InsightProvider`]. The Ollama provider
//! asks a local model to summarise open feedback; the static provider
//! returns fixed summaries and is what every failure falls back to.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Number of feedback snippets included in a prompt.
const FEEDBACK_SAMPLE: usize = 5;

/// Which half of the survey a summary describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightContext {
    Sentiment,
    Capability,
}

impl fmt::Display for InsightContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsightContext::Sentiment => write!(f, "sentiment"),
            InsightContext::Capability => write!(f, "capability"),
        }
    }
}

/// Produces a narrative summary from open feedback.
#[async_trait::async_trait]
pub trait InsightProvider: Send + Sync {
    /// Short provider name for logs and report metadata.
    fn name(&self) -> &str;

    async fn summarize(&self, context: InsightContext, feedback: &[String]) -> Result<String>;
}

/// Fixed summaries used offline and as the fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticInsights;

impl StaticInsights {
    pub fn summary(context: InsightContext) -> &'static str {
        match context {
            InsightContext::Sentiment => {
                "Based on employee feedback, the primary concerns revolve around job security \
                 and lack of understanding about AI's role. There's a mix of excitement and \
                 apprehension, with technical teams more ready than operational staff. \
                 Leadership communication and education emerge as critical needs."
            }
            InsightContext::Capability => {
                "Organizations show strength in strategic vision but face challenges in data \
                 readiness and technical infrastructure. Skills gaps are evident, particularly \
                 in AI-specific competencies. Innovation culture is emerging but needs \
                 structured support. Ethics and governance frameworks require immediate \
                 attention."
            }
        }
    }
}

#[async_trait::async_trait]
impl InsightProvider for StaticInsights {
    fn name(&self) -> &str {
        "static"
    }

    async fn summarize(&self, context: InsightContext, _feedback: &[String]) -> Result<String> {
        Ok(Self::summary(context).to_string())
    }
}

/// Connection settings for the Ollama provider.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub ollama_url: String,
    pub model_name: String,
    pub temperature: f32,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Ollama chat API request.
#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

/// Ollama chat API response.
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: ChatMessage,
}

const SYSTEM_PROMPT: &str = "You are an organisational change analyst. \
You summarise employee survey feedback about AI adoption for leadership.

Write one paragraph of three to five sentences. Name the dominant concerns or strengths, \
point out differences between groups when the feedback shows them, and end with the most \
pressing need. Do not use bullet points or headings.";

/// Summaries from a local Ollama model.
pub struct OllamaInsights {
    config: OllamaConfig,
    http_client: reqwest::Client,
}

impl OllamaInsights {
    pub fn new(config: OllamaConfig) -> Result<Self> {
        info!(
            "Using Ollama model {} at {} for summaries",
            config.model_name, config.ollama_url
        );

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn build_prompt(context: InsightContext, feedback: &[String]) -> String {
        let topic = match context {
            InsightContext::Sentiment => "how employees feel about AI at work",
            InsightContext::Capability => "the organisation's AI capability",
        };

        let mut prompt = format!("Summarise the following survey feedback about {}.\n\n", topic);
        let sample: Vec<&str> = feedback
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .take(FEEDBACK_SAMPLE)
            .collect();

        if sample.is_empty() {
            prompt.push_str(
                "No free-text feedback was given; \
                 describe what is typical for this kind of survey.\n",
            );
        } else {
            for line in sample {
                prompt.push_str("- ");
                prompt.push_str(line);
                prompt.push('\n');
            }
        }
        prompt
    }
}

#[async_trait::async_trait]
impl InsightProvider for OllamaInsights {
    fn name(&self) -> &str {
        &self.config.model_name
    }

    async fn summarize(&self, context: InsightContext, feedback: &[String]) -> Result<String> {
        let url = format!("{}/api/chat", self.config.ollama_url.trim_end_matches('/'));

        let request = OllamaChatRequest {
            model: self.config.model_name.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Self::build_prompt(context, feedback),
                },
            ],
            stream: false,
            options: OllamaOptions {
                temperature: self.config.temperature,
            },
        };

        debug!("Requesting {} summary from {}", context, url);

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    anyhow::anyhow!("Request timed out after {}s", self.config.timeout_seconds)
                } else if e.is_connect() {
                    anyhow::anyhow!("Cannot connect to Ollama at {}", self.config.ollama_url)
                } else {
                    anyhow::anyhow!("Failed to send request: {}", e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Ollama API error {}: {}", status, body));
        }

        let chat_response: OllamaChatResponse = response
            .json()
            .await
            .context("Failed to parse Ollama response")?;

        let content = chat_response.message.content.trim().to_string();
        if content.is_empty() {
            anyhow::bail!("Ollama returned an empty summary");
        }
        Ok(content)
    }
}

/// Summary text and the provider that actually produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub context: InsightContext,
    pub provider: String,
    pub summary: String,
}

/// Ask `provider` for a summary, substituting the static one on failure.
pub async fn summarize_with_fallback(
    provider: &dyn InsightProvider,
    context: InsightContext,
    feedback: &[String],
) -> Insight {
    match provider.summarize(context, feedback).await {
        Ok(summary) => Insight {
            context,
            provider: provider.name().to_string(),
            summary,
        },
        Err(e) => {
            warn!(
                "{} summary from {} failed, using static summary: {:#}",
                context,
                provider.name(),
                e
            );
            Insight {
                context,
                provider: StaticInsights.name().to_string(),
                summary: StaticInsights::summary(context).to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unreachable;

    #[async_trait::async_trait]
    impl InsightProvider for Unreachable {
        fn name(&self) -> &str {
            "unreachable"
        }

        async fn summarize(&self, _: InsightContext, _: &[String]) -> Result<String> {
            anyhow::bail!("connection refused")
        }
    }

    struct Echo;

    #[async_trait::async_trait]
    impl InsightProvider for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        async fn summarize(&self, context: InsightContext, feedback: &[String]) -> Result<String> {
            Ok(format!("{}: {}", context, feedback.join(" ")))
        }
    }

    #[test]
    fn test_fallback_on_provider_error() {
        let insight = tokio_test::block_on(summarize_with_fallback(
            &Unreachable,
            InsightContext::Capability,
            &[],
        ));
        assert_eq!(insight.provider, "static");
        assert_eq!(
            insight.summary,
            StaticInsights::summary(InsightContext::Capability)
        );
    }

    #[test]
    fn test_successful_provider_is_used() {
        let feedback = vec!["more training".to_string()];
        let insight = tokio_test::block_on(summarize_with_fallback(
            &Echo,
            InsightContext::Sentiment,
            &feedback,
        ));
        assert_eq!(insight.provider, "echo");
        assert_eq!(insight.summary, "sentiment: more training");
    }

    #[test]
    fn test_static_summaries_differ_by_context() {
        let sentiment = tokio_test::block_on(
            StaticInsights.summarize(InsightContext::Sentiment, &[]),
        )
        .unwrap();
        assert!(sentiment.starts_with("Based on employee feedback"));
        assert!(StaticInsights::summary(InsightContext::Capability).contains("strategic vision"));
    }

    #[test]
    fn test_prompt_samples_feedback() {
        let feedback: Vec<String> = (1..=8).map(|i| format!("note {}", i)).collect();
        let prompt = OllamaInsights::build_prompt(InsightContext::Sentiment, &feedback);
        assert!(prompt.contains("- note 5"));
        assert!(!prompt.contains("note 6"));

        let empty = OllamaInsights::build_prompt(InsightContext::Capability, &[" ".to_string()]);
        assert!(empty.contains("No free-text feedback"));
    }

    #[test]
    fn test_ollama_provider_named_after_model() {
        let provider = OllamaInsights::new(OllamaConfig {
            ollama_url: "http://localhost:11434".to_string(),
            model_name: "mistral:7b".to_string(),
            temperature: 0.3,
            timeout_seconds: 5,
        })
        .unwrap();
        assert_eq!(provider.name(), "mistral:7b");
    }
}
