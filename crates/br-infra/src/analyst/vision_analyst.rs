use std::path::Path;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use br_core::analysis::{AnalystReport, AnalystType, ScoreDetail};
use br_core::ports::{AnalystError, AnalystPort};
use br_core::storage::ObjectKey;

const SYSTEM_PROMPT: &str = r#"You are a friendly portrait aesthetics reviewer.
Look at the photo and rate the person's overall attractiveness and the photo's appeal.
Be positive and encouraging. Reply with a single JSON object and nothing else:
{
  "score": <integer 0-100>,
  "description": "<two or three sentences>",
  "tags": ["<short adjective>", ...],
  "details": [
    {"label": "<aspect, e.g. Skin>", "score": <integer 0-100>, "desc": "<one sentence>"}
  ]
}"#;

const DEFAULT_MIME: &str = "image/png";
const MAX_TAGS: usize = 6;
const TRIMMED_TAG_RANGE: std::ops::RangeInclusive<usize> = 3..=6;

/// Connection settings of an OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone)]
pub struct VisionAnalystConfig {
    /// e.g. `https://api.openai.com/v1`; `/chat/completions` is appended
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    pub timeout: Duration,
}

/// Scores images with a multimodal LLM.
pub struct VisionAnalyst {
    client: reqwest::Client,
    config: VisionAnalystConfig,
    rng: Mutex<Box<dyn RngCore + Send>>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: MessageContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Shape of the JSON object the model is asked to produce.
#[derive(Debug, Deserialize)]
struct VisionReport {
    score: i32,
    #[serde(default)]
    description: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    details: Vec<VisionDetail>,
}

#[derive(Debug, Deserialize)]
struct VisionDetail {
    label: String,
    score: i32,
    #[serde(default)]
    desc: String,
}

fn json_object_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("static regex is valid"))
}

/// Mime type for a file name, by extension. Unknown extensions map to `image/png`.
pub fn mime_for(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png" | "apng") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp" | "dib") => "image/bmp",
        Some("tif" | "tiff") => "image/tiff",
        Some("ico") => "image/x-icon",
        Some("icns") => "image/icns",
        Some("sgi") => "image/sgi",
        Some("j2c" | "j2k" | "jp2" | "jpc" | "jpf" | "jpx") => "image/jp2",
        _ => DEFAULT_MIME,
    }
}

fn data_url(file_name: &str, image: &[u8]) -> String {
    format!("data:{};base64,{}", mime_for(file_name), BASE64.encode(image))
}

/// Extract the report from the first choice's text.
fn parse_report(content: &str) -> Result<AnalystReport, AnalystError> {
    let json = json_object_pattern()
        .find(content)
        .ok_or_else(|| AnalystError::InvalidResponse("no JSON object in reply".to_string()))?;

    let report: VisionReport = serde_json::from_str(json.as_str())
        .map_err(|e| AnalystError::InvalidResponse(format!("unparseable report: {}", e)))?;

    Ok(AnalystReport {
        score: report.score,
        description: report.description,
        tags: report.tags,
        details: report
            .details
            .into_iter()
            .map(|d| ScoreDetail {
                label: d.label,
                score: d.score,
                note: d.desc,
            })
            .collect(),
    })
}

/// Long tag lists are shuffled and cut to 3..=6 entries; short ones pass through.
fn trim_tags<R: Rng + ?Sized>(mut tags: Vec<String>, rng: &mut R) -> Vec<String> {
    if tags.len() <= MAX_TAGS {
        return tags;
    }
    tags.shuffle(rng);
    tags.truncate(rng.gen_range(TRIMMED_TAG_RANGE));
    tags
}

impl VisionAnalyst {
    pub const NAME: &'static str = "vision";

    pub fn new(
        config: VisionAnalystConfig,
        rng: impl RngCore + Send + 'static,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("build HTTP client failed: {}", e))?;

        Ok(Self {
            client,
            config,
            rng: Mutex::new(Box::new(rng)),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    async fn complete(&self, image_url: String) -> Result<String, AnalystError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: MessageContent::Text(SYSTEM_PROMPT),
                },
                ChatMessage {
                    role: "user",
                    content: MessageContent::Parts(vec![ContentPart::ImageUrl {
                        image_url: ImageUrl { url: image_url },
                    }]),
                },
            ],
            temperature: 1.0,
        };

        let mut request = self.client.post(self.endpoint()).json(&body);
        if !self.config.api_key.is_empty() {
            request = request.bearer_auth(&self.config.api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AnalystError::Backend(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %detail, "vision endpoint returned an error");
            return Err(AnalystError::Backend(format!("endpoint returned {}", status)));
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| AnalystError::InvalidResponse(format!("undecodable reply: {}", e)))?;

        reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AnalystError::InvalidResponse("empty choices".to_string()))
    }
}

#[async_trait]
impl AnalystPort for VisionAnalyst {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn analyst_type(&self) -> AnalystType {
        AnalystType::Ai
    }

    async fn analyze(&self, image: &[u8], image_ref: &ObjectKey) -> Result<AnalystReport, AnalystError> {
        if image.is_empty() {
            return Err(AnalystError::InvalidImage("empty image".to_string()));
        }

        let content = self.complete(data_url(image_ref.as_str(), image)).await?;
        debug!(chars = content.len(), "vision reply received");

        let mut report = parse_report(&content)?;
        let mut rng = self.rng.lock().unwrap_or_else(|p| p.into_inner());
        report.tags = trim_tags(std::mem::take(&mut report.tags), &mut *rng);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use mockito::{Matcher, Server};

    #[test]
    fn mime_follows_extension_case_insensitively() {
        assert_eq!(mime_for("a.JPG"), "image/jpeg");
        assert_eq!(mime_for("analysis/1-x.webp"), "image/webp");
        assert_eq!(mime_for("photo.jpx"), "image/jp2");
        assert_eq!(mime_for("noext"), "image/png");
        assert_eq!(mime_for("weird.xyz"), "image/png");
    }

    #[test]
    fn data_url_embeds_base64_payload() {
        assert_eq!(data_url("a.gif", b"hi"), "data:image/gif;base64,aGk=");
    }

    #[test]
    fn report_is_extracted_from_surrounding_prose() {
        let content = "Sure! Here you go:\n```json\n{\"score\": 93, \"description\": \"lovely\",\n\"tags\": [\"warm\"], \"details\": [{\"label\": \"Skin\", \"score\": 90, \"desc\": \"clear\"}]}\n```";

        let report = parse_report(content).unwrap();

        assert_eq!(report.score, 93);
        assert_eq!(report.description, "lovely");
        assert_eq!(report.tags, vec!["warm"]);
        assert_eq!(report.details[0].note, "clear");
    }

    #[test]
    fn reply_without_json_is_invalid() {
        assert!(matches!(
            parse_report("I cannot rate this image."),
            Err(AnalystError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_report("{not json}"),
            Err(AnalystError::InvalidResponse(_))
        ));
    }

    #[test]
    fn long_tag_lists_are_trimmed() {
        let mut rng = StdRng::seed_from_u64(3);
        let tags: Vec<String> = (0..10).map(|i| format!("t{}", i)).collect();

        for _ in 0..50 {
            let trimmed = trim_tags(tags.clone(), &mut rng);
            assert!(TRIMMED_TAG_RANGE.contains(&trimmed.len()));
            assert!(trimmed.iter().all(|t| tags.contains(t)));
        }
    }

    #[test]
    fn short_tag_lists_pass_through() {
        let mut rng = StdRng::seed_from_u64(3);
        let tags = vec!["a".to_string(), "b".to_string()];
        assert_eq!(trim_tags(tags.clone(), &mut rng), tags);
    }

    fn analyst(base_url: String) -> VisionAnalyst {
        VisionAnalyst::new(
            VisionAnalystConfig {
                base_url,
                model: "vision-test".to_string(),
                api_key: "sk-test".to_string(),
                timeout: Duration::from_secs(5),
            },
            StdRng::seed_from_u64(1),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn posts_image_and_parses_first_choice() {
        let mut server = Server::new_async().await;
        let content = r#"{"score": 96, "description": "great", "tags": ["a","b","c"], "details": []}"#;
        let body = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        })
        .to_string();
        let completion = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex("data:image/jpeg;base64,aW1n".to_string()),
                Matcher::Regex(r#""model":"vision-test""#.to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        let report = analyst(server.url())
            .analyze(b"img", &ObjectKey::from("analysis/1-a.jpg"))
            .await
            .unwrap();

        assert_eq!(report.score, 96);
        assert_eq!(report.tags.len(), 3);
        completion.assert_async().await;
    }

    #[tokio::test]
    async fn http_error_is_backend_failure() {
        let mut server = Server::new_async().await;
        let _completion = server
            .mock("POST", "/chat/completions")
            .with_status(502)
            .with_body("{}")
            .create_async()
            .await;

        let err = analyst(server.url())
            .analyze(b"img", &ObjectKey::from("analysis/1-a.png"))
            .await
            .unwrap_err();

        assert!(matches!(err, AnalystError::Backend(_)));
    }

    #[tokio::test]
    async fn empty_choices_is_invalid_response() {
        let mut server = Server::new_async().await;
        let _completion = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices": []}"#)
            .create_async()
            .await;

        let err = analyst(server.url())
            .analyze(b"img", &ObjectKey::from("analysis/1-a.png"))
            .await
            .unwrap_err();

        assert!(matches!(err, AnalystError::InvalidResponse(_)));
    }
}
