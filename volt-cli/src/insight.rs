//! Gemini insight client: natural-language usage analysis and best-effort
//! receipt field extraction. Thin pass-throughs with a fixed prompt each;
//! no retry or backoff — a failed analysis is re-triggered by the user.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use volt_core::BillRecord;

/// Returned verbatim for an empty record list; no request is made.
pub const EMPTY_PLACEHOLDER: &str = "Please add some bill records to generate an AI analysis.";

/// Most recent records included in an analysis prompt. Older records are
/// dropped before sending to bound prompt size.
pub const ANALYSIS_WINDOW: usize = 12;

const EXTRACT_INSTRUCTION: &str = "Read this electricity receipt and return a JSON object with \
    two optional fields: \"amount\" (number, the total amount paid) and \"date\" (string, the \
    purchase date as YYYY-MM-DD). Omit a field you cannot read.";

#[derive(Debug, Error)]
pub enum InsightError {
    #[error("analysis request failed: {0}")]
    Transport(String),
    #[error("unexpected response from the model: {0}")]
    BadResponse(String),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    fn text(s: impl Into<String>) -> Self {
        Self {
            text: Some(s.into()),
            inline_data: None,
        }
    }

    fn image(mime_type: &str, data_b64: &str) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.to_string(),
                data: data_b64.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateResponse {
    pub candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    pub parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    pub text: Option<String>,
}

/// Best-effort fields read off a receipt photo. Advisory only: the form
/// stays user-editable whatever comes back.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReceiptFields {
    pub amount: Option<f64>,
    /// ISO date (YYYY-MM-DD) as printed on the receipt
    pub date: Option<String>,
}

/// Seam between the client and the wire, so tests can count calls.
pub trait GenerateTransport {
    async fn generate(
        &self,
        model: &str,
        req: &GenerateRequest,
    ) -> Result<GenerateResponse, InsightError>;
}

pub struct HttpGemini {
    client: reqwest::Client,
    api_key: String,
}

impl HttpGemini {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
        }
    }
}

impl GenerateTransport for HttpGemini {
    async fn generate(
        &self,
        model: &str,
        req: &GenerateRequest,
    ) -> Result<GenerateResponse, InsightError> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{model}:generateContent"
        );

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(req)
            .send()
            .await
            .map_err(|e| InsightError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            return Err(InsightError::Transport(format!("{status} {txt}")));
        }

        resp.json()
            .await
            .map_err(|e| InsightError::BadResponse(e.to_string()))
    }
}

pub struct InsightClient<T> {
    transport: T,
    model: String,
}

impl<T: GenerateTransport> InsightClient<T> {
    pub fn new(transport: T, model: impl Into<String>) -> Self {
        Self {
            transport,
            model: model.into(),
        }
    }

    /// Analyze the most recent records and return a Markdown report.
    ///
    /// Expects the list newest-first (store order); only the first
    /// [`ANALYSIS_WINDOW`] records are sent. An empty list short-circuits
    /// to [`EMPTY_PLACEHOLDER`] without touching the transport.
    pub async fn analyze_usage(&self, records: &[BillRecord]) -> Result<String, InsightError> {
        if records.is_empty() {
            return Ok(EMPTY_PLACEHOLDER.to_string());
        }

        // Receipt photos are dropped from the slice: the whole point of
        // the window is a bounded textual prompt.
        let window: Vec<BillRecord> = records
            .iter()
            .take(ANALYSIS_WINDOW)
            .cloned()
            .map(|mut r| {
                r.receipt_image = None;
                r
            })
            .collect();
        let bills_json = serde_json::to_string(&window)
            .map_err(|e| InsightError::BadResponse(e.to_string()))?;

        let prompt = format!(
            "I have a dataset of electricity bill purchases.\n\
             Here is the data (last {} records):\n{}\n\n\
             Please analyze this data and provide a concise report in Markdown format.\n\n\
             1. **Spending Trend**: Are costs going up or down?\n\
             2. **Consumption Efficiency**: Calculate the average days a purchase lasts \
             (Date Finished - Date Inserted).\n\
             3. **Anomalies**: Identify any purchase that didn't last as long as usual or cost \
             significantly more.\n\
             4. **Recommendations**: Give 3 quick tips to reduce electricity consumption based \
             on general best practices.\n\n\
             Keep the tone professional yet helpful. Use bullet points and bold text for emphasis.",
            window.len(),
            bills_json
        );

        let req = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part::text(prompt)],
            }],
            generation_config: None,
        };

        let resp = self.transport.generate(&self.model, &req).await?;
        match first_text(&resp) {
            Some(text) => Ok(text),
            None => Err(InsightError::BadResponse(
                "no text in model response".to_string(),
            )),
        }
    }

    /// Extract amount/date from a receipt photo. Every failure degrades to
    /// empty fields; this path never blocks manual form completion.
    pub async fn extract_from_image(&self, mime_type: &str, data_b64: &str) -> ReceiptFields {
        let req = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::image(mime_type, data_b64),
                    Part::text(EXTRACT_INSTRUCTION),
                ],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json".to_string(),
            }),
        };

        match self.transport.generate(&self.model, &req).await {
            Ok(resp) => first_text(&resp)
                .and_then(|text| serde_json::from_str(&text).ok())
                .unwrap_or_default(),
            Err(e) => {
                log::warn!("receipt extraction failed: {e}");
                ReceiptFields::default()
            }
        }
    }
}

/// Joined text parts of the first candidate, trimmed; `None` when empty.
fn first_text(resp: &GenerateResponse) -> Option<String> {
    let candidate = resp.candidates.as_ref()?.first()?;
    let parts = candidate.content.as_ref()?.parts.as_ref()?;

    let mut s = String::new();
    for p in parts {
        if let Some(t) = &p.text {
            s.push_str(t);
        }
    }
    let s = s.trim().to_string();
    if s.is_empty() { None } else { Some(s) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn record(id: &str, inserted: &str, amount: f64) -> BillRecord {
        BillRecord::new(id, date(inserted), date(inserted), amount)
    }

    fn text_response(text: &str) -> GenerateResponse {
        GenerateResponse {
            candidates: Some(vec![Candidate {
                content: Some(CandidateContent {
                    parts: Some(vec![CandidatePart {
                        text: Some(text.to_string()),
                    }]),
                }),
            }]),
        }
    }

    /// Counts calls and records each prompt so tests can assert on both.
    struct MockTransport {
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
        reply: String,
        fail: bool,
    }

    impl MockTransport {
        fn replying(reply: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
                reply: reply.to_string(),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
                reply: String::new(),
                fail: true,
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl GenerateTransport for &MockTransport {
        async fn generate(
            &self,
            _model: &str,
            req: &GenerateRequest,
        ) -> Result<GenerateResponse, InsightError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let prompt = req
                .contents
                .iter()
                .flat_map(|c| c.parts.iter())
                .filter_map(|p| p.text.clone())
                .collect::<Vec<_>>()
                .join("\n");
            self.prompts.lock().unwrap().push(prompt);
            if self.fail {
                return Err(InsightError::Transport("connection refused".to_string()));
            }
            Ok(text_response(&self.reply))
        }
    }

    #[tokio::test]
    async fn test_empty_list_returns_placeholder_without_network() {
        let transport = MockTransport::replying("unused");
        let client = InsightClient::new(&transport, "gemini-2.5-flash");

        let report = client.analyze_usage(&[]).await.unwrap();
        assert_eq!(report, EMPTY_PLACEHOLDER);
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_analysis_truncates_to_most_recent_window() {
        let transport = MockTransport::replying("## Report");
        let client = InsightClient::new(&transport, "gemini-2.5-flash");

        // Newest-first, 15 records: only r00..r11 should be sent
        let records: Vec<BillRecord> = (0..15)
            .map(|i| record(&format!("r{i:02}"), "2024-01-01", 10.0))
            .collect();

        let report = client.analyze_usage(&records).await.unwrap();
        assert_eq!(report, "## Report");
        assert_eq!(transport.call_count(), 1);

        let prompts = transport.prompts.lock().unwrap();
        assert!(prompts[0].contains("r00"));
        assert!(prompts[0].contains("r11"));
        assert!(!prompts[0].contains("r12"));
        assert!(!prompts[0].contains("r14"));
    }

    #[tokio::test]
    async fn test_analysis_drops_receipt_blobs_from_prompt() {
        let transport = MockTransport::replying("ok");
        let client = InsightClient::new(&transport, "gemini-2.5-flash");

        let mut r = record("r1", "2024-01-01", 10.0);
        r.receipt_image = Some("QUJDREVGR0hJSg==".to_string());

        client.analyze_usage(&[r]).await.unwrap();
        let prompts = transport.prompts.lock().unwrap();
        assert!(!prompts[0].contains("QUJDREVGR0hJSg=="));
    }

    #[tokio::test]
    async fn test_analysis_surfaces_transport_failure() {
        let transport = MockTransport::failing();
        let client = InsightClient::new(&transport, "gemini-2.5-flash");

        let err = client
            .analyze_usage(&[record("r1", "2024-01-01", 10.0)])
            .await
            .unwrap_err();
        assert!(matches!(err, InsightError::Transport(_)));
    }

    #[tokio::test]
    async fn test_extraction_parses_well_formed_reply() {
        let transport = MockTransport::replying(r#"{"amount": 120.5, "date": "2024-03-01"}"#);
        let client = InsightClient::new(&transport, "gemini-2.5-flash");

        let fields = client.extract_from_image("image/jpeg", "aGk=").await;
        assert_eq!(fields.amount, Some(120.5));
        assert_eq!(fields.date.as_deref(), Some("2024-03-01"));
    }

    #[tokio::test]
    async fn test_extraction_degrades_silently() {
        // Malformed JSON
        let transport = MockTransport::replying("not json at all");
        let client = InsightClient::new(&transport, "gemini-2.5-flash");
        assert_eq!(
            client.extract_from_image("image/jpeg", "aGk=").await,
            ReceiptFields::default()
        );

        // Transport failure
        let transport = MockTransport::failing();
        let client = InsightClient::new(&transport, "gemini-2.5-flash");
        assert_eq!(
            client.extract_from_image("image/jpeg", "aGk=").await,
            ReceiptFields::default()
        );
    }
}
