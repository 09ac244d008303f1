//! Speech to Text (v1).

use crate::error::WatsonError;
use crate::http::media_type::APPLICATION_OCTET_STREAM;
use crate::http::request::{RequestBuilder, resolve_request_url};
use crate::http::response::{JsonConverter, JsonListConverter};
use crate::service::{ServiceBuilder, ServiceCall, WatsonService};
use crate::utils::mime::audio_content_type;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

pub const SERVICE_NAME: &str = "speech_to_text";
pub const DEFAULT_ENDPOINT: &str = "https://stream.watsonplatform.net/speech-to-text/api";
const SERVICE_VERSION: &str = "v1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechModel {
    pub name: String,
    pub language: Option<String>,
    pub rate: Option<u32>,
    pub url: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechRecognitionAlternative {
    pub transcript: String,
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechRecognitionResult {
    #[serde(rename = "final", default)]
    pub is_final: bool,
    #[serde(default)]
    pub alternatives: Vec<SpeechRecognitionAlternative>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpeechRecognitionResults {
    #[serde(default)]
    pub results: Vec<SpeechRecognitionResult>,
    pub result_index: Option<i64>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl SpeechRecognitionResults {
    /// Best transcript of every final result, joined with spaces.
    pub fn transcript(&self) -> String {
        self.results
            .iter()
            .filter(|r| r.is_final)
            .filter_map(|r| r.alternatives.first())
            .map(|a| a.transcript.trim())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Query options of a `recognize` request.
#[derive(Debug, Clone, Default)]
pub struct RecognizeOptions {
    /// Explicit audio type. Detected from the audio bytes when unset.
    pub content_type: Option<String>,
    pub model: Option<String>,
    pub customization_id: Option<String>,
    pub keywords: Vec<String>,
    pub keywords_threshold: Option<f32>,
    pub max_alternatives: Option<u32>,
    pub word_confidence: Option<bool>,
    pub timestamps: Option<bool>,
    pub profanity_filter: Option<bool>,
    pub smart_formatting: Option<bool>,
    pub speaker_labels: Option<bool>,
    pub inactivity_timeout: Option<i64>,
}

/// Client for the Speech to Text service.
#[derive(Debug, Clone)]
pub struct SpeechToText {
    service: WatsonService,
}

impl SpeechToText {
    pub fn builder() -> ServiceBuilder {
        ServiceBuilder::new(SERVICE_NAME, DEFAULT_ENDPOINT)
    }

    pub fn new(service: WatsonService) -> Self {
        Self { service }
    }

    pub fn from_builder(builder: ServiceBuilder) -> Result<Self, WatsonError> {
        Ok(Self::new(builder.build()?))
    }

    pub fn service(&self) -> &WatsonService {
        &self.service
    }

    pub fn list_models(&self) -> ServiceCall<JsonListConverter<SpeechModel>> {
        let request = resolve_request_url(self.service.endpoint(), "/v1/models", &[])
            .map(RequestBuilder::get);
        self.service.operation_call(
            SERVICE_VERSION,
            "list_models",
            request,
            JsonListConverter::new("models"),
        )
    }

    pub fn get_model(&self, model_id: &str) -> ServiceCall<JsonConverter<SpeechModel>> {
        let request = resolve_request_url(
            self.service.endpoint(),
            "/v1/models/{model_id}",
            &[("model_id", model_id)],
        )
        .map(RequestBuilder::get);
        self.service
            .operation_call(SERVICE_VERSION, "get_model", request, JsonConverter::new())
    }

    /// Transcribe a complete audio file in one request.
    pub fn recognize(
        &self,
        audio: impl Into<Bytes>,
        options: RecognizeOptions,
    ) -> ServiceCall<JsonConverter<SpeechRecognitionResults>> {
        let audio = audio.into();
        let content_type = options
            .content_type
            .clone()
            .or_else(|| audio_content_type(&audio).map(str::to_string))
            .unwrap_or_else(|| APPLICATION_OCTET_STREAM.to_string());
        let request =
            resolve_request_url(self.service.endpoint(), "/v1/recognize", &[]).map(|url| {
                let mut request = RequestBuilder::post(url)
                    .query_opt("model", options.model)
                    .query_opt("customization_id", options.customization_id)
                    .query_opt("keywords_threshold", options.keywords_threshold)
                    .query_opt("max_alternatives", options.max_alternatives)
                    .query_opt("word_confidence", options.word_confidence)
                    .query_opt("timestamps", options.timestamps)
                    .query_opt("profanity_filter", options.profanity_filter)
                    .query_opt("smart_formatting", options.smart_formatting)
                    .query_opt("speaker_labels", options.speaker_labels)
                    .query_opt("inactivity_timeout", options.inactivity_timeout);
                if !options.keywords.is_empty() {
                    request = request.query_list("keywords", &options.keywords);
                }
                request.body_bytes(audio, &content_type)
            });
        self.service
            .operation_call(SERVICE_VERSION, "recognize", request, JsonConverter::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_joins_final_results() {
        let results: SpeechRecognitionResults = serde_json::from_value(serde_json::json!({
            "result_index": 0,
            "results": [
                {"final": true, "alternatives": [{"transcript": "hello ", "confidence": 0.9}]},
                {"final": false, "alternatives": [{"transcript": "ignored"}]},
                {"final": true, "alternatives": [{"transcript": "world"}]}
            ]
        }))
        .unwrap();
        assert_eq!(results.transcript(), "hello world");
    }

    #[test]
    fn recognize_detects_ogg_opus_content_type() {
        let stt = SpeechToText::from_builder(SpeechToText::builder().skip_authentication(true))
            .unwrap();
        let mut audio = b"OggS\x00\x02".to_vec();
        audio.extend_from_slice(&[0u8; 22]);
        audio.extend_from_slice(b"\x01\x13OpusHead");
        audio.resize(64, 0);
        let call = stt.recognize(
            audio,
            RecognizeOptions {
                model: Some("en-US_BroadbandModel".into()),
                ..Default::default()
            },
        );
        let request = call.request().unwrap();
        assert_eq!(request.body.content_type(), Some("audio/ogg;codecs=opus"));
        assert!(request.url.ends_with("/v1/recognize?model=en-US_BroadbandModel"));
        assert!(request.headers.contains_key("x-ibmcloud-sdk-analytics"));
    }
}
