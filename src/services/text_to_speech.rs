//! Text to Speech (v1).

use crate::error::WatsonError;
use crate::http::media_type::AUDIO_OGG_OPUS;
use crate::http::request::{RequestBuilder, resolve_request_url};
use crate::http::response::{BytesConverter, JsonConverter, JsonListConverter, StreamConverter};
use crate::service::{ServiceBuilder, ServiceCall, WatsonService};
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};

pub const SERVICE_NAME: &str = "text_to_speech";
pub const DEFAULT_ENDPOINT: &str = "https://stream.watsonplatform.net/text-to-speech/api";
const SERVICE_VERSION: &str = "v1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voice {
    pub name: String,
    pub language: Option<String>,
    pub gender: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub customizable: bool,
}

/// Input of a `synthesize` request.
#[derive(Debug, Clone)]
pub struct SynthesizeOptions {
    pub text: String,
    pub voice: Option<String>,
    /// Requested audio format, `audio/ogg;codecs=opus` when unset.
    pub accept: Option<String>,
    pub customization_id: Option<String>,
}

impl SynthesizeOptions {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice: None,
            accept: None,
            customization_id: None,
        }
    }

    pub fn voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    pub fn customization_id(mut self, id: impl Into<String>) -> Self {
        self.customization_id = Some(id.into());
        self
    }
}

/// Client for the Text to Speech service.
#[derive(Debug, Clone)]
pub struct TextToSpeech {
    service: WatsonService,
}

impl TextToSpeech {
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

    pub fn list_voices(&self) -> ServiceCall<JsonListConverter<Voice>> {
        let request = resolve_request_url(self.service.endpoint(), "/v1/voices", &[])
            .map(RequestBuilder::get);
        self.service.operation_call(
            SERVICE_VERSION,
            "list_voices",
            request,
            JsonListConverter::new("voices"),
        )
    }

    pub fn get_voice(&self, voice: &str) -> ServiceCall<JsonConverter<Voice>> {
        let request = resolve_request_url(
            self.service.endpoint(),
            "/v1/voices/{voice}",
            &[("voice", voice)],
        )
        .map(RequestBuilder::get);
        self.service
            .operation_call(SERVICE_VERSION, "get_voice", request, JsonConverter::new())
    }

    fn synthesize_request(
        &self,
        options: SynthesizeOptions,
    ) -> Result<RequestBuilder, WatsonError> {
        if options.text.is_empty() {
            return Err(WatsonError::InvalidParameter("text cannot be empty".to_string()));
        }
        let accept = options.accept.unwrap_or_else(|| AUDIO_OGG_OPUS.to_string());
        let url = resolve_request_url(self.service.endpoint(), "/v1/synthesize", &[])?;
        Ok(RequestBuilder::post(url)
            .header(ACCEPT.as_str(), accept)
            .query_opt("voice", options.voice)
            .query_opt("customization_id", options.customization_id)
            .body_json(&serde_json::json!({ "text": options.text })))
    }

    /// Synthesize `text` and buffer the whole audio file.
    pub fn synthesize(&self, options: SynthesizeOptions) -> ServiceCall<BytesConverter> {
        let request = self.synthesize_request(options);
        self.service
            .operation_call(SERVICE_VERSION, "synthesize", request, BytesConverter)
    }

    /// Synthesize `text` and stream the audio as it arrives.
    pub fn synthesize_stream(&self, options: SynthesizeOptions) -> ServiceCall<StreamConverter> {
        let request = self.synthesize_request(options);
        self.service
            .operation_call(SERVICE_VERSION, "synthesize", request, StreamConverter)
    }
}
