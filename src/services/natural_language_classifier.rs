//! Natural Language Classifier (v1).

use crate::error::WatsonError;
use crate::http::media_type::TEXT_CSV;
use crate::http::request::{MultipartBody, RequestBuilder, resolve_request_url};
use crate::http::response::{JsonConverter, JsonListConverter, VoidConverter};
use crate::service::{ServiceBuilder, ServiceCall, WatsonService};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

pub const SERVICE_NAME: &str = "natural_language_classifier";
pub const DEFAULT_ENDPOINT: &str =
    "https://gateway.watsonplatform.net/natural-language-classifier/api";
const SERVICE_VERSION: &str = "v1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedClass {
    pub class_name: String,
    #[serde(default)]
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub classifier_id: Option<String>,
    pub url: Option<String>,
    pub text: Option<String>,
    pub top_class: Option<String>,
    #[serde(default)]
    pub classes: Vec<ClassifiedClass>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionItem {
    pub text: Option<String>,
    pub top_class: Option<String>,
    #[serde(default)]
    pub classes: Vec<ClassifiedClass>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationCollection {
    pub classifier_id: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub collection: Vec<CollectionItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classifier {
    pub classifier_id: String,
    pub url: Option<String>,
    pub name: Option<String>,
    pub language: Option<String>,
    pub created: Option<String>,
    pub status: Option<String>,
    pub status_description: Option<String>,
}

/// Client for the Natural Language Classifier service.
#[derive(Debug, Clone)]
pub struct NaturalLanguageClassifier {
    service: WatsonService,
}

impl NaturalLanguageClassifier {
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

    fn url(&self, template: &str, params: &[(&str, &str)]) -> Result<String, WatsonError> {
        resolve_request_url(self.service.endpoint(), template, params)
    }

    /// Classify one phrase.
    pub fn classify(
        &self,
        classifier_id: &str,
        text: &str,
    ) -> ServiceCall<JsonConverter<Classification>> {
        let request = self
            .url("/v1/classifiers/{classifier_id}/classify", &[("classifier_id", classifier_id)])
            .map(|url| RequestBuilder::post(url).body_json(&serde_json::json!({ "text": text })));
        self.service.operation_call(SERVICE_VERSION, "classify", request, JsonConverter::new())
    }

    /// Classify up to 30 phrases in one request.
    pub fn classify_collection<S: AsRef<str>>(
        &self,
        classifier_id: &str,
        texts: &[S],
    ) -> ServiceCall<JsonConverter<ClassificationCollection>> {
        let collection: Vec<_> = texts
            .iter()
            .map(|t| serde_json::json!({ "text": t.as_ref() }))
            .collect();
        let request = self
            .url(
                "/v1/classifiers/{classifier_id}/classify_collection",
                &[("classifier_id", classifier_id)],
            )
            .map(|url| {
                RequestBuilder::post(url).body_json(&serde_json::json!({ "collection": collection }))
            });
        self.service.operation_call(
            SERVICE_VERSION,
            "classify_collection",
            request,
            JsonConverter::new(),
        )
    }

    /// Train a classifier from JSON metadata (`{"language":"en","name":..}`)
    /// and CSV training data.
    pub fn create_classifier(
        &self,
        training_metadata: &serde_json::Value,
        training_data: impl Into<Bytes>,
    ) -> ServiceCall<JsonConverter<Classifier>> {
        let form = MultipartBody::new()
            .json("training_metadata", training_metadata)
            .file(
                "training_data",
                training_data,
                Some("training_data.csv".to_string()),
                Some(TEXT_CSV.to_string()),
            );
        let request = self
            .url("/v1/classifiers", &[])
            .map(|url| RequestBuilder::post(url).body_multipart(form));
        self.service.operation_call(
            SERVICE_VERSION,
            "create_classifier",
            request,
            JsonConverter::new(),
        )
    }

    pub fn get_classifier(&self, classifier_id: &str) -> ServiceCall<JsonConverter<Classifier>> {
        let request = self
            .url("/v1/classifiers/{classifier_id}", &[("classifier_id", classifier_id)])
            .map(RequestBuilder::get);
        self.service.operation_call(
            SERVICE_VERSION,
            "get_classifier",
            request,
            JsonConverter::new(),
        )
    }

    pub fn list_classifiers(&self) -> ServiceCall<JsonListConverter<Classifier>> {
        let request = self.url("/v1/classifiers", &[]).map(RequestBuilder::get);
        self.service.operation_call(
            SERVICE_VERSION,
            "list_classifiers",
            request,
            JsonListConverter::new("classifiers"),
        )
    }

    pub fn delete_classifier(&self, classifier_id: &str) -> ServiceCall<VoidConverter> {
        let request = self
            .url("/v1/classifiers/{classifier_id}", &[("classifier_id", classifier_id)])
            .map(RequestBuilder::delete);
        self.service.operation_call(SERVICE_VERSION, "delete_classifier", request, VoidConverter)
    }
}
