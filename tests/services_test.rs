//! Service clients against a mock Watson backend.

use futures::StreamExt;
use watson_sdk::audio::{OpusWriter, OpusWriterConfig};
use watson_sdk::prelude::*;
use watson_sdk::services::natural_language_classifier::NaturalLanguageClassifier;
use watson_sdk::services::speech_to_text::RecognizeOptions;
use watson_sdk::services::text_to_speech::SynthesizeOptions;
use wiremock::matchers::{
    body_json, body_string_contains, header, header_regex, method, path, query_param,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn builder_for(builder: ServiceBuilder, server: &MockServer, prefix: &str) -> ServiceBuilder {
    builder
        .endpoint(format!("{}{prefix}", server.uri()))
        .username_and_password("user", "pass")
}

#[tokio::test]
async fn text_to_speech_lists_and_synthesizes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/text-to-speech/api/v1/voices"))
        .and(header_regex(
            "x-ibmcloud-sdk-analytics",
            "service_name=text_to_speech;service_version=v1;operation_id=list_voices",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "voices": [
                { "name": "en-US_AllisonVoice", "language": "en-US", "gender": "female" },
                { "name": "de-DE_BirgitVoice", "language": "de-DE", "gender": "female" }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/text-to-speech/api/v1/synthesize"))
        .and(query_param("voice", "en-US_AllisonVoice"))
        .and(header("accept", "audio/ogg;codecs=opus"))
        .and(body_json(serde_json::json!({ "text": "hello" })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "audio/ogg;codecs=opus")
                .set_body_bytes(b"OggS-audio".to_vec()),
        )
        .mount(&server)
        .await;

    let tts =
        TextToSpeech::from_builder(builder_for(TextToSpeech::builder(), &server, "/text-to-speech/api"))
            .unwrap();

    let voices = tts.list_voices().execute().await.unwrap();
    assert_eq!(voices.len(), 2);
    assert_eq!(voices[0].name, "en-US_AllisonVoice");

    let options = SynthesizeOptions::new("hello").voice("en-US_AllisonVoice");
    let audio = tts.synthesize(options.clone()).execute().await.unwrap();
    assert_eq!(&audio[..], b"OggS-audio");

    let mut stream = tts.synthesize_stream(options).execute().await.unwrap();
    let mut streamed = Vec::new();
    while let Some(chunk) = stream.next().await {
        streamed.extend_from_slice(&chunk.unwrap());
    }
    assert_eq!(streamed, b"OggS-audio");
}

#[tokio::test]
async fn unknown_voice_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/voices/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "code": 404,
            "error": "Model nope not found"
        })))
        .mount(&server)
        .await;

    let tts = TextToSpeech::from_builder(builder_for(TextToSpeech::builder(), &server, "/api"))
        .unwrap();
    let err = tts.get_voice("nope").execute().await.unwrap_err();
    assert!(matches!(err, WatsonError::NotFound(_)));
    assert_eq!(err.message(), "Model nope not found");
}

#[tokio::test]
async fn speech_to_text_recognizes_ogg_opus_upload() {
    let mut writer = OpusWriter::with_config(Vec::new(), OpusWriterConfig::default().with_serial(1));
    writer.write_header("ENCODER=test").unwrap();
    for i in 0..10u8 {
        writer.write_packet(&[i; 40]).unwrap();
    }
    let audio = writer.close().unwrap();

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/recognize"))
        .and(header("content-type", "audio/ogg;codecs=opus"))
        .and(query_param("model", "en-US_NarrowbandModel"))
        .and(query_param("keywords", "hello,world"))
        .and(query_param("timestamps", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result_index": 0,
            "results": [{ "final": true, "alternatives": [{ "transcript": "hello world" }] }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let stt = SpeechToText::from_builder(builder_for(SpeechToText::builder(), &server, "/api"))
        .unwrap();
    let results = stt
        .recognize(
            audio.clone(),
            RecognizeOptions {
                model: Some("en-US_NarrowbandModel".into()),
                keywords: vec!["hello".into(), "world".into()],
                timestamps: Some(true),
                ..Default::default()
            },
        )
        .execute()
        .await
        .unwrap();
    assert_eq!(results.transcript(), "hello world");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].body, audio);
}

#[tokio::test]
async fn speech_to_text_models() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "models": [{ "name": "en-US_BroadbandModel", "rate": 16000 }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/models/en-US_BroadbandModel"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "en-US_BroadbandModel", "language": "en-US", "rate": 16000
        })))
        .mount(&server)
        .await;

    let stt = SpeechToText::from_builder(builder_for(SpeechToText::builder(), &server, "/api"))
        .unwrap();
    let models = stt.list_models().execute().await.unwrap();
    assert_eq!(models[0].rate, Some(16000));
    let model = stt.get_model("en-US_BroadbandModel").execute().await.unwrap();
    assert_eq!(model.language.as_deref(), Some("en-US"));
}

#[tokio::test]
async fn classifier_lifecycle() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/classifiers"))
        .and(header_regex("content-type", "^multipart/form-data; boundary="))
        .and(body_string_contains("name=\"training_metadata\""))
        .and(body_string_contains("name=\"training_data\""))
        .and(body_string_contains("how hot is it,temperature"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "classifier_id": "c-1", "name": "weather", "status": "Training"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/classifiers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "classifiers": [{ "classifier_id": "c-1" }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/classifiers/c-1/classify"))
        .and(body_json(serde_json::json!({ "text": "is it hot?" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "classifier_id": "c-1",
            "text": "is it hot?",
            "top_class": "temperature",
            "classes": [{ "class_name": "temperature", "confidence": 0.98 }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/classifiers/c-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let nlc = NaturalLanguageClassifier::from_builder(builder_for(
        NaturalLanguageClassifier::builder(),
        &server,
        "/api",
    ))
    .unwrap();

    let created = nlc
        .create_classifier(
            &serde_json::json!({ "language": "en", "name": "weather" }),
            "how hot is it,temperature\nwill it rain,conditions\n",
        )
        .execute()
        .await
        .unwrap();
    assert_eq!(created.classifier_id, "c-1");
    assert_eq!(created.status.as_deref(), Some("Training"));

    let all = nlc.list_classifiers().execute().await.unwrap();
    assert_eq!(all.len(), 1);

    let classification = nlc.classify("c-1", "is it hot?").execute().await.unwrap();
    assert_eq!(classification.top_class.as_deref(), Some("temperature"));
    assert!(classification.classes[0].confidence > 0.9);

    nlc.delete_classifier("c-1").execute().await.unwrap();
}

#[tokio::test]
async fn legacy_token_endpoint() {
    let server = MockServer::start().await;
    let endpoint = format!("{}/text-to-speech/api", server.uri());
    Mock::given(method("GET"))
        .and(path("/authorization/api/v1/token"))
        .and(query_param("url", endpoint.as_str()))
        .and(header("accept", "text/plain"))
        .respond_with(ResponseTemplate::new(200).set_body_string("legacy-token"))
        .mount(&server)
        .await;

    let tts = TextToSpeech::from_builder(
        TextToSpeech::builder()
            .endpoint(endpoint.clone())
            .username_and_password("user", "pass"),
    )
    .unwrap();
    let token = tts.service().get_token().execute().await.unwrap();
    assert_eq!(token, "legacy-token");
}
