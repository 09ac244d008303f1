#![allow(dead_code)]

pub mod ogg_demux;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use std::sync::{Arc, Mutex};
use watson_sdk::WatsonError;
use watson_sdk::http::transport::{HttpRequest, HttpResponse, HttpTransport, ResponseBody};

/// Transport that records requests and replays one canned outcome.
pub struct FakeTransport {
    pub requests: Mutex<Vec<HttpRequest>>,
    outcome: Result<(u16, &'static str), WatsonError>,
}

impl FakeTransport {
    pub fn responding(status: u16, body: &'static str) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            outcome: Ok((status, body)),
        })
    }

    pub fn failing(error: WatsonError) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            outcome: Err(error),
        })
    }

    pub fn sent(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, WatsonError> {
        self.requests.lock().unwrap().push(request);
        match &self.outcome {
            Ok((status, body)) => Ok(HttpResponse {
                status: *status,
                headers: HeaderMap::new(),
                body: ResponseBody::Buffered(Bytes::from_static(body.as_bytes())),
            }),
            Err(e) => Err(e.clone()),
        }
    }
}
