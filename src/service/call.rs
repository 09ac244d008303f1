//! Completion adapters for one service call.
//!
//! A [`ServiceCall`] wraps one prepared request. It can be awaited, run to
//! completion on the current thread, handed to a callback, or turned into an
//! eagerly running [`ServiceFuture`]. All of them drive the same dispatch.

use super::WatsonService;
use crate::error::WatsonError;
use crate::http::headers::{header_name, header_value};
use crate::http::response::{Response, ResponseConverter};
use crate::http::transport::HttpRequest;
use once_cell::sync::Lazy;
use reqwest::header::HeaderMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::runtime::{Handle, Runtime};
use tokio::task::JoinHandle;

// Runs calls started from threads that have no tokio runtime of their own.
static BACKGROUND_RUNTIME: Lazy<Result<Runtime, String>> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("watson-sdk-call")
        .enable_all()
        .build()
        .map_err(|e| e.to_string())
});

fn background_runtime() -> Result<&'static Runtime, WatsonError> {
    BACKGROUND_RUNTIME.as_ref().map_err(|e| {
        WatsonError::ConfigurationError(format!("Failed to start background runtime: {e}"))
    })
}

fn runtime_handle() -> Result<Handle, WatsonError> {
    match Handle::try_current() {
        Ok(handle) => Ok(handle),
        Err(_) => Ok(background_runtime()?.handle().clone()),
    }
}

/// Receives the outcome of an enqueued call.
pub trait ServiceCallback<T>: Send + 'static {
    fn on_response(&self, response: T);

    fn on_failure(&self, error: WatsonError);
}

/// Callback built from two closures, see [`callback_fn`].
pub struct FnCallback<S, F> {
    on_response: S,
    on_failure: F,
}

/// Build a [`ServiceCallback`] from a success and a failure closure.
pub fn callback_fn<T, S, F>(on_response: S, on_failure: F) -> FnCallback<S, F>
where
    S: Fn(T) + Send + 'static,
    F: Fn(WatsonError) + Send + 'static,
{
    FnCallback {
        on_response,
        on_failure,
    }
}

impl<T, S, F> ServiceCallback<T> for FnCallback<S, F>
where
    S: Fn(T) + Send + 'static,
    F: Fn(WatsonError) + Send + 'static,
{
    fn on_response(&self, response: T) {
        (self.on_response)(response)
    }

    fn on_failure(&self, error: WatsonError) {
        (self.on_failure)(error)
    }
}

/// Eagerly running call result.
pub struct ServiceFuture<T> {
    state: FutureState<T>,
}

enum FutureState<T> {
    Running(JoinHandle<Result<T, WatsonError>>),
    Failed(Option<WatsonError>),
}

impl<T> ServiceFuture<T> {
    /// Abort the underlying request. Awaiting afterwards yields `Cancelled`.
    pub fn abort(&self) {
        if let FutureState::Running(handle) = &self.state {
            handle.abort();
        }
    }

    pub fn is_finished(&self) -> bool {
        match &self.state {
            FutureState::Running(handle) => handle.is_finished(),
            FutureState::Failed(_) => true,
        }
    }
}

impl<T> Future for ServiceFuture<T> {
    type Output = Result<T, WatsonError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.state {
            FutureState::Running(handle) => match Pin::new(handle).poll(cx) {
                Poll::Ready(Ok(result)) => Poll::Ready(result),
                Poll::Ready(Err(join)) => Poll::Ready(Err(WatsonError::from(join))),
                Poll::Pending => Poll::Pending,
            },
            FutureState::Failed(error) => Poll::Ready(Err(error.take().unwrap_or_else(|| {
                WatsonError::Cancelled("future polled after completion".to_string())
            }))),
        }
    }
}

/// One request bound to its service and converter.
pub struct ServiceCall<C: ResponseConverter> {
    service: WatsonService,
    request: Option<Result<HttpRequest, WatsonError>>,
    converter: Arc<C>,
    headers: Vec<(String, String)>,
}

impl<C: ResponseConverter> ServiceCall<C> {
    pub(crate) fn new(
        service: WatsonService,
        request: Result<HttpRequest, WatsonError>,
        converter: C,
    ) -> Self {
        Self {
            service,
            request: Some(request),
            converter: Arc::new(converter),
            headers: Vec::new(),
        }
    }

    /// Add a header to this call only. It overrides service default headers.
    pub fn add_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// The prepared request, before service defaults and authentication.
    pub fn request(&self) -> Option<&HttpRequest> {
        self.request.as_ref().and_then(|r| r.as_ref().ok())
    }

    fn into_future(
        mut self,
    ) -> impl Future<Output = Result<Response<C::Output>, WatsonError>> + Send + 'static {
        let service = self.service.clone();
        let converter = self.converter.clone();
        let request = self.request.take().unwrap_or_else(|| {
            Err(WatsonError::InvalidParameter("call was already dispatched".to_string()))
        });
        let headers = std::mem::take(&mut self.headers);
        async move {
            let request = request?;
            let mut call_headers = HeaderMap::new();
            for (name, value) in &headers {
                call_headers.insert(header_name(name)?, header_value(value)?);
            }
            service.dispatch(request, &call_headers, converter.as_ref()).await
        }
    }

    /// Send the request and convert the response.
    pub async fn execute(self) -> Result<C::Output, WatsonError> {
        self.into_future().await.map(Response::into_result)
    }

    /// Like [`execute`](Self::execute), keeping status and headers.
    pub async fn execute_with_details(self) -> Result<Response<C::Output>, WatsonError> {
        self.into_future().await
    }

    /// Block the current thread until the call completes.
    ///
    /// Fails when called from inside a tokio runtime; use `execute().await`
    /// there instead.
    pub fn execute_blocking(self) -> Result<C::Output, WatsonError> {
        self.execute_blocking_with_details().map(Response::into_result)
    }

    pub fn execute_blocking_with_details(self) -> Result<Response<C::Output>, WatsonError> {
        if Handle::try_current().is_ok() {
            return Err(WatsonError::ConfigurationError(
                "execute_blocking cannot run inside an async runtime; use execute().await"
                    .to_string(),
            ));
        }
        background_runtime()?.block_on(self.into_future())
    }

    /// Run in the background and report to `callback`.
    ///
    /// Uses the current tokio runtime, or a shared background runtime when
    /// called from a plain thread.
    pub fn enqueue<B>(self, callback: B) -> Option<JoinHandle<()>>
    where
        B: ServiceCallback<C::Output>,
    {
        let handle = match runtime_handle() {
            Ok(h) => h,
            Err(e) => {
                callback.on_failure(e);
                return None;
            }
        };
        let future = self.into_future();
        Some(handle.spawn(async move {
            match future.await {
                Ok(response) => callback.on_response(response.into_result()),
                Err(e) => callback.on_failure(e),
            }
        }))
    }

    /// Like [`enqueue`](Self::enqueue), keeping status and headers.
    pub fn enqueue_with_details<B>(self, callback: B) -> Option<JoinHandle<()>>
    where
        B: ServiceCallback<Response<C::Output>>,
    {
        let handle = match runtime_handle() {
            Ok(h) => h,
            Err(e) => {
                callback.on_failure(e);
                return None;
            }
        };
        let future = self.into_future();
        Some(handle.spawn(async move {
            match future.await {
                Ok(response) => callback.on_response(response),
                Err(e) => callback.on_failure(e),
            }
        }))
    }

    /// Start the call now and return a future of its result.
    pub fn rx(self) -> ServiceFuture<C::Output> {
        let future = self.into_future();
        rx_spawn(async move { future.await.map(Response::into_result) })
    }

    /// Like [`rx`](Self::rx), keeping status and headers.
    pub fn rx_with_details(self) -> ServiceFuture<Response<C::Output>> {
        rx_spawn(self.into_future())
    }
}

fn rx_spawn<T, F>(future: F) -> ServiceFuture<T>
where
    T: Send + 'static,
    F: Future<Output = Result<T, WatsonError>> + Send + 'static,
{
    let state = match runtime_handle() {
        Ok(handle) => FutureState::Running(handle.spawn(future)),
        Err(e) => FutureState::Failed(Some(e)),
    };
    ServiceFuture { state }
}

impl<C: ResponseConverter> Drop for ServiceCall<C> {
    fn drop(&mut self) {
        if let Some(Ok(request)) = &self.request {
            tracing::warn!(
                target: "watson_sdk::service",
                "{} request to {} has not been sent. Did you forget to call execute()?",
                request.method,
                request.url
            );
        }
    }
}
