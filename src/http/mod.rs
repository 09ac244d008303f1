//! HTTP plumbing: request building, transport, response conversion.

pub mod config;
pub mod headers;
pub mod interceptor;
pub mod media_type;
pub mod request;
pub mod response;
pub mod transport;

pub use config::HttpConfig;
pub use interceptor::{HttpInterceptor, HttpRequestContext, LoggingInterceptor};
pub use request::{HttpMethod, MultipartBody, RequestBody, RequestBuilder};
pub use response::{Response, ResponseConverter};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, ResponseBody};
