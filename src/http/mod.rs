//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum app: trace, request ID, timeout)
//!     → request.rs (request ID, buffered RequestData)
//!     → routing table → dispatch (Exchange owned for one request)
//!     → response.rs (ResponseWriter → axum Response)
//!     → Send to client
//! ```

pub mod exchange;
pub mod request;
pub mod response;
pub mod server;

pub use exchange::Exchange;
pub use request::{RequestData, RequestId, RequestIdExt, RequestIdLayer, X_REQUEST_ID};
pub use response::ResponseWriter;
pub use server::HttpServer;
