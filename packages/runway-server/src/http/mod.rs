//! Request/response collaborators and the axum host adapter.

pub mod host;
pub mod request;
pub mod response;

pub use host::{router, serve};
pub use request::Request;
pub use response::Response;
