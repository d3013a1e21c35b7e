//! Transport layer for the Capsule SDK.

pub mod http;

pub use http::HttpTransport;
