//! Transport layer for the Kuaidi100 SDK.

pub mod http;

pub use http::{FormBody, HttpTransport};
