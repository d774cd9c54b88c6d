//! # Kuaidi100 SDK
//!
//! Rust client for the Kuaidi100 courier API: parcel trace queries,
//! delivery-time estimates (before shipping and in transit) and price
//! estimates.
//!
//! Every call is a single `multipart/form-data` POST with the API key injected
//! under `key`. Response bodies are returned verbatim.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kuaidi100_sdk::{Kuaidi100Client, Kuaidi100Result, QueryTraceRequest};
//!
//! #[tokio::main]
//! async fn main() -> Kuaidi100Result<()> {
//!     // Reads KUAIDI100_API_KEY
//!     let client = Kuaidi100Client::from_env()?;
//!
//!     let trace = client
//!         .trace()
//!         .query(QueryTraceRequest {
//!             kuaidi_num: "YT1234567890".to_string(),
//!             phone: String::new(),
//!         })
//!         .await?;
//!     println!("{}", trace);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod payload;
pub mod transport;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

// Re-export main client
pub use client::{Kuaidi100Client, Kuaidi100ClientBuilder};
pub use config::{ApiKey, ClientConfig, API_KEY_ENV, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use error::{Kuaidi100Error, Kuaidi100Result};

// Re-export payload types
pub use payload::{
    encode_logistic, EstimatePriceRequest, EstimateTimeRequest, EstimateTimeWithLogisticRequest,
    LogisticNode, QueryTraceRequest, RequestPayload,
};
