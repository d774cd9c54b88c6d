//! Trace API endpoints.

use crate::client::Kuaidi100Client;
use crate::error::Kuaidi100Result;
use crate::payload::QueryTraceRequest;

/// Trace API for following a parcel.
pub struct TraceApi<'a> {
    client: &'a Kuaidi100Client,
}

impl<'a> TraceApi<'a> {
    pub(crate) fn new(client: &'a Kuaidi100Client) -> Self {
        Self { client }
    }

    /// Query the trace history of a waybill. Returns the raw response body.
    pub async fn query(&self, request: QueryTraceRequest) -> Kuaidi100Result<String> {
        self.client.execute(request).await
    }
}
