//! Estimation API endpoints.

use crate::client::Kuaidi100Client;
use crate::error::Kuaidi100Result;
use crate::payload::{EstimatePriceRequest, EstimateTimeRequest, EstimateTimeWithLogisticRequest};

/// Estimation API for delivery times and shipping prices.
pub struct EstimateApi<'a> {
    client: &'a Kuaidi100Client,
}

impl<'a> EstimateApi<'a> {
    pub(crate) fn new(client: &'a Kuaidi100Client) -> Self {
        Self { client }
    }

    /// Estimate delivery time before shipping.
    pub async fn time(&self, request: EstimateTimeRequest) -> Kuaidi100Result<String> {
        self.client.execute(request).await
    }

    /// Estimate arrival time of a parcel in transit from its trace history.
    pub async fn time_with_logistic(
        &self,
        request: EstimateTimeWithLogisticRequest,
    ) -> Kuaidi100Result<String> {
        self.client.execute(request).await
    }

    /// Estimate the shipping price.
    pub async fn price(&self, request: EstimatePriceRequest) -> Kuaidi100Result<String> {
        self.client.execute(request).await
    }
}
