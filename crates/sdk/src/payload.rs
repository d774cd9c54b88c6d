//! Typed request payloads for the four Kuaidi100 endpoints.
//!
//! Field names on the wire follow the upstream API (`kuaidiNum`, `kuaidicom`,
//! `orderTime`, ...). Every payload is flattened into a [`FormBody`] with the
//! credential appended under `key`.

use crate::config::ApiKey;
use crate::error::{Kuaidi100Error, Kuaidi100Result};
use crate::transport::FormBody;
use serde::{Deserialize, Serialize};

/// Form field carrying the credential.
pub const KEY_FIELD: &str = "key";

/// Track a parcel by its waybill number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryTraceRequest {
    #[serde(rename = "kuaidiNum")]
    pub kuaidi_num: String,
    /// Receiver or sender phone; only needed for SF Express waybills.
    pub phone: String,
}

/// Delivery-time estimate before shipping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EstimateTimeRequest {
    #[serde(rename = "kuaidicom")]
    pub kuaidi_com: String,
    #[serde(rename = "from")]
    pub from_loc: String,
    #[serde(rename = "to")]
    pub to_loc: String,
    /// `yyyy-MM-dd HH:mm:ss`, empty when unknown.
    #[serde(rename = "orderTime")]
    pub order_time: String,
    #[serde(rename = "expType")]
    pub exp_type: String,
}

/// Delivery-time estimate for a parcel already in transit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EstimateTimeWithLogisticRequest {
    #[serde(rename = "kuaidicom")]
    pub kuaidi_com: String,
    #[serde(rename = "from")]
    pub from_loc: String,
    #[serde(rename = "to")]
    pub to_loc: String,
    #[serde(rename = "orderTime")]
    pub order_time: String,
    /// JSON array of `{time, context}` trace nodes, see [`encode_logistic`].
    pub logistic: String,
}

/// Shipping price estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EstimatePriceRequest {
    #[serde(rename = "kuaidicom")]
    pub kuaidi_com: String,
    #[serde(rename = "recAddr")]
    pub rec_addr: String,
    #[serde(rename = "sendAddr")]
    pub send_addr: String,
    /// Kilograms, without unit.
    pub weight: String,
}

/// One node of a parcel's trace history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogisticNode {
    pub time: String,
    pub context: String,
}

/// Encode trace nodes into the `logistic` field format.
pub fn encode_logistic(nodes: &[LogisticNode]) -> Kuaidi100Result<String> {
    serde_json::to_string(nodes).map_err(|e| Kuaidi100Error::RequestSetup(e.to_string()))
}

/// A request to one of the Kuaidi100 endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestPayload {
    QueryTrace(QueryTraceRequest),
    EstimateTime(EstimateTimeRequest),
    EstimateTimeWithLogistic(EstimateTimeWithLogisticRequest),
    EstimatePrice(EstimatePriceRequest),
}

impl RequestPayload {
    /// Path suffix under the API base URL.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::QueryTrace(_) => "queryTrace",
            Self::EstimateTime(_) => "estimateTime",
            Self::EstimateTimeWithLogistic(_) => "estimateTimeWithLogistic",
            Self::EstimatePrice(_) => "estimatePrice",
        }
    }

    /// Flatten into form fields and append the credential.
    pub fn to_form(&self, api_key: &ApiKey) -> Kuaidi100Result<FormBody> {
        let value = match self {
            Self::QueryTrace(req) => serde_json::to_value(req),
            Self::EstimateTime(req) => serde_json::to_value(req),
            Self::EstimateTimeWithLogistic(req) => serde_json::to_value(req),
            Self::EstimatePrice(req) => serde_json::to_value(req),
        }
        .map_err(|e| Kuaidi100Error::RequestSetup(e.to_string()))?;

        let serde_json::Value::Object(fields) = value else {
            return Err(Kuaidi100Error::RequestSetup(format!(
                "{} payload did not serialize to an object",
                self.endpoint()
            )));
        };

        let mut form = FormBody::new();
        for (name, value) in fields {
            let text = match value {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            form = form.text(name, text);
        }

        Ok(form.secret(KEY_FIELD, api_key.expose()))
    }
}

impl From<QueryTraceRequest> for RequestPayload {
    fn from(req: QueryTraceRequest) -> Self {
        Self::QueryTrace(req)
    }
}

impl From<EstimateTimeRequest> for RequestPayload {
    fn from(req: EstimateTimeRequest) -> Self {
        Self::EstimateTime(req)
    }
}

impl From<EstimateTimeWithLogisticRequest> for RequestPayload {
    fn from(req: EstimateTimeWithLogisticRequest) -> Self {
        Self::EstimateTimeWithLogistic(req)
    }
}

impl From<EstimatePriceRequest> for RequestPayload {
    fn from(req: EstimatePriceRequest) -> Self {
        Self::EstimatePrice(req)
    }
}
