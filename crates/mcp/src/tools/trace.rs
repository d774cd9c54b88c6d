// Parcel trace tool

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{
    json_schema_object, json_schema_string, json_schema_string_with_default, parse_arguments,
    Tool, ToolError,
};
use kuaidi100_sdk::{Kuaidi100Client, QueryTraceRequest};
use serde::Deserialize;
use std::sync::Arc;

/// Tool to query the trace history of a waybill
pub struct QueryTraceTool {
    client: Arc<Kuaidi100Client>,
}

impl QueryTraceTool {
    pub const NAME: &'static str = "query_trace";

    pub fn new(client: Arc<Kuaidi100Client>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct QueryTraceArgs {
    kuaidi_num: String,
    #[serde(default)]
    phone: String,
}

#[async_trait::async_trait]
impl Tool for QueryTraceTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: Self::NAME.to_string(),
            title: Some("Query parcel trace".to_string()),
            description: "Query the logistics trace of a parcel. Pass the waybill number \
                          (and a phone number for SF Express waybills) to get the parcel's \
                          trace history."
                .to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "kuaidi_num": json_schema_string("Waybill (tracking) number"),
                    "phone": json_schema_string_with_default(
                        "Receiver or sender phone number. Required only when the waybill \
                         number starts with SF; leave empty otherwise",
                        "",
                    )
                }),
                vec!["kuaidi_num"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult, ToolError> {
        let args: QueryTraceArgs = parse_arguments(Self::NAME, arguments)?;

        let body = self
            .client
            .trace()
            .query(QueryTraceRequest {
                kuaidi_num: args.kuaidi_num,
                phone: args.phone,
            })
            .await?;

        Ok(CallToolResult::text(body))
    }
}
