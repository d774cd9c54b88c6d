// Delivery-time and price estimation tools

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{
    json_schema_object, json_schema_string, json_schema_string_with_default, parse_arguments,
    Tool, ToolError,
};
use kuaidi100_sdk::{
    EstimatePriceRequest, EstimateTimeRequest, EstimateTimeWithLogisticRequest, Kuaidi100Client,
};
use serde::Deserialize;
use std::sync::Arc;

const TIME_CARRIERS: &str = "Courier company code, always lowercase. Currently supported: \
    JD (京东): jd, Kuayue (跨越): kuayue, SF Express (顺丰): shunfeng, \
    SF Freight (顺丰快运): shunfengkuaiyun, ZTO (中通): zhongtong, \
    Deppon Express (德邦快递): debangkuaidi, EMS: ems, EMS International (EMS-国际件): emsguoji, \
    China Post domestic (邮政国内): youzhengguonei, China Post international parcel (国际包裹): youzhengguoji, \
    STO (申通): shentong, YTO (圆通): yuantong, Yunda (韵达): yunda, ZJS (宅急送): zhaijisong, \
    Zhimakaimen (芝麻开门): zhimakaimen, FedEx (联邦快递): lianbangkuaidi, \
    Tiandi Huayu (天地华宇): tiandihuayu, ANE (安能快运): annengwuliu, \
    Jingguang (京广速递): jinguangsudikuaijian, Jiayunmei (加运美): jiayunmeiwuliu, \
    J&T Express (极兔速递): jtexpress";

const PRICE_CARRIERS: &str = "Courier company code, always lowercase. Currently supported: \
    SF Express (顺丰): shunfeng, JD (京东): jd, Deppon Express (德邦快递): debangkuaidi, \
    YTO (圆通): yuantong, ZTO (中通): zhongtong, STO (申通): shentong, Yunda (韵达): yunda, \
    EMS: ems";

const FROM_LOC: &str = "Origin address with at least three administrative levels, e.g. \
    广东深圳南山区. Complete missing province/city/district names, e.g. 广东深圳 becomes \
    广东省深圳市南山区";

const TO_LOC: &str = "Destination address with at least three administrative levels, e.g. \
    北京海淀区. Complete missing province/city/district names, e.g. 广东深圳 becomes \
    广东省深圳市南山区. If the user has not given a destination, do not call this tool; \
    ask the user for it first";

const ORDER_TIME: &str = "Order time formatted as yyyy-MM-dd HH:mm:ss, e.g. \
    2023-08-08 08:08:08. Leave empty if the user did not give one";

/// Tool to estimate delivery time before shipping
pub struct EstimateTimeTool {
    client: Arc<Kuaidi100Client>,
}

impl EstimateTimeTool {
    pub const NAME: &'static str = "estimate_time";

    pub fn new(client: Arc<Kuaidi100Client>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct EstimateTimeArgs {
    kuaidi_com: String,
    from_loc: String,
    to_loc: String,
    #[serde(default)]
    order_time: String,
    exp_type: String,
}

#[async_trait::async_trait]
impl Tool for EstimateTimeTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: Self::NAME.to_string(),
            title: Some("Estimate delivery time before shipping".to_string()),
            description: "Estimate when a parcel can be delivered, and how long it will take, \
                          from the courier company code, sender and receiver addresses, order \
                          time and service/product type. Use this before the parcel is shipped."
                .to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "kuaidi_com": json_schema_string(TIME_CARRIERS),
                    "from_loc": json_schema_string(FROM_LOC),
                    "to_loc": json_schema_string(TO_LOC),
                    "order_time": json_schema_string_with_default(ORDER_TIME, ""),
                    "exp_type": json_schema_string(
                        "Service or product type, e.g. 标准快递 (standard express)"
                    )
                }),
                vec!["kuaidi_com", "from_loc", "to_loc", "exp_type"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult, ToolError> {
        let args: EstimateTimeArgs = parse_arguments(Self::NAME, arguments)?;

        let body = self
            .client
            .estimate()
            .time(EstimateTimeRequest {
                kuaidi_com: args.kuaidi_com,
                from_loc: args.from_loc,
                to_loc: args.to_loc,
                order_time: args.order_time,
                exp_type: args.exp_type,
            })
            .await?;

        Ok(CallToolResult::text(body))
    }
}

/// Tool to estimate arrival time of a parcel already in transit
pub struct EstimateTimeWithLogisticTool {
    client: Arc<Kuaidi100Client>,
}

impl EstimateTimeWithLogisticTool {
    pub const NAME: &'static str = "estimate_time_with_logistic";

    pub fn new(client: Arc<Kuaidi100Client>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct EstimateTimeWithLogisticArgs {
    kuaidi_com: String,
    from_loc: String,
    to_loc: String,
    #[serde(default)]
    order_time: String,
    logistic: String,
}

#[async_trait::async_trait]
impl Tool for EstimateTimeWithLogisticTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: Self::NAME.to_string(),
            title: Some("Estimate arrival time of a parcel in transit".to_string()),
            description: "Estimate when a parcel in transit will be delivered from the courier \
                          company code, sender and receiver addresses, order time and the \
                          parcel's trace history so far."
                .to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "kuaidi_com": json_schema_string(TIME_CARRIERS),
                    "from_loc": json_schema_string(FROM_LOC),
                    "to_loc": json_schema_string(TO_LOC),
                    "order_time": json_schema_string_with_default(ORDER_TIME, ""),
                    "logistic": json_schema_string(
                        "Trace history used to predict the remaining transit time. Usually the \
                         trace nodes returned by query_trace converted to a JSON array, e.g. \
                         [{\"time\":\"2025-05-09 13:15:26\",\"context\":\"您的快件离开【吉林省吉林市桦甸市】，已发往【长春转运中心】\"},\
                         {\"time\":\"2025-05-09 12:09:38\",\"context\":\"您的快件在【吉林省吉林市桦甸市】已揽收\"}]. \
                         time is the time of the trace node, context its description"
                    )
                }),
                vec!["kuaidi_com", "from_loc", "to_loc", "logistic"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult, ToolError> {
        let args: EstimateTimeWithLogisticArgs = parse_arguments(Self::NAME, arguments)?;

        let body = self
            .client
            .estimate()
            .time_with_logistic(EstimateTimeWithLogisticRequest {
                kuaidi_com: args.kuaidi_com,
                from_loc: args.from_loc,
                to_loc: args.to_loc,
                order_time: args.order_time,
                logistic: args.logistic,
            })
            .await?;

        Ok(CallToolResult::text(body))
    }
}

/// Tool to estimate the shipping price
pub struct EstimatePriceTool {
    client: Arc<Kuaidi100Client>,
}

impl EstimatePriceTool {
    pub const NAME: &'static str = "estimate_price";

    pub fn new(client: Arc<Kuaidi100Client>) -> Self {
        Self { client }
    }
}

fn default_weight() -> String {
    "1".to_string()
}

#[derive(Debug, Deserialize)]
struct EstimatePriceArgs {
    kuaidi_com: String,
    rec_addr: String,
    send_addr: String,
    #[serde(default = "default_weight")]
    weight: String,
}

#[async_trait::async_trait]
impl Tool for EstimatePriceTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: Self::NAME.to_string(),
            title: Some("Estimate shipping price".to_string()),
            description: "Estimate the courier's shipping fee from the courier company, the \
                          sender and receiver addresses and the parcel weight."
                .to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "kuaidi_com": json_schema_string(PRICE_CARRIERS),
                    "rec_addr": json_schema_string(
                        "Receiver address, e.g. 广东深圳南山区. Complete missing province/city \
                         names, e.g. 广东深圳 becomes 广东省深圳市. If the user has not given a \
                         receiver address, do not call this tool; ask the user for it first"
                    ),
                    "send_addr": json_schema_string(
                        "Sender address, e.g. 北京海淀区. Complete missing province/city names, \
                         e.g. 广东深圳 becomes 广东省深圳市. If the user has not given a sender \
                         address, do not call this tool; ask the user for it first"
                    ),
                    "weight": json_schema_string_with_default(
                        "Weight in kg, without unit, e.g. 1.0. Defaults to 1 kg",
                        "1",
                    )
                }),
                vec!["kuaidi_com", "rec_addr", "send_addr"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult, ToolError> {
        let args: EstimatePriceArgs = parse_arguments(Self::NAME, arguments)?;

        let body = self
            .client
            .estimate()
            .price(EstimatePriceRequest {
                kuaidi_com: args.kuaidi_com,
                rec_addr: args.rec_addr,
                send_addr: args.send_addr,
                weight: args.weight,
            })
            .await?;

        Ok(CallToolResult::text(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ToolContent;
    use kuaidi100_sdk::testing::{multipart_field, multipart_fields};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> Arc<Kuaidi100Client> {
        Arc::new(
            Kuaidi100Client::builder()
                .base_url(server.uri())
                .api_key("estimate-key")
                .build()
                .unwrap(),
        )
    }

    async fn mount_ok(server: &MockServer, endpoint: &str, body: &str) {
        Mock::given(method("POST"))
            .and(path(format!("/{}", endpoint)))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(server)
            .await;
    }

    fn sorted(mut fields: Vec<(String, String)>) -> Vec<(String, String)> {
        fields.sort();
        fields
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        sorted(
            items
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_estimate_time_maps_fields() {
        let server = MockServer::start().await;
        mount_ok(&server, "estimateTime", "TIME").await;

        let result = EstimateTimeTool::new(client_for(&server))
            .execute(serde_json::json!({
                "kuaidi_com": "shunfeng",
                "from_loc": "广东省深圳市南山区",
                "to_loc": "北京市海淀区",
                "order_time": "2023-08-08 08:08:08",
                "exp_type": "标准快递"
            }))
            .await
            .unwrap();
        assert_eq!(result.content, vec![ToolContent::text("TIME")]);

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            sorted(multipart_fields(&requests[0])),
            pairs(&[
                ("kuaidicom", "shunfeng"),
                ("from", "广东省深圳市南山区"),
                ("to", "北京市海淀区"),
                ("orderTime", "2023-08-08 08:08:08"),
                ("expType", "标准快递"),
                ("key", "estimate-key"),
            ])
        );
    }

    #[tokio::test]
    async fn test_estimate_time_requires_exp_type() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = EstimateTimeTool::new(client_for(&server))
            .execute(serde_json::json!({
                "kuaidi_com": "shunfeng",
                "from_loc": "广东省深圳市南山区",
                "to_loc": "北京市海淀区"
            }))
            .await
            .unwrap_err();

        assert!(matches!(err, ToolError::InvalidArguments { tool: "estimate_time", .. }));
        assert!(err.to_string().contains("exp_type"));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_estimate_time_with_logistic_maps_fields() {
        let server = MockServer::start().await;
        mount_ok(&server, "estimateTimeWithLogistic", "ETA").await;

        let logistic = r#"[{"time":"2025-05-09 12:09:38","context":"已揽收"}]"#;
        let result = EstimateTimeWithLogisticTool::new(client_for(&server))
            .execute(serde_json::json!({
                "kuaidi_com": "zhongtong",
                "from_loc": "吉林省吉林市桦甸市",
                "to_loc": "北京市海淀区",
                "logistic": logistic
            }))
            .await
            .unwrap();
        assert_eq!(result, CallToolResult::text("ETA"));

        let requests = server.received_requests().await.unwrap();
        assert_eq!(
            sorted(multipart_fields(&requests[0])),
            pairs(&[
                ("kuaidicom", "zhongtong"),
                ("from", "吉林省吉林市桦甸市"),
                ("to", "北京市海淀区"),
                ("orderTime", ""),
                ("logistic", logistic),
                ("key", "estimate-key"),
            ])
        );
    }

    #[tokio::test]
    async fn test_estimate_price_maps_fields_and_default_weight() {
        let server = MockServer::start().await;
        mount_ok(&server, "estimatePrice", "PRICE").await;

        let result = EstimatePriceTool::new(client_for(&server))
            .execute(serde_json::json!({
                "kuaidi_com": "jd",
                "rec_addr": "广东省深圳市南山区",
                "send_addr": "北京市海淀区"
            }))
            .await
            .unwrap();
        assert_eq!(result, CallToolResult::text("PRICE"));

        let requests = server.received_requests().await.unwrap();
        assert_eq!(
            sorted(multipart_fields(&requests[0])),
            pairs(&[
                ("kuaidicom", "jd"),
                ("recAddr", "广东省深圳市南山区"),
                ("sendAddr", "北京市海淀区"),
                ("weight", "1"),
                ("key", "estimate-key"),
            ])
        );
    }

    #[tokio::test]
    async fn test_estimate_price_passes_weight_through() {
        let server = MockServer::start().await;
        mount_ok(&server, "estimatePrice", "PRICE").await;

        EstimatePriceTool::new(client_for(&server))
            .execute(serde_json::json!({
                "kuaidi_com": "ems",
                "rec_addr": "a",
                "send_addr": "b",
                "weight": "3.5"
            }))
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(multipart_field(&requests[0], "weight").as_deref(), Some("3.5"));
    }

    #[tokio::test]
    async fn test_server_error_is_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/estimatePrice"))
            .respond_with(ResponseTemplate::new(500).set_body_string(r#"{"msg":"bad"}"#))
            .mount(&server)
            .await;

        let err = EstimatePriceTool::new(client_for(&server))
            .execute(serde_json::json!({
                "kuaidi_com": "jd",
                "rec_addr": "a",
                "send_addr": "b"
            }))
            .await
            .unwrap_err();

        match err {
            ToolError::Upstream(inner) => assert_eq!(inner.status(), Some(500)),
            other => panic!("Expected upstream error, got {:?}", other),
        }
    }

    #[test]
    fn test_schemas_declare_required_fields() {
        let client = Arc::new(Kuaidi100Client::builder().api_key("k").build().unwrap());

        let time = EstimateTimeTool::new(client.clone()).schema();
        assert_eq!(
            time.input_schema["required"],
            serde_json::json!(["kuaidi_com", "from_loc", "to_loc", "exp_type"])
        );
        assert_eq!(time.input_schema["properties"]["order_time"]["default"], "");

        let logistic = EstimateTimeWithLogisticTool::new(client.clone()).schema();
        assert_eq!(
            logistic.input_schema["required"],
            serde_json::json!(["kuaidi_com", "from_loc", "to_loc", "logistic"])
        );

        let price = EstimatePriceTool::new(client).schema();
        assert_eq!(price.input_schema["properties"]["weight"]["default"], "1");
        assert!(price.input_schema["properties"]["kuaidi_com"]["description"]
            .as_str()
            .unwrap()
            .contains("shunfeng"));
    }
}
