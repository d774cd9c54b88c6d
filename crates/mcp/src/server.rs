// MCP server: JSON-RPC dispatch and the newline-delimited stdio loop

use crate::protocol::{
    negotiate_protocol_version, CallToolParams, CallToolResult, InitializeParams, InitializeResult,
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, ListToolsResult, ServerCapabilities,
    ServerInfo, ToolsCapability, LATEST_PROTOCOL_VERSION,
};
use crate::tools::{ToolError, ToolRegistry};
use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::bytes::BytesMut;
use tokio_util::codec::{Decoder, FramedRead, FramedWrite, LinesCodec, LinesCodecError};
use tracing::{debug, error, info, warn};

pub const SERVER_NAME: &str = "kuaidi100_mcp";
pub const SERVER_VERSION: &str = "1.0.0";

/// Longest input line accepted; longer lines are answered with a parse error.
pub const MAX_LINE_LENGTH: usize = 4 * 1024 * 1024;

pub struct McpServer {
    registry: Arc<ToolRegistry>,
    server_info: ServerInfo,
    max_line_length: usize,
}

impl McpServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
            },
            max_line_length: MAX_LINE_LENGTH,
        }
    }

    pub fn with_max_line_length(mut self, max_line_length: usize) -> Self {
        self.max_line_length = max_line_length;
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Serve over the process's stdin/stdout until stdin closes.
    pub async fn start(self) -> Result<()> {
        info!(tools = self.registry.len(), "MCP server is running on stdio");
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve newline-delimited JSON-RPC over any reader/writer pair.
    ///
    /// Each request is handled on its own task; a single writer task owns the
    /// output. Returns after the reader reaches EOF and every in-flight
    /// request has been answered.
    pub async fn serve<R, W>(self, reader: R, writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let mut lines = FramedRead::new(reader, InputLineCodec::new(self.max_line_length));
        let server = Arc::new(self);
        let (tx, mut rx) = mpsc::unbounded_channel::<JsonRpcResponse>();

        let writer_task = tokio::spawn(async move {
            let mut sink = FramedWrite::new(writer, LinesCodec::new());
            while let Some(response) = rx.recv().await {
                let line = serde_json::to_string(&response).context("Failed to encode response")?;
                debug!(response = %line, "Sending response");
                sink.send(line).await.context("Failed to write response")?;
            }
            anyhow::Ok(())
        });

        let mut in_flight = JoinSet::new();
        while let Some(line) = lines.next().await {
            let line = match line.context("Failed to read from input")? {
                InputLine::Text(line) => line,
                InputLine::TooLong => {
                    warn!(max = server.max_line_length, "Input line too long, discarding it");
                    let _ = tx.send(parse_error_response());
                    continue;
                }
                InputLine::NotUtf8 => {
                    warn!("Input line is not valid UTF-8");
                    let _ = tx.send(parse_error_response());
                    continue;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            debug!(request = %line, "Received request");

            let request = match decode_request(&line) {
                Ok(Some(request)) => request,
                Ok(None) => continue,
                Err(response) => {
                    let _ = tx.send(response);
                    continue;
                }
            };

            let server = server.clone();
            let tx = tx.clone();
            in_flight.spawn(async move {
                if let Some(response) = server.handle_request(request).await {
                    // The writer only stops early on a write failure, which
                    // `serve` reports below.
                    let _ = tx.send(response);
                }
            });

            // reap finished handlers so the set does not grow unbounded
            while in_flight.try_join_next().is_some() {}
        }

        info!("Input closed, waiting for in-flight requests");
        while in_flight.join_next().await.is_some() {}
        drop(tx);

        writer_task.await.context("Writer task panicked")??;
        info!("MCP server stopped");
        Ok(())
    }

    /// Dispatch one request. Notifications return `None`.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id.clone() else {
            self.handle_notification(&request);
            return None;
        };

        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(id, JsonRpcError::invalid_request()));
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id, request.params),
            "ping" => JsonRpcResponse::success(id, serde_json::json!({})),
            "tools/list" => JsonRpcResponse::success(
                id,
                ListToolsResult {
                    tools: self.registry.list_schemas(),
                },
            ),
            "tools/call" => self.handle_call_tool(id, request.params).await,
            method => {
                debug!(method, "Unknown method");
                JsonRpcResponse::error(id, JsonRpcError::method_not_found(method))
            }
        };

        Some(response)
    }

    fn handle_notification(&self, request: &JsonRpcRequest) {
        match request.method.as_str() {
            "notifications/initialized" => info!("Client initialized"),
            "notifications/cancelled" => debug!(params = ?request.params, "Client cancelled a request"),
            method => debug!(method, "Ignoring notification"),
        }
    }

    fn handle_initialize(
        &self,
        id: serde_json::Value,
        params: Option<serde_json::Value>,
    ) -> JsonRpcResponse {
        let protocol_version = match params.map(serde_json::from_value::<InitializeParams>) {
            Some(Ok(params)) => {
                info!(
                    client = %params.client_info.name,
                    client_version = %params.client_info.version,
                    protocol_version = %params.protocol_version,
                    "Initializing session"
                );
                negotiate_protocol_version(&params.protocol_version)
            }
            Some(Err(e)) => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params(format!("Invalid initialize params: {}", e)),
                )
            }
            None => LATEST_PROTOCOL_VERSION,
        };

        JsonRpcResponse::success(
            id,
            InitializeResult {
                protocol_version: protocol_version.to_string(),
                capabilities: ServerCapabilities {
                    tools: Some(ToolsCapability {
                        list_changed: false,
                    }),
                },
                server_info: self.server_info.clone(),
            },
        )
    }

    async fn handle_call_tool(
        &self,
        id: serde_json::Value,
        params: Option<serde_json::Value>,
    ) -> JsonRpcResponse {
        let params: CallToolParams = match params.map(serde_json::from_value) {
            Some(Ok(params)) => params,
            Some(Err(e)) => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params(format!("Invalid tools/call params: {}", e)),
                )
            }
            None => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params("Missing tools/call params"),
                )
            }
        };

        info!(tool = %params.name, "Calling tool");
        match self.registry.call(&params.name, params.arguments).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(err @ (ToolError::UnknownTool(_) | ToolError::InvalidArguments { .. })) => {
                warn!(tool = %params.name, error = %err, "Rejected tool call");
                JsonRpcResponse::error(id, JsonRpcError::invalid_params(err.to_string()))
            }
            Err(ToolError::Upstream(err)) => {
                error!(tool = %params.name, kind = err.kind(), error = %err, "Tool call failed");
                JsonRpcResponse::success(id, CallToolResult::error(err.to_string()))
            }
        }
    }
}

fn parse_error_response() -> JsonRpcResponse {
    JsonRpcResponse::error(serde_json::Value::Null, JsonRpcError::parse_error())
}

/// Turn one input line into a request.
///
/// Text that is not JSON is a parse error with a null id. JSON that is not a
/// request is an invalid request echoing its id. Responses sent by the client
/// carry no method and are dropped (`Ok(None)`).
fn decode_request(line: &str) -> Result<Option<JsonRpcRequest>, JsonRpcResponse> {
    let value: serde_json::Value = serde_json::from_str(line).map_err(|e| {
        warn!(error = %e, "Failed to parse request");
        parse_error_response()
    })?;

    let id = value.get("id").cloned().unwrap_or(serde_json::Value::Null);
    if value.get("method").is_none()
        && (value.get("result").is_some() || value.get("error").is_some())
    {
        debug!(id = %id, "Ignoring response from client");
        return Ok(None);
    }

    serde_json::from_value(value).map(Some).map_err(|e| {
        warn!(error = %e, "Invalid request");
        JsonRpcResponse::error(id, JsonRpcError::invalid_request())
    })
}

/// A line read from the input, or why it could not be used.
#[derive(Debug, PartialEq)]
enum InputLine {
    Text(String),
    TooLong,
    NotUtf8,
}

/// `LinesCodec` that reports bad lines as items.
///
/// `FramedRead` ends the stream after any decoder error, so an over-long or
/// non-UTF-8 line must not surface as one. Only reader failures stay errors.
struct InputLineCodec {
    inner: LinesCodec,
}

impl InputLineCodec {
    fn new(max_length: usize) -> Self {
        Self {
            inner: LinesCodec::new_with_max_length(max_length),
        }
    }
}

impl Decoder for InputLineCodec {
    type Item = InputLine;
    type Error = io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> io::Result<Option<InputLine>> {
        recover_line(self.inner.decode(buf))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> io::Result<Option<InputLine>> {
        recover_line(self.inner.decode_eof(buf))
    }
}

fn recover_line(result: Result<Option<String>, LinesCodecError>) -> io::Result<Option<InputLine>> {
    match result {
        Ok(line) => Ok(line.map(InputLine::Text)),
        Err(LinesCodecError::MaxLineLengthExceeded) => Ok(Some(InputLine::TooLong)),
        // LinesCodec reports invalid UTF-8 as InvalidData after consuming the line
        Err(LinesCodecError::Io(e)) if e.kind() == io::ErrorKind::InvalidData => {
            Ok(Some(InputLine::NotUtf8))
        }
        Err(LinesCodecError::Io(e)) => Err(e),
    }
}
