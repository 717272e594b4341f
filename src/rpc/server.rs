use crate::rpc::protocol::{
    CallParams, Request, Response, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR,
};
use crate::rpc::tools::{call_tool, tool_definitions};
use crate::scrapers::traits::RentalSource;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = env!("CARGO_PKG_NAME");
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Line-delimited JSON-RPC server in front of a [`RentalSource`]
pub struct RpcServer {
    source: Arc<dyn RentalSource>,
}

impl RpcServer {
    pub fn new(source: Arc<dyn RentalSource>) -> Self {
        Self { source }
    }

    /// Read requests until EOF, answering each on its own line.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!(source = self.source.source_name(), "Listening for requests on stdio");
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }
            let response = match std::str::from_utf8(&buf) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => self.handle_line(line.trim()).await,
                Err(e) => {
                    warn!(error = %e, "Input line is not valid UTF-8");
                    Some(Response::failure(Value::Null, PARSE_ERROR, "Parse error"))
                }
            };
            let Some(response) = response else {
                continue;
            };
            let mut out = serde_json::to_string(&response)?;
            out.push('\n');
            writer.write_all(out.as_bytes()).await?;
            writer.flush().await?;
        }
        info!("Input closed, shutting down");
        Ok(())
    }

    /// Answer one raw message. `None` for notifications.
    pub async fn handle_line(&self, line: &str) -> Option<Response> {
        let raw: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Malformed JSON on input");
                return Some(Response::failure(Value::Null, PARSE_ERROR, "Parse error"));
            }
        };
        let request: Request = match serde_json::from_value(raw.clone()) {
            Ok(request) => request,
            Err(e) => {
                let id = raw.get("id").cloned().unwrap_or(Value::Null);
                return Some(Response::failure(id, INVALID_REQUEST, format!("Invalid request: {e}")));
            }
        };

        let Some(id) = request.id.clone() else {
            debug!(method = %request.method, "Notification received");
            return None;
        };
        Some(self.dispatch(id, request).await)
    }

    async fn dispatch(&self, id: Value, request: Request) -> Response {
        debug!(method = %request.method, "Request received");
        match request.method.as_str() {
            "initialize" => Response::success(
                id,
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "serverInfo": { "name": SERVER_NAME, "version": SERVER_VERSION },
                    "capabilities": { "tools": {} }
                }),
            ),
            "ping" => Response::success(id, json!({})),
            "tools/list" => Response::success(id, json!({ "tools": tool_definitions() })),
            "tools/call" => {
                let params = request.params.unwrap_or(Value::Null);
                let call: CallParams = match serde_json::from_value(params) {
                    Ok(call) => call,
                    Err(e) => {
                        return Response::failure(id, INVALID_PARAMS, format!("Invalid params: {e}"))
                    }
                };
                let result = call_tool(self.source.as_ref(), &call.name, call.arguments).await;
                match serde_json::to_value(result) {
                    Ok(value) => Response::success(id, value),
                    Err(e) => Response::failure(id, INTERNAL_ERROR, format!("Unserializable result: {e}")),
                }
            }
            other => Response::failure(id, METHOD_NOT_FOUND, format!("Method not found: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoutConfig;
    use crate::scrapers::cache::SystemClock;
    use crate::scrapers::schema::SiteSchema;
    use crate::scrapers::ChalupyScraper;
    use crate::testing::{fixtures, MockFetcher};
    use tokio::io::BufReader;

    fn server() -> RpcServer {
        let fetcher = MockFetcher::new()
            .with_page("/chalupy/", fixtures::SEARCH_PAGE)
            .with_page("/regiony/", fixtures::REGIONS_PAGE);
        let scraper = ChalupyScraper::with_parts(
            &ScoutConfig::default(),
            Arc::new(fetcher),
            Arc::new(SystemClock),
            SiteSchema::default(),
        )
        .unwrap();
        RpcServer::new(Arc::new(scraper))
    }

    #[tokio::test]
    async fn test_initialize() {
        let response = server()
            .handle_line(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#)
            .await
            .unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "chalupy-scout");
    }

    #[tokio::test]
    async fn test_tools_list() {
        let response = server()
            .handle_line(r#"{"jsonrpc":"2.0","id":"a","method":"tools/list"}"#)
            .await
            .unwrap();
        assert_eq!(response.id, json!("a"));
        assert_eq!(response.result.unwrap()["tools"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_tools_call_search() {
        let response = server()
            .handle_line(
                r#"{"jsonrpc":"2.0","id":7,"method":"tools/call","params":{"name":"search_chalupy","arguments":{"query":"sauna"}}}"#,
            )
            .await
            .unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["isError"], false);
        let listings: Value = serde_json::from_str(result["content"][0]["text"].as_str().unwrap()).unwrap();
        assert_eq!(listings.as_array().unwrap().len(), 1);
        assert_eq!(listings[0]["title"], "Chalupa U Lesa");
    }

    #[tokio::test]
    async fn test_tool_failure_is_flagged_result_not_protocol_error() {
        let response = server()
            .handle_line(
                r#"{"jsonrpc":"2.0","id":8,"method":"tools/call","params":{"name":"get_property_details","arguments":{"url":"https://example.com/"}}}"#,
            )
            .await
            .unwrap();
        assert!(response.error.is_none());
        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
        assert!(result["content"][0]["text"].as_str().unwrap().starts_with("Invalid URL"));
    }

    #[tokio::test]
    async fn test_protocol_errors() {
        let server = server();

        let response = server.handle_line("{not json").await.unwrap();
        assert_eq!(response.id, Value::Null);
        assert_eq!(response.error.unwrap().code, PARSE_ERROR);

        let response = server
            .handle_line(r#"{"jsonrpc":"2.0","id":2,"method":"resources/list"}"#)
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, METHOD_NOT_FOUND);

        let response = server
            .handle_line(r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"arguments":{}}}"#)
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, INVALID_PARAMS);

        let response = server.handle_line(r#"{"jsonrpc":"2.0","id":4}"#).await.unwrap();
        assert_eq!(response.id, json!(4));
        assert_eq!(response.error.unwrap().code, INVALID_REQUEST);
    }

    #[tokio::test]
    async fn test_notifications_get_no_response() {
        let response = server()
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_null_id_is_answered() {
        let response = server()
            .handle_line(r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#)
            .await
            .unwrap();
        assert_eq!(response.id, Value::Null);
        assert_eq!(response.result, Some(json!({})));
    }

    #[tokio::test]
    async fn test_serve_survives_undecodable_line() {
        let mut input = Vec::new();
        input.extend_from_slice(br#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#);
        input.push(b'\n');
        input.extend_from_slice(b"{\"x\":\"\xff\xfe\"}\n");
        input.extend_from_slice(br#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#);
        input.push(b'\n');

        let mut output = Vec::new();
        server()
            .serve(BufReader::new(input.as_slice()), &mut output)
            .await
            .unwrap();

        let lines: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["id"], 1);
        assert_eq!(lines[1]["id"], Value::Null);
        assert_eq!(lines[1]["error"]["code"], PARSE_ERROR);
        assert_eq!(lines[2]["id"], 2);
        assert_eq!(lines[2]["result"], json!({}));
    }

    #[tokio::test]
    async fn test_serve_over_streams() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"list_regions"}}"#,
            "\n",
        );
        let mut output = Vec::new();
        server()
            .serve(BufReader::new(input.as_bytes()), &mut output)
            .await
            .unwrap();

        let lines: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["id"], 1);
        assert_eq!(lines[0]["result"], json!({}));
        assert_eq!(lines[1]["id"], 2);
        assert_eq!(lines[1]["result"]["isError"], false);
        assert!(lines[1]["result"]["content"][0]["text"]
            .as_str()
            .unwrap()
            .contains("krkonose"));
    }
}
