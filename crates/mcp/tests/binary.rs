// End-to-end checks of the kuaidi100-mcp binary over real stdio

use std::io::Write;
use std::process::{Command, Output, Stdio};

fn run_binary(api_key: Option<&str>, stdin: &str) -> Output {
    // Run from an empty directory so no stray .env is picked up
    let workdir = tempfile::tempdir().unwrap();

    let mut command = Command::new(env!("CARGO_BIN_EXE_kuaidi100-mcp"));
    command
        .current_dir(workdir.path())
        .env_remove("KUAIDI100_API_KEY")
        .env_remove("KUAIDI100_API_BASE_URL")
        .env("RUST_LOG", "info")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(key) = api_key {
        command.env("KUAIDI100_API_KEY", key);
    }

    let mut child = command.spawn().unwrap();
    {
        let mut child_stdin = child.stdin.take().unwrap();
        // The process may already have exited; a broken pipe is fine here.
        let _ = child_stdin.write_all(stdin.as_bytes());
    }
    child.wait_with_output().unwrap()
}

#[test]
fn test_missing_api_key_exits_with_failure() {
    let output = run_binary(
        None,
        "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"tools/list\"}\n",
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("KUAIDI100_API_KEY"));
}

#[test]
fn test_lists_tools_and_exits_cleanly_on_eof() {
    let output = run_binary(
        Some("test-key"),
        concat!(
            "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"initialize\",\"params\":",
            "{\"protocolVersion\":\"2025-03-26\",\"capabilities\":{},",
            "\"clientInfo\":{\"name\":\"it\",\"version\":\"1\"}}}\n",
            "{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n",
            "{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"tools/list\"}\n",
        ),
    );

    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let responses: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(responses.len(), 2);

    let init = responses.iter().find(|r| r["id"] == 1).unwrap();
    assert_eq!(init["result"]["protocolVersion"], "2025-03-26");

    let list = responses.iter().find(|r| r["id"] == 2).unwrap();
    let names: Vec<&str> = list["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec![
            "query_trace",
            "estimate_time",
            "estimate_time_with_logistic",
            "estimate_price"
        ]
    );
}
