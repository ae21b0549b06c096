use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use serde_json::Value;

pub struct McpServerProcess {
    child: Child,
    stdin: ChildStdin,
    rx: mpsc::Receiver<String>,
}

impl McpServerProcess {
    pub fn spawn(root: &Path, cscope: &Path) -> Self {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_csnav"));
        cmd.arg("--cscope")
            .arg(cscope)
            .arg("server")
            .current_dir(root)
            .env("XDG_CONFIG_HOME", root.join("xdg"))
            .env("HOME", root)
            .env_remove("CSNAV_LOG_PATH")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());

        let mut child = cmd.spawn().expect("Failed to start csnav server");

        let stdin = child.stdin.take().expect("Failed to take stdin");
        let stdout = child.stdout.take().expect("Failed to take stdout");

        let (tx, rx) = mpsc::channel::<String>();
        thread::spawn(move || {
            let mut reader = BufReader::new(stdout);
            loop {
                let mut line = String::new();
                match reader.read_line(&mut line) {
                    Ok(0) => break,
                    Ok(_) => {
                        let _ = tx.send(line);
                    }
                    Err(_) => break,
                }
            }
        });

        Self { child, stdin, rx }
    }

    pub fn send_line(&mut self, line: &str) {
        writeln!(self.stdin, "{line}").expect("Failed to write to server stdin");
        self.stdin.flush().expect("Failed to flush server stdin");
    }

    pub fn recv_json(&mut self, timeout: Duration) -> Option<Value> {
        let line = self.rx.recv_timeout(timeout).ok()?;
        serde_json::from_str::<Value>(line.trim()).ok()
    }

    pub fn initialize(&mut self) -> Value {
        let init_request = r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"test","version":"1.0"}}}"#;
        self.send_line(init_request);
        let resp = self
            .recv_json(Duration::from_secs(5))
            .expect("No initialize response from server");

        // MCP requires a `notifications/initialized` notification after successful initialize.
        let initialized = r#"{"jsonrpc":"2.0","method":"notifications/initialized","params":{}}"#;
        self.send_line(initialized);

        resp
    }

    /// Call a tool and return the JSON document carried in its first text content.
    pub fn call_tool(&mut self, id: u64, name: &str, arguments: Value) -> Value {
        let req = serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "tools/call",
            "params": { "name": name, "arguments": arguments },
        });
        self.send_line(&req.to_string());

        let deadline = Duration::from_secs(10);
        let start = std::time::Instant::now();
        let msg = loop {
            let remaining = deadline.saturating_sub(start.elapsed());
            let Some(msg) = self.recv_json(remaining) else {
                panic!("Timed out waiting for tools/call response");
            };
            if msg.get("id").and_then(|v| v.as_u64()) == Some(id) {
                break msg;
            }
        };

        assert!(msg.get("error").is_none(), "tool {name} failed: {msg}");
        let text = msg["result"]["content"][0]["text"]
            .as_str()
            .unwrap_or_else(|| panic!("no text content in {msg}"));
        serde_json::from_str(text).expect("tool result is JSON")
    }

    pub fn kill(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

impl Drop for McpServerProcess {
    fn drop(&mut self) {
        self.kill();
    }
}
