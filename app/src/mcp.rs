use std::error::Error;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use cscope_nav_core::{GotoOutcome, JumpPosition, MatchRecord, PresetChooser, offset_to_line};
use rmcp::{
    ErrorData as McpError, ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    tool, tool_handler, tool_router,
    transport::stdio,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::task;
use tracing::{error, info};

use crate::cli::{SessionNavigator, build_navigator};
use crate::config::Settings;
use crate::editor::ReportedEditor;

#[derive(Clone)]
pub struct NavServer {
    navigator: Arc<Mutex<SessionNavigator>>,
    tool_router: ToolRouter<NavServer>,
}

impl NavServer {
    fn internal_error(code: &str, message: impl Into<String>) -> McpError {
        let full = format!("{code}: {}", message.into());
        McpError::internal_error(full, None)
    }

    /// Run `f` against the session navigator on the blocking pool.
    async fn with_navigator<F, R>(&self, f: F) -> Result<R, McpError>
    where
        F: FnOnce(&mut SessionNavigator) -> R + Send + 'static,
        R: Send + 'static,
    {
        let navigator = Arc::clone(&self.navigator);
        task::spawn_blocking(move || {
            let mut guard = navigator.lock().unwrap_or_else(PoisonError::into_inner);
            f(&mut guard)
        })
        .await
        .map_err(|e| Self::internal_error("navigation_task_failed", e.to_string()))
    }

    fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
        let text = serde_json::to_string_pretty(value)
            .map_err(|e| Self::internal_error("encode_failed", e.to_string()))?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

#[derive(Deserialize, JsonSchema)]
pub struct GotoTagArgs {
    /// File currently open in the editor.
    #[serde(default)]
    pub file: Option<PathBuf>,
    /// Caret byte offset in that file.
    #[serde(default)]
    pub offset: Option<u64>,
    /// Symbol to jump to; defaults to the word at the caret.
    #[serde(default)]
    pub tag: Option<String>,
    /// 0-based index into `candidates` of an earlier ambiguous answer.
    #[serde(default)]
    pub choice: Option<usize>,
}

#[derive(Deserialize, JsonSchema)]
pub struct FindTagArgs {
    pub tag: String,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct Location {
    pub file: PathBuf,
    pub offset: u64,
    pub line: u32,
}

impl From<&JumpPosition> for Location {
    fn from(position: &JumpPosition) -> Self {
        Self {
            file: position.file_path.clone(),
            offset: position.offset,
            line: offset_to_line(&position.file_path, position.offset).unwrap_or(1),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Candidate {
    pub index: usize,
    pub kind: String,
    pub file: PathBuf,
    pub line: u32,
    pub text: String,
}

impl Candidate {
    /// Rebuild a candidate from a chooser row: kind, file, line, text.
    fn from_row((index, row): (usize, &Vec<String>)) -> Self {
        let cell = |i: usize| row.get(i).cloned().unwrap_or_default();
        Self {
            index,
            kind: cell(0),
            file: PathBuf::from(cell(1)),
            line: cell(2).parse().unwrap_or(1),
            text: cell(3),
        }
    }
}

fn candidates(matches: Vec<MatchRecord>) -> Vec<Candidate> {
    matches
        .into_iter()
        .enumerate()
        .map(|(index, record)| Candidate {
            index,
            kind: record.kind,
            file: record.file_path,
            line: record.line_number,
            text: record.line_text,
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct GotoResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<Location>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<Candidate>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MoveResponse {
    pub moved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<Location>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub position: usize,
    pub entries: Vec<Location>,
}

#[tool_router]
impl NavServer {
    pub fn new(navigator: SessionNavigator) -> Self {
        Self {
            navigator: Arc::new(Mutex::new(navigator)),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Jump to the definition of a symbol using cscope indexes, recording the departure and arrival in the session's jump history. When several matches exist and no `choice` is given, returns status `cancelled` with the candidate list; call again with `choice` set to a candidate index."
    )]
    pub async fn goto_tag(
        &self,
        Parameters(args): Parameters<GotoTagArgs>,
    ) -> Result<CallToolResult, McpError> {
        let response = self
            .with_navigator(move |navigator| {
                let mut editor = ReportedEditor::new(args.file, args.offset.unwrap_or(0));
                let mut chooser = PresetChooser::new(args.choice);
                let outcome = navigator.goto_tag(&mut editor, &mut chooser, args.tag.as_deref());

                let offered = if outcome == GotoOutcome::Cancelled {
                    chooser.offered().iter().enumerate().map(Candidate::from_row).collect()
                } else {
                    Vec::new()
                };

                GotoResponse {
                    status: outcome.status(),
                    target: match &outcome {
                        GotoOutcome::Jumped(target) => Some(Location::from(target)),
                        _ => None,
                    },
                    candidates: offered,
                    notices: editor.take_notices(),
                }
            })
            .await?;

        Self::json_result(&response)
    }

    #[tool(description = "List every cscope match for a symbol without moving or touching history.")]
    pub async fn find_tag(
        &self,
        Parameters(args): Parameters<FindTagArgs>,
    ) -> Result<CallToolResult, McpError> {
        let matches = self
            .with_navigator(move |navigator| {
                navigator.find(&args.tag, args.file.as_deref()).matches
            })
            .await?;

        Self::json_result(&candidates(matches))
    }

    #[tool(description = "Step back in the session's jump history.")]
    pub async fn jump_back(&self) -> Result<CallToolResult, McpError> {
        let response = self
            .with_navigator(|navigator| {
                let mut editor = ReportedEditor::default();
                let target = navigator.back(&mut editor);
                MoveResponse {
                    moved: target.is_some(),
                    target: target.as_ref().map(Location::from),
                }
            })
            .await?;

        Self::json_result(&response)
    }

    #[tool(description = "Step forward in the session's jump history.")]
    pub async fn jump_forward(&self) -> Result<CallToolResult, McpError> {
        let response = self
            .with_navigator(|navigator| {
                let mut editor = ReportedEditor::default();
                let target = navigator.forward(&mut editor);
                MoveResponse {
                    moved: target.is_some(),
                    target: target.as_ref().map(Location::from),
                }
            })
            .await?;

        Self::json_result(&response)
    }

    #[tool(description = "Show the session's jump history and the current position in it (1-based, 0 when empty).")]
    pub async fn jump_history(&self) -> Result<CallToolResult, McpError> {
        let response = self
            .with_navigator(|navigator| {
                let history = navigator.history();
                HistoryResponse {
                    position: history.position(),
                    entries: history.entries().iter().map(Location::from).collect(),
                }
            })
            .await?;

        Self::json_result(&response)
    }
}

#[tool_handler]
impl ServerHandler for NavServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "cscope navigation server. Use `goto_tag` to jump to a symbol's definition from the file and offset the editor is at, then `jump_back` and `jump_forward` to replay the session's jump history."
                    .to_string(),
            ),
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
        }
    }
}

pub async fn run_server(settings: Settings) -> Result<(), Box<dyn Error>> {
    info!("csnav MCP server starting");
    info!("lookup program: {}", settings.program.display());

    let server = NavServer::new(build_navigator(&settings));

    let service = server
        .serve(stdio())
        .await
        .inspect_err(|e| error!("csnav MCP serve error: {e:?}"))?;

    service.waiting().await?;

    Ok(())
}
