use std::error::Error;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use cscope_nav_core::{CscopeTool, GotoOutcome, Navigator, PresetChooser, offset_to_line};
use cscope_nav_fs::{DiskWorkspace, disk_resolver};
use tracing::error;

use crate::chooser::TerminalChooser;
use crate::config::Settings;
use crate::editor::ReportedEditor;

pub type SessionNavigator = Navigator<DiskWorkspace, CscopeTool>;

pub fn build_navigator(settings: &Settings) -> SessionNavigator {
    let resolver = disk_resolver(settings.index.clone(), Some(settings.markers.clone()));
    let tool = CscopeTool::new(&settings.program, settings.timeout);
    Navigator::new(resolver, tool)
}

/// Initialize tracing for CLI commands.
///
/// Logs go to stderr, and respect RUST_LOG or default to `warn`.
pub fn init_tracing_cli() {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Initialize tracing for the MCP server.
///
/// - Never logs to stdout (to keep stdio clean for JSON-RPC).
/// - If `CSNAV_LOG_PATH` is set, append logs to that file.
/// - Otherwise no subscriber is installed.
pub fn init_tracing_server() {
    use std::fs::OpenOptions;
    use std::sync::Mutex;
    use tracing_subscriber::{EnvFilter, fmt};

    let path = match std::env::var("CSNAV_LOG_PATH") {
        Ok(p) if !p.trim().is_empty() => PathBuf::from(p),
        _ => return,
    };

    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => file,
        Err(_) => return,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
}

/// `path:line:offset`, with line 1 when the file can not be read.
pub fn format_position(file: &Path, offset: u64) -> String {
    let line = offset_to_line(file, offset).unwrap_or(1);
    format!("{}:{line}:{offset}", file.display())
}

pub async fn run_resolve(settings: Settings, file: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let navigator = build_navigator(&settings);
    for source in navigator.resolve(file.as_deref()) {
        println!("{}", source.display());
    }
    Ok(())
}

pub async fn run_find(
    settings: Settings,
    file: Option<PathBuf>,
    tag: String,
) -> Result<(), Box<dyn Error>> {
    let navigator = build_navigator(&settings);
    let report = navigator.find(&tag, file.as_deref());

    if report.all_failed() {
        error!(
            "cscope lookup failed for all {} index file(s); is `{}` installed?",
            report.queried,
            settings.program.display()
        );
    }

    for record in report.matches {
        println!(
            "{}:{}: [{}] {}",
            record.file_path.display(),
            record.line_number,
            record.kind,
            record.line_text.trim()
        );
    }
    Ok(())
}

pub async fn run_goto(
    settings: Settings,
    file: Option<PathBuf>,
    offset: u64,
    tag: Option<String>,
    choice: Option<usize>,
) -> Result<(), Box<dyn Error>> {
    let mut navigator = build_navigator(&settings);
    let mut editor = ReportedEditor::new(file, offset);

    let outcome = match choice {
        Some(choice) => {
            // 1-based on the command line, like the interactive prompt.
            let mut chooser = PresetChooser::new(choice.checked_sub(1));
            navigator.goto_tag(&mut editor, &mut chooser, tag.as_deref())
        }
        None => {
            let stdin = io::stdin();
            let mut chooser = TerminalChooser::new(BufReader::new(stdin.lock()), io::stderr());
            navigator.goto_tag(&mut editor, &mut chooser, tag.as_deref())
        }
    };

    for notice in editor.take_notices() {
        eprintln!("{notice}");
    }

    if let GotoOutcome::Jumped(target) = outcome {
        println!("{}", format_position(&target.file_path, target.offset));
    }
    Ok(())
}
