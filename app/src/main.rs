use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

mod chooser;
mod cli;
mod config;
mod editor;
mod mcp;

use crate::cli::{init_tracing_cli, init_tracing_server, run_find, run_goto, run_resolve};
use crate::config::{Overrides, Settings};
use crate::mcp::run_server;

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the index files that apply to a file, in search order
    Resolve {
        /// File being edited (defaults to the current directory context)
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Print every match for a symbol
    Find {
        /// File being edited
        #[arg(long)]
        file: Option<PathBuf>,
        /// Symbol to look up
        tag: String,
    },
    /// Pick one match and print its location as path:line:offset
    Goto {
        /// File being edited
        #[arg(long)]
        file: Option<PathBuf>,
        /// Caret byte offset in the file, used for the default tag
        #[arg(long, default_value_t = 0)]
        offset: u64,
        /// 1-based match to take when there are several (skips the prompt)
        #[arg(long)]
        choice: Option<usize>,
        /// Symbol to look up (defaults to the word at --offset)
        tag: Option<String>,
    },
    /// Run MCP server over stdio, keeping jump history for the session
    Server,
}

#[derive(Args, Debug)]
struct GlobalOpts {
    /// Extra configuration file layered over the user config
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Lookup program to run
    #[arg(long, global = true)]
    cscope: Option<PathBuf>,
    /// Per-index lookup timeout in milliseconds
    #[arg(long = "timeout-ms", global = true)]
    timeout_ms: Option<u64>,
}

#[derive(Parser, Debug)]
#[command(
    name = "csnav",
    about = "csnav: jump to cscope symbol definitions with back/forward history",
    version,
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,
    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    match &args.command {
        // For MCP server, never log to stdout; optionally log to a file
        // if CSNAV_LOG_PATH is set.
        Command::Server => init_tracing_server(),
        _ => init_tracing_cli(),
    }

    let flags = Overrides {
        program: args.global.cscope,
        timeout_ms: args.global.timeout_ms,
    };
    let settings = Settings::load(args.global.config.as_deref(), flags)?;

    match args.command {
        Command::Resolve { file } => {
            run_resolve(settings, file).await?;
        }
        Command::Find { file, tag } => {
            run_find(settings, file, tag).await?;
        }
        Command::Goto {
            file,
            offset,
            choice,
            tag,
        } => {
            run_goto(settings, file, offset, tag, choice).await?;
        }
        Command::Server => {
            run_server(settings).await?;
        }
    }

    Ok(())
}
