//! # taskweb
//!
//! A terminal client for a task-management REST API. The interactive TUI walks
//! through the same screens as a browser client (home, login, registration and
//! a task dashboard), and every dashboard action is also available as a CLI
//! subcommand.
//!
//! ## Usage
//!
//! ### Interactive Mode (TUI)
//!
//! ```bash
//! taskweb
//! # or explicitly
//! taskweb ui
//! ```
//!
//! #### Dashboard Key Bindings
//!
//! *   `a`: Open/close the "Create New Task" panel
//! *   `Space` / `t`: Toggle status (pending <-> completed)
//! *   `e`: Edit title
//! *   `d`: Delete (asks for confirmation)
//! *   `r`: Refresh
//! *   `o`: Logout
//! *   `q`: Quit
//!
//! ### Command Line Interface (CLI)
//!
//! ```bash
//! taskweb register alice        # prompts for password and confirmation
//! taskweb login alice           # prompts for password
//! taskweb add "Buy milk" --priority high
//! taskweb list
//! taskweb toggle 1
//! taskweb remove 1
//! taskweb logout
//! ```
//!
//! ## Server
//!
//! Defaults to `http://localhost:8000`. Override with `--api-url`, the
//! `TASKWEB_API_URL` environment variable, or `api_url` in
//! `~/.config/taskweb/config.toml`.
//!
//! ## Session Storage
//!
//! The credential and username are saved in `~/.local/share/taskweb/session.json`
//! (override with `TASKWEB_SESSION`). `taskweb logout` removes both.
//!
//! ## Logs
//!
//! Written to `taskweb.log` next to the session file. Set `TASKWEB_LOG=debug`
//! to see every request.

use std::io;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};

use taskweb::api::ApiClient;
use taskweb::commands::*;
use taskweb::config::Config;
use taskweb::models::{Priority, Status};
use taskweb::session::SessionStore;
use taskweb::tui::run_tui;
use taskweb::logging;

#[derive(Parser)]
#[command(name = "taskweb")]
#[command(about = "Terminal client for a task-management server", long_about = None)]
struct Cli {
    /// Base URL of the task server
    #[arg(long, global = true, env = "TASKWEB_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and sign in
    Register {
        username: String,
        /// Read from stdin when omitted
        #[arg(short, long)]
        password: Option<String>,
        /// Password confirmation, read from stdin when omitted
        #[arg(short, long)]
        confirm: Option<String>,
    },
    /// Sign in and store the session
    Login {
        username: String,
        /// Read from stdin when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Print the signed-in username
    Whoami,
    /// List your tasks
    List,
    /// Add a new task
    Add {
        /// Task title (quoted if it has spaces)
        title: String,
        #[arg(short, long)]
        description: Option<String>,
        /// low, medium or high
        #[arg(short, long)]
        priority: Option<Priority>,
    },
    /// Toggle a task between pending and completed
    Toggle {
        id: u64,
    },
    /// Edit a task
    Edit {
        id: u64,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        /// pending or completed
        #[arg(short, long)]
        status: Option<Status>,
        /// low, medium or high
        #[arg(short, long)]
        priority: Option<Priority>,
    },
    /// Remove a task
    Remove {
        id: u64,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: Shell,
    },
    /// Open interactive TUI
    Ui,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging::init();

    let config = Config::load()?.with_api_url(cli.api_url);
    let session = SessionStore::persistent();
    let api = ApiClient::new(config.api_url, session.clone());
    tracing::debug!(api_url = api.base_url(), "starting");

    match cli.command {
        Some(Commands::Register { username, password, confirm }) => {
            let password = secret_or_prompt(password, "Password").unwrap_or_default();
            let confirm = secret_or_prompt(confirm, "Confirm Password").unwrap_or_default();
            cmd_register(&api, &session, username, password, confirm).await
        }
        Some(Commands::Login { username, password }) => {
            let password = secret_or_prompt(password, "Password").unwrap_or_default();
            cmd_login(&api, &session, username, password).await
        }
        Some(Commands::Logout) => cmd_logout(&session),
        Some(Commands::Whoami) => cmd_whoami(&session),
        Some(Commands::List) => cmd_list(&api, &session).await,
        Some(Commands::Add { title, description, priority }) => cmd_add(&api, &session, title, description, priority).await,
        Some(Commands::Toggle { id }) => cmd_toggle(&api, &session, id).await,
        Some(Commands::Edit { id, title, description, status, priority }) => {
            cmd_edit(&api, &session, id, title, description, status, priority).await
        }
        Some(Commands::Remove { id, force }) => cmd_remove(&api, &session, id, force).await,
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "taskweb", &mut io::stdout());
        }
        Some(Commands::Ui) | None => run_tui(api, session).await?,
    }
    Ok(())
}
