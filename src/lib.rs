//! wslocate - Search the WSL locate index from Windows
//!
//! A thin desktop front-end over `locate` running inside the Windows Subsystem
//! for Linux. Searches run as `wsl locate ...` on a background thread and come
//! back through an inbox the UI drains every frame; a double-click translates
//! the hit with `wslpath -w` and selects it in Explorer.
//!
//! # Requirements
//!
//! - A WSL distribution with `locate` (or `plocate`) installed
//! - The index built with `sudo updatedb`
//! - Windows drives mounted inside WSL (`/mnt/c`, `/mnt/d`, ...)
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use wslocate::{BridgeConfig, Dispatch, Dispatcher, Inbox, SearchOptions, SearchRequest, SystemRunner};
//!
//! fn main() -> wslocate::Result<()> {
//!     let inbox = Inbox::new();
//!     let dispatcher = Dispatcher::new(Arc::new(SystemRunner), BridgeConfig::default(), inbox.sender());
//!
//!     dispatcher.dispatch(SearchRequest::new(1, "report", SearchOptions::default())?);
//!
//!     if let Some(message) = inbox.recv_timeout(Duration::from_secs(30)) {
//!         println!("{:?}", message);
//!     }
//!     Ok(())
//! }
//! ```

pub mod bridge;
pub mod dispatcher;
pub mod error;
pub mod gui;
pub mod inbox;
pub mod logging;
pub mod presenter;

use std::time::Duration;

// Re-export main types
pub use bridge::{CapturedOutput, CommandRunner, CommandSpec, SystemRunner};
pub use dispatcher::{Dispatch, Dispatcher, SearchOptions, SearchRequest};
pub use error::{LocateError, Result};
pub use inbox::{Inbox, InboxMessage, InboxSender, RevealOutcome, SearchOutcome};
pub use presenter::{Presenter, ViewState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// How often the UI drains the inbox
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Where the external programs live and how they are called
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Entry point into WSL
    pub bridge_program: String,
    /// Distribution passed as `wsl -d <name>`; `None` uses the default one
    pub distribution: Option<String>,
    /// Indexed search tool inside WSL
    pub locate_tool: String,
    /// Path converter inside WSL
    pub path_tool: String,
    /// Switch asking `path_tool` for a Windows path
    pub host_syntax_flag: String,
    /// Host file manager
    pub explorer_program: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            bridge_program: "wsl".to_string(),
            distribution: None,
            locate_tool: "locate".to_string(),
            path_tool: "wslpath".to_string(),
            host_syntax_flag: "-w".to_string(),
            explorer_program: "explorer.exe".to_string(),
        }
    }
}

impl BridgeConfig {
    /// Default programs, run in `distribution` when given
    pub fn with_distribution(distribution: Option<String>) -> Self {
        Self {
            distribution: distribution.filter(|d| !d.trim().is_empty()),
            ..Self::default()
        }
    }
}
