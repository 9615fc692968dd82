//! Search Dispatcher
//!
//! Turns a [`SearchRequest`] into one `wsl locate ...` invocation, runs it on a
//! fresh background thread and posts exactly one [`SearchOutcome`] to the inbox.
//! Nothing here ever blocks the caller.

use crate::bridge::{self, CommandRunner, CommandSpec};
use crate::error::{LocateError, Result};
use crate::inbox::{InboxMessage, InboxSender, RevealOutcome, SearchOutcome};
use crate::logging;
use crate::BridgeConfig;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

/// locate switches, one per checkbox
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// `--ignore-case`
    pub ignore_case: bool,
    /// `--existing`
    pub existing_only: bool,
    /// `--basename`
    pub basename_only: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            ignore_case: true,
            existing_only: true,
            basename_only: false,
        }
    }
}

/// One search, immutable once built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    seq: u64,
    term: String,
    options: SearchOptions,
}

impl SearchRequest {
    /// Fails with [`LocateError::EmptyTerm`] for an empty term
    pub fn new(seq: u64, term: impl Into<String>, options: SearchOptions) -> Result<Self> {
        let term = term.into();
        if term.is_empty() {
            return Err(LocateError::EmptyTerm);
        }
        Ok(Self { seq, term, options })
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn options(&self) -> SearchOptions {
        self.options
    }
}

/// `wsl [-d distro] --exec locate [--ignore-case] [--existing] [--basename] <term>`
pub fn search_command(config: &BridgeConfig, request: &SearchRequest) -> CommandSpec {
    let mut spec = bridge::bridge_command(config).arg(&config.locate_tool);

    let options = request.options();
    if options.ignore_case {
        spec = spec.arg("--ignore-case");
    }
    if options.existing_only {
        spec = spec.arg("--existing");
    }
    if options.basename_only {
        spec = spec.arg("--basename");
    }

    spec.arg(request.term())
}

/// Split locate's stdout into paths, dropping blank lines and CRLF leftovers
pub fn parse_locate_output(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Run one search synchronously on the calling thread
///
/// locate exits with status 1 when nothing matches, so a non-zero exit is only a
/// failure when it printed no paths and did complain on stderr. A UTF-16
/// message from `wsl.exe` on stdout is always a failure.
pub fn run_search(runner: &dyn CommandRunner, config: &BridgeConfig, request: &SearchRequest) -> SearchOutcome {
    let spec = search_command(config, request);

    let output = match runner.capture(&spec) {
        Ok(output) => output,
        Err(e) => return SearchOutcome::Failure(e.to_string()),
    };

    let stdout = match output.stdout_text(&spec.program) {
        Ok(text) => text,
        Err(e) => return SearchOutcome::Failure(e.to_string()),
    };

    let paths = parse_locate_output(&stdout);
    if paths.is_empty() && !output.success {
        let stderr = output.stderr_text();
        if !stderr.is_empty() {
            return SearchOutcome::Failure(
                LocateError::ToolFailed {
                    program: config.locate_tool.clone(),
                    code: output.code,
                    stderr,
                }
                .to_string(),
            );
        }
    }

    SearchOutcome::Results(paths)
}

/// Background work the presenter can ask for
pub trait Dispatch {
    /// Start `request`; its outcome arrives later on the inbox
    fn dispatch(&self, request: SearchRequest);

    /// Translate `wsl_path` and select it in Explorer; the outcome arrives on the inbox
    fn reveal(&self, wsl_path: String);
}

/// [`Dispatch`] that runs each job on its own short-lived thread
#[derive(Clone)]
pub struct Dispatcher {
    runner: Arc<dyn CommandRunner>,
    config: Arc<BridgeConfig>,
    inbox: InboxSender,
}

impl Dispatcher {
    pub fn new(runner: Arc<dyn CommandRunner>, config: BridgeConfig, inbox: InboxSender) -> Self {
        Self {
            runner,
            config: Arc::new(config),
            inbox,
        }
    }

    /// Run `job` on a new thread. Panics and spawn failures are turned into a
    /// message by `on_fault`, so every job posts exactly one message.
    fn spawn_job<J, F>(&self, name: &str, job: J, on_fault: F)
    where
        J: FnOnce(&dyn CommandRunner, &BridgeConfig) -> InboxMessage + Send + 'static,
        F: Fn(String) -> InboxMessage + Send + Sync + 'static,
    {
        let runner = Arc::clone(&self.runner);
        let config = Arc::clone(&self.config);
        let inbox = self.inbox.clone();

        // on_fault is needed on both sides of the spawn; share it
        let on_fault = Arc::new(on_fault);
        let worker_fault = Arc::clone(&on_fault);

        let spawned = thread::Builder::new().name(name.to_string()).spawn(move || {
            let message = panic::catch_unwind(AssertUnwindSafe(|| job(runner.as_ref(), &*config)))
                .unwrap_or_else(|payload| {
                    let reason = LocateError::WorkerPanicked(panic_message(payload.as_ref())).to_string();
                    logging::error("DISPATCH", &reason);
                    worker_fault(reason)
                });
            inbox.post(message);
        });

        if let Err(e) = spawned {
            let reason = format!("Failed to start background worker: {}", e);
            logging::error("DISPATCH", &reason);
            self.inbox.post(on_fault(reason));
        }
    }
}

impl Dispatch for Dispatcher {
    fn dispatch(&self, request: SearchRequest) {
        let seq = request.seq();
        logging::info(
            "DISPATCH",
            &format!("#{}: {}", seq, search_command(&self.config, &request).display()),
        );

        self.spawn_job(
            "locate-search",
            move |runner, config| {
                let outcome = run_search(runner, config, &request);
                match &outcome {
                    SearchOutcome::Results(paths) => {
                        logging::info("DISPATCH", &format!("#{}: {} paths", seq, paths.len()))
                    }
                    SearchOutcome::Failure(message) => {
                        logging::warn("DISPATCH", &format!("#{}: {}", seq, message))
                    }
                }
                InboxMessage::Search { seq, outcome }
            },
            move |reason| InboxMessage::Search {
                seq,
                outcome: SearchOutcome::Failure(reason),
            },
        );
    }

    fn reveal(&self, wsl_path: String) {
        let fault_path = wsl_path.clone();
        self.spawn_job(
            "explorer-reveal",
            move |runner, config| match bridge::reveal_in_explorer(runner, config, &wsl_path) {
                Ok(host_path) => InboxMessage::Reveal(RevealOutcome::Revealed { wsl_path, host_path }),
                Err(e) => {
                    logging::warn("DISPATCH", &format!("reveal {} failed: {}", wsl_path, e));
                    InboxMessage::Reveal(RevealOutcome::Failed {
                        wsl_path,
                        message: e.to_string(),
                    })
                }
            },
            move |message| {
                InboxMessage::Reveal(RevealOutcome::Failed {
                    wsl_path: fault_path.clone(),
                    message,
                })
            },
        );
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
