//! WSL Bridge
//!
//! Runs commands inside WSL (through `wsl.exe`) and on the host shell.
//! Everything that touches `std::process` goes through [`CommandRunner`] so the
//! dispatcher can be driven by a stub in tests.

use crate::error::{LocateError, Result};
use crate::logging;
use crate::BridgeConfig;
use std::process::{Command, Stdio};

/// Windows process creation flag that keeps a console window from flashing up
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x08000000;

/// A program plus its arguments, built before anything is spawned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Pass arguments to the child verbatim, without Rust's quoting (Windows only)
    pub raw_args: bool,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            raw_args: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Full command line, for logs and the status bar
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// What a finished child process left behind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CapturedOutput {
    /// Successful exit with the given stdout
    pub fn ok(stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            success: true,
            code: Some(0),
            stdout: stdout.into(),
            stderr: Vec::new(),
        }
    }

    /// Failed exit with the given code and stderr
    pub fn failed(code: i32, stderr: impl Into<Vec<u8>>) -> Self {
        Self {
            success: false,
            code: Some(code),
            stdout: Vec::new(),
            stderr: stderr.into(),
        }
    }

    /// Decode stdout as UTF-8; `program` names the command in the error.
    ///
    /// NUL bytes never appear in paths or in text from Linux tools. When they
    /// show up, stdout holds a UTF-16 message from `wsl.exe` itself and is
    /// reported as [`LocateError::Bridge`].
    pub fn stdout_text(&self, program: &str) -> Result<String> {
        if self.stdout.contains(&0) {
            return Err(LocateError::Bridge(decode_bridge_text(&self.stdout).trim().to_string()));
        }
        String::from_utf8(self.stdout.clone()).map_err(|_| LocateError::Decode(program.to_string()))
    }

    /// Decode stderr leniently, trimmed
    pub fn stderr_text(&self) -> String {
        decode_bridge_text(&self.stderr).trim().to_string()
    }
}

/// Runs external programs
pub trait CommandRunner: Send + Sync {
    /// Run to completion and capture stdout/stderr
    fn capture(&self, spec: &CommandSpec) -> Result<CapturedOutput>;

    /// Start a program and return without waiting for it
    fn launch(&self, spec: &CommandSpec) -> Result<()>;
}

/// [`CommandRunner`] backed by real processes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    fn command(spec: &CommandSpec) -> Command {
        let mut cmd = Command::new(&spec.program);

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            if spec.raw_args {
                for arg in &spec.args {
                    cmd.raw_arg(arg);
                }
            } else {
                cmd.args(&spec.args);
            }
            cmd.creation_flags(CREATE_NO_WINDOW);
        }

        #[cfg(not(windows))]
        cmd.args(&spec.args);

        cmd
    }
}

impl CommandRunner for SystemRunner {
    fn capture(&self, spec: &CommandSpec) -> Result<CapturedOutput> {
        logging::debug("BRIDGE", &format!("run: {}", spec.display()));

        let output = Self::command(spec)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| LocateError::Spawn {
                program: spec.program.clone(),
                source,
            })?;

        Ok(CapturedOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    fn launch(&self, spec: &CommandSpec) -> Result<()> {
        logging::debug("BRIDGE", &format!("launch: {}", spec.display()));

        Self::command(spec)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|_| ())
            .map_err(LocateError::Explorer)
    }
}

/// Decode text written by `wsl.exe`.
///
/// Messages from `wsl.exe` itself (for example "no distribution installed") come
/// out as UTF-16LE, while output from Linux tools is UTF-8. NUL bytes in odd
/// positions mark the former.
pub fn decode_bridge_text(bytes: &[u8]) -> String {
    let looks_utf16 = bytes.len() >= 2
        && bytes.len() % 2 == 0
        && bytes.iter().skip(1).step_by(2).filter(|&&b| b == 0).count() * 2 >= bytes.len() / 2;

    if looks_utf16 {
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
            .trim_start_matches('\u{feff}')
            .to_string()
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    }
}

/// `wsl [-d distro] --exec`, ready for the Linux program and its arguments.
///
/// `--exec` runs the program directly instead of through the distribution's
/// login shell, so terms and paths reach it without globbing or `$` expansion.
pub fn bridge_command(config: &BridgeConfig) -> CommandSpec {
    let spec = CommandSpec::new(&config.bridge_program);
    let spec = match &config.distribution {
        Some(distro) => spec.arg("-d").arg(distro),
        None => spec,
    };
    spec.arg("--exec")
}

/// `wsl [-d distro] --exec wslpath -w <path>`
pub fn path_translation_command(config: &BridgeConfig, wsl_path: &str) -> CommandSpec {
    bridge_command(config)
        .arg(&config.path_tool)
        .arg(&config.host_syntax_flag)
        .arg(wsl_path)
}

/// `explorer.exe /select,"<path>"`
///
/// explorer.exe wants the path glued to the `/select,` switch and quoted, which
/// Rust's own argument quoting breaks for paths with spaces or parentheses.
pub fn explorer_command(config: &BridgeConfig, host_path: &str) -> CommandSpec {
    let mut spec = CommandSpec::new(&config.explorer_program).arg(format!("/select,\"{}\"", host_path));
    spec.raw_args = true;
    spec
}

/// Convert a WSL path (`/mnt/c/Users/x`) to the host form (`C:\Users\x`)
pub fn translate_path(runner: &dyn CommandRunner, config: &BridgeConfig, wsl_path: &str) -> Result<String> {
    let spec = path_translation_command(config, wsl_path);
    let output = runner.capture(&spec)?;

    let host_path = output.stdout_text(&spec.program)?.trim().to_string();
    if host_path.is_empty() {
        let stderr = output.stderr_text();
        logging::warn("BRIDGE", &format!("wslpath gave nothing for '{}': {}", wsl_path, stderr));
        if !output.success && !stderr.is_empty() {
            return Err(LocateError::ToolFailed {
                program: config.path_tool.clone(),
                code: output.code,
                stderr,
            });
        }
        return Err(LocateError::PathTranslation(wsl_path.to_string()));
    }

    Ok(host_path)
}

/// Translate `wsl_path` and open Explorer with it selected. Returns the host path.
pub fn reveal_in_explorer(runner: &dyn CommandRunner, config: &BridgeConfig, wsl_path: &str) -> Result<String> {
    let host_path = translate_path(runner, config, wsl_path)?;
    runner.launch(&explorer_command(config, &host_path))?;
    logging::info("BRIDGE", &format!("revealed {} as {}", wsl_path, host_path));
    Ok(host_path)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned outputs and records every command it was asked to run
    #[derive(Default)]
    pub struct StubRunner {
        pub captured: Mutex<Vec<CommandSpec>>,
        pub launched: Mutex<Vec<CommandSpec>>,
        pub replies: Mutex<VecDeque<Result<CapturedOutput>>>,
    }

    impl StubRunner {
        pub fn replying(replies: Vec<Result<CapturedOutput>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                ..Default::default()
            }
        }

        pub fn captured(&self) -> Vec<CommandSpec> {
            self.captured.lock().unwrap().clone()
        }

        pub fn launched(&self) -> Vec<CommandSpec> {
            self.launched.lock().unwrap().clone()
        }
    }

    impl CommandRunner for StubRunner {
        fn capture(&self, spec: &CommandSpec) -> Result<CapturedOutput> {
            self.captured.lock().unwrap().push(spec.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(CapturedOutput::ok("")))
        }

        fn launch(&self, spec: &CommandSpec) -> Result<()> {
            self.launched.lock().unwrap().push(spec.clone());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::StubRunner;
    use super::*;

    #[test]
    fn translation_command_shape() {
        let spec = path_translation_command(&BridgeConfig::default(), "/mnt/c/Users/me/report.txt");
        assert_eq!(spec.program, "wsl");
        assert_eq!(spec.args, vec!["--exec", "wslpath", "-w", "/mnt/c/Users/me/report.txt"]);
    }

    #[test]
    fn distribution_goes_before_the_tool() {
        let config = BridgeConfig {
            distribution: Some("Ubuntu-24.04".to_string()),
            ..BridgeConfig::default()
        };
        let spec = path_translation_command(&config, "/tmp/a");
        assert_eq!(
            spec.args,
            vec!["-d", "Ubuntu-24.04", "--exec", "wslpath", "-w", "/tmp/a"]
        );
    }

    #[test]
    fn shell_characters_stay_in_one_argument() {
        let spec = path_translation_command(&BridgeConfig::default(), "/mnt/c/a b/$HOME; rm *.txt");
        assert_eq!(spec.args[0], "--exec");
        assert_eq!(spec.args.last().map(String::as_str), Some("/mnt/c/a b/$HOME; rm *.txt"));
    }

    #[test]
    fn explorer_gets_quoted_select_switch() {
        let spec = explorer_command(&BridgeConfig::default(), r"C:\Program Files\x (1).txt");
        assert_eq!(spec.program, "explorer.exe");
        assert_eq!(spec.args, vec![r#"/select,"C:\Program Files\x (1).txt""#]);
        assert!(spec.raw_args);
    }

    #[test]
    fn translate_trims_output() {
        let runner = StubRunner::replying(vec![Ok(CapturedOutput::ok("C:\\Users\\me\\a.txt\r\n"))]);
        let host = translate_path(&runner, &BridgeConfig::default(), "/mnt/c/Users/me/a.txt").unwrap();
        assert_eq!(host, "C:\\Users\\me\\a.txt");
    }

    #[test]
    fn translate_reports_wslpath_stderr() {
        let runner = StubRunner::replying(vec![Ok(CapturedOutput::failed(
            1,
            "wslpath: /nope: No such file or directory",
        ))]);
        let err = translate_path(&runner, &BridgeConfig::default(), "/nope").unwrap_err();
        assert!(err.to_string().contains("No such file"));
    }

    #[test]
    fn translate_empty_output_is_an_error() {
        let runner = StubRunner::replying(vec![Ok(CapturedOutput::ok("  \n"))]);
        let err = translate_path(&runner, &BridgeConfig::default(), "/x").unwrap_err();
        assert!(matches!(err, LocateError::PathTranslation(p) if p == "/x"));
    }

    #[test]
    fn reveal_launches_explorer_with_host_path() {
        let runner = StubRunner::replying(vec![Ok(CapturedOutput::ok("D:\\data\\report.pdf\n"))]);
        let host = reveal_in_explorer(&runner, &BridgeConfig::default(), "/mnt/d/data/report.pdf").unwrap();
        assert_eq!(host, "D:\\data\\report.pdf");

        let launched = runner.launched();
        assert_eq!(launched.len(), 1);
        assert_eq!(launched[0].args, vec!["/select,\"D:\\data\\report.pdf\""]);
    }

    #[test]
    fn reveal_skips_explorer_when_translation_fails() {
        let runner = StubRunner::replying(vec![Ok(CapturedOutput::ok(""))]);
        assert!(reveal_in_explorer(&runner, &BridgeConfig::default(), "/x").is_err());
        assert!(runner.launched().is_empty());
    }

    #[test]
    fn translate_reports_wsl_exe_message_on_stdout() {
        let message = "There is no distribution with the supplied name.\r\n";
        let stdout: Vec<u8> = message.encode_utf16().flat_map(|u| u.to_le_bytes()).collect();
        let mut output = CapturedOutput::failed(-1, "");
        output.stdout = stdout;
        let runner = StubRunner::replying(vec![Ok(output)]);

        let err = translate_path(&runner, &BridgeConfig::default(), "/mnt/c/a.txt").unwrap_err();

        assert!(matches!(&err, LocateError::Bridge(text) if text == "There is no distribution with the supplied name."));
        assert!(runner.launched().is_empty());
    }

    #[test]
    fn stdout_with_nul_bytes_is_not_text() {
        let output = CapturedOutput::ok(b"/a\0/b\n".to_vec());
        assert!(matches!(output.stdout_text("wsl"), Err(LocateError::Bridge(_))));
    }

    #[test]
    fn decodes_utf16_messages_from_wsl_exe() {
        let message = "Windows Subsystem for Linux has no installed distributions.";
        let bytes: Vec<u8> = message.encode_utf16().flat_map(|u| u.to_le_bytes()).collect();
        assert_eq!(decode_bridge_text(&bytes), message);
    }

    #[test]
    fn decodes_utf8_from_linux_tools() {
        assert_eq!(decode_bridge_text("zażółć\n".as_bytes()), "zażółć\n");
    }

    #[test]
    fn invalid_utf8_stdout_is_decode_error() {
        let output = CapturedOutput::ok(vec![0xff, 0xfe, 0x41]);
        assert!(matches!(output.stdout_text("wsl"), Err(LocateError::Decode(_))));
    }

    #[test]
    fn display_joins_program_and_args() {
        let spec = CommandSpec::new("wsl").arg("locate").arg("x");
        assert_eq!(spec.display(), "wsl locate x");
    }
}
