use crate::error::{ExtenderError, Result};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::Mutex as StdMutex;

#[cfg(windows)]
use std::os::windows::process::CommandExt;

/// Windows flag to prevent child processes from creating visible console windows.
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x08000000;

/// Create a Command that won't spawn a visible console window on Windows.
pub fn hidden_command<S: AsRef<std::ffi::OsStr>>(program: S) -> Command {
    let mut cmd = Command::new(program);
    #[cfg(windows)]
    cmd.creation_flags(CREATE_NO_WINDOW);
    cmd
}

// ---------------------------------------------------------------------------
// Global child-process tracker -- lets us kill orphaned FFmpeg on app exit
// ---------------------------------------------------------------------------
static ACTIVE_PIDS: StdMutex<Vec<u32>> = StdMutex::new(Vec::new());

pub fn register_pid(pid: u32) {
    if let Ok(mut pids) = ACTIVE_PIDS.lock() {
        pids.push(pid);
    }
}

pub fn unregister_pid(pid: u32) {
    if let Ok(mut pids) = ACTIVE_PIDS.lock() {
        pids.retain(|&p| p != pid);
    }
}

/// Kill every tracked child process. Called on window close / app exit.
pub fn kill_all_children() {
    if let Ok(mut pids) = ACTIVE_PIDS.lock() {
        for pid in pids.drain(..) {
            log::info!("killing child process {}", pid);
            #[cfg(windows)]
            let mut cmd = {
                // /F = force, /T = kill child tree
                let mut c = hidden_command("taskkill");
                c.args(["/F", "/T", "/PID", &pid.to_string()]);
                c
            };
            #[cfg(not(windows))]
            let mut cmd = {
                let mut c = hidden_command("kill");
                c.args(["-KILL", &pid.to_string()]);
                c
            };
            let _ = cmd.stdout(Stdio::null()).stderr(Stdio::null()).status();
        }
    }
}

/// Executable file name for the current platform (`ffmpeg` -> `ffmpeg.exe` on Windows).
pub fn executable_name(stem: &str) -> String {
    format!("{}{}", stem, std::env::consts::EXE_SUFFIX)
}

/// The two executables a tool directory must hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl ToolPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            ffmpeg: dir.join(executable_name("ffmpeg")),
            ffprobe: dir.join(executable_name("ffprobe")),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.ffmpeg.is_file() && self.ffprobe.is_file()
    }
}

/// Spawn a command, track its PID, wait for output, then untrack.
/// If the app exits mid-process, `kill_all_children()` will clean it up.
pub fn tracked_output(mut cmd: Command) -> io::Result<std::process::Output> {
    let child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let pid = child.id();
    register_pid(pid);
    let output = child.wait_with_output();
    unregister_pid(pid);
    output
}

/// Spawn a command and hand every stdout/stderr line to `on_line` as it is
/// produced. Returns the exit status once both pipes are drained.
pub fn tracked_streaming(
    mut cmd: Command,
    on_line: &(dyn Fn(&str) + Sync),
) -> io::Result<ExitStatus> {
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let pid = child.id();
    register_pid(pid);

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let drained = std::thread::scope(|scope| {
        let stderr_thread = scope.spawn(move || match stderr {
            Some(pipe) => forward_lines(pipe, on_line),
            None => Ok(()),
        });
        let stdout_result = match stdout {
            Some(pipe) => forward_lines(pipe, on_line),
            None => Ok(()),
        };
        let stderr_result = stderr_thread
            .join()
            .unwrap_or_else(|_| Err(io::Error::new(io::ErrorKind::Other, "stderr reader panicked")));
        stdout_result.and(stderr_result)
    });

    let status = child.wait();
    unregister_pid(pid);

    if let Err(e) = drained {
        log::warn!("Lost part of the process output: {}", e);
    }
    status
}

/// Split a byte stream into lines on `\n` or `\r` (ffmpeg redraws its stats
/// line with carriage returns). Lines are trimmed; blank ones are skipped.
fn forward_lines<R: Read>(mut reader: R, on_line: &(dyn Fn(&str) + Sync)) -> io::Result<()> {
    let mut pending: Vec<u8> = Vec::new();
    let mut chunk = [0u8; 4096];

    let flush = |pending: &mut Vec<u8>| {
        let line = String::from_utf8_lossy(pending);
        let line = line.trim();
        if !line.is_empty() {
            on_line(line);
        }
        pending.clear();
    };

    loop {
        let read = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                flush(&mut pending);
                return Err(e);
            }
        };
        for &byte in &chunk[..read] {
            if byte == b'\n' || byte == b'\r' {
                flush(&mut pending);
            } else {
                pending.push(byte);
            }
        }
    }
    flush(&mut pending);
    Ok(())
}

/// Get the container duration in seconds using ffprobe.
pub fn probe_duration(ffprobe: &Path, input: &Path) -> Result<f64> {
    let mut cmd = hidden_command(ffprobe);
    cmd.args([
        "-v", "error",
        "-show_entries", "format=duration",
        "-of", "default=noprint_wrappers=1:nokey=1",
    ])
    .arg(input);

    let output = tracked_output(cmd)
        .map_err(|e| ExtenderError::Probe(format!("Failed to run ffprobe: {}", e)))?;

    if !output.status.success() {
        return Err(ExtenderError::Probe(format!(
            "ffprobe failed ({}): {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    parse_duration(&String::from_utf8_lossy(&output.stdout))
}

/// Parse ffprobe's bare `format=duration` value.
pub fn parse_duration(raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    let duration: f64 = trimmed
        .parse()
        .map_err(|_| ExtenderError::Probe(format!("unexpected ffprobe output {:?}", trimmed)))?;

    if !duration.is_finite() || duration <= 0.0 {
        return Err(ExtenderError::Probe(
            "Video has no duration or could not be read.".to_string(),
        ));
    }
    Ok(duration)
}
