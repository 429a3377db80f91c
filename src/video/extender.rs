use super::ffmpeg::{self, ToolPaths};
use super::loop_mode::LoopMode;
use crate::error::{ExtenderError, Result};
use std::path::{Path, PathBuf};

/// Concat list written next to the process working directory.
pub const MANIFEST_FILE_NAME: &str = "concat.txt";

/// One "extend this video" request, created per click and consumed by `run`.
#[derive(Debug, Clone)]
pub struct LoopJob {
    pub input: PathBuf,
    pub mode: LoopMode,
    pub tools: ToolPaths,
    pub manifest_path: PathBuf,
}

/// Final result of a successful job.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopOutcome {
    pub output: PathBuf,
    pub repeat: u32,
    pub duration: f64,
}

impl LoopJob {
    pub fn new(input: PathBuf, mode: LoopMode, tools: ToolPaths) -> Self {
        Self {
            input,
            mode,
            tools,
            manifest_path: PathBuf::from(MANIFEST_FILE_NAME),
        }
    }

    /// Probe, write the concat list, run ffmpeg in stream-copy mode.
    /// Every line ffmpeg prints is handed to `on_line` while it runs.
    pub fn run(&self, on_line: &(dyn Fn(&str) + Sync)) -> Result<LoopOutcome> {
        self.mode.validate()?;

        let duration = ffmpeg::probe_duration(&self.tools.ffprobe, &self.input)?;
        let repeat = self.mode.repeat_count(duration);
        let output = self.mode.output_path(&self.input);
        log::info!(
            "Extending {} ({:.2}s) x{} -> {}",
            self.input.display(),
            duration,
            repeat,
            output.display()
        );

        std::fs::write(&self.manifest_path, manifest_contents(&self.input, repeat))?;

        let mut cmd = ffmpeg::hidden_command(&self.tools.ffmpeg);
        cmd.args(["-y", "-f", "concat", "-safe", "0", "-i"])
            .arg(&self.manifest_path)
            .args(["-c", "copy"])
            .arg(&output);
        let status = ffmpeg::tracked_streaming(cmd, on_line);

        if let Err(e) = std::fs::remove_file(&self.manifest_path) {
            log::warn!("Failed to remove {}: {}", self.manifest_path.display(), e);
        }

        let status = status?;
        if !status.success() {
            return Err(ExtenderError::Processing { code: status.code() });
        }

        Ok(LoopOutcome {
            output,
            repeat,
            duration,
        })
    }
}

/// Concat demuxer list naming `input` once per repetition.
pub fn manifest_contents(input: &Path, repeat: u32) -> String {
    let entry = format!("file '{}'\n", escape_concat_path(input));
    entry.repeat(repeat as usize)
}

fn escape_concat_path(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "/")
        .replace('\'', r"'\''")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn manifest_lists_input_once_per_repeat() {
        let contents = manifest_contents(Path::new("/videos/clip.mp4"), 6);
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines.iter().all(|l| *l == "file '/videos/clip.mp4'"));
    }

    #[test]
    fn manifest_escapes_quotes_and_backslashes() {
        let contents = manifest_contents(Path::new(r"C:\clips\it's.mp4"), 1);
        assert_eq!(contents, "file 'C:/clips/it'\\''s.mp4'\n");
    }

    #[test]
    fn zero_target_fails_before_probing() {
        let dir = tempfile::tempdir().unwrap();
        let mut job = LoopJob::new(
            dir.path().join("clip.mp4"),
            LoopMode::TargetDuration { hours: 0, minutes: 0 },
            ToolPaths::in_dir(dir.path()),
        );
        job.manifest_path = dir.path().join(MANIFEST_FILE_NAME);

        let err = job.run(&|_: &str| {}).unwrap_err();
        assert!(matches!(err, ExtenderError::EmptyTarget));
        assert!(!job.manifest_path.exists());
    }

    #[cfg(unix)]
    mod with_fake_tools {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        fn write_script(path: &Path, body: &str) {
            std::fs::write(path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
        }

        /// A tool dir whose ffprobe prints `duration` and whose ffmpeg echoes
        /// the concat list (arg 7), touches the output (arg 10) and exits `code`.
        fn fake_tools(dir: &Path, duration: &str, code: i32) -> ToolPaths {
            let tools = ToolPaths::in_dir(dir);
            write_script(&tools.ffprobe, &format!("echo {}", duration));
            write_script(
                &tools.ffmpeg,
                &format!("echo 'ffmpeg version fake' >&2\ncat \"$7\"\ntouch \"${{10}}\"\nexit {}", code),
            );
            tools
        }

        fn job_in(dir: &Path, mode: LoopMode, tools: ToolPaths) -> LoopJob {
            let mut job = LoopJob::new(dir.join("movie.mp4"), mode, tools);
            job.manifest_path = dir.join(MANIFEST_FILE_NAME);
            job
        }

        #[test]
        fn streams_output_and_cleans_manifest_on_success() {
            let dir = tempfile::tempdir().unwrap();
            let tools = fake_tools(dir.path(), "600.0", 0);
            let job = job_in(
                dir.path(),
                LoopMode::TargetDuration { hours: 1, minutes: 0 },
                tools,
            );

            let lines = Mutex::new(Vec::new());
            let outcome = job
                .run(&|line: &str| lines.lock().unwrap().push(line.to_string()))
                .unwrap();

            assert_eq!(outcome.repeat, 6);
            assert_eq!(outcome.output, dir.path().join("movie_1h.mp4"));
            assert!(outcome.output.exists());
            assert!(!job.manifest_path.exists());

            let lines = lines.into_inner().unwrap();
            let entries = lines.iter().filter(|l| l.starts_with("file '")).count();
            assert_eq!(entries, 6);
            assert!(lines.iter().any(|l| l == "ffmpeg version fake"));
        }

        #[test]
        fn explicit_count_does_not_depend_on_duration() {
            let dir = tempfile::tempdir().unwrap();
            let tools = fake_tools(dir.path(), "1.5", 0);
            let job = job_in(dir.path(), LoopMode::ExplicitRepeat { times: 3 }, tools);

            let outcome = job.run(&|_: &str| {}).unwrap();
            assert_eq!(outcome.repeat, 3);
            assert_eq!(outcome.output, dir.path().join("movie_3times.mp4"));
        }

        #[test]
        fn non_zero_exit_is_processing_error_and_manifest_is_removed() {
            let dir = tempfile::tempdir().unwrap();
            let tools = fake_tools(dir.path(), "200", 1);
            let job = job_in(
                dir.path(),
                LoopMode::TargetDuration { hours: 0, minutes: 30 },
                tools,
            );

            let lines = Mutex::new(Vec::new());
            let err = job
                .run(&|line: &str| lines.lock().unwrap().push(line.to_string()))
                .unwrap_err();

            assert!(matches!(err, ExtenderError::Processing { code: Some(1) }));
            assert_eq!(err.to_string(), "Error processing video");
            assert!(!job.manifest_path.exists());
            // diagnostics were still streamed
            assert_eq!(
                lines.into_inner().unwrap().iter().filter(|l| l.starts_with("file '")).count(),
                9
            );
        }

        #[test]
        fn garbage_duration_is_probe_error() {
            let dir = tempfile::tempdir().unwrap();
            let tools = fake_tools(dir.path(), "N/A", 0);
            let job = job_in(dir.path(), LoopMode::default(), tools);

            let err = job.run(&|_: &str| {}).unwrap_err();
            assert!(matches!(err, ExtenderError::Probe(_)));
            assert!(!job.manifest_path.exists());
        }

        #[test]
        fn missing_ffmpeg_still_removes_manifest() {
            let dir = tempfile::tempdir().unwrap();
            let mut tools = fake_tools(dir.path(), "10", 0);
            tools.ffmpeg = dir.path().join("missing-ffmpeg");
            let job = job_in(dir.path(), LoopMode::ExplicitRepeat { times: 2 }, tools);

            let err = job.run(&|_: &str| {}).unwrap_err();
            assert!(matches!(err, ExtenderError::Io(_)));
            assert!(!job.manifest_path.exists());
        }
    }
}
