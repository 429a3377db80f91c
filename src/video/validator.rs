use super::extender::LoopJob;
use super::ffmpeg::{executable_name, ToolPaths};
use super::loop_mode::LoopMode;
use crate::error::{ExtenderError, Result};
use std::path::{Path, PathBuf};

/// Check everything the user typed before a job is handed to a worker.
/// Failing here means nothing was spawned and nothing was written.
pub fn validate_job(video_path: &str, tool_dir: &Path, mode: LoopMode) -> Result<LoopJob> {
    if video_path.trim().is_empty() {
        return Err(ExtenderError::NoInputFile);
    }

    let tools = ToolPaths::in_dir(tool_dir);
    if tool_dir.as_os_str().is_empty() || !tools.is_complete() {
        return Err(ExtenderError::InvalidToolDir {
            ffmpeg: executable_name("ffmpeg"),
            ffprobe: executable_name("ffprobe"),
        });
    }

    mode.validate()?;

    Ok(LoopJob::new(PathBuf::from(video_path), mode, tools))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool_dir_with(names: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in names {
            std::fs::write(dir.path().join(executable_name(name)), b"").unwrap();
        }
        dir
    }

    #[test]
    fn empty_video_path_is_rejected_first() {
        let err = validate_job("  ", Path::new(""), LoopMode::default()).unwrap_err();
        assert!(matches!(err, ExtenderError::NoInputFile));
        assert_eq!(err.to_string(), "Please select a video file.");
    }

    #[test]
    fn tool_dir_needs_both_binaries() {
        let dir = tool_dir_with(&["ffmpeg"]);
        let err = validate_job("clip.mp4", dir.path(), LoopMode::default()).unwrap_err();
        assert!(matches!(err, ExtenderError::InvalidToolDir { .. }));

        let err = validate_job("clip.mp4", Path::new(""), LoopMode::default()).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn zero_target_is_a_configuration_error() {
        let dir = tool_dir_with(&["ffmpeg", "ffprobe"]);
        let mode = LoopMode::TargetDuration { hours: 0, minutes: 0 };
        let err = validate_job("clip.mp4", dir.path(), mode).unwrap_err();
        assert!(matches!(err, ExtenderError::EmptyTarget));
    }

    #[test]
    fn valid_request_builds_job() {
        let dir = tool_dir_with(&["ffmpeg", "ffprobe"]);
        let job = validate_job("clip.mp4", dir.path(), LoopMode::ExplicitRepeat { times: 2 }).unwrap();
        assert_eq!(job.input, PathBuf::from("clip.mp4"));
        assert_eq!(job.tools, ToolPaths::in_dir(dir.path()));
        assert_eq!(job.manifest_path, PathBuf::from("concat.txt"));
    }
}
