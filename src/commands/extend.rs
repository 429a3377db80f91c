use crate::error::ExtenderError;
use crate::state::{AppState, JobGuard};
use crate::video::validator;
use serde::Serialize;
use tauri::Emitter;

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessLogEvent {
    pub line: String,
}

/// Loop the video according to the current mode. `ffmpeg_path` is the tool
/// directory as currently shown and is persisted first if it changed.
/// ffmpeg output is emitted line by line as `process-log` events; resolves
/// once ffmpeg exits.
#[tauri::command]
pub async fn extend_video(
    app: tauri::AppHandle,
    state: tauri::State<'_, AppState>,
    video_path: String,
    ffmpeg_path: String,
) -> Result<String, String> {
    let (tool_dir, changed) = {
        let mut settings = state.settings.lock().map_err(|_| "State lock failed")?;
        let changed = settings.update_ffmpeg_path(&ffmpeg_path).then(|| settings.clone());
        (settings.tool_dir().to_path_buf(), changed)
    };
    if let Some(settings) = changed {
        settings.save(&app)?;
    }
    let mode = *state.loop_mode.lock().map_err(|_| "State lock failed")?;

    let job = validator::validate_job(&video_path, &tool_dir, mode).map_err(|e| {
        log::warn!("Rejected job: {}", e);
        e.to_string()
    })?;
    let _running = JobGuard::acquire(&state.processing, "Processing")?;

    let app_handle = app.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        job.run(&|line: &str| {
            let _ = app_handle.emit(
                "process-log",
                ProcessLogEvent {
                    line: line.to_string(),
                },
            );
        })
    })
    .await
    .map_err(|e| format!("Task failed: {}", e))?;

    match outcome {
        Ok(outcome) => {
            log::info!(
                "Wrote {} copies of {:.1}s to {}",
                outcome.repeat,
                outcome.duration,
                outcome.output.display()
            );
            Ok(format!(
                "Video extended successfully and saved as {}",
                outcome.output.display()
            ))
        }
        Err(e) if e.is_configuration() => {
            log::warn!("Rejected job: {}", e);
            Err(e.to_string())
        }
        Err(ExtenderError::Processing { code }) => {
            log::error!("ffmpeg failed on {} (exit code {:?})", video_path, code);
            Err(ExtenderError::Processing { code }.to_string())
        }
        Err(e) => {
            log::error!("Extending {} failed: {}", video_path, e);
            Err(e.to_string())
        }
    }
}
