use crate::downloader::{self, TOOLS_DIR_NAME};
use crate::settings::normalize_path;
use crate::state::{AppState, JobGuard};
use serde::Serialize;
use tauri::{Emitter, Manager};

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadProgressEvent {
    pub percent: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadOutcome {
    pub message: String,
    pub ffmpeg_path: String,
}

/// Fetch ffmpeg + ffprobe into the app data dir and make that the tool
/// directory. Progress is emitted as `download-progress` events.
#[tauri::command]
pub async fn download_ffmpeg(
    app: tauri::AppHandle,
    state: tauri::State<'_, AppState>,
) -> Result<DownloadOutcome, String> {
    let _running = JobGuard::acquire(&state.downloading, "Download")?;

    let tools_root = app
        .path()
        .app_local_data_dir()
        .map_err(|e| format!("Failed to resolve app data dir: {}", e))?
        .join(TOOLS_DIR_NAME);

    if !cfg!(windows) {
        log::warn!("The published FFmpeg binaries are Windows builds");
    }

    let client = reqwest::Client::new();
    let bin_dir = downloader::download_assets(
        &client,
        &tools_root,
        &downloader::ffmpeg_assets(),
        |percent| {
            let _ = app.emit("download-progress", DownloadProgressEvent { percent });
        },
    )
    .await?;

    let ffmpeg_path = normalize_path(&bin_dir.to_string_lossy());
    let updated = {
        let mut current = state.settings.lock().map_err(|_| "State lock failed")?;
        current.ffmpeg_path = ffmpeg_path.clone();
        current.clone()
    };
    updated.save(&app)?;

    log::info!("FFmpeg installed to {}", ffmpeg_path);
    Ok(DownloadOutcome {
        message: format!("FFmpeg files downloaded successfully to {}", ffmpeg_path),
        ffmpeg_path,
    })
}
