use crate::settings::{self, AppSettings};
use crate::state::AppState;

#[tauri::command]
pub async fn get_settings(state: tauri::State<'_, AppState>) -> Result<AppSettings, String> {
    let settings = state.settings.lock().map_err(|_| "State lock failed")?;
    Ok(settings.clone())
}

/// Normalize, remember and persist the tool directory. Returns the stored value.
#[tauri::command]
pub async fn set_ffmpeg_path(
    app: tauri::AppHandle,
    state: tauri::State<'_, AppState>,
    path: String,
) -> Result<String, String> {
    let updated = {
        let mut current = state.settings.lock().map_err(|_| "State lock failed")?;
        current.update_ffmpeg_path(&path);
        current.clone()
    };
    updated.save(&app)?;

    Ok(updated.ffmpeg_path)
}

#[tauri::command]
pub fn normalize_path(path: String) -> String {
    settings::normalize_path(&path)
}
