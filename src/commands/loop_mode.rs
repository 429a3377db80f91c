use crate::state::AppState;
use crate::video::loop_mode::{FormEdit, LoopModeView};

#[tauri::command]
pub async fn get_loop_mode(state: tauri::State<'_, AppState>) -> Result<LoopModeView, String> {
    let mode = state.loop_mode.lock().map_err(|_| "State lock failed")?;
    Ok(mode.view())
}

/// Apply one selector change; the window re-renders from the returned view.
#[tauri::command]
pub async fn edit_loop_mode(
    state: tauri::State<'_, AppState>,
    edit: FormEdit,
) -> Result<LoopModeView, String> {
    let mut mode = state.loop_mode.lock().map_err(|_| "State lock failed")?;
    *mode = mode.apply(edit);
    log::debug!("Loop mode is now {:?}", *mode);
    Ok(mode.view())
}
