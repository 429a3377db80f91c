// Prevents additional console window on Windows in release
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod commands;
mod downloader;
mod error;
mod settings;
mod state;
mod video;

use tauri::Manager;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_store::Builder::default().build())
        .plugin(tauri_plugin_opener::init())
        .setup(|app| {
            let settings = settings::AppSettings::load(app.handle()).unwrap_or_else(|e| {
                log::warn!("Starting with default settings: {}", e);
                settings::AppSettings::default()
            });
            log::info!("FFmpeg path: {:?}", settings.ffmpeg_path);
            app.manage(state::AppState::new(settings));
            Ok(())
        })
        .on_window_event(|_window, event| {
            if let tauri::WindowEvent::CloseRequested { .. } = event {
                // Kill all active FFmpeg/child processes so nothing is left behind
                video::ffmpeg::kill_all_children();
            }
        })
        .invoke_handler(tauri::generate_handler![
            commands::settings::get_settings,
            commands::settings::set_ffmpeg_path,
            commands::settings::normalize_path,
            commands::loop_mode::get_loop_mode,
            commands::loop_mode::edit_loop_mode,
            commands::extend::extend_video,
            commands::download::download_ffmpeg,
        ])
        .run(tauri::generate_context!())
        .expect("error while running Video Extender");
}
