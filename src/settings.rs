use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use tauri_plugin_store::StoreExt;

pub const SETTINGS_STORE: &str = "settings.json";
const SETTINGS_KEY: &str = "settings";

/// Everything the app remembers between launches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    /// Directory holding the ffmpeg and ffprobe executables.
    pub ffmpeg_path: String,
}

impl AppSettings {
    pub fn tool_dir(&self) -> &Path {
        Path::new(&self.ffmpeg_path)
    }

    /// Store the normalized form of `path`. Returns true if it changed.
    pub fn update_ffmpeg_path(&mut self, path: &str) -> bool {
        let normalized = normalize_path(path);
        if normalized == self.ffmpeg_path {
            return false;
        }
        self.ffmpeg_path = normalized;
        true
    }

    /// Read the settings from the store. A missing or unreadable entry gives defaults.
    pub fn load<R: tauri::Runtime>(app: &tauri::AppHandle<R>) -> Result<Self, String> {
        let store = app
            .store(SETTINGS_STORE)
            .map_err(|e| format!("Failed to open store: {}", e))?;

        let settings = match store.get(SETTINGS_KEY) {
            Some(val) => Self::from_value(val),
            None => AppSettings::default(),
        };
        Ok(settings)
    }

    /// Write the settings and flush the store to disk.
    pub fn save<R: tauri::Runtime>(&self, app: &tauri::AppHandle<R>) -> Result<(), String> {
        let store = app
            .store(SETTINGS_STORE)
            .map_err(|e| format!("Failed to open store: {}", e))?;

        let val = serde_json::to_value(self)
            .map_err(|e| format!("Failed to serialize settings: {}", e))?;

        store.set(SETTINGS_KEY, val);
        store
            .save()
            .map_err(|e| format!("Failed to save settings: {}", e))
    }

    fn from_value(val: serde_json::Value) -> Self {
        serde_json::from_value(val).unwrap_or_else(|e| {
            log::warn!("Ignoring unreadable settings: {}", e);
            AppSettings::default()
        })
    }
}

/// Lexically clean up a user-entered path: drop `.`, fold `..`, collapse
/// separators and uppercase a Windows drive letter. Empty stays empty.
pub fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }

    let mut parts: Vec<Component> = Vec::new();
    for component in Path::new(path).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let last = parts.last().copied();
                match last {
                    Some(Component::Normal(_)) => {
                        parts.pop();
                    }
                    Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                    _ => parts.push(component),
                }
            }
            other => parts.push(other),
        }
    }

    let normalized: PathBuf = parts.iter().collect();
    let mut normalized = normalized.to_string_lossy().to_string();
    if normalized.is_empty() {
        normalized.push('.');
    }

    let bytes = normalized.as_bytes();
    if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
        normalized[..1].make_ascii_uppercase();
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn normalizes_dots_and_separators() {
        assert_eq!(normalize_path("/opt//ffmpeg/./bin/"), "/opt/ffmpeg/bin");
        assert_eq!(normalize_path("/opt/ffmpeg/tmp/../bin"), "/opt/ffmpeg/bin");
        assert_eq!(normalize_path("tools/../../bin"), "../bin");
        assert_eq!(normalize_path("/../bin"), "/bin");
        assert_eq!(normalize_path("./"), ".");
        assert_eq!(normalize_path(""), "");
    }

    #[cfg(unix)]
    #[test]
    fn uppercases_drive_letter() {
        assert_eq!(normalize_path("c:/FFmpeg/bin"), "C:/FFmpeg/bin");
        assert_eq!(normalize_path("D:/video.mp4"), "D:/video.mp4");
    }

    #[cfg(unix)]
    #[test]
    fn update_reports_only_real_changes() {
        let mut settings = AppSettings::default();
        assert!(settings.update_ffmpeg_path("/opt/ffmpeg/./bin/"));
        assert_eq!(settings.tool_dir(), Path::new("/opt/ffmpeg/bin"));

        // same dir typed differently
        assert!(!settings.update_ffmpeg_path("/opt//ffmpeg/bin"));
        assert!(settings.update_ffmpeg_path(""));
        assert_eq!(settings.ffmpeg_path, "");
    }

    #[test]
    fn stored_payload_is_camel_case() {
        let settings = AppSettings {
            ffmpeg_path: "/opt/ffmpeg/bin".into(),
        };
        let val = serde_json::to_value(&settings).unwrap();
        assert_eq!(val, serde_json::json!({ "ffmpegPath": "/opt/ffmpeg/bin" }));
        assert_eq!(AppSettings::from_value(val), settings);
    }

    #[test]
    fn unreadable_payload_falls_back_to_defaults() {
        assert_eq!(
            AppSettings::from_value(serde_json::json!({ "ffmpegPath": 42 })),
            AppSettings::default()
        );
        assert_eq!(AppSettings::from_value(serde_json::json!({})), AppSettings::default());
    }
}
