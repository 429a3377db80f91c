pub mod download;
pub mod extend;
pub mod loop_mode;
pub mod settings;
