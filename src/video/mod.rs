pub mod extender;
pub mod ffmpeg;
pub mod loop_mode;
pub mod validator;
