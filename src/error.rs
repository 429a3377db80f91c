use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtenderError {
    #[error("Please select a video file.")]
    NoInputFile,

    #[error("Invalid FFmpeg path. Please ensure both {ffmpeg} and {ffprobe} are present in the selected directory.")]
    InvalidToolDir { ffmpeg: String, ffprobe: String },

    #[error("Please set a target duration or a repeat count greater than zero.")]
    EmptyTarget,

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("{0} is already running")]
    Busy(&'static str),

    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Incomplete download of {file}: received {received} of {expected} bytes")]
    IncompleteDownload {
        file: String,
        received: u64,
        expected: u64,
    },

    #[error("Failed to read video duration: {0}")]
    Probe(String),

    #[error("Error processing video")]
    Processing { code: Option<i32> },
}

impl ExtenderError {
    /// Errors raised before any background work starts.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::NoInputFile
                | Self::InvalidToolDir { .. }
                | Self::EmptyTarget
                | Self::OutOfRange { .. }
                | Self::Busy(_)
        )
    }
}

impl From<ExtenderError> for String {
    fn from(err: ExtenderError) -> Self {
        err.to_string()
    }
}

pub type Result<T> = std::result::Result<T, ExtenderError>;
