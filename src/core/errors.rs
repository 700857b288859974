use std::fmt;
use thiserror::Error;

/// Errors recorded while processing a comparison request.
///
/// None of these abort a request on their own: each one is collected into
/// the report's error list and serialized at the HTTP boundary.
#[derive(Debug, Error)]
pub enum ComparisonError {
    #[error("request error: {url}: {reason}")]
    RequestConstruction { url: String, reason: String },

    #[error("remote server doesn't exist: {url}: {reason}")]
    ServerNotExists { url: String, reason: String },

    #[error("unable to download a file: {url}: {reason}")]
    DownloadFailed { url: String, reason: String },

    #[error("unable to read a file: {url}: {reason}")]
    FileRead { url: String, reason: String },

    #[error("unsupported file type: {url}")]
    FileNotSupported { url: String },

    #[error("not enough images to compare{}", filtered_note(.filtered))]
    NotEnoughImages { filtered: bool },

    #[error("unable to compare images {source_url} and {target_url}: {source}")]
    ComparisonFailed {
        source_url: String,
        target_url: String,
        source: RecognitionError,
    },

    #[error("{source_url}: {source}")]
    GenderPredictionFailed {
        source_url: String,
        source: RecognitionError,
    },

    #[error("wrong secret code")]
    WrongSecret,
}

fn filtered_note(filtered: &bool) -> &'static str {
    if *filtered {
        ": some of the images were probably filtered"
    } else {
        ""
    }
}

/// Fieldless discriminant of [`ComparisonError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    RequestConstruction,
    ServerNotExists,
    DownloadFailed,
    FileRead,
    FileNotSupported,
    NotEnoughImages,
    ComparisonFailed,
    GenderPredictionFailed,
    WrongSecret,
}

impl ComparisonError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RequestConstruction { .. } => ErrorKind::RequestConstruction,
            Self::ServerNotExists { .. } => ErrorKind::ServerNotExists,
            Self::DownloadFailed { .. } => ErrorKind::DownloadFailed,
            Self::FileRead { .. } => ErrorKind::FileRead,
            Self::FileNotSupported { .. } => ErrorKind::FileNotSupported,
            Self::NotEnoughImages { .. } => ErrorKind::NotEnoughImages,
            Self::ComparisonFailed { .. } => ErrorKind::ComparisonFailed,
            Self::GenderPredictionFailed { .. } => ErrorKind::GenderPredictionFailed,
            Self::WrongSecret => ErrorKind::WrongSecret,
        }
    }

    /// The image URL this error concerns, if any.
    ///
    /// For comparison failures this is the target URL; for gender
    /// prediction it is the source URL.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::RequestConstruction { url, .. }
            | Self::ServerNotExists { url, .. }
            | Self::DownloadFailed { url, .. }
            | Self::FileRead { url, .. }
            | Self::FileNotSupported { url } => Some(url),
            Self::ComparisonFailed { target_url, .. } => Some(target_url),
            Self::GenderPredictionFailed { source_url, .. } => Some(source_url),
            Self::NotEnoughImages { .. } | Self::WrongSecret => None,
        }
    }
}

/// Errors returned by the recognition backend.
#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{code}: {message}")]
    Backend {
        code: BackendErrorCode,
        message: String,
    },

    #[error("invalid response format: {0}")]
    InvalidResponse(String),

    #[error("unable to predict gender by photo")]
    NoFaceDetails,

    #[error("unable to predict gender by photo: {0}")]
    GenderPrediction(Box<RecognitionError>),
}

/// Error codes reported by the recognition backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendErrorCode {
    InvalidParameter,
    InvalidS3Object,
    ImageTooLarge,
    AccessDenied,
    InternalServerError,
    Throttling,
    ProvisionedThroughputExceeded,
    InvalidImageFormat,
    Other(String),
}

impl BackendErrorCode {
    pub fn parse(code: &str) -> Self {
        match code {
            "InvalidParameterException" => Self::InvalidParameter,
            "InvalidS3ObjectException" => Self::InvalidS3Object,
            "ImageTooLargeException" => Self::ImageTooLarge,
            "AccessDeniedException" => Self::AccessDenied,
            "InternalServerError" => Self::InternalServerError,
            "ThrottlingException" => Self::Throttling,
            "ProvisionedThroughputExceededException" => Self::ProvisionedThroughputExceeded,
            "InvalidImageFormatException" => Self::InvalidImageFormat,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::InvalidParameter => "InvalidParameterException",
            Self::InvalidS3Object => "InvalidS3ObjectException",
            Self::ImageTooLarge => "ImageTooLargeException",
            Self::AccessDenied => "AccessDeniedException",
            Self::InternalServerError => "InternalServerError",
            Self::Throttling => "ThrottlingException",
            Self::ProvisionedThroughputExceeded => "ProvisionedThroughputExceededException",
            Self::InvalidImageFormat => "InvalidImageFormatException",
            Self::Other(code) => code,
        }
    }
}

impl fmt::Display for BackendErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other(code) if code.is_empty() => f.write_str("compare faces error"),
            _ => f.write_str(self.as_str()),
        }
    }
}
