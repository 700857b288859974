// Core comparison engine
pub mod classify;
pub mod comparator;
pub mod downloader;
pub mod errors;
pub mod format;
pub mod logger;

pub use comparator::{Comparator, RecognitionClient};
pub use downloader::{BatchDownloader, ImageFetcher};
pub use errors::{BackendErrorCode, ComparisonError, ErrorKind, RecognitionError};
pub use logger::{Logger, NullLogger, TracingLogger};
