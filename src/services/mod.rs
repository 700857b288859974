// Service exports
pub mod fetcher;
pub mod recognition;

pub use fetcher::HttpImageFetcher;
pub use recognition::HttpRecognitionClient;
