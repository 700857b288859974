use image::ImageFormat;

pub const MIME_PNG: &str = "image/png";
pub const MIME_JPEG: &str = "image/jpeg";

/// Image formats accepted for comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportedFormat {
    Png,
    Jpeg,
}

impl SupportedFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            SupportedFormat::Png => MIME_PNG,
            SupportedFormat::Jpeg => MIME_JPEG,
        }
    }
}

/// Rejected content, carrying the detected MIME type when there was one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnsupportedFormat {
    pub detected: Option<&'static str>,
}

/// Detect the MIME type of `bytes` from its leading magic number.
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    image::guess_format(bytes)
        .ok()
        .map(|format| format.to_mime_type())
}

/// Accept PNG and JPEG content only.
///
/// Detection looks at the leading bytes alone, nothing is decoded.
pub fn validate(bytes: &[u8]) -> Result<SupportedFormat, UnsupportedFormat> {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Png) => Ok(SupportedFormat::Png),
        Ok(ImageFormat::Jpeg) => Ok(SupportedFormat::Jpeg),
        Ok(other) => Err(UnsupportedFormat {
            detected: Some(other.to_mime_type()),
        }),
        Err(_) => Err(UnsupportedFormat { detected: None }),
    }
}
