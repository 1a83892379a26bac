use std::fmt::Display;
use std::io;

#[derive(Debug)]
pub enum Error {
    NotABitmapFile(u16),
    UnsupportedBitDepth(u16),
    UnsupportedCompression(u32),
    InvalidImageDimensions(i32, i32),
    TruncatedHeader(&'static str),
    TruncatedPixelData(u32),
    PixmapDoesNotContainRequiredToken(&'static str),
    ParsingOfTokenFailed(&'static str),
    UnsupportedPixmapMaxValue(u32),
    TruncatedPixmapSamples,
    UnableToOpenInputFileForReading(String, io::Error),
    UnableToOpenOutputFileForWriting(String, io::Error),
    UnableToCreateOutputDirectory(String, io::Error),
    UnableToOpenConfigFile(String, io::Error),
    FailedToReadImageData(io::Error),
    FailedToWriteImageData(io::Error),
    ImageTooLargeForBitmap(u32, u32),
    VerificationFailed(String),
    ConversionsFailed(usize, usize),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotABitmapFile(type_tag) => {
                write!(
                    f,
                    "Not a bitmap file. Expected type tag 0x4D42 ('BM'), but got 0x{:04X}",
                    type_tag
                )
            }
            Self::UnsupportedBitDepth(bit_count) => {
                write!(
                    f,
                    "Only 24 bit bitmaps are supported, but the file has {} bits per pixel",
                    bit_count
                )
            }
            Self::UnsupportedCompression(compression) => {
                write!(
                    f,
                    "Only uncompressed bitmaps are supported, but compression is {}",
                    compression
                )
            }
            Self::InvalidImageDimensions(width, height) => {
                write!(f, "Invalid image dimensions {} x {}", width, height)
            }
            Self::TruncatedHeader(header_name) => {
                write!(f, "File ended before the {} was read", header_name)
            }
            Self::TruncatedPixelData(row_index) => {
                write!(f, "File ended while reading pixel row {}", row_index)
            }
            Self::PixmapDoesNotContainRequiredToken(token_name) => {
                write!(f, "Expected token '{}' not found in PPM file", token_name)
            }
            Self::ParsingOfTokenFailed(token_name) => {
                write!(f, "Parsing of token '{}' failed", token_name)
            }
            Self::UnsupportedPixmapMaxValue(max_value) => {
                write!(
                    f,
                    "Only 16 bit samples are supported, but max value is {}",
                    max_value
                )
            }
            Self::TruncatedPixmapSamples => {
                write!(f, "Number of samples does not match the size provided in header")
            }
            Self::UnableToOpenInputFileForReading(path, error) => {
                write!(
                    f,
                    "Unable to open input file '{}' for reading: {}",
                    path, error
                )
            }
            Self::UnableToOpenOutputFileForWriting(path, error) => {
                write!(
                    f,
                    "Unable to open output file '{}' for writing: {}",
                    path, error
                )
            }
            Self::UnableToCreateOutputDirectory(path, error) => {
                write!(f, "Unable to create output directory '{}': {}", path, error)
            }
            Self::UnableToOpenConfigFile(path, error) => {
                write!(f, "Unable to open config file '{}': {}", path, error)
            }
            Self::FailedToReadImageData(error) => write!(f, "Failed to read image data: {}", error),
            Self::FailedToWriteImageData(error) => {
                write!(f, "Failed to write image data: {}", error)
            }
            Self::ImageTooLargeForBitmap(width, height) => {
                write!(
                    f,
                    "Image of {} x {} pixels exceeds the size limits of a bitmap file",
                    width, height
                )
            }
            Self::VerificationFailed(reason) => write!(f, "Verification failed: {}", reason),
            Self::ConversionsFailed(failed, total) => {
                write!(f, "{} of {} conversions failed", failed, total)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::UnableToOpenInputFileForReading(_, error)
            | Self::UnableToOpenOutputFileForWriting(_, error)
            | Self::UnableToCreateOutputDirectory(_, error)
            | Self::UnableToOpenConfigFile(_, error)
            | Self::FailedToReadImageData(error)
            | Self::FailedToWriteImageData(error) => Some(error),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(value: io::Error) -> Self {
        Self::FailedToWriteImageData(value)
    }
}
