use std::io::{self, Read};

use crate::Error;

/// A binary P6 pixmap with 16 bit samples.
pub struct Pixmap {
    pub width: u32,
    pub height: u32,
    pub max_value: u16,
    /// Red, green, blue per pixel, row-major.
    pub samples: Vec<u16>,
}

impl Pixmap {
    pub fn dot(&self, column_index: u32, row_index: u32) -> [u16; 3] {
        let index = (row_index as usize * self.width as usize + column_index as usize) * 3;
        [
            self.samples[index],
            self.samples[index + 1],
            self.samples[index + 2],
        ]
    }
}

pub struct PixmapReader<T: Read> {
    reader: T,
}

impl<T: Read> PixmapReader<T> {
    pub fn new(reader: T) -> Self {
        Self { reader }
    }

    pub fn read_pixmap(&mut self) -> crate::Result<Pixmap> {
        let mut tokenizer = PixmapTokenizer::new(&mut self.reader);
        let header = PixmapHeaderParser::new(&mut tokenizer).parse_header();
        if let Some(error) = tokenizer.error.take() {
            return Err(Error::FailedToReadImageData(error));
        }
        let header = header?;
        let samples = read_samples(&mut self.reader, &header)?;
        Ok(Pixmap {
            width: header.width,
            height: header.height,
            max_value: header.max_value,
            samples,
        })
    }
}

/// Splits the text header into whitespace separated tokens.
///
/// Reads byte by byte so that exactly one whitespace byte after the last
/// token is consumed, leaving the reader positioned at the binary samples.
struct PixmapTokenizer<'a, R: Read> {
    reader: &'a mut R,
    buffer: Vec<u8>,
    error: Option<io::Error>,
}

impl<'a, R: Read> PixmapTokenizer<'a, R> {
    fn new(reader: &'a mut R) -> Self {
        PixmapTokenizer {
            reader,
            buffer: Vec::new(),
            error: None,
        }
    }

    fn read_byte(&mut self) -> Option<u8> {
        let mut byte = [0; 1];
        loop {
            match self.reader.read(&mut byte) {
                Ok(0) => return None,
                Ok(_) => return Some(byte[0]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.error = Some(e);
                    return None;
                }
            }
        }
    }
}

impl<R: Read> Iterator for PixmapTokenizer<'_, R> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        self.buffer.clear();
        let mut in_comment = false;

        while let Some(byte) = self.read_byte() {
            if in_comment {
                if byte == b'\n' {
                    in_comment = false;
                }
                continue;
            }
            if byte == b'#' {
                in_comment = true;
                continue;
            }
            if byte.is_ascii_whitespace() {
                if !self.buffer.is_empty() {
                    break;
                }
            } else {
                self.buffer.push(byte);
            }
        }

        if self.buffer.is_empty() {
            return None;
        }

        Some(String::from_utf8_lossy(&self.buffer).into_owned())
    }
}

const P6_HEADER_TOKEN_NAME: &str = "P6 Header";
const WIDTH_HEADER_TOKEN_NAME: &str = "Width Header";
const HEIGHT_HEADER_TOKEN_NAME: &str = "Height Header";
const MAX_VALUE_HEADER_TOKEN_NAME: &str = "Max Value Header";
const MIN_WIDE_SAMPLE_MAX_VALUE: u32 = 256;

struct PixmapHeader {
    width: u32,
    height: u32,
    max_value: u16,
}

struct PixmapHeaderParser<'a, T> {
    tokenizer: &'a mut T,
}

impl<'a, T> PixmapHeaderParser<'a, T>
where
    T: Iterator<Item = String>,
{
    fn new(tokenizer: &'a mut T) -> Self {
        Self { tokenizer }
    }

    fn parse_header(&mut self) -> crate::Result<PixmapHeader> {
        let magic = self.next_token(P6_HEADER_TOKEN_NAME)?;
        Self::check_magic(&magic)?;
        let width = self.parse_number(WIDTH_HEADER_TOKEN_NAME)?;
        let height = self.parse_number(HEIGHT_HEADER_TOKEN_NAME)?;
        let max_value = self.parse_number(MAX_VALUE_HEADER_TOKEN_NAME)?;
        let max_value = Self::check_max_value(max_value)?;
        Ok(PixmapHeader {
            width,
            height,
            max_value,
        })
    }

    fn next_token(&mut self, token_name: &'static str) -> crate::Result<String> {
        self.tokenizer
            .next()
            .ok_or(Error::PixmapDoesNotContainRequiredToken(token_name))
    }

    fn parse_number(&mut self, token_name: &'static str) -> crate::Result<u32> {
        self.next_token(token_name)?
            .parse()
            .map_err(|_| Error::ParsingOfTokenFailed(token_name))
    }

    fn check_magic(magic: &str) -> crate::Result<()> {
        if magic != "P6" {
            return Err(Error::PixmapDoesNotContainRequiredToken(
                P6_HEADER_TOKEN_NAME,
            ));
        }
        Ok(())
    }

    fn check_max_value(max_value: u32) -> crate::Result<u16> {
        if !(MIN_WIDE_SAMPLE_MAX_VALUE..=u16::MAX as u32).contains(&max_value) {
            return Err(Error::UnsupportedPixmapMaxValue(max_value));
        }
        Ok(max_value as u16)
    }
}

fn read_samples<R: Read>(reader: &mut R, header: &PixmapHeader) -> crate::Result<Vec<u16>> {
    let byte_count = (header.width as u64 * header.height as u64).saturating_mul(6);
    // grows with the data actually present instead of trusting the header
    let mut bytes = Vec::new();
    reader
        .take(byte_count)
        .read_to_end(&mut bytes)
        .map_err(Error::FailedToReadImageData)?;
    if (bytes.len() as u64) < byte_count {
        return Err(Error::TruncatedPixmapSamples);
    }
    Ok(bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect())
}

#[cfg(test)]
mod test {
    use std::io::{self, Read};

    use super::{Pixmap, PixmapReader};
    use crate::{error::Error, Result};

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "device gone"))
        }
    }

    fn read(bytes: &[u8]) -> Result<Pixmap> {
        PixmapReader::new(bytes).read_pixmap()
    }

    fn with_samples(header: &str, samples: &[u16]) -> Vec<u8> {
        let mut bytes = header.as_bytes().to_vec();
        for sample in samples {
            bytes.extend_from_slice(&sample.to_be_bytes());
        }
        bytes
    }

    #[test]
    fn read_single_pixel() {
        let bytes = with_samples("P6\n1 1\n1023\n", &[1023, 513, 0]);
        let pixmap = read(&bytes).unwrap();
        assert_eq!(pixmap.width, 1);
        assert_eq!(pixmap.height, 1);
        assert_eq!(pixmap.max_value, 1023);
        assert_eq!(pixmap.dot(0, 0), [1023, 513, 0]);
    }

    #[test]
    fn header_comments_are_skipped() {
        let bytes = with_samples(
            "P6\n# written by a test\n2 1\n4095\n",
            &[1, 2, 3, 4, 5, 6],
        );
        let pixmap = read(&bytes).unwrap();
        assert_eq!(pixmap.dot(1, 0), [4, 5, 6]);
    }

    #[test]
    fn first_sample_byte_may_look_like_whitespace() {
        // 0x0A0A starts with a newline byte
        let bytes = with_samples("P6 1 1 4095\n", &[0x0A0A, 0x0920, 0x0D0D]);
        let pixmap = read(&bytes).unwrap();
        assert_eq!(pixmap.dot(0, 0), [0x0A0A, 0x0920, 0x0D0D]);
    }

    #[test]
    fn wrong_magic() {
        let bytes = with_samples("P3\n1 1\n1023\n", &[0, 0, 0]);
        if let Err(Error::PixmapDoesNotContainRequiredToken(_)) = read(&bytes) {
            return;
        }
        panic!("Wrong magic not detected");
    }

    #[test]
    fn missing_height() {
        if let Err(Error::PixmapDoesNotContainRequiredToken(token)) = read(b"P6\n1") {
            assert_eq!(token, "Height Header");
            return;
        }
        panic!("Missing height not detected");
    }

    #[test]
    fn unparsable_width() {
        if let Err(Error::ParsingOfTokenFailed(_)) = read(b"P6\nwide 1\n1023\n") {
            return;
        }
        panic!("Unparsable width not detected");
    }

    #[test]
    fn eight_bit_samples_are_rejected() {
        let bytes = b"P6\n1 1\n255\n\x00\x00\x00";
        if let Err(Error::UnsupportedPixmapMaxValue(255)) = read(bytes) {
            return;
        }
        panic!("8 bit samples not rejected");
    }

    #[test]
    fn read_failure_in_header_is_reported() {
        let reader = (&b"P6\n1 "[..]).chain(FailingReader);
        match PixmapReader::new(reader).read_pixmap() {
            Err(Error::FailedToReadImageData(e)) => {
                assert_eq!(e.kind(), io::ErrorKind::PermissionDenied)
            }
            _ => panic!("Read failure must not be reported as a missing token"),
        }
    }

    #[test]
    fn huge_header_without_samples() {
        let bytes = b"P6\n4000000000 4000000000\n1023\n";
        if let Err(Error::TruncatedPixmapSamples) = read(bytes) {
            return;
        }
        panic!("Missing samples not detected");
    }

    #[test]
    fn truncated_samples() {
        let bytes = with_samples("P6\n2 1\n1023\n", &[1, 2, 3, 4, 5]);
        if let Err(Error::TruncatedPixmapSamples) = read(&bytes) {
            return;
        }
        panic!("Truncated samples not detected");
    }
}
