use std::io::{self, Read, Seek, SeekFrom};

use super::super::bitmap::{
    row_stride, BitmapFileHeader, BitmapInfoHeader, BITMAP_TYPE_TAG, FILE_HEADER_SIZE,
    INFO_HEADER_SIZE, UNCOMPRESSED,
};
use super::super::{Image, ImageReader};
use crate::Error;

const BYTES_PER_PIXEL: u32 = 3;
const SUPPORTED_BIT_COUNT: u16 = 24;
const FILE_HEADER_NAME: &str = "bitmap file header";
const INFO_HEADER_NAME: &str = "bitmap info header";

/// Decodes uncompressed 24 bit bitmaps into a top-down planar [`Image`].
pub struct BmpImageReader<T: Read + Seek> {
    reader: T,
}

impl<T: Read + Seek> BmpImageReader<T> {
    pub fn new(reader: T) -> Self {
        Self { reader }
    }

    fn read_header_bytes<const N: usize>(
        &mut self,
        header_name: &'static str,
    ) -> crate::Result<[u8; N]> {
        let mut bytes = [0; N];
        self.reader
            .read_exact(&mut bytes)
            .map_err(|e| Self::map_read_error(e, Error::TruncatedHeader(header_name)))?;
        Ok(bytes)
    }

    fn read_file_header(&mut self) -> crate::Result<BitmapFileHeader> {
        let bytes = self.read_header_bytes::<FILE_HEADER_SIZE>(FILE_HEADER_NAME)?;
        Ok(BitmapFileHeader::from_le_bytes(&bytes))
    }

    fn read_info_header(&mut self) -> crate::Result<BitmapInfoHeader> {
        let bytes = self.read_header_bytes::<INFO_HEADER_SIZE>(INFO_HEADER_NAME)?;
        Ok(BitmapInfoHeader::from_le_bytes(&bytes))
    }

    fn check_type_tag(file_header: &BitmapFileHeader) -> crate::Result<()> {
        if file_header.type_tag != BITMAP_TYPE_TAG {
            return Err(Error::NotABitmapFile(file_header.type_tag));
        }
        Ok(())
    }

    fn check_pixel_format(info_header: &BitmapInfoHeader) -> crate::Result<()> {
        if info_header.bit_count != SUPPORTED_BIT_COUNT {
            return Err(Error::UnsupportedBitDepth(info_header.bit_count));
        }
        if info_header.compression != UNCOMPRESSED {
            return Err(Error::UnsupportedCompression(info_header.compression));
        }
        Ok(())
    }

    fn check_dimensions(info_header: &BitmapInfoHeader) -> crate::Result<(u32, u32)> {
        let invalid = || Error::InvalidImageDimensions(info_header.width, info_header.height);
        if info_header.width <= 0 || info_header.height == 0 {
            return Err(invalid());
        }
        let width = info_header.width as u32;
        let height = info_header.height.unsigned_abs();
        (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(invalid)?;
        Ok((width, height))
    }

    /// Rejects headers whose rows cannot fit in the stream before any buffer is allocated.
    fn check_pixel_data_length(
        &mut self,
        pixel_data_offset: u32,
        width: u32,
        height: u32,
    ) -> crate::Result<()> {
        let stream_length = self
            .reader
            .seek(SeekFrom::End(0))
            .map_err(Error::FailedToReadImageData)?;
        let available = stream_length.saturating_sub(pixel_data_offset as u64);
        let stride = row_stride(width, BYTES_PER_PIXEL) as u64;
        let complete_rows = available / stride;
        if complete_rows < height as u64 {
            return Err(Error::TruncatedPixelData(complete_rows as u32));
        }
        Ok(())
    }

    fn map_read_error(error: io::Error, truncation: Error) -> Error {
        if error.kind() == io::ErrorKind::UnexpectedEof {
            truncation
        } else {
            Error::FailedToReadImageData(error)
        }
    }

    fn read_pixel_rows(
        &mut self,
        width: u32,
        height: u32,
        is_top_down: bool,
    ) -> crate::Result<Image> {
        let pixel_count = width as usize * height as usize;
        let mut red = vec![0; pixel_count];
        let mut green = vec![0; pixel_count];
        let mut blue = vec![0; pixel_count];
        let mut row_buffer = vec![0; row_stride(width, BYTES_PER_PIXEL)];
        for stored_row_index in 0..height {
            self.reader
                .read_exact(&mut row_buffer)
                .map_err(|e| Self::map_read_error(e, Error::TruncatedPixelData(stored_row_index)))?;
            let row_index = if is_top_down {
                stored_row_index
            } else {
                height - 1 - stored_row_index
            };
            let row_start = row_index as usize * width as usize;
            // stored as BGR; trailing padding is ignored by chunking over the pixel bytes only
            let pixel_bytes = &row_buffer[..width as usize * BYTES_PER_PIXEL as usize];
            for (column_index, bgr) in pixel_bytes.chunks_exact(3).enumerate() {
                let pixel_index = row_start + column_index;
                blue[pixel_index] = bgr[0];
                green[pixel_index] = bgr[1];
                red[pixel_index] = bgr[2];
            }
        }
        Ok(Image::new(width, height, red, green, blue))
    }
}

impl<T: Read + Seek> ImageReader<Image> for BmpImageReader<T> {
    fn read_image(&mut self) -> crate::Result<Image> {
        let file_header = self.read_file_header()?;
        Self::check_type_tag(&file_header)?;
        let info_header = self.read_info_header()?;
        Self::check_pixel_format(&info_header)?;
        let (width, height) = Self::check_dimensions(&info_header)?;
        log::debug!(
            "Bitmap header: {} x {}, {} bits, pixel data at offset {}",
            info_header.width,
            info_header.height,
            info_header.bit_count,
            file_header.pixel_data_offset
        );
        self.check_pixel_data_length(file_header.pixel_data_offset, width, height)?;
        self.reader
            .seek(SeekFrom::Start(file_header.pixel_data_offset as u64))
            .map_err(Error::FailedToReadImageData)?;
        self.read_pixel_rows(width, height, info_header.is_top_down())
    }
}
