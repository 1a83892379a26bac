use std::io::Write;

use super::super::bitmap::{
    row_stride, BitmapFileHeader, BitmapInfoHeader, BITMAP_TYPE_TAG, FILE_HEADER_SIZE,
    INFO_HEADER_SIZE, UNCOMPRESSED,
};
use super::super::palette::{Palette, PALETTE_SIZE};
use super::super::{Image, ImageWriter};
use crate::Error;

const BIT_COUNT: u16 = 8;
const PALETTE_ENTRY_SIZE: usize = 4;
const PALETTE_BLOCK_SIZE: usize = PALETTE_SIZE * PALETTE_ENTRY_SIZE;
const PIXEL_DATA_OFFSET: usize = FILE_HEADER_SIZE + INFO_HEADER_SIZE + PALETTE_BLOCK_SIZE;

/// Writes an image as an 8 bit palettized bitmap, bottom-up.
pub struct BmpImageWriter<'a, T: Write> {
    writer: T,
    image: &'a Image,
    palette: &'a Palette,
}

impl<'a, T: Write> BmpImageWriter<'a, T> {
    pub fn new(writer: T, image: &'a Image, palette: &'a Palette) -> Self {
        Self {
            writer,
            image,
            palette,
        }
    }

    fn stride(&self) -> usize {
        row_stride(self.image.width(), 1)
    }

    fn write_file_header(&mut self, image_size: u32) -> crate::Result<()> {
        let file_header = BitmapFileHeader {
            type_tag: BITMAP_TYPE_TAG,
            file_size: PIXEL_DATA_OFFSET as u32 + image_size,
            reserved1: 0,
            reserved2: 0,
            pixel_data_offset: PIXEL_DATA_OFFSET as u32,
        };
        self.writer.write_all(&file_header.to_le_bytes())?;
        Ok(())
    }

    fn write_info_header(&mut self, image_size: u32) -> crate::Result<()> {
        let info_header = BitmapInfoHeader {
            header_size: INFO_HEADER_SIZE as u32,
            width: self.image.width() as i32,
            // positive height: rows are stored bottom-up
            height: self.image.height() as i32,
            planes: 1,
            bit_count: BIT_COUNT,
            compression: UNCOMPRESSED,
            image_size,
            x_pixels_per_meter: 0,
            y_pixels_per_meter: 0,
            colors_used: PALETTE_SIZE as u32,
            colors_important: PALETTE_SIZE as u32,
        };
        self.writer.write_all(&info_header.to_le_bytes())?;
        Ok(())
    }

    fn write_palette(&mut self) -> crate::Result<()> {
        let mut block = Vec::with_capacity(PALETTE_BLOCK_SIZE);
        for entry in self.palette.entries() {
            block.extend_from_slice(&[entry.blue, entry.green, entry.red, 0]);
        }
        self.writer.write_all(&block)?;
        Ok(())
    }

    fn write_pixel_rows(&mut self, indices: &[u8]) -> crate::Result<()> {
        let width = self.image.width() as usize;
        let mut row_buffer = vec![0; self.stride()];
        for row_index in (0..self.image.height() as usize).rev() {
            let row_start = row_index * width;
            row_buffer[..width].copy_from_slice(&indices[row_start..row_start + width]);
            self.writer.write_all(&row_buffer)?;
        }
        Ok(())
    }
}

/// Size of the padded index rows; fails when a header field cannot hold it.
fn pixel_data_size(width: u32, height: u32) -> crate::Result<u32> {
    let too_large = || Error::ImageTooLargeForBitmap(width, height);
    i32::try_from(width).map_err(|_| too_large())?;
    i32::try_from(height).map_err(|_| too_large())?;
    let image_size = (row_stride(width, 1) as u64)
        .checked_mul(height as u64)
        .and_then(|size| u32::try_from(size).ok())
        .ok_or_else(too_large)?;
    image_size
        .checked_add(PIXEL_DATA_OFFSET as u32)
        .ok_or_else(too_large)?;
    Ok(image_size)
}

impl<T: Write> ImageWriter for BmpImageWriter<'_, T> {
    fn write_image(&mut self) -> crate::Result<()> {
        let image_size = pixel_data_size(self.image.width(), self.image.height())?;
        let indices = self.palette.quantize(self.image);
        self.write_file_header(image_size)?;
        self.write_info_header(image_size)?;
        self.write_palette()?;
        self.write_pixel_rows(&indices)?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{pixel_data_size, BmpImageWriter};
    use crate::{
        color::RGBColorFormat,
        error::Error,
        image::{
            bitmap::{BitmapFileHeader, BitmapInfoHeader},
            palette::Palette,
            Image, ImageWriter,
        },
    };

    fn encode(image: &Image) -> Vec<u8> {
        let palette = Palette::new();
        let mut output = Vec::new();
        BmpImageWriter::new(&mut output, image, &palette)
            .write_image()
            .expect("writing to a vector must not fail");
        output
    }

    fn three_by_two() -> Image {
        Image::from_dots(
            3,
            2,
            &[
                RGBColorFormat::new(255, 0, 0),
                RGBColorFormat::new(0, 255, 0),
                RGBColorFormat::new(0, 0, 255),
                RGBColorFormat::new(255, 255, 255),
                RGBColorFormat::new(0, 0, 0),
                RGBColorFormat::new(51, 51, 51),
            ],
        )
    }

    #[test]
    fn headers() {
        let output = encode(&three_by_two());
        let file_header = BitmapFileHeader::from_le_bytes(output[0..14].try_into().unwrap());
        let info_header = BitmapInfoHeader::from_le_bytes(output[14..54].try_into().unwrap());
        assert_eq!(&output[0..2], b"BM");
        assert_eq!(file_header.pixel_data_offset, 54 + 1024);
        assert_eq!(file_header.file_size, 54 + 1024 + 4 * 2);
        assert_eq!(file_header.file_size as usize, output.len());
        assert_eq!(info_header.header_size, 40);
        assert_eq!(info_header.width, 3);
        assert_eq!(info_header.height, 2);
        assert_eq!(info_header.planes, 1);
        assert_eq!(info_header.bit_count, 8);
        assert_eq!(info_header.compression, 0);
        assert_eq!(info_header.image_size, 8);
        assert_eq!(info_header.colors_used, 256);
        assert_eq!(info_header.colors_important, 256);
    }

    #[test]
    fn palette_block_is_bgr_reserved() {
        let output = encode(&three_by_two());
        let palette_block = &output[54..54 + 1024];
        // entry 5 is pure blue
        assert_eq!(&palette_block[5 * 4..6 * 4], &[255, 0, 0, 0]);
        // entry 180 is pure red
        assert_eq!(&palette_block[180 * 4..181 * 4], &[0, 0, 255, 0]);
        // entry 255 is the last gray
        assert_eq!(&palette_block[255 * 4..256 * 4], &[248, 248, 248, 0]);
    }

    #[test]
    fn rows_are_bottom_up_and_padded() {
        let output = encode(&three_by_two());
        let pixel_data = &output[54 + 1024..];
        // bottom row first: white, black, (51, 51, 51) = entry 43
        assert_eq!(&pixel_data[0..4], &[215, 0, 43, 0]);
        // top row: red, green, blue
        assert_eq!(&pixel_data[4..8], &[180, 30, 5, 0]);
    }

    #[test]
    fn four_pixel_rows_need_no_padding() {
        let image = Image::new(4, 1, vec![0; 4], vec![0; 4], vec![255; 4]);
        let output = encode(&image);
        assert_eq!(output.len(), 54 + 1024 + 4);
        assert_eq!(&output[54 + 1024..], &[5, 5, 5, 5]);
    }

    #[test]
    fn pixel_data_size_is_padded() {
        assert_eq!(pixel_data_size(3, 2).unwrap(), 8);
        assert_eq!(pixel_data_size(4, 2).unwrap(), 8);
    }

    #[test]
    fn pixel_data_size_beyond_four_gigabytes() {
        match pixel_data_size(70_000, 70_000) {
            Err(Error::ImageTooLargeForBitmap(70_000, 70_000)) => {}
            _ => panic!("Oversized bitmap not rejected"),
        }
    }

    #[test]
    fn width_beyond_header_range() {
        match pixel_data_size(0x8000_0000, 1) {
            Err(Error::ImageTooLargeForBitmap(_, _)) => {}
            _ => panic!("Width overflowing the info header not rejected"),
        }
    }
}
