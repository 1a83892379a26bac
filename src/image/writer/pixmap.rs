use std::io::Write;

use super::super::subpixel::SubpixelImage;
use super::super::ImageWriter;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixmapBitDepth {
    Ten,
    Twelve,
}

impl PixmapBitDepth {
    pub fn max_value(&self) -> u16 {
        match self {
            Self::Ten => 1023,
            Self::Twelve => 4095,
        }
    }

    pub fn bits(&self) -> u8 {
        match self {
            Self::Ten => 10,
            Self::Twelve => 12,
        }
    }
}

/// Writes an RGBG image as a binary P6 pixmap with 16 bit big endian samples.
///
/// Every pixel is expanded back to three channels; the channel the subpixel
/// pattern dropped is written as zero.
pub struct PixmapImageWriter<'a, T: Write> {
    writer: T,
    image: &'a SubpixelImage,
    bit_depth: PixmapBitDepth,
}

impl<'a, T: Write> PixmapImageWriter<'a, T> {
    pub fn new(writer: T, image: &'a SubpixelImage, bit_depth: PixmapBitDepth) -> Self {
        Self {
            writer,
            image,
            bit_depth,
        }
    }

    fn write_header(&mut self) -> crate::Result<()> {
        write!(
            self.writer,
            "P6\n{} {}\n{}\n",
            self.image.width(),
            self.image.height(),
            self.bit_depth.max_value()
        )?;
        Ok(())
    }

    fn write_samples(&mut self) -> crate::Result<()> {
        let max_value = self.bit_depth.max_value();
        for dot in self.image.unpacked_dots() {
            self.writer.write_all(&dot.scale_to(max_value).to_be_bytes())?;
        }
        Ok(())
    }
}

impl<T: Write> ImageWriter for PixmapImageWriter<'_, T> {
    fn write_image(&mut self) -> crate::Result<()> {
        self.write_header()?;
        self.write_samples()?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{PixmapBitDepth, PixmapImageWriter};
    use crate::{
        color::RGBColorFormat,
        image::{subpixel::SubpixelImage, Image, ImageWriter},
    };

    fn primaries() -> SubpixelImage {
        let image = Image::from_dots(
            2,
            2,
            &[
                RGBColorFormat::new(255, 0, 0),
                RGBColorFormat::new(0, 255, 0),
                RGBColorFormat::new(0, 0, 255),
                RGBColorFormat::new(255, 255, 255),
            ],
        );
        SubpixelImage::from(&image)
    }

    fn encode(image: &SubpixelImage, bit_depth: PixmapBitDepth) -> Vec<u8> {
        let mut output = Vec::new();
        PixmapImageWriter::new(&mut output, image, bit_depth)
            .write_image()
            .expect("writing to a vector must not fail");
        output
    }

    fn split_samples(bytes: &[u8]) -> Vec<u16> {
        bytes
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect()
    }

    #[test]
    fn ten_bit_header() {
        let output = encode(&primaries(), PixmapBitDepth::Ten);
        assert!(output.starts_with(b"P6\n2 2\n1023\n"));
    }

    #[test]
    fn twelve_bit_header() {
        let output = encode(&primaries(), PixmapBitDepth::Twelve);
        assert!(output.starts_with(b"P6\n2 2\n4095\n"));
    }

    #[test]
    fn sample_length_is_six_bytes_per_pixel() {
        let header_length = "P6\n2 2\n1023\n".len();
        let output = encode(&primaries(), PixmapBitDepth::Ten);
        assert_eq!(output.len() - header_length, 2 * 2 * 6);
    }

    #[test]
    fn ten_bit_samples_of_primaries() {
        let header_length = "P6\n2 2\n1023\n".len();
        let output = encode(&primaries(), PixmapBitDepth::Ten);
        let samples = split_samples(&output[header_length..]);
        #[rustfmt::skip]
        let expected = [
            // (0, 0) [R, G] = [255, 0]
            1023, 0, 0,
            // (1, 0) [G, B] = [255, 0]
            0, 1023, 0,
            // (0, 1) [B, G] = [255, 0]
            0, 0, 1023,
            // (1, 1) [R, G] = [255, 255]
            1023, 1023, 0,
        ];
        assert_eq!(samples, expected);
    }

    #[test]
    fn twelve_bit_samples_are_big_endian() {
        let image = SubpixelImage::from(&Image::from_dots(
            1,
            1,
            &[RGBColorFormat::new(128, 1, 77)],
        ));
        let header_length = "P6\n1 1\n4095\n".len();
        let output = encode(&image, PixmapBitDepth::Twelve);
        // 128 * 4095 / 255 = 2055 = 0x0807, 1 * 4095 / 255 = 16 = 0x0010
        assert_eq!(&output[header_length..], &[0x08, 0x07, 0x00, 0x10, 0x00, 0x00]);
    }

    #[test]
    fn bit_depth_properties() {
        assert_eq!(PixmapBitDepth::Ten.max_value(), 1023);
        assert_eq!(PixmapBitDepth::Twelve.max_value(), 4095);
        assert_eq!(PixmapBitDepth::Ten.bits(), 10);
        assert_eq!(PixmapBitDepth::Twelve.bits(), 12);
    }
}
