use std::fmt::Display;

use super::Image;
use crate::color::RGBColorFormat;

/// Which two channels of a pixel survive in the RGBG layout.
///
/// The panel tiles these in a fixed 2x2 arrangement:
///
/// ```text
/// even row: [R, G] [G, B] [R, G] [G, B] ...
/// odd row:  [B, G] [R, G] [B, G] [R, G] ...
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubpixelPattern {
    RedGreen,
    GreenBlue,
    BlueGreen,
}

impl SubpixelPattern {
    pub fn at(column_index: u32, row_index: u32) -> Self {
        match (row_index % 2, column_index % 2) {
            (0, 0) => Self::RedGreen,
            (0, _) => Self::GreenBlue,
            (_, 0) => Self::BlueGreen,
            // odd/odd repeats the even/even pair, matching the panel geometry
            _ => Self::RedGreen,
        }
    }

    pub fn pack(&self, dot: &RGBColorFormat<u8>) -> [u8; 2] {
        match self {
            Self::RedGreen => [dot.red, dot.green],
            Self::GreenBlue => [dot.green, dot.blue],
            Self::BlueGreen => [dot.blue, dot.green],
        }
    }

    /// Inverse of [`Self::pack`]; the dropped channel comes back as zero.
    pub fn unpack(&self, bytes: [u8; 2]) -> RGBColorFormat<u8> {
        let [first, second] = bytes;
        match self {
            Self::RedGreen => RGBColorFormat::new(first, second, 0),
            Self::GreenBlue => RGBColorFormat::new(0, first, second),
            Self::BlueGreen => RGBColorFormat::new(0, second, first),
        }
    }
}

impl Display for SubpixelPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RedGreen => write!(f, "[R, G]"),
            Self::GreenBlue => write!(f, "[G, B]"),
            Self::BlueGreen => write!(f, "[B, G]"),
        }
    }
}

/// Image packed into two bytes per pixel for the display IP.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubpixelImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl SubpixelImage {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn pair(&self, column_index: u32, row_index: u32) -> [u8; 2] {
        let index = (row_index as usize * self.width as usize + column_index as usize) * 2;
        [self.data[index], self.data[index + 1]]
    }

    pub fn unpacked_dot(&self, column_index: u32, row_index: u32) -> RGBColorFormat<u8> {
        SubpixelPattern::at(column_index, row_index).unpack(self.pair(column_index, row_index))
    }

    /// Unpacked pixels in row-major order.
    pub fn unpacked_dots(&self) -> impl Iterator<Item = RGBColorFormat<u8>> + '_ {
        let width = self.width.max(1) as usize;
        self.data
            .chunks_exact(2)
            .enumerate()
            .map(move |(index, pair)| {
                let column_index = (index % width) as u32;
                let row_index = (index / width) as u32;
                SubpixelPattern::at(column_index, row_index).unpack([pair[0], pair[1]])
            })
    }
}

impl From<&Image> for SubpixelImage {
    fn from(image: &Image) -> Self {
        let mut data = Vec::with_capacity(image.pixel_count() * 2);
        for row_index in 0..image.height() {
            for column_index in 0..image.width() {
                let dot = image.dot(column_index, row_index);
                data.extend_from_slice(&SubpixelPattern::at(column_index, row_index).pack(&dot));
            }
        }
        SubpixelImage {
            width: image.width(),
            height: image.height(),
            data,
        }
    }
}
