use crate::color::RGBColorFormat;

pub mod bitmap;
pub mod palette;
pub mod reader;
pub mod subpixel;
pub mod writer;

pub trait ImageReader<T> {
    fn read_image(&mut self) -> crate::Result<T>;
}

pub trait ImageWriter {
    fn write_image(&mut self) -> crate::Result<()>;
}

/// Decoded image with planar 8 bit channels, rows stored top to bottom.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    red: ColorChannel<u8>,
    green: ColorChannel<u8>,
    blue: ColorChannel<u8>,
}

impl Image {
    pub fn new(width: u32, height: u32, red: Vec<u8>, green: Vec<u8>, blue: Vec<u8>) -> Self {
        let pixel_count = width as usize * height as usize;
        debug_assert!(
            red.len() == pixel_count && green.len() == pixel_count && blue.len() == pixel_count,
            "every channel must hold width * height dots"
        );
        Self {
            width,
            height,
            red: ColorChannel::new(width, red),
            green: ColorChannel::new(width, green),
            blue: ColorChannel::new(width, blue),
        }
    }

    #[cfg(test)]
    pub fn from_dots(width: u32, height: u32, dots: &[RGBColorFormat<u8>]) -> Self {
        let red = dots.iter().map(|dot| dot.red).collect();
        let green = dots.iter().map(|dot| dot.green).collect();
        let blue = dots.iter().map(|dot| dot.blue).collect();
        Self::new(width, height, red, green, blue)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn red_channel(&self) -> &ColorChannel<u8> {
        &self.red
    }

    pub fn green_channel(&self) -> &ColorChannel<u8> {
        &self.green
    }

    pub fn blue_channel(&self) -> &ColorChannel<u8> {
        &self.blue
    }

    pub fn dot(&self, column_index: u32, row_index: u32) -> RGBColorFormat<u8> {
        RGBColorFormat::new(
            self.red.dot(column_index, row_index),
            self.green.dot(column_index, row_index),
            self.blue.dot(column_index, row_index),
        )
    }

    pub fn dot_at(&self, pixel_index: usize) -> RGBColorFormat<u8> {
        RGBColorFormat::new(
            self.red.dots[pixel_index],
            self.green.dots[pixel_index],
            self.blue.dots[pixel_index],
        )
    }

    /// All pixels in row-major order.
    pub fn dots(&self) -> impl Iterator<Item = RGBColorFormat<u8>> + '_ {
        self.red
            .dots
            .iter()
            .zip(self.green.dots.iter())
            .zip(self.blue.dots.iter())
            .map(|((&red, &green), &blue)| RGBColorFormat::new(red, green, blue))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorChannel<T> {
    dots: Vec<T>,
    width: u32,
}

impl<T> ColorChannel<T>
where
    T: Clone + Copy,
{
    pub fn new(width: u32, dots: Vec<T>) -> Self {
        Self { dots, width }
    }

    pub fn dot(&self, column_index: u32, row_index: u32) -> T {
        let index = column_index as usize + row_index as usize * self.width as usize;
        self.dots[index]
    }

    pub fn dots(&self) -> &[T] {
        &self.dots
    }
}
