use super::Image;
use crate::color::RGBColorFormat;

pub const PALETTE_SIZE: usize = 256;
const LEVELS_PER_CHANNEL: u32 = 6;
const COLOR_CUBE_SIZE: usize = 216;
const GRAY_RAMP_SIZE: u32 = (PALETTE_SIZE - COLOR_CUBE_SIZE) as u32;

/// Fixed 256 colour table: a 6x6x6 colour cube followed by a 40 step gray ramp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    entries: [RGBColorFormat<u8>; PALETTE_SIZE],
}

fn cube_level_value(level: u32) -> u8 {
    (level * 255 / (LEVELS_PER_CHANNEL - 1)) as u8
}

fn gray_ramp_value(palette_index: usize) -> u8 {
    ((palette_index - COLOR_CUBE_SIZE) as u32 * 255 / GRAY_RAMP_SIZE) as u8
}

impl Palette {
    pub fn new() -> Self {
        let mut entries = [RGBColorFormat::default(); PALETTE_SIZE];
        let mut palette_index = 0;
        for red_level in 0..LEVELS_PER_CHANNEL {
            for green_level in 0..LEVELS_PER_CHANNEL {
                for blue_level in 0..LEVELS_PER_CHANNEL {
                    entries[palette_index] = RGBColorFormat::new(
                        cube_level_value(red_level),
                        cube_level_value(green_level),
                        cube_level_value(blue_level),
                    );
                    palette_index += 1;
                }
            }
        }
        for (palette_index, entry) in entries.iter_mut().enumerate().skip(COLOR_CUBE_SIZE) {
            let gray = gray_ramp_value(palette_index);
            *entry = RGBColorFormat::new(gray, gray, gray);
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[RGBColorFormat<u8>; PALETTE_SIZE] {
        &self.entries
    }

    pub fn entry(&self, palette_index: u8) -> RGBColorFormat<u8> {
        self.entries[palette_index as usize]
    }

    /// Index of the closest entry; the lowest index wins ties.
    pub fn nearest_index(&self, dot: &RGBColorFormat<u8>) -> u8 {
        let mut best_index = 0;
        let mut best_distance = u32::MAX;
        for (palette_index, entry) in self.entries.iter().enumerate() {
            let distance = dot.squared_distance(entry);
            if distance < best_distance {
                best_distance = distance;
                best_index = palette_index;
            }
        }
        best_index as u8
    }

    /// One palette index per pixel, row-major.
    pub fn quantize(&self, image: &Image) -> Vec<u8> {
        image.dots().map(|dot| self.nearest_index(&dot)).collect()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::{Palette, PALETTE_SIZE};
    use crate::{color::RGBColorFormat, image::Image};

    #[test]
    fn cube_corners() {
        let palette = Palette::new();
        assert_eq!(palette.entry(0), RGBColorFormat::new(0, 0, 0));
        assert_eq!(palette.entry(1), RGBColorFormat::new(0, 0, 51));
        assert_eq!(palette.entry(6), RGBColorFormat::new(0, 51, 0));
        assert_eq!(palette.entry(36), RGBColorFormat::new(51, 0, 0));
        assert_eq!(palette.entry(215), RGBColorFormat::new(255, 255, 255));
    }

    #[test]
    fn gray_ramp() {
        let palette = Palette::new();
        assert_eq!(palette.entry(216), RGBColorFormat::new(0, 0, 0));
        assert_eq!(palette.entry(217), RGBColorFormat::new(6, 6, 6));
        assert_eq!(palette.entry(236), RGBColorFormat::new(127, 127, 127));
        // 39 * 255 / 40 truncates to 248
        assert_eq!(palette.entry(255), RGBColorFormat::new(248, 248, 248));
    }

    #[test]
    fn palette_is_deterministic() {
        let first = Palette::new();
        let second = Palette::default();
        assert_eq!(first.entries().len(), PALETTE_SIZE);
        assert_eq!(first, second);
    }

    #[test]
    fn exact_matches_map_to_their_index() {
        let palette = Palette::new();
        assert_eq!(palette.nearest_index(&RGBColorFormat::new(255, 0, 0)), 180);
        assert_eq!(palette.nearest_index(&RGBColorFormat::new(0, 255, 0)), 30);
        assert_eq!(palette.nearest_index(&RGBColorFormat::new(0, 0, 255)), 5);
        assert_eq!(palette.nearest_index(&RGBColorFormat::new(255, 255, 255)), 215);
        assert_eq!(palette.nearest_index(&RGBColorFormat::new(6, 6, 6)), 217);
    }

    #[test]
    fn ties_keep_lowest_index() {
        let palette = Palette::new();
        // black is both entry 0 and entry 216
        assert_eq!(palette.nearest_index(&RGBColorFormat::new(0, 0, 0)), 0);
        // (3, 3, 3) is 27 away from entry 0 (0, 0, 0) and entry 217 (6, 6, 6)
        assert_eq!(palette.nearest_index(&RGBColorFormat::new(3, 3, 3)), 0);
    }

    #[test]
    fn quantize_image() {
        let image = Image::from_dots(
            2,
            2,
            &[
                RGBColorFormat::new(255, 0, 0),
                RGBColorFormat::new(0, 255, 0),
                RGBColorFormat::new(0, 0, 255),
                RGBColorFormat::new(254, 254, 254),
            ],
        );
        let indices = Palette::new().quantize(&image);
        assert_eq!(indices, vec![180, 30, 5, 215]);
    }
}
