/// A single 8 bit per channel colour value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RGBColorFormat<T> {
    pub red: T,
    pub green: T,
    pub blue: T,
}

/// A colour whose channels are expressed relative to `max` instead of 255.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RangeColorFormat<T> {
    pub max: T,
    pub red: T,
    pub green: T,
    pub blue: T,
}

impl<T> RGBColorFormat<T> {
    pub const fn new(red: T, green: T, blue: T) -> Self {
        RGBColorFormat { red, green, blue }
    }
}

impl RGBColorFormat<u8> {
    pub fn squared_distance(&self, other: &RGBColorFormat<u8>) -> u32 {
        let delta_red = self.red as i32 - other.red as i32;
        let delta_green = self.green as i32 - other.green as i32;
        let delta_blue = self.blue as i32 - other.blue as i32;
        (delta_red * delta_red + delta_green * delta_green + delta_blue * delta_blue) as u32
    }

    pub fn scale_to(&self, max: u16) -> RangeColorFormat<u16> {
        RangeColorFormat {
            max,
            red: scale_channel(self.red, max),
            green: scale_channel(self.green, max),
            blue: scale_channel(self.blue, max),
        }
    }
}

/// Expands an 8 bit value to `0..=max`, truncating.
pub fn scale_channel(value: u8, max: u16) -> u16 {
    (value as u32 * max as u32 / u8::MAX as u32) as u16
}

impl RangeColorFormat<u16> {
    /// Red, green, blue as big endian 16 bit samples.
    pub fn to_be_bytes(&self) -> [u8; 6] {
        let [red_high, red_low] = self.red.to_be_bytes();
        let [green_high, green_low] = self.green.to_be_bytes();
        let [blue_high, blue_low] = self.blue.to_be_bytes();
        [red_high, red_low, green_high, green_low, blue_high, blue_low]
    }
}
