//! On-disk layout of uncompressed Windows bitmaps.

pub const FILE_HEADER_SIZE: usize = 14;
pub const INFO_HEADER_SIZE: usize = 40;
/// `BM` read as a little endian u16.
pub const BITMAP_TYPE_TAG: u16 = 0x4D42;
pub const UNCOMPRESSED: u32 = 0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitmapFileHeader {
    pub type_tag: u16,
    pub file_size: u32,
    pub reserved1: u16,
    pub reserved2: u16,
    pub pixel_data_offset: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitmapInfoHeader {
    pub header_size: u32,
    pub width: i32,
    /// Negative for top-down row order.
    pub height: i32,
    pub planes: u16,
    pub bit_count: u16,
    pub compression: u32,
    pub image_size: u32,
    pub x_pixels_per_meter: i32,
    pub y_pixels_per_meter: i32,
    pub colors_used: u32,
    pub colors_important: u32,
}

/// Row length in bytes, padded to a multiple of four.
pub fn row_stride(width: u32, bytes_per_pixel: u32) -> usize {
    (width as usize * bytes_per_pixel as usize).div_ceil(4) * 4
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn read_i32(bytes: &[u8], offset: usize) -> i32 {
    read_u32(bytes, offset) as i32
}

impl BitmapFileHeader {
    pub fn from_le_bytes(bytes: &[u8; FILE_HEADER_SIZE]) -> Self {
        Self {
            type_tag: read_u16(bytes, 0),
            file_size: read_u32(bytes, 2),
            reserved1: read_u16(bytes, 6),
            reserved2: read_u16(bytes, 8),
            pixel_data_offset: read_u32(bytes, 10),
        }
    }

    pub fn to_le_bytes(&self) -> [u8; FILE_HEADER_SIZE] {
        let mut bytes = [0; FILE_HEADER_SIZE];
        bytes[0..2].copy_from_slice(&self.type_tag.to_le_bytes());
        bytes[2..6].copy_from_slice(&self.file_size.to_le_bytes());
        bytes[6..8].copy_from_slice(&self.reserved1.to_le_bytes());
        bytes[8..10].copy_from_slice(&self.reserved2.to_le_bytes());
        bytes[10..14].copy_from_slice(&self.pixel_data_offset.to_le_bytes());
        bytes
    }
}

impl BitmapInfoHeader {
    pub fn from_le_bytes(bytes: &[u8; INFO_HEADER_SIZE]) -> Self {
        Self {
            header_size: read_u32(bytes, 0),
            width: read_i32(bytes, 4),
            height: read_i32(bytes, 8),
            planes: read_u16(bytes, 12),
            bit_count: read_u16(bytes, 14),
            compression: read_u32(bytes, 16),
            image_size: read_u32(bytes, 20),
            x_pixels_per_meter: read_i32(bytes, 24),
            y_pixels_per_meter: read_i32(bytes, 28),
            colors_used: read_u32(bytes, 32),
            colors_important: read_u32(bytes, 36),
        }
    }

    pub fn to_le_bytes(&self) -> [u8; INFO_HEADER_SIZE] {
        let mut bytes = [0; INFO_HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.header_size.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.width.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.height.to_le_bytes());
        bytes[12..14].copy_from_slice(&self.planes.to_le_bytes());
        bytes[14..16].copy_from_slice(&self.bit_count.to_le_bytes());
        bytes[16..20].copy_from_slice(&self.compression.to_le_bytes());
        bytes[20..24].copy_from_slice(&self.image_size.to_le_bytes());
        bytes[24..28].copy_from_slice(&self.x_pixels_per_meter.to_le_bytes());
        bytes[28..32].copy_from_slice(&self.y_pixels_per_meter.to_le_bytes());
        bytes[32..36].copy_from_slice(&self.colors_used.to_le_bytes());
        bytes[36..40].copy_from_slice(&self.colors_important.to_le_bytes());
        bytes
    }

    pub fn is_top_down(&self) -> bool {
        self.height < 0
    }
}

#[cfg(test)]
mod test {
    use super::{row_stride, BitmapFileHeader, BitmapInfoHeader, BITMAP_TYPE_TAG};

    #[test]
    fn stride_is_four_byte_aligned() {
        assert_eq!(row_stride(1, 3), 4);
        assert_eq!(row_stride(2, 3), 8);
        assert_eq!(row_stride(4, 3), 12);
        assert_eq!(row_stride(5, 3), 16);
        assert_eq!(row_stride(1, 1), 4);
        assert_eq!(row_stride(4, 1), 4);
        assert_eq!(row_stride(5, 1), 8);
        assert_eq!(row_stride(1080, 3), 3240);
    }

    #[test]
    fn file_header_layout() {
        let header = BitmapFileHeader {
            type_tag: BITMAP_TYPE_TAG,
            file_size: 0x0102_0304,
            reserved1: 0,
            reserved2: 0,
            pixel_data_offset: 54,
        };
        let bytes = header.to_le_bytes();
        assert_eq!(&bytes[0..2], b"BM");
        assert_eq!(&bytes[2..6], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(&bytes[10..14], &[54, 0, 0, 0]);
        assert_eq!(BitmapFileHeader::from_le_bytes(&bytes), header);
    }

    #[test]
    fn negative_height_is_top_down() {
        let mut bytes = [0_u8; 40];
        bytes[0] = 40;
        bytes[4..8].copy_from_slice(&3_i32.to_le_bytes());
        bytes[8..12].copy_from_slice(&(-2_i32).to_le_bytes());
        bytes[14..16].copy_from_slice(&24_u16.to_le_bytes());
        let header = BitmapInfoHeader::from_le_bytes(&bytes);
        assert_eq!(header.width, 3);
        assert_eq!(header.height, -2);
        assert_eq!(header.bit_count, 24);
        assert!(header.is_top_down());
        assert_eq!(header.to_le_bytes(), bytes);
    }
}
