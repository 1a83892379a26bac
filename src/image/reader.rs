pub mod bmp;
pub mod pixmap;
