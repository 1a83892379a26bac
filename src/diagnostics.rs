use std::{
    fs::{self, File},
    io::BufReader,
    path::Path,
};

use crate::{
    decode_bitmap,
    error::Error,
    image::{
        reader::pixmap::{Pixmap, PixmapReader},
        subpixel::{SubpixelImage, SubpixelPattern},
        writer::pixmap::PixmapBitDepth,
        Image,
    },
    logger, write_pixmap,
};

const PIXMAP_SELF_TEST_STEM: &str = "test_256GRAY";
const VERIFIED_PIXMAP_DOTS: usize = 4;
const VERIFIED_SUBPIXEL_DOTS: usize = 10;

pub fn log_image_summary(image: &Image, file_path: &Path) {
    log::info!("File: {}", file_path.display());
    log::info!("Size: {} x {}", image.width(), image.height());
    log::info!("Pixel count: {}", image.pixel_count());
}

/// Indices of the first five, the middle three and the last three dots.
fn sample_dot_indices(pixel_count: usize) -> Vec<usize> {
    let middle = pixel_count / 2;
    let mut indices: Vec<usize> = (0..5).collect();
    indices.extend(middle..middle + 3);
    indices.extend((1..=3).rev().filter_map(|offset| pixel_count.checked_sub(offset)));
    indices.retain(|index| *index < pixel_count);
    indices
}

fn log_sample_dots(image: &Image, subpixel_image: &SubpixelImage) {
    for index in sample_dot_indices(image.pixel_count()) {
        let column_index = (index % image.width() as usize) as u32;
        let row_index = (index / image.width() as usize) as u32;
        let dot = image.dot_at(index);
        log::info!(
            "Pixel {:>8} ({:>4}, {:>4}): RGB({:>3}, {:>3}, {:>3}) -> {} {:02X?}",
            index,
            column_index,
            row_index,
            dot.red,
            dot.green,
            dot.blue,
            SubpixelPattern::at(column_index, row_index),
            subpixel_image.pair(column_index, row_index)
        );
    }
}

pub fn run_sample_conversion(sample_file: &Path) -> crate::Result<()> {
    log::info!("Reading BMP file: {}", sample_file.display());
    let image = decode_bitmap(sample_file)?;
    log_image_summary(&image, sample_file);
    let subpixel_image = SubpixelImage::from(&image);
    log::info!(
        "RGBG data: {} bytes for {} pixels",
        subpixel_image.data().len(),
        subpixel_image.pixel_count()
    );
    log_sample_dots(&image, &subpixel_image);
    Ok(())
}

fn pixmap_header_length(pixmap: &Pixmap) -> u64 {
    format!("P6\n{} {}\n{}\n", pixmap.width, pixmap.height, pixmap.max_value).len() as u64
}

fn read_pixmap(file_path: &Path) -> crate::Result<Pixmap> {
    let input_file = File::open(file_path).map_err(|e| {
        Error::UnableToOpenInputFileForReading(file_path.to_string_lossy().into_owned(), e)
    })?;
    PixmapReader::new(BufReader::new(input_file)).read_pixmap()
}

fn verify_pixmap(
    file_path: &Path,
    subpixel_image: &SubpixelImage,
    bit_depth: PixmapBitDepth,
) -> crate::Result<()> {
    let pixmap = read_pixmap(file_path)?;
    if pixmap.width != subpixel_image.width()
        || pixmap.height != subpixel_image.height()
        || pixmap.max_value != bit_depth.max_value()
    {
        return Err(Error::VerificationFailed(format!(
            "header of {} is {} x {} max {}, expected {} x {} max {}",
            file_path.display(),
            pixmap.width,
            pixmap.height,
            pixmap.max_value,
            subpixel_image.width(),
            subpixel_image.height(),
            bit_depth.max_value()
        )));
    }

    let expected_length = pixmap_header_length(&pixmap) + subpixel_image.pixel_count() as u64 * 6;
    let actual_length = fs::metadata(file_path)
        .map_err(Error::FailedToReadImageData)?
        .len();
    if actual_length != expected_length {
        return Err(Error::VerificationFailed(format!(
            "{} has {} bytes, expected {}",
            file_path.display(),
            actual_length,
            expected_length
        )));
    }

    let width = subpixel_image.width() as usize;
    for index in 0..subpixel_image.pixel_count().min(VERIFIED_PIXMAP_DOTS) {
        let column_index = (index % width) as u32;
        let row_index = (index / width) as u32;
        let expected = subpixel_image
            .unpacked_dot(column_index, row_index)
            .scale_to(bit_depth.max_value());
        let expected = [expected.red, expected.green, expected.blue];
        let actual = pixmap.dot(column_index, row_index);
        if actual != expected {
            return Err(Error::VerificationFailed(format!(
                "pixel {} of {} is {:?}, expected {:?}",
                index,
                file_path.display(),
                actual,
                expected
            )));
        }
        log::info!(
            "Pixel {} ({}): {:?} OK",
            index,
            SubpixelPattern::at(column_index, row_index),
            actual
        );
    }
    Ok(())
}

/// Writes the sample as 10 and 12 bit pixmaps and reads both back.
pub fn run_pixmap_self_test(sample_file: &Path, output_directory: &Path) -> crate::Result<()> {
    let image = decode_bitmap(sample_file)?;
    log_image_summary(&image, sample_file);
    let subpixel_image = SubpixelImage::from(&image);
    for bit_depth in [PixmapBitDepth::Ten, PixmapBitDepth::Twelve] {
        let file_path = output_directory.join(format!(
            "{}_{}bit.ppm",
            PIXMAP_SELF_TEST_STEM,
            bit_depth.bits()
        ));
        write_pixmap(&subpixel_image, bit_depth, &file_path)?;
        verify_pixmap(&file_path, &subpixel_image, bit_depth)?;
        log::info!("{} bit PPM verification passed", bit_depth.bits());
    }
    Ok(())
}

fn verify_subpixel_dot(
    image: &Image,
    subpixel_image: &SubpixelImage,
    column_index: u32,
    row_index: u32,
) -> crate::Result<()> {
    let pattern = SubpixelPattern::at(column_index, row_index);
    let expected = pattern.pack(&image.dot(column_index, row_index));
    let actual = subpixel_image.pair(column_index, row_index);
    if actual != expected {
        return Err(Error::VerificationFailed(format!(
            "pixel ({}, {}) packed as {:02X?}, expected {} {:02X?}",
            column_index, row_index, actual, pattern, expected
        )));
    }
    Ok(())
}

/// Checks the packed bytes of the leading 2x2 tile and the first dots.
pub fn run_subpixel_self_test(sample_file: &Path) -> crate::Result<()> {
    let image = decode_bitmap(sample_file)?;
    log_image_summary(&image, sample_file);
    let subpixel_image = SubpixelImage::from(&image);
    logger::log_byte_pairs(
        "RGBG head:",
        &subpixel_image.data()[..subpixel_image.data().len().min(VERIFIED_SUBPIXEL_DOTS * 2)],
    );

    for row_index in 0..image.height().min(2) {
        for column_index in 0..image.width().min(2) {
            verify_subpixel_dot(&image, &subpixel_image, column_index, row_index)?;
            log::info!(
                "Tile ({}, {}): {} OK",
                column_index,
                row_index,
                SubpixelPattern::at(column_index, row_index)
            );
        }
    }

    let width = image.width() as usize;
    for index in 0..image.pixel_count().min(VERIFIED_SUBPIXEL_DOTS) {
        verify_subpixel_dot(
            &image,
            &subpixel_image,
            (index % width) as u32,
            (index / width) as u32,
        )?;
    }
    log::info!("RGBG verification passed");
    Ok(())
}
