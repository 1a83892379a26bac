use std::{
    fs::{self, File, OpenOptions},
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
    sync::mpsc,
};

pub use cli::CLIParser;
use config::Configuration;
use error::Error;
use image::{
    palette::Palette,
    reader::bmp::BmpImageReader,
    subpixel::SubpixelImage,
    writer::{
        bmp::BmpImageWriter,
        pixmap::{PixmapBitDepth, PixmapImageWriter},
    },
    Image, ImageReader, ImageWriter,
};
use threadpool::ThreadPool;

mod cli;
pub mod color;
pub mod config;
mod diagnostics;
pub mod error;
pub mod image;
mod logger;

pub type Result<T> = std::result::Result<T, error::Error>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    SampleConversion,
    PixmapSelfTest,
    SubpixelSelfTest,
    PrintConfiguration,
    Convert(Vec<PathBuf>),
}

pub struct Arguments {
    mode: Mode,
    config_file: PathBuf,
    output_directory: PathBuf,
    sample_file: PathBuf,
    number_of_threads: usize,
}

/// Files written for one converted bitmap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversionOutput {
    pub ten_bit_pixmap: PathBuf,
    pub twelve_bit_pixmap: PathBuf,
    pub palettized_bitmap: PathBuf,
}

fn path_to_string(file_path: &Path) -> String {
    file_path.to_string_lossy().into_owned()
}

fn open_input_file(file_path: &Path) -> Result<File> {
    File::open(file_path)
        .map_err(|e| Error::UnableToOpenInputFileForReading(path_to_string(file_path), e))
}

fn create_parent_directories(file_path: &Path) -> Result<()> {
    match file_path.parent() {
        Some(directory) if !directory.as_os_str().is_empty() => fs::create_dir_all(directory)
            .map_err(|e| Error::UnableToCreateOutputDirectory(path_to_string(directory), e)),
        _ => Ok(()),
    }
}

fn open_output_file(file_path: &Path) -> Result<File> {
    create_parent_directories(file_path)?;
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(file_path)
        .map_err(|e| Error::UnableToOpenOutputFileForWriting(path_to_string(file_path), e))
}

/// Decodes an uncompressed 24 bit bitmap.
pub fn decode_bitmap(file_path: &Path) -> Result<Image> {
    let input_file = open_input_file(file_path)?;
    let mut reader = BmpImageReader::new(BufReader::new(input_file));
    reader.read_image()
}

pub fn write_pixmap(
    image: &SubpixelImage,
    bit_depth: PixmapBitDepth,
    file_path: &Path,
) -> Result<()> {
    let output_file = open_output_file(file_path)?;
    let mut writer = PixmapImageWriter::new(BufWriter::new(output_file), image, bit_depth);
    writer.write_image()?;
    log::info!(
        "{} bit PPM file written: {}",
        bit_depth.bits(),
        file_path.display()
    );
    Ok(())
}

pub fn write_palettized_bitmap(image: &Image, file_path: &Path) -> Result<()> {
    let output_file = open_output_file(file_path)?;
    let palette = Palette::new();
    let mut writer = BmpImageWriter::new(BufWriter::new(output_file), image, &palette);
    writer.write_image()?;
    log::info!("8 bit BMP file written: {}", file_path.display());
    Ok(())
}

pub fn output_paths(input_file: &Path, output_directory: &Path) -> ConversionOutput {
    let stem = input_file
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("image"));
    ConversionOutput {
        ten_bit_pixmap: output_directory.join(format!("{}_10bit.ppm", stem)),
        twelve_bit_pixmap: output_directory.join(format!("{}_12bit.ppm", stem)),
        palettized_bitmap: output_directory.join(format!("{}_8bit.bmp", stem)),
    }
}

/// Decodes `input_file` and writes its 10 bit, 12 bit and 8 bit renditions.
pub fn convert_bitmap(input_file: &Path, output_directory: &Path) -> Result<ConversionOutput> {
    log::info!("Reading BMP file: {}", input_file.display());
    let image = decode_bitmap(input_file)?;
    diagnostics::log_image_summary(&image, input_file);
    let subpixel_image = SubpixelImage::from(&image);
    let head_length = subpixel_image.data().len().min(8);
    logger::log_byte_pairs("RGBG head:", &subpixel_image.data()[..head_length]);
    let outputs = output_paths(input_file, output_directory);
    write_pixmap(&subpixel_image, PixmapBitDepth::Ten, &outputs.ten_bit_pixmap)?;
    write_pixmap(&subpixel_image, PixmapBitDepth::Twelve, &outputs.twelve_bit_pixmap)?;
    write_palettized_bitmap(&image, &outputs.palettized_bitmap)?;
    Ok(outputs)
}

/// Converts every input, continuing past failures.
///
/// Inputs are spread over a thread pool; each job owns its buffers.
pub fn convert_bitmaps(
    input_files: &[PathBuf],
    output_directory: &Path,
    number_of_threads: usize,
) -> Result<()> {
    let total = input_files.len();
    let threadpool = ThreadPool::new(number_of_threads.clamp(1, total.max(1)));
    let (sender, receiver) = mpsc::channel();
    for (index, input_file) in input_files.iter().enumerate() {
        let sender = sender.clone();
        let input_file = input_file.clone();
        let output_directory = output_directory.to_path_buf();
        threadpool.execute(move || {
            let result = convert_bitmap(&input_file, &output_directory);
            let _ = sender.send((index, input_file, result));
        });
    }
    drop(sender);
    let mut results: Vec<_> = receiver.iter().collect();
    results.sort_by_key(|(index, _, _)| *index);
    let mut failed = total - results.len();
    for (_, input_file, result) in results {
        if let Err(e) = result {
            log::error!("Conversion of {} failed: {}", input_file.display(), e);
            failed += 1;
        }
    }
    if failed > 0 {
        return Err(Error::ConversionsFailed(failed, total));
    }
    Ok(())
}

fn load_configuration(config_file: &Path) -> Configuration {
    match Configuration::load(config_file) {
        Ok(configuration) => configuration,
        Err(e) => {
            log::warn!("{}. Using default configuration.", e);
            Configuration::default()
        }
    }
}

pub fn run(arguments: &Arguments) -> Result<()> {
    let configuration = load_configuration(&arguments.config_file);
    match &arguments.mode {
        Mode::SampleConversion => diagnostics::run_sample_conversion(&arguments.sample_file),
        Mode::PixmapSelfTest => {
            diagnostics::run_pixmap_self_test(&arguments.sample_file, &arguments.output_directory)
        }
        Mode::SubpixelSelfTest => diagnostics::run_subpixel_self_test(&arguments.sample_file),
        Mode::PrintConfiguration => {
            println!("{}", configuration);
            Ok(())
        }
        Mode::Convert(input_files) => convert_bitmaps(
            input_files,
            &arguments.output_directory,
            arguments.number_of_threads,
        ),
    }
}
