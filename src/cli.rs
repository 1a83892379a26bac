use crate::{Arguments, Mode};
use clap::{
    arg, crate_authors, crate_description, crate_name, crate_version, value_parser, Arg,
    ArgAction, ArgGroup, ArgMatches, Command,
};
use std::ffi::OsString;
use std::path::PathBuf;
use std::{io, process, thread};

const DEFAULT_CONFIG_FILE: &str = "config.txt";
const DEFAULT_OUTPUT_DIRECTORY: &str = "test_out/img";
const DEFAULT_SAMPLE_FILE: &str = "test_img/1080x2392/256GRAY.bmp";
const USAGE_ERROR_EXIT_CODE: i32 = 1;

pub struct CLIParser {
    command: Command,
}

impl CLIParser {
    pub fn new() -> Self {
        let command = Self::create_base_command();
        let command = Self::register_arguments(command);
        CLIParser { command }
    }

    pub fn parse<I, T>(&mut self, itr: I) -> Arguments
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self
            .command
            .try_get_matches_from_mut(itr)
            .unwrap_or_else(|e| {
                if !e.use_stderr() {
                    e.exit()
                }
                let _ = e.print();
                process::exit(USAGE_ERROR_EXIT_CODE)
            });
        Self::extract_arguments(&matches)
    }

    fn register_arguments(command: Command) -> Command {
        let command = Self::register_input_files_argument(command);
        let command = Self::register_mode_arguments(command);
        let command = Self::register_config_file_argument(command);
        let command = Self::register_output_directory_argument(command);
        let command = Self::register_sample_file_argument(command);
        Self::register_threads_argument(command)
    }

    fn register_input_files_argument(command: Command) -> Command {
        command.arg(Self::create_input_files_argument())
    }

    fn register_mode_arguments(command: Command) -> Command {
        command
            .arg(Self::create_test_ppm_argument())
            .arg(Self::create_verify_rgbg_argument())
            .arg(Self::create_print_config_argument())
            .group(Self::create_mode_group())
    }

    fn register_config_file_argument(command: Command) -> Command {
        command.arg(Self::create_config_file_argument())
    }

    fn register_output_directory_argument(command: Command) -> Command {
        command.arg(Self::create_output_directory_argument())
    }

    fn register_sample_file_argument(command: Command) -> Command {
        command.arg(Self::create_sample_file_argument())
    }

    fn register_threads_argument(command: Command) -> Command {
        command.arg(Self::create_threads_argument())
    }

    fn create_base_command() -> Command {
        Command::new(crate_name!())
            .version(crate_version!())
            .author(crate_authors!())
            .about(crate_description!())
    }

    fn create_input_files_argument() -> Arg {
        Arg::new("input_files")
            .help("Paths to 24 bit BMP input files")
            .value_parser(value_parser!(PathBuf))
            .num_args(0..)
            .action(ArgAction::Append)
    }

    fn create_test_ppm_argument() -> Arg {
        Arg::new("test_ppm")
            .long("test-ppm")
            .help("Write the sample as 10 and 12 bit PPM and verify the files")
            .action(ArgAction::SetTrue)
    }

    fn create_verify_rgbg_argument() -> Arg {
        Arg::new("verify_rgbg")
            .long("verify-rgbg")
            .help("Verify the RGBG packing of the sample")
            .action(ArgAction::SetTrue)
    }

    fn create_print_config_argument() -> Arg {
        Arg::new("print_config")
            .long("print-config")
            .help("Print the loaded register configuration")
            .action(ArgAction::SetTrue)
    }

    fn create_mode_group() -> ArgGroup {
        ArgGroup::new("mode")
            .args(["input_files", "test_ppm", "verify_rgbg", "print_config"])
            .multiple(false)
    }

    fn create_config_file_argument() -> Arg {
        arg!(config_file: -c --config <FILE> "Path to the register configuration file")
            .default_value(DEFAULT_CONFIG_FILE)
            .value_parser(value_parser!(PathBuf))
    }

    fn create_output_directory_argument() -> Arg {
        arg!(output_directory: -o --output_dir <DIR> "Directory receiving the converted images")
            .default_value(DEFAULT_OUTPUT_DIRECTORY)
            .value_parser(value_parser!(PathBuf))
    }

    fn create_sample_file_argument() -> Arg {
        arg!(sample_file: -s --sample <FILE> "Bitmap used by the sample conversion and self-tests")
            .default_value(DEFAULT_SAMPLE_FILE)
            .value_parser(value_parser!(PathBuf))
    }

    fn create_threads_argument() -> Arg {
        arg!(-t --threads <THREADS> "Number of Threads")
            .default_value(get_number_of_threads().unwrap_or(1).to_string())
            .required(false)
            .value_parser(value_parser!(usize))
    }

    fn extract_arguments(matches: &ArgMatches) -> Arguments {
        Arguments {
            mode: Self::extract_mode_argument(matches),
            config_file: Self::extract_config_file_argument(matches),
            output_directory: Self::extract_output_directory_argument(matches),
            sample_file: Self::extract_sample_file_argument(matches),
            number_of_threads: Self::extract_threads_argument(matches),
        }
    }

    fn extract_input_files_argument(matches: &ArgMatches) -> Vec<PathBuf> {
        matches
            .get_many::<PathBuf>("input_files")
            .map(|input_files| input_files.cloned().collect())
            .unwrap_or_default()
    }

    fn extract_mode_argument(matches: &ArgMatches) -> Mode {
        if matches.get_flag("test_ppm") {
            return Mode::PixmapSelfTest;
        }
        if matches.get_flag("verify_rgbg") {
            return Mode::SubpixelSelfTest;
        }
        if matches.get_flag("print_config") {
            return Mode::PrintConfiguration;
        }
        let input_files = Self::extract_input_files_argument(matches);
        if input_files.is_empty() {
            Mode::SampleConversion
        } else {
            Mode::Convert(input_files)
        }
    }

    fn extract_config_file_argument(matches: &ArgMatches) -> PathBuf {
        matches
            .get_one::<PathBuf>("config_file")
            .expect("Config file has a default value, but was unset.")
            .clone()
    }

    fn extract_output_directory_argument(matches: &ArgMatches) -> PathBuf {
        matches
            .get_one::<PathBuf>("output_directory")
            .expect("Output directory has a default value, but was unset.")
            .clone()
    }

    fn extract_sample_file_argument(matches: &ArgMatches) -> PathBuf {
        matches
            .get_one::<PathBuf>("sample_file")
            .expect("Sample file has a default value, but was unset.")
            .clone()
    }

    fn extract_threads_argument(matches: &ArgMatches) -> usize {
        matches
            .get_one::<usize>("threads")
            .expect("Required argument threads not provided")
            .to_owned()
    }
}

impl Default for CLIParser {
    fn default() -> Self {
        Self::new()
    }
}

fn get_number_of_threads() -> io::Result<usize> {
    Ok(thread::available_parallelism()?.get())
}
