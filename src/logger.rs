use log::LevelFilter;
use log4rs::{
    append::console::ConsoleAppender,
    config::{runtime::ConfigErrors, Appender, Root},
    encode::pattern::PatternEncoder,
    Config,
};

const LOG_CONFIG_FILE: &str = "log4rs.yaml";
const FALLBACK_PATTERN: &str = "{d(%H:%M:%S)} {h({l:<5})} {m}{n}";

#[ctor::ctor]
fn init() {
    if log4rs::init_file(LOG_CONFIG_FILE, Default::default()).is_ok() {
        return;
    }
    match create_fallback_config() {
        Ok(config) => {
            if let Err(e) = log4rs::init_config(config) {
                eprintln!("Unable to initialise console logger: {}", e);
            }
        }
        Err(e) => eprintln!("Invalid console logger configuration: {}", e),
    }
}

fn create_fallback_config() -> Result<Config, ConfigErrors> {
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(FALLBACK_PATTERN)))
        .build();
    Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(LevelFilter::Info))
}

/// Dumps packed subpixel bytes as hex pairs, one pair per pixel.
pub fn log_byte_pairs(label: &str, bytes: &[u8]) {
    fn get_pair_array(bytes: &[u8]) -> Vec<String> {
        bytes
            .chunks(2)
            .map(|pair| {
                pair.iter()
                    .map(|byte| format!("{:02X}", byte))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }
    log::debug!("{} {:?}", label, get_pair_array(bytes));
}
