//! Register and port configuration of the display IP.
//!
//! The configuration file is plain text with one `key = value` pair per line.
//! Values are decimal or `0x` prefixed hexadecimal. Lines starting with `#`
//! or `//` are comments.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::Error;

pub const REGISTER_PAGE_COUNT: u8 = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegisterAddress {
    pub page: u8,
    pub address: u8,
}

impl RegisterAddress {
    pub const fn new(page: u8, address: u8) -> Self {
        assert!(page < REGISTER_PAGE_COUNT, "register page out of range");
        Self { page, address }
    }
}

impl Display for RegisterAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:02X}/0x{:02X}", self.page, self.address)
    }
}

/// External input ports of the IP.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortField {
    RgbgOrder,
    DbvHigh,
    DbvLow,
    Fcon,
    FreqSel,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IpPorts {
    pub rgbg_order: i32,
    pub dbv_high: i32,
    pub dbv_low: i32,
    pub fcon: i32,
    pub freq_sel: i32,
}

impl IpPorts {
    pub fn get(&self, field: PortField) -> i32 {
        match field {
            PortField::RgbgOrder => self.rgbg_order,
            PortField::DbvHigh => self.dbv_high,
            PortField::DbvLow => self.dbv_low,
            PortField::Fcon => self.fcon,
            PortField::FreqSel => self.freq_sel,
        }
    }

    pub fn set(&mut self, field: PortField, value: i32) {
        let slot = match field {
            PortField::RgbgOrder => &mut self.rgbg_order,
            PortField::DbvHigh => &mut self.dbv_high,
            PortField::DbvLow => &mut self.dbv_low,
            PortField::Fcon => &mut self.fcon,
            PortField::FreqSel => &mut self.freq_sel,
        };
        *slot = value;
    }
}

/// Paged register file; registers never written read as zero.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegisterMap {
    values: BTreeMap<RegisterAddress, i32>,
}

impl RegisterMap {
    pub fn get(&self, address: RegisterAddress) -> i32 {
        self.values.get(&address).copied().unwrap_or(0)
    }

    pub fn set(&mut self, address: RegisterAddress, value: i32) {
        self.values.insert(address, value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RegisterAddress, &i32)> {
        self.values.iter()
    }
}

const COMBINED_DBV_KEY: &str = "por_dbv";

const PORT_TABLE: &[(&str, PortField)] = &[
    ("por_rgbg_order", PortField::RgbgOrder),
    ("por_dbv_h", PortField::DbvHigh),
    ("por_dbv_l", PortField::DbvLow),
    ("por_fcon", PortField::Fcon),
    ("por_freq_sel", PortField::FreqSel),
];

const CTC_LCTC_EN: RegisterAddress = RegisterAddress::new(0x05, 0x01);
const CTC_ACTC_EN: RegisterAddress = RegisterAddress::new(0x05, 0x02);
const CTC_COLOR_MODE: RegisterAddress = RegisterAddress::new(0x05, 0x03);
const CTC_TH_GRAY: RegisterAddress = RegisterAddress::new(0x05, 0x08);
const CTC_FREQ_GAIN0: RegisterAddress = RegisterAddress::new(0x05, 0xD2);

const REGISTER_TABLE: &[(&str, RegisterAddress)] = &[
    ("reg_ctc_lctc_en", CTC_LCTC_EN),
    ("reg_ctc_actc_en", CTC_ACTC_EN),
    ("reg_ctc_color_mode", CTC_COLOR_MODE),
    ("reg_ctc_th_gray", CTC_TH_GRAY),
    ("reg_ctc_freq_gain0", CTC_FREQ_GAIN0),
];

/// Registers listed in the configuration report under a second name.
const REGISTER_ALIASES: &[(&str, RegisterAddress)] = &[
    ("R_ctb_lctb_en", CTC_LCTC_EN),
    ("R_ctb_th_gray", CTC_TH_GRAY),
];

fn find_port(key: &str) -> Option<PortField> {
    PORT_TABLE
        .iter()
        .find(|(name, _)| *name == key)
        .map(|&(_, field)| field)
}

fn find_register(key: &str) -> Option<RegisterAddress> {
    REGISTER_TABLE
        .iter()
        .find(|(name, _)| *name == key)
        .map(|&(_, address)| address)
}

/// Splits a line into key and value; `None` for blank lines and comments.
fn split_assignment(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
        return None;
    }
    let (key, value) = line.split_once('=')?;
    Some((key.trim(), value.trim()))
}

/// Parses a decimal or `0x` prefixed hexadecimal integer with optional sign.
pub fn parse_value(text: &str) -> Option<i32> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let magnitude = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex_digits) => i64::from_str_radix(hex_digits, 16).ok()?,
        None => digits.parse::<i64>().ok()?,
    };
    let value = if negative { -magnitude } else { magnitude };
    i32::try_from(value).ok()
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Configuration {
    ports: IpPorts,
    registers: RegisterMap,
}

impl Configuration {
    pub fn load(file_path: &Path) -> crate::Result<Self> {
        let file = File::open(file_path).map_err(|e| {
            Error::UnableToOpenConfigFile(file_path.to_string_lossy().into_owned(), e)
        })?;
        log::info!("Loading configuration from {}", file_path.display());
        Ok(Self::parse(BufReader::new(file)))
    }

    pub fn parse<R: BufRead>(reader: R) -> Self {
        let mut configuration = Self::default();
        for (line_index, line) in reader.split(b'\n').enumerate() {
            let line_number = line_index + 1;
            let line = match line {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(e) => {
                    log::warn!("Reading stopped at line {}: {}", line_number, e);
                    break;
                }
            };
            let Some((key, value_text)) = split_assignment(&line) else {
                continue;
            };
            let Some(value) = parse_value(value_text) else {
                log::warn!(
                    "Invalid value '{}' for key '{}' at line {}",
                    value_text,
                    key,
                    line_number
                );
                continue;
            };
            if !configuration.apply(key, value) {
                log::warn!("Unknown key '{}' at line {}", key, line_number);
            }
        }
        configuration
    }

    /// Stores `value` under `key`; returns false if the key is unknown.
    pub fn apply(&mut self, key: &str, value: i32) -> bool {
        if key == COMBINED_DBV_KEY {
            self.ports.dbv_high = (value >> 8) & 0x3F;
            self.ports.dbv_low = value & 0xFF;
            log::debug!(
                "[PORT-V] {:<25} = {} -> (H: 0x{:02X}, L: 0x{:02X})",
                key,
                value,
                self.ports.dbv_high,
                self.ports.dbv_low
            );
            return true;
        }
        if let Some(field) = find_port(key) {
            self.ports.set(field, value);
            log::debug!("[PORT] {:<25} = {} (0x{:X})", key, value, value);
            return true;
        }
        if let Some(address) = find_register(key) {
            self.registers.set(address, value);
            log::debug!("[REG ] {:<25} = {} (0x{:X})", key, value, value);
            return true;
        }
        false
    }

    pub fn ports(&self) -> &IpPorts {
        &self.ports
    }

    pub fn registers(&self) -> &RegisterMap {
        &self.registers
    }

    pub fn port(&self, field: PortField) -> i32 {
        self.ports.get(field)
    }

    pub fn register(&self, address: RegisterAddress) -> i32 {
        self.registers.get(address)
    }
}

impl Display for Configuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "--- Current Configuration ---")?;
        for (name, field) in PORT_TABLE {
            writeln!(f, "  [PORT] {:<20} : {}", name, self.port(*field))?;
        }
        for (name, address) in REGISTER_TABLE.iter().chain(REGISTER_ALIASES) {
            writeln!(f, "  [REG ] {:<20} : {}", name, self.register(*address))?;
        }
        write!(f, "-----------------------------")
    }
}
