use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Deserializer};
use strum_macros::{AsRefStr, Display, EnumIter};

const DATE_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";
const INVALID_DATE: &str = "Invalid Date";
/// Offset-less timestamps are taken as local wall-clock time.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// One entry of the backup listing as served by the backup manager plugin.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct BackupRecord {
    #[serde(rename = "Index")]
    pub index: i64,
    #[serde(rename = "ModTime", default, deserialize_with = "convert_date")]
    pub mod_time: ModTime,
    #[serde(rename = "BinFile", default, deserialize_with = "file_present")]
    pub bin_file: bool,
    #[serde(rename = "XMLFile", default, deserialize_with = "file_present")]
    pub xml_file: bool,
    #[serde(rename = "MetaFile", default, deserialize_with = "file_present")]
    pub meta_file: bool,
}
impl BackupRecord {
    pub fn kind(&self) -> BackupKind {
        classify_backup(self.bin_file, self.xml_file, self.meta_file)
    }
    pub fn label(&self) -> String {
        format!("Backup Index: {}", self.index)
    }
    pub fn date_label(&self) -> String {
        format!("Created: {}", self.mod_time.human_format())
    }
}

/// Modification time as sent by the server. Only used for display, so a
/// value that cannot be parsed is kept instead of failing the record.
#[derive(Debug, Clone, PartialEq)]
pub enum ModTime {
    Zoned(DateTime<FixedOffset>),
    Local(NaiveDateTime),
    Invalid(String),
}
impl Default for ModTime {
    fn default() -> Self {
        ModTime::Invalid(String::new())
    }
}
impl ModTime {
    pub fn parse(s: &str) -> ModTime {
        let s = s.trim();
        if let Ok(time) = DateTime::parse_from_rfc3339(s) {
            return ModTime::Zoned(time);
        }
        for format in NAIVE_FORMATS {
            if let Ok(time) = NaiveDateTime::parse_from_str(s, format) {
                return ModTime::Local(time);
            }
        }
        if let Some(time) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
        {
            return ModTime::Local(time);
        }
        ModTime::Invalid(s.to_string())
    }

    pub fn human_format(&self) -> String {
        match self {
            ModTime::Zoned(time) => format_in(time, &Local),
            ModTime::Local(time) => time.format(DATE_FORMAT).to_string(),
            ModTime::Invalid(_) => INVALID_DATE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumIter)]
pub enum BackupKind {
    /// World save split into .bin, .xml and meta files
    #[strum(serialize = "preterrain-trio")]
    PreterrainTrio,
    /// Single .save file
    #[strum(serialize = "Dotsave")]
    Dotsave,
    #[strum(serialize = "Unknown")]
    Unknown,
}
impl BackupKind {
    /// Style class of the type badge.
    pub fn css_class(&self) -> String {
        self.as_ref().to_lowercase()
    }
}

pub fn classify_backup(bin_file: bool, xml_file: bool, meta_file: bool) -> BackupKind {
    match (bin_file, xml_file, meta_file) {
        (true, true, true) => BackupKind::PreterrainTrio,
        (true, false, false) => BackupKind::Dotsave,
        _ => BackupKind::Unknown,
    }
}

fn format_in<Tz: TimeZone>(time: &DateTime<FixedOffset>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.with_timezone(tz).format(DATE_FORMAT).to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDate {
    Text(String),
    /// Milliseconds since the epoch
    Millis(i64),
}

fn convert_date<'de, D>(deserializer: D) -> Result<ModTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<RawDate> = Deserialize::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawDate::Text(s)) => ModTime::parse(&s),
        Some(RawDate::Millis(ms)) => match DateTime::from_timestamp_millis(ms) {
            Some(time) => ModTime::Zoned(time.fixed_offset()),
            None => ModTime::Invalid(ms.to_string()),
        },
        None => ModTime::default(),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FileFlag {
    Present(bool),
    Path(String),
}

// the plugin sends file paths, empty when the file is missing
fn file_present<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let flag: Option<FileFlag> = Deserialize::deserialize(deserializer)?;
    Ok(match flag {
        Some(FileFlag::Present(present)) => present,
        Some(FileFlag::Path(path)) => !path.is_empty(),
        None => false,
    })
}
