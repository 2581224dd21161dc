//! Run options and the explicit run context.
//!
//! The original engine resolved options, file locations and the
//! initialization time grid through ambient module state.  Here everything
//! an operation needs is bundled into a [`RunContext`] and passed as an
//! argument.

use crate::timegrid::Timegrid;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global behavioral switches for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Options {
    /// Fill unavailable values with a sequence's configured default
    /// (usually zero) instead of not-a-number.
    pub use_default_values: bool,
    /// Require external series to cover the full initialization period.
    /// With this disabled, short series are aligned and padded with the
    /// sentinel value instead of raising a coverage error.
    pub check_series: bool,
    /// Warn when a simulation sequence's series mode has to be downgraded
    /// because its backing file cannot be accessed.
    pub warn_missing_sim_file: bool,
    /// Warn when an observation sequence's series mode has to be
    /// downgraded because its backing file cannot be accessed.
    pub warn_missing_obs_file: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            use_default_values: false,
            check_series: true,
            warn_missing_sim_file: true,
            warn_missing_obs_file: true,
        }
    }
}

/// External file encoding of a time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileType {
    /// Tagged binary: 13-field time grid header followed by the flat
    /// 8-byte values.
    Dat,
    /// Text: time grid header line followed by tab-separated rows.
    Asc,
}

impl FileType {
    /// File name ending of the external data file.
    pub fn extension(self) -> &'static str {
        match self {
            FileType::Dat => "dat",
            FileType::Asc => "asc",
        }
    }
}

/// Directories and default encodings for series files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesManager {
    /// Directory of external input series files.
    pub input_dir: PathBuf,
    /// Directory of external output series files.
    pub output_dir: PathBuf,
    /// Directory of external node series files.
    pub node_dir: PathBuf,
    /// Directory of the run-scratch `.bin` files.
    pub temp_dir: PathBuf,
    /// Default encoding of external input series files.
    pub input_file_type: FileType,
    /// Default encoding of external output series files.
    pub output_file_type: FileType,
    /// Default encoding of external node series files.
    pub node_file_type: FileType,
}

impl SeriesManager {
    /// Place all series directories below a single base directory.
    pub fn in_dir(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        Self {
            input_dir: base.clone(),
            output_dir: base.clone(),
            node_dir: base.clone(),
            temp_dir: base,
            input_file_type: FileType::Dat,
            output_file_type: FileType::Dat,
            node_file_type: FileType::Dat,
        }
    }
}

/// Everything the storage backend needs to know about the current run:
/// the initialization time grid, the behavioral options and the series
/// file configuration.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub timegrid: Timegrid,
    pub options: Options,
    pub manager: SeriesManager,
}

impl RunContext {
    pub fn new(timegrid: Timegrid) -> Self {
        Self {
            timegrid,
            options: Options::default(),
            manager: SeriesManager::in_dir("."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_are_strict() {
        let options = Options::default();
        assert!(!options.use_default_values);
        assert!(options.check_series);
        assert!(options.warn_missing_sim_file);
        assert!(options.warn_missing_obs_file);
    }

    #[test]
    fn options_serialization_roundtrip() {
        let options = Options {
            use_default_values: true,
            check_series: false,
            ..Options::default()
        };
        let json = serde_json::to_string(&options).unwrap();
        let deserialized: Options = serde_json::from_str(&json).unwrap();
        assert!(deserialized.use_default_values);
        assert!(!deserialized.check_series);
    }

    #[test]
    fn file_type_extensions() {
        assert_eq!(FileType::Dat.extension(), "dat");
        assert_eq!(FileType::Asc.extension(), "asc");
    }
}
