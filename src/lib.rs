//! A simple, terminal-based color selector with a persistent gallery.
use crate::selection::Preset;
use crate::storage::FileStore;
use std::path::PathBuf;
pub mod color;
pub mod error;
pub mod history;
pub mod selection;
pub mod storage;
pub mod ui;

pub use crate::error::{Error, Result};

#[derive(Debug, Clone, clap::Parser)]
#[clap(version, about)]
pub struct Options {
    /// Directory the color history is stored in.
    ///
    /// By default, `colorgallery` under the platform data directory is used.
    #[clap(long)]
    pub history_dir: Option<PathBuf>,

    /// Initial colors of the two slots.
    #[clap(long, value_enum, default_value_t = Preset::Brand)]
    pub defaults: Preset,

    /// Write logs to this file.
    #[clap(long)]
    pub logfile: Option<PathBuf>,

    /// Log level: off, error, warn, info, debug or trace.
    #[clap(long, default_value_t = log::LevelFilter::Info)]
    pub loglevel: log::LevelFilter,
}

impl Options {
    pub fn history_dir(&self) -> PathBuf {
        self.history_dir
            .clone()
            .unwrap_or_else(FileStore::default_dir)
    }

    /// Logging is only enabled with `--logfile`; the terminal belongs to the UI.
    pub fn setup_logger(&self) -> anyhow::Result<()> {
        if let Some(path) = &self.logfile {
            let file = std::fs::File::create(path)?;
            simplelog::WriteLogger::init(self.loglevel, simplelog::Config::default(), file)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn defaults() {
        let options = Options::try_parse_from(["colorgallery"]).unwrap();
        assert_eq!(options.defaults, Preset::Brand);
        assert_eq!(options.loglevel, log::LevelFilter::Info);
        assert_eq!(options.history_dir(), FileStore::default_dir());
        assert!(options.logfile.is_none());
    }

    #[test]
    fn overrides() {
        let options = Options::try_parse_from([
            "colorgallery",
            "--history-dir",
            "/tmp/gallery",
            "--defaults",
            "neutral",
            "--loglevel",
            "debug",
        ])
        .unwrap();
        assert_eq!(options.defaults, Preset::Neutral);
        assert_eq!(options.loglevel, log::LevelFilter::Debug);
        assert_eq!(options.history_dir(), PathBuf::from("/tmp/gallery"));
    }

    #[test]
    fn rejects_unknown_preset() {
        assert!(Options::try_parse_from(["colorgallery", "--defaults", "pastel"]).is_err());
    }
}
