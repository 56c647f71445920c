//! Runtime configuration for the `framelord` binary.
//!
//! Every value can come from a flag or its `FRAMELORD_*` environment variable;
//! flags win.

use clap::Args;
use framelord_core::default_log_level;
use std::io;
use std::path::{Path, PathBuf};

const LOG_DIR_NAME: &str = "logs";

#[derive(Debug, Clone, Default, Args)]
pub(crate) struct CliConfig {
    /// Log level: trace, debug, info, warn, or error.
    #[arg(long, global = true, env = "FRAMELORD_LOG_LEVEL")]
    pub(crate) log_level: Option<String>,
    /// Directory for rolling log files. Defaults to `<data-dir>/logs`.
    #[arg(long, global = true, env = "FRAMELORD_LOG_DIR")]
    pub(crate) log_dir: Option<PathBuf>,
    /// Base directory for relative data file paths.
    #[arg(long, global = true, env = "FRAMELORD_DATA_DIR")]
    pub(crate) data_dir: Option<PathBuf>,
}

impl CliConfig {
    pub(crate) fn log_level(&self) -> &str {
        self.log_level
            .as_deref()
            .map(str::trim)
            .filter(|level| !level.is_empty())
            .unwrap_or(default_log_level())
    }

    /// Absolute data directory; falls back to the working directory.
    pub(crate) fn data_dir(&self) -> io::Result<PathBuf> {
        let cwd = std::env::current_dir()?;
        Ok(match &self.data_dir {
            Some(dir) => absolutize(&cwd, dir),
            None => cwd,
        })
    }

    /// Absolute log directory, as the logger refuses relative paths.
    pub(crate) fn log_dir(&self) -> io::Result<PathBuf> {
        match &self.log_dir {
            Some(dir) => Ok(absolutize(&std::env::current_dir()?, dir)),
            None => Ok(self.data_dir()?.join(LOG_DIR_NAME)),
        }
    }

    /// Resolves a data file argument against the data directory.
    pub(crate) fn data_file(&self, file: &Path) -> io::Result<PathBuf> {
        Ok(absolutize(&self.data_dir()?, file))
    }
}

fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::{absolutize, CliConfig};
    use std::path::{Path, PathBuf};

    #[test]
    fn blank_log_level_falls_back_to_build_default() {
        let config = CliConfig {
            log_level: Some("  ".to_string()),
            ..CliConfig::default()
        };
        assert_eq!(config.log_level(), framelord_core::default_log_level());
    }

    #[test]
    fn explicit_log_level_is_trimmed() {
        let config = CliConfig {
            log_level: Some(" warn ".to_string()),
            ..CliConfig::default()
        };
        assert_eq!(config.log_level(), "warn");
    }

    #[test]
    fn relative_files_resolve_under_data_dir() {
        let config = CliConfig {
            data_dir: Some(PathBuf::from("/srv/framelord")),
            ..CliConfig::default()
        };
        assert_eq!(
            config.data_file(Path::new("scans.json")).unwrap(),
            PathBuf::from("/srv/framelord/scans.json")
        );
        assert_eq!(
            config.data_file(Path::new("/tmp/x.json")).unwrap(),
            PathBuf::from("/tmp/x.json")
        );
        assert_eq!(
            config.log_dir().unwrap(),
            PathBuf::from("/srv/framelord/logs")
        );
    }

    #[test]
    fn absolutize_keeps_absolute_paths() {
        assert_eq!(
            absolutize(Path::new("/base"), Path::new("rel")),
            PathBuf::from("/base/rel")
        );
    }
}
