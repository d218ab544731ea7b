//! User configuration options.

use std::fs::{File, OpenOptions, create_dir_all};
use std::io::{self, Read, Write};
use std::path::PathBuf;

use dirs::config_dir;
use log::{LevelFilter, info, warn};
use serde::{Deserialize, Serialize};

use crate::BASE_DIR;
use crate::cli::CLIOptions;

const LOG_TAG: &str = "UserConfig";

fn get_cfg_file() -> io::Result<PathBuf> {
    let mut dir = config_dir().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("{LOG_TAG}: Couldn't open user config dir"),
        )
    })?;
    dir.push(BASE_DIR);
    if !dir.exists() {
        create_dir_all(&dir)?;
    }
    dir.push("user.toml");
    Ok(dir)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    pub iwad: String,
    pub pwads: Vec<String>,
    /// Look for a `<wad>.gwa` beside each WAD loaded
    pub load_gwa: bool,
    pub verbose: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            iwad: String::new(),
            pwads: Vec::new(),
            load_gwa: true,
            verbose: LevelFilter::Warn.to_string(),
        }
    }
}

impl UserConfig {
    /// Read the config, writing a default one if there is none or it can't
    /// be parsed
    pub fn load() -> io::Result<Self> {
        let path = get_cfg_file()?;
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;
        let mut buf = String::new();
        if file.read_to_string(&mut buf)? > 0 {
            match toml::from_str(&buf) {
                Ok(data) => {
                    info!(target: LOG_TAG, "Loaded user config file");
                    return Ok(data);
                }
                Err(e) => warn!(target: LOG_TAG, "Could not deserialise {path:?}: {e}, recreating config"),
            }
        }
        Self::create_default(&path)
    }

    fn create_default(path: &PathBuf) -> io::Result<Self> {
        let config = UserConfig::default();
        config.write_to(File::create(path)?)?;
        info!(target: LOG_TAG, "Saved default user config to {path:?}");
        Ok(config)
    }

    fn write_to(&self, mut file: File) -> io::Result<()> {
        let data = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        file.write_all(data.as_bytes())
    }

    pub fn write(&self) -> io::Result<()> {
        self.write_to(File::create(get_cfg_file()?)?)
    }

    pub fn verbose(&self) -> LevelFilter {
        self.verbose.parse().unwrap_or(LevelFilter::Warn)
    }

    /// Sync the CLI options and UserOptions with each other
    pub fn sync_cli(&mut self, cli: &mut CLIOptions) {
        info!(target: LOG_TAG, "Checking CLI options");

        if !cli.iwad.is_empty() && cli.iwad != self.iwad {
            cli.iwad.clone_into(&mut self.iwad);
            info!(target: LOG_TAG, "IWAD changed to: {}", &cli.iwad);
        } else {
            self.iwad.clone_into(&mut cli.iwad);
        }

        if !cli.pwad.is_empty() && cli.pwad != self.pwads {
            cli.pwad.clone_into(&mut self.pwads);
        } else {
            self.pwads.clone_into(&mut cli.pwad);
        }

        if cli.no_gwa {
            self.load_gwa = false;
        } else {
            cli.no_gwa = !self.load_gwa;
        }

        if let Some(level) = cli.verbose {
            self.verbose = level.to_string();
        } else {
            cli.verbose = Some(self.verbose());
        }
    }
}

#[cfg(test)]
mod tests {
    use log::LevelFilter;

    use super::UserConfig;
    use crate::cli::CLIOptions;

    fn options(iwad: &str) -> CLIOptions {
        CLIOptions {
            verbose: None,
            iwad: iwad.to_owned(),
            pwad: Vec::new(),
            no_gwa: false,
            level: None,
            x: 0.0,
            y: 0.0,
            leaves: false,
        }
    }

    #[test]
    fn toml_round_trip() {
        let config = UserConfig {
            iwad: "doom.wad".to_owned(),
            pwads: vec!["sigil.wad".to_owned()],
            load_gwa: false,
            verbose: "info".to_owned(),
        };
        let data = toml::to_string_pretty(&config).unwrap();
        let back: UserConfig = toml::from_str(&data).unwrap();
        assert_eq!(back, config);
        assert_eq!(back.verbose(), LevelFilter::Info);
    }

    #[test]
    fn cli_overrides_config() {
        let mut config = UserConfig {
            iwad: "doom.wad".to_owned(),
            ..UserConfig::default()
        };
        let mut cli = options("doom2.wad");
        cli.no_gwa = true;
        config.sync_cli(&mut cli);
        assert_eq!(config.iwad, "doom2.wad");
        assert!(!config.load_gwa);
    }

    #[test]
    fn config_fills_cli() {
        let mut config = UserConfig {
            iwad: "doom.wad".to_owned(),
            pwads: vec!["sigil.wad".to_owned()],
            load_gwa: false,
            verbose: "debug".to_owned(),
        };
        let mut cli = options("");
        config.sync_cli(&mut cli);
        assert_eq!(cli.iwad, "doom.wad");
        assert_eq!(cli.pwad, ["sigil.wad"]);
        assert!(cli.no_gwa);
        assert_eq!(cli.verbose, Some(LevelFilter::Debug));
    }
}
