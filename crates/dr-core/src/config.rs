use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::charset::{RAMP_CLASSIC, resolve_ramp};
use crate::error::CoreError;

/// Paramètres du rasteriseur de profondeur.
///
/// Défauts : tuiles 10×20, seuil 1 m, rampe `" .:nhBXWW"`.
///
/// # Example
/// ```
/// use dr_core::config::RasterConfig;
/// let config = RasterConfig::default();
/// assert_eq!((config.tile_width, config.tile_height), (10, 20));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct RasterConfig {
    /// Colonnes de pixels par colonne de sortie.
    pub tile_width: u32,
    /// Lignes de pixels par ligne de sortie.
    pub tile_height: u32,
    /// Seuil "proche" en mètres.
    pub near_distance_m: f32,
    /// Symboles ordonnés : index 0 = vide/loin, dernier = entièrement proche.
    #[serde(with = "ramp_string")]
    pub ramp: Vec<char>,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            tile_width: 10,
            tile_height: 20,
            near_distance_m: 1.0,
            ramp: RAMP_CLASSIC.chars().collect(),
        }
    }
}

impl RasterConfig {
    /// Check every field against its domain.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidConfig`] naming the first offending field.
    ///
    /// # Example
    /// ```
    /// use dr_core::config::RasterConfig;
    /// let config = RasterConfig { tile_width: 0, ..RasterConfig::default() };
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.tile_width == 0 || self.tile_height == 0 {
            return Err(CoreError::InvalidConfig(format!(
                "taille de tuile {}×{}",
                self.tile_width, self.tile_height
            )));
        }
        if !(self.near_distance_m.is_finite() && self.near_distance_m > 0.0) {
            return Err(CoreError::InvalidConfig(format!(
                "near_distance_m = {}",
                self.near_distance_m
            )));
        }
        if self.ramp.is_empty() {
            return Err(CoreError::InvalidConfig("rampe vide".into()));
        }
        Ok(())
    }
}

/// Paramètres de la boucle d'acquisition.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct StreamConfig {
    /// Frames ignorées avant un snapshot (stabilisation auto-exposition).
    pub warmup_frames: u32,
    /// Échecs de rasterisation consécutifs tolérés avant abandon.
    pub max_consecutive_failures: u32,
    /// Période (en frames) du log de débit. 0 = désactivé.
    pub report_every: u32,
    /// Frames moyennées pour le débit (minimum 2).
    pub rate_window: u32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            warmup_frames: 30,
            max_consecutive_failures: 30,
            report_every: 30,
            rate_window: 30,
        }
    }
}

/// Configuration complète, hot-rechargeable.
///
/// # Example
/// ```
/// use dr_core::config::Config;
/// let config = Config::default();
/// assert_eq!(config.stream.warmup_frames, 30);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    pub raster: RasterConfig,
    pub stream: StreamConfig,
}

/// Structure TOML intermédiaire : toutes les sections sont optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    raster: Option<RasterSection>,
    stream: Option<StreamSection>,
}

#[derive(Deserialize)]
struct RasterSection {
    tile_width: Option<u32>,
    tile_height: Option<u32>,
    near_distance_m: Option<f32>,
    /// Nom de rampe built-in ou symboles littéraux.
    ramp: Option<String>,
}

#[derive(Deserialize)]
struct StreamSection {
    warmup_frames: Option<u32>,
    max_consecutive_failures: Option<u32>,
    report_every: Option<u32>,
    rate_window: Option<u32>,
}

/// Parse TOML text and merge it over the defaults.
///
/// # Errors
/// Returns [`CoreError::Config`] on malformed TOML and
/// [`CoreError::InvalidConfig`] if the merged raster settings are invalid.
///
/// # Example
/// ```
/// use dr_core::config::parse_config;
/// let config = parse_config("[raster]\ntile_width = 4\nramp = \"blocks\"\n").unwrap();
/// assert_eq!(config.raster.tile_width, 4);
/// assert_eq!(config.raster.tile_height, 20);
/// assert_eq!(config.raster.ramp.len(), 5);
/// ```
pub fn parse_config(content: &str) -> Result<Config, CoreError> {
    let file: ConfigFile =
        toml::from_str(content).map_err(|e| CoreError::Config(e.to_string()))?;

    let mut config = Config::default();

    if let Some(r) = file.raster {
        if let Some(v) = r.tile_width {
            config.raster.tile_width = v;
        }
        if let Some(v) = r.tile_height {
            config.raster.tile_height = v;
        }
        if let Some(v) = r.near_distance_m {
            config.raster.near_distance_m = v;
        }
        if let Some(v) = r.ramp {
            config.raster.ramp = resolve_ramp(&v);
        }
    }

    if let Some(s) = file.stream {
        if let Some(v) = s.warmup_frames {
            config.stream.warmup_frames = v;
        }
        if let Some(v) = s.max_consecutive_failures {
            config.stream.max_consecutive_failures = v;
        }
        if let Some(v) = s.report_every {
            config.stream.report_every = v;
        }
        if let Some(v) = s.rate_window {
            config.stream.rate_window = v;
        }
    }

    config.raster.validate()?;
    Ok(config)
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read, parsed, or holds invalid values.
///
/// # Example
/// ```no_run
/// use dr_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("config/default.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    let config = parse_config(&content)
        .with_context(|| format!("Configuration invalide dans {}", path.display()))?;
    log::debug!("Config chargée depuis {}", path.display());
    Ok(config)
}

/// La rampe est sérialisée comme une chaîne, pas comme un tableau de caractères.
mod ramp_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ramp: &[char], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ramp.iter().collect::<String>())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<char>, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(s.chars().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(parse_config("").unwrap(), Config::default());
    }

    #[test]
    fn partial_override_keeps_other_fields() {
        let config = parse_config(
            "[raster]\nnear_distance_m = 0.5\n\n[stream]\nwarmup_frames = 5\n",
        )
        .unwrap();
        assert!((config.raster.near_distance_m - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.raster.tile_width, 10);
        assert_eq!(config.stream.warmup_frames, 5);
        assert_eq!(config.stream.max_consecutive_failures, 30);
        assert_eq!(config.stream.rate_window, 30);
    }

    #[test]
    fn rate_window_is_configurable() {
        let config = parse_config("[stream]\nrate_window = 120\n").unwrap();
        assert_eq!(config.stream.rate_window, 120);
        assert_eq!(config.stream.report_every, 30);
    }

    #[test]
    fn literal_ramp_is_kept() {
        let config = parse_config("[raster]\nramp = \" -#\"\n").unwrap();
        assert_eq!(config.raster.ramp, vec![' ', '-', '#']);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            parse_config("[raster]\ntile_height = 0\n"),
            Err(CoreError::InvalidConfig(_))
        ));
        assert!(matches!(
            parse_config("[raster]\nramp = \"\"\n"),
            Err(CoreError::InvalidConfig(_))
        ));
        assert!(matches!(
            parse_config("[raster]\nnear_distance_m = -1.0\n"),
            Err(CoreError::InvalidConfig(_))
        ));
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        assert!(matches!(
            parse_config("[raster\n"),
            Err(CoreError::Config(_))
        ));
    }

    #[test]
    fn load_config_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("depth.toml");
        std::fs::write(&path, "[raster]\ntile_width = 8\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.raster.tile_width, 8);
    }

    #[test]
    fn load_config_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(&dir.path().join("absent.toml")).is_err());
    }

    #[test]
    fn config_roundtrips_through_toml() {
        let config = Config::default();
        let text = toml::to_string(&config).unwrap();
        assert_eq!(parse_config(&text).unwrap(), config);
    }
}
