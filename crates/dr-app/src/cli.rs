use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dr_core::charset::resolve_ramp;
use dr_core::config::Config;
use dr_source::open::SourceKind;

/// depthscii : cartes d'occupation ASCII depuis une caméra de profondeur.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Source : carte de profondeur 16 bits (PNG, TIFF), rejouée en boucle.
    #[arg(long, global = true)]
    pub image: Option<PathBuf>,

    /// Source : dossier de cartes de profondeur, dans l'ordre des noms.
    #[arg(long, global = true)]
    pub folder: Option<PathBuf>,

    /// Reboucler sur le dossier une fois épuisé.
    #[arg(long = "loop", global = true, default_value_t = false)]
    pub looping: bool,

    /// Source : scène synthétique LxH (défaut si aucune source : 640x480).
    #[arg(long, global = true, value_parser = parse_dims)]
    pub synthetic: Option<(u32, u32)>,

    /// Cadence de la scène synthétique et du rejeu des enregistrements (0 = sans attente).
    #[arg(long, global = true, default_value_t = 30)]
    pub fps: u32,

    /// Fichier de configuration TOML.
    #[arg(short, long, global = true, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Rampe : nom built-in (classic, compact, blocks, sans casse) ou symboles
    /// littéraux. Préfixer par `literal:` pour des symboles qui forment un nom
    /// built-in (ex. `literal:Blocks`).
    #[arg(long, global = true)]
    pub ramp: Option<String>,

    /// Taille de tuile LxH en pixels.
    #[arg(long, global = true, value_parser = parse_dims)]
    pub tile: Option<(u32, u32)>,

    /// Seuil "proche" en mètres.
    #[arg(long, global = true)]
    pub near: Option<f32>,

    /// Mètres par tick, remplace l'unité rapportée par le capteur.
    #[arg(long, global = true)]
    pub depth_units: Option<f32>,

    /// Niveau de log : off, error, warn, info, debug, trace.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: log::LevelFilter,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Affiche un raster par frame, séparés par une ligne vide.
    Stream {
        /// S'arrêter après N rasters.
        #[arg(long)]
        frames: Option<u64>,
    },
    /// Laisse la source se stabiliser puis capture un seul raster.
    Snapshot {
        /// Frames ignorées avant la capture (défaut : `stream.warmup_frames`).
        #[arg(long)]
        warmup: Option<u32>,
        /// Écrire le raster dans ce fichier plutôt que sur stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Surcharges CLI, réappliquées à chaque rechargement de la config.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Overrides {
    pub ramp: Option<Vec<char>>,
    pub tile: Option<(u32, u32)>,
    pub near: Option<f32>,
}

impl Overrides {
    pub fn apply(&self, config: &mut Config) {
        if let Some(ref ramp) = self.ramp {
            config.raster.ramp.clone_from(ramp);
        }
        if let Some((w, h)) = self.tile {
            config.raster.tile_width = w;
            config.raster.tile_height = h;
        }
        if let Some(near) = self.near {
            config.raster.near_distance_m = near;
        }
    }
}

impl Cli {
    /// Resolve the single frame source.
    ///
    /// # Errors
    /// Returns an error if more than one source is specified.
    pub fn source_kind(&self) -> anyhow::Result<SourceKind> {
        let count = usize::from(self.image.is_some())
            + usize::from(self.folder.is_some())
            + usize::from(self.synthetic.is_some());
        if count > 1 {
            anyhow::bail!(
                "Une seule source à la fois. Spécifiez --image, --folder, OU --synthetic."
            );
        }

        if let Some(ref path) = self.image {
            Ok(SourceKind::Image(path.clone()))
        } else if let Some(ref path) = self.folder {
            Ok(SourceKind::Folder {
                path: path.clone(),
                looping: self.looping,
            })
        } else {
            let (width, height) = self.synthetic.unwrap_or((640, 480));
            Ok(SourceKind::Synthetic {
                width,
                height,
                fps: self.fps,
            })
        }
    }

    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            ramp: self.ramp.as_deref().map(resolve_ramp),
            tile: self.tile,
            near: self.near,
        }
    }
}

/// Parse `"640x480"` (ou `640X480`) en `(largeur, hauteur)`.
fn parse_dims(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("format attendu LxH, reçu « {s} »"))?;
    let w: u32 = w.trim().parse().map_err(|e| format!("largeur « {w} » : {e}"))?;
    let h: u32 = h.trim().parse().map_err(|e| format!("hauteur « {h} » : {e}"))?;
    if w == 0 || h == 0 {
        return Err(format!("dimensions nulles : {w}x{h}"));
    }
    Ok((w, h))
}
