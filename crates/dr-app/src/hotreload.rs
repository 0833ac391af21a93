use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use arc_swap::ArcSwap;
use dr_core::config::{Config, load_config};
use notify::{Event, EventKind, RecursiveMode, Watcher};

use crate::cli::Overrides;

/// Relit la config et réapplique les surcharges CLI.
///
/// # Errors
/// Returns an error if the file is unreadable or the merged raster settings are invalid.
pub fn reload(path: &Path, overrides: &Overrides) -> Result<Config> {
    let mut config = load_config(path)?;
    overrides.apply(&mut config);
    config.raster.validate()?;
    Ok(config)
}

/// Événement concernant le fichier config : écriture en place, ou nouveau
/// fichier renommé par-dessus (sauvegarde atomique des éditeurs).
fn is_config_event(event: &Event, file_name: &OsStr) -> bool {
    matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
        && event.paths.iter().any(|p| p.file_name() == Some(file_name))
}

/// Surveille le fichier config et met à jour l'ArcSwap.
///
/// Le dossier parent est surveillé, pas le fichier : un remplacement par
/// renommage casserait sinon la surveillance après la première sauvegarde.
///
/// Retourne le Watcher (doit rester vivant tant que l'app tourne). Une config
/// invalide est ignorée : la précédente reste active.
///
/// # Errors
/// Returns an error if the watcher cannot be created or the directory cannot be watched.
pub fn spawn_config_watcher(
    config_path: &Path,
    config: &Arc<ArcSwap<Config>>,
    overrides: Overrides,
) -> Result<impl Watcher + use<>> {
    let config = Arc::clone(config);
    let path = config_path.to_path_buf();
    let Some(file_name) = config_path.file_name().map(OsStr::to_os_string) else {
        anyhow::bail!("Chemin de config sans nom de fichier : {}", config_path.display());
    };
    let dir = match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        if let Ok(event) = res
            && is_config_event(&event, &file_name)
        {
            match reload(&path, &overrides) {
                Ok(new_config) => {
                    config.store(Arc::new(new_config));
                    log::info!("Config rechargée depuis {}", path.display());
                }
                Err(e) => {
                    log::warn!("Erreur de rechargement config : {e:#}");
                }
            }
        }
    })?;

    watcher.watch(&dir, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}
