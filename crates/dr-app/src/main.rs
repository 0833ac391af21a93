use std::io::Write;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use clap::Parser;
use dr_core::config::Config;
use dr_core::frame::DepthUnitScale;
use dr_core::rasterize::DepthRasterizer;
use dr_source::SourceError;

pub mod cli;
pub mod hotreload;
pub mod pipeline;
pub mod rates;

/// Code de sortie quand aucun capteur de profondeur n'est trouvé.
const EXIT_NO_DEPTH_SENSOR: u8 = 2;

fn main() -> ExitCode {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("depthscii: {e:#}");
            ExitCode::from(exit_status(&e))
        }
    }
}

fn exit_status(error: &anyhow::Error) -> u8 {
    let no_sensor = error.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<SourceError>(),
            Some(SourceError::NoDepthSensor(_))
        )
    });
    if no_sensor { EXIT_NO_DEPTH_SENSOR } else { 1 }
}

fn run(cli: &cli::Cli) -> Result<()> {
    // 3. Charger la config et appliquer les overrides CLI
    let overrides = cli.overrides();
    let mut config = resolve_config(cli)?;
    overrides.apply(&mut config);
    config.raster.validate().context("configuration")?;

    // 4. Ouvrir la source et déterminer l'unité de profondeur
    let kind = cli.source_kind()?;
    let source = dr_source::open_source(&kind, cli.depth_units).context("open source")?;
    let scale = match cli.depth_units {
        Some(units) => DepthUnitScale::new(units).context("depth units")?,
        None => dr_source::depth_unit_scale(source.sensors()).context("open source")?,
    };
    log::info!(
        "{} : {}x{}, {} m/tick",
        source.name(),
        source.native_size().0,
        source.native_size().1,
        scale.meters_per_tick()
    );

    // 5. Ctrl-C arrête proprement le thread de capture
    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        ctrlc::set_handler(move || stop.store(true, Ordering::Relaxed))
            .context("Impossible d'installer le handler Ctrl-C")?;
    }

    let warmup_default = config.stream.warmup_frames;
    let config = Arc::new(ArcSwap::from_pointee(config));

    // 6. Démarrer le thread de capture
    let (frames, capture) = pipeline::spawn_capture(source, cli.fps, Arc::clone(&stop))?;

    let result = match &cli.command {
        cli::Command::Stream { frames: limit } => {
            stream(cli, &frames, &config, scale, *limit, overrides)
        }
        cli::Command::Snapshot { warmup, output } => snapshot(
            &frames,
            &config,
            scale,
            warmup.unwrap_or(warmup_default),
            output.as_deref(),
            &stop,
        ),
    };

    // 7. Arrêter et libérer la source (TOUJOURS, même en cas d'erreur)
    stop.store(true, Ordering::Relaxed);
    drop(frames);
    if capture.join().is_err() {
        log::warn!("Le thread de capture a paniqué");
    }

    result
}

fn stream(
    cli: &cli::Cli,
    frames: &flume::Receiver<pipeline::CaptureEvent>,
    config: &Arc<ArcSwap<Config>>,
    scale: DepthUnitScale,
    limit: Option<u64>,
    overrides: cli::Overrides,
) -> Result<()> {
    // Hot-reload config (thread interne notify)
    let _watcher = if cli.config.exists() {
        Some(hotreload::spawn_config_watcher(&cli.config, config, overrides)?)
    } else {
        None
    };
    let mut out = std::io::stdout().lock();
    let n = pipeline::run_stream(frames, config, scale, limit, &mut out)?;
    log::info!("{n} rasters émis");
    Ok(())
}

fn snapshot(
    frames: &flume::Receiver<pipeline::CaptureEvent>,
    config: &ArcSwap<Config>,
    scale: DepthUnitScale,
    warmup: u32,
    output: Option<&Path>,
    stop: &AtomicBool,
) -> Result<()> {
    let rasterizer = DepthRasterizer::new(config.load().raster.clone()).context("rasterize")?;
    match pipeline::run_snapshot(frames, &rasterizer, scale, warmup)? {
        Some(raster) => write_snapshot(&raster.to_string(), output),
        None if stop.load(Ordering::Relaxed) => Ok(()),
        None => anyhow::bail!(
            "acquire frame : source épuisée avant la frame de snapshot ({warmup} frames ignorées)"
        ),
    }
}

fn write_snapshot(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, format!("{text}\n"))
                .with_context(|| format!("write output : {}", path.display()))?;
            println!("Raster enregistré dans {}", path.display());
            Ok(())
        }
        None => {
            let mut out = std::io::stdout().lock();
            writeln!(out, "{text}").context("write output")
        }
    }
}

/// Config introuvable → défauts, avec un avertissement.
fn resolve_config(cli: &cli::Cli) -> Result<Config> {
    if cli.config.exists() {
        dr_core::config::load_config(&cli.config)
    } else {
        log::warn!(
            "Config introuvable : {}. Utilisation des défauts.",
            cli.config.display()
        );
        Ok(Config::default())
    }
}
