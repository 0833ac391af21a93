use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use dr_core::config::Config;
use dr_core::frame::{DepthBuffer, DepthUnitScale};
use dr_core::raster::Raster;
use dr_core::rasterize::DepthRasterizer;
use dr_core::traits::DepthSource;
use dr_source::FramePacer;
use flume::{Receiver, Sender};

use crate::rates::RateCounter;

/// Frame acquise, ou échec d'acquisition à remonter.
pub type CaptureEvent = Result<Arc<DepthBuffer>>;

/// Capacité du canal de capture : au plus deux frames en attente.
const CAPTURE_QUEUE: usize = 2;

/// Lance le thread de capture.
///
/// Le canal se ferme quand la source est épuisée, sur Ctrl-C (`stop`), ou
/// après un échec d'acquisition, transmis comme dernier événement. La source
/// est libérée à la fin du thread.
///
/// Les sources enregistrées (`is_live() == false`) sont rejouées à `fps`
/// (0 = sans attente) ; les sources live gardent leur propre cadence.
///
/// # Errors
/// Returns an error if the thread cannot be spawned.
pub fn spawn_capture(
    mut source: Box<dyn DepthSource>,
    fps: u32,
    stop: Arc<AtomicBool>,
) -> Result<(Receiver<CaptureEvent>, thread::JoinHandle<()>)> {
    let pacer = (!source.is_live()).then(|| FramePacer::new(fps));
    let (tx, rx) = flume::bounded(CAPTURE_QUEUE);
    let handle = thread::Builder::new()
        .name("dr-capture".to_string())
        .spawn(move || capture_loop(source.as_mut(), pacer, &tx, &stop))
        .context("Impossible de spawner le thread de capture")?;
    Ok((rx, handle))
}

fn capture_loop(
    source: &mut dyn DepthSource,
    mut pacer: Option<FramePacer>,
    tx: &Sender<CaptureEvent>,
    stop: &AtomicBool,
) {
    while !stop.load(Ordering::Relaxed) {
        if let Some(pacer) = pacer.as_mut() {
            pacer.wait();
        }
        match source.next_frame() {
            Ok(Some(frame)) => {
                if tx.send(Ok(frame)).is_err() {
                    break;
                }
            }
            Ok(None) => {
                log::info!("{} : source épuisée", source.name());
                break;
            }
            Err(e) => {
                let _ = tx.send(Err(e));
                break;
            }
        }
    }
    log::debug!("Thread de capture terminé");
}

/// Boucle principale : un raster par frame, séparés par une ligne vide.
///
/// Un échec de rasterisation saute la frame ; au-delà de
/// `stream.max_consecutive_failures` échecs consécutifs la boucle abandonne.
/// La config est relue entre chaque frame (hot reload).
///
/// Retourne le nombre de rasters émis.
///
/// # Errors
/// Returns an error on acquisition failure, persistent rasterization failure,
/// or when the output cannot be written.
pub fn run_stream<W: Write>(
    frames: &Receiver<CaptureEvent>,
    config: &ArcSwap<Config>,
    scale: DepthUnitScale,
    limit: Option<u64>,
    out: &mut W,
) -> Result<u64> {
    let mut active = config.load_full();
    let mut rasterizer = DepthRasterizer::new(active.raster.clone()).context("rasterize")?;
    let mut rates = RateCounter::new(active.stream.rate_window as usize);
    let mut failures = 0u32;

    if limit == Some(0) {
        return Ok(0);
    }

    for event in frames {
        let latest = config.load_full();
        if !Arc::ptr_eq(&latest, &active) {
            match DepthRasterizer::new(latest.raster.clone()) {
                Ok(r) => {
                    rasterizer = r;
                    log::debug!("Rasteriseur reconstruit après rechargement");
                }
                Err(e) => log::warn!("Config rechargée ignorée : {e}"),
            }
            active = latest;
        }

        let buffer = event.context("acquire frame")?;
        let raster = match buffer.view() {
            Ok(frame) => rasterizer.rasterize(&frame, scale),
            Err(e) => {
                failures += 1;
                log::warn!("Frame ignorée ({failures} échec(s) consécutif(s)) : {e}");
                if failures > active.stream.max_consecutive_failures {
                    anyhow::bail!("rasterize : {failures} échecs consécutifs, dernier : {e}");
                }
                continue;
            }
        };
        failures = 0;

        if rates.frames() > 0 {
            writeln!(out).context("write output")?;
        }
        writeln!(out, "{raster}").context("write output")?;
        out.flush().context("write output")?;

        rates.tick();
        rates.report(active.stream.report_every);
        if limit.is_some_and(|n| rates.frames() >= n) {
            break;
        }
    }

    Ok(rates.frames())
}

/// Ignore `warmup` frames (stabilisation auto-exposition), puis rasterise la suivante.
///
/// `Ok(None)` si la source se ferme avant (épuisée ou interrompue).
///
/// # Errors
/// Returns an error on acquisition failure or if the captured frame is malformed.
pub fn run_snapshot(
    frames: &Receiver<CaptureEvent>,
    rasterizer: &DepthRasterizer,
    scale: DepthUnitScale,
    warmup: u32,
) -> Result<Option<Raster>> {
    for _ in 0..warmup {
        match frames.recv() {
            Ok(event) => {
                event.context("acquire frame")?;
            }
            Err(_) => return Ok(None),
        }
    }
    let Ok(event) = frames.recv() else {
        return Ok(None);
    };
    let buffer = event.context("acquire frame")?;
    let frame = buffer.view().context("rasterize")?;
    Ok(Some(rasterizer.rasterize(&frame, scale)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dr_core::config::RasterConfig;
    use dr_core::traits::SensorInfo;
    use std::time::{Duration, Instant};

    fn config() -> Config {
        Config {
            raster: RasterConfig {
                tile_width: 2,
                tile_height: 2,
                near_distance_m: 1.0,
                ramp: vec![' ', '#'],
            },
            ..Config::default()
        }
    }

    fn near_frame() -> CaptureEvent {
        Ok(Arc::new(DepthBuffer {
            data: vec![500; 16],
            width: 4,
            height: 4,
        }))
    }

    fn far_frame() -> CaptureEvent {
        Ok(Arc::new(DepthBuffer::new(4, 4)))
    }

    fn corrupt_frame() -> CaptureEvent {
        Ok(Arc::new(DepthBuffer {
            data: vec![500; 15],
            width: 4,
            height: 4,
        }))
    }

    fn channel(events: Vec<CaptureEvent>) -> Receiver<CaptureEvent> {
        let (tx, rx) = flume::unbounded();
        for e in events {
            tx.send(e).unwrap();
        }
        rx
    }

    #[test]
    fn rasters_are_separated_by_blank_line() {
        let rx = channel(vec![near_frame(), far_frame()]);
        let config = ArcSwap::from_pointee(config());
        let mut out = Vec::new();
        let n = run_stream(&rx, &config, DepthUnitScale::MILLIMETER, None, &mut out).unwrap();
        assert_eq!(n, 2);
        assert_eq!(String::from_utf8(out).unwrap(), "##\n##\n\n  \n  \n");
    }

    #[test]
    fn frame_limit_stops_early() {
        let rx = channel(vec![near_frame(), near_frame(), near_frame()]);
        let config = ArcSwap::from_pointee(config());
        let mut out = Vec::new();
        let n = run_stream(&rx, &config, DepthUnitScale::MILLIMETER, Some(2), &mut out).unwrap();
        assert_eq!(n, 2);
        assert_eq!(rx.len(), 1);
    }

    #[test]
    fn corrupt_frame_is_skipped() {
        let rx = channel(vec![corrupt_frame(), far_frame()]);
        let config = ArcSwap::from_pointee(config());
        let mut out = Vec::new();
        let n = run_stream(&rx, &config, DepthUnitScale::MILLIMETER, None, &mut out).unwrap();
        assert_eq!(n, 1);
        assert_eq!(String::from_utf8(out).unwrap(), "  \n  \n");
    }

    #[test]
    fn persistent_failures_escalate() {
        let mut cfg = config();
        cfg.stream.max_consecutive_failures = 2;
        let rx = channel(vec![corrupt_frame(), corrupt_frame(), corrupt_frame(), near_frame()]);
        let config = ArcSwap::from_pointee(cfg);
        let mut out = Vec::new();
        let err = run_stream(&rx, &config, DepthUnitScale::MILLIMETER, None, &mut out).unwrap_err();
        assert!(format!("{err:#}").contains("rasterize"));
        assert!(out.is_empty());
    }

    #[test]
    fn acquisition_error_names_the_stage() {
        let rx = channel(vec![near_frame(), Err(anyhow::anyhow!("timeout"))]);
        let config = ArcSwap::from_pointee(config());
        let mut out = Vec::new();
        let err = run_stream(&rx, &config, DepthUnitScale::MILLIMETER, None, &mut out).unwrap_err();
        assert!(format!("{err:#}").starts_with("acquire frame"));
        assert_eq!(String::from_utf8(out).unwrap(), "##\n##\n");
    }

    #[test]
    fn snapshot_skips_warmup_frames() {
        let rx = channel(vec![far_frame(), far_frame(), near_frame()]);
        let rasterizer = DepthRasterizer::new(config().raster).unwrap();
        let raster = run_snapshot(&rx, &rasterizer, DepthUnitScale::MILLIMETER, 2)
            .unwrap()
            .unwrap();
        assert_eq!(raster.to_string(), "##\n##");
    }

    #[test]
    fn snapshot_on_exhausted_source_is_none() {
        let rx = channel(vec![far_frame()]);
        let rasterizer = DepthRasterizer::new(config().raster).unwrap();
        assert!(
            run_snapshot(&rx, &rasterizer, DepthUnitScale::MILLIMETER, 3)
                .unwrap()
                .is_none()
        );
    }

    struct CountingSource {
        remaining: u32,
        live: bool,
        sensors: Vec<SensorInfo>,
    }

    impl CountingSource {
        fn recorded(remaining: u32) -> Self {
            Self {
                remaining,
                live: false,
                sensors: vec![SensorInfo::depth("test", None)],
            }
        }
    }

    impl DepthSource for CountingSource {
        fn next_frame(&mut self) -> Result<Option<Arc<DepthBuffer>>> {
            if self.remaining == 0 {
                return Ok(None);
            }
            self.remaining -= 1;
            Ok(Some(Arc::new(DepthBuffer::new(4, 4))))
        }
        fn native_size(&self) -> (u32, u32) {
            (4, 4)
        }
        fn is_live(&self) -> bool {
            self.live
        }
        fn sensors(&self) -> &[SensorInfo] {
            &self.sensors
        }
        fn name(&self) -> &str {
            "counting"
        }
    }

    #[test]
    fn capture_thread_drains_finite_source() {
        let source = CountingSource::recorded(3);
        let stop = Arc::new(AtomicBool::new(false));
        let (rx, handle) = spawn_capture(Box::new(source), 0, stop).unwrap();
        let config = ArcSwap::from_pointee(config());
        let mut out = Vec::new();
        let n = run_stream(&rx, &config, DepthUnitScale::MILLIMETER, None, &mut out).unwrap();
        handle.join().unwrap();
        assert_eq!(n, 3);
    }

    #[test]
    fn stop_flag_ends_capture() {
        let source = CountingSource::recorded(u32::MAX);
        let stop = Arc::new(AtomicBool::new(true));
        let (rx, handle) = spawn_capture(Box::new(source), 0, stop).unwrap();
        handle.join().unwrap();
        assert!(rx.recv().is_err());
    }

    #[test]
    fn recorded_source_is_replayed_at_fps() {
        let stop = Arc::new(AtomicBool::new(false));
        let start = Instant::now();
        let (rx, handle) = spawn_capture(Box::new(CountingSource::recorded(6)), 100, stop).unwrap();
        assert_eq!(rx.iter().count(), 6);
        handle.join().unwrap();
        // 6 frames à 100 fps : au moins 5 périodes de 10 ms.
        assert!(start.elapsed() >= Duration::from_millis(45));
    }

    #[test]
    fn live_source_keeps_its_own_pace() {
        let source = CountingSource {
            live: true,
            ..CountingSource::recorded(5)
        };
        let stop = Arc::new(AtomicBool::new(false));
        let start = Instant::now();
        // 1 fps ignoré : une source live n'est pas recadencée.
        let (rx, handle) = spawn_capture(Box::new(source), 1, stop).unwrap();
        assert_eq!(rx.iter().count(), 5);
        handle.join().unwrap();
        assert!(start.elapsed() < Duration::from_millis(900));
    }
}
