use std::time::{Duration, Instant};

/// Cadence de livraison des frames.
///
/// La première frame part immédiatement, les suivantes sont espacées d'une
/// période. Après un retard, pas de rattrapage en rafale.
///
/// # Example
/// ```
/// use dr_source::pace::FramePacer;
/// let mut pacer = FramePacer::new(0);
/// assert!(pacer.period().is_none());
/// pacer.wait(); // sans attente
/// ```
#[derive(Clone, Debug)]
pub struct FramePacer {
    period: Option<Duration>,
    next_deadline: Option<Instant>,
}

impl FramePacer {
    /// `fps == 0` désactive la cadence.
    #[must_use]
    pub fn new(fps: u32) -> Self {
        Self {
            period: (fps > 0).then(|| Duration::from_secs_f64(1.0 / f64::from(fps))),
            next_deadline: None,
        }
    }

    #[must_use]
    pub fn period(&self) -> Option<Duration> {
        self.period
    }

    /// Bloque jusqu'à l'échéance de la prochaine frame.
    pub fn wait(&mut self) {
        let Some(period) = self.period else {
            return;
        };
        let now = Instant::now();
        let deadline = self.next_deadline.unwrap_or(now);
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
        self.next_deadline = Some(deadline.max(now) + period);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spaces_frames_by_one_period() {
        let mut pacer = FramePacer::new(100);
        let start = Instant::now();
        for _ in 0..6 {
            pacer.wait();
        }
        // 5 intervalles de 10 ms après la première frame.
        assert!(start.elapsed() >= Duration::from_millis(45));
    }

    #[test]
    fn zero_fps_never_sleeps() {
        let mut pacer = FramePacer::new(0);
        let start = Instant::now();
        for _ in 0..10_000 {
            pacer.wait();
        }
        assert!(start.elapsed() < Duration::from_millis(500));
    }
}
