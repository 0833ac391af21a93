use std::collections::VecDeque;
use std::time::Instant;

/// Débit de rasters par fenêtre glissante. Zéro allocation après init.
pub struct RateCounter {
    /// Timestamps des dernières N frames.
    timestamps: VecDeque<Instant>,
    window: usize,
    rate: f64,
    frames: u64,
}

impl RateCounter {
    /// Create a counter averaging over the last `window` frames.
    #[must_use]
    pub fn new(window: usize) -> Self {
        let window = window.max(2);
        Self {
            timestamps: VecDeque::with_capacity(window + 1),
            window,
            rate: 0.0,
            frames: 0,
        }
    }

    /// Appeler une fois par raster émis.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    fn tick_at(&mut self, now: Instant) {
        self.frames += 1;
        self.timestamps.push_back(now);
        if self.timestamps.len() > self.window {
            self.timestamps.pop_front();
        }
        if self.timestamps.len() >= 2 {
            let first = self.timestamps.front().copied().unwrap_or(now);
            let secs = now.duration_since(first).as_secs_f64();
            if secs > 0.0 {
                self.rate = (self.timestamps.len() - 1) as f64 / secs;
            }
        }
    }

    /// Rasters par seconde, moyennés sur la fenêtre.
    #[must_use]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Total de rasters depuis la création.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Log le débit toutes les `every` frames (0 = jamais).
    pub fn report(&self, every: u32) {
        if every > 0 && self.frames.is_multiple_of(u64::from(every)) {
            log::info!("{} rasters, {:.1} rasters/s", self.frames, self.rate());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn starts_at_zero() {
        let counter = RateCounter::new(30);
        assert!(counter.rate().abs() < f64::EPSILON);
        assert_eq!(counter.frames(), 0);
    }

    #[test]
    fn tiny_window_never_reallocates() {
        let mut counter = RateCounter::new(0);
        let capacity = counter.timestamps.capacity();
        assert!(capacity >= 3);
        let start = Instant::now();
        for i in 0..50u64 {
            counter.tick_at(start + Duration::from_millis(i * 10));
        }
        assert_eq!(counter.timestamps.capacity(), capacity);
        assert!((counter.rate() - 100.0).abs() < 0.01, "rate = {}", counter.rate());
    }

    #[test]
    fn measures_regular_ticks() {
        let mut counter = RateCounter::new(10);
        let start = Instant::now();
        for i in 0..20u32 {
            counter.tick_at(start + Duration::from_millis(u64::from(i) * 100));
        }
        assert!((counter.rate() - 10.0).abs() < 0.01, "rate = {}", counter.rate());
        assert_eq!(counter.frames(), 20);
    }
}
