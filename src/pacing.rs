use std::time::Instant;

use crate::capture::{AcquisitionPacing, CaptureBackend};
use crate::error::CameraError;
use crate::frame::Frame;

/// Delivers (raw frame, timestamp) pairs on a steady cadence.
///
/// Timestamps are seconds on a monotonic clock whose epoch is the
/// scheduler's construction instant. Acquisition errors propagate to the
/// caller without retry; retry policy belongs to the application loop.
pub struct PacingScheduler {
    epoch: Instant,
    policy: Policy,
}

enum Policy {
    /// The backend's read already blocks at the device frame interval.
    /// The timestamp is taken immediately after the read returns.
    Direct,
    /// Poll-and-wait for free-running backends. The timestamp is the
    /// poll instant sampled just before the read.
    Throttled { period: f64, next_frame_time: f64 },
}

impl PacingScheduler {
    /// Build a scheduler for a backend with the given pacing capability.
    /// A free-running backend without a target rate is left unthrottled.
    pub fn new(pacing: AcquisitionPacing, target_fps: Option<f64>) -> Self {
        let policy = match (pacing, target_fps) {
            (AcquisitionPacing::FreeRunning, Some(fps)) if fps > 0.0 => Policy::Throttled {
                period: 1.0 / fps,
                next_frame_time: 0.0,
            },
            _ => Policy::Direct,
        };
        Self {
            epoch: Instant::now(),
            policy,
        }
    }

    /// Acquire the next raw frame under this scheduler's pacing policy.
    pub fn acquire(
        &mut self,
        backend: &mut dyn CaptureBackend,
    ) -> Result<(Frame, f64), CameraError> {
        match &mut self.policy {
            Policy::Direct => {
                let frame = backend.acquire_raw()?;
                let timestamp = self.epoch.elapsed().as_secs_f64();
                Ok((frame, timestamp))
            }
            Policy::Throttled {
                period,
                next_frame_time,
            } => loop {
                let now = self.epoch.elapsed().as_secs_f64();
                if now > *next_frame_time {
                    let frame = backend.acquire_raw()?;
                    // Never schedule the next slot earlier than half a
                    // period from now, so a slow read cannot leave the
                    // scheduler permanently behind.
                    *next_frame_time = f64::max(*next_frame_time + *period, now + 0.5 * *period);
                    return Ok((frame, now));
                }
                std::hint::spin_loop();
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeviceConfig;
    use crate::frame::ChannelOrder;
    use ndarray::Array2;
    use std::time::Duration;

    struct StubBackend {
        pacing: AcquisitionPacing,
        read_delay: Duration,
    }

    impl StubBackend {
        fn free_running() -> Self {
            Self {
                pacing: AcquisitionPacing::FreeRunning,
                read_delay: Duration::ZERO,
            }
        }

        fn device_paced(read_delay: Duration) -> Self {
            Self {
                pacing: AcquisitionPacing::DevicePaced,
                read_delay,
            }
        }
    }

    impl CaptureBackend for StubBackend {
        fn open(&mut self, _config: &DeviceConfig) -> Result<(), CameraError> {
            Ok(())
        }

        fn acquire_raw(&mut self) -> Result<Frame, CameraError> {
            if !self.read_delay.is_zero() {
                std::thread::sleep(self.read_delay);
            }
            Ok(Frame::Gray(Array2::zeros((2, 2))))
        }

        fn close(&mut self) {}

        fn channel_order(&self) -> ChannelOrder {
            ChannelOrder::Rgb
        }

        fn pacing(&self) -> AcquisitionPacing {
            self.pacing
        }
    }

    #[test]
    fn throttled_timestamps_are_at_least_half_a_period_apart() {
        let fps = 200.0;
        let mut backend = StubBackend::free_running();
        let mut scheduler = PacingScheduler::new(backend.pacing(), Some(fps));

        let mut timestamps = Vec::with_capacity(100);
        for _ in 0..100 {
            let (_, timestamp) = scheduler.acquire(&mut backend).unwrap();
            timestamps.push(timestamp);
        }

        let half_period = 0.5 / fps;
        for pair in timestamps.windows(2) {
            assert!(
                pair[1] - pair[0] >= half_period - 1e-6,
                "frames {:.6} and {:.6} closer than half a period",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn throttled_rate_converges_to_target_and_never_exceeds_it() {
        let fps = 200.0;
        let period = 1.0 / fps;
        let mut backend = StubBackend::free_running();
        let mut scheduler = PacingScheduler::new(backend.pacing(), Some(fps));

        let mut first = None;
        let mut last = 0.0;
        for _ in 0..100 {
            let (_, timestamp) = scheduler.acquire(&mut backend).unwrap();
            first.get_or_insert(timestamp);
            last = timestamp;
        }

        let elapsed = last - first.unwrap();
        // 99 intervals. Instantaneous reads cannot run ahead of the
        // schedule, and spin-wait polling keeps slack small.
        assert!(elapsed >= 99.0 * period - 1e-6, "ran faster than target: {elapsed}");
        assert!(elapsed <= 99.0 * period * 1.5, "fell far behind target: {elapsed}");
    }

    #[test]
    fn one_second_of_polling_at_ten_fps_yields_ten_frames() {
        let fps = 10.0;
        let mut backend = StubBackend::free_running();
        let mut scheduler = PacingScheduler::new(backend.pacing(), Some(fps));

        let start = Instant::now();
        let mut count = 0u32;
        while start.elapsed() < Duration::from_secs(1) {
            scheduler.acquire(&mut backend).unwrap();
            count += 1;
        }
        assert!((9..=11).contains(&count), "got {count} frames");
    }

    #[test]
    fn device_paced_backends_are_not_throttled() {
        let read_delay = Duration::from_millis(2);
        let mut backend = StubBackend::device_paced(read_delay);
        // A target rate far below the device rate must not slow delivery.
        let mut scheduler = PacingScheduler::new(backend.pacing(), Some(5.0));

        let start = Instant::now();
        for _ in 0..10 {
            scheduler.acquire(&mut backend).unwrap();
        }
        assert!(start.elapsed() < Duration::from_millis(200));
    }

    #[test]
    fn direct_timestamps_follow_the_read_immediately() {
        let mut backend = StubBackend::device_paced(Duration::from_millis(5));
        let mut scheduler = PacingScheduler::new(backend.pacing(), None);

        let before = Instant::now();
        let (_, timestamp) = scheduler.acquire(&mut backend).unwrap();
        let after = before.elapsed().as_secs_f64();

        // The scheduler epoch predates `before` by microseconds only, so
        // the stamp must land between the read's end and `after`.
        assert!(timestamp >= 0.005 - 1e-4);
        assert!(timestamp <= after + 1e-3);
    }

    #[test]
    fn free_running_without_target_rate_is_unthrottled() {
        let mut backend = StubBackend::free_running();
        let mut scheduler = PacingScheduler::new(backend.pacing(), None);

        let start = Instant::now();
        for _ in 0..100 {
            scheduler.acquire(&mut backend).unwrap();
        }
        assert!(start.elapsed() < Duration::from_millis(100));
    }
}
