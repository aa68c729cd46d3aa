//! Motion smoother - continuous motion from sparse position samples
//!
//! One smoother runs per remote avatar. Each sample extends a Catmull-Rom
//! spline, and the segment from the previous sample to the new one is played
//! back over the interval that separated them. Segments queue behind the one
//! in flight, so playback trails the publisher by roughly one sample.
//!
//! State machine:
//! - `Stopped`: at rest. Small moves are emitted directly; larger ones seed a
//!   fresh spline and move to `Idle`.
//! - `Idle`: spline seeded, nothing in flight.
//! - `Animating`: a segment is playing; new segments are queued.
//!
//! A sample that arrives after more than `max_interval` is a jump: in-flight
//! motion is dropped and the point is emitted as-is.

use std::collections::VecDeque;

use park_core::{Point, PresenceTime};
use tracing::trace;

use crate::CatmullRom;

/// Motion smoother configuration
#[derive(Debug, Clone)]
pub struct SmootherConfig {
    /// Samples further apart than this are treated as a jump (ms)
    pub max_interval_ms: u32,

    /// Samples closer together than this are emitted directly (ms)
    pub min_frame_ms: u32,

    /// Moves shorter than this from a resting position are emitted directly
    pub snap_distance: f64,

    /// Spline points kept once motion comes to rest
    pub history: usize,
}

impl Default for SmootherConfig {
    fn default() -> Self {
        Self {
            max_interval_ms: 100,
            min_frame_ms: 16,
            snap_distance: 4.0,
            history: 16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionState {
    Stopped,
    Idle,
    Animating,
}

/// One spline segment to play back
#[derive(Debug, Clone, Copy)]
struct Segment {
    start: usize,
    to: Point,
    duration_ms: f64,
}

#[derive(Debug, Clone, Copy)]
struct Running {
    segment: Segment,
    started: PresenceTime,
}

/// Per-avatar motion smoother
#[derive(Debug)]
pub struct MotionSmoother {
    config: SmootherConfig,
    state: MotionState,
    spline: CatmullRom,
    queue: VecDeque<Segment>,
    running: Option<Running>,
    /// Last accepted sample and its arrival time
    prev: Option<(Point, PresenceTime)>,
    disposed: bool,
}

impl MotionSmoother {
    pub fn new(config: SmootherConfig) -> Self {
        MotionSmoother {
            config,
            state: MotionState::Stopped,
            spline: CatmullRom::new(),
            queue: VecDeque::new(),
            running: None,
            prev: None,
            disposed: false,
        }
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Segments waiting behind the running one
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Feed a sample
    ///
    /// Returns a position to assign immediately, if the sample is not
    /// smoothed (first sample, jump, snap or burst).
    pub fn add_point(&mut self, point: Point, now: PresenceTime) -> Option<Point> {
        if self.disposed {
            return None;
        }

        let Some((prev, at)) = self.prev else {
            return Some(self.rest_at(point, now));
        };

        let gap = now.millis_since(at);
        if gap > self.config.max_interval_ms as f64 {
            trace!(gap_ms = gap, "sample gap exceeds interval, jumping");
            return Some(self.rest_at(point, now));
        }

        if self.state == MotionState::Stopped {
            if prev.distance(&point) < self.config.snap_distance {
                self.prev = Some((point, now));
                return Some(point);
            }
            self.spline.clear();
            self.spline.push(prev);
            self.spline.push(prev);
            self.spline.push(point);
            self.state = MotionState::Idle;
        } else {
            self.spline.push(point);
        }

        self.prev = Some((point, now));

        if gap < self.config.min_frame_ms as f64 {
            return Some(point);
        }

        let segment = Segment {
            start: self.spline.last_segment(),
            to: point,
            duration_ms: gap,
        };

        match self.state {
            MotionState::Animating => self.queue.push_back(segment),
            _ => {
                self.state = MotionState::Animating;
                self.running = Some(Running {
                    segment,
                    started: now,
                });
            }
        }
        None
    }

    /// Position for the frame at `now`, if motion is in flight
    pub fn tick(&mut self, now: PresenceTime) -> Option<Point> {
        if self.disposed {
            return None;
        }

        loop {
            let running = self.running?;
            let t = now.millis_since(running.started) / running.segment.duration_ms;
            if t <= 1.0 {
                return self
                    .spline
                    .point_at(running.segment.start as f64 + t.max(0.0));
            }

            match self.queue.pop_front() {
                Some(next) => {
                    self.running = Some(Running {
                        segment: next,
                        started: now,
                    });
                }
                None => {
                    // Settle exactly on the last sample
                    self.running = None;
                    self.state = MotionState::Idle;
                    self.spline.trim(self.config.history.max(3));
                    return Some(running.segment.to);
                }
            }
        }
    }

    /// Drop in-flight motion; the next sample is placed directly
    pub fn interrupt(&mut self) {
        self.queue.clear();
        self.running = None;
        self.spline.clear();
        self.prev = None;
        self.state = MotionState::Stopped;
    }

    /// Stop for good; later calls are inert
    pub fn dispose(&mut self) {
        self.interrupt();
        self.disposed = true;
    }

    fn rest_at(&mut self, point: Point, now: PresenceTime) -> Point {
        self.queue.clear();
        self.running = None;
        self.spline.clear();
        self.spline.push(point);
        self.prev = Some((point, now));
        self.state = MotionState::Stopped;
        point
    }
}

impl Default for MotionSmoother {
    fn default() -> Self {
        Self::new(SmootherConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ms(v: i64) -> PresenceTime {
        PresenceTime::from_millis(v)
    }

    /// Feed samples at the given times and tick every `frame` ms until `until`
    fn run(samples: &[(i64, Point)], frame: i64, until: i64) -> Vec<Point> {
        let mut smoother = MotionSmoother::default();
        let mut out = Vec::new();
        let mut next = 0;
        let mut now = 0;
        while now <= until {
            while next < samples.len() && samples[next].0 <= now {
                if let Some(p) = smoother.add_point(samples[next].1, ms(samples[next].0)) {
                    out.push(p);
                }
                next += 1;
            }
            if let Some(p) = smoother.tick(ms(now)) {
                out.push(p);
            }
            now += frame;
        }
        out
    }

    #[test]
    fn test_first_sample_is_immediate() {
        let mut s = MotionSmoother::default();
        assert_eq!(s.add_point(Point::new(5.0, 5.0), ms(0)), Some(Point::new(5.0, 5.0)));
        assert_eq!(s.state(), MotionState::Stopped);
        assert_eq!(s.tick(ms(16)), None);
    }

    #[test]
    fn test_smooth_progress_between_samples() {
        let samples: Vec<_> = (0..5)
            .map(|i| (i * 50, Point::new(i as f64 * 10.0, 0.0)))
            .collect();
        let frames = run(&samples, 10, 400);

        // Monotonic along the path, ending on the final sample
        for w in frames.windows(2) {
            assert!(w[1].x >= w[0].x - 1e-9, "went backwards: {:?}", w);
        }
        assert_eq!(frames.last(), Some(&Point::new(40.0, 0.0)));

        // Intermediate frames exist between samples
        let between = frames
            .iter()
            .filter(|p| (p.x % 10.0).abs() > 1e-6)
            .count();
        assert!(between > 0);
    }

    #[test]
    fn test_gap_beyond_interval_jumps() {
        let mut s = MotionSmoother::default();
        s.add_point(Point::new(0.0, 0.0), ms(0));
        assert_eq!(s.add_point(Point::new(50.0, 0.0), ms(50)), None);
        assert_eq!(s.state(), MotionState::Animating);

        // 150 ms after the previous sample: drop the glide, place directly
        let p = s.add_point(Point::new(300.0, 300.0), ms(200));
        assert_eq!(p, Some(Point::new(300.0, 300.0)));
        assert_eq!(s.state(), MotionState::Stopped);
        assert_eq!(s.queued(), 0);
        assert_eq!(s.tick(ms(216)), None);
    }

    #[test]
    fn test_small_move_at_rest_snaps() {
        let mut s = MotionSmoother::default();
        s.add_point(Point::new(10.0, 10.0), ms(0));
        assert_eq!(s.add_point(Point::new(12.0, 11.0), ms(40)), Some(Point::new(12.0, 11.0)));
        assert_eq!(s.state(), MotionState::Stopped);
    }

    #[test]
    fn test_burst_is_emitted_directly() {
        let mut s = MotionSmoother::default();
        s.add_point(Point::new(0.0, 0.0), ms(0));
        s.add_point(Point::new(20.0, 0.0), ms(40));
        assert_eq!(s.add_point(Point::new(25.0, 0.0), ms(45)), Some(Point::new(25.0, 0.0)));
    }

    #[test]
    fn test_segments_queue_while_animating() {
        let mut s = MotionSmoother::default();
        s.add_point(Point::new(0.0, 0.0), ms(0));
        s.add_point(Point::new(20.0, 0.0), ms(50));
        s.add_point(Point::new(40.0, 0.0), ms(100));
        assert_eq!(s.queued(), 1);

        // First segment finished at 100; second plays from its start
        let p = s.tick(ms(110)).unwrap();
        assert!((p.x - 20.0).abs() < 1e-9);
        assert_eq!(s.queued(), 0);
        assert_eq!(s.state(), MotionState::Animating);

        assert_eq!(s.tick(ms(200)), Some(Point::new(40.0, 0.0)));
        assert_eq!(s.state(), MotionState::Idle);
    }

    #[test]
    fn test_interrupt_then_next_sample_is_immediate() {
        let mut s = MotionSmoother::default();
        s.add_point(Point::new(0.0, 0.0), ms(0));
        s.add_point(Point::new(50.0, 0.0), ms(50));
        s.interrupt();
        assert_eq!(s.tick(ms(60)), None);
        assert_eq!(s.add_point(Point::new(70.0, 0.0), ms(70)), Some(Point::new(70.0, 0.0)));
    }

    #[test]
    fn test_dispose_is_final() {
        let mut s = MotionSmoother::default();
        s.add_point(Point::new(0.0, 0.0), ms(0));
        s.dispose();
        assert!(s.is_disposed());
        assert_eq!(s.add_point(Point::new(9.0, 9.0), ms(10)), None);
        assert_eq!(s.tick(ms(20)), None);
    }

    #[test]
    fn test_history_trimmed_at_rest() {
        let mut s = MotionSmoother::new(SmootherConfig {
            history: 4,
            ..SmootherConfig::default()
        });
        for i in 0..10 {
            s.add_point(Point::new(i as f64 * 20.0, 0.0), ms(i * 50));
        }
        assert!(s.spline.len() > 4);

        // Drain the queue one segment per late frame
        for i in 0..20 {
            s.tick(ms(1_000 + i * 100));
        }
        assert_eq!(s.state(), MotionState::Idle);
        assert!(s.spline.len() <= 4);
    }

    proptest! {
        #[test]
        fn prop_frames_stay_near_path(
            steps in prop::collection::vec((20i64..100, -30.0f64..30.0, -30.0f64..30.0), 1..20)
        ) {
            let mut samples = vec![(0, Point::ORIGIN)];
            let mut t = 0;
            let mut p = Point::ORIGIN;
            for (dt, dx, dy) in steps {
                t += dt;
                p = Point::new(p.x + dx, p.y + dy);
                samples.push((t, p));
            }
            let frames = run(&samples, 8, t + 1_000);

            // Output settles on the final sample
            prop_assert_eq!(frames.last().copied(), Some(p));

            // Every frame stays within the bounding box of the samples, with
            // room for spline overshoot
            let min_x = samples.iter().map(|s| s.1.x).fold(f64::MAX, f64::min) - 30.0;
            let max_x = samples.iter().map(|s| s.1.x).fold(f64::MIN, f64::max) + 30.0;
            for f in &frames {
                prop_assert!(f.x >= min_x && f.x <= max_x);
            }
        }
    }
}
