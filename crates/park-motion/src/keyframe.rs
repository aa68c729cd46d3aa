//! Keyframe animation - scripted pose changes over time
//!
//! Keyframes are placed at a percentage of the total duration. Each keyframe
//! sets any of x, y and rotation; unset values are left alone. Advancing the
//! animation commits every keyframe whose time has come.

use std::time::Duration;

use park_core::PresenceTime;

/// Keyframe at `percentage` (0..=100) of the animation
///
/// Out-of-range percentages are clamped; non-finite ones are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Keyframe {
    pub percentage: f64,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub rotation: Option<f64>,
}

impl Keyframe {
    pub fn at(percentage: f64) -> Self {
        Keyframe {
            percentage,
            ..Keyframe::default()
        }
    }

    pub fn x(mut self, x: f64) -> Self {
        self.x = Some(x);
        self
    }

    pub fn y(mut self, y: f64) -> Self {
        self.y = Some(y);
        self
    }

    pub fn rotation(mut self, rotation: f64) -> Self {
        self.rotation = Some(rotation);
        self
    }
}

/// Values committed by one call to [`KeyframeAnimation::advance`]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameValues {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub rotation: Option<f64>,
}

impl FrameValues {
    fn merge(&mut self, frame: &Keyframe) {
        self.x = frame.x.or(self.x);
        self.y = frame.y.or(self.y);
        self.rotation = frame.rotation.or(self.rotation);
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.rotation.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Ready,
    Running(PresenceTime),
    Finished,
    Cancelled,
}

/// A one-shot keyframe animation
#[derive(Debug, Clone)]
pub struct KeyframeAnimation {
    /// (offset from start, keyframe), sorted by offset
    frames: Vec<(Duration, Keyframe)>,
    next: usize,
    phase: Phase,
}

impl KeyframeAnimation {
    pub fn new(duration: Duration, keyframes: impl IntoIterator<Item = Keyframe>) -> Self {
        let mut frames: Vec<(Duration, Keyframe)> = keyframes
            .into_iter()
            .filter(|k| k.percentage.is_finite())
            .map(|k| {
                let pct = k.percentage.clamp(0.0, 100.0);
                (duration.mul_f64(pct / 100.0), k)
            })
            .collect();
        frames.sort_by_key(|(offset, _)| *offset);

        KeyframeAnimation {
            frames,
            next: 0,
            phase: Phase::Ready,
        }
    }

    /// Begin playback at `now`
    pub fn start(&mut self, now: PresenceTime) {
        if self.phase == Phase::Ready {
            self.phase = Phase::Running(now);
        }
    }

    /// Commit every keyframe due by `now`, merged in order
    pub fn advance(&mut self, now: PresenceTime) -> Option<FrameValues> {
        let Phase::Running(started) = self.phase else {
            return None;
        };

        let mut values = FrameValues::default();
        let mut committed = false;
        while let Some((offset, frame)) = self.frames.get(self.next) {
            if started + *offset > now {
                break;
            }
            values.merge(frame);
            committed = true;
            self.next += 1;
        }

        if self.next == self.frames.len() {
            self.phase = Phase::Finished;
        }
        committed.then_some(values)
    }

    /// Stop without committing further keyframes
    pub fn cancel(&mut self) {
        if !matches!(self.phase, Phase::Finished) {
            self.phase = Phase::Cancelled;
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Running(_))
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn is_cancelled(&self) -> bool {
        self.phase == Phase::Cancelled
    }
}
