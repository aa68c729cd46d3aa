//! End-to-end scenarios
//!
//! Each scenario drives a fresh simulator and reports what the observing
//! session saw, so tests (and ad-hoc runs) can assert on it:
//! - Joining, acquiring a bench and releasing it
//! - Leaving, as seen by the sessions that stay
//! - Smoothing of a burst of remote samples
//! - Handoff between objects and contention for one object

use park_core::{Action, DocumentAddress, ParkError, ParkResult, Point, SessionId};
use park_runtime::{page_position, BrokerStats, Host, InputEvent, ObjectKind};

use crate::ParkSimulator;

// ============================================================================
// JOIN / ACQUIRE / RELEASE
// ============================================================================

/// What the joining session observed while the creator used a bench
#[derive(Clone, Debug)]
pub struct BenchOutcome {
    pub address: DocumentAddress,
    /// Records mirrored by (creator, joiner) after joining
    pub records_seen: (usize, usize),
    pub creator: SessionId,
    pub occupant_seen: Option<SessionId>,
    pub host_seen: Option<Host>,
    pub pose_seen: Option<Action>,
    pub x_seen: Option<f64>,
    /// Track width minus the creator's avatar width
    pub usable_width: f64,
    pub host_after_release: Option<Host>,
    pub occupant_after_release: Option<SessionId>,
}

/// Creator makes a document, joiner follows; creator sits `offset` pixels
/// into the bench, then clicks it again
pub fn scenario_bench(offset: f64) -> ParkResult<BenchOutcome> {
    let mut sim = ParkSimulator::standard();
    let creator = sim.spawn()?;
    let joiner = sim.spawn()?;

    let address = sim.session_mut(creator).join(None)?;
    sim.session_mut(joiner).join(Some(address.as_str()))?;
    sim.settle();
    let records_seen = (
        sim.session(creator).mirror().len(),
        sim.session(joiner).mirror().len(),
    );

    let creator_id = sim.id(creator);
    let bench = sim
        .click_object(creator, ObjectKind::Bench, offset)
        .ok_or_else(|| ParkError::UnknownObject("cursor-bench".into()))?;
    sim.settle();

    let observed = sim.session(joiner);
    let view = observed.mirror().get(creator_id);
    let occupant_seen = observed.brokers().occupant(bench);
    let host_seen = view.map(|v| v.host);
    let pose_seen = view.map(|v| v.action);
    let x_seen = view.map(|v| v.target.x);

    let scale = sim
        .session(creator)
        .mirror()
        .local()
        .map_or(1.0, |v| v.scale);
    let rect = sim.scene().object(bench).map(|o| o.rect).unwrap_or_default();
    let usable_width = rect.width - sim.config().avatar_width(scale);

    sim.click_object(creator, ObjectKind::Bench, offset);
    sim.settle();
    let observed = sim.session(joiner);

    Ok(BenchOutcome {
        address,
        records_seen,
        creator: creator_id,
        occupant_seen,
        host_seen,
        pose_seen,
        x_seen,
        usable_width,
        host_after_release: observed.mirror().get(creator_id).map(|v| v.host),
        occupant_after_release: observed.brokers().occupant(bench),
    })
}

// ============================================================================
// LEAVE
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeaveOutcome {
    pub views_before: usize,
    pub views_after: usize,
    pub smoothers_before: usize,
    pub smoothers_after: usize,
    /// The leaver's record is gone from the observer's replica
    pub record_deleted: bool,
    /// The object the leaver sat on is idle again
    pub object_idle: bool,
}

/// The last of `sessions` sessions sits on the mat, then leaves
pub fn scenario_leave(sessions: usize) -> ParkResult<LeaveOutcome> {
    if sessions < 2 {
        return Err(ParkError::InvalidConfig("leave needs an observer".into()));
    }
    let mut sim = ParkSimulator::standard();
    sim.populate(sessions)?;
    let leaver = sessions - 1;
    let leaver_id = sim.id(leaver);

    let mat = sim
        .click_object(leaver, ObjectKind::Mat, 10.0)
        .ok_or_else(|| ParkError::UnknownObject("cursor-mat".into()))?;
    sim.settle();

    let observer = sim.session(0);
    let views_before = observer.mirror().len();
    let smoothers_before = observer.mirror().smoother_count();

    sim.session_mut(leaver).leave();
    sim.settle();

    let observer = sim.session(0);
    Ok(LeaveOutcome {
        views_before,
        views_after: observer.mirror().len(),
        smoothers_before,
        smoothers_after: observer.mirror().smoother_count(),
        record_deleted: observer
            .handle()
            .is_some_and(|h| !h.document().contains(leaver_id)),
        object_idle: observer.brokers().occupant(mat).is_none(),
    })
}

// ============================================================================
// SMOOTHING
// ============================================================================

#[derive(Clone, Debug, Default)]
pub struct SmoothingOutcome {
    pub samples: Vec<Point>,
    /// Rendered positions of the mover, one per frame, as seen by the observer
    pub frames: Vec<Point>,
}

impl SmoothingOutcome {
    /// Frames strictly between two consecutive samples
    pub fn interpolated_frames(&self) -> usize {
        self.frames
            .iter()
            .filter(|f| !self.samples.iter().any(|s| s.distance(f) < 1e-6))
            .count()
    }

    pub fn last_frame(&self) -> Option<Point> {
        self.frames.last().copied()
    }
}

/// The mover's pointer passes through `samples`, `interval_ms` apart, while
/// the observer renders frames of `frame_ms`
pub fn scenario_smoothing(
    samples: &[Point],
    interval_ms: u64,
    frame_ms: u64,
) -> ParkResult<SmoothingOutcome> {
    let mut sim = ParkSimulator::standard();
    sim.populate(2)?;
    let (observer, mover) = (0, 1);
    let mover_id = sim.id(mover);

    // Older than the smoother's jump threshold: the first sample lands as-is
    sim.advance(1_000);

    let mut out = SmoothingOutcome {
        samples: samples.to_vec(),
        frames: Vec::new(),
    };
    let frames_per_sample = (interval_ms / frame_ms.max(1)).max(1);
    let mut observe = |sim: &mut ParkSimulator, frames: u64| {
        for _ in 0..frames {
            sim.advance(frame_ms);
            let s = sim.session(observer);
            if let Some(p) = page_position(s.scene(), s.mirror(), mover_id) {
                out.frames.push(p);
            }
        }
    };

    for p in samples {
        sim.input(mover, InputEvent::PointerMove(*p));
        sim.session_mut(mover).sync()?;
        sim.session_mut(observer).sync()?;
        observe(&mut sim, frames_per_sample);
    }
    // Drain queued segments
    observe(&mut sim, frames_per_sample * 4);
    Ok(out)
}

// ============================================================================
// HANDOFF / CONTENTION
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HandoffOutcome {
    /// Bench broker as seen by the mover
    pub local_bench: BrokerStats,
    /// Bench broker as seen by the observer
    pub remote_bench: BrokerStats,
    pub mover_host: Option<Host>,
    pub observed_host: Option<Host>,
}

/// The mover sits on the bench, then moves straight to the rock
pub fn scenario_handoff() -> ParkResult<HandoffOutcome> {
    let mut sim = ParkSimulator::standard();
    sim.populate(2)?;
    let (observer, mover) = (0, 1);
    let mover_id = sim.id(mover);

    let missing = || ParkError::UnknownObject("standard scene".into());
    let (bench, _) = sim.object(ObjectKind::Bench).ok_or_else(missing)?;
    let (rock, _) = sim.object(ObjectKind::Rock).ok_or_else(missing)?;
    let bench_point = sim.object_point(ObjectKind::Bench, 20.0).ok_or_else(missing)?;
    let rock_point = sim.object_point(ObjectKind::Rock, 20.0).ok_or_else(missing)?;

    sim.session_mut(mover).acquire(bench, bench_point)?;
    sim.settle();
    sim.session_mut(mover).acquire(rock, rock_point)?;
    sim.settle();

    let stats = |i: usize| {
        sim.session(i)
            .brokers()
            .get(bench)
            .map(|b| b.stats())
            .unwrap_or_default()
    };
    Ok(HandoffOutcome {
        local_bench: stats(mover),
        remote_bench: stats(observer),
        mover_host: sim.session(mover).local_host(),
        observed_host: sim.session(observer).mirror().get(mover_id).map(|v| v.host),
    })
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentionOutcome {
    pub hosts: Vec<Option<Host>>,
    pub preemptions: Vec<u64>,
    pub exclusive: bool,
    pub converged: bool,
}

/// Every session clicks the same bench before anyone syncs
pub fn scenario_contention(sessions: usize) -> ParkResult<ContentionOutcome> {
    let mut sim = ParkSimulator::standard();
    sim.populate(sessions)?;
    for i in 0..sessions {
        sim.click_object(i, ObjectKind::Bench, 30.0);
    }
    sim.settle();

    Ok(ContentionOutcome {
        hosts: sim.sessions().iter().map(|s| s.local_host()).collect(),
        preemptions: sim.sessions().iter().map(|s| s.stats().preemptions).collect(),
        exclusive: sim.exclusive(),
        converged: sim.converged(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use park_core::AvatarUpdate;

    #[test]
    fn test_bench_scenario() {
        let out = scenario_bench(10.0).unwrap();
        assert_eq!(out.records_seen, (2, 2));
        assert_eq!(out.occupant_seen, Some(out.creator));
        assert!(matches!(out.host_seen, Some(Host::Object(_))));
        assert_eq!(out.pose_seen, Some(Action::Sitting));

        let x = out.x_seen.unwrap();
        assert!(x >= 0.0 && x <= out.usable_width, "x {} outside [0, {}]", x, out.usable_width);

        assert_eq!(out.host_after_release, Some(Host::Root));
        assert_eq!(out.occupant_after_release, None);
    }

    #[test]
    fn test_bench_far_edge_clamped() {
        let out = scenario_bench(59.0).unwrap();
        let x = out.x_seen.unwrap();
        assert!((x - out.usable_width).abs() < 1e-9);
    }

    #[test]
    fn test_leave_scenario() {
        let out = scenario_leave(3).unwrap();
        assert_eq!(out.views_before, 3);
        assert_eq!(out.views_after, 2);
        assert_eq!(out.smoothers_before, 2);
        assert_eq!(out.smoothers_after, 1);
        assert!(out.record_deleted);
        assert!(out.object_idle);
    }

    #[test]
    fn test_leave_needs_observer() {
        assert!(scenario_leave(1).is_err());
    }

    #[test]
    fn test_smoothing_scenario() {
        let samples: Vec<Point> = (0..5)
            .map(|i| Point::new(100.0 + 30.0 * i as f64, 100.0))
            .collect();
        let out = scenario_smoothing(&samples, 40, 8).unwrap();

        // 5 samples within 200ms render as a glide, not 5 discrete jumps
        assert!(out.interpolated_frames() >= 8, "{:?}", out.frames);
        for pair in out.frames.windows(2) {
            assert!(pair[1].x >= pair[0].x - 1e-6, "went backwards: {:?}", pair);
            assert!((pair[1].y - 100.0).abs() < 1e-6);
        }
        let last = out.last_frame().unwrap();
        assert!(last.distance(&samples[4]) < 1e-6);
    }

    #[test]
    fn test_smoothing_first_sample_lands_immediately() {
        let samples = [Point::new(300.0, 50.0)];
        let out = scenario_smoothing(&samples, 40, 8).unwrap();
        assert_eq!(out.frames.first().copied(), Some(samples[0]));
        assert_eq!(out.interpolated_frames(), 0);
    }

    #[test]
    fn test_handoff_releases_bench_once() {
        let out = scenario_handoff().unwrap();
        assert_eq!(out.local_bench, BrokerStats { acquisitions: 1, releases: 1 });
        assert_eq!(out.remote_bench, BrokerStats { acquisitions: 1, releases: 1 });
        assert_eq!(out.mover_host, out.observed_host);
        assert!(matches!(out.mover_host, Some(Host::Object(_))));
    }

    #[test]
    fn test_contention_everyone_bounces() {
        let out = scenario_contention(2).unwrap();
        assert!(out.exclusive);
        assert!(out.converged);
        assert_eq!(out.hosts, vec![Some(Host::Root); 2]);
        assert_eq!(out.preemptions, vec![1, 1]);
    }

    #[test]
    fn test_contention_many_sessions() {
        let out = scenario_contention(4).unwrap();
        assert!(out.exclusive);
        assert!(out.converged);
    }

    #[test]
    fn test_read_your_writes() {
        let mut sim = ParkSimulator::standard();
        sim.populate(2).unwrap();
        sim.relay().set_online(false);

        let session = sim.session_mut(1);
        assert!(session.publish_self(AvatarUpdate::new().action(Action::Crouching).rotation(15.0)));
        let view = session.mirror().local().unwrap();
        assert_eq!(view.action, Action::Crouching);
        assert_eq!(view.rotation, 15.0);

        // Nothing reached the other session yet
        let id = sim.id(1);
        assert_eq!(sim.session(0).mirror().get(id).unwrap().action, Action::Pointing);

        sim.relay().set_online(true);
        sim.settle();
        assert_eq!(sim.session(0).mirror().get(id).unwrap().action, Action::Crouching);
        assert!(sim.converged());
    }

    #[test]
    fn test_occupied_object_ignores_other_clicks() {
        let mut sim = ParkSimulator::standard();
        sim.populate(2).unwrap();
        let bench = sim.click_object(0, ObjectKind::Bench, 30.0).unwrap();
        sim.settle();

        sim.click_object(1, ObjectKind::Bench, 30.0);
        sim.settle();
        assert_eq!(sim.session(1).brokers().occupant(bench), Some(sim.id(0)));
        assert_eq!(sim.session(1).local_host(), Some(Host::Root));
        assert_eq!(sim.session(0).stats().preemptions, 0);
    }
}
