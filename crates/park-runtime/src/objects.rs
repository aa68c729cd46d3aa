//! Interactive object profiles
//!
//! Every object kind shares the same acquire/release contract and differs
//! only in the data below: the pose it gives an occupant, how the interaction
//! point maps to an offset, and which secondary interactions it supports.

use std::time::Duration;

use park_core::{clamp, Action, Point, Rect};
use park_motion::{Keyframe, KeyframeAnimation};

use crate::Key;

/// Kind of interactive object
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectKind {
    Bench,
    Mat,
    Sign,
    Rock,
    Library,
    Mailbox,
    Slide,
}

impl ObjectKind {
    pub const ALL: [ObjectKind; 7] = [
        ObjectKind::Bench,
        ObjectKind::Mat,
        ObjectKind::Sign,
        ObjectKind::Rock,
        ObjectKind::Library,
        ObjectKind::Mailbox,
        ObjectKind::Slide,
    ];

    /// Element tag used in locators
    pub fn tag(self) -> &'static str {
        match self {
            ObjectKind::Bench => "cursor-bench",
            ObjectKind::Mat => "cursor-mat",
            ObjectKind::Sign => "cursor-sign",
            ObjectKind::Rock => "cursor-rock",
            ObjectKind::Library => "cursor-library",
            ObjectKind::Mailbox => "cursor-mailbox",
            ObjectKind::Slide => "cursor-slide",
        }
    }

    pub fn profile(self) -> ObjectProfile {
        match self {
            ObjectKind::Bench => ObjectProfile {
                pose: Action::Sitting,
                placement: Placement::Track,
                nudge: true,
                holds: &[
                    (Key::ArrowUp, Action::SittingForwards),
                    (Key::ArrowDown, Action::SittingBackwards),
                ],
                descent: false,
            },
            ObjectKind::Mat => ObjectProfile {
                pose: Action::Crouching,
                placement: Placement::Area,
                nudge: false,
                holds: &[],
                descent: false,
            },
            ObjectKind::Sign => ObjectProfile {
                pose: Action::LookingUp,
                placement: Placement::Anchor { fx: 0.5, fy: 1.0 },
                nudge: false,
                holds: &[],
                descent: false,
            },
            ObjectKind::Rock => ObjectProfile {
                pose: Action::Standing,
                placement: Placement::Track,
                nudge: true,
                holds: &[],
                descent: false,
            },
            ObjectKind::Library => ObjectProfile {
                pose: Action::LookingDown,
                placement: Placement::Anchor { fx: 0.5, fy: 0.6 },
                nudge: false,
                holds: &[(Key::Space, Action::Standing)],
                descent: false,
            },
            ObjectKind::Mailbox => ObjectProfile {
                pose: Action::Standing,
                placement: Placement::Anchor { fx: 1.0, fy: 0.5 },
                nudge: false,
                holds: &[(Key::ArrowDown, Action::Crouching)],
                descent: false,
            },
            ObjectKind::Slide => ObjectProfile {
                pose: Action::Sliding,
                placement: Placement::Anchor { fx: 0.1, fy: 0.0 },
                nudge: false,
                holds: &[],
                descent: true,
            },
        }
    }
}

/// How an interaction point becomes a host-relative offset
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Placement {
    /// Horizontal track: x follows the click, y pinned to the top edge
    Track,
    /// Anywhere on the object's surface
    Area,
    /// Fixed spot, as fractions of the object's size
    Anchor { fx: f64, fy: f64 },
}

/// Behaviour of one object kind
#[derive(Clone, Copy, Debug)]
pub struct ObjectProfile {
    /// Pose given to the occupant
    pub pose: Action,
    pub placement: Placement,
    /// ArrowLeft/ArrowRight move the occupant along the track
    pub nudge: bool,
    /// Poses taken while a key is held
    pub holds: &'static [(Key, Action)],
    /// Occupant rides a keyframed descent after acquiring
    pub descent: bool,
}

impl ObjectProfile {
    /// Host-relative offset for an occupant acquiring at page point `point`
    pub fn place(&self, rect: &Rect, point: &Point, avatar_width: f64) -> Point {
        match self.placement {
            Placement::Track => {
                let offset = clamp(0.0, point.x - rect.x, rect.width) - avatar_width / 2.0;
                Point::new(track_clamp(rect, offset, avatar_width), 0.0)
            }
            Placement::Area => {
                let rel = rect.relative(point);
                Point::new(
                    clamp(0.0, rel.x, rect.width),
                    clamp(0.0, rel.y, rect.height),
                )
            }
            Placement::Anchor { fx, fy } => anchor(rect, fx, fy, avatar_width),
        }
    }

    /// Pose held while `key` is down, if any
    pub fn hold_pose(&self, key: Key) -> Option<Action> {
        self.holds.iter().find(|(k, _)| *k == key).map(|(_, a)| *a)
    }

    /// Whether this kind listens to keys at all
    pub fn wants_keys(&self) -> bool {
        self.nudge || !self.holds.is_empty()
    }

    /// New x after nudging by `delta`, or `None` at an edge
    pub fn nudge(&self, rect: &Rect, x: f64, delta: f64, avatar_width: f64) -> Option<f64> {
        if !self.nudge {
            return None;
        }
        let next = track_clamp(rect, x + delta, avatar_width);
        (next != x).then_some(next)
    }
}

/// Keep an occupant of width `avatar_width` inside the track
fn track_clamp(rect: &Rect, x: f64, avatar_width: f64) -> f64 {
    clamp(0.0, x, rect.width - avatar_width)
}

fn anchor(rect: &Rect, fx: f64, fy: f64, avatar_width: f64) -> Point {
    Point::new(fx * rect.width - avatar_width / 2.0, fy * rect.height)
}

/// Ride down a slide of size `rect`, from the top anchor to the bottom
pub fn slide_descent(rect: &Rect, avatar_width: f64, duration: Duration) -> KeyframeAnimation {
    let frame = |pct: f64, fx: f64, fy: f64, rotation: f64| {
        let p = anchor(rect, fx, fy, avatar_width);
        Keyframe::at(pct).x(p.x).y(p.y).rotation(rotation)
    };
    KeyframeAnimation::new(
        duration,
        [
            frame(0.0, 0.1, 0.0, 0.0),
            frame(30.0, 0.35, 0.3, 40.0),
            frame(60.0, 0.6, 0.7, 30.0),
            frame(85.0, 0.85, 0.85, 10.0),
            frame(100.0, 0.95, 0.85, 0.0),
        ],
    )
}
