//! Avatar pose tags

use std::fmt;
use std::str::FromStr;

use crate::ParkError;

/// Pose of an avatar
///
/// `Pointing` is the free-roam pose; every other pose is driven by a host
/// object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Action {
    #[default]
    Pointing,
    Sitting,
    SittingForwards,
    SittingBackwards,
    Standing,
    Sliding,
    Crouching,
    LookingUp,
    LookingDown,
}

impl Action {
    pub const ALL: [Action; 9] = [
        Action::Pointing,
        Action::Sitting,
        Action::SittingForwards,
        Action::SittingBackwards,
        Action::Standing,
        Action::Sliding,
        Action::Crouching,
        Action::LookingUp,
        Action::LookingDown,
    ];

    /// Wire tag stored in the replicated record
    pub fn tag(self) -> &'static str {
        match self {
            Action::Pointing => "pointing",
            Action::Sitting => "sitting",
            Action::SittingForwards => "sitting-forwards",
            Action::SittingBackwards => "sitting-backwards",
            Action::Standing => "standing",
            Action::Sliding => "sliding",
            Action::Crouching => "crouching",
            Action::LookingUp => "looking-up",
            Action::LookingDown => "looking-down",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Action::ALL.iter().copied().find(|a| a.tag() == tag)
    }

    /// Is this the free-roam pose (subject to motion smoothing)?
    #[inline]
    pub fn is_roaming(self) -> bool {
        self == Action::Pointing
    }
}

impl FromStr for Action {
    type Err = ParkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::from_tag(s).ok_or_else(|| ParkError::UnknownAction(s.to_string()))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
