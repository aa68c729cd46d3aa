//! Avatar record definitions
//!
//! One avatar record exists per joined session. Records are independent keys
//! of the replicated document, each written only by its owning session.

use crate::{Action, Locator, Point};

/// Field name of an avatar record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AvatarField {
    Parent,
    Action,
    X,
    Y,
    Color,
    Rotation,
    Scale,
}

impl AvatarField {
    pub fn name(self) -> &'static str {
        match self {
            AvatarField::Parent => "parent",
            AvatarField::Action => "action",
            AvatarField::X => "x",
            AvatarField::Y => "y",
            AvatarField::Color => "color",
            AvatarField::Rotation => "rotation",
            AvatarField::Scale => "scale",
        }
    }

    /// Is this a positional field (x or y)?
    #[inline]
    pub fn is_position(self) -> bool {
        matches!(self, AvatarField::X | AvatarField::Y)
    }
}

/// A single field write, tagged by the field it targets
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Parent(Locator),
    Action(Action),
    X(f64),
    Y(f64),
    Color(String),
    Rotation(f64),
    Scale(f64),
}

impl FieldValue {
    pub fn field(&self) -> AvatarField {
        match self {
            FieldValue::Parent(_) => AvatarField::Parent,
            FieldValue::Action(_) => AvatarField::Action,
            FieldValue::X(_) => AvatarField::X,
            FieldValue::Y(_) => AvatarField::Y,
            FieldValue::Color(_) => AvatarField::Color,
            FieldValue::Rotation(_) => AvatarField::Rotation,
            FieldValue::Scale(_) => AvatarField::Scale,
        }
    }
}

/// Replicated per-session avatar state
#[derive(Clone, Debug, PartialEq)]
pub struct AvatarRecord {
    pub action: Action,
    pub color: String,
    pub rotation: f64,
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub parent: Locator,
}

impl AvatarRecord {
    /// Record written when a session joins: roaming pose at the pointer
    pub fn joining(color: impl Into<String>, scale: f64, pointer: Point, root: Locator) -> Self {
        AvatarRecord {
            action: Action::Pointing,
            color: color.into(),
            rotation: 0.0,
            x: pointer.x,
            y: pointer.y,
            scale,
            parent: root,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Apply a single field write
    pub fn apply(&mut self, value: &FieldValue) {
        match value {
            FieldValue::Parent(l) => self.parent = l.clone(),
            FieldValue::Action(a) => self.action = *a,
            FieldValue::X(x) => self.x = *x,
            FieldValue::Y(y) => self.y = *y,
            FieldValue::Color(c) => self.color = c.clone(),
            FieldValue::Rotation(r) => self.rotation = *r,
            FieldValue::Scale(s) => self.scale = *s,
        }
    }

    /// All fields as writes, in publish order
    pub fn fields(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::Parent(self.parent.clone()),
            FieldValue::Action(self.action),
            FieldValue::X(self.x),
            FieldValue::Y(self.y),
            FieldValue::Color(self.color.clone()),
            FieldValue::Rotation(self.rotation),
            FieldValue::Scale(self.scale),
        ]
    }

    /// Rebuild a record from field writes; `None` if any field is missing
    pub fn from_fields<'a>(values: impl IntoIterator<Item = &'a FieldValue>) -> Option<Self> {
        let mut parent = None;
        let mut action = None;
        let mut x = None;
        let mut y = None;
        let mut color = None;
        let mut rotation = None;
        let mut scale = None;

        for value in values {
            match value {
                FieldValue::Parent(l) => parent = Some(l.clone()),
                FieldValue::Action(a) => action = Some(*a),
                FieldValue::X(v) => x = Some(*v),
                FieldValue::Y(v) => y = Some(*v),
                FieldValue::Color(c) => color = Some(c.clone()),
                FieldValue::Rotation(r) => rotation = Some(*r),
                FieldValue::Scale(s) => scale = Some(*s),
            }
        }

        Some(AvatarRecord {
            action: action?,
            color: color?,
            rotation: rotation?,
            x: x?,
            y: y?,
            scale: scale?,
            parent: parent?,
        })
    }
}

/// Partial update of the local avatar record
///
/// Any subset of fields may be set; unset fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AvatarUpdate {
    pub action: Option<Action>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub color: Option<String>,
    pub rotation: Option<f64>,
    pub scale: Option<f64>,
    pub parent: Option<Locator>,
}

impl AvatarUpdate {
    pub fn new() -> Self {
        AvatarUpdate::default()
    }

    pub fn action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    pub fn x(mut self, x: f64) -> Self {
        self.x = Some(x);
        self
    }

    pub fn y(mut self, y: f64) -> Self {
        self.y = Some(y);
        self
    }

    pub fn position(self, p: Point) -> Self {
        self.x(p.x).y(p.y)
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn rotation(mut self, rotation: f64) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn parent(mut self, parent: Locator) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }

    /// Field writes in publish order: parent, action, x, y, color, rotation, scale
    pub fn values(&self) -> Vec<FieldValue> {
        let mut out = Vec::new();
        if let Some(p) = &self.parent {
            out.push(FieldValue::Parent(p.clone()));
        }
        if let Some(a) = self.action {
            out.push(FieldValue::Action(a));
        }
        if let Some(x) = self.x {
            out.push(FieldValue::X(x));
        }
        if let Some(y) = self.y {
            out.push(FieldValue::Y(y));
        }
        if let Some(c) = &self.color {
            out.push(FieldValue::Color(c.clone()));
        }
        if let Some(r) = self.rotation {
            out.push(FieldValue::Rotation(r));
        }
        if let Some(s) = self.scale {
            out.push(FieldValue::Scale(s));
        }
        out
    }
}
