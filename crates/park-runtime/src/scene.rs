//! Scene tree - the root presence space and its interactive objects
//!
//! Locators are assigned by registration order, so two clients that build the
//! same scene resolve the same locator strings to the same objects.

use std::collections::HashMap;
use std::fmt;

use park_core::{Locator, Point, Rect};

use crate::ObjectKind;

/// Local handle of an interactive object
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u32);

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({})", self.0)
    }
}

/// Container hosting an avatar view
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Host {
    /// The root presence space
    #[default]
    Root,
    Object(ObjectId),
}

impl Host {
    pub fn object(self) -> Option<ObjectId> {
        match self {
            Host::Root => None,
            Host::Object(id) => Some(id),
        }
    }

    pub fn is_root(self) -> bool {
        self == Host::Root
    }
}

#[derive(Clone, Debug)]
pub struct SceneObject {
    pub id: ObjectId,
    pub kind: ObjectKind,
    /// Bounds in page coordinates
    pub rect: Rect,
    pub locator: Locator,
}

/// The presentation tree shared (structurally) by every client
#[derive(Clone, Debug)]
pub struct SceneTree {
    root: Locator,
    objects: Vec<SceneObject>,
    by_locator: HashMap<Locator, ObjectId>,
    per_kind: HashMap<ObjectKind, usize>,
}

impl SceneTree {
    pub fn new(root: Locator) -> Self {
        SceneTree {
            root,
            objects: Vec::new(),
            by_locator: HashMap::new(),
            per_kind: HashMap::new(),
        }
    }

    /// The park layout: one object of every kind
    pub fn standard(root: Locator) -> Self {
        let mut scene = SceneTree::new(root);
        scene.add(ObjectKind::Sign, Rect::new(40.0, 360.0, 26.0, 53.0));
        scene.add(ObjectKind::Bench, Rect::new(120.0, 400.0, 60.0, 30.0));
        scene.add(ObjectKind::Mat, Rect::new(260.0, 420.0, 50.0, 30.0));
        scene.add(ObjectKind::Rock, Rect::new(360.0, 410.0, 40.0, 24.0));
        scene.add(ObjectKind::Library, Rect::new(460.0, 360.0, 48.0, 64.0));
        scene.add(ObjectKind::Mailbox, Rect::new(560.0, 390.0, 20.0, 36.0));
        scene.add(ObjectKind::Slide, Rect::new(640.0, 380.0, 44.0, 37.0));
        scene
    }

    /// Register an object; its locator is `<root> > <tag>:nth-of-type(n)`
    pub fn add(&mut self, kind: ObjectKind, rect: Rect) -> ObjectId {
        let id = ObjectId(self.objects.len() as u32);
        let nth = self.per_kind.entry(kind).or_insert(0);
        *nth += 1;
        let locator = Locator::child(&self.root, kind.tag(), *nth);
        self.by_locator.insert(locator.clone(), id);
        self.objects.push(SceneObject {
            id,
            kind,
            rect,
            locator,
        });
        id
    }

    pub fn root_locator(&self) -> &Locator {
        &self.root
    }

    pub fn locator(&self, host: Host) -> Option<&Locator> {
        match host {
            Host::Root => Some(&self.root),
            Host::Object(id) => self.object(id).map(|o| &o.locator),
        }
    }

    /// Resolve a locator; `None` when nothing in this scene matches
    pub fn resolve(&self, locator: &Locator) -> Option<Host> {
        if *locator == self.root {
            return Some(Host::Root);
        }
        self.by_locator.get(locator).copied().map(Host::Object)
    }

    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(id.0 as usize)
    }

    pub fn objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter()
    }

    /// First object of `kind`
    pub fn find(&self, kind: ObjectKind) -> Option<ObjectId> {
        self.objects.iter().find(|o| o.kind == kind).map(|o| o.id)
    }

    /// Topmost object under a page point
    pub fn hit_test(&self, point: &Point) -> Option<ObjectId> {
        self.objects
            .iter()
            .rev()
            .find(|o| o.rect.contains(point))
            .map(|o| o.id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
