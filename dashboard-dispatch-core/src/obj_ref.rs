//! Object references and reference-keyed maps
//!
//! A domain object can be referenced either by its URI or by its
//! `(identifier, type)` pair. Both forms serialize to a normalized key; that
//! key, not structural comparison, decides equality. [`ObjRefMap`] indexes
//! every entity under all keys it is reachable by, so a URI reference and an
//! identifier reference to the same entity resolve to the same entry.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Kinds of metadata objects a reference can point at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObjectType {
    Attribute,
    DisplayForm,
    Measure,
    Fact,
    DataSet,
    Insight,
    Widget,
    AnalyticalDashboard,
    FilterContext,
    User,
}

impl ObjectType {
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectType::Attribute => "attribute",
            ObjectType::DisplayForm => "displayForm",
            ObjectType::Measure => "measure",
            ObjectType::Fact => "fact",
            ObjectType::DataSet => "dataSet",
            ObjectType::Insight => "insight",
            ObjectType::Widget => "widget",
            ObjectType::AnalyticalDashboard => "analyticalDashboard",
            ObjectType::FilterContext => "filterContext",
            ObjectType::User => "user",
        }
    }
}

/// Reference to a domain object
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObjRef {
    /// Opaque URI (bear backend style)
    Uri { uri: String },
    /// Identifier, optionally qualified with the object type (tiger style)
    Identifier {
        identifier: String,
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        object_type: Option<ObjectType>,
    },
}

impl ObjRef {
    pub fn uri(uri: impl Into<String>) -> Self {
        ObjRef::Uri { uri: uri.into() }
    }

    pub fn id(identifier: impl Into<String>) -> Self {
        ObjRef::Identifier {
            identifier: identifier.into(),
            object_type: None,
        }
    }

    pub fn typed(identifier: impl Into<String>, object_type: ObjectType) -> Self {
        ObjRef::Identifier {
            identifier: identifier.into(),
            object_type: Some(object_type),
        }
    }

    /// Normalized serialization used for equality, hashing and map keys
    ///
    /// Keys are tagged by form, so a URI and an identifier with the same text
    /// never collide.
    pub fn key(&self) -> String {
        match self {
            ObjRef::Uri { uri } => uri_key(uri),
            ObjRef::Identifier {
                identifier,
                object_type: Some(t),
            } => typed_key(*t, identifier),
            ObjRef::Identifier {
                identifier,
                object_type: None,
            } => identifier_key(identifier),
        }
    }

    pub fn is_uri(&self) -> bool {
        matches!(self, ObjRef::Uri { .. })
    }
}

fn uri_key(uri: &str) -> String {
    format!("uri:{}", uri)
}

fn identifier_key(identifier: &str) -> String {
    format!("id:{}", identifier)
}

fn typed_key(object_type: ObjectType, identifier: &str) -> String {
    format!("{}:{}", object_type.as_str(), identifier)
}

impl PartialEq for ObjRef {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ObjRef {}

impl Hash for ObjRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for ObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjRef::Uri { uri } => write!(f, "{{ uri: \"{}\" }}", uri),
            ObjRef::Identifier {
                identifier,
                object_type: Some(t),
            } => write!(f, "{{ identifier: \"{}\", type: \"{}\" }}", identifier, t.as_str()),
            ObjRef::Identifier { identifier, .. } => {
                write!(f, "{{ identifier: \"{}\" }}", identifier)
            }
        }
    }
}

/// Compare two references by their normalized serialization
pub fn are_obj_refs_equal(a: Option<&ObjRef>, b: Option<&ObjRef>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.key() == b.key(),
        (None, None) => true,
        _ => false,
    }
}

/// Entities that can be stored in an [`ObjRefMap`]
pub trait Referenced {
    /// The reference the entity was created with
    fn obj_ref(&self) -> &ObjRef;

    /// URI of the entity, when known
    fn uri(&self) -> Option<&str> {
        None
    }

    /// Identifier of the entity, when known
    fn identifier(&self) -> Option<&str> {
        None
    }

    fn object_type(&self) -> Option<ObjectType> {
        None
    }
}

/// Map from references to entities with O(1) lookup by either reference form
#[derive(Debug, Clone)]
pub struct ObjRefMap<T> {
    entries: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T> Default for ObjRefMap<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Referenced> ObjRefMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: impl IntoIterator<Item = T>) -> Self {
        let mut map = Self::new();
        for item in items {
            map.insert(item);
        }
        map
    }

    /// Insert an entity, replacing any entry reachable by its primary reference
    pub fn insert(&mut self, item: T) -> Option<T> {
        let keys = Self::keys_for(&item);
        let existing = keys.iter().find_map(|k| self.index.get(k).copied());

        match existing {
            Some(pos) => {
                let old = std::mem::replace(&mut self.entries[pos], item);
                for key in Self::keys_for(&old) {
                    if self.index.get(&key) == Some(&pos) {
                        self.index.remove(&key);
                    }
                }
                for key in keys {
                    self.index.insert(key, pos);
                }
                Some(old)
            }
            None => {
                let pos = self.entries.len();
                self.entries.push(item);
                for key in keys {
                    self.index.entry(key).or_insert(pos);
                }
                None
            }
        }
    }

    pub fn get(&self, obj_ref: &ObjRef) -> Option<&T> {
        self.position(obj_ref).map(|pos| &self.entries[pos])
    }

    pub fn contains(&self, obj_ref: &ObjRef) -> bool {
        self.position(obj_ref).is_some()
    }

    /// Whether both references resolve to the same stored entity
    pub fn resolves_to_same(&self, a: &ObjRef, b: &ObjRef) -> bool {
        match (self.position(a), self.position(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, obj_ref: &ObjRef) -> Option<usize> {
        if let Some(pos) = self.index.get(&obj_ref.key()) {
            return Some(*pos);
        }
        // a typed identifier also matches entities indexed without a type
        match obj_ref {
            ObjRef::Identifier {
                identifier,
                object_type: Some(_),
            } => self.index.get(&identifier_key(identifier)).copied(),
            _ => None,
        }
    }

    fn keys_for(item: &T) -> Vec<String> {
        let mut keys = vec![item.obj_ref().key()];
        if let Some(uri) = item.uri() {
            keys.push(uri_key(uri));
        }
        if let Some(identifier) = item.identifier() {
            keys.push(identifier_key(identifier));
            if let Some(t) = item.object_type() {
                keys.push(typed_key(t, identifier));
            }
        }
        keys.sort();
        keys.dedup();
        keys
    }
}

impl<T: Referenced> FromIterator<T> for ObjRefMap<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_items(iter)
    }
}
