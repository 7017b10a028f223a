//! Uniform member access over heterogeneous containers.
//!
//! Configuration data reaches the validator and the drift detector in three
//! shapes: ordered key-value maps freshly parsed from disk, dynamic property
//! bags, and strongly-typed model structs. [`MemberAccess`] gives all of them
//! the same get/set surface so callers never special-case a container.
//!
//! Each container family has one adapter:
//!
//! - **map adapter**: `serde_json::Map`, `BTreeMap<String, Value>`,
//!   `HashMap<String, Value>` and object [`Value`]s. Lookup tries the exact
//!   key, then an ASCII case-insensitive match, then a linear scan over
//!   trimmed, lowercased keys.
//! - **property bag**: [`PropertyBag`], a dynamic ordered set of properties.
//! - **reflection adapter**: typed structs, introspected through their serde
//!   representation (see [`reflect_members!`](crate::reflect_members)), with
//!   an optional [`Indexer`] fallback.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Uniform get/set access to named members of a container.
pub trait MemberAccess {
    /// Look up a member. `None` means the member does not exist; a member
    /// that exists but holds null is `Some(Value::Null)`.
    fn try_get(&self, name: &str) -> Option<Value>;

    /// Set a member, returning whether the container accepted the value.
    fn set(&mut self, name: &str, value: Value) -> bool;

    /// Names of all members currently present, in container order.
    fn member_names(&self) -> Vec<String>;

    /// Whether the container is a typed object with a fixed set of declared
    /// members, as opposed to an open map or bag.
    fn is_typed(&self) -> bool {
        false
    }

    /// A declared member that is itself a typed container, so callers can
    /// walk it over its own declared members instead of its serialized form.
    fn typed_member(&self, _name: &str) -> Option<&dyn MemberAccess> {
        None
    }

    /// Look up a member, yielding null when it is absent.
    fn get(&self, name: &str) -> Value {
        self.try_get(name).unwrap_or(Value::Null)
    }

    /// Walk a path of member names, stopping at the first missing segment.
    fn get_nested(&self, path: &[&str]) -> Option<Value> {
        let (first, rest) = path.split_first()?;
        let mut current = self.try_get(first)?;
        for segment in rest {
            current = current.try_get(segment)?;
        }
        Some(current)
    }
}

/// Indexer-style access for typed objects that expose keyed members beyond
/// their declared fields.
///
/// Consulted by reflected types only after field lookup fails.
pub trait Indexer {
    /// Look up a keyed member.
    fn index_get(&self, key: &str) -> Option<Value>;

    /// Set a keyed member. Read-only indexers keep the default.
    fn index_set(&mut self, _key: &str, _value: Value) -> bool {
        false
    }
}

/// Split a dot-separated property path into its segments.
///
/// Empty segments (leading, trailing or doubled dots) are dropped.
#[must_use]
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('.').filter(|segment| !segment.is_empty()).collect()
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

/// Find the stored key that `name` refers to, using the fallback order of
/// the map adapter.
fn resolve_key<'a>(
    keys: impl IntoIterator<Item = &'a String>,
    name: &str,
    exact: bool,
) -> Option<String> {
    if exact {
        return Some(name.to_string());
    }
    let keys: Vec<&String> = keys.into_iter().collect();
    if let Some(key) = keys.iter().find(|key| key.eq_ignore_ascii_case(name)) {
        return Some((*key).clone());
    }
    let wanted = normalize_key(name);
    keys.into_iter()
        .find(|key| normalize_key(key) == wanted)
        .cloned()
}

macro_rules! impl_map_access {
    ($($map:ty),+ $(,)?) => {
        $(
            impl MemberAccess for $map {
                fn try_get(&self, name: &str) -> Option<Value> {
                    let key = resolve_key(self.keys(), name, self.contains_key(name))?;
                    self.get(key.as_str()).cloned()
                }

                fn set(&mut self, name: &str, value: Value) -> bool {
                    let key = resolve_key(self.keys(), name, self.contains_key(name))
                        .unwrap_or_else(|| name.to_string());
                    self.insert(key, value);
                    true
                }

                fn member_names(&self) -> Vec<String> {
                    self.keys().cloned().collect()
                }
            }
        )+
    };
}

impl_map_access!(
    Map<String, Value>,
    BTreeMap<String, Value>,
    HashMap<String, Value>
);

impl MemberAccess for Value {
    fn try_get(&self, name: &str) -> Option<Value> {
        self.as_object().and_then(|map| map.try_get(name))
    }

    fn set(&mut self, name: &str, value: Value) -> bool {
        self.as_object_mut().is_some_and(|map| map.set(name, value))
    }

    fn member_names(&self) -> Vec<String> {
        self.as_object()
            .map(MemberAccess::member_names)
            .unwrap_or_default()
    }
}

/// A dynamic, ordered bag of named properties.
///
/// Unlike typed objects, a bag accepts new members on `set`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyBag {
    properties: Map<String, Value>,
}

impl PropertyBag {
    /// Create an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a property, keeping the first-seen casing of its name.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        MemberAccess::set(self, &name, value);
    }

    /// Remove a property by name (case-insensitive).
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let key = resolve_key(
            self.properties.keys(),
            name,
            self.properties.contains_key(name),
        )?;
        self.properties.remove(&key)
    }

    /// Number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether the bag has no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Iterate over properties in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.properties.iter()
    }

    /// View the bag as a plain map.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.properties
    }
}

impl From<Map<String, Value>> for PropertyBag {
    fn from(properties: Map<String, Value>) -> Self {
        Self { properties }
    }
}

impl MemberAccess for PropertyBag {
    fn try_get(&self, name: &str) -> Option<Value> {
        self.properties.try_get(name)
    }

    fn set(&mut self, name: &str, value: Value) -> bool {
        self.properties.set(name, value)
    }

    fn member_names(&self) -> Vec<String> {
        self.properties.member_names()
    }
}

/// Field lookup for a serializable typed object.
pub fn reflect_get<T: Serialize + ?Sized>(object: &T, name: &str) -> Option<Value> {
    match serde_json::to_value(object) {
        Ok(Value::Object(fields)) => fields.try_get(name),
        Ok(_) => None,
        Err(e) => {
            debug!(error = %e, member = name, "typed object is not reflectable");
            None
        }
    }
}

/// Declared field names of a serializable typed object.
pub fn reflect_names<T: Serialize + ?Sized>(object: &T) -> Vec<String> {
    match serde_json::to_value(object) {
        Ok(Value::Object(fields)) => fields.keys().cloned().collect(),
        _ => Vec::new(),
    }
}

/// Replace an existing field of a typed object.
///
/// Typed objects cannot grow new members, so an unknown name is rejected.
/// A value that does not deserialize into the field's type is rejected too
/// and leaves the object untouched.
pub fn reflect_set<T: Serialize + DeserializeOwned>(
    object: &mut T,
    name: &str,
    value: Value,
) -> bool {
    let Ok(Value::Object(mut fields)) = serde_json::to_value(&*object) else {
        return false;
    };
    let Some(key) = resolve_key(fields.keys(), name, fields.contains_key(name)) else {
        return false;
    };
    fields.insert(key, value);

    match serde_json::from_value::<T>(Value::Object(fields)) {
        Ok(updated) => {
            *object = updated;
            true
        }
        Err(e) => {
            debug!(error = %e, member = name, "rejected value for typed member");
            false
        }
    }
}

/// Implement [`MemberAccess`] for typed structs through their serde
/// representation.
///
/// The `indexed:` form additionally falls back to the type's [`Indexer`]
/// implementation when no declared field matches. The `Type { field, .. }`
/// form names fields that are typed containers themselves and exposes them
/// through [`MemberAccess::typed_member`].
///
/// ```rust
/// use curator_core::{reflect_members, MemberAccess};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Window {
///     width: u32,
/// }
///
/// reflect_members!(Window);
///
/// let mut window = Window { width: 80 };
/// assert!(window.set("Width", serde_json::json!(120)));
/// assert_eq!(window.width, 120);
/// ```
#[macro_export]
macro_rules! reflect_members {
    (indexed: $($ty:ty),+ $(,)?) => {
        $(
            impl $crate::access::MemberAccess for $ty {
                fn try_get(&self, name: &str) -> ::std::option::Option<$crate::serde_json::Value> {
                    $crate::access::reflect_get(self, name)
                        .or_else(|| $crate::access::Indexer::index_get(self, name))
                }

                fn set(&mut self, name: &str, value: $crate::serde_json::Value) -> bool {
                    $crate::access::reflect_set(self, name, value.clone())
                        || $crate::access::Indexer::index_set(self, name, value)
                }

                fn member_names(&self) -> ::std::vec::Vec<::std::string::String> {
                    $crate::access::reflect_names(self)
                }

                fn is_typed(&self) -> bool {
                    true
                }
            }
        )+
    };
    ($ty:ty { $($member:ident),+ $(,)? }) => {
        impl $crate::access::MemberAccess for $ty {
            fn try_get(&self, name: &str) -> ::std::option::Option<$crate::serde_json::Value> {
                $crate::access::reflect_get(self, name)
            }

            fn set(&mut self, name: &str, value: $crate::serde_json::Value) -> bool {
                $crate::access::reflect_set(self, name, value)
            }

            fn member_names(&self) -> ::std::vec::Vec<::std::string::String> {
                $crate::access::reflect_names(self)
            }

            fn is_typed(&self) -> bool {
                true
            }

            fn typed_member(
                &self,
                name: &str,
            ) -> ::std::option::Option<&dyn $crate::access::MemberAccess> {
                let name = name.trim();
                $(
                    if name.eq_ignore_ascii_case(::std::stringify!($member)) {
                        return ::std::option::Option::Some(
                            &self.$member as &dyn $crate::access::MemberAccess,
                        );
                    }
                )+
                ::std::option::Option::None
            }
        }
    };
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::access::MemberAccess for $ty {
                fn try_get(&self, name: &str) -> ::std::option::Option<$crate::serde_json::Value> {
                    $crate::access::reflect_get(self, name)
                }

                fn set(&mut self, name: &str, value: $crate::serde_json::Value) -> bool {
                    $crate::access::reflect_set(self, name, value)
                }

                fn member_names(&self) -> ::std::vec::Vec<::std::string::String> {
                    $crate::access::reflect_names(self)
                }

                fn is_typed(&self) -> bool {
                    true
                }
            }
        )+
    };
}
