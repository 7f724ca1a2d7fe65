//! Run-scoped property store with typed keys
//!
//! Build scripts seed the store once per run; tasks read from it when filling
//! in defaults. Keys declare the type of the value they name, so a `get` with
//! the wrong type is caught at the read site instead of surfacing later as a
//! mysterious argument.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;

/// A named, typed handle into the [`PropertyStore`].
///
/// Keys are cheap to copy and can be declared as constants:
///
/// ```rust
/// use anvil_core::props::Key;
///
/// const RELEASE_CHANNEL: Key<String> = Key::new("release_channel");
/// assert_eq!(RELEASE_CHANNEL.name(), "release_channel");
/// ```
pub struct Key<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Key<T> {
    /// Declare a key with the given property name.
    pub const fn new(name: &'static str) -> Self {
        Key {
            name,
            _marker: PhantomData,
        }
    }

    /// The property name this key reads and writes.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for Key<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Key<T> {}

/// Keys for the properties the built-in tasks consult.
pub mod keys {
    use std::path::PathBuf;

    use super::Key;

    /// Solution or project file injected into build invocations that name none.
    pub const SOLUTION_FILE: Key<String> = Key::new("solution_file");

    /// Build configuration injected as `-c` when an invocation carries none.
    pub const BUILD_CONFIGURATION: Key<String> = Key::new("build_configuration");

    /// Overrides platform resolution of the dotnet executable.
    pub const DOTNET_EXECUTABLE: Key<PathBuf> = Key::new("dotnet_executable");

    /// Version written into project files by the version update task.
    pub const BUILD_VERSION: Key<String> = Key::new("build_version");

    /// Base URL of the package transfer service.
    pub const TRANSFER_URL: Key<String> = Key::new("transfer_url");
}

struct Entry {
    type_id: TypeId,
    type_name: &'static str,
    value: Box<dyn Any + Send + Sync>,
}

/// Name-keyed configuration values for a single run.
///
/// Writes overwrite unconditionally, including writes that change the stored
/// type. Reads of an absent property degrade to `None` or the caller's
/// fallback; reads under the wrong type panic with both type names, since a
/// mistyped key constant is a programming error rather than a runtime
/// condition.
#[derive(Default)]
pub struct PropertyStore {
    entries: HashMap<String, Entry>,
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value under a typed key, replacing any previous value.
    pub fn set<T: Any + Send + Sync>(&mut self, key: Key<T>, value: T) {
        self.set_named(key.name, value);
    }

    /// Read a value by typed key, `None` when absent.
    pub fn get<T: Any + Send + Sync + Clone>(&self, key: Key<T>) -> Option<T> {
        self.get_named(key.name)
    }

    /// Read a value by typed key, or the fallback when absent.
    pub fn get_or<T: Any + Send + Sync + Clone>(&self, key: Key<T>, fallback: T) -> T {
        self.get(key).unwrap_or(fallback)
    }

    /// Store an ad-hoc string property under a runtime name.
    pub fn set_string(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.set_named(&name.into(), value.into());
    }

    /// Read an ad-hoc string property.
    pub fn get_string(&self, name: &str) -> Option<String> {
        self.get_named(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn set_named<T: Any + Send + Sync>(&mut self, name: &str, value: T) {
        self.entries.insert(
            name.to_string(),
            Entry {
                type_id: TypeId::of::<T>(),
                type_name: type_name::<T>(),
                value: Box::new(value),
            },
        );
    }

    fn get_named<T: Any + Send + Sync + Clone>(&self, name: &str) -> Option<T> {
        let entry = self.entries.get(name)?;
        if entry.type_id != TypeId::of::<T>() {
            panic!(
                "property '{}' was written as `{}` but read as `{}`",
                name,
                entry.type_name,
                type_name::<T>()
            );
        }
        entry.value.downcast_ref::<T>().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RETRY_COUNT: Key<u32> = Key::new("retry_count");

    #[test]
    fn test_set_then_get() {
        let mut props = PropertyStore::new();
        props.set(keys::SOLUTION_FILE, "App.sln".to_string());

        assert_eq!(
            props.get(keys::SOLUTION_FILE),
            Some("App.sln".to_string())
        );
        assert_eq!(props.len(), 1);
    }

    #[test]
    fn test_absent_key_is_none() {
        let props = PropertyStore::new();
        assert_eq!(props.get(keys::BUILD_CONFIGURATION), None);
        assert!(props.is_empty());
    }

    #[test]
    fn test_get_or_falls_back_when_absent() {
        let props = PropertyStore::new();
        assert_eq!(
            props.get_or(keys::BUILD_CONFIGURATION, "Debug".to_string()),
            "Debug"
        );
    }

    #[test]
    fn test_get_or_prefers_stored_value() {
        let mut props = PropertyStore::new();
        props.set(keys::BUILD_CONFIGURATION, "Release".to_string());
        assert_eq!(
            props.get_or(keys::BUILD_CONFIGURATION, "Debug".to_string()),
            "Release"
        );
    }

    #[test]
    fn test_set_overwrites() {
        let mut props = PropertyStore::new();
        props.set(RETRY_COUNT, 1);
        props.set(RETRY_COUNT, 5);

        assert_eq!(props.get(RETRY_COUNT), Some(5));
        assert_eq!(props.len(), 1);
    }

    #[test]
    fn test_set_can_change_the_stored_type() {
        let mut props = PropertyStore::new();
        props.set_string("flexible", "one");
        props.set(Key::<u32>::new("flexible"), 1);

        assert_eq!(props.get(Key::<u32>::new("flexible")), Some(1));
    }

    #[test]
    #[should_panic(expected = "was written as")]
    fn test_mistyped_read_panics() {
        let mut props = PropertyStore::new();
        props.set(RETRY_COUNT, 3);

        let _ = props.get(Key::<String>::new("retry_count"));
    }

    #[test]
    fn test_string_properties() {
        let mut props = PropertyStore::new();
        props.set_string("artifact_dir", "out/packages");

        assert_eq!(
            props.get_string("artifact_dir"),
            Some("out/packages".to_string())
        );
        assert_eq!(props.get_string("missing"), None);
    }

    #[test]
    fn test_typed_and_string_access_share_names() {
        let mut props = PropertyStore::new();
        props.set(keys::SOLUTION_FILE, "App.sln".to_string());

        assert_eq!(
            props.get_string(keys::SOLUTION_FILE.name()),
            Some("App.sln".to_string())
        );
    }
}
