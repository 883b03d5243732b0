use weave_bridge::{ChangedProps, PropMap, Value};

/// Extension hook: lets a caller mutate `changed_props` after the default
/// diff runs (spec §4.2: "semantics of interceptors are out of scope for
/// the core"). The core ships a no-op default.
pub trait PropsInterceptor {
    fn after_diff(&self, old_props: &PropMap, new_props: &PropMap, changed: &mut ChangedProps);
}

/// Structural diff between two prop maps (spec §4.2), grounded on
/// `diff.rs::diff_attributes`'s old/new set-difference walk, generalized
/// from a flat attribute list to `map<string, Value>` with deep equality
/// and extended with the function-handle carry-over rule.
pub struct PropsDiffer {
    interceptors: Vec<Box<dyn PropsInterceptor>>,
}

impl Default for PropsDiffer {
    fn default() -> Self {
        Self::new()
    }
}

impl PropsDiffer {
    pub fn new() -> Self {
        Self {
            interceptors: Vec::new(),
        }
    }

    pub fn register_interceptor(&mut self, interceptor: Box<dyn PropsInterceptor>) {
        self.interceptors.push(interceptor);
    }

    /// Produces `changed_props` per spec §4.2:
    /// - key in new, absent in old → added.
    /// - key in both, unequal by deep equality → changed.
    /// - key in old, absent in new, old value not a handler → removed (`None`).
    /// - handler-valued keys are never added/removed by value comparison,
    ///   but survive (i.e. are left out of `changed`) when the new map is
    ///   silent about them, so handlers are preserved across reconciliation.
    pub fn diff(&self, old_props: &PropMap, new_props: &PropMap) -> ChangedProps {
        let mut changed = ChangedProps::default();

        for (key, new_value) in new_props {
            match old_props.get(key) {
                Some(old_value) if old_value == new_value => {}
                _ => {
                    changed.insert(key.clone(), Some(new_value.clone()));
                }
            }
        }

        for (key, old_value) in old_props {
            if new_props.contains_key(key) {
                continue;
            }
            if matches!(old_value, Value::Handler(_)) {
                // Carried over silently: the new map didn't mention this
                // handler, so it survives untouched (spec §4.2).
                continue;
            }
            changed.insert(key.clone(), None);
        }

        for interceptor in &self.interceptors {
            interceptor.after_diff(old_props, new_props, &mut changed);
        }

        changed
    }
}
