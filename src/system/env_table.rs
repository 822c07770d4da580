// src/system/env_table.rs

use lazy_static::lazy_static;
use std::collections::{BTreeMap, HashMap};
use std::env;
use std::ffi::{OsStr, OsString};
use std::sync::{Mutex, PoisonError};

/// Variable name to value, exactly as the operating system reports them.
pub type EnvMap = HashMap<OsString, OsString>;

lazy_static! {
    static ref PROCESS_TABLE: EnvTable = EnvTable::from_process();
}

/// The environment handed to spawned children.
///
/// Captured once from the process and then owned here, so temporary
/// overrides never touch the real process environment. The mutex makes an
/// override a critical section: only one can be in effect at a time.
#[derive(Debug, Default)]
pub struct EnvTable {
    vars: Mutex<EnvMap>,
}

/// The table shared by every dispatch in this process.
pub fn process_table() -> &'static EnvTable {
    &PROCESS_TABLE
}

impl EnvTable {
    pub fn from_map(vars: EnvMap) -> Self {
        Self {
            vars: Mutex::new(vars),
        }
    }

    /// Snapshot of the current process environment, non-Unicode entries included.
    pub fn from_process() -> Self {
        Self::from_map(env::vars_os().collect())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, EnvMap> {
        self.vars.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Finds a variable, returning the key as stored. Names are compared
    /// without case on Windows (`Path` and `PATH` are the same variable there).
    pub fn lookup(&self, name: &str) -> Option<(OsString, OsString)> {
        let vars = self.lock();
        if let Some(value) = vars.get(OsStr::new(name)) {
            return Some((OsString::from(name), value.clone()));
        }
        if cfg!(target_os = "windows") {
            return vars
                .iter()
                .find(|(k, _)| k.to_str().is_some_and(|k| k.eq_ignore_ascii_case(name)))
                .map(|(k, v)| (k.clone(), v.clone()));
        }
        None
    }

    pub fn get(&self, name: &str) -> Option<OsString> {
        self.lookup(name).map(|(_, value)| value)
    }

    pub fn snapshot(&self) -> EnvMap {
        self.lock().clone()
    }

    /// Applies `overrides` for the duration of `f` and puts the previous
    /// values back afterwards, whether `f` returns normally, returns an
    /// error, or panics.
    ///
    /// The table stays locked the whole time; a second override from another
    /// thread waits until this one is restored.
    pub fn with_overrides<R>(
        &self,
        overrides: &BTreeMap<OsString, OsString>,
        f: impl FnOnce(&EnvMap) -> R,
    ) -> R {
        let vars = self.lock();
        let previous: Vec<(OsString, Option<OsString>)> = overrides
            .keys()
            .map(|key| (key.clone(), vars.get(key).cloned()))
            .collect();

        let mut vars = scopeguard::guard(vars, move |mut vars| {
            for (key, value) in previous {
                match value {
                    Some(value) => vars.insert(key, value),
                    None => vars.remove(&key),
                };
            }
            log::debug!("Environment overrides restored.");
        });

        for (key, value) in overrides {
            log::debug!("Overriding {} for the next command.", key.to_string_lossy());
            vars.insert(key.clone(), value.clone());
        }

        f(&vars)
    }
}
