// src/core/version_cache.rs

use crate::core::commands::{CommandBuilder, ExternalToolError, parse_version};
use crate::models::VersionTuple;
use crate::system::executor::CommandRunner;
use log::debug;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Asks the package manager for its version.
pub trait VersionProbe {
    fn probe(&self) -> Result<VersionTuple, ExternalToolError>;
}

/// Source of "now" for cache expiry.
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// When a cached version stops being trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidationPolicy {
    /// Keep the first answer for as long as the cache lives.
    #[default]
    Never,
    /// Ask again once the cached answer is older than this.
    MaxAge(Duration),
}

/// Runs `<python> -m conda info --json` and reads `conda_version`.
#[derive(Debug, Clone)]
pub struct ToolVersionProbe<R> {
    runner: R,
    builder: CommandBuilder,
}

impl<R: CommandRunner> ToolVersionProbe<R> {
    pub fn new(runner: R, builder: CommandBuilder) -> Self {
        Self { runner, builder }
    }
}

impl<R: CommandRunner> VersionProbe for ToolVersionProbe<R> {
    fn probe(&self) -> Result<VersionTuple, ExternalToolError> {
        let output = self.runner.capture(&self.builder.info())?;
        parse_version(&output)
    }
}

/// Remembers the package manager's version so it is queried at most once
/// (or once per `MaxAge` window).
///
/// The cache belongs to whoever composes the engine; with the default
/// `Never` policy it behaves like a process-wide constant, so switching
/// conda installations inside one long-lived process keeps the first answer.
pub struct VersionCache {
    probe: Box<dyn VersionProbe + Send + Sync>,
    clock: Box<dyn Clock + Send + Sync>,
    policy: InvalidationPolicy,
    cached: Mutex<Option<(VersionTuple, Instant)>>,
}

impl fmt::Debug for VersionCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionCache")
            .field("policy", &self.policy)
            .field("cached", &self.cached())
            .finish_non_exhaustive()
    }
}

impl VersionCache {
    pub fn new(probe: impl VersionProbe + Send + Sync + 'static) -> Self {
        Self {
            probe: Box::new(probe),
            clock: Box::new(SystemClock),
            policy: InvalidationPolicy::Never,
            cached: Mutex::new(None),
        }
    }

    pub fn with_policy(
        mut self,
        policy: InvalidationPolicy,
        clock: impl Clock + Send + Sync + 'static,
    ) -> Self {
        self.policy = policy;
        self.clock = Box::new(clock);
        self
    }

    /// The cached version, probing only on a miss. Failed probes are not cached.
    pub fn version(&self) -> Result<VersionTuple, ExternalToolError> {
        let mut cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        let now = self.clock.now();

        if let Some((version, fetched_at)) = *cached {
            if self.is_fresh(fetched_at, now) {
                return Ok(version);
            }
            debug!("Cached conda version {} expired.", version);
        }

        let version = self.probe.probe()?;
        debug!("conda version {} cached.", version);
        *cached = Some((version, now));
        Ok(version)
    }

    /// The cached version without probing.
    pub fn cached(&self) -> Option<VersionTuple> {
        self.cached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .map(|(version, _)| version)
    }

    /// Forgets the cached version; the next `version()` probes again.
    pub fn invalidate(&self) {
        *self.cached.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn is_fresh(&self, fetched_at: Instant, now: Instant) -> bool {
        match self.policy {
            InvalidationPolicy::Never => true,
            InvalidationPolicy::MaxAge(max_age) => now.saturating_duration_since(fetched_at) < max_age,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CommandSpec;
    use crate::system::executor::ExecutionError;
    use crate::system::env_table::EnvMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers with the next version from its script on every call.
    struct ScriptedProbe {
        answers: Vec<Result<VersionTuple, String>>,
        calls: Arc<AtomicUsize>,
    }

    impl VersionProbe for ScriptedProbe {
        fn probe(&self) -> Result<VersionTuple, ExternalToolError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            match self.answers.get(call) {
                Some(Ok(version)) => Ok(*version),
                Some(Err(raw)) => Err(ExternalToolError::BadVersion(raw.clone())),
                None => Err(ExternalToolError::BadVersion("exhausted".to_string())),
            }
        }
    }

    fn scripted(answers: Vec<Result<VersionTuple, String>>) -> (ScriptedProbe, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            ScriptedProbe {
                answers,
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }

    struct ManualClock {
        start: Instant,
        offset_ms: Arc<AtomicUsize>,
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.start + Duration::from_millis(self.offset_ms.load(Ordering::SeqCst) as u64)
        }
    }

    #[test]
    fn test_second_call_returns_first_answer() {
        let (probe, calls) = scripted(vec![Ok(VersionTuple::new(4, 6, 14)), Ok(VersionTuple::new(23, 1, 0))]);
        let cache = VersionCache::new(probe);

        assert_eq!(cache.version().unwrap(), VersionTuple::new(4, 6, 14));
        assert_eq!(cache.version().unwrap(), VersionTuple::new(4, 6, 14));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failures_are_not_cached() {
        let (probe, calls) = scripted(vec![Err("garbage".to_string()), Ok(VersionTuple::new(4, 8, 3))]);
        let cache = VersionCache::new(probe);

        assert!(matches!(cache.version(), Err(ExternalToolError::BadVersion(_))));
        assert_eq!(cache.cached(), None);
        assert_eq!(cache.version().unwrap(), VersionTuple::new(4, 8, 3));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_max_age_policy_reprobes_after_expiry() {
        let (probe, calls) = scripted(vec![Ok(VersionTuple::new(4, 5, 0)), Ok(VersionTuple::new(4, 6, 0))]);
        let offset = Arc::new(AtomicUsize::new(0));
        let clock = ManualClock {
            start: Instant::now(),
            offset_ms: Arc::clone(&offset),
        };
        let cache = VersionCache::new(probe)
            .with_policy(InvalidationPolicy::MaxAge(Duration::from_secs(60)), clock);

        assert_eq!(cache.version().unwrap(), VersionTuple::new(4, 5, 0));
        offset.store(59_000, Ordering::SeqCst);
        assert_eq!(cache.version().unwrap(), VersionTuple::new(4, 5, 0));
        offset.store(61_000, Ordering::SeqCst);
        assert_eq!(cache.version().unwrap(), VersionTuple::new(4, 6, 0));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_invalidate_forces_a_new_probe() {
        let (probe, calls) = scripted(vec![Ok(VersionTuple::new(4, 5, 0)), Ok(VersionTuple::new(4, 6, 0))]);
        let cache = VersionCache::new(probe);
        cache.version().unwrap();
        cache.invalidate();
        assert_eq!(cache.version().unwrap(), VersionTuple::new(4, 6, 0));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    struct CannedRunner(&'static str);

    impl CommandRunner for CannedRunner {
        fn run(&self, _: &CommandSpec, _: &EnvMap) -> Result<(), ExecutionError> {
            Ok(())
        }

        fn capture(&self, spec: &CommandSpec) -> Result<String, ExecutionError> {
            assert_eq!(spec.arguments(), ["-m", "conda", "info", "--json"]);
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_tool_probe_reads_info_json() {
        let probe = ToolVersionProbe::new(
            CannedRunner(r#"{"conda_version": "24.1.2"}"#),
            CommandBuilder::new("/opt/conda/bin/python"),
        );
        assert_eq!(probe.probe().unwrap(), VersionTuple::new(24, 1, 2));

        let broken = ToolVersionProbe::new(CannedRunner("not json"), CommandBuilder::new("python"));
        assert!(matches!(broken.probe(), Err(ExternalToolError::MalformedJson { .. })));
    }
}
