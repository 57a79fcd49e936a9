// crates/http-fixtures-core/src/runtime/engine.rs
// ============================================================================
// Module: HTTP Fixtures Lifecycle Engine
// Description: Mode-specific setup, per-test apply/finish, and suite cleanup.
// Purpose: Drive an interceptor and fixture store through a test suite run.
// Dependencies: crate::core, crate::interfaces, crate::runtime, thiserror
// ============================================================================

//! ## Overview
//! [`FixtureLifecycle`] binds one [`FixtureMode`] at construction and reacts
//! to the four suite hooks. Replay modes define mocks from the fixture store
//! and watch for unmatched requests; record mode captures live traffic and
//! rewrites the fixture file at suite end; wild mode stays out of the way.
//!
//! Invariants:
//! - Hooks run sequentially; the engine is driven through `&mut self`.
//! - Unmatched tracking acquired in `test_start` is released in `test_end`
//!   (or at suite end when a test never finished), even when finishing fails.
//! - Interceptor teardown at suite end runs even when persistence fails.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::mem;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use thiserror::Error;

use crate::core::DEFAULT_FIXTURE_FOLDER;
use crate::core::FixtureLocation;
use crate::core::FixtureMode;
use crate::core::FixtureStore;
use crate::core::INTERCEPTED_METHODS;
use crate::core::IdentityError;
use crate::core::LoadStatus;
use crate::core::PersistOutcome;
use crate::core::StoreError;
use crate::core::TestHandle;
use crate::core::TestIdentity;
use crate::core::TestIdentityTracker;
use crate::core::UnmatchedRequest;
use crate::core::mode::MODE_ENV_VAR;
use crate::interfaces::InterceptError;
use crate::interfaces::Interceptor;
use crate::interfaces::LifecycleHooks;
use crate::interfaces::ListenerId;
use crate::interfaces::TestStart;
use crate::interfaces::UnmatchedListener;
use crate::runtime::log::FixtureLogEvent;
use crate::runtime::log::FixtureLogSink;
use crate::runtime::log::LogEventKind;
use crate::runtime::log::LogLevel;
use crate::runtime::reconcile::reconcile;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default prefix for diagnostic messages.
pub const DEFAULT_LOG_NAME_PREFIX: &str = "http-fixtures";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by the lifecycle engine.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Options are unusable (missing test path, invalid folder).
    #[error("fixture configuration error: {0}")]
    Configuration(String),
    /// Lockdown mode saw requests without a matching fixture.
    #[error("{message}")]
    UnmatchedRequests {
        /// Number of unmatched requests.
        count: usize,
        /// Fixture file that was consulted.
        fixture_path: PathBuf,
        /// Full diagnostic message.
        message: String,
    },
    /// `test_end` was called for a handle that is not the running test.
    #[error("test {0} is not the active test")]
    NoActiveTest(TestHandle),
    /// `test_start` was called while another test was still running.
    #[error("test {0} is still running")]
    TestInProgress(TestHandle),
    /// A test hook ran before `suite_start`.
    #[error("suite has not started")]
    SuiteNotStarted,
    /// `suite_start` was called twice.
    #[error("suite already started")]
    SuiteAlreadyStarted,
    /// A hook ran after `suite_end`.
    #[error("suite already finished")]
    SuiteFinished,
    /// Identity registration failed.
    #[error(transparent)]
    Identity(#[from] IdentityError),
    /// Fixture store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Interception engine failure.
    #[error(transparent)]
    Intercept(#[from] InterceptError),
}

// ============================================================================
// SECTION: Options
// ============================================================================

/// Relocates the fixture folder, e.g. to nest it under a snapshot folder.
pub type FolderNameHook = Box<dyn Fn(&str) -> String + Send + Sync>;

/// Builds the lockdown failure message for unmatched requests.
pub type UnmatchedMessageHook =
    Box<dyn Fn(&[UnmatchedRequest], &UnmatchedContext<'_>) -> String + Send + Sync>;

/// Context handed to the unmatched message hook.
#[derive(Debug, Clone, Copy)]
pub struct UnmatchedContext<'a> {
    /// Fixture file consulted for the test.
    pub fixture_path: &'a Path,
    /// Identity of the test that issued the requests.
    pub identity: &'a TestIdentity,
    /// Active mode.
    pub mode: FixtureMode,
}

/// Construction options for [`FixtureLifecycle`].
pub struct LifecycleOptions {
    /// Mode bound for the whole suite.
    mode: FixtureMode,
    /// Test file the fixtures belong to.
    test_path: Option<PathBuf>,
    /// Fixture folder name before relocation.
    fixture_folder_name: String,
    /// Optional folder relocation hook.
    folder_name_hook: Option<FolderNameHook>,
    /// Prefix for diagnostic messages.
    log_name_prefix: String,
    /// Optional unmatched message hook.
    unmatched_message_hook: Option<UnmatchedMessageHook>,
}

impl Default for LifecycleOptions {
    fn default() -> Self {
        Self::new(FixtureMode::default())
    }
}

impl LifecycleOptions {
    /// Creates options with defaults for the given mode.
    #[must_use]
    pub fn new(mode: FixtureMode) -> Self {
        Self {
            mode,
            test_path: None,
            fixture_folder_name: DEFAULT_FIXTURE_FOLDER.to_string(),
            folder_name_hook: None,
            log_name_prefix: DEFAULT_LOG_NAME_PREFIX.to_string(),
            unmatched_message_hook: None,
        }
    }

    /// Sets the mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: FixtureMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the test file path.
    #[must_use]
    pub fn with_test_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.test_path = Some(path.into());
        self
    }

    /// Sets the fixture folder name.
    #[must_use]
    pub fn with_fixture_folder_name(mut self, name: impl Into<String>) -> Self {
        self.fixture_folder_name = name.into();
        self
    }

    /// Installs a folder relocation hook.
    #[must_use]
    pub fn with_folder_name_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.folder_name_hook = Some(Box::new(hook));
        self
    }

    /// Sets the diagnostic message prefix.
    #[must_use]
    pub fn with_log_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.log_name_prefix = prefix.into();
        self
    }

    /// Installs a hook for the lockdown unmatched-request failure message.
    ///
    /// Dry-run warnings always report the unmatched count and ignore the hook.
    #[must_use]
    pub fn with_unmatched_message_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&[UnmatchedRequest], &UnmatchedContext<'_>) -> String + Send + Sync + 'static,
    {
        self.unmatched_message_hook = Some(Box::new(hook));
        self
    }

    /// Returns the configured mode.
    #[must_use]
    pub const fn mode(&self) -> FixtureMode {
        self.mode
    }

    /// Returns the configured test path.
    #[must_use]
    pub fn test_path(&self) -> Option<&Path> {
        self.test_path.as_deref()
    }

    /// Returns the diagnostic message prefix.
    #[must_use]
    pub fn log_name_prefix(&self) -> &str {
        &self.log_name_prefix
    }

    /// Returns the folder name after the relocation hook runs.
    #[must_use]
    pub fn effective_folder_name(&self) -> String {
        self.folder_name_hook.as_ref().map_or_else(
            || self.fixture_folder_name.clone(),
            |hook| hook(&self.fixture_folder_name),
        )
    }

    /// Resolves the fixture location for the configured test path.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Configuration`] when the test path is
    /// missing or the effective folder is empty, absolute, or escapes the
    /// test directory.
    pub fn fixture_location(&self) -> Result<FixtureLocation, LifecycleError> {
        let test_path = self.test_path.as_deref().ok_or_else(|| {
            LifecycleError::Configuration("test path is required to locate fixtures".to_string())
        })?;
        if test_path.file_name().is_none() {
            return Err(LifecycleError::Configuration(format!(
                "test path has no file name: {}",
                test_path.display()
            )));
        }
        let folder = self.effective_folder_name();
        validate_folder(&folder)?;
        Ok(FixtureLocation::resolve(test_path, &folder))
    }

    /// Builds the unmatched-request message body.
    fn unmatched_message(
        &self,
        requests: &[UnmatchedRequest],
        context: &UnmatchedContext<'_>,
    ) -> String {
        self.unmatched_message_hook.as_ref().map_or_else(
            || default_unmatched_message(requests.len(), context.fixture_path),
            |hook| hook(requests, context),
        )
    }
}

/// Default unmatched-request message body.
#[must_use]
pub fn default_unmatched_message(count: usize, fixture_path: &Path) -> String {
    format!(
        "unmatched requests not allowed (found {count}). Looking for fixtures at {}\n\nRun with \
         env variable `{MODE_ENV_VAR}={}` to update fixtures.",
        fixture_path.display(),
        FixtureMode::Record
    )
}

/// Rejects fixture folders that are empty, absolute, or climb out of the test directory.
fn validate_folder(folder: &str) -> Result<(), LifecycleError> {
    if folder.trim().is_empty() {
        return Err(LifecycleError::Configuration("fixture folder name is empty".to_string()));
    }
    let path = Path::new(folder);
    let escapes = path
        .components()
        .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(LifecycleError::Configuration(format!(
            "fixture folder must be relative to the test directory: {folder}"
        )));
    }
    Ok(())
}

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Result of finishing one test.
#[derive(Debug, Clone, PartialEq)]
pub struct TestOutcome {
    /// Identity of the finished test.
    pub identity: TestIdentity,
    /// Replay mocks defined for the test.
    pub mocks_defined: usize,
    /// Requests that matched no mock.
    pub unmatched: Vec<UnmatchedRequest>,
    /// Interactions captured in record mode.
    pub recorded: usize,
    /// Warning raised for the test (dry-run unmatched requests).
    pub warning: Option<String>,
}

impl TestOutcome {
    /// Creates an empty outcome for `identity`.
    const fn empty(identity: TestIdentity) -> Self {
        Self {
            identity,
            mocks_defined: 0,
            unmatched: Vec::new(),
            recorded: 0,
            warning: None,
        }
    }
}

/// Result of finishing the suite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteReport {
    /// Mode the suite ran in.
    pub mode: FixtureMode,
    /// Fixture file for the test file.
    pub fixture_path: PathBuf,
    /// Number of tests seen, skipped tests included.
    pub tests_seen: usize,
    /// Identities pruned during reconciliation.
    pub pruned: Vec<String>,
    /// Persistence result, present in record mode only.
    pub persisted: Option<PersistOutcome>,
}

// ============================================================================
// SECTION: Mode Behavior
// ============================================================================

/// What to do with requests that match no fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnmatchedPolicy {
    /// Report a warning and let the test pass.
    Warn,
    /// Fail the test.
    Fail,
}

/// Mode behavior bound once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModeBehavior {
    /// Define mocks from fixtures and watch for unmatched requests.
    Replay {
        /// Whether unmatched requests may reach the network.
        real_network: bool,
        /// Reaction to unmatched requests.
        unmatched: UnmatchedPolicy,
    },
    /// Capture live traffic and rewrite fixtures at suite end.
    Record,
    /// No interception and no fixture bookkeeping.
    Wild,
}

impl From<FixtureMode> for ModeBehavior {
    fn from(mode: FixtureMode) -> Self {
        match mode {
            FixtureMode::Dryrun => Self::Replay {
                real_network: true,
                unmatched: UnmatchedPolicy::Warn,
            },
            FixtureMode::Lockdown => Self::Replay {
                real_network: false,
                unmatched: UnmatchedPolicy::Fail,
            },
            FixtureMode::Record => Self::Record,
            FixtureMode::Wild => Self::Wild,
        }
    }
}

/// Listener registration plus the requests it has collected.
struct UnmatchedTracking {
    /// Registered listener token.
    listener: ListenerId,
    /// Requests collected by the listener.
    log: Arc<Mutex<Vec<UnmatchedRequest>>>,
}

/// Test currently between `test_start` and `test_end`.
struct ActiveTest {
    /// Framework handle.
    handle: TestHandle,
    /// Derived identity.
    identity: TestIdentity,
    /// Replay mocks defined for the test.
    mocks_defined: usize,
    /// Unmatched tracking, replay modes only.
    tracking: Option<UnmatchedTracking>,
}

/// Suite progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SuitePhase {
    /// `suite_start` not yet called.
    Pending,
    /// Tests may run.
    Running,
    /// `suite_end` already ran.
    Finished,
}

/// Mutable state threaded through every transition.
struct SuiteState {
    /// Fixtures for the test file.
    store: FixtureStore,
    /// Identities of every test seen.
    tracker: TestIdentityTracker,
    /// Running test, if any.
    active: Option<ActiveTest>,
    /// Suite progress.
    phase: SuitePhase,
}

/// Immutable collaborators shared by every transition.
struct Environment<I, L> {
    /// Construction options.
    options: LifecycleOptions,
    /// Resolved fixture paths.
    location: FixtureLocation,
    /// Interception engine.
    interceptor: I,
    /// Diagnostic sink.
    sink: L,
}

impl<I: Interceptor, L: FixtureLogSink> Environment<I, L> {
    /// Builds an event for this suite.
    fn event(&self, kind: LogEventKind, level: LogLevel, detail: &str) -> FixtureLogEvent {
        FixtureLogEvent::new(kind, level, &self.options.log_name_prefix, self.options.mode, detail)
            .with_fixture_path(self.location.path())
    }

    /// Emits an event.
    fn emit(&self, event: &FixtureLogEvent) {
        self.sink.record(event);
    }

    /// Loads the fixture store and reports how it went.
    fn load_store(&self) -> Result<FixtureStore, LifecycleError> {
        let path = self.location.path();
        let (store, status) = FixtureStore::load(path)?;
        let event = match status {
            LoadStatus::Loaded {
                entries,
            } => self
                .event(LogEventKind::FixturesLoaded, LogLevel::Info, "loaded fixtures")
                .with_count(entries),
            LoadStatus::Missing => {
                let level = if self.options.mode == FixtureMode::Record {
                    LogLevel::Info
                } else {
                    LogLevel::Warn
                };
                self.event(LogEventKind::FixturesMissing, level, "no fixture file found")
            }
            LoadStatus::Corrupt {
                reason,
            } => self.event(
                LogEventKind::FixturesCorrupt,
                LogLevel::Warn,
                &format!("fixture file is corrupt and was ignored: {reason}"),
            ),
        };
        self.emit(&event);
        Ok(store)
    }

    /// Resets mocks, restores network access, and removes interception.
    fn teardown(&self) -> Result<(), LifecycleError> {
        let reset = self.interceptor.reset_all_mocks();
        let enable = self.interceptor.enable_real_network();
        let restore = self.interceptor.restore();
        reset?;
        enable?;
        restore?;
        Ok(())
    }

    /// Registers an unmatched listener collecting into a fresh log.
    fn start_tracking(&self) -> Result<UnmatchedTracking, LifecycleError> {
        let log: Arc<Mutex<Vec<UnmatchedRequest>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let listener: UnmatchedListener = Arc::new(move |request: &UnmatchedRequest| {
            if let Ok(mut guard) = sink.lock() {
                guard.push(request.clone());
            }
        });
        let listener = self.interceptor.on_unmatched(listener)?;
        Ok(UnmatchedTracking {
            listener,
            log,
        })
    }

    /// Removes the listener and returns what it collected.
    fn release_tracking(
        &self,
        tracking: UnmatchedTracking,
    ) -> (Vec<UnmatchedRequest>, Result<(), LifecycleError>) {
        let removed = self.interceptor.remove_unmatched_listener(tracking.listener);
        let requests = match tracking.log.lock() {
            Ok(mut guard) => mem::take(&mut *guard),
            Err(poisoned) => mem::take(&mut *poisoned.into_inner()),
        };
        (requests, removed.map_err(LifecycleError::from))
    }
}

impl ModeBehavior {
    /// Suite setup: install interception and load fixtures.
    fn setup<I: Interceptor, L: FixtureLogSink>(
        self,
        env: &Environment<I, L>,
        state: &mut SuiteState,
    ) -> Result<(), LifecycleError> {
        if self == Self::Wild {
            return Ok(());
        }
        env.interceptor.activate(&INTERCEPTED_METHODS)?;
        state.store = env.load_store()?;
        Ok(())
    }

    /// Per-test preparation for a non-skipped test.
    fn apply<I: Interceptor, L: FixtureLogSink>(
        self,
        env: &Environment<I, L>,
        state: &SuiteState,
        active: &mut ActiveTest,
    ) -> Result<(), LifecycleError> {
        match self {
            Self::Replay {
                real_network, ..
            } => {
                env.interceptor.reset_all_mocks()?;
                if real_network {
                    env.interceptor.enable_real_network()?;
                } else {
                    env.interceptor.disable_real_network()?;
                }
                let entries = state.store.get(active.identity.as_str());
                active.mocks_defined = env.interceptor.define_mocks(entries)?;
                if active.mocks_defined > 0 {
                    env.emit(
                        &env.event(LogEventKind::MocksDefined, LogLevel::Info, "defined mocks")
                            .with_test(active.identity.as_str())
                            .with_count(active.mocks_defined),
                    );
                }
                active.tracking = Some(env.start_tracking()?);
            }
            Self::Record => {
                env.interceptor.reset_all_mocks()?;
                env.interceptor.enable_real_network()?;
                env.interceptor.start_recording()?;
            }
            Self::Wild => {}
        }
        Ok(())
    }

    /// Per-test completion.
    fn finish<I: Interceptor, L: FixtureLogSink>(
        self,
        env: &Environment<I, L>,
        state: &mut SuiteState,
        active: ActiveTest,
    ) -> Result<TestOutcome, LifecycleError> {
        let mut outcome = TestOutcome::empty(active.identity.clone());
        outcome.mocks_defined = active.mocks_defined;
        match self {
            Self::Replay {
                unmatched, ..
            } => {
                let Some(tracking) = active.tracking else {
                    return Ok(outcome);
                };
                let (requests, released) = env.release_tracking(tracking);
                if requests.is_empty() {
                    released?;
                    return Ok(outcome);
                }
                let detail = match unmatched {
                    UnmatchedPolicy::Warn => format!("{} unmatched requests", requests.len()),
                    UnmatchedPolicy::Fail => {
                        let context = UnmatchedContext {
                            fixture_path: env.location.path(),
                            identity: &active.identity,
                            mode: env.options.mode,
                        };
                        env.options.unmatched_message(&requests, &context)
                    }
                };
                let event = env
                    .event(LogEventKind::UnmatchedRequests, LogLevel::Warn, &detail)
                    .with_test(active.identity.as_str())
                    .with_count(requests.len());
                env.emit(&event);
                if unmatched == UnmatchedPolicy::Fail {
                    let mut message = event.message;
                    if let Err(err) = released {
                        message.push_str(&format!("\n\nunmatched listener cleanup failed: {err}"));
                    }
                    return Err(LifecycleError::UnmatchedRequests {
                        count: requests.len(),
                        fixture_path: env.location.path().to_path_buf(),
                        message,
                    });
                }
                released?;
                outcome.warning = Some(event.message);
                outcome.unmatched = requests;
            }
            Self::Record => {
                let captured = env.interceptor.stop_recording()?;
                outcome.recorded = captured.len();
                if captured.is_empty() {
                    if state.store.remove(active.identity.as_str()).is_some() {
                        env.emit(
                            &env.event(
                                LogEventKind::EntryRemoved,
                                LogLevel::Info,
                                "test made no requests; removed its fixtures",
                            )
                            .with_test(active.identity.as_str()),
                        );
                    }
                } else {
                    state.store.set(&active.identity, captured);
                    env.emit(
                        &env.event(LogEventKind::Recorded, LogLevel::Info, "recorded requests")
                            .with_test(active.identity.as_str())
                            .with_count(outcome.recorded),
                    );
                }
            }
            Self::Wild => {}
        }
        Ok(outcome)
    }

    /// Suite cleanup: reconcile and persist in record mode, then tear down.
    fn cleanup<I: Interceptor, L: FixtureLogSink>(
        self,
        env: &Environment<I, L>,
        state: &mut SuiteState,
        report: &mut SuiteReport,
    ) -> Result<(), LifecycleError> {
        match self {
            Self::Wild => Ok(()),
            Self::Replay {
                ..
            } => env.teardown(),
            Self::Record => {
                let persisted = Self::reconcile_and_persist(env, state, report);
                let teardown = env.teardown();
                persisted?;
                teardown
            }
        }
    }

    /// Prunes obsolete entries and writes the fixture file.
    fn reconcile_and_persist<I: Interceptor, L: FixtureLogSink>(
        env: &Environment<I, L>,
        state: &mut SuiteState,
        report: &mut SuiteReport,
    ) -> Result<(), LifecycleError> {
        let reconciled = reconcile(&mut state.store, &state.tracker);
        for identity in &reconciled.removed {
            env.emit(
                &env.event(
                    LogEventKind::ObsoleteEntryPruned,
                    LogLevel::Info,
                    "pruned fixtures for a test that no longer exists",
                )
                .with_test(identity.as_str()),
            );
        }
        report.pruned = reconciled.removed;
        let outcome = state.store.persist(env.location.path(), &reconciled.order)?;
        match &outcome {
            PersistOutcome::Written {
                entries,
            } => env.emit(
                &env.event(LogEventKind::FixturesWritten, LogLevel::Info, "wrote fixtures")
                    .with_count(*entries),
            ),
            PersistOutcome::Deleted {
                ..
            } => env.emit(&env.event(
                LogEventKind::FixturesDeleted,
                LogLevel::Info,
                "no fixtures left; deleted fixture file",
            )),
            PersistOutcome::Unchanged => {}
        }
        report.persisted = Some(outcome);
        Ok(())
    }
}

// ============================================================================
// SECTION: Lifecycle Engine
// ============================================================================

/// Fixture lifecycle engine for one test file.
pub struct FixtureLifecycle<I, L> {
    /// Collaborators and options.
    env: Environment<I, L>,
    /// Behavior bound from the mode.
    behavior: ModeBehavior,
    /// Suite state.
    state: SuiteState,
}

impl<I: Interceptor, L: FixtureLogSink> FixtureLifecycle<I, L> {
    /// Creates an engine.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Configuration`] when the options cannot
    /// locate a fixture file.
    pub fn new(options: LifecycleOptions, interceptor: I, sink: L) -> Result<Self, LifecycleError> {
        let location = options.fixture_location()?;
        let behavior = ModeBehavior::from(options.mode);
        Ok(Self {
            env: Environment {
                options,
                location,
                interceptor,
                sink,
            },
            behavior,
            state: SuiteState {
                store: FixtureStore::new(),
                tracker: TestIdentityTracker::new(),
                active: None,
                phase: SuitePhase::Pending,
            },
        })
    }

    /// Returns the bound mode.
    #[must_use]
    pub const fn mode(&self) -> FixtureMode {
        self.env.options.mode
    }

    /// Returns the resolved fixture location.
    #[must_use]
    pub const fn location(&self) -> &FixtureLocation {
        &self.env.location
    }

    /// Returns the in-memory fixture store.
    #[must_use]
    pub const fn store(&self) -> &FixtureStore {
        &self.state.store
    }

    /// Returns the identity tracker.
    #[must_use]
    pub const fn tracker(&self) -> &TestIdentityTracker {
        &self.state.tracker
    }

    /// Returns the interception engine.
    #[must_use]
    pub const fn interceptor(&self) -> &I {
        &self.env.interceptor
    }

    /// Fails unless the suite is running.
    const fn ensure_running(&self) -> Result<(), LifecycleError> {
        match self.state.phase {
            SuitePhase::Running => Ok(()),
            SuitePhase::Pending => Err(LifecycleError::SuiteNotStarted),
            SuitePhase::Finished => Err(LifecycleError::SuiteFinished),
        }
    }
}

impl<I: Interceptor, L: FixtureLogSink> LifecycleHooks for FixtureLifecycle<I, L> {
    type Outcome = TestOutcome;
    type Report = SuiteReport;
    type Error = LifecycleError;

    fn suite_start(&mut self) -> Result<(), LifecycleError> {
        match self.state.phase {
            SuitePhase::Pending => {}
            SuitePhase::Running => return Err(LifecycleError::SuiteAlreadyStarted),
            SuitePhase::Finished => return Err(LifecycleError::SuiteFinished),
        }
        self.state.phase = SuitePhase::Running;
        self.behavior.setup(&self.env, &mut self.state)
    }

    fn test_start(&mut self, test: &TestStart) -> Result<TestIdentity, LifecycleError> {
        self.ensure_running()?;
        if let Some(active) = &self.state.active {
            return Err(LifecycleError::TestInProgress(active.handle));
        }
        let identity = self.state.tracker.register(test.handle, &test.full_name)?;
        if test.skipped {
            return Ok(identity);
        }
        let mut active = ActiveTest {
            handle: test.handle,
            identity: identity.clone(),
            mocks_defined: 0,
            tracking: None,
        };
        let applied = self.behavior.apply(&self.env, &self.state, &mut active);
        self.state.active = Some(active);
        applied.map(|()| identity)
    }

    fn test_end(&mut self, handle: TestHandle) -> Result<TestOutcome, LifecycleError> {
        self.ensure_running()?;
        let active = match self.state.active.take() {
            Some(active) if active.handle == handle => active,
            other => {
                self.state.active = other;
                return Err(LifecycleError::NoActiveTest(handle));
            }
        };
        self.behavior.finish(&self.env, &mut self.state, active)
    }

    fn suite_end(&mut self) -> Result<SuiteReport, LifecycleError> {
        self.ensure_running()?;
        self.state.phase = SuitePhase::Finished;
        let abandoned = self
            .state
            .active
            .take()
            .and_then(|active| active.tracking)
            .map(|tracking| self.env.release_tracking(tracking).1);
        let mut report = SuiteReport {
            mode: self.env.options.mode,
            fixture_path: self.env.location.path().to_path_buf(),
            tests_seen: self.state.tracker.len(),
            pruned: Vec::new(),
            persisted: None,
        };
        self.behavior.cleanup(&self.env, &mut self.state, &mut report)?;
        if let Some(released) = abandoned {
            released?;
        }
        Ok(report)
    }
}
