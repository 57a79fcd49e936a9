// crates/http-fixtures-core/tests/common/mod.rs
// ============================================================================
// Module: Lifecycle Test Support
// Description: Scripted interceptor used to drive the lifecycle engine.
// Purpose: Simulate replay, capture, and unmatched traffic without sockets.
// Dependencies: http-fixtures-core
// ============================================================================

//! ## Overview
//! [`ScriptedInterceptor`] implements the interceptor contract over plain
//! in-memory state. Tests call [`ScriptedInterceptor::fire`] to simulate the
//! code under test issuing a request.

#![allow(dead_code, reason = "Shared helpers are not used by every test crate.")]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use http_fixtures_core::FixtureLifecycle;
use http_fixtures_core::FixtureMode;
use http_fixtures_core::HeaderMap;
use http_fixtures_core::InterceptError;
use http_fixtures_core::Interaction;
use http_fixtures_core::Interceptor;
use http_fixtures_core::LifecycleOptions;
use http_fixtures_core::ListenerId;
use http_fixtures_core::MemoryLogSink;
use http_fixtures_core::RecordedResponse;
use http_fixtures_core::UnmatchedListener;
use http_fixtures_core::UnmatchedRequest;

// ============================================================================
// SECTION: Scripted Interceptor
// ============================================================================

#[derive(Default)]
struct ScriptState {
    active: bool,
    real_network: bool,
    recording: bool,
    mocks: Vec<Interaction>,
    recorded: Vec<Interaction>,
    listeners: Vec<(ListenerId, UnmatchedListener)>,
    next_listener: u64,
    calls: Vec<&'static str>,
    failing: BTreeSet<&'static str>,
}

/// In-memory interceptor with scripted traffic and failure injection.
#[derive(Clone, Default)]
pub struct ScriptedInterceptor {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedInterceptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates the code under test issuing a request.
    pub fn fire(&self, method: &str, href: &str) -> Result<(), InterceptError> {
        let method = method.to_ascii_uppercase();
        let mut state = self.state.lock().unwrap();
        if !state.active {
            return Ok(());
        }
        if let Some(position) =
            state.mocks.iter().position(|mock| mock.method == method && mock.href == href)
        {
            state.mocks.remove(position);
            return Ok(());
        }
        if state.recording {
            state.recorded.push(Interaction::new(&method, href, RecordedResponse::default()));
            return Ok(());
        }
        let request = UnmatchedRequest {
            method: method.clone(),
            href: href.to_string(),
            headers: HeaderMap::new(),
            body: None,
        };
        let listeners: Vec<UnmatchedListener> =
            state.listeners.iter().map(|(_, listener)| Arc::clone(listener)).collect();
        let allowed = state.real_network;
        drop(state);
        for listener in listeners {
            listener(&request);
        }
        if allowed {
            Ok(())
        } else {
            Err(InterceptError::NetConnectDisallowed {
                method,
                href: href.to_string(),
            })
        }
    }

    /// Makes the named trait operation fail from now on.
    pub fn fail_on(&self, operation: &'static str) {
        self.state.lock().unwrap().failing.insert(operation);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn listener_count(&self) -> usize {
        self.state.lock().unwrap().listeners.len()
    }

    pub fn is_active(&self) -> bool {
        self.state.lock().unwrap().active
    }

    pub fn real_network(&self) -> bool {
        self.state.lock().unwrap().real_network
    }

    pub fn pending_mocks(&self) -> usize {
        self.state.lock().unwrap().mocks.len()
    }

    fn enter(&self, operation: &'static str) -> Result<MutexGuard<'_, ScriptState>, InterceptError> {
        let mut state = self.state.lock().map_err(|err| InterceptError::Poisoned(err.to_string()))?;
        state.calls.push(operation);
        if state.failing.contains(operation) {
            return Err(InterceptError::Transport(format!("{operation} failed")));
        }
        Ok(state)
    }
}

impl Interceptor for ScriptedInterceptor {
    fn activate(&self, _methods: &[&str]) -> Result<(), InterceptError> {
        self.enter("activate")?.active = true;
        Ok(())
    }

    fn restore(&self) -> Result<(), InterceptError> {
        let mut state = self.enter("restore")?;
        state.active = false;
        state.recording = false;
        Ok(())
    }

    fn enable_real_network(&self) -> Result<(), InterceptError> {
        self.enter("enable_real_network")?.real_network = true;
        Ok(())
    }

    fn disable_real_network(&self) -> Result<(), InterceptError> {
        self.enter("disable_real_network")?.real_network = false;
        Ok(())
    }

    fn define_mocks(&self, interactions: &[Interaction]) -> Result<usize, InterceptError> {
        self.enter("define_mocks")?.mocks.extend_from_slice(interactions);
        Ok(interactions.len())
    }

    fn start_recording(&self) -> Result<(), InterceptError> {
        let mut state = self.enter("start_recording")?;
        state.recording = true;
        state.recorded.clear();
        Ok(())
    }

    fn stop_recording(&self) -> Result<Vec<Interaction>, InterceptError> {
        let mut state = self.enter("stop_recording")?;
        state.recording = false;
        Ok(std::mem::take(&mut state.recorded))
    }

    fn on_unmatched(&self, listener: UnmatchedListener) -> Result<ListenerId, InterceptError> {
        let mut state = self.enter("on_unmatched")?;
        state.next_listener += 1;
        let id = ListenerId::new(state.next_listener);
        state.listeners.push((id, listener));
        Ok(id)
    }

    fn remove_unmatched_listener(&self, id: ListenerId) -> Result<(), InterceptError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("remove_unmatched_listener");
        state.listeners.retain(|(existing, _)| *existing != id);
        if state.failing.contains("remove_unmatched_listener") {
            return Err(InterceptError::Transport("remove_unmatched_listener failed".to_string()));
        }
        Ok(())
    }

    fn reset_all_mocks(&self) -> Result<(), InterceptError> {
        self.enter("reset_all_mocks")?.mocks.clear();
        Ok(())
    }
}

// ============================================================================
// SECTION: Fixture Helpers
// ============================================================================

/// Lifecycle under test plus handles to its collaborators.
pub struct Harness {
    pub lifecycle: FixtureLifecycle<ScriptedInterceptor, MemoryLogSink>,
    pub interceptor: ScriptedInterceptor,
    pub log: MemoryLogSink,
}

/// Returns the path of a test file inside `root`.
pub fn test_file(root: &Path) -> PathBuf {
    root.join("client_test.rs")
}

/// Returns the default fixture path for [`test_file`].
pub fn fixture_file(root: &Path) -> PathBuf {
    root.join("__nocks__").join("client_test.rs.json")
}

/// Writes raw fixture contents for [`test_file`].
pub fn write_fixture(root: &Path, contents: &str) {
    let path = fixture_file(root);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

/// Builds a lifecycle for [`test_file`] in `mode`.
pub fn harness(root: &Path, mode: FixtureMode) -> Harness {
    harness_with(LifecycleOptions::new(mode).with_test_path(test_file(root)))
}

/// Builds a lifecycle from explicit options.
pub fn harness_with(options: LifecycleOptions) -> Harness {
    let interceptor = ScriptedInterceptor::new();
    let log = MemoryLogSink::new();
    let lifecycle = FixtureLifecycle::new(options, interceptor.clone(), log.clone()).unwrap();
    Harness {
        lifecycle,
        interceptor,
        log,
    }
}
