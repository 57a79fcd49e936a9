// crates/http-fixtures-interceptor/src/interceptor.rs
// ============================================================================
// Module: In-Process Interceptor
// Description: Mock replay, traffic capture, and network gating for test code.
// Purpose: Implement the interceptor contract for requests routed through it.
// Dependencies: http-fixtures-core
// ============================================================================

//! ## Overview
//! [`InProcessInterceptor`] is the HTTP entry point for code under test:
//! every call goes through [`InProcessInterceptor::send`]. While active it
//! replays defined mocks (each consumed once, in definition order), records
//! live traffic when asked, and notifies listeners about requests no mock
//! matched. Unmatched requests go live only when real network access is
//! enabled; with it disabled, methods outside the intercepted set are
//! blocked as well.
//!
//! Clones share state, so the lifecycle engine and the test body can hold
//! the same interceptor.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use http_fixtures_core::InterceptError;
use http_fixtures_core::Interaction;
use http_fixtures_core::Interceptor;
use http_fixtures_core::ListenerId;
use http_fixtures_core::RecordedResponse;
use http_fixtures_core::UnmatchedListener;

use crate::request::OutboundRequest;
use crate::transport::LiveTransport;
use crate::transport::LiveTransportConfig;
use crate::transport::Transport;

// ============================================================================
// SECTION: State
// ============================================================================

/// Mutable interception state shared by clones.
struct InterceptState {
    /// Intercepted methods; `None` while inactive.
    methods: Option<BTreeSet<String>>,
    /// Whether unmatched requests may reach the network.
    real_network: bool,
    /// Captured interactions while recording.
    recording: Option<Vec<Interaction>>,
    /// Pending mocks in definition order.
    mocks: Vec<Interaction>,
    /// Registered unmatched listeners.
    listeners: Vec<(ListenerId, UnmatchedListener)>,
    /// Next listener identifier.
    next_listener: u64,
}

impl Default for InterceptState {
    fn default() -> Self {
        Self {
            methods: None,
            real_network: true,
            recording: None,
            mocks: Vec::new(),
            listeners: Vec::new(),
            next_listener: 1,
        }
    }
}

/// How a request will be served, decided under the state lock.
enum Route {
    /// Interception does not apply and the network is open; go live.
    Passthrough,
    /// A mock matched.
    Replay(RecordedResponse),
    /// Go live and capture the exchange.
    Record,
    /// No mock matched.
    Unmatched {
        /// Listeners to notify.
        listeners: Vec<UnmatchedListener>,
        /// Whether the request may go live afterwards.
        allowed: bool,
    },
}

// ============================================================================
// SECTION: Interceptor
// ============================================================================

/// Interceptor for requests routed through [`InProcessInterceptor::send`].
pub struct InProcessInterceptor<T = LiveTransport> {
    /// Shared interception state.
    state: Arc<Mutex<InterceptState>>,
    /// Transport for requests that go live.
    transport: Arc<T>,
}

impl<T> Clone for InProcessInterceptor<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl InProcessInterceptor<LiveTransport> {
    /// Creates an interceptor backed by the live `reqwest` transport.
    ///
    /// # Errors
    ///
    /// Returns [`InterceptError::Transport`] when the HTTP client cannot be built.
    pub fn live(config: LiveTransportConfig) -> Result<Self, InterceptError> {
        Ok(Self::new(LiveTransport::new(config)?))
    }
}

impl<T: Transport> InProcessInterceptor<T> {
    /// Creates an inactive interceptor over `transport`.
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self {
            state: Arc::new(Mutex::new(InterceptState::default())),
            transport: Arc::new(transport),
        }
    }

    /// Sends a request through the interceptor.
    ///
    /// # Errors
    ///
    /// Returns [`InterceptError::NetConnectDisallowed`] for unmatched
    /// requests while real network access is disabled, and transport errors
    /// for requests that go live.
    pub fn send(&self, request: OutboundRequest) -> Result<RecordedResponse, InterceptError> {
        let request = request.normalized();
        match self.route(&request)? {
            Route::Passthrough => self.transport.send(&request),
            Route::Replay(response) => Ok(response),
            Route::Record => {
                let response = self.transport.send(&request)?;
                if let Some(captured) = self.lock()?.recording.as_mut() {
                    captured.push(request.to_interaction(response.clone()));
                }
                Ok(response)
            }
            Route::Unmatched {
                listeners,
                allowed,
            } => {
                let unmatched = request.to_unmatched();
                for listener in &listeners {
                    listener(&unmatched);
                }
                if allowed {
                    self.transport.send(&request)
                } else {
                    Err(InterceptError::NetConnectDisallowed {
                        method: request.method,
                        href: request.href,
                    })
                }
            }
        }
    }

    /// Returns true while interception is installed.
    ///
    /// # Errors
    ///
    /// Returns [`InterceptError::Poisoned`] when the state lock is poisoned.
    pub fn is_active(&self) -> Result<bool, InterceptError> {
        Ok(self.lock()?.methods.is_some())
    }

    /// Returns the number of mocks not yet consumed.
    ///
    /// # Errors
    ///
    /// Returns [`InterceptError::Poisoned`] when the state lock is poisoned.
    pub fn pending_mocks(&self) -> Result<usize, InterceptError> {
        Ok(self.lock()?.mocks.len())
    }

    /// Decides how to serve a normalized request, consuming a mock on match.
    fn route(&self, request: &OutboundRequest) -> Result<Route, InterceptError> {
        let mut state = self.lock()?;
        let Some(methods) = state.methods.as_ref() else {
            return Ok(Route::Passthrough);
        };
        if !methods.contains(&request.method) {
            if state.real_network {
                return Ok(Route::Passthrough);
            }
            return Ok(Route::Unmatched {
                listeners: state.listeners.iter().map(|(_, listener)| Arc::clone(listener)).collect(),
                allowed: false,
            });
        }
        if let Some(position) = state.mocks.iter().position(|mock| request.matches(mock)) {
            return Ok(Route::Replay(state.mocks.remove(position).response));
        }
        if state.recording.is_some() {
            return Ok(Route::Record);
        }
        Ok(Route::Unmatched {
            listeners: state.listeners.iter().map(|(_, listener)| Arc::clone(listener)).collect(),
            allowed: state.real_network,
        })
    }

    /// Locks the shared state.
    fn lock(&self) -> Result<MutexGuard<'_, InterceptState>, InterceptError> {
        self.state
            .lock()
            .map_err(|_| InterceptError::Poisoned("interceptor state lock poisoned".to_string()))
    }
}

impl<T: Transport> Interceptor for InProcessInterceptor<T> {
    fn activate(&self, methods: &[&str]) -> Result<(), InterceptError> {
        let methods = methods.iter().map(|method| method.to_ascii_uppercase()).collect();
        self.lock()?.methods = Some(methods);
        Ok(())
    }

    fn restore(&self) -> Result<(), InterceptError> {
        let mut state = self.lock()?;
        state.methods = None;
        state.recording = None;
        Ok(())
    }

    fn enable_real_network(&self) -> Result<(), InterceptError> {
        self.lock()?.real_network = true;
        Ok(())
    }

    fn disable_real_network(&self) -> Result<(), InterceptError> {
        self.lock()?.real_network = false;
        Ok(())
    }

    fn define_mocks(&self, interactions: &[Interaction]) -> Result<usize, InterceptError> {
        self.lock()?.mocks.extend_from_slice(interactions);
        Ok(interactions.len())
    }

    fn start_recording(&self) -> Result<(), InterceptError> {
        self.lock()?.recording = Some(Vec::new());
        Ok(())
    }

    fn stop_recording(&self) -> Result<Vec<Interaction>, InterceptError> {
        Ok(self.lock()?.recording.take().unwrap_or_default())
    }

    fn on_unmatched(&self, listener: UnmatchedListener) -> Result<ListenerId, InterceptError> {
        let mut state = self.lock()?;
        let id = ListenerId::new(state.next_listener);
        state.next_listener = state.next_listener.saturating_add(1);
        state.listeners.push((id, listener));
        Ok(id)
    }

    fn remove_unmatched_listener(&self, id: ListenerId) -> Result<(), InterceptError> {
        self.lock()?.listeners.retain(|(existing, _)| *existing != id);
        Ok(())
    }

    fn reset_all_mocks(&self) -> Result<(), InterceptError> {
        self.lock()?.mocks.clear();
        Ok(())
    }
}
