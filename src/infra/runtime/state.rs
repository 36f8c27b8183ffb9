//! Process state shared between the transport, tool handlers and pollers.
//!
//! Locks are never held across an `.await`. The drag interlock lives under
//! the same lock as the lamp mirror so a poll cannot slip a write in between
//! checking the flag and storing the reading.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::quote::{QUOTE_LOADING, WATCHLIST};
use crate::domain::{LampState, LedState};

pub const AMBIENT_START: f64 = 25.0;

#[derive(Debug, Default)]
struct LampMirror {
    state: LampState,
    dragging: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WatchedQuote {
    pub symbol: &'static str,
    pub label: &'static str,
    pub text: String,
}

struct Inner {
    lamp: RwLock<LampMirror>,
    led: RwLock<LedState>,
    ambient: RwLock<f64>,
    quotes: RwLock<Vec<WatchedQuote>>,
    weather: RwLock<Option<String>>,
}

#[derive(Clone)]
pub struct AgentState(Arc<Inner>);

impl Default for AgentState {
    fn default() -> Self {
        let quotes = WATCHLIST
            .iter()
            .map(|&(symbol, label)| WatchedQuote { symbol, label, text: QUOTE_LOADING.to_string() })
            .collect();
        Self(Arc::new(Inner {
            lamp: RwLock::new(LampMirror::default()),
            led: RwLock::new(LedState::default()),
            ambient: RwLock::new(AMBIENT_START),
            quotes: RwLock::new(quotes),
            weather: RwLock::new(None),
        }))
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

impl AgentState {
    pub fn lamp(&self) -> LampState {
        read(&self.0.lamp).state
    }

    /// Record a state this agent just commanded.
    pub fn set_lamp(&self, state: LampState) {
        write(&self.0.lamp).state = state;
    }

    /// Store a polled reading unless a manual adjustment is in progress.
    /// Returns whether the mirror was updated.
    pub fn apply_polled(&self, state: LampState) -> bool {
        let mut mirror = write(&self.0.lamp);
        if mirror.dragging {
            return false;
        }
        mirror.state = state;
        true
    }

    pub fn is_dragging(&self) -> bool {
        read(&self.0.lamp).dragging
    }

    /// Raise the drag interlock until the returned guard is dropped.
    pub fn begin_drag(&self) -> DragGuard {
        write(&self.0.lamp).dragging = true;
        DragGuard { state: self.clone() }
    }

    pub fn led(&self) -> LedState {
        read(&self.0.led).clone()
    }

    pub fn set_led(&self, led: LedState) {
        *write(&self.0.led) = led;
    }

    pub fn ambient(&self) -> f64 {
        *read(&self.0.ambient)
    }

    /// Apply one random-walk step, rounded to two decimals.
    pub fn step_ambient(&self, delta: f64) -> f64 {
        let mut v = write(&self.0.ambient);
        *v = ((*v + delta) * 100.0).round() / 100.0;
        *v
    }

    pub fn quotes(&self) -> Vec<WatchedQuote> {
        read(&self.0.quotes).clone()
    }

    pub fn set_quote(&self, symbol: &str, text: String) {
        if let Some(q) = write(&self.0.quotes).iter_mut().find(|q| q.symbol == symbol) {
            q.text = text;
        }
    }

    pub fn weather(&self) -> Option<String> {
        read(&self.0.weather).clone()
    }

    pub fn set_weather(&self, text: String) {
        *write(&self.0.weather) = Some(text);
    }
}

/// Clears the drag interlock on drop.
pub struct DragGuard {
    state: AgentState,
}

impl Drop for DragGuard {
    fn drop(&mut self) {
        write(&self.state.0.lamp).dragging = false;
    }
}
