//! Provider registry: configuration and live health for every backend.
//!
//! Each provider has its own slot holding a sliding window of the last
//! `window_size` outcomes. Providers that fail `degraded_after` times in a
//! row are degraded and ordered after every other provider of their
//! category; one success restores them. Disabled providers are never
//! offered and only leave that state through [`ProviderRegistry::reset`].
//!
//! # State Machine
//!
//! ```text
//! ┌─────────┐  success   ┌─────────┐  K trailing failures  ┌──────────┐
//! │ Unknown ├───────────►│ Healthy ├──────────────────────►│ Degraded │
//! └────┬────┘            └────▲────┘                       └────┬─────┘
//!      │                      │            success              │
//!      │                      └─────────────────────────────────┘
//!      │  disable()      ┌──────────┐  reset()
//!      └────────────────►│ Disabled ├──────────► Unknown
//!                        └──────────┘
//! ```
//!
//! The registry is an owned value shared through `Arc`. Slots are guarded
//! individually, so outcomes for different providers never contend.

use crate::config::RegistryConfig;
use crate::types::{HealthState, ProviderCategory, ProviderDescriptor};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Result of one provider call, as reported back to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    /// Maps any `Result` to an outcome.
    pub fn of<T, E>(result: &Result<T, E>) -> Self {
        if result.is_ok() {
            Self::Success
        } else {
            Self::Failure
        }
    }
}

/// Snapshot of one provider's health, for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderHealth {
    pub id: String,
    pub category: ProviderCategory,
    pub state: HealthState,
    pub consecutive_failures: usize,
}

#[derive(Debug)]
struct HealthSlot {
    state: HealthState,
    window: VecDeque<Outcome>,
}

impl HealthSlot {
    fn new(enabled: bool) -> Self {
        Self {
            state: if enabled {
                HealthState::Unknown
            } else {
                HealthState::Disabled
            },
            window: VecDeque::new(),
        }
    }

    fn trailing_failures(&self) -> usize {
        self.window
            .iter()
            .rev()
            .take_while(|o| **o == Outcome::Failure)
            .count()
    }
}

/// Live registry of configured providers.
#[derive(Debug)]
pub struct ProviderRegistry {
    config: RegistryConfig,
    descriptors: Vec<ProviderDescriptor>,
    slots: HashMap<String, Mutex<HealthSlot>>,
}

fn lock(slot: &Mutex<HealthSlot>) -> MutexGuard<'_, HealthSlot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ProviderRegistry {
    /// Builds a registry from descriptors. A descriptor with
    /// `enabled = false` starts disabled; duplicate ids keep the first.
    pub fn new(config: RegistryConfig, descriptors: Vec<ProviderDescriptor>) -> Self {
        let mut kept = Vec::with_capacity(descriptors.len());
        let mut slots = HashMap::with_capacity(descriptors.len());
        for descriptor in descriptors {
            if slots.contains_key(&descriptor.id) {
                tracing::warn!(provider = %descriptor.id, "duplicate provider id ignored");
                continue;
            }
            slots.insert(
                descriptor.id.clone(),
                Mutex::new(HealthSlot::new(descriptor.enabled)),
            );
            kept.push(descriptor);
        }
        Self {
            config,
            descriptors: kept,
            slots,
        }
    }

    /// Current health of `provider_id`. Unknown ids report [`HealthState::Unknown`].
    pub fn status(&self, provider_id: &str) -> HealthState {
        self.slots
            .get(provider_id)
            .map_or(HealthState::Unknown, |slot| lock(slot).state)
    }

    /// Records the outcome of one call. Returns `false` for unknown ids.
    pub fn record(&self, provider_id: &str, outcome: Outcome) -> bool {
        let Some(slot) = self.slots.get(provider_id) else {
            tracing::debug!(provider = provider_id, "outcome for unregistered provider ignored");
            return false;
        };
        let mut slot = lock(slot);
        if slot.state == HealthState::Disabled {
            return true;
        }

        slot.window.push_back(outcome);
        while slot.window.len() > self.config.window_size {
            slot.window.pop_front();
        }

        let next = match outcome {
            Outcome::Success => HealthState::Healthy,
            Outcome::Failure if slot.trailing_failures() >= self.config.degraded_after => {
                HealthState::Degraded
            }
            Outcome::Failure => slot.state,
        };
        if next != slot.state {
            tracing::info!(
                provider = provider_id,
                from = %slot.state,
                to = %next,
                "provider health changed"
            );
        }
        slot.state = next;
        true
    }

    /// Providers of `category` that may be tried, in attempt order:
    /// non-degraded before degraded, then by priority, then by id.
    pub fn enabled_providers(&self, category: ProviderCategory) -> Vec<ProviderDescriptor> {
        let mut candidates: Vec<(bool, &ProviderDescriptor)> = self
            .descriptors
            .iter()
            .filter(|d| d.category == category)
            .filter_map(|d| match self.status(&d.id) {
                HealthState::Disabled => None,
                state => Some((state == HealthState::Degraded, d)),
            })
            .collect();

        candidates.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then(a.1.priority.cmp(&b.1.priority))
                .then_with(|| a.1.id.cmp(&b.1.id))
        });
        candidates.into_iter().map(|(_, d)| d.clone()).collect()
    }

    /// Starts a new run: every non-disabled provider returns to
    /// [`HealthState::Unknown`] with an empty window.
    pub fn begin_run(&self) {
        for slot in self.slots.values() {
            let mut slot = lock(slot);
            if slot.state != HealthState::Disabled {
                slot.state = HealthState::Unknown;
                slot.window.clear();
            }
        }
    }

    /// Disables a provider until [`reset`](Self::reset). Returns `false` for unknown ids.
    pub fn disable(&self, provider_id: &str) -> bool {
        let Some(slot) = self.slots.get(provider_id) else {
            return false;
        };
        let mut slot = lock(slot);
        slot.state = HealthState::Disabled;
        slot.window.clear();
        tracing::info!(provider = provider_id, "provider disabled");
        true
    }

    /// Returns a provider to [`HealthState::Unknown`], including from
    /// disabled. Returns `false` for unknown ids.
    pub fn reset(&self, provider_id: &str) -> bool {
        let Some(slot) = self.slots.get(provider_id) else {
            return false;
        };
        let mut slot = lock(slot);
        slot.state = HealthState::Unknown;
        slot.window.clear();
        true
    }

    pub fn descriptor(&self, provider_id: &str) -> Option<&ProviderDescriptor> {
        self.descriptors.iter().find(|d| d.id == provider_id)
    }

    /// Number of registered providers of `category`, disabled ones included.
    pub fn count(&self, category: ProviderCategory) -> usize {
        self.descriptors
            .iter()
            .filter(|d| d.category == category)
            .count()
    }

    /// Health snapshot of every provider, sorted by id.
    pub fn health_report(&self) -> Vec<ProviderHealth> {
        let mut report: Vec<ProviderHealth> = self
            .descriptors
            .iter()
            .filter_map(|d| {
                let slot = lock(self.slots.get(&d.id)?);
                Some(ProviderHealth {
                    id: d.id.clone(),
                    category: d.category,
                    state: slot.state,
                    consecutive_failures: slot.trailing_failures(),
                })
            })
            .collect();
        report.sort_by(|a, b| a.id.cmp(&b.id));
        report
    }
}
