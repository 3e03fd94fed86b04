//! Recognizer lifecycle — at most one live engine per capability.
//!
//! Each capability owns one slot and a policy deciding when the slot's
//! engine is rebuilt:
//!
//!   - `CacheByConfig` (text recognition): reuse while the script is
//!     unchanged; otherwise close the old engine and build a new one.
//!   - `FreshPerCall` (entity extraction): build a new engine on every
//!     acquire. The displaced engine is NOT closed; only an explicit
//!     release closes the engine currently held.
//!
//! The asymmetry is deliberate and callers depend on it.
//!
//! Slots sit behind `std::sync::Mutex` held only for bookkeeping and
//! synchronous construction, never across an await. Requests for the same
//! capability must still be serialized by the caller for the cache to be
//! meaningful.

use crate::engine::{EngineError, EngineProvider, EntityExtractor, Script, TextRecognizer};
use crate::error::BridgeError;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    TextRecognition,
    EntityExtraction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePolicy {
    CacheByConfig,
    FreshPerCall,
}

impl Capability {
    pub fn policy(self) -> LifecyclePolicy {
        match self {
            Capability::TextRecognition => LifecyclePolicy::CacheByConfig,
            Capability::EntityExtraction => LifecyclePolicy::FreshPerCall,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Capability::TextRecognition => "text recognition",
            Capability::EntityExtraction => "entity extraction",
        }
    }
}

/// Anything a slot can close.
pub trait Releasable: Send + Sync {
    fn close_engine(&self) -> Result<(), EngineError>;
}

impl Releasable for dyn TextRecognizer {
    fn close_engine(&self) -> Result<(), EngineError> {
        self.close()
    }
}

impl Releasable for dyn EntityExtractor {
    fn close_engine(&self) -> Result<(), EngineError> {
        self.close()
    }
}

/// Shared reference to a slot's engine plus the config it was built for.
///
/// Clones share the released flag, so a handle held by an in-flight
/// request observes a later release.
pub struct EngineHandle<E: ?Sized, C> {
    id: u64,
    config: C,
    engine: Arc<E>,
    released: Arc<AtomicBool>,
}

impl<E: ?Sized, C: Clone> Clone for EngineHandle<E, C> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            config: self.config.clone(),
            engine: Arc::clone(&self.engine),
            released: Arc::clone(&self.released),
        }
    }
}

impl<E: ?Sized, C: std::fmt::Debug> std::fmt::Debug for EngineHandle<E, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHandle")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("released", &self.is_released())
            .finish_non_exhaustive()
    }
}

impl<E: ?Sized, C> EngineHandle<E, C> {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    /// The engine, for invocation only. Fails once the handle is released.
    pub fn engine(&self) -> Result<&E, BridgeError> {
        if self.is_released() {
            return Err(BridgeError::HandleReleased(self.id));
        }
        Ok(&*self.engine)
    }
}

pub type TextHandle = EngineHandle<dyn TextRecognizer, Script>;
pub type EntityHandle = EngineHandle<dyn EntityExtractor, String>;

struct Slot<E: ?Sized, C> {
    capability: Capability,
    held: Option<EngineHandle<E, C>>,
}

impl<E: ?Sized + Releasable, C: Clone + PartialEq + std::fmt::Debug> Slot<E, C> {
    fn new(capability: Capability) -> Self {
        Self {
            capability,
            held: None,
        }
    }

    fn acquire(
        &mut self,
        config: C,
        next_id: &AtomicU64,
        build: impl FnOnce(&C) -> Result<Box<E>, EngineError>,
    ) -> Result<EngineHandle<E, C>, BridgeError> {
        match self.capability.policy() {
            LifecyclePolicy::CacheByConfig => {
                if let Some(handle) = &self.held {
                    if handle.config == config && !handle.is_released() {
                        log::debug!(
                            "[LIFECYCLE] Reusing {} engine #{} ({:?})",
                            self.capability.as_str(),
                            handle.id,
                            config
                        );
                        return Ok(handle.clone());
                    }
                }
                self.release();
            }
            LifecyclePolicy::FreshPerCall => {
                if let Some(displaced) = self.held.take() {
                    log::debug!(
                        "[LIFECYCLE] Displacing {} engine #{} without closing it",
                        self.capability.as_str(),
                        displaced.id
                    );
                }
            }
        }

        let engine = build(&config).map_err(|e| BridgeError::EngineConstruction(e.message))?;
        let handle = EngineHandle {
            id: next_id.fetch_add(1, Ordering::SeqCst),
            config,
            engine: Arc::from(engine),
            released: Arc::new(AtomicBool::new(false)),
        };
        log::info!(
            "[LIFECYCLE] Built {} engine #{} ({:?})",
            self.capability.as_str(),
            handle.id,
            handle.config
        );
        self.held = Some(handle.clone());
        Ok(handle)
    }

    /// Close the held engine, if any. Close failures are logged and swallowed.
    fn release(&mut self) -> Option<u64> {
        let handle = self.held.take()?;
        handle.released.store(true, Ordering::SeqCst);
        if let Err(e) = handle.engine.close_engine() {
            log::warn!(
                "[LIFECYCLE] Closing {} engine #{} failed: {}",
                self.capability.as_str(),
                handle.id,
                e
            );
        } else {
            log::info!("[LIFECYCLE] Closed {} engine #{}", self.capability.as_str(), handle.id);
        }
        Some(handle.id)
    }
}

/// Owns one slot per capability and the provider that builds engines.
pub struct RecognizerLifecycle {
    provider: Arc<dyn EngineProvider>,
    text: Mutex<Slot<dyn TextRecognizer, Script>>,
    entity: Mutex<Slot<dyn EntityExtractor, String>>,
    next_id: AtomicU64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl RecognizerLifecycle {
    pub fn new(provider: Arc<dyn EngineProvider>) -> Self {
        Self {
            provider,
            text: Mutex::new(Slot::new(Capability::TextRecognition)),
            entity: Mutex::new(Slot::new(Capability::EntityExtraction)),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn acquire_text(&self, script: Script) -> Result<TextHandle, BridgeError> {
        let provider = &self.provider;
        lock(&self.text).acquire(script, &self.next_id, |s| provider.text_recognizer(*s))
    }

    pub fn acquire_entity(&self, language: &str) -> Result<EntityHandle, BridgeError> {
        let provider = &self.provider;
        lock(&self.entity).acquire(language.to_string(), &self.next_id, |l| {
            provider.entity_extractor(l)
        })
    }

    /// Idempotent. Returns the id of the engine that was closed, if any.
    pub fn release(&self, capability: Capability) -> Option<u64> {
        match capability {
            Capability::TextRecognition => lock(&self.text).release(),
            Capability::EntityExtraction => lock(&self.entity).release(),
        }
    }

    /// Id of the engine currently held for a capability.
    pub fn held_id(&self, capability: Capability) -> Option<u64> {
        match capability {
            Capability::TextRecognition => lock(&self.text).held.as_ref().map(|h| h.id),
            Capability::EntityExtraction => lock(&self.entity).held.as_ref().map(|h| h.id),
        }
    }

    pub fn release_all(&self) {
        self.release(Capability::TextRecognition);
        self.release(Capability::EntityExtraction);
    }
}
