use lineage_crypto::{SigningKey, VerifyingKey};
use lineage_store::{LineageStore, Result};
use lineage_types::{Event, SourceId};
use tracing::debug;

use crate::builder::{EventBuilder, SignatureMode};
use crate::clock::{Clock, SystemClock};

/// An identity-holding source of signed events.
///
/// Holds the source's key pair and the last timestamp it used, so that
/// timestamps strictly increase even when several events are emitted within
/// one clock tick.
pub struct Producer<C: Clock = SystemClock> {
    source_id: SourceId,
    signing_key: SigningKey,
    clock: C,
    last_timestamp: u64,
}

impl Producer<SystemClock> {
    /// Producer with a freshly generated key pair and the system clock.
    pub fn new(source_id: SourceId) -> Self {
        Self::with_key(source_id, SigningKey::generate())
    }

    pub fn with_key(source_id: SourceId, signing_key: SigningKey) -> Self {
        Self::with_clock(source_id, signing_key, SystemClock)
    }
}

impl<C: Clock> Producer<C> {
    pub fn with_clock(source_id: SourceId, signing_key: SigningKey, clock: C) -> Self {
        Self {
            source_id,
            signing_key,
            clock,
            last_timestamp: 0,
        }
    }

    pub fn source_id(&self) -> &SourceId {
        &self.source_id
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Continue after a restart: never reuse a timestamp already persisted
    /// on this source's chain.
    pub fn resume<S: LineageStore + ?Sized>(&mut self, store: &S) -> Result<()> {
        if let Some(last) = store.read_chain(&self.source_id)?.last() {
            self.last_timestamp = self.last_timestamp.max(last.timestamp);
        }
        Ok(())
    }

    /// Build and sign the next event against the store's current position.
    ///
    /// The event is not appended; the caller decides when to persist it.
    pub fn make_event<S: LineageStore + ?Sized>(
        &mut self,
        store: &S,
        payload: impl Into<String>,
        mode: SignatureMode,
    ) -> Result<Event> {
        let index = store.allocate_next_index()?;
        let prev_hash = store.last_hash(&self.source_id)?;
        let timestamp = self.next_timestamp();

        let event = EventBuilder::allocate(self.source_id.clone(), index, prev_hash)
            .commit(payload, timestamp)
            .sign(&self.signing_key, mode);

        debug!(index, source = %self.source_id, timestamp, ?mode, "event built");
        Ok(event)
    }

    /// [`make_event`](Self::make_event) followed by `store.append`.
    pub fn emit<S: LineageStore + ?Sized>(
        &mut self,
        store: &S,
        payload: impl Into<String>,
        mode: SignatureMode,
    ) -> Result<Event> {
        let event = self.make_event(store, payload, mode)?;
        store.append(&event)?;
        Ok(event)
    }

    fn next_timestamp(&mut self) -> u64 {
        let now = self.clock.now_secs();
        let timestamp = if now <= self.last_timestamp {
            self.last_timestamp + 1
        } else {
            now
        };
        self.last_timestamp = timestamp;
        timestamp
    }
}
