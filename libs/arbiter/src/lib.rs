//! Arbitration for a single shared rendering context.
//!
//! Several visualization surfaces on one page may each want the real GPU
//! drawing context, but only one can hold it at a time. The arbiter is a
//! pure ledger: surfaces register with a priority, the ledger grants or
//! denies ownership, and when the owner steps down the highest-priority
//! remaining surface is promoted and announced to subscribers. The arbiter
//! never touches the context itself — consumers honor the grant/deny token.
//!
//! All operations are synchronous and total. The expected call pattern is a
//! single-threaded UI event loop, so there is no internal locking; restore
//! callbacks run synchronously at the end of a promoting `unregister` and
//! must not call back into the same arbiter.

use std::collections::HashMap;

/// Handle returned by [`RenderArbiter::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

/// One registered surface.
struct Registration {
    priority: i32,
    /// Live between register and unregister. Only active registrations are
    /// promotion candidates.
    active: bool,
    /// Monotone registration order, kept across re-registration. Breaks
    /// priority ties at promotion time: earliest registered wins.
    seq: u64,
}

type RestoreCallback = Box<dyn FnMut(&str)>;

/// Ledger tracking which surface currently owns the shared render context.
///
/// Construct one per application (or per test) and pass it by handle to
/// every consumer; there is deliberately no global instance.
pub struct RenderArbiter {
    owner: Option<String>,
    registry: HashMap<String, Registration>,
    next_seq: u64,
    subscribers: Vec<(u64, RestoreCallback)>,
    next_subscription: u64,
}

impl RenderArbiter {
    pub fn new() -> Self {
        Self {
            owner: None,
            registry: HashMap::new(),
            next_seq: 0,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Register a surface and try to claim the context.
    ///
    /// Returns `true` if `id` now owns the context: either nothing owned it,
    /// `id` already owned it (re-registration is idempotent), or `id`'s
    /// priority strictly exceeds the current owner's. Equal priority does not
    /// preempt. A denied surface stays registered and becomes a promotion
    /// candidate when the owner releases.
    pub fn register(&mut self, id: &str, priority: i32) -> bool {
        let seq = match self.registry.get(id) {
            Some(existing) => existing.seq,
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                seq
            }
        };
        self.registry.insert(
            id.to_string(),
            Registration {
                priority,
                active: true,
                seq,
            },
        );

        let granted = match self.owner.as_deref() {
            None => true,
            Some(owner) if owner == id => true,
            Some(owner) => {
                let owner_priority = self
                    .registry
                    .get(owner)
                    .map(|r| r.priority)
                    .unwrap_or(i32::MIN);
                priority > owner_priority
            }
        };
        if granted {
            self.owner = Some(id.to_string());
        }
        granted
    }

    /// Remove a registration. Unknown ids are a no-op.
    ///
    /// If `id` owned the context, the highest-priority remaining active
    /// registration is promoted (earliest-registered wins a tie) and every
    /// subscriber is notified with the promoted surface's id. If nothing
    /// remains, the context simply goes unowned and no notification fires.
    pub fn unregister(&mut self, id: &str) {
        if self.registry.remove(id).is_none() {
            return;
        }
        if self.owner.as_deref() != Some(id) {
            return;
        }
        self.owner = None;

        let promoted = self
            .registry
            .iter()
            .filter(|(_, r)| r.active)
            .max_by(|(_, a), (_, b)| a.priority.cmp(&b.priority).then(b.seq.cmp(&a.seq)))
            .map(|(id, _)| id.clone());

        if let Some(next) = promoted {
            self.owner = Some(next.clone());
            for (_, callback) in self.subscribers.iter_mut() {
                callback(&next);
            }
        }
    }

    /// True iff `id` currently owns the context.
    pub fn is_owner(&self, id: &str) -> bool {
        self.owner.as_deref() == Some(id)
    }

    /// The id of the current owner, if any surface holds the context.
    pub fn current_owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// Whether `id` has a live registration.
    pub fn is_registered(&self, id: &str) -> bool {
        self.registry.contains_key(id)
    }

    /// Priority of a registered surface.
    pub fn priority_of(&self, id: &str) -> Option<i32> {
        self.registry.get(id).map(|r| r.priority)
    }

    /// Number of live registrations.
    pub fn registered_count(&self) -> usize {
        self.registry.len()
    }

    /// Subscribe to restoration notifications.
    ///
    /// The callback receives the id of each surface promoted after an owner
    /// releases. Every subscriber sees every promotion; surfaces are expected
    /// to ignore notifications not naming themselves.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&str) + 'static,
    {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        SubscriptionId(id)
    }

    /// Remove a subscription. Unknown handles are a no-op.
    pub fn unsubscribe(&mut self, subscription: SubscriptionId) {
        self.subscribers.retain(|(id, _)| *id != subscription.0);
    }
}

impl Default for RenderArbiter {
    fn default() -> Self {
        Self::new()
    }
}
