//! Contention scenarios for the shared-render-context ledger.

use arbiter::RenderArbiter;
use std::cell::RefCell;
use std::rc::Rc;

/// Equal priority never preempts: the incumbent keeps the context.
#[test]
fn test_equal_priority_does_not_preempt() {
    let mut arbiter = RenderArbiter::new();

    assert!(arbiter.register("a", 0));
    assert!(!arbiter.register("b", 0));

    assert_eq!(arbiter.current_owner(), Some("a"));
}

/// Strictly greater priority takes the context immediately.
#[test]
fn test_strict_preemption() {
    let mut arbiter = RenderArbiter::new();

    assert!(arbiter.register("a", 0));
    assert!(arbiter.register("b", 1));

    assert_eq!(arbiter.current_owner(), Some("b"));
    // the preempted surface is still registered, just not the owner
    assert!(arbiter.is_registered("a"));
    assert!(!arbiter.is_owner("a"));
}

/// Releasing the owner promotes the remaining registrant and announces it.
#[test]
fn test_promotion_on_release() {
    let notified = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&notified);

    let mut arbiter = RenderArbiter::new();
    arbiter.subscribe(move |id| sink.borrow_mut().push(id.to_string()));

    arbiter.register("a", 0);
    arbiter.register("b", 1);
    arbiter.unregister("b");

    assert_eq!(arbiter.current_owner(), Some("a"));
    assert_eq!(*notified.borrow(), vec!["a".to_string()]);
}

/// Promotion picks the highest-priority survivor among several.
#[test]
fn test_promotion_prefers_highest_priority() {
    let mut arbiter = RenderArbiter::new();

    arbiter.register("a", 0);
    arbiter.register("b", 3);
    arbiter.register("c", 2);
    assert_eq!(arbiter.current_owner(), Some("b"));

    arbiter.unregister("b");
    assert_eq!(arbiter.current_owner(), Some("c"));

    arbiter.unregister("c");
    assert_eq!(arbiter.current_owner(), Some("a"));
}

/// Priority ties at promotion go to the earliest-registered surface.
#[test]
fn test_promotion_tie_break_is_registration_order() {
    let mut arbiter = RenderArbiter::new();

    arbiter.register("owner", 5);
    arbiter.register("early", 1);
    arbiter.register("late", 1);

    arbiter.unregister("owner");
    assert_eq!(arbiter.current_owner(), Some("early"));
}

/// Unregistering an id that was never registered changes nothing.
#[test]
fn test_unknown_unregister_is_noop() {
    let notified = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&notified);

    let mut arbiter = RenderArbiter::new();
    arbiter.subscribe(move |id: &str| sink.borrow_mut().push(id.to_string()));

    arbiter.register("a", 0);
    arbiter.unregister("ghost");

    assert_eq!(arbiter.current_owner(), Some("a"));
    assert!(notified.borrow().is_empty());
}

/// Releasing the last surface leaves the context unowned and silent.
#[test]
fn test_release_of_last_surface_fires_no_notification() {
    let notified = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&notified);

    let mut arbiter = RenderArbiter::new();
    arbiter.subscribe(move |id: &str| sink.borrow_mut().push(id.to_string()));

    arbiter.register("only", 2);
    arbiter.unregister("only");

    assert_eq!(arbiter.current_owner(), None);
    assert!(notified.borrow().is_empty());
}

/// Every subscriber sees every promotion, not just the promoted surface.
#[test]
fn test_all_subscribers_notified() {
    let first = Rc::new(RefCell::new(Vec::new()));
    let second = Rc::new(RefCell::new(Vec::new()));

    let mut arbiter = RenderArbiter::new();
    let sink = Rc::clone(&first);
    arbiter.subscribe(move |id: &str| sink.borrow_mut().push(id.to_string()));
    let sink = Rc::clone(&second);
    arbiter.subscribe(move |id: &str| sink.borrow_mut().push(id.to_string()));

    arbiter.register("a", 0);
    arbiter.register("b", 1);
    arbiter.unregister("b");

    assert_eq!(*first.borrow(), vec!["a".to_string()]);
    assert_eq!(*second.borrow(), vec!["a".to_string()]);
}

/// The at-most-one-owner invariant holds across an arbitrary call sequence,
/// and the owner is always a registered surface.
#[test]
fn test_owner_invariant_across_sequence() {
    let mut arbiter = RenderArbiter::new();

    let calls: &[(&str, i32, bool)] = &[
        ("spectrogram", 2, true),
        ("conv1", 1, false),
        ("conv2", 1, false),
        ("waveform", 0, false),
        ("spectrogram", 2, true), // idempotent re-register
    ];
    for (id, priority, expect) in calls {
        assert_eq!(arbiter.register(id, *priority), *expect, "register {}", id);
        let owner = arbiter.current_owner().expect("owner while registry non-empty");
        assert!(arbiter.is_registered(owner));
    }

    arbiter.unregister("spectrogram");
    // conv1 and conv2 tie at priority 1; conv1 registered first
    assert_eq!(arbiter.current_owner(), Some("conv1"));

    arbiter.unregister("conv1");
    assert_eq!(arbiter.current_owner(), Some("conv2"));

    arbiter.unregister("conv2");
    assert_eq!(arbiter.current_owner(), Some("waveform"));

    arbiter.unregister("waveform");
    assert_eq!(arbiter.current_owner(), None);
}
