use tk_core::AgentId;

use crate::MessageBus;

#[test]
fn posted_messages_are_not_visible_until_deliver_phase() {
    let bus = MessageBus::new();
    bus.post(AgentId(1), AgentId(0), vec![1]).unwrap();
    assert!(bus.inbox(AgentId(0)).is_empty());
}

#[test]
fn deliver_phase_makes_messages_visible_once() {
    let mut bus = MessageBus::new();
    bus.post(AgentId(1), AgentId(0), vec![1]).unwrap();
    bus.deliver_phase(|_| true);
    assert_eq!(bus.inbox(AgentId(0)).len(), 1);
    assert_eq!(bus.inbox(AgentId(0))[0].payload, vec![1]);

    // A second deliver_phase with nothing newly posted clears the old inbox.
    bus.deliver_phase(|_| true);
    assert!(bus.inbox(AgentId(0)).is_empty());
}

#[test]
fn delivery_order_is_stable_by_sender_then_sequence() {
    let bus = MessageBus::new();
    bus.post(AgentId(2), AgentId(0), vec![20]).unwrap();
    bus.post(AgentId(1), AgentId(0), vec![10]).unwrap();
    bus.post(AgentId(1), AgentId(0), vec![11]).unwrap();

    let mut bus = bus;
    bus.deliver_phase(|_| true);
    let payloads: Vec<u8> = bus.inbox(AgentId(0)).iter().map(|e| e.payload[0]).collect();
    assert_eq!(payloads, vec![10, 11, 20]);
}

#[test]
fn messages_to_removed_targets_are_dropped_and_counted() {
    let mut bus = MessageBus::new();
    bus.post(AgentId(1), AgentId(5), vec![9]).unwrap();
    bus.deliver_phase(|target| target != AgentId(5));
    assert!(bus.inbox(AgentId(5)).is_empty());
    assert_eq!(bus.dropped_count(), 1);
}

#[test]
fn posting_to_invalid_target_is_rejected() {
    let bus = MessageBus::new();
    let err = bus.post(AgentId(1), AgentId::INVALID, vec![]);
    assert!(err.is_err());
}

#[test]
fn take_inbox_drains_and_clears() {
    let mut bus = MessageBus::new();
    bus.post(AgentId(1), AgentId(0), vec![1]).unwrap();
    bus.deliver_phase(|_| true);
    let taken = bus.take_inbox(AgentId(0));
    assert_eq!(taken.len(), 1);
    assert!(bus.inbox(AgentId(0)).is_empty());
}
