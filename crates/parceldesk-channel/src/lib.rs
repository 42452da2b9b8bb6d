// SPDX-FileCopyrightText: 2026 Parceldesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-ticket realtime message fan-out.
//!
//! A subscriber observes every event published to its ticket from the moment
//! of subscription onward, in publish order. There is no history replay;
//! consumers fetch the ordered message log separately and deduplicate by
//! message id.
//!
//! Delivery is best-effort: a full or closed sink never blocks delivery to
//! the other sinks of the same ticket. Closed sinks are pruned on publish.

use dashmap::DashMap;
use tokio::sync::mpsc;

use parceldesk_core::types::MessageEvent;

/// Buffered events per subscriber before publishes start dropping for it.
const SUBSCRIBER_BUFFER: usize = 64;

struct Subscriber {
    id: String,
    tx: mpsc::Sender<MessageEvent>,
}

/// One live subscription to a ticket's event stream.
///
/// Dropping the subscription closes the receiver; the registry prunes the
/// dead sink on the next publish. Callers that can, should still call
/// [`TicketChannels::unsubscribe`] so the entry is removed promptly.
pub struct Subscription {
    pub id: String,
    pub ticket_id: String,
    pub rx: mpsc::Receiver<MessageEvent>,
}

/// Registry of per-ticket subscriber lists.
#[derive(Default)]
pub struct TicketChannels {
    senders: DashMap<String, Vec<Subscriber>>,
}

impl TicketChannels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to a ticket's event stream.
    pub fn subscribe(&self, ticket_id: &str) -> Subscription {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_BUFFER);
        let id = uuid::Uuid::new_v4().to_string();
        self.senders
            .entry(ticket_id.to_string())
            .or_default()
            .push(Subscriber { id: id.clone(), tx });
        tracing::debug!(ticket_id, subscription = %id, "subscribed");
        Subscription {
            id,
            ticket_id: ticket_id.to_string(),
            rx,
        }
    }

    /// Remove one subscription. Idempotent; unknown ids are ignored.
    pub fn unsubscribe(&self, ticket_id: &str, subscription_id: &str) {
        if let Some(mut entry) = self.senders.get_mut(ticket_id) {
            entry.retain(|s| s.id != subscription_id);
            if entry.is_empty() {
                drop(entry);
                self.senders.remove_if(ticket_id, |_, subs| subs.is_empty());
            }
        }
    }

    /// Publish an event to every subscriber of its ticket.
    ///
    /// Full sinks drop this event but stay subscribed; closed sinks are
    /// pruned. Returns the number of subscribers that received the event.
    pub fn publish(&self, event: &MessageEvent) -> usize {
        let ticket_id = &event.message.ticket_id;
        let Some(mut entry) = self.senders.get_mut(ticket_id) else {
            return 0;
        };
        let mut delivered = 0;
        entry.retain(|subscriber| match subscriber.tx.try_send(event.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(
                    ticket_id,
                    subscription = %subscriber.id,
                    "subscriber buffer full, dropping event"
                );
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        });
        delivered
    }

    /// Current number of subscribers for a ticket.
    pub fn subscriber_count(&self, ticket_id: &str) -> usize {
        self.senders.get(ticket_id).map_or(0, |subs| subs.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parceldesk_core::types::{Message, Role};

    fn event(ticket_id: &str, message_id: &str) -> MessageEvent {
        MessageEvent {
            message: Message {
                seq: 1,
                id: message_id.to_string(),
                ticket_id: ticket_id.to_string(),
                author_id: "driver-1".to_string(),
                body: "package left at depot".to_string(),
                created_at: "2026-02-01T08:00:00.000Z".to_string(),
            },
            author_name: "Dina Driver".to_string(),
            author_role: Role::Driver,
        }
    }

    #[tokio::test]
    async fn subscriber_receives_events_in_publish_order() {
        let channels = TicketChannels::new();
        let mut sub = channels.subscribe("t1");

        channels.publish(&event("t1", "m1"));
        channels.publish(&event("t1", "m2"));

        assert_eq!(sub.rx.recv().await.unwrap().message.id, "m1");
        assert_eq!(sub.rx.recv().await.unwrap().message.id, "m2");
    }

    #[tokio::test]
    async fn late_subscriber_misses_earlier_events() {
        let channels = TicketChannels::new();
        channels.publish(&event("t1", "m1"));

        let mut sub = channels.subscribe("t1");
        channels.publish(&event("t1", "m2"));

        assert_eq!(sub.rx.recv().await.unwrap().message.id, "m2");
        assert!(sub.rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn events_do_not_cross_tickets() {
        let channels = TicketChannels::new();
        let mut sub_a = channels.subscribe("t1");
        let mut sub_b = channels.subscribe("t2");

        channels.publish(&event("t1", "m1"));

        assert_eq!(sub_a.rx.recv().await.unwrap().message.id, "m1");
        assert!(sub_b.rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn unsubscribe_is_idempotent() {
        let channels = TicketChannels::new();
        let sub = channels.subscribe("t1");
        assert_eq!(channels.subscriber_count("t1"), 1);

        channels.unsubscribe("t1", &sub.id);
        channels.unsubscribe("t1", &sub.id);
        channels.unsubscribe("t1", "never-existed");
        assert_eq!(channels.subscriber_count("t1"), 0);

        assert_eq!(channels.publish(&event("t1", "m1")), 0);
    }

    #[tokio::test]
    async fn closed_sinks_are_pruned_without_blocking_others() {
        let channels = TicketChannels::new();
        let dropped = channels.subscribe("t1");
        let mut alive = channels.subscribe("t1");
        drop(dropped);

        let delivered = channels.publish(&event("t1", "m1"));
        assert_eq!(delivered, 1);
        assert_eq!(channels.subscriber_count("t1"), 1);
        assert_eq!(alive.rx.recv().await.unwrap().message.id, "m1");
    }

    #[tokio::test]
    async fn full_sink_drops_event_but_stays_subscribed() {
        let channels = TicketChannels::new();
        let mut sub = channels.subscribe("t1");

        for i in 0..SUBSCRIBER_BUFFER + 5 {
            channels.publish(&event("t1", &format!("m{i}")));
        }
        assert_eq!(channels.subscriber_count("t1"), 1);

        // The buffer holds the first SUBSCRIBER_BUFFER events; the overflow
        // was dropped for this subscriber.
        let mut received = 0;
        while sub.rx.try_recv().is_ok() {
            received += 1;
        }
        assert_eq!(received, SUBSCRIBER_BUFFER);
    }
}
