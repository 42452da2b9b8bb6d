// SPDX-FileCopyrightText: 2026 Parceldesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests driving the full desk stack through [`TestHarness`].

use chrono::Months;

use parceldesk_core::types::{Role, TicketStatus};
use parceldesk_core::{Clock, DeskError};
use parceldesk_test_utils::TestHarness;

#[tokio::test]
async fn closed_ticket_is_archived_after_retention_window() {
    let h = TestHarness::builder().build().await.unwrap();

    let ticket = h
        .service
        .create_ticket(&h.admin, TestHarness::sample_ticket(541))
        .await
        .unwrap();
    let closed = h
        .service
        .set_status(&h.admin, &ticket.id, TicketStatus::Closed, ticket.version)
        .await
        .unwrap();

    // Fresh closure does not qualify.
    let summary = h.engine.run().await.unwrap();
    assert_eq!(summary.archived, 0);

    h.clock.set(h.clock.now() + Months::new(3));
    let summary = h.engine.run().await.unwrap();
    assert_eq!(summary.archived, 1);
    assert_eq!(summary.skipped, 0);

    // Moved, not copied: gone from the active store, identical in the archive.
    let err = h.service.get_ticket(&h.admin, &ticket.id).await.unwrap_err();
    assert!(matches!(err, DeskError::NotFound { .. }));
    let archived = h
        .service
        .get_archived(&h.admin, &ticket.id)
        .await
        .unwrap();
    assert_eq!(archived.ticket, closed);

    // Exactly one log row, and a second run archives zero.
    assert_eq!(h.service.archive_log(&h.admin, 10).await.unwrap().len(), 1);
    let summary = h.engine.run().await.unwrap();
    assert_eq!(summary.archived, 0);
    assert_eq!(h.service.archive_log(&h.admin, 10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn reclosing_a_closed_ticket_is_a_noop() {
    let h = TestHarness::builder().build().await.unwrap();

    let ticket = h
        .service
        .create_ticket(&h.admin, TestHarness::sample_ticket(541))
        .await
        .unwrap();
    let closed = h
        .service
        .set_status(&h.admin, &ticket.id, TicketStatus::Closed, ticket.version)
        .await
        .unwrap();
    let closed_at = closed.closed_at.clone().unwrap();

    h.clock.advance(chrono::Duration::hours(2));
    let again = h
        .service
        .set_status(&h.admin, &ticket.id, TicketStatus::Closed, closed.version)
        .await
        .unwrap();

    // closed_at and version are untouched by the repeat request.
    assert_eq!(again.closed_at.as_deref(), Some(closed_at.as_str()));
    assert_eq!(again.version, closed.version);
}

#[tokio::test]
async fn audit_trail_follows_the_service_clock() {
    let h = TestHarness::builder().build().await.unwrap();

    let ticket = h
        .service
        .create_ticket(&h.driver, TestHarness::sample_ticket(541))
        .await
        .unwrap();

    h.clock.advance(chrono::Duration::hours(2));
    let closed = h
        .service
        .set_status(&h.admin, &ticket.id, TicketStatus::Closed, ticket.version)
        .await
        .unwrap();

    // History and notification rows are stamped with the clock the mutation
    // used, not with database time.
    let trail = h.service.history(&h.admin, &ticket.id).await.unwrap();
    assert_eq!(trail.len(), 2);
    assert_eq!(trail[0].created_at, ticket.created_at);
    assert_eq!(trail[1].created_at, closed.updated_at);
    assert_eq!(trail[1].created_at, h.clock.now_timestamp());

    let unread = h.service.notifications(&h.driver, true).await.unwrap();
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0].created_at, closed.updated_at);
}

#[tokio::test]
async fn late_subscriber_sees_only_later_messages_exactly_once() {
    let h = TestHarness::builder().build().await.unwrap();

    let ticket = h
        .service
        .create_ticket(&h.admin, TestHarness::sample_ticket(541))
        .await
        .unwrap();

    h.service
        .post_message(&h.admin, &ticket.id, "before subscription")
        .await
        .unwrap();

    let mut subscription = h.channels.subscribe(&ticket.id);

    h.service
        .post_message(&h.driver, &ticket.id, "after subscription")
        .await
        .unwrap();

    let event = subscription.rx.recv().await.unwrap();
    assert_eq!(event.message.body, "after subscription");
    assert_eq!(event.author_name, "Dina Driver");
    assert_eq!(event.author_role, Role::Driver);

    // Nothing else is pending; the pre-subscription message never arrives.
    assert!(subscription.rx.try_recv().is_err());

    h.channels.unsubscribe(&ticket.id, &subscription.id);
}

#[tokio::test]
async fn message_notifies_the_other_party_once() {
    let h = TestHarness::builder().build().await.unwrap();

    let ticket = h
        .service
        .create_ticket(&h.driver, TestHarness::sample_ticket(541))
        .await
        .unwrap();
    let baseline = h.service.unread_count(&h.driver).await.unwrap();

    // Admin replies on the driver's ticket.
    h.service
        .post_message(&h.admin, &ticket.id, "we are on it")
        .await
        .unwrap();

    assert_eq!(
        h.service.unread_count(&h.driver).await.unwrap(),
        baseline + 1
    );
    // The author gets no notification for their own message.
    assert_eq!(h.service.unread_count(&h.admin).await.unwrap(), 0);
}

#[tokio::test]
async fn unread_count_never_goes_negative() {
    let h = TestHarness::builder().build().await.unwrap();

    let ticket = h
        .service
        .create_ticket(&h.driver, TestHarness::sample_ticket(541))
        .await
        .unwrap();
    h.service
        .post_message(&h.admin, &ticket.id, "update")
        .await
        .unwrap();
    assert!(h.service.unread_count(&h.driver).await.unwrap() > 0);

    let flipped = h.service.mark_all_read(&h.driver).await.unwrap();
    assert!(flipped > 0);
    assert_eq!(h.service.unread_count(&h.driver).await.unwrap(), 0);

    // Marking again flips nothing and the count stays at zero.
    assert_eq!(h.service.mark_all_read(&h.driver).await.unwrap(), 0);
    assert_eq!(h.service.unread_count(&h.driver).await.unwrap(), 0);
}

#[tokio::test]
async fn messages_keep_posting_order_under_a_frozen_clock() {
    let h = TestHarness::builder().build().await.unwrap();

    let ticket = h
        .service
        .create_ticket(&h.admin, TestHarness::sample_ticket(541))
        .await
        .unwrap();

    // The manual clock does not move, so every message shares one
    // created_at and ordering falls back to the sequence number.
    for body in ["first", "second", "third"] {
        h.service
            .post_message(&h.admin, &ticket.id, body)
            .await
            .unwrap();
    }

    let thread = h.service.messages(&h.admin, &ticket.id).await.unwrap();
    let bodies: Vec<&str> = thread.iter().map(|m| m.body.as_str()).collect();
    assert_eq!(bodies, ["first", "second", "third"]);
    assert!(thread.windows(2).all(|w| w[0].seq < w[1].seq));
    assert_eq!(thread[0].created_at, thread[2].created_at);
}

#[tokio::test]
async fn invalid_due_date_and_missing_ticket_are_rejected() {
    let h = TestHarness::builder().build().await.unwrap();

    let mut input = TestHarness::sample_ticket(541);
    input.due_before = "2026-01-20".into();
    let err = h.service.create_ticket(&h.admin, input).await.unwrap_err();
    assert!(matches!(err, DeskError::Validation(_)));

    let err = h
        .service
        .get_ticket(&h.admin, "no-such-ticket")
        .await
        .unwrap_err();
    assert!(matches!(err, DeskError::NotFound { .. }));
}

#[tokio::test]
async fn stale_version_is_a_conflict() {
    let h = TestHarness::builder().build().await.unwrap();

    let ticket = h
        .service
        .create_ticket(&h.admin, TestHarness::sample_ticket(541))
        .await
        .unwrap();
    h.service
        .set_status(&h.admin, &ticket.id, TicketStatus::InProgress, ticket.version)
        .await
        .unwrap();

    let err = h
        .service
        .set_status(&h.admin, &ticket.id, TicketStatus::Closed, ticket.version)
        .await
        .unwrap_err();
    assert!(matches!(err, DeskError::Conflict { .. }));
}

#[tokio::test]
async fn drivers_are_confined_to_their_circuit() {
    let h = TestHarness::builder().build().await.unwrap();

    let ticket = h
        .service
        .create_ticket(&h.driver, TestHarness::sample_ticket(541))
        .await
        .unwrap();

    let err = h
        .service
        .get_ticket(&h.other_driver, &ticket.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DeskError::Unauthorized));

    // Listing for the off-circuit driver forces their own circuit.
    let listed = h
        .service
        .list_tickets(&h.other_driver, Default::default())
        .await
        .unwrap();
    assert!(listed.is_empty());
}
