//! End-to-end session behaviour against the mock reader.

mod common;

use common::{Harness, MALFORMED_NAME_SWIPE, VISA_SWIPE};
use swipekit_hardware::{HardwareNotification, TaskStatus};
use swipekit_session::{
    ActivationOutcome, DeactivationOutcome, DomainEvent, LifecycleOutcome, ReaderState,
    SessionError, SwipeOutcome,
};

// ============================================================================
// Activation
// ============================================================================

#[tokio::test]
async fn test_activate_publishes_connection_events() {
    let mut harness = Harness::start();

    let outcome = harness.session.activate().await.unwrap();
    assert_eq!(outcome, ActivationOutcome::Activated);
    assert_eq!(outcome.as_status(), "activated");

    assert_eq!(
        harness.drain().await,
        vec![DomainEvent::Connecting, DomainEvent::Connected]
    );
    assert_eq!(harness.settle().await, ReaderState::Connected);
}

#[tokio::test]
async fn test_activate_twice_opens_hardware_once() {
    let harness = Harness::start();

    assert_eq!(
        harness.session.activate().await.unwrap(),
        ActivationOutcome::Activated
    );
    let second = harness.session.activate().await.unwrap();

    assert_eq!(second, ActivationOutcome::AlreadyActive);
    assert_eq!(second.as_status(), "activated");
    assert_eq!(harness.reader.open_count(), 1);
    assert_eq!(harness.reader.info_count(), 1);
}

#[tokio::test]
async fn test_concurrent_activations_are_serialized() {
    let harness = Harness::start();
    let other = harness.session.clone();

    let (a, b) = tokio::join!(harness.session.activate(), other.activate());
    let mut outcomes = vec![a.unwrap(), b.unwrap()];
    outcomes.sort_by_key(|o| *o == ActivationOutcome::AlreadyActive);

    assert_eq!(
        outcomes,
        vec![ActivationOutcome::Activated, ActivationOutcome::AlreadyActive]
    );
    assert_eq!(harness.reader.open_count(), 1);
}

#[tokio::test]
async fn test_activate_without_reader_is_not_fatal() {
    let mut harness = Harness::start();
    harness.reader.detach_reader();

    let outcome = harness.session.activate().await.unwrap();
    assert_eq!(outcome, ActivationOutcome::NoReaderPresent);
    assert_eq!(outcome.as_status(), "no_reader");
    assert_eq!(harness.settle().await, ReaderState::Connected);

    let swipe = harness.session.request_swipe().await.unwrap();
    assert_eq!(swipe, SwipeOutcome::NotConnected);
    assert_eq!(swipe.as_status(), "not_connected");
    assert_eq!(harness.reader.swipe_request_count(), 0);

    harness.reader.attach_reader();
    assert_eq!(harness.drain().await, vec![DomainEvent::Connected]);
    assert_eq!(
        harness.session.request_swipe().await.unwrap(),
        SwipeOutcome::Started
    );
}

#[tokio::test]
async fn test_rejected_activation_reverts_to_inactive() {
    let harness = Harness::start();
    harness.reader.set_start_status(Some(TaskStatus::MonoAudio));

    let error = harness.session.activate().await.unwrap_err();
    assert!(matches!(
        error,
        SessionError::ActivationRejected {
            status: TaskStatus::MonoAudio
        }
    ));
    assert!(!error.is_soft());
    assert_eq!(harness.settle().await, ReaderState::Inactive);
    assert_eq!(harness.reader.release_count(), 1);

    harness.reader.set_start_status(None);
    assert_eq!(
        harness.session.activate().await.unwrap(),
        ActivationOutcome::Activated
    );
    assert_eq!(harness.reader.open_count(), 2);
}

#[tokio::test]
async fn test_open_failure_reverts_to_inactive() {
    let harness = Harness::start();
    harness
        .reader
        .set_open_error(Some("audio session unavailable".to_string()));

    let error = harness.session.activate().await.unwrap_err();
    assert!(matches!(error, SessionError::Hardware(_)));
    assert_eq!(harness.settle().await, ReaderState::Inactive);
    assert_eq!(
        harness.session.deactivate().await,
        DeactivationOutcome::AlreadyInactive
    );
}

// ============================================================================
// Deactivation
// ============================================================================

#[tokio::test]
async fn test_deactivate_inactive_session_has_no_side_effects() {
    let mut harness = Harness::start();

    let outcome = harness.session.deactivate().await;
    assert_eq!(outcome, DeactivationOutcome::AlreadyInactive);
    assert_eq!(outcome.as_status(), "already_inactive");

    assert!(harness.drain().await.is_empty());
    assert_eq!(harness.reader.release_count(), 0);
    assert!(harness.session.history().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_deactivate_releases_reader_and_publishes_disconnect() {
    let mut harness = Harness::activated().await;
    harness.session.request_swipe().await.unwrap();

    let outcome = harness.session.deactivate().await;
    assert_eq!(outcome, DeactivationOutcome::Deactivated);
    assert_eq!(outcome.as_status(), "deactivated");

    assert_eq!(harness.drain().await, vec![DomainEvent::Disconnected]);
    assert_eq!(harness.settle().await, ReaderState::Inactive);
    assert_eq!(harness.reader.release_count(), 1);
    assert_eq!(harness.reader.outstanding_tasks(), 0);
}

#[tokio::test]
async fn test_deactivate_swallows_teardown_errors() {
    let harness = Harness::activated().await;
    harness.reader.set_fail_teardown(true);

    assert_eq!(
        harness.session.deactivate().await,
        DeactivationOutcome::Deactivated
    );
    assert_eq!(harness.settle().await, ReaderState::Inactive);
}

#[tokio::test]
async fn test_notification_after_deactivate_is_dropped() {
    let mut harness = Harness::activated().await;
    harness.session.deactivate().await;
    harness.drain().await;

    // The reader SDK may still call back after release.
    assert!(harness.reader.notify(HardwareNotification::Connected));
    assert!(harness.reader.notify(HardwareNotification::SwipeTimeout));

    assert!(harness.drain().await.is_empty());
    assert_eq!(harness.settle().await, ReaderState::Inactive);
}

#[tokio::test]
async fn test_reactivation_after_deactivate() {
    let mut harness = Harness::activated().await;
    harness.session.deactivate().await;
    harness.drain().await;

    assert_eq!(
        harness.session.activate().await.unwrap(),
        ActivationOutcome::Activated
    );
    assert_eq!(
        harness.drain().await,
        vec![DomainEvent::Connecting, DomainEvent::Connected]
    );
    assert_eq!(harness.reader.open_count(), 2);
}

// ============================================================================
// Swipes
// ============================================================================

#[tokio::test]
async fn test_swipe_before_activation_is_soft_error() {
    let harness = Harness::start();

    let error = harness.session.request_swipe().await.unwrap_err();
    assert!(matches!(error, SessionError::NotActivated));
    assert!(error.is_soft());
    assert_eq!(harness.settle().await, ReaderState::Inactive);
    assert_eq!(harness.reader.swipe_request_count(), 0);
}

#[tokio::test]
async fn test_successful_swipe_publishes_parsed_record() {
    let mut harness = Harness::activated().await;

    let outcome = harness.session.request_swipe().await.unwrap();
    assert_eq!(outcome, SwipeOutcome::Started);
    assert_eq!(outcome.as_status(), "started");
    assert_eq!(harness.settle().await, ReaderState::AwaitingSwipe);

    harness.reader.present_swipe(VISA_SWIPE).unwrap();
    let events = harness.drain().await;

    assert_eq!(events.len(), 2);
    assert_eq!(events[0], DomainEvent::SwipeProcessing);
    match &events[1] {
        DomainEvent::SwipeReceived(record) => {
            assert_eq!(record.card_number, "4111111111111111");
            assert_eq!(record.first_name, "JOHN");
            assert_eq!(record.last_name, "DOE");
            assert_eq!(record.expiry_year, "25");
            assert_eq!(record.expiry_month, "12");
        }
        other => panic!("Expected SwipeReceived, got {:?}", other),
    }
    assert_eq!(harness.settle().await, ReaderState::Connected);
}

#[tokio::test]
async fn test_shared_relay_cannot_interrupt_pending_swipe() {
    let mut harness = Harness::activated().await;
    harness.session.request_swipe().await.unwrap();

    let handle = harness.session.clone();
    let relay = handle.relay();
    let subscription = relay.active_subscription();
    assert!(subscription.is_some());

    let mut observer = relay.subscribe();
    let extra = relay.subscribe();
    drop(extra);
    assert_eq!(relay.active_subscription(), subscription);

    harness.reader.present_swipe(VISA_SWIPE).unwrap();
    let events = harness.drain().await;

    assert!(matches!(
        events.last(),
        Some(DomainEvent::SwipeReceived(record)) if record.last_name == "DOE"
    ));
    assert_eq!(observer.try_recv().ok(), Some(DomainEvent::SwipeProcessing));
    assert!(matches!(observer.try_recv(), Ok(DomainEvent::SwipeReceived(_))));
    assert_eq!(harness.settle().await, ReaderState::Connected);
}

#[tokio::test]
async fn test_unparseable_swipe_publishes_swipe_error() {
    let mut harness = Harness::activated().await;
    harness.session.request_swipe().await.unwrap();

    harness.reader.present_swipe(MALFORMED_NAME_SWIPE).unwrap();

    assert_eq!(
        harness.drain().await,
        vec![DomainEvent::SwipeProcessing, DomainEvent::SwipeError]
    );
    assert_eq!(harness.settle().await, ReaderState::Connected);
}

#[tokio::test]
async fn test_unreadable_swipe_publishes_swipe_error() {
    let mut harness = Harness::activated().await;
    harness.session.request_swipe().await.unwrap();

    harness.reader.present_unreadable_swipe().unwrap();

    assert_eq!(
        harness.drain().await,
        vec![DomainEvent::SwipeProcessing, DomainEvent::SwipeError]
    );
    assert_eq!(harness.settle().await, ReaderState::Connected);
}

#[tokio::test]
async fn test_swipe_timeout_returns_to_connected() {
    let mut harness = Harness::activated().await;
    harness.session.request_swipe().await.unwrap();

    harness.reader.expire_swipe().unwrap();

    assert_eq!(
        harness.drain().await,
        vec![DomainEvent::Timeout("Swipe timed out.".to_string())]
    );
    assert_eq!(harness.settle().await, ReaderState::Connected);
}

#[tokio::test]
async fn test_reader_detached_while_awaiting_swipe() {
    let mut harness = Harness::activated().await;
    harness.session.request_swipe().await.unwrap();

    harness.reader.detach_reader();

    assert_eq!(harness.drain().await, vec![DomainEvent::Disconnected]);
    assert_eq!(harness.settle().await, ReaderState::Connected);
    assert_eq!(
        harness.session.request_swipe().await.unwrap(),
        SwipeOutcome::NotConnected
    );
}

#[tokio::test]
async fn test_rapid_swipe_requests_keep_one_outstanding_task() {
    let harness = Harness::activated().await;

    let (a, b) = tokio::join!(
        harness.session.request_swipe(),
        harness.session.request_swipe()
    );
    assert_eq!(a.unwrap(), SwipeOutcome::Started);
    assert_eq!(b.unwrap(), SwipeOutcome::Started);

    assert_eq!(harness.reader.outstanding_tasks(), 1);
    assert_eq!(harness.reader.swipe_request_count(), 2);
    assert_eq!(harness.settle().await, ReaderState::AwaitingSwipe);
}

#[tokio::test]
async fn test_rejected_swipe_reverts_to_connected() {
    let harness = Harness::activated().await;
    harness.reader.set_swipe_status(Some(TaskStatus::LowVolume));

    let error = harness.session.request_swipe().await.unwrap_err();
    assert!(matches!(
        error,
        SessionError::SwipeRejected {
            status: TaskStatus::LowVolume
        }
    ));
    assert_eq!(harness.settle().await, ReaderState::Connected);
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn test_suspend_and_resume_active_session() {
    let mut harness = Harness::activated().await;

    assert_eq!(
        harness.session.suspend().await.unwrap(),
        LifecycleOutcome::Deactivated(DeactivationOutcome::Deactivated)
    );
    assert_eq!(harness.settle().await, ReaderState::Inactive);
    assert_eq!(harness.drain().await, vec![DomainEvent::Disconnected]);

    assert_eq!(
        harness.session.resume().await.unwrap(),
        LifecycleOutcome::Activated(ActivationOutcome::Activated)
    );
    assert_eq!(harness.settle().await, ReaderState::Connected);
    assert_eq!(harness.reader.open_count(), 2);

    // Lifecycle operations keep the caller's intent.
    harness.session.suspend().await.unwrap();
    assert_eq!(
        harness.session.resume().await.unwrap(),
        LifecycleOutcome::Activated(ActivationOutcome::Activated)
    );
}

#[tokio::test]
async fn test_lifecycle_ignored_when_not_wanted() {
    let harness = Harness::start();

    assert_eq!(
        harness.session.suspend().await.unwrap(),
        LifecycleOutcome::Ignored
    );
    assert_eq!(
        harness.session.resume().await.unwrap(),
        LifecycleOutcome::Ignored
    );
    assert_eq!(harness.reader.open_count(), 0);
}

#[tokio::test]
async fn test_caller_deactivation_clears_intent() {
    let harness = Harness::activated().await;
    harness.session.deactivate().await;

    assert_eq!(
        harness.session.resume().await.unwrap(),
        LifecycleOutcome::Ignored
    );
    assert_eq!(harness.settle().await, ReaderState::Inactive);
}

#[tokio::test]
async fn test_failed_resume_keeps_intent() {
    let harness = Harness::activated().await;
    harness.session.suspend().await.unwrap();

    harness.reader.set_start_status(Some(TaskStatus::LowVolume));
    assert!(matches!(
        harness.session.resume().await,
        Err(SessionError::ActivationRejected { .. })
    ));
    assert_eq!(harness.settle().await, ReaderState::Inactive);

    harness.reader.set_start_status(None);
    assert_eq!(
        harness.session.resume().await.unwrap(),
        LifecycleOutcome::Activated(ActivationOutcome::Activated)
    );
}
