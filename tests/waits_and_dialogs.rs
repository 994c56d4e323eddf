use remix_guard::clock::{Clock, ManualClock};
use remix_guard::driver::memory::{MemoryDriver, MemoryElement};
use remix_guard::driver::DialogKind;
use remix_guard::engine::Engine;
use remix_guard::error::GuardError;
use remix_guard::interaction::Condition;
use remix_guard::outcome::{OutcomeLog, Status};
use remix_guard::selectors::Locator;
use remix_guard::tools::dialog::{self, DialogAction, HandleDialogParams};
use std::sync::Arc;
use std::time::Duration;

fn setup() -> (ManualClock, Arc<MemoryDriver>, OutcomeLog, Engine) {
    let clock = ManualClock::new();
    let driver = Arc::new(MemoryDriver::new(clock.clone()));
    let log = OutcomeLog::new();
    let engine =
        Engine::new(driver.clone(), Arc::new(log.clone())).with_clock(Arc::new(clock.clone()));
    (clock, driver, log, engine)
}

// ── Element waits ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_wait_for_toast_to_disappear() {
    let (clock, driver, _log, engine) = setup();
    driver.add(
        MemoryElement::new("div")
            .with_class("toast")
            .removed_after(Duration::from_secs(2)),
    );

    let outcome = engine
        .wait_for_element_not_present(&Locator::class_name("toast"), None)
        .await
        .unwrap();

    assert_eq!(outcome.status(), Status::Success);
    assert_eq!(
        outcome.action(),
        "Wait up to 5.0 seconds for class-name toast to not be present"
    );
    assert_eq!(
        outcome.actual(),
        "Waited 2.0 seconds for class-name toast to not be present"
    );
    assert_eq!(clock.now(), Duration::from_secs(2));
}

#[tokio::test]
async fn test_wait_for_displayed_reports_missing_element() {
    let (clock, _driver, log, engine) = setup();

    let outcome = engine
        .wait_for_element_displayed(&Locator::id("ghost"), Some(Duration::from_secs(3)))
        .await
        .unwrap();

    assert_eq!(
        outcome.actual(),
        "After waiting 3.0 seconds for id ghost is not present"
    );
    assert_eq!(clock.now(), Duration::from_secs(3));
    assert_eq!(log.outcomes().await.len(), 1);
}

#[tokio::test]
async fn test_wait_for_enabled_after_late_arrival() {
    let (clock, driver, _log, engine) = setup();
    driver.add(
        MemoryElement::new("button")
            .with_id("next")
            .appears_after(Duration::from_secs(1))
            .enabled_after(Duration::from_secs(2)),
    );

    let outcome = engine
        .wait_for(&Locator::id("next"), Condition::Enabled, None)
        .await
        .unwrap();

    assert!(outcome.is_success());
    assert_eq!(clock.now(), Duration::from_secs(2));
}

#[tokio::test]
async fn test_wait_for_element_still_displayed() {
    let (_clock, driver, _log, engine) = setup();
    driver.add(MemoryElement::new("div").with_id("spinner"));

    let outcome = engine
        .wait_for_element_not_displayed(&Locator::id("spinner"), Some(Duration::from_secs(1)))
        .await
        .unwrap();

    assert_eq!(outcome.status(), Status::Failure);
    assert_eq!(
        outcome.actual(),
        "After waiting 1.0 seconds for id spinner is still displayed"
    );
}

#[tokio::test]
async fn test_zero_timeout_wait_takes_no_time() {
    let (clock, _driver, _log, engine) = setup();

    let outcome = engine
        .wait_for_element_present(&Locator::id("late"), Some(Duration::ZERO))
        .await
        .unwrap();

    assert!(!outcome.is_success());
    assert_eq!(clock.now(), Duration::ZERO);
}

#[tokio::test]
async fn test_zero_timeout_wait_checks_current_state() {
    let (clock, driver, log, engine) = setup();
    driver.add(MemoryElement::new("div").with_id("here"));

    let outcome = engine
        .wait_for_element_present(&Locator::id("here"), Some(Duration::ZERO))
        .await
        .unwrap();
    assert_eq!(outcome.status(), Status::Success, "{}", outcome);
    assert_eq!(
        outcome.actual(),
        "Waited 0.0 seconds for id here to be present"
    );

    let outcome = engine
        .wait_for_element_displayed(&Locator::id("here"), Some(Duration::ZERO))
        .await
        .unwrap();
    assert!(outcome.is_success(), "{}", outcome);
    assert_eq!(clock.now(), Duration::ZERO);
    assert_eq!(log.failures().await, 0);
}

#[tokio::test]
async fn test_wait_met_at_deadline_succeeds() {
    let (clock, driver, _log, engine) = setup();
    driver.add(
        MemoryElement::new("div")
            .with_id("banner")
            .hidden_after(Duration::from_secs(2)),
    );

    let outcome = engine
        .wait_for_element_not_displayed(&Locator::id("banner"), Some(Duration::from_secs(2)))
        .await
        .unwrap();

    assert!(outcome.is_success(), "{}", outcome);
    assert_eq!(clock.now(), Duration::from_secs(2));
}

#[tokio::test]
async fn test_wait_for_element_to_be_disabled() {
    let (clock, driver, _log, engine) = setup();
    driver.add(
        MemoryElement::new("button")
            .with_id("send")
            .disabled_after(Duration::from_millis(700)),
    );

    let outcome = engine
        .wait_for_element_not_enabled(&Locator::id("send"), None)
        .await
        .unwrap();

    assert!(outcome.is_success(), "{}", outcome);
    assert_eq!(clock.now(), Duration::from_millis(700));
}

#[tokio::test]
async fn test_pause_advances_clock() {
    let (clock, _driver, _log, engine) = setup();

    let outcome = engine.pause(Duration::from_millis(1500)).await.unwrap();

    assert_eq!(outcome.action(), "Wait 1.5 seconds");
    assert_eq!(outcome.actual(), "Waited 1.5 seconds");
    assert_eq!(clock.now(), Duration::from_millis(1500));
}

// ── Dialogs ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_wait_then_accept_alert() {
    let (clock, driver, log, engine) = setup();
    driver.open_dialog_after(DialogKind::Alert, "Saved", Duration::from_millis(1500));

    let waited = engine.wait_for_alert_present(None).await.unwrap();
    assert_eq!(
        waited.action(),
        "Wait up to 5.0 seconds for an alert to be present"
    );
    assert_eq!(waited.expected(), "An alert is present");
    assert!(waited.is_success());
    assert_eq!(clock.now(), Duration::from_millis(1500));

    assert_eq!(engine.alert_text().await.unwrap().as_deref(), Some("Saved"));
    let accepted = engine.accept_alert().await.unwrap();
    assert!(accepted.is_success());

    let handled = driver.handled_dialogs();
    assert_eq!(handled.len(), 1);
    assert!(handled[0].accepted);
    assert!(!driver.dialog_focused());
    assert_eq!(log.outcomes().await.len(), 2);
}

#[tokio::test]
async fn test_zero_timeout_dialog_wait_sees_open_alert() {
    let (clock, driver, _log, engine) = setup();
    driver.open_dialog(DialogKind::Alert, "Saved");

    let outcome = engine
        .wait_for_alert_present(Some(Duration::ZERO))
        .await
        .unwrap();

    assert!(outcome.is_success(), "{}", outcome);
    assert_eq!(
        outcome.actual(),
        "Waited 0.0 seconds for an alert to be present"
    );
    assert_eq!(clock.now(), Duration::ZERO);
}

#[tokio::test]
async fn test_missing_confirmation_fails_after_timeout() {
    let (clock, driver, _log, engine) = setup();

    let outcome = engine.wait_for_confirmation_present(Some(Duration::from_secs(2))).await.unwrap();
    assert_eq!(
        outcome.actual(),
        "After waiting 2.0 seconds, a confirmation is not present"
    );

    let outcome = engine.dismiss_confirmation().await.unwrap();
    assert_eq!(
        outcome.actual(),
        "Unable to click confirmation as it is not present"
    );
    assert_eq!(clock.now(), Duration::from_secs(7));
    assert!(driver.handled_dialogs().is_empty());
}

#[tokio::test]
async fn test_handle_prompt_types_then_accepts() {
    let (_clock, driver, log, engine) = setup();
    driver.open_dialog(DialogKind::Prompt, "Your name?");

    let params = HandleDialogParams {
        kind: DialogKind::Prompt,
        action: DialogAction::Accept,
        text: Some("Ada".into()),
        timeout_secs: None,
    };
    let outcomes = dialog::handle_dialog(&engine, &params).await.unwrap();

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].action(), "Typing text 'Ada' into prompt");
    assert_eq!(outcomes[1].actual(), "Clicked 'OK' on the prompt");
    assert_eq!(driver.handled_dialogs()[0].typed.as_deref(), Some("Ada"));
    assert_eq!(log.failures().await, 0);
}

#[tokio::test]
async fn test_handle_dialog_rejects_text_for_alert() {
    let (_clock, driver, log, engine) = setup();
    driver.open_dialog(DialogKind::Alert, "Hi");

    let params = HandleDialogParams {
        kind: DialogKind::Alert,
        action: DialogAction::Accept,
        text: Some("nope".into()),
        timeout_secs: None,
    };
    let err = dialog::handle_dialog(&engine, &params).await.unwrap_err();

    assert!(err.downcast_ref::<GuardError>().unwrap().is_configuration());
    assert!(log.outcomes().await.is_empty());
    assert!(driver.handled_dialogs().is_empty());
}

#[tokio::test]
async fn test_dialog_text_reports_closed() {
    let (_clock, _driver, _log, engine) = setup();
    let engine = engine.with_config(remix_guard::engine::GuardConfig {
        default_timeout: Duration::from_millis(200),
        poll_interval: Duration::from_millis(100),
    });

    let text = dialog::dialog_text(&engine).await.unwrap();
    assert!(!text.open);
    assert!(text.message.is_none());
}
