//! Tests for the fixed-budget server poll loop.

use std::time::Duration;

use rstest::rstest;
use serde_json::{Value, json};

use super::{Harness, harness};
use crate::client::{PollPolicy, Record};
use crate::error::CloudError;

fn state_is(record: &Record, wanted: &str) -> bool {
    record.get("state").and_then(Value::as_str) == Some(wanted)
}

#[rstest]
fn returns_on_first_matching_poll(harness: Harness) {
    harness
        .transport
        .push_json(200, &json!({"mbpkgid": "7", "state": "building"}));
    harness
        .transport
        .push_json(200, &json!({"mbpkgid": "7", "state": "building"}));
    harness
        .transport
        .push_json(200, &json!({"mbpkgid": "7", "state": "running"}));

    let record = harness
        .client
        .server_wait_for("7", |record| state_is(record, "running"))
        .unwrap_or_else(|err| panic!("wait: {err}"));

    assert_eq!(record.get("state"), Some(&json!("running")));
    assert_eq!(harness.transport.request_count(), 3);
    assert_eq!(harness.sleeper.sleeps(), [Duration::from_secs(5); 2]);
}

#[rstest]
fn gives_up_after_sixty_attempts(harness: Harness) {
    harness
        .transport
        .set_fallback_json(200, &json!({"mbpkgid": "7", "state": "building"}));

    let err = harness
        .client
        .server_wait_for("7", |_| false)
        .expect_err("never satisfied");

    assert_eq!(
        err,
        CloudError::WaitTimeout {
            mbpkgid: String::from("7")
        }
    );
    assert!(err.to_string().contains("mbpkgid=7"));
    assert_eq!(harness.transport.request_count(), 60);
    let sleeps = harness.sleeper.sleeps();
    assert_eq!(sleeps.len(), 59);
    assert!(sleeps.iter().all(|sleep| *sleep == Duration::from_secs(5)));
}

#[rstest]
fn api_errors_are_seen_as_empty_record(harness: Harness) {
    harness
        .transport
        .push_json(200, &json!({"mbpkgid": "7", "state": "deleting"}));
    harness
        .transport
        .push_json(404, &json!({"error": {"message": "not found"}}));

    let record = harness
        .client
        .server_wait_for("7", Record::is_empty)
        .unwrap_or_else(|err| panic!("wait: {err}"));

    assert!(record.is_empty());
    assert_eq!(harness.sleeper.sleeps().len(), 1);
}

#[rstest]
fn api_errors_do_not_satisfy_state_predicates(harness: Harness) {
    harness.transport.push_raw(500, "oops");
    harness
        .transport
        .push_json(200, &json!({"mbpkgid": "7", "state": "running"}));

    let record = harness
        .client
        .server_wait_for("7", |record| state_is(record, "running"))
        .unwrap_or_else(|err| panic!("wait: {err}"));

    assert_eq!(record.get("mbpkgid"), Some(&json!("7")));
    assert_eq!(harness.transport.request_count(), 2);
}

#[rstest]
fn transport_errors_abort_the_wait(harness: Harness) {
    harness.transport.push_transport_error("connection reset");

    let err = harness
        .client
        .server_wait_for("7", |_| true)
        .expect_err("transport errors propagate");

    assert!(matches!(err, CloudError::Transport { .. }), "unexpected: {err:?}");
    assert!(harness.sleeper.sleeps().is_empty());
}

#[rstest]
fn honours_custom_poll_policy(harness: Harness) {
    let Harness {
        client,
        transport,
        sleeper,
    } = harness;
    let client = client.with_poll_policy(PollPolicy {
        attempts: 3,
        interval: Duration::from_millis(250),
    });
    transport.set_fallback_json(200, &json!({"state": "off"}));

    let err = client
        .server_wait_for("9", |record| state_is(record, "on"))
        .expect_err("never on");

    assert!(matches!(err, CloudError::WaitTimeout { .. }));
    assert_eq!(transport.request_count(), 3);
    assert_eq!(sleeper.sleeps(), [Duration::from_millis(250); 2]);
}

#[test]
fn default_policy_is_sixty_polls_five_seconds_apart() {
    assert_eq!(
        PollPolicy::default(),
        PollPolicy {
            attempts: 60,
            interval: Duration::from_secs(5),
        }
    );
}
