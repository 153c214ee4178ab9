//! Tests for billing package mutations and cache invalidation.

use rstest::rstest;
use serde_json::json;

use super::{Harness, harness};
use crate::client::PackageBilling;
use crate::http::HttpMethod;

fn prime_packages(harness: &mut Harness) {
    harness
        .transport
        .push_json(200, &json!([{"id": 1, "package_status": "Active"}]));
    harness
        .client
        .packages()
        .unwrap_or_else(|err| panic!("packages: {err}"));
}

#[rstest]
fn buy_without_billing_sends_only_key(mut harness: Harness) {
    harness.transport.push_json(200, &json!({"mbpkgid": 99}));

    let response = harness
        .client
        .package_buy("VR1x1x25", PackageBilling::default())
        .unwrap_or_else(|err| panic!("buy: {err}"));

    assert_eq!(response, json!({"mbpkgid": 99}));
    let requests = harness.transport.requests();
    let [request] = requests.as_slice() else {
        panic!("expected one request");
    };
    assert_eq!(request.method, HttpMethod::Get);
    assert_eq!(request.path, "/cloud/buy/VR1x1x25");
    assert_eq!(request.query, [(String::from("key"), String::from("test-key"))]);
    assert!(request.body.is_none());
}

#[rstest]
fn buy_with_billing_sends_terms_in_query(mut harness: Harness) {
    harness.transport.push_json(200, &json!({}));

    harness
        .client
        .package_buy(
            "VR2x2x50",
            PackageBilling {
                package_billing: Some(String::from("monthly")),
                contract_id: Some(String::from("c-17")),
            },
        )
        .unwrap_or_else(|err| panic!("buy: {err}"));

    let requests = harness.transport.requests();
    let request = requests.first().unwrap_or_else(|| panic!("no request"));
    assert_eq!(request.query_value("package_billing"), Some("monthly"));
    assert_eq!(request.query_value("package_billing_contract_id"), Some("c-17"));
}

#[rstest]
fn cancel_posts_package_id_in_body(mut harness: Harness) {
    harness.transport.push_json(200, &json!({"success": true}));

    harness
        .client
        .package_cancel("1234")
        .unwrap_or_else(|err| panic!("cancel: {err}"));

    let requests = harness.transport.requests();
    let request = requests.first().unwrap_or_else(|| panic!("no request"));
    assert_eq!(request.method, HttpMethod::Post);
    assert_eq!(request.path, "/cloud/cancel");
    assert_eq!(request.body, Some(json!({"mbpkgid": "1234"})));
    assert_eq!(request.query_value("key"), Some("test-key"));
}

#[rstest]
fn unlink_sends_package_id_in_query(mut harness: Harness) {
    harness.transport.push_json(200, &json!({"success": true}));

    harness
        .client
        .package_unlink("1234")
        .unwrap_or_else(|err| panic!("unlink: {err}"));

    let requests = harness.transport.requests();
    let request = requests.first().unwrap_or_else(|| panic!("no request"));
    assert_eq!(request.method, HttpMethod::Get);
    assert_eq!(request.path, "/cloud/unlink");
    assert_eq!(request.query_value("mbpkgid"), Some("1234"));
    assert!(request.body.is_none());
}

#[rstest]
#[case::buy("buy")]
#[case::cancel("cancel")]
#[case::unlink("unlink")]
fn mutations_invalidate_package_cache(mut harness: Harness, #[case] operation: &str) {
    prime_packages(&mut harness);
    harness.transport.push_json(200, &json!({}));
    match operation {
        "buy" => harness.client.package_buy("plan", PackageBilling::default()),
        "cancel" => harness.client.package_cancel("1"),
        _ => harness.client.package_unlink("1"),
    }
    .unwrap_or_else(|err| panic!("{operation}: {err}"));

    harness
        .transport
        .push_json(200, &json!([{"id": 1}, {"id": 2}]));
    let packages = harness
        .client
        .packages()
        .unwrap_or_else(|err| panic!("packages: {err}"));

    assert_eq!(packages.len(), 2);
    assert_eq!(harness.transport.request_count(), 3);
}

#[rstest]
fn failed_mutation_still_invalidates_cache(mut harness: Harness) {
    prime_packages(&mut harness);
    harness
        .transport
        .push_json(409, &json!({"error": {"message": "already cancelled"}}));

    let err = harness
        .client
        .package_cancel("1")
        .expect_err("409 should fail");
    assert_eq!(err.status(), Some(409));

    harness.transport.push_json(200, &json!([]));
    let packages = harness
        .client
        .packages()
        .unwrap_or_else(|err| panic!("packages: {err}"));
    assert!(packages.is_empty());
    assert_eq!(
        harness.transport.request_lines(),
        ["GET /cloud/packages", "POST /cloud/cancel", "GET /cloud/packages"]
    );
}

#[rstest]
fn images_and_plans_survive_package_mutations(mut harness: Harness) {
    harness.transport.push_json(200, &json!([{"id": "img"}]));
    harness
        .client
        .images()
        .unwrap_or_else(|err| panic!("images: {err}"));
    harness.transport.push_json(200, &json!({}));
    harness
        .client
        .package_unlink("1")
        .unwrap_or_else(|err| panic!("unlink: {err}"));
    harness
        .client
        .images()
        .unwrap_or_else(|err| panic!("images: {err}"));

    assert_eq!(harness.transport.request_count(), 2);
}
