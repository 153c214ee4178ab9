//! Unit tests for the cloud API client.

use rstest::{fixture, rstest};
use serde_json::{Value, json};

use crate::client::CloudClient;
use crate::error::CloudError;
use crate::http::{HttpMethod, ParamMode, Params};
use crate::test_support::{EnvGuard, RecordingSleeper, ScriptedTransport};

mod package;
mod wait;

const ENDPOINT: &str = "https://api.example.test";

type TestClient = CloudClient<ScriptedTransport, RecordingSleeper>;

struct Harness {
    client: TestClient,
    transport: ScriptedTransport,
    sleeper: RecordingSleeper,
}

#[fixture]
fn harness() -> Harness {
    let transport = ScriptedTransport::new();
    let sleeper = RecordingSleeper::new();
    let client = CloudClient::with_transport(
        "test-key",
        ENDPOINT,
        transport.clone(),
        sleeper.clone(),
    );
    Harness {
        client,
        transport,
        sleeper,
    }
}

fn object(value: Value) -> Params {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

#[rstest]
fn request_returns_body_verbatim(harness: Harness) {
    let body = json!({"anything": [1, {"nested": true}]});
    harness.transport.push_json(200, &body);

    let value = harness
        .client
        .request(HttpMethod::Get, "/cloud/custom", ParamMode::Query, Params::new())
        .unwrap_or_else(|err| panic!("request should succeed: {err}"));

    assert_eq!(value, body);
}

#[rstest]
fn request_strips_nulls_in_both_modes(harness: Harness) {
    harness.transport.push_json(200, &json!({}));
    harness.transport.push_json(200, &json!({}));

    for mode in [ParamMode::Query, ParamMode::Body] {
        harness
            .client
            .request(
                HttpMethod::Post,
                "/cloud/custom",
                mode,
                object(json!({"keep": "yes", "drop": null})),
            )
            .unwrap_or_else(|err| panic!("request should succeed: {err}"));
    }

    let requests = harness.transport.requests();
    let [query, body] = requests.as_slice() else {
        panic!("expected two requests, got {}", requests.len());
    };
    assert_eq!(query.query_value("keep"), Some("yes"));
    assert_eq!(query.query_value("drop"), None);
    assert!(query.body.is_none());
    assert_eq!(body.body, Some(json!({"keep": "yes"})));
    assert_eq!(body.query_value("drop"), None);
    for request in &requests {
        assert_eq!(request.query_value("key"), Some("test-key"));
    }
}

#[rstest]
fn request_maps_error_message_and_status(harness: Harness) {
    harness
        .transport
        .push_json(403, &json!({"error": {"message": "bad key"}}));

    let err = harness
        .client
        .request(HttpMethod::Get, "/cloud/servers", ParamMode::Query, Params::new())
        .expect_err("403 should fail");

    assert_eq!(err.status(), Some(403));
    let rendered = err.to_string();
    assert!(rendered.contains("bad key"), "rendered: {rendered}");
    assert!(rendered.contains("403"), "rendered: {rendered}");
    assert_eq!(rendered, "failed GET /cloud/servers - (403) bad key");
}

#[rstest]
fn request_tolerates_unparseable_error_body(harness: Harness) {
    harness.transport.push_raw(502, "<html>bad gateway</html>");

    let err = harness
        .client
        .request(HttpMethod::Post, "/cloud/cancel", ParamMode::Body, Params::new())
        .expect_err("502 should fail");

    assert_eq!(
        err,
        CloudError::Api {
            method: HttpMethod::Post,
            path: String::from("/cloud/cancel"),
            status: 502,
            message: String::new(),
        }
    );
}

#[rstest]
fn request_surfaces_transport_failures_separately(harness: Harness) {
    harness.transport.push_transport_error("connection refused");

    let err = harness
        .client
        .request(HttpMethod::Get, "/cloud/images", ParamMode::Query, Params::new())
        .expect_err("transport failure should fail");

    assert!(
        matches!(err, CloudError::Transport { ref message, .. } if message == "connection refused"),
        "unexpected error: {err:?}"
    );
    assert_eq!(err.status(), None);
}

#[rstest]
fn request_rejects_non_json_success_body(harness: Harness) {
    harness.transport.push_raw(200, "OK");

    let err = harness
        .client
        .request(HttpMethod::Get, "/cloud/images", ParamMode::Query, Params::new())
        .expect_err("plain text should not decode");

    assert!(matches!(err, CloudError::Decode { .. }), "unexpected error: {err:?}");
}

#[rstest]
fn request_reads_empty_success_body_as_null(harness: Harness) {
    harness.transport.push_raw(204, "");

    let value = harness
        .client
        .request(HttpMethod::Post, "/cloud/server/start/1", ParamMode::Body, Params::new())
        .unwrap_or_else(|err| panic!("request should succeed: {err}"));

    assert_eq!(value, Value::Null);
}

#[test]
fn endpoint_trailing_slash_is_trimmed() {
    let transport = ScriptedTransport::new();
    transport.push_json(200, &json!([]));
    let client = CloudClient::with_transport(
        "k",
        "http://10.0.0.1:8080/",
        transport.clone(),
        RecordingSleeper::new(),
    );

    client
        .servers()
        .unwrap_or_else(|err| panic!("servers should succeed: {err}"));

    let urls: Vec<String> = transport
        .requests()
        .into_iter()
        .map(|request| request.url)
        .collect();
    assert_eq!(urls, ["http://10.0.0.1:8080/cloud/servers"]);
    assert_eq!(client.endpoint(), "http://10.0.0.1:8080");
}

#[test]
fn api_key_falls_back_to_environment() {
    let _guard = EnvGuard::set_vars(&[("HV_API_KEY", Some("from-env"))]);
    let client = CloudClient::new(None).unwrap_or_else(|err| panic!("client: {err}"));
    assert_eq!(client.api_key(), "from-env");

    let explicit = CloudClient::new(Some(String::from("explicit")))
        .unwrap_or_else(|err| panic!("client: {err}"));
    assert_eq!(explicit.api_key(), "explicit");
}

#[test]
fn api_key_defaults_to_empty_without_environment() {
    let _guard = EnvGuard::set_vars(&[("HV_API_KEY", None)]);
    let client = CloudClient::new(None).unwrap_or_else(|err| panic!("client: {err}"));
    assert_eq!(client.api_key(), "");
}
