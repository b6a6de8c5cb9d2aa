//! URLs and form bodies of the three TLCP requests the client sends.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::protocol::PROTOCOL_VERSION;
use crate::subscription::{Subscription, SubscriptionId};

pub(crate) const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Characters left as-is in form values, as browsers do.
const FORM_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'*');

fn endpoint(base: &str, request: &str) -> String {
    format!(
        "{}/lightstreamer/{request}.txt?LS_protocol={PROTOCOL_VERSION}",
        base.trim_end_matches('/')
    )
}

pub(crate) fn create_session_url(server: &str) -> String {
    endpoint(server, "create_session")
}

pub(crate) fn bind_session_url(base: &str) -> String {
    endpoint(base, "bind_session")
}

pub(crate) fn control_url(base: &str) -> String {
    endpoint(base, "control")
}

/// Base address for requests inside a session. A control link from CONOK
/// replaces the host and keeps the scheme of the configured server.
pub(crate) fn session_base(server: &str, control_link: Option<&str>) -> String {
    match control_link {
        None => server.trim_end_matches('/').to_string(),
        Some(link) if link.contains("://") => link.trim_end_matches('/').to_string(),
        Some(link) => {
            let scheme = server.split_once("://").map_or("https", |(s, _)| s);
            format!("{scheme}://{}", link.trim_end_matches('/'))
        }
    }
}

fn encode(params: &[(&str, &str)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{k}={}", utf8_percent_encode(v, FORM_VALUE)))
        .collect::<Vec<_>>()
        .join("&")
}

pub(crate) fn create_session_body(adapter_set: &str, client_id: &str) -> String {
    encode(&[
        ("LS_adapter_set", adapter_set),
        ("LS_cid", client_id),
        ("LS_send_sync", "false"),
    ])
}

pub(crate) fn bind_session_body(session_id: &str) -> String {
    encode(&[("LS_session", session_id), ("LS_send_sync", "false")])
}

pub(crate) fn add_subscription_body(
    session_id: &str,
    request_id: u64,
    id: SubscriptionId,
    subscription: &Subscription,
) -> String {
    let req_id = request_id.to_string();
    let sub_id = id.to_string();
    let group = subscription.group();
    let schema = subscription.schema();
    let snapshot = if subscription.snapshot { "true" } else { "false" };

    let params = [
        ("LS_reqId", req_id.as_str()),
        ("LS_op", "add"),
        ("LS_subId", sub_id.as_str()),
        ("LS_mode", "MERGE"),
        ("LS_group", group.as_str()),
        ("LS_schema", schema.as_str()),
        ("LS_snapshot", snapshot),
        ("LS_session", session_id),
    ];
    encode(&params)
}
