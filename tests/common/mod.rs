//! Shared fixtures for integration tests: mock relays and staff pages.

#![allow(dead_code)]

use std::time::Duration;

use staff_harvest::{Options, ProxyChain, ProxyEndpoint};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Canonical page every test asks the relays for.
pub const TARGET: &str = "https://www2.ufjf.br/fisica/institucional/docentes/";

/// base64 of `ana@ufjf.br`
pub const ANA: &str = "YW5hQHVmamYuYnI=";

/// base64 of `bruno@ufjf.br`
pub const BRUNO: &str = "YnJ1bm9AdWZqZi5icg==";

/// A staff table in the current layout: one row per person, token on a button.
pub fn staff_table() -> String {
    format!(
        r#"<html><body><table class="docentes">
            <tr><th>Nome</th><th>Contato</th></tr>
            <tr><td>Ana Souza</td><td><button data-email="{ANA}">copiar</button></td></tr>
            <tr><td>Bruno Lima</td><td><button data-email="{BRUNO}">copiar</button></td></tr>
        </table></body></html>"#
    )
}

/// Markup the structural pass cannot see: tokens live inside comments.
pub fn commented_tokens() -> String {
    format!(
        r#"<div><p>Ana Souza <!-- data-email="{ANA}" --></p><p>Bruno Lima <!-- data-email="{BRUNO}" --></p></div>"#
    )
}

/// Raw relay at `{server}/{name}?url={url}`.
pub fn raw_endpoint(server: &MockServer, name: &str) -> ProxyEndpoint {
    ProxyEndpoint::raw(name, format!("{}/{name}?url={{url}}", server.uri()))
}

/// JSON-envelope relay at `{server}/{name}?url={url}` carrying the page in `contents`.
pub fn envelope_endpoint(server: &MockServer, name: &str) -> ProxyEndpoint {
    ProxyEndpoint::json_envelope(name, format!("{}/{name}?url={{url}}", server.uri()), "contents")
}

/// Options over the given endpoints with a short per-attempt deadline.
pub fn options_with(endpoints: Vec<ProxyEndpoint>, attempt_timeout: Duration) -> Options {
    Options {
        proxy_chain: ProxyChain::new(endpoints).expect("valid chain"),
        attempt_timeout,
        ..Options::default()
    }
}

/// Mounts a relay at `/{name}` answering with `response`, expecting `calls` hits.
pub async fn mount_relay(server: &MockServer, name: &str, response: ResponseTemplate, calls: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/{name}")))
        .respond_with(response)
        .expect(calls)
        .mount(server)
        .await;
}

/// 200 response with an HTML body.
pub fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body.into())
        .insert_header("content-type", "text/html; charset=utf-8")
}
