//! PowerDNS client and provider against a mocked HTTP API

use powerdns_dns::{
    ChangeDirective, PowerDnsClient, PowerDnsError, Provider, ProviderConfig, Record, RecordSet,
    ZoneApi,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test-key";

fn client(server: &MockServer) -> PowerDnsClient {
    PowerDnsClient::new(ProviderConfig::new(server.uri(), API_KEY)).unwrap()
}

async fn mount_zone(server: &MockServer, rrsets: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/v1/servers/localhost/zones"))
        .and(query_param("zone", "example.org."))
        .and(header("X-API-Key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "example.org.", "name": "example.org.", "kind": "Native"}
        ])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/servers/localhost/zones/example.org."))
        .and(header("X-API-Key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "example.org.",
            "name": "example.org.",
            "rrsets": rrsets
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_zone_decodes_rrsets() {
    let server = MockServer::start().await;
    mount_zone(
        &server,
        json!([{
            "name": "www.example.org.",
            "type": "A",
            "ttl": 3600,
            "records": [
                {"content": "1.2.3.4", "disabled": false},
                {"content": "5.6.7.8", "disabled": false}
            ],
            "comments": []
        }]),
    )
    .await;

    let zone = client(&server).fetch_zone("example.org.").await.unwrap();

    assert_eq!(zone.id, "example.org.");
    assert_eq!(zone.rrsets.len(), 1);
    assert_eq!(zone.rrsets[0].contents(), vec!["1.2.3.4", "5.6.7.8"]);
}

#[tokio::test]
async fn test_zone_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/servers/localhost/zones"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let result = client(&server).fetch_zone("missing.org.").await;

    assert!(matches!(result, Err(PowerDnsError::ZoneNotFound { zone }) if zone == "missing.org."));
}

#[tokio::test]
async fn test_zone_ambiguous() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/servers/localhost/zones"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "example.org.", "name": "example.org."},
            {"id": "example.org.=2Fview", "name": "example.org."}
        ])))
        .mount(&server)
        .await;

    let result = client(&server).fetch_zone("example.org.").await;

    assert!(matches!(result, Err(PowerDnsError::AmbiguousZone { count: 2, .. })));
}

#[tokio::test]
async fn test_api_error_message_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/servers/localhost/zones"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "Unauthorized"})),
        )
        .mount(&server)
        .await;

    let result = client(&server).fetch_zone("example.org.").await;

    match result {
        Err(PowerDnsError::Api { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Unauthorized");
        }
        other => panic!("expected API error, got {:?}", other.map(|z| z.name)),
    }
}

#[tokio::test]
async fn test_patch_sends_rrsets() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/servers/localhost/zones/example.org."))
        .and(header("X-API-Key", API_KEY))
        .and(body_json(json!({
            "rrsets": [
                {
                    "name": "_acme.example.org.",
                    "type": "TXT",
                    "ttl": 60,
                    "changetype": "DELETE",
                    "records": []
                }
            ]
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let rrset = RecordSet::new("_acme.example.org.", "TXT", 60, vec![])
        .with_change(ChangeDirective::Delete);

    client(&server)
        .patch_rrsets("example.org.", &[rrset])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_patch_skips_empty_directive_list() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    client(&server).patch_rrsets("example.org.", &[]).await.unwrap();
}

#[tokio::test]
async fn test_provider_append_end_to_end() {
    let server = MockServer::start().await;
    mount_zone(
        &server,
        json!([{
            "name": "www.example.org.",
            "type": "A",
            "ttl": 3600,
            "records": [{"content": "1.2.3.4", "disabled": false}]
        }]),
    )
    .await;

    Mock::given(method("PATCH"))
        .and(path("/api/v1/servers/localhost/zones/example.org."))
        .and(body_json(json!({
            "rrsets": [
                {
                    "name": "www.example.org.",
                    "type": "A",
                    "ttl": 3600,
                    "changetype": "REPLACE",
                    "records": [
                        {"content": "1.2.3.4", "disabled": false},
                        {"content": "5.6.7.8", "disabled": false}
                    ]
                },
                {
                    "name": "api.example.org.",
                    "type": "CNAME",
                    "ttl": 300,
                    "changetype": "REPLACE",
                    "records": [
                        {"content": "lb.example.net.", "disabled": false}
                    ]
                }
            ]
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let provider = Provider::new(client(&server));
    let applied = provider
        .append_records(
            "example.org",
            &[
                Record::new("www", "A", "5.6.7.8", 300),
                Record::new("api", "CNAME", "lb.example.net.", 300),
            ],
        )
        .await
        .unwrap();

    assert_eq!(applied.len(), 2);
}

#[tokio::test]
async fn test_provider_delete_last_value() {
    let server = MockServer::start().await;
    mount_zone(
        &server,
        json!([{
            "name": "_acme-challenge.example.org.",
            "type": "TXT",
            "ttl": 60,
            "records": [{"content": "\"token\"", "disabled": false}]
        }]),
    )
    .await;

    Mock::given(method("PATCH"))
        .and(body_json(json!({
            "rrsets": [
                {
                    "name": "_acme-challenge.example.org.",
                    "type": "TXT",
                    "ttl": 60,
                    "changetype": "DELETE",
                    "records": []
                }
            ]
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let provider = Provider::new(client(&server));
    let deleted = provider
        .delete_records(
            "example.org.",
            &[Record::new("_acme-challenge", "TXT", "token", 60)],
        )
        .await
        .unwrap();

    assert_eq!(deleted.len(), 1);
}

#[tokio::test]
async fn test_append_keeps_disabled_value_disabled() {
    let server = MockServer::start().await;
    mount_zone(
        &server,
        json!([{
            "name": "www.example.org.",
            "type": "A",
            "ttl": 3600,
            "records": [{"content": "1.2.3.4", "disabled": true}]
        }]),
    )
    .await;

    Mock::given(method("PATCH"))
        .and(body_json(json!({
            "rrsets": [
                {
                    "name": "www.example.org.",
                    "type": "A",
                    "ttl": 3600,
                    "changetype": "REPLACE",
                    "records": [
                        {"content": "1.2.3.4", "disabled": true},
                        {"content": "5.6.7.8", "disabled": false}
                    ]
                }
            ]
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    Provider::new(client(&server))
        .append_records("example.org", &[Record::new("www", "A", "5.6.7.8", 300)])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_keeps_disabled_value_disabled() {
    let server = MockServer::start().await;
    mount_zone(
        &server,
        json!([{
            "name": "www.example.org.",
            "type": "A",
            "ttl": 3600,
            "records": [
                {"content": "1.2.3.4", "disabled": true},
                {"content": "5.6.7.8", "disabled": false}
            ]
        }]),
    )
    .await;

    Mock::given(method("PATCH"))
        .and(body_json(json!({
            "rrsets": [
                {
                    "name": "www.example.org.",
                    "type": "A",
                    "ttl": 3600,
                    "changetype": "REPLACE",
                    "records": [
                        {"content": "1.2.3.4", "disabled": true}
                    ]
                }
            ]
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let deleted = Provider::new(client(&server))
        .delete_records("example.org", &[Record::new("www", "A", "5.6.7.8", 300)])
        .await
        .unwrap();

    assert_eq!(deleted.len(), 1);
}

#[tokio::test]
async fn test_delete_absent_value_sends_no_patch() {
    let server = MockServer::start().await;
    mount_zone(
        &server,
        json!([{
            "name": "www.example.org.",
            "type": "A",
            "ttl": 3600,
            "records": [{"content": "1.2.3.4", "disabled": false}]
        }]),
    )
    .await;

    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let deleted = Provider::new(client(&server))
        .delete_records("example.org", &[Record::new("www", "A", "9.9.9.9", 300)])
        .await
        .unwrap();

    assert!(deleted.is_empty());
}
