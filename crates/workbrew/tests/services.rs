//! Service tests against a mockito server

use std::time::Duration;

use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use workbrew::{
    CreateBrewCommandRequest, CreateBrewfileRequest, EventFilter, MessageResponse,
    RequestContext, TransportConfig, UpdateBrewfileRequest, WorkbrewClient,
};

fn client(server: &ServerGuard) -> WorkbrewClient {
    WorkbrewClient::new(
        TransportConfig::new("secret", "acme")
            .with_base_url(server.url())
            .with_retry_count(0)
            .with_retry_wait(Duration::from_millis(1), Duration::from_millis(1)),
    )
    .unwrap()
}

#[tokio::test]
async fn test_devices_list() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/workspaces/acme/devices.json")
        .match_header("authorization", "Bearer secret")
        .match_header("accept", "application/json")
        .match_header("x-workbrew-api-version", "v0")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!([
                {"serial_number": "C02AAA", "groups": ["eng"], "formulae_count": 12},
                {"serial_number": "C02BBB"}
            ])
            .to_string(),
        )
        .create_async()
        .await;

    let devices = client(&server)
        .devices()
        .list(&RequestContext::new())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(devices.data.len(), 2);
    assert_eq!(devices.data[0].serial_number, "C02AAA");
    assert_eq!(devices.data[0].formulae_count, 12);
    assert!(devices.data[1].groups.is_empty());
}

#[tokio::test]
async fn test_csv_export_is_raw() {
    let mut server = Server::new_async().await;
    let csv = "name,devices\ngit,3\n";
    let mock = server
        .mock("GET", "/workspaces/acme/formulae.csv")
        .match_header("accept", "text/csv")
        .with_status(200)
        .with_header("content-type", "text/csv; charset=utf-8")
        .with_body(csv)
        .create_async()
        .await;

    let export = client(&server)
        .formulae()
        .list_csv(&RequestContext::new())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(&export.data[..], csv.as_bytes());
    assert_eq!(export.response.status_code, 200);
}

#[tokio::test]
async fn test_every_listing_hits_its_endpoint() {
    let mut server = Server::new_async().await;
    let resources = [
        "analytics",
        "brew_commands",
        "brew_command_runs",
        "brew_configurations",
        "brew_taps",
        "brewfiles",
        "casks",
        "device_groups",
        "devices",
        "events",
        "formulae",
        "licenses",
        "vulnerabilities",
        "vulnerability_changes",
    ];
    let mut mocks = Vec::new();
    for resource in resources {
        mocks.push(
            server
                .mock("GET", format!("/workspaces/acme/{resource}.json").as_str())
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body("[]")
                .expect(1)
                .create_async()
                .await,
        );
    }

    let client = client(&server);
    let ctx = RequestContext::new();
    assert!(client.analytics().list(&ctx).await.unwrap().data.is_empty());
    assert!(client.brew_commands().list(&ctx).await.unwrap().data.is_empty());
    assert!(client.brew_command_runs().list(&ctx).await.unwrap().data.is_empty());
    assert!(client.brew_configurations().list(&ctx).await.unwrap().data.is_empty());
    assert!(client.brew_taps().list(&ctx).await.unwrap().data.is_empty());
    assert!(client.brewfiles().list(&ctx).await.unwrap().data.is_empty());
    assert!(client.casks().list(&ctx).await.unwrap().data.is_empty());
    assert!(client.device_groups().list(&ctx).await.unwrap().data.is_empty());
    assert!(client.devices().list(&ctx).await.unwrap().data.is_empty());
    assert!(client.events().list(&ctx, None).await.unwrap().data.is_empty());
    assert!(client.formulae().list(&ctx).await.unwrap().data.is_empty());
    assert!(client.licenses().list(&ctx).await.unwrap().data.is_empty());
    assert!(client.vulnerabilities().list(&ctx).await.unwrap().data.is_empty());
    assert!(client.vulnerability_changes().list(&ctx).await.unwrap().data.is_empty());

    for mock in mocks {
        mock.assert_async().await;
    }
}

#[tokio::test]
async fn test_events_filter_query() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/workspaces/acme/events.json")
        .match_query(Matcher::UrlEncoded("filter".into(), "audit_log".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!([{"id": "evt_1", "event_type": "brewfile.created"}]).to_string())
        .create_async()
        .await;

    let events = client(&server)
        .events()
        .list(&RequestContext::new(), Some(EventFilter::AuditLog))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(events.data[0].event_type, "brewfile.created");
}

#[tokio::test]
async fn test_brewfile_lifecycle() {
    let mut server = Server::new_async().await;
    let create = server
        .mock("POST", "/workspaces/acme/brewfiles.json")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({"label": "base", "content": "brew \"git\""})))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"Brewfile created"}"#)
        .create_async()
        .await;
    let update = server
        .mock("PUT", "/workspaces/acme/brewfiles/base.json")
        .match_body(Matcher::Json(json!({"content": "brew \"wget\""})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"Brewfile updated"}"#)
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", "/workspaces/acme/brewfiles/base.json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"Brewfile deleted"}"#)
        .create_async()
        .await;

    let brewfiles = client(&server).brewfiles();
    let ctx = RequestContext::new();

    let created = brewfiles
        .create(&ctx, &CreateBrewfileRequest::new("base", "brew \"git\""))
        .await
        .unwrap();
    assert_eq!(created.data.message, "Brewfile created");
    assert_eq!(created.response.status_code, 201);

    let updated = brewfiles
        .update(
            &ctx,
            "base",
            &UpdateBrewfileRequest {
                content: "brew \"wget\"".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.data.message, "Brewfile updated");

    let deleted = brewfiles.delete(&ctx, "base").await.unwrap();
    assert_eq!(deleted.data.message, "Brewfile deleted");

    create.assert_async().await;
    update.assert_async().await;
    delete.assert_async().await;
}

#[tokio::test]
async fn test_brewfile_delete_no_content() {
    let mut server = Server::new_async().await;
    let delete = server
        .mock("DELETE", "/workspaces/acme/brewfiles/base.json")
        .with_status(204)
        .create_async()
        .await;

    let deleted = client(&server)
        .brewfiles()
        .delete(&RequestContext::new(), "base")
        .await
        .unwrap();

    assert_eq!(deleted.response.status_code, 204);
    assert!(deleted.response.is_empty());
    assert_eq!(deleted.data, MessageResponse::default());
    delete.assert_async().await;
}

#[tokio::test]
async fn test_brewfile_runs_label_is_encoded() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/workspaces/acme/brewfiles/team%20base/runs.json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!([{"label": "team base", "device": "C02AAA", "success": true}]).to_string())
        .create_async()
        .await;

    let runs = client(&server)
        .brewfiles()
        .list_runs(&RequestContext::new(), "team base")
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(runs.data[0].success, Some(true));
}

#[tokio::test]
async fn test_brew_command_create_and_runs() {
    let mut server = Server::new_async().await;
    let create = server
        .mock("POST", "/workspaces/acme/brew_commands.json")
        .match_body(Matcher::Json(json!({"arguments": "upgrade", "recurrence": "daily"})))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"Brew command scheduled"}"#)
        .create_async()
        .await;
    let runs = server
        .mock("GET", "/workspaces/acme/brew_commands/nightly-upgrade/runs.csv")
        .match_header("accept", "text/csv")
        .with_status(200)
        .with_header("content-type", "text/csv")
        .with_body("device,success\nC02AAA,true\n")
        .create_async()
        .await;

    let commands = client(&server).brew_commands();
    let ctx = RequestContext::new();

    let scheduled = commands
        .create(
            &ctx,
            &CreateBrewCommandRequest {
                arguments: "upgrade".to_string(),
                recurrence: Some("daily".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(scheduled.data.message, "Brew command scheduled");

    let export = commands.list_runs_csv(&ctx, "nightly-upgrade").await.unwrap();
    assert!(export.data.starts_with(b"device,success"));

    create.assert_async().await;
    runs.assert_async().await;
}

#[tokio::test]
async fn test_free_tier_restriction_propagates() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/workspaces/acme/vulnerabilities.json")
        .with_status(403)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"Please upgrade your plan to access vulnerabilities"}"#)
        .create_async()
        .await;

    let err = client(&server)
        .vulnerabilities()
        .list(&RequestContext::new())
        .await
        .unwrap_err();

    assert!(err.is_forbidden());
    assert!(err.is_free_tier_restriction());
    assert_eq!(err.api_error().unwrap().endpoint, "/vulnerabilities.json");
}

#[tokio::test]
async fn test_unauthorized_propagates() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/workspaces/acme/licenses.csv")
        .with_status(401)
        .with_body("")
        .create_async()
        .await;

    let err = client(&server)
        .licenses()
        .list_csv(&RequestContext::new())
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert!(!err.api_error().unwrap().message.is_empty());
}
