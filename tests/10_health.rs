mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let res = server.client.get(server.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["status"], "ok", "unexpected body: {}", body);
    Ok(())
}

#[tokio::test]
async fn root_is_public() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let res = server.client.get(server.url("/")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["name"], "Farm API");
    assert!(body["data"]["endpoints"]["farms"].is_string());
    Ok(())
}
