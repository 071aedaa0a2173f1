use bytes::Bytes;
use reqwest::Client;
use sassign_core::{Context, Result};
use sassign_http_send_reqwest::ReqwestHttpSend;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    // The delegated key request inherits this client's timeout.
    let client = Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent("sassign-example/1.0")
        .build()
        .map_err(|e| sassign_core::Error::unexpected("failed to build client").with_source(e))?;

    let ctx = Context::new().with_http_send(ReqwestHttpSend::new(client));

    let req = http::Request::builder()
        .method("GET")
        .uri("https://httpbin.org/get")
        .body(Bytes::new())?;

    let resp = ctx.http_send_as_string(req).await?;
    println!("Response status: {}", resp.status());
    println!("Response body: {}", resp.body());

    Ok(())
}
