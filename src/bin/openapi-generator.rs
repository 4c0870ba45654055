//! Print the coordinator's OpenAPI document so presentation clients can be generated offline.

use anyhow::Context;
use strategy_coordinator::services::documentation::ApiDoc;
use utoipa::OpenApi;

fn main() -> anyhow::Result<()> {
    let doc = ApiDoc::openapi()
        .to_pretty_json()
        .context("serializing OpenAPI document")?;
    println!("{doc}");
    Ok(())
}
