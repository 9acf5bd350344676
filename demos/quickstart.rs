//! Quick-start examples for the MK.IO Rust SDK.
//!
//! Run with:
//!   MKIO_SUBSCRIPTION=my-subscription MKIO_TOKEN=... cargo run --example quickstart
//!
//! Or pass both directly to `Client::new` (not recommended for production).

use mkio::{
    encoder_presets, Asset, ClientBuilder, ListOptions, Preset, Transform, TransformOutput,
    TransformProperties,
};

#[tokio::main]
async fn main() -> mkio::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Create a client (reads MKIO_SUBSCRIPTION and MKIO_TOKEN)
    // -----------------------------------------------------------------------
    let client = ClientBuilder::new().build()?;

    // -----------------------------------------------------------------------
    // 2. Create an asset
    // -----------------------------------------------------------------------
    let asset = client
        .assets()
        .create_or_update(
            &["quickstart-input"],
            &Asset::new("quickstart-input", "asset-quickstart-input", "mystorage"),
        )
        .await?;
    println!("Asset ready in container {:?}", asset.properties.container);

    // -----------------------------------------------------------------------
    // 3. Create a transform using a built-in preset
    // -----------------------------------------------------------------------
    let transform = Transform {
        properties: TransformProperties {
            description: Some("Single bitrate SD".into()),
            outputs: vec![TransformOutput {
                preset: Preset::built_in(encoder_presets::H264_SINGLE_BITRATE_SD),
                on_error: None,
                relative_priority: None,
            }],
            ..Default::default()
        },
        ..Default::default()
    };
    client
        .transforms()
        .create_or_update(&["quickstart-sd"], &transform)
        .await?;

    // -----------------------------------------------------------------------
    // 4. Page through assets, newest first
    // -----------------------------------------------------------------------
    let assets = client.assets();
    let opts = ListOptions::default()
        .order_by("properties/created desc")
        .top(10);

    let mut page = assets.list_page(&[], &opts).await?;
    loop {
        for asset in &page.items {
            println!("  {}", asset.name.as_deref().unwrap_or("<unnamed>"));
        }
        match page.next.take() {
            Some(cursor) => page = assets.next_page(cursor).await?,
            None => break,
        }
    }

    // -----------------------------------------------------------------------
    // 5. Handle a missing resource
    // -----------------------------------------------------------------------
    match client.assets().get(&["does-not-exist"]).await {
        Err(e) if e.is_not_found() => println!("Not found: {}", e.detail().unwrap_or("-")),
        Err(e) => return Err(e),
        Ok(_) => println!("Unexpectedly found the asset"),
    }

    // -----------------------------------------------------------------------
    // 6. Clean up
    // -----------------------------------------------------------------------
    client.transforms().delete(&["quickstart-sd"]).await?;
    client.assets().delete(&["quickstart-input"]).await?;

    Ok(())
}
