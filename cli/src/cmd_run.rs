//! `shipfan run`: fetch one document, fan it out and dispatch the messages.

use anyhow::{Context, Result};
use shipfan_pipeline::Pipeline;

use crate::settings::Settings;

pub async fn run(settings: &Settings, bucket: &str, key: &str, json: bool) -> Result<()> {
    let pipeline = Pipeline::from_config(&settings.pipeline).context("building pipeline")?;

    let report = pipeline
        .run(bucket, key)
        .await
        .with_context(|| format!("processing {bucket}/{key}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Source:        {bucket}/{}", report.source_file_name);
        println!("Store:         {}", report.store_identifier);
        println!("Fulfillments:  {}", report.fulfillments);
        println!("Packages:      {}", report.packages);
        println!("Messages:      {}", report.messages);
        println!("Chunks:        {}", report.chunks);
        println!("Queue:         {}", pipeline.queue_arn());
    }
    Ok(())
}
