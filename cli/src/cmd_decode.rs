//! `shipfan decode`: decode a local file without touching the network.

use std::path::Path;

use anyhow::{Context, Result};
use shipfan_core::{decode, fan_out};

pub fn run(file: &str, messages: bool) -> Result<()> {
    println!("{}", render(file, messages)?);
    Ok(())
}

/// Pretty JSON of the parsed batch, or of the derived messages.
fn render(file: &str, messages: bool) -> Result<String> {
    let xml = std::fs::read_to_string(file).with_context(|| format!("reading {file}"))?;
    let source_name = Path::new(file)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file);

    let batch = decode(&xml, source_name).with_context(|| format!("decoding {file}"))?;
    let out = if messages {
        serde_json::to_string_pretty(&fan_out(&batch, source_name)?)?
    } else {
        serde_json::to_string_pretty(&batch)?
    };
    Ok(out)
}
