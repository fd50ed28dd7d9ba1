use crate::error::Result;
use crate::header::FormatConfig;
use crate::metadata::MetadataRecord;
use std::path::Path;

/// Display the chunk table of a metadata file. No key is needed
pub fn show_info(path: &Path, config: &FormatConfig) -> Result<String> {
    let data = std::fs::read(path)?;
    let record = MetadataRecord::from_bytes(&data, config)?;

    let mut output = String::new();

    output.push_str("HG Save Metadata\n");
    output.push_str("================\n\n");

    output.push_str(&format!("File: {}\n", path.display()));
    output.push_str(&format!("Magic: {:#010x}\n", record.magic));
    output.push_str(&format!("Format version: {:#x}\n", record.format_version));
    output.push_str(&format!("Max chunk size: {}\n", format_size(record.max_chunk_size as u64)));
    output.push_str(&format!("Payload digest: {}\n", hex::encode(record.payload_digest)));
    output.push('\n');

    output.push_str(&format!("Chunks: {}\n", record.chunk_count()));
    for (index, chunk) in record.chunks.iter().enumerate() {
        output.push_str(&format!(
            "  [{}] stored {} compressed {} uncompressed {} checksum {}\n",
            index,
            chunk.stored_len,
            chunk.compressed_len,
            chunk.uncompressed_len,
            hex::encode(chunk.checksum)
        ));
    }
    output.push('\n');

    output.push_str(&format!("Payload size: {}\n", format_size(record.payload_len() as u64)));
    output.push_str(&format!("Document size: {}\n", format_size(record.document_len() as u64)));

    Ok(output)
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
