use crate::container::EncodedArchive;
use crate::error::Result;
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Read the metadata and payload files of one archive
pub fn read_archive(metadata_path: &Path, payload_path: &Path) -> Result<(Vec<u8>, Vec<u8>)> {
    let metadata = read_file(metadata_path)?;
    let payload = read_file(payload_path)?;
    debug!(
        metadata = %metadata_path.display(),
        payload = %payload_path.display(),
        metadata_bytes = metadata.len(),
        payload_bytes = payload.len(),
        "read archive"
    );
    Ok((metadata, payload))
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let mut data = Vec::with_capacity(file.metadata()?.len() as usize);
    file.read_to_end(&mut data)?;
    Ok(data)
}

/// Write bytes to a temp file next to `path`, flushed and synced, without
/// touching `path` itself. Dropping the result removes the temp file.
fn stage(path: &Path, data: &[u8]) -> Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(staged.as_file_mut());
        writer.write_all(data)?;
        writer.flush()?;
    }
    staged.as_file().sync_all()?;
    Ok(staged)
}

/// Replace `path` with `data` atomically
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let staged = stage(path, data)?;
    staged.persist(path).map_err(|e| e.error)?;
    debug!(path = %path.display(), bytes = data.len(), "wrote file");
    Ok(())
}

/// Write both files of an archive.
///
/// Both files are fully staged before either destination is replaced. The
/// previous payload is moved aside until the metadata is in place; if the
/// metadata cannot be persisted, the payload destination is put back the
/// way it was, so the pair on disk never mixes old and new halves.
pub fn write_archive(metadata_path: &Path, payload_path: &Path, archive: &EncodedArchive) -> Result<()> {
    let staged_payload = stage(payload_path, &archive.payload)?;
    let staged_metadata = stage(metadata_path, &archive.metadata)?;

    // Reserve a name next to the payload and move the old file there
    let backup = if payload_path.exists() {
        let backup = stage(payload_path, &[])?.into_temp_path();
        fs::rename(payload_path, &backup)?;
        Some(backup)
    } else {
        None
    };

    if let Err(e) = staged_payload.persist(payload_path) {
        restore_payload(payload_path, backup.as_deref());
        return Err(e.error.into());
    }

    if let Err(e) = staged_metadata.persist(metadata_path) {
        warn!(
            metadata = %metadata_path.display(),
            error = %e.error,
            "metadata write failed, restoring previous payload"
        );
        restore_payload(payload_path, backup.as_deref());
        return Err(e.error.into());
    }

    // Dropping the backup deletes the old payload
    drop(backup);
    info!(
        metadata = %metadata_path.display(),
        payload = %payload_path.display(),
        payload_bytes = archive.payload.len(),
        "wrote archive"
    );
    Ok(())
}

/// Put the previous payload back, or remove the new one if there was none
fn restore_payload(payload_path: &Path, backup: Option<&Path>) {
    let restored = match backup {
        Some(backup) => fs::rename(backup, payload_path),
        None => match fs::remove_file(payload_path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            other => other,
        },
    };
    if let Err(e) = restored {
        warn!(payload = %payload_path.display(), error = %e, "could not restore previous payload");
    }
}
