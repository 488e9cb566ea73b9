//! Reads the declared payload size out of bencoded torrent metadata.

use freeleech_core::SizeDescriptor;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetainfoError {
    #[error("malformed metadata: {0}")]
    Malformed(#[from] serde_bencode::Error),
    #[error("metadata has no info dictionary")]
    MissingInfo,
    #[error("info dictionary declares neither length nor files")]
    MissingLength,
    #[error("declared file lengths overflow the total size")]
    SizeOverflow,
}

#[derive(Debug, Deserialize)]
struct Metainfo {
    info: Option<Info>,
}

#[derive(Debug, Deserialize)]
struct Info {
    length: Option<u64>,
    files: Option<Vec<FileEntry>>,
}

#[derive(Debug, Deserialize)]
struct FileEntry {
    length: u64,
}

/// Single-file payloads declare `info.length`, multi-file ones `info.files[].length`.
pub fn decode_size(bytes: &[u8]) -> Result<SizeDescriptor, MetainfoError> {
    let meta: Metainfo = serde_bencode::from_bytes(bytes)?;
    let info = meta.info.ok_or(MetainfoError::MissingInfo)?;
    if let Some(length) = info.length {
        return Ok(SizeDescriptor::Single { length });
    }
    let files = info.files.ok_or(MetainfoError::MissingLength)?;
    let descriptor = SizeDescriptor::Multi {
        lengths: files.into_iter().map(|f| f.length).collect(),
    };
    if descriptor.total_bytes().is_none() {
        return Err(MetainfoError::SizeOverflow);
    }
    Ok(descriptor)
}
