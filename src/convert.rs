use serde::Serialize;
use sha1::{Digest, Sha1};
use thiserror::Error;

use crate::{
    decode::{extract_name_from_map_range, scan_root},
    magnet::Magnet,
    utils::DecodeError,
};

/// Label used when neither the torrent nor the caller provide a name.
pub const FALLBACK_NAME: &str = "file";

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("missing info dictionary")]
    MissingInfo,
}

/// A torrent converted into a magnet link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionResult {
    /// Human readable name, not escaped.
    display_name: String,

    /// Lowercase hex of the info hash.
    digest_hex: String,

    magnet_uri: String,
}

impl ConversionResult {
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn digest_hex(&self) -> &str {
        &self.digest_hex
    }

    pub fn magnet_uri(&self) -> &str {
        &self.magnet_uri
    }

    pub fn print_info(&self) {
        println!("Name: {}", self.display_name);
        println!("Info Hash: {}", self.digest_hex);
        println!("Magnet Link: {}", self.magnet_uri);
    }
}

/// SHA-1 of the raw "info" dictionary bytes in a torrent file.
pub fn info_hash(data: &[u8]) -> Result<[u8; 20], ConvertError> {
    let range = scan_root(data)?.info.ok_or(ConvertError::MissingInfo)?;
    Ok(sha1_digest(&data[range]))
}

/// Convert the content of a torrent file into a magnet link.
///
/// `file_name` is only used as a label when the torrent carries no name.
pub fn convert(data: &[u8], file_name: Option<&str>) -> Result<ConversionResult, ConvertError> {
    let scan = scan_root(data)?;
    let range = scan.info.ok_or(ConvertError::MissingInfo)?;

    // Hash the bytes exactly as stored, re-encoding may change them.
    let hash = sha1_digest(&data[range.clone()]);
    let info_name = extract_name_from_map_range(data, range);
    let display_name = pick_display_name([info_name.as_deref(), scan.name.as_deref(), file_name]);

    let magnet = Magnet::new(hash, Some(display_name.clone()));
    Ok(ConversionResult {
        display_name,
        digest_hex: magnet.info_hash_hex(),
        magnet_uri: magnet.to_uri(),
    })
}

fn sha1_digest(data: &[u8]) -> [u8; 20] {
    let mut hasher = Sha1::new();
    hasher.update(data);
    let mut hash = [0u8; 20];
    hash.copy_from_slice(&hasher.finalize());
    hash
}

/// First non empty candidate, or [`FALLBACK_NAME`].
fn pick_display_name<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> String {
    candidates
        .into_iter()
        .flatten()
        .find(|name| !name.is_empty())
        .unwrap_or(FALLBACK_NAME)
        .to_owned()
}
