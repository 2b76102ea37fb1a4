use std::fmt;

use anyhow::{bail, Context};

const MAGNET_PREFIX: &str = "magnet:?xt=urn:btih:";

/// Length of a hex encoded v1 info hash.
const INFO_HASH_HEX_LEN: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Magnet {
    /// Hash of the info dictionary.
    pub info_hash: [u8; 20],

    /// Optional display name.
    pub display_name: Option<String>,
}

impl Magnet {
    pub fn new(info_hash: [u8; 20], display_name: Option<String>) -> Self {
        Self {
            info_hash,
            display_name,
        }
    }

    /// Parse a "magnet:?xt=urn:btih:<hex>[&dn=...]" link.
    ///
    /// Parameters other than "dn" are ignored.
    pub fn parse(magnet_str: &str) -> anyhow::Result<Self> {
        let Some(rest) = magnet_str.strip_prefix(MAGNET_PREFIX) else {
            bail!("invalid prefix")
        };
        let (Some(info_hash), Some(rest)) =
            (rest.get(..INFO_HASH_HEX_LEN), rest.get(INFO_HASH_HEX_LEN..))
        else {
            bail!("info hash too short")
        };

        let mut hash = [0u8; 20];
        hex::decode_to_slice(info_hash, &mut hash).context("invalid info hash hex code")?;

        if rest.is_empty() {
            return Ok(Self::new(hash, None));
        }
        if !rest.starts_with('&') {
            bail!("unexpected data after info hash")
        }

        let mut display_name = None;
        let segments = serde_urlencoded::from_str::<Vec<(String, String)>>(rest)
            .context("invalid magnet str segments")?;
        for (name, value) in segments {
            match name.as_str() {
                "dn" if display_name.is_none() => display_name = Some(value),
                _ => continue,
            }
        }

        Ok(Self::new(hash, display_name))
    }

    pub fn info_hash_hex(&self) -> String {
        hex::encode(self.info_hash)
    }

    /// Render the link, "xt" always comes before "dn".
    pub fn to_uri(&self) -> String {
        let mut uri = format!("{MAGNET_PREFIX}{}", self.info_hash_hex());
        if let Some(name) = &self.display_name {
            uri.push_str("&dn=");
            uri.push_str(&urlencoding::encode(name));
        }
        uri
    }

    pub fn print_info(&self) {
        println!("Info Hash: {}", self.info_hash_hex());
        if let Some(name) = &self.display_name {
            println!("Name: {}", name);
        }
    }
}

impl fmt::Display for Magnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uri())
    }
}
