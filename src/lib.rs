//! Convert `.torrent` files into magnet links.
//!
//! The info hash is computed over the raw bytes of the "info" dictionary as
//! they appear in the file, so it matches what any other client derives.
//!
//! ```
//! use torrent_magnet::convert;
//!
//! let result = convert(b"d4:infod4:name4:test12:piece lengthi16384eee", None).unwrap();
//! assert_eq!(result.display_name(), "test");
//! assert!(result.magnet_uri().ends_with("&dn=test"));
//! ```

pub mod batch;
pub mod convert;
pub mod decode;
pub mod magnet;
pub mod utils;
pub mod value;

pub use batch::{convert_file, convert_files, BatchReport, FailureReason, FileFailure};
pub use convert::{convert, info_hash, ConversionResult, ConvertError};
pub use decode::{decode, locate_top_level_key, DecodeContext};
pub use magnet::Magnet;
pub use utils::DecodeError;
pub use value::Value;
