use std::future::Future;

use futures::{stream, StreamExt};
use thiserror::Error;

pub type BtResult<T> = anyhow::Result<T, anyhow::Error>;

/// Errors raised while walking bencoded data.
///
/// Positions are byte offsets into the buffer being decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("data ended unexpectedly at {0}")]
    Ended(usize),

    #[error("unexpected byte 0x{byte:02x} at {pos}")]
    UnexpectedByte { pos: usize, byte: u8 },

    #[error("invalid string length at {0}")]
    InvalidString(usize),

    #[error("string of length {len} at {pos} runs past the end of data")]
    StringOutOfRange { pos: usize, len: usize },

    #[error("invalid integer at {0}")]
    InvalidInteger(usize),

    #[error("invalid key of map at {0}")]
    InvalidMapKey(usize),

    #[error("char {ch} not found from pos {pos}")]
    CharNotFound { pos: usize, ch: char },

    #[error("root is not a map")]
    RootNotMap,

    #[error("nesting too deep at {0}")]
    NestingTooDeep(usize),

    #[error("trailing data at {0}")]
    TrailingData(usize),
}

pub fn u8_is_digit(n: &u8) -> bool {
    n.is_ascii_digit()
}

/// Parse ascii digits into a length, `None` on empty input, non-digits or overflow.
pub fn char_slice_to_usize(data: &[u8]) -> Option<usize> {
    if data.is_empty() {
        return None;
    }

    data.iter().try_fold(0usize, |acc, d| {
        if !u8_is_digit(d) {
            return None;
        }
        acc.checked_mul(10)?.checked_add((d - b'0') as usize)
    })
}

/// Parse an optionally negative ascii integer.
///
/// Redundant leading zeros ("i007e", "i-0e") are accepted.
pub fn char_slice_to_i64(data: &[u8]) -> Option<i64> {
    let (neg, digits) = match data.split_first() {
        Some((b'-', rest)) => (true, rest),
        _ => (false, data),
    };

    if digits.is_empty() {
        return None;
    }

    // Accumulate as a negative number so i64::MIN still fits.
    let ret = digits.iter().try_fold(0i64, |acc, d| {
        if !u8_is_digit(d) {
            return None;
        }
        acc.checked_mul(10)?.checked_sub((d - b'0') as i64)
    })?;

    if neg {
        Some(ret)
    } else {
        ret.checked_neg()
    }
}

pub fn encode_bytes_to_string(d: &[u8]) -> String {
    hex::encode(d)
}

/// Run `f` over every item with at most `limit` futures in flight.
///
/// Outputs are returned in completion order, not submission order.
pub async fn parallel_future<I, F, Fut>(items: I, limit: usize, f: F) -> Vec<Fut::Output>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future,
{
    stream::iter(items)
        .map(f)
        .buffer_unordered(limit.max(1))
        .collect()
        .await
}
