use std::ops::Range;

use bytes::Bytes;

use crate::{
    utils::{char_slice_to_i64, char_slice_to_usize, u8_is_digit, DecodeError},
    value::Value,
};

/// Lists and dictionaries nested deeper than this are rejected.
const MAX_DEPTH: usize = 64;

type DecodeResult<T> = Result<T, DecodeError>;

pub struct DecodeContext<'a> {
    /// The raw data to decode.
    data: &'a [u8],

    /// Index of [data] currently decoding.
    pos: usize,
}

impl<'a> DecodeContext<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Offset of the next `ch` relative to the current position.
    fn position(&self, ch: u8) -> DecodeResult<usize> {
        if self.ended() {
            return Err(DecodeError::Ended(self.pos));
        }

        self.data[self.pos..]
            .iter()
            .position(|x| x == &ch)
            .ok_or(DecodeError::CharNotFound {
                pos: self.pos,
                ch: ch as char,
            })
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    fn advance_many(&mut self, step: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(step)?;
        let ret = self.data.get(self.pos..end)?;
        self.pos = end;
        Some(ret)
    }

    pub fn ended(&self) -> bool {
        self.pos >= self.data.len()
    }
}

impl<'a> From<&'a [u8]> for DecodeContext<'a> {
    fn from(value: &'a [u8]) -> Self {
        Self::new(value)
    }
}

impl<'a> From<&'a str> for DecodeContext<'a> {
    fn from(value: &'a str) -> Self {
        Self::new(value.as_bytes())
    }
}

/// String "5:hello" -> b"hello"
///
/// Returns a view into the decoded buffer, contents are not checked for utf8.
fn decode_bytes<'a>(ctx: &mut DecodeContext<'a>) -> DecodeResult<&'a [u8]> {
    let start = ctx.pos();
    match ctx.peek() {
        Some(x) if u8_is_digit(&x) => { /* length prefix */ }
        Some(_) => return Err(DecodeError::InvalidString(start)),
        None => return Err(DecodeError::Ended(start)),
    }

    let col_idx = ctx.position(b':')?;
    let string_len = ctx
        .advance_many(col_idx)
        .and_then(char_slice_to_usize)
        .ok_or(DecodeError::InvalidString(start))?;
    // Pass the ':' character.
    ctx.advance();
    let content_pos = ctx.pos();
    ctx.advance_many(string_len)
        .ok_or(DecodeError::StringOutOfRange {
            pos: content_pos,
            len: string_len,
        })
}

/// Interger "i52e" -> 52; "i-52e" -> -52
fn decode_integer(ctx: &mut DecodeContext) -> DecodeResult<i64> {
    let start = ctx.pos();
    if ctx.peek() != Some(b'i') {
        return Err(DecodeError::InvalidInteger(start));
    }
    ctx.advance();

    let integer_end = ctx.position(b'e')?;
    let number = ctx
        .advance_many(integer_end)
        .and_then(char_slice_to_i64)
        .ok_or(DecodeError::InvalidInteger(start))?;
    // Pass the trailing 'e'.
    ctx.advance();

    Ok(number)
}

/// List starts with "l" and ends with "e".
/// "l5:helloi52ee" ["hello", 52]
fn decode_list(ctx: &mut DecodeContext, depth: usize) -> DecodeResult<Value> {
    // Pass the head of list "l".
    ctx.advance();

    let mut values = vec![];
    loop {
        match ctx.peek() {
            Some(b'e') => break,
            None => return Err(DecodeError::Ended(ctx.pos())),
            _ => values.push(decode_value(ctx, depth + 1)?),
        }
    }
    ctx.advance();

    Ok(Value::List(values))
}

/// Dictionary
///
/// d<key1><value1>...<keyN><valueN>e
/// "d3:foo3:bar5:helloi52ee" -> {"foo": "bar", "hello": 52}
///
/// Keys must be strings. Their order is kept as found, sorting is not checked.
fn decode_dictionary(ctx: &mut DecodeContext, depth: usize) -> DecodeResult<Value> {
    // Pass the heading "d".
    ctx.advance();

    let mut entries = vec![];
    loop {
        let key = match ctx.peek() {
            Some(b'e') => break,
            None => return Err(DecodeError::Ended(ctx.pos())),
            Some(x) if u8_is_digit(&x) => decode_bytes(ctx)?,
            Some(_) => return Err(DecodeError::InvalidMapKey(ctx.pos())),
        };
        let value = decode_value(ctx, depth + 1)?;
        entries.push((Bytes::copy_from_slice(key), value));
    }
    ctx.advance();

    Ok(Value::Dict(entries))
}

fn decode_value(ctx: &mut DecodeContext, depth: usize) -> DecodeResult<Value> {
    if depth > MAX_DEPTH {
        return Err(DecodeError::NestingTooDeep(ctx.pos()));
    }

    match ctx.peek() {
        Some(b'i') => decode_integer(ctx).map(Value::Integer),
        Some(b'l') => decode_list(ctx, depth),
        Some(b'd') => decode_dictionary(ctx, depth),
        Some(x) if u8_is_digit(&x) => {
            decode_bytes(ctx).map(|s| Value::Bytes(Bytes::copy_from_slice(s)))
        }
        Some(byte) => Err(DecodeError::UnexpectedByte {
            pos: ctx.pos(),
            byte,
        }),
        None => Err(DecodeError::Ended(ctx.pos())),
    }
}

/// Skip one value, leaving the cursor right after it.
///
/// Walks the same grammar as [`decode_value`] without building anything.
fn skip_value(ctx: &mut DecodeContext, depth: usize) -> DecodeResult<()> {
    if depth > MAX_DEPTH {
        return Err(DecodeError::NestingTooDeep(ctx.pos()));
    }

    match ctx.peek() {
        Some(b'i') => decode_integer(ctx).map(drop),
        Some(b'l') => {
            ctx.advance();
            loop {
                match ctx.peek() {
                    Some(b'e') => break,
                    None => return Err(DecodeError::Ended(ctx.pos())),
                    _ => skip_value(ctx, depth + 1)?,
                }
            }
            ctx.advance();
            Ok(())
        }
        Some(b'd') => {
            ctx.advance();
            loop {
                match ctx.peek() {
                    Some(b'e') => break,
                    None => return Err(DecodeError::Ended(ctx.pos())),
                    Some(x) if u8_is_digit(&x) => {
                        decode_bytes(ctx)?;
                        skip_value(ctx, depth + 1)?;
                    }
                    Some(_) => return Err(DecodeError::InvalidMapKey(ctx.pos())),
                }
            }
            ctx.advance();
            Ok(())
        }
        Some(x) if u8_is_digit(&x) => decode_bytes(ctx).map(drop),
        Some(byte) => Err(DecodeError::UnexpectedByte {
            pos: ctx.pos(),
            byte,
        }),
        None => Err(DecodeError::Ended(ctx.pos())),
    }
}

/// Decode the value under the cursor.
pub fn decode_bencoded_value(ctx: &mut DecodeContext) -> DecodeResult<Value> {
    decode_value(ctx, 0)
}

/// Advance the cursor past the value under it.
pub fn skip_bencoded_value(ctx: &mut DecodeContext) -> DecodeResult<()> {
    skip_value(ctx, 0)
}

/// Decode `data` as exactly one value.
pub fn decode(data: &[u8]) -> DecodeResult<Value> {
    let mut ctx = DecodeContext::new(data);
    let value = decode_bencoded_value(&mut ctx)?;
    if !ctx.ended() {
        return Err(DecodeError::TrailingData(ctx.pos()));
    }
    Ok(value)
}

/// One top level entry of a dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapEntry<'a> {
    pub key: &'a [u8],

    /// Where the raw value sits in the buffer.
    pub range: Range<usize>,
}

/// Iterates the top level entries of a bencoded dictionary without decoding values.
///
/// Stops after the closing 'e' or after the first error.
pub struct MapEntries<'a> {
    ctx: DecodeContext<'a>,
    done: bool,
}

impl<'a> MapEntries<'a> {
    pub fn new(data: &'a [u8]) -> DecodeResult<Self> {
        if data.first() != Some(&b'd') {
            return Err(DecodeError::RootNotMap);
        }

        let mut ctx = DecodeContext::new(data);
        // Pass the heading "d".
        ctx.advance();
        Ok(Self { ctx, done: false })
    }

    fn next_entry(&mut self) -> DecodeResult<Option<MapEntry<'a>>> {
        let key = match self.ctx.peek() {
            Some(b'e') => {
                self.ctx.advance();
                return Ok(None);
            }
            None => return Err(DecodeError::Ended(self.ctx.pos())),
            Some(x) if u8_is_digit(&x) => decode_bytes(&mut self.ctx)?,
            Some(_) => return Err(DecodeError::InvalidMapKey(self.ctx.pos())),
        };

        let start = self.ctx.pos();
        skip_value(&mut self.ctx, 1)?;
        Ok(Some(MapEntry {
            key,
            range: start..self.ctx.pos(),
        }))
    }
}

impl<'a> Iterator for MapEntries<'a> {
    type Item = DecodeResult<MapEntry<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let entry = self.next_entry();
        if !matches!(entry, Ok(Some(_))) {
            self.done = true;
        }
        entry.transpose()
    }
}

/// Find the raw byte range of the value bound to `key` in the root dictionary.
///
/// The first occurrence wins. `Ok(None)` if the dictionary closes without `key`.
pub fn locate_top_level_key(data: &[u8], key: &[u8]) -> DecodeResult<Option<Range<usize>>> {
    for entry in MapEntries::new(data)? {
        let entry = entry?;
        if entry.key == key {
            return Ok(Some(entry.range));
        }
    }
    Ok(None)
}

/// Read the "name" entry of the dictionary stored at `range`.
///
/// Best effort: returns `None` when the range is not a dictionary, the entry is
/// missing or is not a string. Invalid utf8 is replaced.
pub fn extract_name_from_map_range(data: &[u8], range: Range<usize>) -> Option<String> {
    let map = data.get(range)?;
    MapEntries::new(map)
        .ok()?
        .map_while(Result::ok)
        .find(|entry| entry.key == b"name")
        .and_then(|entry| text_value(&map[entry.range]))
}

/// Decode a standalone byte string as lossy text.
fn text_value(data: &[u8]) -> Option<String> {
    let mut ctx = DecodeContext::new(data);
    decode_bytes(&mut ctx)
        .ok()
        .map(|s| String::from_utf8_lossy(s).into_owned())
}

/// What a single pass over the root dictionary found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootScan {
    /// Raw range of the "info" dictionary.
    pub info: Option<Range<usize>>,

    /// A root level "name" seen before "info". Non standard, only used as a fallback.
    pub name: Option<String>,
}

/// Walk the root dictionary until "info" is found.
pub fn scan_root(data: &[u8]) -> DecodeResult<RootScan> {
    let mut scan = RootScan::default();

    for entry in MapEntries::new(data)? {
        let entry = entry?;
        match entry.key {
            b"info" => {
                scan.info = Some(entry.range);
                break;
            }
            b"name" if scan.name.is_none() => {
                scan.name = text_value(&data[entry.range]);
            }
            _ => { /* not interesting */ }
        }
    }

    Ok(scan)
}
