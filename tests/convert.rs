use std::collections::HashMap;

use serde_bencode::value::Value as RefValue;
use sha1::{Digest, Sha1};

use torrent_magnet::{convert, info_hash, locate_top_level_key, DecodeError, Magnet};

fn bytes(s: &str) -> RefValue {
    RefValue::Bytes(s.as_bytes().to_vec())
}

fn dict(entries: Vec<(&str, RefValue)>) -> RefValue {
    RefValue::Dict(
        entries
            .into_iter()
            .map(|(k, v)| (k.as_bytes().to_vec(), v))
            .collect::<HashMap<_, _>>(),
    )
}

fn single_file_info() -> RefValue {
    dict(vec![
        ("length", RefValue::Int(92063)),
        ("name", bytes("sample.txt")),
        ("piece length", RefValue::Int(32768)),
        ("pieces", RefValue::Bytes((0u8..60).collect())),
    ])
}

fn file_entry(len: i64, path: &[&str]) -> RefValue {
    dict(vec![
        ("length", RefValue::Int(len)),
        (
            "path",
            RefValue::List(path.iter().map(|p| bytes(p)).collect()),
        ),
    ])
}

fn multi_file_info() -> RefValue {
    dict(vec![
        (
            "files",
            RefValue::List(vec![
                file_entry(1024, &["disc 1", "01 intro.flac"]),
                file_entry(2048, &["cover.jpg"]),
            ]),
        ),
        ("name", bytes("Album (2024)")),
        ("piece length", RefValue::Int(262144)),
        ("pieces", RefValue::Bytes(vec![0xab; 20])),
        ("private", RefValue::Int(1)),
    ])
}

fn torrent(info: RefValue) -> Vec<u8> {
    let root = dict(vec![
        ("announce", bytes("http://tracker.example.com/announce")),
        (
            "announce-list",
            RefValue::List(vec![RefValue::List(vec![bytes("udp://t.example:80")])]),
        ),
        ("comment", bytes("made for tests")),
        ("creation date", RefValue::Int(1_700_000_000)),
        ("info", info),
    ]);
    serde_bencode::to_bytes(&root).unwrap()
}

/// Info hash as computed by a different bencode implementation.
fn reference_info_hash(data: &[u8]) -> String {
    let root: RefValue = serde_bencode::from_bytes(data).unwrap();
    let RefValue::Dict(root) = root else {
        panic!("root is not a dict")
    };
    let info = serde_bencode::to_bytes(&root[b"info".as_slice()]).unwrap();
    hex::encode(Sha1::digest(&info))
}

#[test]
fn single_file_matches_reference() {
    let data = torrent(single_file_info());
    let result = convert(&data, Some("sample.torrent")).unwrap();

    assert_eq!(result.digest_hex(), reference_info_hash(&data));
    assert_eq!(result.display_name(), "sample.txt");
    assert_eq!(
        result.magnet_uri(),
        format!("magnet:?xt=urn:btih:{}&dn=sample.txt", result.digest_hex())
    );
}

#[test]
fn multi_file_matches_reference() {
    let data = torrent(multi_file_info());
    let result = convert(&data, None).unwrap();

    assert_eq!(result.digest_hex(), reference_info_hash(&data));
    assert_eq!(result.display_name(), "Album (2024)");
    assert!(result.magnet_uri().ends_with("&dn=Album%20%282024%29"));
}

#[test]
fn captured_range_is_the_reference_encoding() {
    let data = torrent(multi_file_info());
    let range = locate_top_level_key(&data, b"info").unwrap().unwrap();
    let reference = serde_bencode::to_bytes(&multi_file_info()).unwrap();
    assert_eq!(&data[range], reference.as_slice());
}

#[test]
fn digest_does_not_depend_on_other_keys() {
    let info = serde_bencode::to_bytes(&single_file_info()).unwrap();

    let mut first = b"d8:announce3:url4:info".to_vec();
    first.extend_from_slice(&info);
    first.push(b'e');

    let mut second = b"d7:comment5:hello10:created by4:test4:info".to_vec();
    second.extend_from_slice(&info);
    second.extend_from_slice(b"8:url-listl3:abc3:defee");

    let expected = hex::encode(Sha1::digest(&info));
    assert_eq!(convert(&first, None).unwrap().digest_hex(), expected);
    assert_eq!(convert(&second, None).unwrap().digest_hex(), expected);
    assert_eq!(hex::encode(info_hash(&second).unwrap()), expected);
}

#[test]
fn magnet_link_parses_back() {
    let data = torrent(multi_file_info());
    let result = convert(&data, None).unwrap();

    let magnet = Magnet::parse(result.magnet_uri()).unwrap();
    assert_eq!(hex::encode(magnet.info_hash), result.digest_hex());
    assert_eq!(magnet.display_name.as_deref(), Some(result.display_name()));
}

#[test]
fn root_string_is_rejected() {
    let err = convert(b"4:spam", Some("spam.torrent")).unwrap_err();
    assert_eq!(err.to_string(), "root is not a map");

    let err = locate_top_level_key(b"l4:infoe", b"info").unwrap_err();
    assert_eq!(err, DecodeError::RootNotMap);
}

#[test]
fn truncated_file_is_rejected() {
    let data = torrent(single_file_info());
    for cut in [1, data.len() / 2, data.len() - 2] {
        assert!(convert(&data[..cut], None).is_err(), "cut at {cut}");
    }
}
