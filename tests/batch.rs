use std::path::PathBuf;

use tempfile::TempDir;

use torrent_magnet::{convert_file, convert_files, ConvertError, DecodeError, FailureReason};

fn write(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[tokio::test]
async fn one_bad_file_does_not_stop_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let paths = vec![
        write(&dir, "first.torrent", b"d4:infod4:name5:firstee"),
        write(&dir, "broken.torrent", b"4:spam"),
        write(&dir, "second.torrent", b"d4:infod4:name6:secondee"),
    ];

    let report = convert_files(&paths, 2).await;

    assert_eq!(report.successes.len(), 2);
    let mut names = report
        .successes
        .iter()
        .map(|r| r.display_name().to_string())
        .collect::<Vec<_>>();
    names.sort();
    assert_eq!(names, vec!["first", "second"]);

    assert_eq!(report.failures.len(), 1);
    let failure = &report.failures[0];
    assert_eq!(failure.file_name, "broken.torrent");
    assert!(matches!(
        failure.reason,
        FailureReason::Convert(ConvertError::Decode(DecodeError::RootNotMap))
    ));
    assert_eq!(failure.to_string(), "broken.torrent: root is not a map");
}

#[tokio::test]
async fn unreadable_and_missing_info_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let paths = vec![
        write(&dir, "no-info.torrent", b"d8:announce3:urle"),
        dir.path().join("gone.torrent"),
    ];

    let report = convert_files(paths, 1).await;

    assert!(report.successes.is_empty());
    assert_eq!(report.failures.len(), 2);
    for failure in report.failures.iter() {
        match failure.file_name.as_str() {
            "no-info.torrent" => assert!(matches!(
                failure.reason,
                FailureReason::Convert(ConvertError::MissingInfo)
            )),
            "gone.torrent" => assert!(matches!(failure.reason, FailureReason::Io(_))),
            other => panic!("unexpected failure for {other}"),
        }
    }
}

#[tokio::test]
async fn file_name_is_the_last_resort_label() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, "unnamed.torrent", b"d4:infod6:lengthi3eee");

    let result = convert_file(&path).await.unwrap();
    assert_eq!(result.display_name(), "unnamed.torrent");
    assert!(result.magnet_uri().ends_with("&dn=unnamed.torrent"));
}

#[tokio::test]
async fn empty_batch() {
    let report = convert_files(Vec::<PathBuf>::new(), 4).await;
    assert!(report.successes.is_empty());
    assert!(report.failures.is_empty());
    assert_eq!(report.links(), "");
}
