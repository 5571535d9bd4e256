// File: crates/bubble-core/tests/loader.rs
// Purpose: Generation file resolution and CSV validation through the async loader.

use bubble_core::{generation_tag, DataError, FrameLoader, LoadError, SurnameRecord};

fn write(dir: &std::path::Path, rel: &str, body: &str) {
    let path = dir.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, body).unwrap();
}

#[test]
fn every_generation_path_is_zero_padded() {
    let loader = FrameLoader::new("data");
    for g in 0..50 {
        let tag = generation_tag(g);
        assert_eq!(tag.len(), 2, "tag for {g}");
        let want = std::path::Path::new("data").join(format!("generations/generation_{tag}.csv"));
        assert_eq!(loader.resource_path(g), want);
    }
    assert!(loader.resource_path(7).ends_with("generation_07.csv"));
}

#[tokio::test]
async fn loads_rows_and_defaults_nationality() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "generations/generation_00.csv",
        "Surname,Count,Nationality\nSmith,100,English\nPatel, 20 ,Indian\nDoe,5,\n\nKhan,3,   \n",
    );
    let records = FrameLoader::new(dir.path()).load(0).await.expect("load");
    assert_eq!(
        records,
        vec![
            SurnameRecord::new("Smith", 100, Some("English")),
            SurnameRecord::new("Patel", 20, Some("Indian")),
            SurnameRecord::new("Doe", 5, None),
            SurnameRecord::new("Khan", 3, None),
        ]
    );
    assert!(records[2..].iter().all(|r| r.nationality == "Unknown"));
}

#[tokio::test]
async fn nationality_column_is_optional() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "g01.csv", "Surname,Count\nJones,4\n");
    let loader = FrameLoader::new(dir.path()).with_template("g{gen}.csv");
    let records = loader.load(1).await.unwrap();
    assert_eq!(records, vec![SurnameRecord::new("Jones", 4, None)]);
}

#[tokio::test]
async fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = FrameLoader::new(dir.path()).load(3).await.unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }), "got {err:?}");
    assert!(err.path().ends_with("generation_03.csv"));
}

#[tokio::test]
async fn malformed_rows_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "generations/generation_00.csv", "Surname,Count\nSmith,lots\n");
    write(dir.path(), "generations/generation_01.csv", "Surname,Count\nSmith,1\nSmith,2\n");
    write(dir.path(), "generations/generation_02.csv", "Name,Count\nSmith,1\n");
    let loader = FrameLoader::new(dir.path());

    match loader.load(0).await.unwrap_err() {
        LoadError::Data { source: DataError::InvalidCount { surname, value, .. }, .. } => {
            assert_eq!(surname, "Smith");
            assert_eq!(value, "lots");
        }
        other => panic!("expected invalid count, got {other:?}"),
    }
    assert!(matches!(
        loader.load(1).await.unwrap_err(),
        LoadError::Data { source: DataError::DuplicateSurname { .. }, .. }
    ));
    assert!(matches!(
        loader.load(2).await.unwrap_err(),
        LoadError::Data { source: DataError::MissingColumn(_), .. }
    ));
}

#[tokio::test]
async fn header_only_file_is_an_empty_generation() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "generations/generation_04.csv", "Surname,Count,Nationality\n");
    let records = FrameLoader::new(dir.path()).load(4).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn timeout_does_not_affect_a_prompt_read() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "generations/generation_00.csv", "Surname,Count\nSmith,2\n");
    let loader = FrameLoader::new(dir.path()).with_timeout(Some(std::time::Duration::from_secs(5)));
    assert_eq!(loader.load(0).await.unwrap(), vec![SurnameRecord::new("Smith", 2, None)]);
}
