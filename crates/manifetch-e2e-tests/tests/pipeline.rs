use assert_fs::TempDir;
use assert_fs::prelude::*;
use manifetch_e2e_tests::{
    CWD_LOCK, Route, TestServer, dataset, dir_entries, init_tracing, manifest, sha256_hex,
    tar_bz2_bytes, tar_gz_bytes, test_fetcher, test_options,
};
use manifetch_lib::ManifetchError;
use manifetch_lib::processor::DatasetStatus;
use manifetch_lib::runner::{ARCHIVE_NAME, DOWNLOADS_DIR, ManifestRunner};
use predicates::prelude::*;

const README: &[u8] = b"A small dataset description.\n";

#[tokio::test]
async fn test_single_dataset_topic_becomes_file() {
    init_tracing();
    let _cwd = CWD_LOCK.lock().await;

    let server = TestServer::start([("/files/readme.txt", Route::new(README))])
        .await
        .unwrap();
    let root = TempDir::new().unwrap();
    let manifest = manifest(vec![(
        "readme",
        vec![dataset(
            server.url("/files/readme.txt"),
            Some(sha256_hex(README)),
        )],
    )]);

    let fetcher = test_fetcher().unwrap();
    let summary = ManifestRunner::new(&fetcher, test_options(false, false))
        .run(&manifest, root.path())
        .await
        .unwrap();

    root.child("downloads/readme")
        .assert(predicate::path::is_file())
        .assert(README);
    assert_eq!(server.request_count(), 1);

    let (topic, processed) = &summary.topics[0];
    assert_eq!(topic, "readme");
    assert_eq!(processed[0].title, "readme");
    assert_eq!(
        processed[0].status,
        DatasetStatus::Downloaded {
            bytes: README.len() as u64,
            extracted: None
        }
    );
}

#[tokio::test]
async fn test_large_download_spans_many_chunks() {
    init_tracing();
    let _cwd = CWD_LOCK.lock().await;

    let body: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
    let server = TestServer::start([("/big.bin", Route::new(body.clone()))])
        .await
        .unwrap();
    let root = TempDir::new().unwrap();
    let manifest = manifest(vec![(
        "big",
        vec![dataset(server.url("/big.bin"), Some(sha256_hex(&body)))],
    )]);

    let fetcher = test_fetcher().unwrap();
    ManifestRunner::new(&fetcher, test_options(false, false))
        .run(&manifest, root.path())
        .await
        .unwrap();

    root.child("downloads/big")
        .assert(predicate::eq(body.clone()).from_file_path());
}

#[tokio::test]
async fn test_existing_output_is_not_downloaded_again() {
    init_tracing();
    let _cwd = CWD_LOCK.lock().await;

    let server = TestServer::start([("/readme.txt", Route::new(README))])
        .await
        .unwrap();
    let root = TempDir::new().unwrap();
    root.child("downloads/readme").write_str("local copy").unwrap();
    let manifest = manifest(vec![(
        "readme",
        vec![dataset(
            server.url("/readme.txt"),
            Some(sha256_hex(README)),
        )],
    )]);

    let fetcher = test_fetcher().unwrap();
    let summary = ManifestRunner::new(&fetcher, test_options(false, false))
        .run(&manifest, root.path())
        .await
        .unwrap();

    assert_eq!(server.request_count(), 0);
    root.child("downloads/readme").assert("local copy");
    assert_eq!(summary.topics[0].1[0].status, DatasetStatus::Skipped);
}

#[tokio::test]
async fn test_multi_dataset_topic_becomes_directory_with_extracted_archives() {
    init_tracing();
    let _cwd = CWD_LOCK.lock().await;

    let archive = tar_gz_bytes(&[
        ("images/0001.txt", &b"first"[..]),
        ("images/0002.txt", &b"second"[..]),
    ])
    .unwrap();
    let labels = b"id,label\n1,cat\n2,dog\n".to_vec();
    let server = TestServer::start([
        ("/data/images.tar.gz", Route::new(archive.clone())),
        ("/data/labels.csv", Route::new(labels.clone())),
    ])
    .await
    .unwrap();
    let root = TempDir::new().unwrap();
    let manifest = manifest(vec![(
        "animals",
        vec![
            dataset(server.url("/data/images.tar.gz"), Some(sha256_hex(&archive))),
            dataset(server.url("/data/labels.csv"), None),
        ],
    )]);

    let fetcher = test_fetcher().unwrap();
    let summary = ManifestRunner::new(&fetcher, test_options(false, false))
        .run(&manifest, root.path())
        .await
        .unwrap();

    let topic_dir = root.child("downloads/animals");
    topic_dir.assert(predicate::path::is_dir());
    assert_eq!(
        dir_entries(topic_dir.path()).unwrap(),
        vec!["images", "labels.csv"]
    );
    topic_dir.child("images/0002.txt").assert("second");
    topic_dir
        .child("labels.csv")
        .assert(predicate::eq(labels.clone()).from_file_path());
    topic_dir
        .child("images.tar.gz")
        .assert(predicate::path::missing());

    let processed = &summary.topics[0].1;
    assert_eq!(processed[0].title, "images.tar.gz");
    assert!(matches!(
        processed[0].status,
        DatasetStatus::Downloaded {
            extracted: Some(_),
            ..
        }
    ));
    assert!(matches!(
        processed[1].status,
        DatasetStatus::Downloaded {
            extracted: None,
            ..
        }
    ));
}

#[tokio::test]
async fn test_directory_topic_skips_present_files_on_rerun() {
    init_tracing();
    let _cwd = CWD_LOCK.lock().await;

    let server = TestServer::start([
        ("/a.csv", Route::new("a\n")),
        ("/b.csv", Route::new("b\n")),
    ])
    .await
    .unwrap();
    let root = TempDir::new().unwrap();
    let manifest = manifest(vec![(
        "tables",
        vec![
            dataset(server.url("/a.csv"), None),
            dataset(server.url("/b.csv"), None),
        ],
    )]);

    let fetcher = test_fetcher().unwrap();
    let runner = ManifestRunner::new(&fetcher, test_options(false, false));
    runner.run(&manifest, root.path()).await.unwrap();
    assert_eq!(server.request_count(), 2);

    runner.run(&manifest, root.path()).await.unwrap();
    assert_eq!(server.request_count(), 2);
}

#[tokio::test]
async fn test_checksum_mismatch_stops_the_run() {
    init_tracing();
    let _cwd = CWD_LOCK.lock().await;

    let server = TestServer::start([
        ("/readme.txt", Route::new(README)),
        ("/later.txt", Route::new("later")),
    ])
    .await
    .unwrap();
    let root = TempDir::new().unwrap();
    let wrong = "0".repeat(64);
    let manifest = manifest(vec![
        (
            "readme",
            vec![dataset(server.url("/readme.txt"), Some(wrong.clone()))],
        ),
        ("later", vec![dataset(server.url("/later.txt"), None)]),
    ]);
    let original_dir = std::env::current_dir().unwrap();

    let fetcher = test_fetcher().unwrap();
    let err = ManifestRunner::new(&fetcher, test_options(true, false))
        .run(&manifest, root.path())
        .await
        .unwrap_err();

    match err {
        ManifetchError::ChecksumMismatch {
            expected, actual, ..
        } => {
            assert_eq!(expected, wrong);
            assert_eq!(actual, sha256_hex(README));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    root.child("downloads/readme").assert(README);
    root.child("downloads/later")
        .assert(predicate::path::missing());
    root.child(ARCHIVE_NAME).assert(predicate::path::missing());
    assert_eq!(server.request_count(), 1);
    assert_eq!(std::env::current_dir().unwrap(), original_dir);
}

#[tokio::test]
async fn test_missing_content_length_is_fatal() {
    init_tracing();
    let _cwd = CWD_LOCK.lock().await;

    let server = TestServer::start([("/stream", Route::without_content_length("chunk"))])
        .await
        .unwrap();
    let root = TempDir::new().unwrap();
    let manifest = manifest(vec![("stream", vec![dataset(server.url("/stream"), None)])]);

    let fetcher = test_fetcher().unwrap();
    let err = ManifestRunner::new(&fetcher, test_options(false, false))
        .run(&manifest, root.path())
        .await
        .unwrap_err();

    assert!(
        matches!(err, ManifetchError::MissingContentLength { .. }),
        "unexpected error: {err:?}"
    );
    root.child("downloads/stream")
        .assert(predicate::path::missing());
}

#[tokio::test]
async fn test_http_error_status_is_fatal() {
    init_tracing();
    let _cwd = CWD_LOCK.lock().await;

    let server = TestServer::start([]).await.unwrap();
    let root = TempDir::new().unwrap();
    let manifest = manifest(vec![("gone", vec![dataset(server.url("/gone"), None)])]);

    let fetcher = test_fetcher().unwrap();
    let err = ManifestRunner::new(&fetcher, test_options(false, false))
        .run(&manifest, root.path())
        .await
        .unwrap_err();

    assert!(
        matches!(err, ManifetchError::HttpStatus { status: 404, .. }),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn test_empty_topic_is_ignored() {
    init_tracing();
    let _cwd = CWD_LOCK.lock().await;

    let server = TestServer::start([]).await.unwrap();
    let root = TempDir::new().unwrap();
    let manifest = manifest(vec![("nothing", vec![])]);

    let fetcher = test_fetcher().unwrap();
    let summary = ManifestRunner::new(&fetcher, test_options(false, false))
        .run(&manifest, root.path())
        .await
        .unwrap();

    assert!(summary.topics[0].1.is_empty());
    assert!(dir_entries(&root.path().join(DOWNLOADS_DIR)).unwrap().is_empty());
    assert_eq!(server.request_count(), 0);
}

#[tokio::test]
async fn test_archive_replaces_downloads_directory() {
    init_tracing();
    let _cwd = CWD_LOCK.lock().await;

    let bundle = tar_bz2_bytes(&[("notes/one.txt", &b"one"[..])]).unwrap();
    let server = TestServer::start([
        ("/readme.txt", Route::new(README)),
        ("/notes.tar.bz2", Route::new(bundle)),
        ("/extra.txt", Route::new("extra")),
    ])
    .await
    .unwrap();
    let root = TempDir::new().unwrap();
    let manifest = manifest(vec![
        ("readme", vec![dataset(server.url("/readme.txt"), None)]),
        (
            "notes",
            vec![
                dataset(server.url("/notes.tar.bz2"), None),
                dataset(server.url("/extra.txt"), None),
            ],
        ),
    ]);

    let fetcher = test_fetcher().unwrap();
    let summary = ManifestRunner::new(&fetcher, test_options(true, false))
        .run(&manifest, root.path())
        .await
        .unwrap();

    root.child(DOWNLOADS_DIR).assert(predicate::path::missing());
    root.child(ARCHIVE_NAME).assert(predicate::path::is_file());
    assert_eq!(dir_entries(root.path()).unwrap(), vec![ARCHIVE_NAME]);
    assert_eq!(summary.archive, Some(root.path().join(ARCHIVE_NAME)));
}
