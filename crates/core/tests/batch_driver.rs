//! Batch driver behavior across identities.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use common::*;
use sharesweep_core::*;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn driver(dir: &TempDir, directory: FakeDirectory, factory: Arc<FakeFactory>) -> BatchDriver {
    let config = RunConfig::new(dir.path().join("key.json"), "admin@co")
        .with_output_dir(dir.path())
        .with_skip_rules(SkipRules::parse("spammer.com"));
    BatchDriver::new(Arc::new(directory), factory, &config)
}

#[tokio::test]
async fn test_every_identity_processed() {
    let dir = TempDir::new().unwrap();
    let factory = Arc::new(
        FakeFactory::default()
            .with(
                "alice@co",
                FakeDrive::with_shared(vec![
                    owned("1", "spam", "bob@spammer.com"),
                    owned("2", "plan", "carol@co"),
                ]),
            )
            .with("bob@co", FakeDrive::default()),
    );

    let report = driver(&dir, FakeDirectory::new(&["alice@co", "bob@co"]), factory.clone())
        .run(&CancellationToken::new())
        .await
        .unwrap();

    assert!(report.all_succeeded());
    assert_eq!(report.roster_size, 2);
    assert_eq!(report.succeeded(), 2);
    assert_eq!(read_record(dir.path(), "alice@co").len(), 1);
    assert!(read_record(dir.path(), "bob@co").is_empty());
    assert_eq!(factory.drive("bob@co").created.lock().len(), 1);
}

#[tokio::test]
async fn test_client_construction_failure_is_isolated() {
    let dir = TempDir::new().unwrap();
    let factory = Arc::new(
        FakeFactory::default().with("carol@co", FakeDrive::with_shared(vec![owned("1", "a", "x@co")])),
    );

    let report = driver(
        &dir,
        FakeDirectory::new(&["alice@co", "carol@co"]),
        factory.clone(),
    )
    .run(&CancellationToken::new())
    .await
    .unwrap();

    assert!(!report.all_succeeded());
    assert_eq!(report.outcomes.len(), 2);
    assert!(matches!(
        &report.outcomes[0].result,
        Err(ConsolidationError::ClientConstruction { identity, .. }) if identity == "alice@co"
    ));
    assert!(report.outcomes[1].succeeded());
    assert_eq!(factory.drive("carol@co").copied_ids(), vec!["1"]);
    assert_eq!(*factory.requested.lock(), vec!["alice@co", "carol@co"]);
}

#[tokio::test]
async fn test_folder_failure_does_not_affect_next_identity() {
    let dir = TempDir::new().unwrap();
    let mut broken = FakeDrive::with_shared(vec![owned("1", "a", "x@co")]);
    broken.fail_folder_list = true;
    let factory = Arc::new(
        FakeFactory::default()
            .with("alice@co", broken)
            .with("bob@co", FakeDrive::with_shared(vec![owned("2", "b", "y@co")])),
    );

    let report = driver(&dir, FakeDirectory::new(&["alice@co", "bob@co"]), factory.clone())
        .run(&CancellationToken::new())
        .await
        .unwrap();

    let failures: Vec<_> = report.failures().map(|o| o.identity.as_str()).collect();
    assert_eq!(failures, vec!["alice@co"]);
    assert_eq!(factory.drive("bob@co").copied_ids(), vec!["2"]);
}

#[tokio::test]
async fn test_directory_failure_aborts_run() {
    let dir = TempDir::new().unwrap();
    let factory = Arc::new(FakeFactory::default().with("alice@co", FakeDrive::default()));
    let mut directory = FakeDirectory::new(&["alice@co"]);
    directory.fail = true;

    let err = driver(&dir, directory, factory.clone())
        .run(&CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ConsolidationError::DirectoryFetch(_)));
    assert!(factory.requested.lock().is_empty());
}

#[tokio::test]
async fn test_slow_identity_times_out_alone() {
    let dir = TempDir::new().unwrap();
    let mut slow = FakeDrive::with_shared(vec![owned("1", "a", "x@co")]);
    slow.list_delay = Some(Duration::from_secs(5));
    let factory = Arc::new(
        FakeFactory::default()
            .with("alice@co", slow)
            .with("bob@co", FakeDrive::with_shared(vec![owned("2", "b", "y@co")])),
    );

    let report = driver(&dir, FakeDirectory::new(&["alice@co", "bob@co"]), factory.clone())
        .with_identity_timeout(Some(Duration::from_millis(50)))
        .run(&CancellationToken::new())
        .await
        .unwrap();

    assert!(matches!(
        report.outcomes[0].result,
        Err(ConsolidationError::Timeout(_))
    ));
    assert!(report.outcomes[1].succeeded());
    assert_eq!(factory.drive("bob@co").copied_ids(), vec!["2"]);
}

#[tokio::test]
async fn test_cancelled_before_start_processes_nothing() {
    let dir = TempDir::new().unwrap();
    let factory = Arc::new(FakeFactory::default().with("alice@co", FakeDrive::default()));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = driver(&dir, FakeDirectory::new(&["alice@co"]), factory.clone())
        .run(&cancel)
        .await
        .unwrap();

    assert!(report.cancelled);
    assert!(report.outcomes.is_empty());
    assert_eq!(report.not_processed(), 1);
    assert!(!report.all_succeeded());
    assert!(factory.requested.lock().is_empty());
}

#[tokio::test]
async fn test_cancellation_mid_identity_stops_batch() {
    let dir = TempDir::new().unwrap();
    let cancel = CancellationToken::new();
    let mut first = FakeDrive::with_shared(vec![owned("1", "a", "x@co"), owned("2", "b", "x@co")]);
    first.cancel_after_copies = Some((1, cancel.clone()));
    let factory = Arc::new(
        FakeFactory::default()
            .with("alice@co", first)
            .with("bob@co", FakeDrive::default()),
    );

    let report = driver(&dir, FakeDirectory::new(&["alice@co", "bob@co"]), factory.clone())
        .run(&cancel)
        .await
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.outcomes.len(), 1);
    assert!(matches!(
        report.outcomes[0].result,
        Err(ConsolidationError::Cancelled)
    ));
    assert_eq!(report.not_processed(), 1);
    assert_eq!(*factory.requested.lock(), vec!["alice@co"]);
}

#[tokio::test]
async fn test_empty_directory_succeeds() {
    let dir = TempDir::new().unwrap();
    let report = driver(&dir, FakeDirectory::new(&[]), Arc::new(FakeFactory::default()))
        .run(&CancellationToken::new())
        .await
        .unwrap();

    assert!(report.all_succeeded());
    assert_eq!(report.roster_size, 0);
}

#[tokio::test]
async fn test_outcomes_reported_as_each_identity_finishes() {
    let dir = TempDir::new().unwrap();
    let factory = Arc::new(
        FakeFactory::default()
            .with("alice@co", FakeDrive::default())
            .with("carol@co", FakeDrive::default()),
    );
    let seen: Arc<parking_lot::Mutex<Vec<(String, bool, usize)>>> = Arc::default();

    let hook_seen = seen.clone();
    let hook_factory = factory.clone();
    let report = driver(
        &dir,
        FakeDirectory::new(&["alice@co", "bob@co", "carol@co"]),
        factory.clone(),
    )
    .on_outcome(move |outcome| {
        hook_seen.lock().push((
            outcome.identity.clone(),
            outcome.succeeded(),
            hook_factory.requested.lock().len(),
        ));
    })
    .run(&CancellationToken::new())
    .await
    .unwrap();

    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(
        *seen.lock(),
        vec![
            ("alice@co".to_string(), true, 1),
            ("bob@co".to_string(), false, 2),
            ("carol@co".to_string(), true, 3),
        ]
    );
}
