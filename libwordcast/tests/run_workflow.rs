//! End-to-end tests for a single run
//!
//! Drives `WordcastService` with a scripted text service, a mock platform and
//! real file-backed history stores in a temporary directory.

use std::time::Duration;

use libwordcast::composer::PostComposer;
use libwordcast::error::{GeneratorError, PlatformError};
use libwordcast::generator::mock::ScriptedTextService;
use libwordcast::generator::WordGenerator;
use libwordcast::history::file::FileStore;
use libwordcast::history::{HistoryFormat, HistoryStore};
use libwordcast::platforms::mock::MockPlatform;
use libwordcast::{RunOutcome, WordcastService};
use tempfile::TempDir;

const LUMINOUS: &str = "Word: Luminous\nMeaning: Full of or shedding light.\nExample: The luminous moon lit the path.";
const SERENDIPITY: &str = "Word: Serendipity\nMeaning: Finding good things by chance.\nExample: It was pure serendipity that we met.";

fn generator(replies: Vec<Result<String, GeneratorError>>) -> WordGenerator {
    WordGenerator::new(Box::new(ScriptedTextService::new(replies))).with_retry_delay(Duration::ZERO)
}

fn texts(replies: &[&str]) -> Vec<Result<String, GeneratorError>> {
    replies.iter().map(|r| Ok(r.to_string())).collect()
}

#[tokio::test]
async fn test_posts_and_records_first_word() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tweeted_words.json");
    let platform = MockPlatform::success("mock");

    let service = WordcastService::new(
        Box::new(FileStore::new(&path, HistoryFormat::Json)),
        generator(texts(&[LUMINOUS])),
        PostComposer::default(),
    )
    .with_platform(Box::new(platform.clone()));

    let outcome = service.run().await.unwrap();
    assert!(outcome.is_posted());
    assert_eq!(outcome.word(), Some("Luminous"));

    assert_eq!(
        platform.posted_content(),
        vec![
            "Word of the day: Luminous\n\n\
             Meaning: Full of or shedding light.\n\n\
             Example: The luminous moon lit the path.\n\n\
             #vocabulary #spellbee"
                .to_string()
        ]
    );

    let saved = std::fs::read_to_string(&path).unwrap();
    assert_eq!(saved, r#"["luminous"]"#);
}

#[tokio::test]
async fn test_duplicate_is_skipped_and_history_grows() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tweeted_words.txt");
    std::fs::write(&path, "luminous\n").unwrap();
    let platform = MockPlatform::success("mock");

    let service = WordcastService::new(
        Box::new(FileStore::new(&path, HistoryFormat::Lines)),
        generator(texts(&[LUMINOUS, SERENDIPITY])),
        PostComposer::default(),
    )
    .with_platform(Box::new(platform.clone()));

    let outcome = service.run().await.unwrap();
    assert_eq!(outcome.word(), Some("Serendipity"));
    assert_eq!(platform.post_call_count(), 1);
    assert!(platform.posted_content()[0].starts_with("Word of the day: Serendipity"));

    let saved = std::fs::read_to_string(&path).unwrap();
    assert_eq!(saved, "luminous\nserendipity\n");
}

#[tokio::test]
async fn test_exhausted_attempts_post_nothing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tweeted_words.json");
    std::fs::write(&path, r#"["luminous"]"#).unwrap();
    let platform = MockPlatform::success("mock");

    let replies = vec![
        Ok(LUMINOUS.to_string()),
        Err(GeneratorError::Transport("connection reset".to_string())),
        Ok("I'm sorry, I can't help with that.".to_string()),
    ];
    let service = WordcastService::new(
        Box::new(FileStore::new(&path, HistoryFormat::Json)),
        generator(replies),
        PostComposer::default(),
    )
    .with_platform(Box::new(platform.clone()));

    let outcome = service.run().await.unwrap();
    assert!(matches!(outcome, RunOutcome::NoUniqueWord));
    assert_eq!(platform.post_call_count(), 0);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), r#"["luminous"]"#);
}

#[tokio::test]
async fn test_publish_failure_leaves_history_untouched() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tweeted_words.json");
    std::fs::write(&path, r#"["placid"]"#).unwrap();
    let platform = MockPlatform::post_failure(
        "mock",
        PlatformError::Authentication("bad credentials".to_string()),
    );

    let store = FileStore::new(&path, HistoryFormat::Json);
    let service = WordcastService::new(
        Box::new(FileStore::new(&path, HistoryFormat::Json)),
        generator(texts(&[LUMINOUS])),
        PostComposer::default(),
    )
    .with_platform(Box::new(platform.clone()));

    let outcome = service.run().await.unwrap();
    match &outcome {
        RunOutcome::PublishFailed { word, error } => {
            assert_eq!(word, "Luminous");
            assert!(matches!(error, PlatformError::Authentication(_)));
        }
        other => panic!("Expected PublishFailed, got {:?}", other),
    }

    let history = store.load().await.unwrap();
    assert_eq!(history.as_slice(), ["placid".to_string()]);
}

#[tokio::test]
async fn test_consecutive_runs_never_repeat_a_word() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history").join("words.json");
    let platform = MockPlatform::success("mock");

    // The second run is offered the first run's word again before a new one
    for replies in [vec![LUMINOUS], vec![LUMINOUS, SERENDIPITY]] {
        let service = WordcastService::new(
            Box::new(FileStore::new(&path, HistoryFormat::Json)),
            generator(texts(&replies)),
            PostComposer::default(),
        )
        .with_platform(Box::new(platform.clone()));
        assert!(service.run().await.unwrap().is_posted());
    }

    assert_eq!(platform.post_call_count(), 2);
    let history = FileStore::new(&path, HistoryFormat::Json).load().await.unwrap();
    assert_eq!(history.iter().collect::<Vec<_>>(), vec!["luminous", "serendipity"]);
}

#[tokio::test]
async fn test_malformed_history_is_treated_as_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tweeted_words.json");
    std::fs::write(&path, "{not json").unwrap();
    let platform = MockPlatform::success("mock");

    let service = WordcastService::new(
        Box::new(FileStore::new(&path, HistoryFormat::Json)),
        generator(texts(&[LUMINOUS])),
        PostComposer::default(),
    )
    .with_platform(Box::new(platform.clone()));

    let outcome = service.run().await.unwrap();
    assert!(outcome.is_posted());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), r#"["luminous"]"#);
}

#[tokio::test]
async fn test_custom_template_without_hashtags() {
    let dir = TempDir::new().unwrap();
    let platform = MockPlatform::success("mock");

    let service = WordcastService::new(
        Box::new(FileStore::new(dir.path().join("w.txt"), HistoryFormat::Lines)),
        generator(texts(&[LUMINOUS])),
        PostComposer::new("{word}: {meaning}", ""),
    )
    .with_platform(Box::new(platform.clone()));

    service.run().await.unwrap();
    assert_eq!(
        platform.posted_content(),
        vec!["Luminous: Full of or shedding light.".to_string()]
    );
}
