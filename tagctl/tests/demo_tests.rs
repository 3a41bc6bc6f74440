use std::io::Write;
use tagctl::{demo, Settings};
use tagging::{DuplicatePolicy, TaggingConfig};

#[tokio::test]
async fn test_demo_walkthrough() {
    let steps = demo::run(TaggingConfig::default())
        .await
        .expect("demo should succeed");

    assert_eq!(steps.len(), 8);
    assert_eq!(steps[0], "created tag \"sale\" (id=1)");
    assert_eq!(steps[2], "tags_for(store.product, 7) = [\"sale\"]");
    assert!(steps[4].starts_with("tags_for(store.product, 7) = [\"sale\"]"));
    assert!(steps[5].starts_with("entities_for(1, store.product) = []"));
    assert!(steps[6].contains("cascade removed 1 binding(s)"));
    assert!(steps[7].contains("not registered"));
}

#[tokio::test]
async fn test_demo_with_settings_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[tagging]\nduplicate_policy = \"reuse_existing\"").unwrap();

    let settings = Settings::load(Some(file.path())).unwrap();
    assert_eq!(
        settings.tagging.duplicate_policy,
        DuplicatePolicy::ReuseExisting
    );

    let steps = demo::run(settings.tagging).await.unwrap();
    assert_eq!(steps.len(), 8);
}
