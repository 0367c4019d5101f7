use std::fs;
use tempfile::TempDir;

use kagapa_core::config::{BloomSettings, Config};
use kagapa_core::normalize_word;
use kagapa_core::types::{DictionaryEntry, EntryFilter, Table, Token};

#[test]
fn normalize_is_idempotent() {
    let samples = [
        "  ಕನ್ನಡ  ",
        "caf\u{0065}\u{0301}",
        "\u{0C95}\u{0CC6}\u{0CC2}",
        "\tHello\n",
        "",
        "   ",
        "\u{0CCD}\u{0CBF}",
        "ಕ್ಷ",
    ];
    for s in samples {
        let once = normalize_word(s);
        let twice = normalize_word(&once);
        assert_eq!(once, twice, "normalize must be idempotent for {s:?}");
    }
}

#[test]
fn tokens_that_normalize_alike_are_equal() {
    let a = Token::new(" caf\u{00e9}");
    let b = Token::new("cafe\u{0301} ");
    assert_eq!(a, b);
    assert_eq!(a.as_str(), "caf\u{00e9}");
}

#[test]
fn lowercased_keeps_kannada_untouched() {
    assert_eq!(Token::new("Hello").lowercased().as_str(), "hello");
    assert_eq!(Token::new("ಕನ್ನಡ").lowercased().as_str(), "ಕನ್ನಡ");
}

#[test]
fn new_entries_take_table_defaults() {
    let main = DictionaryEntry::new(Table::Main, Token::new("ಮನೆ"), 1, None);
    let user = DictionaryEntry::new(Table::UserAdded, Token::new("ಮನೆ"), 1, Some("asha".into()));
    assert!(main.verified);
    assert!(!user.verified);
    assert_eq!(user.added_by.as_deref(), Some("asha"));
}

#[test]
fn entry_filter_search_is_case_insensitive() {
    let entry = DictionaryEntry::new(Table::Main, Token::new("Bengaluru"), 3, None);
    let hit = EntryFilter { verified: Some(true), search: Some("GALU".into()) };
    let miss = EntryFilter { verified: Some(false), search: None };
    assert!(hit.matches(&entry));
    assert!(!miss.matches(&entry));
    assert!(EntryFilter::default().matches(&entry));
}

#[test]
fn token_deserialization_normalizes() {
    let token: Token = serde_json::from_str("\" \\u0c95\\u0cc6\\u0cc2\\t\"").unwrap();
    assert_eq!(token, Token::new("\u{0C95}\u{0CCA}"));
    assert_eq!(token.as_str(), "\u{0C95}\u{0CCA}");

    let entry: DictionaryEntry = serde_json::from_str(
        r#"{"word":"cafe\u0301 ","frequency":2,"added_by":null,"verified":true,"created_at":"2024-01-01T00:00:00Z","updated_at":"2024-01-01T00:00:00Z"}"#,
    )
    .unwrap();
    assert_eq!(entry.word.as_str(), "caf\u{00e9}");
    assert_eq!(serde_json::to_value(&entry.word).unwrap(), serde_json::json!("caf\u{00e9}"));
}

#[test]
fn config_defaults_when_sections_missing() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("config.toml"), "[other]\nkey = 1\n").unwrap();
    let config = Config::load_from(tmp.path()).expect("load");
    assert_eq!(config.bloom().unwrap(), BloomSettings::default());
    assert!(config.store().unwrap().path.is_none());
    assert_eq!(config.store().unwrap().compact_every, 10_000);
}

#[test]
fn config_reads_bloom_and_store_sections() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("config.toml"),
        "[bloom]\ncapacity = 5000\nerror_rate = 0.01\n\n[store]\npath = \"data/words.json\"\ncompact_every = 50\n",
    )
    .unwrap();
    let config = Config::load_from(tmp.path()).expect("load");
    let bloom = config.bloom().unwrap();
    assert_eq!(bloom.capacity, 5000);
    assert!((bloom.error_rate - 0.01).abs() < f64::EPSILON);
    assert_eq!(bloom.batch_size, 10_000, "unset fields keep their default");
    let store = config.store().unwrap();
    assert_eq!(store.compact_every, 50);
    assert_eq!(store.resolved_path(tmp.path()).unwrap(), tmp.path().join("data/words.json"));
}

#[test]
fn config_rejects_out_of_range_error_rate() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("config.toml"), "[bloom]\nerror_rate = 1.5\n").unwrap();
    assert!(Config::load_from(tmp.path()).is_err());
}
