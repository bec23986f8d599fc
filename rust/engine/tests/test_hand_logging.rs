use std::fs;

use poker_core::config::TableConfig;
use poker_core::deck::DeckSeed;
use poker_core::history::{format_hand_id, HandLogger, HandRecord, Street};
use poker_core::player::{ParticipantId, PlayerAction};
use poker_core::table::Table;

fn played_hand() -> HandRecord {
    let mut t = Table::new(TableConfig::default()).unwrap();
    t.join(ParticipantId::from("a"), 5_000).unwrap();
    t.join(ParticipantId::from("b"), 5_000).unwrap();
    t.seats_ready().unwrap();
    t.start_hand(DeckSeed::from_u64(77)).unwrap();
    t.act(&"a".into(), PlayerAction::AllIn).unwrap();
    t.act(&"b".into(), PlayerAction::Call).unwrap();
    t.resolve_showdown().unwrap();
    t.complete_payout().unwrap();
    t.hand_record().cloned().unwrap()
}

#[test]
fn writes_jsonl_with_lf_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history").join("hands.jsonl");
    let mut logger = HandLogger::create(&path).expect("create logger");
    logger.write(&played_hand()).expect("write");
    logger.write(&HandRecord::new(2)).expect("write");

    let bytes = fs::read(&path).expect("read file");
    assert!(bytes.ends_with(b"\n"));
    assert!(!bytes.contains(&b'\r'));
    let text = String::from_utf8(bytes).unwrap();
    assert_eq!(text.lines().count(), 2);
}

#[test]
fn sequential_ids_increment() {
    let mut logger = HandLogger::detached("20251231");
    assert_eq!(logger.next_id(), "20251231-000001");
    assert_eq!(logger.next_id(), "20251231-000002");
    assert_eq!(format_hand_id("20250102", 42), "20250102-000042");
}

#[test]
fn ts_is_generated_when_missing_and_preserved_when_present() {
    let mut logger = HandLogger::detached("20250102");
    let written = logger.write(&HandRecord::new(1)).unwrap();
    assert_eq!(written.hand_id.as_deref(), Some("20250102-000001"));
    assert!(written.ts.is_some());

    let mut rec = HandRecord::new(2);
    rec.hand_id = Some("custom".to_string());
    rec.ts = Some("2025-01-02T03:04:05Z".to_string());
    let written = logger.write(&rec).unwrap();
    assert_eq!(written.hand_id.as_deref(), Some("custom"));
    assert_eq!(written.ts.as_deref(), Some("2025-01-02T03:04:05Z"));
}

#[test]
fn played_hand_round_trips_through_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hands.jsonl");
    let mut logger = HandLogger::create(&path).unwrap();
    let written = logger.write(&played_hand()).unwrap();

    let line = fs::read_to_string(&path).unwrap();
    let parsed: HandRecord = serde_json::from_str(line.trim_end()).unwrap();
    assert_eq!(parsed, written);
    assert_eq!(parsed.board.len(), 5);
    assert_eq!(parsed.actions[0].street, Street::Preflop);
    assert_eq!(parsed.deltas.iter().map(|d| d.delta).sum::<i64>(), 0);
    let showdown = parsed.showdown.expect("showdown info");
    assert_eq!(showdown.hands.len(), 2);
    assert!(!showdown.winners.is_empty());
}
