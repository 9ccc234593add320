//! Built-in events shown alongside user-created ones.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::models::{Event, EventStatus, EventType};

/// 2025-01-01T00:00:00Z, counted in days from the Unix epoch.
const SEEDED_AT_DAYS: i64 = 20_089;

struct Seed {
    id: u128,
    name: &'static str,
    event_type: EventType,
    event_date: &'static str,
    start: &'static str,
    end: &'static str,
    venue: &'static str,
    prefecture: &'static str,
    max_participants: i32,
    entry_fee: i32,
    beginner_friendly: bool,
}

const SEEDS: &[Seed] = &[
    Seed {
        id: 0x5eed_0001,
        name: "湘南ビーチボールバレー交流大会",
        event_type: EventType::Tournament,
        event_date: "2027-07-18",
        start: "09:00",
        end: "16:00",
        venue: "鵠沼海岸",
        prefecture: "神奈川県",
        max_participants: 64,
        entry_fee: 2000,
        beginner_friendly: false,
    },
    Seed {
        id: 0x5eed_0002,
        name: "お台場 初心者練習会",
        event_type: EventType::Practice,
        event_date: "2027年5月9日",
        start: "10:00",
        end: "12:00",
        venue: "お台場海浜公園",
        prefecture: "東京都",
        max_participants: 20,
        entry_fee: 500,
        beginner_friendly: true,
    },
    Seed {
        id: 0x5eed_0003,
        name: "須磨ビーチカップ",
        event_type: EventType::Tournament,
        event_date: "2027-08-22",
        start: "08:30",
        end: "17:00",
        venue: "須磨海浜公園",
        prefecture: "兵庫県",
        max_participants: 48,
        entry_fee: 3000,
        beginner_friendly: false,
    },
    Seed {
        id: 0x5eed_0004,
        name: "百道浜 週末練習",
        event_type: EventType::Practice,
        event_date: "2027年6月12日",
        start: "13:00",
        end: "15:00",
        venue: "シーサイドももち海浜公園",
        prefecture: "福岡県",
        max_participants: 16,
        entry_fee: 0,
        beginner_friendly: true,
    },
    Seed {
        id: 0x5eed_0005,
        name: "石狩浜サマーオープン",
        event_type: EventType::Tournament,
        event_date: "2027-07-31",
        start: "09:30",
        end: "15:30",
        venue: "石狩浜海水浴場",
        prefecture: "北海道",
        max_participants: 32,
        entry_fee: 1500,
        beginner_friendly: true,
    },
];

pub fn seed_events() -> Vec<Event> {
    let seeded_at: DateTime<Utc> = DateTime::UNIX_EPOCH + Duration::days(SEEDED_AT_DAYS);

    SEEDS
        .iter()
        .map(|s| Event {
            id: Uuid::from_u128(s.id),
            name: s.name.to_string(),
            event_type: s.event_type,
            event_date: s.event_date.to_string(),
            start_time: Some(s.start.to_string()),
            end_time: Some(s.end.to_string()),
            venue: s.venue.to_string(),
            prefecture: s.prefecture.to_string(),
            max_participants: Some(s.max_participants),
            entry_fee: Some(s.entry_fee),
            beginner_friendly: s.beginner_friendly,
            description: None,
            creator_id: None,
            status: EventStatus::Recruiting,
            created_at: seeded_at,
            updated_at: seeded_at,
            deleted_at: None,
        })
        .collect()
}
