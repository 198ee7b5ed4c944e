//! Ready-made datasets.

use super::ScenarioBuilder;
use crate::preprocess::{CleanTables, RawOffer, RawProfile, RawTables, RawTranscriptEntry, TranscriptEvent};
use serde_json::{Map, Value, json};

/// Offer `O1` (5 days) received by `C1` at 2.0, viewed at 2.5 and completed
/// at 4.0, with transactions of 10.0 at 3.0 and 5.0 at 8.0. The instance is
/// successful and its spend is 10.0.
#[must_use]
pub fn scenario_viewed_and_completed() -> CleanTables {
    ScenarioBuilder::new()
        .offer("O1", 5.0)
        .customer("C1")
        .received("C1", "O1", 2.0)
        .viewed("C1", "O1", 2.5)
        .completed("C1", "O1", 4.0)
        .transaction("C1", 3.0, 10.0)
        .transaction("C1", 8.0, 5.0)
        .build()
}

/// Offer `O2` (3 days) received by `C2` at 1.0 and never viewed or
/// completed, with a transaction of 20.0 at 1.5. Spend 20.0, not successful.
#[must_use]
pub fn scenario_unviewed_offer() -> CleanTables {
    ScenarioBuilder::new()
        .offer("O2", 3.0)
        .customer("C2")
        .received("C2", "O2", 1.0)
        .transaction("C2", 1.5, 20.0)
        .build()
}

/// Three customers, overlapping offers and events of other offers in the
/// window. Used for ordering and determinism checks.
#[must_use]
pub fn scenario_busy_customers() -> CleanTables {
    ScenarioBuilder::new()
        .offer("bogo5", 5.0)
        .offer("disc7", 7.0)
        .offer("info3", 3.0)
        .customer("a")
        .customer("b")
        .customer("c")
        .received("b", "disc7", 0.0)
        .received("a", "bogo5", 0.0)
        .viewed("b", "disc7", 1.0)
        .received("b", "info3", 2.0)
        .completed("b", "disc7", 6.5)
        .received("c", "info3", 10.0)
        .viewed("a", "bogo5", 4.0)
        .received("a", "disc7", 7.0)
        .completed("a", "bogo5", 5.0)
        .viewed("c", "bogo5", 11.0)
        .transaction("a", 1.0, 2.25)
        .transaction("b", 2.0, 13.0)
        .transaction("a", 8.0, 4.5)
        .transaction("b", 4.0, 0.5)
        .transaction("c", 12.5, 7.75)
        .transaction("a", 5.0, 1.0)
        .build()
}

fn object(v: Value) -> Map<String, Value> {
    match v {
        Value::Object(m) => m,
        _ => Map::new(),
    }
}

fn entry(person: &str, event: TranscriptEvent, value: Value, hours: f64) -> RawTranscriptEntry {
    RawTranscriptEntry {
        person: person.to_string(),
        event,
        value: object(value),
        time: hours,
    }
}

/// Raw datasets shaped like the source files: hour timestamps, both
/// spellings of the offer id key, a profile without income and events of a
/// customer with no profile.
#[must_use]
pub fn raw_sample() -> RawTables {
    let offers = vec![
        RawOffer {
            id: "ae264e3637204a6fb9bb56bc8210ddfd".into(),
            offer_type: "bogo".into(),
            difficulty: 10.0,
            reward: 10.0,
            duration: 7.0,
            channels: vec!["email".into(), "mobile".into(), "social".into()],
        },
        RawOffer {
            id: "3f207df678b143eea3cee63160fa8bed".into(),
            offer_type: "informational".into(),
            difficulty: 0.0,
            reward: 0.0,
            duration: 4.0,
            channels: vec!["web".into(), "email".into(), "mobile".into()],
        },
    ];
    let profiles = vec![
        RawProfile {
            id: "0610b486422d4921ae7d2bf64640c50b".into(),
            gender: Some("F".into()),
            age: 55,
            income: Some(112_000.0),
            became_member_on: 20170715,
        },
        RawProfile {
            id: "38fe809add3b4fcf9315a9694bb96ff5".into(),
            gender: None,
            age: 118,
            income: None,
            became_member_on: 20180712,
        },
        RawProfile {
            id: "78afa995795e4d85b5d9ceeca43f5fef".into(),
            gender: Some("M".into()),
            age: 75,
            income: Some(100_000.0),
            became_member_on: 20170509,
        },
    ];

    let bogo = "ae264e3637204a6fb9bb56bc8210ddfd";
    let info = "3f207df678b143eea3cee63160fa8bed";
    let f = "0610b486422d4921ae7d2bf64640c50b";
    let m = "78afa995795e4d85b5d9ceeca43f5fef";
    let ghost = "38fe809add3b4fcf9315a9694bb96ff5";
    let transcript = vec![
        entry(m, TranscriptEvent::OfferReceived, json!({ "offer id": bogo }), 0.0),
        entry(f, TranscriptEvent::OfferReceived, json!({ "offer id": info }), 0.0),
        entry(ghost, TranscriptEvent::OfferReceived, json!({ "offer id": bogo }), 0.0),
        entry(m, TranscriptEvent::OfferViewed, json!({ "offer id": bogo }), 6.0),
        entry(m, TranscriptEvent::Transaction, json!({ "amount": 19.89 }), 132.0),
        entry(
            m,
            TranscriptEvent::OfferCompleted,
            json!({ "offer_id": bogo, "reward": 10 }),
            132.0,
        ),
        entry(f, TranscriptEvent::Transaction, json!({ "amount": 5.5 }), 48.0),
        entry(ghost, TranscriptEvent::Transaction, json!({ "amount": 3.0 }), 12.0),
        entry(m, TranscriptEvent::Transaction, json!({ "amount": 17.78 }), 216.0),
    ];

    RawTables {
        offers,
        profiles,
        transcript,
    }
}
