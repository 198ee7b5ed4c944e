//! Records as they appear in the raw portfolio, profile and transcript files.

use crate::error::{MergeError, MergeResult};
use crate::schema::{OfferEventKind, OfferId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// One line of `portfolio.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOffer {
    pub id: String,
    pub offer_type: String,
    pub difficulty: f64,
    pub reward: f64,
    /// Days.
    pub duration: f64,
    pub channels: Vec<String>,
}

/// One line of `profile.json`. Gender and income are null for customers
/// who did not share them (their age is the placeholder 118).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawProfile {
    pub id: String,
    #[serde(default)]
    pub gender: Option<String>,
    pub age: u32,
    #[serde(default)]
    pub income: Option<f64>,
    /// Calendar date encoded as `YYYYMMDD`.
    pub became_member_on: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TranscriptEvent {
    #[serde(rename = "offer received")]
    OfferReceived,
    #[serde(rename = "offer viewed")]
    OfferViewed,
    #[serde(rename = "offer completed")]
    OfferCompleted,
    #[serde(rename = "transaction")]
    Transaction,
}

impl TranscriptEvent {
    /// The offer lifecycle stage, or `None` for transactions.
    #[must_use]
    pub const fn offer_kind(self) -> Option<OfferEventKind> {
        match self {
            Self::OfferReceived => Some(OfferEventKind::Received),
            Self::OfferViewed => Some(OfferEventKind::Viewed),
            Self::OfferCompleted => Some(OfferEventKind::Completed),
            Self::Transaction => None,
        }
    }
}

/// One line of `transcript.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTranscriptEntry {
    pub person: String,
    pub event: TranscriptEvent,
    /// Semi-structured payload; see [`EventPayload::decode`].
    pub value: Map<String, Value>,
    /// Hours since the start of the experiment.
    pub time: f64,
}

impl RawTranscriptEntry {
    pub fn payload(&self) -> MergeResult<EventPayload> {
        EventPayload::decode(self.event, &self.value)
    }
}

/// Decoded transcript payload.
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    Offer {
        offer_id: OfferId,
        /// Only present on completion events.
        reward: Option<f64>,
    },
    Transaction {
        amount: f64,
    },
}

impl EventPayload {
    /// Decode the payload of an event of kind `event`.
    ///
    /// # Errors
    /// [`MergeError::Schema`] when the payload lacks the field its event kind
    /// needs, or the field has the wrong JSON type.
    pub fn decode(event: TranscriptEvent, value: &Map<String, Value>) -> MergeResult<Self> {
        let object = Value::Object(value.clone());
        if event == TranscriptEvent::Transaction {
            let TransactionPayload { amount } = serde_json::from_value(object)
                .map_err(|e| bad_payload("transaction payload", &e, value))?;
            return Ok(Self::Transaction { amount });
        }
        let OfferPayload { offer_id, reward } = serde_json::from_value(object)
            .map_err(|e| bad_payload("offer event payload", &e, value))?;
        Ok(Self::Offer {
            offer_id: offer_id.into(),
            reward,
        })
    }
}

/// Both spellings occur in the transcript: `offer id` on received/viewed
/// events, `offer_id` on completed ones.
#[derive(Deserialize)]
struct OfferPayload {
    #[serde(alias = "offer id")]
    offer_id: RawOfferId,
    #[serde(default)]
    reward: Option<f64>,
}

#[derive(Deserialize)]
struct TransactionPayload {
    amount: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawOfferId {
    Text(String),
    Number(serde_json::Number),
}

impl From<RawOfferId> for OfferId {
    fn from(id: RawOfferId) -> Self {
        match id {
            RawOfferId::Text(s) => s,
            RawOfferId::Number(n) => n.to_string(),
        }
    }
}

fn bad_payload(what: &str, err: &serde_json::Error, value: &Map<String, Value>) -> MergeError {
    MergeError::schema(
        "transcript",
        format!("{what}: {err}: {}", Value::Object(value.clone())),
    )
}

/// Locations of the three raw datasets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPaths {
    pub portfolio: PathBuf,
    pub profile: PathBuf,
    pub transcript: PathBuf,
}

impl DatasetPaths {
    /// `portfolio.json`, `profile.json` and `transcript.json` under `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            portfolio: dir.join("portfolio.json"),
            profile: dir.join("profile.json"),
            transcript: dir.join("transcript.json"),
        }
    }
}

/// The three raw datasets, fully loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTables {
    pub offers: Vec<RawOffer>,
    pub profiles: Vec<RawProfile>,
    pub transcript: Vec<RawTranscriptEntry>,
}

#[cfg(feature = "io-jsonl")]
impl RawTables {
    /// Read all three datasets as JSON Lines.
    ///
    /// # Errors
    /// If any file cannot be opened or a line does not parse; the error names
    /// the file and line.
    pub fn load(paths: &DatasetPaths) -> anyhow::Result<Self> {
        use crate::io::jsonl::read_jsonl_vec;
        let offers = read_jsonl_vec(&paths.portfolio)?;
        let profiles = read_jsonl_vec(&paths.profile)?;
        let transcript = read_jsonl_vec(&paths.transcript)?;
        tracing::info!(
            offers = offers.len(),
            profiles = profiles.len(),
            transcript = transcript.len(),
            "loaded raw datasets"
        );
        Ok(Self {
            offers,
            profiles,
            transcript,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn both_offer_id_spellings_decode() -> MergeResult<()> {
        let viewed = EventPayload::decode(
            TranscriptEvent::OfferViewed,
            &obj(json!({ "offer id": "abc" })),
        )?;
        let completed = EventPayload::decode(
            TranscriptEvent::OfferCompleted,
            &obj(json!({ "offer_id": "abc", "reward": 5 })),
        )?;
        assert_eq!(
            viewed,
            EventPayload::Offer {
                offer_id: "abc".into(),
                reward: None
            }
        );
        assert_eq!(
            completed,
            EventPayload::Offer {
                offer_id: "abc".into(),
                reward: Some(5.0)
            }
        );
        Ok(())
    }

    #[test]
    fn mismatched_payload_is_a_schema_error() {
        let err = EventPayload::decode(
            TranscriptEvent::Transaction,
            &obj(json!({ "offer id": "abc" })),
        )
        .unwrap_err();
        assert!(matches!(err, MergeError::Schema { table: "transcript", .. }));

        let err = EventPayload::decode(
            TranscriptEvent::OfferReceived,
            &obj(json!({ "amount": 3.5 })),
        )
        .unwrap_err();
        assert!(err.to_string().contains("missing field `offer_id`"));
    }

    #[test]
    fn numeric_offer_ids_become_strings() -> MergeResult<()> {
        let payload = EventPayload::decode(
            TranscriptEvent::OfferReceived,
            &obj(json!({ "offer id": 17 })),
        )?;
        assert_eq!(
            payload,
            EventPayload::Offer {
                offer_id: "17".into(),
                reward: None
            }
        );
        let err = EventPayload::decode(
            TranscriptEvent::OfferViewed,
            &obj(json!({ "offer id": [1, 2] })),
        )
        .unwrap_err();
        assert!(matches!(err, MergeError::Schema { table: "transcript", .. }));
        Ok(())
    }

    #[test]
    fn transcript_line_deserializes() -> anyhow::Result<()> {
        let line = r#"{"person":"p1","event":"transaction","value":{"amount":0.83},"time":132}"#;
        let entry: RawTranscriptEntry = serde_json::from_str(line)?;
        assert_eq!(entry.event, TranscriptEvent::Transaction);
        assert_eq!(entry.time, 132.0);
        assert_eq!(entry.payload()?, EventPayload::Transaction { amount: 0.83 });
        Ok(())
    }
}
