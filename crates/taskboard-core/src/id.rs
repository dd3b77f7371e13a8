//! Document identifiers.
//!
//! Every board, column and card is addressed by a 12-byte identifier rendered
//! as 24 hexadecimal characters. Freshly generated ids sort roughly by
//! creation time: the layout is 4 bytes of Unix seconds, 5 bytes of
//! per-process randomness and a 3-byte rolling counter.

use chrono::Utc;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;
use uuid::Uuid;

use crate::TaskboardError;

const ID_BYTES: usize = 12;
const HEX_LEN: usize = ID_BYTES * 2;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; ID_BYTES]);

fn process_unique() -> &'static [u8; 5] {
    static UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();
    UNIQUE.get_or_init(|| {
        let random = Uuid::new_v4();
        let mut bytes = [0u8; 5];
        bytes.copy_from_slice(&random.as_bytes()[..5]);
        bytes
    })
}

fn counter() -> &'static AtomicU32 {
    static COUNTER: OnceLock<AtomicU32> = OnceLock::new();
    COUNTER.get_or_init(|| {
        let random = Uuid::new_v4();
        let bytes = random.as_bytes();
        AtomicU32::new(u32::from_be_bytes([0, bytes[5], bytes[6], bytes[7]]))
    })
}

impl ObjectId {
    pub fn new() -> Self {
        let seconds = Utc::now().timestamp().clamp(0, u32::MAX as i64) as u32;
        let count = counter().fetch_add(1, Ordering::Relaxed) & 0x00ff_ffff;

        let mut bytes = [0u8; ID_BYTES];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(process_unique());
        bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; ID_BYTES]) -> Self {
        Self(bytes)
    }

    pub fn bytes(&self) -> [u8; ID_BYTES] {
        self.0
    }

    /// Parse a 24-character hexadecimal id, reporting which field was malformed.
    pub fn parse_field(field: &str, value: &str) -> Result<Self, TaskboardError> {
        value.parse().map_err(|_| {
            TaskboardError::Validation(format!(
                "\"{}\" must be a 24 character hexadecimal id, got {:?}",
                field, value
            ))
        })
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseObjectIdError(String);

impl fmt::Display for ParseObjectIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid object id {:?}", self.0)
    }
}

impl std::error::Error for ParseObjectIdError {}

impl FromStr for ObjectId {
    type Err = ParseObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != HEX_LEN || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseObjectIdError(s.to_string()));
        }

        let mut bytes = [0u8; ID_BYTES];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16)
                .map_err(|_| ParseObjectIdError(s.to_string()))?;
        }
        Ok(Self(bytes))
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId(\"{}\")", self)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_new_ids_are_unique_and_well_formed() {
        let ids: HashSet<ObjectId> = (0..1000).map(|_| ObjectId::new()).collect();
        assert_eq!(ids.len(), 1000);
        for id in ids {
            let rendered = id.to_string();
            assert_eq!(rendered.len(), 24);
            assert_eq!(rendered.parse::<ObjectId>().unwrap(), id);
        }
    }

    #[test]
    fn test_parse_accepts_mixed_case_hex() {
        let id: ObjectId = "65A1F0C2E4B0A1B2C3D4E5F6".parse().unwrap();
        assert_eq!(id.to_string(), "65a1f0c2e4b0a1b2c3d4e5f6");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("".parse::<ObjectId>().is_err());
        assert!("65a1f0c2e4b0a1b2c3d4e5f".parse::<ObjectId>().is_err());
        assert!("65a1f0c2e4b0a1b2c3d4e5f6a".parse::<ObjectId>().is_err());
        assert!("zza1f0c2e4b0a1b2c3d4e5f6".parse::<ObjectId>().is_err());
        assert!("65a1f0c2-4b0a1b2c3d4e5f6".parse::<ObjectId>().is_err());
    }

    #[test]
    fn test_parse_field_reports_field_name() {
        let err = ObjectId::parse_field("cardId", "nope").unwrap_err();
        assert!(matches!(err, TaskboardError::Validation(msg) if msg.contains("cardId")));
    }

    #[test]
    fn test_serde_uses_hex_string() {
        let id: ObjectId = "65a1f0c2e4b0a1b2c3d4e5f6".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"65a1f0c2e4b0a1b2c3d4e5f6\"");

        let back: ObjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        assert!(serde_json::from_str::<ObjectId>("\"not-an-id\"").is_err());
    }

    #[test]
    fn test_ids_embed_creation_time() {
        let before = Utc::now().timestamp() as u32;
        let id = ObjectId::new();
        let seconds = u32::from_be_bytes([id.0[0], id.0[1], id.0[2], id.0[3]]);
        assert!(seconds >= before);
    }
}
