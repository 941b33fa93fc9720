//! Typed view over the per-participant metadata blob.
//!
//! The transport stores metadata as an opaque string. Every writer in the
//! system shares that string, so the record keeps every key it does not
//! understand and writes them back untouched. The two recognized flags are
//! lifted into typed fields:
//!
//! | key       | field      | meaning                                   |
//! |-----------|------------|-------------------------------------------|
//! | `onStage` | `on_stage` | participant is on stage when `true`       |
//! | `isHost`  | `is_host`  | set once from the admission grant         |
//!
//! A recognized key holding a non-boolean value is kept verbatim among the
//! unknown keys and reads as "not set".

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::MetadataError;

pub const ON_STAGE_KEY: &str = "onStage";
pub const IS_HOST_KEY: &str = "isHost";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticipantMetadata {
    on_stage: Option<bool>,
    is_host: Option<bool>,
    extra: Map<String, Value>,
}

/// Keys a single write is allowed to touch. Anything not named here survives the merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetadataPatch {
    pub on_stage: Option<bool>,
}

impl MetadataPatch {
    pub fn stage(on_stage: bool) -> Self {
        Self {
            on_stage: Some(on_stage),
        }
    }
}

impl ParticipantMetadata {
    /// Metadata carried by a fresh admission grant: hosts start on stage, guests backstage.
    pub fn admitted(is_host: bool) -> Self {
        Self {
            on_stage: Some(is_host),
            is_host: Some(is_host),
            extra: Map::new(),
        }
    }

    /// Strict parse. An empty blob is a participant with no flags set.
    pub fn parse(raw: &str) -> Result<Self, MetadataError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }

        match serde_json::from_str::<Value>(raw)? {
            Value::Object(map) => Ok(Self::from_map(map)),
            _ => Err(MetadataError::NotAnObject),
        }
    }

    /// Parse that never fails: malformed or missing metadata reads as "no flags set".
    pub fn parse_or_default(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };

        match Self::parse(raw) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("Malformed participant metadata, treating as empty: {}", e);
                Self::default()
            }
        }
    }

    pub fn from_map(mut map: Map<String, Value>) -> Self {
        let on_stage = take_flag(&mut map, ON_STAGE_KEY);
        let is_host = take_flag(&mut map, IS_HOST_KEY);

        Self {
            on_stage,
            is_host,
            extra: map,
        }
    }

    /// `onStage !== true` is backstage.
    pub fn on_stage(&self) -> bool {
        self.on_stage == Some(true)
    }

    pub fn is_host(&self) -> bool {
        self.is_host == Some(true)
    }

    pub fn on_stage_flag(&self) -> Option<bool> {
        self.on_stage
    }

    /// Value of any key, recognized or not.
    pub fn get(&self, key: &str) -> Option<Value> {
        match key {
            ON_STAGE_KEY if self.on_stage.is_some() => self.on_stage.map(Value::Bool),
            IS_HOST_KEY if self.is_host.is_some() => self.is_host.map(Value::Bool),
            _ => self.extra.get(key).cloned(),
        }
    }

    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    pub fn with_extra(self, key: impl Into<String>, value: Value) -> Self {
        let mut map = self.to_map();
        map.insert(key.into(), value);
        Self::from_map(map)
    }

    /// `next = { ...current, ...patch }`.
    ///
    /// Only the keys named by the patch change. A patched flag also drops any
    /// non-boolean value previously stored under the same key, so the written
    /// blob never carries two values for one key.
    pub fn merge(&self, patch: &MetadataPatch) -> Self {
        let mut next = self.clone();
        if let Some(on_stage) = patch.on_stage {
            next.on_stage = Some(on_stage);
            next.extra.remove(ON_STAGE_KEY);
        }
        next
    }

    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = self.extra.clone();
        if let Some(on_stage) = self.on_stage {
            map.insert(ON_STAGE_KEY.to_owned(), Value::Bool(on_stage));
        }
        if let Some(is_host) = self.is_host {
            map.insert(IS_HOST_KEY.to_owned(), Value::Bool(is_host));
        }
        map
    }

    /// Serialized blob as written to the transport.
    pub fn encode(&self) -> String {
        Value::Object(self.to_map()).to_string()
    }
}

fn take_flag(map: &mut Map<String, Value>, key: &str) -> Option<bool> {
    match map.get(key) {
        Some(Value::Bool(flag)) => {
            let flag = *flag;
            map.remove(key);
            Some(flag)
        }
        _ => None,
    }
}

impl Serialize for ParticipantMetadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ParticipantMetadata {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        Ok(Self::from_map(map))
    }
}
