use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// A JSON scalar as it appears in a telemetry document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DisplayValue {
    Boolean(bool),
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Text(String),
}

impl From<&str> for DisplayValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Unsigned(v) => write!(f, "{v}"),
            Self::Signed(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

/// Values read in one poll cycle, keyed by tag in point order.
///
/// Serializes as a flat JSON object. Tags of points whose read failed are
/// simply absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetryDocument {
    entries: Vec<(String, DisplayValue)>,
}

impl TelemetryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `tag`, or replaces its value in place if already present.
    pub fn insert(&mut self, tag: impl Into<String>, value: DisplayValue) {
        let tag = tag.into();
        match self.entries.iter_mut().find(|(t, _)| *t == tag) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((tag, value)),
        }
    }

    pub fn get(&self, tag: &str) -> Option<&DisplayValue> {
        self.entries.iter().find(|(t, _)| t == tag).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(t, _)| t.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DisplayValue)> {
        self.entries.iter().map(|(t, v)| (t.as_str(), v))
    }
}

impl Serialize for TelemetryDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (tag, value) in &self.entries {
            map.serialize_entry(tag, value)?;
        }
        map.end()
    }
}

/// `temp: 22, occupied: yes`
impl fmt::Display for TelemetryDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (tag, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{tag}: {value}")?;
        }
        Ok(())
    }
}
