#![forbid(unsafe_code)]

//! Slot selection values and their `id[@version]:name` wire format.
//!
//! The widget treats a selection as opaque beyond display and equality. The
//! wire form is what the backend loader parses, so it is kept byte-stable:
//! anything that does not parse as a model reference is carried verbatim as
//! [`Selector::Raw`] and written back unchanged.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Wire spelling of the empty selection.
pub const NONE_LITERAL: &str = "None";

/// A reference to one catalog model version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelRef {
    /// Stable model identifier.
    pub id: u64,
    /// Version identifier, when the catalog knows one.
    pub version: Option<u64>,
    /// Display name.
    pub name: String,
}

impl ModelRef {
    /// Create a reference.
    pub fn new(id: u64, version: Option<u64>, name: impl Into<String>) -> Self {
        Self {
            id,
            version,
            name: name.into(),
        }
    }
}

impl fmt::Display for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.version {
            Some(v) => write!(f, "{}@{}:{}", self.id, v, self.name),
            None => write!(f, "{}:{}", self.id, self.name),
        }
    }
}

/// What a slot currently points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Selector {
    /// No model selected.
    #[default]
    None,
    /// A parsed `id[@version]:name` reference.
    Model(ModelRef),
    /// Any other string (placeholders, foreign values). Round-trips verbatim.
    Raw(String),
}

impl Selector {
    /// Whether this is the empty selection.
    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// The name shown in the slot, with any id/version prefix stripped.
    pub fn display_name(&self) -> &str {
        match self {
            Self::None => NONE_LITERAL,
            Self::Model(m) => &m.name,
            Self::Raw(s) => s.split_once(':').map_or(s.as_str(), |(_, name)| name),
        }
    }

    /// Model and version ids, if the value names a model.
    ///
    /// Raw values are accepted when their id part is numeric
    /// (`"123"` or `"123@4"`), matching what the loader tolerates.
    pub fn ids(&self) -> Option<(u64, Option<u64>)> {
        match self {
            Self::None => None,
            Self::Model(m) => Some((m.id, m.version)),
            Self::Raw(s) => {
                if s.starts_with('(') {
                    return None;
                }
                let id_part = s.split_once(':').map_or(s.as_str(), |(id, _)| id);
                parse_id_part(id_part)
            }
        }
    }
}

fn parse_id_part(id_part: &str) -> Option<(u64, Option<u64>)> {
    match id_part.split_once('@') {
        Some((mid, vid)) => {
            let mid = mid.parse().ok()?;
            let vid = if vid.is_empty() || vid == NONE_LITERAL {
                None
            } else {
                Some(vid.parse().ok()?)
            };
            Some((mid, vid))
        }
        None => id_part.parse().ok().map(|mid| (mid, None)),
    }
}

impl From<ModelRef> for Selector {
    fn from(value: ModelRef) -> Self {
        Self::Model(value)
    }
}

impl From<&str> for Selector {
    fn from(value: &str) -> Self {
        match value.parse() {
            Ok(sel) => sel,
            Err(never) => match never {},
        }
    }
}

impl FromStr for Selector {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.eq_ignore_ascii_case(NONE_LITERAL) {
            return Ok(Self::None);
        }
        if let Some((id_part, name)) = s.split_once(':')
            && let Some((id, version)) = parse_id_part(id_part)
        {
            // Only canonical spellings become Model, so Display reproduces `s`.
            let model = ModelRef::new(id, version, name);
            if model.to_string() == s {
                return Ok(Self::Model(model));
            }
        }
        Ok(Self::Raw(s.to_owned()))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str(NONE_LITERAL),
            Self::Model(m) => m.fmt(f),
            Self::Raw(s) => f.write_str(s),
        }
    }
}

impl Serialize for Selector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Selector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map_or(Self::None, |s| Self::from(s.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_versioned_reference() {
        let sel = Selector::from("12@34:Detail Tweaker");
        assert_eq!(
            sel,
            Selector::Model(ModelRef::new(12, Some(34), "Detail Tweaker"))
        );
        assert_eq!(sel.display_name(), "Detail Tweaker");
        assert_eq!(sel.to_string(), "12@34:Detail Tweaker");
    }

    #[test]
    fn parses_unversioned_reference_with_colons_in_name() {
        let sel = Selector::from("123:foo:bar");
        assert_eq!(sel, Selector::Model(ModelRef::new(123, None, "foo:bar")));
        assert_eq!(sel.display_name(), "foo:bar");
    }

    #[test]
    fn none_spellings() {
        assert!(Selector::from("None").is_none());
        assert!(Selector::from("none").is_none());
        assert!(Selector::from("").is_none());
        assert_eq!(Selector::None.to_string(), "None");
        assert_eq!(Selector::None.display_name(), "None");
    }

    #[test]
    fn raw_values_round_trip() {
        for raw in ["(no models found)", "abc:def", "007:zero-padded", "12@None:legacy"] {
            let sel = Selector::from(raw);
            assert!(matches!(sel, Selector::Raw(_)), "{raw} should stay raw");
            assert_eq!(sel.to_string(), raw);
        }
    }

    #[test]
    fn raw_ids_follow_loader_rules() {
        assert_eq!(Selector::from("12@None:legacy").ids(), Some((12, None)));
        assert_eq!(Selector::from("77").ids(), Some((77, None)));
        assert_eq!(Selector::from("(not connected)").ids(), None);
        assert_eq!(Selector::from("abc:def").ids(), None);
        assert_eq!(Selector::None.ids(), None);
    }

    #[test]
    fn serde_uses_wire_string() {
        let sel = Selector::Model(ModelRef::new(5, None, "x"));
        let json = serde_json::to_string(&sel).unwrap_or_default();
        assert_eq!(json, "\"5:x\"");
        let back: Selector = serde_json::from_str("null").unwrap_or(Selector::Raw(String::new()));
        assert!(back.is_none());
    }
}
