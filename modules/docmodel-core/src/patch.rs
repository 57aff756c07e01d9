//! Three-state field updates for nullable state fields.
//!
//! `Option<T>` already distinguishes present from absent for fields that
//! can't be null. Nullable fields need a third state: the caller may leave
//! the field alone, clear it, or set it.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A partial-update field.
///
/// Use with `#[serde(default, skip_serializing_if = "Patch::is_absent")]`
/// so a missing key decodes as `Absent` and an explicit `null` as `Null`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    /// Field not mentioned in the update. Leave state untouched.
    Absent,
    /// Field explicitly null. Clear the state field.
    Null,
    /// Field present. Overwrite, even with an empty or zero value.
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Absent
    }
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    pub fn as_ref(&self) -> Patch<&T> {
        match self {
            Patch::Absent => Patch::Absent,
            Patch::Null => Patch::Null,
            Patch::Value(v) => Patch::Value(v),
        }
    }

    /// The value when present, `None` for both `Absent` and `Null`.
    pub fn value(&self) -> Option<&T> {
        match self {
            Patch::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Apply to a nullable state field.
    pub fn apply_to(&self, target: &mut Option<T>)
    where
        T: Clone,
    {
        match self {
            Patch::Absent => {}
            Patch::Null => *target = None,
            Patch::Value(v) => *target = Some(v.clone()),
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Patch::Absent | Patch::Null => serializer.serialize_none(),
            Patch::Value(v) => serializer.serialize_some(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize)]
    struct Update {
        #[serde(default, skip_serializing_if = "Patch::is_absent")]
        comment: Patch<String>,
    }

    #[test]
    fn missing_key_is_absent() {
        let u: Update = serde_json::from_value(json!({})).unwrap();
        assert_eq!(u.comment, Patch::Absent);
    }

    #[test]
    fn explicit_null_is_null() {
        let u: Update = serde_json::from_value(json!({"comment": null})).unwrap();
        assert_eq!(u.comment, Patch::Null);
    }

    #[test]
    fn empty_string_is_a_value() {
        let u: Update = serde_json::from_value(json!({"comment": ""})).unwrap();
        assert_eq!(u.comment, Patch::Value(String::new()));
    }

    #[test]
    fn apply_to_respects_all_three_states() {
        let mut field = Some("kept".to_string());

        Patch::<String>::Absent.apply_to(&mut field);
        assert_eq!(field.as_deref(), Some("kept"));

        Patch::Value(String::new()).apply_to(&mut field);
        assert_eq!(field.as_deref(), Some(""));

        Patch::<String>::Null.apply_to(&mut field);
        assert_eq!(field, None);
    }

    #[test]
    fn absent_is_skipped_on_serialize() {
        let value = serde_json::to_value(Update {
            comment: Patch::Absent,
        })
        .unwrap();
        assert_eq!(value, json!({}));
    }
}
