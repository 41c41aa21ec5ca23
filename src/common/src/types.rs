use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;

/// Admin account created on the first server start.
pub const ADMIN_ID: u64 = 1;
pub const DATA_PATH_METADATA: &str = "md";

/// Update-request field that distinguishes "not sent" from "sent".
///
/// Combine with `#[serde(default, skip_serializing_if = "OptionalProperty::is_none")]`
/// so that absent fields stay untouched on update.
#[derive(Clone, PartialEq, PartialOrd, Eq, Ord, Debug, Hash)]
pub enum OptionalProperty<T> {
    None,
    Some(T),
}

impl<T> Default for OptionalProperty<T> {
    #[inline]
    fn default() -> OptionalProperty<T> {
        OptionalProperty::None
    }
}

impl<T> OptionalProperty<T> {
    pub fn insert(&mut self, v: T) {
        *self = OptionalProperty::Some(v)
    }

    pub fn is_none(&self) -> bool {
        matches!(self, OptionalProperty::None)
    }

    /// Overwrites `dst` when a value was sent.
    pub fn apply(self, dst: &mut T) {
        if let OptionalProperty::Some(v) = self {
            *dst = v;
        }
    }
}

impl<T> Serialize for OptionalProperty<T>
where T: Serialize
{
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where S: Serializer {
        match self {
            OptionalProperty::None => serializer.serialize_unit(),
            OptionalProperty::Some(v) => serializer.serialize_some(v),
        }
    }
}

impl<'de, T> Deserialize<'de> for OptionalProperty<T>
where T: Deserialize<'de>
{
    fn deserialize<D>(de: D) -> std::result::Result<Self, D::Error>
    where D: Deserializer<'de> {
        let a = Deserialize::deserialize(de);
        a.map(OptionalProperty::Some)
    }
}
