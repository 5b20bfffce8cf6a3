//! Spreadsheet rows as they travel between the ingestor, the record store and
//! the dispatcher.
//!
//! Column sets vary from upload to upload, so a [`Row`] is an ordered list of
//! `(column, value)` pairs rather than a fixed struct. Values are restricted to
//! the closed scalar set of [`CellValue`]. The handful of columns the pipeline
//! depends on are named in [`columns`] and validated where they are used.

use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Column names the pipeline reads. Headers are matched verbatim, so a header
/// typed as `"month "` in the sheet does not count as `month`.
pub mod columns {
    pub const ID: &str = "id";
    pub const FULL_NAME: &str = "user_full_name";
    pub const MONTH: &str = "month";
    pub const ORGANIZATION: &str = "organization_name";
    pub const PHONE: &str = "phone_number";
}

/// Largest integer an f64 represents exactly (2^53).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A single cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Number(f64),
    Null,
}

impl CellValue {
    fn as_integer(value: f64) -> Option<i64> {
        if value.is_finite() && value.fract() == 0.0 && value.abs() < MAX_SAFE_INTEGER {
            Some(value as i64)
        } else {
            None
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::String(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::String(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

/// Text coercion used for key comparison and phone matching.
///
/// Whole numbers print without a fractional part, so a phone number stored as
/// a numeric cell reads `998901234567` and not `998901234567.0`.
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => f.write_str(s),
            CellValue::Number(n) => match CellValue::as_integer(*n) {
                Some(i) => write!(f, "{}", i),
                None => write!(f, "{}", n),
            },
            CellValue::Null => Ok(()),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::String(s) => serializer.serialize_str(s),
            CellValue::Number(n) => match CellValue::as_integer(*n) {
                Some(i) => serializer.serialize_i64(i),
                None => serializer.serialize_f64(*n),
            },
            CellValue::Null => serializer.serialize_unit(),
        }
    }
}

struct CellValueVisitor;

impl<'de> Visitor<'de> for CellValueVisitor {
    type Value = CellValue;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a string, number or null")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<CellValue, E> {
        Ok(CellValue::String(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<CellValue, E> {
        Ok(CellValue::Number(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<CellValue, E> {
        Ok(CellValue::Number(v as f64))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<CellValue, E> {
        Ok(CellValue::Number(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<CellValue, E> {
        Ok(CellValue::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<CellValue, E> {
        Ok(CellValue::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<CellValue, E> {
        Ok(CellValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<CellValue, E> {
        Ok(CellValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<CellValue, D::Error> {
        deserializer.deserialize_any(self)
    }

    // Nested structures written into the store by other clients collapse to null.
    fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<CellValue, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(CellValue::Null)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<CellValue, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(CellValue::Null)
    }
}

impl<'de> Deserialize<'de> for CellValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(CellValueVisitor)
    }
}

/// The `(name, month, organization)` tuple that identifies a record in the
/// store. Values keep the exact text of the cell; blankness is judged after
/// trimming.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NaturalKey {
    pub full_name: String,
    pub month: String,
    pub organization: String,
}

/// One decoded spreadsheet line, columns in sheet order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    fields: Vec<(String, CellValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `column`, replacing an existing value in place.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<CellValue>) {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// The cell coerced to text; `None` for missing or null cells.
    pub fn text(&self, column: &str) -> Option<String> {
        match self.get(column) {
            None | Some(CellValue::Null) => None,
            Some(value) => Some(value.to_string()),
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the natural key, or `None` when any part is blank.
    pub fn natural_key(&self) -> Option<NaturalKey> {
        let part = |column: &str| self.text(column).filter(|text| !text.trim().is_empty());
        Some(NaturalKey {
            full_name: part(columns::FULL_NAME)?,
            month: part(columns::MONTH)?,
            organization: part(columns::ORGANIZATION)?,
        })
    }

    pub fn phone(&self) -> Option<String> {
        self.text(columns::PHONE)
    }

    /// Copy of the row carrying the given record id.
    pub fn with_id(&self, id: impl Into<String>) -> Row {
        let mut row = self.clone();
        row.insert(columns::ID, CellValue::String(id.into()));
        row
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

struct RowVisitor;

impl<'de> Visitor<'de> for RowVisitor {
    type Value = Row;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a JSON object of scalar cells")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Row, A::Error> {
        let mut row = Row::new();
        while let Some((column, value)) = access.next_entry::<String, CellValue>()? {
            row.insert(column, value);
        }
        Ok(row)
    }
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RowVisitor)
    }
}
