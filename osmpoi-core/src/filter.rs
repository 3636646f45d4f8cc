//! Tag filters selecting which OSM elements a query returns.
//!
//! A [`TagFilter`] maps tag keys to either a wildcard (any value) or a
//! non-empty list of accepted values. Matching is a union: an element is
//! selected when it satisfies at least one `(key, value)` pair.

use thiserror::Error;

/// Errors returned when a tag filter has an invalid shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidFilterError {
    /// The filter was not a key/value mapping.
    #[error("tags must be a mapping with values of true, a string, or a list of strings")]
    NotAMapping,
    /// A key was the empty string.
    #[error("tag keys must not be empty")]
    EmptyKey,
    /// A value was neither `true`, a string, nor a list of strings.
    #[error("tag {key:?} must map to true, a string, or a list of strings")]
    InvalidValue {
        /// Offending tag key.
        key: String,
    },
    /// A value list contained no entries.
    #[error("tag {key:?} must list at least one value")]
    EmptyValues {
        /// Offending tag key.
        key: String,
    },
}

/// Accepted values for one tag key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    /// Any value is accepted; only the key must be present.
    Any,
    /// One of the listed values, kept in insertion order.
    OneOf(Vec<String>),
}

/// A normalised `(key, value-or-wildcard)` pair.
///
/// `value` is `None` for wildcard entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagPair<'a> {
    /// Tag key.
    pub key: &'a str,
    /// Required value, or `None` to accept any value.
    pub value: Option<&'a str>,
}

/// Ordered union of tag constraints.
///
/// # Examples
///
/// ```
/// use osmpoi_core::TagFilter;
///
/// # fn main() -> Result<(), osmpoi_core::InvalidFilterError> {
/// let filter = TagFilter::new()
///     .with_any("amenity")?
///     .with_values("landuse", ["retail", "commercial"])?
///     .with_value("highway", "bus_stop")?;
/// assert_eq!(filter.pairs().count(), 4);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "serde_json::Value"))]
pub struct TagFilter {
    entries: Vec<(String, TagValue)>,
}

impl TagFilter {
    /// Create an empty filter.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Accept any value for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidFilterError::EmptyKey`] when `key` is empty.
    pub fn with_any(mut self, key: impl Into<String>) -> Result<Self, InvalidFilterError> {
        self.insert(key.into(), TagValue::Any)?;
        Ok(self)
    }

    /// Accept exactly `value` for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidFilterError::EmptyKey`] when `key` is empty.
    pub fn with_value(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, InvalidFilterError> {
        self.insert(key.into(), TagValue::OneOf(vec![value.into()]))?;
        Ok(self)
    }

    /// Accept any of `values` for `key`, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidFilterError::EmptyKey`] when `key` is empty and
    /// [`InvalidFilterError::EmptyValues`] when `values` yields nothing.
    pub fn with_values<I, V>(
        mut self,
        key: impl Into<String>,
        values: I,
    ) -> Result<Self, InvalidFilterError>
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let key = key.into();
        let collected: Vec<String> = values.into_iter().map(Into::into).collect();
        if collected.is_empty() {
            return Err(InvalidFilterError::EmptyValues { key });
        }
        self.insert(key, TagValue::OneOf(collected))?;
        Ok(self)
    }

    /// Build a filter from a dynamic JSON object.
    ///
    /// Values must be `true`, a string, or a non-empty array of strings.
    /// Key order is preserved.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidFilterError`] describing the first malformed entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use osmpoi_core::TagFilter;
    ///
    /// let filter = TagFilter::from_json(&serde_json::json!({
    ///     "amenity": true,
    ///     "landuse": ["retail", "commercial"],
    /// }))?;
    /// assert_eq!(filter.len(), 2);
    ///
    /// assert!(TagFilter::from_json(&serde_json::json!({"amenity": 3})).is_err());
    /// # Ok::<(), osmpoi_core::InvalidFilterError>(())
    /// ```
    #[cfg(feature = "serde")]
    pub fn from_json(value: &serde_json::Value) -> Result<Self, InvalidFilterError> {
        use serde_json::Value;

        let Value::Object(map) = value else {
            return Err(InvalidFilterError::NotAMapping);
        };
        let mut filter = Self::new();
        for (key, raw) in map {
            let tag_value = match raw {
                Value::Bool(true) => TagValue::Any,
                Value::String(single) => TagValue::OneOf(vec![single.clone()]),
                Value::Array(items) => {
                    let values = items
                        .iter()
                        .map(|item| item.as_str().map(str::to_owned))
                        .collect::<Option<Vec<_>>>()
                        .ok_or_else(|| InvalidFilterError::InvalidValue { key: key.clone() })?;
                    if values.is_empty() {
                        return Err(InvalidFilterError::EmptyValues { key: key.clone() });
                    }
                    TagValue::OneOf(values)
                }
                _ => return Err(InvalidFilterError::InvalidValue { key: key.clone() }),
            };
            filter.insert(key.clone(), tag_value)?;
        }
        Ok(filter)
    }

    /// Number of tag keys in the filter.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the filter has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Constraint registered for `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&TagValue> {
        self.entries
            .iter()
            .find_map(|(candidate, value)| (candidate == key).then_some(value))
    }

    /// Normalised `(key, value-or-wildcard)` pairs in insertion order.
    ///
    /// A wildcard key yields one pair with `value: None`; a value list yields
    /// one pair per listed value.
    pub fn pairs(&self) -> impl Iterator<Item = TagPair<'_>> {
        self.entries.iter().flat_map(|(key, value)| {
            let values: Vec<Option<&str>> = match value {
                TagValue::Any => vec![None],
                TagValue::OneOf(values) => values.iter().map(|v| Some(v.as_str())).collect(),
            };
            values.into_iter().map(move |value| TagPair {
                key: key.as_str(),
                value,
            })
        })
    }

    /// Re-assigning an existing key replaces its constraint in place.
    fn insert(&mut self, key: String, value: TagValue) -> Result<(), InvalidFilterError> {
        if key.is_empty() {
            return Err(InvalidFilterError::EmptyKey);
        }
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl TryFrom<serde_json::Value> for TagFilter {
    type Error = InvalidFilterError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        Self::from_json(&value)
    }
}
