//! Overpass JSON response schema.
//!
//! Only the fields needed for geometry reconstruction are decoded. Elements
//! of kinds other than node, way and relation are ignored.
//!
//! Each element is decoded on its own: one that does not fit the schema
//! becomes [`OsmElement::Malformed`] instead of failing the whole response.
//!
//! See: <https://wiki.openstreetmap.org/wiki/Overpass_API/Output_Formats#JSON>

use osmpoi_core::Tags;
use serde::{Deserialize, Deserializer};

/// Top-level Overpass response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OverpassResponse {
    /// Elements in server output order.
    #[serde(default, deserialize_with = "tolerant_elements")]
    pub elements: Vec<OsmElement>,
    /// Server remark, set when a query hit a runtime error such as a timeout.
    #[serde(default)]
    pub remark: Option<String>,
}

/// A single element, discriminated by its `type` field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OsmElement {
    /// A point.
    Node(NodeElement),
    /// An ordered list of node references.
    Way(WayElement),
    /// A grouping of members.
    Relation(RelationElement),
    /// An element whose fields do not match the schema.
    #[serde(skip)]
    Malformed(MalformedElement),
    /// Any other element kind (e.g. `area`, `count`).
    #[serde(other)]
    Other,
}

/// Identity and decoding error of an element that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedElement {
    /// The element's `type` field, if it was a string.
    pub kind: Option<String>,
    /// The element's `id` field, if it was an integer.
    pub id: Option<i64>,
    /// Decoder description of the mismatch.
    pub message: String,
}

/// Node element.
///
/// Missing or non-numeric coordinates decode as `None` so that a single bad
/// node never fails the whole response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NodeElement {
    /// Node id.
    pub id: i64,
    /// Latitude in degrees.
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub lat: Option<f64>,
    /// Longitude in degrees.
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub lon: Option<f64>,
    /// Tags; `None` when the element carries no `tags` object.
    #[serde(default)]
    pub tags: Option<Tags>,
}

/// Way element.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WayElement {
    /// Way id.
    pub id: i64,
    /// Referenced node ids in order.
    #[serde(default)]
    pub nodes: Vec<i64>,
    /// Tags, if any.
    #[serde(default)]
    pub tags: Option<Tags>,
}

/// Relation element.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RelationElement {
    /// Relation id.
    pub id: i64,
    /// Members in order.
    #[serde(default)]
    pub members: Vec<RelationMember>,
    /// Tags, if any.
    #[serde(default)]
    pub tags: Option<Tags>,
}

impl RelationElement {
    /// Value of tag `key`, if present.
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .as_ref()
            .and_then(|tags| tags.get(key))
            .map(String::as_str)
    }

    /// Ids of `way` members in membership order.
    #[must_use]
    pub fn member_way_ids(&self) -> Vec<i64> {
        self.members
            .iter()
            .filter(|member| member.is_way())
            .map(|member| member.reference)
            .collect()
    }
}

/// Relation member reference.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RelationMember {
    /// Kind of the referenced element (`node`, `way` or `relation`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Id of the referenced element.
    #[serde(rename = "ref")]
    pub reference: i64,
    /// Member role, e.g. `outer` or `inner`.
    #[serde(default)]
    pub role: String,
}

impl RelationMember {
    /// Whether the member references a way.
    #[must_use]
    pub fn is_way(&self) -> bool {
        self.kind == "way"
    }
}

fn lenient_coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(serde_json::Value::as_f64))
}

fn tolerant_elements<'de, D>(deserializer: D) -> Result<Vec<OsmElement>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.into_iter().map(decode_element).collect())
}

fn decode_element(value: serde_json::Value) -> OsmElement {
    let kind = value
        .get("type")
        .and_then(serde_json::Value::as_str)
        .map(str::to_owned);
    let id = value.get("id").and_then(serde_json::Value::as_i64);
    serde_json::from_value(value).unwrap_or_else(|err| {
        OsmElement::Malformed(MalformedElement {
            kind,
            id,
            message: err.to_string(),
        })
    })
}
