//! Overpass QL rendering for tag filters over a bounding box.

use std::time::Duration;

use osmpoi_core::{BoundingBox, TagFilter, TagPair};

/// Server-side timeout used when callers do not choose one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);

const ELEMENT_KINDS: [&str; 3] = ["node", "way", "relation"];

/// Render `bbox` as Overpass `(south,west,north,east)` with six decimals.
///
/// # Examples
///
/// ```
/// use osmpoi_core::BoundingBox;
/// use osmpoi_data::overpass::format_bbox;
///
/// let bbox = BoundingBox::new(1.0, 0.0, 1.0, 0.0)?;
/// assert_eq!(format_bbox(&bbox), "(0.000000,0.000000,1.000000,1.000000)");
/// # Ok::<(), osmpoi_core::BoundsError>(())
/// ```
#[must_use]
pub fn format_bbox(bbox: &BoundingBox) -> String {
    format!(
        "({:.6},{:.6},{:.6},{:.6})",
        bbox.south(),
        bbox.west(),
        bbox.north(),
        bbox.east()
    )
}

/// Build the Overpass QL query for `tags` within `bbox`.
///
/// Every normalised tag pair yields three clauses, one per element kind, each
/// recursing into referenced child elements. The envelope is
/// `[out:json][timeout:<secs>]` plus `[maxsize:<memory>]` when `memory` is
/// set; a non-empty `custom_settings` replaces the envelope wholesale.
///
/// Output is deterministic for a given filter insertion order.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use osmpoi_core::{BoundingBox, TagFilter};
/// use osmpoi_data::overpass::build_query;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bbox = BoundingBox::new(1.0, 0.0, 1.0, 0.0)?;
/// let tags = TagFilter::new().with_any("amenity")?;
/// let query = build_query(&bbox, &tags, Duration::from_secs(180), None, None);
/// assert!(query.starts_with("[out:json][timeout:180];("));
/// assert!(query.ends_with(");out;"));
/// # Ok(())
/// # }
/// ```
#[must_use]
pub fn build_query(
    bbox: &BoundingBox,
    tags: &TagFilter,
    timeout: Duration,
    memory: Option<u64>,
    custom_settings: Option<&str>,
) -> String {
    let settings = match custom_settings.filter(|custom| !custom.is_empty()) {
        Some(custom) => custom.to_owned(),
        None => default_settings(timeout, memory),
    };
    let bbox = format_bbox(bbox);

    let mut components = String::new();
    for pair in tags.pairs() {
        let selector = tag_selector(pair);
        for kind in ELEMENT_KINDS {
            components.push_str(&format!("({kind}{selector}{bbox};(._;>;););"));
        }
    }

    format!("{settings};({components});out;")
}

fn default_settings(timeout: Duration, memory: Option<u64>) -> String {
    let maxsize = memory.map_or_else(String::new, |bytes| format!("[maxsize:{bytes}]"));
    format!("[out:json][timeout:{}]{maxsize}", timeout.as_secs())
}

fn tag_selector(pair: TagPair<'_>) -> String {
    match pair.value {
        None => format!("[\"{}\"]", escape(pair.key)),
        Some(value) => format!("[\"{}\"=\"{}\"]", escape(pair.key), escape(value)),
    }
}

/// Escape characters that would terminate an Overpass QL string literal.
fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '"' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn unit_box() -> BoundingBox {
        BoundingBox::new(1.0, 0.0, 1.0, 0.0).expect("valid bounds")
    }

    #[rstest]
    fn renders_wildcard_query_exactly(unit_box: BoundingBox) {
        let tags = TagFilter::new().with_any("amenity").expect("valid filter");
        let query = build_query(&unit_box, &tags, DEFAULT_TIMEOUT, None, None);
        let bbox = "(0.000000,0.000000,1.000000,1.000000)";
        let expected = format!(
            "[out:json][timeout:180];(\
             (node[\"amenity\"]{bbox};(._;>;););\
             (way[\"amenity\"]{bbox};(._;>;););\
             (relation[\"amenity\"]{bbox};(._;>;););\
             );out;"
        );
        assert_eq!(query, expected);
    }

    #[rstest]
    fn groups_clauses_per_pair_in_filter_order(unit_box: BoundingBox) {
        let tags = TagFilter::new()
            .with_any("amenity")
            .and_then(|filter| filter.with_value("shop", "bakery"))
            .expect("valid filter");
        let query = build_query(&unit_box, &tags, DEFAULT_TIMEOUT, None, None);
        let bbox = "(0.000000,0.000000,1.000000,1.000000)";
        let expected = format!(
            "[out:json][timeout:180];(\
             (node[\"amenity\"]{bbox};(._;>;););\
             (way[\"amenity\"]{bbox};(._;>;););\
             (relation[\"amenity\"]{bbox};(._;>;););\
             (node[\"shop\"=\"bakery\"]{bbox};(._;>;););\
             (way[\"shop\"=\"bakery\"]{bbox};(._;>;););\
             (relation[\"shop\"=\"bakery\"]{bbox};(._;>;););\
             );out;"
        );
        assert_eq!(query, expected);
    }

    #[rstest]
    fn renders_key_value_pairs(unit_box: BoundingBox) {
        let tags = TagFilter::new()
            .with_values("landuse", ["retail", "commercial"])
            .expect("valid filter");
        let query = build_query(&unit_box, &tags, DEFAULT_TIMEOUT, None, None);
        assert!(query.contains("(node[\"landuse\"=\"retail\"](0.000000"));
        assert!(query.contains("(relation[\"landuse\"=\"commercial\"](0.000000"));
        let retail = query.find("retail").expect("retail clause");
        let commercial = query.find("commercial").expect("commercial clause");
        assert!(retail < commercial, "values must keep their input order");
    }

    #[rstest]
    fn adds_maxsize_when_memory_is_set(unit_box: BoundingBox) {
        let tags = TagFilter::new().with_any("shop").expect("valid filter");
        let query = build_query(
            &unit_box,
            &tags,
            Duration::from_secs(25),
            Some(1_073_741_824),
            None,
        );
        assert!(query.starts_with("[out:json][timeout:25][maxsize:1073741824];("));
    }

    #[rstest]
    fn custom_settings_replace_the_envelope(unit_box: BoundingBox) {
        let tags = TagFilter::new().with_any("shop").expect("valid filter");
        let query = build_query(
            &unit_box,
            &tags,
            Duration::from_secs(25),
            Some(1024),
            Some("[out:json][date:\"2019-10-28T19:20:00Z\"]"),
        );
        assert!(query.starts_with("[out:json][date:\"2019-10-28T19:20:00Z\"];("));
        assert!(!query.contains("timeout"));
        assert!(!query.contains("maxsize"));
    }

    #[rstest]
    fn empty_custom_settings_fall_back_to_defaults(unit_box: BoundingBox) {
        let tags = TagFilter::new().with_any("shop").expect("valid filter");
        let query = build_query(&unit_box, &tags, DEFAULT_TIMEOUT, None, Some(""));
        assert!(query.starts_with("[out:json][timeout:180];("));
    }

    #[rstest]
    fn formats_six_decimal_places() {
        let bbox = BoundingBox::new(52.123_456_789, -0.5, 13.1, -1.000_000_4).expect("valid");
        assert_eq!(
            format_bbox(&bbox),
            "(-0.500000,-1.000000,52.123457,13.100000)"
        );
    }

    #[rstest]
    fn escapes_quotes_in_tags(unit_box: BoundingBox) {
        let tags = TagFilter::new()
            .with_value("name", "Joe's \"Diner\"")
            .expect("valid filter");
        let query = build_query(&unit_box, &tags, DEFAULT_TIMEOUT, None, None);
        assert!(query.contains(r#"["name"="Joe's \"Diner\""]"#));
    }

    #[rstest]
    fn empty_filter_has_no_clauses(unit_box: BoundingBox) {
        let query = build_query(&unit_box, &TagFilter::new(), DEFAULT_TIMEOUT, None, None);
        assert_eq!(query, "[out:json][timeout:180];();out;");
    }
}
