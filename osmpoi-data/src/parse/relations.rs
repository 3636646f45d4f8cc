//! Multipolygon relation resolution.
//!
//! Relations reference ways by id. Each `type=multipolygon` relation is
//! resolved independently against the way records parsed from the same
//! response; a successful resolution takes ownership of its member ways so
//! they no longer appear as standalone rows.
//!
//! Resolution never fails the whole response. A relation that cannot be
//! resolved is logged and reported as [`RelationOutcome::Skipped`], leaving
//! the way records untouched.

use std::collections::{HashMap, HashSet};
use std::fmt;

use geo::{Contains, MultiPolygon, Polygon};
use log::{debug, warn};
use osmpoi_core::{PoiGeometry, PoiRecord};
use serde::Deserialize;

use crate::overpass::RelationElement;

/// How member ways are combined into a relation's multipolygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationAssembly {
    /// Every member way becomes one polygon of the multipolygon; roles are
    /// ignored, so `inner` members render as filled polygons.
    #[default]
    Union,
    /// `outer` and empty-role members become polygons and each `inner`
    /// member is cut out of the first outer polygon containing it. Members
    /// with any other role are logged and left out of the geometry.
    RoleAware,
}

/// Why a relation was not turned into a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The relation carries no `type=multipolygon` tag.
    NotMultipolygon,
    /// None of the member ways resolved to a polygon.
    NoResolvableMembers,
    /// Role-aware assembly found no `outer` or empty-role member.
    NoOuterMembers,
    /// The relation element itself could not be decoded.
    Malformed,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotMultipolygon => "not a multipolygon",
            Self::NoResolvableMembers => "no member way has a geometry",
            Self::NoOuterMembers => "no outer member way has a geometry",
            Self::Malformed => "element does not match the Overpass schema",
        })
    }
}

/// Result of resolving one relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationOutcome {
    /// The relation became a record and took ownership of `ways`.
    Absorbed {
        /// Relation id.
        relation: i64,
        /// Member way ids removed from the standalone output.
        ways: Vec<i64>,
    },
    /// The relation was left out of the output.
    Skipped {
        /// Relation id.
        relation: i64,
        /// Why resolution stopped.
        reason: SkipReason,
    },
}

/// Areal records after relation resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationResolution {
    /// Unabsorbed way records in input order, followed by relation records.
    pub areas: Vec<PoiRecord>,
    /// One outcome per input relation, in input order.
    pub outcomes: Vec<RelationOutcome>,
}

/// Resolve `relations` against `ways`.
///
/// Relations are processed in order. Ways absorbed by an earlier relation are
/// unavailable to later ones. The returned areas are built fresh from the
/// unabsorbed ways plus the new relation records; nothing is removed in place.
#[must_use]
pub fn resolve_relations(
    relations: &[&RelationElement],
    ways: Vec<PoiRecord>,
    assembly: RelationAssembly,
) -> RelationResolution {
    let positions: HashMap<i64, usize> = ways
        .iter()
        .enumerate()
        .map(|(position, way)| (way.osm_id, position))
        .collect();
    let mut absorbed: HashSet<i64> = HashSet::new();
    let mut created = Vec::new();
    let mut outcomes = Vec::with_capacity(relations.len());

    for relation in relations {
        let lookup = WayLookup {
            ways: &ways,
            positions: &positions,
            absorbed: &absorbed,
        };
        match resolve_relation(relation, &lookup, assembly) {
            Ok((record, owned)) => {
                absorbed.extend(owned.iter().copied());
                outcomes.push(RelationOutcome::Absorbed {
                    relation: relation.id,
                    ways: owned,
                });
                created.push(record);
            }
            Err(reason) => {
                if reason == SkipReason::NotMultipolygon {
                    debug!("Skipped OSM relation {}: {reason}", relation.id);
                } else {
                    warn!("Could not parse OSM relation {}: {reason}", relation.id);
                }
                outcomes.push(RelationOutcome::Skipped {
                    relation: relation.id,
                    reason,
                });
            }
        }
    }

    let mut areas: Vec<PoiRecord> = ways
        .into_iter()
        .filter(|way| !absorbed.contains(&way.osm_id))
        .collect();
    areas.extend(created);
    RelationResolution { areas, outcomes }
}

struct WayLookup<'a> {
    ways: &'a [PoiRecord],
    positions: &'a HashMap<i64, usize>,
    absorbed: &'a HashSet<i64>,
}

impl WayLookup<'_> {
    fn get(&self, id: i64) -> Option<&PoiRecord> {
        if self.absorbed.contains(&id) {
            return None;
        }
        self.positions
            .get(&id)
            .and_then(|position| self.ways.get(*position))
    }
}

/// A member way with its role and resolved polygon, if any.
struct Member<'a> {
    id: i64,
    role: &'a str,
    record: Option<&'a PoiRecord>,
}

impl Member<'_> {
    fn polygon(&self) -> Option<&Polygon<f64>> {
        match self.record.map(|record| &record.geometry) {
            Some(PoiGeometry::Polygon(polygon)) => Some(polygon),
            _ => None,
        }
    }
}

fn resolve_relation(
    relation: &RelationElement,
    lookup: &WayLookup<'_>,
    assembly: RelationAssembly,
) -> Result<(PoiRecord, Vec<i64>), SkipReason> {
    if relation.tag("type") != Some("multipolygon") {
        return Err(SkipReason::NotMultipolygon);
    }
    let member_ids = relation.member_way_ids();
    let members: Vec<Member<'_>> = relation
        .members
        .iter()
        .filter(|member| member.is_way())
        .map(|member| Member {
            id: member.reference,
            role: member.role.as_str(),
            record: lookup.get(member.reference),
        })
        .collect();

    if members.iter().any(|member| member.polygon().is_none()) {
        warn!(
            "Invalid geometry at relation {}. Way IDs of the invalid MultiPolygon: {member_ids:?}",
            relation.id
        );
    }
    let resolved: Vec<&Member<'_>> = members
        .iter()
        .filter(|member| member.polygon().is_some())
        .collect();
    if resolved.is_empty() {
        return Err(SkipReason::NoResolvableMembers);
    }

    let polygons = match assembly {
        RelationAssembly::Union => resolved
            .iter()
            .filter_map(|member| member.polygon().cloned())
            .collect(),
        RelationAssembly::RoleAware => assemble_with_roles(relation.id, &resolved)?,
    };

    let owned: Vec<i64> = resolved.iter().map(|member| member.id).collect();
    let nodes: Vec<i64> = resolved
        .iter()
        .filter_map(|member| member.record)
        .flat_map(|record| record.nodes.iter().copied())
        .collect();
    let record = PoiRecord::relation(
        relation.id,
        MultiPolygon::new(polygons),
        member_ids,
        nodes,
        relation.tags.clone().unwrap_or_default(),
    );
    Ok((record, owned))
}

/// Build outer shells and punch each inner ring into its enclosing shell.
fn assemble_with_roles(
    relation_id: i64,
    members: &[&Member<'_>],
) -> Result<Vec<Polygon<f64>>, SkipReason> {
    let mut shells = Vec::new();
    for member in members {
        match member.role {
            "outer" | "" => shells.extend(member.polygon().cloned()),
            "inner" => {}
            other => warn!(
                "Relation {relation_id}: way {} has unsupported role {other:?}; ignored",
                member.id
            ),
        }
    }
    if shells.is_empty() {
        return Err(SkipReason::NoOuterMembers);
    }

    for member in members.iter().filter(|member| member.role == "inner") {
        let Some(hole) = member.polygon() else {
            continue;
        };
        let enclosing = shells
            .iter()
            .position(|shell| Polygon::new(shell.exterior().clone(), Vec::new()).contains(hole));
        match enclosing.and_then(|position| shells.get_mut(position)) {
            Some(shell) => shell.interiors_push(hole.exterior().clone()),
            None => warn!(
                "Relation {relation_id}: inner way {} lies outside every outer way; dropped",
                member.id
            ),
        }
    }
    Ok(shells)
}
