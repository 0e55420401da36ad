use frequencia_domain::{AccessLevel, EntityIdSets, ResolvedScope};
use serde::Serialize;

/// Id sets by hierarchy level.
#[derive(Debug, Default, Serialize)]
pub struct EntityIdSetsResponse {
    pub municipalities: Vec<String>,
    pub departments: Vec<String>,
    pub agencies: Vec<String>,
    pub sectors: Vec<String>,
}

impl From<&EntityIdSets> for EntityIdSetsResponse {
    fn from(sets: &EntityIdSets) -> Self {
        Self {
            municipalities: sets.municipalities.iter().map(ToString::to_string).collect(),
            departments: sets.departments.iter().map(ToString::to_string).collect(),
            agencies: sets.agencies.iter().map(ToString::to_string).collect(),
            sectors: sets.sectors.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Resolved scope of the current user.
#[derive(Debug, Serialize)]
pub struct ScopeResponse {
    pub level: &'static str,
    pub unrestricted: bool,
    pub granted: EntityIdSetsResponse,
    pub ancestors: EntityIdSetsResponse,
}

impl ScopeResponse {
    pub fn new(level: AccessLevel, scope: &ResolvedScope) -> Self {
        match scope.sets() {
            Some(sets) => Self {
                level: level.as_str(),
                unrestricted: false,
                granted: EntityIdSetsResponse::from(sets.granted()),
                ancestors: EntityIdSetsResponse::from(sets.ancestors()),
            },
            None => Self {
                level: level.as_str(),
                unrestricted: true,
                granted: EntityIdSetsResponse::default(),
                ancestors: EntityIdSetsResponse::default(),
            },
        }
    }
}
