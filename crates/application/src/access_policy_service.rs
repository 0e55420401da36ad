use std::sync::Arc;

use frequencia_core::{Actor, AppError, AppResult};
use frequencia_domain::{AccessLevel, AccessTarget, Feature, GrantTarget};
use tracing::debug;

use crate::scope_ports::{GrantCapabilities, GrantRepository, OrganizationRepository};
use crate::{JobTitlePolicy, ScopeService};

/// Outcome of a feature check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// The actor may use the feature.
    Allowed,
    /// The actor may not use the feature.
    Denied {
        /// Human-readable reason.
        reason: String,
    },
}

impl AccessDecision {
    fn denied(reason: impl Into<String>) -> Self {
        Self::Denied {
            reason: reason.into(),
        }
    }

    /// Returns whether the check passed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Returns the denial reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Allowed => None,
            Self::Denied { reason } => Some(reason.as_str()),
        }
    }
}

/// Application service gating features by level and target scope.
#[derive(Clone)]
pub struct AccessPolicyService {
    scope_service: ScopeService,
    organization: Arc<dyn OrganizationRepository>,
    grants: Arc<dyn GrantRepository>,
    job_title_policy: JobTitlePolicy,
}

impl AccessPolicyService {
    /// Creates the feature gate.
    #[must_use]
    pub fn new(
        scope_service: ScopeService,
        organization: Arc<dyn OrganizationRepository>,
        grants: Arc<dyn GrantRepository>,
        job_title_policy: JobTitlePolicy,
    ) -> Self {
        Self {
            scope_service,
            organization,
            grants,
            job_title_policy,
        }
    }

    /// Returns the capability flags of the underlying scope service.
    #[must_use]
    pub fn capabilities(&self) -> GrantCapabilities {
        self.scope_service.capabilities()
    }

    /// Returns whether the actor may use a feature, optionally on a target.
    pub async fn can(
        &self,
        actor: &Actor,
        feature: Feature,
        target: Option<AccessTarget>,
    ) -> AppResult<bool> {
        Ok(self.evaluate(actor, feature, target).await?.is_allowed())
    }

    /// Ensures the actor may use a feature, returning a forbidden error otherwise.
    pub async fn require(
        &self,
        actor: &Actor,
        feature: Feature,
        target: Option<AccessTarget>,
    ) -> AppResult<()> {
        match self.evaluate(actor, feature, target).await? {
            AccessDecision::Allowed => Ok(()),
            AccessDecision::Denied { reason } => Err(AppError::Forbidden(reason)),
        }
    }

    /// Evaluates a feature check and explains denials.
    pub async fn evaluate(
        &self,
        actor: &Actor,
        feature: Feature,
        target: Option<AccessTarget>,
    ) -> AppResult<AccessDecision> {
        let decision = self.decide(actor, feature, target).await?;
        if let AccessDecision::Denied { reason } = &decision {
            debug!(
                user_id = %actor.user_id(),
                feature = feature.as_str(),
                reason = reason.as_str(),
                "feature denied"
            );
        }

        Ok(decision)
    }

    async fn decide(
        &self,
        actor: &Actor,
        feature: Feature,
        target: Option<AccessTarget>,
    ) -> AppResult<AccessDecision> {
        let rule = feature.rule();
        if rule.superuser_only && !actor.is_superuser() {
            return Ok(AccessDecision::denied(format!(
                "feature '{}' is restricted to super administrators",
                feature.as_str()
            )));
        }

        if actor.is_admin() {
            return Ok(AccessDecision::Allowed);
        }

        match target {
            None => self.decide_untargeted(actor, feature, rule.required_level).await,
            Some(target) => {
                self.decide_targeted(actor, feature, rule.required_level, target)
                    .await
            }
        }
    }

    async fn decide_untargeted(
        &self,
        actor: &Actor,
        feature: Feature,
        level: AccessLevel,
    ) -> AppResult<AccessDecision> {
        match level {
            AccessLevel::Manage => {
                for source in self.capabilities().grant_sources() {
                    if self
                        .grants
                        .has_grant_at_level(source, actor.user_id(), AccessLevel::Manage)
                        .await?
                    {
                        return Ok(AccessDecision::Allowed);
                    }
                }

                Ok(AccessDecision::denied(format!(
                    "feature '{}' requires a manage grant",
                    feature.as_str()
                )))
            }
            AccessLevel::Read => {
                let scope = self.scope_service.resolve_scope(actor).await?;
                if scope.is_empty() {
                    return Ok(AccessDecision::denied(format!(
                        "feature '{}' requires access to at least one organizational unit",
                        feature.as_str()
                    )));
                }

                Ok(AccessDecision::Allowed)
            }
        }
    }

    async fn decide_targeted(
        &self,
        actor: &Actor,
        feature: Feature,
        level: AccessLevel,
        target: AccessTarget,
    ) -> AppResult<AccessDecision> {
        let tree = self.organization.load_hierarchy().await?;

        let (grant_target, employee) = match target {
            AccessTarget::Employee(employee_id) => {
                let Some(employee) = self.organization.find_employee(employee_id).await? else {
                    return Ok(AccessDecision::denied(format!(
                        "employee '{employee_id}' does not exist"
                    )));
                };
                (GrantTarget::Sector(employee.sector_id()), Some(employee))
            }
            AccessTarget::Sector(id) => (GrantTarget::Sector(id), None),
            AccessTarget::Department(id) => (GrantTarget::Department(id), None),
            AccessTarget::Agency(id) => (GrantTarget::Agency(id), None),
            AccessTarget::Municipality(id) => (GrantTarget::Municipality(id), None),
        };

        if !tree.contains_target(grant_target) {
            return Ok(AccessDecision::denied(format!(
                "{} '{}' does not exist",
                grant_target.kind().as_str(),
                grant_target.uuid()
            )));
        }

        let filter = self
            .scope_service
            .resolve_with_tree(actor, level, &tree)
            .await?
            .filter();
        if !filter.covers(&tree, grant_target) {
            return Ok(AccessDecision::denied(format!(
                "feature '{}' requires {} access to {} '{}'",
                feature.as_str(),
                level.as_str(),
                grant_target.kind().as_str(),
                grant_target.uuid()
            )));
        }

        if let (Some(employee), AccessLevel::Manage) = (employee, level) {
            let chain = tree
                .sector(employee.sector_id())
                .map(|sector| tree.resolve_sector_chain(sector))
                .unwrap_or_default();
            let permitted = self
                .job_title_policy
                .permits(actor, &employee, &chain, level, self.organization.as_ref())
                .await?;
            if !permitted {
                return Ok(AccessDecision::denied(format!(
                    "job title policy does not allow managing employee '{}'",
                    employee.id()
                )));
            }
        }

        Ok(AccessDecision::Allowed)
    }
}

#[cfg(test)]
mod tests;
