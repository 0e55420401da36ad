use super::*;

use frequencia_domain::{RolePermission, RolePermissionId, RoleScopeRestriction};

use crate::grant_admin_ports::{CreateRolePermissionInput, RolePermissionListEntry};

impl GrantAdminService {
    /// Grants a user a level over employees holding a job title.
    pub async fn create_role_permission(
        &self,
        actor: &Actor,
        input: CreateRolePermissionInput,
    ) -> AppResult<RolePermission> {
        self.require_role_permission_admin(actor).await?;

        if let Some(restriction) = input.restriction {
            self.require_existing_target(restriction_target(restriction))
                .await?;
        }

        let permission = RolePermission::new(
            RolePermissionId::new(),
            input.user_id,
            input.job_title,
            input.level,
            input.restriction,
        )?;
        let permission = self.repository.create_role_permission(permission).await?;

        info!(
            permission_id = %permission.id(),
            user_id = %permission.user_id(),
            job_title = permission.job_title().as_str(),
            "created role permission"
        );

        Ok(permission)
    }

    /// Removes a role permission.
    pub async fn delete_role_permission(
        &self,
        actor: &Actor,
        permission_id: RolePermissionId,
    ) -> AppResult<()> {
        self.require_role_permission_admin(actor).await?;

        self.repository.delete_role_permission(permission_id).await?;
        info!(permission_id = %permission_id, "deleted role permission");
        Ok(())
    }

    /// Lists role permissions with an optional text filter.
    pub async fn list_role_permissions(
        &self,
        actor: &Actor,
        query: GrantListQuery,
    ) -> AppResult<Vec<RolePermissionListEntry>> {
        self.require_role_permission_admin(actor).await?;

        self.repository
            .list_role_permissions(normalize_query(query))
            .await
    }

    async fn require_role_permission_admin(&self, actor: &Actor) -> AppResult<()> {
        self.access_policy
            .require(actor, Feature::ManageScopes, None)
            .await?;

        if !self.access_policy.capabilities().role_permissions {
            return Err(AppError::Conflict(
                "role permissions are not installed in this deployment".to_owned(),
            ));
        }

        Ok(())
    }
}

fn restriction_target(restriction: RoleScopeRestriction) -> GrantTarget {
    match restriction {
        RoleScopeRestriction::Department(id) => GrantTarget::Department(id),
        RoleScopeRestriction::Agency(id) => GrantTarget::Agency(id),
        RoleScopeRestriction::Sector(id) => GrantTarget::Sector(id),
    }
}
