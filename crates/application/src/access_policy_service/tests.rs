use std::sync::Arc;

use frequencia_core::{Actor, AppError};
use frequencia_domain::{
    AccessLevel, AccessTarget, DepartmentId, EmployeeId, Feature, GrantSource, GrantTarget,
    RolePermission, RolePermissionId, SectorId,
};

use crate::scope_ports::GrantCapabilities;
use crate::testing::{
    FakeGrantRepository, FakeRolePermissionRepository, Organization, grant, staff, superuser,
    user,
};
use crate::{JobTitlePolicy, ScopeService};

use super::AccessPolicyService;

fn policy_service(
    organization: &Organization,
    grants: FakeGrantRepository,
    role_permissions: FakeRolePermissionRepository,
    capabilities: GrantCapabilities,
) -> AccessPolicyService {
    let organization_repository = Arc::new(organization.repository());
    let grants = Arc::new(grants);
    let scope_service =
        ScopeService::new(organization_repository.clone(), grants.clone(), capabilities);
    let job_title_policy =
        JobTitlePolicy::from_capabilities(capabilities, Arc::new(role_permissions));

    AccessPolicyService::new(
        scope_service,
        organization_repository,
        grants,
        job_title_policy,
    )
}

fn coordinator_permission(actor: &Actor) -> RolePermission {
    RolePermission::new(
        RolePermissionId::new(),
        actor.user_id(),
        "Coordinator",
        AccessLevel::Manage,
        None,
    )
    .unwrap_or_else(|_| unreachable!())
}

#[tokio::test]
async fn superuser_only_features_reject_staff() {
    let organization = Organization::new();
    let service = policy_service(
        &organization,
        FakeGrantRepository::default(),
        FakeRolePermissionRepository::default(),
        GrantCapabilities::full(),
    );

    assert_eq!(
        service.can(&staff(), Feature::GrantAccess, None).await.ok(),
        Some(false)
    );
    assert_eq!(
        service.can(&superuser(), Feature::GrantAccess, None).await.ok(),
        Some(true)
    );
}

#[tokio::test]
async fn admin_passes_every_regular_check() {
    let organization = Organization::new();
    let service = policy_service(
        &organization,
        FakeGrantRepository::default(),
        FakeRolePermissionRepository::default(),
        GrantCapabilities::full(),
    );
    let actor = staff();

    for feature in Feature::all()
        .iter()
        .copied()
        .filter(|feature| !feature.rule().superuser_only)
    {
        assert_eq!(service.can(&actor, feature, None).await.ok(), Some(true));
        assert_eq!(
            service
                .can(&actor, feature, Some(AccessTarget::Employee(organization.professor)))
                .await
                .ok(),
            Some(true)
        );
    }
}

#[tokio::test]
async fn empty_user_is_denied_everywhere() {
    let organization = Organization::new();
    let service = policy_service(
        &organization,
        FakeGrantRepository::default(),
        FakeRolePermissionRepository::default(),
        GrantCapabilities::full(),
    );
    let actor = user("ana");

    assert_eq!(
        service.can(&actor, Feature::ViewDashboard, None).await.ok(),
        Some(false)
    );
    assert_eq!(
        service.can(&actor, Feature::CreateEmployee, None).await.ok(),
        Some(false)
    );
    for target in [
        AccessTarget::Employee(organization.professor),
        AccessTarget::Sector(organization.direct_sector),
        AccessTarget::Agency(organization.agency),
        AccessTarget::Department(organization.department),
        AccessTarget::Municipality(organization.municipality),
    ] {
        assert_eq!(
            service.can(&actor, Feature::ViewEmployees, Some(target)).await.ok(),
            Some(false)
        );
    }
}

#[tokio::test]
async fn untargeted_manage_needs_any_manage_grant() {
    let organization = Organization::new();
    let reader = user("leitor");
    let manager = user("gestor");
    let grants = FakeGrantRepository::with_grants(vec![
        grant(
            &reader,
            GrantSource::Unified,
            GrantTarget::Department(organization.department),
            AccessLevel::Read,
        ),
        grant(
            &manager,
            GrantSource::LegacySector,
            GrantTarget::Sector(organization.sibling_sector),
            AccessLevel::Manage,
        ),
    ]);
    let service = policy_service(
        &organization,
        grants,
        FakeRolePermissionRepository::default(),
        GrantCapabilities::full(),
    );

    assert_eq!(
        service.can(&reader, Feature::ViewTimesheets, None).await.ok(),
        Some(true)
    );
    assert_eq!(
        service.can(&reader, Feature::GeneratePayrollBatch, None).await.ok(),
        Some(false)
    );
    assert_eq!(
        service.can(&manager, Feature::GeneratePayrollBatch, None).await.ok(),
        Some(true)
    );
}

#[tokio::test]
async fn sector_grant_does_not_leak_to_its_department() {
    let organization = Organization::new();
    let actor = user("ana");
    let grants = FakeGrantRepository::with_grants(vec![grant(
        &actor,
        GrantSource::Unified,
        GrantTarget::Sector(organization.direct_sector),
        AccessLevel::Manage,
    )]);
    let service = policy_service(
        &organization,
        grants,
        FakeRolePermissionRepository::default(),
        GrantCapabilities::full(),
    );

    let on_sector = service
        .can(
            &actor,
            Feature::GeneratePayrollBatch,
            Some(AccessTarget::Sector(organization.direct_sector)),
        )
        .await;
    let on_department = service
        .can(
            &actor,
            Feature::GeneratePayrollBatch,
            Some(AccessTarget::Department(organization.department)),
        )
        .await;

    assert_eq!(on_sector.ok(), Some(true));
    assert_eq!(on_department.ok(), Some(false));
}

#[tokio::test]
async fn department_manage_grant_covers_agency_and_sectors_below() {
    let organization = Organization::new();
    let actor = user("ana");
    let grants = FakeGrantRepository::with_grants(vec![grant(
        &actor,
        GrantSource::LegacyDepartment,
        GrantTarget::Department(organization.department),
        AccessLevel::Manage,
    )]);
    let service = policy_service(
        &organization,
        grants,
        FakeRolePermissionRepository::default(),
        GrantCapabilities::full(),
    );

    for target in [
        AccessTarget::Department(organization.department),
        AccessTarget::Agency(organization.agency),
        AccessTarget::Sector(organization.agency_sector),
    ] {
        assert_eq!(
            service
                .can(&actor, Feature::ImportSchedules, Some(target))
                .await
                .ok(),
            Some(true)
        );
    }
    assert_eq!(
        service
            .can(
                &actor,
                Feature::ImportSchedules,
                Some(AccessTarget::Sector(organization.sibling_sector))
            )
            .await
            .ok(),
        Some(false)
    );
}

#[tokio::test]
async fn role_permission_never_replaces_sector_manage() {
    let organization = Organization::new();
    let actor = user("ana");
    let role_permissions = FakeRolePermissionRepository {
        permissions: vec![coordinator_permission(&actor)],
    };
    let service = policy_service(
        &organization,
        FakeGrantRepository::default(),
        role_permissions,
        GrantCapabilities::full(),
    );

    let result = service
        .can(
            &actor,
            Feature::EditEmployee,
            Some(AccessTarget::Employee(organization.coordinator)),
        )
        .await;

    assert_eq!(result.ok(), Some(false));
}

#[tokio::test]
async fn managing_an_employee_needs_sector_manage_and_matching_role() {
    let organization = Organization::new();
    let actor = user("ana");
    let grants = FakeGrantRepository::with_grants(vec![grant(
        &actor,
        GrantSource::Unified,
        GrantTarget::Department(organization.department),
        AccessLevel::Manage,
    )]);
    let role_permissions = FakeRolePermissionRepository {
        permissions: vec![coordinator_permission(&actor)],
    };
    let service = policy_service(
        &organization,
        grants,
        role_permissions,
        GrantCapabilities::full(),
    );

    let coordinator = service
        .evaluate(
            &actor,
            Feature::EditEmployee,
            Some(AccessTarget::Employee(organization.coordinator)),
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    let professor = service
        .evaluate(
            &actor,
            Feature::EditEmployee,
            Some(AccessTarget::Employee(organization.professor)),
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    let professor_read = service
        .can(
            &actor,
            Feature::ViewEmployeeRecord,
            Some(AccessTarget::Employee(organization.professor)),
        )
        .await;

    assert!(coordinator.is_allowed());
    assert!(!professor.is_allowed());
    assert!(professor.reason().is_some_and(|reason| reason.contains("job title")));
    assert_eq!(professor_read.ok(), Some(true));
}

#[tokio::test]
async fn fallback_policy_uses_the_acting_users_title() {
    let mut organization = Organization::new();
    let director = user("diretora");
    organization.link_user(director.user_id(), organization.direct_sector, "Diretor");
    let grants = FakeGrantRepository::with_grants(vec![grant(
        &director,
        GrantSource::LegacySector,
        GrantTarget::Sector(organization.agency_sector),
        AccessLevel::Manage,
    )]);
    let capabilities = GrantCapabilities {
        agency_grants: true,
        role_permissions: false,
    };
    let service = policy_service(
        &organization,
        grants,
        FakeRolePermissionRepository::default(),
        capabilities,
    );

    let result = service
        .can(
            &director,
            Feature::DeleteEmployee,
            Some(AccessTarget::Employee(organization.professor)),
        )
        .await;

    assert_eq!(result.ok(), Some(true));
}

#[tokio::test]
async fn linked_employee_reads_own_sector_but_cannot_manage_it() {
    let mut organization = Organization::new();
    let actor = user("tiago");
    organization.link_user(actor.user_id(), organization.agency_sector, "Professor");
    let service = policy_service(
        &organization,
        FakeGrantRepository::default(),
        FakeRolePermissionRepository::default(),
        GrantCapabilities::full(),
    );
    let target = Some(AccessTarget::Employee(organization.professor));

    assert_eq!(
        service.can(&actor, Feature::ViewTimesheet, target).await.ok(),
        Some(true)
    );
    assert_eq!(
        service.can(&actor, Feature::DeleteTimesheet, target).await.ok(),
        Some(false)
    );
}

#[tokio::test]
async fn unknown_targets_fail_closed() {
    let organization = Organization::new();
    let actor = user("ana");
    let grants = FakeGrantRepository::with_grants(vec![grant(
        &actor,
        GrantSource::LegacyMunicipality,
        GrantTarget::Municipality(organization.municipality),
        AccessLevel::Manage,
    )]);
    let service = policy_service(
        &organization,
        grants,
        FakeRolePermissionRepository::default(),
        GrantCapabilities::full(),
    );

    for target in [
        AccessTarget::Employee(EmployeeId::new()),
        AccessTarget::Sector(SectorId::new()),
        AccessTarget::Department(DepartmentId::new()),
    ] {
        assert_eq!(
            service.can(&actor, Feature::ViewEmployees, Some(target)).await.ok(),
            Some(false)
        );
    }
    assert_eq!(
        service
            .can(
                &actor,
                Feature::ViewEmployees,
                Some(AccessTarget::Agency(organization.agency))
            )
            .await
            .ok(),
        Some(true)
    );
    assert_eq!(
        service
            .can(
                &actor,
                Feature::ViewEmployees,
                Some(AccessTarget::Department(organization.sibling_department))
            )
            .await
            .ok(),
        Some(false)
    );
}

#[tokio::test]
async fn read_grant_does_not_downgrade_manage_on_the_same_department() {
    let organization = Organization::new();
    let actor = user("ana");
    let grants = FakeGrantRepository::with_grants(vec![
        grant(
            &actor,
            GrantSource::LegacyDepartment,
            GrantTarget::Department(organization.department),
            AccessLevel::Read,
        ),
        grant(
            &actor,
            GrantSource::Unified,
            GrantTarget::Department(organization.department),
            AccessLevel::Manage,
        ),
    ]);
    let service = policy_service(
        &organization,
        grants,
        FakeRolePermissionRepository::default(),
        GrantCapabilities::full(),
    );

    let on_department = service
        .can(
            &actor,
            Feature::CreateEmployee,
            Some(AccessTarget::Department(organization.department)),
        )
        .await;
    let on_sibling = service
        .can(
            &actor,
            Feature::CreateEmployee,
            Some(AccessTarget::Department(organization.sibling_department)),
        )
        .await;

    assert_eq!(on_department.ok(), Some(true));
    assert_eq!(on_sibling.ok(), Some(false));
}

#[tokio::test]
async fn read_grant_on_a_sector_reads_its_department_but_cannot_manage_it() {
    let organization = Organization::new();
    let actor = user("ana");
    let grants = FakeGrantRepository::with_grants(vec![grant(
        &actor,
        GrantSource::LegacySector,
        GrantTarget::Sector(organization.agency_sector),
        AccessLevel::Read,
    )]);
    let service = policy_service(
        &organization,
        grants,
        FakeRolePermissionRepository::default(),
        GrantCapabilities::full(),
    );
    let target = Some(AccessTarget::Department(organization.department));

    assert_eq!(
        service.can(&actor, Feature::ViewEmployees, target).await.ok(),
        Some(true)
    );
    assert_eq!(
        service.can(&actor, Feature::CreateEmployee, target).await.ok(),
        Some(false)
    );
}

#[tokio::test]
async fn require_turns_denial_into_forbidden() {
    let organization = Organization::new();
    let service = policy_service(
        &organization,
        FakeGrantRepository::default(),
        FakeRolePermissionRepository::default(),
        GrantCapabilities::full(),
    );

    let result = service
        .require(&user("ana"), Feature::CreateEmployee, None)
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}
