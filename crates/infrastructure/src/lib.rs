//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod grant_capabilities;
mod in_memory_grant_repository;
mod in_memory_organization_repository;
mod postgres_actor_repository;
mod postgres_grant_repository;
mod postgres_organization_repository;

pub use grant_capabilities::detect_grant_capabilities;
pub use in_memory_grant_repository::InMemoryGrantRepository;
pub use in_memory_organization_repository::InMemoryOrganizationRepository;
pub use postgres_actor_repository::PostgresActorRepository;
pub use postgres_grant_repository::PostgresGrantRepository;
pub use postgres_organization_repository::PostgresOrganizationRepository;
