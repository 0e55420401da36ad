use async_trait::async_trait;

use frequencia_core::{Actor, AppResult};

/// Repository port for reading accounts from the authentication store.
#[async_trait]
pub trait ActorRepository: Send + Sync {
    /// Finds an active account by login name.
    async fn find_actor_by_username(&self, username: &str) -> AppResult<Option<Actor>>;
}
