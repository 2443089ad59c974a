use async_trait::async_trait;

use super::error::RemoteCallError;

#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Account id of the credentials the protector runs with.
    async fn caller_account_id(&self) -> Result<String, RemoteCallError>;
}
