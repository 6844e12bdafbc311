//! Authentication provider interface.

use async_trait::async_trait;

use super::entity::Principal;

/// Resolves the credentials presented at connect time to a principal.
///
/// Consulted once per connection. Unknown or missing credentials yield
/// [`Principal::Anonymous`]; whether that is acceptable is up to the consumer.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, token: Option<&str>) -> Principal;
}
