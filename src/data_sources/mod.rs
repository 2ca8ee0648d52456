//! Read-only data sources.

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::provider::ProviderContext;
use crate::schema::Schema;
use crate::state::ResourceState;

mod organization;
mod user;

pub use organization::OrganizationDataSource;
pub use user::UserDataSource;

/// Handler for one data source type.
#[async_trait]
pub trait DataSource: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    /// Look the object up and return the configuration with computed
    /// attributes filled in.
    async fn read(&self, ctx: &ProviderContext, config: ResourceState) -> Result<ResourceState, ProviderError>;
}

/// Every data source the provider serves.
pub fn all() -> Vec<Box<dyn DataSource>> {
    vec![Box::new(UserDataSource), Box::new(OrganizationDataSource)]
}
