pub mod accounts;
pub mod content;
pub mod events;
pub mod mutations;
pub mod queries;
pub mod requests;
pub mod scalars;
pub mod schema;
pub mod subscriptions;
pub mod types;

use async_graphql::Context;
use infra::Source;

use crate::auth::permissions::current_session;

pub use mutations::MutationRoot;
pub use queries::QueryRoot;
pub use schema::{build_schema, AppSchema};
pub use subscriptions::SubscriptionRoot;

/// Event source for the caller; anonymous callers use the default.
pub(crate) fn source(ctx: &Context<'_>) -> Source {
    current_session(ctx).map(|s| s.source()).unwrap_or_default()
}
