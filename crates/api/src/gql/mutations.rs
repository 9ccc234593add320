use async_graphql::MergedObject;

use crate::gql::accounts::AccountMutation;
use crate::gql::content::ContentMutation;
use crate::gql::events::EventMutation;
use crate::gql::requests::RequestMutation;

#[derive(MergedObject, Default)]
pub struct MutationRoot(EventMutation, RequestMutation, ContentMutation, AccountMutation);
