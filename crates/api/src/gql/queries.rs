use async_graphql::MergedObject;

use crate::gql::accounts::AccountQuery;
use crate::gql::content::ContentQuery;
use crate::gql::events::EventQuery;
use crate::gql::requests::RequestQuery;

#[derive(MergedObject, Default)]
pub struct QueryRoot(EventQuery, RequestQuery, ContentQuery, AccountQuery);
