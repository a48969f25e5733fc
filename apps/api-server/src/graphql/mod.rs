//! GraphQL endpoint: schema construction and the actix route glue.
//!
//! Authentication happens out-of-band: the bearer token is decoded by the
//! HTTP layer and handed to resolvers as optional request data.

mod schema;

use actix_web::{HttpResponse, web};
use async_graphql::{EmptySubscription, Schema, http::GraphiQLSource};
use async_graphql_actix_web::{GraphQLRequest, GraphQLResponse};

use crate::middleware::auth::OptionalIdentity;
use crate::state::AppState;

pub use schema::{MutationRoot, QueryRoot};

pub type FeedSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the schema with the services as context data.
pub fn build_schema(state: &AppState) -> FeedSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(state.auth.clone())
        .data(state.feed.clone())
        .finish()
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/graphql", web::post().to(graphql_handler))
        .route("/graphql", web::get().to(graphiql));
}

async fn graphql_handler(
    schema: web::Data<FeedSchema>,
    identity: OptionalIdentity,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = req.into_inner();
    if let Some(identity) = identity.0 {
        request = request.data(identity);
    }
    schema.execute(request).await.into()
}

async fn graphiql() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(GraphiQLSource::build().endpoint("/graphql").finish())
}
