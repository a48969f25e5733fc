//! GraphQL types and resolvers, mirroring the REST operations.

use async_graphql::{Context, ErrorExtensions, ID, InputObject, Object, Result, SimpleObject, Value};
use bson::oid::ObjectId;

use feedline_core::DomainError;
use feedline_core::domain::{Post, User};
use feedline_core::service::{AuthService, FeedService, PostDraft, Signup};

use crate::middleware::auth::Identity;

/// Map a domain failure onto a GraphQL error with a numeric `code`
/// extension; validation failures also carry the field messages as `data`.
fn gql_error(err: DomainError) -> async_graphql::Error {
    let code = match &err {
        DomainError::Validation(_) => 422,
        DomainError::Unauthenticated => 401,
        DomainError::Forbidden => 403,
        DomainError::NotFound { .. } => 404,
        DomainError::Internal(_) => 500,
    };

    let message = match &err {
        DomainError::Internal(detail) => {
            tracing::error!("Internal error: {detail}");
            "Internal server error".to_string()
        }
        other => other.to_string(),
    };

    async_graphql::Error::new(message).extend_with(|_, e| {
        e.set("code", code);
        if let DomainError::Validation(messages) = &err {
            e.set(
                "data",
                Value::List(messages.iter().map(|m| Value::String(m.clone())).collect()),
            );
        }
    })
}

fn unauthenticated() -> async_graphql::Error {
    async_graphql::Error::new("Not authenticated").extend_with(|_, e| e.set("code", 401))
}

/// Resolvers behind auth read the identity the HTTP layer attached.
fn require_auth<'a>(ctx: &'a Context<'_>) -> Result<&'a Identity> {
    ctx.data_opt::<Identity>().ok_or_else(unauthenticated)
}

fn parse_id(id: &ID) -> Result<ObjectId> {
    ObjectId::parse_str(id.as_str())
        .map_err(|_| gql_error(DomainError::not_found("post", id.to_string())))
}

/// User as exposed over GraphQL. The password hash stays server-side.
pub struct GqlUser {
    user: User,
}

#[Object(name = "User")]
impl GqlUser {
    async fn id(&self) -> ID {
        ID(self.user.id.to_hex())
    }

    async fn email(&self) -> &str {
        &self.user.email
    }

    async fn name(&self) -> &str {
        &self.user.name
    }

    async fn status(&self) -> &str {
        &self.user.status
    }

    /// The user's posts, in owned-list order.
    async fn posts(&self, ctx: &Context<'_>) -> Result<Vec<GqlPost>> {
        let feed = ctx.data_unchecked::<FeedService>();
        let posts = feed.posts_of(&self.user).await.map_err(gql_error)?;
        Ok(posts.into_iter().map(|post| GqlPost { post }).collect())
    }
}

pub struct GqlPost {
    post: Post,
}

#[Object(name = "Post")]
impl GqlPost {
    async fn id(&self) -> ID {
        ID(self.post.id.to_hex())
    }

    async fn title(&self) -> &str {
        &self.post.title
    }

    async fn content(&self) -> &str {
        &self.post.content
    }

    async fn image_url(&self) -> &str {
        &self.post.image_url
    }

    /// The owning user, eagerly resolvable ("populate").
    async fn creator(&self, ctx: &Context<'_>) -> Result<GqlUser> {
        let feed = ctx.data_unchecked::<FeedService>();
        let user = feed.creator_of(&self.post).await.map_err(gql_error)?;
        Ok(GqlUser { user })
    }

    async fn created_at(&self) -> String {
        self.post.created_at.to_rfc3339()
    }

    async fn updated_at(&self) -> String {
        self.post.updated_at.to_rfc3339()
    }
}

#[derive(SimpleObject)]
pub struct AuthData {
    pub token: String,
    pub user_id: String,
}

#[derive(SimpleObject)]
pub struct PostsData {
    pub posts: Vec<GqlPost>,
    pub total_posts: u64,
}

#[derive(InputObject)]
#[graphql(name = "UserInputData")]
pub struct UserInput {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(InputObject)]
#[graphql(name = "PostInputData")]
pub struct PostInput {
    pub title: String,
    pub content: String,
    pub image_url: String,
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Exchange credentials for a bearer token.
    async fn login(&self, ctx: &Context<'_>, email: String, password: String) -> Result<AuthData> {
        let auth = ctx.data_unchecked::<AuthService>();
        let session = auth.login(&email, &password).await.map_err(gql_error)?;
        Ok(AuthData {
            token: session.token,
            user_id: session.user_id.to_hex(),
        })
    }

    /// One feed page, newest first, with the total post count.
    async fn get_posts(&self, ctx: &Context<'_>, page: Option<u64>) -> Result<PostsData> {
        require_auth(ctx)?;
        let feed = ctx.data_unchecked::<FeedService>();
        let page = feed.list_posts(page.unwrap_or(1)).await.map_err(gql_error)?;
        Ok(PostsData {
            posts: page.posts.into_iter().map(|post| GqlPost { post }).collect(),
            total_posts: page.total,
        })
    }

    async fn get_post_by_id(&self, ctx: &Context<'_>, post_id: ID) -> Result<GqlPost> {
        require_auth(ctx)?;
        let feed = ctx.data_unchecked::<FeedService>();
        let post = feed
            .get_post(parse_id(&post_id)?)
            .await
            .map_err(gql_error)?;
        Ok(GqlPost { post })
    }

    /// The authenticated user's own profile.
    async fn user(&self, ctx: &Context<'_>) -> Result<GqlUser> {
        let identity = require_auth(ctx)?;
        let feed = ctx.data_unchecked::<FeedService>();
        let user = feed.get_user(identity.user_id).await.map_err(gql_error)?;
        Ok(GqlUser { user })
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn create_user(&self, ctx: &Context<'_>, user_input: UserInput) -> Result<GqlUser> {
        let auth = ctx.data_unchecked::<AuthService>();
        let user = auth
            .signup(Signup {
                email: user_input.email,
                password: user_input.password,
                name: user_input.name,
            })
            .await
            .map_err(gql_error)?;
        Ok(GqlUser { user })
    }

    async fn create_post(&self, ctx: &Context<'_>, post_input: PostInput) -> Result<GqlPost> {
        let identity = require_auth(ctx)?;
        let feed = ctx.data_unchecked::<FeedService>();
        let (post, _creator) = feed
            .create_post(
                identity.user_id,
                PostDraft {
                    title: post_input.title,
                    content: post_input.content,
                },
                post_input.image_url,
            )
            .await
            .map_err(gql_error)?;
        Ok(GqlPost { post })
    }

    async fn update_post(
        &self,
        ctx: &Context<'_>,
        id: ID,
        post_input: PostInput,
    ) -> Result<GqlPost> {
        let identity = require_auth(ctx)?;
        let feed = ctx.data_unchecked::<FeedService>();

        // Clients send a placeholder when the image is unchanged.
        let new_image_url = match post_input.image_url.as_str() {
            "" | "undefined" => None,
            _ => Some(post_input.image_url.clone()),
        };

        let post = feed
            .update_post(
                identity.user_id,
                parse_id(&id)?,
                PostDraft {
                    title: post_input.title,
                    content: post_input.content,
                },
                new_image_url,
            )
            .await
            .map_err(gql_error)?;
        Ok(GqlPost { post })
    }

    async fn delete_post(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        let identity = require_auth(ctx)?;
        let feed = ctx.data_unchecked::<FeedService>();
        feed.delete_post(identity.user_id, parse_id(&id)?)
            .await
            .map_err(gql_error)?;
        Ok(true)
    }

    async fn update_status(&self, ctx: &Context<'_>, status: String) -> Result<GqlUser> {
        let identity = require_auth(ctx)?;
        let feed = ctx.data_unchecked::<FeedService>();
        let user = feed
            .update_status(identity.user_id, &status)
            .await
            .map_err(gql_error)?;
        Ok(GqlUser { user })
    }
}
