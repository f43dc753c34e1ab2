use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Wire Schemas
// ============================================================================

/// A recipe as returned by the server.
///
/// Field names follow the server's JSON (`_id`, `user`, `createdAt`).
/// `ingredients` and `steps` may be omitted by older records and decode as
/// empty lists; `_id` and `title` are required so a malformed record fails
/// decoding instead of reaching feed state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub image: String,
    #[serde(rename = "user", default, skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorRef>,
    #[serde(
        rename = "createdAt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

/// Author reference: the feed endpoint populates the full profile, the
/// own-recipes endpoint may only send the user's id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthorRef {
    Profile(Author),
    Id(String),
}

impl AuthorRef {
    pub fn id(&self) -> &str {
        match self {
            AuthorRef::Profile(author) => &author.id,
            AuthorRef::Id(id) => id,
        }
    }

    /// Display name, if the profile was populated.
    pub fn username(&self) -> Option<&str> {
        match self {
            AuthorRef::Profile(author) => Some(&author.username),
            AuthorRef::Id(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    pub username: String,
    #[serde(rename = "profileImage", default)]
    pub avatar: Option<String>,
}

/// One page of the public feed (`GET /recipe?page=&limit=`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecipePage {
    #[serde(rename = "Recipes")]
    pub recipes: Vec<Recipe>,
    #[serde(rename = "totalPages")]
    pub total_pages: u32,
}

/// Request body for `POST /recipe`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewRecipe {
    pub title: String,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    /// `data:<mime>;base64,<payload>`
    pub image: String,
}

/// Error body the server attaches to non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
