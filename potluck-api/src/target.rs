use std::{fmt, str::FromStr};

use anyhow::{anyhow, Context};
use uuid::Uuid;

use crate::{CommentId, Reaction, Toggled};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct BlogId(pub Uuid);

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct RecipeId(pub Uuid);

/// Anything users can interact with
#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub enum Target {
    Blog(BlogId),
    Recipe(RecipeId),
    Comment(CommentId),
}

impl Target {
    pub fn uuid(&self) -> Uuid {
        match self {
            Target::Blog(BlogId(id)) => *id,
            Target::Recipe(RecipeId(id)) => *id,
            Target::Comment(CommentId(id)) => *id,
        }
    }

    /// Comments and reviews can only be posted on blogs and recipes
    pub fn accepts_comments(&self) -> bool {
        !matches!(self, Target::Comment(_))
    }

    /// Only blog posts carry emoji reactions
    pub fn accepts_reactions(&self) -> bool {
        matches!(self, Target::Blog(_))
    }

    /// Path of this target in the REST api, eg. `blogs/<uuid>`
    pub fn api_path(&self) -> String {
        let kind = match self {
            Target::Blog(_) => "blogs",
            Target::Recipe(_) => "recipes",
            Target::Comment(_) => "comments",
        };
        format!("{kind}/{}", self.uuid())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Blog(_) => write!(f, "blog {}", self.uuid()),
            Target::Recipe(_) => write!(f, "recipe {}", self.uuid()),
            Target::Comment(_) => write!(f, "comment {}", self.uuid()),
        }
    }
}

/// Parses the `blog/<uuid>`, `recipe/<uuid>` or `comment/<uuid>` form used in links
impl FromStr for Target {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Target> {
        let (kind, id) = s
            .split_once('/')
            .ok_or_else(|| anyhow!("target {s:?} is not of the form kind/uuid"))?;
        let id = Uuid::try_parse(id).with_context(|| format!("parsing target id {id:?}"))?;
        match kind {
            "blog" | "blogs" => Ok(Target::Blog(BlogId(id))),
            "recipe" | "recipes" => Ok(Target::Recipe(RecipeId(id))),
            "comment" | "comments" => Ok(Target::Comment(CommentId(id))),
            _ => Err(anyhow!("unknown target kind {kind:?}")),
        }
    }
}

/// Aggregates the server attaches to a blog post or recipe when it is displayed
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct TargetSummary {
    pub likes: Toggled,
    pub bookmarks: Toggled,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
}
