//! Comment Tools

use serde::Serialize;

use super::{optional_text, required_text, ToolError, ToolResult};
use crate::db::Database;
use crate::models::{Comment, CommentCreate, Recipe};

/// Response for list_comments
#[derive(Debug, Serialize)]
pub struct ListCommentsResponse {
    pub recipe_id: i64,
    pub comments: Vec<Comment>,
    pub count: usize,
}

/// Add a comment to a recipe
pub fn add_comment(db: &Database, data: CommentCreate) -> ToolResult<Comment> {
    let data = CommentCreate {
        recipe_id: data.recipe_id,
        body: required_text("body", &data.body)?,
        author: optional_text(data.author),
    };

    let conn = db.get_conn()?;

    if Recipe::get_by_id(&conn, data.recipe_id)?.is_none() {
        return Err(ToolError::NotFound(format!(
            "Recipe not found with id: {}",
            data.recipe_id
        )));
    }

    Ok(Comment::create(&conn, &data)?)
}

/// List the comments of a recipe
pub fn list_comments(db: &Database, recipe_id: i64) -> ToolResult<ListCommentsResponse> {
    let conn = db.get_conn()?;

    if Recipe::get_by_id(&conn, recipe_id)?.is_none() {
        return Err(ToolError::NotFound(format!("Recipe not found with id: {}", recipe_id)));
    }

    let comments = Comment::list_for_recipe(&conn, recipe_id)?;
    let count = comments.len();
    Ok(ListCommentsResponse {
        recipe_id,
        comments,
        count,
    })
}
