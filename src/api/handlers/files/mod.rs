pub mod image;
pub mod list;
pub mod manage;
pub mod stream;
pub mod types;
pub mod upload;

pub use image::{delete_image, get_image, upload_image};
pub use list::list_files;
pub use manage::{delete_file, file_info, rename_file};
pub use stream::stream_file;
pub use types::*;
pub use upload::upload_file;

use crate::AppState;
use crate::api::error::AppError;
use crate::entities::{audio_files, prelude::Users};
use crate::utils::auth::Claims;
use sea_orm::EntityTrait;

/// Owners can always act on their files; admins can act on anyone's.
pub(crate) async fn ensure_owner_or_admin(
    state: &AppState,
    claims: &Claims,
    file: &audio_files::Model,
) -> Result<(), AppError> {
    if file.user_id == claims.sub {
        return Ok(());
    }

    let user = Users::find_by_id(&claims.sub)
        .one(&state.db)
        .await?
        .ok_or(AppError::Unauthorized("User not found".to_string()))?;

    if user.role == "admin" {
        return Ok(());
    }

    Err(AppError::Forbidden("You do not own this file".to_string()))
}
