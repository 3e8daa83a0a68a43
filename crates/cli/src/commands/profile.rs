//! The caller's profile.

use std::path::Path;

use fairway_client::AppContext;
use fairway_core::ProfileDraft;

use super::{CommandError, ready};

pub async fn show(app: &AppContext) -> Result<(), CommandError> {
    let Some(profile) = ready(app.access().caller_profile().await?)? else {
        tracing::info!("No profile yet. Create one with `fairway profile save`.");
        return Ok(());
    };

    tracing::info!("Handicap:          {}", profile.handicap);
    tracing::info!(
        "Location:          {:.4}, {:.4}",
        profile.location.lat,
        profile.location.lon
    );
    tracing::info!("Gender:            {}", profile.gender);
    tracing::info!("Looking for:       {}", profile.looking_for);
    tracing::info!("Gender preference: {}", profile.gender_preference);
    tracing::info!("Preference:        {}", profile.preference);
    tracing::info!("Avatar:            {}", if profile.avatar.is_some() { "yes" } else { "no" });
    tracing::info!("Bio:               {}", profile.bio);
    Ok(())
}

/// Validate and save a profile draft.
pub async fn save(app: &AppContext, draft: ProfileDraft) -> Result<(), CommandError> {
    let profile = app.access().save_caller_profile(draft).await?;
    tracing::info!(handicap = profile.handicap, "Profile saved");
    Ok(())
}

pub async fn read_avatar(path: &Path) -> Result<Vec<u8>, CommandError> {
    tokio::fs::read(path).await.map_err(|source| CommandError::Io {
        path: path.display().to_string(),
        source,
    })
}
