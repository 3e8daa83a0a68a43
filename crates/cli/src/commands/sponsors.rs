//! Sponsors.

use fairway_client::AppContext;

use super::{CommandError, ready};

pub async fn list(app: &AppContext) -> Result<(), CommandError> {
    let sponsors = ready(app.access().sponsors().await?)?;
    if sponsors.is_empty() {
        tracing::info!("No sponsors yet");
    }
    for sponsor in &sponsors {
        tracing::info!("{sponsor}");
    }
    Ok(())
}
