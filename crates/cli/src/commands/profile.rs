use std::path::Path;

use anyhow::{Context as _, Result};
use sofia_core::UserProfile;
use sofia_core::profile::{assessment_questions, follow_up_messages};
use sofia_storage::transcripts;

use super::open_store;

pub(crate) async fn run(db_path: &Path, user: &str, set: Option<&Path>) -> Result<()> {
    let store = open_store(db_path)?;

    if let Some(path) = set {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading profile from {}", path.display()))?;
        let profile: UserProfile = serde_json::from_str(&raw).context("parsing profile JSON")?;
        transcripts::save_profile(store.as_ref(), user, &profile).await?;
        println!("Saved profile for {user}");
        return Ok(());
    }

    match transcripts::load_profile(store.as_ref(), user).await? {
        Some(profile) => {
            let report = serde_json::json!({
                "profile": profile,
                "follow_ups": follow_up_messages(&profile),
                "assessment_questions": assessment_questions(&profile),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        },
        None => println!("No profile saved for {user}"),
    }
    Ok(())
}
