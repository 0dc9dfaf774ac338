use std::path::Path;

use anyhow::Result;
use sofia_core::{Clock as _, DayKey, SystemClock};
use sofia_storage::transcripts;

use super::open_store;

fn resolve_day(day: Option<&str>) -> Result<DayKey> {
    match day {
        Some(raw) => Ok(raw.parse()?),
        None => Ok(SystemClock.day_key()),
    }
}

pub(crate) async fn run_history(db_path: &Path, user: &str, day: Option<&str>) -> Result<()> {
    let store = open_store(db_path)?;
    let day = resolve_day(day)?;
    let records = transcripts::load_records(store.as_ref(), user, &day).await?;
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

pub(crate) async fn run_days(db_path: &Path, user: &str) -> Result<()> {
    let store = open_store(db_path)?;
    for day in transcripts::list_days(store.as_ref(), user).await? {
        println!("{day}");
    }
    Ok(())
}

pub(crate) async fn run_clear(db_path: &Path, user: &str, day: Option<&str>) -> Result<()> {
    let store = open_store(db_path)?;
    let day = resolve_day(day)?;
    if transcripts::clear_day(store.as_ref(), user, &day).await? {
        println!("Cleared transcript for {user} on {day}");
    } else {
        println!("No transcript for {user} on {day}");
    }
    Ok(())
}
