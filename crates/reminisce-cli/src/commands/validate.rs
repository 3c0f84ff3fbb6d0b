//! The `reminisce validate` command.

use std::path::PathBuf;

use anyhow::Result;

use reminisce_core::model::SENSITIVE_THRESHOLD;
use reminisce_core::parser;

pub fn execute(profile_path: PathBuf) -> Result<()> {
    let profile = parser::parse_profile(&profile_path)?;

    println!(
        "Profile: {} ({} family members, {} knowledge items)",
        profile.patient.full_name,
        profile.family.len(),
        profile.knowledge.len()
    );

    let sensitive = profile
        .knowledge
        .iter()
        .filter(|k| k.sensitivity_level >= SENSITIVE_THRESHOLD)
        .count();
    if sensitive > 0 {
        println!("{sensitive} item(s) are sensitive and excluded from quizzes by default.");
    }
    let inactive = profile.knowledge.iter().filter(|k| !k.is_active).count();
    if inactive > 0 {
        println!("{inactive} item(s) are inactive and never quizzed.");
    }

    println!("Profile is valid.");
    Ok(())
}
