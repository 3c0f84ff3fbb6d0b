//! The `reminisce generate` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use comfy_table::{Cell, Table};

use reminisce_core::session::{GenerateOptions, SessionEngine};
use reminisce_core::traits::QuestionGenerator;
use reminisce_providers::config::load_config_from;
use reminisce_providers::create_generator;
use reminisce_store::{MemoryStore, Snapshot};

use super::resolve_patient;

pub async fn execute(
    state_path: PathBuf,
    patient: String,
    n: usize,
    include_sensitive: bool,
    reveal_answers: bool,
    config_path: Option<PathBuf>,
    format: String,
) -> Result<()> {
    anyhow::ensure!(n >= 1, "question count must be at least 1");

    let config = load_config_from(config_path.as_deref())?;
    let generator: Option<Arc<dyn QuestionGenerator>> = match &config.generator {
        Some(gconfig) => Some(Arc::from(create_generator(gconfig)?)),
        None => None,
    };

    let store = Arc::new(MemoryStore::from_snapshot(Snapshot::load(&state_path)?));
    let patient = resolve_patient(&store, &patient)?;

    let engine = SessionEngine::new(store.clone(), generator);
    let quiz = engine
        .generate(
            patient.id,
            &GenerateOptions {
                n,
                include_sensitive,
                reveal_answers,
            },
        )
        .await?;

    store.snapshot().save(&state_path)?;

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&quiz)?),
        _ => {
            println!(
                "Session {} for {} ({} questions)",
                quiz.session_id,
                patient.full_name,
                quiz.questions.len()
            );
            let mut table = Table::new();
            table.set_header(vec!["#", "Question id", "Type", "Prompt", "Options"]);
            for (idx, q) in quiz.questions.iter().enumerate() {
                let options = q
                    .options
                    .as_ref()
                    .map(|o| o.join(" / "))
                    .unwrap_or_else(|| "-".to_string());
                table.add_row(vec![
                    Cell::new(idx + 1),
                    Cell::new(q.question_id),
                    Cell::new(q.question_type.to_string()),
                    Cell::new(&q.prompt),
                    Cell::new(options),
                ]);
            }
            println!("{table}");
            println!(
                "\nSubmit with: reminisce submit --session {} --answers '<json>'",
                quiz.session_id
            );
        }
    }

    Ok(())
}
