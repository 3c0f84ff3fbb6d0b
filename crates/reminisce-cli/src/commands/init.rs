//! The `reminisce init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create reminisce.toml
    if std::path::Path::new("reminisce.toml").exists() {
        println!("reminisce.toml already exists, skipping.");
    } else {
        std::fs::write("reminisce.toml", SAMPLE_CONFIG)?;
        println!("Created reminisce.toml");
    }

    // Create example patient profile
    std::fs::create_dir_all("profiles")?;
    let example_path = std::path::Path::new("profiles/example.toml");
    if example_path.exists() {
        println!("profiles/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_PROFILE)?;
        println!("Created profiles/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit profiles/example.toml with real patient facts");
    println!("  2. Run: reminisce validate --profile profiles/example.toml");
    println!("  3. Run: reminisce import --profile profiles/example.toml");
    println!("  4. Run: reminisce generate --patient \"Alice Johnson\"");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# reminisce configuration

# Number of questions per quiz
default_quiz_len = 7

# Whether sensitive knowledge items may appear in quizzes
include_sensitive = false

# State file location
state_path = "./reminisce-state.json"

# Uncomment to draft questions with an LLM; without this section
# quizzes use the built-in deterministic questions.
#
# [generator]
# type = "azure"
# endpoint = "https://your-resource.openai.azure.com"
# api_key = "${AZURE_OPENAI_API_KEY}"
# deployment = "gpt-4o-mini"
#
# [generator]
# type = "openai"
# api_key = "${OPENAI_API_KEY}"
# model = "gpt-4.1-mini"
"#;

const EXAMPLE_PROFILE: &str = r#"[patient]
full_name = "Alice Johnson"
dob = "1948-03-14"
phone = "555-0100"

[[family]]
full_name = "Maria Johnson"
relationship = "daughter"

[[family]]
full_name = "Tom Johnson"
relationship = "son"

[[knowledge]]
category = "personal"
label = "favorite color"
value = "blue"

[[knowledge]]
category = "places"
label = "home town"
value = "Portland"

[[knowledge]]
category = "medical"
label = "morning medication"
value = "donepezil"
sensitivity_level = 3
"#;
