//! Ask the model for a password and let it call a local generator.
//!
//! Run with `cargo run --example password [settings.toml]`. The API key is
//! read from `OPENAI_API_KEY`, optionally set in a `.env` file.

use funcall::config::{Settings, load_env_file};
use funcall::{ChatHistory, CompletionDriver, OpenAICompletionService, Role, callable};
use rand::Rng;
use rand::distr::Alphanumeric;

/// Generate a random alphanumeric password of the given length
#[callable]
fn generate_password(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    load_env_file();

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    let service = OpenAICompletionService::new(&settings.base_url, &settings.api_key()?)?;
    let driver = CompletionDriver::new(service, settings.driver_config());

    let mut history = ChatHistory::new(
        settings.model.clone(),
        settings.max_tokens,
        vec![GeneratePasswordArgs::callable()],
    )?;
    history.add_message(
        Role::System,
        "You are a helpful assistant. Use the available functions when they help.",
        None,
    )?;
    history.add_message(Role::User, "Generate a password of length 16", None)?;

    let answer = driver.get_completion(&mut history, &settings.completion).await?;
    println!("{}", answer.content());
    tracing::info!(
        tokens = history.total_tokens(),
        tokens_left = history.tokens_left(),
        "conversation finished"
    );

    Ok(())
}
