use std::{env, error::Error};

use semantic::{embedder_from_config, SemanticConfig};

/// Embeds a piece of complaint text with the configured provider.
///
/// Uses the Gemini API when `GEMINI_API_KEY` is set, otherwise the offline
/// stub provider.
///
/// ```bash
/// GEMINI_API_KEY=AIza... \
/// cargo run -p complaint-semantic --example api_embed -- "Pothole near the bus stop"
/// ```
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let text = env::args()
        .skip(1)
        .collect::<Vec<_>>()
        .join(" ");
    let text = if text.is_empty() {
        "Streetlight outside the school has been off for a week".to_string()
    } else {
        text
    };

    let cfg = match env::var("GEMINI_API_KEY") {
        Ok(key) => SemanticConfig {
            mode: "api".into(),
            api_provider: Some("gemini".into()),
            api_key: Some(key),
            ..Default::default()
        },
        Err(_) => SemanticConfig::default(),
    };

    let embedder = embedder_from_config(&cfg)?;
    let vector = embedder.embed(&text).await?;

    println!("model: {}", embedder.model_name());
    println!("dimension: {}", vector.len());
    println!(
        "head: {:?}",
        &vector[..vector.len().min(8)]
    );
    Ok(())
}
