//! Port Demo - one chat request against the live API
//!
//! Sends a short chat request with a tiny transcript through the port handler
//! and prints every response frame as JSON, the way the extension receives
//! them.
//!
//! Run with:
//!   OPENAI_API_KEY=sk-... cargo run --example port_demo -- [model] [config.yaml]
//!
//! Set `RUST_LOG=tubechat_core=debug` to watch the request lifecycle.

use anyhow::Context;
use serde_json::json;
use tracing_subscriber::EnvFilter;
use tubechat_core::config::{load_from_yaml, BridgeConfig};
use tubechat_core::port::{PortHandler, PortKind};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let model = args.next().unwrap_or_else(|| "gpt-4o-mini".to_string());
    let config = match args.next() {
        Some(path) => load_from_yaml(&path).with_context(|| format!("loading {}", path))?,
        None => BridgeConfig::default(),
    };
    let api_key = std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY is not set")?;

    let handler = PortHandler::from_config(&config)?;

    println!("\n🎬 TubeChat Port Demo ({})\n", model);

    let mut frames = handler.open(
        PortKind::Chat,
        json!({
            "model": model,
            "messages": [{"role": "user", "content": "Summarize the video in one sentence."}],
            "context": {
                "openAIKey": api_key,
                "transcript": {
                    "events": [
                        {"segs": [{"utf8": "Today"}, {"utf8": "we"}, {"utf8": "bake"}]},
                        {"tStartMs": 1200},
                        {"segs": [{"utf8": "sourdough\u{200B}"}, {"utf8": "bread."}]}
                    ]
                },
                "metadata": {"title": "Sourdough in ten minutes"}
            }
        }),
    );

    while let Some(frame) = frames.recv().await {
        println!("{}", serde_json::to_string(&frame)?);
        if frame.is_end {
            break;
        }
    }

    Ok(())
}
