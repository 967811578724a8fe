use anyhow::Result;
use clap::Parser;

pub mod chain;
pub mod error;
pub mod handlers;
pub mod ingest;
pub mod openai;
pub mod server;
pub mod store;

#[tokio::main]
async fn main() -> Result<()> {
    use openai::openai_client::OpenAIEmbedder;
    use server::{
        server_app::Server,
        server_config::{Cli, Command},
    };
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    // OPENAI_API_KEY and friends may live in a .env file
    dotenvy::dotenv().ok();

    // initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{}=debug,tower_http=debug", env!("CARGO_CRATE_NAME")).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match Cli::parse().command {
        Command::Serve(config) => Server::new(config).run().await?,
        Command::Ingest(config) => {
            let embedder = OpenAIEmbedder::new(
                config.embed.embed_model,
                config.embed.embed_api_url.clone(),
                config.embed.embed_model.get_api_key()?,
            )?;
            ingest::ingest(&config, &embedder).await?;
        }
    }

    Ok(())
}
