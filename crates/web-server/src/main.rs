use std::path::Path;

// This main function is the entry point when running `cargo run -p web-server`.
// It loads `config.toml` from the working directory and serves until stopped.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let settings = configuration::load_config(Path::new("config.toml"))?;
    let _guard = configuration::init_tracing(&settings.logging)?;
    web_server::run_server(settings).await
}
