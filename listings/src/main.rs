mod api;
mod app;
mod config;
mod error;
mod repos;
mod state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    app::run().await
}
