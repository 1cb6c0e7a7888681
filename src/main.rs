/*
 * Responsibility
 * - Start the tokio runtime
 * - Call app::run() (no logic here)
 */
use anyhow::Result;

mod app;
mod config;
mod error;
mod middleware;
mod proxy;
mod routes;
mod state;

#[tokio::main]
async fn main() -> Result<()> {
    app::run().await
}
