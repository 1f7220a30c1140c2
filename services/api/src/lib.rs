mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use giller_progression::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
