mod cli;
mod infra;
mod replay;
mod routes;
mod server;

use hire_sync::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
