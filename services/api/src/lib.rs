mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use quiz2biz::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
