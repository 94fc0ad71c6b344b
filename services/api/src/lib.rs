mod cli;
mod console;
mod infra;
mod routes;
mod server;
#[cfg(test)]
mod test_support;

use candidate_scout::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
