// Lambda bootstrap entry point for the scheduled digest run

use lambda_runtime::{Error, run, service_fn};

#[tokio::main]
async fn main() -> Result<(), Error> {
    daily_digest::setup_logging();

    run(service_fn(daily_digest::worker::handler)).await?;

    Ok(())
}
