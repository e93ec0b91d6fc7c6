//! Origin-response trigger: adds the security headers to the response in the event.

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use secure_site_edge::event::{Event, Response};
use secure_site_edge::headers;

async fn handler(event: LambdaEvent<Event>) -> Result<Response, Error> {
    let (event, context) = event.into_parts();
    tracing::debug!(request_id = %context.request_id, "origin response");
    Ok(headers::handle(event)?)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .without_time()
        .with_target(false)
        .init();

    run(service_fn(handler)).await
}
