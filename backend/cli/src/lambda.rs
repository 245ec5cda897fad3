//! AWS Lambda transport.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use lambdabot_commands::Dispatcher;
use lambdabot_core::Command;
use tracing::{debug, warn};

/// Serve invocations until the runtime API shuts the process down.
pub async fn run(dispatcher: Arc<Dispatcher>) -> Result<()> {
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Command>| {
        let dispatcher = Arc::clone(&dispatcher);
        async move {
            let LambdaEvent { payload, context } = event;
            debug!(request_id = %context.request_id, "Lambda invocation");
            dispatch(&dispatcher, payload).await
        }
    }))
    .await
    .map_err(|e| anyhow!("Lambda runtime failed: {e}"))
}

/// Handler failures become function errors carrying the whole cause chain.
pub async fn dispatch(dispatcher: &Dispatcher, cmd: Command) -> Result<Command, Error> {
    dispatcher.handle(cmd).await.map_err(|e| {
        let message = format!("{:#}", anyhow::Error::new(e));
        warn!(error = %message, "Command failed");
        Error::from(message)
    })
}
