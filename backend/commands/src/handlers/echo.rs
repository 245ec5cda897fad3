use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use lambdabot_core::Handler;

use crate::registry::RegistryBuilder;

/// `echo`: replies with its arguments.
pub struct EchoHandler;

#[async_trait]
impl Handler for EchoHandler {
    async fn handle(&self, args: &str) -> Result<String> {
        Ok(args.to_string())
    }
}

pub fn register(builder: &mut RegistryBuilder) {
    builder.register("echo", Arc::new(EchoHandler));
}
