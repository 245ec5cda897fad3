pub mod config;
pub mod dispatch;
pub mod handlers;
pub mod registry;

use anyhow::Result;

pub use config::HandlerConfig;
pub use dispatch::{Dispatcher, unknown_command_message};
pub use registry::{Registry, RegistryBuilder};

/// Build the registry with every built-in command.
///
/// Handler modules register in a fixed order; if two modules ever claim the
/// same name, the later one in this list wins.
pub fn default_registry(config: &HandlerConfig) -> Result<Registry> {
    let client = handlers::http_client(config)?;
    let mut builder = RegistryBuilder::new();

    handlers::echo::register(&mut builder);
    handlers::weather::register(&mut builder, config, &client);
    handlers::electricity::register(&mut builder, config, &client);
    handlers::tvmaze::register(&mut builder, &client);
    handlers::wolframalpha::register(&mut builder, config, &client);
    handlers::pirkka::register(&mut builder, &client);

    Ok(builder.build())
}

/// Build a dispatcher pre-wired with all built-in handlers.
pub fn build_default_dispatcher(config: &HandlerConfig) -> Result<Dispatcher> {
    Ok(Dispatcher::new(default_registry(config)?))
}
