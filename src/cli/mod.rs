//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod provider_list;
pub mod say;
pub mod set;

use std::error::Error;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::cli::provider_list::list_providers;
use crate::cli::say::run_say;
use crate::cli::set::apply_setting;
use crate::core::config::{config_dir, Config};
use crate::core::conversation::ConversationHandler;
use crate::core::executor::Executor;
use crate::core::keys::init_key_dir;
use crate::core::providers::{FactoryError, ProviderFactory};
use crate::ui::chat_loop::run_chat;
use crate::utils::logging::init_tracing;

#[derive(Parser, Debug)]
#[command(name = "nexus", version)]
#[command(about = "An interactive terminal chat client for remote LLM APIs")]
#[command(
    long_about = "Nexus is a line-oriented chat client for Anthropic and OpenAI-compatible APIs. \
Replies stream to the terminal as they arrive, and the whole conversation is \
sent with every request.\n\n\
Authentication:\n\
  Put your key in <config dir>/keys/anthropic.key or <config dir>/keys/openai.key,\n\
  or set ANTHROPIC_API_KEY / OPENAI_API_KEY. An Anthropic key is required.\n\n\
Environment Variables:\n\
  NEXUS_CONFIG_DIR  Override the configuration directory\n\
  NEXUS_LOG         Log filter for diagnostics on stderr (e.g. debug)\n\n\
Commands (inside a session):\n\
  :help             List available commands\n\
  :stream on|off    Switch between streamed and batched replies\n\
  :stream status    Show the current reply mode\n\
  :branch <name>    Reserved for conversation branching\n\
  :quit             End the session"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Provider to use instead of the configured default
    #[arg(short = 'p', long, global = true, value_name = "PROVIDER")]
    pub provider: Option<String>,

    /// Model to request from the selected provider
    #[arg(short = 'm', long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Start in batched mode instead of streaming replies
    #[arg(long, global = true)]
    pub no_stream: bool,

    /// Log debug diagnostics to stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start an interactive session (default)
    Chat,
    /// Send a single prompt, print the reply, and exit
    Say {
        /// The prompt to send
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        prompt: Vec<String>,
    },
    /// Show known providers and whether a key is available for each
    Providers,
    /// Change a saved setting (default-provider, default-model, streaming, request-timeout)
    Set {
        /// The setting to change
        key: String,
        /// The new value; default-model takes a provider and a model
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        values: Vec<String>,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing(args.verbose);
    run_detached(tokio::runtime::Runtime::new()?, async_main(args))
}

/// Drive `future` to completion, then shut the runtime down without waiting
/// on blocking tasks such as a parked stdin read.
fn run_detached<F: std::future::Future>(runtime: tokio::runtime::Runtime, future: F) -> F::Output {
    let output = runtime.block_on(future);
    runtime.shutdown_background();
    output
}

async fn async_main(args: Args) -> Result<(), Box<dyn Error>> {
    let Args {
        command,
        provider,
        model,
        no_stream,
        verbose: _,
    } = args;

    let mut config = Config::load()?;

    match command.unwrap_or(Commands::Chat) {
        Commands::Set { key, values } => {
            let summary = apply_setting(&mut config, &key, &values)?;
            config.save()?;
            println!("{summary}");
        }
        Commands::Providers => {
            let keys_dir = init_key_dir(&config_dir())?;
            list_providers(&config, &keys_dir, &mut std::io::stdout())?;
        }
        Commands::Chat => {
            let factory = ProviderFactory::new(config.clone(), &init_key_dir(&config_dir())?)?;
            let handler =
                build_handler(&factory, &config, provider.as_deref(), model.as_deref(), no_stream)?;
            run_chat(Executor::new(handler)).await?;
        }
        Commands::Say { prompt } => {
            let factory = ProviderFactory::new(config.clone(), &init_key_dir(&config_dir())?)?;
            let handler =
                build_handler(&factory, &config, provider.as_deref(), model.as_deref(), no_stream)?;
            run_say(handler, prompt).await?;
        }
    }
    Ok(())
}

/// Pick the provider and wrap it in a handler configured for this session.
pub fn build_handler(
    factory: &ProviderFactory,
    config: &Config,
    provider: Option<&str>,
    model: Option<&str>,
    no_stream: bool,
) -> Result<ConversationHandler, FactoryError> {
    let name = match provider {
        Some(name) => name,
        None => factory.default_name()?,
    };
    let backend = factory.get(name, model)?;
    let streaming = config.streaming_enabled() && !no_stream;
    info!(provider = backend.name(), streaming, "starting session");

    Ok(ConversationHandler::new(backend)
        .with_streaming_mode(streaming)
        .with_request_timeout(config.request_timeout()))
}
