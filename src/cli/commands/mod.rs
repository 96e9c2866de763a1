mod subcommands;


use crate::config::{Config, load_config};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chatrelay")]
#[command(about = "Messenger webhook relay to an NLU backend")]
#[command(version)]
pub struct Cli {
    /// Path to config.json (defaults to $CHATRELAY_HOME/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the webhook server
    Serve {
        #[command(flatten)]
        overrides: ServeOverrides,
    },
    /// Send utterances to the NLU backend once and print the reply
    Query {
        /// Session id threading conversational context
        #[arg(short, long, default_value = "cli:default")]
        session: String,
        /// Override the query language
        #[arg(long)]
        lang: Option<String>,
        /// Print the raw response as JSON
        #[arg(long)]
        json: bool,
        #[arg(required = true)]
        utterances: Vec<String>,
    },
    /// Show the effective configuration and where credentials come from
    Config,
}

/// Command-line overrides applied on top of the loaded config.
#[derive(clap::Args, Debug, Default, Clone)]
pub(crate) struct ServeOverrides {
    #[arg(long)]
    host: Option<String>,
    #[arg(long, short = 'p')]
    port: Option<u16>,
    /// Mount the webhook at this path instead of the configured one
    #[arg(long)]
    path: Option<String>,
    /// Override the NLU query language
    #[arg(long)]
    lang: Option<String>,
}

impl ServeOverrides {
    fn apply(self, config: &mut Config) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(path) = self.path {
            config.server.webhook_path = path;
        }
        if let Some(lang) = self.lang {
            config.nlu.lang = lang;
        }
    }
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Serve { overrides } => {
            let mut config = load_config(config_path)?;
            overrides.apply(&mut config);
            subcommands::serve(config).await?;
        }
        Commands::Query {
            session,
            lang,
            json,
            utterances,
        } => {
            let mut config = load_config(config_path)?;
            if let Some(lang) = lang {
                config.nlu.lang = lang;
            }
            subcommands::query(&config, &session, &utterances, json).await?;
        }
        Commands::Config => {
            subcommands::config_command(config_path)?;
        }
    }

    Ok(())
}
