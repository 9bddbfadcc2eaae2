// Command-line flags and the non-interactive flow. Passing any push flag
// skips the wizard: the push is built from the flags and broadcast once to
// every device on the account.

use crate::api::ApiClient;
use crate::config::Config;
use crate::dispatch::{dispatch, SendOutcome, Target};
use crate::push::{self, PushFields};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "pushbullet")]
#[command(about = "Send Pushbullet pushes from the terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Type of push (Note, Link, Address, List, File)
    #[arg(long = "type", value_name = "TYPE")]
    pub kind: Option<String>,

    /// Title of push [Note, Link, List]
    #[arg(long)]
    pub title: Option<String>,

    /// Body of push [Note]
    #[arg(long)]
    pub body: Option<String>,

    /// URL to push [Link]
    #[arg(long)]
    pub url: Option<String>,

    /// Name of place [Address]
    #[arg(long)]
    pub name: Option<String>,

    /// Address of place [Address]
    #[arg(long)]
    pub address: Option<String>,

    /// List of items, comma-delimited [List]
    #[arg(long)]
    pub items: Option<String>,

    /// Filename of file to send [File]
    #[arg(long)]
    pub filename: Option<String>,

    /// Config file holding the API key (default: ~/.pushbullet/config.json)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// True when no push flag was given; `--config` alone still runs the
    /// wizard.
    pub fn is_interactive(&self) -> bool {
        self.kind.is_none() && self.fields() == PushFields::default()
    }

    pub fn fields(&self) -> PushFields {
        PushFields {
            title: self.title.clone(),
            body: self.body.clone(),
            url: self.url.clone(),
            name: self.name.clone(),
            address: self.address.clone(),
            items: self.items.clone(),
            filename: self.filename.clone(),
        }
    }
}

/// Build the push from flags and broadcast it. Bad input and a missing API
/// key are rejected before anything is sent.
pub fn run_non_interactive(
    api: &ApiClient,
    config: &Config,
    cli: &Cli,
) -> Result<Vec<SendOutcome>> {
    let kind = cli
        .kind
        .as_deref()
        .context("--type is required when sending without the wizard")?;
    let request = push::build(kind, &cli.fields())?;

    let api_key = config
        .api_key()
        .context("No API key configured; run without flags once to set it up")?;

    debug!(kind = request.push_type().as_str(), "broadcasting push");
    Ok(dispatch(api, api_key, &[Target::Broadcast], &request))
}
