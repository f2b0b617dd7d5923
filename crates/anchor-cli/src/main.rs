mod commands;

use clap::{Parser, Subcommand};
use commands::token::KindArg;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "anchor", version, about = "Anchor credential tools")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Signing secret management
    Keys {
        #[command(subcommand)]
        cmd: KeysCommand,
    },

    /// Mint, inspect and verify credentials
    Token {
        #[command(subcommand)]
        cmd: TokenCommand,
    },
}

#[derive(Subcommand, Debug)]
enum KeysCommand {
    /// Generate a new random signing secret (32 bytes, base64url).
    Generate {
        /// Write the secret to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum TokenCommand {
    /// Mint an access/refresh pair for a subject.
    Issue {
        #[arg(long)]
        subject: String,

        /// Config file with a [credentials] table
        #[arg(long, env = "ANCHOR_SERVER_CONFIG", default_value = "anchor.toml")]
        config: PathBuf,

        /// Write the pair as JSON to this file
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Print a token's claims without verifying it.
    Inspect {
        /// The token, or a path to a file containing it
        token: String,
    },

    /// Verify a token and print its claims.
    Verify {
        /// The token, or a path to a file containing it
        token: String,

        #[arg(long, value_enum, default_value_t = KindArg::Access)]
        kind: KindArg,

        /// Config file with a [credentials] table
        #[arg(long, env = "ANCHOR_SERVER_CONFIG", default_value = "anchor.toml")]
        config: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Keys { cmd } => match cmd {
            KeysCommand::Generate { output } => commands::keys::generate(output)?,
        },
        Command::Token { cmd } => match cmd {
            TokenCommand::Issue {
                subject,
                config,
                output,
            } => commands::token::issue(&config, subject, output)?,
            TokenCommand::Inspect { token } => commands::token::inspect(token)?,
            TokenCommand::Verify {
                token,
                kind,
                config,
            } => commands::token::verify(&config, token, kind)?,
        },
    }

    Ok(())
}
