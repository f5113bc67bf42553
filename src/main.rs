use clap::Parser;
use misra_pingpong::{config::NodeConfig, error::MisraError, log};
use std::{path::PathBuf, process};

/// Misra's ping-pong mutual exclusion between two peers.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Port to accept the peer's connection on.
    #[arg(short, long)]
    listen: Option<u16>,

    /// Address of the peer to send tokens to (e.g. 127.0.0.1:9001).
    #[arg(short, long)]
    send: Option<String>,

    /// Originate the token pair.
    #[arg(short, long)]
    initiator: bool,

    /// Probability in [0, 1] that a PING token is lost.
    #[arg(short = 'p', long)]
    ping_loss: Option<f64>,

    /// Time spent in the critical section, in milliseconds.
    #[arg(long)]
    critical_section_ms: Option<u64>,

    /// Seed for the loss simulation.
    #[arg(long)]
    seed: Option<u64>,

    /// Delay before the first dial retry, in milliseconds.
    #[arg(long)]
    retry_initial_ms: Option<u64>,

    /// Upper bound for the dial retry delay, in milliseconds.
    #[arg(long)]
    retry_max_ms: Option<u64>,

    /// Give up dialing after this many attempts.
    #[arg(long)]
    retry_attempts: Option<u32>,

    /// JSON config file; flags override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print debug output.
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> Result<NodeConfig, MisraError> {
        let mut config = match &self.config {
            Some(path) => NodeConfig::from_file(path)?,
            None => match (self.listen, &self.send) {
                (Some(port), Some(address)) => NodeConfig::new(port, address.clone()),
                _ => {
                    return Err(MisraError::Config(String::from(
                        "both --listen <PORT> and --send <ADDRESS> are required",
                    )))
                }
            },
        };

        if let Some(port) = self.listen {
            config.listen_port = port;
        }
        if let Some(address) = self.send {
            config.peer_address = address;
        }
        if self.initiator {
            config.initiator = true;
        }
        if let Some(p) = self.ping_loss {
            config.loss_probability = p;
        }
        if let Some(ms) = self.critical_section_ms {
            config.critical_section_ms = ms;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(ms) = self.retry_initial_ms {
            config.retry.initial_delay_ms = ms;
        }
        if let Some(ms) = self.retry_max_ms {
            config.retry.max_delay_ms = ms;
        }
        if self.retry_attempts.is_some() {
            config.retry.max_attempts = self.retry_attempts;
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    log::set_verbose(cli.verbose);

    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => {
            log::error(&format!("{e}"));
            process::exit(1);
        }
    };

    if let Ok(json) = config.to_json_string() {
        log::debug(&format!("Running with {json}"));
    }

    if let Err(e) = misra_pingpong::run(config).await {
        if e.is_link_failure() {
            log::error(&format!("The link to the peer failed: {e}"));
        } else {
            log::error(&format!("{e}"));
        }
        process::exit(1);
    }
}
