use anyhow::{Context, bail};
use clap::Parser;
use core::time::Duration;
use snowgen::validate_worker_id;

/// Runtime configuration for the `snowgen-server` binary.
///
/// All values are parsed from CLI arguments or environment variables (a `.env`
/// file is loaded first), with defaults that match a single-node deployment.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "snowgen-server",
    version,
    about = "An HTTP service handing out Snowflake IDs"
)]
pub struct CliArgs {
    /// Address to listen on.
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("0.0.0.0:8000"))]
    pub server_addr: String,

    /// Worker id to stamp into every ID, in `1..=1023`.
    ///
    /// When unset, the id is derived from the host's first private IPv4
    /// address. Set it when hosts share their last two octets modulo 1024 or
    /// when no private address is available.
    ///
    /// Environment variable: `WORKER_ID`
    #[arg(long, env = "WORKER_ID")]
    pub worker_id: Option<i64>,

    /// Longest time, in milliseconds, a request may spin waiting for the clock
    /// to tick once a millisecond's sequence space is spent.
    ///
    /// Setting this also rejects requests while the clock is behind the last
    /// issued timestamp. Both cases answer `503 Service Unavailable`. When
    /// unset, requests wait for the clock indefinitely.
    ///
    /// Environment variable: `MAX_SPIN_MS`
    #[arg(long, env = "MAX_SPIN_MS")]
    pub max_spin_ms: Option<u64>,

    /// Upper bound on handling a single request, in seconds.
    ///
    /// A request still spinning on a stalled clock past this bound is answered
    /// with `408 Request Timeout`.
    ///
    /// Environment variable: `REQUEST_TIMEOUT_SECS`
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server_addr: String,
    pub worker_id: Option<u16>,
    pub max_spin: Option<Duration>,
    pub request_timeout: Duration,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let worker_id = args
            .worker_id
            .map(|id| validate_worker_id(id).map(|id| id as u16))
            .transpose()
            .context("invalid WORKER_ID")?;

        if args.max_spin_ms == Some(0) {
            bail!("MAX_SPIN_MS must be greater than 0");
        }

        if args.request_timeout_secs == 0 {
            bail!("REQUEST_TIMEOUT_SECS must be greater than 0");
        }

        Ok(Self {
            server_addr: args.server_addr,
            worker_id,
            max_spin: args.max_spin_ms.map(Duration::from_millis),
            request_timeout: Duration::from_secs(args.request_timeout_secs),
        })
    }
}
