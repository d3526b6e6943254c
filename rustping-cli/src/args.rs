use std::time::Duration;

use clap::Parser;
use rustping_core::EchoConfig;

/// rustping: continuous ICMP echo over raw sockets
#[derive(Parser, Debug)]
#[command(name = "rustping", version, about = "Send ICMP echo requests until interrupted")]
pub struct Args {
    /// Target host: IPv4 address or resolvable hostname
    #[arg(value_name = "HOST")]
    pub host: String,

    /// How long to wait for each reply, in milliseconds
    #[arg(short = 'W', long = "timeout", value_name = "MS", default_value = "1000",
          value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_ms: u64,

    /// Pause between requests, in milliseconds
    #[arg(short = 'i', long = "interval", value_name = "MS", default_value = "500")]
    pub interval_ms: u64,

    /// Only accept echo replies that match the request (type, id, seq, checksum)
    #[arg(long = "strict")]
    pub strict: bool,

    /// Increase verbosity level (use -v or -vv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn echo_config(&self) -> EchoConfig {
        EchoConfig {
            read_timeout: Duration::from_millis(self.timeout_ms),
            interval: Duration::from_millis(self.interval_ms),
            strict_replies: self.strict,
        }
    }

    /// Default tracing filter for the requested verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_echo_config() {
        let args = Args::try_parse_from(["rustping", "127.0.0.1"]).unwrap();
        assert_eq!(args.host, "127.0.0.1");
        assert_eq!(args.echo_config(), EchoConfig::default());
        assert_eq!(args.log_filter(), "warn");
    }

    #[test]
    fn options_override_defaults() {
        let args = Args::try_parse_from([
            "rustping", "-W", "20000", "-i", "1000", "--strict", "-vv", "example.com",
        ])
        .unwrap();
        let config = args.echo_config();
        assert_eq!(config.read_timeout, Duration::from_secs(20));
        assert_eq!(config.interval, Duration::from_secs(1));
        assert!(config.strict_replies);
        assert_eq!(args.log_filter(), "debug");
    }

    #[test]
    fn host_is_required() {
        let err = Args::try_parse_from(["rustping"]).unwrap_err();
        assert!(err.use_stderr());
    }

    #[test]
    fn zero_timeout_rejected() {
        assert!(Args::try_parse_from(["rustping", "--timeout", "0", "10.0.0.1"]).is_err());
    }
}
