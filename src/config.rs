// src/config.rs
//! Service configuration, taken from the command line or environment.

use clap::Parser;

use crate::error::ServiceError;

pub const DEFAULT_PORT: u16 = 4214;

#[derive(Debug, Clone, Parser)]
#[command(name = "rollcall")]
#[command(about = "Name registry service: register, look up and deregister addresses by name")]
#[command(version)]
pub struct Config {
    /// Interface to listen on
    #[arg(long, env = "ROLLCALL_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// The server will listen on this port
    #[arg(short, long, env = "ROLLCALL_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Worker threads for the async runtime
    #[arg(long, default_value_t = num_cpus::get())]
    pub workers: usize,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "rollcall=info")]
    pub log: String,
}

impl Config {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.workers == 0 {
            return Err(ServiceError::Config("--workers must be at least 1".into()));
        }
        if self.host.trim().is_empty() {
            return Err(ServiceError::Config("--host must not be empty".into()));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: DEFAULT_PORT,
            workers: num_cpus::get(),
            log: "rollcall=info".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_port_flag() {
        let cfg = Config::try_parse_from(["rollcall", "-p", "8080", "--workers", "2"]).unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.workers, 2);
        assert_eq!(cfg.bind_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn zero_workers_rejected() {
        let cfg = Config {
            workers: 0,
            ..Config::default()
        };
        assert!(matches!(cfg.validate(), Err(ServiceError::Config(_))));
        assert!(Config::default().validate().is_ok());
    }
}
