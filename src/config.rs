use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use clap::{Args, Parser};

/// How error bodies are paired with HTTP status codes.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStatusMode {
    /// Always answer 200 and let clients inspect the `error` field.
    Compat,
    /// 400 for validation failures, 404 for unknown users.
    Rest,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "exercise-tracker",
    about = "In-memory exercise tracking API",
    version = crate::version::VERSION
)]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,
}

#[derive(Args, Debug, Clone)]
pub struct Config {
    #[arg(
        long,
        env = "EXERCISE_TRACKER_HOST",
        value_name = "ADDR",
        default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED)
    )]
    pub host: IpAddr,

    #[arg(
        long,
        env = "PORT",
        value_name = "PORT",
        default_value_t = 3000,
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    pub port: u16,

    #[arg(
        long = "error-status",
        env = "EXERCISE_TRACKER_ERROR_STATUS",
        value_name = "MODE",
        default_value = "compat",
        value_enum
    )]
    pub error_status: ErrorStatusMode,
}

impl Config {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
