use anyhow::{Error, Result};
use clap::Parser;
use regex::Regex;

use crate::libs::session::ConnectionConfig;

fn validate_host(host: &str) -> Result<String> {
    let pattern = Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9.-]*[A-Za-z0-9])?$")?;
    if pattern.is_match(host) {
        Ok(host.to_string())
    } else {
        Err(Error::msg(
            "must be a hostname or IPv4 address, e.g. bmc.example or 10.0.0.1",
        ))
    }
}

#[derive(Parser, Debug)]
#[command(arg_required_else_help(true))]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Hostname or address of the remote access controller
    #[arg(short = 'r', long = "host", value_parser = validate_host)]
    pub host: String,

    /// Username to authenticate as
    #[arg(short, long)]
    pub username: String,

    /// Password for the account
    #[arg(short, long)]
    pub password: String,

    /// HTTPS port of the controller
    #[arg(short = 'P', long, default_value_t = 443)]
    pub port: u16,

    /// Print each request and response on stderr
    #[arg(short, long, default_value_t = false)]
    pub debug: bool,

    /// Verify the controller's TLS certificate instead of accepting any
    #[arg(long, default_value_t = false)]
    pub verify_certs: bool,

    /// racadm command to run, with its arguments
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

impl Args {
    pub fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig {
            host: self.host.clone(),
            port: self.port,
            username: self.username.clone(),
            password: self.password.clone(),
            debug: self.debug,
            verify_certs: self.verify_certs,
        }
    }

    /// The command words joined back into the single string the exec
    /// CGI expects.
    pub fn command_line(&self) -> String {
        self.command.join(" ")
    }
}

#[test]
fn validate_host_test() {
    let test_cases = [
        ("10.0.0.1", true),
        ("bmc.example", true),
        ("drac-07.mgmt.example.com", true),
        ("", false),
        ("bmc.example/", false),
        ("https://bmc.example", false),
        ("bmc example", false),
    ];

    for case in test_cases {
        let result = validate_host(case.0);
        if case.1 {
            assert!(result.is_ok());
        } else {
            assert!(result.is_err());
        }
    }
}

#[test]
fn trailing_arguments_become_one_command() {
    let args = Args::try_parse_from([
        "rracadm",
        "-r",
        "bmc.example",
        "-u",
        "root",
        "-p",
        "calvin",
        "getconfig",
        "-g",
        "cfgLanNetworking",
    ])
    .unwrap();

    assert_eq!(args.command_line(), "getconfig -g cfgLanNetworking");
    let config = args.connection_config();
    assert_eq!(config.port, 443);
    assert!(!config.verify_certs);
}
