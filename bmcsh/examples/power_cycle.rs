//! Query a controller's power state and hard-reset the host.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example power_cycle -- --host 10.0.0.10 --user root --password calvin --dialect idrac8
//! ```

use std::env;
use std::time::Duration;

use bmcsh::BmcBuilder;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (set RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut bmc = BmcBuilder::new(args.host.as_str())
        .port(args.port)
        .username(args.user.as_str())
        .password(args.password.as_str())
        .dialect(args.dialect.as_str())
        .timeout(Duration::from_secs(30))
        .build()?;

    println!("Querying power state of {}...", args.host);
    let powered_on = bmc.is_on().await?;
    println!(
        "Host is {}",
        if powered_on { "powered on" } else { "powered off" }
    );

    if powered_on {
        println!("Power-cycling host...");
        match bmc.power_cycle().await {
            Ok(outcome) => println!("Controller answered: {}", outcome.output.trim()),
            Err(err) => eprintln!("Power-cycle failed: {err}"),
        }
    } else {
        println!("Powering host on...");
        let outcome = bmc.power_on().await?;
        println!("Controller answered: {}", outcome.output.trim());
    }

    bmc.close().await?;
    Ok(())
}

/// Simple argument parser (avoiding external dependencies)
struct Args {
    host: String,
    port: u16,
    user: String,
    password: String,
    dialect: String,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut host = "localhost".to_string();
        let mut port = 22u16;
        let mut user = "root".to_string();
        let mut password = String::new();
        let mut dialect = "idrac8".to_string();

        let mut i = 1;
        while i < args.len() {
            let value = |i: usize| args.get(i + 1).cloned().unwrap_or_default();
            match args[i].as_str() {
                "--host" => host = value(i),
                "--port" => port = value(i).parse().unwrap_or(22),
                "--user" => user = value(i),
                "--password" => password = value(i),
                "--dialect" => dialect = value(i),
                "--help" => {
                    println!(
                        "usage: power_cycle --host <HOST> [--port <PORT>] --user <USER> \
                         --password <PASS> [--dialect idrac8|ilo]"
                    );
                    std::process::exit(0);
                }
                other => eprintln!("Unknown argument: {other}"),
            }
            i += 2;
        }

        Self {
            host,
            port,
            user,
            password,
            dialect,
        }
    }
}
