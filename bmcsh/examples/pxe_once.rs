//! Configure a host to network-boot once, then power-cycle it.
//!
//! Each leg of the sequence must classify as success before the next is
//! issued; a failed leg leaves the controller in whatever state the
//! previous legs produced, and the raw firmware response is printed.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example pxe_once -- --host 10.0.0.10 --user root --password calvin
//! ```

use std::env;

use bmcsh::BmcBuilder;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let get = |flag: &str, default: &str| {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .cloned()
            .unwrap_or_else(|| default.to_string())
    };

    let host = get("--host", "localhost");
    let mut bmc = BmcBuilder::new(host.as_str())
        .username(get("--user", "root"))
        .password(get("--password", ""))
        .dialect(get("--dialect", "idrac8"))
        .build()?;

    println!("Setting one-time PXE boot on {host}...");
    match bmc.set_pxe_once().await {
        Ok(outcome) => {
            println!("Host is power-cycling into PXE.");
            println!("Controller answered: {}", outcome.output.trim());
        }
        Err(err) => eprintln!("One-time PXE boot failed: {err}"),
    }

    bmc.close().await?;
    Ok(())
}
