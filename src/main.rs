use std::env;
use std::fs;
use std::net::SocketAddrV4;
use std::path::PathBuf;
use std::process;

use ftp_fetch::client::FtpClient;
use ftp_fetch::config::ClientConfig;
use ftp_fetch::error::Result;
use ftp_fetch::transfer::format_bytes;
use ftp_fetch::url::FtpUrl;

fn main() {
    // Initialize logging
    env_logger::init();

    let mut args = env::args();
    let program = args.next().unwrap_or_else(|| "ftp-fetch".to_string());
    let (Some(raw_url), None) = (args.next(), args.next()) else {
        print_usage(&program);
        process::exit(1);
    };

    let config = match ClientConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    };

    let url = match FtpUrl::parse(&raw_url) {
        Ok(url) => url,
        Err(e) => {
            eprintln!("{}", e);
            print_usage(&program);
            process::exit(1);
        }
    };

    let addr = match url.resolve(config.server_port) {
        Ok(addr) => addr,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    print_details(&url, addr, &config);

    match run(&config, &url, addr) {
        Ok((path, received)) => {
            println!("Saved {} ({})", path.display(), format_bytes(received));
        }
        Err(e) => {
            eprintln!("Download failed: {}", e);
            process::exit(1);
        }
    }
}

/// Run one download session, sending QUIT on success and failure alike.
fn run(config: &ClientConfig, url: &FtpUrl, addr: SocketAddrV4) -> Result<(PathBuf, u64)> {
    let download_dir = PathBuf::from(&config.download_dir);
    fs::create_dir_all(&download_dir)?;

    let mut client = FtpClient::connect(addr, config)?;
    let outcome = client
        .login(&url.user, &url.password)
        .and_then(|_| client.download(url, &download_dir));
    client.quit();
    outcome
}

fn print_details(url: &FtpUrl, addr: SocketAddrV4, config: &ClientConfig) {
    println!("=== Connection Details ===");
    println!("Host:     {} ({})", url.host, addr.ip());
    println!("Port:     {}", addr.port());
    println!("User:     {}", url.user);
    println!("Resource: {}", url.resource);
    println!("Save as:  {}/{}", config.download_dir, url.file);
    println!("==========================");
}

fn print_usage(program: &str) {
    println!("Usage: {program} ftp://[<user>:<password>@]<host>/<path>");
    println!();
    println!("Configuration (config.toml or environment):");
    println!("  FTP_FETCH_SERVER_PORT=21");
    println!("  FTP_FETCH_TIMEOUT_SECS=30");
    println!("  FTP_FETCH_DOWNLOAD_DIR=downloads");
    println!("  RUST_LOG=info");
}
