use std::sync::Arc;

use console::Term;
use reqwest::header::HeaderValue;

use gofile_dl::config::{CONFIG_FILE, base_headers};
use gofile_dl::DownloadConfig;
use gofile_dl::session::{clear_file, run_session};
use gofile_dl::{AppConfig, Downloader, Error, GofileClient, LiveDisplay};

fn print_usage() {
    eprintln!("Usage: gofile-dl [OPTIONS]");
    eprintln!();
    eprintln!("Reads GoFile URLs from URLs.txt (one per line), downloads the");
    eprintln!("resolved files, then clears the list. Download settings are");
    eprintln!("read from gofile-dl.toml in the working directory if present.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --dir <PATH>        Download root directory");
    eprintln!("  --password <PASS>   Password for protected content");
    eprintln!("  --web               Run the link-resolver web front-end instead");
    eprintln!("  --host <HOST>       Web bind address (default: 127.0.0.1)");
    eprintln!("  --port <PORT>       Web bind port (default: 8732)");
    eprintln!("  -h, --help          Show this help");
}

struct CliArgs {
    config: AppConfig,
    password: Option<String>,
    web: bool,
}

fn parse_args() -> Option<CliArgs> {
    let mut config = AppConfig::new();
    let mut password = None;
    let mut web = false;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => return None,
            "--web" => web = true,
            "--dir" | "--password" | "--host" | "--port" => {
                let flag = args[i].clone();
                i += 1;
                let Some(value) = args.get(i) else {
                    eprintln!("Error: {flag} requires a value");
                    std::process::exit(1);
                };
                match flag.as_str() {
                    "--dir" => config.paths.download_dir = value.into(),
                    "--password" => password = Some(value.clone()),
                    "--host" => config.web.host = value.clone(),
                    "--port" => match value.parse() {
                        Ok(port) => config.web.port = port,
                        Err(_) => {
                            eprintln!("Error: invalid port: {value}");
                            std::process::exit(1);
                        }
                    },
                    _ => unreachable!(),
                }
            }
            other => {
                eprintln!("Error: unknown argument: {other}");
                std::process::exit(1);
            }
        }
        i += 1;
    }

    Some(CliArgs {
        config,
        password,
        web,
    })
}

/// Builds the API client (guest login) and a download client carrying the
/// account-token cookie.
async fn build_clients() -> gofile_dl::Result<(GofileClient, Downloader)> {
    let api_http = reqwest::Client::builder()
        .default_headers(base_headers())
        .build()?;
    let client = GofileClient::new_guest(api_http).await?;

    let mut download_headers = base_headers();
    let cookie = HeaderValue::from_str(&format!("accountToken={}", client.token()))
        .map_err(|_| Error::Api("account token is not a valid header value".to_string()))?;
    download_headers.insert("Cookie", cookie);
    let download_http = reqwest::Client::builder()
        .default_headers(download_headers)
        .build()?;

    Ok((client, Downloader::new(download_http)))
}

#[tokio::main]
async fn main() -> gofile_dl::Result<()> {
    env_logger::init();

    let Some(args) = parse_args() else {
        print_usage();
        std::process::exit(0);
    };

    // An interrupt aborts the whole session immediately; in-flight
    // downloads are not unwound.
    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupted.");
            std::process::exit(1);
        }
    });

    if args.web {
        #[cfg(feature = "web")]
        {
            let api_http = reqwest::Client::builder()
                .default_headers(base_headers())
                .build()?;
            let client = Arc::new(GofileClient::new_guest(api_http).await?);
            return gofile_dl::web::run_server(client, &args.config.web.host, args.config.web.port)
                .await;
        }
        #[cfg(not(feature = "web"))]
        {
            eprintln!("Web support not compiled in");
            std::process::exit(1);
        }
    }

    let mut config = args.config;
    let config_file = std::path::Path::new(CONFIG_FILE);
    if config_file.exists() {
        config.download = DownloadConfig::load(config_file)?;
    }

    // Fresh screen and session log for every run.
    let _ = Term::stdout().clear_screen();
    clear_file(&config.paths.session_log)?;
    std::fs::create_dir_all(&config.paths.download_dir)?;

    let (client, downloader) = build_clients().await?;

    let live = Arc::new(LiveDisplay::new(&config.download));
    live.start();
    let result = run_session(&config, &client, &downloader, &live, args.password.as_deref()).await;
    live.stop().await;

    result
}
