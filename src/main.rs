mod config;
mod menu;
mod server;
mod sheets;
mod timing;

use std::sync::Arc;

use hyper::server::conn::http1;
use hyper_util::rt::TokioIo;
use tokio::{net::TcpListener, sync::RwLock, time::Duration};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use config::Config;
use menu::types::MenuData;
use server::server::Server;
use sheets::{client::SheetsClient, loader::Loader};
use timing::zoned_now::resolve_timezone;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(true)
        .init();

    let config = Config::from_env()?;
    if resolve_timezone(&config.timezone).is_none() {
        warn!(timezone = %config.timezone, "unknown timezone, opening hours will be evaluated in UTC");
    }

    let client = SheetsClient::from_config(&config);
    let loader = Loader::setup(client, config.ranges.clone(), &config.timezone);

    let menu = Arc::new(RwLock::new(MenuData::default()));
    loader.refresh(&menu).await;

    let server = Server::setup(menu.clone());
    let interval = Duration::from_secs(config.refresh_interval_secs);
    tokio::spawn(async move {
        // The first load already happened above
        tokio::time::sleep(interval).await;
        loader.run(menu, interval).await;
    });

    let listener = TcpListener::bind(config.server_address()).await?;
    info!(address = %config.server_address(), "listening");

    loop {
        let (stream, _) = match listener.accept().await {
            Ok(connection) => connection,
            Err(err) => {
                error!(error = %err, "could not accept connection");
                continue;
            }
        };
        let io = TokioIo::new(stream);
        let server_clone = server.clone();
        tokio::spawn(async move {
            if let Err(err) = http1::Builder::new()
                .serve_connection(io, server_clone)
                .await
            {
                error!(error = %err, "connection failed");
            }
        });
    }
}
