// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Serves the Stardust codec message interface over JSON lines.

mod cli;
mod config;
mod error;

use clap::Parser;
use serde_json::Value;
use stardust_codec::{message_interface::MessageHandler, wire::Response};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

use self::{cli::ClArgs, error::Error};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    set_up_logging();

    std::panic::set_hook(Box::new(|p| {
        error!("{}", p);
    }));

    if let Err(e) = run().await {
        error!("{}", e);
    }
}

fn set_up_logging() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(EnvFilter::from_default_env())
        .init();
}

async fn run() -> Result<(), Error> {
    let args = ClArgs::parse();
    let config = args.get_config()?;
    let handler = MessageHandler::new(config.protocol.load()?, config.cache.capacity);
    info!(
        "serving network `{}` with a cache of {} identifiers",
        handler.protocol_parameters().network_name,
        config.cache.capacity
    );

    match &args.input {
        Some(path) => {
            let file = tokio::fs::File::open(path).await.map_err(Error::Input)?;
            serve(&handler, BufReader::new(file)).await
        }
        None => serve(&handler, BufReader::new(tokio::io::stdin())).await,
    }
}

async fn serve(handler: &MessageHandler, input: impl AsyncBufRead + Unpin) -> Result<(), Error> {
    let mut lines = input.lines();
    let mut stdout = tokio::io::stdout();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.map_err(Error::Input)?,
            _ = tokio::signal::ctrl_c() => {
                info!("received ctrl-c, shutting down");
                break;
            }
        };
        let Some(line) = line else {
            debug!("end of input");
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        let response = match serde_json::from_str::<Value>(&line) {
            Ok(message) => handler.handle_json(message),
            Err(e) => {
                warn!("skipping a line that is not JSON: {e}");
                Response::Error(stardust_codec::error::Error::from(e).into_operation_error("parseMessage"))
            }
        };
        let mut out = serde_json::to_vec(&response)?;
        out.push(b'\n');
        stdout.write_all(&out).await.map_err(Error::Output)?;
        stdout.flush().await.map_err(Error::Output)?;
    }
    Ok(())
}
