mod app;
mod cli;
mod commands;
mod context;
mod navigator;
mod rest;
mod seed;
mod service;
mod storage;
mod tracing;

#[tokio::main]
async fn main() {
    if let Err(err) = app::run().await {
        log::error!("{:#}", err);
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
