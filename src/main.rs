#![allow(dead_code)]
//! Task Board Frontend Entry Point

mod api;
mod bindings;
mod config;
mod endpoints;
mod error;
mod logging;
mod models;
mod notify;
mod plan;
mod sequencer;
mod surface;
mod sync;

#[cfg(test)]
mod testing;

use config::BoardConfig;

fn main() {
    console_error_panic_hook::set_once();
    logging::init(log::LevelFilter::Info);

    let config = BoardConfig::load();
    log::set_max_level(config.log_level());

    if let Err(e) = bindings::start(config) {
        log::error!("board failed to start: {}", e);
    }
}
