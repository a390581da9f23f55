//! arrocco UCI chess engine main entry point.

use anyhow::Context;

fn main() -> anyhow::Result<()> {
    // stdout carries the protocol, logs go to stderr
    env_logger::init();
    arrocco::init();
    log::debug!("tables ready, entering UCI loop");

    arrocco::uci::run_uci_loop().context("UCI loop failed")
}
