//! Command line interface for the `sfp` binary.
//!
//! Kept free of crate-internal types so `build.rs` can include it to render
//! the manual page. The literal defaults below mirror `sfp::config`, and the
//! tests hold them equal.

use std::{net::SocketAddr, path::PathBuf};

use clap::{Args, Parser, Subcommand};

/// Command line arguments for the `sfp` binary.
#[derive(Debug, Parser)]
#[command(
    name = "sfp",
    version,
    about = "Move a file across a TCP connection as fixed-size fragments"
)]
pub struct Cli {
    #[command(flatten)]
    pub transport: TransportArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Settings shared by both directions.
#[derive(Debug, Args)]
pub struct TransportArgs {
    /// Size in bytes of a single packet buffer, trailer included.
    #[arg(long, global = true, default_value_t = 256)]
    pub buffer_size: usize,

    /// Number of packet buffers available to the connection.
    #[arg(long, global = true, default_value_t = 16)]
    pub pool_capacity: usize,

    /// Expose Prometheus metrics on this address.
    #[arg(long, global = true)]
    pub metrics_addr: Option<SocketAddr>,
}

/// Transfer direction.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Send a file to a listening peer.
    Send {
        /// Address of the receiving peer.
        #[arg(short, long)]
        connect: SocketAddr,

        /// Payload bytes per fragment; defaults to the largest that fits.
        #[arg(short, long)]
        mtu: Option<u32>,

        /// File to send.
        file: PathBuf,
    },
    /// Accept one connection and store the transfer it carries.
    Receive {
        /// Address to listen on.
        #[arg(short, long)]
        listen: SocketAddr,

        /// Where to write the received data.
        #[arg(short, long)]
        output: PathBuf,

        /// Milliseconds to wait for each fragment.
        #[arg(long, default_value_t = 10_000)]
        timeout_ms: u64,
    },
}
