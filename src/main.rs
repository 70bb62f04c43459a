//! `sfp` binary: move a file between two hosts as fragments over TCP.

mod cli;

use std::{
    fs::{self, File},
    io,
    num::{NonZeroU32, NonZeroUsize},
    path::Path,
    process::ExitCode,
    time::Duration,
};

use clap::Parser;
use cli::{Cli, Command, TransportArgs};
use sfp::{
    BufferPool,
    Connection,
    StreamConnection,
    TransferConfig,
    TransferError,
    config::DEFAULT_TIMEOUT,
    storage::{FileSink, FileSource},
};
use thiserror::Error;
use tokio::{io::AsyncWriteExt, net::TcpListener};
use tracing::{error, info, warn};

#[derive(Debug, Error)]
enum AppError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("transfer failed: {0}")]
    Transfer(#[from] TransferError),
    #[error("invalid setting: {0}")]
    Setting(&'static str),
    #[error("file of {0} bytes exceeds the 4 GiB transfer limit")]
    TooLarge(u64),
}

impl From<sfp::ConnectionError> for AppError {
    fn from(error: sfp::ConnectionError) -> Self { Self::Transfer(error.into()) }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Bridges `log` records from the library into the subscriber.
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "sfp failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    install_metrics(&cli.transport);
    let pool = buffer_pool(&cli.transport)?;

    match cli.command {
        Command::Send { connect, mtu, file } => {
            let file = File::open(file)?;
            let len = file.metadata()?.len();
            let total_size = u32::try_from(len).map_err(|_| AppError::TooLarge(len))?;
            let config = send_config(pool.buffer_size(), mtu)?;
            config.validate(pool.buffer_size())?;

            let mut conn = StreamConnection::connect(connect, pool).await?;
            info!(%connect, total_size, mtu = config.mtu.get(), "sending");
            config
                .send(&mut conn, &mut FileSource::new(file), total_size)
                .await?;
            conn.into_inner().shutdown().await?;
            info!(total_size, "sent");
        }
        Command::Receive {
            listen,
            output,
            timeout_ms,
        } => {
            let config = TransferConfig {
                timeout: Duration::from_millis(timeout_ms),
                ..TransferConfig::default()
            };
            let listener = TcpListener::bind(listen).await?;
            info!(addr = %listener.local_addr()?, "waiting for sender");
            let (stream, peer) = listener.accept().await?;
            stream.set_nodelay(true)?;

            let mut conn = StreamConnection::new(stream, pool);
            let received = receive_file(&config, &mut conn, &output).await?;
            info!(%peer, received, output = %output.display(), "received");
            println!("{received}");
        }
    }

    Ok(())
}

/// MTU from the command line, or the largest that fits the buffer size.
fn send_config(buffer_size: usize, mtu: Option<u32>) -> Result<TransferConfig, AppError> {
    let fitted = TransferConfig::for_buffer_size(buffer_size, DEFAULT_TIMEOUT)
        .ok_or(AppError::Setting("buffer size leaves no room for payload"))?;
    match mtu {
        None => Ok(fitted),
        Some(mtu) => Ok(TransferConfig {
            mtu: NonZeroU32::new(mtu).ok_or(AppError::Setting("mtu must be non-zero"))?,
            ..fitted
        }),
    }
}

/// Receive one transfer into a new file at `output`.
///
/// A failed transfer leaves no file behind.
async fn receive_file<C>(config: &TransferConfig, conn: &mut C, output: &Path) -> Result<u32, AppError>
where
    C: Connection + ?Sized,
{
    let mut sink = FileSink::new(File::create(output)?);
    match config.recv(conn, &mut sink, None).await {
        Ok(received) => Ok(received),
        Err(err) => {
            drop(sink);
            discard(output);
            Err(err.into())
        }
    }
}

/// Remove a partially written output file after a failed receive.
fn discard(output: &Path) {
    if let Err(err) = fs::remove_file(output) {
        warn!(%err, output = %output.display(), "failed to remove partial output");
    }
}

fn buffer_pool(args: &TransportArgs) -> Result<BufferPool, AppError> {
    let buffer_size =
        NonZeroUsize::new(args.buffer_size).ok_or(AppError::Setting("buffer size must be non-zero"))?;
    let capacity = NonZeroUsize::new(args.pool_capacity)
        .ok_or(AppError::Setting("pool capacity must be non-zero"))?;
    Ok(BufferPool::new(buffer_size, capacity))
}

#[cfg(feature = "metrics")]
fn install_metrics(args: &TransportArgs) {
    let Some(addr) = args.metrics_addr else {
        return;
    };
    if let Err(err) = metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
    {
        warn!(%err, %addr, "failed to start metrics exporter");
    }
}

#[cfg(not(feature = "metrics"))]
fn install_metrics(args: &TransportArgs) {
    if args.metrics_addr.is_some() {
        warn!("built without the `metrics` feature; ignoring --metrics-addr");
    }
}
