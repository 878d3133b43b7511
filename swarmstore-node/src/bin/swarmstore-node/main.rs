// Copyright (c) 2026 The Swarmstore Authors.
//
// This software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the software is distributed
// under the GPL Licence on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
// either express or implied. Please review the Licence for the specific language governing
// permissions and limitations under the Licence.

#[macro_use]
extern crate tracing;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use eyre::{eyre, Result};
use swarmstore_logging::{parse_log_format, LogFormat, LogOutputDest};
use swarmstore_node::{EngineKind, NodeEvent, NodeEventsReceiver, NodeHandle};
use tokio::sync::{broadcast::error::RecvError, mpsc};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_core::Level;

#[derive(Debug, Clone)]
pub enum LogOutputDestArg {
    Stdout,
    DataDir,
    Path(PathBuf),
}

impl std::fmt::Display for LogOutputDestArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogOutputDestArg::Stdout => write!(f, "stdout"),
            LogOutputDestArg::DataDir => write!(f, "data-dir"),
            LogOutputDestArg::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

fn parse_log_output(val: &str) -> Result<LogOutputDestArg> {
    match val {
        "stdout" => Ok(LogOutputDestArg::Stdout),
        "data-dir" => Ok(LogOutputDestArg::DataDir),
        value => Ok(LogOutputDestArg::Path(PathBuf::from(value))),
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EngineArg {
    Chord,
    Kademlia,
}

impl From<EngineArg> for EngineKind {
    fn from(value: EngineArg) -> Self {
        match value {
            EngineArg::Chord => EngineKind::Chord,
            EngineArg::Kademlia => EngineKind::Kademlia,
        }
    }
}

#[derive(Parser, Debug)]
#[clap(name = "swarmstore-node", version = env!("CARGO_PKG_VERSION"))]
struct Opt {
    /// Which overlay to run.
    #[clap(long, value_enum)]
    engine: EngineArg,

    /// Address to listen on, "host:port".
    #[clap(long, default_value = "0.0.0.0:0")]
    listen: String,

    /// Bootstrap peer to join through. Repeat to list several; the first
    /// that accepts the join wins. Omit to `Create` a brand-new network.
    #[clap(long)]
    bootstrap: Vec<String>,

    /// Specify the logging output destination: "stdout", "data-dir", or a
    /// custom path.
    #[clap(long, default_value_t = LogOutputDestArg::Stdout, value_parser = parse_log_output)]
    log_output: LogOutputDestArg,

    /// Specify the logging format: "default" or "json".
    #[clap(long, value_parser = parse_log_format)]
    log_format: Option<LogFormat>,

    /// Directory used when `--log-output data-dir` is selected.
    #[clap(long)]
    data_dir: Option<PathBuf>,
}

#[derive(Debug)]
enum NodeCtrl {
    Stop { cause: String },
}

fn main() -> Result<()> {
    let opt = Opt::parse();

    let (log_output_dest, _log_appender_guard) = init_logging(&opt)?;

    let msg = format!("Running {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    info!("\n{}\n{}", msg, "=".repeat(msg.len()));
    info!(engine = ?opt.engine, listen = %opt.listen, bootstrap = ?opt.bootstrap, "starting node");

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(start_node(opt))?;
    rt.shutdown_timeout(std::time::Duration::from_secs(2));

    let _ = log_output_dest;
    Ok(())
}

async fn start_node(opt: Opt) -> Result<()> {
    let handle = NodeHandle::new(opt.engine.into(), opt.listen.clone());
    let bound = handle.run().await?;
    info!(%bound, "listening");

    let joined = if opt.bootstrap.is_empty() {
        handle.create().await
    } else {
        handle.join(&opt.bootstrap).await
    };
    if !joined {
        return Err(eyre!("failed to join or create the network at {}", opt.listen));
    }

    let (ctrl_tx, mut ctrl_rx) = mpsc::channel::<NodeCtrl>(5);
    monitor_node_events(handle.subscribe(), ctrl_tx.clone());

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("ctrl-c received, shutting down");
            handle.quit().await;
            Ok(())
        }
        ctrl = ctrl_rx.recv() => {
            match ctrl {
                Some(NodeCtrl::Stop { cause }) => {
                    warn!(%cause, "node stopping");
                    handle.force_quit().await;
                    Err(eyre!(cause))
                }
                None => {
                    handle.force_quit().await;
                    Err(eyre!("internal node ctrl channel closed"))
                }
            }
        }
    }
}

fn monitor_node_events(mut events: NodeEventsReceiver, ctrl_tx: mpsc::Sender<NodeCtrl>) {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(NodeEvent::ConnectedToNetwork) => info!("node connected to the network"),
                Ok(NodeEvent::ChannelClosed) | Err(RecvError::Closed) => {
                    let _ = ctrl_tx.send(NodeCtrl::Stop { cause: "node events channel closed".into() }).await;
                    return;
                }
                Err(RecvError::Lagged(n)) => {
                    warn!(skipped = n, "skipped node events");
                }
            }
        }
    });
}

fn init_logging(opt: &Opt) -> Result<(String, Option<WorkerGuard>)> {
    let logging_targets = vec![
        ("swarmstore_node".to_string(), Level::INFO),
        ("swarmstore_networking".to_string(), Level::INFO),
    ];

    let output_dest = match &opt.log_output {
        LogOutputDestArg::Stdout => LogOutputDest::Stdout,
        LogOutputDestArg::DataDir => {
            let base = opt
                .data_dir
                .clone()
                .or_else(|| dirs_next::data_dir().map(|d| d.join("swarmstore").join("node")))
                .ok_or_else(|| eyre!("could not determine a default data directory"))?;
            LogOutputDest::Path(base.join("logs"))
        }
        LogOutputDestArg::Path(path) => LogOutputDest::Path(path.clone()),
    };

    let guard = swarmstore_logging::init_logging(
        logging_targets,
        output_dest.clone(),
        opt.log_format.unwrap_or(LogFormat::Default),
    )
    .map_err(|err| eyre!(err.to_string()))?;

    Ok((output_dest.to_string(), guard))
}
