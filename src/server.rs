//! TCP front end: accepts connections and feeds them to the coordinator.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use log::{info, warn};
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::coordinator::{Coordinator, CoordinatorConfig};
use crate::session::Session;
use crate::transport::{Multiplexer, TcpTransport};

pub struct Server {
    listener: TcpListener,
    mux: Multiplexer,
    coordinator: Coordinator,
    config: ServerConfig,
}

impl Server {
    pub async fn bind(config: &ServerConfig) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(&config.bind).await?;
        let mux = Multiplexer::new();
        let coordinator = Coordinator::new(
            CoordinatorConfig {
                handoff_timeout: config.handoff_timeout,
            },
            mux.handle(),
        );
        Ok(Self {
            listener,
            mux,
            coordinator,
            config: config.clone(),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn session(&self) -> Arc<Session> {
        self.coordinator.session()
    }

    pub async fn run_until<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send,
    {
        let Server {
            listener,
            mut mux,
            coordinator,
            config,
        } = self;
        let handle = mux.handle();
        info!("listening on {}", listener.local_addr()?);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("server shutting down");
                    break;
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let transport = TcpTransport::with_config(
                            stream,
                            config.io_timeout,
                            config.max_frame_size,
                        );
                        let client = handle.attach(transport);
                        info!("{} connected from {}", client, peer);
                    }
                    Err(e) => warn!("failed to accept connection: {}", e),
                },
                Some(inbound) = mux.receive() => coordinator.handle(inbound),
            }
        }
        Ok(())
    }

    pub async fn run_until_ctrl_c(self) -> anyhow::Result<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("failed to install ctrl-c handler: {}", e);
            }
        })
        .await
    }
}
