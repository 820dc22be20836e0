use crate::{
    common::{runtime, util::Join},
    server::{
        handler::PactHandler,
        server::{MockServer, MockServerConfig},
    },
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::{
    runtime::{Handle, Runtime},
    sync::oneshot,
};

pub(crate) mod handler;
pub(crate) mod matchers;
pub(crate) mod registry;
mod server;

pub use handler::MISMATCH_HEADER;
pub(crate) use registry::InteractionRegistry;
pub use server::Error;

use registry::Registry;

/// A running mock endpoint: its own tokio runtime with one HTTP server task bound to a loopback
/// port. The server stops and the port is released when this value is dropped.
pub(crate) struct MockEndpoint {
    address: SocketAddr,
    runtime: Option<Runtime>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl MockEndpoint {
    pub(crate) fn start<R>(
        registry: Arc<R>,
        static_port: Option<u16>,
        print_access_log: bool,
    ) -> Result<Self, Error>
    where
        R: Registry + Send + Sync + 'static,
    {
        let runtime = runtime::new(2, 2).map_err(Error::RuntimeError)?;

        let (addr_sender, addr_receiver) = oneshot::channel::<SocketAddr>();
        let (shutdown_sender, shutdown_receiver) = oneshot::channel::<()>();

        let server = MockServer::new(
            PactHandler::new(registry),
            MockServerConfig {
                static_port,
                print_access_log,
            },
        );

        let server_task = runtime.spawn(server.start_with_signals(Some(addr_sender), async move {
            shutdown_receiver.await.ok();
        }));

        let address = match addr_receiver.join() {
            Ok(address) => address,
            // The sender is dropped without sending only if the server failed before binding.
            Err(_) => {
                let err = match server_task.join() {
                    Ok(Err(err)) => err,
                    Ok(Ok(())) => Error::AddressNotPublished,
                    Err(err) => Error::TaskError(err),
                };
                runtime.shutdown_background();
                return Err(err);
            }
        };

        tracing::debug!("Mock endpoint started on {}", address);

        Ok(Self {
            address,
            runtime: Some(runtime),
            shutdown: Some(shutdown_sender),
        })
    }

    pub(crate) fn address(&self) -> &SocketAddr {
        &self.address
    }

    /// The handle of the runtime the endpoint (and the client talking to it) runs on.
    pub(crate) fn handle(&self) -> Option<Handle> {
        self.runtime.as_ref().map(|rt| rt.handle().clone())
    }
}

impl Drop for MockEndpoint {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            shutdown.send(()).ok();
        }

        if let Some(runtime) = self.runtime.take() {
            // Dropping a runtime blocks, which tokio forbids from within an async context.
            match Handle::try_current() {
                Ok(_) => runtime.shutdown_background(),
                Err(_) => runtime.shutdown_timeout(Duration::from_secs(1)),
            }
        }

        tracing::debug!("Mock endpoint on {} stopped", self.address);
    }
}
