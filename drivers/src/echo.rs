//! TCP echo driver
//!
//! Speaks a length-prefixed echo protocol: each call writes a `u32`
//! big-endian length followed by the payload and expects the same frame
//! back. One TCP stream is opened per connection; calls on the same
//! connection are serialized on an async mutex because a raw stream cannot
//! interleave frames. Point it at any echo server to exercise the engine
//! against real sockets.

use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use loadgen_core::{
    CallRequest, CallResponse, CallResult, ConnectOptions, Connection, Driver, DriverConfig,
    DriverError, RequestId,
};

/// Payload bytes carried per call; the request id occupies the first eight
const PAYLOAD_SIZE: usize = 64;

/// Largest frame a peer may echo back
const MAX_FRAME_SIZE: usize = 1024 * 1024;

/// Driver that echoes frames off a TCP server
pub struct TcpEchoDriver {
    host: String,
    port: u16,
    calls: AtomicU64,
}

struct EchoConnection {
    stream: Mutex<TcpStream>,
    peer: std::net::SocketAddr,
}

impl Connection for EchoConnection {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl TcpEchoDriver {
    /// Create a driver targeting `host:port`
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            calls: AtomicU64::new(0),
        }
    }

    /// Create a driver from registry selection options
    pub fn from_config(config: &DriverConfig) -> Self {
        Self::new(config.host.clone(), config.port)
    }
}

#[async_trait]
impl Driver for TcpEchoDriver {
    fn name(&self) -> &str {
        "tcp-echo"
    }

    async fn create_connection(
        &self,
        options: &ConnectOptions,
    ) -> Result<Arc<dyn Connection>, DriverError> {
        let addr = format!("{}:{}", self.host, self.port);

        let stream = tokio::time::timeout(options.timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| DriverError::ConnectTimeout(options.timeout))?
            .map_err(|e| DriverError::Connect(format!("{addr}: {e}")))?;
        stream.set_nodelay(true)?;

        let peer = stream.peer_addr()?;
        tracing::debug!(%peer, "echo connection established");

        Ok(Arc::new(EchoConnection {
            stream: Mutex::new(stream),
            peer,
        }))
    }

    fn build_request(&self) -> Result<CallRequest, DriverError> {
        let id = self.calls.fetch_add(1, Ordering::SeqCst);

        let mut payload = vec![0u8; PAYLOAD_SIZE];
        payload[..8].copy_from_slice(&id.to_be_bytes());

        Ok(CallRequest::new(id, payload))
    }

    async fn call(
        &self,
        connection: &dyn Connection,
        request: CallRequest,
    ) -> Result<CallResponse, DriverError> {
        let connection = connection
            .as_any()
            .downcast_ref::<EchoConnection>()
            .ok_or_else(|| {
                DriverError::Call("connection does not belong to the tcp-echo driver".into())
            })?;

        let mut stream = connection.stream.lock().await;

        let len = request.payload.len() as u32;
        stream.write_all(&len.to_be_bytes()).await?;
        stream.write_all(&request.payload).await?;
        stream.flush().await?;

        let mut len_buf = [0u8; 4];
        stream.read_exact(&mut len_buf).await?;
        let reply_len = u32::from_be_bytes(len_buf) as usize;
        if reply_len > MAX_FRAME_SIZE {
            return Err(DriverError::Call(format!(
                "peer {} announced oversized frame of {reply_len} bytes",
                connection.peer
            )));
        }

        let mut payload = vec![0u8; reply_len];
        stream.read_exact(&mut payload).await?;

        Ok(CallResponse {
            request_id: request.id,
            payload,
        })
    }

    fn build_result(
        &self,
        request_id: RequestId,
        outcome: Result<CallResponse, DriverError>,
        elapsed: Duration,
    ) -> CallResult {
        CallResult::from_outcome(request_id, outcome, elapsed)
    }

    fn total_calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for TcpEchoDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpEchoDriver")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("total_calls", &self.total_calls())
            .finish()
    }
}
