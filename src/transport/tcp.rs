use std::io::ErrorKind;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::time::{timeout, Duration};

use crate::config::MAX_FRAME_SIZE;
use crate::protocol::Frame;
use crate::transport::Transport;

/// Frames over TCP: a big-endian `u32` length followed by the bincode body.
pub struct TcpTransport {
    stream: TcpStream,
    timeout_duration: Option<Duration>,
    max_frame_size: u32,
}

fn write_error(e: std::io::Error) -> anyhow::Error {
    match e.kind() {
        ErrorKind::BrokenPipe | ErrorKind::ConnectionReset => {
            anyhow::anyhow!("Connection closed by peer")
        }
        _ => anyhow::anyhow!("Write error: {}", e),
    }
}

fn read_error(e: std::io::Error) -> anyhow::Error {
    match e.kind() {
        ErrorKind::UnexpectedEof => anyhow::anyhow!("Connection closed by peer"),
        ErrorKind::ConnectionReset => anyhow::anyhow!("Connection reset by peer"),
        _ => anyhow::anyhow!("Read error: {}", e),
    }
}

impl TcpTransport {
    pub fn new(stream: TcpStream) -> Self {
        Self::with_config(stream, None, MAX_FRAME_SIZE)
    }

    pub fn with_config(
        stream: TcpStream,
        timeout_duration: Option<Duration>,
        max_frame_size: u32,
    ) -> Self {
        if let Err(e) = stream.set_nodelay(true) {
            log::debug!("could not disable Nagle: {}", e);
        }
        Self {
            stream,
            timeout_duration,
            max_frame_size,
        }
    }

    pub async fn connect<A: ToSocketAddrs>(addr: A) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self::new(stream))
    }
}

#[async_trait::async_trait]
impl Transport for TcpTransport {
    async fn send(&mut self, frame: Frame) -> anyhow::Result<()> {
        let data = bincode::serialize(&frame)
            .map_err(|e| anyhow::anyhow!("Serialization error: {}", e))?;
        if data.len() > self.max_frame_size as usize {
            return Err(anyhow::anyhow!(
                "Frame too large: {} bytes (max: {})",
                data.len(),
                self.max_frame_size
            ));
        }
        let len = (data.len() as u32).to_be_bytes();
        let limit = self.timeout_duration;
        let stream = &mut self.stream;
        let send_op = async move {
            stream.write_all(&len).await.map_err(write_error)?;
            stream.write_all(&data).await.map_err(write_error)?;
            anyhow::Ok(())
        };
        match limit {
            Some(limit) => timeout(limit, send_op)
                .await
                .map_err(|_| anyhow::anyhow!("Send timeout after {:?}", limit))?,
            None => send_op.await,
        }
    }

    async fn recv(&mut self) -> anyhow::Result<Frame> {
        let max = self.max_frame_size;
        let limit = self.timeout_duration;
        let stream = &mut self.stream;
        let recv_op = async move {
            let mut len_buf = [0u8; 4];
            stream.read_exact(&mut len_buf).await.map_err(read_error)?;
            let len = u32::from_be_bytes(len_buf);
            // Bounded before allocating.
            if len > max {
                return Err(anyhow::anyhow!("Frame too large: {} bytes (max: {})", len, max));
            }
            if len == 0 {
                return Err(anyhow::anyhow!("Invalid frame length: 0"));
            }
            let mut buf = vec![0u8; len as usize];
            stream.read_exact(&mut buf).await.map_err(read_error)?;
            let frame: Frame = bincode::deserialize(&buf)
                .map_err(|e| anyhow::anyhow!("Deserialization error: {}", e))?;
            anyhow::Ok(frame)
        };
        match limit {
            Some(limit) => timeout(limit, recv_op)
                .await
                .map_err(|_| anyhow::anyhow!("Receive timeout after {:?}", limit))?,
            None => recv_op.await,
        }
    }
}
