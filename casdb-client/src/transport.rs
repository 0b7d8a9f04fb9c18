//! Socket ownership and framed send/receive.

use crate::error::ClientError;
use bytes::Bytes;
use casdb_protocol::{Frame, FrameReader};
use std::io;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Read buffer size for socket reads (8 KiB).
const READ_BUFFER_SIZE: usize = 8 * 1024;

/// Exclusively-owned connection to one broker port.
///
/// Holds the frame reader so partially received frames survive across
/// reads. At most one request is in flight per transport.
#[derive(Debug)]
pub(crate) struct Transport {
    stream: TcpStream,
    reader: FrameReader,
}

impl Transport {
    pub async fn connect(
        host: &str,
        port: u16,
        timeout: Option<Duration>,
    ) -> Result<Self, ClientError> {
        let connect = TcpStream::connect((host, port));
        let stream = match timeout {
            Some(limit) => tokio::time::timeout(limit, connect)
                .await
                .map_err(|_| ClientError::Timeout)??,
            None => connect.await?,
        };
        stream.set_nodelay(true).ok();
        tracing::debug!("connected to {}:{}", host, port);
        Ok(Self {
            stream,
            reader: FrameReader::new(),
        })
    }

    pub async fn send(&mut self, request: Bytes) -> Result<(), ClientError> {
        self.stream.write_all(&request).await?;
        tracing::debug!("request sent ({} bytes)", request.len());
        Ok(())
    }

    /// Reads until a complete response frame is assembled.
    ///
    /// `min_body` is the fixed minimum success-body size of the packet the
    /// response answers.
    pub async fn recv(&mut self, min_body: usize) -> Result<Frame, ClientError> {
        let mut buf = vec![0u8; READ_BUFFER_SIZE];
        loop {
            if let Some(frame) = self.reader.take_frame(min_body)? {
                tracing::debug!("response frame assembled ({} bytes)", frame.body.len());
                return Ok(frame);
            }
            let n = self.stream.read(&mut buf).await?;
            if n == 0 {
                return Err(ClientError::Transport(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed by broker",
                )));
            }
            self.reader.extend(&buf[..n]);
        }
    }

    pub async fn round_trip(
        &mut self,
        request: Bytes,
        min_body: usize,
    ) -> Result<Frame, ClientError> {
        self.send(request).await?;
        self.recv(min_body).await
    }

    pub async fn shutdown(&mut self) {
        let _ = self.stream.shutdown().await;
    }
}
