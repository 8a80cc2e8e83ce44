use std::{future::Future, io};

use tokio::net::UdpSocket;

/// A connected datagram transport. Every `recv` yields exactly one datagram,
/// anything past the end of `buf` is discarded.
pub trait DatagramChannel {
    fn send(&mut self, buf: &[u8]) -> impl Future<Output = io::Result<usize>> + Send;

    fn recv(&mut self, buf: &mut [u8]) -> impl Future<Output = io::Result<usize>> + Send;
}

impl DatagramChannel for UdpSocket {
    async fn send(&mut self, buf: &[u8]) -> io::Result<usize> {
        UdpSocket::send(self, buf).await
    }

    async fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        UdpSocket::recv(self, buf).await
    }
}
