//! Async transport for the ping and query protocols.
//!
//! A [`Connection`] owns an already-connected channel and the [`Endpoint`] it
//! talks to. Ping runs over any byte stream, query over any
//! [`DatagramChannel`].

use std::{
    io,
    net::{Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4},
    time::Duration,
};

use log::{debug, trace};
use protocol::{
    hex,
    info::PingStatus,
    ping::{build_ping_request, parse_ping_response},
    query::{
        build_session_challenge, build_session_full_stat, is_reply_to, next_session_id,
        parse_challenge_response, parse_full_stat_response, ChallengeToken, QueryStatus,
        CHALLENGE_HEADER_LENGTH, PACKET_TYPE_CHALLENGE, PACKET_TYPE_STAT, STAT_HEADER_LENGTH,
        STAT_MIN_PAYLOAD,
    },
    DecodingError, EncodingError,
};
use thiserror::Error;
use tokio::{
    io::{AsyncRead, AsyncWrite, AsyncWriteExt},
    net::{lookup_host, TcpStream, UdpSocket},
};

use crate::{
    channel::DatagramChannel,
    deadline::{
        read_stream_with_deadline, recv_reply_with_deadline, with_deadline, Completion,
        DatagramLimits, StreamLimits, MAX_DATAGRAM_SIZE, MAX_STREAM_SIZE,
    },
};

pub mod channel;
pub mod deadline;

/// Challenge responses are a short header and a decimal token.
const CHALLENGE_BUFFER_SIZE: usize = 64;

#[derive(Debug, Error)]
pub enum Error {
    #[error("not connected")]
    NotConnected,

    #[error("failed to encode request")]
    Encode(#[from] EncodingError),

    #[error("failed to write to channel")]
    Write(#[source] io::Error),

    #[error("failed to read from channel")]
    Read(#[source] io::Error),

    #[error("no response within {0:?}")]
    Timeout(Duration),

    #[error("no challenge response within {0:?}")]
    ChallengeTimeout(Duration),

    #[error("failed to decode response")]
    Decode(#[from] DecodingError),

    #[error("server did not hand out a challenge token")]
    NoChallengeObtained,

    #[error("failed to connect")]
    Connect(#[source] io::Error),

    #[error("invalid address '{0}'")]
    InvalidAddress(String),
}

impl Error {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout(_) | Error::ChallengeTimeout(_))
    }

    pub fn is_truncated(&self) -> bool {
        matches!(
            self,
            Error::Decode(DecodingError::TruncatedResponse { .. })
        )
    }

    pub fn is_empty_response(&self) -> bool {
        matches!(self, Error::Decode(DecodingError::EmptyResponse))
    }

    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Error::Decode(
                DecodingError::MalformedPayload(_)
                    | DecodingError::ChallengeDecode { .. }
                    | DecodingError::InvalidPacketId(_)
                    | DecodingError::VarIntTooLarge
            )
        )
    }
}

/// Where a request goes and how long to wait for the answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub address: String,
    pub port: u16,
    pub timeout: Duration,
}

impl Endpoint {
    pub fn new<A: Into<String>>(address: A, port: u16, timeout: Duration) -> Endpoint {
        Endpoint {
            address: address.into(),
            port,
            timeout,
        }
    }

    /// Accepts only a literal, non-zero IPv4 address. Host names are not looked
    /// up here.
    pub fn resolve(&self) -> Result<SocketAddrV4, Error> {
        match self.address.parse::<Ipv4Addr>() {
            Ok(ip) if !ip.is_unspecified() => Ok(SocketAddrV4::new(ip, self.port)),
            _ => Err(Error::InvalidAddress(self.address.clone())),
        }
    }

    async fn lookup(&self) -> Result<SocketAddr, Error> {
        lookup_host((self.address.as_str(), self.port))
            .await
            .map_err(Error::Connect)?
            .next()
            .ok_or_else(|| Error::InvalidAddress(self.address.clone()))
    }
}

pub struct Connection<C> {
    endpoint: Endpoint,
    channel: Option<C>,
    /// Query session of the last challenge, zero before the first one.
    session: u32,
}

impl<C> Connection<C> {
    pub fn new(endpoint: Endpoint, channel: C) -> Connection<C> {
        Connection {
            endpoint,
            channel: Some(channel),
            session: 0,
        }
    }

    /// A connection without a channel. Every request fails with
    /// [`Error::NotConnected`].
    pub fn detached(endpoint: Endpoint) -> Connection<C> {
        Connection {
            endpoint,
            channel: None,
            session: 0,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn is_connected(&self) -> bool {
        self.channel.is_some()
    }

    /// Drops the channel, closing it.
    pub fn disconnect(&mut self) {
        if self.channel.take().is_some() {
            debug!(
                "disconnected from {}:{}",
                self.endpoint.address, self.endpoint.port
            );
        }
    }
}

impl Connection<TcpStream> {
    pub async fn connect_tcp(endpoint: Endpoint) -> Result<Connection<TcpStream>, Error> {
        let stream = with_deadline(endpoint.timeout, async {
            let address = endpoint.lookup().await?;
            let stream = TcpStream::connect(address).await.map_err(Error::Connect)?;
            Ok::<_, Error>(stream)
        })
        .await?;

        debug!("connected to {}:{} over tcp", endpoint.address, endpoint.port);
        Ok(Connection::new(endpoint, stream))
    }
}

impl Connection<UdpSocket> {
    pub async fn connect_udp(endpoint: Endpoint) -> Result<Connection<UdpSocket>, Error> {
        let socket = with_deadline(endpoint.timeout, async {
            let address = endpoint.lookup().await?;
            let local: SocketAddr = if address.is_ipv4() {
                (Ipv4Addr::UNSPECIFIED, 0).into()
            } else {
                (Ipv6Addr::UNSPECIFIED, 0).into()
            };

            let socket = UdpSocket::bind(local).await.map_err(Error::Connect)?;
            socket.connect(address).await.map_err(Error::Connect)?;
            Ok::<_, Error>(socket)
        })
        .await?;

        debug!("connected to {}:{} over udp", endpoint.address, endpoint.port);
        Ok(Connection::new(endpoint, socket))
    }
}

impl<C> Connection<C>
where
    C: AsyncRead + AsyncWrite + Unpin,
{
    /// Sends the handshake and status request, then reads one status frame.
    pub async fn ping(&mut self) -> Result<PingStatus, Error> {
        let Connection {
            endpoint, channel, ..
        } = self;
        let channel = channel.as_mut().ok_or(Error::NotConnected)?;

        let request = build_ping_request(&endpoint.address, endpoint.port)?;
        channel.write_all(&request).await.map_err(Error::Write)?;
        channel.flush().await.map_err(Error::Write)?;
        trace!("sent ping request: {}", hex(&request));

        let limits = StreamLimits {
            max_bytes: MAX_STREAM_SIZE,
            completion: Completion::Frame,
        };
        let raw = read_stream_with_deadline(channel, limits, endpoint.timeout).await?;

        Ok(parse_ping_response(&raw)?)
    }
}

impl<C> Connection<C>
where
    C: DatagramChannel,
{
    /// Obtains a challenge token and exchanges it for the full stat.
    pub async fn query(&mut self) -> Result<QueryStatus, Error> {
        let token = match self.challenge().await {
            Err(Error::Timeout(deadline)) => return Err(Error::ChallengeTimeout(deadline)),
            result => result?,
        };

        if !token.is_valid() {
            return Err(Error::NoChallengeObtained);
        }

        self.full_stat(token).await
    }

    /// Opens a new query session and asks for its challenge token. Replies to
    /// earlier sessions that arrive late are dropped.
    pub async fn challenge(&mut self) -> Result<ChallengeToken, Error> {
        let Connection {
            endpoint,
            channel,
            session,
        } = self;
        let channel = channel.as_mut().ok_or(Error::NotConnected)?;

        *session = next_session_id(*session);
        let session = *session;
        send_datagram(channel, &build_session_challenge(session)).await?;

        let limits = DatagramLimits {
            min_bytes: CHALLENGE_HEADER_LENGTH,
            max_bytes: CHALLENGE_BUFFER_SIZE,
        };
        let raw = recv_reply_with_deadline(channel, limits, endpoint.timeout, |raw| {
            is_reply_to(raw, PACKET_TYPE_CHALLENGE, session)
        })
        .await?;
        let token = parse_challenge_response(&raw)?;

        debug!("obtained challenge token {token} for session {session:#x}");
        Ok(token)
    }

    /// Requests the full stat within the session of the last challenge.
    pub async fn full_stat(&mut self, token: ChallengeToken) -> Result<QueryStatus, Error> {
        let Connection {
            endpoint,
            channel,
            session,
        } = self;
        let channel = channel.as_mut().ok_or(Error::NotConnected)?;
        let session = *session;

        send_datagram(channel, &build_session_full_stat(session, token)?).await?;

        let limits = DatagramLimits {
            min_bytes: STAT_HEADER_LENGTH + STAT_MIN_PAYLOAD,
            max_bytes: MAX_DATAGRAM_SIZE,
        };
        let raw = recv_reply_with_deadline(channel, limits, endpoint.timeout, |raw| {
            is_reply_to(raw, PACKET_TYPE_STAT, session)
        })
        .await?;

        Ok(parse_full_stat_response(&raw)?)
    }
}

async fn send_datagram<C: DatagramChannel>(channel: &mut C, packet: &[u8]) -> Result<(), Error> {
    channel.send(packet).await.map_err(Error::Write)?;
    trace!("sent datagram: {}", hex(packet));
    Ok(())
}
