use crate::bip::bvlc::{BvlcFunction, BvlcHeader, BVLC_HEADER_LEN};
use crate::{DataLink, DataLinkAddress, DataLinkError};
use bacdweet_core::encoding::{reader::Reader, writer::Writer};
use log::debug;
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::time::{timeout, Duration, Instant};

const MAX_BIP_FRAME_LEN: usize = 1600;
const BBMD_REPLY_TIMEOUT: Duration = Duration::from_secs(2);

/// BACnet/IP over UDP, optionally registered as a foreign device with a
/// BBMD so replies from other subnets are routed back.
#[derive(Debug, Clone)]
pub struct BacnetIpTransport {
    socket: Arc<UdpSocket>,
    bbmd: Option<SocketAddr>,
}

impl BacnetIpTransport {
    pub async fn bind(bind_addr: SocketAddr) -> Result<Self, DataLinkError> {
        let socket = UdpSocket::bind(bind_addr).await?;
        socket.set_broadcast(true)?;
        Ok(Self {
            socket: Arc::new(socket),
            bbmd: None,
        })
    }

    pub async fn bind_foreign(
        bind_addr: SocketAddr,
        bbmd_addr: SocketAddr,
    ) -> Result<Self, DataLinkError> {
        let mut transport = Self::bind(bind_addr).await?;
        transport.bbmd = Some(bbmd_addr);
        Ok(transport)
    }

    pub fn local_addr(&self) -> Result<SocketAddr, DataLinkError> {
        self.socket.local_addr().map_err(DataLinkError::Io)
    }

    async fn send_frame(
        &self,
        function: BvlcFunction,
        payload: &[u8],
        target: SocketAddr,
    ) -> Result<(), DataLinkError> {
        let total_len = BVLC_HEADER_LEN
            .checked_add(payload.len())
            .filter(|len| *len <= MAX_BIP_FRAME_LEN)
            .ok_or(DataLinkError::FrameTooLarge)?;

        let mut frame = [0u8; MAX_BIP_FRAME_LEN];
        let mut w = Writer::new(&mut frame);
        BvlcHeader {
            function,
            length: total_len as u16,
        }
        .encode(&mut w)
        .map_err(|_| DataLinkError::InvalidFrame)?;
        w.write_all(payload)
            .map_err(|_| DataLinkError::FrameTooLarge)?;

        self.socket.send_to(w.as_written(), target).await?;
        Ok(())
    }

    /// Sends Register-Foreign-Device without waiting for the BBMD's
    /// BVLC-Result. Used for renewals once a receive loop owns the socket.
    pub async fn register_foreign_device_no_wait(
        &self,
        ttl_seconds: u16,
    ) -> Result<(), DataLinkError> {
        let bbmd = self.bbmd.ok_or(DataLinkError::BbmdNotConfigured)?;
        debug!("registering with bbmd {bbmd}, ttl {ttl_seconds}s");
        self.send_frame(
            BvlcFunction::RegisterForeignDevice,
            &ttl_seconds.to_be_bytes(),
            bbmd,
        )
        .await
    }

    /// Registers and waits for the BBMD to accept. Must not race another
    /// reader of this socket.
    pub async fn register_foreign_device(&self, ttl_seconds: u16) -> Result<(), DataLinkError> {
        self.register_foreign_device_no_wait(ttl_seconds).await?;
        let code = self.recv_bvlc_result(BBMD_REPLY_TIMEOUT).await?;
        if code == 0 {
            Ok(())
        } else {
            Err(DataLinkError::BvlcResult(code))
        }
    }

    async fn recv_bvlc_result(&self, timeout_duration: Duration) -> Result<u16, DataLinkError> {
        let bbmd = self.bbmd.ok_or(DataLinkError::BbmdNotConfigured)?;
        let deadline = Instant::now() + timeout_duration;
        let mut rx = [0u8; MAX_BIP_FRAME_LEN];
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let (n, src) = timeout(remaining, self.socket.recv_from(&mut rx))
                .await
                .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "bbmd response timeout"))??;
            if src != bbmd {
                continue;
            }

            let mut r = Reader::new(&rx[..n]);
            let hdr = BvlcHeader::decode(&mut r).map_err(|_| DataLinkError::InvalidFrame)?;
            if hdr.function == BvlcFunction::Result {
                return result_code(&mut r);
            }
        }
    }
}

fn result_code(r: &mut Reader<'_>) -> Result<u16, DataLinkError> {
    r.read_be_u16().map_err(|_| DataLinkError::InvalidFrame)
}

fn copy_out(payload: &[u8], buf: &mut [u8]) -> Result<usize, DataLinkError> {
    let out = buf
        .get_mut(..payload.len())
        .ok_or(DataLinkError::FrameTooLarge)?;
    out.copy_from_slice(payload);
    Ok(payload.len())
}

impl DataLink for BacnetIpTransport {
    async fn send(&self, address: DataLinkAddress, payload: &[u8]) -> Result<(), DataLinkError> {
        self.send_frame(
            BvlcFunction::OriginalUnicastNpdu,
            payload,
            address.as_socket_addr(),
        )
        .await
    }

    async fn recv(&self, buf: &mut [u8]) -> Result<(usize, DataLinkAddress), DataLinkError> {
        let mut frame = [0u8; MAX_BIP_FRAME_LEN];
        let (n, src) = self.socket.recv_from(&mut frame).await?;
        let mut r = Reader::new(&frame[..n]);
        let hdr = BvlcHeader::decode(&mut r).map_err(|_| DataLinkError::InvalidFrame)?;
        let body = r
            .read_exact(hdr.payload_len())
            .map_err(|_| DataLinkError::InvalidFrame)?;

        match hdr.function {
            BvlcFunction::OriginalUnicastNpdu
            | BvlcFunction::OriginalBroadcastNpdu
            | BvlcFunction::DistributeBroadcastToNetwork => {
                Ok((copy_out(body, buf)?, DataLinkAddress::Ip(src)))
            }
            // relayed by a BBMD: the original sender precedes the NPDU
            BvlcFunction::ForwardedNpdu => {
                if body.len() < 6 {
                    return Err(DataLinkError::InvalidFrame);
                }
                let origin_ip = Ipv4Addr::new(body[0], body[1], body[2], body[3]);
                let origin_port = u16::from_be_bytes([body[4], body[5]]);
                Ok((
                    copy_out(&body[6..], buf)?,
                    DataLinkAddress::Ip(SocketAddr::new(IpAddr::V4(origin_ip), origin_port)),
                ))
            }
            BvlcFunction::Result => {
                let mut r = Reader::new(body);
                Err(DataLinkError::BvlcResult(result_code(&mut r)?))
            }
            BvlcFunction::Unknown(v) => Err(DataLinkError::UnsupportedBvlcFunction(v)),
            BvlcFunction::RegisterForeignDevice => Err(DataLinkError::InvalidFrame),
        }
    }
}
