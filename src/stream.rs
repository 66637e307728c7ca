use std::io::{self, Read};
use std::net::TcpStream;
use std::time::Duration;

use byteorder::{ByteOrder, LittleEndian};
use bytes::{Bytes, BytesMut};
use log::trace;

use crate::error::{Error, Result};

// Frames at this length continue in the next frame
const MAX_FRAME_LEN: usize = 0xFF_FF_FF;

/// The transport half borrowed from the caller's connection: a readable
/// socket with a settable read timeout.
pub trait Socket: Read {
    /// Apply a read timeout to subsequent reads.
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()>;

    /// Close the transport. Called when the connection is presumed dead.
    fn shutdown(&mut self);
}

impl Socket for TcpStream {
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        TcpStream::set_read_timeout(self, timeout)
    }

    fn shutdown(&mut self) {
        let _ = TcpStream::shutdown(self, std::net::Shutdown::Both);
    }
}

/// Framed reader over the MySQL client/server transport.
///
/// Owns the borrowed socket for the duration of the row phase and tracks
/// the expected sequence number across packets. Any transport failure
/// force-closes the socket; the stream is unusable afterwards.
pub struct MySqlStream<S: Socket> {
    socket: Option<S>,

    read_timeout: Option<Duration>,

    // Packets in a command sequence have an incrementing sequence number
    next_seq_id: u8,
}

impl<S: Socket> MySqlStream<S> {
    pub fn new(socket: S, read_timeout: Option<Duration>, next_seq_id: u8) -> Self {
        Self {
            socket: Some(socket),
            read_timeout,
            next_seq_id,
        }
    }

    /// The sequence number expected on the next frame.
    pub fn next_seq_id(&self) -> u8 {
        self.next_seq_id
    }

    /// Reset the expected sequence number, as at the start of a command.
    pub fn set_next_seq_id(&mut self, seq_id: u8) {
        self.next_seq_id = seq_id;
    }

    pub fn is_closed(&self) -> bool {
        self.socket.is_none()
    }

    /// Close the socket and detach it from the stream.
    pub(crate) fn force_close(&mut self) {
        if let Some(mut socket) = self.socket.take() {
            socket.shutdown();
        }
    }

    /// Read exactly `buf.len()` bytes, retrying transient interruption.
    /// Failure of any kind closes the connection for good.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let socket = match self.socket.as_mut() {
            Some(socket) => socket,
            None => return Err(Error::lost_connection()),
        };

        if read_exact_inner(socket, self.read_timeout, buf).is_err() {
            self.force_close();
            return Err(Error::lost_connection());
        }

        Ok(())
    }

    /// Read the next logical packet, joining continuation frames.
    ///
    /// Verifies the sequence number of every frame; a frame of exactly
    /// 2²⁴-1 bytes announces that the packet continues in the next frame.
    pub fn read_packet(&mut self) -> Result<Bytes> {
        let mut packet = BytesMut::new();

        loop {
            // 3-byte little-endian length plus the sequence number
            let mut header = [0_u8; 4];
            self.read_exact(&mut header)?;

            let len = LittleEndian::read_u24(&header) as usize;
            let seq = header[3];

            if seq != self.next_seq_id {
                self.force_close();

                // a zero sequence out of place means the server started
                // over, which it only does when the connection died
                return Err(if seq == 0 {
                    Error::lost_connection()
                } else {
                    Error::packet_sequence_wrong()
                });
            }

            self.next_seq_id = self.next_seq_id.wrapping_add(1);

            let offset = packet.len();
            packet.resize(offset + len, 0);
            self.read_exact(&mut packet[offset..])?;

            trace!("read frame len={} seq={}", len, seq);

            if len < MAX_FRAME_LEN {
                return Ok(packet.freeze());
            }
        }
    }
}

fn read_exact_inner<S: Socket>(
    socket: &mut S,
    timeout: Option<Duration>,
    buf: &mut [u8],
) -> io::Result<()> {
    // the timeout is re-applied before every read; the caller may share
    // the value with other phases that configure it differently
    if let Some(timeout) = timeout {
        socket.set_read_timeout(Some(timeout))?;
    }

    let mut filled = 0;
    while filled < buf.len() {
        match socket.read(&mut buf[filled..]) {
            // a short read means the server went away mid-packet
            Ok(0) => return Err(io::ErrorKind::UnexpectedEof.into()),

            Ok(n) => filled += n,

            // transient interruption; retry the read
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}

            Err(err) => return Err(err),
        }
    }

    Ok(())
}
