// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 Atlas Core Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The live transport a [`super::FlightTrack`] reads sentence lines
//! from: either a UDP socket (FlightGear's own output, one sentence per
//! datagram) or a serial device (a real GPS, line-buffered). Both
//! sources are polled cooperatively via `check_for_input`, never
//! blocked on, matching spec.md §5's single-threaded no-locks model.

use std::collections::VecDeque;
use std::io::Read;
use std::net::UdpSocket;
use std::time::Duration;

use log::warn;

use crate::error::Error;

/// The non-blocking byte source behind a live flight track.
pub enum Channel {
    Udp(UdpSocket),
    Serial(Box<dyn serialport::SerialPort>),
}

impl Channel {
    pub fn open_udp(port: u16) -> Result<Self, Error> {
        let socket = UdpSocket::bind(("0.0.0.0", port)).map_err(|e| Error::Io(format!("udp port {port}: {e}")))?;
        socket
            .set_nonblocking(true)
            .map_err(|e| Error::Io(format!("udp port {port}: {e}")))?;
        Ok(Channel::Udp(socket))
    }

    pub fn open_serial(device: &str, baud: u32) -> Result<Self, Error> {
        let port = serialport::new(device, baud)
            .timeout(Duration::from_millis(10))
            .open()
            .map_err(|e| Error::Io(format!("{device}: {e}")))?;
        Ok(Channel::Serial(port))
    }

    /// Reads whatever bytes are currently available without blocking,
    /// converting both flavours of "nothing to read right now" (a UDP
    /// `WouldBlock` and a serial `TimedOut`) into `Ok(0)`.
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        let result = match self {
            Channel::Udp(socket) => socket.recv(buf),
            Channel::Serial(port) => port.read(buf),
        };
        match result {
            Ok(n) => Ok(n),
            Err(e) if matches!(e.kind(), std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut) => Ok(0),
            Err(e) => Err(Error::Io(e.to_string())),
        }
    }
}

/// Accumulates bytes from a [`Channel`] into complete, non-blank lines,
/// mirroring `Tile::_getRealLine`'s one-byte-at-a-time accumulation but
/// over a socket/serial source rather than a child process pipe.
pub struct LineReader {
    channel: Channel,
    partial: Vec<u8>,
    lines: VecDeque<String>,
}

impl LineReader {
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            partial: Vec::new(),
            lines: VecDeque::new(),
        }
    }

    /// Drains whatever is currently available on the channel into
    /// complete lines, buffering any trailing partial line for next
    /// time. Called once per cooperative tick; never blocks.
    pub fn poll(&mut self) -> Result<(), Error> {
        let mut buf = [0u8; 4096];
        loop {
            let n = self.channel.read_available(&mut buf)?;
            if n == 0 {
                break;
            }
            for &byte in &buf[..n] {
                if byte == b'\n' || byte == b'\r' {
                    if !self.partial.is_empty() {
                        match String::from_utf8(std::mem::take(&mut self.partial)) {
                            Ok(line) => self.lines.push_back(line),
                            Err(e) => warn!("flight track: dropped non-utf8 line: {e}"),
                        }
                    }
                } else {
                    self.partial.push(byte);
                }
            }
        }
        Ok(())
    }

    /// Pops the next three buffered lines as a sentence triple, or
    /// `None` if fewer than three full lines are currently buffered.
    /// Matches `_readFlightFile`'s "read 3 lines at a time" framing.
    pub fn pop_triple(&mut self) -> Option<[String; 3]> {
        if self.lines.len() < 3 {
            return None;
        }
        Some([
            self.lines.pop_front().unwrap(),
            self.lines.pop_front().unwrap(),
            self.lines.pop_front().unwrap(),
        ])
    }
}
