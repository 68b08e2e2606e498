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

//! Drives an external command (`rsync`, the `Map` tool) as a cooperative,
//! non-blocking child process: spawn, poll its stdout for whatever's
//! currently available without blocking, and report complete lines plus
//! end-of-output. Mirrors `Tile::_startCommand`/`_getRealLine`, trading
//! the original's byte-at-a-time `fread` loop for a chunked read since
//! Rust gives us a growable buffer instead of a fixed-size C string.

use std::io::Read;
use std::process::{Child, Command, Stdio};

use crate::error::Error;

#[cfg(unix)]
fn set_nonblocking(stdout: &std::process::ChildStdout) -> Result<(), Error> {
    use nix::fcntl::{fcntl, FcntlArg, OFlag};
    use std::os::unix::io::AsRawFd;

    let fd = stdout.as_raw_fd();
    let flags = fcntl(fd, FcntlArg::F_GETFL).map_err(|e| Error::Io(e.to_string()))?;
    let mut flags = OFlag::from_bits_truncate(flags);
    flags.insert(OFlag::O_NONBLOCK);
    fcntl(fd, FcntlArg::F_SETFL(flags)).map_err(|e| Error::Io(e.to_string()))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_nonblocking(_stdout: &std::process::ChildStdout) -> Result<(), Error> {
    Err(Error::Io("tile sync/mapping requires a unix host".to_string()))
}

/// An external command's stdout, drained a chunk at a time and split
/// into complete lines. `eof` is set once the pipe's write end closes
/// (the command exited or closed stdout), matching the original's
/// `_eof` flag; the exit status itself is not consulted, since a
/// completed `rsync`'s trailing line already signals what mattered.
pub struct ChildProcess {
    child: Child,
    partial: Vec<u8>,
    eof: bool,
}

impl ChildProcess {
    /// Spawns `cmd` through a shell, matching the original's use of
    /// `popen`, which runs its argument through `/bin/sh -c`.
    pub fn spawn(cmd: &str) -> Result<Self, Error> {
        Self::spawn_program("/bin/sh", &["-c", cmd], cmd)
    }

    fn spawn_program(program: &str, args: &[&str], cmd_for_error: &str) -> Result<Self, Error> {
        let child = Command::new(program)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::ChildSpawnFailed {
                cmd: cmd_for_error.to_string(),
                cause: e.to_string(),
            })?;

        if let Some(stdout) = child.stdout.as_ref() {
            set_nonblocking(stdout)?;
        }

        Ok(Self {
            child,
            partial: Vec::new(),
            eof: false,
        })
    }

    pub fn eof(&self) -> bool {
        self.eof
    }

    /// Drains whatever output is currently available, returning
    /// complete lines. Never blocks; returns an empty vec if nothing
    /// new has arrived since the last poll.
    pub fn poll_lines(&mut self) -> Vec<String> {
        if self.eof {
            return Vec::new();
        }
        let Some(stdout) = self.child.stdout.as_mut() else {
            self.eof = true;
            return Vec::new();
        };

        let mut lines = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            match stdout.read(&mut buf) {
                Ok(0) => {
                    self.eof = true;
                    if !self.partial.is_empty() {
                        if let Ok(line) = String::from_utf8(std::mem::take(&mut self.partial)) {
                            lines.push(line);
                        }
                    }
                    let _ = self.child.wait();
                    break;
                }
                Ok(n) => {
                    for &byte in &buf[..n] {
                        if byte == b'\n' {
                            if let Ok(line) = String::from_utf8(std::mem::take(&mut self.partial)) {
                                lines.push(line);
                            }
                        } else if byte != b'\r' {
                            self.partial.push(byte);
                        }
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => break,
                Err(_) => {
                    self.eof = true;
                    break;
                }
            }
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(unix)]
    fn spawned_echo_command_produces_its_output_line() {
        let mut process = ChildProcess::spawn("echo hello-tile-worker").unwrap();
        let mut all_lines = Vec::new();
        for _ in 0..200 {
            all_lines.extend(process.poll_lines());
            if process.eof() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert!(all_lines.iter().any(|l| l == "hello-tile-worker"));
        assert!(process.eof());
    }

    #[test]
    fn spawn_failure_surfaces_child_spawn_failed() {
        let result = ChildProcess::spawn_program("/definitely/not/a/real/program-xyz", &[], "bogus");
        assert!(matches!(result, Err(Error::ChildSpawnFailed { .. })));
    }
}
