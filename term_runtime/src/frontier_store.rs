//! Append-only checkpoint log: binary protobuf frames.
//!
//! Storage format: length-prefixed protobuf frames.
//!   [4-byte LE length][ProtoCheckpoint bytes][4-byte LE length]...
//!
//! Rules:
//!   - Strict append only, frames are never rewritten
//!   - fsync after every write
//!   - Rounds strictly increasing (validated on append)
//!   - Truncated or undecodable frames fail the whole load

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use log::debug;
use prost::Message;

use crate::proto_types::ProtoCheckpoint;

/// Largest frame written or accepted on load.
pub const MAX_FRAME_LEN: usize = 256 * 1024 * 1024;

/// Append-only checkpoint log backed by a binary file.
pub struct FrontierStore {
    path: PathBuf,
    last_round: Option<u64>,
    max_frame_len: usize,
}

impl FrontierStore {
    /// Open or create a checkpoint log at the given path.
    /// Reads existing frames to determine the last round.
    pub fn open(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let last_round = if path.exists() {
            Self::read_all_from_file(path, MAX_FRAME_LEN)?
                .last()
                .map(|c| c.round)
        } else {
            None
        };

        Ok(Self {
            path: path.to_path_buf(),
            last_round,
            max_frame_len: MAX_FRAME_LEN,
        })
    }

    /// Lower the frame limit for this handle. Appends above it are
    /// rejected before anything is written.
    pub fn with_max_frame_len(mut self, max_frame_len: usize) -> Self {
        self.max_frame_len = max_frame_len.min(MAX_FRAME_LEN);
        self
    }

    /// Append one checkpoint. Its round must exceed every stored round.
    pub fn append_checkpoint(&mut self, checkpoint: &ProtoCheckpoint) -> io::Result<()> {
        if let Some(last) = self.last_round {
            if checkpoint.round <= last {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!(
                        "Round violation in frontier store: last {}, got {}",
                        last, checkpoint.round
                    ),
                ));
            }
        }

        let buf = checkpoint.encode_to_vec();
        if buf.len() > self.max_frame_len {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "Checkpoint of {} bytes exceeds the {} byte frame limit",
                    buf.len(),
                    self.max_frame_len
                ),
            ));
        }
        let len = buf.len() as u32;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        {
            let mut writer = BufWriter::new(&mut file);
            writer.write_all(&len.to_le_bytes())?;
            writer.write_all(&buf)?;
            writer.flush()?;
        }
        file.sync_all()?;

        debug!(
            "checkpoint round {} ({} terms, {} bytes) appended to {}",
            checkpoint.round,
            checkpoint.terms.len(),
            buf.len(),
            self.path.display()
        );
        self.last_round = Some(checkpoint.round);
        Ok(())
    }

    /// Load all checkpoints in round order.
    pub fn load_all(&self) -> io::Result<Vec<ProtoCheckpoint>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        Self::read_all_from_file(&self.path, MAX_FRAME_LEN)
    }

    /// Load the most recent checkpoint, if any.
    pub fn load_latest(&self) -> io::Result<Option<ProtoCheckpoint>> {
        Ok(self.load_all()?.pop())
    }

    pub fn last_round(&self) -> Option<u64> {
        self.last_round
    }

    /// Read all frames from a file, validating frame integrity.
    fn read_all_from_file(path: &Path, max_frame_len: usize) -> io::Result<Vec<ProtoCheckpoint>> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let mut checkpoints = Vec::new();
        let mut len_buf = [0u8; 4];

        loop {
            match read_header(&mut reader, &mut len_buf)? {
                0 => break,
                4 => {}
                n => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("Truncated frame header: {} of 4 bytes", n),
                    ))
                }
            }

            let len = u32::from_le_bytes(len_buf) as usize;
            if len > max_frame_len {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("Invalid frame length: {}", len),
                ));
            }

            let mut frame = vec![0u8; len];
            reader.read_exact(&mut frame).map_err(|e| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("Truncated frame: {}", e),
                )
            })?;

            let checkpoint = ProtoCheckpoint::decode(frame.as_slice()).map_err(|e| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("Protobuf decode error: {}", e),
                )
            })?;

            checkpoints.push(checkpoint);
        }

        Ok(checkpoints)
    }
}

/// Fill `buf` from `reader`, stopping early only at end of file.
/// Returns the number of bytes read.
fn read_header<R: Read>(reader: &mut R, buf: &mut [u8; 4]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
