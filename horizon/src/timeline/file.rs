//! Binary persistence of rotation timelines.
//!
//! Layout, little-endian: a `u64` record count followed by that many records
//! of five `f64` values: `previous_time, time, yaw, pitch, roll`.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;

use bytemuck::{Pod, Zeroable};

use crate::error::{Error, Result};
use crate::transform::Rotation;

use super::{RotationSample, RotationTimeline};

/// Bytes per stored sample.
pub const SAMPLE_RECORD_SIZE: usize = std::mem::size_of::<SampleRecord>();

const IO_BUFFER_SIZE: usize = 128 * 1024;

/// Turns a `file:///` URL into a filesystem path. Other names pass through.
///
/// `file:///C:/clips/a.bin` keeps its drive letter (`C:/clips/a.bin`), while
/// `file:///home/a.bin` becomes `/home/a.bin`.
pub fn parse_file_name(name: &str) -> PathBuf {
    const SCHEME: &str = "file:///";
    if name.len() > SCHEME.len() && name.starts_with(SCHEME) {
        if name.len() > 10 && name.as_bytes()[9] == b':' {
            PathBuf::from(&name[8..])
        } else {
            PathBuf::from(&name[7..])
        }
    } else {
        PathBuf::from(name)
    }
}

impl RotationTimeline {
    /// Loads a timeline from `file_name`. A missing or unreadable file gives
    /// an empty timeline.
    pub fn load(file_name: &str) -> Self {
        let mut timeline = Self::new();
        timeline.read(file_name);
        timeline
    }

    /// Adds every sample stored in `file_name`, marked as not updated.
    ///
    /// Returns the number of samples read. Failing to open the file reads
    /// nothing; a truncated file reads up to the last complete record.
    pub fn read(&mut self, file_name: &str) -> usize {
        let path = parse_file_name(file_name);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) => {
                tracing::debug!("No timeline loaded from {:?}: {}", path, e);
                return 0;
            }
        };

        let read = self.read_from(BufReader::with_capacity(IO_BUFFER_SIZE, file));
        tracing::debug!("Read {} rotation samples from {:?}", read, path);
        read
    }

    /// Writes all samples to `file_name`, replacing its contents.
    pub fn write(&self, file_name: &str) -> Result<()> {
        let path = parse_file_name(file_name);
        let file = File::create(&path).map_err(|e| Error::CreateFile {
            path: path.clone(),
            source: e,
        })?;

        let mut writer = BufWriter::with_capacity(IO_BUFFER_SIZE, file);
        self.write_to(&mut writer)
            .and_then(|_| writer.flush())
            .map_err(|e| Error::WriteFile {
                path: path.clone(),
                source: e,
            })?;

        tracing::debug!("Wrote {} rotation samples to {:?}", self.len(), path);
        Ok(())
    }

    pub(crate) fn read_from<R: Read>(&mut self, mut reader: R) -> usize {
        let mut count = 0u64;
        if reader.read_exact(bytemuck::bytes_of_mut(&mut count)).is_err() {
            return 0;
        }
        let count = u64::from_le(count);

        let mut record = SampleRecord::zeroed();
        let mut read = 0usize;
        for _ in 0..count {
            if reader.read_exact(bytemuck::bytes_of_mut(&mut record)).is_err() {
                tracing::warn!(
                    expected = count,
                    read,
                    "Timeline file truncated, keeping the complete records"
                );
                break;
            }
            self.add(record.swap_le().into_sample());
            read += 1;
        }
        read
    }

    pub(crate) fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let records: Vec<SampleRecord> = self
            .iter()
            .map(|s| SampleRecord::from_sample(s).swap_le())
            .collect();
        writer.write_all(bytemuck::bytes_of(&(records.len() as u64).to_le()))?;
        writer.write_all(bytemuck::cast_slice(&records))
    }
}

/// On-disk layout of one sample.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
struct SampleRecord {
    previous_time: f64,
    time: f64,
    yaw: f64,
    pitch: f64,
    roll: f64,
}

impl SampleRecord {
    fn from_sample(s: &RotationSample) -> Self {
        Self {
            previous_time: s.previous_time,
            time: s.time,
            yaw: s.yaw,
            pitch: s.pitch,
            roll: s.roll,
        }
    }

    fn into_sample(self) -> RotationSample {
        let rotation = Rotation::new(self.yaw, self.pitch, self.roll);
        RotationSample::new(self.previous_time, self.time, rotation, false)
    }

    /// Converts between native and little-endian field order. A no-op on
    /// little-endian targets.
    #[inline]
    fn swap_le(self) -> Self {
        if cfg!(target_endian = "little") {
            return self;
        }
        let swap = |v: f64| f64::from_bits(v.to_bits().swap_bytes());
        Self {
            previous_time: swap(self.previous_time),
            time: swap(self.time),
            yaw: swap(self.yaw),
            pitch: swap(self.pitch),
            roll: swap(self.roll),
        }
    }
}
