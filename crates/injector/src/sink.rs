//! Build flag sinks
//!
//! The build system that consumes the flags is abstracted behind
//! [`BuildFlagSink`]. The CLI writes to stdout or a file, and tests collect
//! into a `Vec`.

use crate::config::FlagFormat;
use crate::flags::{render_flags, BuildFlag};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error types for emitting build flags
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to serialize flags: {0}")]
    Json(#[from] serde_json::Error),
}

/// Receiver for derived build flags
pub trait BuildFlagSink {
    fn append_build_flags(&mut self, flags: &[BuildFlag]) -> Result<(), SinkError>;
}

impl BuildFlagSink for Vec<BuildFlag> {
    fn append_build_flags(&mut self, flags: &[BuildFlag]) -> Result<(), SinkError> {
        self.extend_from_slice(flags);
        Ok(())
    }
}

/// Writes rendered flags to any writer, typically stdout
pub struct WriterSink<W: Write> {
    writer: W,
    format: FlagFormat,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W, format: FlagFormat) -> Self {
        Self { writer, format }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> BuildFlagSink for WriterSink<W> {
    fn append_build_flags(&mut self, flags: &[BuildFlag]) -> Result<(), SinkError> {
        let rendered = render_flags(flags, self.format)?;
        self.writer.write_all(rendered.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes rendered flags to a file
///
/// The file is only created (or truncated) when flags are appended, so a
/// failed validation leaves any previous output untouched.
pub struct FileSink {
    path: PathBuf,
    format: FlagFormat,
}

impl FileSink {
    pub fn new<P: AsRef<Path>>(path: P, format: FlagFormat) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            format,
        }
    }
}

impl BuildFlagSink for FileSink {
    fn append_build_flags(&mut self, flags: &[BuildFlag]) -> Result<(), SinkError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let rendered = render_flags(flags, self.format)?;
        fs::write(&self.path, rendered)?;
        tracing::debug!(path = %self.path.display(), "Wrote build flags");
        Ok(())
    }
}

/// Build the sink for an output destination
///
/// `None` writes to stdout.
pub fn open_sink(format: FlagFormat, path: Option<&Path>) -> Box<dyn BuildFlagSink> {
    match path {
        Some(path) => Box::new(FileSink::new(path, format)),
        None => Box::new(WriterSink::new(io::stdout(), format)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn flags() -> Vec<BuildFlag> {
        vec![
            BuildFlag::new("HANDHELD_MAC_STRING", "\"30:ED:A0:A8:B5:70\""),
            BuildFlag::new("HANDHELD_MAC_ARRAY", "{0x30, 0xED, 0xA0, 0xA8, 0xB5, 0x70}"),
        ]
    }

    #[test]
    fn test_vec_sink_collects() {
        let mut sink: Vec<BuildFlag> = Vec::new();
        sink.append_build_flags(&flags()).unwrap();
        assert_eq!(sink, flags());
    }

    #[test]
    fn test_writer_sink_platformio() {
        let mut sink = WriterSink::new(Vec::new(), FlagFormat::Platformio);
        sink.append_build_flags(&flags()).unwrap();

        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            output,
            "-D HANDHELD_MAC_STRING=\\\"30:ED:A0:A8:B5:70\\\"\n\
             -D \"HANDHELD_MAC_ARRAY={0x30, 0xED, 0xA0, 0xA8, 0xB5, 0x70}\"\n"
        );
    }

    #[test]
    fn test_file_sink_creates_missing_parent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("build").join("pio").join("flags.txt");
        assert!(!path.parent().unwrap().exists());

        let mut sink = FileSink::new(&path, FlagFormat::Platformio);
        sink.append_build_flags(&flags()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.starts_with("-D HANDHELD_MAC_STRING="));
    }

    #[test]
    fn test_file_sink_truncates_existing_output() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("flags.txt");
        fs::write(&path, "stale content that is longer than the new output\n".repeat(10))
            .unwrap();

        let mut sink = FileSink::new(&path, FlagFormat::Plain);
        sink.append_build_flags(&flags()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(!content.contains("stale"));
    }

    #[test]
    fn test_file_sink_untouched_until_append() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("flags.json");

        let _sink = open_sink(FlagFormat::Json, Some(path.as_path()));
        assert!(!path.exists(), "Sink should not create the file eagerly");
    }
}
