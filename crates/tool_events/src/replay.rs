//! Line-oriented reader for recorded [`HistoryUpdate`] transcripts (JSONL).

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde_json::Value;

use crate::error::ReplayError;
use crate::update::HistoryUpdate;

#[derive(Debug)]
pub struct ReplayRecord {
    /// 1-based line number in the transcript.
    pub line_number: usize,
    pub outcome: Result<HistoryUpdate, ReplayError>,
}

/// Yields one record per non-blank line. A malformed line produces an `Err` outcome and
/// reading continues; an I/O failure ends iteration after reporting it.
pub struct ReplayReader<R: BufRead> {
    reader: R,
    buffer: Vec<u8>,
    line_number: usize,
    done: bool,
}

impl<R: BufRead> ReplayReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::new(),
            line_number: 0,
            done: false,
        }
    }
}

impl ReplayReader<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> Iterator for ReplayReader<R> {
    type Item = ReplayRecord;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }
            self.buffer.clear();
            let line_number = self.line_number + 1;
            match self.reader.read_until(b'\n', &mut self.buffer) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(_) => self.line_number = line_number,
                Err(source) => {
                    self.done = true;
                    self.line_number = line_number;
                    return Some(ReplayRecord {
                        line_number,
                        outcome: Err(ReplayError::Io {
                            line_number,
                            source,
                        }),
                    });
                }
            }

            let Ok(line) = std::str::from_utf8(&self.buffer) else {
                return Some(ReplayRecord {
                    line_number,
                    outcome: Err(ReplayError::InvalidUtf8 { line_number }),
                });
            };
            let line = line.trim_end_matches(|ch: char| ch == '\n' || ch == '\r');
            if line.chars().all(char::is_whitespace) {
                continue;
            }
            return Some(ReplayRecord {
                line_number,
                outcome: parse_update_line(line, line_number),
            });
        }
    }
}

pub fn parse_update_line(line: &str, line_number: usize) -> Result<HistoryUpdate, ReplayError> {
    let value: Value = serde_json::from_str(line)
        .map_err(|source| ReplayError::Json {
            line_number,
            source,
        })?;
    serde_json::from_value(value).map_err(|source| ReplayError::Decode {
        line_number,
        source,
    })
}
