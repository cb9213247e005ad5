use super::types::Record;

use anyhow::{Context, Result, bail};
use log::warn;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::mem;
use std::path::{Path, PathBuf};
use zstd::stream::read::Decoder as ZstdDecoder;

pub type PgnInput = Box<dyn Read + Send>;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CompressionMode {
    /// Plain text, except for files ending in `.zst`.
    #[default]
    Auto,
    Zstd,
}

impl CompressionMode {
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = raw.trim();
        if normalized.is_empty() {
            bail!("Invalid compression value ''. Supported values: 'zstd' or 'auto'.");
        }

        if normalized.eq_ignore_ascii_case("zstd") {
            Ok(Self::Zstd)
        } else if normalized.eq_ignore_ascii_case("auto") {
            Ok(Self::Auto)
        } else {
            bail!(
                "Invalid compression value '{}'. Supported values: 'zstd' or 'auto'.",
                normalized
            )
        }
    }

    fn applies_to(self, path: &Path) -> bool {
        match self {
            Self::Zstd => true,
            Self::Auto => path.extension().is_some_and(|ext| ext == "zst"),
        }
    }
}

/// Expands the command line inputs: `-` stays stdin, patterns containing
/// `*` or `?` go through `glob`, anything else is taken as a path.
pub fn resolve_inputs(patterns: &[String]) -> Result<Vec<InputSource>> {
    if patterns.is_empty() {
        return Ok(vec![InputSource::Stdin]);
    }

    let mut sources = Vec::new();
    for pattern in patterns {
        if pattern == "-" {
            sources.push(InputSource::Stdin);
        } else if pattern.contains('*') || pattern.contains('?') {
            let matches: Vec<PathBuf> = glob::glob(pattern)
                .with_context(|| format!("Invalid glob pattern '{pattern}'"))?
                .filter_map(|entry| entry.ok())
                .collect();
            if matches.is_empty() {
                warn!("Pattern '{pattern}' matched no files");
            }
            sources.extend(matches.into_iter().map(InputSource::File));
        } else {
            sources.push(InputSource::File(PathBuf::from(pattern)));
        }
    }

    Ok(sources)
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

fn open_input_stream(path: &Path, compression: CompressionMode) -> Result<PgnInput> {
    let file =
        File::open(path).with_context(|| format!("Failed to open file '{}'", path.display()))?;

    if compression.applies_to(path) {
        let decoder = ZstdDecoder::new(file).with_context(|| {
            format!("Failed to initialize zstd decoder for '{}'", path.display())
        })?;
        Ok(Box::new(decoder))
    } else {
        Ok(Box::new(file))
    }
}

/// Opens every source and chains them into one byte stream.
///
/// With a single file an open failure is fatal; with several, the failing
/// file is logged and left out.
pub fn open_inputs(sources: &[InputSource], compression: CompressionMode) -> Result<PgnInput> {
    let mut chained: PgnInput = Box::new(io::empty());

    for source in sources {
        let stream: PgnInput = match source {
            InputSource::Stdin => Box::new(io::stdin()),
            InputSource::File(path) => match open_input_stream(path, compression) {
                Ok(stream) => stream,
                Err(err) if sources.len() > 1 => {
                    warn!("{err:#}");
                    continue;
                }
                Err(err) => return Err(err),
            },
        };
        chained = Box::new(chained.chain(stream));
    }

    Ok(chained)
}

/// Cuts a line-oriented PGN stream into game records.
///
/// A blank line either separates the headers from the movetext or, once the
/// movetext has started, ends the record. Every line, blank ones included,
/// goes into the buffer, so the terminating blank line ends up at the start
/// of the following record.
pub struct RecordSplitter<R> {
    input: R,
    buffer: Vec<u8>,
    line: Vec<u8>,
    has_content: bool,
    seen_movetext: bool,
    next_index: u64,
    finished: bool,
}

impl<R: BufRead> RecordSplitter<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            buffer: Vec::with_capacity(4096),
            line: Vec::with_capacity(256),
            has_content: false,
            seen_movetext: false,
            next_index: 1,
            finished: false,
        }
    }

    fn take_record(&mut self) -> Record {
        let record = Record {
            index: self.next_index,
            bytes: mem::take(&mut self.buffer),
        };
        self.next_index += 1;
        self.has_content = false;
        self.seen_movetext = false;
        record
    }

    fn next_record(&mut self) -> io::Result<Option<Record>> {
        loop {
            self.line.clear();
            if self.input.read_until(b'\n', &mut self.line)? == 0 {
                // End of stream: a last game without its trailing blank line
                // is still a game.
                return Ok(if self.has_content {
                    Some(self.take_record())
                } else {
                    None
                });
            }

            let mut complete = None;
            if is_blank(&self.line) {
                if self.seen_movetext {
                    complete = Some(self.take_record());
                } else if self.has_content {
                    self.seen_movetext = true;
                }
            } else {
                self.has_content = true;
            }

            self.buffer.extend_from_slice(&self.line);

            if complete.is_some() {
                return Ok(complete);
            }
        }
    }

    /// Number of records emitted so far.
    pub fn records_emitted(&self) -> u64 {
        self.next_index - 1
    }
}

impl<R: BufRead> Iterator for RecordSplitter<R> {
    type Item = io::Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

/// Wraps an unbuffered stream for the splitter.
pub fn buffered(input: PgnInput) -> BufReader<PgnInput> {
    BufReader::with_capacity(1 << 16, input)
}

fn is_blank(line: &[u8]) -> bool {
    line.iter().all(u8::is_ascii_whitespace)
}
