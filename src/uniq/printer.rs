use std::io::{self, Write};

use crate::common::io_error_msg;

use super::config::{Mode, UniqConfig};
use super::key::comparison_key;

/// Width of the right-aligned count column in -c output (GNU "%7lu ").
const COUNT_WIDTH: usize = 7;
const COUNT_PADDING: &[u8; COUNT_WIDTH] = b"       ";

/// Best-effort line writer.
///
/// A failed write is reported on stderr and counted, but never stops the
/// caller: comparison state keeps advancing and later lines are still tried.
pub struct LineSink<W: Write> {
    out: W,
    term: u8,
    lines_written: u64,
    write_errors: u64,
}

impl<W: Write> LineSink<W> {
    pub fn new(out: W, term: u8) -> Self {
        Self {
            out,
            term,
            lines_written: 0,
            write_errors: 0,
        }
    }

    /// Write `line` verbatim followed by the terminator.
    #[inline]
    pub fn emit(&mut self, line: &[u8]) {
        let term = self.term;
        let result = write_terminated(&mut self.out, line, term);
        self.record(result);
    }

    /// Write `line` prefixed by its right-aligned run count.
    #[inline]
    pub fn emit_counted(&mut self, count: u64, line: &[u8]) {
        let term = self.term;
        let result = write_count_line(&mut self.out, count, line, term);
        self.record(result);
    }

    fn record(&mut self, result: io::Result<()>) {
        match result {
            Ok(()) => self.lines_written += 1,
            Err(e) => {
                self.write_errors += 1;
                eprintln!("uniq: write error: {}", io_error_msg(&e));
            }
        }
    }

    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    pub fn write_errors(&self) -> u64 {
        self.write_errors
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[inline]
fn write_terminated(out: &mut impl Write, line: &[u8], term: u8) -> io::Result<()> {
    out.write_all(line)?;
    out.write_all(&[term])
}

#[inline]
fn write_count_line(out: &mut impl Write, count: u64, line: &[u8], term: u8) -> io::Result<()> {
    let mut buf = itoa::Buffer::new();
    let digits = buf.format(count);
    out.write_all(&COUNT_PADDING[..COUNT_WIDTH.saturating_sub(digits.len())])?;
    out.write_all(digits.as_bytes())?;
    out.write_all(b" ")?;
    write_terminated(out, line, term)
}

/// Remembers the previous line's comparison key.
#[derive(Debug, Default)]
struct KeyTracker {
    prev: Option<Vec<u8>>,
}

impl KeyTracker {
    /// Store `key` and report whether it opens a new run: always true for the
    /// first line, otherwise true when it differs from the previous key.
    #[inline]
    fn starts_run(&mut self, key: &[u8]) -> bool {
        if let Some(prev) = self.prev.as_mut() {
            if prev.as_slice() == key {
                return false;
            }
            prev.clear();
            prev.extend_from_slice(key);
        } else {
            self.prev = Some(key.to_vec());
        }
        true
    }
}

/// A run of equivalent adjacent lines, represented by its first member.
#[derive(Debug)]
pub struct Run {
    pub line: Vec<u8>,
    pub len: u64,
}

/// Running state shared by the run-based printers. `run` is `None` until the
/// first line arrives, so an empty stream has nothing to flush.
#[derive(Debug, Default)]
struct RunState {
    keys: KeyTracker,
    run: Option<Run>,
}

impl RunState {
    /// Account for one line. If it ends the current run, `flush` sees the
    /// finished run before the new one starts at `line`.
    #[inline]
    fn advance(&mut self, line: &[u8], key: &[u8], flush: impl FnOnce(&Run)) {
        if !self.keys.starts_run(key) {
            if let Some(run) = self.run.as_mut() {
                run.len += 1;
            }
            return;
        }
        match self.run.as_mut() {
            Some(run) => {
                flush(&*run);
                run.line.clear();
                run.line.extend_from_slice(line);
                run.len = 1;
            }
            None => {
                self.run = Some(Run {
                    line: line.to_vec(),
                    len: 1,
                })
            }
        }
    }

    fn take(&mut self) -> Option<Run> {
        self.run.take()
    }
}

/// One line-selection policy: sees every line once, in order, and is told
/// when the stream ends.
pub trait LinePrinter {
    fn observe<W: Write>(&mut self, line: &[u8], key: &[u8], sink: &mut LineSink<W>);
    fn finish<W: Write>(&mut self, sink: &mut LineSink<W>);
}

/// Prints the first line of each run as soon as it is seen.
#[derive(Debug, Default)]
pub struct DefaultPrinter {
    keys: KeyTracker,
}

impl LinePrinter for DefaultPrinter {
    #[inline]
    fn observe<W: Write>(&mut self, line: &[u8], key: &[u8], sink: &mut LineSink<W>) {
        if self.keys.starts_run(key) {
            sink.emit(line);
        }
    }

    fn finish<W: Write>(&mut self, _sink: &mut LineSink<W>) {}
}

/// -c: prints each run's first line with the run length.
#[derive(Debug, Default)]
pub struct CountingPrinter {
    state: RunState,
}

impl LinePrinter for CountingPrinter {
    #[inline]
    fn observe<W: Write>(&mut self, line: &[u8], key: &[u8], sink: &mut LineSink<W>) {
        self.state
            .advance(line, key, |run| sink.emit_counted(run.len, &run.line));
    }

    fn finish<W: Write>(&mut self, sink: &mut LineSink<W>) {
        if let Some(run) = self.state.take() {
            sink.emit_counted(run.len, &run.line);
        }
    }
}

/// -d: prints the first line of every run with two or more members.
#[derive(Debug, Default)]
pub struct RepeatedPrinter {
    state: RunState,
}

impl LinePrinter for RepeatedPrinter {
    #[inline]
    fn observe<W: Write>(&mut self, line: &[u8], key: &[u8], sink: &mut LineSink<W>) {
        self.state.advance(line, key, |run| {
            if run.len >= 2 {
                sink.emit(&run.line);
            }
        });
    }

    fn finish<W: Write>(&mut self, sink: &mut LineSink<W>) {
        if let Some(run) = self.state.take()
            && run.len >= 2
        {
            sink.emit(&run.line);
        }
    }
}

/// -u: prints lines that have no equivalent neighbour.
#[derive(Debug, Default)]
pub struct UniquePrinter {
    state: RunState,
}

impl LinePrinter for UniquePrinter {
    #[inline]
    fn observe<W: Write>(&mut self, line: &[u8], key: &[u8], sink: &mut LineSink<W>) {
        self.state.advance(line, key, |run| {
            if run.len == 1 {
                sink.emit(&run.line);
            }
        });
    }

    fn finish<W: Write>(&mut self, sink: &mut LineSink<W>) {
        if let Some(run) = self.state.take()
            && run.len == 1
        {
            sink.emit(&run.line);
        }
    }
}

/// The printer for one mode, picked once before the first line is read.
#[derive(Debug)]
pub enum Strategy {
    Default(DefaultPrinter),
    Count(CountingPrinter),
    RepeatedOnly(RepeatedPrinter),
    UniqueOnly(UniquePrinter),
}

impl Strategy {
    pub fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::Default => Strategy::Default(DefaultPrinter::default()),
            Mode::Count => Strategy::Count(CountingPrinter::default()),
            Mode::RepeatedOnly => Strategy::RepeatedOnly(RepeatedPrinter::default()),
            Mode::UniqueOnly => Strategy::UniqueOnly(UniquePrinter::default()),
        }
    }
}

impl LinePrinter for Strategy {
    #[inline]
    fn observe<W: Write>(&mut self, line: &[u8], key: &[u8], sink: &mut LineSink<W>) {
        match self {
            Strategy::Default(p) => p.observe(line, key, sink),
            Strategy::Count(p) => p.observe(line, key, sink),
            Strategy::RepeatedOnly(p) => p.observe(line, key, sink),
            Strategy::UniqueOnly(p) => p.observe(line, key, sink),
        }
    }

    fn finish<W: Write>(&mut self, sink: &mut LineSink<W>) {
        match self {
            Strategy::Default(p) => p.finish(sink),
            Strategy::Count(p) => p.finish(sink),
            Strategy::RepeatedOnly(p) => p.finish(sink),
            Strategy::UniqueOnly(p) => p.finish(sink),
        }
    }
}

/// Normalizes each line with the configured rules and hands it to the
/// active strategy.
pub struct Printer<'a> {
    config: &'a UniqConfig,
    strategy: Strategy,
}

impl<'a> Printer<'a> {
    pub fn new(config: &'a UniqConfig) -> Self {
        Self {
            config,
            strategy: Strategy::for_mode(config.mode),
        }
    }

    #[inline]
    pub fn add_line<W: Write>(&mut self, line: &[u8], sink: &mut LineSink<W>) {
        let key = comparison_key(line, self.config);
        self.strategy.observe(line, &key, sink);
    }

    pub fn finish<W: Write>(&mut self, sink: &mut LineSink<W>) {
        self.strategy.finish(sink);
    }
}
