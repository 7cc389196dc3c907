use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};

use memchr::memchr_iter;

use super::config::UniqConfig;
use super::printer::{LineSink, Printer};

/// Buffer size for both the streaming reader and the output writer.
const IO_BUF_SIZE: usize = 256 * 1024;

/// What a completed uniq pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UniqStats {
    pub lines_read: u64,
    pub lines_written: u64,
    /// Lines whose write failed; each failure was already reported on stderr.
    pub write_errors: u64,
}

impl UniqStats {
    /// True when every selected line reached the output.
    pub fn is_clean(&self) -> bool {
        self.write_errors == 0
    }
}

/// Strip the line terminator. In newline mode a CR right before it is part
/// of the terminator too, so CRLF input compares and prints like LF input.
#[inline]
fn strip_terminator(line: &[u8], term: u8) -> &[u8] {
    let line = match line.split_last() {
        Some((&last, rest)) if last == term => rest,
        _ => line,
    };
    if term == b'\n' {
        line.strip_suffix(b"\r").unwrap_or(line)
    } else {
        line
    }
}

/// Main streaming uniq processor.
/// Reads from `input` one line at a time, writes to `output`.
pub fn process_uniq<R: Read, W: Write>(
    input: R,
    output: W,
    config: &UniqConfig,
) -> io::Result<UniqStats> {
    let term = config.terminator();
    let mut reader = BufReader::with_capacity(IO_BUF_SIZE, input);
    let mut sink = LineSink::new(BufWriter::with_capacity(IO_BUF_SIZE, output), term);
    let mut printer = Printer::new(config);

    let mut line: Vec<u8> = Vec::with_capacity(4096);
    let mut lines_read = 0u64;
    loop {
        line.clear();
        if reader.read_until(term, &mut line)? == 0 {
            break;
        }
        lines_read += 1;
        printer.add_line(strip_terminator(&line, term), &mut sink);
    }

    finish(printer, sink, lines_read)
}

/// Same as [`process_uniq`] over input that is already in memory
/// (e.g. a memory-mapped file). Lines are located with memchr.
pub fn process_uniq_bytes<W: Write>(
    data: &[u8],
    output: W,
    config: &UniqConfig,
) -> io::Result<UniqStats> {
    let term = config.terminator();
    let mut sink = LineSink::new(BufWriter::with_capacity(IO_BUF_SIZE, output), term);
    let mut printer = Printer::new(config);

    let mut lines_read = 0u64;
    let mut start = 0;
    for pos in memchr_iter(term, data) {
        lines_read += 1;
        printer.add_line(strip_terminator(&data[start..pos], term), &mut sink);
        start = pos + 1;
    }
    // Last line without terminator
    if start < data.len() {
        lines_read += 1;
        printer.add_line(strip_terminator(&data[start..], term), &mut sink);
    }

    finish(printer, sink, lines_read)
}

fn finish<W: Write>(
    mut printer: Printer<'_>,
    mut sink: LineSink<W>,
    lines_read: u64,
) -> io::Result<UniqStats> {
    printer.finish(&mut sink);
    sink.flush()?;
    Ok(UniqStats {
        lines_read,
        lines_written: sink.lines_written(),
        write_errors: sink.write_errors(),
    })
}
