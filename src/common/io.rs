use std::fs::{self, File};
use std::io::{self, Read};
use std::ops::Deref;
use std::path::Path;

#[cfg(target_os = "linux")]
use std::sync::atomic::{AtomicBool, Ordering};

use memmap2::{Mmap, MmapOptions};

/// File contents held in memory: a read-only mapping or an owned buffer.
/// Dereferences to `&[u8]`.
pub enum FileData {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl Deref for FileData {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            FileData::Mmap(m) => m,
            FileData::Owned(v) => v,
        }
    }
}

/// An opened input file: regular files come back in memory, anything else
/// (FIFOs, character devices) is left as a stream to be read line by line.
pub enum InputSource {
    Bytes(FileData),
    Stream(File),
}

/// Below this size a plain read() beats mmap setup and teardown.
const MMAP_THRESHOLD: u64 = 1024 * 1024;

/// Cleared after the first EPERM so later opens skip the O_NOATIME attempt.
#[cfg(target_os = "linux")]
static NOATIME_SUPPORTED: AtomicBool = AtomicBool::new(true);

/// Open for reading with O_NOATIME where the kernel allows it.
#[cfg(target_os = "linux")]
fn open_noatime(path: &Path) -> io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;
    if NOATIME_SUPPORTED.load(Ordering::Relaxed) {
        match fs::OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NOATIME)
            .open(path)
        {
            Ok(f) => return Ok(f),
            // Only the owner (or CAP_FOWNER) may set O_NOATIME
            Err(ref e) if e.raw_os_error() == Some(libc::EPERM) => {
                NOATIME_SUPPORTED.store(false, Ordering::Relaxed);
            }
            Err(e) => return Err(e),
        }
    }
    File::open(path)
}

#[cfg(not(target_os = "linux"))]
fn open_noatime(path: &Path) -> io::Result<File> {
    File::open(path)
}

/// Open an input path for uniq.
pub fn open_input(path: &Path) -> io::Result<InputSource> {
    let mut file = open_noatime(path)?;
    let metadata = file.metadata()?;

    if metadata.is_dir() {
        return Err(io::Error::from_raw_os_error(libc::EISDIR));
    }
    if !metadata.file_type().is_file() {
        return Ok(InputSource::Stream(file));
    }

    let len = metadata.len();
    if len < MMAP_THRESHOLD {
        let mut buf = Vec::with_capacity(len as usize);
        file.read_to_end(&mut buf)?;
        return Ok(InputSource::Bytes(FileData::Owned(buf)));
    }

    // SAFETY: the mapping is read-only; a file truncated underneath us is the
    // same hazard every mmap-based coreutil accepts.
    match unsafe { MmapOptions::new().map(&file) } {
        Ok(mmap) => {
            #[cfg(unix)]
            {
                let _ = mmap.advise(memmap2::Advice::Sequential);
            }
            Ok(InputSource::Bytes(FileData::Mmap(mmap)))
        }
        // Some filesystems refuse mmap; stream instead.
        Err(_) => Ok(InputSource::Stream(file)),
    }
}

/// Create (or truncate) the output file.
pub fn create_output(path: &Path) -> io::Result<File> {
    File::create(path)
}

/// Close the output file and report what close(2) says; dropping a `File`
/// throws that result away (deferred EIO/ENOSPC on network filesystems).
#[cfg(unix)]
pub fn close_output(file: File) -> io::Result<()> {
    use std::os::unix::io::IntoRawFd;
    close_fd(file.into_raw_fd())
}

#[cfg(not(unix))]
pub fn close_output(file: File) -> io::Result<()> {
    file.sync_all()
}

#[cfg(unix)]
fn close_fd(fd: std::os::unix::io::RawFd) -> io::Result<()> {
    if unsafe { libc::close(fd) } == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}
