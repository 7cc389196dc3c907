pub mod io;

/// Reset SIGPIPE to default behavior (SIG_DFL) like GNU uniq.
/// Rust ignores SIGPIPE by default, which would turn `funiq | head` into a
/// stream of write errors instead of a quiet exit. Call at the start of main().
#[inline]
pub fn reset_sigpipe() {
    #[cfg(unix)]
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}

/// Format an IO error message without the "(os error N)" suffix, the way
/// GNU tools print it ("No such file or directory").
pub fn io_error_msg(e: &std::io::Error) -> String {
    match e.raw_os_error() {
        Some(raw) => {
            let msg = std::io::Error::from_raw_os_error(raw).to_string();
            msg.replace(&format!(" (os error {})", raw), "")
        }
        None => e.to_string(),
    }
}
