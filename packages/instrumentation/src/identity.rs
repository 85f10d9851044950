//! Worker identity token used to correlate log lines.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_WORKER: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static TOKEN: String = to_base36(NEXT_WORKER.fetch_add(1, Ordering::Relaxed));
}

/// Short token identifying the current worker thread.
///
/// Assigned on first use from a process-wide counter: stable for the
/// lifetime of the thread and never handed to another thread.
pub fn worker_token() -> String {
    TOKEN.with(Clone::clone)
}

/// Render `value` in lowercase base 36.
pub fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if value == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::with_capacity(13);
    while value > 0 {
        buf.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    buf.reverse();
    String::from_utf8_lossy(&buf).into_owned()
}
