//! `tracing` output for the browser console.

use std::io;
use tracing::Level;

/// Collects one formatted event and prints it when dropped.
#[derive(Default)]
pub(crate) struct ConsoleWriter {
    buf: Vec<u8>,
}

fn line_of(buf: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(buf);
    let line = line.trim_end();
    (!line.is_empty()).then(|| line.to_string())
}

impl ConsoleWriter {
    fn emit(&mut self) {
        if let Some(line) = line_of(&self.buf) {
            #[cfg(target_arch = "wasm32")]
            web_sys::console::log_1(&line.into());
            #[cfg(not(target_arch = "wasm32"))]
            eprintln!("{line}");
        }
        self.buf.clear();
    }
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.emit();
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        self.emit();
    }
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init() {
    let level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .without_time()
        .with_ansi(false)
        .with_target(false)
        .with_writer(ConsoleWriter::default)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_line_of_trims_the_newline() {
        assert_eq!(line_of(b" INFO signed in\n").as_deref(), Some(" INFO signed in"));
        assert_eq!(line_of(b"\n"), None);
    }

    #[test]
    fn test_flush_empties_the_buffer() {
        let mut w = ConsoleWriter::default();
        w.write_all(b"DEBUG fetching notes\n").expect("write");
        assert!(!w.buf.is_empty());
        w.flush().expect("flush");
        assert!(w.buf.is_empty());
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init();
        init();
        tracing::info!("logging ready");
    }
}
