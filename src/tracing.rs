use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::{self, LineWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};

use tracing_subscriber::fmt::MakeWriter;

const DEFAULT_FILTER: &str = "info";

type Mirror = Arc<Mutex<Option<LineWriter<File>>>>;

/// Every record goes to stderr; once `--log-file` is attached it is also
/// mirrored, line-buffered, into that file.
#[derive(Clone, Default)]
struct LogSink {
    mirror: Mirror,
}

struct SinkWriter {
    mirror: Mirror,
}

impl SinkWriter {
    fn with_mirror(&self, f: impl FnOnce(&mut LineWriter<File>)) {
        // A poisoned mirror only loses the file copy; stderr keeps working.
        if let Ok(mut guard) = self.mirror.lock() {
            if let Some(file) = guard.as_mut() {
                f(file);
            }
        }
    }
}

impl<'a> MakeWriter<'a> for LogSink {
    type Writer = SinkWriter;

    fn make_writer(&'a self) -> Self::Writer {
        SinkWriter {
            mirror: Arc::clone(&self.mirror),
        }
    }
}

impl Write for SinkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = io::stderr().lock().write(buf)?;
        self.with_mirror(|file| {
            let _ = file.write_all(&buf[..written]);
        });
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.with_mirror(|file| {
            let _ = file.flush();
        });
        Ok(())
    }
}

static SINK: OnceLock<LogSink> = OnceLock::new();

/// Installs the global subscriber. `log` records are forwarded into
/// `tracing`; `RUST_LOG` overrides the default `info` filter.
pub fn init() {
    let _ = tracing_log::LogTracer::init();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_FILTER));

    let sink = SINK.get_or_init(LogSink::default).clone();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(sink)
        .try_init();
}

/// Mirrors log output into `path`, or stops mirroring with `None`.
/// The file is opened even before `init`, so a bad path is reported early.
pub fn set_log_file(path: Option<&Path>) -> Result<()> {
    let mirror = path.map(open_log_file).transpose()?;
    if let Some(sink) = SINK.get() {
        if let Ok(mut guard) = sink.mirror.lock() {
            *guard = mirror;
        }
    }
    Ok(())
}

fn open_log_file(path: &Path) -> Result<LineWriter<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating log dir {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    Ok(LineWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_mirrors_lines_into_attached_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("cp.log");

        let sink = LogSink::default();
        *sink.mirror.lock().unwrap() = Some(open_log_file(&path).unwrap());

        let mut writer = sink.make_writer();
        writer.write_all(b"hello log\n").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "hello log\n");
    }

    #[test]
    fn sink_without_mirror_only_writes_stderr() {
        let sink = LogSink::default();
        let mut writer = sink.make_writer();
        assert_eq!(writer.write(b"stderr only\n").unwrap(), 12);
        writer.flush().unwrap();
    }

    #[test]
    fn set_log_file_reports_unopenable_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = set_log_file(Some(dir.path())).unwrap_err();
        assert!(format!("{err:#}").contains("opening log file"));

        let path = dir.path().join("ok.log");
        set_log_file(Some(&path)).unwrap();
        assert!(path.exists());
        set_log_file(None).unwrap();
    }
}
