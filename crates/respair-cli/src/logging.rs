use crate::error::{CliError, Result};
use crate::ui::UiEvent;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{self, MakeWriter},
    prelude::*,
};

pub fn setup_logging(
    verbosity: u8,
    quiet: bool,
    log_file: &Option<PathBuf>,
    ui_sender: mpsc::Sender<UiEvent>,
) -> Result<()> {
    let level_filter = if quiet {
        LevelFilter::ERROR
    } else {
        match verbosity {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    };

    let console_layer = fmt::layer()
        .with_writer(UiMakeWriter::new(ui_sender))
        .with_ansi(true)
        .with_target(false)
        .compact();

    let subscriber = tracing_subscriber::registry()
        .with(level_filter)
        .with(console_layer);

    let result = if let Some(path) = log_file {
        let file = File::create(path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_thread_ids(true)
            .with_target(true);

        subscriber.with(file_layer).try_init()
    } else {
        subscriber.try_init()
    };

    result.map_err(|e| CliError::Other(anyhow::anyhow!("Failed to install logger: {}", e)))
}

/// Hands each formatted log record to the UI task as one [`UiEvent::Log`].
#[derive(Clone)]
struct UiMakeWriter {
    sender: mpsc::Sender<UiEvent>,
}

impl UiMakeWriter {
    fn new(sender: mpsc::Sender<UiEvent>) -> Self {
        Self { sender }
    }
}

impl<'a> MakeWriter<'a> for UiMakeWriter {
    type Writer = UiLineWriter;

    fn make_writer(&'a self) -> Self::Writer {
        UiLineWriter {
            sender: self.sender.clone(),
            buffer: Vec::new(),
        }
    }
}

/// Buffers one record and sends it on drop. Falls back to stderr once the UI is gone.
struct UiLineWriter {
    sender: mpsc::Sender<UiEvent>,
    buffer: Vec<u8>,
}

impl Write for UiLineWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for UiLineWriter {
    fn drop(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let line = String::from_utf8_lossy(&self.buffer).into_owned();
        if let Err(e) = self.sender.try_send(UiEvent::Log(line)) {
            if let UiEvent::Log(line) = e.into_inner() {
                eprint!("{}", line);
            }
        }
    }
}
