//! runcat-bwmon - bandwidth side-channel writer
//!
//! Runs `vnstat -l` (or another live monitor), keeps the latest chunk of its
//! output and periodically writes the total rate, in bits per second, to the
//! file polled by `runcat pigeon`.

use anyhow::{Context, Result};
use clap::Parser;
use runcat_lib::bandwidth::{parse_vnstat_line, write_signal};
use runcat_lib::observability::init_tracing;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::watch;
use tracing::{debug, info};

/// Size of one read from the monitor's output
const CHUNK_SIZE: usize = 1024;

/// Bandwidth monitor for the runcat pigeon module
#[derive(Parser)]
#[command(name = "runcat-bwmon")]
#[command(author, version, about = "Feed live bandwidth figures to runcat", long_about = None)]
pub struct Cli {
    /// Side-channel file (defaults to bw.log in the runcat config directory)
    #[arg(long, env = "RUNCAT_BW_FILE")]
    pub output: Option<PathBuf>,

    /// Milliseconds between two writes
    #[arg(long, default_value_t = 500)]
    pub interval_ms: u64,

    /// Live monitor command and its arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, default_values = ["vnstat", "-l"])]
    pub command: Vec<String>,
}

fn default_output() -> PathBuf {
    dirs_next::config_dir()
        .map(|dir| dir.join("waybar").join("modules").join("runcat-text"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bw.log")
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing("info");

    let output = cli.output.unwrap_or_else(default_output);
    info!(
        command = %cli.command.join(" "),
        output = %output.display(),
        interval_ms = cli.interval_ms,
        "Starting bandwidth monitor"
    );

    monitor(&cli.command, &output, Duration::from_millis(cli.interval_ms)).await
}

/// Run the monitor command until its output closes
async fn monitor(command: &[String], output: &Path, period: Duration) -> Result<()> {
    let (program, args) = command.split_first().context("Empty monitor command")?;

    let mut child = Command::new(program)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("Failed to start '{}'", program))?;
    let stdout = child
        .stdout
        .take()
        .context("Monitor output is not captured")?;

    let (latest, reader) = watch::channel(String::new());
    tokio::try_join!(read_chunks(stdout, latest), write_signals(reader, output, period))?;

    info!("Monitor output closed");
    Ok(())
}

/// Publish every non-blank chunk of output, trimmed
async fn read_chunks<R: AsyncRead + Unpin>(mut source: R, latest: watch::Sender<String>) -> Result<()> {
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let n = source
            .read(&mut buf)
            .await
            .context("Failed to read monitor output")?;
        if n == 0 {
            return Ok(());
        }

        let chunk = String::from_utf8_lossy(&buf[..n]);
        let chunk = chunk.trim();
        if !chunk.is_empty() {
            debug!(chunk = %chunk, "Monitor output");
            latest.send_replace(chunk.to_string());
        }
    }
}

/// Write the parsed total every `period`, once more after the output closes
async fn write_signals(latest: watch::Receiver<String>, output: &Path, period: Duration) -> Result<()> {
    let mut ticker = tokio::time::interval(period);
    loop {
        ticker.tick().await;
        let closed = latest.has_changed().is_err();
        let chunk = latest.borrow().clone();

        let bits_per_second = parse_vnstat_line(&chunk)
            .with_context(|| format!("Unreadable monitor output '{}'", chunk))?;
        write_signal(output, bits_per_second)
            .await
            .with_context(|| format!("Failed to write {}", output.display()))?;

        if closed {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runcat_lib::PetError;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_read_chunks_keeps_latest_trimmed() {
        let (latest, reader) = watch::channel(String::new());
        let output: &[u8] = b"  rx: 1 kbit/s 0 p/s tx: 2 kbit/s 0 p/s \n";

        read_chunks(output, latest).await.unwrap();

        assert_eq!(*reader.borrow(), "rx: 1 kbit/s 0 p/s tx: 2 kbit/s 0 p/s");
    }

    #[tokio::test]
    async fn test_read_chunks_ignores_blank_output() {
        let (latest, reader) = watch::channel("rx: 1 bit/s tx: 1 bit/s".to_string());
        let output: &[u8] = b"\n\n   ";

        read_chunks(output, latest).await.unwrap();

        assert_eq!(*reader.borrow(), "rx: 1 bit/s tx: 1 bit/s");
    }

    #[tokio::test]
    async fn test_write_signals_after_close() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bw.log");
        let (latest, reader) = watch::channel(String::new());
        latest.send_replace("rx: 1,5 Mbit/s 0 p/s tx: 500 kbit/s 0 p/s".to_string());
        drop(latest);

        write_signals(reader, &path, Duration::from_millis(10))
            .await
            .unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "2000000");
    }

    #[tokio::test]
    async fn test_write_signals_fails_on_unknown_unit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bw.log");
        let (latest, reader) = watch::channel("rx: 1 Tbit/s tx: 1 bit/s".to_string());
        drop(latest);

        let err = write_signals(reader, &path, Duration::from_millis(10))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Tbit/s"));
        assert!(matches!(
            err.downcast_ref::<PetError>(),
            Some(PetError::UnknownUnit(unit)) if unit == "Tbit/s"
        ));
        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_monitor_runs_command_to_completion() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bw.log");
        let command = [
            "sh".to_string(),
            "-c".to_string(),
            "printf 'rx: 3 kbit/s 0 p/s tx: 4 kbit/s 0 p/s'".to_string(),
        ];

        monitor(&command, &path, Duration::from_millis(20))
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "7000");
    }

    #[tokio::test]
    async fn test_monitor_rejects_empty_command() {
        let dir = TempDir::new().unwrap();
        assert!(monitor(&[], &dir.path().join("bw.log"), Duration::from_millis(10))
            .await
            .is_err());
    }
}
