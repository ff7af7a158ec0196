use std::sync::Arc;

use bus_dbg::BusDbg;
use bus_dbg::BusDbgBuilder;
use bus_dbg::BusDbgConfig;
use bus_dbg::LogConfig;
use bus_dbg::LoopbackFramework;
use bus_dbg::MemFs;
use bus_dbg::Result;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tracing::error;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;

/// Fabric the loopback framework reports its commits under
const LOOPBACK_FABRIC: &str = "fab-loopback";
const READ_CHUNK: usize = 4096;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = BusDbgConfig::new()?.validate()?;

    // Initializing Logs
    let _guard = init_observability(&config.log)?;

    let framework = Arc::new(LoopbackFramework::new(LOOPBACK_FABRIC));
    let service = BusDbgBuilder::new(config, framework.clone()).build();
    framework.attach(&service);

    let fs = Arc::new(MemFs::new());
    service.bring_up(fs.clone())?;
    info!("Inspection surface ready. Waiting for commands or CTRL+C...");
    println!("bus-dbg: type `help` for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        if !run_command(&service, &fs, line.trim()) {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        error!("Failed to read operator input: {e}");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C detected.");
                break;
            }
        }
    }

    service.teardown();
    println!("Exiting program.");
    Ok(())
}

/// Runs one operator command; returns `false` when the shell should exit.
fn run_command(
    service: &BusDbg,
    fs: &MemFs,
    line: &str,
) -> bool {
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let outcome = match command {
        "" => Ok(()),
        "ls" => list(fs, rest.trim()),
        "cat" => cat(service, fs, rest.trim()),
        "write" => {
            let (path, data) = rest.trim_start().split_once(' ').unwrap_or((rest.trim(), ""));
            write(service, fs, path, data)
        }
        "help" => {
            println!("ls [path] | cat <path> | write <path> <data> | quit");
            Ok(())
        }
        "quit" | "exit" => return false,
        other => {
            println!("unknown command: {other}");
            Ok(())
        }
    };
    if let Err(e) = outcome {
        println!("error: {e}");
    }
    true
}

fn list(
    fs: &MemFs,
    path: &str,
) -> Result<()> {
    for entry in fs.list(path)? {
        match entry.mode {
            Some(mode) => println!("{mode:04o} {}", entry.name),
            None => println!("d    {}/", entry.name),
        }
    }
    Ok(())
}

fn cat(
    service: &BusDbg,
    fs: &MemFs,
    path: &str,
) -> Result<()> {
    let file = fs.resolve(path)?;
    let mut content = Vec::new();
    loop {
        let chunk = service.read(&file, content.len() as u64, READ_CHUNK)?;
        if chunk.is_empty() {
            break;
        }
        content.extend_from_slice(&chunk);
    }
    print!("{}", String::from_utf8_lossy(&content));
    println!();
    Ok(())
}

fn write(
    service: &BusDbg,
    fs: &MemFs,
    path: &str,
    data: &str,
) -> Result<()> {
    let file = fs.resolve(path)?;
    let written = service.write(&file, data.as_bytes())?;
    println!("{written} bytes written");
    Ok(())
}

pub fn init_observability(log: &LogConfig) -> Result<WorkerGuard> {
    std::fs::create_dir_all(&log.log_dir)?;
    let log_file = tracing_appender::rolling::never(&log.log_dir, &log.file_name);

    let (non_blocking, guard) = tracing_appender::non_blocking(log_file);
    let base_subscriber = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::from_default_env());
    tracing_subscriber::registry().with(base_subscriber).init();

    Ok(guard)
}
