use std::time::{Duration, Instant};

use blob_pool::config::Config;
use blob_pool::{Blob, BlobPool, Error};

use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// How long a worker waits in async mode before counting a timeout.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(1);

/// Acquisition mode used for one cycle, rotated per iteration.
#[derive(Debug, Clone, Copy)]
enum Mode {
    Sync,
    Try,
    Async,
}

impl Mode {
    fn for_iteration(i: usize) -> Self {
        match i % 3 {
            0 => Mode::Sync,
            1 => Mode::Try,
            _ => Mode::Async,
        }
    }
}

#[derive(Debug, Default)]
struct WorkerReport {
    frames: u64,
    bytes: u64,
    exhausted: u64,
    timeouts: u64,
}

/// Write a length-prefixed frame, patch the header, and read it back.
fn write_frame(
    blob: &mut Blob,
    worker: usize,
    seq: u64,
    payload: &str,
) -> blob_pool::Result<usize> {
    blob.reserve_prefix(4)?;
    blob.write_u32(worker as u32)?;
    blob.write_u64(seq)?;
    blob.write_bool(seq % 2 == 0)?;
    blob.write_f32(seq as f32 * 0.5)?;
    blob.write_string(Some(payload))?;
    blob.write_string(None)?;
    let frame_len = blob.position();

    let header = blob.release_prefix()?;
    debug_assert_eq!(header, 4);
    blob.write_i32((frame_len - header) as i32)?;

    blob.seek_to_logical_start()?;
    let body_len = blob.read_i32()? as usize;
    let ok = body_len == frame_len - 4
        && blob.read_u32()? == worker as u32
        && blob.read_u64()? == seq
        && blob.read_bool()? == (seq % 2 == 0)
        && blob.read_f32()?.to_bits() == (seq as f32 * 0.5).to_bits()
        && blob.read_string()?.as_deref() == Some(payload)
        && blob.read_string()?.is_none();
    if !ok {
        warn!(worker, seq, "frame read-back mismatch");
    }
    Ok(blob.written().len())
}

async fn run_worker(
    pool: BlobPool,
    worker: usize,
    iterations: usize,
    payload: String,
) -> WorkerReport {
    let mut report = WorkerReport::default();
    for i in 0..iterations {
        let blob = match Mode::for_iteration(i) {
            Mode::Sync => match pool.acquire() {
                Ok(blob) => Some(blob),
                Err(Error::Exhausted) => {
                    report.exhausted += 1;
                    None
                }
                Err(e) => {
                    warn!(worker, "acquire failed: {}", e);
                    None
                }
            },
            Mode::Try => pool.try_acquire(),
            Mode::Async => match pool.acquire_timeout(ACQUIRE_TIMEOUT).await {
                Some(blob) => Some(blob),
                None => {
                    report.timeouts += 1;
                    None
                }
            },
        };

        let Some(mut blob) = blob else {
            tokio::task::yield_now().await;
            continue;
        };

        match write_frame(&mut blob, worker, i as u64, &payload) {
            Ok(len) => {
                report.frames += 1;
                report.bytes += len as u64;
            }
            Err(e) => warn!(worker, seq = i, "frame encoding failed: {}", e),
        }

        // Hold the lease across a yield so workers contend for chunks.
        tokio::task::yield_now().await;
        blob.release();
    }
    report
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse configuration
    let config = Config::parse_args();

    // Initialize tracing
    let log_level = match config.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("blob-pool v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: {} chunks x {} bytes, {} workers x {} iterations",
        config.chunks, config.chunk_size, config.workers, config.iterations
    );

    let pool = BlobPool::with_config(config.pool_config())?;

    let start = Instant::now();
    let mut handles = Vec::with_capacity(config.workers);
    for worker in 0..config.workers {
        handles.push(tokio::spawn(run_worker(
            pool.clone(),
            worker,
            config.iterations,
            config.payload.clone(),
        )));
    }

    let mut total = WorkerReport::default();
    for handle in handles {
        let report = handle.await?;
        total.frames += report.frames;
        total.bytes += report.bytes;
        total.exhausted += report.exhausted;
        total.timeouts += report.timeouts;
    }
    let elapsed = start.elapsed();

    let stats = pool.stats();
    info!(
        "{} frames ({} bytes) in {:?}, {} exhausted, {} timeouts",
        total.frames, total.bytes, elapsed, total.exhausted, total.timeouts
    );
    info!(
        "Pool: acquired={} released={} handoffs={} ({:.1}%) waits={} wrappers={}",
        stats.acquired,
        stats.released,
        stats.handoffs,
        stats.handoff_rate() * 100.0,
        stats.waits,
        stats.wrappers_created
    );
    if stats.available_chunks != pool.chunk_count() {
        warn!(
            "{} of {} chunks still leased after shutdown",
            pool.chunk_count() - stats.available_chunks,
            pool.chunk_count()
        );
    }

    Ok(())
}
