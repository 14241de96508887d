use tracing::Level;

/// Install a `tracing` fmt subscriber for the process.
///
/// `verbose` lowers the level to `DEBUG` (cache hits, evictions, layout results). Calling this
/// more than once, or after another subscriber was installed, is a no-op.
pub fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/logging.rs"]
mod tests;
