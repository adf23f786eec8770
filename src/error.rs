// ============================================================================
// error.rs — Gray-Scott
// Fatal initialization errors. The simulation itself has no error surface.
// ============================================================================

use thiserror::Error;

/// Errors that abort startup or a headless run.
#[derive(Debug, Error)]
pub enum SimError {
    /// A grid or image buffer could not be reserved.
    #[error("failed to allocate {bytes} bytes for {what}")]
    Allocation { what: &'static str, bytes: usize },

    #[error("grid dimensions must be non-zero (got {width}x{height})")]
    EmptyGrid { width: u32, height: u32 },

    #[error("grid {width}x{height} exceeds addressable memory")]
    GridTooLarge { width: u32, height: u32 },

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image encoding error: {0}")]
    Image(#[from] image::ImageError),

    /// Adapter, device or surface setup failed in the viewer.
    #[error("GPU error: {0}")]
    Gpu(String),
}

pub type Result<T> = std::result::Result<T, SimError>;

/// Reserve a buffer of `len` elements filled with `fill`, reporting failure
/// instead of aborting the process.
pub fn try_alloc<T: Clone>(what: &'static str, len: usize, fill: T) -> Result<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len).map_err(|_| SimError::Allocation {
        what,
        bytes: len.saturating_mul(std::mem::size_of::<T>()),
    })?;
    buf.resize(len, fill);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_fills_requested_length() {
        let buf = try_alloc("test", 16, 0.5f32).unwrap();
        assert_eq!(buf.len(), 16);
        assert!(buf.iter().all(|&v| v == 0.5));
    }

    #[test]
    fn oversized_alloc_reports_instead_of_aborting() {
        let err = try_alloc("huge", usize::MAX / 2, 0u64).unwrap_err();
        match err {
            SimError::Allocation { what, .. } => assert_eq!(what, "huge"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
