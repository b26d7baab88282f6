//! Wrapper configuration.
//!
//! Settings a host can declare statically or load from JSON before building
//! the rendering pipeline.
//!
//! # Example
//!
//! ```ignore
//! use blockwire_core::WrapperConfig;
//!
//! pub static CONFIG: WrapperConfig = WrapperConfig::new(256).with_sparse_stream_ramp_frames(64);
//!
//! let loaded = WrapperConfig::from_json(r#"{ "max_block_size": 1024 }"#)?;
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{WrapperError, WrapperResult};

/// Largest sub-block the wrapper ever hands to the engine in one advance.
///
/// Engine-side buffers are sized when the pipeline is built; this bounds their
/// memory and the latency of a single advance.
pub const MAX_ENGINE_BLOCK_SIZE: u32 = 512;

/// Settings applied when building the rendering pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WrapperConfig {
    /// Largest block the host will render in one call.
    ///
    /// The effective sub-block size is this value capped at
    /// [`MAX_ENGINE_BLOCK_SIZE`].
    pub max_block_size: u32,

    /// Ramp length for stream-typed parameters when the host does not
    /// provide its own ramp length callback.
    pub sparse_stream_ramp_frames: Option<u32>,
}

impl WrapperConfig {
    /// Create a configuration for the given host block size.
    pub const fn new(max_block_size: u32) -> Self {
        Self {
            max_block_size,
            sparse_stream_ramp_frames: None,
        }
    }

    /// Set the fallback ramp length for stream-typed parameters.
    pub const fn with_sparse_stream_ramp_frames(mut self, frames: u32) -> Self {
        self.sparse_stream_ramp_frames = Some(frames);
        self
    }

    /// Sub-block size the render loop will actually use.
    pub const fn effective_block_size(&self) -> u32 {
        if self.max_block_size < MAX_ENGINE_BLOCK_SIZE {
            self.max_block_size
        } else {
            MAX_ENGINE_BLOCK_SIZE
        }
    }

    /// Parse and validate a JSON configuration.
    ///
    /// Missing fields take their default values.
    pub fn from_json(json: &str) -> WrapperResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration can build a pipeline.
    pub fn validate(&self) -> WrapperResult<()> {
        if self.max_block_size == 0 {
            return Err(WrapperError::InvalidConfig(
                "max_block_size must be greater than zero".to_owned(),
            ));
        }
        if self.sparse_stream_ramp_frames == Some(0) {
            return Err(WrapperError::InvalidConfig(
                "sparse_stream_ramp_frames must be greater than zero when set".to_owned(),
            ));
        }
        if self.max_block_size > MAX_ENGINE_BLOCK_SIZE {
            log::debug!(
                "max_block_size {} exceeds engine ceiling, sub-blocks capped at {}",
                self.max_block_size,
                MAX_ENGINE_BLOCK_SIZE
            );
        }
        Ok(())
    }
}

impl Default for WrapperConfig {
    fn default() -> Self {
        Self::new(MAX_ENGINE_BLOCK_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WrapperConfig::default();
        assert_eq!(config.max_block_size, 512);
        assert_eq!(config.sparse_stream_ramp_frames, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_effective_block_size_is_capped() {
        assert_eq!(WrapperConfig::new(128).effective_block_size(), 128);
        assert_eq!(WrapperConfig::new(4096).effective_block_size(), MAX_ENGINE_BLOCK_SIZE);
    }

    #[test]
    fn test_from_json_partial() {
        let config = WrapperConfig::from_json(r#"{ "sparse_stream_ramp_frames": 32 }"#).unwrap();
        assert_eq!(config.max_block_size, 512);
        assert_eq!(config.sparse_stream_ramp_frames, Some(32));
    }

    #[test]
    fn test_from_json_rejects_zero_block_size() {
        let err = WrapperConfig::from_json(r#"{ "max_block_size": 0 }"#).unwrap_err();
        assert!(matches!(err, WrapperError::InvalidConfig(_)));
    }

    #[test]
    fn test_from_json_rejects_zero_ramp() {
        let config = WrapperConfig::new(64).with_sparse_stream_ramp_frames(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_json_malformed() {
        let err = WrapperConfig::from_json("{ max_block_size: ").unwrap_err();
        assert!(matches!(err, WrapperError::Parse(_)));
    }

    #[test]
    fn test_json_round_trip() {
        let config = WrapperConfig::new(256).with_sparse_stream_ramp_frames(48);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(WrapperConfig::from_json(&json).unwrap(), config);
    }
}
