//! # Render Cache Configuration
//!
//! Configuration structures for the surface atlas pool and for cacheable
//! entities, plus the top-level [`RenderCacheConfig`] that aggregates them.
//!
//! ## Configuration Categories
//!
//! - **Atlas Config**: initial and maximum atlas sizes, atlas count ceiling, slot padding
//! - **Entity Config**: defaults applied to newly created cacheable entities
//! - **Render Cache Config**: everything above plus the log level

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError};

/// # Surface Atlas Set Configuration
///
/// Controls how a [`SurfaceAtlasSet`](crate::atlas::SurfaceAtlasSet) sizes
/// and bounds its atlases. New atlases start at the initial size and grow
/// towards the maximum only when a request does not fit a fresh atlas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceAtlasSetConfig {
    /// Width of the first atlas, in pixels
    pub initial_atlas_width: u32,
    /// Height of the first atlas, in pixels
    pub initial_atlas_height: u32,
    /// Largest width any atlas may grow to
    pub max_atlas_width: u32,
    /// Largest height any atlas may grow to
    pub max_atlas_height: u32,
    /// Maximum number of atlases alive at once
    pub max_atlas_num: usize,
    /// Extra pixels reserved right of and below each slot
    pub slot_padding: u32,
}

impl SurfaceAtlasSetConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self {
            initial_atlas_width: 512,
            initial_atlas_height: 512,
            max_atlas_width: 2048,
            max_atlas_height: 2048,
            max_atlas_num: 4,
            slot_padding: 1,
        }
    }

    /// Set the initial atlas size
    pub fn with_initial_atlas_size(mut self, width: u32, height: u32) -> Self {
        self.initial_atlas_width = width;
        self.initial_atlas_height = height;
        self
    }

    /// Set the maximum atlas size
    pub fn with_max_atlas_size(mut self, width: u32, height: u32) -> Self {
        self.max_atlas_width = width;
        self.max_atlas_height = height;
        self
    }

    /// Set the maximum atlas count
    pub fn with_max_atlas_num(mut self, count: usize) -> Self {
        self.max_atlas_num = count;
        self
    }

    /// Set the padding reserved around each slot
    pub fn with_slot_padding(mut self, padding: u32) -> Self {
        self.slot_padding = padding;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_atlas_width == 0 || self.initial_atlas_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "initial atlas size must be non-zero, got {}x{}",
                self.initial_atlas_width, self.initial_atlas_height
            )));
        }

        if self.initial_atlas_width > self.max_atlas_width
            || self.initial_atlas_height > self.max_atlas_height
        {
            return Err(ConfigError::Invalid(format!(
                "initial atlas size {}x{} exceeds maximum {}x{}",
                self.initial_atlas_width,
                self.initial_atlas_height,
                self.max_atlas_width,
                self.max_atlas_height
            )));
        }

        if self.max_atlas_num == 0 {
            return Err(ConfigError::Invalid("max atlas count must be at least 1".to_string()));
        }

        Ok(())
    }
}

impl Default for SurfaceAtlasSetConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Entity Cache Configuration
///
/// Defaults applied to cacheable entities at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityCacheConfig {
    /// Whether children are still rendered after the cached bitmap is drawn
    pub should_render_children: bool,
}

impl EntityCacheConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self {
            should_render_children: true,
        }
    }

    /// Set whether children are rendered on top of the cache
    pub fn with_should_render_children(mut self, enabled: bool) -> Self {
        self.should_render_children = enabled;
        self
    }
}

impl Default for EntityCacheConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Complete Render Cache Configuration
///
/// Top-level configuration that hosts load from disk and hand to the
/// atlas set and entity constructors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderCacheConfig {
    /// Log level filter, in `env_logger` syntax
    pub log_level: String,
    /// Glyph atlas pool configuration
    pub atlas: SurfaceAtlasSetConfig,
    /// Cacheable entity defaults
    pub entity: EntityCacheConfig,
}

impl RenderCacheConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            atlas: SurfaceAtlasSetConfig::default(),
            entity: EntityCacheConfig::default(),
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set atlas configuration
    pub fn with_atlas(mut self, atlas: SurfaceAtlasSetConfig) -> Self {
        self.atlas = atlas;
        self
    }

    /// Set entity defaults
    pub fn with_entity(mut self, entity: EntityCacheConfig) -> Self {
        self.entity = entity;
        self
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.atlas.validate()
    }

    /// Install a logger filtered at [`RenderCacheConfig::log_level`].
    ///
    /// Returns `false` if a logger was already installed.
    pub fn init_logging(&self) -> bool {
        crate::foundation::logging::init_with_filter(&self.log_level)
    }
}

impl Default for RenderCacheConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for RenderCacheConfig {}
