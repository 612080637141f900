//! # Core Module
//!
//! Shared configuration for the render cache subsystems.

pub mod config;

pub use config::{
    Config, ConfigError, EntityCacheConfig, RenderCacheConfig, SurfaceAtlasSetConfig,
};
