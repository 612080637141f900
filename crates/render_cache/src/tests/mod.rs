//! Cross-module scenario tests

mod cache_scenarios;
