//! # `steplog-store` - `HealthStore` 适配器
//!
//! - [`sample::SqliteHealthStore`]：基于 SQLite 的持久化实现。
//! - [`memory::MemoryHealthStore`]：内存实现，支持注入故障，供测试与演示使用。

pub mod memory;
pub mod sample;
