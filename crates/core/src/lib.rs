//! # `steplog-core` - 领域模型与端口
//!
//! 定义健康数据样本实体、时间区间与日历日、存储端口 `HealthStore`
//! 以及各层错误类型。本 crate 不依赖任何具体存储实现。

pub mod common;
pub mod config;

pub mod health {
    pub mod entity;
    pub mod error;
}

pub mod store {
    pub mod error;
    pub mod port;
}
