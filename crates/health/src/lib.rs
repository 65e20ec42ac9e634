//! # `steplog-health` - 健康数据应用服务
//!
//! 通过 `HealthStore` 端口完成三类业务：
//! - [`purger`]：同日重复样本的检测与批量清理。
//! - [`statistics`]：按时间桶、按来源的累计统计 (刷新列表)。
//! - [`generator`]：合成样本写入，用于制造待清理的重复数据。

pub mod generator;
pub mod purger;
pub mod statistics;
