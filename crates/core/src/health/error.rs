use thiserror::Error;

/// # Summary
/// 健康数据服务层错误枚举。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
/// - `Retrieval` 与 `Deletion` 对当前清理流程均为终止性错误，不重试。
#[derive(Error, Debug)]
pub enum HealthError {
    /// 存储无法返回请求区间内的样本
    #[error("Retrieval failure: {0}")]
    Retrieval(String),

    /// 存储无法执行批量删除
    #[error("Deletion failure: {0}")]
    Deletion(String),

    /// 样本写入失败
    #[error("Save failure: {0}")]
    Save(String),

    /// 配置错误 (如无法识别的样本类型)
    #[error("Configuration error: {0}")]
    Configuration(String),
}
