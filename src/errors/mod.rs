use thiserror::Error;

use crate::data::DataError;

/// 模型训练、推理与参数持久化中可恢复的错误
///
/// 注：数值核心里的形状不一致属于调用方的契约错误，直接panic，不在此列。
#[derive(Error, Debug)]
pub enum ModelError {
    /// 持久化的参数组缺项、形状不符或无法解码
    #[error("参数状态损坏或不兼容：{0}")]
    CorruptOrIncompatibleState(String),

    /// 训练配置无效（如既无目标准确率也无轮数上限）
    #[error("训练配置无效：{0}")]
    InvalidTrainingConfiguration(String),

    /// 训练循环已结束，须重新创建实例才能再次训练
    #[error("训练循环已结束，无法继续推进")]
    TrainingTerminated,

    #[error("IO 错误：{0}")]
    Io(#[from] std::io::Error),

    #[error("数据错误：{0}")]
    Data(#[from] DataError),

    #[error("图像处理失败：{0}")]
    Image(#[from] image::ImageError),

    #[error("配置解析失败：{0}")]
    Config(#[from] serde_json::Error),
}
