//! 数据加载错误类型定义

use std::path::PathBuf;
use thiserror::Error;

/// 数据加载相关错误
#[derive(Debug, Error)]
pub enum DataError {
    /// 文件未找到
    #[error("文件未找到: {0:?}")]
    FileNotFound(PathBuf),

    /// IO 错误
    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),

    /// 格式错误（如 magic number 不匹配）
    #[error("格式错误: {0}")]
    FormatError(String),

    /// 形状不匹配
    #[error("形状不匹配: 期望 {expected:?}, 实际 {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    /// 标签超出类别范围
    #[error("第 {index} 个标签为 {label}，超出类别范围 [0, {num_classes})")]
    LabelOutOfRange {
        index: usize,
        label: usize,
        num_classes: usize,
    },

    /// 数据集没有任何样本
    #[error("数据集为空")]
    EmptyDataset,
}
