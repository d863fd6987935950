//! 数据模块
//!
//! 数值核心只认两样东西：形状为 (特征数, 样本数) 且已归一化到 [0,1] 的特征矩阵，
//! 以及等长的整数标签向量。本模块负责把它们组织成带校验的数据集。
//!
//! # 主要组件
//!
//! - [`LabeledSet`]: 一组特征矩阵 + 标签向量
//! - [`Dataset`]: 训练集 + 验证（测试）集
//! - [`MnistLoader`]: 从本地 IDX 文件加载 MNIST
//! - [`DataError`]: 数据加载错误类型

pub mod error;
mod mnist;

#[cfg(test)]
mod tests;

use ndarray::{Array1, Array2};

pub use error::DataError;
pub use mnist::MnistLoader;

/// 一组带标签的样本：`features` 每列是一个样本，`labels[i]` 是第 i 列的类别
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledSet {
    features: Array2<f32>,
    labels: Array1<usize>,
}

impl LabeledSet {
    /// 创建并校验数据集
    ///
    /// # 参数
    /// - `features`: 形状 [input_size, N]
    /// - `labels`: 形状 [N]，每个值须在 [0, num_classes) 内
    pub fn new(
        features: Array2<f32>,
        labels: Array1<usize>,
        input_size: usize,
        num_classes: usize,
    ) -> Result<Self, DataError> {
        let (rows, cols) = features.dim();
        if cols == 0 {
            return Err(DataError::EmptyDataset);
        }
        if rows != input_size || labels.len() != cols {
            return Err(DataError::ShapeMismatch {
                expected: vec![input_size, labels.len()],
                got: vec![rows, cols],
            });
        }
        if let Some((index, &label)) = labels.iter().enumerate().find(|(_, l)| **l >= num_classes)
        {
            return Err(DataError::LabelOutOfRange {
                index,
                label,
                num_classes,
            });
        }
        Ok(Self { features, labels })
    }

    /// 特征矩阵 [input_size, N]
    pub fn features(&self) -> &Array2<f32> {
        &self.features
    }

    /// 标签向量 [N]
    pub fn labels(&self) -> &Array1<usize> {
        &self.labels
    }

    /// 样本数量
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// 训练所需的全部数据：训练集与验证集
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub train: LabeledSet,
    pub test: LabeledSet,
}

impl Dataset {
    pub fn new(train: LabeledSet, test: LabeledSet) -> Self {
        Self { train, test }
    }
}
