use image::DynamicImage;
use ndarray::Array2;

use super::metrics::argmax;
use super::{ParamStorage, Parameters, forward};
use crate::config::NetConfig;
use crate::errors::ModelError;
use crate::vision::Vision;

/// 单个样本的推理结果
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// 预测类别（概率最大者，并列时取最小类别）
    pub class: usize,
    /// 最大概率 × 100
    pub confidence: f32,
    /// 每个类别的 (类别, 概率 × 100)
    pub distribution: Vec<(usize, f32)>,
}

/// 对一个 [input_size, 1] 的特征列向量做推理
///
/// 特征须已完成预处理（缩放到 28x28、灰度、归一化、反色）。
pub fn predict(params: &Parameters, feature: &Array2<f32>) -> Prediction {
    assert_eq!(
        feature.ncols(),
        1,
        "推理输入须为单列向量，当前形状为{:?}",
        feature.dim()
    );
    let output = forward(params, feature).a2;
    let probs = output.column(0);

    let class = argmax(probs);
    let distribution = probs
        .iter()
        .enumerate()
        .map(|(digit, &p)| (digit, p * 100.0))
        .collect();
    Prediction {
        class,
        confidence: probs[class] * 100.0,
        distribution,
    }
}

/// 持有一份训练好的参数做推理
#[derive(Debug, Clone)]
pub struct Predictor {
    config: NetConfig,
    params: Parameters,
}

impl Predictor {
    pub fn new(config: NetConfig, params: Parameters) -> Result<Self, ModelError> {
        params.check_dims(super::LayerDims::from_config(&config))?;
        Ok(Self { config, params })
    }

    /// 从存储中加载参数
    pub fn from_storage<S: ParamStorage>(
        config: NetConfig,
        storage: &S,
        handle: &S::Handle,
    ) -> Result<Self, ModelError> {
        let params = storage.load(handle)?;
        Self::new(config, params)
    }

    pub fn predict(&self, feature: &Array2<f32>) -> Prediction {
        predict(&self.params, feature)
    }

    /// 先把任意图像预处理为特征列向量，再推理
    pub fn predict_image(&self, image: &DynamicImage) -> Prediction {
        let feature = Vision::prepare_digit(image, &self.config);
        self.predict(&feature)
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }
}
