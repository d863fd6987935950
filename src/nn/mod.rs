/*
 * @Description  : 单隐藏层分类网络的数值核心
 *
 * 前向传播、手写反向传播、梯度下降、评估指标、训练循环与推理，
 * 全部直接基于 ndarray 的二维数组，列为样本、行为特征。
 */

mod backward;
mod forward;
mod history;
pub mod metrics;
pub mod optimizer;
mod params;
mod predictor;
mod storage;
mod trainer;

pub use backward::{backward, one_hot};
pub use forward::{ForwardIntermediates, forward, relu, softmax};
pub use history::{HistoryRecord, HistorySeries, ProgressSnapshot, TrainingHistory};
pub use metrics::Metrics;
pub use params::{Gradients, LayerDims, ParameterStore, Parameters};
pub use predictor::{Prediction, Predictor, predict};
pub use storage::{FileStorage, MemoryStorage, ParamStorage};
pub use trainer::{LoopState, ParamInit, Progress, StoppingPolicy, TrainingLoop};

#[cfg(test)]
mod tests;
