//! 评估指标：准确率与交叉熵损失

use ndarray::{Array1, Array2, ArrayView1, Axis};

/// 一次评估的结果
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Metrics {
    pub accuracy: f32,
    pub loss: f32,
}

/// 向量中最大值的索引；并列时取最小的索引
pub fn argmax(values: ArrayView1<f32>) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// 每列的预测类别 [N]
pub fn predictions(a2: &Array2<f32>) -> Array1<usize> {
    a2.axis_iter(Axis(1)).map(argmax).collect()
}

/// 预测类别与标签一致的列所占比例
pub fn accuracy(a2: &Array2<f32>, y: &Array1<usize>) -> f32 {
    assert_eq!(
        a2.ncols(),
        y.len(),
        "输出列数{}与标签数量{}不一致",
        a2.ncols(),
        y.len()
    );
    let correct = predictions(a2)
        .iter()
        .zip(y.iter())
        .filter(|(p, l)| p == l)
        .count();
    correct as f32 / y.len() as f32
}

/// 交叉熵：−(1/N) Σ ln A2[Y[i], i]
///
/// 不做截断：真实类别的概率恰为0时结果为 +inf。
pub fn loss(a2: &Array2<f32>, y: &Array1<usize>) -> f32 {
    assert_eq!(
        a2.ncols(),
        y.len(),
        "输出列数{}与标签数量{}不一致",
        a2.ncols(),
        y.len()
    );
    let total: f32 = y
        .iter()
        .enumerate()
        .map(|(i, &label)| a2[[label, i]].ln())
        .sum();
    -total / y.len() as f32
}

pub fn evaluate(a2: &Array2<f32>, y: &Array1<usize>) -> Metrics {
    Metrics {
        accuracy: accuracy(a2, y),
        loss: loss(a2, y),
    }
}
