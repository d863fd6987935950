use ndarray::{Array2, Axis};

use super::Parameters;

/// 一次前向传播的全部中间结果，每列对应一个样本
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardIntermediates {
    /// 隐藏层激活前 [hidden, N]
    pub z1: Array2<f32>,
    /// 隐藏层激活后 [hidden, N]
    pub a1: Array2<f32>,
    /// 输出层激活前 [classes, N]
    pub z2: Array2<f32>,
    /// 输出概率 [classes, N]，每列和为1
    pub a2: Array2<f32>,
}

/// 前向传播：Z1 = W1·X + b1，A1 = ReLU(Z1)，Z2 = W2·A1 + b2，A2 = softmax(Z2)
///
/// 偏置按列广播，除此之外不做任何广播；形状不一致会直接panic。
pub fn forward(params: &Parameters, x: &Array2<f32>) -> ForwardIntermediates {
    let z1 = affine(&params.w1, &params.b1, x);
    let a1 = relu(&z1);
    let z2 = affine(&params.w2, &params.b2, &a1);
    let a2 = softmax(&z2);
    ForwardIntermediates { z1, a1, z2, a2 }
}

/// W·X + b，b 为列向量
fn affine(w: &Array2<f32>, b: &Array2<f32>, x: &Array2<f32>) -> Array2<f32> {
    assert_eq!(
        w.ncols(),
        x.nrows(),
        "形状不一致，无法矩阵相乘：权重形状为{:?}，输入形状为{:?}",
        w.dim(),
        x.dim()
    );
    assert_eq!(
        b.dim(),
        (w.nrows(), 1),
        "偏置形状{:?}与权重形状{:?}不匹配",
        b.dim(),
        w.dim()
    );
    w.dot(x) + b
}

/// 逐元素 max(0, z)
pub fn relu(z: &Array2<f32>) -> Array2<f32> {
    z.mapv(|v| v.max(0.0))
}

/// 按列 softmax；每列先减去该列最大值再取指数，避免溢出
pub fn softmax(z: &Array2<f32>) -> Array2<f32> {
    let mut out = z.clone();
    for mut column in out.axis_iter_mut(Axis(1)) {
        let max = column.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
        column.mapv_inplace(|v| (v - max).exp());
        let sum = column.sum();
        column.mapv_inplace(|v| v / sum);
    }
    out
}
