use ndarray::{Array1, Array2, Axis};

use super::{ForwardIntermediates, Gradients};

/// 将类别索引转换为 one-hot 编码
///
/// # 参数
/// - `labels`: 类别索引，形状 [N]，值为 0..num_classes
/// - `num_classes`: 类别总数（即编码宽度，整个训练过程中固定）
///
/// # 返回
/// one-hot 编码，形状 [num_classes, N]，第 i 列只有第 labels[i] 行为1
pub fn one_hot(labels: &Array1<usize>, num_classes: usize) -> Array2<f32> {
    let mut encoded = Array2::zeros((num_classes, labels.len()));
    for (i, &label) in labels.iter().enumerate() {
        assert!(
            label < num_classes,
            "标签{label}超出类别范围[0, {num_classes})"
        );
        encoded[[label, i]] = 1.0;
    }
    encoded
}

/// 手写反向传播：softmax + 交叉熵经两层"线性 + ReLU"的闭式梯度
///
/// - dZ2 = A2 − one_hot(Y)
/// - dW2 = dZ2·A1ᵀ / N，db2 = rowsum(dZ2) / N
/// - dZ1 = (W2ᵀ·dZ2) ⊙ (A1 > 0)
/// - dW1 = dZ1·Xᵀ / N，db1 = rowsum(dZ1) / N
///
/// ReLU 的导数取自激活后的 A1（与取自 Z1 得到的掩码相同）。
pub fn backward(
    x: &Array2<f32>,
    y: &Array1<usize>,
    w2: &Array2<f32>,
    cache: &ForwardIntermediates,
) -> Gradients {
    let n = x.ncols();
    assert_eq!(
        y.len(),
        n,
        "标签数量{}与样本数量{}不一致",
        y.len(),
        n
    );
    assert_eq!(
        cache.a2.dim(),
        (w2.nrows(), n),
        "输出概率形状{:?}与 W2 形状{:?}不匹配",
        cache.a2.dim(),
        w2.dim()
    );
    let m = n as f32;

    let dz2 = &cache.a2 - &one_hot(y, cache.a2.nrows());
    let dw2 = dz2.dot(&cache.a1.t()) / m;
    let db2 = row_sum(&dz2) / m;

    let relu_mask = cache.a1.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 });
    let dz1 = w2.t().dot(&dz2) * &relu_mask;
    let dw1 = dz1.dot(&x.t()) / m;
    let db1 = row_sum(&dz1) / m;

    Gradients { dw1, db1, dw2, db2 }
}

/// 按行求和并保留列维度：[r, c] -> [r, 1]
fn row_sum(m: &Array2<f32>) -> Array2<f32> {
    m.sum_axis(Axis(1)).insert_axis(Axis(1))
}
