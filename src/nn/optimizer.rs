/*
 * @Description  : 梯度下降参数更新
 *
 * 全批量、固定步长：θ = θ - α * ∇θ。
 * 梯度在反向传播时已经除以样本数，这里不再做任何归一化。
 * 学习率由调用方每步传入，因此按轮调整学习率不需要改动本模块。
 */

use super::{Gradients, Parameters};

/// 对四组参数原地执行一步梯度下降
pub fn step(params: &mut Parameters, grads: &Gradients, learning_rate: f32) {
    update(&mut params.w1, &grads.dw1, learning_rate, "W1");
    update(&mut params.b1, &grads.db1, learning_rate, "b1");
    update(&mut params.w2, &grads.dw2, learning_rate, "W2");
    update(&mut params.b2, &grads.db2, learning_rate, "b2");
}

fn update(
    param: &mut ndarray::Array2<f32>,
    grad: &ndarray::Array2<f32>,
    learning_rate: f32,
    name: &str,
) {
    assert_eq!(
        param.dim(),
        grad.dim(),
        "参数{name}的形状{:?}与梯度形状{:?}不一致",
        param.dim(),
        grad.dim()
    );
    param.scaled_add(-learning_rate, grad);
}
