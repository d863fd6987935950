mod predictor;

use ndarray::{Array1, Array2, array};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::NetConfig;
use crate::data::{Dataset, LabeledSet};
use crate::nn::Parameters;

/// 4 输入、3 隐藏、3 类别的小网络配置
fn tiny_config() -> NetConfig {
    NetConfig {
        image_width: 2,
        image_height: 2,
        input_size: 4,
        hidden_size: 3,
        num_classes: 3,
        ..NetConfig::default()
    }
}

/// 手工挑选的小网络参数：隐藏层激活前的值离0足够远，
/// 数值微分时不会跨过 ReLU 的拐点；第1个隐藏单元恒为负（恒不激活）
fn tiny_params() -> Parameters {
    Parameters {
        w1: array![
            [0.1, -0.1, 0.05, 0.1],
            [-0.1, 0.1, 0.1, -0.05],
            [0.05, 0.05, -0.1, 0.1]
        ],
        b1: array![[1.0], [-1.0], [0.5]],
        w2: array![[0.2, -0.3, 0.1], [-0.1, 0.4, 0.2], [0.3, 0.1, -0.2]],
        b2: array![[0.0], [0.1], [-0.1]],
    }
}

/// 与[`tiny_params`]配套的 3 个样本
fn tiny_batch() -> (Array2<f32>, Array1<usize>) {
    let x = array![
        [0.2, 1.0, 0.4],
        [0.9, 0.1, 0.4],
        [0.0, 0.3, 0.8],
        [0.5, 0.7, 0.0]
    ];
    (x, array![0, 2, 1])
}

/// 线性可分的合成数据：类别 c 的样本在第 c 段像素上取高值，其余位置为小噪声
fn separable_set(config: &NetConfig, samples: usize, seed: u64) -> LabeledSet {
    let mut rng = StdRng::seed_from_u64(seed);
    let block = config.input_size / config.num_classes;
    let labels: Array1<usize> = (0..samples).map(|i| i % config.num_classes).collect();
    let features = Array2::from_shape_fn((config.input_size, samples), |(row, col)| {
        let noise: f32 = rng.gen_range(0.0..0.1);
        if row / block == labels[col] {
            0.8 + noise
        } else {
            noise
        }
    });
    LabeledSet::new(features, labels, config.input_size, config.num_classes).unwrap()
}

fn separable_dataset(config: &NetConfig, train: usize, test: usize) -> Dataset {
    Dataset::new(
        separable_set(config, train, 1),
        separable_set(config, test, 2),
    )
}
