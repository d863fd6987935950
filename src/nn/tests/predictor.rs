use approx::assert_abs_diff_eq;
use image::{DynamicImage, Rgb, RgbImage};
use ndarray::Array2;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::{tiny_config, tiny_params};
use crate::config::NetConfig;
use crate::errors::ModelError;
use crate::nn::{
    LayerDims, MemoryStorage, ParamStorage, Parameters, Predictor, forward, predict,
};
use crate::{assert_err, assert_panic};

fn default_predictor(seed: u64) -> Predictor {
    let config = NetConfig::default();
    let params = Parameters::random(
        LayerDims::from_config(&config),
        &mut StdRng::seed_from_u64(seed),
    );
    Predictor::new(config, params).unwrap()
}

#[test]
fn test_predict_distribution() {
    let predictor = default_predictor(0);
    let feature = Array2::from_shape_fn((784, 1), |(r, _)| (r % 7) as f32 / 7.0);
    let prediction = predictor.predict(&feature);

    assert_eq!(prediction.distribution.len(), 10);
    let total: f32 = prediction.distribution.iter().map(|(_, p)| p).sum();
    assert_abs_diff_eq!(total, 100.0, epsilon = 1e-3);
    for (i, (digit, _)) in prediction.distribution.iter().enumerate() {
        assert_eq!(i, *digit);
    }
    // 置信度即预测类别的概率，且不小于其它类别
    let (_, best) = prediction.distribution[prediction.class];
    assert_eq!(prediction.confidence, best);
    assert!(prediction.distribution.iter().all(|(_, p)| *p <= best));
}

#[test]
fn test_predict_zero_input_is_deterministic() {
    let predictor = default_predictor(3);
    let zeros = Array2::zeros((784, 1));
    let first = predictor.predict(&zeros);
    assert_eq!(first, predictor.predict(&zeros));

    // 全零输入时输出只由偏置决定
    let a2 = forward(predictor.params(), &zeros).a2;
    assert_abs_diff_eq!(first.confidence, a2[[first.class, 0]] * 100.0, epsilon = 1e-4);
}

#[test]
fn test_predict_matches_free_function() {
    let params = tiny_params();
    let feature = ndarray::array![[0.2], [0.9], [0.0], [0.5]];
    let predictor = Predictor::new(tiny_config(), params.clone()).unwrap();
    assert_eq!(predictor.predict(&feature), predict(&params, &feature));
}

#[test]
fn test_predict_rejects_batch_input() {
    let predictor = Predictor::new(tiny_config(), tiny_params()).unwrap();
    assert_panic!(predictor.predict(&Array2::zeros((4, 2))), "单列向量");
}

#[test]
fn test_predictor_checks_dims() {
    assert_err!(
        Predictor::new(NetConfig::default(), tiny_params()),
        ModelError::CorruptOrIncompatibleState(_)
    );
}

#[test]
fn test_predictor_from_storage() {
    let mut storage = MemoryStorage::new();
    let handle = storage.save(&tiny_params()).unwrap();

    let predictor = Predictor::from_storage(tiny_config(), &storage, &handle).unwrap();
    assert_eq!(predictor.params(), &tiny_params());

    assert_err!(
        Predictor::from_storage(tiny_config(), &storage, &7),
        ModelError::CorruptOrIncompatibleState(_)
    );
}

#[test]
fn test_predict_white_image_equals_zero_input() {
    let predictor = default_predictor(5);
    let white = DynamicImage::ImageRgb8(RgbImage::from_pixel(28, 28, Rgb([255, 255, 255])));
    assert_eq!(
        predictor.predict_image(&white),
        predictor.predict(&Array2::zeros((784, 1)))
    );
}
