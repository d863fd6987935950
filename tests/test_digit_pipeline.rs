/*
 * @Description  : 端到端集成测试
 *
 * 在临时目录里生成一份极小的“MNIST”（8x8 图像，4 个类别，
 * 类别 c 的数字是第 2c、2c+1 行的一道横杠），走完整条流水线：
 * 1. 配置从 JSON 文件读取
 * 2. MnistLoader 加载 IDX 文件
 * 3. TrainingLoop 逐步推进，检查点写入文件
 * 4. 保存训练历史图表
 * 5. Predictor 从检查点加载，对白底黑字的图像推理
 */

use std::fs;
use std::path::{Path, PathBuf};

use digit_mlp::config::NetConfig;
use digit_mlp::data::MnistLoader;
use digit_mlp::errors::ModelError;
use digit_mlp::nn::{FileStorage, ParamInit, Predictor, StoppingPolicy, TrainingLoop};
use digit_mlp::vision::Vision;
use image::{DynamicImage, GrayImage, Luma};

const SIDE: usize = 8;
const CLASSES: usize = 4;

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("digit_mlp_it_{name}_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// 黑底白杠的训练图像，杠的亮度随样本序号在 200~255 间变化
fn bar_pixels(label: usize, index: usize) -> Vec<u8> {
    let brightness = 200 + (index * 7 % 56) as u8;
    let mut pixels = vec![0u8; SIDE * SIDE];
    for row in [2 * label, 2 * label + 1] {
        for col in 0..SIDE {
            pixels[row * SIDE + col] = brightness;
        }
    }
    pixels
}

fn write_split(dir: &Path, prefix: &str, count: usize) {
    let mut images = Vec::new();
    images.extend_from_slice(&2051u32.to_be_bytes());
    images.extend_from_slice(&(count as u32).to_be_bytes());
    images.extend_from_slice(&(SIDE as u32).to_be_bytes());
    images.extend_from_slice(&(SIDE as u32).to_be_bytes());

    let mut labels = Vec::new();
    labels.extend_from_slice(&2049u32.to_be_bytes());
    labels.extend_from_slice(&(count as u32).to_be_bytes());

    for i in 0..count {
        let label = i % CLASSES;
        images.extend_from_slice(&bar_pixels(label, i));
        labels.push(label as u8);
    }
    fs::write(dir.join(format!("{prefix}-images-idx3-ubyte")), images).unwrap();
    fs::write(dir.join(format!("{prefix}-labels-idx1-ubyte")), labels).unwrap();
}

fn write_config(dir: &Path) -> PathBuf {
    let json = format!(
        r#"{{
            "image_width": {SIDE},
            "image_height": {SIDE},
            "input_size": {},
            "hidden_size": 16,
            "num_classes": {CLASSES},
            "learning_rate": 0.5,
            "report_interval": 5,
            "checkpoint_path": {:?},
            "chart_path": {:?}
        }}"#,
        SIDE * SIDE,
        dir.join("training").join("params.bin"),
        dir.join("training").join("history.png"),
    );
    let path = dir.join("config.json");
    fs::write(&path, json).unwrap();
    path
}

/// 白底黑杠的待识别图像
fn drawn_digit(label: usize) -> DynamicImage {
    let mut image = GrayImage::from_pixel(SIDE as u32, SIDE as u32, Luma([255]));
    for row in [2 * label, 2 * label + 1] {
        for col in 0..SIDE {
            image.put_pixel(col as u32, row as u32, Luma([0]));
        }
    }
    DynamicImage::ImageLuma8(image)
}

#[test]
fn test_digit_pipeline() -> Result<(), ModelError> {
    let dir = temp_dir("pipeline");

    // ========== 1. 配置与数据 ==========
    let config = NetConfig::from_json_file(write_config(&dir))?;
    assert_eq!(config.input_size, 64);
    assert_eq!(config.pixel_scale, 255.0);

    let data_dir = dir.join("mnist");
    fs::create_dir_all(&data_dir)?;
    write_split(&data_dir, "train", 40);
    write_split(&data_dir, "t10k", 12);
    let dataset = MnistLoader::new(&data_dir).load(&config)?;
    assert_eq!(dataset.train.len(), 40);
    assert_eq!(dataset.test.len(), 12);

    // ========== 2. 训练 ==========
    let storage = FileStorage::from_config(&config);
    let mut training = TrainingLoop::new(
        config.clone(),
        dataset,
        ParamInit::Fresh { seed: Some(42) },
        StoppingPolicy::from_options(None, Some(200))?,
        storage,
    )?;

    let mut reports = 0;
    for snapshot in training.by_ref() {
        let snapshot = snapshot?;
        assert!(snapshot.total >= snapshot.epoch);
        reports += 1;
    }
    // 第0、5、…、195轮各汇报一次，再加上结束时的最终快照
    assert_eq!(reports, 41);
    assert_eq!(training.epoch(), 200);
    assert_eq!(training.history().total_epochs(), Some(200));

    let history = training.history();
    let first = history.record(0);
    let last = history.last_record();
    assert_eq!(last.epoch, 195);
    assert!(last.train_loss < first.train_loss);
    assert!(training.last_train_metrics().unwrap().accuracy >= 0.95);
    assert!(training.last_val_metrics().unwrap().accuracy >= 0.9);

    // ========== 3. 图表 ==========
    Vision::save_history_chart_to_config(history, &config)?;
    assert!(config.chart_path.exists());

    // ========== 4. 从检查点推理 ==========
    let final_params = training.snapshot();
    let (_, storage) = training.into_parts();
    let handle = config.checkpoint_path.clone();
    let predictor = Predictor::from_storage(config.clone(), &storage, &handle)?;
    assert_eq!(predictor.params(), &final_params);

    for label in 0..CLASSES {
        let prediction = predictor.predict_image(&drawn_digit(label));
        assert_eq!(prediction.class, label, "横杠{label}识别错误: {prediction:?}");
        assert!(prediction.confidence > 50.0);
    }

    fs::remove_dir_all(&dir).ok();
    Ok(())
}
