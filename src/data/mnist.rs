//! MNIST 手写数字数据集（本地 IDX 文件）
//!
//! 支持：
//! - IDX 二进制格式解析（支持 .gz 压缩）
//! - 像素归一化 (0-255 → 0-1)
//! - 按列排布：特征矩阵形状为 [784, N]

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use ndarray::{Array1, Array2};

use super::{DataError, Dataset, LabeledSet};
use crate::config::NetConfig;

const IMAGES_MAGIC: u32 = 2051;
const LABELS_MAGIC: u32 = 2049;

/// 从目录加载 MNIST 的训练集与测试集
///
/// 目录中须有以下四个文件（可带 `.gz` 后缀）：
/// `train-images-idx3-ubyte`、`train-labels-idx1-ubyte`、
/// `t10k-images-idx3-ubyte`、`t10k-labels-idx1-ubyte`
#[derive(Debug, Clone)]
pub struct MnistLoader {
    root: PathBuf,
}

impl MnistLoader {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// 加载训练集(60000)与测试集(10000)，像素除以`config.pixel_scale`
    pub fn load(&self, config: &NetConfig) -> Result<Dataset, DataError> {
        let train = self.load_split("train", config)?;
        let test = self.load_split("t10k", config)?;
        log::info!(
            "MNIST 加载完成：训练集 {} 样本，测试集 {} 样本",
            train.len(),
            test.len()
        );
        Ok(Dataset::new(train, test))
    }

    fn load_split(&self, prefix: &str, config: &NetConfig) -> Result<LabeledSet, DataError> {
        let images_path = find_file(&self.root, &format!("{prefix}-images-idx3-ubyte"))?;
        let labels_path = find_file(&self.root, &format!("{prefix}-labels-idx1-ubyte"))?;

        let (count, pixels) = parse_idx_images(&images_path, config)?;
        let labels = parse_idx_labels(&labels_path)?;
        if labels.len() != count {
            return Err(DataError::ShapeMismatch {
                expected: vec![count],
                got: vec![labels.len()],
            });
        }

        let features = to_feature_matrix(&pixels, count, config.input_size, config.pixel_scale)?;
        let labels = Array1::from_vec(labels.into_iter().map(usize::from).collect());
        LabeledSet::new(features, labels, config.input_size, config.num_classes)
    }
}

/// 把按样本连续存放的像素 [N * input_size] 转成归一化的 [input_size, N]
pub(crate) fn to_feature_matrix(
    pixels: &[u8],
    count: usize,
    input_size: usize,
    scale: f32,
) -> Result<Array2<f32>, DataError> {
    let data: Vec<f32> = pixels.iter().map(|&p| p as f32 / scale).collect();
    let by_sample = Array2::from_shape_vec((count, input_size), data).map_err(|_| {
        DataError::ShapeMismatch {
            expected: vec![count * input_size],
            got: vec![pixels.len()],
        }
    })?;
    Ok(by_sample.reversed_axes().as_standard_layout().into_owned())
}

/// 优先使用解压后的文件，其次是 .gz 文件
fn find_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataError> {
    let uncompressed_path = dir.join(base_name);
    if uncompressed_path.exists() {
        return Ok(uncompressed_path);
    }
    let gz_path = dir.join(format!("{base_name}.gz"));
    if gz_path.exists() {
        return Ok(gz_path);
    }
    Err(DataError::FileNotFound(uncompressed_path))
}

fn open_reader(path: &Path) -> Result<Box<dyn Read>, DataError> {
    let file = File::open(path).map_err(|_| DataError::FileNotFound(path.to_path_buf()))?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(GzDecoder::new(BufReader::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

fn read_u32_be(reader: &mut dyn Read, what: &str) -> Result<u32, DataError> {
    let mut bytes = [0u8; 4];
    reader
        .read_exact(&mut bytes)
        .map_err(|e| DataError::FormatError(format!("读取{what}失败: {e}")))?;
    Ok(u32::from_be_bytes(bytes))
}

/// 解析 IDX 图像文件
///
/// IDX 格式：
/// - [0-3] magic number (0x00000803 = 2051)
/// - [4-7] number of images
/// - [8-11] number of rows
/// - [12-15] number of columns
/// - [16+] pixel data (unsigned byte)
pub(crate) fn parse_idx_images(
    path: &Path,
    config: &NetConfig,
) -> Result<(usize, Vec<u8>), DataError> {
    let mut reader = open_reader(path)?;

    let magic = read_u32_be(&mut reader, "magic number")?;
    if magic != IMAGES_MAGIC {
        return Err(DataError::FormatError(format!(
            "无效的 magic number: {magic} (期望 {IMAGES_MAGIC})"
        )));
    }
    let num_images = read_u32_be(&mut reader, "图像数量")? as usize;
    let num_rows = read_u32_be(&mut reader, "行数")? as usize;
    let num_cols = read_u32_be(&mut reader, "列数")? as usize;

    if num_rows != config.image_height || num_cols != config.image_width {
        return Err(DataError::FormatError(format!(
            "无效的图像尺寸: {}x{} (期望 {}x{})",
            num_rows, num_cols, config.image_height, config.image_width
        )));
    }

    let mut pixels = vec![0u8; num_images * num_rows * num_cols];
    reader
        .read_exact(&mut pixels)
        .map_err(|e| DataError::FormatError(format!("读取像素数据失败: {e}")))?;

    Ok((num_images, pixels))
}

/// 解析 IDX 标签文件
///
/// IDX 格式：
/// - [0-3] magic number (0x00000801 = 2049)
/// - [4-7] number of labels
/// - [8+] label data (unsigned byte, 0-9)
pub(crate) fn parse_idx_labels(path: &Path) -> Result<Vec<u8>, DataError> {
    let mut reader = open_reader(path)?;

    let magic = read_u32_be(&mut reader, "magic number")?;
    if magic != LABELS_MAGIC {
        return Err(DataError::FormatError(format!(
            "无效的 magic number: {magic} (期望 {LABELS_MAGIC})"
        )));
    }
    let num_labels = read_u32_be(&mut reader, "标签数量")? as usize;

    let mut labels = vec![0u8; num_labels];
    reader
        .read_exact(&mut labels)
        .map_err(|e| DataError::FormatError(format!("读取标签数据失败: {e}")))?;

    Ok(labels)
}
