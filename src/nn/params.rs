/*
 * @Description  : 网络参数（W1、b1、W2、b2）及其梯度、随机初始化与二进制编解码
 *
 * 参数组以"命名矩阵组"的形式整体编码：
 * - [0-3]  魔数 `DGMP`
 * - [4-7]  版本号（小端 u32）
 * - [8+]   bincode 编码的 { 名称 -> 矩阵 }
 * 解码要么得到完整一致的四个矩阵，要么报错，不存在部分恢复。
 */

use std::collections::BTreeMap;
use std::f32::consts::PI;

use ndarray::Array2;
use rand::Rng;
use rand::distributions::Open01;

use crate::config::NetConfig;
use crate::errors::ModelError;

/// 参数文件魔数
const PARAMS_MAGIC: &[u8; 4] = b"DGMP";
/// 参数文件版本
const PARAMS_VERSION: u32 = 1;

const PARAM_NAMES: [&str; 4] = ["W1", "b1", "W2", "b2"];

/// 各层的维度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerDims {
    pub input_size: usize,
    pub hidden_size: usize,
    pub num_classes: usize,
}

impl LayerDims {
    pub fn from_config(config: &NetConfig) -> Self {
        Self {
            input_size: config.input_size,
            hidden_size: config.hidden_size,
            num_classes: config.num_classes,
        }
    }

    /// 按 W1、b1、W2、b2 的顺序给出期望形状
    fn shapes(&self) -> [(usize, usize); 4] {
        [
            (self.hidden_size, self.input_size),
            (self.hidden_size, 1),
            (self.num_classes, self.hidden_size),
            (self.num_classes, 1),
        ]
    }
}

/// 单隐藏层网络的全部参数
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    /// [hidden, input]
    pub w1: Array2<f32>,
    /// [hidden, 1]
    pub b1: Array2<f32>,
    /// [classes, hidden]
    pub w2: Array2<f32>,
    /// [classes, 1]
    pub b2: Array2<f32>,
}

/// 与[`Parameters`]一一对应的梯度
#[derive(Debug, Clone, PartialEq)]
pub struct Gradients {
    pub dw1: Array2<f32>,
    pub db1: Array2<f32>,
    pub dw2: Array2<f32>,
    pub db2: Array2<f32>,
}

impl Parameters {
    /// 全零参数，主要用于测试
    pub fn zeros(dims: LayerDims) -> Self {
        let [w1, b1, w2, b2] = dims.shapes();
        Self {
            w1: Array2::zeros(w1),
            b1: Array2::zeros(b1),
            w2: Array2::zeros(w2),
            b2: Array2::zeros(b2),
        }
    }

    /// 每个元素独立采样自标准正态分布，再乘以所在层扇入的平方根倒数：
    /// W1、b1 乘以 1/√input，W2、b2 乘以 1/√hidden
    pub fn random<R: Rng>(dims: LayerDims, rng: &mut R) -> Self {
        let input_scale = 1.0 / (dims.input_size as f32).sqrt();
        let hidden_scale = 1.0 / (dims.hidden_size as f32).sqrt();
        let [w1, b1, w2, b2] = dims.shapes();

        let mut normal = StandardNormal::new(rng);
        Self {
            w1: normal.matrix(w1, input_scale),
            b1: normal.matrix(b1, input_scale),
            w2: normal.matrix(w2, hidden_scale),
            b2: normal.matrix(b2, hidden_scale),
        }
    }

    pub fn dims(&self) -> LayerDims {
        LayerDims {
            input_size: self.w1.ncols(),
            hidden_size: self.w1.nrows(),
            num_classes: self.w2.nrows(),
        }
    }

    /// 编码为带魔数与版本号的二进制块
    pub fn to_bytes(&self) -> Result<Vec<u8>, ModelError> {
        let group: BTreeMap<&str, &Array2<f32>> = PARAM_NAMES
            .into_iter()
            .zip([&self.w1, &self.b1, &self.w2, &self.b2])
            .collect();
        let body = bincode::serialize(&group)
            .map_err(|e| ModelError::CorruptOrIncompatibleState(format!("参数编码失败: {e}")))?;

        let mut bytes = Vec::with_capacity(8 + body.len());
        bytes.extend_from_slice(PARAMS_MAGIC);
        bytes.extend_from_slice(&PARAMS_VERSION.to_le_bytes());
        bytes.extend_from_slice(&body);
        Ok(bytes)
    }

    /// 从[`Parameters::to_bytes`]产生的二进制块解码
    ///
    /// 魔数、版本、编码、名称集合、矩阵形状间的一致性任一不符，
    /// 都返回`CorruptOrIncompatibleState`。
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ModelError> {
        let corrupt = |msg: String| ModelError::CorruptOrIncompatibleState(msg);

        if bytes.len() < 8 || &bytes[..4] != PARAMS_MAGIC {
            return Err(corrupt("无效的参数块：魔数不符".to_string()));
        }
        let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        if version != PARAMS_VERSION {
            return Err(corrupt(format!("不支持的参数块版本: {version}")));
        }

        let mut group: BTreeMap<String, Array2<f32>> = bincode::deserialize(&bytes[8..])
            .map_err(|e| corrupt(format!("参数块解码失败: {e}")))?;

        let mut take = |name: &str| {
            group
                .remove(name)
                .ok_or_else(|| corrupt(format!("参数块缺少矩阵 {name}")))
        };
        let params = Self {
            w1: take("W1")?,
            b1: take("b1")?,
            w2: take("W2")?,
            b2: take("b2")?,
        };
        if let Some(extra) = group.keys().next() {
            return Err(corrupt(format!("参数块含有多余的矩阵 {extra}")));
        }

        params.check_dims(params.dims())?;
        Ok(params)
    }

    /// 检查四个矩阵的形状与`dims`完全一致
    pub fn check_dims(&self, dims: LayerDims) -> Result<(), ModelError> {
        let actual = [&self.w1, &self.b1, &self.w2, &self.b2];
        for ((name, matrix), expected) in PARAM_NAMES.iter().zip(actual).zip(dims.shapes()) {
            if matrix.dim() != expected {
                return Err(ModelError::CorruptOrIncompatibleState(format!(
                    "矩阵 {name} 的形状为{:?}，期望{:?}",
                    matrix.dim(),
                    expected
                )));
            }
        }
        Ok(())
    }
}

/// 参数的唯一持有者：负责初始化、恢复与快照
#[derive(Debug, Clone)]
pub struct ParameterStore {
    dims: LayerDims,
    params: Parameters,
}

impl ParameterStore {
    /// 以随机参数创建
    pub fn new_random<R: Rng>(config: &NetConfig, rng: &mut R) -> Self {
        let dims = LayerDims::from_config(config);
        Self {
            dims,
            params: Parameters::random(dims, rng),
        }
    }

    /// 以已有参数创建，形状须与配置一致
    pub fn from_params(config: &NetConfig, params: Parameters) -> Result<Self, ModelError> {
        let dims = LayerDims::from_config(config);
        params.check_dims(dims)?;
        Ok(Self { dims, params })
    }

    /// 丢弃当前参数，重新随机初始化
    pub fn initialize<R: Rng>(&mut self, rng: &mut R) -> &Parameters {
        self.params = Parameters::random(self.dims, rng);
        &self.params
    }

    /// 从二进制块恢复；失败时当前参数保持不变
    pub fn restore(&mut self, blob: &[u8]) -> Result<(), ModelError> {
        let params = Parameters::from_bytes(blob)?;
        self.restore_params(params)
    }

    /// 用一组已解码的参数整体替换当前参数；失败时当前参数保持不变
    pub fn restore_params(&mut self, params: Parameters) -> Result<(), ModelError> {
        params.check_dims(self.dims)?;
        self.params = params;
        Ok(())
    }

    /// 深拷贝当前参数，之后的优化步骤不会影响返回值
    pub fn snapshot(&self) -> Parameters {
        self.params.clone()
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    pub fn dims(&self) -> LayerDims {
        self.dims
    }
}

/// Box-Muller 变换采样标准正态分布，成对生成、缓存第二个值
struct StandardNormal<'a, R> {
    rng: &'a mut R,
    spare: Option<f32>,
}

impl<'a, R: Rng> StandardNormal<'a, R> {
    fn new(rng: &'a mut R) -> Self {
        Self { rng, spare: None }
    }

    fn sample(&mut self) -> f32 {
        if let Some(z1) = self.spare.take() {
            return z1;
        }
        // Open01 保证 u1 > 0，ln 不会发散
        let u1: f32 = self.rng.sample(Open01);
        let u2: f32 = self.rng.sample(Open01);
        let r = (-2.0 * u1.ln()).sqrt();
        let theta = 2.0 * PI * u2;
        self.spare = Some(r * theta.sin());
        r * theta.cos()
    }

    fn matrix(&mut self, shape: (usize, usize), scale: f32) -> Array2<f32> {
        Array2::from_shape_simple_fn(shape, || self.sample() * scale)
    }
}
