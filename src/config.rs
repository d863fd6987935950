/*
 * @Description  : 网络与训练的不可变配置
 *
 * 图像尺寸、像素缩放因子、学习率、汇报间隔和各类输出路径都集中在这里，
 * 构造各组件时显式传入，不使用进程级的全局常量。
 */

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::ModelError;


/// 网络与训练配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetConfig {
    /// 输入图像宽度（像素）
    pub image_width: usize,
    /// 输入图像高度（像素）
    pub image_height: usize,
    /// 输入层神经元个数，须等于`image_width * image_height`
    pub input_size: usize,
    /// 隐藏层神经元个数
    pub hidden_size: usize,
    /// 输出类别数
    pub num_classes: usize,
    /// 像素归一化的除数
    pub pixel_scale: f32,
    pub learning_rate: f32,
    /// 每隔多少轮记录一次历史、保存一次检查点
    pub report_interval: u32,
    pub checkpoint_path: PathBuf,
    pub chart_path: PathBuf,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            image_width: 28,
            image_height: 28,
            input_size: 28 * 28,
            hidden_size: 10,
            num_classes: 10,
            pixel_scale: 255.0,
            learning_rate: 0.15,
            report_interval: 10,
            checkpoint_path: Path::new("training").join("trained_params.bin"),
            chart_path: Path::new("training").join("training_history.png"),
        }
    }
}

impl NetConfig {
    /// 从JSON字符串解析配置，缺省字段取默认值
    pub fn from_json_str(json: &str) -> Result<Self, ModelError> {
        let config: NetConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 从本地JSON文件加载配置
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// 检查配置自洽
    pub fn validate(&self) -> Result<(), ModelError> {
        let invalid = |msg: String| Err(ModelError::InvalidTrainingConfiguration(msg));

        if self.image_width == 0 || self.image_height == 0 {
            return invalid(format!(
                "图像尺寸须大于0，当前为{}x{}",
                self.image_width, self.image_height
            ));
        }
        if self.input_size != self.image_width * self.image_height {
            return invalid(format!(
                "输入层大小{}与图像尺寸{}x{}不符",
                self.input_size, self.image_width, self.image_height
            ));
        }
        if self.hidden_size == 0 || self.num_classes == 0 {
            return invalid("隐藏层大小和类别数须大于0".to_string());
        }
        if !(self.pixel_scale > 0.0) {
            return invalid(format!("像素缩放因子须>0，当前为{}", self.pixel_scale));
        }
        if !(self.learning_rate > 0.0) || !self.learning_rate.is_finite() {
            return invalid(format!("学习率须为正数，当前为{}", self.learning_rate));
        }
        if self.report_interval == 0 {
            return invalid("汇报间隔须大于0".to_string());
        }
        Ok(())
    }
}
