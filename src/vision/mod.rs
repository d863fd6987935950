/*
 * @Description  : 本模块提供与图像相关的功能：
 *                 1. 把任意尺寸的手写数字图像预处理为网络的输入列向量；
 *                 2. 把训练历史绘制为图表保存到本地。
 *                 “灰度”（图）等同于英文中luma、luminance、grey、gray的概念。
 */

use std::path::Path;

use image::DynamicImage;
use image::imageops::FilterType;
use ndarray::{Array1, Array2, Axis};

use crate::config::NetConfig;
use crate::errors::ModelError;

mod chart;


pub struct Vision;

impl Vision {
    /// 把一张图像转为 [width * height, 1] 的特征列向量
    ///
    /// 依次：缩放到配置的宽高（双线性）-> 转灰度 -> 除以像素缩放因子 -> 反色(1 - x)。
    /// 白底黑字的输入由此变为与 MNIST 一致的黑底白字。
    pub fn prepare_digit(image: &DynamicImage, config: &NetConfig) -> Array2<f32> {
        let gray = image
            .resize_exact(
                config.image_width as u32,
                config.image_height as u32,
                FilterType::Triangle,
            )
            .to_luma8();
        // 像素按行优先展开，与 IDX 文件中的顺序一致
        let values: Array1<f32> = gray
            .pixels()
            .map(|p| 1.0 - p.0[0] as f32 / config.pixel_scale)
            .collect();
        values.insert_axis(Axis(1))
    }

    /// 从本地加载图像并预处理
    pub fn load_digit<P: AsRef<Path>>(
        path: P,
        config: &NetConfig,
    ) -> Result<Array2<f32>, ModelError> {
        let image = image::open(path)?;
        Ok(Self::prepare_digit(&image, config))
    }
}
