//! 训练历史图表：左侧为准确率，右侧为损失，
//! 每个面板内蓝线为训练集、橙线为验证集。

use std::path::Path;

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

use super::Vision;
use crate::config::NetConfig;
use crate::errors::ModelError;
use crate::nn::TrainingHistory;

const PANEL_WIDTH: u32 = 400;
const PANEL_HEIGHT: u32 = 300;
const MARGIN: u32 = 30;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const FRAME: Rgb<u8> = Rgb([0, 0, 0]);
const TRAIN_COLOR: Rgb<u8> = Rgb([31, 119, 180]);
const VAL_COLOR: Rgb<u8> = Rgb([255, 127, 14]);

/// 一个面板的绘图区域（像素坐标）
#[derive(Debug, Clone, Copy)]
struct PlotArea {
    left: f32,
    top: f32,
    width: f32,
    height: f32,
}

impl PlotArea {
    fn of_panel(index: u32) -> Self {
        Self {
            left: (index * PANEL_WIDTH + MARGIN) as f32,
            top: MARGIN as f32,
            width: (PANEL_WIDTH - 2 * MARGIN) as f32,
            height: (PANEL_HEIGHT - 2 * MARGIN) as f32,
        }
    }

    fn frame(&self) -> Rect {
        Rect::at(self.left as i32, self.top as i32)
            .of_size(self.width as u32 + 1, self.height as u32 + 1)
    }

    /// 把 (x, y) 从数据坐标映射到像素坐标；y 轴向上
    fn project(&self, x: f32, x_range: (f32, f32), y: f32, y_max: f32) -> (f32, f32) {
        let x_span = (x_range.1 - x_range.0).max(1.0);
        let px = self.left + (x - x_range.0) / x_span * self.width;
        let py = self.top + self.height * (1.0 - (y / y_max).clamp(0.0, 1.0));
        (px, py)
    }
}

impl Vision {
    /// 把训练历史绘制为两面板的图表
    pub fn render_history_chart(history: &TrainingHistory) -> RgbImage {
        let mut canvas = RgbImage::from_pixel(2 * PANEL_WIDTH, PANEL_HEIGHT, BACKGROUND);
        let series = history.series();

        let x_range = match (series.epochs.first(), series.epochs.last()) {
            (Some(&first), Some(&last)) => (first as f32, last as f32),
            _ => (0.0, 1.0),
        };
        // 损失可能出现 inf，只按有限值确定纵轴上限
        let loss_max = series
            .train_loss
            .iter()
            .chain(&series.val_loss)
            .copied()
            .filter(|v| v.is_finite())
            .fold(0.0_f32, f32::max)
            .max(f32::EPSILON);

        let panels = [
            (
                PlotArea::of_panel(0),
                1.0,
                [&series.train_accuracy, &series.val_accuracy],
            ),
            (
                PlotArea::of_panel(1),
                loss_max,
                [&series.train_loss, &series.val_loss],
            ),
        ];
        for (area, y_max, [train, val]) in panels {
            draw_hollow_rect_mut(&mut canvas, area.frame(), FRAME);
            for (values, color) in [(train, TRAIN_COLOR), (val, VAL_COLOR)] {
                let points: Vec<(f32, f32)> = series
                    .epochs
                    .iter()
                    .zip(values.iter())
                    .filter(|(_, v)| v.is_finite())
                    .map(|(&epoch, &v)| area.project(epoch as f32, x_range, v, y_max))
                    .collect();
                draw_series(&mut canvas, &points, color);
            }
        }
        canvas
    }

    /// 绘制并保存训练历史图表，图像格式由扩展名决定
    pub fn save_history_chart<P: AsRef<Path>>(
        history: &TrainingHistory,
        path: P,
    ) -> Result<(), ModelError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Self::render_history_chart(history).save(path)?;
        log::info!("训练历史图表已保存到 {path:?}");
        Ok(())
    }

    /// 保存到配置中的图表路径
    pub fn save_history_chart_to_config(
        history: &TrainingHistory,
        config: &NetConfig,
    ) -> Result<(), ModelError> {
        Self::save_history_chart(history, &config.chart_path)
    }
}

fn draw_series(canvas: &mut RgbImage, points: &[(f32, f32)], color: Rgb<u8>) {
    for pair in points.windows(2) {
        draw_line_segment_mut(canvas, pair[0], pair[1], color);
    }
    // 每个点画一个小方块，只有一个点时也能看到
    for &(x, y) in points {
        let marker = Rect::at(x as i32 - 1, y as i32 - 1).of_size(3, 3);
        draw_filled_rect_mut(canvas, marker, color);
    }
}
