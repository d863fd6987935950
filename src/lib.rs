//! # Digit MLP
//!
//! `digit_mlp`用纯rust实现一个识别手写数字（[MNIST](http://yann.lecun.com/exdb/mnist/)）的
//! 单隐藏层前馈网络：随机初始化、前向传播、手写反向传播、全批量梯度下降，
//! 以及可逐步推进的训练循环、检查点、训练历史和单张图像的推理。
//!
//! 数值核心直接基于`ndarray`的二维数组，列为样本、行为特征。
//!

pub mod config;
pub mod data;
pub mod errors;
pub mod nn;
pub mod utils;
pub mod vision;
