//! # 常用接口模块
//!
//! 本模块提供单元测试与集成测试共用的断言宏

pub mod macro_for_unit_test;
