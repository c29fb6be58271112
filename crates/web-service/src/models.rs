//! 接口数据模型

pub mod admin;
pub mod collections;
pub mod common;
pub mod err;
pub mod sandbox;
pub mod upload;
