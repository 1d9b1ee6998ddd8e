//! 卷的布局
//!
//! 启动扇区 | FAT区（若干副本） | 根目录 | 数据区

pub mod data;
pub mod fat;
pub mod reserved;

/// 目录项的字节数
pub const DIR_ENTRY_BYTES: usize = 32;
