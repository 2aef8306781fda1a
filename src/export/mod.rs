//! # 导出模块
//!
//! 将筛选后的激发态渲染为各种输出格式。
//!
//! ## 子模块
//! - `table`: 共用的单元格格式
//! - `text`: 终端/纯文本表格 (pretty, raw, booktabs, tiddly, summary)
//! - `csv`: CSV 读写
//! - `docx`: Word 文档（`docx` feature）
//! - `html`: 带 NTO 图片的 HTML 报告
//!
//! ## 依赖关系
//! - 被 `commands/show.rs`, `commands/export.rs` 使用
//! - 使用 `models/`, `parsers/mo_labels.rs`

pub mod csv;
pub mod docx;
pub mod html;
pub mod table;
pub mod text;
