// ==========================================
// 小微企业 ERP - Tauri 命令（按域拆分）
// ==========================================
// 职责: Tauri 命令定义，连接前端与后端 API
// 每个命令都返回 ApiResponse 信封的 JSON 文本
// ==========================================

#![cfg(feature = "tauri-app")]

mod bom;
mod common;
mod config;
mod exchange;
mod finance;
mod inventory;
mod production;
mod report;
mod sales;

pub use bom::*;
pub use config::*;
pub use exchange::*;
pub use finance::*;
pub use inventory::*;
pub use production::*;
pub use report::*;
pub use sales::*;
