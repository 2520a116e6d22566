//! Onsite Training - 现场培训中心管理后端
//!
//! 基于 Actix Web 构建，管理学员、课程、报名审批、结业名单与课程评论。
//!
//! # 架构
//! - `config`: 配置管理
//! - `entity`: SeaORM 数据库实体
//! - `errors`: 统一错误处理
//! - `models`: 数据模型定义
//! - `routes`: API 路由层
//! - `runtime`: 运行时生命周期管理
//! - `scheduler`: 后台周期任务
//! - `services`: 业务逻辑层
//! - `storage`: 数据存储层（SeaORM）
//! - `utils`: 工具函数

pub mod config;
pub mod entity;
pub mod errors;
pub mod models;
pub mod routes;
pub mod runtime;
pub mod scheduler;
pub mod services;
pub mod storage;
pub mod utils;
