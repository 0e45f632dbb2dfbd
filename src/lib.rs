// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 包含地图解析编排用例和请求DTO
pub mod application;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含URL规范化、索引查询、相关性排序等核心业务逻辑
pub mod domain;

/// 基础设施模块
///
/// 提供外部服务集成，如数据库、缓存、搜索源等
pub mod infrastructure;

/// 队列模块
///
/// 实现写回插入队列
pub mod queue;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;

/// 工作器模块
///
/// 实现后台队列清空处理
pub mod workers;
