// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 该模块包含系统的技术实现细节，提供对具体技术的抽象和封装。
/// 基础设施层负责与外部系统的交互，包括数据库、缓存和外部搜索服务。
///
/// 包含的子模块：
/// - 缓存（cache）：Redis客户端与地图结果缓存实现
/// - 数据库（database）：数据库连接和实体映射
/// - 可观测性（observability）：Prometheus 指标导出
/// - 仓库实现（repositories）：领域仓库接口的具体实现
/// - 搜索（search）：外部搜索源的HTTP客户端
/// - 站点地图（sitemap）：HTTP站点地图抓取
///
/// 基础设施层遵循依赖倒置原则，依赖于领域层的抽象接口，
/// 确保领域层保持纯粹的业务逻辑，不受技术实现的影响。
pub mod cache;
pub mod database;
pub mod observability;
pub mod repositories;
pub mod search;
pub mod sitemap;
