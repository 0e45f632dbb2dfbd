// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工具模块
///
/// 提供遥测初始化与robots.txt策略等通用工具
pub mod robots;
pub mod telemetry;
