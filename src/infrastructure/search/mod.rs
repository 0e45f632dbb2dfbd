// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 搜索服务模块
///
/// 提供外部搜索源的HTTP客户端实现
pub mod websearch;

pub use websearch::WebSearchSource;
