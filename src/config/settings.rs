// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::services::index_query::IndexCapability;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// 应用程序配置设置
///
/// 包含数据库、Redis、索引、搜索和指标等所有配置项
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// 数据库配置
    pub database: DatabaseSettings,
    /// Redis配置
    pub redis: RedisSettings,
    /// 索引配置
    pub index: IndexSettings,
    /// 搜索源配置
    pub search: SearchSettings,
    /// 指标导出配置
    pub metrics: MetricsSettings,
    /// 写回工作器配置
    pub worker: WorkerSettings,
}

/// 数据库配置设置
#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
}

/// Redis配置设置
#[derive(Debug, Deserialize)]
pub struct RedisSettings {
    /// Redis连接URL
    pub url: String,
}

/// 索引配置设置
#[derive(Debug, Deserialize)]
pub struct IndexSettings {
    /// 是否启用持久索引
    pub enabled: bool,
    /// 仅写入模式（不提供读取）
    pub write_only: bool,
}

impl IndexSettings {
    pub fn capability(&self) -> IndexCapability {
        IndexCapability {
            enabled: self.enabled,
            write_only: self.write_only,
        }
    }
}

/// 搜索源配置设置
#[derive(Debug, Deserialize)]
pub struct SearchSettings {
    /// 搜索服务端点
    pub endpoint: String,
    /// API 密钥（可选）
    pub api_key: Option<String>,
    /// 单次请求超时时间（秒）
    pub timeout: Option<u64>,
}

/// 指标导出配置设置
#[derive(Debug, Deserialize)]
pub struct MetricsSettings {
    /// Prometheus 导出器监听主机地址
    pub host: String,
    /// Prometheus 导出器监听端口
    pub port: u16,
}

/// 写回工作器配置设置
#[derive(Debug, Deserialize)]
pub struct WorkerSettings {
    /// 清空周期（秒）
    pub interval: u64,
    /// 单次写入批量大小
    pub batch_size: usize,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从环境变量加载配置，支持默认值
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            // Default DB pool settings
            .set_default("database.max_connections", 100)?
            .set_default("database.min_connections", 10)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            // Default index capability: reads and writes both on
            .set_default("index.enabled", true)?
            .set_default("index.write_only", false)?
            // Default search source settings
            .set_default("search.endpoint", "http://localhost:3002/v1/search")?
            .set_default("search.timeout", 30)?
            // Default metrics exporter settings
            .set_default("metrics.host", "0.0.0.0")?
            .set_default("metrics.port", 9090)?
            // Default write-behind worker settings
            .set_default("worker.interval", 5)?
            .set_default("worker.batch_size", 1000)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("MAPRS").separator("__"));

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_everything_but_connection_urls() {
        std::env::set_var("MAPRS__DATABASE__URL", "postgres://localhost/maprs");
        std::env::set_var("MAPRS__REDIS__URL", "redis://localhost:6379");

        let settings = Settings::new().expect("settings should load from defaults");
        assert!(settings.index.capability().serves_reads());
        assert_eq!(settings.worker.interval, 5);
        assert_eq!(settings.worker.batch_size, 1000);
        assert_eq!(settings.metrics.port, 9090);
    }

    #[test]
    fn test_write_only_capability_disables_reads() {
        let capability = IndexSettings {
            enabled: true,
            write_only: true,
        }
        .capability();
        assert!(!capability.serves_reads());
    }
}
