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

use maprs::config::settings::Settings;
use maprs::infrastructure::cache::redis_client::RedisClient;
use maprs::infrastructure::database::connection;
use maprs::infrastructure::observability::metrics;
use maprs::infrastructure::repositories::index_repo_impl::IndexRepositoryImpl;
use maprs::queue::insert_queue::InsertQueue;
use maprs::utils::telemetry;
use maprs::workers::index_worker::IndexWorker;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// 主函数
///
/// 应用程序入口点，启动索引写回工作器
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting maprs...");

    // 2. Load configuration
    let settings = Arc::new(Settings::new()?);
    info!("Configuration loaded");

    // 3. Initialize Prometheus Metrics
    metrics::init_metrics(&settings.metrics)?;

    // 4. Connect to database
    let db = Arc::new(connection::create_pool(&settings.database).await?);
    info!("Database connection established");

    // 5. Initialize Redis Client
    let redis_client = Arc::new(RedisClient::new(&settings.redis.url).await?);
    info!("Redis client initialized");

    // 6. Start the write-behind drain worker
    let queue = InsertQueue::new(redis_client);
    let repository = Arc::new(IndexRepositoryImpl::new(db));
    let shutdown = CancellationToken::new();
    let worker = IndexWorker::new(queue, repository).with_schedule(
        Duration::from_secs(settings.worker.interval),
        settings.worker.batch_size,
    );
    let handle = worker.start(shutdown.clone());

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");
    shutdown.cancel();
    handle.await?;

    Ok(())
}
