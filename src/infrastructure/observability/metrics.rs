// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::MetricsSettings;
use anyhow::Context;
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::info;

/// 初始化指标系统
///
/// 安装 Prometheus 导出器并注册应用所需的各类监控指标
pub fn init_metrics(settings: &MetricsSettings) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", settings.host, settings.port)
        .parse()
        .context("invalid metrics listener address")?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("failed to install Prometheus recorder")?;

    describe_gauge!(
        "index_insert_queue_length",
        "Pending index records awaiting the write-behind drain"
    );
    describe_gauge!(
        "domain_frequency_queue_length",
        "Pending domain frequency bumps awaiting the write-behind drain"
    );
    describe_gauge!(
        "omce_queue_length",
        "Pending cross-encounter dedup signatures awaiting the write-behind drain"
    );
    describe_counter!(
        "index_records_drained_total",
        "Queued entries successfully written to the durable index"
    );
    describe_counter!(
        "index_records_dropped_total",
        "Queued entries dropped after a failed write"
    );

    info!("metrics exporter listening on {}", addr);
    Ok(())
}
