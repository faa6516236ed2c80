use crate::output::print_json;
use crate::{Context, MonitoringCommands};
use sakpanel::Gateway;
use sakpanel::sakura::QueryRangeParams;

pub async fn handle(gateway: &Gateway, ctx: &Context, cmd: MonitoringCommands) -> anyhow::Result<()> {
    let profile = ctx.profile();
    match cmd {
        MonitoringCommands::Logs => print_json(&gateway.list_log_storages(profile).await?),
        MonitoringCommands::Metrics => print_json(&gateway.list_metrics_storages(profile).await?),
        MonitoringCommands::Traces => print_json(&gateway.list_trace_storages(profile).await?),
        MonitoringCommands::Storage { storage_id } => {
            print_json(&gateway.metrics_storage(profile, &storage_id).await?)
        }
        MonitoringCommands::Keys { storage_id } => {
            print_json(&gateway.metrics_access_keys(profile, &storage_id).await?)
        }
        MonitoringCommands::Labels { storage_id } => {
            print_json(&gateway.metric_labels(profile, &storage_id).await?)
        }
        MonitoringCommands::Query {
            storage_id,
            query,
            start,
            end,
            step,
        } => {
            if end < start {
                anyhow::bail!("--end ({}) が --start ({}) より前です", end, start);
            }
            let params = QueryRangeParams {
                query,
                start,
                end,
                step,
            };
            print_json(&gateway.query_metrics(profile, &storage_id, &params).await?)
        }
        MonitoringCommands::Publishers { storage_id } => {
            print_json(&gateway.metric_publishers(profile, &storage_id).await?)
        }
        MonitoringCommands::PublisherMetrics {
            storage_id,
            publisher,
        } => print_json(
            &gateway
                .metrics_by_publisher(profile, &storage_id, &publisher)
                .await?,
        ),
    }
}
