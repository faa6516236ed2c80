use crate::output::{print_done, print_json};
use crate::{
    BillCommands, ContainerRegistryCommands, Context, ItemCommands, ProxyLbCommands,
    ServerCommands,
};
use sakpanel::Gateway;

pub async fn handle_server(gateway: &Gateway, ctx: &Context, cmd: ServerCommands) -> anyhow::Result<()> {
    let (profile, zone) = (ctx.profile(), ctx.zone());
    match cmd {
        ServerCommands::List => print_json(&gateway.list_servers(profile, zone).await?),
        ServerCommands::Get { id } => print_json(&gateway.get_server(profile, zone, &id).await?),
        ServerCommands::Status { id } => {
            print_json(&gateway.server_status(profile, zone, &id).await?)
        }
        ServerCommands::PowerOn { id } => {
            gateway.power_on_server(profile, zone, &id).await?;
            print_done(&format!("サーバー {} を起動しました", id))
        }
        ServerCommands::PowerOff { id } => {
            gateway.power_off_server(profile, zone, &id).await?;
            print_done(&format!("サーバー {} にシャットダウンを要求しました", id))
        }
        ServerCommands::ForceStop { id } => {
            gateway.force_stop_server(profile, zone, &id).await?;
            print_done(&format!("サーバー {} を強制停止しました", id))
        }
    }
}

pub async fn handle_switch(gateway: &Gateway, ctx: &Context, cmd: ItemCommands) -> anyhow::Result<()> {
    match cmd {
        ItemCommands::List => print_json(&gateway.list_switches(ctx.profile(), ctx.zone()).await?),
        ItemCommands::Get { id } => {
            print_json(&gateway.get_switch(ctx.profile(), ctx.zone(), &id).await?)
        }
    }
}

pub async fn handle_packet_filter(
    gateway: &Gateway,
    ctx: &Context,
    cmd: ItemCommands,
) -> anyhow::Result<()> {
    match cmd {
        ItemCommands::List => {
            print_json(&gateway.list_packet_filters(ctx.profile(), ctx.zone()).await?)
        }
        ItemCommands::Get { id } => {
            print_json(&gateway.get_packet_filter(ctx.profile(), ctx.zone(), &id).await?)
        }
    }
}

pub async fn handle_dns(gateway: &Gateway, ctx: &Context, cmd: ItemCommands) -> anyhow::Result<()> {
    match cmd {
        ItemCommands::List => print_json(&gateway.list_dns(ctx.profile()).await?),
        ItemCommands::Get { id } => print_json(&gateway.get_dns(ctx.profile(), &id).await?),
    }
}

pub async fn handle_gslb(gateway: &Gateway, ctx: &Context, cmd: ItemCommands) -> anyhow::Result<()> {
    match cmd {
        ItemCommands::List => print_json(&gateway.list_gslb(ctx.profile()).await?),
        ItemCommands::Get { id } => print_json(&gateway.get_gslb(ctx.profile(), &id).await?),
    }
}

pub async fn handle_container_registry(
    gateway: &Gateway,
    ctx: &Context,
    cmd: ContainerRegistryCommands,
) -> anyhow::Result<()> {
    match cmd {
        ContainerRegistryCommands::List => {
            print_json(&gateway.list_container_registries(ctx.profile()).await?)
        }
        ContainerRegistryCommands::Users { id } => {
            print_json(&gateway.container_registry_users(ctx.profile(), &id).await?)
        }
    }
}

pub async fn handle_proxy_lb(gateway: &Gateway, ctx: &Context, cmd: ProxyLbCommands) -> anyhow::Result<()> {
    match cmd {
        ProxyLbCommands::List => print_json(&gateway.list_proxy_lbs(ctx.profile()).await?),
        ProxyLbCommands::Get { id } => print_json(&gateway.get_proxy_lb(ctx.profile(), &id).await?),
        ProxyLbCommands::Health { id } => {
            print_json(&gateway.proxy_lb_health(ctx.profile(), &id).await?)
        }
    }
}

pub async fn handle_bill(gateway: &Gateway, ctx: &Context, cmd: BillCommands) -> anyhow::Result<()> {
    match cmd {
        BillCommands::List { account } => {
            print_json(&gateway.list_bills(ctx.profile(), account.as_deref()).await?)
        }
        BillCommands::Details {
            bill_id,
            member_code,
        } => print_json(
            &gateway
                .bill_details(ctx.profile(), member_code.as_deref(), &bill_id)
                .await?,
        ),
    }
}
