use crate::output::{print_done, print_json};
use crate::{AppRunCommands, Context, PageArgs, SharedCommands};
use sakpanel::Gateway;
use sakpanel::sakura::ListParams;

impl From<PageArgs> for ListParams {
    fn from(args: PageArgs) -> Self {
        ListParams {
            max_items: args.max_items,
            cursor: args.cursor,
        }
    }
}

pub async fn handle(gateway: &Gateway, ctx: &Context, cmd: AppRunCommands) -> anyhow::Result<()> {
    let profile = ctx.profile();
    match cmd {
        AppRunCommands::Clusters { page } => {
            print_json(&gateway.apprun_clusters(profile, page.into()).await?)
        }
        AppRunCommands::Apps { cluster, page } => print_json(
            &gateway
                .apprun_applications(profile, cluster.as_deref(), page.into())
                .await?,
        ),
        AppRunCommands::Versions { app, page } => {
            print_json(&gateway.apprun_versions(profile, &app, page.into()).await?)
        }
        AppRunCommands::Version { app, version } => {
            print_json(&gateway.apprun_version(profile, &app, version).await?)
        }
        AppRunCommands::Activate { app, version } => {
            gateway
                .apprun_set_active_version(profile, &app, version)
                .await?;
            print_done(&format!("{} のアクティブバージョンを {} にしました", app, version))
        }
        AppRunCommands::Deactivate { app } => {
            gateway.apprun_clear_active_version(profile, &app).await?;
            print_done(&format!("{} のアクティブバージョンを解除しました", app))
        }
        AppRunCommands::Asgs { cluster, page } => print_json(
            &gateway
                .apprun_auto_scaling_groups(profile, &cluster, page.into())
                .await?,
        ),
        AppRunCommands::Lbs { cluster, asg, page } => print_json(
            &gateway
                .apprun_load_balancers(profile, &cluster, &asg, page.into())
                .await?,
        ),
        AppRunCommands::Workers { cluster, asg, page } => print_json(
            &gateway
                .apprun_worker_nodes(profile, &cluster, &asg, page.into())
                .await?,
        ),
        AppRunCommands::LbNodes {
            cluster,
            asg,
            lb,
            page,
        } => print_json(
            &gateway
                .apprun_load_balancer_nodes(profile, &cluster, &asg, &lb, page.into())
                .await?,
        ),
    }
}

pub async fn handle_shared(gateway: &Gateway, ctx: &Context, cmd: SharedCommands) -> anyhow::Result<()> {
    let profile = ctx.profile();
    match cmd {
        SharedCommands::Apps => print_json(&gateway.shared_applications(profile).await?),
        SharedCommands::App { id } => print_json(&gateway.shared_application(profile, &id).await?),
        SharedCommands::Status { id } => {
            print_json(&gateway.shared_application_status(profile, &id).await?)
        }
        SharedCommands::Versions { id } => {
            print_json(&gateway.shared_versions(profile, &id).await?)
        }
        SharedCommands::Traffics { id } => {
            print_json(&gateway.shared_traffics(profile, &id).await?)
        }
        SharedCommands::HasUser => print_json(&gateway.shared_has_user(profile).await?),
    }
}
