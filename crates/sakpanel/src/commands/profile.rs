use crate::output::{print_done, print_json};
use crate::{Context, CredentialArgs, ProfileCommands};
use colored::Colorize;
use sakpanel::Gateway;
use sakpanel::config::ProfileCredentials;

fn credentials(args: CredentialArgs) -> ProfileCredentials {
    ProfileCredentials::new(args.access_token, args.access_token_secret, args.default_zone)
}

pub async fn handle(gateway: &Gateway, ctx: &Context, cmd: ProfileCommands) -> anyhow::Result<()> {
    match cmd {
        ProfileCommands::List => print_json(&gateway.list_profiles()?),
        ProfileCommands::Current => print_json(&gateway.current_profile()),
        ProfileCommands::Use { name } => {
            gateway.set_current_profile(&name)?;
            print_done(&format!("カレントプロファイルを {} に切り替えました", name.cyan()))
        }
        ProfileCommands::Zone => print_json(&gateway.default_zone(ctx.profile())),
        ProfileCommands::Create { name, creds } => {
            gateway.create_profile(&name, &credentials(creds))?;
            print_done(&format!("プロファイル {} を作成しました", name.cyan()))
        }
        ProfileCommands::Update {
            name,
            rename,
            creds,
        } => {
            let new_name = rename.unwrap_or_else(|| name.clone());
            gateway.update_profile(&name, &new_name, &credentials(creds))?;
            print_done(&format!("プロファイル {} を更新しました", new_name.cyan()))
        }
        ProfileCommands::Delete { name } => {
            gateway.delete_profile(&name)?;
            print_done(&format!("プロファイル {} を削除しました", name.cyan()))
        }
        ProfileCommands::Validate { creds } => {
            let info = gateway
                .validate_credentials(&creds.access_token, &creds.access_token_secret)
                .await?;
            print_json(&info)
        }
    }
}
