use crate::output::{print_done, print_json, read_secret};
use crate::{Context, RegistryArgs, RegistryCommands};
use colored::Colorize;
use sakpanel::{Gateway, SecretString};

pub async fn handle(gateway: &Gateway, ctx: &Context, cmd: RegistryCommands) -> anyhow::Result<()> {
    let profile = ctx.profile();
    match cmd {
        RegistryCommands::Images { registry } => {
            let RegistryArgs {
                registry_id,
                fqdn,
                user,
            } = registry;
            print_json(
                &gateway
                    .registry_images(profile, &registry_id, &fqdn, user.as_deref())
                    .await?,
            )
        }
        RegistryCommands::Tags { registry, image } => {
            let RegistryArgs {
                registry_id,
                fqdn,
                user,
            } = registry;
            print_json(
                &gateway
                    .registry_tags(profile, &registry_id, &fqdn, user.as_deref(), &image)
                    .await?,
            )
        }
        RegistryCommands::SetPassword { registry_id, user } => {
            let password = read_secret("パスワード")?;
            gateway
                .save_registry_password(&registry_id, &user, SecretString::new(password))
                .await?;
            print_done(&format!("{} のパスワードを保存しました", user.cyan()))
        }
        RegistryCommands::HasPassword { registry_id, user } => {
            print_json(&gateway.has_registry_password(&registry_id, &user).await)
        }
        RegistryCommands::DeletePassword { registry_id, user } => {
            gateway.delete_registry_password(&registry_id, &user).await?;
            print_done(&format!("{} のパスワードを削除しました", user.cyan()))
        }
    }
}
