use crate::output::{print_done, print_json, read_secret};
use crate::{Context, ObjectArgs, StorageCommands};
use colored::Colorize;
use sakpanel::sakura::ListObjectsParams;
use sakpanel::{Gateway, SecretString};

pub async fn handle(gateway: &Gateway, ctx: &Context, cmd: StorageCommands) -> anyhow::Result<()> {
    let profile = ctx.profile();
    match cmd {
        StorageCommands::Sites => print_json(&gateway.object_storage_sites(profile).await?),
        StorageCommands::Keys { site } => {
            print_json(&gateway.object_storage_access_keys(profile, &site).await?)
        }
        StorageCommands::Buckets { key } => {
            print_json(&gateway.list_buckets(profile, &key.site, &key.access_key).await?)
        }
        StorageCommands::Ls {
            key,
            bucket,
            prefix,
            token,
            max_keys,
        } => {
            let params = ListObjectsParams {
                prefix,
                continuation_token: token,
                max_keys,
            };
            print_json(
                &gateway
                    .list_objects(profile, &key.site, &key.access_key, &bucket, params)
                    .await?,
            )
        }
        StorageCommands::Get { object, dest } => {
            let ObjectArgs { key, bucket, object } = object;
            let written = gateway
                .download_object(profile, &key.site, &key.access_key, &bucket, &object, &dest)
                .await?;
            print_done(&format!(
                "{} を {} に保存しました ({} bytes)",
                object.cyan(),
                dest.display(),
                written
            ))
        }
        StorageCommands::Cat { object } => {
            let ObjectArgs { key, bucket, object } = object;
            print_json(
                &gateway
                    .preview_text(profile, &key.site, &key.access_key, &bucket, &object)
                    .await?,
            )
        }
        StorageCommands::Jsonl { object } => {
            let ObjectArgs { key, bucket, object } = object;
            print_json(
                &gateway
                    .preview_gzip_jsonl(profile, &key.site, &key.access_key, &bucket, &object)
                    .await?,
            )
        }
        StorageCommands::SetSecret { key } => {
            let secret = read_secret("シークレットキー")?;
            gateway
                .save_object_storage_secret(&key.site, &key.access_key, SecretString::new(secret))
                .await?;
            print_done(&format!("{} のシークレットキーを保存しました", key.access_key.cyan()))
        }
        StorageCommands::HasSecret { key } => print_json(
            &gateway
                .has_object_storage_secret(&key.site, &key.access_key)
                .await,
        ),
        StorageCommands::DeleteSecret { key } => {
            gateway
                .delete_object_storage_secret(&key.site, &key.access_key)
                .await?;
            print_done(&format!("{} のシークレットキーを削除しました", key.access_key.cyan()))
        }
    }
}
