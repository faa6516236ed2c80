mod commands;
mod output;

use clap::{Args, Parser, Subcommand};
use sakpanel::Gateway;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "sakpanel")]
#[command(about = "さくらのクラウドのリソースをプロファイル単位で参照する", long_about = None)]
#[command(version)]
struct Cli {
    /// プロファイル名（省略時はカレントプロファイル）
    #[arg(short, long, env = "SAKPANEL_PROFILE", global = true)]
    profile: Option<String>,
    /// ゾーン（省略時はプロファイルの既定ゾーン、なければ is1a）
    #[arg(short, long, env = "SAKPANEL_ZONE", global = true)]
    zone: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// プロファイル管理
    #[command(subcommand)]
    Profile(ProfileCommands),
    /// ゾーン一覧
    Zones,
    /// プロファイルのアカウント情報
    Auth,
    /// サーバー
    #[command(subcommand)]
    Server(ServerCommands),
    /// スイッチ
    #[command(subcommand)]
    Switch(ItemCommands),
    /// パケットフィルタ
    #[command(subcommand)]
    PacketFilter(ItemCommands),
    /// ディスク一覧
    Disks,
    /// マイアーカイブ一覧
    Archives,
    /// データベース一覧
    Databases,
    /// DNS ゾーン
    #[command(subcommand)]
    Dns(ItemCommands),
    /// GSLB
    #[command(subcommand)]
    Gslb(ItemCommands),
    /// 証明書一覧
    Certificates,
    /// シンプル監視一覧
    SimpleMonitors,
    /// コンテナレジストリ
    #[command(subcommand)]
    ContainerRegistry(ContainerRegistryCommands),
    /// エンハンスドDB一覧
    EnhancedDbs,
    /// エンハンスドロードバランサ
    #[command(subcommand)]
    ProxyLb(ProxyLbCommands),
    /// 請求
    #[command(subcommand)]
    Bill(BillCommands),
    /// KMS キー一覧
    KmsKeys,
    /// モニタリングスイート
    #[command(subcommand)]
    Monitoring(MonitoringCommands),
    /// AppRun 専有型
    #[command(subcommand)]
    Apprun(AppRunCommands),
    /// AppRun 共用型
    #[command(subcommand)]
    Shared(SharedCommands),
    /// オブジェクトストレージ
    #[command(subcommand)]
    Storage(StorageCommands),
    /// レジストリのイメージ
    #[command(subcommand)]
    Registry(RegistryCommands),
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// プロファイル一覧
    List,
    /// カレントプロファイル名
    Current,
    /// カレントプロファイルを切り替え
    Use { name: String },
    /// プロファイルの既定ゾーン
    Zone,
    /// プロファイルを作成
    Create {
        name: String,
        #[command(flatten)]
        creds: CredentialArgs,
    },
    /// プロファイルを更新（--rename で名前変更）
    Update {
        name: String,
        #[arg(long)]
        rename: Option<String>,
        #[command(flatten)]
        creds: CredentialArgs,
    },
    /// プロファイルを削除
    Delete { name: String },
    /// 認証情報を検証（プロファイルには書き込まない）
    Validate {
        #[command(flatten)]
        creds: CredentialArgs,
    },
}

#[derive(Args)]
struct CredentialArgs {
    #[arg(long, env = "SAKURACLOUD_ACCESS_TOKEN", hide_env_values = true)]
    access_token: String,
    #[arg(long, env = "SAKURACLOUD_ACCESS_TOKEN_SECRET", hide_env_values = true)]
    access_token_secret: String,
    /// 既定ゾーン
    #[arg(long = "default-zone", default_value = "")]
    default_zone: String,
}

#[derive(Subcommand)]
enum ServerCommands {
    List,
    Get { id: String },
    /// 電源状態
    Status { id: String },
    PowerOn { id: String },
    /// シャットダウン（ACPI）
    PowerOff { id: String },
    /// 強制停止
    ForceStop { id: String },
}

#[derive(Subcommand)]
enum ItemCommands {
    List,
    Get { id: String },
}

#[derive(Subcommand)]
enum ContainerRegistryCommands {
    List,
    /// レジストリのユーザー一覧
    Users { id: String },
}

#[derive(Subcommand)]
enum ProxyLbCommands {
    List,
    Get { id: String },
    /// 実サーバーのヘルス状態
    Health { id: String },
}

#[derive(Subcommand)]
enum BillCommands {
    List {
        /// アカウント ID（省略時はプロファイルのアカウント）
        #[arg(long)]
        account: Option<String>,
    },
    /// 請求明細
    Details {
        bill_id: String,
        /// 会員コード（省略時はプロファイルの会員）
        #[arg(long)]
        member_code: Option<String>,
    },
}

#[derive(Subcommand)]
enum MonitoringCommands {
    /// ログストレージ一覧
    Logs,
    /// メトリクスストレージ一覧
    Metrics,
    /// トレースストレージ一覧
    Traces,
    /// メトリクスストレージの詳細
    Storage { storage_id: String },
    /// メトリクスストレージのアクセスキー
    Keys { storage_id: String },
    /// メトリクス名一覧
    Labels { storage_id: String },
    /// PromQL の範囲クエリ
    Query {
        storage_id: String,
        query: String,
        /// 開始時刻（Unix 秒）
        #[arg(long)]
        start: i64,
        /// 終了時刻（Unix 秒）
        #[arg(long)]
        end: i64,
        #[arg(long, default_value = "60s")]
        step: String,
    },
    /// パブリッシャー一覧
    Publishers { storage_id: String },
    /// パブリッシャーのメトリクス名
    PublisherMetrics {
        storage_id: String,
        publisher: String,
    },
}

#[derive(Args)]
struct PageArgs {
    /// 1ページの件数（上下限に丸める）
    #[arg(long)]
    max_items: Option<u32>,
    /// 前ページの nextCursor
    #[arg(long)]
    cursor: Option<String>,
}

#[derive(Subcommand)]
enum AppRunCommands {
    Clusters {
        #[command(flatten)]
        page: PageArgs,
    },
    Apps {
        #[arg(long)]
        cluster: Option<String>,
        #[command(flatten)]
        page: PageArgs,
    },
    Versions {
        app: String,
        #[command(flatten)]
        page: PageArgs,
    },
    Version { app: String, version: u32 },
    /// アクティブバージョンを設定
    Activate { app: String, version: u32 },
    /// アクティブバージョンを解除
    Deactivate { app: String },
    Asgs {
        cluster: String,
        #[command(flatten)]
        page: PageArgs,
    },
    Lbs {
        cluster: String,
        asg: String,
        #[command(flatten)]
        page: PageArgs,
    },
    Workers {
        cluster: String,
        asg: String,
        #[command(flatten)]
        page: PageArgs,
    },
    LbNodes {
        cluster: String,
        asg: String,
        lb: String,
        #[command(flatten)]
        page: PageArgs,
    },
}

#[derive(Subcommand)]
enum SharedCommands {
    Apps,
    App { id: String },
    Status { id: String },
    Versions { id: String },
    Traffics { id: String },
    /// AppRun 利用者登録の有無
    HasUser,
}

#[derive(Args)]
struct KeyArgs {
    /// サイト ID（例: isk01）
    site: String,
    /// アクセスキー ID
    access_key: String,
}

#[derive(Args)]
struct ObjectArgs {
    #[command(flatten)]
    key: KeyArgs,
    bucket: String,
    object: String,
}

#[derive(Subcommand)]
enum StorageCommands {
    /// サイト一覧
    Sites,
    /// アクセスキー一覧
    Keys { site: String },
    /// バケット一覧
    Buckets {
        #[command(flatten)]
        key: KeyArgs,
    },
    /// オブジェクト一覧
    Ls {
        #[command(flatten)]
        key: KeyArgs,
        bucket: String,
        #[arg(long)]
        prefix: Option<String>,
        /// 前ページの nextToken
        #[arg(long)]
        token: Option<String>,
        #[arg(long)]
        max_keys: Option<i32>,
    },
    /// オブジェクトをダウンロード
    Get {
        #[command(flatten)]
        object: ObjectArgs,
        dest: PathBuf,
    },
    /// テキストとしてプレビュー
    Cat {
        #[command(flatten)]
        object: ObjectArgs,
    },
    /// gzip 圧縮の JSONL をプレビュー
    Jsonl {
        #[command(flatten)]
        object: ObjectArgs,
    },
    /// シークレットキーをキーチェーンに保存（標準入力から読む）
    SetSecret {
        #[command(flatten)]
        key: KeyArgs,
    },
    HasSecret {
        #[command(flatten)]
        key: KeyArgs,
    },
    DeleteSecret {
        #[command(flatten)]
        key: KeyArgs,
    },
}

#[derive(Args)]
struct RegistryArgs {
    /// コンテナレジストリのリソース ID
    registry_id: String,
    /// レジストリの FQDN
    fqdn: String,
    /// 保存済みパスワードで認証するユーザー（省略時は匿名）
    #[arg(long)]
    user: Option<String>,
}

#[derive(Subcommand)]
enum RegistryCommands {
    Images {
        #[command(flatten)]
        registry: RegistryArgs,
    },
    Tags {
        #[command(flatten)]
        registry: RegistryArgs,
        image: String,
    },
    /// パスワードをキーチェーンに保存（標準入力から読む）
    SetPassword { registry_id: String, user: String },
    HasPassword { registry_id: String, user: String },
    DeletePassword { registry_id: String, user: String },
}

/// 各コマンドに渡す解決済みのプロファイルとゾーン
pub(crate) struct Context {
    profile: String,
    zone: Option<String>,
}

impl Context {
    pub(crate) fn profile(&self) -> &str {
        &self.profile
    }

    pub(crate) fn zone(&self) -> Option<&str> {
        self.zone.as_deref()
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // stdout は JSON 出力に使うので、ログは stderr へ
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::print_error(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let gateway = Gateway::from_env()?;
    let profile = cli
        .profile
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| gateway.current_profile());
    tracing::debug!("Using profile {}", profile);
    let ctx = Context {
        profile,
        zone: cli.zone,
    };

    match cli.command {
        Commands::Profile(cmd) => commands::profile::handle(&gateway, &ctx, cmd).await,
        Commands::Zones => output::print_json(&gateway.zones()),
        Commands::Auth => output::print_json(&gateway.auth_info(ctx.profile()).await?),
        Commands::Server(cmd) => commands::iaas::handle_server(&gateway, &ctx, cmd).await,
        Commands::Switch(cmd) => commands::iaas::handle_switch(&gateway, &ctx, cmd).await,
        Commands::PacketFilter(cmd) => {
            commands::iaas::handle_packet_filter(&gateway, &ctx, cmd).await
        }
        Commands::Disks => {
            output::print_json(&gateway.list_disks(ctx.profile(), ctx.zone()).await?)
        }
        Commands::Archives => {
            output::print_json(&gateway.list_archives(ctx.profile(), ctx.zone()).await?)
        }
        Commands::Databases => {
            output::print_json(&gateway.list_databases(ctx.profile(), ctx.zone()).await?)
        }
        Commands::Dns(cmd) => commands::iaas::handle_dns(&gateway, &ctx, cmd).await,
        Commands::Gslb(cmd) => commands::iaas::handle_gslb(&gateway, &ctx, cmd).await,
        Commands::Certificates => {
            output::print_json(&gateway.list_certificates(ctx.profile()).await?)
        }
        Commands::SimpleMonitors => {
            output::print_json(&gateway.list_simple_monitors(ctx.profile()).await?)
        }
        Commands::ContainerRegistry(cmd) => {
            commands::iaas::handle_container_registry(&gateway, &ctx, cmd).await
        }
        Commands::EnhancedDbs => {
            output::print_json(&gateway.list_enhanced_dbs(ctx.profile()).await?)
        }
        Commands::ProxyLb(cmd) => commands::iaas::handle_proxy_lb(&gateway, &ctx, cmd).await,
        Commands::Bill(cmd) => commands::iaas::handle_bill(&gateway, &ctx, cmd).await,
        Commands::KmsKeys => output::print_json(&gateway.list_kms_keys(ctx.profile()).await?),
        Commands::Monitoring(cmd) => commands::monitoring::handle(&gateway, &ctx, cmd).await,
        Commands::Apprun(cmd) => commands::apprun::handle(&gateway, &ctx, cmd).await,
        Commands::Shared(cmd) => commands::apprun::handle_shared(&gateway, &ctx, cmd).await,
        Commands::Storage(cmd) => commands::storage::handle(&gateway, &ctx, cmd).await,
        Commands::Registry(cmd) => commands::registry::handle(&gateway, &ctx, cmd).await,
    }
}
