use colored::Colorize;
use sakpanel::cloud::CloudError;
use serde::Serialize;

/// 結果を整形済み JSON で stdout に出力
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_done(message: &str) -> anyhow::Result<()> {
    eprintln!("{} {}", "✓".green(), message);
    Ok(())
}

/// エラーを stderr に出力
///
/// ゲートウェイのエラーはメッセージに続けて構造化ペイロードを JSON で出す。
pub fn print_error(err: &anyhow::Error) {
    match err.downcast_ref::<CloudError>() {
        Some(cloud) => {
            eprintln!("{} {}", "✗".red(), cloud.user_message().red());
            if let Ok(payload) = serde_json::to_string(&cloud.payload()) {
                eprintln!("{}", payload.dimmed());
            }
        }
        None => eprintln!("{} {:#}", "✗".red(), err),
    }
}

/// 標準入力から 1 行読み、末尾の改行を落とす
pub fn read_secret(prompt: &str) -> anyhow::Result<String> {
    eprint!("{}: ", prompt.cyan());
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    let secret = line.trim_end_matches(['\r', '\n']).to_string();
    if secret.is_empty() {
        anyhow::bail!("{} が空です", prompt);
    }
    Ok(secret)
}
