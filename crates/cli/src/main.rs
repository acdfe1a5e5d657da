//! # Shortlink CLI
//!
//! - `keygen`: Ed25519署名鍵の生成（シードと公開鍵を出力）
//! - `pubkey`: 署名鍵の公開鍵ブロックを出力
//! - `sign`: クリアテキスト署名・分離署名
//! - `create` / `update` / `delete`: 署名付き書き込み
//! - `resolve`: スラッグの転送先を表示
//! - `keys`: Gatewayが信頼している公開鍵を表示

mod client;
mod signing;

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use shortlink_crypto::Ed25519Signer;
use tracing_subscriber::EnvFilter;

use client::ShortlinkClient;
use signing::SigningKeyArgs;

/// Shortlink CLI
#[derive(Parser, Debug)]
#[command(name = "shortlink-cli")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 新しい署名鍵を生成する
    Keygen {
        /// 公開鍵に載せるユーザーID
        #[arg(long, default_value = "shortlink")]
        user_id: String,

        /// 公開鍵ブロックの出力先（省略時は標準エラー出力）
        #[arg(long)]
        public_key: Option<PathBuf>,
    },

    /// 署名鍵の公開鍵ブロックを出力する
    Pubkey {
        #[command(flatten)]
        key: SigningKeyArgs,
    },

    /// ファイル（省略時は標準入力）に署名する
    Sign {
        #[command(flatten)]
        key: SigningKeyArgs,

        /// 分離署名を出力する
        #[arg(long)]
        detached: bool,

        /// 署名対象ファイル
        file: Option<PathBuf>,
    },

    /// スラッグを新規登録する
    Create {
        #[command(flatten)]
        gateway: GatewayArgs,
        #[command(flatten)]
        key: SigningKeyArgs,
        slug: String,
        target: String,
    },

    /// 登録済みスラッグの転送先を更新する
    Update {
        #[command(flatten)]
        gateway: GatewayArgs,
        #[command(flatten)]
        key: SigningKeyArgs,
        slug: String,
        target: String,
    },

    /// 登録済みスラッグを削除する
    Delete {
        #[command(flatten)]
        gateway: GatewayArgs,
        #[command(flatten)]
        key: SigningKeyArgs,
        slug: String,
    },

    /// スラッグの転送先を表示する
    Resolve {
        #[command(flatten)]
        gateway: GatewayArgs,
        slug: String,
    },

    /// Gatewayが信頼している公開鍵を表示する
    Keys {
        #[command(flatten)]
        gateway: GatewayArgs,
    },
}

#[derive(clap::Args, Debug)]
struct GatewayArgs {
    /// GatewayのベースURL
    #[arg(long, env = "ENDPOINT")]
    endpoint: String,
}

impl GatewayArgs {
    fn client(&self) -> anyhow::Result<ShortlinkClient> {
        Ok(ShortlinkClient::new(&self.endpoint)?)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Keygen {
            user_id,
            public_key,
        } => {
            let signer = Ed25519Signer::generate(user_id, signing::now());
            let armored = signer.public_key_armor();
            match public_key {
                Some(path) => std::fs::write(&path, &armored)
                    .with_context(|| format!("{} に書き込めません", path.display()))?,
                None => eprint!("{armored}"),
            }
            println!("SIGNING_KEY={}", hex::encode(signer.seed()));
            println!("SIGNING_KEY_CREATED={}", signer.created());
            println!("SIGNING_KEY_USER_ID={:?}", signer.user_id());
            eprintln!("fingerprint: {}", signer.fingerprint_hex());
        }
        Commands::Pubkey { key } => {
            print!("{}", key.signer()?.public_key_armor());
        }
        Commands::Sign {
            key,
            detached,
            file,
        } => {
            let signer = key.signer()?;
            let content = read_input(file.as_deref())?;
            let output = if detached {
                signer.sign_detached(&content, signing::now())
            } else {
                let text = String::from_utf8(content)
                    .context("クリアテキスト署名の対象はUTF-8テキストである必要があります")?;
                signer.clearsign(&text, signing::now())
            };
            std::io::stdout().write_all(output.as_bytes())?;
        }
        Commands::Create {
            gateway,
            key,
            slug,
            target,
        } => {
            gateway.client()?.create(&key.signer()?, &slug, &target).await?;
            println!("created {slug} -> {target}");
        }
        Commands::Update {
            gateway,
            key,
            slug,
            target,
        } => {
            gateway.client()?.update(&key.signer()?, &slug, &target).await?;
            println!("updated {slug} -> {target}");
        }
        Commands::Delete { gateway, key, slug } => {
            gateway.client()?.delete(&key.signer()?, &slug).await?;
            println!("deleted {slug}");
        }
        Commands::Resolve { gateway, slug } => {
            println!("{}", gateway.client()?.resolve(&slug).await?);
        }
        Commands::Keys { gateway } => {
            let info = gateway.client()?.trust_info().await?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
    }

    Ok(())
}

fn read_input(file: Option<&Path>) -> anyhow::Result<Vec<u8>> {
    match file {
        Some(path) => {
            std::fs::read(path).with_context(|| format!("{} を読み込めません", path.display()))
        }
        None => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}
