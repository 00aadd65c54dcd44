mod commands;
mod progress;
mod utils;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "topo")]
#[command(about = "宣言する。流れる。トポロジは、ライフサイクルになった。", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// ブループリントを検証
    Validate {
        /// ブループリントファイル（省略時はカレントディレクトリから探索）
        blueprint: Option<PathBuf>,
    },
    /// 依存グラフとライフサイクル順序を表示
    Graph {
        /// ブループリントファイル（省略時はカレントディレクトリから探索）
        blueprint: Option<PathBuf>,
    },
    /// installワークフローを実行 (create → configure → start)
    Install {
        /// ブループリントファイル（省略時はカレントディレクトリから探索）
        blueprint: Option<PathBuf>,
        /// デプロイメント名（省略時はブループリント名）
        #[arg(short, long)]
        deployment: Option<String>,
        /// 入力値 (key=value 形式、複数指定可)
        #[arg(short, long)]
        input: Vec<String>,
        /// 入力値をYAMLファイルから読み込む（-i と併用時は -i が優先）
        #[arg(long = "inputs")]
        inputs_file: Option<PathBuf>,
    },
    /// uninstallワークフローを実行 (stop → delete)
    Uninstall {
        /// デプロイメント名
        deployment: String,
        /// ブループリントファイル（省略時はカレントディレクトリから探索）
        #[arg(short, long)]
        blueprint: Option<PathBuf>,
        /// 確認なしで実行
        #[arg(short, long)]
        yes: bool,
    },
    /// デプロイメントのアウトプットを表示
    Outputs {
        /// デプロイメント名
        deployment: String,
        /// ブループリントファイル（省略時はカレントディレクトリから探索）
        #[arg(short, long)]
        blueprint: Option<PathBuf>,
    },
    /// ノードインスタンスの一覧を表示
    Instances {
        /// デプロイメント名（省略時は全デプロイメント）
        deployment: Option<String>,
    },
    /// バージョン情報を表示
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ログはstderrに出力（RUST_LOGで制御）
    tracing_subscriber::fmt::init();

    // Versionコマンドはブループリント不要
    if matches!(cli.command, Commands::Version) {
        println!("topoflow {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    match cli.command {
        Commands::Validate { blueprint } => commands::validate::handle(blueprint.as_deref()).await,
        Commands::Graph { blueprint } => commands::graph::handle(blueprint.as_deref()).await,
        Commands::Install {
            blueprint,
            deployment,
            input,
            inputs_file,
        } => {
            commands::install::handle(
                blueprint.as_deref(),
                deployment,
                &input,
                inputs_file.as_deref(),
            )
            .await
        }
        Commands::Uninstall {
            deployment,
            blueprint,
            yes,
        } => commands::uninstall::handle(&deployment, blueprint.as_deref(), yes).await,
        Commands::Outputs {
            deployment,
            blueprint,
        } => commands::outputs::handle(&deployment, blueprint.as_deref()).await,
        Commands::Instances { deployment } => {
            commands::instances::handle(deployment.as_deref()).await
        }
        Commands::Version => unreachable!(),
    }
}
