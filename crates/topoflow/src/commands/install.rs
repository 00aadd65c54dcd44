use crate::progress::WorkflowProgress;
use crate::utils;
use colored::Colorize;
use std::path::Path;
use topoflow_core::has_errors;
use topoflow_deploy::{Deployment, DeploymentStore, Executor};

pub async fn handle(
    blueprint_path: Option<&Path>,
    deployment_name: Option<String>,
    input_pairs: &[String],
    inputs_file: Option<&Path>,
) -> anyhow::Result<()> {
    println!("{}", "installワークフローを開始します...".blue().bold());

    let blueprint = utils::load_blueprint(blueprint_path)?;
    let name = deployment_name.unwrap_or_else(|| blueprint.name.clone());
    println!("ブループリント: {}", blueprint.name.cyan());
    println!("デプロイメント: {}", name.cyan());

    // デプロイ前に必ず検証する
    let issues = topoflow_core::validate_blueprint(&blueprint);
    if has_errors(&issues) {
        eprintln!();
        eprintln!("{}", "✗ 検証エラーのためinstallを中止します".red().bold());
        utils::print_issues(&issues);
        std::process::exit(1);
    }

    // --inputs ファイルの値に -i key=value を上書きマージ
    let mut inputs = match inputs_file {
        Some(path) => utils::load_inputs_file(path)?,
        None => Default::default(),
    };
    inputs.extend(utils::parse_inputs(input_pairs)?);

    let store = DeploymentStore::new(std::env::current_dir()?);
    let lock = store.acquire_lock().await?;

    // 既存のデプロイメントがあれば再開（resume）する
    let mut deployment = match store.load(&name).await {
        Ok(existing) => {
            println!("{}", "既存のデプロイメントを再開します".yellow());
            if !inputs.is_empty() {
                println!(
                    "{}",
                    "⚠ 再開時は保存済みの入力値を使用します（指定された入力値は無視されます）"
                        .yellow()
                );
            }
            existing
        }
        Err(topoflow_deploy::DeployError::DeploymentNotFound(_)) => {
            Deployment::create(&name, &blueprint, inputs)?
        }
        Err(e) => {
            lock.release().await?;
            return Err(e.into());
        }
    };
    println!("ノードインスタンス: {}個", deployment.instances.len());
    println!();

    let registry = utils::default_registry();
    let executor = Executor::new(&blueprint, &registry);

    let spinner = WorkflowProgress::new("install");
    let report = executor.install(&mut deployment).await?;
    spinner.finish("install 完了");

    // 失敗していても状態は保存する（リトライ・調査のため）
    store.save(&deployment).await?;
    lock.release().await?;

    println!();
    if report.is_success() {
        println!("{}", "✓ installが完了しました！".green().bold());
        println!(
            "  成功: {}個 / スキップ: {}個",
            report.succeeded.len(),
            report.skipped.len()
        );
        println!();
        println!("次のコマンドでアウトプットを確認できます:");
        println!("  {} outputs {}", "topo".cyan(), name);
        Ok(())
    } else {
        eprintln!("{}", "✗ installに失敗しました".red().bold());
        for (instance, message) in &report.failed {
            eprintln!("  {} {}: {}", "✗".red(), instance, message);
        }
        report.into_result()?;
        Ok(())
    }
}
