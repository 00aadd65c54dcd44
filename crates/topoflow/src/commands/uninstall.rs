use crate::progress::WorkflowProgress;
use crate::utils;
use colored::Colorize;
use std::path::Path;
use topoflow_deploy::{DeploymentStore, Executor, InstanceState};

pub async fn handle(
    deployment_name: &str,
    blueprint_path: Option<&Path>,
    yes: bool,
) -> anyhow::Result<()> {
    println!("{}", "uninstallワークフローを開始します...".blue().bold());

    let store = DeploymentStore::new(std::env::current_dir()?);
    let mut deployment = store.load(deployment_name).await?;
    println!("デプロイメント: {}", deployment.name.cyan());
    println!("ノードインスタンス: {}個", deployment.instances.len());

    // 確認（--yesが指定されていない場合）
    if !yes {
        println!();
        println!(
            "{}",
            "警告: すべてのノードインスタンスを停止・削除します。".yellow()
        );
        println!("実行するには --yes オプションを指定してください");
        return Ok(());
    }

    let blueprint = utils::load_blueprint(blueprint_path)?;
    let registry = utils::default_registry();
    let executor = Executor::new(&blueprint, &registry);

    let lock = store.acquire_lock().await?;
    let spinner = WorkflowProgress::new("uninstall");
    let report = executor.uninstall(&mut deployment).await?;
    spinner.finish("uninstall 完了");

    let all_deleted = deployment
        .instances
        .values()
        .all(|i| matches!(i.state, InstanceState::Deleted | InstanceState::Uninitialized));

    if all_deleted {
        store.remove(deployment_name).await?;
    } else {
        // 失敗したインスタンスが残っている場合は状態を保存する
        store.save(&deployment).await?;
    }
    lock.release().await?;

    println!();
    if report.is_success() {
        println!("{}", "✓ uninstallが完了しました！".green().bold());
        println!(
            "  成功: {}個 / スキップ: {}個",
            report.succeeded.len(),
            report.skipped.len()
        );
        Ok(())
    } else {
        eprintln!("{}", "⚠ 一部のノードの削除に失敗しました".yellow().bold());
        for (instance, message) in &report.failed {
            eprintln!("  {} {}: {}", "✗".red(), instance, message);
        }
        report.into_result()?;
        Ok(())
    }
}
