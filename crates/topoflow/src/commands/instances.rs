use colored::Colorize;
use topoflow_deploy::{DeploymentStore, InstanceState};

pub async fn handle(deployment_name: Option<&str>) -> anyhow::Result<()> {
    let store = DeploymentStore::new(std::env::current_dir()?);

    let names = match deployment_name {
        Some(name) => vec![name.to_string()],
        None => {
            let names = store.list().await?;
            if names.is_empty() {
                println!("デプロイメントはありません");
                return Ok(());
            }
            names
        }
    };

    for name in &names {
        let deployment = store.load(name).await?;
        println!(
            "{} ({}個のインスタンス, 更新: {})",
            deployment.name.cyan().bold(),
            deployment.instances.len(),
            deployment.updated_at.format("%Y-%m-%d %H:%M:%S")
        );
        for instance in deployment.instances.values() {
            let state = match instance.state {
                InstanceState::Started => instance.state.to_string().green(),
                InstanceState::Failed => instance.state.to_string().red(),
                InstanceState::Deleted => instance.state.to_string().dimmed(),
                _ => instance.state.to_string().yellow(),
            };
            match instance.external_id() {
                Some(external_id) => println!(
                    "  • {} [{}] {} ({})",
                    instance.id,
                    state,
                    instance.node_type,
                    external_id
                ),
                None => println!("  • {} [{}] {}", instance.id, state, instance.node_type),
            }
        }
        println!();
    }

    Ok(())
}
