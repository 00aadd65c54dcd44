use crate::utils;
use colored::Colorize;
use std::path::Path;
use topoflow_deploy::{DeploymentStore, resolve_outputs};

pub async fn handle(deployment_name: &str, blueprint_path: Option<&Path>) -> anyhow::Result<()> {
    let store = DeploymentStore::new(std::env::current_dir()?);
    let deployment = store.load(deployment_name).await?;
    let blueprint = utils::load_blueprint(blueprint_path)?;

    let outputs = resolve_outputs(&blueprint, &deployment)?;
    if outputs.is_empty() {
        println!("アウトプットは定義されていません");
        return Ok(());
    }

    eprintln!(
        "{}",
        format!("アウトプット ({}個):", outputs.len()).bold()
    );
    // stdoutにはYAMLのみ（パイプしてそのまま使える形式）
    print!("{}", serde_yaml::to_string(&outputs)?);

    Ok(())
}
