use crate::utils;
use colored::Colorize;
use std::path::Path;
use topoflow_core::DependencyGraph;

pub async fn handle(blueprint_path: Option<&Path>) -> anyhow::Result<()> {
    let blueprint = utils::load_blueprint(blueprint_path)?;
    println!("ブループリント: {}", blueprint.name.cyan());

    let graph = DependencyGraph::build(&blueprint)?;
    let levels = graph.levels()?;

    println!();
    println!(
        "installの順序: {}",
        graph.install_order()?.join(" → ").cyan()
    );

    println!();
    println!("{}", "レベル（同一レベルは並列実行）:".bold());
    for (index, level) in levels.iter().enumerate() {
        println!("  レベル {}:", index + 1);
        for node in level {
            let mut notes = Vec::new();
            if let Some(container) = graph.container_of(node) {
                notes.push(format!("contained_in: {}", container));
            }
            let deps: Vec<&str> = graph.dependencies(node).collect();
            if !deps.is_empty() {
                notes.push(format!("depends: {}", deps.join(", ")));
            }
            if notes.is_empty() {
                println!("    • {}", node.cyan());
            } else {
                println!("    • {} ({})", node.cyan(), notes.join("; "));
            }
        }
    }

    Ok(())
}
