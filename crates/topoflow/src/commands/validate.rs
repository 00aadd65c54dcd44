use crate::utils;
use colored::Colorize;
use std::path::Path;
use topoflow_core::has_errors;

pub async fn handle(blueprint_path: Option<&Path>) -> anyhow::Result<()> {
    println!("{}", "ブループリントを検証中...".blue());

    let blueprint = match utils::load_blueprint(blueprint_path) {
        Ok(blueprint) => blueprint,
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ ブループリントを読み込めません".red().bold());
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };

    println!("ブループリント: {}", blueprint.name.cyan());

    let issues = topoflow_core::validate_blueprint(&blueprint);
    if issues.is_empty() {
        println!("{}", "✓ ブループリントは正常です！".green().bold());
    } else if has_errors(&issues) {
        eprintln!();
        eprintln!("{}", "✗ 検証エラー".red().bold());
        utils::print_issues(&issues);
        std::process::exit(1);
    } else {
        println!();
        println!("{}", "⚠ 警告あり（エラーなし）".yellow().bold());
        utils::print_issues(&issues);
    }

    println!();
    println!("サマリー:");
    println!("  ノードテンプレート: {}個", blueprint.node_templates.len());
    for (name, template) in &blueprint.node_templates {
        let external = if template.uses_external_resource() {
            " (外部リソース)"
        } else {
            ""
        };
        println!("    - {} ({}){}", name.cyan(), template.type_name, external);
    }
    println!("  入力: {}個", blueprint.inputs.len());
    println!("  アウトプット: {}個", blueprint.outputs.len());
    if !blueprint.groups.is_empty() {
        println!("  グループ: {}個", blueprint.groups.len());
    }
    if !blueprint.policies.is_empty() {
        println!("  ポリシー: {}個", blueprint.policies.len());
    }

    Ok(())
}
