use colored::Colorize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use topoflow_core::{Blueprint, Severity, ValidationIssue};
use topoflow_plugin::{MemoryPlugin, PluginRegistry};

/// ブループリントを読み込む（共通ロジック）
///
/// パス省略時はカレントディレクトリから blueprint.yaml / blueprint.yml を探索
pub fn load_blueprint(path: Option<&Path>) -> anyhow::Result<Blueprint> {
    match path {
        Some(path) => Ok(topoflow_core::load_blueprint(path)?),
        None => {
            let cwd = std::env::current_dir()?;
            Ok(topoflow_core::load_blueprint_from_dir(&cwd)?)
        }
    }
}

/// key=value 形式の入力値をパースする
///
/// 値はまずJSONとして解釈し、失敗したら文字列として扱う
/// （`--input count=3` は整数、`--input name=web` は文字列）
pub fn parse_inputs(pairs: &[String]) -> anyhow::Result<HashMap<String, serde_json::Value>> {
    let mut inputs = HashMap::new();
    for pair in pairs {
        let Some((key, raw)) = pair.split_once('=') else {
            return Err(anyhow::anyhow!(
                "入力値は key=value 形式で指定してください: {}",
                pair
            ));
        };
        let value = serde_json::from_str(raw)
            .unwrap_or_else(|_| serde_json::Value::String(raw.to_string()));
        inputs.insert(key.to_string(), value);
    }
    Ok(inputs)
}

/// YAMLファイルから入力値を読み込む
pub fn load_inputs_file(path: &Path) -> anyhow::Result<HashMap<String, serde_json::Value>> {
    let content = std::fs::read_to_string(path)?;
    let inputs: HashMap<String, serde_json::Value> = serde_yaml::from_str(&content)?;
    Ok(inputs)
}

/// 組み込みプラグインを登録したレジストリを返す
pub fn default_registry() -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    registry.register(Arc::new(MemoryPlugin::new("memory")));
    registry
}

/// 検証結果を表示する
pub fn print_issues(issues: &[ValidationIssue]) {
    for issue in issues {
        match issue.severity {
            Severity::Error => eprintln!("  {} {}", "✗".red().bold(), issue.message),
            Severity::Warning => eprintln!("  {} {}", "⚠".yellow(), issue.message),
        }
    }
}
