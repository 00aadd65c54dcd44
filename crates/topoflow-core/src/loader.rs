//! 統合ローダー
//!
//! ファイル発見、import解決、パースを統合

use crate::error::{BlueprintError, Result};
use crate::model::Blueprint;
use crate::parser::parse_blueprint_file;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// ブループリントファイルの候補名（優先順）
const BLUEPRINT_CANDIDATES: &[&str] = &["blueprint.yaml", "blueprint.yml"];

/// import のネスト上限
const MAX_IMPORT_DEPTH: usize = 8;

/// ディレクトリからブループリントを発見してロード
#[instrument(skip(dir), fields(dir = %dir.display()))]
pub fn load_blueprint_from_dir(dir: &Path) -> Result<Blueprint> {
    let path = find_blueprint_file(dir)?;
    load_blueprint(&path)
}

/// ブループリントファイルを検索
///
/// 以下の優先順位で検索:
/// 1. blueprint.yaml / blueprint.yml
/// 2. ディレクトリ内の *.yaml が1つだけならそれを採用
pub fn find_blueprint_file(dir: &Path) -> Result<PathBuf> {
    for candidate in BLUEPRINT_CANDIDATES {
        let path = dir.join(candidate);
        if path.exists() {
            return Ok(path);
        }
    }

    let pattern = dir.join("*.yaml");
    let mut matches: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())
        .map_err(|e| BlueprintError::InvalidBlueprint(e.to_string()))?
        .filter_map(|entry| entry.ok())
        .collect();
    if matches.len() == 1 {
        return Ok(matches.remove(0));
    }

    Err(BlueprintError::BlueprintNotFound(dir.to_path_buf()))
}

/// ブループリントをロードしてimportをマージ
///
/// 以下の処理を実行:
/// 1. 本体ファイルのパース
/// 2. ローカルimportの再帰的なマージ（URL importは記録のみ）
/// 3. ドキュメント形状の検証（node_templates必須）
#[instrument(skip(path), fields(path = %path.as_ref().display()))]
pub fn load_blueprint<P: AsRef<Path>>(path: P) -> Result<Blueprint> {
    let path = path.as_ref();
    info!("Loading blueprint");

    let mut blueprint = parse_blueprint_file(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut seen = BTreeSet::new();
    if let Ok(canonical) = path.canonicalize() {
        seen.insert(canonical);
    }
    merge_imports(&mut blueprint, base_dir, &mut seen, 0)?;

    if blueprint.node_templates.is_empty() {
        return Err(BlueprintError::InvalidBlueprint(
            "node_templates が定義されていません".to_string(),
        ));
    }

    info!(
        nodes = blueprint.node_templates.len(),
        inputs = blueprint.inputs.len(),
        outputs = blueprint.outputs.len(),
        "Blueprint loaded successfully"
    );
    Ok(blueprint)
}

/// ローカルimportを再帰的にマージ
fn merge_imports(
    blueprint: &mut Blueprint,
    base_dir: &Path,
    seen: &mut BTreeSet<PathBuf>,
    depth: usize,
) -> Result<()> {
    if depth > MAX_IMPORT_DEPTH {
        return Err(BlueprintError::InvalidBlueprint(
            "import のネストが深すぎます".to_string(),
        ));
    }

    for import in blueprint.imports.clone() {
        if import.starts_with("http://") || import.starts_with("https://") {
            // URL importは外部エンジン向けの型・プラグイン定義参照。
            // 記録のみでフェッチしない。
            debug!(import = %import, "Skipping remote import");
            continue;
        }

        let import_path = base_dir.join(&import);
        let canonical = import_path
            .canonicalize()
            .map_err(|e| BlueprintError::IoError {
                path: import_path.clone(),
                message: e.to_string(),
            })?;
        if !seen.insert(canonical) {
            debug!(import = %import, "Import already merged");
            continue;
        }

        debug!(file = %import_path.display(), "Merging import");
        let mut imported = parse_blueprint_file(&import_path)?;
        let import_base = import_path
            .parent()
            .unwrap_or(base_dir)
            .to_path_buf();
        merge_imports(&mut imported, &import_base, seen, depth + 1)?;
        merge_into(blueprint, imported)?;
    }

    Ok(())
}

/// importされた定義を本体へマージ
///
/// ノードテンプレートの重複はエラー。
/// inputs / outputs / groups / policies は本体側の定義が優先されます。
fn merge_into(blueprint: &mut Blueprint, imported: Blueprint) -> Result<()> {
    for (name, template) in imported.node_templates {
        if blueprint.node_templates.contains_key(&name) {
            return Err(BlueprintError::DuplicateNode(name));
        }
        blueprint.node_templates.insert(name, template);
    }
    for (name, input) in imported.inputs {
        blueprint.inputs.entry(name).or_insert(input);
    }
    for (name, output) in imported.outputs {
        blueprint.outputs.entry(name).or_insert(output);
    }
    for (name, group) in imported.groups {
        blueprint.groups.entry(name).or_insert(group);
    }
    for (name, policy) in imported.policies {
        blueprint.policies.entry(name).or_insert(policy);
    }
    Ok(())
}
