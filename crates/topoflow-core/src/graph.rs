//! 依存グラフ
//!
//! リレーションシップ（contained_in / depends_on / connected_to）を解決して、
//! ライフサイクル順序を定める有向非巡回グラフを構築します。

use crate::error::{BlueprintError, Result};
use crate::model::{Blueprint, RelationshipKind};
use std::collections::{BTreeMap, BTreeSet};

/// 依存グラフ
///
/// 頂点はノードテンプレート名、辺はリレーションシップ（ソース→ターゲット）。
/// インストール時はターゲットが先に処理され、
/// アンインストール時はソースが先に処理されます。
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    /// ノード名 → 依存先（ターゲット）集合
    dependencies: BTreeMap<String, BTreeSet<String>>,
    /// ノード名 → 依存元（ソース）集合
    dependents: BTreeMap<String, BTreeSet<String>>,
    /// contained_in の包含関係（ソース → コンテナ）
    containment: BTreeMap<String, String>,
}

impl DependencyGraph {
    /// ブループリントからグラフを構築
    ///
    /// 未定義ターゲットへのリレーションシップはエラー。
    /// 1ノードに複数の contained_in があればエラー。
    pub fn build(blueprint: &Blueprint) -> Result<Self> {
        let mut dependencies: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut dependents: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut containment: BTreeMap<String, String> = BTreeMap::new();

        for name in blueprint.node_templates.keys() {
            dependencies.entry(name.clone()).or_default();
            dependents.entry(name.clone()).or_default();
        }

        for (name, template) in &blueprint.node_templates {
            for rel in &template.relationships {
                if !blueprint.node_templates.contains_key(&rel.target) {
                    return Err(BlueprintError::NodeNotFound(rel.target.clone()));
                }
                if rel.kind() == RelationshipKind::ContainedIn
                    && containment
                        .insert(name.clone(), rel.target.clone())
                        .is_some()
                {
                    return Err(BlueprintError::InvalidBlueprint(format!(
                        "ノード '{}' に contained_in が複数定義されています",
                        name
                    )));
                }
                dependencies
                    .get_mut(name)
                    .expect("all templates registered")
                    .insert(rel.target.clone());
                dependents
                    .get_mut(&rel.target)
                    .expect("all templates registered")
                    .insert(name.clone());
            }
        }

        Ok(Self {
            dependencies,
            dependents,
            containment,
        })
    }

    /// ノード数
    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    /// ノードの依存先（このノードより先に処理されるノード）
    pub fn dependencies(&self, node: &str) -> impl Iterator<Item = &str> {
        self.dependencies
            .get(node)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// ノードに依存しているノード
    pub fn dependents(&self, node: &str) -> impl Iterator<Item = &str> {
        self.dependents
            .get(node)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// ノードを直接包含するコンテナ（contained_in のターゲット）
    pub fn container_of(&self, node: &str) -> Option<&str> {
        self.containment.get(node).map(String::as_str)
    }

    /// 包含チェーンを辿った先のホスト
    pub fn host_of(&self, node: &str) -> Option<&str> {
        let mut current = self.containment.get(node)?;
        // 包含チェーンが循環していてもノード数で打ち切る
        for _ in 0..self.containment.len() {
            match self.containment.get(current) {
                Some(next) => current = next,
                None => break,
            }
        }
        Some(current)
    }

    /// インストール順（依存先が先に来る決定的なトポロジカル順序）
    pub fn install_order(&self) -> Result<Vec<String>> {
        Ok(self.levels()?.into_iter().flatten().collect())
    }

    /// アンインストール順（インストール順の逆）
    pub fn uninstall_order(&self) -> Result<Vec<String>> {
        let mut order = self.install_order()?;
        order.reverse();
        Ok(order)
    }

    /// トポロジカルレベル
    ///
    /// 同一レベル内のノードには順序制約が無く、並列に処理できます。
    /// レベル内はノード名順で決定的。循環があれば CircularDependency。
    pub fn levels(&self) -> Result<Vec<Vec<String>>> {
        let mut done: BTreeSet<&str> = BTreeSet::new();
        let mut remaining: BTreeSet<&str> =
            self.dependencies.keys().map(String::as_str).collect();
        let mut levels = Vec::new();

        while !remaining.is_empty() {
            let ready: Vec<String> = remaining
                .iter()
                .filter(|node| {
                    self.dependencies(node).all(|dep| done.contains(dep))
                })
                .map(|node| node.to_string())
                .collect();

            if ready.is_empty() {
                let cycle: Vec<&str> = remaining.iter().copied().collect();
                return Err(BlueprintError::CircularDependency(cycle.join(" -> ")));
            }

            for node in &ready {
                remaining.remove(node.as_str());
            }
            for node in &ready {
                // doneはremainingより長生きするのでdependenciesのキーを借用
                let (key, _) = self
                    .dependencies
                    .get_key_value(node.as_str())
                    .expect("ready node exists");
                done.insert(key.as_str());
            }
            levels.push(ready);
        }

        Ok(levels)
    }
}
