//! ブループリント定義

use super::group::{Group, Policy};
use super::node::NodeTemplate;
use super::params::{InputDef, OutputDef};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Blueprint - トポロジの設計図
///
/// デプロイ可能なトポロジ全体を宣言的に記述します。
/// ノードテンプレートとその間のリレーションシップ、
/// デプロイ時に与える入力と、解決後に公開される出力を持ちます。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Blueprint {
    /// ブループリント名（ファイル名から導出）
    #[serde(skip)]
    pub name: String,
    /// 型・プラグイン定義への参照（URLまたはローカルパス）
    #[serde(default)]
    pub imports: Vec<String>,
    /// デプロイ時に与えるパラメータ
    #[serde(default)]
    pub inputs: HashMap<String, InputDef>,
    /// このブループリントで定義されるノードテンプレート
    #[serde(default)]
    pub node_templates: HashMap<String, NodeTemplate>,
    /// デプロイ成功後に公開される値
    #[serde(default)]
    pub outputs: HashMap<String, OutputDef>,
    /// ノードテンプレートのグループ
    #[serde(default)]
    pub groups: HashMap<String, Group>,
    /// グループに適用されるポリシー
    #[serde(default)]
    pub policies: HashMap<String, Policy>,
}

impl Blueprint {
    /// テンプレートごとの計画インスタンス数
    ///
    /// テンプレートがスケールポリシーのターゲットグループに属する場合は
    /// そのポリシーの default_instances、それ以外は 1。
    pub fn planned_instances(&self, template: &str) -> u32 {
        for policy in self.policies.values() {
            if !policy.is_scale() {
                continue;
            }
            let Some(count) = policy.default_instances() else {
                continue;
            };
            for target in &policy.targets {
                if let Some(group) = self.groups.get(target) {
                    if group.members.iter().any(|m| m == template) {
                        return count;
                    }
                }
            }
        }
        1
    }
}
