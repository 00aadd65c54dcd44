//! ノードテンプレート定義

use super::relationship::{Relationship, RelationshipKind};
use crate::intrinsic::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// ノードテンプレート
///
/// YAML形式：
/// ```yaml
/// vm:
///   type: topoflow.nodes.Server
///   properties:
///     flavor: { get_input: flavor }
///   interfaces:
///     lifecycle:
///       create: openstack.nova_plugin.server.create
///       start: openstack.nova_plugin.server.start
///   relationships:
///     - type: topoflow.relationships.contained_in
///       target: subnet
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeTemplate {
    /// ノードタイプ（例: topoflow.nodes.Server）
    #[serde(rename = "type", default)]
    pub type_name: String,
    /// 静的な値または遅延式のマッピング
    #[serde(default)]
    pub properties: HashMap<String, Value>,
    /// インターフェース名 → オペレーション名 → 実装
    #[serde(default)]
    pub interfaces: HashMap<String, HashMap<String, Operation>>,
    /// 他ノードへのリレーションシップ
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl NodeTemplate {
    /// ライフサイクルインターフェースからオペレーションを取得
    ///
    /// インターフェース名が `lifecycle`、または `.lifecycle` で終わるものを
    /// ライフサイクルインターフェースとして扱います。
    pub fn lifecycle_operation(&self, name: &str) -> Option<&Operation> {
        self.interfaces
            .iter()
            .filter(|(iface, _)| *iface == "lifecycle" || iface.ends_with(".lifecycle"))
            .find_map(|(_, ops)| ops.get(name))
    }

    /// 既存リソースをそのまま利用するノードかどうか
    pub fn uses_external_resource(&self) -> bool {
        matches!(
            self.properties.get("use_external_resource"),
            Some(Value::Bool(true))
        )
    }

    /// 既存リソースのID（use_external_resource 時に必須）
    pub fn resource_id(&self) -> Option<&str> {
        match self.properties.get("resource_id") {
            Some(Value::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// contained_in リレーションシップのターゲット
    pub fn container(&self) -> Option<&str> {
        self.relationships
            .iter()
            .find(|r| r.kind() == RelationshipKind::ContainedIn)
            .map(|r| r.target.as_str())
    }
}

/// オペレーション定義
///
/// 短縮形（実装パスのみ）と完全形（実装＋入力）の両方を受け付けます。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operation {
    /// `create: openstack.nova_plugin.server.create`
    Short(String),
    /// `create: { implementation: ..., inputs: { ... } }`
    Full {
        implementation: String,
        #[serde(default)]
        inputs: HashMap<String, Value>,
    },
}

impl Operation {
    /// 実装パス（ドット区切り、先頭セグメントがプラグイン名）
    pub fn implementation(&self) -> &str {
        match self {
            Operation::Short(path) => path,
            Operation::Full { implementation, .. } => implementation,
        }
    }

    /// オペレーション入力
    pub fn inputs(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Operation::Short(_) => None,
            Operation::Full { inputs, .. } => Some(inputs),
        }
    }

    /// プラグイン名（実装パスの先頭セグメント）
    pub fn plugin_name(&self) -> &str {
        self.implementation().split('.').next().unwrap_or("")
    }
}
