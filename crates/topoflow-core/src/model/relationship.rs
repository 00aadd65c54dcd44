//! リレーションシップ定義

use serde::{Deserialize, Serialize};

/// リレーションシップ - ノード間の型付き有向依存
///
/// ソース（このリレーションシップを持つノード）からターゲットへの辺。
/// インストール時はターゲットが先に処理され、
/// アンインストール時はソースが先に処理されます。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    /// リレーションシップタイプ
    #[serde(rename = "type")]
    pub type_name: String,
    /// ターゲットノード名
    pub target: String,
}

/// 順序付けに関わるリレーションシップの種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipKind {
    /// ソースはターゲット無しには存在できない（ホスト包含）
    ContainedIn,
    /// ターゲットの後に処理される
    DependsOn,
    /// 接続関係（順序制約は DependsOn と同じ）
    ConnectedTo,
}

impl Relationship {
    /// タイプ名から種別を判定
    ///
    /// `contained_in` / `connected_to` を含むタイプはそれぞれの種別、
    /// それ以外（capability固有タイプを含む）は DependsOn として扱います。
    pub fn kind(&self) -> RelationshipKind {
        if self.type_name.contains("contained_in") {
            RelationshipKind::ContainedIn
        } else if self.type_name.contains("connected_to") {
            RelationshipKind::ConnectedTo
        } else {
            RelationshipKind::DependsOn
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relationship_kind() {
        let cases = [
            ("topoflow.relationships.contained_in", RelationshipKind::ContainedIn),
            ("topoflow.relationships.depends_on", RelationshipKind::DependsOn),
            ("topoflow.relationships.connected_to", RelationshipKind::ConnectedTo),
            // capability固有タイプ
            (
                "topoflow.openstack.server_connected_to_floating_ip",
                RelationshipKind::ConnectedTo,
            ),
            (
                "topoflow.openstack.subnet_depends_on_router",
                RelationshipKind::DependsOn,
            ),
            ("custom.relationship", RelationshipKind::DependsOn),
        ];
        for (type_name, expected) in cases {
            let rel = Relationship {
                type_name: type_name.to_string(),
                target: "other".to_string(),
            };
            assert_eq!(rel.kind(), expected, "type: {}", type_name);
        }
    }
}
