//! グループ・ポリシー定義

use crate::intrinsic::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// ノードテンプレートのグループ
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Group {
    /// メンバーのノードテンプレート名
    #[serde(default)]
    pub members: Vec<String>,
}

/// グループに適用されるポリシー
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Policy {
    /// ポリシータイプ（例: topoflow.policies.scale）
    #[serde(rename = "type", default)]
    pub type_name: String,
    /// 適用対象のグループ名
    #[serde(default)]
    pub targets: Vec<String>,
    #[serde(default)]
    pub properties: HashMap<String, Value>,
}

impl Policy {
    /// スケールポリシーかどうか
    pub fn is_scale(&self) -> bool {
        self.type_name.contains("scale")
    }

    /// スケールポリシーのインスタンス数
    pub fn default_instances(&self) -> Option<u32> {
        match self.properties.get("default_instances") {
            Some(Value::Int(n)) if *n > 0 => Some(*n as u32),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_policy_parse() {
        let yaml = r#"
type: topoflow.policies.scale
targets: [vm_group]
properties:
  default_instances: 2
"#;
        let policy: Policy = serde_yaml::from_str(yaml).unwrap();
        assert!(policy.is_scale());
        assert_eq!(policy.default_instances(), Some(2));
    }

    #[test]
    fn test_non_scale_policy() {
        let policy = Policy {
            type_name: "topoflow.policies.healing".to_string(),
            ..Default::default()
        };
        assert!(!policy.is_scale());
        assert_eq!(policy.default_instances(), None);
    }
}
