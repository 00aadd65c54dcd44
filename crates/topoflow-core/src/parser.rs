//! ブループリントパーサー
//!
//! YAML形式のブループリントをパースして [`Blueprint`] を生成します。
//! import解決は行いません（[`crate::loader`] が担当）。

use crate::error::{BlueprintError, Result};
use crate::model::Blueprint;
use std::fs;
use std::path::Path;

/// YAMLファイルをパースしてBlueprintを生成
///
/// ブループリント名はファイル名（拡張子なし）から導出されます。
pub fn parse_blueprint_file<P: AsRef<Path>>(path: P) -> Result<Blueprint> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| BlueprintError::IoError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let name = path
        .file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or("unnamed")
        .to_string();
    parse_blueprint_str(&content, name)
}

/// YAML文字列をパース
pub fn parse_blueprint_str(content: &str, name: String) -> Result<Blueprint> {
    let mut blueprint: Blueprint = serde_yaml::from_str(content)?;
    blueprint.name = name;
    Ok(blueprint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intrinsic::{Intrinsic, Value};

    #[test]
    fn test_parse_full_blueprint() {
        let blueprint = parse_blueprint_str(
            r#"
imports:
  - https://example.org/types/openstack-plugin/2.14.8/plugin.yaml
inputs:
  image:
    type: string
  flavor:
    type: string
    default: m1.small
node_templates:
  network:
    type: topoflow.nodes.Network
    properties:
      resource_id: my-network
  vm:
    type: topoflow.nodes.Server
    properties:
      image: { get_input: image }
      flavor: { get_input: flavor }
    relationships:
      - type: topoflow.relationships.contained_in
        target: network
outputs:
  vm_ip:
    description: VMのIPアドレス
    value: { get_attribute: [vm, ip] }
groups:
  vm_group:
    members: [vm]
policies:
  scale:
    type: topoflow.policies.scale
    targets: [vm_group]
    properties:
      default_instances: 2
"#,
            "hello".to_string(),
        )
        .unwrap();

        assert_eq!(blueprint.name, "hello");
        assert_eq!(blueprint.imports.len(), 1);
        assert_eq!(blueprint.inputs.len(), 2);
        assert_eq!(blueprint.node_templates.len(), 2);
        assert_eq!(blueprint.outputs.len(), 1);

        let vm = &blueprint.node_templates["vm"];
        assert_eq!(vm.type_name, "topoflow.nodes.Server");
        assert_eq!(
            vm.properties["image"],
            Value::Call(Intrinsic::GetInput("image".to_string()))
        );
        assert_eq!(vm.relationships.len(), 1);
        assert_eq!(vm.relationships[0].target, "network");

        assert_eq!(blueprint.planned_instances("vm"), 2);
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let result = parse_blueprint_str("node_templates: [: bad", "bad".to_string());
        assert!(matches!(result, Err(BlueprintError::YamlParse(_))));
    }

    #[test]
    fn test_parse_missing_file() {
        let result = parse_blueprint_file("/nonexistent/blueprint.yaml");
        assert!(matches!(result, Err(BlueprintError::IoError { .. })));
    }
}
