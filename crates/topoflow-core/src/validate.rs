//! ブループリント検証
//!
//! ドキュメントレベルで検証可能な性質をすべてチェックし、
//! 最初のエラーで止まらずに問題の一覧を返します。

use crate::graph::DependencyGraph;
use crate::intrinsic::{Intrinsic, Value};
use crate::model::Blueprint;
use std::fmt;

/// 検証結果の深刻度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// 検証で見つかった問題
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub message: String,
}

impl ValidationIssue {
    fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

/// ブループリントを検証して全ての問題を返す
///
/// チェック内容:
/// - リレーションシップのターゲットが定義済みか
/// - 依存グラフが非巡回か（contained_in の重複もここで検出）
/// - 遅延式の参照先（入力・ノード）が定義済みか
/// - 入力のデフォルト値が宣言された型を満たすか
/// - グループのメンバーとポリシーのターゲットが定義済みか
/// - use_external_resource のノードに resource_id があるか
pub fn validate_blueprint(blueprint: &Blueprint) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    check_relationships(blueprint, &mut issues);
    check_graph(blueprint, &mut issues);
    check_expressions(blueprint, &mut issues);
    check_input_defaults(blueprint, &mut issues);
    check_groups_and_policies(blueprint, &mut issues);
    check_external_resources(blueprint, &mut issues);

    issues
}

/// エラーが1件でもあるか
pub fn has_errors(issues: &[ValidationIssue]) -> bool {
    issues.iter().any(|i| i.severity == Severity::Error)
}

fn sorted_template_names(blueprint: &Blueprint) -> Vec<&String> {
    let mut names: Vec<&String> = blueprint.node_templates.keys().collect();
    names.sort();
    names
}

fn check_relationships(blueprint: &Blueprint, issues: &mut Vec<ValidationIssue>) {
    for name in sorted_template_names(blueprint) {
        let template = &blueprint.node_templates[name];
        for rel in &template.relationships {
            if !blueprint.node_templates.contains_key(&rel.target) {
                issues.push(ValidationIssue::error(format!(
                    "ノード '{}' のリレーションシップが未定義のターゲット '{}' を参照しています",
                    name, rel.target
                )));
            }
            if rel.target == *name {
                issues.push(ValidationIssue::error(format!(
                    "ノード '{}' が自分自身へのリレーションシップを持っています",
                    name
                )));
            }
        }
    }
}

fn check_graph(blueprint: &Blueprint, issues: &mut Vec<ValidationIssue>) {
    match DependencyGraph::build(blueprint) {
        Ok(graph) => {
            if let Err(e) = graph.install_order() {
                issues.push(ValidationIssue::error(e.to_string()));
            }
        }
        // contained_in の重複
        Err(e @ crate::error::BlueprintError::InvalidBlueprint(_)) => {
            issues.push(ValidationIssue::error(e.to_string()));
        }
        // ターゲット未定義はcheck_relationshipsで報告済み
        Err(_) => {}
    }
}

fn check_expressions(blueprint: &Blueprint, issues: &mut Vec<ValidationIssue>) {
    let mut check = |location: String, value: &Value| {
        walk_value(value, &mut |call| match call {
            Intrinsic::GetInput(input) => {
                if !blueprint.inputs.contains_key(input) {
                    issues.push(ValidationIssue::error(format!(
                        "{}: get_input が未定義の入力 '{}' を参照しています",
                        location, input
                    )));
                }
            }
            Intrinsic::GetProperty(path) | Intrinsic::GetAttribute(path) => {
                match path.first() {
                    None => {
                        issues.push(ValidationIssue::error(format!(
                            "{}: 参照パスが空です",
                            location
                        )));
                    }
                    Some(node) if !blueprint.node_templates.contains_key(node) => {
                        issues.push(ValidationIssue::error(format!(
                            "{}: 未定義のノード '{}' を参照しています",
                            location, node
                        )));
                    }
                    Some(_) if path.len() < 2 => {
                        issues.push(ValidationIssue::warning(format!(
                            "{}: プロパティ名のない参照です",
                            location
                        )));
                    }
                    _ => {}
                }
            }
            Intrinsic::Concat(_) => {}
        });
    };

    for name in sorted_template_names(blueprint) {
        let template = &blueprint.node_templates[name];
        for (prop, value) in &template.properties {
            check(format!("ノード '{}' のプロパティ '{}'", name, prop), value);
        }
        for (iface, ops) in &template.interfaces {
            for (op_name, op) in ops {
                if let Some(inputs) = op.inputs() {
                    for (input_name, value) in inputs {
                        check(
                            format!(
                                "ノード '{}' の {}.{} 入力 '{}'",
                                name, iface, op_name, input_name
                            ),
                            value,
                        );
                    }
                }
            }
        }
    }

    let mut output_names: Vec<&String> = blueprint.outputs.keys().collect();
    output_names.sort();
    for name in output_names {
        check(
            format!("出力 '{}'", name),
            &blueprint.outputs[name].value,
        );
    }
}

fn check_input_defaults(blueprint: &Blueprint, issues: &mut Vec<ValidationIssue>) {
    let mut input_names: Vec<&String> = blueprint.inputs.keys().collect();
    input_names.sort();
    for name in input_names {
        let input = &blueprint.inputs[name];
        let Some(default) = &input.default else {
            continue;
        };
        if !default.is_static() {
            issues.push(ValidationIssue::error(format!(
                "入力 '{}' のデフォルト値に遅延式は使えません",
                name
            )));
            continue;
        }
        if let (Some(input_type), Ok(json)) = (input.type_name, default.to_json()) {
            if !input_type.matches(&json) {
                issues.push(ValidationIssue::error(format!(
                    "入力 '{}' のデフォルト値が型 '{}' を満たしていません",
                    name,
                    input_type.as_str()
                )));
            }
        }
    }
}

fn check_groups_and_policies(blueprint: &Blueprint, issues: &mut Vec<ValidationIssue>) {
    let mut group_names: Vec<&String> = blueprint.groups.keys().collect();
    group_names.sort();
    for name in group_names {
        for member in &blueprint.groups[name].members {
            if !blueprint.node_templates.contains_key(member) {
                issues.push(ValidationIssue::error(format!(
                    "グループ '{}' のメンバー '{}' が未定義です",
                    name, member
                )));
            }
        }
    }

    let mut policy_names: Vec<&String> = blueprint.policies.keys().collect();
    policy_names.sort();
    for name in policy_names {
        for target in &blueprint.policies[name].targets {
            if !blueprint.groups.contains_key(target) {
                issues.push(ValidationIssue::error(format!(
                    "ポリシー '{}' のターゲット '{}' がグループとして定義されていません",
                    name, target
                )));
            }
        }
    }
}

fn check_external_resources(blueprint: &Blueprint, issues: &mut Vec<ValidationIssue>) {
    for name in sorted_template_names(blueprint) {
        let template = &blueprint.node_templates[name];
        if template.uses_external_resource() && template.resource_id().is_none() {
            issues.push(ValidationIssue::error(format!(
                "ノード '{}' は use_external_resource ですが resource_id がありません",
                name
            )));
        }
    }
}

/// 値の中の遅延式をすべて訪問
fn walk_value<'a>(value: &'a Value, visit: &mut impl FnMut(&'a Intrinsic)) {
    match value {
        Value::Call(call) => {
            visit(call);
            if let Intrinsic::Concat(parts) = call {
                for part in parts {
                    walk_value(part, visit);
                }
            }
        }
        Value::List(items) => {
            for item in items {
                walk_value(item, visit);
            }
        }
        Value::Map(map) => {
            for item in map.values() {
                walk_value(item, visit);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_blueprint_str;

    fn parse(content: &str) -> Blueprint {
        parse_blueprint_str(content, "test".to_string()).unwrap()
    }

    #[test]
    fn test_valid_blueprint_has_no_issues() {
        let blueprint = parse(
            r#"
inputs:
  port:
    type: integer
    default: 8080
node_templates:
  network:
    type: topoflow.nodes.Network
  vm:
    type: topoflow.nodes.Server
    properties:
      port: { get_input: port }
    relationships:
      - type: topoflow.relationships.contained_in
        target: network
outputs:
  endpoint:
    value: { get_attribute: [vm, ip] }
"#,
        );
        let issues = validate_blueprint(&blueprint);
        assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
    }

    #[test]
    fn test_unknown_relationship_target() {
        let blueprint = parse(
            r#"
node_templates:
  vm:
    type: t
    relationships:
      - type: topoflow.relationships.depends_on
        target: ghost
"#,
        );
        let issues = validate_blueprint(&blueprint);
        assert!(has_errors(&issues));
        assert!(issues.iter().any(|i| i.message.contains("ghost")));
    }

    #[test]
    fn test_cycle_reported() {
        let blueprint = parse(
            r#"
node_templates:
  a:
    type: t
    relationships:
      - type: topoflow.relationships.depends_on
        target: b
  b:
    type: t
    relationships:
      - type: topoflow.relationships.depends_on
        target: a
"#,
        );
        let issues = validate_blueprint(&blueprint);
        assert!(issues.iter().any(|i| i.message.contains("循環依存")));
    }

    #[test]
    fn test_undefined_input_reference() {
        let blueprint = parse(
            r#"
node_templates:
  vm:
    type: t
    properties:
      image: { get_input: missing }
"#,
        );
        let issues = validate_blueprint(&blueprint);
        assert!(has_errors(&issues));
        assert!(issues.iter().any(|i| i.message.contains("missing")));
    }

    #[test]
    fn test_undefined_node_in_output() {
        let blueprint = parse(
            r#"
node_templates:
  vm:
    type: t
outputs:
  ip:
    value: { get_attribute: [ghost, ip] }
"#,
        );
        let issues = validate_blueprint(&blueprint);
        assert!(issues.iter().any(|i| i.message.contains("ghost")));
    }

    #[test]
    fn test_default_type_mismatch() {
        let blueprint = parse(
            r#"
inputs:
  port:
    type: integer
    default: not-a-number
node_templates:
  vm:
    type: t
"#,
        );
        let issues = validate_blueprint(&blueprint);
        assert!(has_errors(&issues));
        assert!(issues.iter().any(|i| i.message.contains("port")));
    }

    #[test]
    fn test_group_and_policy_references() {
        let blueprint = parse(
            r#"
node_templates:
  vm:
    type: t
groups:
  g1:
    members: [vm, ghost]
policies:
  p1:
    type: topoflow.policies.scale
    targets: [g1, missing_group]
"#,
        );
        let issues = validate_blueprint(&blueprint);
        assert!(issues.iter().any(|i| i.message.contains("ghost")));
        assert!(issues.iter().any(|i| i.message.contains("missing_group")));
    }

    #[test]
    fn test_external_resource_without_id() {
        let blueprint = parse(
            r#"
node_templates:
  network:
    type: t
    properties:
      use_external_resource: true
"#,
        );
        let issues = validate_blueprint(&blueprint);
        assert!(has_errors(&issues));
        assert!(issues.iter().any(|i| i.message.contains("resource_id")));
    }

    #[test]
    fn test_operation_input_expression_checked() {
        let blueprint = parse(
            r#"
node_templates:
  vm:
    type: t
    interfaces:
      lifecycle:
        create:
          implementation: openstack.nova_plugin.server.create
          inputs:
            args:
              image: { get_input: nonexistent }
"#,
        );
        let issues = validate_blueprint(&blueprint);
        assert!(has_errors(&issues));
        assert!(issues.iter().any(|i| i.message.contains("nonexistent")));
    }
}
