//! 遅延式（deferred expression）
//!
//! ブループリント内の値は、静的な値に加えてデプロイ時に解決される
//! 遅延式（get_input / get_property / get_attribute / concat）を持てます。
//! パース時には解決せず、デプロイ・出力解決のタイミングで
//! [`EvalContext`] が評価します。

use crate::error::{BlueprintError, Result};
use crate::model::Blueprint;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// 式のネスト解決の上限（プロパティが相互参照するケースの暴走防止）
const MAX_EVAL_DEPTH: usize = 32;

/// ブループリント内の値
///
/// YAMLの任意の値に加えて、どの位置にも遅延式を書けます。
/// untaggedのため `{ get_input: port }` のような1キーのマップは
/// 遅延式として、それ以外のマップは通常のマップとしてパースされます。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// 遅延式（最初にマッチを試行）
    Call(Intrinsic),
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

/// 遅延式の種類
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Intrinsic {
    /// デプロイ時入力への参照
    #[serde(rename = "get_input")]
    GetInput(String),
    /// ノードテンプレートの静的プロパティへの参照: [ノード名, プロパティ, ...パス]
    #[serde(rename = "get_property")]
    GetProperty(Vec<String>),
    /// ノードインスタンスのランタイム属性への参照: [ノード名, 属性, ...パス]
    #[serde(rename = "get_attribute")]
    GetAttribute(Vec<String>),
    /// 各要素を解決して文字列連結
    #[serde(rename = "concat")]
    Concat(Vec<Value>),
}

impl Value {
    /// 遅延式を含まない静的な値かどうか
    pub fn is_static(&self) -> bool {
        match self {
            Value::Call(_) => false,
            Value::List(items) => items.iter().all(Value::is_static),
            Value::Map(map) => map.values().all(Value::is_static),
            _ => true,
        }
    }

    /// 静的な値をJSONへ変換（遅延式が残っていればエラー）
    pub fn to_json(&self) -> Result<serde_json::Value> {
        match self {
            Value::Call(_) => Err(BlueprintError::ExpressionError(
                "未解決の遅延式が含まれています".to_string(),
            )),
            Value::Null => Ok(serde_json::Value::Null),
            Value::Bool(b) => Ok(serde_json::Value::Bool(*b)),
            Value::Int(n) => Ok(serde_json::Value::from(*n)),
            Value::Float(f) => Ok(serde_json::Value::from(*f)),
            Value::String(s) => Ok(serde_json::Value::String(s.clone())),
            Value::List(items) => Ok(serde_json::Value::Array(
                items.iter().map(Value::to_json).collect::<Result<_>>()?,
            )),
            Value::Map(map) => {
                let mut object = serde_json::Map::new();
                for (key, value) in map {
                    object.insert(key.clone(), value.to_json()?);
                }
                Ok(serde_json::Value::Object(object))
            }
        }
    }
}

/// get_attribute をランタイム状態へ解決するための参照
///
/// 実装はデプロイランタイム側（ノードインスタンスのランタイムプロパティ）。
pub trait AttributeLookup {
    /// ノードのランタイム属性を返す（存在しなければ None）
    fn attribute(&self, node: &str, path: &[String]) -> Option<serde_json::Value>;
}

/// 式評価のコンテキスト
///
/// `attributes` が None の場合（静的解決）、get_attribute は
/// ノードテンプレートの静的プロパティへフォールバックします。
pub struct EvalContext<'a> {
    pub blueprint: &'a Blueprint,
    pub inputs: &'a HashMap<String, serde_json::Value>,
    pub attributes: Option<&'a dyn AttributeLookup>,
}

impl EvalContext<'_> {
    /// 値を解決してJSONを返す
    pub fn resolve(&self, value: &Value) -> Result<serde_json::Value> {
        self.resolve_depth(value, 0)
    }

    fn resolve_depth(&self, value: &Value, depth: usize) -> Result<serde_json::Value> {
        if depth > MAX_EVAL_DEPTH {
            return Err(BlueprintError::ExpressionError(
                "式のネストが深すぎます（プロパティの相互参照を確認してください）".to_string(),
            ));
        }
        match value {
            Value::Call(call) => self.resolve_call(call, depth),
            Value::Null => Ok(serde_json::Value::Null),
            Value::Bool(b) => Ok(serde_json::Value::Bool(*b)),
            Value::Int(n) => Ok(serde_json::Value::from(*n)),
            Value::Float(f) => Ok(serde_json::Value::from(*f)),
            Value::String(s) => Ok(serde_json::Value::String(s.clone())),
            Value::List(items) => Ok(serde_json::Value::Array(
                items
                    .iter()
                    .map(|item| self.resolve_depth(item, depth + 1))
                    .collect::<Result<_>>()?,
            )),
            Value::Map(map) => {
                let mut object = serde_json::Map::new();
                for (key, value) in map {
                    object.insert(key.clone(), self.resolve_depth(value, depth + 1)?);
                }
                Ok(serde_json::Value::Object(object))
            }
        }
    }

    fn resolve_call(&self, call: &Intrinsic, depth: usize) -> Result<serde_json::Value> {
        match call {
            Intrinsic::GetInput(name) => self
                .inputs
                .get(name)
                .cloned()
                .ok_or_else(|| BlueprintError::InputNotFound(name.clone())),
            Intrinsic::GetProperty(path) => self.resolve_property(path, depth),
            Intrinsic::GetAttribute(path) => {
                let (node, rest) = split_path(path)?;
                if let Some(attributes) = self.attributes {
                    if let Some(value) = attributes.attribute(node, rest) {
                        return Ok(value);
                    }
                }
                // ランタイム属性が無ければ静的プロパティへフォールバック
                self.resolve_property(path, depth)
            }
            Intrinsic::Concat(parts) => {
                let mut joined = String::new();
                for part in parts {
                    let value = self.resolve_depth(part, depth + 1)?;
                    joined.push_str(&display_form(&value));
                }
                Ok(serde_json::Value::String(joined))
            }
        }
    }

    /// [ノード名, プロパティ, ...パス] を静的プロパティに対して解決
    fn resolve_property(&self, path: &[String], depth: usize) -> Result<serde_json::Value> {
        let (node_name, rest) = split_path(path)?;
        let node = self
            .blueprint
            .node_templates
            .get(node_name)
            .ok_or_else(|| BlueprintError::NodeNotFound(node_name.to_string()))?;
        let Some(first) = rest.first() else {
            return Err(BlueprintError::ExpressionError(format!(
                "get_property / get_attribute にはプロパティ名が必要です: [{}]",
                path.join(", ")
            )));
        };
        let property = node.properties.get(first).ok_or_else(|| {
            BlueprintError::PropertyNotFound {
                node: node_name.to_string(),
                path: rest.join("."),
            }
        })?;
        // プロパティ自体が遅延式のことがあるため、先に解決してからパスを辿る
        let resolved = self.resolve_depth(property, depth + 1)?;
        walk_json(&resolved, &rest[1..]).ok_or_else(|| BlueprintError::PropertyNotFound {
            node: node_name.to_string(),
            path: rest.join("."),
        })
    }
}

fn split_path(path: &[String]) -> Result<(&str, &[String])> {
    match path.split_first() {
        Some((node, rest)) => Ok((node.as_str(), rest)),
        None => Err(BlueprintError::ExpressionError(
            "参照パスが空です".to_string(),
        )),
    }
}

/// JSON値をパスで辿る（マップのキー、リストの数値インデックス）
fn walk_json(value: &serde_json::Value, path: &[String]) -> Option<serde_json::Value> {
    let mut current = value;
    for segment in path {
        current = match current {
            serde_json::Value::Object(map) => map.get(segment)?,
            serde_json::Value::Array(items) => {
                let index: usize = segment.parse().ok()?;
                items.get(index)?
            }
            _ => return None,
        };
    }
    Some(current.clone())
}

/// concat用の文字列形（文字列はそのまま、nullは空、他はJSON表現）
fn display_form(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeTemplate;
    use serde_json::json;

    fn test_blueprint() -> Blueprint {
        let mut blueprint = Blueprint {
            name: "test".to_string(),
            ..Default::default()
        };
        let server: NodeTemplate = serde_yaml::from_str(
            r#"
type: topoflow.nodes.WebServer
properties:
  port: 8080
  server:
    image: { get_input: image }
"#,
        )
        .unwrap();
        blueprint.node_templates.insert("web".to_string(), server);
        blueprint
    }

    fn test_inputs() -> HashMap<String, serde_json::Value> {
        let mut inputs = HashMap::new();
        inputs.insert("image".to_string(), json!("ubuntu-22.04"));
        inputs
    }

    #[test]
    fn test_parse_intrinsic_vs_plain_map() {
        let value: Value = serde_yaml::from_str("{ get_input: port }").unwrap();
        assert_eq!(value, Value::Call(Intrinsic::GetInput("port".to_string())));

        let value: Value = serde_yaml::from_str("{ host: 8080 }").unwrap();
        assert!(matches!(value, Value::Map(_)));
    }

    #[test]
    fn test_parse_nested_concat() {
        let value: Value = serde_yaml::from_str(
            r#"
concat:
  - "http://"
  - { get_attribute: [web, ip] }
  - ":"
  - { get_property: [web, port] }
"#,
        )
        .unwrap();
        let Value::Call(Intrinsic::Concat(parts)) = value else {
            panic!("expected concat");
        };
        assert_eq!(parts.len(), 4);
    }

    #[test]
    fn test_resolve_get_input() {
        let blueprint = test_blueprint();
        let inputs = test_inputs();
        let ctx = EvalContext {
            blueprint: &blueprint,
            inputs: &inputs,
            attributes: None,
        };
        let value = Value::Call(Intrinsic::GetInput("image".to_string()));
        assert_eq!(ctx.resolve(&value).unwrap(), json!("ubuntu-22.04"));
    }

    #[test]
    fn test_resolve_get_input_missing() {
        let blueprint = test_blueprint();
        let inputs = HashMap::new();
        let ctx = EvalContext {
            blueprint: &blueprint,
            inputs: &inputs,
            attributes: None,
        };
        let value = Value::Call(Intrinsic::GetInput("missing".to_string()));
        assert!(matches!(
            ctx.resolve(&value),
            Err(BlueprintError::InputNotFound(_))
        ));
    }

    #[test]
    fn test_resolve_get_property_nested_path() {
        let blueprint = test_blueprint();
        let inputs = test_inputs();
        let ctx = EvalContext {
            blueprint: &blueprint,
            inputs: &inputs,
            attributes: None,
        };
        // プロパティ内の遅延式も解決された上でパスが辿れる
        let value = Value::Call(Intrinsic::GetProperty(vec![
            "web".to_string(),
            "server".to_string(),
            "image".to_string(),
        ]));
        assert_eq!(ctx.resolve(&value).unwrap(), json!("ubuntu-22.04"));
    }

    struct FixedAttributes;

    impl AttributeLookup for FixedAttributes {
        fn attribute(&self, node: &str, path: &[String]) -> Option<serde_json::Value> {
            if node == "web" && path == ["ip"] {
                Some(json!("10.0.0.5"))
            } else {
                None
            }
        }
    }

    #[test]
    fn test_resolve_get_attribute_with_fallback() {
        let blueprint = test_blueprint();
        let inputs = test_inputs();
        let ctx = EvalContext {
            blueprint: &blueprint,
            inputs: &inputs,
            attributes: Some(&FixedAttributes),
        };
        // ランタイム属性から
        let value = Value::Call(Intrinsic::GetAttribute(vec![
            "web".to_string(),
            "ip".to_string(),
        ]));
        assert_eq!(ctx.resolve(&value).unwrap(), json!("10.0.0.5"));
        // ランタイム属性に無ければ静的プロパティへフォールバック
        let value = Value::Call(Intrinsic::GetAttribute(vec![
            "web".to_string(),
            "port".to_string(),
        ]));
        assert_eq!(ctx.resolve(&value).unwrap(), json!(8080));
    }

    #[test]
    fn test_resolve_concat() {
        let blueprint = test_blueprint();
        let inputs = test_inputs();
        let ctx = EvalContext {
            blueprint: &blueprint,
            inputs: &inputs,
            attributes: Some(&FixedAttributes),
        };
        let value: Value = serde_yaml::from_str(
            r#"
concat:
  - "http://"
  - { get_attribute: [web, ip] }
  - ":"
  - { get_property: [web, port] }
"#,
        )
        .unwrap();
        assert_eq!(ctx.resolve(&value).unwrap(), json!("http://10.0.0.5:8080"));
    }

    #[test]
    fn test_is_static() {
        let value: Value = serde_yaml::from_str("{ host: 8080 }").unwrap();
        assert!(value.is_static());
        let value: Value = serde_yaml::from_str("{ nested: { get_input: x } }").unwrap();
        assert!(!value.is_static());
    }
}
