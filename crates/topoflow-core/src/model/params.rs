//! 入力・出力定義

use crate::intrinsic::Value;
use serde::{Deserialize, Serialize};

/// 入力パラメータ定義
///
/// デプロイ時に与える名前付きパラメータ。デフォルト値を持てます。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputDef {
    /// 入力の型（省略時は型チェックなし）
    #[serde(rename = "type", default)]
    pub type_name: Option<InputType>,
    #[serde(default)]
    pub description: Option<String>,
    /// デフォルト値（静的な値のみ）
    #[serde(default)]
    pub default: Option<Value>,
}

/// 入力の型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    String,
    Integer,
    Float,
    Boolean,
    List,
    Dict,
}

impl InputType {
    /// 値が型を満たすか
    pub fn matches(&self, value: &serde_json::Value) -> bool {
        match self {
            InputType::String => value.is_string(),
            InputType::Integer => value.is_i64() || value.is_u64(),
            // integerはfloatとしても受け付ける
            InputType::Float => value.is_number(),
            InputType::Boolean => value.is_boolean(),
            InputType::List => value.is_array(),
            InputType::Dict => value.is_object(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::String => "string",
            InputType::Integer => "integer",
            InputType::Float => "float",
            InputType::Boolean => "boolean",
            InputType::List => "list",
            InputType::Dict => "dict",
        }
    }
}

/// 出力定義
///
/// デプロイ成功後、解決済みのノード状態から計算されて公開される値。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputDef {
    #[serde(default)]
    pub description: Option<String>,
    /// 出力値（通常は遅延式）
    pub value: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_input_type_matches() {
        assert!(InputType::String.matches(&json!("abc")));
        assert!(!InputType::String.matches(&json!(1)));
        assert!(InputType::Integer.matches(&json!(42)));
        assert!(!InputType::Integer.matches(&json!(1.5)));
        assert!(InputType::Float.matches(&json!(1.5)));
        assert!(InputType::Float.matches(&json!(2)));
        assert!(InputType::Boolean.matches(&json!(true)));
        assert!(InputType::List.matches(&json!([1, 2])));
        assert!(InputType::Dict.matches(&json!({"a": 1})));
    }

    #[test]
    fn test_input_def_parse() {
        let yaml = r#"
type: string
description: イメージ名
default: ubuntu-22.04
"#;
        let def: InputDef = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(def.type_name, Some(InputType::String));
        assert!(def.default.is_some());
    }
}
