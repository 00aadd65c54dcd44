//! TopoFlow Core
//!
//! ブループリント（宣言的トポロジ定義）のコア機能を提供します。
//!
//! - モデル: ノードテンプレート、リレーションシップ、入力・出力
//! - パーサー・ローダー: YAMLパースとimportマージ
//! - 遅延式: get_input / get_property / get_attribute / concat の評価
//! - 依存グラフ: ライフサイクル順序の決定と循環検出
//! - 検証: ドキュメントレベルの検証レポート

pub mod error;
pub mod graph;
pub mod intrinsic;
pub mod loader;
pub mod model;
pub mod parser;
pub mod validate;

pub use error::{BlueprintError, Result};
pub use graph::DependencyGraph;
pub use intrinsic::{AttributeLookup, EvalContext, Intrinsic, Value};
pub use loader::{find_blueprint_file, load_blueprint, load_blueprint_from_dir};
pub use model::{
    Blueprint, Group, InputDef, InputType, NodeTemplate, Operation, OutputDef, Policy,
    Relationship, RelationshipKind,
};
pub use parser::{parse_blueprint_file, parse_blueprint_str};
pub use validate::{Severity, ValidationIssue, has_errors, validate_blueprint};
