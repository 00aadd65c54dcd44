use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlueprintError {
    #[error("YAMLパースエラー: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("ファイル読み込みエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("IO エラー: {path}\n理由: {message}")]
    IoError { path: PathBuf, message: String },

    #[error(
        "ブループリントが見つかりません\n探索開始位置: {0}\nヒント: blueprint.yaml ファイルを含むディレクトリで実行してください"
    )]
    BlueprintNotFound(PathBuf),

    #[error("無効なブループリント: {0}")]
    InvalidBlueprint(String),

    #[error("ノードテンプレートが見つかりません: {0}")]
    NodeNotFound(String),

    #[error("ノードテンプレート '{0}' が重複定義されています")]
    DuplicateNode(String),

    #[error("入力が定義されていません: {0}")]
    InputNotFound(String),

    #[error("プロパティが見つかりません: {node}.{path}")]
    PropertyNotFound { node: String, path: String },

    #[error("循環依存が検出されました: {0}")]
    CircularDependency(String),

    #[error("式の評価に失敗しました: {0}")]
    ExpressionError(String),
}

pub type Result<T> = std::result::Result<T, BlueprintError>;
