use thiserror::Error;

#[derive(Error, Debug)]
pub enum RateMyFitError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。`ratemyfit config --set-api-key YOUR_KEY` で設定してください")]
    MissingApiKey,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("画像が空です")]
    EmptyImage,

    #[error("画像サイズが上限を超えています: {size} bytes (上限 {limit} bytes)")]
    ImageTooLarge { size: usize, limit: usize },

    #[error("対応していない画像形式です: {0}")]
    UnsupportedImage(String),

    #[error("API呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("HTTPエラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] rate_my_fit_common::Error),
}

impl RateMyFitError {
    /// 送信前に弾かれる入力エラーか
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            RateMyFitError::EmptyImage
                | RateMyFitError::ImageTooLarge { .. }
                | RateMyFitError::UnsupportedImage(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, RateMyFitError>;
