//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use rate_my_fit::error::RateMyFitError;
use rate_my_fit::upload::read_image_file;
use std::path::Path;
use tempfile::tempdir;

/// 存在しない画像ファイル
#[test]
fn test_read_nonexistent_image() {
    let result = read_image_file(Path::new("/nonexistent/path/fit.jpg"), 1024);

    let err = result.unwrap_err();
    assert!(matches!(err, RateMyFitError::FileNotFound(_)));
    assert!(!err.is_validation());
}

/// 画像でないファイル
#[test]
fn test_read_non_image_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("notes.jpg");
    std::fs::write(&path, "not really a jpeg").unwrap();

    let err = read_image_file(&path, 1024).unwrap_err();
    assert!(matches!(err, RateMyFitError::UnsupportedImage(_)));
    assert!(err.is_validation());
}

/// 空ファイル
#[test]
fn test_read_empty_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("empty.png");
    std::fs::write(&path, b"").unwrap();

    assert!(matches!(
        read_image_file(&path, 1024),
        Err(RateMyFitError::EmptyImage)
    ));
}

/// JPEGヘッダのファイルは通る
#[test]
fn test_read_jpeg_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("fit.jpg");
    std::fs::write(&path, [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]).unwrap();

    let bytes = read_image_file(&path, 1024).expect("JPEGとして読めるはず");
    assert_eq!(bytes.len(), 6);
}

/// RateMyFitErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        RateMyFitError::Config("テスト設定エラー".to_string()),
        RateMyFitError::FileNotFound("fit.jpg".to_string()),
        RateMyFitError::EmptyImage,
        RateMyFitError::ImageTooLarge { size: 20, limit: 10 },
        RateMyFitError::UnsupportedImage("Bmp".to_string()),
        RateMyFitError::ApiCall("API呼び出し失敗".to_string()),
        RateMyFitError::ApiParse("不正なJSON".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// MissingApiKeyエラーのメッセージ確認
#[test]
fn test_missing_api_key_message() {
    let display = format!("{}", RateMyFitError::MissingApiKey);

    assert!(display.contains("APIキー"));
    assert!(display.contains("ratemyfit config"));
}

/// 上限超過のメッセージにサイズが含まれる
#[test]
fn test_image_too_large_message() {
    let display = format!("{}", RateMyFitError::ImageTooLarge { size: 2048, limit: 1024 });
    assert!(display.contains("2048"));
    assert!(display.contains("1024"));
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: RateMyFitError = io_err.into();

    assert!(matches!(err, RateMyFitError::Io(_)));
    assert!(format!("{}", err).contains("IO"));
}

/// JSONエラーからの変換
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{ invalid }").unwrap_err();
    let err: RateMyFitError = json_err.into();

    assert!(matches!(err, RateMyFitError::JsonParse(_)));
}

/// common::Errorからの変換（透過的）
#[test]
fn test_common_error_conversion() {
    let common_err = rate_my_fit_common::Error::Parse("パースエラー".to_string());
    let err: RateMyFitError = common_err.into();

    assert!(matches!(err, RateMyFitError::Common(_)));
    assert!(format!("{}", err).contains("パースエラー"));
}
