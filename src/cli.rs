use clap::{Parser, Subcommand};
use rate_my_fit_common::{FeedbackMode, Gender};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ratemyfit")]
#[command(about = "コーデ写真のAI評価とワードローブ画像の同期", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// コーデ写真を解析して評価を表示
    Analyze {
        /// 写真ファイルのパス
        #[arg(required = true)]
        image: PathBuf,

        /// 性別 (male/female/non-binary)
        #[arg(short, long, default_value = "male")]
        gender: Gender,

        /// フィードバックモード (normal/roast)
        #[arg(short, long, default_value = "normal")]
        mode: FeedbackMode,

        /// 結果JSONの出力先
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// ワードローブのアイテム画像が揃うまで待つ
    Watch {
        /// ワードローブ行のID
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// フィードバック文から服アイテムと色を抽出
    Extract {
        /// テキストファイル
        #[arg(required = true)]
        input: PathBuf,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// バックエンドのベースURLを設定
        #[arg(long)]
        set_base_url: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::parse_from([
            "ratemyfit", "analyze", "fit.jpg", "--gender", "female", "--mode", "roast", "-v",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Analyze { image, gender, mode, output } => {
                assert_eq!(image, PathBuf::from("fit.jpg"));
                assert_eq!(gender, Gender::Female);
                assert_eq!(mode, FeedbackMode::Roast);
                assert!(output.is_none());
            }
            _ => panic!("Expected Analyze"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_mode() {
        let result = Cli::try_parse_from(["ratemyfit", "analyze", "fit.jpg", "--mode", "savage"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_watch_ids() {
        let cli = Cli::parse_from(["ratemyfit", "watch", "w1", "w2"]);
        match cli.command {
            Commands::Watch { ids } => assert_eq!(ids, vec!["w1", "w2"]),
            _ => panic!("Expected Watch"),
        }
    }
}
