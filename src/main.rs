use clap::Parser;
use rate_my_fit::analyzer::HttpAnalyzer;
use rate_my_fit::bootstrap::{HttpStorage, StorageBootstrap};
use rate_my_fit::notify::{ConsoleNotifier, Notifier};
use rate_my_fit::poller::{PollerCallbacks, WardrobePoller};
use rate_my_fit::upload::{read_image_file, AnalysisFlow, AnalysisOutcome};
use rate_my_fit::wardrobe::{rows_for_ids, HttpWardrobe, WardrobeSource};
use rate_my_fit::{cli, config, error};
use rate_my_fit_common::{extract_clothing_items, extract_colors, WardrobeItem};
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let config = Config::load()?;

    match cli.command {
        Commands::Analyze { image, gender, mode, output } => {
            println!("👗 ratemyfit - コーデ解析\n");

            let bytes = read_image_file(&image, config.max_image_bytes)?;
            let api_key = config.get_api_key()?;
            let base_url = config.get_base_url();

            let storage = HttpStorage::new(&base_url, api_key.clone(), config.request_timeout())?;
            if let Err(e) = StorageBootstrap::new().ensure_initialized(&storage).await {
                log::warn!("storage bootstrap skipped: {}", e);
            }

            let analyzer = HttpAnalyzer::new(&base_url, api_key, config.request_timeout())?;
            let mut flow = AnalysisFlow::new(
                analyzer,
                Arc::new(ConsoleNotifier),
                config.dedup_config(),
                config.max_image_bytes,
            );

            println!("[1/2] AI解析中... ({}, {})", gender, mode);
            let result = match flow.submit(&bytes, gender, mode).await? {
                AnalysisOutcome::Completed(result) => result,
                AnalysisOutcome::Duplicate | AnalysisOutcome::AtCapacity => {
                    println!("同じ解析が進行中のためスキップしました");
                    return Ok(());
                }
            };

            println!("\nスコア: {:.1} / 10", result.score);
            println!("{}", result.feedback);
            for suggestion in &result.suggestions {
                println!("  - {}", suggestion);
            }

            let items = extract_clothing_items(&result.feedback);
            if !items.is_empty() {
                println!("\n検出アイテム:");
                for item in &items {
                    println!("  - {}", item.name);
                }
            }

            if let Some(output) = output {
                println!("\n[2/2] 結果を保存中...");
                let json = serde_json::to_string_pretty(&result)?;
                std::fs::write(&output, json)?;
                println!("✔ 結果を保存: {}", output.display());
            }
        }

        Commands::Watch { ids } => {
            println!("🧺 ratemyfit - アイテム画像の待機\n");

            let api_key = config.get_api_key()?;
            let source = Arc::new(HttpWardrobe::new(
                &config.get_base_url(),
                api_key,
                config.request_timeout(),
            )?);

            let notifier = Arc::new(ConsoleNotifier);
            let current = source.fetch_clothing_items(&ids).await?;
            let (items, missing) = rows_for_ids(&ids, current);
            if !missing.is_empty() {
                log::warn!("{} wardrobe rows not found", missing.len());
                notifier.warning(&format!(
                    "見つからない行があります（{}件）: {}",
                    missing.len(),
                    missing.join(", ")
                ));
            }

            let mut poller = WardrobePoller::new(source, notifier, config.poller_config());
            let callbacks = PollerCallbacks::new(|items: Vec<WardrobeItem>| {
                for item in &items {
                    let ready = item.extracted_clothing_items.len() - item.pending_render_count();
                    println!(
                        "  {}: {}/{}",
                        item.id,
                        ready,
                        item.extracted_clothing_items.len()
                    );
                }
            });

            if !poller.start(items, callbacks) {
                println!("✔ すべてのアイテム画像が揃っています");
                return Ok(());
            }

            tokio::select! {
                _ = poller.wait() => println!("\n✅ すべてのアイテム画像が揃いました"),
                _ = tokio::signal::ctrl_c() => println!("\n中断しました"),
            }
        }

        Commands::Extract { input } => {
            let text = std::fs::read_to_string(&input)?;

            println!("アイテム:");
            for item in extract_clothing_items(&text) {
                println!(
                    "  - {} ({})",
                    item.name,
                    item.category.as_deref().unwrap_or("-")
                );
            }
            println!("色: {}", extract_colors(&text).join(", "));
        }

        Commands::Config { set_api_key, set_base_url, show } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if let Some(url) = set_base_url {
                config.set_base_url(url)?;
                println!("✔ ベースURLを設定しました");
            }

            if show {
                println!("設定:");
                println!("  ベースURL: {}", config.get_base_url());
                println!("  重複抑止: {}ms", config.dedup_window_ms);
                println!("  同時実行数: {}", config.max_concurrent_requests);
                println!("  ポーリング間隔: {}秒", config.poll_interval_secs);
                println!("  APIキー: {}", if config.api_key.is_some() { "設定済み" } else { "未設定" });
            }
        }
    }

    Ok(())
}
