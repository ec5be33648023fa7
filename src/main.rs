use clap::Parser;
use shopee_bestseller::core::{export::DEFAULT_OUTPUT, report};
use shopee_bestseller::domain::ports::Storage;
use shopee_bestseller::utils::{logger, validation::Validate};
use shopee_bestseller::{
    BestSellerPipeline, CliArgs, LocalStorage, Result, RunConfig, RunReport, Runner, Settings,
    ShopeeClient, StopSignal, TomlConfig,
};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.log_json {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting shopee-bestseller");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    let stop = StopSignal::new();
    let on_ctrl_c = stop.clone();
    tokio::spawn(async move {
        // 第一次 Ctrl-C 保留已抓到的結果，第二次直接結束
        while tokio::signal::ctrl_c().await.is_ok() {
            if on_ctrl_c.interrupt() {
                eprintln!("🛑 Interrupted again, exiting without saving");
                std::process::exit(130);
            }
            tracing::warn!("🛑 Stopping... results fetched so far will be kept (Ctrl-C again to quit)");
        }
    });

    match run(&args, stop).await {
        Ok(report) => {
            if !args.quiet {
                print!("{}", report::render_table(&report.products));
            }
            if report.stopped {
                println!("🛑 Stopped early, partial results only");
            }
            match &report.output_path {
                Some(path) => println!("📁 Saved to: {}", path),
                None => println!("⚠️ No products found, nothing exported"),
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            std::process::exit(e.exit_code());
        }
    }

    Ok(())
}

/// 合併設定（已保存 < TOML < 命令列）後執行一次抓取
async fn run(args: &CliArgs, stop: StopSignal) -> Result<RunReport> {
    let storage = LocalStorage::default();

    let settings_path = args
        .settings_file
        .as_ref()
        .map(PathBuf::from)
        .or_else(Settings::default_path);
    let mut settings = match &settings_path {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };

    let profile = match &args.config {
        Some(path) => {
            tracing::info!("📁 Loading profile from: {}", path);
            let profile = TomlConfig::from_file(path)?;
            profile.validate()?;
            profile
        }
        None => TomlConfig::default(),
    };
    profile.apply_to_settings(&mut settings);
    args.apply_to_settings(&mut settings);

    if let Some(path) = &args.keywords_file {
        let data = storage.read_file(path).await?;
        settings.batch = true;
        settings.batch_text = String::from_utf8_lossy(&data).into_owned();
    }

    let mut client_options = profile.client_options(&settings.domain);
    if let Some(base_url) = &args.base_url {
        client_options.base_url = Some(base_url.clone());
    }

    let output_path = args
        .output
        .clone()
        .or_else(|| profile.output().map(str::to_string))
        .unwrap_or_else(|| DEFAULT_OUTPUT.to_string());

    let config = RunConfig::new(settings, client_options, output_path)?;

    if !args.no_save {
        if let Some(path) = &settings_path {
            match config.settings.save(path) {
                Ok(()) => tracing::debug!("Settings saved to {}", path.display()),
                Err(e) => tracing::warn!("Could not save settings to {}: {}", path.display(), e),
            }
        }
    }

    tracing::info!(
        "✅ {} on {}, {} page(s) per search, output {}",
        config.settings.mode,
        config.settings.domain,
        config.settings.pages,
        config.output_path
    );
    if args.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let client = ShopeeClient::new(config.client.clone(), stop)?;
    let pipeline = BestSellerPipeline::new(storage, config, client);
    let runner = Runner::new_with_monitoring(pipeline, args.monitor);

    runner.run().await
}
