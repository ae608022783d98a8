use clap::Parser;
use virtual_mirror::utils::error::ErrorSeverity;
use virtual_mirror::utils::{logger, validation::Validate};
use virtual_mirror::{
    CliConfig, FitEngine, MirrorSession, OutputFormat, PhotoFrame, ReplayDetector, SessionConfig,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 驗證命令列參數
    if let Err(e) = cli.validate() {
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if cli.log_json || config.json_logging() {
        logger::init_json_logger(cli.verbose, config.log_level());
    } else {
        logger::init_cli_logger(cli.verbose, config.log_level());
    }

    tracing::info!("🚀 Starting virtual-mirror");
    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let (detector, frame_id) = ReplayDetector::for_file(&cli.landmarks);
    let session = MirrorSession::open(detector, SessionConfig::from(&config));
    let mut engine = FitEngine::new(session, config.ranges);

    let frame = PhotoFrame::new(frame_id, cli.canvas);
    let result = engine.run(frame, Ok(cli.garment)).await;
    engine.close();

    match result {
        Ok(report) => {
            tracing::info!("✅ Garment placed");
            match cli.format {
                OutputFormat::Text => print!("{}", report.render_text()),
                OutputFormat::Json => println!("{}", report.to_json()?),
                OutputFormat::Csv => report.write_csv(std::io::stdout().lock())?,
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Fit failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Medium => 2, // 換照片或衣服再試
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }

    Ok(())
}
