use clap::Parser;
use contact_lookup::core::export;
use contact_lookup::utils::{logger, validation::Validate};
use contact_lookup::{LookupArgs, LookupPipeline};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = LookupArgs::parse();

    logger::init_cli_logger(args.source.verbose);

    let config = match args.source.load().and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    let pipeline = LookupPipeline::from_config(Arc::new(config))?;

    let outcome = match pipeline.run(&args.phone).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("❌ Lookup failed: {} (Category: {:?})", e, e.category());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(2);
        }
    };

    for warning in &outcome.warnings {
        tracing::warn!("⚠️ {}", warning);
    }

    let rendered = export::render(&outcome, args.format)?;
    match &args.output {
        Some(path) => {
            tokio::fs::write(path, rendered.as_bytes()).await?;
            tracing::info!("📁 {} records saved to: {}", outcome.records.len(), path.display());
        }
        None => println!("{}", rendered),
    }

    Ok(())
}
