//! House price pipeline - Main Entry Point

use clap::Parser;
use house_price_pipeline::cli::{build_config, cmd_info, cmd_predict, cmd_train, Cli, Commands, TrainOverrides};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "house_price=info,house_price_pipeline=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            data,
            params,
            output_dir,
            target,
            id_column,
            no_id,
            degree,
            test_size,
            random_state,
        } => {
            let overrides = TrainOverrides {
                target,
                id_column,
                no_id,
                degree,
                test_size,
                random_state,
            };
            let config = build_config(params.as_deref(), &overrides)?;
            cmd_train(&data, &output_dir, config)?;
        }
        Commands::Predict { model, data, output } => {
            cmd_predict(&model, &data, output.as_deref())?;
        }
        Commands::Info { data, target, id_column } => {
            cmd_info(&data, &target, &id_column)?;
        }
    }

    Ok(())
}
