// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::Config;
use nexora_app::{ActivityController, MemoryStorage};
use runtime::PortalStorage;
use std::env;
use std::path::PathBuf;
use tracing::info;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `nexora --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    let db_path = if options.demo {
        PathBuf::from(":memory:")
    } else {
        config.db_path()?
    };
    if options.print_db_path {
        println!("{}", db_path.display());
        return Ok(());
    }

    let filter = runtime::resolve_log_filter(env::var("NEXORA_LOG").ok(), config.log_filter())?;
    runtime::init_logging(filter, &config.log_path()?)?;

    let mut storage = if options.demo {
        PortalStorage::Memory(MemoryStorage::new())
    } else {
        let store = runtime::open_store(&db_path)?;
        if options.reset {
            let removed = store
                .clear_activities()
                .context("reset stored activities")?;
            info!(removed, path = %db_path.display(), "reset stored activities");
        }
        PortalStorage::Sqlite(store)
    };

    if options.check_only {
        let stored = runtime::check_storage(&mut storage)
            .with_context(|| format!("check database {}", db_path.display()))?;
        info!(stored = ?stored, path = %db_path.display(), "check passed");
        return Ok(());
    }

    let mut controller = ActivityController::load(storage, config.page_size())
        .with_context(|| format!("start portal with database {}", db_path.display()))?;
    info!(
        count = controller.state().activities().len(),
        demo = options.demo,
        "portal ready"
    );

    nexora_tui::run_app(&mut controller)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_db_path: bool,
    demo: bool,
    reset: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_db_path: false,
        demo: false,
        reset: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-path" => {
                options.print_db_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--reset" => {
                options.reset = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    if options.check_only && options.reset {
        return Err(anyhow!("--reset rewrites stored activities; drop it when running --check"));
    }

    if options.demo && options.reset {
        return Err(anyhow!(
            "--reset has no effect with --demo; demo sessions always start from the default activities"
        ));
    }

    Ok(options)
}

fn print_help() {
    println!("nexora client portal");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-path             Print resolved database path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --demo                   Launch with the default activities (in-memory)");
    println!("  --reset                  Drop stored activities and restore the defaults");
    println!("  --check                  Validate config + DB + stored activities (read-only)");
    println!("  --help                   Show this help");
}
