mod site;

use anyhow::Result;
use plainmark_config::Config;
use std::{env, process};

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    // Posts directory from CLI args or config file
    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();

    let config;
    let from_config;

    if args.len() == 2 {
        config = Config::new(&args[1]);
        from_config = false;
    } else if args.len() == 1 {
        match Config::load() {
            Ok(Some(loaded)) => {
                config = loaded;
                from_config = true;
            }
            Ok(None) => {
                eprintln!("Error: No posts directory provided and no config file found");
                eprintln!("Usage: {} <posts-directory>", args[0]);
                eprintln!("Or create a config file at {}", config_path.display());
                process::exit(1);
            }
            Err(e) => {
                eprintln!("Error: Failed to load config file: {e}");
                eprintln!("Usage: {} <posts-directory>", args[0]);
                process::exit(1);
            }
        }
    } else {
        eprintln!("Usage: {} [posts-directory]", args[0]);
        process::exit(1);
    };

    if let Err(e) = site::validate_posts_dir(&config.posts_dir) {
        let source = if from_config {
            format!(" from config file '{}'", config_path.display())
        } else {
            String::new()
        };
        eprintln!(
            "Error: Posts directory '{}'{} is invalid: {e}",
            config.posts_dir.display(),
            source
        );
        process::exit(1);
    }

    let built = site::build_site(&config)?;
    let degraded: usize = built.iter().map(|file| file.degradations).sum();
    for file in &built {
        println!("{file}");
    }
    if degraded > 0 {
        log::warn!("{degraded} malformed construct(s) rendered as literal text");
    }
    println!("Built all files");

    Ok(())
}
