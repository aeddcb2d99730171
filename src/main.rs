use std::path::PathBuf;

use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};

use snapmark::capture::image::{crop_region, load_base_image};
use snapmark::config::SnapmarkConfig;
use snapmark::session::annotation::AnnotationSession;
use snapmark::session::script::{load_steps, replay};
use snapmark::storage::ScreenshotStore;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Command::new("snapmark")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Annotate screenshots with arrows, numbered pins and redactions")
        .subcommand_required(true)
        .subcommand(
            Command::new("annotate")
                .about("Replay an annotation script over an image and save the result")
                .arg(
                    Arg::new("image")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Base screenshot"),
                )
                .arg(
                    Arg::new("script")
                        .long("script")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON list of session steps"),
                )
                .arg(
                    Arg::new("title")
                        .long("title")
                        .default_value("")
                        .help("Screenshot title"),
                )
                .arg(
                    Arg::new("description")
                        .long("description")
                        .default_value("")
                        .help("Screenshot description"),
                )
                .arg(
                    Arg::new("out-dir")
                        .long("out-dir")
                        .value_parser(value_parser!(PathBuf))
                        .help("Save directory (defaults to the configured one)"),
                )
                .arg(
                    Arg::new("region")
                        .long("region")
                        .value_parser(parse_region)
                        .help("Crop the image to X1,Y1,X2,Y2 before annotating"),
                )
                .arg(
                    Arg::new("print-metadata")
                        .long("print-metadata")
                        .action(ArgAction::SetTrue)
                        .help("Print the metadata JSON after saving"),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Print the effective configuration")
                .arg(
                    Arg::new("write")
                        .long("write")
                        .action(ArgAction::SetTrue)
                        .help("Write it back to the config file, filling in defaults"),
                ),
        );

    let matches = cli.get_matches();
    match matches.subcommand() {
        Some(("annotate", args)) => annotate(args),
        Some(("config", args)) => config(args),
        _ => Ok(()),
    }
}

fn config(args: &ArgMatches) -> anyhow::Result<()> {
    let config = SnapmarkConfig::load();
    if args.get_flag("write") {
        config.save();
        if let Some(path) = SnapmarkConfig::path() {
            log::info!("Wrote {}", path.display());
        }
    }
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn annotate(args: &ArgMatches) -> anyhow::Result<()> {
    let image = args
        .get_one::<PathBuf>("image")
        .context("missing image argument")?;
    let script = args
        .get_one::<PathBuf>("script")
        .context("missing --script argument")?;
    let title = args.get_one::<String>("title").map_or("", String::as_str);
    let description = args
        .get_one::<String>("description")
        .map_or("", String::as_str);

    let config = SnapmarkConfig::load();

    let mut base = load_base_image(image)?;
    if let Some(&(x1, y1, x2, y2)) = args.get_one::<(i32, i32, i32, i32)>("region") {
        base = crop_region(&base, (x1, y1), (x2, y2))
            .context("Region is smaller than 5x5 pixels or outside the image")?;
    }

    let steps = load_steps(script)?;
    let mut session = AnnotationSession::new(base, &config);
    let outcomes = replay(&mut session, &steps)?;
    log::info!(
        "Replayed {} steps, {} markers placed",
        outcomes.len(),
        session.store().len()
    );

    let finalized = session.finalize(title, description)?;
    let store = match args.get_one::<PathBuf>("out-dir") {
        Some(dir) => ScreenshotStore::new(dir),
        None => ScreenshotStore::from_config(&config),
    };
    let saved = store.save(&finalized.image, &finalized.metadata)?;

    println!("{}", saved.png.display());
    if args.get_flag("print-metadata") {
        println!("{}", serde_json::to_string_pretty(&finalized.metadata)?);
    }
    Ok(())
}

/// Parse `X1,Y1,X2,Y2`
fn parse_region(s: &str) -> Result<(i32, i32, i32, i32), String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<i32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid coordinate: {e}"))?;
    match parts.as_slice() {
        [x1, y1, x2, y2] => Ok((*x1, *y1, *x2, *y2)),
        _ => Err(format!("expected X1,Y1,X2,Y2, got {} values", parts.len())),
    }
}
