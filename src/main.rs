mod report;

use std::env;
use std::error::Error;

use log::info;
use report::Report;
use truss3d::{read_model, AnalysisOptions};

const USAGE: &str = "usage: truss3d <model-file> [--json] [--case <id>]";

/// Command line settings.
#[derive(Debug, Default, PartialEq)]
struct Settings {
    path: String,
    json: bool,
    case: Option<usize>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Settings, String> {
    let mut settings = Settings::default();
    let mut path = None;
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => settings.json = true,
            "--case" => {
                let id = args.next().ok_or("--case needs a load case id")?;
                let id = id
                    .parse()
                    .map_err(|_| format!("invalid load case id '{id}'"))?;
                settings.case = Some(id);
            }
            "-h" | "--help" => return Err(USAGE.to_string()),
            flag if flag.starts_with("--") => {
                return Err(format!("unknown option '{flag}'\n{USAGE}"))
            }
            _ if path.is_none() => path = Some(arg),
            _ => return Err(format!("unexpected argument '{arg}'\n{USAGE}")),
        }
    }
    settings.path = path.ok_or(USAGE)?;
    Ok(settings)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let settings = parse_args(env::args().skip(1))?;
    let mut model = read_model(&settings.path)?;
    info!(
        "loaded {}: {} nodes, {} members",
        settings.path,
        model.node_count(),
        model.member_count()
    );

    let mut options = AnalysisOptions::default();
    if let Some(case) = settings.case {
        options = options.with_load_case(case);
    }
    let results = model.evaluate(&options)?;

    if settings.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print!("{}", Report::new(&model, &results));
    }

    Ok(())
}
