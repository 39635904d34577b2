/// Replays a scripted session against an in-memory viewer and prints every
/// overlay event as one JSON line.
///
/// Usage: `siteplan-replay <script.json> [config.json]`
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use siteplan::config::OverlayConfig;
    use siteplan::replay::{self, ReplayScript};

    let mut args = std::env::args().skip(1);
    let Some(script_path) = args.next() else {
        eprintln!("Usage: siteplan-replay <script.json> [config.json]");
        std::process::exit(2);
    };

    let config = match args.next() {
        Some(path) => match OverlayConfig::load(std::path::Path::new(&path)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => OverlayConfig::load_from_default_path().unwrap_or_default(),
    };

    env_logger::Builder::new()
        .filter_level(config.log_level.to_level_filter())
        .parse_default_env()
        .init();

    let script = match std::fs::read_to_string(&script_path)
        .map_err(siteplan::OverlayError::from)
        .and_then(|json| ReplayScript::from_json(&json))
    {
        Ok(script) => script,
        Err(e) => {
            eprintln!("Failed to read replay script {}: {}", script_path, e);
            std::process::exit(1);
        }
    };

    for event in replay::run(&script, &config) {
        match serde_json::to_string(&event) {
            Ok(line) => println!("{}", line),
            Err(e) => log::error!("Failed to serialize event {:?}: {}", event, e),
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}
