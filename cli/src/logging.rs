use fern::{
    colors::{Color, ColoredLevelConfig},
    Dispatch,
};
use log::LevelFilter;

/// Logs go to stderr, stdout only ever carries the JSON result. Records from
/// other crates keep their target so they can be told apart.
pub fn init(level_filter: LevelFilter) -> Result<(), fern::InitError> {
    let colors = ColoredLevelConfig::new()
        .trace(Color::BrightBlack)
        .debug(Color::Cyan)
        .info(Color::Green)
        .warn(Color::Yellow)
        .error(Color::Red);

    Dispatch::new()
        .format(move |out, message, record| {
            let level = colors.color(record.level());
            if is_own(record.target()) {
                out.finish(format_args!("{level:>5} {message}"))
            } else {
                out.finish(format_args!("{level:>5} {}: {message}", record.target()))
            }
        })
        .level(level_filter)
        .chain(std::io::stderr())
        .apply()?;

    Ok(())
}

fn is_own(target: &str) -> bool {
    ["mcquery", "network", "protocol"]
        .iter()
        .any(|name| target == *name || target.starts_with(&format!("{name}::")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workspace_targets_are_own() {
        assert!(is_own("mcquery"));
        assert!(is_own("network::deadline"));
        assert!(is_own("protocol::query::stat"));
        assert!(!is_own("tokio::net"));
        assert!(!is_own("networking"));
    }
}
