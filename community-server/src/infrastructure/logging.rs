use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

/// Query logging from sqlx is per statement; keep it at warn unless the
/// directive mentions it.
const QUIET_TARGETS: &[&str] = &["sqlx=warn"];

pub(crate) fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(filter_directives(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .compact()
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(())
}

fn filter_directives(level: &str) -> String {
    let level = level.trim();
    let mut directives = vec![level.to_string()];
    for quiet in QUIET_TARGETS {
        let target = quiet.split('=').next().unwrap_or_default();
        if !level.contains(target) {
            directives.push((*quiet).to_string());
        }
    }
    directives.join(",")
}

#[cfg(test)]
mod tests {
    use super::filter_directives;

    #[test]
    fn quiet_targets_are_appended_unless_mentioned() {
        assert_eq!(filter_directives(" debug "), "debug,sqlx=warn");
        assert_eq!(filter_directives("info,sqlx=debug"), "info,sqlx=debug");
    }
}
