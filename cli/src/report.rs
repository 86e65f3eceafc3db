use colored::Colorize;
use zipline_config::{ConfigError, Datasource, ValidatedConfig};

/// Every line an operator needs to fix the config in one pass.
pub fn error_lines(err: &ConfigError) -> Vec<String> {
    match err {
        ConfigError::Invalid(validation) => validation.messages(),
        other => vec![other.to_string()],
    }
}

pub fn print_error(err: &ConfigError) {
    tracing::debug!(error = ?err, "Config rejected");

    if matches!(err, ConfigError::Invalid(_)) {
        eprintln!("{} Config is invalid, see below:", "Error:".red().bold());
        for line in error_lines(err) {
            eprintln!("  {} {}", "-".red(), line);
        }
    } else {
        eprintln!("{} {}", "Error:".red().bold(), err);
    }
}

pub fn storage_summary(datasource: &Datasource) -> String {
    match datasource {
        Datasource::Local(local) => format!("local ({})", local.directory),
        Datasource::S3(s3) => format!("s3 (bucket {} at {})", s3.bucket, s3.endpoint),
        Datasource::Swift(swift) => format!("swift (container {})", swift.container),
    }
}

pub fn print_summary(config: &ValidatedConfig) {
    let scheme = if config.core.https { "https" } else { "http" };
    println!("{} Config is valid", "✓".green());
    println!(
        "  Listen:     {}",
        format!("{scheme}://{}:{}", config.core.host, config.core.port).cyan()
    );
    println!("  Datasource: {}", storage_summary(&config.datasource));
    println!("  Title:      {}", config.website.title);
    println!(
        "  Discord:    {}",
        if config.discord.is_some() { "enabled".green() } else { "disabled".yellow() }
    );
}
