use clap::Parser;
use secure_site_edge::config::SiteConfig;
use secure_site_edge::stack::{self, HeaderMode};

/// Prints the site stack as a CloudFormation template.
#[derive(Parser)]
#[command(name = "synth")]
#[command(about = "Render the static website stack template", long_about = None)]
struct Cli {
    /// The domain name for the site to use
    #[arg(short, long)]
    domain_name: String,

    /// Location of the built site assets to deploy
    #[arg(short = 's', long)]
    deployment_source: String,

    /// How security headers are attached to responses
    #[arg(long, value_enum, default_value_t = HeaderMode::default())]
    headers: HeaderMode,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let site = SiteConfig::new(cli.domain_name, cli.deployment_source)?;
    tracing::info!(domain = %site.domain_name, mode = ?cli.headers, "rendering stack");

    let template = stack::template(&site, cli.headers);
    println!("{}", serde_json::to_string_pretty(&template)?);
    Ok(())
}
