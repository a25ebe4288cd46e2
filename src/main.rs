use anyhow::{Result, bail};
use clap::Parser;
use log::info;
use relsite::{
    config::Config,
    github::{GitHub, SponsorError, SponsorFetcher},
    http::build_http_client,
    page::{PageOutcome, Revalidator, generate_download_page, load_versions, write_atomic},
    platform::{Platform, PlatformState},
};
use std::path::PathBuf;

/// relsite - download page generator
///
/// Builds the downloads page of the project site from GitHub releases and
/// lists the project's GitHub sponsors.
///
/// Examples:
///   relsite --owner acme --repo app generate -o public/download.html
///   relsite sponsors
#[derive(Parser, Debug)]
#[command(author, version = env!("RELSITE_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// GitHub API URL (defaults to https://api.github.com)
    #[arg(long = "api-url", value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Base URL of sponsor profile links (defaults to https://github.com)
    #[arg(long = "site-url", value_name = "URL", global = true)]
    pub site_url: Option<String>,

    /// Personal access token, required for listing sponsors
    #[arg(
        long,
        env = "GITHUB_PERSONAL_ACCESS_TOKEN",
        hide_env_values = true,
        global = true
    )]
    pub token: Option<String>,

    /// Owner of the repository whose releases are shown
    #[arg(long, env = "GITHUB_USERNAME", global = true)]
    pub owner: Option<String>,

    /// Name of the repository whose releases are shown
    #[arg(long, env = "GITHUB_REPO", global = true)]
    pub repo: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Render the download page
    Generate(GenerateArgs),

    /// Print the displayed versions as JSON
    Versions,

    /// Print the sponsors as JSON
    Sponsors,
}

#[derive(clap::Args, Debug)]
pub struct GenerateArgs {
    /// Write the page to this file instead of stdout
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Pre-render for a platform identifier such as "Win32" or "MacIntel"
    #[arg(long, value_name = "IDENTIFIER")]
    pub platform: Option<String>,

    /// Keep running and regenerate the page every five minutes
    #[arg(long, requires = "output")]
    pub watch: bool,

    /// AUR package to advertise in the Linux section (repeatable)
    #[arg(long = "aur-package", value_name = "NAME")]
    pub aur_packages: Vec<String>,
}

impl Cli {
    fn config(&self) -> Result<Config> {
        Config::new(
            self.api_url.clone(),
            self.site_url.as_deref(),
            self.token.clone(),
            self.owner.clone(),
            self.repo.clone(),
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let config = cli.config()?;
    let http_client = build_http_client()?;

    match cli.command {
        Commands::Generate(args) => {
            let config = config.with_aur_packages(args.aur_packages);
            let mut platform = PlatformState::new();
            if let Some(identifier) = &args.platform {
                platform.refine(identifier);
            }
            let source = GitHub::new(http_client, &config.api_url);

            match (args.watch, args.output) {
                (true, Some(output)) => {
                    info!("Regenerating {} periodically", output.display());
                    Revalidator::new(config, source, platform.current(), output)
                        .run()
                        .await?
                }
                (_, output) => generate(&config, &source, platform.current(), output).await?,
            }
        }
        Commands::Versions => {
            let Ok(repo) = config.repository() else {
                bail!("not found: repository owner and name are not configured");
            };
            let source = GitHub::new(http_client, &config.api_url);
            let versions = load_versions(&source, repo).await?;
            println!("{}", serde_json::to_string_pretty(&versions)?);
        }
        Commands::Sponsors => {
            let fetcher = SponsorFetcher::new(http_client, &config);
            match fetcher.fetch_sponsors().await {
                Ok(sponsors) => println!("{}", serde_json::to_string_pretty(&sponsors)?),
                Err(SponsorError::Disabled(reason)) => bail!("sponsors unavailable: {}", reason),
                Err(err) => return Err(err.into()),
            }
        }
    }
    Ok(())
}

async fn generate(
    config: &Config,
    source: &GitHub,
    platform: Platform,
    output: Option<PathBuf>,
) -> Result<()> {
    let html = match generate_download_page(config, source, platform).await? {
        PageOutcome::Found(html) => html,
        PageOutcome::NotFound => {
            bail!("not found: repository owner and name are not configured")
        }
    };

    match output {
        Some(path) => {
            write_atomic(&path, &html).await?;
            info!("Wrote {}", path.display());
        }
        None => print!("{}", html),
    }
    Ok(())
}
