use clap::{Parser, Subcommand};
use picture_fallback::config::{self, SiteConfig};
use picture_fallback::loader::FsLoader;
use picture_fallback::metadata::MetadataStore;
use picture_fallback::output;
use picture_fallback::picture::BuildOptions;
use picture_fallback::seo;
use picture_fallback::session::ImageSession;
use picture_fallback::types::Category;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "picture-fallback")]
#[command(about = "Render and audit website images with format negotiation and graceful fallback")]
#[command(long_about = "\
Render and audit website images with format negotiation and graceful fallback

Images are described by a JSON metadata file, grouped by page section:

  {
    \"hero\":     { \"main-banner\": { \"src\": ..., \"webp\": ..., \"optimized\": ... } },
    \"services\": { ... },
    \"about\":    { ... },
    \"reviews\":  { ... },
    \"backgrounds\": { ... },
    \"seo\": { \"defaultImage\": ..., \"businessImages\": [...] }
  }

Each rendered image degrades in order:
  primary source → optimized (or category fallback) → placeholder → error indicator

Run 'picture-fallback gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Image metadata file (overrides `metadata` in config.toml)
    #[arg(long, global = true)]
    metadata: Option<PathBuf>,

    /// Directory containing config.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Log fallback transitions and load attempts
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print <picture> markup for one image, one category, or every image
    Render {
        /// Only images in this category
        #[arg(long)]
        category: Option<Category>,
        /// Only the image with this name (requires --category)
        #[arg(long, requires = "category")]
        name: Option<String>,
        /// Render as eager-loading regardless of priority
        #[arg(long)]
        eager: bool,
    },
    /// Print social preview meta tags and JSON-LD structured data
    Seo,
    /// Drive every image through its fallback chain against a built site
    Check {
        /// Built site directory that image URIs resolve under
        #[arg(long)]
        root: PathBuf,
        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Render {
            category,
            name,
            eager,
        } => {
            let (site_config, store) = load_inputs(&cli.config_dir, cli.metadata.as_deref())?;
            render(store, &site_config, category, name.as_deref(), eager);
        }
        Command::Seo => {
            let (site_config, store) = load_inputs(&cli.config_dir, cli.metadata.as_deref())?;
            println!("{}", seo::render(&store, &site_config.seo).into_string());
        }
        Command::Check { root, json } => {
            let (site_config, store) = load_inputs(&cli.config_dir, cli.metadata.as_deref())?;
            let loader = FsLoader::new(root);
            let mut session = ImageSession::from_config(store, &site_config);
            let keys: Vec<_> = session.store().records().map(|r| r.key()).collect();
            for key in keys {
                session.mount(key.category, &key.name, BuildOptions::default(), &loader);
            }
            session.load_pending(&loader);
            if json {
                let report = serde_json::json!({
                    "images": session.report(),
                    "stats": session.stats().snapshot(),
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output::print_check_output(&session.report(), session.stats());
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Site config from `config_dir`, then the metadata file it (or `--metadata`) names.
fn load_inputs(
    config_dir: &Path,
    metadata: Option<&Path>,
) -> Result<(SiteConfig, MetadataStore), config::ConfigError> {
    let site_config = config::load_config(config_dir)?;
    let path = metadata
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&site_config.metadata));
    let store = MetadataStore::load(&path);
    Ok((site_config, store))
}

fn render(
    store: MetadataStore,
    site_config: &SiteConfig,
    category: Option<Category>,
    name: Option<&str>,
    eager: bool,
) {
    let session = ImageSession::from_config(store, site_config);
    let options = BuildOptions { eager };
    let targets: Vec<(Category, String)> = match (category, name) {
        (Some(category), Some(name)) => vec![(category, name.to_string())],
        (Some(category), None) => session
            .store()
            .category(category)
            .map(|r| (r.category, r.name.clone()))
            .collect(),
        _ => session
            .store()
            .records()
            .map(|r| (r.category, r.name.clone()))
            .collect(),
    };
    for (category, name) in targets {
        println!("{}", session.build(category, &name, options).render().into_string());
    }
}

/// `warn` by default, `RUST_LOG` overrides, `-v` forces `debug`.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
