use clap::{Parser, Subcommand};
use color_eyre::Result;
use std::path::PathBuf;
use std::sync::Arc;
use url::Url;

use showreel::cache::{CacheStore, QueryExecutor};
use showreel::catalog::{CatalogService, Project};
use showreel::config::Config;
use showreel::remote::HttpDocumentStore;

#[derive(Parser, Debug)]
#[command(name = "showreel")]
#[command(about = "Back-office CLI for the studio portfolio")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/showreel/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List published projects, optionally filtered
  Projects {
    /// Only projects in this category
    #[arg(long)]
    category: Option<String>,

    /// Only projects carrying this tag
    #[arg(long)]
    tag: Option<String>,
  },

  /// List the featured rail in display order
  Featured,

  /// Show one project in full
  Show { id: String },

  /// List content tags
  Tags,

  /// Append images from a CSV file to a project's gallery
  ImportGallery { project_id: String, csv: PathBuf },

  /// Persist a new gallery order (comma-separated urls)
  ReorderGallery { project_id: String, order: String },

  /// Persist the featured rail order (comma-separated project ids)
  FeatureOrder { ids: String },
}

impl Command {
  /// Write commands refuse to run without an API token.
  fn is_write(&self) -> bool {
    matches!(
      self,
      Command::ImportGallery { .. } | Command::ReorderGallery { .. } | Command::FeatureOrder { .. }
    )
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;
  init_tracing();

  let args = Args::parse();
  let config = Config::load(args.config.as_deref())?;

  let token = if args.command.is_write() {
    Some(Config::get_api_token()?)
  } else {
    Config::get_api_token().ok()
  };

  let base_url = Url::parse(&config.api.base_url)?;
  let remote = Arc::new(HttpDocumentStore::new(base_url, token)?);
  let store = Arc::new(CacheStore::new().with_ttl(config.fetch.fresh_ttl()));
  let executor = Arc::new(
    QueryExecutor::new(remote, store)
      .with_request_timeout(config.fetch.request_timeout())
      .with_retry_delay(config.fetch.retry_delay()),
  );
  let catalog = CatalogService::new(executor);

  match args.command {
    Command::Projects { category, tag } => {
      let projects = match (category, tag) {
        (Some(category), _) => catalog.projects_by_category(&category).await?,
        (None, Some(tag)) => catalog.projects_by_tag(&tag).await?,
        (None, None) => catalog.list_projects().await?,
      };
      print_projects(&projects);
    }

    Command::Featured => {
      let projects = catalog.featured_projects().await?;
      print_projects(&projects);
    }

    Command::Show { id } => {
      let project = catalog.get_project(&id).await?;
      print_project(&project);
    }

    Command::Tags => {
      for tag in catalog.list_tags().await? {
        println!("{}  ({})", tag.name, tag.slug);
      }
    }

    Command::ImportGallery { project_id, csv } => {
      let count = catalog.import_gallery_csv(&project_id, &csv).await?;
      println!("Imported {} images into {}", count, project_id);
    }

    Command::ReorderGallery { project_id, order } => {
      let order: Vec<String> = order.split(',').map(|url| url.trim().to_string()).collect();
      catalog.reorder_gallery(&project_id, &order).await?;
      println!("Reordered gallery of {}", project_id);
    }

    Command::FeatureOrder { ids } => {
      let ids: Vec<String> = ids.split(',').map(|id| id.trim().to_string()).collect();
      catalog.set_featured_order(&ids).await?;
      println!("Featured rail updated ({} projects)", ids.len());
    }
  }

  Ok(())
}

fn init_tracing() {
  use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

  let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

  tracing_subscriber::registry()
    .with(env_filter)
    .with(fmt::layer().compact().with_target(true))
    .init();
}

fn print_projects(projects: &[Project]) {
  if projects.is_empty() {
    println!("No projects.");
    return;
  }

  for project in projects {
    let year = project
      .year
      .map(|y| y.to_string())
      .unwrap_or_else(|| "----".to_string());
    println!(
      "{:<24} {:<12} {}  [{}]",
      project.id,
      project.category,
      year,
      project.title
    );
  }
}

fn print_project(project: &Project) {
  println!("{} ({})", project.title, project.id);
  println!("  slug:      {}", project.slug);
  println!("  category:  {}", project.category);
  if !project.tags.is_empty() {
    println!("  tags:      {}", project.tags.join(", "));
  }
  if let Some(client) = &project.client {
    println!("  client:    {}", client);
  }
  if let Some(year) = project.year {
    println!("  year:      {}", year);
  }
  if let Some(video) = &project.video_url {
    println!("  video:     {}", video);
  }
  if project.featured {
    println!(
      "  featured:  yes (position {})",
      project
        .featured_position
        .map(|p| p.to_string())
        .unwrap_or_else(|| "?".to_string())
    );
  }
  if !project.gallery.is_empty() {
    println!("  gallery:");
    for image in &project.gallery {
      match &image.caption {
        Some(caption) => println!("    {}  ({})", image.url, caption),
        None => println!("    {}", image.url),
      }
    }
  }
}
