use clap::{Parser, Subcommand};
use hexo_admin::error::Failure;
use hexo_admin::site::Site;
use hexo_admin::site_config::ConfigTarget;
use hexo_admin::{config, frontmatter, output};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hexo-admin")]
#[command(about = "Administration backend for a Hexo blog")]
#[command(long_about = "\
Administration backend for a Hexo blog

Edits the site's files directly: posts, the site and theme configuration
documents, and uploaded images. Builds are delegated to the hexo CLI.

Site layout (defaults, relative to --root):

  blog/
  ├── admin.toml                  # This tool's config (optional)
  ├── _config.yml                 # Site config
  ├── themes/anzhiyu/_config.yml  # Theme config (optional)
  └── source/
      ├── _posts/*.md             # Posts, keyed by filename
      ├── image/                  # Uploads, served under /image/
      ├── music/*.mp3             # Playlist input (\"Title - Artist.mp3\")
      └── json/music.json         # Playlist output

Run 'hexo-admin gen-config' to generate a documented admin.toml.")]
#[command(version)]
struct Cli {
    /// Hexo site root
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log debug detail to stderr
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read, create and save posts
    #[command(subcommand)]
    Posts(PostsCommand),
    /// Count posts, tags and categories
    Stats,
    /// Read and replace the site and theme config documents
    #[command(subcommand)]
    Config(ConfigCommand),
    /// List and upload images
    #[command(subcommand)]
    Media(MediaCommand),
    /// Run a hexo operation: clean, generate, deploy or server
    Build { operation: String },
    /// Regenerate the music playlist from source/music
    Playlist,
    /// Print a stock admin.toml with all options documented
    GenConfig,
}

#[derive(Subcommand)]
enum PostsCommand {
    /// List every post
    List,
    /// Print one post as stored
    Show { key: String },
    /// Create an empty post from a title
    New {
        title: String,
        /// Layout field of the new post (default from admin.toml)
        #[arg(long)]
        layout: Option<String>,
    },
    /// Replace a post with a complete document (header block and body)
    Save {
        key: String,
        /// Read the document from a file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print both config documents
    Show,
    /// Replace a config document wholesale
    Save {
        /// "site" or "theme"
        target: String,
        /// Read the document from a file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum MediaCommand {
    /// List uploaded images
    List,
    /// Copy a file into the media directory
    Upload {
        file: PathBuf,
        /// Stored name (defaults to the file's own name)
        #[arg(long)]
        name: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            if cli.json {
                // Falls back to text if the failure itself cannot be serialized.
                if output::print_json(&failure).is_err() {
                    output::print_failure(&failure);
                }
            } else {
                output::print_failure(&failure);
            }
            ExitCode::FAILURE
        }
    }
}

/// Install the stderr subscriber. `RUST_LOG` wins over the verbosity flags.
fn init_tracing(cli: &Cli) {
    let level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<(), Failure> {
    // gen-config must work without a readable admin.toml, so the site is
    // opened per command.
    let open = || -> Result<Site, Failure> {
        let site = Site::open(&cli.root)?;
        debug!(root = %site.root().display(), "Site opened");
        Ok(site)
    };

    match &cli.command {
        Command::Posts(PostsCommand::List) => {
            let site = open()?;
            let listing = site.posts().scan()?;
            if cli.json {
                output::print_json(&listing)?;
            } else {
                output::print_post_list(&listing);
            }
        }
        Command::Posts(PostsCommand::Show { key }) => {
            let site = open()?;
            let post = site.posts().get(key)?;
            if cli.json {
                output::print_json(&post)?;
            } else {
                output::print_post(&post);
            }
        }
        Command::Posts(PostsCommand::New { title, layout }) => {
            let site = open()?;
            let layout = layout
                .as_deref()
                .unwrap_or(&site.config().posts.default_layout);
            let key = site.posts().create(title, layout)?;
            if cli.json {
                output::print_json(&serde_json::json!({ "filename": key }))?;
            } else {
                output::print_post_saved(&key, true);
            }
        }
        Command::Posts(PostsCommand::Save { key, file }) => {
            let site = open()?;
            let raw = read_input(file.as_deref())?;
            let doc = frontmatter::parse(&raw)?;
            site.posts().replace(key, &doc.body, &doc.metadata)?;
            if cli.json {
                output::print_json(&serde_json::json!({ "filename": key }))?;
            } else {
                output::print_post_saved(key, false);
            }
        }
        Command::Stats => {
            let site = open()?;
            let stats = site.stats()?;
            if cli.json {
                output::print_json(&stats)?;
            } else {
                output::print_stats(&stats);
            }
        }
        Command::Config(ConfigCommand::Show) => {
            let site = open()?;
            let store = site.config_store();
            let configs = store.read()?;
            if cli.json {
                output::print_json(&configs)?;
            } else {
                output::print_configs(
                    &configs,
                    store.path(ConfigTarget::Site),
                    store.path(ConfigTarget::Theme),
                );
            }
        }
        Command::Config(ConfigCommand::Save { target, file }) => {
            let site = open()?;
            let target: ConfigTarget = target.parse()?;
            let raw = read_input(file.as_deref())?;
            site.config_store().write(target, &raw)?;
            if cli.json {
                output::print_json(&serde_json::json!({ "target": target }))?;
            } else {
                println!("Saved {target} config");
            }
        }
        Command::Media(MediaCommand::List) => {
            let site = open()?;
            let assets = site.media().list()?;
            if cli.json {
                output::print_json(&assets)?;
            } else {
                output::print_media(&assets);
            }
        }
        Command::Media(MediaCommand::Upload { file, name }) => {
            let site = open()?;
            let bytes = std::fs::read(file)?;
            let name = match name {
                Some(name) => name.clone(),
                None => file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            };
            let asset = site.media().store(&name, &bytes)?;
            if cli.json {
                output::print_json(&asset)?;
            } else {
                output::print_upload(&asset);
            }
        }
        Command::Build { operation } => {
            let site = open()?;
            let result = site.builder().run(operation)?;
            if cli.json {
                output::print_json(&result)?;
            } else {
                output::print_build_output(&result);
            }
        }
        Command::Playlist => {
            let site = open()?;
            let tracks = site.generate_playlist()?;
            if cli.json {
                output::print_json(&tracks)?;
            } else {
                output::print_playlist(&tracks, &site.playlist_settings().output);
            }
        }
        Command::GenConfig => print!("{}", config::stock_config_toml()),
    }

    Ok(())
}

/// Read a document from `file`, or all of stdin when no file is given.
fn read_input(file: Option<&Path>) -> std::io::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}
