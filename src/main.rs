use chrono::Local;
use clap::{Parser, Subcommand};
use simple_blog::config::{self, Mode};
use simple_blog::pipeline::{self, BuildOptions};
use simple_blog::{cache, draft, output};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "simple-blog")]
#[command(about = "Incremental static site generator for markdown blogs")]
#[command(long_about = "\
Incremental static site generator for markdown blogs

Articles are markdown files grouped by year. Only articles whose
modification time changed since the last build are rendered again;
the home page is rewritten on every build.

Content structure:

  content/
  ├── 2023/
  │   └── year_in_review.md    # → articles/2023/year_in_review/index.html
  └── 2024/
      └── hello.md             # → articles/2024/hello/index.html

A leading `---` ... `---` frontmatter block is stripped before rendering.
Titles come from the filename: my_first_post.md → \"My First Post\".

Run 'simple-blog gen-config' to generate a documented blog.toml.")]
#[command(version)]
struct Cli {
    /// Config file (optional; defaults apply when missing)
    #[arg(long, default_value = config::CONFIG_FILENAME, global = true)]
    config: PathBuf,

    /// Content directory (overrides `source_dir` from the config)
    #[arg(long, global = true)]
    source: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render changed articles and regenerate the home page
    Build {
        /// Build to the local preview directory instead of the deploy directory
        #[arg(long)]
        test: bool,
        /// Source files to rebuild even if unchanged
        files: Vec<PathBuf>,
    },
    /// Create a new dated draft under the current year
    New {
        /// Draft title
        title: Option<String>,
    },
    /// List articles and which of them the next build would render
    Check {
        /// Source files to treat as forced
        files: Vec<PathBuf>,
    },
    /// Print a stock blog.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let load_config = || -> Result<config::BlogConfig, config::ConfigError> {
        let mut site_config = config::load_config(&cli.config)?;
        if let Some(source) = &cli.source {
            site_config.source_dir = source.clone();
        }
        Ok(site_config)
    };

    match cli.command {
        Command::Build { test, files } => {
            let site_config = load_config()?;
            let mode = if test { Mode::Test } else { Mode::Deploy };
            let target = site_config.target(mode, &std::env::current_dir()?);
            let options =
                BuildOptions::from_config(&site_config, target, files, Local::now().date_naive());

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_build_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = pipeline::build(&options, Some(tx));
            printer.join().ok();

            output::print_build_summary(&result?);
        }
        Command::New { title } => {
            let site_config = load_config()?;
            let outcome = draft::create_draft(
                &site_config.source_dir,
                title.as_deref(),
                Local::now().date_naive(),
            )?;
            output::print_draft_outcome(&outcome);
        }
        Command::Check { files } => {
            let site_config = load_config()?;
            let target = site_config.target(Mode::Deploy, &std::env::current_dir()?);
            let build_cache = cache::BuildCache::load(&site_config.cache_file);
            let plan = pipeline::plan(
                &site_config.source_dir,
                &target.base_url,
                &build_cache,
                &files,
            )?;
            output::print_check_output(&plan);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
