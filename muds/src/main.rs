use std::{net::SocketAddr, path::PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use log::info;
use muds::{
    config::{Settings, StoreConfig},
    ctx::AppContext,
};

/// Generate DevStack local.conf files from an option schema.
#[derive(Parser, Debug)]
#[command(name = "muds", version, about)]
struct Cli {
    /// Settings file (TOML).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Option schema (JSON, YAML or TOML); overrides the settings file.
    #[arg(short, long, global = true)]
    schema: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the web form.
    Serve {
        /// Address to listen on.
        #[arg(short, long)]
        listen: Option<SocketAddr>,
        /// Directory served under /static.
        #[arg(long)]
        static_dir: Option<PathBuf>,
        /// Keep generated configs as files in this directory.
        #[arg(long, value_name = "DIR")]
        store_dir: Option<PathBuf>,
    },
    /// Render local.conf from KEY=VALUE assignments.
    Render {
        /// Option assignments such as `rabbitmq.password=secret`.
        #[arg(value_parser = parse_assignment)]
        values: Vec<(String, String)>,
        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the HTML form markup.
    Form,
    /// List option paths that can be assigned.
    Keys,
    /// Show every option's value after applying assignments.
    Dump {
        #[arg(value_parser = parse_assignment)]
        values: Vec<(String, String)>,
    },
}

fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {s:?}"))?;
    if key.is_empty() {
        return Err(format!("missing option path in {s:?}"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut settings = Settings::load_or_default(cli.config.as_deref())?;
    if let Some(schema) = cli.schema {
        settings.schema = Some(schema);
    }

    match cli.command {
        Command::Serve {
            listen,
            static_dir,
            store_dir,
        } => {
            if let Some(listen) = listen {
                settings.listen = listen;
            }
            if let Some(dir) = static_dir {
                settings.static_dir = Some(dir);
            }
            if let Some(path) = store_dir {
                settings.store = StoreConfig::Dir { path };
            }

            let ctx = AppContext::new(settings)?;
            let state = ctx.app_state()?;
            conftree::web::serve(ctx.settings.listen, state, ctx.settings.static_dir.clone())
                .await
                .with_context(|| format!("Web server on {} failed", ctx.settings.listen))?;
        }
        Command::Render { values, output } => {
            let ctx = AppContext::new(settings)?;
            let mut tree = ctx.tree()?;
            let local_conf = tree.local_conf(values)?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, &local_conf)
                        .await
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!("{}", format!("local.conf written to {}", path.display()).green());
                }
                None => print!("{local_conf}"),
            }
        }
        Command::Form => {
            let ctx = AppContext::new(settings)?;
            println!("{}", ctx.tree()?.render_form());
        }
        Command::Keys => {
            let ctx = AppContext::new(settings)?;
            for key in ctx.tree()?.keys() {
                println!("{}", key.bold());
            }
        }
        Command::Dump { values } => {
            let ctx = AppContext::new(settings)?;
            let mut tree = ctx.tree()?;
            tree.set_values(values)?;
            print!("{}", tree.dump());
        }
    }

    Ok(())
}
