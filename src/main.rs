mod api;
mod cli;
mod config;
mod forms;
mod model;
mod screens;
mod store;
mod views;

use anyhow::Result;
use clap::Parser;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

#[derive(Parser)]
#[command(name = "shopctl", about = "Admin console for the shop catalog backend")]
pub struct Args {
    #[arg(short, long, help = "Run a single console command and exit")]
    pub command: Option<String>,

    #[arg(long, env = "SHOPCTL_API_URL", help = "Backend base URL (overrides config)")]
    pub api_url: Option<String>,

    #[arg(long, help = "Config file path")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Skip confirmation prompts for destructive actions")]
    pub yes: bool,

    #[arg(long, help = "Print HTTP request details")]
    pub debug: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut cfg = if let Some(config_path) = &args.config {
        config::Config::load_from(config_path)?
    } else {
        config::Config::load().unwrap_or_default()
    };

    if let Some(url) = &args.api_url {
        cfg.api.base_url = url.clone();
    }

    if let Err(errors) = cfg.validate() {
        for error in &errors {
            eprintln!("Config error: {}", error);
        }
        return Err(anyhow::anyhow!("Invalid configuration"));
    }

    let client = Rc::new(api::ApiClient::new(
        &cfg.api.base_url,
        &cfg.api.products_path,
        &cfg.api.users_path,
        args.debug,
    ));

    // Both stores eagerly load at construction; a backend that is down shows
    // up as an explicit unavailable state, not a startup failure.
    let products = store::ProductStore::new(client.clone() as Rc<dyn api::ProductBackend>);
    let users = store::UserStore::new(client as Rc<dyn api::UserBackend>);

    let ctx = cli::Context {
        products_screen: screens::products::ProductsScreen::new(&products),
        users_screen: screens::users::UsersScreen::new(&users),
        product_query: RefCell::new(views::ProductQuery::default()),
        user_query: RefCell::new(views::UserQuery::default()),
        products,
        users,
        config: cfg,
        args,
    };

    if let Some(command) = ctx.args.command.clone() {
        cli::run_once(&ctx, &command)
    } else {
        cli::run_repl(ctx)
    }
}
