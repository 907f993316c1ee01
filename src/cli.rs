use crate::{
    config::Config,
    screens::{products, users},
    store::{ProductStore, UserStore},
    views::{ProductQuery, SortKey, UserQuery},
    Args,
};
use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::cell::RefCell;
use std::rc::Rc;

pub struct Context {
    pub args: Args,
    pub config: Config,
    pub products: Rc<ProductStore>,
    pub users: Rc<UserStore>,
    pub products_screen: products::ProductsScreen,
    pub users_screen: users::UsersScreen,
    pub product_query: RefCell<ProductQuery>,
    pub user_query: RefCell<UserQuery>,
}

impl Context {
    fn skip_confirm(&self) -> bool {
        self.args.yes || !self.config.console.confirm_destructive
    }
}

pub fn run_once(ctx: &Context, command: &str) -> Result<()> {
    handle_command(ctx, command, None);
    Ok(())
}

pub fn run_repl(ctx: Context) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    let history_path = ctx.config.history_path();
    let _ = rl.load_history(&history_path);

    println!("shopctl - type 'help' for commands, 'exit' to quit");

    loop {
        match rl.readline("shopctl> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                rl.add_history_entry(line)?;

                if handle_command(&ctx, line, Some(&mut rl)) {
                    break;
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {}", e);
                break;
            }
        }
    }

    if let Some(parent) = history_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let _ = rl.save_history(&history_path);
    Ok(())
}

/// Dispatch one console command. Returns true when the console should exit.
fn handle_command(ctx: &Context, line: &str, mut rl: Option<&mut DefaultEditor>) -> bool {
    let tokens = match shell_words::split(line) {
        Ok(tokens) => tokens,
        Err(e) => {
            eprintln!("Parse error: {}", e);
            return false;
        }
    };
    let Some(command) = tokens.first() else {
        return false;
    };
    let rest = &tokens[1..];

    match command.as_str() {
        "exit" | "quit" => return true,
        "help" => print_help(),

        // Product list screen
        "products" => {
            ctx.product_query.borrow_mut().term = rest.first().cloned().unwrap_or_default();
            products::list(&ctx.products_screen, &ctx.product_query.borrow());
        }
        "sort" => match rest.first().and_then(|s| SortKey::from_str(s)) {
            Some(key) => {
                ctx.product_query.borrow_mut().sort = key;
                products::list(&ctx.products_screen, &ctx.product_query.borrow());
            }
            None => eprintln!("Usage: sort name|name-desc|price|price-desc|newest"),
        },
        "range" => {
            if handle_range(ctx, rest) {
                products::list(&ctx.products_screen, &ctx.product_query.borrow());
            }
        }
        "show" => match rest.first() {
            Some(id) => products::show(&ctx.products, id),
            None => eprintln!("Usage: show <id>"),
        },
        "add" => {
            if let Err(e) = products::create(&ctx.products, rest, rl) {
                eprintln!("Error: {}", e);
            }
        }
        "edit" => match (rest.first(), rl) {
            (Some(id), Some(rl)) => {
                if let Err(e) = products::edit(&ctx.products, id, rl) {
                    eprintln!("Error: {}", e);
                }
            }
            (Some(_), None) => eprintln!("'edit' is interactive and not available in one-shot mode"),
            (None, _) => eprintln!("Usage: edit <id>"),
        },
        "rm" => match rest.first() {
            Some(id) => {
                if let Err(e) = products::delete(&ctx.products, id, rl, ctx.skip_confirm()) {
                    eprintln!("Error: {}", e);
                }
            }
            None => eprintln!("Usage: rm <id>"),
        },

        // User management screen
        "users" => {
            ctx.user_query.borrow_mut().term = rest.first().cloned().unwrap_or_default();
            users::list(&ctx.users_screen, &ctx.user_query.borrow());
        }
        "role" => match rest.first().map(String::as_str) {
            Some("all") => {
                ctx.user_query.borrow_mut().role = None;
                users::list(&ctx.users_screen, &ctx.user_query.borrow());
            }
            Some(role_str) => match crate::model::Role::from_str(role_str) {
                Some(role) => {
                    ctx.user_query.borrow_mut().role = Some(role);
                    users::list(&ctx.users_screen, &ctx.user_query.borrow());
                }
                None => eprintln!("Usage: role admin|user|all"),
            },
            None => eprintln!("Usage: role admin|user|all"),
        },
        "status" => match rest.first().map(String::as_str) {
            Some("active") => {
                ctx.user_query.borrow_mut().active = Some(true);
                users::list(&ctx.users_screen, &ctx.user_query.borrow());
            }
            Some("inactive") => {
                ctx.user_query.borrow_mut().active = Some(false);
                users::list(&ctx.users_screen, &ctx.user_query.borrow());
            }
            Some("all") => {
                ctx.user_query.borrow_mut().active = None;
                users::list(&ctx.users_screen, &ctx.user_query.borrow());
            }
            _ => eprintln!("Usage: status active|inactive|all"),
        },
        "toggle" => match rest.first() {
            Some(id) => {
                if let Err(e) = users::toggle(&ctx.users, id, rl.as_deref_mut(), ctx.skip_confirm())
                {
                    eprintln!("Error: {}", e);
                }
            }
            None => eprintln!("Usage: toggle <id>"),
        },
        "rmuser" => match rest.first() {
            Some(id) => {
                if let Err(e) = users::delete(&ctx.users, id, rl, ctx.skip_confirm()) {
                    eprintln!("Error: {}", e);
                }
            }
            None => eprintln!("Usage: rmuser <id>"),
        },

        "refresh" => {
            ctx.products.load();
            ctx.users.load();
            println!("Reloaded from backend.");
        }

        _ => println!("Unknown command: {} (try 'help')", command),
    }
    false
}

/// Apply a `range` command to the product query. Returns true when the
/// query changed.
fn handle_range(ctx: &Context, rest: &[String]) -> bool {
    match rest {
        [arg] if arg == "clear" => {
            let mut query = ctx.product_query.borrow_mut();
            query.min_price = None;
            query.max_price = None;
            true
        }
        [min, max] => match (min.parse::<f64>(), max.parse::<f64>()) {
            (Ok(min), Ok(max)) if min <= max => {
                let mut query = ctx.product_query.borrow_mut();
                query.min_price = Some(min);
                query.max_price = Some(max);
                true
            }
            _ => {
                eprintln!("Usage: range <min> <max> (numbers, min <= max) | range clear");
                false
            }
        },
        _ => {
            eprintln!("Usage: range <min> <max> | range clear");
            false
        }
    }
}

fn print_help() {
    println!("Products:");
    println!("  products [term]      - list products, optionally filtered by name or id");
    println!("  sort <key>           - set sort: name, name-desc, price, price-desc, newest");
    println!("  range <min> <max>    - filter by price range ('range clear' to remove)");
    println!("  show <id>            - product detail");
    println!("  add [<name> <price>] - create a product (prompts when no args)");
    println!("  edit <id>            - edit a product (Enter keeps the current value)");
    println!("  rm <id>              - delete a product");
    println!("Users:");
    println!("  users [term]         - list users, filtered by name or email");
    println!("  role <r>             - filter by role: admin, user, all");
    println!("  status <s>           - filter by status: active, inactive, all");
    println!("  toggle <id>          - activate/deactivate a user");
    println!("  rmuser <id>          - delete a user");
    println!("General:");
    println!("  refresh              - reload both lists from the backend");
    println!("  help                 - show commands");
    println!("  exit                 - quit");
}
