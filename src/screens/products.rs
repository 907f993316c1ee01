//! Product list, detail, and the create/edit/delete flows.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;
use chrono::Utc;
use rustyline::DefaultEditor;

use crate::forms::{EditSession, ProductInput};
use crate::model::Product;
use crate::store::{ProductStore, Snapshot, Subscription};
use crate::views::{self, ProductQuery};

use super::{cell, confirm, format_date, format_price, prompt};

/// The product list screen's live view of the store.
///
/// Holds a subscription so the cached snapshot tracks every publish; the
/// subscription drops with the screen, which is what keeps dead screens from
/// receiving callbacks.
pub struct ProductsScreen {
    latest: Rc<RefCell<Snapshot<Product>>>,
    _subscription: Subscription<Product>,
}

impl ProductsScreen {
    pub fn new(store: &ProductStore) -> Self {
        let latest = Rc::new(RefCell::new(Snapshot::Ready(Vec::new())));
        let sink = latest.clone();
        let subscription = store.subscribe(move |snapshot| {
            *sink.borrow_mut() = snapshot.clone();
        });
        Self {
            latest,
            _subscription: subscription,
        }
    }

    pub fn snapshot(&self) -> Snapshot<Product> {
        self.latest.borrow().clone()
    }
}

/// Render the stats header and the filtered/sorted table.
///
/// The aggregate cards cover the whole snapshot, not the filtered subset,
/// matching the dashboard this console replaces.
pub fn render_list(snapshot: &Snapshot<Product>, query: &ProductQuery) -> String {
    let mut out = String::new();

    if let Snapshot::Unavailable(reason) = snapshot {
        out.push_str(&format!(
            "Products unavailable: {}\nRun 'refresh' to retry.\n",
            reason
        ));
        return out;
    }

    let products = snapshot.items();
    out.push_str(&format!(
        "Products: {}   Total value: {}   Average price: {}\n",
        products.len(),
        format_price(views::total_value(products)),
        format_price(views::average_price(products)),
    ));

    let visible = query.apply(products);
    if visible.is_empty() {
        if products.is_empty() {
            out.push_str("No products yet. Use 'add' to create one.\n");
        } else {
            out.push_str(&format!("No products match \"{}\".\n", query.term.trim()));
        }
        return out;
    }

    out.push_str(&format!(
        "{} {} {} {}\n",
        cell("ID", 6),
        cell("NAME", 32),
        cell("PRICE", 12),
        cell("CREATED", 10),
    ));
    for product in &visible {
        out.push_str(&format!(
            "{} {} {} {}\n",
            cell(&product.id.to_string(), 6),
            cell(&product.name, 32),
            cell(&format_price(product.price), 12),
            cell(&format_date(product.created_at), 10),
        ));
    }
    out.push_str(&format!("Sorted by {}.\n", query.sort.as_str()));
    out
}

/// Render the detail view for one product.
pub fn render_detail(product: &Product) -> String {
    let days = views::days_since_creation(product, Utc::now());
    format!(
        "Product #{}\n  Name:    {}\n  Price:   {}\n  Created: {} ({} days ago)\n  Updated: {}\n",
        product.id,
        product.name,
        format_price(product.price),
        format_date(product.created_at),
        days,
        format_date(product.updated_at),
    )
}

pub fn list(screen: &ProductsScreen, query: &ProductQuery) {
    print!("{}", render_list(&screen.snapshot(), query));
}

/// Show one product by id. A non-numeric id is an explicit failure, not a
/// crash; a load failure prints the error and points at the retry path.
pub fn show(store: &ProductStore, id_arg: &str) {
    let Ok(id) = id_arg.parse::<u64>() else {
        eprintln!("Invalid product id: {}", id_arg);
        return;
    };
    match store.get(id) {
        Ok(product) => print!("{}", render_detail(&product)),
        Err(e) => eprintln!("Could not load product {}: {}. Try again with 'show {}'.", id, e, id),
    }
}

fn print_violations(errors: &[crate::forms::FieldError]) {
    for error in errors {
        eprintln!("  {}", error);
    }
}

/// Create flow. With both arguments supplied the input is validated and
/// submitted directly; otherwise the operator is prompted per field. On a
/// submit failure the input is kept and the operator may retry.
pub fn create(
    store: &ProductStore,
    args: &[String],
    mut rl: Option<&mut DefaultEditor>,
) -> Result<()> {
    let mut input = match args {
        [name, price] => ProductInput {
            name: name.clone(),
            price: price.clone(),
        },
        [] => ProductInput::default(),
        _ => {
            eprintln!("Usage: add [<name> <price>]");
            return Ok(());
        }
    };

    loop {
        if let Some(rl) = rl.as_deref_mut() {
            if args.is_empty() || !input.is_valid() {
                let Some(name) = prompt(rl, &field_prompt("Name", &input.name))? else {
                    println!("Cancelled.");
                    return Ok(());
                };
                if !name.is_empty() {
                    input.name = name;
                }
                let Some(price) = prompt(rl, &field_prompt("Price", &input.price))? else {
                    println!("Cancelled.");
                    return Ok(());
                };
                if !price.is_empty() {
                    input.price = price;
                }
            }
        }

        let request = match input.validate() {
            Ok(request) => request,
            Err(errors) => {
                eprintln!("Cannot create product:");
                print_violations(&errors);
                if rl.is_some() {
                    continue; // re-prompt, keeping the typed values
                }
                return Ok(());
            }
        };

        match store.create(&request) {
            Ok(created) => {
                println!("Created product #{}: {}", created.id, created.name);
                return Ok(());
            }
            Err(e) => {
                eprintln!("Create failed: {}", e);
                let retry = match rl.as_deref_mut() {
                    Some(rl) => confirm(Some(rl), false, "Retry with the same input?")?,
                    None => false,
                };
                if !retry {
                    return Ok(());
                }
            }
        }
    }
}

fn field_prompt(label: &str, current: &str) -> String {
    if current.is_empty() {
        format!("{}: ", label)
    } else {
        format!("{} [{}]: ", label, current)
    }
}

/// Edit flow: load the entity (with a retry affordance on load failure),
/// snapshot the baseline, prompt each field with Enter keeping the current
/// value, then submit only the changed fields. A submit failure returns to
/// the editable state with the input preserved.
pub fn edit(store: &ProductStore, id_arg: &str, rl: &mut DefaultEditor) -> Result<()> {
    let Ok(id) = id_arg.parse::<u64>() else {
        eprintln!("Invalid product id: {}", id_arg);
        return Ok(());
    };

    // Loading -> Loaded | LoadError (retry or abandon).
    let product = loop {
        match store.get(id) {
            Ok(product) => break product,
            Err(e) => {
                eprintln!("Could not load product {}: {}", id, e);
                if !confirm(Some(&mut *rl), false, "Retry loading?")? {
                    return Ok(());
                }
            }
        }
    };

    let mut session = EditSession::new(&product);
    println!("Editing product #{} (Enter keeps the current value)", id);

    loop {
        let Some(name) = prompt(rl, &format!("Name [{}]: ", session.current.name))? else {
            println!("Cancelled.");
            return Ok(());
        };
        if !name.is_empty() {
            session.current.name = name;
        }
        let Some(price) = prompt(rl, &format!("Price [{}]: ", session.current.price))? else {
            println!("Cancelled.");
            return Ok(());
        };
        if !price.is_empty() {
            session.current.price = price;
        }

        if !session.has_any_changes() {
            println!("No changes to save.");
            return Ok(());
        }

        let request = match session.to_update_request() {
            Ok(request) => request,
            Err(errors) => {
                eprintln!("Cannot save:");
                print_violations(&errors);
                if confirm(Some(&mut *rl), false, "Discard edits and start over?")? {
                    session.reset();
                }
                continue; // editable again
            }
        };

        println!("Changed fields: {}", session.changed_fields().join(", "));

        // Submitting -> Success | SubmitError (back to editable).
        match store.update(session.product_id(), &request) {
            Ok(updated) => {
                println!("Updated product #{}: {}", updated.id, updated.name);
                return Ok(());
            }
            Err(e) => {
                eprintln!("Update failed: {}", e);
                if !confirm(Some(&mut *rl), false, "Keep editing?")? {
                    return Ok(());
                }
            }
        }
    }
}

/// Delete flow with confirmation.
pub fn delete(
    store: &ProductStore,
    id_arg: &str,
    rl: Option<&mut DefaultEditor>,
    skip_confirm: bool,
) -> Result<()> {
    let Ok(id) = id_arg.parse::<u64>() else {
        eprintln!("Invalid product id: {}", id_arg);
        return Ok(());
    };
    let name = match store.get(id) {
        Ok(product) => product.name,
        Err(_) => format!("#{}", id),
    };
    if !confirm(
        rl,
        skip_confirm,
        &format!("Delete \"{}\"? This cannot be undone.", name),
    )? {
        println!("Not deleted.");
        return Ok(());
    }
    match store.delete(id) {
        Ok(()) => println!("Deleted product #{}.", id),
        Err(e) => eprintln!("Delete failed: {}", e),
    }
    Ok(())
}
