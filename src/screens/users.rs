//! User management screen: read-mostly list with filters, status toggling,
//! and deletion.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;
use chrono::Utc;
use rustyline::DefaultEditor;

use crate::model::User;
use crate::store::{Snapshot, Subscription, UserStore};
use crate::views::{self, UserQuery};

use super::{cell, confirm, format_datetime};

/// Live view of the user store, mirroring [`super::products::ProductsScreen`].
pub struct UsersScreen {
    latest: Rc<RefCell<Snapshot<User>>>,
    _subscription: Subscription<User>,
}

impl UsersScreen {
    pub fn new(store: &UserStore) -> Self {
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

    pub fn snapshot(&self) -> Snapshot<User> {
        self.latest.borrow().clone()
    }
}

pub fn render_list(snapshot: &Snapshot<User>, query: &UserQuery) -> String {
    let mut out = String::new();

    if let Snapshot::Unavailable(reason) = snapshot {
        out.push_str(&format!(
            "Users unavailable: {}\nRun 'refresh' to retry.\n",
            reason
        ));
        return out;
    }

    let users = snapshot.items();
    out.push_str(&format!(
        "Users: {}   Active: {}   Admins: {}   New (30d): {}\n",
        users.len(),
        views::active_count(users),
        views::admin_count(users),
        views::recent_count(users, Utc::now()),
    ));

    let visible = query.apply(users);
    if visible.is_empty() {
        if query.is_filtered() {
            out.push_str("No users match the current filters.\n");
        } else {
            out.push_str("No users.\n");
        }
        return out;
    }

    out.push_str(&format!(
        "{} {} {} {} {} {}\n",
        cell("ID", 6),
        cell("NAME", 24),
        cell("EMAIL", 30),
        cell("ROLE", 6),
        cell("STATUS", 8),
        cell("LAST LOGIN", 16),
    ));
    for user in &visible {
        out.push_str(&format!(
            "{} {} {} {} {} {}\n",
            cell(&user.id.to_string(), 6),
            cell(&user.name, 24),
            cell(&user.email, 30),
            cell(user.role.as_str(), 6),
            cell(if user.is_active { "active" } else { "inactive" }, 8),
            cell(&format_datetime(user.last_login), 16),
        ));
    }
    out
}

pub fn list(screen: &UsersScreen, query: &UserQuery) {
    print!("{}", render_list(&screen.snapshot(), query));
}

/// Toggle a user's active flag, with confirmation phrased around the
/// direction of the change.
pub fn toggle(
    store: &UserStore,
    id_arg: &str,
    rl: Option<&mut DefaultEditor>,
    skip_confirm: bool,
) -> Result<()> {
    let Ok(id) = id_arg.parse::<u64>() else {
        eprintln!("Invalid user id: {}", id_arg);
        return Ok(());
    };

    let current = store.get(id).ok();
    let question = match &current {
        Some(user) if user.is_active => format!("Deactivate \"{}\"?", user.name),
        Some(user) => format!("Activate \"{}\"?", user.name),
        None => format!("Toggle status of user #{}?", id),
    };
    if !confirm(rl, skip_confirm, &question)? {
        println!("Unchanged.");
        return Ok(());
    }

    match store.toggle_status(id) {
        Ok(updated) => println!(
            "User #{} is now {}.",
            updated.id,
            if updated.is_active { "active" } else { "inactive" }
        ),
        Err(e) => eprintln!("Toggle failed: {}", e),
    }
    Ok(())
}

pub fn delete(
    store: &UserStore,
    id_arg: &str,
    rl: Option<&mut DefaultEditor>,
    skip_confirm: bool,
) -> Result<()> {
    let Ok(id) = id_arg.parse::<u64>() else {
        eprintln!("Invalid user id: {}", id_arg);
        return Ok(());
    };
    let name = match store.get(id) {
        Ok(user) => user.name,
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
        Ok(()) => println!("Deleted user #{}.", id),
        Err(e) => eprintln!("Delete failed: {}", e),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Role;

    fn user(id: u64, name: &str, role: Role, active: bool) -> User {
        User {
            id,
            name: name.to_string(),
            email: format!("{}@shop.com", name.to_lowercase()),
            role,
            is_active: active,
            created_at: None,
            updated_at: None,
            last_login: None,
        }
    }

    #[test]
    fn test_render_list_stats_header() {
        let snapshot = Snapshot::Ready(vec![
            user(1, "Ana", Role::Admin, true),
            user(2, "Bob", Role::User, false),
        ]);
        let out = render_list(&snapshot, &UserQuery::default());
        assert!(out.contains("Users: 2"));
        assert!(out.contains("Active: 1"));
        assert!(out.contains("Admins: 1"));
        assert!(out.contains("inactive"));
    }

    #[test]
    fn test_render_list_filters_apply() {
        let snapshot = Snapshot::Ready(vec![
            user(1, "Ana", Role::Admin, true),
            user(2, "Bob", Role::User, true),
        ]);
        let query = UserQuery {
            role: Some(Role::Admin),
            ..Default::default()
        };
        let out = render_list(&snapshot, &query);
        assert!(out.contains("Ana"));
        assert!(!out.contains("Bob"));
        // Stats still describe the whole snapshot.
        assert!(out.contains("Users: 2"));
    }

    #[test]
    fn test_render_list_no_match_mentions_filters() {
        let snapshot = Snapshot::Ready(vec![user(1, "Ana", Role::User, true)]);
        let query = UserQuery {
            term: "nobody".to_string(),
            ..Default::default()
        };
        let out = render_list(&snapshot, &query);
        assert!(out.contains("No users match"));
    }

    #[test]
    fn test_render_list_shows_last_login_with_time() {
        let mut ana = user(1, "Ana", Role::Admin, true);
        ana.last_login = Some("2024-06-01T10:30:00Z".parse().unwrap());
        let never = user(2, "Bob", Role::User, true);
        let out = render_list(&Snapshot::Ready(vec![ana, never]), &UserQuery::default());
        assert!(out.contains("01/06/2024 10:30"));
        assert!(out.contains("N/A"));
    }

    #[test]
    fn test_render_list_unavailable() {
        let snapshot: Snapshot<User> = Snapshot::Unavailable("timeout".to_string());
        let out = render_list(&snapshot, &UserQuery::default());
        assert!(out.contains("Users unavailable: timeout"));
    }
}
