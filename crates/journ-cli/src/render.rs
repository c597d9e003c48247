//! Plain-text output for entries, summaries, and errors.

use journ_core::api::ApiError;
use journ_core::models::{Category, CategoryJournal, JournalEntry, UserDetails};
use journ_core::summary::SummaryGroup;
use journ_core::utils::{format_date, preview};
use journ_core::validation::{FieldErrors, GENERAL};

/// Width of the content preview in list views
const PREVIEW_WIDTH: usize = 48;

/// Width of the title column in list views
const TITLE_WIDTH: usize = 24;

pub fn entry_line(entry: &JournalEntry) -> String {
    format!(
        "{:>5}  {:<18}  {:<width$}  {}",
        entry.id,
        format_date(&entry.date),
        preview(entry.title_display(), TITLE_WIDTH),
        preview(entry.content.as_deref().unwrap_or(""), PREVIEW_WIDTH),
        width = TITLE_WIDTH,
    )
}

pub fn print_entries(entries: &[JournalEntry]) {
    if entries.is_empty() {
        println!("No journal entries yet.");
        return;
    }
    for entry in entries {
        println!("{}", entry_line(entry));
    }
}

pub fn print_category_entries(entries: &[CategoryJournal]) {
    if entries.is_empty() {
        println!("No journal entries in this category.");
        return;
    }
    for entry in entries {
        println!(
            "{:<width$}  {}",
            preview(entry.title.as_deref().unwrap_or("(untitled)"), TITLE_WIDTH),
            preview(entry.content.as_deref().unwrap_or(""), PREVIEW_WIDTH),
            width = TITLE_WIDTH,
        );
    }
}

pub fn print_entry(entry: &JournalEntry) {
    println!("{}", entry.title_display());
    println!("{} | {}", format_date(&entry.date), entry.category_display());
    println!();
    println!("{}", entry.content.as_deref().unwrap_or(""));
}

pub fn print_categories(categories: &[Category]) {
    if categories.is_empty() {
        println!("No categories yet. Add one with `journ category add <name>`.");
        return;
    }
    for category in categories {
        println!("{:>5}  {}", category.id, category.name_display());
    }
}

pub fn summary_lines(groups: &[SummaryGroup<'_>]) -> Vec<String> {
    let mut lines = Vec::new();
    for group in groups {
        let noun = if group.entries.len() == 1 { "entry" } else { "entries" };
        lines.push(format!("{} ({} {})", group.key, group.entries.len(), noun));
        for entry in &group.entries {
            lines.push(format!(
                "  {:>5}  {}",
                entry.id,
                preview(entry.title_display(), PREVIEW_WIDTH)
            ));
        }
    }
    lines
}

pub fn print_user(user: &UserDetails) {
    println!("Username:  {}", user.username);
    println!("Email:     {}", user.email);
    println!("Phone:     {}", user.phone_number.as_deref().unwrap_or("-"));
    if let Some(ref created) = user.date_created {
        println!("Joined:    {}", format_date(created));
    }
}

/// General message first, then one line per field
pub fn error_lines(errors: &FieldErrors) -> Vec<String> {
    let mut lines: Vec<String> = errors.general().map(str::to_string).into_iter().collect();
    lines.extend(
        errors
            .iter()
            .filter(|(field, _)| *field != GENERAL)
            .map(|(field, message)| format!("  {}: {}", field, message)),
    );
    lines
}

pub fn print_error(err: &anyhow::Error) {
    match err.downcast_ref::<ApiError>() {
        Some(api_error) => {
            for line in error_lines(&api_error.form_errors()) {
                eprintln!("{}", line);
            }
        }
        None => eprintln!("Error: {:#}", err),
    }
}
