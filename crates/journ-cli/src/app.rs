//! Command execution for the journ CLI.
//!
//! `App` owns the config, the session store and the API client. Each command
//! runs to completion, then any navigation the gateway requested while it ran
//! is drained and acted on.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use journ_core::api::{ChannelNavigator, Gateway, JournalApi, Route};
use journ_core::auth::{AuthState, SessionStore};
use journ_core::config::Config;
use journ_core::models::{Category, JournalEntry};
use journ_core::summary::summarize;
use journ_core::validation::{
    CategoryForm, JournalForm, JournalUpdate, LoginForm, PasswordResetForm, ProfileForm,
    SignupForm,
};

use crate::cli::{CategoryAction, Commands, ProfileAction};
use crate::render;

/// Shown when the server rejects the stored token
pub const SESSION_EXPIRED: &str = "Session expired. Please log in again.";

pub struct App {
    config: Config,
    api: JournalApi,
    routes: mpsc::UnboundedReceiver<Route>,
}

impl App {
    /// Build the client stack and restore the persisted session
    pub async fn new(config: Config) -> Result<Self> {
        let data_dir = config.data_dir()?;
        debug!(?data_dir, storage = ?config.storage, "Opening session storage");

        let store = SessionStore::new(config.open_storage(&data_dir));
        let snapshot = store.restore().await;
        debug!(signed_in = snapshot.session.is_some(), "Session restored");

        let (navigator, routes) = ChannelNavigator::new();
        let gateway = Gateway::new(store, Arc::new(navigator), config.gateway_options())
            .context("Failed to create HTTP client")?;

        Ok(Self {
            config,
            api: JournalApi::new(gateway),
            routes,
        })
    }

    fn store(&self) -> &SessionStore {
        self.api.store()
    }

    pub async fn run(&mut self, command: Commands) -> Result<()> {
        if !command.is_public() && !self.store().is_authenticated() {
            bail!("Not logged in. Run `journ login` first.");
        }

        let result = self.dispatch(command).await;
        self.drain_navigation();
        result
    }

    /// Act on every route the gateway asked for during the last command
    fn drain_navigation(&mut self) {
        while let Ok(route) = self.routes.try_recv() {
            debug!(?route, "Navigation requested");
            if route == Route::Login {
                eprintln!("{}", SESSION_EXPIRED);
            }
        }
    }

    async fn dispatch(&mut self, command: Commands) -> Result<()> {
        match command {
            Commands::Login { email } => self.login(email).await,
            Commands::Signup => self.signup().await,
            Commands::Logout => {
                self.api.logout().await;
                println!("Logged out.");
                Ok(())
            }
            Commands::Status => {
                self.status();
                Ok(())
            }
            Commands::List { category: None } => {
                render::print_entries(&self.api.journals().await?);
                Ok(())
            }
            Commands::List {
                category: Some(id),
            } => {
                render::print_category_entries(&self.api.journals_in_category(id).await?);
                Ok(())
            }
            Commands::Show { id } => {
                render::print_entry(&self.api.journal(id).await?);
                Ok(())
            }
            Commands::New {
                title,
                content,
                category,
            } => self.new_entry(title, content, category).await,
            Commands::Edit {
                id,
                title,
                content,
                category,
            } => self.edit_entry(id, title, content, category).await,
            Commands::Delete { id, yes } => {
                if !yes && !confirm(&format!("Delete entry {}?", id))? {
                    return Ok(());
                }
                println!("{}", self.api.delete_journal(id).await?);
                Ok(())
            }
            Commands::Categories => {
                render::print_categories(&self.api.categories().await?);
                Ok(())
            }
            Commands::Category { action } => self.category(action).await,
            Commands::Summary { period } => {
                let entries = self.api.journals().await?;
                println!("Journal summary ({})\n", period);
                for line in render::summary_lines(&summarize(&entries, period)) {
                    println!("{}", line);
                }
                Ok(())
            }
            Commands::Profile { action } => self.profile(action).await,
            Commands::ResetPassword => {
                let form = PasswordResetForm {
                    old_password: prompt_password("Current password: ")?,
                    new_password: prompt_password("New password: ")?,
                };
                println!("{}", self.api.reset_password(&form).await?);
                Ok(())
            }
            Commands::Activate { email } => {
                println!("{}", self.api.request_activation(&email).await?);
                Ok(())
            }
            Commands::Refresh => {
                self.api.refresh_session().await?;
                println!("Session refreshed.");
                Ok(())
            }
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    async fn login(&mut self, email: Option<String>) -> Result<()> {
        let email = match email {
            Some(email) => email,
            None => prompt("Email", self.config.last_email.as_deref())?,
        };
        let form = LoginForm {
            email: email.trim().to_string(),
            password: prompt_password("Password: ")?,
        };

        self.api.login(&form).await?;
        info!("Login successful");

        if let Err(e) = self.config.remember_email(&form.email) {
            warn!(error = %e, "Failed to save config");
        }
        println!("Logged in as {}", form.email);
        Ok(())
    }

    async fn signup(&mut self) -> Result<()> {
        let form = SignupForm {
            email: prompt("Email", None)?,
            username: prompt("Username", None)?,
            phone_number: prompt("Phone number", None)?,
            password: prompt_password("Password: ")?,
            confirm_password: prompt_password("Confirm password: ")?,
        };

        let outcome = self.api.signup(&form).await?;
        if !outcome.message.is_empty() {
            println!("{}", outcome.message);
        }
        if outcome.signed_in {
            println!("Logged in as {}", form.email);
        } else {
            println!("Verify your email, then run `journ login`.");
        }
        Ok(())
    }

    fn status(&self) {
        println!("Server:   {}", self.api.gateway().base_url());
        match self.store().auth_state() {
            AuthState::Authenticated(session) => {
                let who = session
                    .user_email()
                    .map(str::to_string)
                    .or_else(|| session.user_id().map(|id| format!("user {}", id)))
                    .unwrap_or_else(|| "unknown user".to_string());
                println!("Status:   logged in as {}", who);
            }
            AuthState::Anonymous | AuthState::Unknown => println!("Status:   not logged in"),
        }
    }

    // =========================================================================
    // Entries
    // =========================================================================

    async fn new_entry(
        &mut self,
        title: Option<String>,
        content: Option<String>,
        category: Option<i64>,
    ) -> Result<()> {
        let title = match title {
            Some(title) => title,
            None => prompt("Title", None)?,
        };
        let content = match content {
            Some(content) => content,
            None => prompt("Content", None)?,
        };
        let category_id = match category {
            Some(id) => Some(id),
            None => choose_category(&self.api.categories().await?, None)?,
        };

        let form = JournalForm {
            title,
            content,
            category_id,
        };
        println!("{}", self.api.create_journal(&form).await?);
        Ok(())
    }

    async fn edit_entry(
        &mut self,
        id: i64,
        title: Option<String>,
        content: Option<String>,
        category: Option<i64>,
    ) -> Result<()> {
        let update = if title.is_some() || content.is_some() || category.is_some() {
            JournalUpdate {
                title,
                content,
                category_id: category,
            }
        } else {
            let (entry, categories) =
                futures::try_join!(self.api.journal(id), self.api.categories())?;
            prompt_update(&entry, &categories)?
        };

        println!("{}", self.api.update_journal(id, &update).await?);
        Ok(())
    }

    async fn category(&mut self, action: CategoryAction) -> Result<()> {
        let message = match action {
            CategoryAction::Add { name } => {
                self.api.create_category(&CategoryForm { name }).await?
            }
            CategoryAction::Rename { id, name } => {
                self.api.rename_category(id, &CategoryForm { name }).await?
            }
            CategoryAction::Delete { id } => self.api.delete_category(id).await?,
        };
        println!("{}", message);
        Ok(())
    }

    async fn profile(&mut self, action: ProfileAction) -> Result<()> {
        match action {
            ProfileAction::Show => render::print_user(&self.api.user_details().await?),
            ProfileAction::Update {
                email,
                username,
                phone,
            } => {
                let form = ProfileForm {
                    email,
                    username,
                    phone_number: phone,
                };
                println!("{}", self.api.update_details(&form).await?);
            }
        }
        Ok(())
    }
}

// ============================================================================
// Prompts
// ============================================================================

/// Read one line from stdin. An empty answer falls back to `default`.
fn prompt(label: &str, default: Option<&str>) -> Result<String> {
    match default {
        Some(default) => print!("{} [{}]: ", label, default),
        None => print!("{}: ", label),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    Ok(match default {
        Some(default) if input.is_empty() => default.to_string(),
        _ => input.to_string(),
    })
}

fn prompt_password(label: &str) -> Result<String> {
    let password = rpassword::prompt_password(label)?;
    Ok(password)
}

fn confirm(question: &str) -> Result<bool> {
    let answer = prompt(&format!("{} [y/N]", question), None)?;
    Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
}

/// List the categories and ask for an id. An empty answer keeps `current`.
fn choose_category(categories: &[Category], current: Option<i64>) -> Result<Option<i64>> {
    if categories.is_empty() {
        println!("No categories yet. Add one with `journ category add <name>`.");
        return Ok(current);
    }
    render::print_categories(categories);

    let default = current.map(|id| id.to_string());
    let answer = prompt("Category id", default.as_deref())?;
    if answer.is_empty() {
        return Ok(current);
    }
    let id: i64 = answer
        .parse()
        .with_context(|| format!("'{}' is not a category id", answer))?;
    if !categories.iter().any(|c| c.id == id) {
        bail!("No category with id {}", id);
    }
    Ok(Some(id))
}

fn prompt_update(entry: &JournalEntry, categories: &[Category]) -> Result<JournalUpdate> {
    println!("Press enter to keep the current value.");
    let title = prompt("Title", entry.title.as_deref())?;
    let content = prompt("Content", entry.content.as_deref())?;
    let category_id = choose_category(categories, entry.category_id)?;

    Ok(JournalUpdate {
        title: changed(entry.title.as_deref(), title),
        content: changed(entry.content.as_deref(), content),
        category_id: category_id.filter(|id| Some(*id) != entry.category_id),
    })
}

/// `Some(answer)` only when it differs from the current value
fn changed(current: Option<&str>, answer: String) -> Option<String> {
    if answer.is_empty() || current == Some(answer.as_str()) {
        None
    } else {
        Some(answer)
    }
}
