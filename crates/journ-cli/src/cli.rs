use clap::{Parser, Subcommand};

use journ_core::summary::Period;

#[derive(Parser, Debug)]
#[command(name = "journ")]
#[command(about = "Keep a journal on a journ server from the command line")]
#[command(version)]
pub struct Cli {
    /// Server base URL (overrides config and JOURN_BASE_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and remember the session
    Login {
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Create an account
    Signup,

    /// Forget the stored session
    Logout,

    /// Show who is logged in and where
    Status,

    /// List journal entries
    #[command(alias = "ls")]
    List {
        /// Only entries filed under this category
        #[arg(short, long, value_name = "ID")]
        category: Option<i64>,
    },

    /// Show one entry in full
    Show { id: i64 },

    /// Write a new entry (prompts for anything not given)
    New {
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short = 'b', long)]
        content: Option<String>,
        #[arg(short, long, value_name = "ID")]
        category: Option<i64>,
    },

    /// Edit an entry (prompts when no field is given)
    Edit {
        id: i64,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short = 'b', long)]
        content: Option<String>,
        #[arg(short, long, value_name = "ID")]
        category: Option<i64>,
    },

    /// Delete an entry
    #[command(alias = "rm")]
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List categories
    Categories,

    /// Manage categories
    Category {
        #[command(subcommand)]
        action: CategoryAction,
    },

    /// Group entries by day, week or month
    Summary {
        #[arg(short, long, default_value = "daily")]
        period: Period,
    },

    /// View or change account details
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Change the account password
    ResetPassword,

    /// Resend the account verification email
    Activate { email: String },

    /// Exchange the refresh token for a new session
    Refresh,
}

#[derive(Subcommand, Debug)]
pub enum CategoryAction {
    Add { name: String },
    Rename { id: i64, name: String },
    Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum ProfileAction {
    Show,
    Update {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
}

impl Commands {
    /// Commands that can run without a session
    pub fn is_public(&self) -> bool {
        matches!(
            self,
            Commands::Login { .. }
                | Commands::Signup
                | Commands::Logout
                | Commands::Status
                | Commands::Activate { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_summary_period() {
        let cli = Cli::parse_from(["journ", "summary", "--period", "weekly"]);
        match cli.command {
            Commands::Summary { period } => assert_eq!(period, Period::Week),
            other => panic!("unexpected command {:?}", other),
        }
        assert!(Cli::try_parse_from(["journ", "summary", "-p", "yearly"]).is_err());
    }

    #[test]
    fn test_parse_category_subcommands() {
        let cli = Cli::parse_from(["journ", "category", "rename", "3", "Work"]);
        match cli.command {
            Commands::Category {
                action: CategoryAction::Rename { id, name },
            } => {
                assert_eq!(id, 3);
                assert_eq!(name, "Work");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_base_url() {
        let cli = Cli::parse_from(["journ", "list", "--base-url", "http://localhost:5000/"]);
        assert_eq!(cli.base_url.as_deref(), Some("http://localhost:5000/"));
        assert!(!cli.command.is_public());
        assert!(Cli::parse_from(["journ", "logout"]).command.is_public());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
