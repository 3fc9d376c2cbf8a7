//! Tag rule CLI commands
//!
//! Tag rules map a tag name to the category used when an expense is added
//! without one.

use clap::Subcommand;

use super::{parse_category, Context};
use crate::display::tag_table;
use crate::error::ExpenseResult;
use crate::services::TagService;

/// Tag rule subcommands
#[derive(Subcommand)]
pub enum TagCommands {
    /// List tag rules
    List,

    /// Map a tag to a category (replaces an existing mapping)
    Add {
        /// Tag name
        name: String,
        /// Category
        category: String,
    },

    /// Remove a tag rule
    Remove {
        /// Tag name
        name: String,
    },
}

/// Handle a tag command
pub fn handle_tag_command(ctx: &mut Context, cmd: TagCommands) -> ExpenseResult<()> {
    let mut service = TagService::new(&mut ctx.store);

    match cmd {
        TagCommands::List => {
            print!("{}", tag_table(service.rules()));
        }

        TagCommands::Add { name, category } => {
            let category = parse_category(&category)?;
            match service.set(&name, category)? {
                Some(previous) if previous != category => {
                    println!("Tag '{}' now maps to {} (was {})", name.trim(), category, previous)
                }
                _ => println!("Tag '{}' maps to {}", name.trim(), category),
            }
        }

        TagCommands::Remove { name } => {
            let category = service.remove(&name)?;
            println!("Removed tag '{}' (was {})", name.trim(), category);
        }
    }

    Ok(())
}
