//! Account commands
//!
//! Usage: briventory accounts <add|list|lock|unlock|promote|demote|delete>

use super::{describe, open_handler};
use briventory_core::Result as OrmResult;
use briventory_store::models::Account;
use briventory_store::AccountsRepository;
use clap::{Args, Subcommand};
use std::error::Error;
use std::path::Path;

#[derive(Debug, Args)]
pub struct AccountsArgs {
    #[command(subcommand)]
    pub command: AccountsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AccountsCommand {
    /// Create an account
    Add(AddArgs),
    /// List every account with its flags
    List,
    /// Lock an account out
    Lock(EmailArg),
    /// Lift an account's lock
    Unlock(EmailArg),
    /// Grant administrator rights
    Promote(EmailArg),
    /// Revoke administrator rights
    Demote(EmailArg),
    /// Delete an account and everything it owns
    Delete(EmailArg),
}

#[derive(Debug, Args)]
pub struct AddArgs {
    #[arg(long)]
    pub firstname: String,

    #[arg(long)]
    pub lastname: String,

    #[arg(long)]
    pub email: String,

    /// Clear text password, hashed before storage
    #[arg(long, env = "BRIVENTORY_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Grant administrator rights
    #[arg(long)]
    pub admin: bool,
}

#[derive(Debug, Args)]
pub struct EmailArg {
    /// Email of the account
    pub email: String,
}

/// Execute accounts command
pub fn execute(db_path: &Path, args: AccountsArgs) -> Result<(), Box<dyn Error>> {
    let handler = open_handler(db_path)?;
    let accounts = handler.repository::<AccountsRepository>()?;

    match args.command {
        AccountsCommand::Add(add) => execute_add(&accounts, add),
        AccountsCommand::List => execute_list(&accounts),
        AccountsCommand::Lock(arg) => update(&accounts, &arg.email, "Locked", |account| {
            account.set_locked(true);
        }),
        AccountsCommand::Unlock(arg) => update(&accounts, &arg.email, "Unlocked", |account| {
            account.set_locked(false);
        }),
        AccountsCommand::Promote(arg) => update(&accounts, &arg.email, "Promoted", |account| {
            account.set_administrator(true);
        }),
        AccountsCommand::Demote(arg) => update(&accounts, &arg.email, "Demoted", |account| {
            account.set_administrator(false);
        }),
        AccountsCommand::Delete(arg) => {
            let account = find(&accounts, &arg.email)?;
            accounts.delete(&account).map_err(describe)?;
            println!("✓ Deleted {}", arg.email);
            Ok(())
        }
    }
}

fn find(accounts: &AccountsRepository, email: &str) -> Result<Account, Box<dyn Error>> {
    accounts
        .find_by_email(email)?
        .ok_or_else(|| format!("no account with email {}", email).into())
}

fn execute_add(accounts: &AccountsRepository, args: AddArgs) -> Result<(), Box<dyn Error>> {
    let mut account = accounts.build_instance();
    account
        .set_firstname(args.firstname)
        .set_lastname(args.lastname)
        .set_email(args.email);
    account.set_clear_password(&args.password)?;
    account.set_administrator(args.admin);
    accounts.persist(&mut account).map_err(describe)?;

    println!(
        "✓ Created account {} ({})",
        account.id().unwrap_or_default(),
        account.email()
    );
    Ok(())
}

fn flags(account: &mut Account) -> OrmResult<String> {
    let mut flags = Vec::new();
    if account.is_administrator()? {
        flags.push("admin");
    }
    if account.is_locked()? {
        flags.push("Locked");
    }
    Ok(flags.join(","))
}

fn execute_list(accounts: &AccountsRepository) -> Result<(), Box<dyn Error>> {
    let mut all = accounts.all()?;
    if all.is_empty() {
        println!("No accounts");
        return Ok(());
    }
    for account in all.iter_mut() {
        let flags = flags(account)?;
        println!(
            "{}\t{}\t{} {}\t{}",
            account.id().unwrap_or_default(),
            account.email(),
            account.firstname(),
            account.lastname(),
            flags
        );
    }
    Ok(())
}

fn update<F>(
    accounts: &AccountsRepository,
    email: &str,
    done: &str,
    change: F,
) -> Result<(), Box<dyn Error>>
where
    F: FnOnce(&mut Account),
{
    let mut account = find(accounts, email)?;
    change(&mut account);
    accounts.persist(&mut account).map_err(describe)?;
    println!("✓ {} {}", done, email);
    Ok(())
}
