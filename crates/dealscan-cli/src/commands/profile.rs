//! Profile command implementation.

use crate::cli::{ProfileAction, ProfileArgs};
use crate::config::{Config, OrgProfile};
use crate::error::Result;
use crate::output::Formatter;

/// Execute the profile command.
pub async fn execute_profile(
    args: ProfileArgs,
    config: &mut Config,
    formatter: &Formatter,
) -> Result<()> {
    match args.action {
        ProfileAction::List => list_profiles(config, formatter),
        ProfileAction::Show => show_active_profile(config, formatter),
        ProfileAction::Switch { name } => switch_profile(config, name, formatter),
        ProfileAction::Set {
            name,
            instance_url,
            login_domain,
            api_version,
        } => set_profile(
            config,
            name,
            ProfileUpdate {
                instance_url,
                login_domain,
                api_version,
            },
            formatter,
        ),
        ProfileAction::Delete { name } => delete_profile(config, name, formatter),
    }
}

/// Fields given on `profile set`; unset fields keep their current value.
#[derive(Debug, Default)]
struct ProfileUpdate {
    instance_url: Option<String>,
    login_domain: Option<String>,
    api_version: Option<String>,
}

impl ProfileUpdate {
    fn apply(self, profile: &mut OrgProfile) {
        if let Some(url) = self.instance_url {
            profile.instance_url = Some(url.trim_end_matches('/').to_string());
        }
        if let Some(domain) = self.login_domain {
            profile.login_domain = domain;
        }
        if let Some(version) = self.api_version {
            profile.api_version = version;
        }
    }
}

fn print_profile(profile: &OrgProfile, indent: &str) {
    println!(
        "{}Instance URL: {}",
        indent,
        profile.instance_url.as_deref().unwrap_or("(from token response)")
    );
    println!("{}Login domain: {}", indent, profile.login_domain);
    println!("{}API version: {}", indent, profile.api_version);
}

/// List all profiles.
fn list_profiles(config: &Config, formatter: &Formatter) -> Result<()> {
    if config.profiles.is_empty() {
        println!("{}", formatter.info("No profiles configured"));
        return Ok(());
    }

    println!("Available profiles:");
    for (name, profile) in &config.profiles {
        if name == &config.active_profile {
            println!("* {}", formatter.success(name));
        } else {
            println!("  {}", name);
        }
        print_profile(profile, "    ");
    }

    Ok(())
}

/// Show the active profile.
fn show_active_profile(config: &Config, formatter: &Formatter) -> Result<()> {
    let profile = config.get_active_profile()?;

    println!("Active profile: {}", formatter.success(&config.active_profile));
    print_profile(profile, "  ");

    Ok(())
}

/// Switch to a different profile.
fn switch_profile(config: &mut Config, name: String, formatter: &Formatter) -> Result<()> {
    config.switch_profile(name.clone())?;
    config.save()?;
    println!(
        "{}",
        formatter.success(&format!("Switched to profile '{}'", name))
    );
    Ok(())
}

/// Create or update a profile.
fn set_profile(
    config: &mut Config,
    name: String,
    update: ProfileUpdate,
    formatter: &Formatter,
) -> Result<()> {
    let action = if config.profiles.contains_key(&name) {
        "Updated"
    } else {
        "Created"
    };

    let mut profile = config.profiles.get(&name).cloned().unwrap_or_default();
    update.apply(&mut profile);
    config.set_profile(name.clone(), profile);
    config.save()?;

    println!(
        "{}",
        formatter.success(&format!("{} profile '{}'", action, name))
    );

    Ok(())
}

/// Delete a profile.
fn delete_profile(config: &mut Config, name: String, formatter: &Formatter) -> Result<()> {
    config.delete_profile(&name)?;
    config.save()?;
    println!(
        "{}",
        formatter.success(&format!("Deleted profile '{}'", name))
    );
    Ok(())
}
