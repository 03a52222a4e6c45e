use super::open_store;
use crate::config::Config;

pub async fn cmd_profile_add(config: &Config, name: &str) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let profile = store.create_profile(name).await?;
    println!("Created profile {} ({})", profile.name, profile.id);
    Ok(())
}

pub async fn cmd_profile_list(config: &Config) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let profiles = store.list_profiles().await?;

    if profiles.is_empty() {
        println!("No profiles yet. Create one with 'trackarr profile add <name>'");
        return Ok(());
    }

    for profile in profiles {
        println!("{:>4}  {}", profile.id, profile.name);
    }
    Ok(())
}
