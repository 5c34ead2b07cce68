use crate::config::Config;
use anyhow::Result;
use snapbind_core::{session, KeyCombo, ProfileKind};
use snapbind_executor::CommandExecutor;
use snapbind_platform::{PackageManager, UserDirectories};

/// Report the detected session and which tools are available, without
/// changing anything.
pub async fn run(config: &Config, dirs: &UserDirectories) -> Result<()> {
    println!("🔍 Environment Check\n");

    let profile = session::detect();
    println!("🖥️  Session type... {:?}", profile.session_type);
    println!(
        "🪟 Desktop... {}",
        if profile.desktop_environment.is_empty() {
            "(unset)"
        } else {
            profile.desktop_environment.as_str()
        }
    );
    let mechanism = match profile.kind() {
        ProfileKind::GnomeWayland => "GNOME custom keybinding (gsettings)",
        ProfileKind::Generic => "xbindkeys (~/.xbindkeysrc)",
    };
    println!("⌨️  Mechanism... {mechanism}");

    let executor = CommandExecutor::default().with_timeout(config.command_timeout());

    print!("📦 Package manager... ");
    match PackageManager::detect(&executor).await {
        Ok(manager) => println!("✓ ({})", manager.binary()),
        Err(e) => println!("✗ ({e})"),
    }

    for package in &config.packages {
        let present = executor.command_exists(&package.command).await;
        println!(
            "   {} {}",
            if present { "✓" } else { "✗" },
            package.package
        );
    }

    if profile.kind() == ProfileKind::GnomeWayland {
        print!("⚙️  gsettings... ");
        if executor.command_exists("gsettings").await {
            println!("✓");
        } else {
            println!("✗ (keybinding will be skipped)");
        }
    }

    print!("🔑 Key {}... ", config.key);
    match KeyCombo::parse(&config.key) {
        Ok(combo) => match profile.kind() {
            ProfileKind::GnomeWayland => println!("✓ ({})", combo.to_gnome_accelerator()),
            ProfileKind::Generic => println!("✓ ({})", combo.to_xbindkeys()),
        },
        Err(e) => println!("✗ ({e})"),
    }

    let script = config.script_path(dirs);
    print!("📜 Script {}... ", script.display());
    println!("{}", if script.exists() { "✓" } else { "✗ (not installed)" });

    Ok(())
}
