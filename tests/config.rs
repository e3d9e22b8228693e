mod support;

use tasktracker::config::HostConfig;

use support::TestVault;

#[test]
fn host_config_defaults_when_missing() -> Result<(), Box<dyn std::error::Error>> {
    let vault = TestVault::init()?;
    let config = HostConfig::load_from_vault(vault.path());
    assert_eq!(config.block.tag, "tasktracker");
    assert_eq!(config.render.bar_cells, 20);
    assert!(config.watch.recursive);
    Ok(())
}

#[test]
fn host_config_defaults_on_invalid_file() -> Result<(), Box<dyn std::error::Error>> {
    let vault = TestVault::init()?;
    vault.write_host_config("[render]\nbar_cells = \"wide\"\n")?;
    let config = HostConfig::load_from_vault(vault.path());
    assert_eq!(config.render.bar_cells, 20);

    vault.write_host_config("[block]\ntag = \"two words\"\n")?;
    let config = HostConfig::load_from_vault(vault.path());
    assert_eq!(config.block.tag, "tasktracker");
    Ok(())
}

#[test]
fn host_config_reads_overrides() -> Result<(), Box<dyn std::error::Error>> {
    let vault = TestVault::init()?;
    let path = vault.write_host_config("[render]\nbar_cells = 10\n\n[watch]\nrecursive = false\n")?;
    let config = HostConfig::load(&path)?;
    assert_eq!(config.render.bar_cells, 10);
    assert!(!config.watch.recursive);
    assert_eq!(config.block.tag, "tasktracker");
    Ok(())
}
